//! Sequence sets and UID sets for addressing message ranges.

use super::{SeqNum, Uid};

/// Sequence-number set for message ranges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SequenceSet {
    /// Single sequence number.
    Single(SeqNum),
    /// Inclusive range.
    Range(SeqNum, SeqNum),
    /// Range from start to the end of the mailbox (`n:*`).
    RangeFrom(SeqNum),
    /// All messages (`*`).
    All,
    /// Union of multiple specifications.
    Set(Vec<Self>),
}

impl SequenceSet {
    /// Creates a sequence set from a single number. Returns `None` for 0.
    #[must_use]
    pub fn single(n: u32) -> Option<Self> {
        SeqNum::new(n).map(Self::Single)
    }

    /// Creates an inclusive range. Returns `None` if either bound is 0.
    #[must_use]
    pub fn range(start: u32, end: u32) -> Option<Self> {
        Some(Self::Range(SeqNum::new(start)?, SeqNum::new(end)?))
    }
}

impl std::fmt::Display for SequenceSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Single(n) => write!(f, "{n}"),
            Self::Range(start, end) => write!(f, "{start}:{end}"),
            Self::RangeFrom(start) => write!(f, "{start}:*"),
            Self::All => write!(f, "*"),
            Self::Set(items) => {
                let s: Vec<_> = items.iter().map(ToString::to_string).collect();
                write!(f, "{}", s.join(","))
            }
        }
    }
}

/// UID-based message set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UidSet {
    /// Single UID.
    Single(Uid),
    /// Inclusive range.
    Range(Uid, Uid),
    /// Range from start to the highest UID (`n:*`).
    RangeFrom(Uid),
    /// All messages.
    All,
    /// Union of multiple specifications.
    Set(Vec<Self>),
}

impl UidSet {
    /// Creates a UID set from a single UID.
    #[must_use]
    pub fn single(uid: Uid) -> Self {
        Self::Single(uid)
    }

    /// Creates a UID set from an inclusive range.
    #[must_use]
    pub fn range(start: Uid, end: Uid) -> Self {
        Self::Range(start, end)
    }

    /// Builds a compact set from an unordered list of UIDs.
    ///
    /// The input is sorted, deduplicated, and adjacent values are folded
    /// into ranges. Returns `None` for an empty input.
    #[must_use]
    pub fn from_uids(uids: &[Uid]) -> Option<Self> {
        if uids.is_empty() {
            return None;
        }

        let mut values: Vec<Uid> = uids.to_vec();
        values.sort_unstable();
        values.dedup();

        let mut parts = Vec::new();
        let mut start = values[0];
        let mut end = values[0];

        for &v in &values[1..] {
            if v.get() == end.get() + 1 {
                end = v;
            } else {
                parts.push(Self::part(start, end));
                start = v;
                end = v;
            }
        }
        parts.push(Self::part(start, end));

        if parts.len() == 1 {
            parts.pop()
        } else {
            Some(Self::Set(parts))
        }
    }

    fn part(start: Uid, end: Uid) -> Self {
        if start == end {
            Self::Single(start)
        } else {
            Self::Range(start, end)
        }
    }

    /// Parses a wire-format set such as `1:3,5,9:*`.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let mut parts = Vec::new();

        for chunk in s.split(',') {
            let part = if chunk == "*" {
                Self::All
            } else if let Some((lo, hi)) = chunk.split_once(':') {
                let start = Uid::new(lo.parse().ok()?)?;
                if hi == "*" {
                    Self::RangeFrom(start)
                } else {
                    Self::Range(start, Uid::new(hi.parse().ok()?)?)
                }
            } else {
                Self::Single(Uid::new(chunk.parse().ok()?)?)
            };
            parts.push(part);
        }

        match parts.len() {
            0 => None,
            1 => parts.pop(),
            _ => Some(Self::Set(parts)),
        }
    }

    /// Expands the set into individual UIDs.
    ///
    /// Returns `None` if the set is open-ended (`*` or `n:*`), since the
    /// upper bound is only known to the server.
    #[must_use]
    pub fn expand(&self) -> Option<Vec<Uid>> {
        match self {
            Self::Single(uid) => Some(vec![*uid]),
            Self::Range(start, end) => {
                let (lo, hi) = (start.get().min(end.get()), start.get().max(end.get()));
                Some((lo..=hi).filter_map(Uid::new).collect())
            }
            Self::RangeFrom(_) | Self::All => None,
            Self::Set(items) => {
                let mut out = Vec::new();
                for item in items {
                    out.extend(item.expand()?);
                }
                Some(out)
            }
        }
    }

    /// Returns true if the set contains the given UID.
    ///
    /// Open-ended ranges treat `*` as unbounded above.
    #[must_use]
    pub fn contains(&self, uid: Uid) -> bool {
        match self {
            Self::Single(u) => *u == uid,
            Self::Range(start, end) => {
                let (lo, hi) = (start.get().min(end.get()), start.get().max(end.get()));
                (lo..=hi).contains(&uid.get())
            }
            Self::RangeFrom(start) => uid.get() >= start.get(),
            Self::All => true,
            Self::Set(items) => items.iter().any(|i| i.contains(uid)),
        }
    }

    /// Converts this UID set to a sequence set for command serialization.
    ///
    /// `UID FETCH`/`UID STORE` commands carry UIDs in sequence-set syntax;
    /// both wrap `NonZeroU32`, so the conversion is infallible.
    #[must_use]
    pub fn as_sequence_set(&self) -> SequenceSet {
        match self {
            Self::Single(uid) => SequenceSet::Single(SeqNum(uid.0)),
            Self::Range(start, end) => SequenceSet::Range(SeqNum(start.0), SeqNum(end.0)),
            Self::RangeFrom(start) => SequenceSet::RangeFrom(SeqNum(start.0)),
            Self::All => SequenceSet::All,
            Self::Set(items) => SequenceSet::Set(items.iter().map(Self::as_sequence_set).collect()),
        }
    }
}

impl std::fmt::Display for UidSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Single(n) => write!(f, "{n}"),
            Self::Range(start, end) => write!(f, "{start}:{end}"),
            Self::RangeFrom(start) => write!(f, "{start}:*"),
            Self::All => write!(f, "*"),
            Self::Set(items) => {
                let s: Vec<_> = items.iter().map(ToString::to_string).collect();
                write!(f, "{}", s.join(","))
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn uid(n: u32) -> Uid {
        Uid::new(n).unwrap()
    }

    #[test]
    fn sequence_set_display() {
        assert_eq!(SequenceSet::single(1).unwrap().to_string(), "1");
        assert_eq!(SequenceSet::range(1, 10).unwrap().to_string(), "1:10");
        assert_eq!(SequenceSet::All.to_string(), "*");
        assert_eq!(
            SequenceSet::Set(vec![
                SequenceSet::single(1).unwrap(),
                SequenceSet::range(5, 10).unwrap(),
            ])
            .to_string(),
            "1,5:10"
        );
    }

    #[test]
    fn from_uids_folds_adjacent_values() {
        let set = UidSet::from_uids(&[uid(5), uid(1), uid(2), uid(3), uid(9)]).unwrap();
        assert_eq!(set.to_string(), "1:3,5,9");
    }

    #[test]
    fn from_uids_single() {
        assert_eq!(UidSet::from_uids(&[uid(7)]).unwrap().to_string(), "7");
        assert!(UidSet::from_uids(&[]).is_none());
    }

    #[test]
    fn parse_round_trips() {
        for s in ["1", "1:10", "1:3,5,9:12", "4:*", "*"] {
            assert_eq!(UidSet::parse(s).unwrap().to_string(), s);
        }
        assert!(UidSet::parse("").is_none());
        assert!(UidSet::parse("0").is_none());
        assert!(UidSet::parse("abc").is_none());
    }

    #[test]
    fn expand() {
        let set = UidSet::parse("1:3,7").unwrap();
        let uids: Vec<u32> = set.expand().unwrap().iter().map(|u| u.get()).collect();
        assert_eq!(uids, vec![1, 2, 3, 7]);

        assert!(UidSet::parse("5:*").unwrap().expand().is_none());
    }

    #[test]
    fn contains() {
        let set = UidSet::parse("1:3,7,10:*").unwrap();
        assert!(set.contains(uid(2)));
        assert!(set.contains(uid(7)));
        assert!(set.contains(uid(10_000)));
        assert!(!set.contains(uid(5)));
    }

    #[test]
    fn as_sequence_set_preserves_shape() {
        let set = UidSet::parse("1:3,7").unwrap();
        assert_eq!(set.as_sequence_set().to_string(), "1:3,7");
        assert!(matches!(UidSet::All.as_sequence_set(), SequenceSet::All));
    }
}
