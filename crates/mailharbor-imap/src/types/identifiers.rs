//! Core IMAP identifiers.
//!
//! Types for command tags, sequence numbers, UIDs, UIDVALIDITY epochs,
//! modification sequences, and the validity-qualified [`UniqueId`].

use std::num::{NonZeroU32, NonZeroU64};

/// IMAP command tag.
///
/// Each command carries a unique tag; the server echoes it on the matching
/// completion response. Tags are never reused within a session.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Tag(pub String);

impl Tag {
    /// Creates a new tag from a string.
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    /// Returns the tag as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Message sequence number.
///
/// Sequence numbers start at 1 and shift down when earlier messages are
/// expunged; they are only meaningful for the lifetime of a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SeqNum(pub NonZeroU32);

impl SeqNum {
    /// Creates a new sequence number. Returns `None` for 0.
    #[must_use]
    pub fn new(n: u32) -> Option<Self> {
        NonZeroU32::new(n).map(Self)
    }

    /// Returns the underlying value.
    #[must_use]
    pub fn get(self) -> u32 {
        self.0.get()
    }
}

impl std::fmt::Display for SeqNum {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a message within one UIDVALIDITY epoch.
///
/// UIDs are strictly increasing and never reused within an epoch. On their
/// own they are not stable across epochs; see [`UniqueId`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Uid(pub NonZeroU32);

impl Uid {
    /// Creates a new UID. Returns `None` for 0.
    #[must_use]
    pub fn new(n: u32) -> Option<Self> {
        NonZeroU32::new(n).map(Self)
    }

    /// Returns the underlying value.
    #[must_use]
    pub fn get(self) -> u32 {
        self.0.get()
    }
}

impl std::fmt::Display for Uid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// UIDVALIDITY epoch of a mailbox.
///
/// When this value changes, every cached UID for the mailbox is invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UidValidity(pub NonZeroU32);

impl UidValidity {
    /// Creates a new UIDVALIDITY. Returns `None` for 0.
    #[must_use]
    pub fn new(n: u32) -> Option<Self> {
        NonZeroU32::new(n).map(Self)
    }

    /// Returns the underlying value.
    #[must_use]
    pub fn get(self) -> u32 {
        self.0.get()
    }
}

impl std::fmt::Display for UidValidity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Modification sequence number (CONDSTORE, RFC 7162).
///
/// Each message's MODSEQ increases whenever its metadata changes; the
/// mailbox tracks the highest value seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ModSeq(pub NonZeroU64);

impl ModSeq {
    /// Creates a new `ModSeq` from a u64, returning `None` if zero.
    #[must_use]
    pub fn new(value: u64) -> Option<Self> {
        NonZeroU64::new(value).map(Self)
    }

    /// Returns the raw value.
    #[must_use]
    pub fn get(self) -> u64 {
        self.0.get()
    }
}

impl std::fmt::Display for ModSeq {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u64> for ModSeq {
    type Error = &'static str;

    fn try_from(value: u64) -> std::result::Result<Self, Self::Error> {
        Self::new(value).ok_or("MODSEQ cannot be zero")
    }
}

/// A message identity that survives reconnection: a (validity, UID) pair.
///
/// Two `UniqueId`s are comparable only when their validities match; the
/// `PartialOrd` implementation returns `None` across epochs. A validity
/// change is a hard cache-invalidation event, so callers holding
/// `UniqueId`s from an older epoch must discard them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UniqueId {
    /// The mailbox epoch in which the UID is valid.
    pub validity: UidValidity,
    /// The UID within that epoch.
    pub uid: Uid,
}

impl UniqueId {
    /// Creates a new unique identifier.
    #[must_use]
    pub fn new(validity: UidValidity, uid: Uid) -> Self {
        Self { validity, uid }
    }

    /// Returns true if the two identifiers belong to the same epoch.
    #[must_use]
    pub fn comparable_with(&self, other: &Self) -> bool {
        self.validity == other.validity
    }
}

impl PartialOrd for UniqueId {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        if self.validity == other.validity {
            Some(self.uid.cmp(&other.uid))
        } else {
            None
        }
    }
}

impl std::fmt::Display for UniqueId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.validity, self.uid)
    }
}

/// Ordered mapping from source to destination [`UniqueId`]s.
///
/// Produced by COPY and MOVE from the COPYUID response code. Empty when the
/// server does not advertise UIDPLUS, or when the input set was empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UniqueIdMap {
    entries: Vec<(UniqueId, UniqueId)>,
}

impl UniqueIdMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a map from parallel source/destination UID lists.
    ///
    /// Lists of unequal length are truncated to the shorter one; a
    /// server that emits mismatched COPYUID sets is tolerated.
    #[must_use]
    pub fn from_lists(
        source_validity: UidValidity,
        source: Vec<Uid>,
        dest_validity: UidValidity,
        dest: Vec<Uid>,
    ) -> Self {
        let entries = source
            .into_iter()
            .zip(dest)
            .map(|(s, d)| {
                (
                    UniqueId::new(source_validity, s),
                    UniqueId::new(dest_validity, d),
                )
            })
            .collect();
        Self { entries }
    }

    /// Appends a mapping.
    pub fn push(&mut self, source: UniqueId, dest: UniqueId) {
        self.entries.push((source, dest));
    }

    /// Looks up the destination for a source identifier.
    #[must_use]
    pub fn get(&self, source: &UniqueId) -> Option<UniqueId> {
        self.entries
            .iter()
            .find(|(s, _)| s == source)
            .map(|(_, d)| *d)
    }

    /// Returns an iterator over (source, destination) pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = &(UniqueId, UniqueId)> {
        self.entries.iter()
    }

    /// Returns the number of mappings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no mappings.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl IntoIterator for UniqueIdMap {
    type Item = (UniqueId, UniqueId);
    type IntoIter = std::vec::IntoIter<(UniqueId, UniqueId)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn zero_values_are_rejected() {
        assert!(SeqNum::new(0).is_none());
        assert!(Uid::new(0).is_none());
        assert!(UidValidity::new(0).is_none());
        assert!(ModSeq::new(0).is_none());
    }

    #[test]
    fn display() {
        assert_eq!(SeqNum::new(42).unwrap().to_string(), "42");
        assert_eq!(Uid::new(7).unwrap().to_string(), "7");
        assert_eq!(Tag::new("A0001").to_string(), "A0001");
        assert_eq!(ModSeq::new(900).unwrap().to_string(), "900");
    }

    #[test]
    fn unique_ids_compare_within_one_epoch() {
        let v = UidValidity::new(1234).unwrap();
        let a = UniqueId::new(v, Uid::new(1).unwrap());
        let b = UniqueId::new(v, Uid::new(2).unwrap());
        assert!(a < b);
        assert!(a.comparable_with(&b));
    }

    #[test]
    fn unique_ids_do_not_compare_across_epochs() {
        let a = UniqueId::new(UidValidity::new(1).unwrap(), Uid::new(5).unwrap());
        let b = UniqueId::new(UidValidity::new(2).unwrap(), Uid::new(5).unwrap());
        assert!(!a.comparable_with(&b));
        assert_eq!(a.partial_cmp(&b), None);
        assert_ne!(a, b);
    }

    #[test]
    fn unique_id_map_from_lists() {
        let src_v = UidValidity::new(1).unwrap();
        let dst_v = UidValidity::new(9).unwrap();
        let map = UniqueIdMap::from_lists(
            src_v,
            vec![Uid::new(1).unwrap(), Uid::new(2).unwrap()],
            dst_v,
            vec![Uid::new(101).unwrap(), Uid::new(102).unwrap()],
        );
        assert_eq!(map.len(), 2);
        let dest = map
            .get(&UniqueId::new(src_v, Uid::new(2).unwrap()))
            .unwrap();
        assert_eq!(dest.uid.get(), 102);
        assert_eq!(dest.validity, dst_v);
    }

    #[test]
    fn unique_id_map_tolerates_uneven_lists() {
        let v = UidValidity::new(1).unwrap();
        let map = UniqueIdMap::from_lists(
            v,
            vec![Uid::new(1).unwrap(), Uid::new(2).unwrap()],
            v,
            vec![Uid::new(10).unwrap()],
        );
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn modseq_try_from() {
        assert!(ModSeq::try_from(100u64).is_ok());
        assert!(ModSeq::try_from(0u64).is_err());
    }
}
