//! Message flags and keywords.

/// Message flag: a system flag or a user-defined keyword.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Flag {
    /// Message has been read.
    Seen,
    /// Message has been answered.
    Answered,
    /// Message is flagged for special attention.
    Flagged,
    /// Message is marked for deletion.
    Deleted,
    /// Message is a draft.
    Draft,
    /// Message is recent (first session to see it).
    Recent,
    /// User-defined keyword.
    Keyword(String),
}

impl Flag {
    /// Parses a flag string.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "\\SEEN" => Self::Seen,
            "\\ANSWERED" => Self::Answered,
            "\\FLAGGED" => Self::Flagged,
            "\\DELETED" => Self::Deleted,
            "\\DRAFT" => Self::Draft,
            "\\RECENT" => Self::Recent,
            _ => Self::Keyword(s.to_string()),
        }
    }

    /// Returns the flag as an IMAP string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Seen => "\\Seen",
            Self::Answered => "\\Answered",
            Self::Flagged => "\\Flagged",
            Self::Deleted => "\\Deleted",
            Self::Draft => "\\Draft",
            Self::Recent => "\\Recent",
            Self::Keyword(s) => s,
        }
    }

    /// Returns true if this is a user-defined keyword.
    #[must_use]
    pub fn is_keyword(&self) -> bool {
        matches!(self, Self::Keyword(_))
    }
}

impl std::fmt::Display for Flag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An ordered, duplicate-free collection of message flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Flags {
    flags: Vec<Flag>,
}

impl Flags {
    /// Creates an empty flags collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates flags from a vector.
    #[must_use]
    pub fn from_vec(flags: Vec<Flag>) -> Self {
        let mut out = Self::new();
        for flag in flags {
            out.insert(flag);
        }
        out
    }

    /// Adds a flag if not already present.
    pub fn insert(&mut self, flag: Flag) {
        if !self.flags.contains(&flag) {
            self.flags.push(flag);
        }
    }

    /// Removes a flag.
    pub fn remove(&mut self, flag: &Flag) {
        self.flags.retain(|f| f != flag);
    }

    /// Returns true if the flag is present.
    #[must_use]
    pub fn contains(&self, flag: &Flag) -> bool {
        self.flags.contains(flag)
    }

    /// Returns true if the message has been seen.
    #[must_use]
    pub fn is_seen(&self) -> bool {
        self.contains(&Flag::Seen)
    }

    /// Returns true if the message is marked for deletion.
    #[must_use]
    pub fn is_deleted(&self) -> bool {
        self.contains(&Flag::Deleted)
    }

    /// Returns true if the message is flagged.
    #[must_use]
    pub fn is_flagged(&self) -> bool {
        self.contains(&Flag::Flagged)
    }

    /// Returns an iterator over the flags.
    pub fn iter(&self) -> impl Iterator<Item = &Flag> {
        self.flags.iter()
    }

    /// Returns an iterator over the user-defined keywords only.
    pub fn keywords(&self) -> impl Iterator<Item = &str> {
        self.flags.iter().filter_map(|f| match f {
            Flag::Keyword(k) => Some(k.as_str()),
            _ => None,
        })
    }

    /// Returns the number of flags.
    #[must_use]
    pub fn len(&self) -> usize {
        self.flags.len()
    }

    /// Returns true if there are no flags.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }
}

impl IntoIterator for Flags {
    type Item = Flag;
    type IntoIter = std::vec::IntoIter<Flag>;

    fn into_iter(self) -> Self::IntoIter {
        self.flags.into_iter()
    }
}

impl FromIterator<Flag> for Flags {
    fn from_iter<I: IntoIterator<Item = Flag>>(iter: I) -> Self {
        Self::from_vec(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(Flag::parse("\\Seen"), Flag::Seen);
        assert_eq!(Flag::parse("\\SEEN"), Flag::Seen);
        assert_eq!(Flag::parse("\\deleted"), Flag::Deleted);
    }

    #[test]
    fn parse_keyword() {
        assert_eq!(
            Flag::parse("$Forwarded"),
            Flag::Keyword("$Forwarded".to_string())
        );
        assert!(Flag::parse("$Forwarded").is_keyword());
        assert!(!Flag::Seen.is_keyword());
    }

    #[test]
    fn insert_deduplicates() {
        let mut flags = Flags::new();
        flags.insert(Flag::Seen);
        flags.insert(Flag::Seen);
        assert_eq!(flags.len(), 1);
    }

    #[test]
    fn keywords_iterator_filters_system_flags() {
        let flags = Flags::from_vec(vec![
            Flag::Seen,
            Flag::Keyword("$Label1".into()),
            Flag::Deleted,
            Flag::Keyword("Junk".into()),
        ]);
        let kws: Vec<_> = flags.keywords().collect();
        assert_eq!(kws, vec!["$Label1", "Junk"]);
    }

    #[test]
    fn remove() {
        let mut flags = Flags::from_vec(vec![Flag::Seen, Flag::Answered]);
        flags.remove(&Flag::Seen);
        assert!(!flags.is_seen());
        assert!(flags.contains(&Flag::Answered));
    }
}
