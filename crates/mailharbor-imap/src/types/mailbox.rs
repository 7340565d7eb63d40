//! Mailbox naming, attributes, and selection status.

use super::{Flags, ModSeq, SeqNum, Uid, UidValidity};

/// A server-side mailbox name (full path).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MailboxName(pub String);

impl MailboxName {
    /// Creates a new mailbox name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The INBOX mailbox (case-insensitive per RFC 3501).
    #[must_use]
    pub fn inbox() -> Self {
        Self("INBOX".to_string())
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if this names the INBOX.
    #[must_use]
    pub fn is_inbox(&self) -> bool {
        self.0.eq_ignore_ascii_case("INBOX")
    }

    /// Returns the leaf component given the hierarchy delimiter.
    #[must_use]
    pub fn leaf(&self, delimiter: Option<char>) -> &str {
        match delimiter {
            Some(d) => self.0.rsplit(d).next().unwrap_or(&self.0),
            None => &self.0,
        }
    }

    /// Returns the parent path given the hierarchy delimiter, if any.
    #[must_use]
    pub fn parent(&self, delimiter: Option<char>) -> Option<&str> {
        let d = delimiter?;
        self.0.rfind(d).map(|idx| &self.0[..idx])
    }
}

impl std::fmt::Display for MailboxName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for MailboxName {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Access mode of a folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FolderAccess {
    /// Not open.
    #[default]
    None,
    /// Opened with EXAMINE, or demoted by a READ-ONLY response code.
    ReadOnly,
    /// Opened with SELECT and confirmed READ-WRITE.
    ReadWrite,
}

/// Mailbox attributes from LIST/LSUB responses.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MailboxAttribute {
    /// Mailbox cannot be selected.
    NoSelect,
    /// Mailbox cannot have children.
    NoInferiors,
    /// Mailbox has no children.
    HasNoChildren,
    /// Mailbox has children.
    HasChildren,
    /// Mailbox is marked as interesting.
    Marked,
    /// Mailbox is not marked.
    Unmarked,
    /// Mailbox is subscribed (LIST-EXTENDED).
    Subscribed,
    /// Mailbox is on a remote server (RFC 5258).
    Remote,
    /// Mailbox does not exist but has existing children.
    NonExistent,
    // SPECIAL-USE attributes (RFC 6154 / RFC 8457)
    /// All messages (virtual mailbox).
    All,
    /// Archive folder.
    Archive,
    /// Drafts folder.
    Drafts,
    /// Flagged/starred messages (virtual mailbox).
    Flagged,
    /// Junk/spam folder.
    Junk,
    /// Sent folder.
    Sent,
    /// Trash folder.
    Trash,
    /// Important messages (RFC 8457).
    Important,
    /// Attribute this client does not model.
    Unknown(String),
}

impl MailboxAttribute {
    /// Parses a mailbox attribute token.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "\\NOSELECT" => Self::NoSelect,
            "\\NOINFERIORS" => Self::NoInferiors,
            "\\HASNOCHILDREN" => Self::HasNoChildren,
            "\\HASCHILDREN" => Self::HasChildren,
            "\\MARKED" => Self::Marked,
            "\\UNMARKED" => Self::Unmarked,
            "\\SUBSCRIBED" => Self::Subscribed,
            "\\REMOTE" => Self::Remote,
            "\\NONEXISTENT" => Self::NonExistent,
            "\\ALL" => Self::All,
            "\\ARCHIVE" => Self::Archive,
            "\\DRAFTS" => Self::Drafts,
            "\\FLAGGED" => Self::Flagged,
            "\\JUNK" | "\\SPAM" => Self::Junk,
            "\\SENT" => Self::Sent,
            "\\TRASH" => Self::Trash,
            "\\IMPORTANT" => Self::Important,
            _ => Self::Unknown(s.to_string()),
        }
    }

    /// Returns the wire form of the attribute.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::NoSelect => "\\Noselect",
            Self::NoInferiors => "\\Noinferiors",
            Self::HasNoChildren => "\\HasNoChildren",
            Self::HasChildren => "\\HasChildren",
            Self::Marked => "\\Marked",
            Self::Unmarked => "\\Unmarked",
            Self::Subscribed => "\\Subscribed",
            Self::Remote => "\\Remote",
            Self::NonExistent => "\\NonExistent",
            Self::All => "\\All",
            Self::Archive => "\\Archive",
            Self::Drafts => "\\Drafts",
            Self::Flagged => "\\Flagged",
            Self::Junk => "\\Junk",
            Self::Sent => "\\Sent",
            Self::Trash => "\\Trash",
            Self::Important => "\\Important",
            Self::Unknown(s) => s,
        }
    }

    /// Returns true if this is a SPECIAL-USE attribute.
    #[must_use]
    pub fn is_special_use(&self) -> bool {
        matches!(
            self,
            Self::All
                | Self::Archive
                | Self::Drafts
                | Self::Flagged
                | Self::Junk
                | Self::Sent
                | Self::Trash
                | Self::Important
        )
    }
}

/// One `* LIST` (or `* LSUB`) line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEntry {
    /// Mailbox attributes.
    pub attributes: Vec<MailboxAttribute>,
    /// Hierarchy delimiter, `None` for flat namespaces.
    pub delimiter: Option<char>,
    /// Full mailbox name.
    pub name: MailboxName,
}

/// Snapshot of mailbox state assembled from SELECT/EXAMINE responses.
#[derive(Debug, Clone, Default)]
pub struct MailboxStatus {
    /// Number of messages in the mailbox.
    pub exists: u32,
    /// Number of recent messages.
    pub recent: u32,
    /// Sequence number of the first unseen message.
    pub unseen: Option<SeqNum>,
    /// Predicted next UID.
    pub uid_next: Option<Uid>,
    /// UIDVALIDITY epoch.
    pub uid_validity: Option<UidValidity>,
    /// Flags applicable in this mailbox.
    pub flags: Flags,
    /// Flags that can be changed permanently.
    pub permanent_flags: Flags,
    /// True when the server accepts new keywords (`\*` in PERMANENTFLAGS).
    pub accepts_new_keywords: bool,
    /// Whether the mailbox was opened read-only.
    pub read_only: bool,
    /// Highest mod-sequence, when CONDSTORE is in play.
    pub highest_mod_seq: Option<ModSeq>,
    /// Stable mailbox identifier (OBJECTID).
    pub mailbox_id: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn inbox_is_case_insensitive() {
        assert!(MailboxName::new("inbox").is_inbox());
        assert!(MailboxName::new("INBOX").is_inbox());
        assert!(!MailboxName::new("Sent").is_inbox());
    }

    #[test]
    fn leaf_and_parent() {
        let name = MailboxName::new("work/projects/rust");
        assert_eq!(name.leaf(Some('/')), "rust");
        assert_eq!(name.parent(Some('/')), Some("work/projects"));

        let top = MailboxName::new("INBOX");
        assert_eq!(top.leaf(Some('/')), "INBOX");
        assert_eq!(top.parent(Some('/')), None);
        assert_eq!(top.parent(None), None);
    }

    #[test]
    fn attribute_parse() {
        assert_eq!(
            MailboxAttribute::parse("\\NoSelect"),
            MailboxAttribute::NoSelect
        );
        assert_eq!(MailboxAttribute::parse("\\Spam"), MailboxAttribute::Junk);
        assert_eq!(
            MailboxAttribute::parse("\\Remote"),
            MailboxAttribute::Remote
        );
        assert_eq!(
            MailboxAttribute::parse("\\Custom"),
            MailboxAttribute::Unknown("\\Custom".to_string())
        );
    }

    #[test]
    fn special_use_classification() {
        assert!(MailboxAttribute::Trash.is_special_use());
        assert!(MailboxAttribute::Important.is_special_use());
        assert!(!MailboxAttribute::HasChildren.is_special_use());
    }

    #[test]
    fn default_status_is_empty() {
        let status = MailboxStatus::default();
        assert_eq!(status.exists, 0);
        assert!(status.uid_validity.is_none());
        assert!(!status.read_only);
        assert!(!status.accepts_new_keywords);
    }
}
