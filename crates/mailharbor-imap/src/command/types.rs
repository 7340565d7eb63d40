//! Command-level type definitions.

use crate::types::{Annotation, Flags, Labels, ModSeq};

/// STATUS attributes to request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusAttribute {
    /// Number of messages.
    Messages,
    /// Number of recent messages.
    Recent,
    /// Predicted next UID.
    UidNext,
    /// UIDVALIDITY epoch.
    UidValidity,
    /// Number of unseen messages.
    Unseen,
    /// Highest mod-sequence (CONDSTORE).
    HighestModSeq,
    /// Total size in octets (RFC 8438).
    Size,
    /// Number of deleted messages.
    Deleted,
    /// Per-mailbox append limit (RFC 7889).
    AppendLimit,
    /// Stable mailbox identifier (RFC 8474).
    MailboxId,
}

impl StatusAttribute {
    pub(crate) const fn as_str(self) -> &'static str {
        match self {
            Self::Messages => "MESSAGES",
            Self::Recent => "RECENT",
            Self::UidNext => "UIDNEXT",
            Self::UidValidity => "UIDVALIDITY",
            Self::Unseen => "UNSEEN",
            Self::HighestModSeq => "HIGHESTMODSEQ",
            Self::Size => "SIZE",
            Self::Deleted => "DELETED",
            Self::AppendLimit => "APPENDLIMIT",
            Self::MailboxId => "MAILBOXID",
        }
    }
}

/// A single FETCH data item specification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchAttribute {
    /// Message flags.
    Flags,
    /// Internal date.
    InternalDate,
    /// RFC822.SIZE.
    Rfc822Size,
    /// Envelope structure.
    Envelope,
    /// Body structure.
    BodyStructure,
    /// UID.
    Uid,
    /// MODSEQ (CONDSTORE).
    ModSeq,
    /// X-GM-LABELS.
    GmailLabels,
    /// X-GM-MSGID.
    GmailMessageId,
    /// X-GM-THRID.
    GmailThreadId,
    /// ANNOTATION (entries, attributes) per RFC 5257.
    Annotation {
        /// Entry match patterns, e.g. `/comment` or `/*`.
        entries: Vec<String>,
        /// Attribute patterns, e.g. `value.priv`.
        attributes: Vec<String>,
    },
    /// PREVIEW (RFC 8970).
    Preview,
    /// SAVEDATE (RFC 8514).
    SaveDate,
    /// Body section content.
    Body {
        /// Section specifier; `None` fetches the whole message.
        section: Option<String>,
        /// Use BODY.PEEK to avoid setting \Seen.
        peek: bool,
        /// Partial range `<start.count>`.
        partial: Option<(u32, u32)>,
    },
}

/// How a STORE mutates the target set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreMode {
    /// Add to the existing set (`+`).
    Add,
    /// Remove from the existing set (`-`).
    Remove,
    /// Replace the set outright.
    Set,
}

impl StoreMode {
    pub(crate) const fn prefix(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Remove => "-",
            Self::Set => "",
        }
    }
}

/// The wire-level variant of a STORE command.
///
/// The dispatcher selects the encoding per variant: system flags and
/// keywords, GMail labels, or annotations.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreWire {
    /// `STORE ... [+-]FLAGS[.SILENT] (...)`.
    Flags {
        /// Mutation mode.
        mode: StoreMode,
        /// Suppress the untagged FETCH echo.
        silent: bool,
        /// Flags and keywords to apply.
        flags: Flags,
        /// CONDSTORE guard.
        unchanged_since: Option<ModSeq>,
    },
    /// `STORE ... [+-]X-GM-LABELS[.SILENT] (...)`.
    Labels {
        /// Mutation mode.
        mode: StoreMode,
        /// Suppress the untagged FETCH echo.
        silent: bool,
        /// Labels to apply.
        labels: Labels,
        /// CONDSTORE guard.
        unchanged_since: Option<ModSeq>,
    },
    /// `STORE ... ANNOTATION (...)`.
    Annotations {
        /// Annotations to store; a `None` value removes the entry.
        annotations: Vec<Annotation>,
        /// CONDSTORE guard.
        unchanged_since: Option<ModSeq>,
    },
}

impl StoreWire {
    /// Returns the CONDSTORE guard, if any.
    #[must_use]
    pub fn unchanged_since(&self) -> Option<ModSeq> {
        match self {
            Self::Flags {
                unchanged_since, ..
            }
            | Self::Labels {
                unchanged_since, ..
            }
            | Self::Annotations {
                unchanged_since, ..
            } => *unchanged_since,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_attribute_tokens() {
        assert_eq!(StatusAttribute::Messages.as_str(), "MESSAGES");
        assert_eq!(StatusAttribute::HighestModSeq.as_str(), "HIGHESTMODSEQ");
        assert_eq!(StatusAttribute::MailboxId.as_str(), "MAILBOXID");
    }

    #[test]
    fn store_mode_prefixes() {
        assert_eq!(StoreMode::Add.prefix(), "+");
        assert_eq!(StoreMode::Remove.prefix(), "-");
        assert_eq!(StoreMode::Set.prefix(), "");
    }

    #[test]
    fn store_wire_guard() {
        let wire = StoreWire::Flags {
            mode: StoreMode::Add,
            silent: true,
            flags: Flags::new(),
            unchanged_since: ModSeq::new(700),
        };
        assert_eq!(wire.unchanged_since().map(|m| m.get()), Some(700));
    }
}
