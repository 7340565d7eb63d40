//! Core IMAP types.
//!
//! The fundamental vocabulary used throughout the engine: identifiers,
//! flags, labels, sequence sets, capabilities, response codes, mailbox
//! attributes, annotations, threads, and message summaries.

mod annotation;
mod capability;
mod flags;
mod identifiers;
mod labels;
mod mailbox;
mod response_code;
mod sequence;
mod summary;
mod thread;

pub use annotation::{Annotation, AnnotationAccess, AnnotationScopes};
pub use capability::{Capability, Status};
pub use flags::{Flag, Flags};
pub use identifiers::{ModSeq, SeqNum, Tag, Uid, UidValidity, UniqueId, UniqueIdMap};
pub use labels::{GmailMessageId, GmailThreadId, Label, Labels};
pub use mailbox::{FolderAccess, ListEntry, MailboxAttribute, MailboxName, MailboxStatus};
pub use response_code::ResponseCode;
pub use sequence::{SequenceSet, UidSet};
pub use summary::{Address, BodyStructure, Envelope, MessageSummary};
pub use thread::{MessageThread, ThreadingAlgorithm};

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_smoke() {
        assert!(SeqNum::new(0).is_none());
        assert_eq!(Uid::new(42).unwrap().get(), 42);
        assert_eq!(ModSeq::new(7).unwrap().get(), 7);
    }

    #[test]
    fn capability_smoke() {
        assert_eq!(Capability::parse("IMAP4rev1"), Capability::Imap4Rev1);
        assert_eq!(
            Capability::parse("AUTH=XOAUTH2"),
            Capability::Auth("XOAUTH2".to_string())
        );
    }

    #[test]
    fn flag_smoke() {
        assert_eq!(Flag::parse("\\Seen"), Flag::Seen);
        assert_eq!(
            Flag::parse("custom"),
            Flag::Keyword("custom".to_string())
        );
    }

    #[test]
    fn sequence_smoke() {
        assert_eq!(SequenceSet::range(1, 10).unwrap().to_string(), "1:10");
        assert_eq!(UidSet::All.to_string(), "*");
    }

    #[test]
    fn mailbox_attribute_smoke() {
        assert_eq!(
            MailboxAttribute::parse("\\HasChildren"),
            MailboxAttribute::HasChildren
        );
        assert_eq!(MailboxAttribute::parse("\\Trash"), MailboxAttribute::Trash);
    }
}
