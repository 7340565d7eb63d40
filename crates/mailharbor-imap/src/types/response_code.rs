//! Response codes carried inside `[...]` on status responses.

use super::{Capability, Flags, ModSeq, SeqNum, Uid, UidSet, UidValidity};

/// Response code from a tagged or untagged status response.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseCode {
    /// ALERT: human-readable message that must be shown to the user.
    Alert,
    /// BADCHARSET: the requested search charset is not supported.
    BadCharset,
    /// CAPABILITY listing embedded in a status response.
    Capability(Vec<Capability>),
    /// PARSE: the server had trouble parsing a message.
    Parse,
    /// PERMANENTFLAGS: flags that can be stored permanently.
    PermanentFlags {
        /// The flags (and keywords) that persist.
        flags: Flags,
        /// True when `\*` was present: new keywords may be created.
        accepts_new_keywords: bool,
    },
    /// READ-ONLY: mailbox selected read-only.
    ReadOnly,
    /// READ-WRITE: mailbox selected read-write.
    ReadWrite,
    /// TRYCREATE: target mailbox does not exist but may be created.
    TryCreate,
    /// UIDNEXT prediction for the mailbox.
    UidNext(Uid),
    /// UIDVALIDITY epoch of the mailbox.
    UidValidity(UidValidity),
    /// UNSEEN: sequence number of the first unseen message.
    Unseen(SeqNum),
    /// APPENDUID: validity and UID(s) assigned by APPEND (RFC 4315).
    AppendUid {
        /// UIDVALIDITY of the destination mailbox.
        validity: UidValidity,
        /// Assigned UIDs, one per appended message.
        uids: UidSet,
    },
    /// COPYUID: source/destination UIDs of a COPY or MOVE (RFC 4315).
    CopyUid {
        /// UIDVALIDITY of the destination mailbox.
        validity: UidValidity,
        /// Source UIDs, in destination order.
        source: UidSet,
        /// Destination UIDs, in the same order.
        dest: UidSet,
    },
    /// HIGHESTMODSEQ of the mailbox (RFC 7162).
    HighestModSeq(ModSeq),
    /// NOMODSEQ: the mailbox does not support mod-sequences.
    NoModSeq,
    /// MODIFIED: messages skipped by a conditional STORE (RFC 7162).
    Modified(UidSet),
    /// CLOSED: the previously selected mailbox is now closed (RFC 7162).
    Closed,
    /// MAILBOXID: stable mailbox identifier (RFC 8474).
    MailboxId(String),
    /// A response code this client does not model.
    Unknown(String),
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::Flag;

    #[test]
    fn permanent_flags_keyword_bit() {
        let code = ResponseCode::PermanentFlags {
            flags: Flags::from_vec(vec![Flag::Seen, Flag::Deleted]),
            accepts_new_keywords: true,
        };
        if let ResponseCode::PermanentFlags {
            flags,
            accepts_new_keywords,
        } = code
        {
            assert_eq!(flags.len(), 2);
            assert!(accepts_new_keywords);
        } else {
            panic!("expected PermanentFlags");
        }
    }

    #[test]
    fn copy_uid_shape() {
        let code = ResponseCode::CopyUid {
            validity: UidValidity::new(99).unwrap(),
            source: UidSet::parse("1:3").unwrap(),
            dest: UidSet::parse("11:13").unwrap(),
        };
        if let ResponseCode::CopyUid { source, dest, .. } = code {
            assert_eq!(source.expand().unwrap().len(), 3);
            assert_eq!(dest.expand().unwrap().len(), 3);
        } else {
            panic!("expected CopyUid");
        }
    }

    #[test]
    fn modified_carries_skipped_set() {
        let code = ResponseCode::Modified(UidSet::parse("5,9").unwrap());
        assert!(matches!(code, ResponseCode::Modified(_)));
    }
}
