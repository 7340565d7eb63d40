//! Quick resynchronization state (CONDSTORE/QRESYNC, RFC 7162).
//!
//! A client that remembers a folder's UIDVALIDITY, HIGHESTMODSEQ, and
//! known UIDs can reopen it and receive only the deltas: VANISHED for
//! expunged messages and FETCH for changed ones.

use crate::types::{ModSeq, UidSet, UidValidity};

/// Folder state captured for a later quick resync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncState {
    /// The UIDVALIDITY when the state was captured. If it has changed by
    /// reopen time, the server ignores the resync parameters and the
    /// cache must be discarded.
    pub uid_validity: UidValidity,
    /// The HIGHESTMODSEQ when the state was captured.
    pub highest_mod_seq: ModSeq,
    /// UIDs known at capture time; lets the server report VANISHED
    /// (EARLIER) precisely.
    pub known_uids: Option<UidSet>,
}

impl SyncState {
    /// Captures a sync state.
    #[must_use]
    pub fn new(uid_validity: UidValidity, highest_mod_seq: ModSeq) -> Self {
        Self {
            uid_validity,
            highest_mod_seq,
            known_uids: None,
        }
    }

    /// Attaches the known UID set.
    #[must_use]
    pub fn with_known_uids(mut self, uids: UidSet) -> Self {
        self.known_uids = Some(uids);
        self
    }

    /// Builds the SELECT/EXAMINE parameter for this state.
    #[must_use]
    pub fn to_params(&self) -> QresyncParams {
        QresyncParams {
            uid_validity: self.uid_validity,
            mod_seq: self.highest_mod_seq,
            known_uids: self.known_uids.clone(),
        }
    }
}

/// The QRESYNC parameter of SELECT/EXAMINE.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QresyncParams {
    /// Last known UIDVALIDITY.
    pub uid_validity: UidValidity,
    /// Last known HIGHESTMODSEQ.
    pub mod_seq: ModSeq,
    /// Optional known UIDs.
    pub known_uids: Option<UidSet>,
}

impl QresyncParams {
    /// Serializes to the wire form, e.g. `(QRESYNC (1234 500 1:10))`.
    #[must_use]
    pub fn to_wire(&self) -> String {
        match &self.known_uids {
            Some(uids) => format!(
                "(QRESYNC ({} {} {uids}))",
                self.uid_validity, self.mod_seq
            ),
            None => format!("(QRESYNC ({} {}))", self.uid_validity, self.mod_seq),
        }
    }
}
