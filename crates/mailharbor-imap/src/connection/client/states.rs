//! Type-state markers for the client connection.

use crate::types::{MailboxName, MailboxStatus};

/// Marker for the not-authenticated state.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotAuthenticated;

/// Marker for the authenticated state.
#[derive(Debug, Clone, Copy, Default)]
pub struct Authenticated;

/// State carried while a mailbox is selected.
#[derive(Debug, Clone)]
pub struct Selected {
    /// Name of the selected mailbox.
    pub(crate) mailbox: MailboxName,
    /// Whether the mailbox was opened via EXAMINE.
    pub(crate) read_only: bool,
    /// Status snapshot assembled from the SELECT/EXAMINE responses.
    pub(crate) status: MailboxStatus,
}

impl Selected {
    pub(crate) fn new(mailbox: MailboxName, read_only: bool, status: MailboxStatus) -> Self {
        Self {
            mailbox,
            read_only,
            status,
        }
    }
}
