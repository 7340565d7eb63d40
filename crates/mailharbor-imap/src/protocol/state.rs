//! Session state machine states.
//!
//! ```text
//! Connecting → NotAuthenticated → Authenticated ⇄ Selected
//!                    │                   │
//!                    └────── Logout ←────┘
//!                              │
//!                            Closed
//! ```
//!
//! A PREAUTH greeting jumps straight from `Connecting` to
//! `Authenticated`; a BYE from any state forces `Closed`.

/// Protocol state of one session.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ProtocolState {
    /// Transport established, greeting not yet consumed.
    #[default]
    Connecting,
    /// Greeting consumed; only CAPABILITY, NOOP, LOGOUT, STARTTLS,
    /// AUTHENTICATE, and LOGIN are valid.
    NotAuthenticated,
    /// Authenticated; mailbox management commands become valid.
    Authenticated,
    /// A mailbox is open. Exactly one mailbox is selected at a time;
    /// selecting another replaces it.
    Selected(SelectedState),
    /// LOGOUT issued, awaiting BYE and the tagged completion.
    Logout,
    /// Connection over, by LOGOUT, BYE, or a fatal error.
    Closed,
}

impl ProtocolState {
    /// Returns true once the greeting has been consumed.
    #[must_use]
    pub const fn is_connected(&self) -> bool {
        !matches!(self, Self::Connecting | Self::Closed)
    }

    /// Returns true if authenticated (including selected).
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated | Self::Selected(_))
    }

    /// Returns true if a mailbox is selected.
    #[must_use]
    pub const fn is_selected(&self) -> bool {
        matches!(self, Self::Selected(_))
    }

    /// Returns the selected mailbox name, if any.
    #[must_use]
    pub fn selected_mailbox(&self) -> Option<&str> {
        match self {
            Self::Selected(state) => Some(&state.mailbox),
            _ => None,
        }
    }

    /// Returns true if the selected mailbox is read-only.
    #[must_use]
    pub const fn is_read_only(&self) -> bool {
        match self {
            Self::Selected(state) => state.read_only,
            _ => false,
        }
    }
}

/// State carried while a mailbox is selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedState {
    /// Name of the selected mailbox.
    pub mailbox: String,
    /// Whether it was opened via EXAMINE (or demoted to read-only).
    pub read_only: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selected(read_only: bool) -> ProtocolState {
        ProtocolState::Selected(SelectedState {
            mailbox: "INBOX".to_string(),
            read_only,
        })
    }

    #[test]
    fn default_is_connecting() {
        assert_eq!(ProtocolState::default(), ProtocolState::Connecting);
        assert!(!ProtocolState::Connecting.is_connected());
    }

    #[test]
    fn authenticated_classification() {
        assert!(!ProtocolState::NotAuthenticated.is_authenticated());
        assert!(ProtocolState::Authenticated.is_authenticated());
        assert!(selected(false).is_authenticated());
        assert!(!ProtocolState::Logout.is_authenticated());
        assert!(!ProtocolState::Closed.is_authenticated());
    }

    #[test]
    fn selected_accessors() {
        assert_eq!(selected(true).selected_mailbox(), Some("INBOX"));
        assert!(selected(true).is_read_only());
        assert!(!selected(false).is_read_only());
        assert_eq!(ProtocolState::Authenticated.selected_mailbox(), None);
    }
}
