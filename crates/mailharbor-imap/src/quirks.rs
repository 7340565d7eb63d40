//! Server detection and workarounds.
//!
//! Servers interpret the RFCs unevenly. Detection keys off capabilities
//! and the greeting text; the derived quirks adjust IDLE refresh
//! cadence, INBOX normalization, and which extensions to trust.

use crate::types::Capability;

/// Known IMAP server families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ServerType {
    /// Unknown or generic server.
    #[default]
    Unknown,
    /// Gmail (imap.gmail.com).
    Gmail,
    /// Microsoft Outlook / Office 365.
    Outlook,
    /// Yahoo Mail.
    Yahoo,
    /// Apple iCloud.
    ICloud,
    /// Fastmail.
    Fastmail,
    /// Dovecot.
    Dovecot,
    /// Courier.
    Courier,
    /// Cyrus.
    Cyrus,
}

impl ServerType {
    /// Detects the server family from capabilities and the greeting.
    #[must_use]
    pub fn detect(capabilities: &[Capability], greeting: Option<&str>) -> Self {
        if capabilities.contains(&Capability::GmailExt1) {
            return Self::Gmail;
        }
        for cap in capabilities {
            if let Capability::Unknown(s) = cap {
                let upper = s.to_uppercase();
                if upper.starts_with("X-GM-") {
                    return Self::Gmail;
                }
                if upper.contains("XYMHIGHESTMODSEQ") {
                    return Self::Yahoo;
                }
            }
        }

        if let Some(greeting) = greeting {
            let lower = greeting.to_lowercase();
            if lower.contains("gimap") || lower.contains("gmail") {
                return Self::Gmail;
            }
            if lower.contains("outlook") || lower.contains("microsoft") {
                return Self::Outlook;
            }
            if lower.contains("dovecot") {
                return Self::Dovecot;
            }
            if lower.contains("courier") {
                return Self::Courier;
            }
            if lower.contains("cyrus") {
                return Self::Cyrus;
            }
            if lower.contains("fastmail") {
                return Self::Fastmail;
            }
            if lower.contains("icloud") || lower.contains("apple") {
                return Self::ICloud;
            }
        }

        Self::Unknown
    }
}

/// Derived server-specific behavior adjustments.
#[derive(Debug, Clone, Default)]
pub struct ServerQuirks {
    /// The detected family.
    pub server_type: ServerType,
    /// Folders are GMail labels; label stores are meaningful.
    pub gmail_labels: bool,
    /// Seconds before IDLE should be refreshed. Gmail times out after
    /// roughly 10 minutes; the RFC allows 29.
    pub idle_timeout_secs: u32,
    /// Non-synchronizing literals are available.
    pub non_sync_literals: bool,
    /// The server implements MOVE natively.
    pub native_move: bool,
    /// The server may reorder untagged responses around completions.
    pub unordered_responses: bool,
}

impl ServerQuirks {
    /// Builds quirks for a detected server and its capabilities.
    #[must_use]
    pub fn for_server(server_type: ServerType, capabilities: &[Capability]) -> Self {
        let non_sync_literals = capabilities
            .iter()
            .any(|c| matches!(c, Capability::LiteralPlus | Capability::LiteralMinus));
        let native_move = capabilities.contains(&Capability::Move);

        let idle_timeout_secs = match server_type {
            ServerType::Gmail => 600,
            ServerType::Yahoo => 840,
            ServerType::Outlook => 1500,
            _ => 1740,
        };

        Self {
            server_type,
            gmail_labels: server_type == ServerType::Gmail,
            idle_timeout_secs,
            non_sync_literals,
            native_move,
            unordered_responses: matches!(server_type, ServerType::Outlook | ServerType::Yahoo),
        }
    }

    /// Normalizes a mailbox name for the wire.
    ///
    /// INBOX is case-insensitive per RFC 3501; some servers only accept
    /// the uppercase spelling.
    #[must_use]
    pub fn normalize_mailbox(&self, name: &str) -> String {
        if name.eq_ignore_ascii_case("INBOX") {
            "INBOX".to_string()
        } else {
            name.to_string()
        }
    }
}
