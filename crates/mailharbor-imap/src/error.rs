//! Error types for the IMAP engine.
//!
//! The taxonomy distinguishes failures that are local to one operation
//! (tagged NO, capability gates, bad arguments) from failures that end the
//! session (protocol violations, tagged BAD, BYE, transport faults).

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur during IMAP operations.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error during network operations. Session-fatal.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TLS handshake or encryption error. Session-fatal.
    #[error("TLS error: {0}")]
    Tls(#[from] rustls::Error),

    /// Invalid DNS name for TLS.
    #[error("Invalid DNS name: {0}")]
    InvalidDnsName(#[from] rustls::pki_types::InvalidDnsNameError),

    /// Malformed wire data. Treated as a protocol violation (session-fatal).
    #[error("Parse error at position {position}: {message}")]
    Parse {
        /// Byte position where the error occurred.
        position: usize,
        /// Description of what went wrong.
        message: String,
    },

    /// Protocol violation: unexpected tagged state, tag mismatch, a
    /// UIDVALIDITY decrement on an open folder. Session-fatal.
    #[error("Protocol violation: {0}")]
    Protocol(String),

    /// Server refused the operation (tagged NO). The session continues.
    #[error("Server returned NO: {0}")]
    No(String),

    /// Server rejected the command as malformed (tagged BAD). Treated as a
    /// client-side bug; session-fatal.
    #[error("Server returned BAD: {0}")]
    Bad(String),

    /// Server-initiated shutdown (BYE). Fatal but expected.
    #[error("Server sent BYE: {0}")]
    Bye(String),

    /// Authentication failed.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Operation exceeded its deadline. Session-fatal for reads.
    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),

    /// Connection was lost, or a prior operation was cancelled after bytes
    /// were placed on the wire.
    #[error("Connection lost: {0}")]
    ConnectionLost(String),

    /// The operation is invalid in the current session state.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// The server does not advertise a capability the operation requires.
    /// Fails client-side before any wire traffic.
    #[error("Capability not available: {0}")]
    Unsupported(String),

    /// Invalid caller input (empty name, zero index, mismatched UID
    /// validity). Fails before any wire traffic.
    #[error("Invalid argument: {0}")]
    Argument(String),

    /// The message exceeds the destination folder's advertised APPENDLIMIT.
    /// Fails client-side before any wire traffic.
    #[error("Message of {size} bytes exceeds append limit of {limit} bytes")]
    AppendLimitExceeded {
        /// The folder's advertised limit.
        limit: u32,
        /// The size of the rejected message.
        size: usize,
    },

    /// Command failed with context.
    #[error("{command} failed: {source}")]
    Command {
        /// The command that was being executed.
        command: CommandContext,
        /// The underlying error.
        #[source]
        source: Box<Self>,
    },
}

impl Error {
    /// Wraps this error with command context.
    #[must_use]
    pub fn with_command(self, command: impl Into<CommandContext>) -> Self {
        Self::Command {
            command: command.into(),
            source: Box::new(self),
        }
    }

    /// Returns true if retrying on a fresh connection may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Io(_) | Self::Timeout(_) | Self::ConnectionLost(_) | Self::Bye(_) => true,
            Self::Command { source, .. } => source.is_retryable(),
            _ => false,
        }
    }

    /// Returns true if this error ends the session.
    ///
    /// Tagged NO, capability gates, and argument errors leave the session
    /// usable; everything else tears it down.
    #[must_use]
    pub fn is_session_fatal(&self) -> bool {
        match self {
            Self::No(_)
            | Self::Unsupported(_)
            | Self::Argument(_)
            | Self::AppendLimitExceeded { .. }
            | Self::InvalidState(_) => false,
            Self::Command { source, .. } => source.is_session_fatal(),
            _ => true,
        }
    }

    /// Returns true if this is an authentication error.
    #[must_use]
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Self::Auth(_))
            || matches!(self, Self::No(text) if text.to_lowercase().contains("auth"))
    }
}

/// Context about which command failed.
#[derive(Debug, Clone)]
pub struct CommandContext {
    /// The command name (e.g., "SELECT", "UID FETCH").
    pub name: String,
    /// Optional argument (e.g., mailbox name for SELECT).
    pub arg: Option<String>,
}

impl CommandContext {
    /// Creates a new command context.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arg: None,
        }
    }

    /// Adds an argument to the context.
    #[must_use]
    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.arg = Some(arg.into());
        self
    }
}

impl std::fmt::Display for CommandContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)?;
        if let Some(ref arg) = self.arg {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

impl From<&str> for CommandContext {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for CommandContext {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Wraps the error with command context.
    ///
    /// # Errors
    ///
    /// Returns the original error wrapped with command context.
    fn with_command(self, command: impl Into<CommandContext>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn with_command(self, command: impl Into<CommandContext>) -> Self {
        self.map_err(|e| e.with_command(command))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_is_local() {
        let err = Error::No("over quota".into());
        assert!(!err.is_session_fatal());
        assert!(!err.is_retryable());
    }

    #[test]
    fn bad_is_fatal() {
        assert!(Error::Bad("syntax".into()).is_session_fatal());
    }

    #[test]
    fn bye_is_retryable() {
        let err = Error::Bye("shutting down".into());
        assert!(err.is_session_fatal());
        assert!(err.is_retryable());
    }

    #[test]
    fn command_context_propagates_classification() {
        let err = Error::No("denied".into()).with_command("STORE");
        assert!(!err.is_session_fatal());
        assert_eq!(err.to_string(), "STORE failed: Server returned NO: denied");
    }

    #[test]
    fn append_limit_is_local() {
        let err = Error::AppendLimitExceeded {
            limit: 1024,
            size: 2048,
        };
        assert!(!err.is_session_fatal());
    }

    #[test]
    fn auth_detection() {
        assert!(Error::Auth("bad password".into()).is_auth_error());
        assert!(Error::No("[AUTHENTICATIONFAILED] nope".into()).is_auth_error());
        assert!(!Error::No("mailbox missing".into()).is_auth_error());
    }
}
