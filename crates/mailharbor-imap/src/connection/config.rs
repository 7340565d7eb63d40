//! Connection configuration.

use std::time::Duration;

/// Transport security mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Security {
    /// No encryption (port 143). Only for testing.
    None,
    /// Plaintext upgraded via STARTTLS (port 143).
    StartTls,
    /// TLS from the first byte (port 993).
    #[default]
    Implicit,
}

impl Security {
    /// Returns the default port for this mode.
    #[must_use]
    pub const fn default_port(self) -> u16 {
        match self {
            Self::None | Self::StartTls => 143,
            Self::Implicit => 993,
        }
    }
}

/// IMAP connection configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server hostname.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Security mode.
    pub security: Security,
    /// Connection establishment timeout.
    pub connect_timeout: Duration,
    /// Per-operation read/write timeout. A read timeout is terminal for
    /// the session.
    pub io_timeout: Duration,
}

impl Config {
    /// Creates a configuration with implicit TLS on port 993.
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: Security::Implicit.default_port(),
            security: Security::Implicit,
            connect_timeout: Duration::from_secs(30),
            io_timeout: Duration::from_secs(60),
        }
    }

    /// Starts a builder for the given host.
    #[must_use]
    pub fn builder(host: impl Into<String>) -> ConfigBuilder {
        ConfigBuilder::new(host)
    }
}

/// Builder for [`Config`].
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    host: String,
    port: Option<u16>,
    security: Security,
    connect_timeout: Duration,
    io_timeout: Duration,
}

impl ConfigBuilder {
    /// Creates a builder with defaults for the given host.
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: None,
            security: Security::Implicit,
            connect_timeout: Duration::from_secs(30),
            io_timeout: Duration::from_secs(60),
        }
    }

    /// Overrides the port.
    #[must_use]
    pub const fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Sets the security mode.
    #[must_use]
    pub const fn security(mut self, security: Security) -> Self {
        self.security = security;
        self
    }

    /// Sets the connect timeout.
    #[must_use]
    pub const fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the I/O timeout.
    #[must_use]
    pub const fn io_timeout(mut self, timeout: Duration) -> Self {
        self.io_timeout = timeout;
        self
    }

    /// Builds the configuration.
    #[must_use]
    pub fn build(self) -> Config {
        let port = self.port.unwrap_or_else(|| self.security.default_port());
        Config {
            host: self.host,
            port,
            security: self.security,
            connect_timeout: self.connect_timeout,
            io_timeout: self.io_timeout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_ports() {
        assert_eq!(Security::Implicit.default_port(), 993);
        assert_eq!(Security::StartTls.default_port(), 143);
        assert_eq!(Security::None.default_port(), 143);
    }

    #[test]
    fn builder_defaults_port_from_security() {
        let config = Config::builder("imap.example.com")
            .security(Security::StartTls)
            .build();
        assert_eq!(config.port, 143);

        let config = Config::builder("imap.example.com").port(1993).build();
        assert_eq!(config.port, 1993);
    }
}
