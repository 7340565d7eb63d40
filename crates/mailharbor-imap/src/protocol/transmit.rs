//! Outbound data units for the sans-I/O protocol core.

/// Bytes the protocol wants written to the transport.
///
/// The I/O layer writes `data` and, when `awaits_continuation` is set,
/// must not dequeue the next transmit until the server has sent a `+`
/// continuation: this is the pacing rule for synchronizing literals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transmit {
    /// Raw bytes to send.
    pub data: Vec<u8>,
    /// True when the tail of `data` is a `{n}` literal prefix and the
    /// payload that follows is gated on a continuation response.
    pub awaits_continuation: bool,
}

impl Transmit {
    /// A plain line transmit.
    #[must_use]
    pub fn line(data: Vec<u8>) -> Self {
        Self {
            data,
            awaits_continuation: false,
        }
    }

    /// A transmit that ends in a synchronizing literal prefix.
    #[must_use]
    pub fn paced(data: Vec<u8>) -> Self {
        Self {
            data,
            awaits_continuation: true,
        }
    }

    /// Returns the length of the data.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if there is nothing to send.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl From<Vec<u8>> for Transmit {
    fn from(data: Vec<u8>) -> Self {
        Self::line(data)
    }
}

impl AsRef<[u8]> for Transmit {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}
