//! Pluggable SASL authentication.
//!
//! The engine drives the AUTHENTICATE exchange (base64 framing,
//! continuation pacing) but delegates mechanism logic to an
//! [`Authenticator`]: given a decoded server challenge, it produces the
//! raw client response. Mechanism internals stay outside the engine.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;

/// A SASL mechanism implementation.
pub trait Authenticator {
    /// The raw response bytes for one challenge.
    type Response: AsRef<[u8]>;

    /// The SASL mechanism name, e.g. `PLAIN` or `XOAUTH2`.
    fn mechanism(&self) -> &str;

    /// Produces the client response to a decoded server challenge.
    ///
    /// The first call receives an empty challenge for mechanisms with a
    /// client-initial response.
    fn respond(&mut self, challenge: &[u8]) -> Self::Response;
}

/// SASL PLAIN (RFC 4616): `\0user\0password` in one shot.
#[derive(Debug, Clone)]
pub struct PlainAuthenticator {
    user: String,
    password: String,
}

impl PlainAuthenticator {
    /// Creates a PLAIN authenticator for the given credentials.
    #[must_use]
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
        }
    }
}

impl Authenticator for PlainAuthenticator {
    type Response = Vec<u8>;

    fn mechanism(&self) -> &str {
        "PLAIN"
    }

    fn respond(&mut self, _challenge: &[u8]) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.user.len() + self.password.len() + 2);
        out.push(0);
        out.extend_from_slice(self.user.as_bytes());
        out.push(0);
        out.extend_from_slice(self.password.as_bytes());
        out
    }
}

/// XOAUTH2 (Google/Microsoft OAuth bearer tokens).
#[derive(Debug, Clone)]
pub struct XOAuth2Authenticator {
    user: String,
    access_token: String,
}

impl XOAuth2Authenticator {
    /// Creates an XOAUTH2 authenticator.
    #[must_use]
    pub fn new(user: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            access_token: access_token.into(),
        }
    }
}

impl Authenticator for XOAuth2Authenticator {
    type Response = String;

    fn mechanism(&self) -> &str {
        "XOAUTH2"
    }

    fn respond(&mut self, challenge: &[u8]) -> String {
        // A non-empty challenge is an error report; the protocol answer
        // is an empty line, after which the tagged NO arrives.
        if challenge.is_empty() {
            format!(
                "user={}\x01auth=Bearer {}\x01\x01",
                self.user, self.access_token
            )
        } else {
            String::new()
        }
    }
}

/// Encodes a SASL response for the wire.
#[must_use]
pub fn encode_sasl(data: &[u8]) -> String {
    if data.is_empty() {
        // An empty response is transmitted as a bare "=" per RFC 4959,
        // but inside the exchange an empty line is also accepted; use
        // the empty line form which every server handles.
        String::new()
    } else {
        BASE64.encode(data)
    }
}

/// Decodes a base64 server challenge; malformed input yields the raw
/// bytes so the mechanism can decide.
#[must_use]
pub fn decode_challenge(text: &str) -> Vec<u8> {
    BASE64
        .decode(text.trim())
        .unwrap_or_else(|_| text.as_bytes().to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_response_shape() {
        let mut auth = PlainAuthenticator::new("jo", "secret");
        assert_eq!(auth.mechanism(), "PLAIN");
        assert_eq!(auth.respond(b""), b"\0jo\0secret");
    }

    #[test]
    fn xoauth2_initial_response() {
        let mut auth = XOAuth2Authenticator::new("jo@example.com", "tok123");
        let resp = auth.respond(b"");
        assert_eq!(resp, "user=jo@example.com\x01auth=Bearer tok123\x01\x01");
    }

    #[test]
    fn xoauth2_error_challenge_gets_empty_reply() {
        let mut auth = XOAuth2Authenticator::new("jo@example.com", "tok123");
        let resp = auth.respond(br#"{"status":"400"}"#);
        assert!(resp.is_empty());
    }

    #[test]
    fn sasl_round_trip() {
        let encoded = encode_sasl(b"\0jo\0secret");
        assert_eq!(decode_challenge(&encoded), b"\0jo\0secret");
    }

    #[test]
    fn malformed_challenge_passes_through() {
        assert_eq!(decode_challenge("not base64!!"), b"not base64!!");
    }
}
