//! Commands valid before authentication.

use tokio::io::{AsyncRead, AsyncWrite};

use super::states::{Authenticated, NotAuthenticated};
use super::{Client, CommandOutcome};
use crate::authenticator::{Authenticator, decode_challenge, encode_sasl};
use crate::command::{Command, TagGenerator};
use crate::connection::framed::FramedStream;
use crate::connection::stream::ImapStream;
use crate::parser::{Response, ResponseParser, UntaggedResponse};
use crate::types::{Capability, ResponseCode, Status};
use crate::{Error, Result};

/// Outcome of consuming the server greeting.
///
/// A `PREAUTH` greeting lands the session directly in the authenticated
/// state; `OK` requires credentials; `BYE` never constructs a client.
pub enum ClientGreeting<S> {
    /// Ordinary greeting; authentication required.
    NotAuthenticated(Client<S, NotAuthenticated>),
    /// Pre-authenticated connection.
    PreAuthenticated(Client<S, Authenticated>),
}

impl<S> Client<S, NotAuthenticated>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Consumes the greeting on a fresh transport stream.
    pub async fn from_stream(stream: S) -> Result<ClientGreeting<S>> {
        let mut framed = FramedStream::new(stream);

        let raw = framed.read_response().await?;
        let response = ResponseParser::parse(&raw)?;

        let (preauth, capabilities, greeting) = match response {
            Response::Untagged(UntaggedResponse::Ok { code, text }) => {
                (false, greeting_caps(code), text)
            }
            Response::Untagged(UntaggedResponse::PreAuth { code, text }) => {
                (true, greeting_caps(code), text)
            }
            Response::Untagged(UntaggedResponse::Bye { text, .. }) => {
                return Err(Error::Bye(text));
            }
            other => {
                return Err(Error::Protocol(format!(
                    "unexpected greeting: {other:?}"
                )));
            }
        };

        let client = Client {
            stream: framed,
            tag_gen: TagGenerator::default(),
            capabilities,
            enabled: Vec::new(),
            greeting: Some(greeting),
            state: NotAuthenticated,
        };

        if preauth {
            Ok(ClientGreeting::PreAuthenticated(
                client.transition(Authenticated),
            ))
        } else {
            Ok(ClientGreeting::NotAuthenticated(client))
        }
    }

    /// Authenticates with LOGIN.
    ///
    /// Refused client-side when the server advertises LOGINDISABLED.
    pub async fn login(
        mut self,
        username: &str,
        password: &str,
    ) -> Result<Client<S, Authenticated>> {
        if self.has_capability(&Capability::LoginDisabled) {
            return Err(Error::Auth("LOGIN is disabled by the server".to_string()));
        }

        let outcome = self
            .execute(&Command::Login {
                username: username.to_string(),
                password: password.to_string(),
            })
            .await?;
        let outcome = check_auth(outcome)?;
        self.post_auth_capabilities(&outcome);

        Ok(self.transition(Authenticated))
    }

    /// Authenticates with a SASL mechanism.
    ///
    /// The engine handles base64 framing and continuation pacing; the
    /// mechanism produces opaque response tokens. With SASL-IR the first
    /// response travels on the command line.
    pub async fn authenticate<A: Authenticator>(
        mut self,
        authenticator: &mut A,
    ) -> Result<Client<S, Authenticated>> {
        let mechanism = authenticator.mechanism().to_string();
        if !self
            .capabilities
            .iter()
            .any(|c| matches!(c, Capability::Auth(m) if m.eq_ignore_ascii_case(&mechanism)))
            && !self.capabilities.is_empty()
        {
            return Err(Error::Unsupported(format!("AUTH={mechanism}")));
        }

        let initial_response = if self.has_capability(&Capability::SaslIr) {
            let first = authenticator.respond(b"");
            Some(encode_sasl(first.as_ref()))
        } else {
            None
        };

        let tag = self.tag_gen.next();
        let line = Command::Authenticate {
            mechanism,
            initial_response,
        }
        .serialize(&tag);
        self.stream.write_command(&line).await?;

        // Challenge/response loop until the tagged completion.
        let mut untagged = Vec::new();
        let outcome = loop {
            let raw = self.stream.read_response().await?;
            match ResponseParser::parse(&raw)? {
                Response::Continuation { text } => {
                    let challenge = decode_challenge(text.as_deref().unwrap_or(""));
                    let response = authenticator.respond(&challenge);
                    let mut line = encode_sasl(response.as_ref()).into_bytes();
                    line.extend_from_slice(b"\r\n");
                    self.stream.write_command(&line).await?;
                }
                Response::Untagged(resp) => untagged.push(resp),
                Response::Tagged {
                    tag: resp_tag,
                    status,
                    code,
                    text,
                } => {
                    if resp_tag.as_str() != tag {
                        return Err(Error::Protocol(format!(
                            "completion for foreign tag {resp_tag}"
                        )));
                    }
                    break CommandOutcome {
                        status,
                        code,
                        text,
                        untagged,
                    };
                }
            }
        };

        let outcome = check_auth(outcome)?;
        self.post_auth_capabilities(&outcome);

        Ok(self.transition(Authenticated))
    }

    /// Pre-authentication capability lists are stale once authenticated;
    /// keep whatever the completion carried, otherwise force a re-query.
    fn post_auth_capabilities(&mut self, outcome: &CommandOutcome) {
        let delivered = matches!(outcome.code, Some(ResponseCode::Capability(_)))
            || outcome
                .untagged
                .iter()
                .any(|r| matches!(r, UntaggedResponse::Capability(_)));
        if !delivered {
            self.capabilities.clear();
        }
    }
}

impl Client<ImapStream, NotAuthenticated> {
    /// Upgrades the connection with STARTTLS.
    ///
    /// Capabilities advertised before the upgrade are discarded; they
    /// must be re-queried on the encrypted channel.
    pub async fn starttls(mut self, host: &str) -> Result<Self> {
        self.require_capability(&Capability::StartTls)?;

        let _ = self.execute(&Command::StartTls).await?.check()?;

        let plain = self.stream.into_inner();
        let tls = plain.upgrade_to_tls(host).await?;

        Ok(Self {
            stream: FramedStream::new(tls),
            tag_gen: self.tag_gen,
            capabilities: Vec::new(),
            enabled: self.enabled,
            greeting: self.greeting,
            state: NotAuthenticated,
        })
    }
}

fn greeting_caps(code: Option<ResponseCode>) -> Vec<Capability> {
    match code {
        Some(ResponseCode::Capability(caps)) => caps,
        _ => Vec::new(),
    }
}

fn check_auth(outcome: CommandOutcome) -> Result<CommandOutcome> {
    match outcome.status {
        Status::Ok | Status::PreAuth => Ok(outcome),
        Status::No => Err(Error::Auth(outcome.text)),
        Status::Bad => Err(Error::Bad(outcome.text)),
        Status::Bye => Err(Error::Bye(outcome.text)),
    }
}
