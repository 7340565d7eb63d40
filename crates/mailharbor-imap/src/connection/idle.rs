//! IDLE support (RFC 2177).
//!
//! IDLE parks the connection so the server can stream untagged updates.
//! Cancellation is cooperative: the caller writes `DONE` and waits for
//! the normal tagged completion, after which the session remains in the
//! selected state. This is the one command IMAP can abort selectively.

#![allow(clippy::missing_errors_doc)]

use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::time::timeout;

use super::client::{Client, Selected};
use super::framed::FramedStream;
use crate::command::Command;
use crate::parser::{FetchItem, Response, ResponseParser, UntaggedResponse};
use crate::types::{SeqNum, Status, UidSet};
use crate::{Error, Result};

/// Event received while idling.
#[derive(Debug, Clone, PartialEq)]
pub enum IdleEvent {
    /// New message count (EXISTS).
    Exists(u32),
    /// Recent count changed.
    Recent(u32),
    /// A message was expunged.
    Expunge(SeqNum),
    /// Messages vanished (QRESYNC).
    Vanished {
        /// Whether this was an EARLIER report.
        earlier: bool,
        /// The vanished UIDs.
        uids: UidSet,
    },
    /// Message metadata changed.
    Fetch {
        /// Message sequence number.
        seq: SeqNum,
        /// The changed items.
        items: Vec<FetchItem>,
    },
    /// An untagged response with no folder-state meaning arrived, such
    /// as a `* OK Still here` keepalive. Keep waiting.
    Ignored,
    /// The server terminated the IDLE itself with the tagged
    /// completion. The IDLE is over; do not send DONE.
    Ended,
    /// The wait deadline passed without an event.
    Timeout,
}

/// Handle for an active IDLE.
///
/// Wait for events with [`IdleHandle::wait`]; leave IDLE with
/// [`IdleHandle::done`]. Dropping the handle without `done` leaves the
/// connection parked, which the next command would trip over.
pub struct IdleHandle<'a, S> {
    stream: &'a mut FramedStream<S>,
    tag: String,
}

impl<'a, S> IdleHandle<'a, S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub(crate) const fn new(stream: &'a mut FramedStream<S>, tag: String) -> Self {
        Self { stream, tag }
    }

    /// Waits for a server event or the deadline.
    ///
    /// [`IdleEvent::Ignored`] means an untagged response arrived that
    /// carries no folder state (keepalives and the like): keep
    /// waiting. [`IdleEvent::Ended`] means the server completed the
    /// IDLE on its own: stop waiting and skip [`IdleHandle::done`].
    ///
    /// Servers drop idle connections on their own schedule; re-issue
    /// IDLE before 29 minutes (10 for Gmail, see the quirks table).
    pub async fn wait(&mut self, deadline: Duration) -> Result<IdleEvent> {
        match timeout(deadline, self.stream.read_response()).await {
            Ok(Ok(response)) => self.parse_event(&response),
            Ok(Err(e)) => Err(e),
            Err(_) => Ok(IdleEvent::Timeout),
        }
    }

    fn parse_event(&self, response: &[u8]) -> Result<IdleEvent> {
        match ResponseParser::parse(response)? {
            Response::Untagged(untagged) => match untagged {
                UntaggedResponse::Exists(n) => Ok(IdleEvent::Exists(n)),
                UntaggedResponse::Recent(n) => Ok(IdleEvent::Recent(n)),
                UntaggedResponse::Expunge(seq) => Ok(IdleEvent::Expunge(seq)),
                UntaggedResponse::Vanished { earlier, uids } => {
                    Ok(IdleEvent::Vanished { earlier, uids })
                }
                UntaggedResponse::Fetch { seq, items } => Ok(IdleEvent::Fetch { seq, items }),
                UntaggedResponse::Bye { text, .. } => Err(Error::Bye(text)),
                other => {
                    tracing::debug!(?other, "ignored untagged response during IDLE");
                    Ok(IdleEvent::Ignored)
                }
            },
            Response::Continuation { .. } => Err(Error::Protocol(
                "unexpected continuation during IDLE".to_string(),
            )),
            Response::Tagged {
                tag, status, text, ..
            } => {
                if tag.as_str() == self.tag {
                    match status {
                        // Unusual but valid: the server ended the IDLE.
                        Status::Ok => Ok(IdleEvent::Ended),
                        Status::No => Err(Error::No(text)),
                        Status::Bad => Err(Error::Bad(text)),
                        Status::Bye => Err(Error::Bye(text)),
                        Status::PreAuth => {
                            Err(Error::Protocol("unexpected PREAUTH during IDLE".to_string()))
                        }
                    }
                } else {
                    Err(Error::Protocol(format!(
                        "completion for foreign tag {tag} during IDLE"
                    )))
                }
            }
        }
    }

    /// Writes DONE and waits for the tagged completion.
    pub async fn done(self) -> Result<()> {
        let line = Command::Done.serialize("");
        self.stream.write_command(&line).await?;

        loop {
            let response = self.stream.read_response().await?;
            if let Ok(Response::Tagged {
                tag, status, text, ..
            }) = ResponseParser::parse(&response)
                && tag.as_str() == self.tag
            {
                return match status {
                    Status::Ok => Ok(()),
                    Status::No => Err(Error::No(text)),
                    Status::Bad => Err(Error::Bad(text)),
                    Status::Bye => Err(Error::Bye(text)),
                    Status::PreAuth => {
                        Err(Error::Protocol("unexpected PREAUTH after DONE".to_string()))
                    }
                };
            }
            // Untagged responses may still arrive before the completion.
        }
    }
}

impl<S> Client<S, Selected>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Enters IDLE, returning a handle to wait on.
    ///
    /// Check `IDLE` capability support first; the server answers the
    /// command with a continuation before updates start flowing.
    pub async fn idle(&mut self) -> Result<IdleHandle<'_, S>> {
        self.require_capability(&crate::types::Capability::Idle)?;

        let tag = self.tag_gen.next();
        let line = Command::Idle.serialize(&tag);
        self.stream.write_command(&line).await?;

        loop {
            let response = self.stream.read_response().await?;
            match ResponseParser::parse(&response)? {
                Response::Continuation { .. } => break,
                Response::Untagged(resp) => {
                    tracing::debug!(?resp, "untagged response before IDLE acknowledgement");
                }
                Response::Tagged { status, text, .. } => {
                    return match status {
                        Status::No => Err(Error::No(text)),
                        Status::Bad => Err(Error::Bad(text)),
                        _ => Err(Error::Protocol("unexpected completion of IDLE".to_string())),
                    };
                }
            }
        }

        Ok(IdleHandle::new(&mut self.stream, tag))
    }
}
