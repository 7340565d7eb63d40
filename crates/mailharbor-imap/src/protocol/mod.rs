//! Sans-I/O protocol mirror.
//!
//! A pure state machine over the IMAP session: feed it received bytes
//! with [`Protocol::handle_input`], drain outgoing bytes with
//! [`Protocol::poll_transmit`], and observe [`ProtocolEvent`]s. No I/O
//! happens here, which keeps the session logic deterministic and
//! testable without network mocks.
//!
//! This module is a standalone artifact, not a layer under
//! [`crate::connection`]: the async type-state client drives the wire
//! directly and does not route its traffic through `Protocol`. Both
//! implement the same session rules (tag allocation, capability
//! invalidation across STARTTLS/authentication, untagged data surfaced
//! before the completion that triggered it, literal pacing), and tests
//! assert those rules from both sides. Use `Protocol` when you need the
//! rules without tokio: deterministic tests, fuzzing, or embedding the
//! session in a custom event loop.
//!
//! The machine owns its own tag allocator, in-flight command queue,
//! capability registry, and untagged-response dispatcher. Untagged
//! responses are surfaced (and attached to the in-flight command) before
//! the command's completion event, so observers always see updates in
//! wire-arrival order.

mod state;
mod transmit;

use std::collections::VecDeque;
use std::time::{Duration, Instant};

pub use state::{ProtocolState, SelectedState};
pub use transmit::Transmit;

use crate::command::{Command, TagGenerator, append_header};
use crate::parser::{Response, ResponseParser, UntaggedResponse};
use crate::request::AppendRequest;
use crate::types::{Capability, MailboxName, MailboxStatus, ResponseCode, Status, Tag};
use crate::{Error, Result};

/// IDLE must be refreshed before servers time it out; RFC 2177 allows
/// 29 minutes.
const IDLE_REFRESH: Duration = Duration::from_secs(29 * 60);

/// A handle to a command accepted into the queue.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CommandHandle {
    tag: Tag,
}

impl CommandHandle {
    /// Returns the tag associated with this command.
    #[must_use]
    pub fn tag(&self) -> &Tag {
        &self.tag
    }
}

/// Result of a completed command.
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// Completion status.
    pub status: Status,
    /// Optional response code from the tagged line.
    pub code: Option<ResponseCode>,
    /// Human-readable completion text.
    pub text: String,
    /// Untagged responses collected while the command was in flight.
    pub responses: Vec<UntaggedResponse>,
}

impl CommandResult {
    /// Returns true if the command succeeded.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status.is_ok()
    }

    /// Converts into the collected responses, or the matching error.
    ///
    /// # Errors
    ///
    /// `No` for an operational refusal, `Bad` for a rejected command,
    /// `Bye` when the server is shutting down.
    pub fn into_result(self) -> Result<Vec<UntaggedResponse>> {
        match self.status {
            Status::Ok | Status::PreAuth => Ok(self.responses),
            Status::No => Err(Error::No(self.text)),
            Status::Bad => Err(Error::Bad(self.text)),
            Status::Bye => Err(Error::Bye(self.text)),
        }
    }
}

/// Events produced by the protocol core.
#[derive(Debug)]
pub enum ProtocolEvent {
    /// The server greeting was consumed.
    Greeting {
        /// Greeting status (`Ok`, `PreAuth`, or `Bye`).
        status: Status,
        /// Optional response code (often CAPABILITY).
        code: Option<ResponseCode>,
        /// Greeting text.
        text: String,
    },
    /// An untagged response arrived. Emitted before the completion of
    /// whichever command triggered it.
    Unsolicited(UntaggedResponse),
    /// A command completed.
    CommandComplete {
        /// The handle returned when the command was queued.
        handle: CommandHandle,
        /// The result.
        result: CommandResult,
    },
    /// A continuation request that is not literal pacing (SASL, IDLE).
    Continuation {
        /// Text or challenge after the `+`.
        text: String,
    },
    /// The server closed the session (BYE).
    Disconnected {
        /// BYE text.
        text: String,
    },
}

struct PendingCommand {
    handle: CommandHandle,
    name: &'static str,
    mailbox: Option<String>,
    responses: Vec<UntaggedResponse>,
}

/// The sans-I/O protocol state machine.
pub struct Protocol {
    state: ProtocolState,
    tag_gen: TagGenerator,
    capabilities: Vec<Capability>,
    enabled: Vec<Capability>,
    pending: VecDeque<PendingCommand>,
    outbound: VecDeque<Transmit>,
    /// Literal payloads released one per continuation response.
    pending_literals: VecDeque<Vec<u8>>,
    inbound: Vec<u8>,
    idle_tag: Option<Tag>,
    last_activity: Option<Instant>,
    mailbox_status: Option<MailboxStatus>,
}

impl Default for Protocol {
    fn default() -> Self {
        Self::new()
    }
}

impl Protocol {
    /// Creates a protocol instance awaiting the server greeting.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: ProtocolState::Connecting,
            tag_gen: TagGenerator::default(),
            capabilities: Vec::new(),
            enabled: Vec::new(),
            pending: VecDeque::new(),
            outbound: VecDeque::new(),
            pending_literals: VecDeque::new(),
            inbound: Vec::new(),
            idle_tag: None,
            last_activity: None,
            mailbox_status: None,
        }
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> &ProtocolState {
        &self.state
    }

    /// Returns the capability registry.
    #[must_use]
    pub fn capabilities(&self) -> &[Capability] {
        &self.capabilities
    }

    /// Returns the extensions enabled via ENABLE.
    #[must_use]
    pub fn enabled(&self) -> &[Capability] {
        &self.enabled
    }

    /// Checks whether the server advertises a capability.
    #[must_use]
    pub fn has_capability(&self, cap: &Capability) -> bool {
        self.capabilities.contains(cap)
    }

    /// Returns the running mailbox status while selected.
    #[must_use]
    pub fn mailbox_status(&self) -> Option<&MailboxStatus> {
        self.mailbox_status.as_ref()
    }

    /// Returns true while an IDLE is in flight.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.idle_tag.is_some()
    }

    /// Returns the number of commands awaiting completion.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.pending.len()
    }

    /// Returns when the caller should next invoke [`Self::handle_timeout`].
    ///
    /// Only IDLE needs a timer: it must be refreshed before the server's
    /// inactivity limit.
    #[must_use]
    pub fn poll_timeout(&self) -> Option<Instant> {
        if self.idle_tag.is_some() {
            self.last_activity.map(|t| t + IDLE_REFRESH)
        } else {
            None
        }
    }

    /// Handles an expired timer by terminating the current IDLE.
    pub fn handle_timeout(&mut self, _now: Instant) {
        if self.idle_tag.is_some() {
            self.done();
        }
    }

    /// Returns the next transmit, if any.
    ///
    /// When a transmit has `awaits_continuation` set, the I/O layer must
    /// not request another until a continuation response has been fed
    /// back through [`Self::handle_input`].
    pub fn poll_transmit(&mut self) -> Option<Transmit> {
        self.outbound.pop_front()
    }

    /// Feeds received bytes into the machine, returning the events they
    /// produce.
    ///
    /// # Errors
    ///
    /// A malformed response is a protocol violation: the state moves to
    /// `Closed` and the error is returned.
    pub fn handle_input(&mut self, data: &[u8]) -> Result<Vec<ProtocolEvent>> {
        self.inbound.extend_from_slice(data);
        self.last_activity = Some(Instant::now());

        let mut events = Vec::new();

        while let Some(end) = find_complete_response(&self.inbound) {
            let response_data: Vec<u8> = self.inbound.drain(..=end).collect();
            let response = match ResponseParser::parse(&response_data) {
                Ok(response) => response,
                Err(err) => {
                    self.state = ProtocolState::Closed;
                    return Err(err);
                }
            };
            self.process_response(response, &mut events);
        }

        Ok(events)
    }

    fn process_response(&mut self, response: Response, events: &mut Vec<ProtocolEvent>) {
        match response {
            Response::Tagged {
                tag,
                status,
                code,
                text,
            } => {
                if let Some(event) = self.handle_tagged(tag, status, code, text) {
                    events.push(event);
                }
            }
            Response::Untagged(untagged) => {
                if matches!(self.state, ProtocolState::Connecting) {
                    self.handle_greeting(untagged, events);
                } else {
                    self.handle_untagged(untagged, events);
                }
            }
            Response::Continuation { text } => {
                // Literal pacing is satisfied internally; anything else
                // (SASL challenge, IDLE acknowledgement) goes up.
                if let Some(literal) = self.pending_literals.pop_front() {
                    let mut data = literal;
                    data.extend_from_slice(b"\r\n");
                    self.outbound.push_back(Transmit::line(data));
                } else {
                    events.push(ProtocolEvent::Continuation {
                        text: text.unwrap_or_default(),
                    });
                }
            }
        }
    }

    fn handle_greeting(&mut self, untagged: UntaggedResponse, events: &mut Vec<ProtocolEvent>) {
        let (status, code, text) = match untagged {
            UntaggedResponse::Ok { code, text } => {
                self.state = ProtocolState::NotAuthenticated;
                (Status::Ok, code, text)
            }
            UntaggedResponse::PreAuth { code, text } => {
                self.state = ProtocolState::Authenticated;
                (Status::PreAuth, code, text)
            }
            UntaggedResponse::Bye { code, text } => {
                self.state = ProtocolState::Closed;
                events.push(ProtocolEvent::Disconnected { text: text.clone() });
                (Status::Bye, code, text)
            }
            other => {
                tracing::warn!(?other, "unexpected greeting form");
                self.state = ProtocolState::NotAuthenticated;
                (Status::Ok, None, String::new())
            }
        };

        if let Some(ResponseCode::Capability(caps)) = &code {
            self.capabilities.clone_from(caps);
        }

        events.push(ProtocolEvent::Greeting { status, code, text });
    }

    fn handle_tagged(
        &mut self,
        tag: Tag,
        status: Status,
        code: Option<ResponseCode>,
        text: String,
    ) -> Option<ProtocolEvent> {
        if self.idle_tag.as_ref() == Some(&tag) {
            self.idle_tag = None;
        }

        let position = self.pending.iter().position(|p| p.handle.tag == tag)?;
        let pending = self.pending.remove(position)?;

        if status == Status::Ok {
            self.apply_transition(&pending);
        }

        if let Some(ResponseCode::Capability(caps)) = &code {
            self.capabilities.clone_from(caps);
        }

        Some(ProtocolEvent::CommandComplete {
            handle: pending.handle,
            result: CommandResult {
                status,
                code,
                text,
                responses: pending.responses,
            },
        })
    }

    /// Applies the state transition for a successfully completed command.
    fn apply_transition(&mut self, pending: &PendingCommand) {
        match pending.name {
            "LOGIN" | "AUTHENTICATE" => {
                self.state = ProtocolState::Authenticated;
                // Pre-auth capability lists are stale after authentication.
                self.capabilities.clear();
            }
            "STARTTLS" => {
                self.capabilities.clear();
            }
            "SELECT" | "EXAMINE" => {
                if let Some(mailbox) = &pending.mailbox {
                    self.state = ProtocolState::Selected(SelectedState {
                        mailbox: mailbox.clone(),
                        read_only: pending.name == "EXAMINE",
                    });
                }
            }
            "CLOSE" | "UNSELECT" => {
                if matches!(self.state, ProtocolState::Selected(_)) {
                    self.state = ProtocolState::Authenticated;
                    self.mailbox_status = None;
                }
            }
            "LOGOUT" => {
                self.state = ProtocolState::Closed;
            }
            _ => {}
        }
    }

    fn handle_untagged(&mut self, untagged: UntaggedResponse, events: &mut Vec<ProtocolEvent>) {
        match &untagged {
            UntaggedResponse::Capability(caps) => {
                self.capabilities.clone_from(caps);
            }
            UntaggedResponse::Enabled(caps) => {
                for cap in caps {
                    if !self.enabled.contains(cap) {
                        self.enabled.push(cap.clone());
                    }
                }
            }
            UntaggedResponse::Bye { text, .. } => {
                self.state = ProtocolState::Closed;
                events.push(ProtocolEvent::Disconnected { text: text.clone() });
            }
            UntaggedResponse::Exists(n) => {
                if let Some(status) = &mut self.mailbox_status {
                    status.exists = *n;
                }
            }
            UntaggedResponse::Recent(n) => {
                if let Some(status) = &mut self.mailbox_status {
                    status.recent = *n;
                }
            }
            UntaggedResponse::Flags(flags) => {
                if let Some(status) = &mut self.mailbox_status {
                    status.flags = flags.clone();
                }
            }
            UntaggedResponse::Expunge(_) => {
                if let Some(status) = &mut self.mailbox_status {
                    status.exists = status.exists.saturating_sub(1);
                }
            }
            UntaggedResponse::Ok {
                code: Some(code), ..
            } => {
                if let Some(status) = &mut self.mailbox_status {
                    match code {
                        ResponseCode::UidValidity(v) => status.uid_validity = Some(*v),
                        ResponseCode::UidNext(v) => status.uid_next = Some(*v),
                        ResponseCode::Unseen(v) => status.unseen = Some(*v),
                        ResponseCode::HighestModSeq(v) => status.highest_mod_seq = Some(*v),
                        ResponseCode::PermanentFlags {
                            flags,
                            accepts_new_keywords,
                        } => {
                            status.permanent_flags = flags.clone();
                            status.accepts_new_keywords = *accepts_new_keywords;
                        }
                        ResponseCode::ReadOnly => status.read_only = true,
                        ResponseCode::ReadWrite => status.read_only = false,
                        ResponseCode::MailboxId(id) => status.mailbox_id = Some(id.clone()),
                        _ => {}
                    }
                }
            }
            _ => {}
        }

        events.push(ProtocolEvent::Unsolicited(untagged.clone()));

        if let Some(pending) = self.pending.back_mut() {
            pending.responses.push(untagged);
        }
    }

    /// Queues any line-based command.
    pub fn enqueue(&mut self, cmd: &Command) -> CommandHandle {
        let tag = self.tag_gen.next();
        let data = cmd.serialize(&tag);
        self.outbound.push_back(Transmit::line(data));

        let mailbox = match cmd {
            Command::Select { mailbox, .. } | Command::Examine { mailbox, .. } => {
                Some(mailbox.as_str().to_string())
            }
            _ => None,
        };

        let handle = CommandHandle {
            tag: Tag::new(&tag),
        };
        self.pending.push_back(PendingCommand {
            handle: handle.clone(),
            name: cmd.name(),
            mailbox,
            responses: Vec::new(),
        });
        handle
    }

    /// Queues an APPEND, pacing its message literal on a continuation
    /// unless non-synchronizing literals are available.
    pub fn append(&mut self, mailbox: &MailboxName, request: &AppendRequest) -> CommandHandle {
        let non_sync = self.has_capability(&Capability::LiteralPlus)
            || (self.has_capability(&Capability::LiteralMinus) && request.message.len() <= 4096);

        let tag = self.tag_gen.next();
        let header = append_header(
            &tag,
            Some(mailbox),
            &request.flags,
            request.internal_date.as_deref(),
            &request.annotations,
            request.message.len(),
            non_sync,
        );

        if non_sync {
            let mut data = header;
            data.extend_from_slice(&request.message);
            data.extend_from_slice(b"\r\n");
            self.outbound.push_back(Transmit::line(data));
        } else {
            self.outbound.push_back(Transmit::paced(header));
            self.pending_literals.push_back(request.message.clone());
        }

        let handle = CommandHandle {
            tag: Tag::new(&tag),
        };
        self.pending.push_back(PendingCommand {
            handle: handle.clone(),
            name: "APPEND",
            mailbox: Some(mailbox.as_str().to_string()),
            responses: Vec::new(),
        });
        handle
    }

    /// Queues a SELECT, beginning a fresh mailbox status.
    pub fn select(&mut self, mailbox: &str) -> CommandHandle {
        self.mailbox_status = Some(MailboxStatus::default());
        self.enqueue(&Command::Select {
            mailbox: MailboxName::new(mailbox),
            condstore: self.has_capability(&Capability::CondStore),
            qresync: None,
        })
    }

    /// Queues an EXAMINE, beginning a fresh mailbox status.
    pub fn examine(&mut self, mailbox: &str) -> CommandHandle {
        self.mailbox_status = Some(MailboxStatus::default());
        self.enqueue(&Command::Examine {
            mailbox: MailboxName::new(mailbox),
            condstore: self.has_capability(&Capability::CondStore),
            qresync: None,
        })
    }

    /// Queues an IDLE and starts the refresh timer.
    pub fn idle(&mut self) -> CommandHandle {
        let handle = self.enqueue(&Command::Idle);
        self.idle_tag = Some(handle.tag.clone());
        self.last_activity = Some(Instant::now());
        handle
    }

    /// Queues the DONE line terminating an IDLE.
    pub fn done(&mut self) {
        self.outbound.push_back(Transmit::line(b"DONE\r\n".to_vec()));
    }
}

impl std::fmt::Debug for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Protocol")
            .field("state", &self.state)
            .field("capabilities", &self.capabilities.len())
            .field("pending", &self.pending.len())
            .field("outbound", &self.outbound.len())
            .field("is_idle", &self.idle_tag.is_some())
            .finish_non_exhaustive()
    }
}

fn find_crlf(buf: &[u8]) -> Option<usize> {
    buf.windows(2).position(|w| w == b"\r\n")
}

/// Finds the end index (inclusive) of one complete response, accounting
/// for any number of embedded literals.
fn find_complete_response(buf: &[u8]) -> Option<usize> {
    let mut pos = 0;
    loop {
        let crlf = find_crlf(&buf[pos..])? + pos;
        let line_end = crlf + 2;
        match literal_length_at_end(&buf[..line_end]) {
            Some(len) => {
                let after = line_end.checked_add(len)?;
                if buf.len() < after {
                    return None;
                }
                pos = after;
            }
            None => return Some(line_end - 1),
        }
    }
}

/// Parses `{n}` or `{n+}` at the end of a CRLF-terminated line.
fn literal_length_at_end(line: &[u8]) -> Option<usize> {
    if !line.ends_with(b"\r\n") {
        return None;
    }
    let line = &line[..line.len() - 2];

    let open = line.iter().rposition(|&b| b == b'{')?;
    if !line.ends_with(b"}") {
        return None;
    }

    let num_start = open + 1;
    let num_end = if line.ends_with(b"+}") {
        line.len() - 2
    } else {
        line.len() - 1
    };

    let digits = std::str::from_utf8(&line[num_start..num_end]).ok()?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn connected() -> Protocol {
        let mut protocol = Protocol::new();
        let events = protocol
            .handle_input(b"* OK [CAPABILITY IMAP4rev1 IDLE] ready\r\n")
            .unwrap();
        assert_eq!(events.len(), 1);
        protocol
    }

    #[test]
    fn greeting_moves_to_not_authenticated() {
        let protocol = connected();
        assert_eq!(*protocol.state(), ProtocolState::NotAuthenticated);
        assert!(protocol.has_capability(&Capability::Idle));
    }

    #[test]
    fn preauth_greeting_skips_authentication() {
        let mut protocol = Protocol::new();
        let _ = protocol.handle_input(b"* PREAUTH welcome back\r\n").unwrap();
        assert_eq!(*protocol.state(), ProtocolState::Authenticated);
    }

    #[test]
    fn bye_greeting_closes() {
        let mut protocol = Protocol::new();
        let events = protocol.handle_input(b"* BYE busy\r\n").unwrap();
        assert_eq!(*protocol.state(), ProtocolState::Closed);
        assert!(
            events
                .iter()
                .any(|e| matches!(e, ProtocolEvent::Disconnected { .. }))
        );
    }

    #[test]
    fn command_round_trip() {
        let mut protocol = connected();
        let handle = protocol.enqueue(&Command::Noop);

        let transmit = protocol.poll_transmit().unwrap();
        let line = String::from_utf8(transmit.data).unwrap();
        assert!(line.contains("NOOP"));
        assert!(line.contains(handle.tag().as_str()));

        let response = format!("{} OK NOOP completed\r\n", handle.tag());
        let events = protocol.handle_input(response.as_bytes()).unwrap();
        assert_eq!(events.len(), 1);
        match &events[0] {
            ProtocolEvent::CommandComplete { result, .. } => assert!(result.is_ok()),
            other => panic!("unexpected event: {other:?}"),
        }
        assert_eq!(protocol.in_flight(), 0);
    }

    #[test]
    fn login_transitions_and_invalidates_capabilities() {
        let mut protocol = connected();
        let handle = protocol.enqueue(&Command::Login {
            username: "u".into(),
            password: "p".into(),
        });
        let _ = protocol.poll_transmit();

        let response = format!("{} OK logged in\r\n", handle.tag());
        let _ = protocol.handle_input(response.as_bytes()).unwrap();
        assert_eq!(*protocol.state(), ProtocolState::Authenticated);
        assert!(protocol.capabilities().is_empty());
    }

    #[test]
    fn select_transition_records_mailbox() {
        let mut protocol = connected();
        let login = protocol.enqueue(&Command::Login {
            username: "u".into(),
            password: "p".into(),
        });
        let _ = protocol
            .handle_input(format!("{} OK done\r\n", login.tag()).as_bytes())
            .unwrap();

        let select = protocol.select("INBOX");
        let events = protocol
            .handle_input(
                format!(
                    "* 3 EXISTS\r\n* 0 RECENT\r\n{} OK [READ-WRITE] selected\r\n",
                    select.tag()
                )
                .as_bytes(),
            )
            .unwrap();

        assert_eq!(protocol.state().selected_mailbox(), Some("INBOX"));
        assert_eq!(protocol.mailbox_status().unwrap().exists, 3);

        // Untagged events precede the completion event.
        assert!(matches!(events[0], ProtocolEvent::Unsolicited(_)));
        assert!(matches!(
            events.last().unwrap(),
            ProtocolEvent::CommandComplete { .. }
        ));
    }

    #[test]
    fn untagged_updates_are_attached_to_in_flight_command() {
        let mut protocol = connected();
        let handle = protocol.enqueue(&Command::Noop);
        let events = protocol
            .handle_input(
                format!("* 4 EXISTS\r\n{} OK done\r\n", handle.tag()).as_bytes(),
            )
            .unwrap();

        let complete = events
            .iter()
            .find_map(|e| match e {
                ProtocolEvent::CommandComplete { result, .. } => Some(result),
                _ => None,
            })
            .unwrap();
        assert_eq!(complete.responses.len(), 1);
        assert!(matches!(
            complete.responses[0],
            UntaggedResponse::Exists(4)
        ));
    }

    #[test]
    fn append_without_literal_plus_is_paced() {
        let mut protocol = connected();
        let request = AppendRequest::new(b"hello".to_vec());
        let _handle = protocol.append(&MailboxName::inbox(), &request);

        let header = protocol.poll_transmit().unwrap();
        assert!(header.awaits_continuation);
        assert!(protocol.poll_transmit().is_none());

        // The payload is released only by the continuation.
        let events = protocol.handle_input(b"+ go ahead\r\n").unwrap();
        assert!(events.is_empty());
        let payload = protocol.poll_transmit().unwrap();
        assert_eq!(payload.data, b"hello\r\n");
    }

    #[test]
    fn append_with_literal_plus_sends_in_one_piece() {
        let mut protocol = Protocol::new();
        let _ = protocol
            .handle_input(b"* OK [CAPABILITY IMAP4rev1 LITERAL+] ready\r\n")
            .unwrap();

        let request = AppendRequest::new(b"hi".to_vec());
        let _ = protocol.append(&MailboxName::inbox(), &request);

        let transmit = protocol.poll_transmit().unwrap();
        assert!(!transmit.awaits_continuation);
        let text = String::from_utf8_lossy(&transmit.data).to_string();
        assert!(text.contains("{2+}\r\nhi\r\n"));
    }

    #[test]
    fn idle_sets_refresh_timer() {
        let mut protocol = connected();
        assert!(protocol.poll_timeout().is_none());
        let _ = protocol.idle();
        assert!(protocol.is_idle());
        assert!(protocol.poll_timeout().is_some());
    }

    #[test]
    fn malformed_response_closes_session() {
        let mut protocol = connected();
        let result = protocol.handle_input(b"\x01garbage\r\n");
        assert!(result.is_err());
        assert_eq!(*protocol.state(), ProtocolState::Closed);
    }

    #[test]
    fn find_complete_response_spans_literals() {
        let buf = b"* 1 FETCH (BODY[] {5}\r\nhello)\r\n";
        assert_eq!(find_complete_response(buf), Some(buf.len() - 1));

        // Two literals in one response.
        let buf = b"* 1 FETCH (BODY[1] {2}\r\nab BODY[2] {3}\r\ncde)\r\n";
        assert_eq!(find_complete_response(buf), Some(buf.len() - 1));

        // Incomplete literal: wait for more data.
        assert_eq!(find_complete_response(b"* 1 FETCH (BODY[] {5}\r\nhe"), None);
    }

    #[test]
    fn enabled_extensions_accumulate() {
        let mut protocol = connected();
        let _ = protocol.handle_input(b"* ENABLED QRESYNC\r\n").unwrap();
        let _ = protocol.handle_input(b"* ENABLED CONDSTORE\r\n").unwrap();
        assert_eq!(protocol.enabled().len(), 2);
    }
}
