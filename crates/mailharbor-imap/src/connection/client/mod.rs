//! Type-state IMAP client.
//!
//! The type parameter tracks the session state at compile time, so only
//! commands valid in the current state are callable:
//!
//! - [`NotAuthenticated`]: greeting consumed, credentials pending
//! - [`Authenticated`]: mailbox management available
//! - [`Selected`]: message operations available
//!
//! Every command funnels through [`Client::execute`], which serializes
//! the command, collects responses until the tagged completion, and
//! returns a [`CommandOutcome`] carrying the untagged responses in
//! wire-arrival order. The folder engine applies those to its cache
//! before surfacing results, so observers never see stale state.

#![allow(clippy::missing_errors_doc)]

mod authenticated;
mod not_authenticated;
mod selected;
mod states;

use tokio::io::{AsyncRead, AsyncWrite};

pub use self::authenticated::SelectOptions;
pub use self::not_authenticated::ClientGreeting;
pub use self::selected::StoreResult;
pub use self::states::{Authenticated, NotAuthenticated, Selected};

pub(crate) use self::authenticated::run_append;

use super::framed::{FramedStream, ResponseAccumulator};
use crate::command::{Command, TagGenerator};
use crate::parser::{FetchItem, Response, ResponseParser, StatusItem, UntaggedResponse};
use crate::search::SearchResults;
use crate::types::{
    Capability, ListEntry, MailboxStatus, MessageThread, ResponseCode, SeqNum, Status, UidSet,
    UidValidity,
};
use crate::{Error, Result};

/// Result of one executed command: the tagged completion plus every
/// untagged response that arrived while it was in flight.
#[derive(Debug, Clone)]
pub struct CommandOutcome {
    /// Completion status.
    pub status: Status,
    /// Response code from the tagged line.
    pub code: Option<ResponseCode>,
    /// Human-readable completion text.
    pub text: String,
    /// Untagged responses in wire-arrival order.
    pub untagged: Vec<UntaggedResponse>,
}

impl CommandOutcome {
    /// Fails unless the command completed OK.
    ///
    /// Per the error taxonomy: NO is a local refusal, BAD is treated as
    /// a client bug (session-fatal), BYE is a server shutdown.
    pub fn check(self) -> Result<Self> {
        match self.status {
            Status::Ok | Status::PreAuth => Ok(self),
            Status::No => Err(Error::No(self.text)),
            Status::Bad => Err(Error::Bad(self.text)),
            Status::Bye => Err(Error::Bye(self.text)),
        }
    }
}

/// IMAP client connection with a type-state parameter.
pub struct Client<S, St> {
    pub(crate) stream: FramedStream<S>,
    pub(crate) tag_gen: TagGenerator,
    pub(crate) capabilities: Vec<Capability>,
    pub(crate) enabled: Vec<Capability>,
    pub(crate) greeting: Option<String>,
    pub(crate) state: St,
}

impl<S, St> std::fmt::Debug for Client<S, St> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("capabilities", &self.capabilities)
            .field("enabled", &self.enabled)
            .finish_non_exhaustive()
    }
}

impl<S, St> Client<S, St>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub(crate) fn transition<New>(self, state: New) -> Client<S, New> {
        Client {
            stream: self.stream,
            tag_gen: self.tag_gen,
            capabilities: self.capabilities,
            enabled: self.enabled,
            greeting: self.greeting,
            state,
        }
    }

    /// Returns the advertised capabilities.
    #[must_use]
    pub fn capabilities(&self) -> &[Capability] {
        &self.capabilities
    }

    /// Returns the extensions enabled via ENABLE.
    #[must_use]
    pub fn enabled(&self) -> &[Capability] {
        &self.enabled
    }

    /// Returns the greeting text, when the server sent one.
    #[must_use]
    pub fn greeting(&self) -> Option<&str> {
        self.greeting.as_deref()
    }

    /// Checks whether the server advertises a capability.
    #[must_use]
    pub fn has_capability(&self, cap: &Capability) -> bool {
        self.capabilities.contains(cap)
    }

    /// Returns true if non-synchronizing literals may be used for a
    /// payload of the given size.
    #[must_use]
    pub fn non_sync_literals(&self, payload_len: usize) -> bool {
        self.has_capability(&Capability::LiteralPlus)
            || (self.has_capability(&Capability::LiteralMinus) && payload_len <= 4096)
    }

    /// Fails unless the given capability is advertised.
    pub fn require_capability(&self, cap: &Capability) -> Result<()> {
        if self.has_capability(cap) {
            Ok(())
        } else {
            Err(Error::Unsupported(cap.to_string()))
        }
    }

    /// Executes one line command through to its tagged completion.
    pub async fn execute(&mut self, cmd: &Command) -> Result<CommandOutcome> {
        let tag = self.tag_gen.next();
        let line = cmd.serialize(&tag);
        tracing::trace!(tag = %tag, command = cmd.name(), "sending command");
        self.stream.write_command(&line).await?;
        self.collect(&tag).await
    }

    /// Reads responses until the tagged completion for `tag` arrives.
    pub(crate) async fn collect(&mut self, tag: &str) -> Result<CommandOutcome> {
        let mut accumulator = ResponseAccumulator::new(tag);
        let raw = accumulator.read_until_tagged(&mut self.stream).await?;

        let mut untagged = Vec::new();
        let mut tagged = None;

        for bytes in &raw {
            match ResponseParser::parse(bytes)? {
                Response::Untagged(resp) => {
                    self.absorb(&resp);
                    untagged.push(resp);
                }
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
                    tagged = Some((status, code, text));
                }
                Response::Continuation { .. } => {
                    return Err(Error::Protocol(
                        "unexpected continuation request".to_string(),
                    ));
                }
            }
        }

        let (status, code, text) =
            tagged.ok_or_else(|| Error::Protocol("missing tagged completion".to_string()))?;

        if let Some(ResponseCode::Capability(caps)) = &code {
            self.capabilities.clone_from(caps);
        }

        Ok(CommandOutcome {
            status,
            code,
            text,
            untagged,
        })
    }

    /// Updates session-level registries from one untagged response.
    fn absorb(&mut self, resp: &UntaggedResponse) {
        match resp {
            UntaggedResponse::Capability(caps) => self.capabilities.clone_from(caps),
            UntaggedResponse::Enabled(caps) => {
                for cap in caps {
                    if !self.enabled.contains(cap) {
                        self.enabled.push(cap.clone());
                    }
                }
            }
            _ => {}
        }
    }

    /// Sends NOOP; any pending unsolicited updates ride along in the
    /// outcome.
    pub async fn noop(&mut self) -> Result<CommandOutcome> {
        self.execute(&Command::Noop).await?.check()
    }

    /// Queries capabilities, replacing the cached registry.
    pub async fn capability(&mut self) -> Result<Vec<Capability>> {
        // `absorb` refreshes the registry while responses are collected.
        let _ = self.execute(&Command::Capability).await?.check()?;
        Ok(self.capabilities.clone())
    }

    /// Enables extensions (RFC 5161), returning what the server enabled.
    pub async fn enable(&mut self, capabilities: &[Capability]) -> Result<Vec<Capability>> {
        self.require_capability(&Capability::Enable)?;
        let outcome = self
            .execute(&Command::Enable {
                capabilities: capabilities.iter().map(ToString::to_string).collect(),
            })
            .await?
            .check()?;

        for resp in &outcome.untagged {
            if let UntaggedResponse::Enabled(caps) = resp {
                return Ok(caps.clone());
            }
        }
        Ok(Vec::new())
    }

    /// Exchanges client/server identification (RFC 2971).
    pub async fn id(
        &mut self,
        parameters: Option<Vec<(String, String)>>,
    ) -> Result<Vec<(String, Option<String>)>> {
        self.require_capability(&Capability::Id)?;
        let outcome = self.execute(&Command::Id { parameters }).await?.check()?;

        for resp in &outcome.untagged {
            if let UntaggedResponse::Id(params) = resp {
                return Ok(params.clone());
            }
        }
        Ok(Vec::new())
    }

    /// Logs out and drops the connection.
    pub async fn logout(mut self) -> Result<()> {
        let tag = self.tag_gen.next();
        let line = Command::Logout.serialize(&tag);
        self.stream.write_command(&line).await?;
        // BYE plus the tagged OK follow; the connection may also just
        // drop, which is fine on the way out.
        let _ = self.collect(&tag).await;
        Ok(())
    }
}

// === Outcome extractors ===
//
// The folder engine executes commands itself and pulls typed data out of
// the outcome after applying the untagged responses to its cache.

/// Extracts FETCH records in arrival order.
#[must_use]
pub fn fetch_records(outcome: &CommandOutcome) -> Vec<(SeqNum, Vec<FetchItem>)> {
    outcome
        .untagged
        .iter()
        .filter_map(|resp| match resp {
            UntaggedResponse::Fetch { seq, items } => Some((*seq, items.clone())),
            _ => None,
        })
        .collect()
}

/// Extracts EXPUNGE sequence numbers in arrival order.
#[must_use]
pub fn expunged_seqs(outcome: &CommandOutcome) -> Vec<SeqNum> {
    outcome
        .untagged
        .iter()
        .filter_map(|resp| match resp {
            UntaggedResponse::Expunge(seq) => Some(*seq),
            _ => None,
        })
        .collect()
}

/// Extracts LIST (or LSUB) entries.
#[must_use]
pub fn list_entries(outcome: &CommandOutcome) -> Vec<ListEntry> {
    outcome
        .untagged
        .iter()
        .filter_map(|resp| match resp {
            UntaggedResponse::List(entry) | UntaggedResponse::Lsub(entry) => Some(entry.clone()),
            _ => None,
        })
        .collect()
}

/// Extracts STATUS items for one mailbox.
#[must_use]
pub fn status_items(outcome: &CommandOutcome) -> Vec<StatusItem> {
    outcome
        .untagged
        .iter()
        .filter_map(|resp| match resp {
            UntaggedResponse::Status { items, .. } => Some(items.clone()),
            _ => None,
        })
        .flatten()
        .collect()
}

/// Merges SEARCH/SORT/ESEARCH responses into one result set.
#[must_use]
pub fn search_results(outcome: &CommandOutcome) -> SearchResults {
    let mut results = SearchResults::default();

    for resp in &outcome.untagged {
        match resp {
            UntaggedResponse::Search(numbers) | UntaggedResponse::Sort(numbers) => {
                results.all.extend_from_slice(numbers);
            }
            UntaggedResponse::ESearch(data) => {
                let es = &data.results;
                results.all.extend_from_slice(&es.all);
                results.min = es.min.or(results.min);
                results.max = es.max.or(results.max);
                results.count = es.count.or(results.count);
                results.mod_seq = es.mod_seq.or(results.mod_seq);
            }
            _ => {}
        }
    }

    results
}

/// Extracts the THREAD forest.
#[must_use]
pub fn thread_forest(outcome: &CommandOutcome) -> Vec<MessageThread> {
    outcome
        .untagged
        .iter()
        .find_map(|resp| match resp {
            UntaggedResponse::Thread(forest) => Some(forest.clone()),
            _ => None,
        })
        .unwrap_or_default()
}

/// Extracts the COPYUID payload, when the server sent one.
#[must_use]
pub fn copy_uid(outcome: &CommandOutcome) -> Option<(UidValidity, UidSet, UidSet)> {
    match &outcome.code {
        Some(ResponseCode::CopyUid {
            validity,
            source,
            dest,
        }) => Some((*validity, source.clone(), dest.clone())),
        _ => None,
    }
}

/// Extracts the APPENDUID payload, when the server sent one.
#[must_use]
pub fn append_uids(outcome: &CommandOutcome) -> Option<(UidValidity, UidSet)> {
    match &outcome.code {
        Some(ResponseCode::AppendUid { validity, uids }) => Some((*validity, uids.clone())),
        _ => None,
    }
}

/// Extracts the MODIFIED set of a conditional STORE.
#[must_use]
pub fn modified_set(outcome: &CommandOutcome) -> Option<UidSet> {
    match &outcome.code {
        Some(ResponseCode::Modified(set)) => Some(set.clone()),
        _ => None,
    }
}

/// Assembles a [`MailboxStatus`] from SELECT/EXAMINE responses.
#[must_use]
pub fn mailbox_status(outcome: &CommandOutcome) -> MailboxStatus {
    let mut status = MailboxStatus::default();

    let mut apply_code = |status: &mut MailboxStatus, code: &ResponseCode| match code {
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
    };

    for resp in &outcome.untagged {
        match resp {
            UntaggedResponse::Exists(n) => status.exists = *n,
            UntaggedResponse::Recent(n) => status.recent = *n,
            UntaggedResponse::Flags(flags) => status.flags = flags.clone(),
            UntaggedResponse::Ok {
                code: Some(code), ..
            } => apply_code(&mut status, code),
            _ => {}
        }
    }

    if let Some(code) = &outcome.code {
        apply_code(&mut status, code);
    }

    status
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::{Flag, Flags};

    fn outcome_with(untagged: Vec<UntaggedResponse>, code: Option<ResponseCode>) -> CommandOutcome {
        CommandOutcome {
            status: Status::Ok,
            code,
            text: "done".to_string(),
            untagged,
        }
    }

    #[test]
    fn check_maps_statuses() {
        let ok = outcome_with(Vec::new(), None);
        assert!(ok.check().is_ok());

        let no = CommandOutcome {
            status: Status::No,
            code: None,
            text: "denied".to_string(),
            untagged: Vec::new(),
        };
        assert!(matches!(no.check(), Err(Error::No(_))));

        let bad = CommandOutcome {
            status: Status::Bad,
            code: None,
            text: "syntax".to_string(),
            untagged: Vec::new(),
        };
        assert!(matches!(bad.check(), Err(Error::Bad(_))));
    }

    #[test]
    fn mailbox_status_assembly() {
        let outcome = outcome_with(
            vec![
                UntaggedResponse::Exists(3),
                UntaggedResponse::Recent(0),
                UntaggedResponse::Flags(Flags::from_vec(vec![Flag::Seen])),
                UntaggedResponse::Ok {
                    code: Some(ResponseCode::UidValidity(UidValidity::new(1234).unwrap())),
                    text: String::new(),
                },
                UntaggedResponse::Ok {
                    code: Some(ResponseCode::UidNext(crate::types::Uid::new(10).unwrap())),
                    text: String::new(),
                },
            ],
            Some(ResponseCode::ReadWrite),
        );

        let status = mailbox_status(&outcome);
        assert_eq!(status.exists, 3);
        assert_eq!(status.recent, 0);
        assert_eq!(status.uid_validity.unwrap().get(), 1234);
        assert_eq!(status.uid_next.unwrap().get(), 10);
        assert!(!status.read_only);
    }

    #[test]
    fn search_results_merge_classic_and_esearch() {
        let outcome = outcome_with(
            vec![
                UntaggedResponse::Search(vec![2, 3]),
                UntaggedResponse::ESearch(crate::parser::ESearchData {
                    tag: None,
                    uid: true,
                    results: SearchResults {
                        all: vec![5],
                        count: Some(3),
                        ..SearchResults::default()
                    },
                }),
            ],
            None,
        );

        let results = search_results(&outcome);
        assert_eq!(results.all, vec![2, 3, 5]);
        assert_eq!(results.count, Some(3));
    }

    #[test]
    fn modified_extraction() {
        let outcome = outcome_with(Vec::new(), Some(ResponseCode::Modified(
            UidSet::parse("5").unwrap(),
        )));
        assert_eq!(modified_set(&outcome).unwrap().to_string(), "5");
    }
}
