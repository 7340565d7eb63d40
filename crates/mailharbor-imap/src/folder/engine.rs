//! The session driver.
//!
//! [`MailEngine`] owns the connection, the folder registry, and the
//! currently selected folder. Every operation funnels through one
//! executor: untagged responses are applied to folder state (firing
//! observer callbacks) before the operation's result is returned, so
//! callers and observers always agree on ordering.
//!
//! Cancellation is by disconnect: IMAP offers no selective abort outside
//! IDLE, so an operation future dropped after bytes reached the wire
//! poisons the session, and the next operation fails with a
//! connection-lost error instead of desynchronizing the stream.

use std::time::{Duration, Instant};

use tokio::io::{AsyncRead, AsyncWrite};

use super::registry::FolderRegistry;
use super::sync::SyncState;
use super::{FolderObserver, MailFolder};
use crate::command::{Command, FetchAttribute, StatusAttribute};
use crate::connection::client::{
    Authenticated, Client, CommandOutcome, SelectOptions, Selected, append_uids, copy_uid,
    expunged_seqs, fetch_records, modified_set, run_append, search_results, status_items,
    thread_forest,
};
use crate::connection::IdleEvent;
use crate::parser::{FetchItem, UntaggedResponse};
use crate::quirks::{ServerQuirks, ServerType};
use crate::request::{
    AppendRequest, FetchRequest, ReplaceRequest, StoreAnnotationsRequest, StoreFlagsRequest,
    StoreLabelsRequest,
};
use crate::search::{OrderBy, SearchOptions, SearchQuery, SearchResults};
use crate::types::{
    Capability, FolderAccess, MailboxAttribute, MailboxName, MessageSummary, MessageThread,
    SeqNum, SequenceSet, ThreadingAlgorithm, Uid, UidSet, UniqueId, UniqueIdMap,
};
use crate::{Error, Result};

/// A sequence-number range for low-level fetches.
///
/// `end: None` is the open-ended upper bound (through the current
/// count), the wire form `start:*`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchRange {
    /// First sequence number, 1-based.
    pub start: u32,
    /// Last sequence number inclusive; `None` means through the end.
    pub end: Option<u32>,
}

impl FetchRange {
    /// A bounded range.
    #[must_use]
    pub fn new(start: u32, end: u32) -> Self {
        Self {
            start,
            end: Some(end),
        }
    }

    /// An open-ended range from `start` through the current count.
    #[must_use]
    pub fn open_ended(start: u32) -> Self {
        Self { start, end: None }
    }
}

enum ConnState<S> {
    Offline,
    Authed(Client<S, Authenticated>),
    Opened(Client<S, Selected>),
}

/// The IMAP session driver and folder engine.
pub struct MailEngine<S> {
    conn: ConnState<S>,
    registry: FolderRegistry,
    selected: Option<String>,
    quirks: ServerQuirks,
    /// True while an operation has bytes on the wire. Left set when an
    /// operation future was dropped mid-flight; the next operation then
    /// declares the session lost rather than reading stale responses.
    wire_busy: bool,
}

impl<S> MailEngine<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Builds an engine over an authenticated client.
    #[must_use]
    pub fn new(client: Client<S, Authenticated>) -> Self {
        let server_type = ServerType::detect(client.capabilities(), client.greeting());
        let quirks = ServerQuirks::for_server(server_type, client.capabilities());
        Self {
            conn: ConnState::Authed(client),
            registry: FolderRegistry::new(),
            selected: None,
            quirks,
            wire_busy: false,
        }
    }

    /// Returns the detected server quirks.
    #[must_use]
    pub fn quirks(&self) -> &ServerQuirks {
        &self.quirks
    }

    /// Returns the folder registry.
    #[must_use]
    pub fn registry(&self) -> &FolderRegistry {
        &self.registry
    }

    /// Returns a folder by full name.
    #[must_use]
    pub fn folder(&self, full_name: &str) -> Option<&MailFolder> {
        self.registry.get(full_name)
    }

    /// Returns the name of the open folder, if any.
    #[must_use]
    pub fn selected_folder(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Returns the session capability registry.
    #[must_use]
    pub fn capabilities(&self) -> &[Capability] {
        match &self.conn {
            ConnState::Authed(c) => c.capabilities(),
            ConnState::Opened(c) => c.capabilities(),
            ConnState::Offline => &[],
        }
    }

    fn has_capability(&self, cap: &Capability) -> bool {
        self.capabilities().contains(cap)
    }

    fn require_capability(&self, cap: &Capability) -> Result<()> {
        if self.has_capability(cap) {
            Ok(())
        } else {
            Err(Error::Unsupported(cap.to_string()))
        }
    }

    /// Subscribes an observer to a folder's events, creating the folder
    /// record if the server has not listed it yet.
    pub fn subscribe_events(&mut self, folder: &str, observer: Box<dyn FolderObserver>) {
        self.registry
            .get_or_create(folder, None)
            .subscribe_events(observer);
    }

    // === Internal plumbing ===

    fn guard(&mut self) -> Result<()> {
        if self.wire_busy {
            self.go_offline();
            return Err(Error::ConnectionLost(
                "an operation was cancelled after bytes reached the wire".to_string(),
            ));
        }
        Ok(())
    }

    fn go_offline(&mut self) {
        self.conn = ConnState::Offline;
        if let Some(name) = self.selected.take()
            && let Some(folder) = self.registry.get_mut(&name)
        {
            folder.mark_closed();
        }
    }

    fn fatal_filter(&mut self, err: Error) -> Error {
        if err.is_session_fatal() {
            self.go_offline();
        }
        err
    }

    fn ensure_selected(&self) -> Result<&str> {
        match (&self.conn, self.selected.as_deref()) {
            (ConnState::Opened(_), Some(name)) => Ok(name),
            _ => Err(Error::InvalidState("no folder is open".to_string())),
        }
    }

    /// Executes a command in whatever state the session is in, applying
    /// its untagged responses to folder state before returning.
    async fn run(&mut self, cmd: &Command) -> Result<CommandOutcome> {
        self.guard()?;
        self.wire_busy = true;
        let result = match &mut self.conn {
            ConnState::Authed(client) => client.execute(cmd).await,
            ConnState::Opened(client) => client.execute(cmd).await,
            ConnState::Offline => {
                self.wire_busy = false;
                return Err(Error::InvalidState("not connected".to_string()));
            }
        };
        self.wire_busy = false;

        let outcome = match result.and_then(CommandOutcome::check) {
            Ok(outcome) => outcome,
            Err(err) => return Err(self.fatal_filter(err)),
        };

        self.apply_outcome(&outcome)?;
        Ok(outcome)
    }

    async fn run_selected(&mut self, cmd: &Command) -> Result<CommandOutcome> {
        self.ensure_selected()?;
        self.run(cmd).await
    }

    /// Applies untagged responses to the selected folder, firing
    /// observer callbacks in wire-arrival order.
    fn apply_outcome(&mut self, outcome: &CommandOutcome) -> Result<()> {
        let Some(name) = self.selected.clone() else {
            return Ok(());
        };

        let mut violation = None;
        if let Some(folder) = self.registry.get_mut(&name) {
            for resp in &outcome.untagged {
                if let Err(err) = folder.apply_untagged(resp) {
                    violation = Some(err);
                    break;
                }
            }
            if violation.is_none()
                && let Some(code) = &outcome.code
                && let Err(err) = folder.apply_code(code)
            {
                violation = Some(err);
            }
        }

        match violation {
            Some(err) => Err(self.fatal_filter(err)),
            None => Ok(()),
        }
    }

    // === Folder listing ===

    /// Lists folders matching a pattern, refreshing the registry.
    ///
    /// Returns the full names in server order.
    pub async fn list_folders(&mut self, reference: &str, pattern: &str) -> Result<Vec<String>> {
        let outcome = self
            .run(&Command::List {
                reference: reference.to_string(),
                pattern: pattern.to_string(),
            })
            .await?;

        let mut names = Vec::new();
        for resp in &outcome.untagged {
            if let UntaggedResponse::List(entry) = resp {
                let folder = self.registry.upsert_list_entry(entry);
                if entry.attributes.contains(&MailboxAttribute::NoSelect)
                    && entry.attributes.contains(&MailboxAttribute::HasChildren)
                {
                    folder.set_namespace(true);
                }
                names.push(entry.name.as_str().to_string());
            }
        }
        Ok(names)
    }

    // === Open / close ===

    /// Opens a folder, implicitly closing the previous one.
    ///
    /// With `qresync` state the server reports only the deltas since the
    /// captured state (VANISHED, changed FETCH records); the resulting
    /// events fire before this call returns. The returned access mode is
    /// the effective one, which the server may demote to read-only.
    pub async fn open(
        &mut self,
        name: &str,
        access: FolderAccess,
        qresync: Option<&SyncState>,
    ) -> Result<FolderAccess> {
        if access == FolderAccess::None {
            return Err(Error::Argument("open requires an access mode".to_string()));
        }
        if qresync.is_some() {
            self.require_capability(&Capability::QResync)?;
        }
        self.guard()?;

        let normalized = self.quirks.normalize_mailbox(name);
        let condstore = self.has_capability(&Capability::CondStore);

        let authed = match std::mem::replace(&mut self.conn, ConnState::Offline) {
            ConnState::Authed(client) => client,
            // Selecting a different folder is a single implicit
            // transition; no CLOSE is issued and nothing is expunged.
            ConnState::Opened(client) => client.transition(Authenticated),
            ConnState::Offline => return Err(Error::InvalidState("not connected".to_string())),
        };

        if let Some(previous) = self.selected.take()
            && let Some(folder) = self.registry.get_mut(&previous)
        {
            folder.mark_closed();
        }

        let options = SelectOptions {
            condstore,
            qresync: qresync.map(|state| state.to_params().to_wire()),
        };
        let mailbox = MailboxName::new(&normalized);

        self.wire_busy = true;
        let result = if access == FolderAccess::ReadOnly {
            authed.examine_with(&mailbox, options).await
        } else {
            authed.select_with(&mailbox, options).await
        };
        self.wire_busy = false;

        let (client, outcome) = match result {
            Ok(pair) => pair,
            Err(err) => {
                // The connection travelled with the consumed client; a
                // refused SELECT still costs the session.
                self.go_offline();
                return Err(err);
            }
        };

        let thread_algorithms: Vec<ThreadingAlgorithm> = client
            .capabilities()
            .iter()
            .filter_map(|cap| match cap {
                Capability::Thread(algo) => ThreadingAlgorithm::parse(algo),
                _ => None,
            })
            .collect();
        let session_append_limit = client.capabilities().iter().find_map(|cap| match cap {
            Capability::AppendLimit(limit) => *limit,
            _ => None,
        });
        let read_only = client.selection_status().read_only;

        self.conn = ConnState::Opened(client);
        self.selected = Some(normalized.clone());

        let mut violation = None;
        {
            let folder = self.registry.get_or_create(&normalized, None);
            folder.set_threading_algorithms(thread_algorithms);
            if folder.append_limit().is_none() {
                folder.set_append_limit(session_append_limit);
            }

            // EXISTS is deferred so resynchronization deltas (VANISHED,
            // FETCH) are observed before the new count.
            let mut pending_count = None;
            for resp in &outcome.untagged {
                if let UntaggedResponse::Exists(n) = resp {
                    pending_count = Some(*n);
                    continue;
                }
                if let Err(err) = folder.apply_untagged(resp) {
                    violation = Some(err);
                    break;
                }
            }
            if violation.is_none() {
                if let Some(code) = &outcome.code
                    && let Err(err) = folder.apply_code(code)
                {
                    violation = Some(err);
                }
                if violation.is_none() {
                    if let Some(count) = pending_count {
                        folder.set_count(count);
                    }
                    let effective = if read_only {
                        FolderAccess::ReadOnly
                    } else {
                        FolderAccess::ReadWrite
                    };
                    folder.mark_opened(effective);
                }
            }
        }

        if let Some(err) = violation {
            return Err(self.fatal_filter(err));
        }

        Ok(if read_only {
            FolderAccess::ReadOnly
        } else {
            FolderAccess::ReadWrite
        })
    }

    /// Closes the open folder.
    ///
    /// With `expunge` the server's CLOSE semantics apply (silent
    /// expunge); without it UNSELECT is used, which requires the
    /// capability and is refused client-side otherwise.
    pub async fn close(&mut self, expunge: bool) -> Result<()> {
        let name = self.ensure_selected()?.to_string();
        if !expunge {
            self.require_capability(&Capability::Unselect)?;
        }
        self.guard()?;

        let ConnState::Opened(client) = std::mem::replace(&mut self.conn, ConnState::Offline)
        else {
            return Err(Error::InvalidState("no folder is open".to_string()));
        };

        self.wire_busy = true;
        let result = if expunge {
            client.close().await
        } else {
            client.unselect().await
        };
        self.wire_busy = false;

        match result {
            Ok(authed) => {
                self.conn = ConnState::Authed(authed);
                self.selected = None;
                if let Some(folder) = self.registry.get_mut(&name) {
                    folder.mark_closed();
                }
                Ok(())
            }
            Err(err) => {
                self.go_offline();
                Err(err)
            }
        }
    }

    // === Folder management ===

    /// Creates a folder, optionally with SPECIAL-USE attributes.
    pub async fn create(
        &mut self,
        name: &str,
        special_use: Vec<MailboxAttribute>,
    ) -> Result<()> {
        if name.is_empty() {
            return Err(Error::Argument("empty folder name".to_string()));
        }
        if !special_use.is_empty() {
            self.require_capability(&Capability::CreateSpecialUse)?;
        }

        self.run(&Command::Create {
            mailbox: MailboxName::new(name),
            special_use,
        })
        .await?;

        self.registry.get_or_create(name, None);
        Ok(())
    }

    /// Renames (and possibly moves) a folder; returns the new full name.
    pub async fn rename(
        &mut self,
        name: &str,
        new_parent: Option<&str>,
        new_name: &str,
    ) -> Result<String> {
        if new_name.is_empty() {
            return Err(Error::Argument("empty folder name".to_string()));
        }
        let delimiter = self
            .registry
            .get(name)
            .and_then(MailFolder::directory_separator)
            .unwrap_or('/');
        let new_full = match new_parent {
            Some(parent) if !parent.is_empty() => format!("{parent}{delimiter}{new_name}"),
            _ => new_name.to_string(),
        };

        self.run(&Command::Rename {
            from: MailboxName::new(name),
            to: MailboxName::new(&new_full),
        })
        .await?;

        self.registry.rename(name, &new_full);
        if self.selected.as_deref() == Some(name) {
            self.selected = Some(new_full.clone());
        }
        Ok(new_full)
    }

    /// Deletes a folder.
    pub async fn delete(&mut self, name: &str) -> Result<()> {
        if self.selected.as_deref() == Some(name) {
            return Err(Error::InvalidState(
                "cannot delete the open folder".to_string(),
            ));
        }

        self.run(&Command::Delete {
            mailbox: MailboxName::new(name),
        })
        .await?;

        if let Some(mut folder) = self.registry.remove(name) {
            folder.mark_deleted();
        }
        Ok(())
    }

    /// Subscribes to a folder.
    pub async fn subscribe(&mut self, name: &str) -> Result<()> {
        self.run(&Command::Subscribe {
            mailbox: MailboxName::new(name),
        })
        .await?;
        self.registry.get_or_create(name, None).set_subscribed(true);
        Ok(())
    }

    /// Unsubscribes from a folder.
    pub async fn unsubscribe(&mut self, name: &str) -> Result<()> {
        self.run(&Command::Unsubscribe {
            mailbox: MailboxName::new(name),
        })
        .await?;
        self.registry
            .get_or_create(name, None)
            .set_subscribed(false);
        Ok(())
    }

    /// Refreshes a folder's counters via STATUS.
    ///
    /// STATUS of the currently open folder is refused: its state is
    /// already live through untagged updates.
    pub async fn status(&mut self, name: &str, items: Vec<StatusAttribute>) -> Result<()> {
        if self.selected.as_deref() == Some(name) {
            return Err(Error::InvalidState(
                "STATUS of the open folder".to_string(),
            ));
        }

        let outcome = self
            .run(&Command::Status {
                mailbox: MailboxName::new(name),
                items,
            })
            .await?;

        let items = status_items(&outcome);
        let result = {
            let folder = self.registry.get_or_create(name, None);
            folder.apply_status_items(&items)
        };
        result.map_err(|err| self.fatal_filter(err))
    }

    /// Requests a checkpoint of the open folder.
    pub async fn check(&mut self) -> Result<()> {
        self.run_selected(&Command::Check).await?;
        Ok(())
    }

    // === Message removal ===

    /// Expunges deleted messages; with a UID set only those messages
    /// (UIDPLUS). Returns the expunged sequence numbers.
    pub async fn expunge(&mut self, uids: Option<&UidSet>) -> Result<Vec<SeqNum>> {
        let name = self.ensure_selected()?.to_string();
        if self
            .registry
            .get(&name)
            .is_some_and(|f| f.access() == FolderAccess::ReadOnly)
        {
            return Err(Error::InvalidState("folder is read-only".to_string()));
        }

        let cmd = match uids {
            Some(set) => {
                self.require_capability(&Capability::UidPlus)?;
                Command::UidExpunge { uids: set.clone() }
            }
            None => Command::Expunge,
        };

        let outcome = self.run_selected(&cmd).await?;
        Ok(expunged_seqs(&outcome))
    }

    // === Append / replace ===

    /// Appends messages, returning their identities when the server
    /// grants UIDPLUS visibility (empty otherwise).
    ///
    /// A message larger than the folder's known append limit fails
    /// client-side without touching the wire.
    pub async fn append(
        &mut self,
        folder_name: &str,
        requests: &[AppendRequest],
    ) -> Result<Vec<UniqueId>> {
        if requests.is_empty() {
            return Ok(Vec::new());
        }

        let limit = self
            .registry
            .get(folder_name)
            .and_then(MailFolder::append_limit)
            .or_else(|| {
                self.capabilities().iter().find_map(|cap| match cap {
                    Capability::AppendLimit(limit) => *limit,
                    _ => None,
                })
            });
        if let Some(limit) = limit {
            for request in requests {
                if request.message.len() > limit as usize {
                    return Err(Error::AppendLimitExceeded {
                        limit,
                        size: request.message.len(),
                    });
                }
            }
        }

        let multi = requests.len() > 1 && self.has_capability(&Capability::MultiAppend);
        self.guard()?;

        let mailbox = MailboxName::new(self.quirks.normalize_mailbox(folder_name));
        self.wire_busy = true;
        let result = match &mut self.conn {
            ConnState::Authed(client) => do_appends(client, &mailbox, requests, multi).await,
            ConnState::Opened(client) => do_appends(client, &mailbox, requests, multi).await,
            ConnState::Offline => {
                self.wire_busy = false;
                return Err(Error::InvalidState("not connected".to_string()));
            }
        };
        self.wire_busy = false;

        let outcomes = match result {
            Ok(outcomes) => outcomes,
            Err(err) => return Err(self.fatal_filter(err)),
        };

        let mut assigned = Vec::new();
        for outcome in &outcomes {
            self.apply_outcome(outcome)?;
            if let Some((validity, uids)) = append_uids(outcome)
                && let Some(expanded) = uids.expand()
            {
                assigned.extend(expanded.into_iter().map(|uid| UniqueId::new(validity, uid)));
            }
        }
        Ok(assigned)
    }

    /// Replaces a message in the open folder (RFC 8508), returning the
    /// replacement's identity when UIDPLUS visibility is granted.
    pub async fn replace(
        &mut self,
        uid: Uid,
        request: &ReplaceRequest,
    ) -> Result<Option<UniqueId>> {
        self.ensure_selected()?;
        self.require_capability(&Capability::Replace)?;
        self.guard()?;

        self.wire_busy = true;
        let result = match &mut self.conn {
            ConnState::Opened(client) => client.uid_replace(uid, request).await,
            _ => {
                self.wire_busy = false;
                return Err(Error::InvalidState("no folder is open".to_string()));
            }
        };
        self.wire_busy = false;

        let outcome = match result {
            Ok(outcome) => outcome,
            Err(err) => return Err(self.fatal_filter(err)),
        };
        self.apply_outcome(&outcome)?;

        Ok(append_uids(&outcome).and_then(|(validity, uids)| {
            uids.expand()
                .and_then(|list| list.first().copied())
                .map(|uid| UniqueId::new(validity, uid))
        }))
    }

    // === Copy / move ===

    /// Copies messages to another folder.
    ///
    /// An empty input set is a no-op: no command is issued and an empty
    /// map is returned.
    pub async fn copy_to(&mut self, uids: &[Uid], destination: &str) -> Result<UniqueIdMap> {
        let Some(set) = UidSet::from_uids(uids) else {
            return Ok(UniqueIdMap::new());
        };

        let outcome = self
            .run_selected(&Command::Copy {
                set: set.as_sequence_set(),
                mailbox: MailboxName::new(destination),
                uid: true,
            })
            .await?;

        Ok(self.build_uid_map(&outcome))
    }

    /// Moves messages to another folder.
    ///
    /// Uses MOVE when advertised; otherwise falls back to COPY plus a
    /// silent \Deleted store and, when UIDPLUS allows it, a targeted
    /// expunge. An empty input set is a no-op.
    pub async fn move_to(&mut self, uids: &[Uid], destination: &str) -> Result<UniqueIdMap> {
        let Some(set) = UidSet::from_uids(uids) else {
            return Ok(UniqueIdMap::new());
        };

        if self.has_capability(&Capability::Move) {
            let outcome = self
                .run_selected(&Command::Move {
                    set: set.as_sequence_set(),
                    mailbox: MailboxName::new(destination),
                    uid: true,
                })
                .await?;
            return Ok(self.build_uid_map(&outcome));
        }

        // Fallback path for servers without MOVE.
        let copy_outcome = self
            .run_selected(&Command::Copy {
                set: set.as_sequence_set(),
                mailbox: MailboxName::new(destination),
                uid: true,
            })
            .await?;
        let map = self.build_uid_map(&copy_outcome);

        let deleted = StoreFlagsRequest::add(crate::types::Flags::from_vec(vec![
            crate::types::Flag::Deleted,
        ]))
        .silent();
        self.run_selected(&Command::Store {
            set: set.as_sequence_set(),
            action: deleted.to_wire(),
            uid: true,
        })
        .await?;

        if self.has_capability(&Capability::UidPlus) {
            self.run_selected(&Command::UidExpunge { uids: set }).await?;
        } else {
            tracing::warn!(
                destination,
                "no UIDPLUS: moved messages remain flagged \\Deleted in the source folder"
            );
        }

        Ok(map)
    }

    fn build_uid_map(&self, outcome: &CommandOutcome) -> UniqueIdMap {
        let source_validity = self
            .selected
            .as_deref()
            .and_then(|name| self.registry.get(name))
            .and_then(MailFolder::uid_validity);

        match (copy_uid(outcome), source_validity) {
            (Some((dest_validity, source, dest)), Some(source_validity)) => {
                match (source.expand(), dest.expand()) {
                    (Some(source), Some(dest)) => {
                        UniqueIdMap::from_lists(source_validity, source, dest_validity, dest)
                    }
                    _ => UniqueIdMap::new(),
                }
            }
            _ => UniqueIdMap::new(),
        }
    }

    // === Fetch ===

    fn gate_fetch_request(&self, request: &FetchRequest) -> Result<()> {
        if request.wants_gmail() {
            self.require_capability(&Capability::GmailExt1)?;
        }
        if request.mod_seq || request.changed_since.is_some() {
            self.require_capability(&Capability::CondStore)?;
        }
        if request.annotations {
            self.require_capability(&Capability::Annotate)?;
        }
        Ok(())
    }

    fn summaries_from(outcome: &CommandOutcome) -> Vec<MessageSummary> {
        fetch_records(outcome)
            .into_iter()
            .map(|(seq, items)| {
                let mut summary = MessageSummary::at(seq);
                summary.absorb_all(&items);
                summary
            })
            .collect()
    }

    /// Fetches summaries by UID set. The preferred retrieval path: UIDs
    /// stay meaningful across reconnects within one validity epoch.
    pub async fn fetch_uids(
        &mut self,
        uids: &UidSet,
        request: &FetchRequest,
    ) -> Result<Vec<MessageSummary>> {
        self.ensure_selected()?;
        self.gate_fetch_request(request)?;

        let mut request = request.clone();
        request.uid = true;

        let outcome = self
            .run_selected(&Command::Fetch {
                set: uids.as_sequence_set(),
                items: request.to_attributes(),
                changed_since: request.changed_since,
                uid: true,
            })
            .await?;

        Ok(Self::summaries_from(&outcome))
    }

    /// Fetches summaries by sequence-number range: the low-level escape
    /// hatch for callers that do not retain identifiers.
    ///
    /// On an empty folder this returns an empty list without issuing a
    /// command.
    pub async fn fetch_range(
        &mut self,
        range: FetchRange,
        request: &FetchRequest,
    ) -> Result<Vec<MessageSummary>> {
        let name = self.ensure_selected()?.to_string();
        self.gate_fetch_request(request)?;

        if range.start == 0 {
            return Err(Error::Argument("sequence numbers start at 1".to_string()));
        }
        if let Some(end) = range.end
            && end < range.start
        {
            return Err(Error::Argument("range end precedes start".to_string()));
        }
        if self.registry.get(&name).is_some_and(|f| f.count() == 0) {
            return Ok(Vec::new());
        }

        let start = SeqNum::new(range.start)
            .ok_or_else(|| Error::Argument("sequence numbers start at 1".to_string()))?;
        let set = match range.end {
            Some(end) => SequenceSet::Range(
                start,
                SeqNum::new(end)
                    .ok_or_else(|| Error::Argument("sequence numbers start at 1".to_string()))?,
            ),
            None => SequenceSet::RangeFrom(start),
        };

        let outcome = self
            .run_selected(&Command::Fetch {
                set,
                items: request.to_attributes(),
                changed_since: request.changed_since,
                uid: false,
            })
            .await?;

        Ok(Self::summaries_from(&outcome))
    }

    /// Fetches a large UID list in bounded batches, reporting progress
    /// after each batch while results stream in.
    pub async fn fetch_uids_batched(
        &mut self,
        uids: &[Uid],
        request: &FetchRequest,
        config: &crate::fetch::BatchConfig,
        mut progress: impl FnMut(crate::fetch::FetchProgress),
    ) -> Result<Vec<MessageSummary>> {
        let batches = config.split_uids(uids);
        let total_batches = batches.len();
        let mut all = Vec::new();

        for (batch_index, set) in batches.into_iter().enumerate() {
            let summaries = self.fetch_uids(&set, request).await?;
            all.extend(summaries.iter().cloned());
            progress(crate::fetch::FetchProgress::Batch {
                batch_index,
                total_batches,
                summaries,
            });
        }

        progress(crate::fetch::FetchProgress::Complete { total: all.len() });
        Ok(all)
    }

    async fn fetch_section(
        &mut self,
        uid: Uid,
        section: Option<String>,
        partial: Option<(u32, u32)>,
    ) -> Result<Vec<u8>> {
        self.ensure_selected()?;

        let outcome = self
            .run_selected(&Command::Fetch {
                set: UidSet::single(uid).as_sequence_set(),
                items: vec![
                    FetchAttribute::Uid,
                    FetchAttribute::Body {
                        section,
                        peek: true,
                        partial,
                    },
                ],
                changed_since: None,
                uid: true,
            })
            .await?;

        for (_, items) in fetch_records(&outcome) {
            for item in items {
                if let FetchItem::Body { data, .. } = item {
                    return Ok(data.unwrap_or_default());
                }
            }
        }
        Err(Error::No(format!("no such message: UID {uid}")))
    }

    /// Retrieves a message's full header block.
    pub async fn get_headers(&mut self, uid: Uid) -> Result<Vec<u8>> {
        self.fetch_section(uid, Some("HEADER".to_string()), None).await
    }

    /// Retrieves the complete message octets.
    pub async fn get_message(&mut self, uid: Uid) -> Result<Vec<u8>> {
        self.fetch_section(uid, None, None).await
    }

    /// Retrieves one body part by section specifier (e.g. `1.2`).
    pub async fn get_body_part(&mut self, uid: Uid, section: &str) -> Result<Vec<u8>> {
        self.fetch_section(uid, Some(section.to_string()), None).await
    }

    /// Retrieves a byte range of a message or body part.
    ///
    /// An offset at or beyond the end yields an empty buffer; a range
    /// crossing the end is truncated by the server.
    pub async fn get_stream(
        &mut self,
        uid: Uid,
        section: Option<&str>,
        offset: u32,
        count: u32,
    ) -> Result<Vec<u8>> {
        self.fetch_section(uid, section.map(ToString::to_string), Some((offset, count)))
            .await
    }

    // === Store ===

    fn ensure_writable(&self) -> Result<()> {
        let name = self.ensure_selected()?;
        if self
            .registry
            .get(name)
            .is_some_and(|f| f.access() == FolderAccess::ReadOnly)
        {
            return Err(Error::InvalidState("folder is read-only".to_string()));
        }
        Ok(())
    }

    fn unmodified_from(outcome: &CommandOutcome) -> Vec<Uid> {
        modified_set(outcome)
            .and_then(|set| set.expand())
            .unwrap_or_default()
    }

    /// Stores flags and keywords on the given UIDs.
    ///
    /// With an `unchanged_since` guard, messages whose mod-sequence has
    /// advanced are silently skipped and their UIDs returned; this is a
    /// conflict report, not an error.
    pub async fn store_flags(
        &mut self,
        uids: &UidSet,
        request: &StoreFlagsRequest,
    ) -> Result<Vec<Uid>> {
        self.ensure_writable()?;
        if request.unchanged_since.is_some() {
            self.require_capability(&Capability::CondStore)?;
        }

        let outcome = self
            .run_selected(&Command::Store {
                set: uids.as_sequence_set(),
                action: request.to_wire(),
                uid: true,
            })
            .await?;
        Ok(Self::unmodified_from(&outcome))
    }

    /// Stores GMail labels on the given UIDs (requires X-GM-EXT-1).
    pub async fn store_labels(
        &mut self,
        uids: &UidSet,
        request: &StoreLabelsRequest,
    ) -> Result<Vec<Uid>> {
        self.ensure_writable()?;
        self.require_capability(&Capability::GmailExt1)?;
        if request.unchanged_since.is_some() {
            self.require_capability(&Capability::CondStore)?;
        }

        let outcome = self
            .run_selected(&Command::Store {
                set: uids.as_sequence_set(),
                action: request.to_wire(),
                uid: true,
            })
            .await?;
        Ok(Self::unmodified_from(&outcome))
    }

    /// Stores annotations on the given UIDs (requires ANNOTATE), with
    /// the same modify-if-unchanged semantics as flags.
    pub async fn store_annotations(
        &mut self,
        uids: &UidSet,
        request: &StoreAnnotationsRequest,
    ) -> Result<Vec<Uid>> {
        self.ensure_writable()?;
        self.require_capability(&Capability::Annotate)?;

        let outcome = self
            .run_selected(&Command::Store {
                set: uids.as_sequence_set(),
                action: request.to_wire(),
                uid: true,
            })
            .await?;
        Ok(Self::unmodified_from(&outcome))
    }

    // === Search / sort / thread ===

    fn subset_query(query: &SearchQuery, subset: Option<&UidSet>) -> SearchQuery {
        match subset {
            Some(set) => SearchQuery::And(vec![SearchQuery::Uid(set.clone()), query.clone()]),
            None => query.clone(),
        }
    }

    /// Searches the open folder by UID.
    pub async fn search(
        &mut self,
        query: &SearchQuery,
        subset: Option<&UidSet>,
        options: SearchOptions,
    ) -> Result<SearchResults> {
        self.ensure_selected()?;
        if options.any() {
            self.require_capability(&Capability::ESearch)?;
        }
        if options.save {
            self.require_capability(&Capability::SearchRes)?;
        }

        let query = Self::subset_query(query, subset);
        let charset = query.needs_charset().then(|| "UTF-8".to_string());
        let outcome = self
            .run_selected(&Command::Search {
                query,
                options,
                charset,
                uid: true,
            })
            .await?;
        Ok(search_results(&outcome))
    }

    /// Server-side sort of matching messages (requires SORT).
    pub async fn sort(
        &mut self,
        order: &[OrderBy],
        query: &SearchQuery,
        subset: Option<&UidSet>,
    ) -> Result<Vec<Uid>> {
        self.ensure_selected()?;
        self.require_capability(&Capability::Sort)?;
        if order.is_empty() {
            return Err(Error::Argument("empty sort criteria".to_string()));
        }

        let outcome = self
            .run_selected(&Command::Sort {
                order: order.to_vec(),
                query: Self::subset_query(query, subset),
                charset: "UTF-8".to_string(),
                uid: true,
            })
            .await?;
        Ok(search_results(&outcome)
            .all
            .iter()
            .copied()
            .filter_map(Uid::new)
            .collect())
    }

    /// Server-side threading of matching messages.
    ///
    /// The algorithm must be among those the server advertises; the
    /// check happens before anything is transmitted.
    pub async fn thread(
        &mut self,
        algorithm: ThreadingAlgorithm,
        query: &SearchQuery,
        subset: Option<&UidSet>,
    ) -> Result<Vec<MessageThread>> {
        let name = self.ensure_selected()?.to_string();
        let supported = self
            .registry
            .get(&name)
            .is_some_and(|f| f.threading_algorithms().contains(&algorithm));
        if !supported {
            return Err(Error::Unsupported(format!("THREAD={algorithm}")));
        }

        let outcome = self
            .run_selected(&Command::Thread {
                algorithm,
                query: Self::subset_query(query, subset),
                charset: "UTF-8".to_string(),
                uid: true,
            })
            .await?;
        Ok(thread_forest(&outcome))
    }

    // === IDLE ===

    /// Idles until the duration elapses, applying pushed updates to the
    /// open folder as they arrive. Terminates the IDLE with DONE and
    /// leaves the folder selected.
    pub async fn idle_for(&mut self, duration: Duration) -> Result<()> {
        let name = self.ensure_selected()?.to_string();
        self.require_capability(&Capability::Idle)?;
        self.guard()?;

        let ConnState::Opened(client) = &mut self.conn else {
            return Err(Error::InvalidState("no folder is open".to_string()));
        };

        self.wire_busy = true;
        let mut handle = match client.idle().await {
            Ok(handle) => handle,
            Err(err) => {
                self.wire_busy = false;
                return Err(self.fatal_filter(err));
            }
        };

        let started = Instant::now();
        let mut failure = None;
        let mut server_ended = false;
        loop {
            let Some(remaining) = duration.checked_sub(started.elapsed()) else {
                break;
            };
            match handle.wait(remaining).await {
                Ok(IdleEvent::Timeout) => break,
                // Keepalives and other untagged noise: keep waiting.
                Ok(IdleEvent::Ignored) => {}
                Ok(IdleEvent::Ended) => {
                    server_ended = true;
                    break;
                }
                Ok(event) => {
                    if let Some(folder) = self.registry.get_mut(&name) {
                        let resp = match event {
                            IdleEvent::Exists(n) => UntaggedResponse::Exists(n),
                            IdleEvent::Recent(n) => UntaggedResponse::Recent(n),
                            IdleEvent::Expunge(seq) => UntaggedResponse::Expunge(seq),
                            IdleEvent::Vanished { earlier, uids } => {
                                UntaggedResponse::Vanished { earlier, uids }
                            }
                            IdleEvent::Fetch { seq, items } => {
                                UntaggedResponse::Fetch { seq, items }
                            }
                            IdleEvent::Ignored | IdleEvent::Ended | IdleEvent::Timeout => {
                                unreachable!()
                            }
                        };
                        if let Err(err) = folder.apply_untagged(&resp) {
                            failure = Some(err);
                            break;
                        }
                    }
                }
                Err(err) => {
                    failure = Some(err);
                    break;
                }
            }
        }

        // The tagged completion already arrived when the server ended
        // the IDLE itself; a DONE at that point would be unsolicited.
        let done = if server_ended {
            drop(handle);
            Ok(())
        } else {
            handle.done().await
        };
        self.wire_busy = false;

        if let Some(err) = failure {
            return Err(self.fatal_filter(err));
        }
        done.map_err(|err| self.fatal_filter(err))
    }

    // === Session end ===

    /// Logs out gracefully.
    pub async fn logout(mut self) -> Result<()> {
        if let Some(name) = self.selected.take()
            && let Some(folder) = self.registry.get_mut(&name)
        {
            folder.mark_closed();
        }
        match std::mem::replace(&mut self.conn, ConnState::Offline) {
            ConnState::Authed(client) => client.logout().await,
            ConnState::Opened(client) => client.logout().await,
            ConnState::Offline => Ok(()),
        }
    }
}

impl<S> std::fmt::Debug for MailEngine<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailEngine")
            .field("selected", &self.selected)
            .field("folders", &self.registry.len())
            .field("wire_busy", &self.wire_busy)
            .finish_non_exhaustive()
    }
}

/// Runs one or more APPENDs on whichever client state holds the wire.
async fn do_appends<S, St>(
    client: &mut Client<S, St>,
    mailbox: &MailboxName,
    requests: &[AppendRequest],
    multi: bool,
) -> Result<Vec<CommandOutcome>>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    if multi {
        let outcome = run_append(client, mailbox, requests).await?;
        return Ok(vec![outcome]);
    }

    let mut outcomes = Vec::with_capacity(requests.len());
    for request in requests {
        outcomes.push(run_append(client, mailbox, std::slice::from_ref(request)).await?);
    }
    Ok(outcomes)
}
