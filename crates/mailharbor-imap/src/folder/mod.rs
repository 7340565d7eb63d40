//! The folder subsystem.
//!
//! [`MailFolder`] is the per-mailbox cache: attributes, counters,
//! validity tracking, a sparse message-summary cache, and the observer
//! list. Folders are created by the engine when the server lists them,
//! mutated only during response dispatch and by explicit operations, and
//! live in a [`registry::FolderRegistry`] keyed by full name. The
//! parent relation is a lookup through the registry, never ownership.

mod engine;
mod events;
mod registry;
mod sync;

pub use engine::{FetchRange, MailEngine};
pub use events::{CollectingObserver, FolderEvent, FolderObserver};
pub use registry::FolderRegistry;
pub use sync::{QresyncParams, SyncState};

use std::collections::BTreeMap;

use crate::parser::{FetchItem, StatusItem, UntaggedResponse};
use crate::types::{
    AnnotationAccess, AnnotationScopes, Flags, FolderAccess, ListEntry, MailboxAttribute,
    MailboxStatus, MessageSummary, ModSeq, ResponseCode, SeqNum, ThreadingAlgorithm, Uid,
    UidValidity,
};
use crate::{Error, Result};

/// Per-mailbox state, event source, and summary cache.
pub struct MailFolder {
    /// Server-authoritative full path.
    full_name: String,
    /// Hierarchy delimiter.
    delimiter: Option<char>,
    /// LIST attributes, including SPECIAL-USE.
    attributes: Vec<MailboxAttribute>,
    /// Current access mode.
    access: FolderAccess,
    /// Whether the folder is currently open.
    is_open: bool,
    /// Whether the folder exists on the server.
    exists: bool,
    /// Whether the folder is subscribed.
    is_subscribed: bool,
    /// Whether this node is a namespace prefix rather than a mailbox.
    is_namespace: bool,

    /// Flags the server will persist.
    permanent_flags: Flags,
    /// Flags currently applicable.
    accepted_flags: Flags,
    /// Whether new keywords may be created (`\*`).
    accepts_new_keywords: bool,

    /// UIDVALIDITY epoch.
    uid_validity: Option<UidValidity>,
    /// Predicted next UID.
    uid_next: Option<Uid>,
    /// Highest mod-sequence seen.
    highest_mod_seq: Option<ModSeq>,
    /// Exact message count.
    count: u32,
    /// Recent count.
    recent: u32,
    /// Unread count, when reported.
    unread: Option<u32>,
    /// First unread sequence number, when reported.
    first_unread: Option<SeqNum>,
    /// Total size in octets, when reported.
    size: Option<u64>,
    /// Per-mailbox append limit, when advertised.
    append_limit: Option<u32>,
    /// Stable identifier (OBJECTID), survives renames.
    id: Option<String>,
    /// Annotation access level.
    annotation_access: AnnotationAccess,
    /// Supported annotation scopes.
    annotation_scopes: AnnotationScopes,
    /// Maximum accepted annotation size.
    max_annotation_size: Option<u32>,
    /// Threading algorithms the server offers.
    threading_algorithms: Vec<ThreadingAlgorithm>,

    /// Sparse summary cache keyed by sequence number.
    summaries: BTreeMap<u32, MessageSummary>,
    /// Observers, invoked synchronously in subscription order.
    observers: Vec<Box<dyn FolderObserver>>,
}

impl std::fmt::Debug for MailFolder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailFolder")
            .field("full_name", &self.full_name)
            .field("access", &self.access)
            .field("is_open", &self.is_open)
            .field("uid_validity", &self.uid_validity)
            .field("count", &self.count)
            .finish_non_exhaustive()
    }
}

impl MailFolder {
    /// Creates a folder record for the given full name.
    #[must_use]
    pub fn new(full_name: impl Into<String>, delimiter: Option<char>) -> Self {
        Self {
            full_name: full_name.into(),
            delimiter,
            attributes: Vec::new(),
            access: FolderAccess::None,
            is_open: false,
            exists: true,
            is_subscribed: false,
            is_namespace: false,
            permanent_flags: Flags::new(),
            accepted_flags: Flags::new(),
            accepts_new_keywords: false,
            uid_validity: None,
            uid_next: None,
            highest_mod_seq: None,
            count: 0,
            recent: 0,
            unread: None,
            first_unread: None,
            size: None,
            append_limit: None,
            id: None,
            annotation_access: AnnotationAccess::None,
            annotation_scopes: AnnotationScopes::default(),
            max_annotation_size: None,
            threading_algorithms: Vec::new(),
            summaries: BTreeMap::new(),
            observers: Vec::new(),
        }
    }

    /// Creates a folder from a LIST entry.
    #[must_use]
    pub fn from_list_entry(entry: &ListEntry) -> Self {
        let mut folder = Self::new(entry.name.as_str(), entry.delimiter);
        folder.attributes = entry.attributes.clone();
        folder.is_subscribed = entry.attributes.contains(&MailboxAttribute::Subscribed);
        folder.exists = !entry.attributes.contains(&MailboxAttribute::NonExistent);
        folder
    }

    // === Accessors ===

    /// Server-authoritative full path.
    #[must_use]
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// Leaf name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self.delimiter {
            Some(d) => self.full_name.rsplit(d).next().unwrap_or(&self.full_name),
            None => &self.full_name,
        }
    }

    /// Hierarchy delimiter.
    #[must_use]
    pub fn directory_separator(&self) -> Option<char> {
        self.delimiter
    }

    /// Full path of the parent, resolved lexically; the folder object
    /// itself is obtained through the registry.
    #[must_use]
    pub fn parent_name(&self) -> Option<String> {
        let d = self.delimiter?;
        self.full_name.rfind(d).map(|idx| self.full_name[..idx].to_string())
    }

    /// LIST attributes.
    #[must_use]
    pub fn attributes(&self) -> &[MailboxAttribute] {
        &self.attributes
    }

    /// Current access mode.
    #[must_use]
    pub fn access(&self) -> FolderAccess {
        self.access
    }

    /// True while the folder is the session's selected mailbox.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.is_open
    }

    /// True if the folder exists on the server.
    #[must_use]
    pub fn exists(&self) -> bool {
        self.exists
    }

    /// True if subscribed.
    #[must_use]
    pub fn is_subscribed(&self) -> bool {
        self.is_subscribed
    }

    /// True for namespace prefixes.
    #[must_use]
    pub fn is_namespace(&self) -> bool {
        self.is_namespace
    }

    /// Flags the server persists.
    #[must_use]
    pub fn permanent_flags(&self) -> &Flags {
        &self.permanent_flags
    }

    /// Flags currently applicable.
    #[must_use]
    pub fn accepted_flags(&self) -> &Flags {
        &self.accepted_flags
    }

    /// Whether user-defined keywords may be created.
    #[must_use]
    pub fn accepts_new_keywords(&self) -> bool {
        self.accepts_new_keywords
    }

    /// Persistent keywords.
    #[must_use]
    pub fn permanent_keywords(&self) -> Vec<&str> {
        self.permanent_flags.keywords().collect()
    }

    /// Applicable keywords.
    #[must_use]
    pub fn accepted_keywords(&self) -> Vec<&str> {
        self.accepted_flags.keywords().collect()
    }

    /// UIDVALIDITY epoch.
    #[must_use]
    pub fn uid_validity(&self) -> Option<UidValidity> {
        self.uid_validity
    }

    /// Predicted next UID.
    #[must_use]
    pub fn uid_next(&self) -> Option<Uid> {
        self.uid_next
    }

    /// Highest mod-sequence.
    #[must_use]
    pub fn highest_mod_seq(&self) -> Option<ModSeq> {
        self.highest_mod_seq
    }

    /// Exact message count.
    #[must_use]
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Recent count.
    #[must_use]
    pub fn recent(&self) -> u32 {
        self.recent
    }

    /// Unread count, when known.
    #[must_use]
    pub fn unread(&self) -> Option<u32> {
        self.unread
    }

    /// First unread sequence number, when known.
    #[must_use]
    pub fn first_unread(&self) -> Option<SeqNum> {
        self.first_unread
    }

    /// Total size in octets, when known.
    #[must_use]
    pub fn size(&self) -> Option<u64> {
        self.size
    }

    /// Append limit, when advertised.
    #[must_use]
    pub fn append_limit(&self) -> Option<u32> {
        self.append_limit
    }

    /// Stable folder id (OBJECTID), when advertised.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Annotation access level.
    #[must_use]
    pub fn annotation_access(&self) -> AnnotationAccess {
        self.annotation_access
    }

    /// Supported annotation scopes.
    #[must_use]
    pub fn annotation_scopes(&self) -> AnnotationScopes {
        self.annotation_scopes
    }

    /// Maximum accepted annotation size.
    #[must_use]
    pub fn max_annotation_size(&self) -> Option<u32> {
        self.max_annotation_size
    }

    /// Threading algorithms the server offers.
    #[must_use]
    pub fn threading_algorithms(&self) -> &[ThreadingAlgorithm] {
        &self.threading_algorithms
    }

    /// Returns the cached summary at a sequence number.
    #[must_use]
    pub fn summary_at(&self, seq: SeqNum) -> Option<&MessageSummary> {
        self.summaries.get(&seq.get())
    }

    /// Returns the cached summary for a UID.
    #[must_use]
    pub fn summary_by_uid(&self, uid: Uid) -> Option<&MessageSummary> {
        self.summaries.values().find(|s| s.uid == Some(uid))
    }

    /// Number of cached summaries.
    #[must_use]
    pub fn cached_summaries(&self) -> usize {
        self.summaries.len()
    }

    // === Observers ===

    /// Subscribes an observer to this folder's events.
    pub fn subscribe_events(&mut self, observer: Box<dyn FolderObserver>) {
        self.observers.push(observer);
    }

    pub(crate) fn emit(&mut self, event: &FolderEvent) {
        for observer in &mut self.observers {
            observer.on_event(&self.full_name, event);
        }
    }

    // === Mutation (engine only) ===

    pub(crate) fn set_threading_algorithms(&mut self, algorithms: Vec<ThreadingAlgorithm>) {
        self.threading_algorithms = algorithms;
    }

    pub(crate) fn set_append_limit(&mut self, limit: Option<u32>) {
        self.append_limit = limit;
    }

    pub(crate) fn set_subscribed(&mut self, subscribed: bool) {
        if self.is_subscribed != subscribed {
            self.is_subscribed = subscribed;
            let event = if subscribed {
                FolderEvent::Subscribed
            } else {
                FolderEvent::Unsubscribed
            };
            self.emit(&event);
        }
    }

    pub(crate) fn set_namespace(&mut self, is_namespace: bool) {
        self.is_namespace = is_namespace;
    }

    pub(crate) fn merge_list_entry(&mut self, entry: &ListEntry) {
        self.attributes = entry.attributes.clone();
        self.delimiter = entry.delimiter.or(self.delimiter);
        if entry.attributes.contains(&MailboxAttribute::Subscribed) {
            self.is_subscribed = true;
        }
        self.exists = !entry.attributes.contains(&MailboxAttribute::NonExistent);
    }

    pub(crate) fn mark_deleted(&mut self) {
        self.exists = false;
        self.is_open = false;
        self.access = FolderAccess::None;
        self.summaries.clear();
        self.emit(&FolderEvent::Deleted);
    }

    pub(crate) fn mark_renamed(&mut self, new_full_name: String) {
        self.full_name = new_full_name;
        let new_name = self.name().to_string();
        let new_parent = self.parent_name();
        self.emit(&FolderEvent::Renamed {
            new_parent,
            new_name,
        });
    }

    /// Marks the folder open, emitting `Opened`.
    pub(crate) fn mark_opened(&mut self, access: FolderAccess) {
        self.is_open = true;
        self.access = access;
        self.emit(&FolderEvent::Opened);
    }

    /// Marks the folder closed, emitting `Closed`.
    pub(crate) fn mark_closed(&mut self) {
        if self.is_open {
            self.is_open = false;
            self.access = FolderAccess::None;
            self.emit(&FolderEvent::Closed);
        }
    }

    /// Replaces the message count, adjusting before the event fires.
    pub(crate) fn set_count(&mut self, count: u32) {
        if self.count != count {
            self.count = count;
            self.emit(&FolderEvent::CountChanged(count));
        }
    }

    fn set_recent(&mut self, recent: u32) {
        if self.recent != recent {
            self.recent = recent;
            self.emit(&FolderEvent::RecentChanged(recent));
        }
    }

    fn set_unread(&mut self, unread: u32) {
        if self.unread != Some(unread) {
            self.unread = Some(unread);
            self.emit(&FolderEvent::UnreadChanged(unread));
        }
    }

    fn set_size(&mut self, size: u64) {
        if self.size != Some(size) {
            self.size = Some(size);
            self.emit(&FolderEvent::SizeChanged(size));
        }
    }

    fn set_id(&mut self, id: String) {
        if self.id.as_deref() != Some(id.as_str()) {
            self.id = Some(id.clone());
            self.emit(&FolderEvent::IdChanged(id));
        }
    }

    fn set_uid_next(&mut self, uid_next: Uid) {
        if let Some(current) = self.uid_next
            && uid_next < current
        {
            tracing::warn!(
                folder = %self.full_name,
                current = current.get(),
                reported = uid_next.get(),
                "ignoring UIDNEXT regression"
            );
            return;
        }
        if self.uid_next != Some(uid_next) {
            self.uid_next = Some(uid_next);
            self.emit(&FolderEvent::UidNextChanged(uid_next));
        }
    }

    fn set_highest_mod_seq(&mut self, modseq: ModSeq) {
        if let Some(current) = self.highest_mod_seq
            && modseq < current
        {
            tracing::warn!(
                folder = %self.full_name,
                current = current.get(),
                reported = modseq.get(),
                "ignoring HIGHESTMODSEQ regression"
            );
            return;
        }
        if self.highest_mod_seq != Some(modseq) {
            self.highest_mod_seq = Some(modseq);
            self.emit(&FolderEvent::HighestModSeqChanged(modseq));
        }
    }

    /// Applies a UIDVALIDITY observation.
    ///
    /// While the folder is open the value must not change; a divergent
    /// value is a protocol violation that ends the session. Across a
    /// reopen, a change invalidates every cached UID: the summary cache
    /// is dropped and `CacheDiscarded` follows `UidValidityChanged`.
    fn set_uid_validity(&mut self, validity: UidValidity) -> Result<()> {
        match self.uid_validity {
            Some(current) if current == validity => Ok(()),
            Some(current) if self.is_open => Err(Error::Protocol(format!(
                "UIDVALIDITY changed from {current} to {validity} on open folder {}",
                self.full_name
            ))),
            Some(_) => {
                self.uid_validity = Some(validity);
                self.summaries.clear();
                self.emit(&FolderEvent::UidValidityChanged(validity));
                self.emit(&FolderEvent::CacheDiscarded);
                Ok(())
            }
            None => {
                self.uid_validity = Some(validity);
                self.emit(&FolderEvent::UidValidityChanged(validity));
                Ok(())
            }
        }
    }

    /// Applies one untagged response to folder state, emitting events
    /// before the triggering command's completion is surfaced.
    pub(crate) fn apply_untagged(&mut self, resp: &UntaggedResponse) -> Result<()> {
        match resp {
            UntaggedResponse::Exists(n) => self.set_count(*n),
            UntaggedResponse::Recent(n) => self.set_recent(*n),
            UntaggedResponse::Expunge(seq) => self.apply_expunge(*seq),
            UntaggedResponse::Vanished { earlier, uids } => {
                self.apply_vanished(uids, *earlier);
            }
            UntaggedResponse::Fetch { seq, items } => self.apply_fetch(*seq, items),
            UntaggedResponse::Flags(flags) => {
                self.accepted_flags = flags.clone();
            }
            UntaggedResponse::Ok {
                code: Some(code), ..
            }
            | UntaggedResponse::No {
                code: Some(code), ..
            }
            | UntaggedResponse::Bad {
                code: Some(code), ..
            } => self.apply_code(code)?,
            UntaggedResponse::Status { mailbox, items } => {
                if mailbox.as_str() == self.full_name {
                    self.apply_status_items(items)?;
                }
            }
            UntaggedResponse::Metadata { mailbox, entries } => {
                if mailbox.as_str() == self.full_name {
                    for (entry, value) in entries {
                        self.emit(&FolderEvent::MetadataChanged {
                            entry: entry.clone(),
                            value: value.clone(),
                        });
                    }
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Applies a status response code.
    pub(crate) fn apply_code(&mut self, code: &ResponseCode) -> Result<()> {
        match code {
            ResponseCode::UidValidity(v) => self.set_uid_validity(*v)?,
            ResponseCode::UidNext(v) => self.set_uid_next(*v),
            ResponseCode::HighestModSeq(v) => self.set_highest_mod_seq(*v),
            ResponseCode::NoModSeq => self.highest_mod_seq = None,
            ResponseCode::Unseen(seq) => self.first_unread = Some(*seq),
            ResponseCode::PermanentFlags {
                flags,
                accepts_new_keywords,
            } => {
                self.permanent_flags = flags.clone();
                self.accepts_new_keywords = *accepts_new_keywords;
            }
            ResponseCode::ReadOnly => self.access = FolderAccess::ReadOnly,
            ResponseCode::ReadWrite => self.access = FolderAccess::ReadWrite,
            ResponseCode::MailboxId(id) => self.set_id(id.clone()),
            _ => {}
        }
        Ok(())
    }

    /// Applies STATUS items (for folders queried without selection).
    pub(crate) fn apply_status_items(&mut self, items: &[StatusItem]) -> Result<()> {
        for item in items {
            match item {
                StatusItem::Messages(n) => self.set_count(*n),
                StatusItem::Recent(n) => self.set_recent(*n),
                StatusItem::Unseen(n) => self.set_unread(*n),
                StatusItem::UidNext(uid) => self.set_uid_next(*uid),
                StatusItem::UidValidity(v) => self.set_uid_validity(*v)?,
                StatusItem::HighestModSeq(m) => self.set_highest_mod_seq(*m),
                StatusItem::Size(n) => self.set_size(*n),
                StatusItem::AppendLimit(n) => self.append_limit = Some(*n),
                StatusItem::MailboxId(id) => self.set_id(id.clone()),
                StatusItem::Deleted(_) => {}
            }
        }
        Ok(())
    }

    /// An EXPUNGE removes one message and shifts later sequence numbers
    /// down; the count is adjusted before the event fires.
    fn apply_expunge(&mut self, seq: SeqNum) {
        self.count = self.count.saturating_sub(1);

        let removed = seq.get();
        self.summaries.remove(&removed);
        let shifted: Vec<(u32, MessageSummary)> = self
            .summaries
            .split_off(&removed)
            .into_iter()
            .map(|(k, mut v)| {
                let new_seq = k - 1;
                v.seq = SeqNum::new(new_seq);
                (new_seq, v)
            })
            .collect();
        self.summaries.extend(shifted);

        self.emit(&FolderEvent::MessageExpunged { index: seq });
        let count = self.count;
        self.emit(&FolderEvent::CountChanged(count));
    }

    /// A VANISHED response removes messages by UID without sequence
    /// shifting semantics of its own.
    fn apply_vanished(&mut self, uids: &crate::types::UidSet, earlier: bool) {
        let before = self.summaries.len();
        self.summaries
            .retain(|_, summary| !summary.uid.is_some_and(|uid| uids.contains(uid)));
        let removed = before - self.summaries.len();
        if !earlier {
            self.count = self.count.saturating_sub(
                u32::try_from(removed).unwrap_or(u32::MAX),
            );
        }

        self.emit(&FolderEvent::MessagesVanished {
            uids: uids.clone(),
            earlier,
        });
    }

    /// Merges a FETCH into the summary cache and fans out change events.
    fn apply_fetch(&mut self, seq: SeqNum, items: &[FetchItem]) {
        let summary = self
            .summaries
            .entry(seq.get())
            .or_insert_with(|| MessageSummary::at(seq));
        summary.absorb_all(items);
        let snapshot = summary.clone();

        let uid = snapshot.uid;
        let mod_seq = snapshot.mod_seq;

        let mut metadata_changed = false;
        for item in items {
            match item {
                FetchItem::Flags(flags) => {
                    metadata_changed = true;
                    self.emit(&FolderEvent::MessageFlagsChanged {
                        index: Some(seq),
                        uid,
                        flags: flags.clone(),
                        mod_seq,
                    });
                }
                FetchItem::GmailLabels(labels) => {
                    metadata_changed = true;
                    self.emit(&FolderEvent::MessageLabelsChanged {
                        index: Some(seq),
                        uid,
                        labels: labels.clone(),
                        mod_seq,
                    });
                }
                FetchItem::Annotations(annotations) => {
                    metadata_changed = true;
                    self.emit(&FolderEvent::AnnotationsChanged {
                        index: Some(seq),
                        uid,
                        annotations: annotations.clone(),
                        mod_seq,
                    });
                }
                _ => {}
            }
        }

        if !metadata_changed && let Some(mod_seq) = mod_seq {
            let has_modseq_item = items.iter().any(|i| matches!(i, FetchItem::ModSeq(_)));
            if has_modseq_item {
                self.emit(&FolderEvent::ModSeqChanged {
                    index: Some(seq),
                    uid,
                    mod_seq,
                });
            }
        }

        self.emit(&FolderEvent::MessageSummaryFetched(Box::new(snapshot)));
    }

    /// Applies the assembled SELECT/EXAMINE status snapshot.
    pub(crate) fn apply_selection_status(&mut self, status: &MailboxStatus) -> Result<()> {
        if let Some(v) = status.uid_validity {
            self.set_uid_validity(v)?;
        }
        if let Some(v) = status.uid_next {
            self.set_uid_next(v);
        }
        if let Some(m) = status.highest_mod_seq {
            self.set_highest_mod_seq(m);
        }
        self.accepted_flags = status.flags.clone();
        self.permanent_flags = status.permanent_flags.clone();
        self.accepts_new_keywords = status.accepts_new_keywords;
        self.first_unread = status.unseen;
        if let Some(id) = &status.mailbox_id {
            self.set_id(id.clone());
        }
        self.set_recent(status.recent);
        self.set_count(status.exists);
        Ok(())
    }
}
