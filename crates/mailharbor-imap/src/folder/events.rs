//! The folder event surface.
//!
//! Observers subscribe per folder and are invoked synchronously during
//! response dispatch, in wire-arrival order, before the caller sees the
//! completion of the command that triggered them. Callbacks must not
//! re-enter the engine.

use crate::types::{
    Annotation, Flags, Labels, MessageSummary, ModSeq, SeqNum, Uid, UidSet, UidValidity,
};

/// A change in folder or message state.
#[derive(Debug, Clone, PartialEq)]
pub enum FolderEvent {
    /// The folder was opened.
    Opened,
    /// The folder was closed.
    Closed,
    /// The folder was deleted on the server.
    Deleted,
    /// The folder was renamed.
    Renamed {
        /// New parent path, when the folder moved.
        new_parent: Option<String>,
        /// New leaf name.
        new_name: String,
    },
    /// The folder was subscribed.
    Subscribed,
    /// The folder was unsubscribed.
    Unsubscribed,
    /// A message was expunged; later sequence numbers shift down.
    MessageExpunged {
        /// The expunged message's sequence number at removal time.
        index: SeqNum,
    },
    /// Messages vanished by UID (QRESYNC).
    MessagesVanished {
        /// The vanished UIDs.
        uids: UidSet,
        /// True when reporting expunges from before this session.
        earlier: bool,
    },
    /// A message's flags changed.
    MessageFlagsChanged {
        /// Sequence number, when known.
        index: Option<SeqNum>,
        /// UID, when known.
        uid: Option<Uid>,
        /// The full new flag set.
        flags: Flags,
        /// Mod-sequence accompanying the change.
        mod_seq: Option<ModSeq>,
    },
    /// A message's GMail labels changed.
    MessageLabelsChanged {
        /// Sequence number, when known.
        index: Option<SeqNum>,
        /// UID, when known.
        uid: Option<Uid>,
        /// The full new label set.
        labels: Labels,
        /// Mod-sequence accompanying the change.
        mod_seq: Option<ModSeq>,
    },
    /// A message's annotations changed.
    AnnotationsChanged {
        /// Sequence number, when known.
        index: Option<SeqNum>,
        /// UID, when known.
        uid: Option<Uid>,
        /// The reported annotations.
        annotations: Vec<Annotation>,
        /// Mod-sequence accompanying the change.
        mod_seq: Option<ModSeq>,
    },
    /// A message's mod-sequence advanced without other visible changes.
    ModSeqChanged {
        /// Sequence number, when known.
        index: Option<SeqNum>,
        /// UID, when known.
        uid: Option<Uid>,
        /// The new mod-sequence.
        mod_seq: ModSeq,
    },
    /// A fetched summary was merged into the cache.
    MessageSummaryFetched(Box<MessageSummary>),
    /// A metadata entry changed (RFC 5464).
    MetadataChanged {
        /// Entry name, e.g. `/shared/comment`.
        entry: String,
        /// New value; `None` when unset or unknown.
        value: Option<String>,
    },
    /// The folder's highest mod-sequence advanced.
    HighestModSeqChanged(ModSeq),
    /// The predicted next UID advanced.
    UidNextChanged(Uid),
    /// The UIDVALIDITY epoch changed: every cached UID is now invalid.
    UidValidityChanged(UidValidity),
    /// The stable folder id changed (OBJECTID).
    IdChanged(String),
    /// The folder's total size changed.
    SizeChanged(u64),
    /// The message count changed.
    CountChanged(u32),
    /// The recent count changed.
    RecentChanged(u32),
    /// The unread count changed.
    UnreadChanged(u32),
    /// Cached message state was discarded (validity change or reopen).
    CacheDiscarded,
}

/// Observer of one folder's events.
///
/// Invocations are synchronous and hold no engine locks; do not call
/// back into the engine from a callback.
pub trait FolderObserver {
    /// Called for every event on the observed folder.
    fn on_event(&mut self, folder: &str, event: &FolderEvent);
}

impl<F> FolderObserver for F
where
    F: FnMut(&str, &FolderEvent),
{
    fn on_event(&mut self, folder: &str, event: &FolderEvent) {
        self(folder, event);
    }
}

/// An observer that records events for inspection (used in tests).
#[derive(Debug, Default)]
pub struct CollectingObserver {
    /// Recorded (folder, event) pairs in arrival order.
    pub events: Vec<(String, FolderEvent)>,
}

impl CollectingObserver {
    /// Creates an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes the recorded events.
    pub fn take(&mut self) -> Vec<(String, FolderEvent)> {
        std::mem::take(&mut self.events)
    }
}

impl FolderObserver for CollectingObserver {
    fn on_event(&mut self, folder: &str, event: &FolderEvent) {
        self.events.push((folder.to_string(), event.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collecting_observer_records_in_order() {
        let mut observer = CollectingObserver::new();
        observer.on_event("INBOX", &FolderEvent::CountChanged(3));
        observer.on_event("INBOX", &FolderEvent::RecentChanged(1));

        let events = observer.take();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].1, FolderEvent::CountChanged(3));
        assert!(observer.events.is_empty());
    }

    #[test]
    fn closures_are_observers() {
        let mut seen = 0u32;
        {
            let mut observer = |_: &str, event: &FolderEvent| {
                if let FolderEvent::CountChanged(n) = event {
                    seen = *n;
                }
            };
            observer.on_event("INBOX", &FolderEvent::CountChanged(7));
        }
        assert_eq!(seen, 7);
    }
}
