//! Caller-facing request objects.
//!
//! These describe *what* the caller wants; the folder engine lowers them
//! to wire commands, applying capability gates and client-side guards
//! before anything touches the connection.

use crate::command::{FetchAttribute, StoreMode, StoreWire};
use crate::types::{Annotation, Flag, Flags, Label, Labels, ModSeq};

/// Which message fields a fetch should populate.
///
/// Coarse fields are toggles; header selectors are an ordered list; an
/// optional `changed_since` floor restricts the fetch to messages whose
/// mod-sequence exceeds it (CONDSTORE).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchRequest {
    /// Fetch the UID. Always set by the engine for UID-addressed fetches.
    pub uid: bool,
    /// Fetch flags and keywords.
    pub flags: bool,
    /// Fetch the internal date.
    pub internal_date: bool,
    /// Fetch the message size.
    pub size: bool,
    /// Fetch the envelope.
    pub envelope: bool,
    /// Fetch the body structure.
    pub body_structure: bool,
    /// Fetch GMail labels (requires X-GM-EXT-1).
    pub gmail_labels: bool,
    /// Fetch the GMail message id (requires X-GM-EXT-1).
    pub gmail_message_id: bool,
    /// Fetch the GMail thread id (requires X-GM-EXT-1).
    pub gmail_thread_id: bool,
    /// Fetch the mod-sequence (requires CONDSTORE).
    pub mod_seq: bool,
    /// Fetch annotations (requires ANNOTATE).
    pub annotations: bool,
    /// Fetch the References header.
    pub references: bool,
    /// Fetch the preview text (requires PREVIEW support).
    pub preview: bool,
    /// Fetch the save date (requires SAVEDATE).
    pub save_date: bool,
    /// Specific header fields to fetch, in order.
    pub headers: Vec<String>,
    /// Only fetch messages changed since this mod-sequence.
    pub changed_since: Option<ModSeq>,
}

impl FetchRequest {
    /// An empty request; toggle fields as needed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// UID and flags: the minimal synchronization fetch.
    #[must_use]
    pub fn flags_only() -> Self {
        Self {
            uid: true,
            flags: true,
            ..Self::default()
        }
    }

    /// Everything needed for a message list: uid, flags, envelope, date,
    /// size.
    #[must_use]
    pub fn summary() -> Self {
        Self {
            uid: true,
            flags: true,
            internal_date: true,
            size: true,
            envelope: true,
            ..Self::default()
        }
    }

    /// Sets the CONDSTORE floor.
    #[must_use]
    pub fn changed_since(mut self, modseq: ModSeq) -> Self {
        self.changed_since = Some(modseq);
        self
    }

    /// Adds a header field selector.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>) -> Self {
        self.headers.push(name.into());
        self
    }

    /// Lowers the request to wire-level FETCH attributes.
    #[must_use]
    pub fn to_attributes(&self) -> Vec<FetchAttribute> {
        let mut items = Vec::new();
        if self.uid {
            items.push(FetchAttribute::Uid);
        }
        if self.flags {
            items.push(FetchAttribute::Flags);
        }
        if self.internal_date {
            items.push(FetchAttribute::InternalDate);
        }
        if self.size {
            items.push(FetchAttribute::Rfc822Size);
        }
        if self.envelope {
            items.push(FetchAttribute::Envelope);
        }
        if self.body_structure {
            items.push(FetchAttribute::BodyStructure);
        }
        if self.gmail_labels {
            items.push(FetchAttribute::GmailLabels);
        }
        if self.gmail_message_id {
            items.push(FetchAttribute::GmailMessageId);
        }
        if self.gmail_thread_id {
            items.push(FetchAttribute::GmailThreadId);
        }
        if self.mod_seq {
            items.push(FetchAttribute::ModSeq);
        }
        if self.annotations {
            items.push(FetchAttribute::Annotation {
                entries: vec!["/*".to_string()],
                attributes: vec!["value.priv".to_string(), "value.shared".to_string()],
            });
        }
        if self.preview {
            items.push(FetchAttribute::Preview);
        }
        if self.save_date {
            items.push(FetchAttribute::SaveDate);
        }

        let mut header_fields = self.headers.clone();
        if self.references && !header_fields.iter().any(|h| h.eq_ignore_ascii_case("references")) {
            header_fields.push("References".to_string());
        }
        if !header_fields.is_empty() {
            let section = format!("HEADER.FIELDS ({})", header_fields.join(" "));
            items.push(FetchAttribute::Body {
                section: Some(section),
                peek: true,
                partial: None,
            });
        }

        items
    }

    /// Returns true if any GMail-specific field is requested.
    #[must_use]
    pub fn wants_gmail(&self) -> bool {
        self.gmail_labels || self.gmail_message_id || self.gmail_thread_id
    }
}

/// A message to append to a folder.
#[derive(Debug, Clone, PartialEq)]
pub struct AppendRequest {
    /// The full RFC 5322 message octets.
    pub message: Vec<u8>,
    /// Flags to set on the stored message.
    pub flags: Flags,
    /// Internal date override, in IMAP date-time form.
    pub internal_date: Option<String>,
    /// Annotations to attach (requires ANNOTATE).
    pub annotations: Vec<Annotation>,
}

impl AppendRequest {
    /// Creates a request for the given message octets.
    #[must_use]
    pub fn new(message: Vec<u8>) -> Self {
        Self {
            message,
            flags: Flags::new(),
            internal_date: None,
            annotations: Vec::new(),
        }
    }

    /// Adds a flag.
    #[must_use]
    pub fn flag(mut self, flag: Flag) -> Self {
        self.flags.insert(flag);
        self
    }

    /// Sets the internal date.
    #[must_use]
    pub fn internal_date(mut self, date: impl Into<String>) -> Self {
        self.internal_date = Some(date.into());
        self
    }

    /// Attaches an annotation.
    #[must_use]
    pub fn annotation(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }
}

/// A replacement message for an existing one (RFC 8508).
///
/// Carries the same payload as an append; the target message is named by
/// the operation, not the request.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplaceRequest {
    /// The full replacement message octets.
    pub message: Vec<u8>,
    /// Flags to set on the replacement.
    pub flags: Flags,
    /// Internal date override.
    pub internal_date: Option<String>,
}

impl ReplaceRequest {
    /// Creates a request for the given message octets.
    #[must_use]
    pub fn new(message: Vec<u8>) -> Self {
        Self {
            message,
            flags: Flags::new(),
            internal_date: None,
        }
    }

    /// Adds a flag.
    #[must_use]
    pub fn flag(mut self, flag: Flag) -> Self {
        self.flags.insert(flag);
        self
    }
}

/// A flags/keywords mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreFlagsRequest {
    /// Add, remove, or replace.
    pub mode: StoreMode,
    /// Flags and keywords to apply.
    pub flags: Flags,
    /// Suppress the untagged FETCH echo.
    pub silent: bool,
    /// Skip messages whose mod-sequence exceeds this value; their
    /// identifiers are reported back instead of an error.
    pub unchanged_since: Option<ModSeq>,
}

impl StoreFlagsRequest {
    /// Creates a request with the given mode and flags.
    #[must_use]
    pub fn new(mode: StoreMode, flags: Flags) -> Self {
        Self {
            mode,
            flags,
            silent: false,
            unchanged_since: None,
        }
    }

    /// Adds flags without echoed FETCH responses.
    #[must_use]
    pub fn add(flags: Flags) -> Self {
        Self::new(StoreMode::Add, flags)
    }

    /// Removes flags.
    #[must_use]
    pub fn remove(flags: Flags) -> Self {
        Self::new(StoreMode::Remove, flags)
    }

    /// Suppresses the untagged FETCH echo.
    #[must_use]
    pub fn silent(mut self) -> Self {
        self.silent = true;
        self
    }

    /// Sets the CONDSTORE guard.
    #[must_use]
    pub fn unchanged_since(mut self, modseq: ModSeq) -> Self {
        self.unchanged_since = Some(modseq);
        self
    }

    pub(crate) fn to_wire(&self) -> StoreWire {
        StoreWire::Flags {
            mode: self.mode,
            silent: self.silent,
            flags: self.flags.clone(),
            unchanged_since: self.unchanged_since,
        }
    }
}

/// A GMail labels mutation (requires X-GM-EXT-1).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreLabelsRequest {
    /// Add, remove, or replace.
    pub mode: StoreMode,
    /// Labels to apply.
    pub labels: Labels,
    /// Suppress the untagged FETCH echo.
    pub silent: bool,
    /// CONDSTORE guard, as for flags.
    pub unchanged_since: Option<ModSeq>,
}

impl StoreLabelsRequest {
    /// Creates a request with the given mode and labels.
    #[must_use]
    pub fn new(mode: StoreMode, labels: Labels) -> Self {
        Self {
            mode,
            labels,
            silent: false,
            unchanged_since: None,
        }
    }

    /// Adds a label.
    #[must_use]
    pub fn label(mut self, label: Label) -> Self {
        self.labels.insert(label);
        self
    }

    /// Suppresses the untagged FETCH echo.
    #[must_use]
    pub fn silent(mut self) -> Self {
        self.silent = true;
        self
    }

    /// Sets the CONDSTORE guard.
    #[must_use]
    pub fn unchanged_since(mut self, modseq: ModSeq) -> Self {
        self.unchanged_since = Some(modseq);
        self
    }

    pub(crate) fn to_wire(&self) -> StoreWire {
        StoreWire::Labels {
            mode: self.mode,
            silent: self.silent,
            labels: self.labels.clone(),
            unchanged_since: self.unchanged_since,
        }
    }
}

/// An annotations mutation (requires ANNOTATE).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreAnnotationsRequest {
    /// Annotations to store; a `None` value removes an entry.
    pub annotations: Vec<Annotation>,
    /// Modify-if-unchanged guard, as for flags.
    pub unchanged_since: Option<ModSeq>,
}

impl StoreAnnotationsRequest {
    /// Creates a request storing the given annotations.
    #[must_use]
    pub fn new(annotations: Vec<Annotation>) -> Self {
        Self {
            annotations,
            unchanged_since: None,
        }
    }

    /// Sets the modify-if-unchanged guard.
    #[must_use]
    pub fn unchanged_since(mut self, modseq: ModSeq) -> Self {
        self.unchanged_since = Some(modseq);
        self
    }

    pub(crate) fn to_wire(&self) -> StoreWire {
        StoreWire::Annotations {
            annotations: self.annotations.clone(),
            unchanged_since: self.unchanged_since,
        }
    }
}
