//! Message summaries: envelope, body structure, and the sparse
//! [`MessageSummary`] record assembled from FETCH responses.

use super::{
    Annotation, Flags, GmailMessageId, GmailThreadId, Labels, ModSeq, SeqNum, Uid, UniqueId,
    UidValidity,
};
use crate::parser::FetchItem;

/// Message envelope, as reported by the ENVELOPE fetch item.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Envelope {
    /// Date header.
    pub date: Option<String>,
    /// Subject header.
    pub subject: Option<String>,
    /// From addresses.
    pub from: Vec<Address>,
    /// Sender addresses.
    pub sender: Vec<Address>,
    /// Reply-To addresses.
    pub reply_to: Vec<Address>,
    /// To addresses.
    pub to: Vec<Address>,
    /// Cc addresses.
    pub cc: Vec<Address>,
    /// Bcc addresses.
    pub bcc: Vec<Address>,
    /// In-Reply-To header.
    pub in_reply_to: Option<String>,
    /// Message-ID header.
    pub message_id: Option<String>,
}

/// Email address from an envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    /// Display name.
    pub name: Option<String>,
    /// Source route (obsolete).
    pub adl: Option<String>,
    /// Mailbox name (local part).
    pub mailbox: Option<String>,
    /// Host name (domain part).
    pub host: Option<String>,
}

impl Address {
    /// Returns the full email address when both parts are present.
    #[must_use]
    pub fn email(&self) -> Option<String> {
        match (&self.mailbox, &self.host) {
            (Some(m), Some(h)) => Some(format!("{m}@{h}")),
            _ => None,
        }
    }
}

/// Abstract body-structure tree from the BODYSTRUCTURE fetch item.
///
/// MIME parsing proper is out of scope; this is the opaque shape the
/// server reports, sufficient for selecting body sections to download.
#[derive(Debug, Clone, PartialEq)]
pub enum BodyStructure {
    /// Single-part non-text body.
    Basic {
        /// MIME type.
        media_type: String,
        /// MIME subtype.
        media_subtype: String,
        /// Body parameters.
        params: Vec<(String, String)>,
        /// Content-ID.
        id: Option<String>,
        /// Content-Description.
        description: Option<String>,
        /// Content-Transfer-Encoding.
        encoding: String,
        /// Body size in bytes.
        size: u32,
    },
    /// Text body.
    Text {
        /// Text subtype.
        subtype: String,
        /// Body parameters.
        params: Vec<(String, String)>,
        /// Content-ID.
        id: Option<String>,
        /// Content-Description.
        description: Option<String>,
        /// Content-Transfer-Encoding.
        encoding: String,
        /// Body size in bytes.
        size: u32,
        /// Size in lines.
        lines: u32,
    },
    /// Nested message/rfc822 body.
    Message {
        /// Envelope of the nested message.
        envelope: Box<Envelope>,
        /// Body structure of the nested message.
        body: Box<Self>,
        /// Size in lines.
        lines: u32,
    },
    /// Multipart body.
    Multipart {
        /// Child body parts.
        parts: Vec<Self>,
        /// Multipart subtype.
        subtype: String,
    },
}

/// A sparse record of everything known about one message.
///
/// Fields are populated only when the corresponding FETCH item was
/// requested or volunteered by the server; everything else stays `None`.
/// Summaries are addressed by (folder, sequence number, UID).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MessageSummary {
    /// Sequence number within the current selection.
    pub seq: Option<SeqNum>,
    /// UID within the folder's current validity epoch.
    pub uid: Option<Uid>,
    /// Message flags and keywords.
    pub flags: Option<Flags>,
    /// Server-side arrival date.
    pub internal_date: Option<String>,
    /// Message size in octets.
    pub size: Option<u32>,
    /// Envelope headers.
    pub envelope: Option<Envelope>,
    /// Abstract body-structure tree.
    pub body_structure: Option<BodyStructure>,
    /// Modification sequence (CONDSTORE).
    pub mod_seq: Option<ModSeq>,
    /// GMail labels.
    pub labels: Option<Labels>,
    /// GMail stable message id.
    pub gmail_message_id: Option<GmailMessageId>,
    /// GMail thread id.
    pub gmail_thread_id: Option<GmailThreadId>,
    /// Message annotations.
    pub annotations: Option<Vec<Annotation>>,
    /// References header ids.
    pub references: Option<Vec<String>>,
    /// Raw header block, when header fields were fetched.
    pub headers: Option<Vec<u8>>,
    /// Short plain-text preview of the body.
    pub preview: Option<String>,
    /// Date the message was saved into the mailbox (RFC 8514).
    pub save_date: Option<String>,
}

impl MessageSummary {
    /// Creates an empty summary for the given sequence number.
    #[must_use]
    pub fn at(seq: SeqNum) -> Self {
        Self {
            seq: Some(seq),
            ..Self::default()
        }
    }

    /// Returns the validity-qualified identity, when the UID is known.
    #[must_use]
    pub fn unique_id(&self, validity: UidValidity) -> Option<UniqueId> {
        self.uid.map(|uid| UniqueId::new(validity, uid))
    }

    /// Merges one FETCH data item into the summary.
    ///
    /// Later items win: an unsolicited FETCH carrying new flags replaces
    /// the cached flags.
    pub fn absorb(&mut self, item: &FetchItem) {
        match item {
            FetchItem::Uid(uid) => self.uid = Some(*uid),
            FetchItem::Flags(flags) => self.flags = Some(flags.clone()),
            FetchItem::InternalDate(date) => self.internal_date = Some(date.clone()),
            FetchItem::Rfc822Size(size) => self.size = Some(*size),
            FetchItem::Envelope(env) => self.envelope = Some((**env).clone()),
            FetchItem::BodyStructure(bs) => self.body_structure = Some(bs.clone()),
            FetchItem::ModSeq(m) => self.mod_seq = Some(*m),
            FetchItem::GmailLabels(labels) => self.labels = Some(labels.clone()),
            FetchItem::GmailMessageId(id) => self.gmail_message_id = Some(*id),
            FetchItem::GmailThreadId(id) => self.gmail_thread_id = Some(*id),
            FetchItem::Annotations(list) => self.annotations = Some(list.clone()),
            FetchItem::Preview(text) => self.preview = text.clone(),
            FetchItem::SaveDate(date) => self.save_date = date.clone(),
            FetchItem::Body { section, data, .. } => {
                // Header-field fetches land in `headers`; full bodies are
                // returned to the caller directly and not cached here.
                let section_upper = section.as_deref().map(str::to_uppercase);
                let is_headers = section_upper
                    .as_deref()
                    .is_some_and(|s| s.starts_with("HEADER"));
                if is_headers && let Some(bytes) = data {
                    self.headers = Some(bytes.clone());
                    if section_upper
                        .as_deref()
                        .is_some_and(|s| s.contains("REFERENCES"))
                    {
                        self.references = Some(parse_message_ids(bytes));
                    }
                }
            }
        }
    }

    /// Merges every item of a FETCH response into the summary.
    pub fn absorb_all(&mut self, items: &[FetchItem]) {
        for item in items {
            self.absorb(item);
        }
    }

    /// Returns true if any metadata field is populated.
    #[must_use]
    pub fn is_populated(&self) -> bool {
        self.flags.is_some()
            || self.internal_date.is_some()
            || self.size.is_some()
            || self.envelope.is_some()
            || self.body_structure.is_some()
            || self.mod_seq.is_some()
            || self.labels.is_some()
            || self.annotations.is_some()
            || self.headers.is_some()
            || self.preview.is_some()
    }
}

/// Extracts `<...>` message-ids from a raw header block.
fn parse_message_ids(raw: &[u8]) -> Vec<String> {
    let text = String::from_utf8_lossy(raw);
    let mut ids = Vec::new();
    let mut rest = text.as_ref();
    while let Some(open) = rest.find('<') {
        let Some(close) = rest[open..].find('>') else {
            break;
        };
        ids.push(rest[open..=open + close].to_string());
        rest = &rest[open + close + 1..];
    }
    ids
}
