//! Parsed response data types.

use crate::search::SearchResults;
use crate::types::{
    Annotation, BodyStructure, Capability, Envelope, Flags, GmailMessageId, GmailThreadId, Labels,
    ListEntry, MailboxName, MessageThread, ModSeq, ResponseCode, SeqNum, Uid, UidSet, UidValidity,
};

/// One FETCH data item.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchItem {
    /// Message flags.
    Flags(Flags),
    /// Internal (arrival) date.
    InternalDate(String),
    /// RFC822.SIZE.
    Rfc822Size(u32),
    /// Envelope.
    Envelope(Box<Envelope>),
    /// UID.
    Uid(Uid),
    /// BODY[section]<origin> content.
    Body {
        /// Section specifier, e.g. `1.2` or `HEADER.FIELDS (SUBJECT)`.
        section: Option<String>,
        /// Origin offset for partial fetches.
        origin: Option<u32>,
        /// Section bytes; `None` when the server reported NIL.
        data: Option<Vec<u8>>,
    },
    /// BODYSTRUCTURE tree.
    BodyStructure(BodyStructure),
    /// MODSEQ (RFC 7162).
    ModSeq(ModSeq),
    /// X-GM-LABELS.
    GmailLabels(Labels),
    /// X-GM-MSGID.
    GmailMessageId(GmailMessageId),
    /// X-GM-THRID.
    GmailThreadId(GmailThreadId),
    /// ANNOTATION items (RFC 5257).
    Annotations(Vec<Annotation>),
    /// PREVIEW text (RFC 8970).
    Preview(Option<String>),
    /// SAVEDATE (RFC 8514).
    SaveDate(Option<String>),
}

/// One STATUS response item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusItem {
    /// Number of messages.
    Messages(u32),
    /// Number of recent messages.
    Recent(u32),
    /// Predicted next UID.
    UidNext(Uid),
    /// UIDVALIDITY epoch.
    UidValidity(UidValidity),
    /// Number of unseen messages.
    Unseen(u32),
    /// Highest mod-sequence.
    HighestModSeq(ModSeq),
    /// Total mailbox size in octets (RFC 8438).
    Size(u64),
    /// Number of deleted messages (RFC 9051).
    Deleted(u32),
    /// Per-mailbox append limit (RFC 7889).
    AppendLimit(u32),
    /// Stable mailbox identifier (RFC 8474).
    MailboxId(String),
}

/// One namespace entry from a NAMESPACE response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceEntry {
    /// Namespace prefix, e.g. `""` or `"Other Users/"`.
    pub prefix: String,
    /// Hierarchy delimiter for the namespace.
    pub delimiter: Option<char>,
}

/// A quota resource triple from a QUOTA response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuotaResource {
    /// Resource name, e.g. `STORAGE` or `MESSAGE`.
    pub name: String,
    /// Current usage.
    pub usage: u64,
    /// Resource limit.
    pub limit: u64,
}

/// ESEARCH response data (RFC 4731), also used for ESORT.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ESearchData {
    /// Tag of the originating command, when correlated.
    pub tag: Option<String>,
    /// True when the returned numbers are UIDs.
    pub uid: bool,
    /// The structured results.
    pub results: SearchResults,
}

/// Untagged response data.
#[derive(Debug, Clone, PartialEq)]
pub enum UntaggedResponse {
    /// `* OK` with optional response code.
    Ok {
        /// Optional response code.
        code: Option<ResponseCode>,
        /// Human-readable text.
        text: String,
    },
    /// `* NO` warning.
    No {
        /// Optional response code.
        code: Option<ResponseCode>,
        /// Human-readable text.
        text: String,
    },
    /// `* BAD` error.
    Bad {
        /// Optional response code.
        code: Option<ResponseCode>,
        /// Human-readable text.
        text: String,
    },
    /// `* PREAUTH` greeting.
    PreAuth {
        /// Optional response code.
        code: Option<ResponseCode>,
        /// Human-readable text.
        text: String,
    },
    /// `* BYE` shutdown notice.
    Bye {
        /// Optional response code.
        code: Option<ResponseCode>,
        /// Human-readable text.
        text: String,
    },
    /// `* CAPABILITY` listing.
    Capability(Vec<Capability>),
    /// `* ENABLED` listing (RFC 5161).
    Enabled(Vec<Capability>),
    /// `* LIST` line.
    List(ListEntry),
    /// `* LSUB` line.
    Lsub(ListEntry),
    /// `* STATUS` line.
    Status {
        /// Mailbox the status refers to.
        mailbox: MailboxName,
        /// Reported items.
        items: Vec<StatusItem>,
    },
    /// `* FLAGS` applicable in the selected mailbox.
    Flags(Flags),
    /// `* n EXISTS`.
    Exists(u32),
    /// `* n RECENT`.
    Recent(u32),
    /// `* n EXPUNGE`.
    Expunge(SeqNum),
    /// `* VANISHED [(EARLIER)] uids` (RFC 7162).
    Vanished {
        /// True for the EARLIER form sent during QRESYNC resync.
        earlier: bool,
        /// The expunged UIDs.
        uids: UidSet,
    },
    /// `* n FETCH (...)`.
    Fetch {
        /// Message sequence number.
        seq: SeqNum,
        /// Fetched data items.
        items: Vec<FetchItem>,
    },
    /// `* SEARCH n...`; numbers are UIDs iff the command was `UID SEARCH`.
    Search(Vec<u32>),
    /// `* SORT n...` (RFC 5256).
    Sort(Vec<u32>),
    /// `* THREAD ...` forest (RFC 5256).
    Thread(Vec<MessageThread>),
    /// `* ESEARCH ...` (RFC 4731).
    ESearch(ESearchData),
    /// `* NAMESPACE` (RFC 2342).
    Namespace {
        /// Personal namespaces.
        personal: Vec<NamespaceEntry>,
        /// Other-users namespaces.
        other_users: Vec<NamespaceEntry>,
        /// Shared namespaces.
        shared: Vec<NamespaceEntry>,
    },
    /// `* ID` (RFC 2971).
    Id(Vec<(String, Option<String>)>),
    /// `* QUOTA` (RFC 2087).
    Quota {
        /// Quota root name.
        root: String,
        /// Resource triples.
        resources: Vec<QuotaResource>,
    },
    /// `* QUOTAROOT` (RFC 2087).
    QuotaRoot {
        /// Mailbox name.
        mailbox: MailboxName,
        /// Roots that apply to the mailbox.
        roots: Vec<String>,
    },
    /// `* ACL` (RFC 4314).
    Acl {
        /// Mailbox name.
        mailbox: MailboxName,
        /// (identifier, rights) pairs.
        entries: Vec<(String, String)>,
    },
    /// `* LISTRIGHTS` (RFC 4314).
    ListRights {
        /// Mailbox name.
        mailbox: MailboxName,
        /// Identifier the rights apply to.
        identifier: String,
        /// Granted and grantable rights strings.
        rights: Vec<String>,
    },
    /// `* MYRIGHTS` (RFC 4314).
    MyRights {
        /// Mailbox name.
        mailbox: MailboxName,
        /// Rights string.
        rights: String,
    },
    /// `* METADATA` (RFC 5464).
    Metadata {
        /// Mailbox name (empty for server metadata).
        mailbox: MailboxName,
        /// (entry, value) pairs; `None` value means unset.
        entries: Vec<(String, Option<String>)>,
    },
    /// An untagged response this client does not model; kept for
    /// diagnostics rather than treated as a protocol error.
    Unknown {
        /// The leading atom of the response.
        name: String,
    },
}
