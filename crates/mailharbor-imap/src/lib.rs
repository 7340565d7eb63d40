//! # mailharbor-imap
//!
//! An IMAP4rev1 (RFC 3501) client engine: an authenticated, full-duplex
//! session with an IMAP server, exposing folder selection, message
//! retrieval, search/sort/thread, flag and annotation updates, append,
//! copy/move, expunge, and quick resynchronization to higher-level
//! callers.
//!
//! ## Features
//!
//! - **Type-state connection management**: `NotAuthenticated` →
//!   `Authenticated` ⇄ `Selected` enforced at compile time
//! - **Folder engine**: per-mailbox caches with a synchronous event
//!   surface (count, flags, vanished messages, validity changes)
//! - **Extension matrix**: UIDPLUS, CONDSTORE/QRESYNC, MOVE, ESEARCH,
//!   SORT/THREAD, MULTIAPPEND, LITERAL+/-, SPECIAL-USE, OBJECTID,
//!   REPLACE, ANNOTATE, ID, UNSELECT, and the X-GM-EXT-1 extensions
//! - **IDLE**: push notifications with refresh bookkeeping (RFC 2177)
//! - **Sans-I/O protocol mirror**: a standalone bytes-in/bytes-out
//!   rendition of the session rules for deterministic tests and
//!   custom event loops
//! - **TLS via rustls**: implicit TLS or STARTTLS upgrade
//! - **Server quirks handling**: Gmail, Outlook, Dovecot, Yahoo, and
//!   friends
//!
//! ## Quick start
//!
//! ```ignore
//! use std::time::Duration;
//! use mailharbor_imap::{
//!     Client, ClientGreeting, Config, FetchRequest, FolderAccess, MailEngine,
//! };
//!
//! #[tokio::main]
//! async fn main() -> mailharbor_imap::Result<()> {
//!     let config = Config::new("imap.example.com");
//!     let stream = mailharbor_imap::connection::connect(&config).await?;
//!
//!     let client = match Client::from_stream(stream).await? {
//!         ClientGreeting::PreAuthenticated(client) => client,
//!         ClientGreeting::NotAuthenticated(client) => {
//!             client.login("user@example.com", "password").await?
//!         }
//!     };
//!
//!     let mut engine = MailEngine::new(client);
//!     engine.list_folders("", "*").await?;
//!     engine.open("INBOX", FolderAccess::ReadWrite, None).await?;
//!
//!     let summaries = engine
//!         .fetch_range(
//!             mailharbor_imap::FetchRange::open_ended(1),
//!             &FetchRequest::summary(),
//!         )
//!         .await?;
//!     for summary in &summaries {
//!         println!("{:?}", summary.envelope.as_ref().and_then(|e| e.subject.clone()));
//!     }
//!
//!     engine.idle_for(Duration::from_secs(60)).await?;
//!     engine.logout().await
//! }
//! ```
//!
//! ## Layering
//!
//! - [`connection`]: transport streams, framing, the type-state client
//!   that drives the wire
//! - [`command`] and [`parser`]: the wire codec
//! - [`folder`]: the folder subsystem and its event surface
//! - [`types`], [`request`], [`search`]: the request/result vocabulary
//! - [`protocol`]: a standalone sans-I/O mirror of the session rules;
//!   the I/O client does not route through it

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod authenticator;
pub mod command;
pub mod connection;
mod error;
pub mod fetch;
pub mod folder;
pub mod parser;
pub mod pipeline;
pub mod protocol;
pub mod quirks;
pub mod request;
pub mod search;
pub mod time;
pub mod types;

pub use authenticator::{Authenticator, PlainAuthenticator, XOAuth2Authenticator};
pub use command::{Command, FetchAttribute, StatusAttribute, StoreMode, TagGenerator};
pub use connection::{
    Authenticated, Client, ClientGreeting, CommandOutcome, Config, ConfigBuilder, FramedStream,
    IdleEvent, IdleHandle, ImapStream, NotAuthenticated, SelectOptions, Selected, Security,
    StoreResult,
};
pub use error::{CommandContext, Error, Result, ResultExt};
pub use folder::{
    CollectingObserver, FetchRange, FolderEvent, FolderObserver, FolderRegistry, MailEngine,
    MailFolder, QresyncParams, SyncState,
};
pub use parser::{FetchItem, Response, ResponseParser, StatusItem, UntaggedResponse};
pub use protocol::{CommandHandle, CommandResult, Protocol, ProtocolEvent, ProtocolState};
pub use quirks::{ServerQuirks, ServerType};
pub use request::{
    AppendRequest, FetchRequest, ReplaceRequest, StoreAnnotationsRequest, StoreFlagsRequest,
    StoreLabelsRequest,
};
pub use search::{OrderBy, SearchOptions, SearchQuery, SearchResults, SortKey};
pub use types::{
    Annotation, Capability, Flag, Flags, FolderAccess, GmailMessageId, GmailThreadId, Label,
    Labels, ListEntry, MailboxAttribute, MailboxName, MailboxStatus, MessageSummary,
    MessageThread, ModSeq, SeqNum, SequenceSet, Status, Tag, ThreadingAlgorithm, Uid, UidSet,
    UidValidity, UniqueId, UniqueIdMap,
};

/// IMAP protocol version implemented.
pub const IMAP_VERSION: &str = "IMAP4rev1";
