//! Sans-I/O wire parser.
//!
//! Two layers: a [`lexer`] that tokenizes raw bytes (atoms, quoted
//! strings, `{n}` literals, lists, NIL, numbers) and a [`response`]
//! parser that assembles tokens into typed responses. Neither performs
//! I/O; both operate on one complete response at a time.
//!
//! # Example
//!
//! ```
//! use mailharbor_imap::parser::{Response, ResponseParser, UntaggedResponse};
//!
//! let response = ResponseParser::parse(b"* 3 EXISTS\r\n").unwrap();
//! assert!(matches!(
//!     response,
//!     Response::Untagged(UntaggedResponse::Exists(3))
//! ));
//! ```

pub mod lexer;
pub mod response;

pub use lexer::{Lexer, Token};
pub use response::{
    ESearchData, FetchItem, NamespaceEntry, QuotaResource, Response, ResponseParser, StatusItem,
    UntaggedResponse,
};
