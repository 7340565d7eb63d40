//! Response parsing: demultiplexes tagged, untagged, and continuation
//! responses, and routes each untagged kind to its payload parser.

#![allow(clippy::missing_errors_doc)]

mod fetch;
mod helpers;
mod types;

pub use types::{ESearchData, FetchItem, NamespaceEntry, QuotaResource, StatusItem, UntaggedResponse};

use crate::parser::lexer::{Lexer, Token};
use crate::types::{ResponseCode, SeqNum, Status, Tag};
use crate::{Error, Result};

use helpers::{
    parse_acl, parse_capability_list, parse_esearch, parse_flag_list, parse_id_params,
    parse_list_entry, parse_metadata, parse_namespace_group, parse_number_list, parse_quota,
    parse_quota_root, parse_response_code, parse_status_line, parse_thread_forest, parse_vanished,
    read_text_until_crlf,
};

/// A parsed server response.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    /// Tagged completion of a command.
    Tagged {
        /// The echoed command tag.
        tag: Tag,
        /// Completion status.
        status: Status,
        /// Optional response code.
        code: Option<ResponseCode>,
        /// Human-readable text.
        text: String,
    },
    /// Untagged server data.
    Untagged(UntaggedResponse),
    /// Continuation request (literal pacing, SASL exchange, IDLE).
    Continuation {
        /// Text or base64 challenge after the `+`.
        text: Option<String>,
    },
}

/// Parser entry point for one complete response.
pub struct ResponseParser;

impl ResponseParser {
    /// Parses a complete response (one line plus any embedded literals).
    pub fn parse(input: &[u8]) -> Result<Response> {
        let mut lexer = Lexer::new(input);

        match lexer.next_token()? {
            Token::Asterisk => Self::parse_untagged(&mut lexer),
            Token::Plus => Self::parse_continuation(&mut lexer),
            Token::Atom(tag) => Self::parse_tagged(&mut lexer, tag),
            token => Err(Error::Parse {
                position: 0,
                message: format!("expected *, +, or tag, got {token:?}"),
            }),
        }
    }

    fn parse_tagged(lexer: &mut Lexer<'_>, tag: &str) -> Result<Response> {
        lexer.expect_space()?;
        let status = Self::parse_status(lexer)?;
        lexer.expect_space()?;
        let (code, text) = Self::parse_resp_text(lexer)?;

        Ok(Response::Tagged {
            tag: Tag::new(tag),
            status,
            code,
            text,
        })
    }

    #[allow(clippy::too_many_lines)]
    fn parse_untagged(lexer: &mut Lexer<'_>) -> Result<Response> {
        lexer.expect_space()?;

        match lexer.next_token()? {
            Token::Atom(name) => {
                let upper = name.to_uppercase();
                let untagged = match upper.as_str() {
                    "OK" => {
                        lexer.expect_space()?;
                        let (code, text) = Self::parse_resp_text(lexer)?;
                        UntaggedResponse::Ok { code, text }
                    }
                    "NO" => {
                        lexer.expect_space()?;
                        let (code, text) = Self::parse_resp_text(lexer)?;
                        UntaggedResponse::No { code, text }
                    }
                    "BAD" => {
                        lexer.expect_space()?;
                        let (code, text) = Self::parse_resp_text(lexer)?;
                        UntaggedResponse::Bad { code, text }
                    }
                    "PREAUTH" => {
                        lexer.expect_space()?;
                        let (code, text) = Self::parse_resp_text(lexer)?;
                        UntaggedResponse::PreAuth { code, text }
                    }
                    "BYE" => {
                        lexer.expect_space()?;
                        let (code, text) = Self::parse_resp_text(lexer)?;
                        UntaggedResponse::Bye { code, text }
                    }
                    "CAPABILITY" => UntaggedResponse::Capability(parse_capability_list(lexer)?),
                    "ENABLED" => UntaggedResponse::Enabled(parse_capability_list(lexer)?),
                    "FLAGS" => {
                        lexer.expect_space()?;
                        let (flags, _) = parse_flag_list(lexer)?;
                        UntaggedResponse::Flags(flags)
                    }
                    "LIST" => {
                        lexer.expect_space()?;
                        UntaggedResponse::List(parse_list_entry(lexer)?)
                    }
                    "LSUB" => {
                        lexer.expect_space()?;
                        UntaggedResponse::Lsub(parse_list_entry(lexer)?)
                    }
                    "STATUS" => {
                        lexer.expect_space()?;
                        let (mailbox, items) = parse_status_line(lexer)?;
                        UntaggedResponse::Status { mailbox, items }
                    }
                    "SEARCH" => {
                        let (numbers, _) = parse_number_list(lexer)?;
                        UntaggedResponse::Search(numbers)
                    }
                    "SORT" => {
                        let (numbers, _) = parse_number_list(lexer)?;
                        UntaggedResponse::Sort(numbers)
                    }
                    "THREAD" => UntaggedResponse::Thread(parse_thread_forest(lexer)?),
                    "ESEARCH" => UntaggedResponse::ESearch(parse_esearch(lexer)?),
                    "VANISHED" => {
                        let (earlier, uids) = parse_vanished(lexer)?;
                        UntaggedResponse::Vanished { earlier, uids }
                    }
                    "NAMESPACE" => {
                        lexer.expect_space()?;
                        let personal = parse_namespace_group(lexer)?;
                        lexer.expect_space()?;
                        let other_users = parse_namespace_group(lexer)?;
                        lexer.expect_space()?;
                        let shared = parse_namespace_group(lexer)?;
                        UntaggedResponse::Namespace {
                            personal,
                            other_users,
                            shared,
                        }
                    }
                    "ID" => {
                        lexer.expect_space()?;
                        UntaggedResponse::Id(parse_id_params(lexer)?)
                    }
                    "QUOTA" => {
                        lexer.expect_space()?;
                        let (root, resources) = parse_quota(lexer)?;
                        UntaggedResponse::Quota { root, resources }
                    }
                    "QUOTAROOT" => {
                        lexer.expect_space()?;
                        let (mailbox, roots) = parse_quota_root(lexer)?;
                        UntaggedResponse::QuotaRoot { mailbox, roots }
                    }
                    "ACL" => {
                        lexer.expect_space()?;
                        let (mailbox, entries) = parse_acl(lexer)?;
                        UntaggedResponse::Acl { mailbox, entries }
                    }
                    "LISTRIGHTS" => {
                        lexer.expect_space()?;
                        let mailbox = lexer.read_astring()?;
                        lexer.expect_space()?;
                        let identifier = lexer.read_astring()?;
                        let mut rights = Vec::new();
                        while lexer.peek() == Some(b' ') {
                            lexer.advance();
                            rights.push(lexer.read_astring()?);
                        }
                        UntaggedResponse::ListRights {
                            mailbox: crate::types::MailboxName::new(mailbox),
                            identifier,
                            rights,
                        }
                    }
                    "MYRIGHTS" => {
                        lexer.expect_space()?;
                        let mailbox = lexer.read_astring()?;
                        lexer.expect_space()?;
                        let rights = lexer.read_astring()?;
                        UntaggedResponse::MyRights {
                            mailbox: crate::types::MailboxName::new(mailbox),
                            rights,
                        }
                    }
                    "METADATA" => {
                        lexer.expect_space()?;
                        let (mailbox, entries) = parse_metadata(lexer)?;
                        UntaggedResponse::Metadata { mailbox, entries }
                    }
                    _ => {
                        // Unexpected untagged data may arrive between any
                        // two responses; tolerate rather than fail.
                        tracing::debug!(name = %name, "unmodeled untagged response");
                        let _ = read_text_until_crlf(lexer);
                        UntaggedResponse::Unknown {
                            name: name.to_string(),
                        }
                    }
                };
                Ok(Response::Untagged(untagged))
            }
            Token::Number(n) => {
                let n = u32::try_from(n).map_err(|_| Error::Parse {
                    position: lexer.position(),
                    message: "message number out of range".to_string(),
                })?;
                lexer.expect_space()?;
                let keyword = lexer.read_atom_str()?;
                let upper = keyword.to_uppercase();

                match upper.as_str() {
                    "EXISTS" => Ok(Response::Untagged(UntaggedResponse::Exists(n))),
                    "RECENT" => Ok(Response::Untagged(UntaggedResponse::Recent(n))),
                    "EXPUNGE" => {
                        let seq = SeqNum::new(n).ok_or_else(|| Error::Parse {
                            position: lexer.position(),
                            message: "EXPUNGE of sequence 0".to_string(),
                        })?;
                        Ok(Response::Untagged(UntaggedResponse::Expunge(seq)))
                    }
                    "FETCH" => {
                        let seq = SeqNum::new(n).ok_or_else(|| Error::Parse {
                            position: lexer.position(),
                            message: "FETCH of sequence 0".to_string(),
                        })?;
                        lexer.expect_space()?;
                        let items = fetch::parse_fetch_items(lexer)?;
                        Ok(Response::Untagged(UntaggedResponse::Fetch { seq, items }))
                    }
                    _ => Err(Error::Parse {
                        position: lexer.position(),
                        message: format!("unknown message data: {keyword}"),
                    }),
                }
            }
            token => Err(Error::Parse {
                position: lexer.position(),
                message: format!("unexpected token in untagged response: {token:?}"),
            }),
        }
    }

    fn parse_continuation(lexer: &mut Lexer<'_>) -> Result<Response> {
        if lexer.peek() == Some(b' ') {
            lexer.advance();
        }
        let text = read_text_until_crlf(lexer);
        Ok(Response::Continuation {
            text: if text.is_empty() { None } else { Some(text) },
        })
    }

    fn parse_status(lexer: &mut Lexer<'_>) -> Result<Status> {
        let s = lexer.read_atom_str()?;
        match s.to_uppercase().as_str() {
            "OK" => Ok(Status::Ok),
            "NO" => Ok(Status::No),
            "BAD" => Ok(Status::Bad),
            "PREAUTH" => Ok(Status::PreAuth),
            "BYE" => Ok(Status::Bye),
            _ => Err(Error::Parse {
                position: lexer.position(),
                message: format!("invalid status: {s}"),
            }),
        }
    }

    fn parse_resp_text(lexer: &mut Lexer<'_>) -> Result<(Option<ResponseCode>, String)> {
        let code = if lexer.peek() == Some(b'[') {
            Some(parse_response_code(lexer)?)
        } else {
            None
        };

        if lexer.peek() == Some(b' ') {
            lexer.advance();
        }

        Ok((code, read_text_until_crlf(lexer)))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::{Capability, Flag, MailboxAttribute, UidSet};

    #[test]
    fn untagged_ok_greeting() {
        let response = ResponseParser::parse(b"* OK IMAP4rev1 server ready\r\n").unwrap();
        match response {
            Response::Untagged(UntaggedResponse::Ok { code, text }) => {
                assert!(code.is_none());
                assert_eq!(text, "IMAP4rev1 server ready");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn preauth_greeting() {
        let response =
            ResponseParser::parse(b"* PREAUTH [CAPABILITY IMAP4rev1 IDLE] ready\r\n").unwrap();
        match response {
            Response::Untagged(UntaggedResponse::PreAuth { code, .. }) => match code {
                Some(ResponseCode::Capability(caps)) => {
                    assert!(caps.contains(&Capability::Imap4Rev1));
                }
                other => panic!("expected capability code, got {other:?}"),
            },
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn tagged_ok() {
        let response = ResponseParser::parse(b"A0001 OK LOGIN completed\r\n").unwrap();
        match response {
            Response::Tagged {
                tag, status, text, ..
            } => {
                assert_eq!(tag.as_str(), "A0001");
                assert_eq!(status, Status::Ok);
                assert_eq!(text, "LOGIN completed");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn tagged_no_with_code() {
        let response = ResponseParser::parse(b"A0002 NO [TRYCREATE] no such mailbox\r\n").unwrap();
        match response {
            Response::Tagged { status, code, .. } => {
                assert_eq!(status, Status::No);
                assert_eq!(code, Some(ResponseCode::TryCreate));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn exists_and_recent() {
        assert_eq!(
            ResponseParser::parse(b"* 23 EXISTS\r\n").unwrap(),
            Response::Untagged(UntaggedResponse::Exists(23))
        );
        assert_eq!(
            ResponseParser::parse(b"* 2 RECENT\r\n").unwrap(),
            Response::Untagged(UntaggedResponse::Recent(2))
        );
    }

    #[test]
    fn expunge() {
        let response = ResponseParser::parse(b"* 4 EXPUNGE\r\n").unwrap();
        assert!(matches!(
            response,
            Response::Untagged(UntaggedResponse::Expunge(seq)) if seq.get() == 4
        ));
    }

    #[test]
    fn vanished_earlier() {
        let response = ResponseParser::parse(b"* VANISHED (EARLIER) 3,7\r\n").unwrap();
        match response {
            Response::Untagged(UntaggedResponse::Vanished { earlier, uids }) => {
                assert!(earlier);
                assert_eq!(uids, UidSet::parse("3,7").unwrap());
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn fetch_with_flags_and_modseq() {
        let response =
            ResponseParser::parse(b"* 1 FETCH (UID 1 FLAGS (\\Seen) MODSEQ (600))\r\n").unwrap();
        match response {
            Response::Untagged(UntaggedResponse::Fetch { seq, items }) => {
                assert_eq!(seq.get(), 1);
                assert_eq!(items.len(), 3);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn capability_line() {
        let response =
            ResponseParser::parse(b"* CAPABILITY IMAP4rev1 IDLE QRESYNC THREAD=REFS\r\n").unwrap();
        match response {
            Response::Untagged(UntaggedResponse::Capability(caps)) => {
                assert!(caps.contains(&Capability::Idle));
                assert!(caps.contains(&Capability::QResync));
                assert!(caps.contains(&Capability::Thread("REFS".to_string())));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn enabled_line() {
        let response = ResponseParser::parse(b"* ENABLED QRESYNC\r\n").unwrap();
        assert!(matches!(
            response,
            Response::Untagged(UntaggedResponse::Enabled(caps)) if caps == vec![Capability::QResync]
        ));
    }

    #[test]
    fn list_line() {
        let response =
            ResponseParser::parse(b"* LIST (\\HasChildren \\Sent) \"/\" \"Sent Items\"\r\n")
                .unwrap();
        match response {
            Response::Untagged(UntaggedResponse::List(entry)) => {
                assert!(entry.attributes.contains(&MailboxAttribute::Sent));
                assert_eq!(entry.delimiter, Some('/'));
                assert_eq!(entry.name.as_str(), "Sent Items");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn status_line() {
        let response = ResponseParser::parse(
            b"* STATUS INBOX (MESSAGES 231 UIDNEXT 44292 HIGHESTMODSEQ 7011231777)\r\n",
        )
        .unwrap();
        match response {
            Response::Untagged(UntaggedResponse::Status { mailbox, items }) => {
                assert_eq!(mailbox.as_str(), "INBOX");
                assert_eq!(items.len(), 3);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn search_line() {
        let response = ResponseParser::parse(b"* SEARCH 2 3 6\r\n").unwrap();
        assert!(matches!(
            response,
            Response::Untagged(UntaggedResponse::Search(nums)) if nums == vec![2, 3, 6]
        ));
    }

    #[test]
    fn thread_line() {
        let response = ResponseParser::parse(b"* THREAD (2)(3 6)\r\n").unwrap();
        match response {
            Response::Untagged(UntaggedResponse::Thread(forest)) => {
                assert_eq!(forest.len(), 2);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn esearch_line() {
        let response = ResponseParser::parse(b"* ESEARCH (TAG \"A5\") UID ALL 1:3,5\r\n").unwrap();
        match response {
            Response::Untagged(UntaggedResponse::ESearch(data)) => {
                assert!(data.uid);
                assert_eq!(data.results.all, vec![1, 2, 3, 5]);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn continuation() {
        let response = ResponseParser::parse(b"+ Ready for literal\r\n").unwrap();
        assert_eq!(
            response,
            Response::Continuation {
                text: Some("Ready for literal".to_string())
            }
        );

        let response = ResponseParser::parse(b"+\r\n").unwrap();
        assert_eq!(response, Response::Continuation { text: None });
    }

    #[test]
    fn unknown_untagged_is_tolerated() {
        let response = ResponseParser::parse(b"* XAPPLEPUSH something odd\r\n").unwrap();
        assert!(matches!(
            response,
            Response::Untagged(UntaggedResponse::Unknown { name }) if name == "XAPPLEPUSH"
        ));
    }

    #[test]
    fn permanentflags_in_select() {
        let response = ResponseParser::parse(
            b"* OK [PERMANENTFLAGS (\\Deleted \\Seen \\*)] Flags permitted.\r\n",
        )
        .unwrap();
        match response {
            Response::Untagged(UntaggedResponse::Ok {
                code:
                    Some(ResponseCode::PermanentFlags {
                        flags,
                        accepts_new_keywords,
                    }),
                ..
            }) => {
                assert!(flags.contains(&Flag::Deleted));
                assert!(accepts_new_keywords);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn metadata_line() {
        let response =
            ResponseParser::parse(b"* METADATA \"INBOX\" (/private/comment \"note\")\r\n").unwrap();
        match response {
            Response::Untagged(UntaggedResponse::Metadata { mailbox, entries }) => {
                assert_eq!(mailbox.as_str(), "INBOX");
                assert_eq!(entries.len(), 1);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }
}
