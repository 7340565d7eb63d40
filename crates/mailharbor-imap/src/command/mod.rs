//! IMAP command construction and serialization.
//!
//! A [`Command`] value serializes to one wire line:
//! `<tag> SP <command> (SP <arg>)* CRLF`. Commands whose arguments carry
//! literals (APPEND, REPLACE) are built with [`append_header`] instead,
//! since their payload bytes are paced by continuation responses.

mod tag_generator;
mod types;

pub(crate) mod serialize;

use crate::search::{OrderBy, SearchOptions, SearchQuery, sort_criteria_to_wire};
use crate::types::{
    Annotation, Flags, MailboxAttribute, MailboxName, ModSeq, SequenceSet, ThreadingAlgorithm,
    UidSet,
};

pub use tag_generator::TagGenerator;
pub use types::{FetchAttribute, StatusAttribute, StoreMode, StoreWire};

use serialize::{
    write_astring, write_fetch_items, write_literal_prefix, write_mailbox, write_store_action,
};

/// An IMAP command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    // Any state
    /// CAPABILITY.
    Capability,
    /// NOOP.
    Noop,
    /// LOGOUT.
    Logout,

    // Not authenticated
    /// STARTTLS.
    StartTls,
    /// LOGIN with plaintext credentials.
    Login {
        /// Username.
        username: String,
        /// Password.
        password: String,
    },
    /// AUTHENTICATE with a SASL mechanism.
    Authenticate {
        /// Mechanism name, e.g. `PLAIN` or `XOAUTH2`.
        mechanism: String,
        /// Base64 initial response (SASL-IR, RFC 4959).
        initial_response: Option<String>,
    },

    // Authenticated
    /// ID client/server identification (RFC 2971).
    Id {
        /// Field/value pairs; `None` sends `ID NIL`.
        parameters: Option<Vec<(String, String)>>,
    },
    /// ENABLE extensions (RFC 5161).
    Enable {
        /// Capability tokens to enable.
        capabilities: Vec<String>,
    },
    /// NAMESPACE (RFC 2342).
    Namespace,
    /// SELECT a mailbox read-write.
    Select {
        /// Mailbox to select.
        mailbox: MailboxName,
        /// Request CONDSTORE tracking.
        condstore: bool,
        /// Pre-serialized QRESYNC parameter, e.g. `(QRESYNC (1234 500))`.
        qresync: Option<String>,
    },
    /// EXAMINE a mailbox read-only.
    Examine {
        /// Mailbox to examine.
        mailbox: MailboxName,
        /// Request CONDSTORE tracking.
        condstore: bool,
        /// Pre-serialized QRESYNC parameter.
        qresync: Option<String>,
    },
    /// CREATE a mailbox.
    Create {
        /// Mailbox to create.
        mailbox: MailboxName,
        /// SPECIAL-USE attributes (RFC 6154 `CREATE ... (USE (...))`).
        special_use: Vec<MailboxAttribute>,
    },
    /// DELETE a mailbox.
    Delete {
        /// Mailbox to delete.
        mailbox: MailboxName,
    },
    /// RENAME a mailbox.
    Rename {
        /// Current name.
        from: MailboxName,
        /// New name.
        to: MailboxName,
    },
    /// SUBSCRIBE.
    Subscribe {
        /// Mailbox to subscribe to.
        mailbox: MailboxName,
    },
    /// UNSUBSCRIBE.
    Unsubscribe {
        /// Mailbox to unsubscribe from.
        mailbox: MailboxName,
    },
    /// LIST mailboxes.
    List {
        /// Reference name.
        reference: String,
        /// Mailbox pattern.
        pattern: String,
    },
    /// LSUB subscribed mailboxes.
    Lsub {
        /// Reference name.
        reference: String,
        /// Mailbox pattern.
        pattern: String,
    },
    /// STATUS of a mailbox without selecting it.
    Status {
        /// Mailbox name.
        mailbox: MailboxName,
        /// Items to request.
        items: Vec<StatusAttribute>,
    },

    // Selected
    /// CHECK (requests a checkpoint).
    Check,
    /// CLOSE (implicit expunge, return to authenticated).
    Close,
    /// UNSELECT (RFC 3691; no expunge).
    Unselect,
    /// EXPUNGE.
    Expunge,
    /// UID EXPUNGE (RFC 4315).
    UidExpunge {
        /// UIDs to expunge.
        uids: UidSet,
    },
    /// SEARCH.
    Search {
        /// The query tree.
        query: SearchQuery,
        /// ESEARCH return options.
        options: SearchOptions,
        /// Charset declaration; set only for non-ASCII queries.
        charset: Option<String>,
        /// Use `UID SEARCH`.
        uid: bool,
    },
    /// SORT (RFC 5256).
    Sort {
        /// Sort criteria, outermost first.
        order: Vec<OrderBy>,
        /// The query tree.
        query: SearchQuery,
        /// Mandatory charset (RFC 5256).
        charset: String,
        /// Use `UID SORT`.
        uid: bool,
    },
    /// THREAD (RFC 5256).
    Thread {
        /// Threading algorithm.
        algorithm: ThreadingAlgorithm,
        /// The query tree.
        query: SearchQuery,
        /// Mandatory charset.
        charset: String,
        /// Use `UID THREAD`.
        uid: bool,
    },
    /// FETCH message data.
    Fetch {
        /// Target set (UIDs in sequence-set syntax when `uid`).
        set: SequenceSet,
        /// Items to fetch.
        items: Vec<FetchAttribute>,
        /// CHANGEDSINCE modifier (CONDSTORE).
        changed_since: Option<ModSeq>,
        /// Use `UID FETCH`.
        uid: bool,
    },
    /// STORE flags, labels, or annotations.
    Store {
        /// Target set.
        set: SequenceSet,
        /// The store variant and its payload.
        action: StoreWire,
        /// Use `UID STORE`.
        uid: bool,
    },
    /// COPY messages to another mailbox.
    Copy {
        /// Target set.
        set: SequenceSet,
        /// Destination mailbox.
        mailbox: MailboxName,
        /// Use `UID COPY`.
        uid: bool,
    },
    /// MOVE messages to another mailbox (RFC 6851).
    Move {
        /// Target set.
        set: SequenceSet,
        /// Destination mailbox.
        mailbox: MailboxName,
        /// Use `UID MOVE`.
        uid: bool,
    },
    /// IDLE (RFC 2177).
    Idle,
    /// DONE terminates IDLE; sent without a tag.
    Done,
}

impl Command {
    /// Returns the command name for diagnostics and error context.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Capability => "CAPABILITY",
            Self::Noop => "NOOP",
            Self::Logout => "LOGOUT",
            Self::StartTls => "STARTTLS",
            Self::Login { .. } => "LOGIN",
            Self::Authenticate { .. } => "AUTHENTICATE",
            Self::Id { .. } => "ID",
            Self::Enable { .. } => "ENABLE",
            Self::Namespace => "NAMESPACE",
            Self::Select { .. } => "SELECT",
            Self::Examine { .. } => "EXAMINE",
            Self::Create { .. } => "CREATE",
            Self::Delete { .. } => "DELETE",
            Self::Rename { .. } => "RENAME",
            Self::Subscribe { .. } => "SUBSCRIBE",
            Self::Unsubscribe { .. } => "UNSUBSCRIBE",
            Self::List { .. } => "LIST",
            Self::Lsub { .. } => "LSUB",
            Self::Status { .. } => "STATUS",
            Self::Check => "CHECK",
            Self::Close => "CLOSE",
            Self::Unselect => "UNSELECT",
            Self::Expunge => "EXPUNGE",
            Self::UidExpunge { .. } => "UID EXPUNGE",
            Self::Search { uid: false, .. } => "SEARCH",
            Self::Search { uid: true, .. } => "UID SEARCH",
            Self::Sort { uid: false, .. } => "SORT",
            Self::Sort { uid: true, .. } => "UID SORT",
            Self::Thread { uid: false, .. } => "THREAD",
            Self::Thread { uid: true, .. } => "UID THREAD",
            Self::Fetch { uid: false, .. } => "FETCH",
            Self::Fetch { uid: true, .. } => "UID FETCH",
            Self::Store { uid: false, .. } => "STORE",
            Self::Store { uid: true, .. } => "UID STORE",
            Self::Copy { uid: false, .. } => "COPY",
            Self::Copy { uid: true, .. } => "UID COPY",
            Self::Move { uid: false, .. } => "MOVE",
            Self::Move { uid: true, .. } => "UID MOVE",
            Self::Idle => "IDLE",
            Self::Done => "DONE",
        }
    }

    /// Serializes the command to one wire line with the given tag.
    #[must_use]
    #[allow(clippy::too_many_lines)]
    pub fn serialize(&self, tag: &str) -> Vec<u8> {
        let mut buf = Vec::new();

        // DONE carries no tag; it terminates an already-tagged IDLE.
        if !matches!(self, Self::Done) {
            buf.extend_from_slice(tag.as_bytes());
            buf.push(b' ');
        }

        match self {
            Self::Capability => buf.extend_from_slice(b"CAPABILITY"),
            Self::Noop => buf.extend_from_slice(b"NOOP"),
            Self::Logout => buf.extend_from_slice(b"LOGOUT"),
            Self::StartTls => buf.extend_from_slice(b"STARTTLS"),

            Self::Login { username, password } => {
                buf.extend_from_slice(b"LOGIN ");
                write_astring(&mut buf, username);
                buf.push(b' ');
                write_astring(&mut buf, password);
            }

            Self::Authenticate {
                mechanism,
                initial_response,
            } => {
                buf.extend_from_slice(b"AUTHENTICATE ");
                buf.extend_from_slice(mechanism.as_bytes());
                if let Some(resp) = initial_response {
                    buf.push(b' ');
                    buf.extend_from_slice(resp.as_bytes());
                }
            }

            Self::Id { parameters } => {
                buf.extend_from_slice(b"ID ");
                if let Some(params) = parameters {
                    buf.push(b'(');
                    for (i, (key, value)) in params.iter().enumerate() {
                        if i > 0 {
                            buf.push(b' ');
                        }
                        write_astring(&mut buf, key);
                        buf.push(b' ');
                        write_astring(&mut buf, value);
                    }
                    buf.push(b')');
                } else {
                    buf.extend_from_slice(b"NIL");
                }
            }

            Self::Enable { capabilities } => {
                buf.extend_from_slice(b"ENABLE");
                for cap in capabilities {
                    buf.push(b' ');
                    buf.extend_from_slice(cap.as_bytes());
                }
            }

            Self::Namespace => buf.extend_from_slice(b"NAMESPACE"),

            Self::Select {
                mailbox,
                condstore,
                qresync,
            }
            | Self::Examine {
                mailbox,
                condstore,
                qresync,
            } => {
                if matches!(self, Self::Select { .. }) {
                    buf.extend_from_slice(b"SELECT ");
                } else {
                    buf.extend_from_slice(b"EXAMINE ");
                }
                write_mailbox(&mut buf, mailbox);
                if let Some(params) = qresync {
                    buf.push(b' ');
                    buf.extend_from_slice(params.as_bytes());
                } else if *condstore {
                    buf.extend_from_slice(b" (CONDSTORE)");
                }
            }

            Self::Create {
                mailbox,
                special_use,
            } => {
                buf.extend_from_slice(b"CREATE ");
                write_mailbox(&mut buf, mailbox);
                if !special_use.is_empty() {
                    buf.extend_from_slice(b" (USE (");
                    for (i, attr) in special_use.iter().enumerate() {
                        if i > 0 {
                            buf.push(b' ');
                        }
                        buf.extend_from_slice(attr.as_str().as_bytes());
                    }
                    buf.extend_from_slice(b"))");
                }
            }

            Self::Delete { mailbox } => {
                buf.extend_from_slice(b"DELETE ");
                write_mailbox(&mut buf, mailbox);
            }

            Self::Rename { from, to } => {
                buf.extend_from_slice(b"RENAME ");
                write_mailbox(&mut buf, from);
                buf.push(b' ');
                write_mailbox(&mut buf, to);
            }

            Self::Subscribe { mailbox } => {
                buf.extend_from_slice(b"SUBSCRIBE ");
                write_mailbox(&mut buf, mailbox);
            }

            Self::Unsubscribe { mailbox } => {
                buf.extend_from_slice(b"UNSUBSCRIBE ");
                write_mailbox(&mut buf, mailbox);
            }

            Self::List { reference, pattern } | Self::Lsub { reference, pattern } => {
                if matches!(self, Self::List { .. }) {
                    buf.extend_from_slice(b"LIST ");
                } else {
                    buf.extend_from_slice(b"LSUB ");
                }
                write_astring(&mut buf, reference);
                buf.push(b' ');
                write_astring(&mut buf, pattern);
            }

            Self::Status { mailbox, items } => {
                buf.extend_from_slice(b"STATUS ");
                write_mailbox(&mut buf, mailbox);
                buf.extend_from_slice(b" (");
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        buf.push(b' ');
                    }
                    buf.extend_from_slice(item.as_str().as_bytes());
                }
                buf.push(b')');
            }

            Self::Check => buf.extend_from_slice(b"CHECK"),
            Self::Close => buf.extend_from_slice(b"CLOSE"),
            Self::Unselect => buf.extend_from_slice(b"UNSELECT"),
            Self::Expunge => buf.extend_from_slice(b"EXPUNGE"),

            Self::UidExpunge { uids } => {
                buf.extend_from_slice(b"UID EXPUNGE ");
                buf.extend_from_slice(uids.to_string().as_bytes());
            }

            Self::Search {
                query,
                options,
                charset,
                uid,
            } => {
                if *uid {
                    buf.extend_from_slice(b"UID ");
                }
                buf.extend_from_slice(b"SEARCH ");
                let opts = options.to_wire();
                if !opts.is_empty() {
                    buf.extend_from_slice(opts.as_bytes());
                    buf.push(b' ');
                }
                if let Some(cs) = charset {
                    buf.extend_from_slice(b"CHARSET ");
                    buf.extend_from_slice(cs.as_bytes());
                    buf.push(b' ');
                }
                query.write(&mut buf);
            }

            Self::Sort {
                order,
                query,
                charset,
                uid,
            } => {
                if *uid {
                    buf.extend_from_slice(b"UID ");
                }
                buf.extend_from_slice(b"SORT ");
                buf.extend_from_slice(sort_criteria_to_wire(order).as_bytes());
                buf.push(b' ');
                buf.extend_from_slice(charset.as_bytes());
                buf.push(b' ');
                query.write(&mut buf);
            }

            Self::Thread {
                algorithm,
                query,
                charset,
                uid,
            } => {
                if *uid {
                    buf.extend_from_slice(b"UID ");
                }
                buf.extend_from_slice(b"THREAD ");
                buf.extend_from_slice(algorithm.as_str().as_bytes());
                buf.push(b' ');
                buf.extend_from_slice(charset.as_bytes());
                buf.push(b' ');
                query.write(&mut buf);
            }

            Self::Fetch {
                set,
                items,
                changed_since,
                uid,
            } => {
                if *uid {
                    buf.extend_from_slice(b"UID ");
                }
                buf.extend_from_slice(b"FETCH ");
                buf.extend_from_slice(set.to_string().as_bytes());
                buf.push(b' ');
                write_fetch_items(&mut buf, items);
                if let Some(modseq) = changed_since {
                    buf.extend_from_slice(format!(" (CHANGEDSINCE {modseq})").as_bytes());
                }
            }

            Self::Store { set, action, uid } => {
                if *uid {
                    buf.extend_from_slice(b"UID ");
                }
                buf.extend_from_slice(b"STORE ");
                buf.extend_from_slice(set.to_string().as_bytes());
                buf.push(b' ');
                write_store_action(&mut buf, action);
            }

            Self::Copy { set, mailbox, uid } => {
                if *uid {
                    buf.extend_from_slice(b"UID ");
                }
                buf.extend_from_slice(b"COPY ");
                buf.extend_from_slice(set.to_string().as_bytes());
                buf.push(b' ');
                write_mailbox(&mut buf, mailbox);
            }

            Self::Move { set, mailbox, uid } => {
                if *uid {
                    buf.extend_from_slice(b"UID ");
                }
                buf.extend_from_slice(b"MOVE ");
                buf.extend_from_slice(set.to_string().as_bytes());
                buf.push(b' ');
                write_mailbox(&mut buf, mailbox);
            }

            Self::Idle => buf.extend_from_slice(b"IDLE"),
            Self::Done => buf.extend_from_slice(b"DONE"),
        }

        buf.extend_from_slice(b"\r\n");
        buf
    }
}

/// Builds the header line of an APPEND command up to and including the
/// literal prefix for the first (or next) message.
///
/// For the first message the line starts with `<tag> APPEND <mailbox>`;
/// for MULTIAPPEND continuations (`tag` empty) it carries only the
/// per-message arguments. The caller sends the message octets after the
/// server's continuation, or immediately when `non_sync` is set.
#[must_use]
pub fn append_header(
    tag: &str,
    mailbox: Option<&MailboxName>,
    flags: &Flags,
    internal_date: Option<&str>,
    annotations: &[Annotation],
    message_len: usize,
    non_sync: bool,
) -> Vec<u8> {
    let mut buf = Vec::new();

    if let Some(mailbox) = mailbox {
        buf.extend_from_slice(tag.as_bytes());
        buf.extend_from_slice(b" APPEND ");
        write_mailbox(&mut buf, mailbox);
    }

    if !flags.is_empty() {
        buf.extend_from_slice(b" (");
        for (i, flag) in flags.iter().enumerate() {
            if i > 0 {
                buf.push(b' ');
            }
            buf.extend_from_slice(flag.as_str().as_bytes());
        }
        buf.push(b')');
    }

    if let Some(date) = internal_date {
        buf.push(b' ');
        buf.push(b'"');
        buf.extend_from_slice(date.as_bytes());
        buf.push(b'"');
    }

    if !annotations.is_empty() {
        buf.extend_from_slice(b" ANNOTATION (");
        for (i, annotation) in annotations.iter().enumerate() {
            if i > 0 {
                buf.push(b' ');
            }
            serialize::write_annotation(&mut buf, annotation);
        }
        buf.push(b')');
    }

    buf.push(b' ');
    write_literal_prefix(&mut buf, message_len, non_sync);
    buf.extend_from_slice(b"\r\n");
    buf
}

/// Builds the header line of a REPLACE command (RFC 8508).
///
/// `UID REPLACE <uid> <mailbox> <append-args>`; the replacement message
/// follows as a literal, exactly like APPEND.
#[must_use]
pub fn replace_header(
    tag: &str,
    uid: u32,
    mailbox: &MailboxName,
    flags: &Flags,
    internal_date: Option<&str>,
    message_len: usize,
    non_sync: bool,
) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.extend_from_slice(tag.as_bytes());
    buf.extend_from_slice(format!(" UID REPLACE {uid} ").as_bytes());
    write_mailbox(&mut buf, mailbox);

    if !flags.is_empty() {
        buf.extend_from_slice(b" (");
        for (i, flag) in flags.iter().enumerate() {
            if i > 0 {
                buf.push(b' ');
            }
            buf.extend_from_slice(flag.as_str().as_bytes());
        }
        buf.push(b')');
    }

    if let Some(date) = internal_date {
        buf.push(b' ');
        buf.push(b'"');
        buf.extend_from_slice(date.as_bytes());
        buf.push(b'"');
    }

    buf.push(b' ');
    write_literal_prefix(&mut buf, message_len, non_sync);
    buf.extend_from_slice(b"\r\n");
    buf
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::Flag;

    #[test]
    fn capability() {
        assert_eq!(Command::Capability.serialize("A0001"), b"A0001 CAPABILITY\r\n");
    }

    #[test]
    fn login_quotes_when_needed() {
        let cmd = Command::Login {
            username: "user@example.com".to_string(),
            password: "pass word".to_string(),
        };
        assert_eq!(
            cmd.serialize("A0001"),
            b"A0001 LOGIN user@example.com \"pass word\"\r\n"
        );
    }

    #[test]
    fn select_plain_and_condstore() {
        let cmd = Command::Select {
            mailbox: MailboxName::inbox(),
            condstore: false,
            qresync: None,
        };
        assert_eq!(cmd.serialize("A0002"), b"A0002 SELECT INBOX\r\n");

        let cmd = Command::Select {
            mailbox: MailboxName::inbox(),
            condstore: true,
            qresync: None,
        };
        assert_eq!(cmd.serialize("A0002"), b"A0002 SELECT INBOX (CONDSTORE)\r\n");
    }

    #[test]
    fn select_qresync_parameter_wins() {
        let cmd = Command::Select {
            mailbox: MailboxName::inbox(),
            condstore: true,
            qresync: Some("(QRESYNC (1234 500 1:10))".to_string()),
        };
        assert_eq!(
            cmd.serialize("A0003"),
            b"A0003 SELECT INBOX (QRESYNC (1234 500 1:10))\r\n"
        );
    }

    #[test]
    fn create_with_special_use() {
        let cmd = Command::Create {
            mailbox: MailboxName::new("Archive/2024"),
            special_use: vec![MailboxAttribute::Archive],
        };
        assert_eq!(
            cmd.serialize("A0004"),
            b"A0004 CREATE Archive/2024 (USE (\\Archive))\r\n"
        );
    }

    #[test]
    fn list_quotes_wildcards() {
        let cmd = Command::List {
            reference: String::new(),
            pattern: "*".to_string(),
        };
        assert_eq!(cmd.serialize("A0005"), b"A0005 LIST \"\" \"*\"\r\n");
    }

    #[test]
    fn fetch_with_changed_since() {
        let cmd = Command::Fetch {
            set: SequenceSet::range(1, 10).unwrap(),
            items: vec![FetchAttribute::Uid, FetchAttribute::Flags],
            changed_since: ModSeq::new(500),
            uid: true,
        };
        assert_eq!(
            cmd.serialize("A0006"),
            b"A0006 UID FETCH 1:10 (UID FLAGS) (CHANGEDSINCE 500)\r\n"
        );
    }

    #[test]
    fn store_flags() {
        let cmd = Command::Store {
            set: SequenceSet::single(1).unwrap(),
            action: StoreWire::Flags {
                mode: StoreMode::Add,
                silent: true,
                flags: Flags::from_vec(vec![Flag::Seen]),
                unchanged_since: None,
            },
            uid: false,
        };
        assert_eq!(
            cmd.serialize("A0007"),
            b"A0007 STORE 1 +FLAGS.SILENT (\\Seen)\r\n"
        );
    }

    #[test]
    fn uid_search_with_options_and_charset() {
        let cmd = Command::Search {
            query: SearchQuery::Subject("héllo".to_string()),
            options: crate::search::SearchOptions {
                return_all: true,
                ..Default::default()
            },
            charset: Some("UTF-8".to_string()),
            uid: true,
        };
        assert_eq!(
            cmd.serialize("A0008"),
            "A0008 UID SEARCH RETURN (ALL) CHARSET UTF-8 SUBJECT héllo\r\n".as_bytes()
        );
    }

    #[test]
    fn sort_and_thread() {
        let cmd = Command::Sort {
            order: vec![crate::search::OrderBy::desc(crate::search::SortKey::Date)],
            query: SearchQuery::All,
            charset: "UTF-8".to_string(),
            uid: true,
        };
        assert_eq!(
            cmd.serialize("A0009"),
            b"A0009 UID SORT (REVERSE DATE) UTF-8 ALL\r\n"
        );

        let cmd = Command::Thread {
            algorithm: ThreadingAlgorithm::References,
            query: SearchQuery::All,
            charset: "UTF-8".to_string(),
            uid: true,
        };
        assert_eq!(
            cmd.serialize("A0010"),
            b"A0010 UID THREAD REFERENCES UTF-8 ALL\r\n"
        );
    }

    #[test]
    fn uid_expunge() {
        let cmd = Command::UidExpunge {
            uids: UidSet::parse("100:200").unwrap(),
        };
        assert_eq!(cmd.serialize("A0011"), b"A0011 UID EXPUNGE 100:200\r\n");
    }

    #[test]
    fn done_has_no_tag() {
        assert_eq!(Command::Done.serialize(""), b"DONE\r\n");
    }

    #[test]
    fn id_nil() {
        let cmd = Command::Id { parameters: None };
        assert_eq!(cmd.serialize("A0012"), b"A0012 ID NIL\r\n");
    }

    #[test]
    fn append_header_full() {
        let flags = Flags::from_vec(vec![Flag::Seen]);
        let header = append_header(
            "A0013",
            Some(&MailboxName::inbox()),
            &flags,
            Some("01-Feb-2024 10:00:00 +0000"),
            &[],
            512,
            false,
        );
        assert_eq!(
            header,
            b"A0013 APPEND INBOX (\\Seen) \"01-Feb-2024 10:00:00 +0000\" {512}\r\n"
        );
    }

    #[test]
    fn append_header_non_sync_literal() {
        let header = append_header(
            "A0014",
            Some(&MailboxName::inbox()),
            &Flags::new(),
            None,
            &[],
            3,
            true,
        );
        assert_eq!(header, b"A0014 APPEND INBOX {3+}\r\n");
    }

    #[test]
    fn multiappend_continuation_has_no_command_prefix() {
        let header = append_header("", None, &Flags::new(), None, &[], 10, false);
        assert_eq!(header, b" {10}\r\n");
    }

    #[test]
    fn replace_header_shape() {
        let header = replace_header(
            "A0015",
            42,
            &MailboxName::inbox(),
            &Flags::new(),
            None,
            7,
            false,
        );
        assert_eq!(header, b"A0015 UID REPLACE 42 INBOX {7}\r\n");
    }
}
