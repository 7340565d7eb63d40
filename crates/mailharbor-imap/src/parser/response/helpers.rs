//! Parse helpers for untagged responses and response codes.

use crate::parser::lexer::{Lexer, Token};
use crate::search::SearchResults;
use crate::types::{
    Capability, Flag, Flags, ListEntry, MailboxAttribute, MailboxName, MessageThread, ModSeq,
    ResponseCode, SeqNum, Uid, UidSet, UidValidity,
};
use crate::{Error, Result};

use super::types::{ESearchData, NamespaceEntry, QuotaResource, StatusItem};

/// Parses a `[...]` response code.
pub fn parse_response_code(lexer: &mut Lexer<'_>) -> Result<ResponseCode> {
    lexer.expect(Token::LBracket)?;

    let atom = lexer.read_atom_str()?;
    let upper = atom.to_uppercase();

    let code = match upper.as_str() {
        "ALERT" => ResponseCode::Alert,
        "BADCHARSET" => ResponseCode::BadCharset,
        "PARSE" => ResponseCode::Parse,
        "READ-ONLY" => ResponseCode::ReadOnly,
        "READ-WRITE" => ResponseCode::ReadWrite,
        "TRYCREATE" => ResponseCode::TryCreate,
        "NOMODSEQ" => ResponseCode::NoModSeq,
        "CLOSED" => ResponseCode::Closed,
        "UIDNEXT" => {
            lexer.expect_space()?;
            let n = lexer.read_number()?;
            let uid = Uid::new(n).ok_or_else(|| parse_error(lexer, "UIDNEXT of 0"))?;
            ResponseCode::UidNext(uid)
        }
        "UIDVALIDITY" => {
            lexer.expect_space()?;
            let n = lexer.read_number()?;
            let validity =
                UidValidity::new(n).ok_or_else(|| parse_error(lexer, "UIDVALIDITY of 0"))?;
            ResponseCode::UidValidity(validity)
        }
        "UNSEEN" => {
            lexer.expect_space()?;
            let n = lexer.read_number()?;
            let seq = SeqNum::new(n).ok_or_else(|| parse_error(lexer, "UNSEEN of 0"))?;
            ResponseCode::Unseen(seq)
        }
        "HIGHESTMODSEQ" => {
            lexer.expect_space()?;
            let n = lexer.read_number64()?;
            let modseq = ModSeq::new(n).ok_or_else(|| parse_error(lexer, "HIGHESTMODSEQ of 0"))?;
            ResponseCode::HighestModSeq(modseq)
        }
        "CAPABILITY" => {
            let caps = parse_capability_list(lexer)?;
            ResponseCode::Capability(caps)
        }
        "PERMANENTFLAGS" => {
            lexer.expect_space()?;
            let (flags, accepts_new_keywords) = parse_flag_list(lexer)?;
            ResponseCode::PermanentFlags {
                flags,
                accepts_new_keywords,
            }
        }
        "APPENDUID" => {
            lexer.expect_space()?;
            let n = lexer.read_number()?;
            let validity =
                UidValidity::new(n).ok_or_else(|| parse_error(lexer, "APPENDUID validity of 0"))?;
            lexer.expect_space()?;
            let uids = parse_uid_set_token(lexer)?;
            ResponseCode::AppendUid { validity, uids }
        }
        "COPYUID" => {
            lexer.expect_space()?;
            let n = lexer.read_number()?;
            let validity =
                UidValidity::new(n).ok_or_else(|| parse_error(lexer, "COPYUID validity of 0"))?;
            lexer.expect_space()?;
            let source = parse_uid_set_token(lexer)?;
            lexer.expect_space()?;
            let dest = parse_uid_set_token(lexer)?;
            ResponseCode::CopyUid {
                validity,
                source,
                dest,
            }
        }
        "MODIFIED" => {
            lexer.expect_space()?;
            let set = parse_uid_set_token(lexer)?;
            ResponseCode::Modified(set)
        }
        "MAILBOXID" => {
            lexer.expect_space()?;
            lexer.expect(Token::LParen)?;
            let id = lexer.read_astring()?;
            lexer.expect(Token::RParen)?;
            ResponseCode::MailboxId(id)
        }
        _ => {
            skip_to_bracket_close(lexer);
            ResponseCode::Unknown(atom.to_string())
        }
    };

    skip_to_bracket_close(lexer);
    lexer.expect(Token::RBracket)?;
    Ok(code)
}

fn skip_to_bracket_close(lexer: &mut Lexer<'_>) {
    while lexer.peek() != Some(b']') && !lexer.is_eof() {
        lexer.advance();
    }
}

pub(crate) fn parse_error(lexer: &Lexer<'_>, message: &str) -> Error {
    Error::Parse {
        position: lexer.position(),
        message: message.to_string(),
    }
}

/// Parses a UID set written as a number or an atom like `304,319:320`.
pub fn parse_uid_set_token(lexer: &mut Lexer<'_>) -> Result<UidSet> {
    match lexer.next_token()? {
        Token::Number(n) => {
            let n = u32::try_from(n).map_err(|_| parse_error(lexer, "uid out of range"))?;
            let uid = Uid::new(n).ok_or_else(|| parse_error(lexer, "uid of 0"))?;
            Ok(UidSet::Single(uid))
        }
        Token::Atom(s) => {
            UidSet::parse(s).ok_or_else(|| parse_error(lexer, &format!("invalid uid set: {s}")))
        }
        token => Err(parse_error(
            lexer,
            &format!("expected uid set, got {token:?}"),
        )),
    }
}

/// Parses space-separated capabilities up to end of line.
pub fn parse_capability_list(lexer: &mut Lexer<'_>) -> Result<Vec<Capability>> {
    let mut caps = Vec::new();
    while lexer.peek() == Some(b' ') {
        lexer.advance();
        if let Token::Atom(s) = lexer.next_token()? {
            caps.push(Capability::parse(s));
        }
    }
    Ok(caps)
}

/// Parses a parenthesized flag list.
///
/// Returns the flags plus whether `\*` was present (PERMANENTFLAGS only).
pub fn parse_flag_list(lexer: &mut Lexer<'_>) -> Result<(Flags, bool)> {
    lexer.expect(Token::LParen)?;

    let mut flags = Flags::new();
    let mut wildcard = false;

    loop {
        match lexer.next_token()? {
            Token::RParen => break,
            Token::Space => {}
            Token::Atom(s) => {
                if s == "\\*" {
                    wildcard = true;
                } else {
                    flags.insert(Flag::parse(s));
                }
            }
            token => {
                return Err(parse_error(
                    lexer,
                    &format!("unexpected token in flag list: {token:?}"),
                ));
            }
        }
    }

    Ok((flags, wildcard))
}

/// Parses a LIST or LSUB line after the response name.
pub fn parse_list_entry(lexer: &mut Lexer<'_>) -> Result<ListEntry> {
    lexer.expect(Token::LParen)?;
    let mut attributes = Vec::new();

    loop {
        match lexer.next_token()? {
            Token::RParen => break,
            Token::Space => {}
            Token::Atom(s) => attributes.push(MailboxAttribute::parse(s)),
            token => {
                return Err(parse_error(
                    lexer,
                    &format!("unexpected token in LIST attributes: {token:?}"),
                ));
            }
        }
    }

    lexer.expect_space()?;

    let delimiter = match lexer.next_token()? {
        Token::Nil => None,
        Token::QuotedString(s) => s.chars().next(),
        token => {
            return Err(parse_error(
                lexer,
                &format!("expected delimiter, got {token:?}"),
            ));
        }
    };

    lexer.expect_space()?;
    let name = lexer.read_astring()?;

    Ok(ListEntry {
        attributes,
        delimiter,
        name: MailboxName::new(name),
    })
}

/// Parses a STATUS line after the response name.
pub fn parse_status_line(lexer: &mut Lexer<'_>) -> Result<(MailboxName, Vec<StatusItem>)> {
    let mailbox = lexer.read_astring()?;
    lexer.expect_space()?;
    lexer.expect(Token::LParen)?;

    let mut items = Vec::new();

    loop {
        match lexer.next_token()? {
            Token::RParen => break,
            Token::Space => {}
            Token::Atom(name) => {
                lexer.expect_space()?;
                let upper = name.to_uppercase();
                let item = match upper.as_str() {
                    "MAILBOXID" => {
                        lexer.expect(Token::LParen)?;
                        let id = lexer.read_astring()?;
                        lexer.expect(Token::RParen)?;
                        Some(StatusItem::MailboxId(id))
                    }
                    "HIGHESTMODSEQ" => {
                        let n = lexer.read_number64()?;
                        ModSeq::new(n).map(StatusItem::HighestModSeq)
                    }
                    "SIZE" => Some(StatusItem::Size(lexer.read_number64()?)),
                    _ => {
                        let value = lexer.read_number()?;
                        match upper.as_str() {
                            "MESSAGES" => Some(StatusItem::Messages(value)),
                            "RECENT" => Some(StatusItem::Recent(value)),
                            "UIDNEXT" => Uid::new(value).map(StatusItem::UidNext),
                            "UIDVALIDITY" => UidValidity::new(value).map(StatusItem::UidValidity),
                            "UNSEEN" => Some(StatusItem::Unseen(value)),
                            "DELETED" => Some(StatusItem::Deleted(value)),
                            "APPENDLIMIT" => Some(StatusItem::AppendLimit(value)),
                            _ => None,
                        }
                    }
                };
                if let Some(item) = item {
                    items.push(item);
                }
            }
            _ => {}
        }
    }

    Ok((MailboxName::new(mailbox), items))
}

/// Parses the numbers of a classic SEARCH or SORT response, including the
/// optional trailing `(MODSEQ n)` (RFC 4731).
pub fn parse_number_list(lexer: &mut Lexer<'_>) -> Result<(Vec<u32>, Option<ModSeq>)> {
    let mut numbers = Vec::new();
    let mut modseq = None;

    loop {
        lexer.skip_spaces();
        match lexer.peek() {
            Some(b'(') => {
                lexer.advance();
                if let Token::Atom(s) = lexer.next_token()?
                    && s.eq_ignore_ascii_case("MODSEQ")
                {
                    lexer.expect_space()?;
                    modseq = ModSeq::new(lexer.read_number64()?);
                }
                while lexer.peek() != Some(b')') && !lexer.is_eof() {
                    lexer.advance();
                }
                lexer.expect(Token::RParen)?;
            }
            Some(b'0'..=b'9') => {
                let n = lexer.read_number()?;
                numbers.push(n);
            }
            _ => break,
        }
    }

    Ok((numbers, modseq))
}

/// Parses an ESEARCH response (RFC 4731), also produced by ESORT.
pub fn parse_esearch(lexer: &mut Lexer<'_>) -> Result<ESearchData> {
    let mut data = ESearchData::default();

    // Optional correlator: (TAG "A285")
    lexer.skip_spaces();
    if lexer.peek() == Some(b'(') {
        lexer.advance();
        if let Token::Atom(s) = lexer.next_token()?
            && s.eq_ignore_ascii_case("TAG")
        {
            lexer.expect_space()?;
            data.tag = Some(lexer.read_astring()?);
        }
        while lexer.peek() != Some(b')') && !lexer.is_eof() {
            lexer.advance();
        }
        lexer.expect(Token::RParen)?;
    }

    let mut results = SearchResults::default();

    loop {
        lexer.skip_spaces();
        if lexer.is_eof() || lexer.peek() == Some(b'\r') {
            break;
        }
        let Token::Atom(name) = lexer.next_token()? else {
            break;
        };
        let upper = name.to_uppercase();
        match upper.as_str() {
            "UID" => data.uid = true,
            "MIN" => {
                lexer.expect_space()?;
                results.min = Some(lexer.read_number()?);
            }
            "MAX" => {
                lexer.expect_space()?;
                results.max = Some(lexer.read_number()?);
            }
            "COUNT" => {
                lexer.expect_space()?;
                results.count = Some(lexer.read_number()?);
            }
            "MODSEQ" => {
                lexer.expect_space()?;
                results.mod_seq = ModSeq::new(lexer.read_number64()?);
            }
            "ALL" => {
                lexer.expect_space()?;
                let set = parse_uid_set_token(lexer)?;
                if let Some(uids) = set.expand() {
                    results.all = uids.iter().map(|u| u.get()).collect();
                }
            }
            _ => {}
        }
    }

    data.results = results;
    Ok(data)
}

/// Parses a VANISHED response after the response name (RFC 7162).
pub fn parse_vanished(lexer: &mut Lexer<'_>) -> Result<(bool, UidSet)> {
    lexer.skip_spaces();

    let mut earlier = false;
    if lexer.peek() == Some(b'(') {
        lexer.advance();
        if let Token::Atom(s) = lexer.next_token()?
            && s.eq_ignore_ascii_case("EARLIER")
        {
            earlier = true;
        }
        lexer.expect(Token::RParen)?;
        lexer.skip_spaces();
    }

    let uids = parse_uid_set_token(lexer)?;
    Ok((earlier, uids))
}

/// Element of a thread list: a message number or a nested branch.
enum ThreadElem {
    Num(u32),
    Node(MessageThread),
}

/// Parses the forest of a THREAD response (RFC 5256).
pub fn parse_thread_forest(lexer: &mut Lexer<'_>) -> Result<Vec<MessageThread>> {
    let mut forest = Vec::new();

    loop {
        lexer.skip_spaces();
        match lexer.peek() {
            Some(b'(') => {
                lexer.advance();
                forest.push(parse_thread_body(lexer)?);
            }
            _ => break,
        }
    }

    Ok(forest)
}

/// Parses one thread list; the opening paren is already consumed.
fn parse_thread_body(lexer: &mut Lexer<'_>) -> Result<MessageThread> {
    let mut elements = Vec::new();

    loop {
        match lexer.next_token()? {
            Token::RParen => break,
            Token::Space => {}
            Token::Number(n) => {
                let n = u32::try_from(n).map_err(|_| parse_error(lexer, "thread id too large"))?;
                elements.push(ThreadElem::Num(n));
            }
            Token::LParen => elements.push(ThreadElem::Node(parse_thread_body(lexer)?)),
            token => {
                return Err(parse_error(
                    lexer,
                    &format!("unexpected token in THREAD: {token:?}"),
                ));
            }
        }
    }

    Ok(build_thread(&elements))
}

/// Builds a thread from its flat element list.
///
/// A leading number starts a parent/child chain; a leading branch means
/// the server grouped siblings under a missing parent (placeholder).
fn build_thread(elements: &[ThreadElem]) -> MessageThread {
    match elements.split_first() {
        None => MessageThread::placeholder(Vec::new()),
        Some((ThreadElem::Num(n), rest)) => MessageThread {
            uid: Uid::new(*n),
            children: thread_children(rest),
        },
        Some((ThreadElem::Node(_), _)) => MessageThread::placeholder(
            elements
                .iter()
                .map(|e| match e {
                    ThreadElem::Num(n) => MessageThread {
                        uid: Uid::new(*n),
                        children: Vec::new(),
                    },
                    ThreadElem::Node(t) => t.clone(),
                })
                .collect(),
        ),
    }
}

fn thread_children(rest: &[ThreadElem]) -> Vec<MessageThread> {
    match rest.first() {
        None => Vec::new(),
        Some(ThreadElem::Num(_)) => vec![build_thread(rest)],
        Some(ThreadElem::Node(_)) => rest
            .iter()
            .map(|e| match e {
                ThreadElem::Num(n) => MessageThread {
                    uid: Uid::new(*n),
                    children: Vec::new(),
                },
                ThreadElem::Node(t) => t.clone(),
            })
            .collect(),
    }
}

/// Parses one NAMESPACE group: NIL or `((prefix delim) ...)`.
pub fn parse_namespace_group(lexer: &mut Lexer<'_>) -> Result<Vec<NamespaceEntry>> {
    match lexer.next_token()? {
        Token::Nil => Ok(Vec::new()),
        Token::LParen => {
            let mut entries = Vec::new();
            loop {
                match lexer.next_token()? {
                    Token::RParen => break,
                    Token::Space => {}
                    Token::LParen => {
                        let prefix = lexer.read_astring()?;
                        lexer.expect_space()?;
                        let delimiter = match lexer.next_token()? {
                            Token::Nil => None,
                            Token::QuotedString(s) => s.chars().next(),
                            token => {
                                return Err(parse_error(
                                    lexer,
                                    &format!("expected namespace delimiter, got {token:?}"),
                                ));
                            }
                        };
                        // Skip namespace extensions up to the closing paren.
                        let mut depth = 0u32;
                        loop {
                            match lexer.peek() {
                                Some(b'(') => {
                                    depth += 1;
                                    lexer.advance();
                                }
                                Some(b')') => {
                                    if depth == 0 {
                                        lexer.advance();
                                        break;
                                    }
                                    depth -= 1;
                                    lexer.advance();
                                }
                                Some(_) => {
                                    lexer.advance();
                                }
                                None => break,
                            }
                        }
                        entries.push(NamespaceEntry { prefix, delimiter });
                    }
                    token => {
                        return Err(parse_error(
                            lexer,
                            &format!("unexpected token in NAMESPACE: {token:?}"),
                        ));
                    }
                }
            }
            Ok(entries)
        }
        token => Err(parse_error(
            lexer,
            &format!("expected namespace group, got {token:?}"),
        )),
    }
}

/// Parses an ID response body: NIL or a field/value list.
pub fn parse_id_params(lexer: &mut Lexer<'_>) -> Result<Vec<(String, Option<String>)>> {
    match lexer.next_token()? {
        Token::Nil => Ok(Vec::new()),
        Token::LParen => {
            let mut params = Vec::new();
            loop {
                lexer.skip_spaces();
                if lexer.peek() == Some(b')') {
                    lexer.advance();
                    break;
                }
                let key = lexer.read_astring()?;
                lexer.expect_space()?;
                let value = lexer.read_nstring()?;
                params.push((key, value));
            }
            Ok(params)
        }
        token => Err(parse_error(lexer, &format!("expected ID list, got {token:?}"))),
    }
}

/// Parses a QUOTA response body: root name plus resource triples.
pub fn parse_quota(lexer: &mut Lexer<'_>) -> Result<(String, Vec<QuotaResource>)> {
    let root = lexer.read_astring()?;
    lexer.expect_space()?;
    lexer.expect(Token::LParen)?;

    let mut resources = Vec::new();
    loop {
        lexer.skip_spaces();
        if lexer.peek() == Some(b')') {
            lexer.advance();
            break;
        }
        let name = lexer.read_astring()?;
        lexer.expect_space()?;
        let usage = lexer.read_number64()?;
        lexer.expect_space()?;
        let limit = lexer.read_number64()?;
        resources.push(QuotaResource { name, usage, limit });
    }

    Ok((root, resources))
}

/// Parses a QUOTAROOT response body: mailbox plus root names.
pub fn parse_quota_root(lexer: &mut Lexer<'_>) -> Result<(MailboxName, Vec<String>)> {
    let mailbox = lexer.read_astring()?;
    let mut roots = Vec::new();
    while lexer.peek() == Some(b' ') {
        lexer.advance();
        roots.push(lexer.read_astring()?);
    }
    Ok((MailboxName::new(mailbox), roots))
}

/// Parses an ACL response body: mailbox plus identifier/rights pairs.
pub fn parse_acl(lexer: &mut Lexer<'_>) -> Result<(MailboxName, Vec<(String, String)>)> {
    let mailbox = lexer.read_astring()?;
    let mut entries = Vec::new();
    while lexer.peek() == Some(b' ') {
        lexer.advance();
        let identifier = lexer.read_astring()?;
        lexer.expect_space()?;
        let rights = lexer.read_astring()?;
        entries.push((identifier, rights));
    }
    Ok((MailboxName::new(mailbox), entries))
}

/// Parses a METADATA response body, in both solicited and unsolicited
/// forms (RFC 5464).
pub fn parse_metadata(
    lexer: &mut Lexer<'_>,
) -> Result<(MailboxName, Vec<(String, Option<String>)>)> {
    let mailbox = lexer.read_astring()?;
    lexer.expect_space()?;

    let mut entries = Vec::new();
    if lexer.peek() == Some(b'(') {
        lexer.advance();
        loop {
            lexer.skip_spaces();
            if lexer.peek() == Some(b')') {
                lexer.advance();
                break;
            }
            let entry = lexer.read_astring()?;
            lexer.expect_space()?;
            let value = lexer.read_nstring()?;
            entries.push((entry, value));
        }
    } else {
        // Unsolicited form: a bare list of changed entry names.
        entries.push((lexer.read_astring()?, None));
        while lexer.peek() == Some(b' ') {
            lexer.advance();
            entries.push((lexer.read_astring()?, None));
        }
    }

    Ok((MailboxName::new(mailbox), entries))
}

/// Reads human text up to (and consuming) the CRLF.
pub fn read_text_until_crlf(lexer: &mut Lexer<'_>) -> String {
    let remaining = lexer.remaining();
    let end = remaining
        .windows(2)
        .position(|w| w == b"\r\n")
        .unwrap_or(remaining.len());

    lexer.skip(end);
    if lexer.peek() == Some(b'\r') {
        lexer.skip(2);
    }

    String::from_utf8_lossy(&remaining[..end]).to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn response_code_uidvalidity() {
        let mut lexer = Lexer::new(b"[UIDVALIDITY 1234567890] ok");
        let code = parse_response_code(&mut lexer).unwrap();
        assert_eq!(
            code,
            ResponseCode::UidValidity(UidValidity::new(1_234_567_890).unwrap())
        );
    }

    #[test]
    fn response_code_permanentflags_with_wildcard() {
        let mut lexer = Lexer::new(b"[PERMANENTFLAGS (\\Seen \\Deleted \\*)]");
        let code = parse_response_code(&mut lexer).unwrap();
        match code {
            ResponseCode::PermanentFlags {
                flags,
                accepts_new_keywords,
            } => {
                assert_eq!(flags.len(), 2);
                assert!(accepts_new_keywords);
            }
            other => panic!("unexpected code: {other:?}"),
        }
    }

    #[test]
    fn response_code_appenduid() {
        let mut lexer = Lexer::new(b"[APPENDUID 38505 3955]");
        let code = parse_response_code(&mut lexer).unwrap();
        match code {
            ResponseCode::AppendUid { validity, uids } => {
                assert_eq!(validity.get(), 38_505);
                assert_eq!(uids.to_string(), "3955");
            }
            other => panic!("unexpected code: {other:?}"),
        }
    }

    #[test]
    fn response_code_copyuid() {
        let mut lexer = Lexer::new(b"[COPYUID 38505 304,319:320 3956:3958]");
        let code = parse_response_code(&mut lexer).unwrap();
        match code {
            ResponseCode::CopyUid {
                validity,
                source,
                dest,
            } => {
                assert_eq!(validity.get(), 38_505);
                assert_eq!(source.to_string(), "304,319:320");
                assert_eq!(dest.to_string(), "3956:3958");
            }
            other => panic!("unexpected code: {other:?}"),
        }
    }

    #[test]
    fn response_code_modified() {
        let mut lexer = Lexer::new(b"[MODIFIED 5,9]");
        let code = parse_response_code(&mut lexer).unwrap();
        assert_eq!(code, ResponseCode::Modified(UidSet::parse("5,9").unwrap()));
    }

    #[test]
    fn response_code_highestmodseq_is_64_bit() {
        let mut lexer = Lexer::new(b"[HIGHESTMODSEQ 715194045007]");
        let code = parse_response_code(&mut lexer).unwrap();
        assert_eq!(
            code,
            ResponseCode::HighestModSeq(ModSeq::new(715_194_045_007).unwrap())
        );
    }

    #[test]
    fn response_code_unknown_is_tolerated() {
        let mut lexer = Lexer::new(b"[XWIDGET 1 2 3] hello");
        let code = parse_response_code(&mut lexer).unwrap();
        assert_eq!(code, ResponseCode::Unknown("XWIDGET".to_string()));
    }

    #[test]
    fn vanished_with_earlier() {
        let mut lexer = Lexer::new(b" (EARLIER) 300:310,405");
        let (earlier, uids) = parse_vanished(&mut lexer).unwrap();
        assert!(earlier);
        assert_eq!(uids.to_string(), "300:310,405");
    }

    #[test]
    fn vanished_without_earlier() {
        let mut lexer = Lexer::new(b" 41");
        let (earlier, uids) = parse_vanished(&mut lexer).unwrap();
        assert!(!earlier);
        assert_eq!(uids.to_string(), "41");
    }

    #[test]
    fn search_numbers_with_modseq() {
        let mut lexer = Lexer::new(b" 2 5 8 (MODSEQ 917162500)");
        let (numbers, modseq) = parse_number_list(&mut lexer).unwrap();
        assert_eq!(numbers, vec![2, 5, 8]);
        assert_eq!(modseq.unwrap().get(), 917_162_500);
    }

    #[test]
    fn esearch_full() {
        let mut lexer = Lexer::new(b" (TAG \"A285\") UID COUNT 17 ALL 4:10 MODSEQ 1234");
        let data = parse_esearch(&mut lexer).unwrap();
        assert_eq!(data.tag.as_deref(), Some("A285"));
        assert!(data.uid);
        assert_eq!(data.results.count, Some(17));
        assert_eq!(data.results.all.len(), 7);
        assert_eq!(data.results.mod_seq.unwrap().get(), 1234);
    }

    #[test]
    fn esearch_min_max() {
        let mut lexer = Lexer::new(b" MIN 2 MAX 47");
        let data = parse_esearch(&mut lexer).unwrap();
        assert_eq!(data.results.min, Some(2));
        assert_eq!(data.results.max, Some(47));
        assert!(!data.uid);
    }

    #[test]
    fn thread_forest() {
        let mut lexer = Lexer::new(b" (2)(3 6 (4 23)(44 7 96))");
        let forest = parse_thread_forest(&mut lexer).unwrap();
        assert_eq!(forest.len(), 2);

        assert_eq!(forest[0].uid.unwrap().get(), 2);
        assert!(forest[0].children.is_empty());

        let second = &forest[1];
        assert_eq!(second.uid.unwrap().get(), 3);
        assert_eq!(second.children.len(), 1);
        let six = &second.children[0];
        assert_eq!(six.uid.unwrap().get(), 6);
        assert_eq!(six.children.len(), 2);
        assert_eq!(six.children[0].uid.unwrap().get(), 4);
        assert_eq!(six.children[1].uids().len(), 3);
    }

    #[test]
    fn thread_placeholder_root() {
        let mut lexer = Lexer::new(b" ((3)(5))");
        let forest = parse_thread_forest(&mut lexer).unwrap();
        assert_eq!(forest.len(), 1);
        assert!(forest[0].uid.is_none());
        assert_eq!(forest[0].children.len(), 2);
    }

    #[test]
    fn namespace_group() {
        let mut lexer = Lexer::new(b"((\"\" \"/\"))");
        let entries = parse_namespace_group(&mut lexer).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].prefix, "");
        assert_eq!(entries[0].delimiter, Some('/'));

        let mut lexer = Lexer::new(b"NIL");
        assert!(parse_namespace_group(&mut lexer).unwrap().is_empty());
    }

    #[test]
    fn id_params() {
        let mut lexer = Lexer::new(b"(\"name\" \"Dovecot\" \"version\" NIL)");
        let params = parse_id_params(&mut lexer).unwrap();
        assert_eq!(params.len(), 2);
        assert_eq!(params[0], ("name".to_string(), Some("Dovecot".to_string())));
        assert_eq!(params[1], ("version".to_string(), None));
    }

    #[test]
    fn quota() {
        let mut lexer = Lexer::new(b"\"\" (STORAGE 10 512)");
        let (root, resources) = parse_quota(&mut lexer).unwrap();
        assert_eq!(root, "");
        assert_eq!(resources.len(), 1);
        assert_eq!(resources[0].name, "STORAGE");
        assert_eq!(resources[0].usage, 10);
        assert_eq!(resources[0].limit, 512);
    }

    #[test]
    fn acl() {
        let mut lexer = Lexer::new(b"INBOX alice lrswi bob lrs");
        let (mailbox, entries) = parse_acl(&mut lexer).unwrap();
        assert_eq!(mailbox.as_str(), "INBOX");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1], ("bob".to_string(), "lrs".to_string()));
    }

    #[test]
    fn metadata_solicited() {
        let mut lexer = Lexer::new(b"\"INBOX\" (/private/comment \"my note\")");
        let (mailbox, entries) = parse_metadata(&mut lexer).unwrap();
        assert_eq!(mailbox.as_str(), "INBOX");
        assert_eq!(
            entries[0],
            (
                "/private/comment".to_string(),
                Some("my note".to_string())
            )
        );
    }

    #[test]
    fn metadata_unsolicited() {
        let mut lexer = Lexer::new(b"\"INBOX\" /shared/comment");
        let (_, entries) = parse_metadata(&mut lexer).unwrap();
        assert_eq!(entries[0], ("/shared/comment".to_string(), None));
    }
}
