//! FETCH response parsing.

use crate::parser::lexer::{Lexer, Token};
use crate::types::{
    Address, Annotation, BodyStructure, Envelope, GmailMessageId, GmailThreadId, Label, Labels,
    ModSeq, Uid,
};
use crate::{Error, Result};

use super::helpers::{parse_error, parse_flag_list};
use super::types::FetchItem;

/// Parses the parenthesized item list of a FETCH response.
pub fn parse_fetch_items(lexer: &mut Lexer<'_>) -> Result<Vec<FetchItem>> {
    lexer.expect(Token::LParen)?;

    let mut items = Vec::new();

    loop {
        match lexer.next_token()? {
            Token::RParen => break,
            Token::Space => {}
            Token::Atom(name) => {
                let upper = name.to_uppercase();
                match upper.as_str() {
                    "FLAGS" => {
                        lexer.expect_space()?;
                        let (flags, _) = parse_flag_list(lexer)?;
                        items.push(FetchItem::Flags(flags));
                    }
                    "UID" => {
                        lexer.expect_space()?;
                        let n = lexer.read_number()?;
                        if let Some(uid) = Uid::new(n) {
                            items.push(FetchItem::Uid(uid));
                        }
                    }
                    "RFC822.SIZE" => {
                        lexer.expect_space()?;
                        items.push(FetchItem::Rfc822Size(lexer.read_number()?));
                    }
                    "INTERNALDATE" => {
                        lexer.expect_space()?;
                        if let Token::QuotedString(date) = lexer.next_token()? {
                            items.push(FetchItem::InternalDate(date));
                        }
                    }
                    "ENVELOPE" => {
                        lexer.expect_space()?;
                        let envelope = parse_envelope(lexer)?;
                        items.push(FetchItem::Envelope(Box::new(envelope)));
                    }
                    "BODYSTRUCTURE" => {
                        lexer.expect_space()?;
                        lexer.expect(Token::LParen)?;
                        items.push(FetchItem::BodyStructure(parse_body_structure(lexer)?));
                    }
                    "BODY" => {
                        if lexer.peek() == Some(b'[') {
                            items.push(parse_body_content(lexer)?);
                        } else {
                            lexer.expect_space()?;
                            lexer.expect(Token::LParen)?;
                            items.push(FetchItem::BodyStructure(parse_body_structure(lexer)?));
                        }
                    }
                    "MODSEQ" => {
                        lexer.expect_space()?;
                        lexer.expect(Token::LParen)?;
                        let n = lexer.read_number64()?;
                        lexer.expect(Token::RParen)?;
                        if let Some(modseq) = ModSeq::new(n) {
                            items.push(FetchItem::ModSeq(modseq));
                        }
                    }
                    "X-GM-LABELS" => {
                        lexer.expect_space()?;
                        items.push(FetchItem::GmailLabels(parse_label_list(lexer)?));
                    }
                    "X-GM-MSGID" => {
                        lexer.expect_space()?;
                        items.push(FetchItem::GmailMessageId(GmailMessageId(
                            lexer.read_number64()?,
                        )));
                    }
                    "X-GM-THRID" => {
                        lexer.expect_space()?;
                        items.push(FetchItem::GmailThreadId(GmailThreadId(
                            lexer.read_number64()?,
                        )));
                    }
                    "ANNOTATION" => {
                        lexer.expect_space()?;
                        items.push(FetchItem::Annotations(parse_annotation_list(lexer)?));
                    }
                    "PREVIEW" => {
                        lexer.expect_space()?;
                        items.push(FetchItem::Preview(lexer.read_nstring()?));
                    }
                    "SAVEDATE" => {
                        lexer.expect_space()?;
                        items.push(FetchItem::SaveDate(lexer.read_nstring()?));
                    }
                    _ => skip_fetch_value(lexer)?,
                }
            }
            token => {
                return Err(parse_error(
                    lexer,
                    &format!("unexpected token in FETCH items: {token:?}"),
                ));
            }
        }
    }

    Ok(items)
}

/// Parses `BODY[section]<origin> data`; the `[` has been peeked.
fn parse_body_content(lexer: &mut Lexer<'_>) -> Result<FetchItem> {
    lexer.advance(); // [

    let mut section = String::new();
    loop {
        match lexer.peek() {
            Some(b']') => {
                lexer.advance();
                break;
            }
            Some(b) => {
                section.push(b as char);
                lexer.advance();
            }
            None => return Err(parse_error(lexer, "unterminated BODY section")),
        }
    }

    let mut origin = None;
    if lexer.peek() == Some(b'<') {
        lexer.advance();
        let mut digits = String::new();
        loop {
            match lexer.peek() {
                Some(b'>') => {
                    lexer.advance();
                    break;
                }
                Some(b) if b.is_ascii_digit() => {
                    digits.push(b as char);
                    lexer.advance();
                }
                _ => break,
            }
        }
        origin = digits.parse().ok();
    }

    lexer.expect_space()?;
    let data = match lexer.next_token()? {
        Token::Literal(d) => Some(d),
        Token::QuotedString(s) => Some(s.into_bytes()),
        Token::Nil => None,
        token => {
            return Err(parse_error(
                lexer,
                &format!("expected BODY content, got {token:?}"),
            ));
        }
    };

    Ok(FetchItem::Body {
        section: if section.is_empty() {
            None
        } else {
            Some(section)
        },
        origin,
        data,
    })
}

/// Parses an envelope structure.
pub fn parse_envelope(lexer: &mut Lexer<'_>) -> Result<Envelope> {
    lexer.expect(Token::LParen)?;

    let date = lexer.read_nstring()?;
    lexer.expect_space()?;
    let subject = lexer.read_nstring()?;
    lexer.expect_space()?;
    let from = parse_address_list(lexer)?;
    lexer.expect_space()?;
    let sender = parse_address_list(lexer)?;
    lexer.expect_space()?;
    let reply_to = parse_address_list(lexer)?;
    lexer.expect_space()?;
    let to = parse_address_list(lexer)?;
    lexer.expect_space()?;
    let cc = parse_address_list(lexer)?;
    lexer.expect_space()?;
    let bcc = parse_address_list(lexer)?;
    lexer.expect_space()?;
    let in_reply_to = lexer.read_nstring()?;
    lexer.expect_space()?;
    let message_id = lexer.read_nstring()?;

    lexer.expect(Token::RParen)?;

    Ok(Envelope {
        date,
        subject,
        from,
        sender,
        reply_to,
        to,
        cc,
        bcc,
        in_reply_to,
        message_id,
    })
}

/// Parses an address list (NIL or a list of address quadruples).
pub fn parse_address_list(lexer: &mut Lexer<'_>) -> Result<Vec<Address>> {
    match lexer.next_token()? {
        Token::Nil => Ok(Vec::new()),
        Token::LParen => {
            let mut addresses = Vec::new();
            loop {
                match lexer.peek() {
                    Some(b')') => {
                        lexer.advance();
                        break;
                    }
                    Some(b'(') => {
                        lexer.advance();
                        addresses.push(parse_address(lexer)?);
                    }
                    Some(b' ') => {
                        lexer.advance();
                    }
                    _ => break,
                }
            }
            Ok(addresses)
        }
        token => Err(parse_error(
            lexer,
            &format!("expected address list, got {token:?}"),
        )),
    }
}

/// Parses one address quadruple; the opening paren is consumed.
fn parse_address(lexer: &mut Lexer<'_>) -> Result<Address> {
    let name = lexer.read_nstring()?;
    lexer.expect_space()?;
    let adl = lexer.read_nstring()?;
    lexer.expect_space()?;
    let mailbox = lexer.read_nstring()?;
    lexer.expect_space()?;
    let host = lexer.read_nstring()?;
    lexer.expect(Token::RParen)?;

    Ok(Address {
        name,
        adl,
        mailbox,
        host,
    })
}

/// Parses a body structure; the opening paren is consumed.
///
/// Multipart bodies nest; extension fields after the defined ones are
/// skipped token-wise so quoted parens cannot derail the scan.
pub fn parse_body_structure(lexer: &mut Lexer<'_>) -> Result<BodyStructure> {
    if lexer.peek() == Some(b'(') {
        // Multipart: one or more bodies followed by the subtype.
        let mut parts = Vec::new();
        while lexer.peek() == Some(b'(') {
            lexer.advance();
            parts.push(parse_body_structure(lexer)?);
        }
        lexer.expect_space()?;
        let subtype = lexer.read_astring()?;
        skip_to_close(lexer)?;
        return Ok(BodyStructure::Multipart { parts, subtype });
    }

    let media_type = lexer.read_astring()?;
    lexer.expect_space()?;
    let media_subtype = lexer.read_astring()?;
    lexer.expect_space()?;
    let params = parse_body_params(lexer)?;
    lexer.expect_space()?;
    let id = lexer.read_nstring()?;
    lexer.expect_space()?;
    let description = lexer.read_nstring()?;
    lexer.expect_space()?;
    let encoding = lexer.read_astring()?;
    lexer.expect_space()?;
    let size = lexer.read_number()?;

    let lowered_type = media_type.to_lowercase();
    let lowered_subtype = media_subtype.to_lowercase();

    if lowered_type == "message" && lowered_subtype == "rfc822" {
        lexer.expect_space()?;
        let envelope = parse_envelope(lexer)?;
        lexer.expect_space()?;
        lexer.expect(Token::LParen)?;
        let body = parse_body_structure(lexer)?;
        lexer.expect_space()?;
        let lines = lexer.read_number()?;
        skip_to_close(lexer)?;
        return Ok(BodyStructure::Message {
            envelope: Box::new(envelope),
            body: Box::new(body),
            lines,
        });
    }

    if lowered_type == "text" {
        lexer.expect_space()?;
        let lines = lexer.read_number()?;
        skip_to_close(lexer)?;
        return Ok(BodyStructure::Text {
            subtype: media_subtype,
            params,
            id,
            description,
            encoding,
            size,
            lines,
        });
    }

    skip_to_close(lexer)?;
    Ok(BodyStructure::Basic {
        media_type,
        media_subtype,
        params,
        id,
        description,
        encoding,
        size,
    })
}

/// Parses body parameters: NIL or `("key" "value" ...)`.
fn parse_body_params(lexer: &mut Lexer<'_>) -> Result<Vec<(String, String)>> {
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
                let value = lexer.read_astring()?;
                params.push((key, value));
            }
            Ok(params)
        }
        token => Err(parse_error(
            lexer,
            &format!("expected body params, got {token:?}"),
        )),
    }
}

/// Consumes tokens up to and including the `)` that closes the current
/// group, skipping nested groups and any extension fields.
fn skip_to_close(lexer: &mut Lexer<'_>) -> Result<()> {
    let mut depth = 0u32;
    loop {
        match lexer.next_token()? {
            Token::RParen => {
                if depth == 0 {
                    return Ok(());
                }
                depth -= 1;
            }
            Token::LParen => depth += 1,
            Token::Eof => return Err(parse_error(lexer, "unbalanced body structure")),
            _ => {}
        }
    }
}

/// Parses an X-GM-LABELS list.
fn parse_label_list(lexer: &mut Lexer<'_>) -> Result<Labels> {
    lexer.expect(Token::LParen)?;
    let mut labels = Labels::new();

    loop {
        match lexer.next_token()? {
            Token::RParen => break,
            Token::Space => {}
            Token::Atom(s) => labels.insert(Label::new(s)),
            Token::QuotedString(s) => labels.insert(Label::new(s)),
            token => {
                return Err(parse_error(
                    lexer,
                    &format!("unexpected token in label list: {token:?}"),
                ));
            }
        }
    }

    Ok(labels)
}

/// Parses an ANNOTATION fetch value:
/// `(/entry (attr value attr value) ...)`.
fn parse_annotation_list(lexer: &mut Lexer<'_>) -> Result<Vec<Annotation>> {
    lexer.expect(Token::LParen)?;
    let mut annotations = Vec::new();

    loop {
        lexer.skip_spaces();
        if lexer.peek() == Some(b')') {
            lexer.advance();
            break;
        }
        let entry = lexer.read_astring()?;
        lexer.expect_space()?;
        lexer.expect(Token::LParen)?;
        loop {
            lexer.skip_spaces();
            if lexer.peek() == Some(b')') {
                lexer.advance();
                break;
            }
            let attribute = lexer.read_astring()?;
            lexer.expect_space()?;
            let value = lexer.read_nstring()?;
            annotations.push(Annotation::new(entry.clone(), attribute, value));
        }
    }

    Ok(annotations)
}

/// Skips one unknown fetch item value.
fn skip_fetch_value(lexer: &mut Lexer<'_>) -> Result<()> {
    if lexer.peek() == Some(b' ') {
        lexer.advance();
    }

    let mut depth = 0u32;
    loop {
        match lexer.peek() {
            Some(b'(') => {
                depth += 1;
                lexer.advance();
            }
            Some(b')') => {
                if depth == 0 {
                    break;
                }
                depth -= 1;
                lexer.advance();
            }
            Some(b' ') if depth == 0 => break,
            Some(b'"') => {
                let _ = lexer.next_token()?;
            }
            Some(b'{') => {
                let _ = lexer.next_token()?;
            }
            Some(_) => {
                lexer.advance();
            }
            None => break,
        }
    }

    Ok(())
}
