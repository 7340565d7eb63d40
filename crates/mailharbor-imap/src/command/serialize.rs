//! Command serialization helpers.

use crate::types::{Annotation, MailboxName};

use super::types::{FetchAttribute, StoreWire};

/// Writes an astring: an atom when possible, a quoted string otherwise.
pub fn write_astring(buf: &mut Vec<u8>, s: &str) {
    if s.is_empty() || s.bytes().any(needs_quoting) {
        buf.push(b'"');
        for b in s.bytes() {
            if b == b'"' || b == b'\\' {
                buf.push(b'\\');
            }
            buf.push(b);
        }
        buf.push(b'"');
    } else {
        buf.extend_from_slice(s.as_bytes());
    }
}

/// Writes a mailbox name.
pub fn write_mailbox(buf: &mut Vec<u8>, mailbox: &MailboxName) {
    write_astring(buf, mailbox.as_str());
}

/// Writes a literal prefix: `{N}` or `{N+}` when non-synchronizing
/// literals are in play (LITERAL+/LITERAL-).
pub fn write_literal_prefix(buf: &mut Vec<u8>, len: usize, non_sync: bool) {
    if non_sync {
        buf.extend_from_slice(format!("{{{len}+}}").as_bytes());
    } else {
        buf.extend_from_slice(format!("{{{len}}}").as_bytes());
    }
}

const fn needs_quoting(b: u8) -> bool {
    matches!(b, b' ' | b'"' | b'\\' | b'(' | b')' | b'{' | b'%' | b'*') || b < 0x20 || b == 0x7F
}

/// Writes a parenthesized FETCH item list.
pub fn write_fetch_items(buf: &mut Vec<u8>, items: &[FetchAttribute]) {
    if let [single] = items {
        write_fetch_attribute(buf, single);
        return;
    }
    buf.push(b'(');
    for (i, attr) in items.iter().enumerate() {
        if i > 0 {
            buf.push(b' ');
        }
        write_fetch_attribute(buf, attr);
    }
    buf.push(b')');
}

/// Writes a single FETCH attribute.
pub fn write_fetch_attribute(buf: &mut Vec<u8>, attr: &FetchAttribute) {
    match attr {
        FetchAttribute::Flags => buf.extend_from_slice(b"FLAGS"),
        FetchAttribute::InternalDate => buf.extend_from_slice(b"INTERNALDATE"),
        FetchAttribute::Rfc822Size => buf.extend_from_slice(b"RFC822.SIZE"),
        FetchAttribute::Envelope => buf.extend_from_slice(b"ENVELOPE"),
        FetchAttribute::BodyStructure => buf.extend_from_slice(b"BODYSTRUCTURE"),
        FetchAttribute::Uid => buf.extend_from_slice(b"UID"),
        FetchAttribute::ModSeq => buf.extend_from_slice(b"MODSEQ"),
        FetchAttribute::GmailLabels => buf.extend_from_slice(b"X-GM-LABELS"),
        FetchAttribute::GmailMessageId => buf.extend_from_slice(b"X-GM-MSGID"),
        FetchAttribute::GmailThreadId => buf.extend_from_slice(b"X-GM-THRID"),
        FetchAttribute::Preview => buf.extend_from_slice(b"PREVIEW"),
        FetchAttribute::SaveDate => buf.extend_from_slice(b"SAVEDATE"),
        FetchAttribute::Annotation {
            entries,
            attributes,
        } => {
            buf.extend_from_slice(b"ANNOTATION (");
            write_paren_list(buf, entries);
            buf.push(b' ');
            write_paren_list(buf, attributes);
            buf.push(b')');
        }
        FetchAttribute::Body {
            section,
            peek,
            partial,
        } => {
            if *peek {
                buf.extend_from_slice(b"BODY.PEEK[");
            } else {
                buf.extend_from_slice(b"BODY[");
            }
            if let Some(s) = section {
                buf.extend_from_slice(s.as_bytes());
            }
            buf.push(b']');
            if let Some((start, len)) = partial {
                buf.extend_from_slice(format!("<{start}.{len}>").as_bytes());
            }
        }
    }
}

/// Writes a list of items, parenthesized when there is more than one.
fn write_paren_list(buf: &mut Vec<u8>, items: &[String]) {
    if let [single] = items {
        write_astring(buf, single);
        return;
    }
    buf.push(b'(');
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            buf.push(b' ');
        }
        write_astring(buf, item);
    }
    buf.push(b')');
}

/// Writes the STORE modifier and data items.
///
/// The CONDSTORE guard goes between the set and the action, per RFC 7162:
/// `STORE <set> (UNCHANGEDSINCE <m>) +FLAGS.SILENT (...)`.
pub fn write_store_action(buf: &mut Vec<u8>, action: &StoreWire) {
    if let Some(modseq) = action.unchanged_since() {
        buf.extend_from_slice(format!("(UNCHANGEDSINCE {modseq}) ").as_bytes());
    }

    match action {
        StoreWire::Flags {
            mode,
            silent,
            flags,
            ..
        } => {
            buf.extend_from_slice(mode.prefix().as_bytes());
            buf.extend_from_slice(b"FLAGS");
            if *silent {
                buf.extend_from_slice(b".SILENT");
            }
            buf.extend_from_slice(b" (");
            for (i, flag) in flags.iter().enumerate() {
                if i > 0 {
                    buf.push(b' ');
                }
                buf.extend_from_slice(flag.as_str().as_bytes());
            }
            buf.push(b')');
        }
        StoreWire::Labels {
            mode,
            silent,
            labels,
            ..
        } => {
            buf.extend_from_slice(mode.prefix().as_bytes());
            buf.extend_from_slice(b"X-GM-LABELS");
            if *silent {
                buf.extend_from_slice(b".SILENT");
            }
            buf.extend_from_slice(b" (");
            for (i, label) in labels.iter().enumerate() {
                if i > 0 {
                    buf.push(b' ');
                }
                write_astring(buf, label.as_str());
            }
            buf.push(b')');
        }
        StoreWire::Annotations { annotations, .. } => {
            buf.extend_from_slice(b"ANNOTATION (");
            for (i, annotation) in annotations.iter().enumerate() {
                if i > 0 {
                    buf.push(b' ');
                }
                write_annotation(buf, annotation);
            }
            buf.push(b')');
        }
    }
}

/// Writes one annotation as `entry (attribute value)`.
pub fn write_annotation(buf: &mut Vec<u8>, annotation: &Annotation) {
    write_astring(buf, &annotation.entry);
    buf.extend_from_slice(b" (");
    write_astring(buf, &annotation.attribute);
    buf.push(b' ');
    match &annotation.value {
        Some(value) => write_astring(buf, value),
        None => buf.extend_from_slice(b"NIL"),
    }
    buf.push(b')');
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::command::types::StoreMode;
    use crate::types::{Flag, Flags, Label, Labels, ModSeq};

    fn to_string(f: impl FnOnce(&mut Vec<u8>)) -> String {
        let mut buf = Vec::new();
        f(&mut buf);
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn astring_atom_passthrough() {
        assert_eq!(to_string(|b| write_astring(b, "INBOX")), "INBOX");
    }

    #[test]
    fn astring_quotes_specials() {
        assert_eq!(to_string(|b| write_astring(b, "My Folder")), "\"My Folder\"");
        assert_eq!(to_string(|b| write_astring(b, "")), "\"\"");
        assert_eq!(to_string(|b| write_astring(b, "a\"b")), "\"a\\\"b\"");
        assert_eq!(to_string(|b| write_astring(b, "*")), "\"*\"");
    }

    #[test]
    fn literal_prefixes() {
        assert_eq!(to_string(|b| write_literal_prefix(b, 10, false)), "{10}");
        assert_eq!(to_string(|b| write_literal_prefix(b, 10, true)), "{10+}");
    }

    #[test]
    fn fetch_items_single_is_bare() {
        assert_eq!(
            to_string(|b| write_fetch_items(b, &[FetchAttribute::Flags])),
            "FLAGS"
        );
    }

    #[test]
    fn fetch_items_list_is_parenthesized() {
        assert_eq!(
            to_string(|b| write_fetch_items(
                b,
                &[FetchAttribute::Uid, FetchAttribute::Flags, FetchAttribute::ModSeq]
            )),
            "(UID FLAGS MODSEQ)"
        );
    }

    #[test]
    fn fetch_body_section_with_partial() {
        let attr = FetchAttribute::Body {
            section: Some("1.2".to_string()),
            peek: true,
            partial: Some((0, 1024)),
        };
        assert_eq!(
            to_string(|b| write_fetch_attribute(b, &attr)),
            "BODY.PEEK[1.2]<0.1024>"
        );
    }

    #[test]
    fn fetch_annotation_item() {
        let attr = FetchAttribute::Annotation {
            entries: vec!["/comment".to_string()],
            attributes: vec!["value.priv".to_string()],
        };
        assert_eq!(
            to_string(|b| write_fetch_attribute(b, &attr)),
            "ANNOTATION (/comment value.priv)"
        );
    }

    #[test]
    fn store_flags_silent() {
        let action = StoreWire::Flags {
            mode: StoreMode::Add,
            silent: true,
            flags: Flags::from_vec(vec![Flag::Seen]),
            unchanged_since: None,
        };
        assert_eq!(
            to_string(|b| write_store_action(b, &action)),
            "+FLAGS.SILENT (\\Seen)"
        );
    }

    #[test]
    fn store_flags_with_guard_puts_modifier_first() {
        let action = StoreWire::Flags {
            mode: StoreMode::Add,
            silent: false,
            flags: Flags::from_vec(vec![Flag::Deleted]),
            unchanged_since: ModSeq::new(700),
        };
        assert_eq!(
            to_string(|b| write_store_action(b, &action)),
            "(UNCHANGEDSINCE 700) +FLAGS (\\Deleted)"
        );
    }

    #[test]
    fn store_labels() {
        let action = StoreWire::Labels {
            mode: StoreMode::Remove,
            silent: false,
            labels: Labels::from_vec(vec![Label::new("\\Inbox"), Label::new("to do")]),
            unchanged_since: None,
        };
        assert_eq!(
            to_string(|b| write_store_action(b, &action)),
            "-X-GM-LABELS (\"\\\\Inbox\" \"to do\")"
        );
    }

    #[test]
    fn store_annotations() {
        let action = StoreWire::Annotations {
            annotations: vec![crate::types::Annotation::private("/comment", "urgent")],
            unchanged_since: None,
        };
        assert_eq!(
            to_string(|b| write_store_action(b, &action)),
            "ANNOTATION (/comment (value.priv urgent))"
        );
    }
}
