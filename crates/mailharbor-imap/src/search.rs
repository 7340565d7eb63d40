//! Search queries, sort ordering, and search results.
//!
//! A [`SearchQuery`] is a tree of logical operators over atomic terms.
//! Lowering to the wire is mechanical: every atomic term maps to exactly
//! one SEARCH key, conjunctions concatenate, disjunctions nest in
//! `OR a b`, negations prefix `NOT`. A charset is declared only when a
//! string term carries non-ASCII bytes.

use crate::types::{ModSeq, SequenceSet, UidSet};

/// A date for SEARCH keys, in IMAP `d-Mmm-yyyy` form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchDate(pub String);

impl SearchDate {
    /// Creates a date from day, month (1-12), and year.
    ///
    /// Returns `None` for an out-of-range month or day.
    #[must_use]
    pub fn new(day: u8, month: u8, year: u16) -> Option<Self> {
        if day == 0 || day > 31 || month == 0 || month > 12 {
            return None;
        }
        const MONTHS: [&str; 12] = [
            "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
        ];
        Some(Self(format!(
            "{day}-{}-{year}",
            MONTHS[usize::from(month - 1)]
        )))
    }

    /// Returns the wire form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A search query tree.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchQuery {
    /// Every message.
    All,
    /// Conjunction: all sub-queries must match.
    And(Vec<SearchQuery>),
    /// Disjunction of exactly two sub-queries.
    Or(Box<SearchQuery>, Box<SearchQuery>),
    /// Negation.
    Not(Box<SearchQuery>),
    /// Messages with the \Seen flag.
    Seen,
    /// Messages without the \Seen flag.
    Unseen,
    /// Messages with the \Answered flag.
    Answered,
    /// Messages without the \Answered flag.
    Unanswered,
    /// Messages with the \Flagged flag.
    Flagged,
    /// Messages without the \Flagged flag.
    Unflagged,
    /// Messages with the \Deleted flag.
    Deleted,
    /// Messages without the \Deleted flag.
    Undeleted,
    /// Messages with the \Draft flag.
    Draft,
    /// Messages with the \Recent flag but not \Seen.
    New,
    /// Messages with the given keyword.
    Keyword(String),
    /// Messages without the given keyword.
    Unkeyword(String),
    /// Header field contains the value.
    Header(String, String),
    /// Subject contains the text.
    Subject(String),
    /// From contains the text.
    From(String),
    /// To contains the text.
    To(String),
    /// Cc contains the text.
    Cc(String),
    /// Bcc contains the text.
    Bcc(String),
    /// Body contains the text.
    Body(String),
    /// Header or body contains the text.
    Text(String),
    /// Internal date before the given day.
    Before(SearchDate),
    /// Internal date on the given day.
    On(SearchDate),
    /// Internal date on or after the given day.
    Since(SearchDate),
    /// Date header before the given day.
    SentBefore(SearchDate),
    /// Date header on the given day.
    SentOn(SearchDate),
    /// Date header on or after the given day.
    SentSince(SearchDate),
    /// Larger than the given size in octets.
    Larger(u32),
    /// Smaller than the given size in octets.
    Smaller(u32),
    /// UID set membership.
    Uid(UidSet),
    /// Sequence-number set membership.
    SeqSet(SequenceSet),
    /// Mod-sequence at or above the floor (CONDSTORE).
    ModSeq(ModSeq),
    /// Received within the last n seconds (WITHIN, RFC 5032).
    Younger(u32),
    /// Received more than n seconds ago (WITHIN, RFC 5032).
    Older(u32),
    /// Raw GMail search expression (X-GM-RAW).
    GmailRaw(String),
    /// GMail message id (X-GM-MSGID).
    GmailMessageId(u64),
    /// GMail thread id (X-GM-THRID).
    GmailThreadId(u64),
    /// GMail label (X-GM-LABELS).
    GmailLabel(String),
    /// Annotation match (RFC 5257): entry, attribute, value.
    Annotation {
        /// Entry path, e.g. `/comment`.
        entry: String,
        /// Attribute, e.g. `value.priv`.
        attribute: String,
        /// Substring the value must contain.
        value: String,
    },
}

impl SearchQuery {
    /// Returns true if any string term contains non-ASCII bytes, in which
    /// case the lowered command must declare a charset.
    #[must_use]
    pub fn needs_charset(&self) -> bool {
        let non_ascii = |s: &str| !s.is_ascii();
        match self {
            Self::And(items) => items.iter().any(Self::needs_charset),
            Self::Or(a, b) => a.needs_charset() || b.needs_charset(),
            Self::Not(inner) => inner.needs_charset(),
            Self::Header(name, value) => non_ascii(name) || non_ascii(value),
            Self::Keyword(s)
            | Self::Unkeyword(s)
            | Self::Subject(s)
            | Self::From(s)
            | Self::To(s)
            | Self::Cc(s)
            | Self::Bcc(s)
            | Self::Body(s)
            | Self::Text(s)
            | Self::GmailRaw(s)
            | Self::GmailLabel(s) => non_ascii(s),
            Self::Annotation { value, .. } => non_ascii(value),
            _ => false,
        }
    }

    /// Lowers the query to its wire form.
    #[must_use]
    pub fn to_wire(&self) -> String {
        let mut buf = Vec::new();
        self.write(&mut buf);
        String::from_utf8_lossy(&buf).to_string()
    }

    /// Writes the query into a command buffer.
    #[allow(clippy::too_many_lines)]
    pub fn write(&self, buf: &mut Vec<u8>) {
        use crate::command::serialize::write_astring;

        match self {
            Self::All => buf.extend_from_slice(b"ALL"),
            Self::And(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        buf.push(b' ');
                    }
                    item.write(buf);
                }
            }
            Self::Or(a, b) => {
                buf.extend_from_slice(b"OR ");
                a.write(buf);
                buf.push(b' ');
                b.write(buf);
            }
            Self::Not(inner) => {
                buf.extend_from_slice(b"NOT ");
                inner.write(buf);
            }
            Self::Seen => buf.extend_from_slice(b"SEEN"),
            Self::Unseen => buf.extend_from_slice(b"UNSEEN"),
            Self::Answered => buf.extend_from_slice(b"ANSWERED"),
            Self::Unanswered => buf.extend_from_slice(b"UNANSWERED"),
            Self::Flagged => buf.extend_from_slice(b"FLAGGED"),
            Self::Unflagged => buf.extend_from_slice(b"UNFLAGGED"),
            Self::Deleted => buf.extend_from_slice(b"DELETED"),
            Self::Undeleted => buf.extend_from_slice(b"UNDELETED"),
            Self::Draft => buf.extend_from_slice(b"DRAFT"),
            Self::New => buf.extend_from_slice(b"NEW"),
            Self::Keyword(k) => {
                buf.extend_from_slice(b"KEYWORD ");
                write_astring(buf, k);
            }
            Self::Unkeyword(k) => {
                buf.extend_from_slice(b"UNKEYWORD ");
                write_astring(buf, k);
            }
            Self::Header(name, value) => {
                buf.extend_from_slice(b"HEADER ");
                write_astring(buf, name);
                buf.push(b' ');
                write_astring(buf, value);
            }
            Self::Subject(s) => {
                buf.extend_from_slice(b"SUBJECT ");
                write_astring(buf, s);
            }
            Self::From(s) => {
                buf.extend_from_slice(b"FROM ");
                write_astring(buf, s);
            }
            Self::To(s) => {
                buf.extend_from_slice(b"TO ");
                write_astring(buf, s);
            }
            Self::Cc(s) => {
                buf.extend_from_slice(b"CC ");
                write_astring(buf, s);
            }
            Self::Bcc(s) => {
                buf.extend_from_slice(b"BCC ");
                write_astring(buf, s);
            }
            Self::Body(s) => {
                buf.extend_from_slice(b"BODY ");
                write_astring(buf, s);
            }
            Self::Text(s) => {
                buf.extend_from_slice(b"TEXT ");
                write_astring(buf, s);
            }
            Self::Before(d) => {
                buf.extend_from_slice(b"BEFORE ");
                buf.extend_from_slice(d.as_str().as_bytes());
            }
            Self::On(d) => {
                buf.extend_from_slice(b"ON ");
                buf.extend_from_slice(d.as_str().as_bytes());
            }
            Self::Since(d) => {
                buf.extend_from_slice(b"SINCE ");
                buf.extend_from_slice(d.as_str().as_bytes());
            }
            Self::SentBefore(d) => {
                buf.extend_from_slice(b"SENTBEFORE ");
                buf.extend_from_slice(d.as_str().as_bytes());
            }
            Self::SentOn(d) => {
                buf.extend_from_slice(b"SENTON ");
                buf.extend_from_slice(d.as_str().as_bytes());
            }
            Self::SentSince(d) => {
                buf.extend_from_slice(b"SENTSINCE ");
                buf.extend_from_slice(d.as_str().as_bytes());
            }
            Self::Larger(n) => {
                buf.extend_from_slice(format!("LARGER {n}").as_bytes());
            }
            Self::Smaller(n) => {
                buf.extend_from_slice(format!("SMALLER {n}").as_bytes());
            }
            Self::Uid(set) => {
                buf.extend_from_slice(b"UID ");
                buf.extend_from_slice(set.to_string().as_bytes());
            }
            Self::SeqSet(set) => {
                buf.extend_from_slice(set.to_string().as_bytes());
            }
            Self::ModSeq(m) => {
                buf.extend_from_slice(format!("MODSEQ {m}").as_bytes());
            }
            Self::Younger(n) => {
                buf.extend_from_slice(format!("YOUNGER {n}").as_bytes());
            }
            Self::Older(n) => {
                buf.extend_from_slice(format!("OLDER {n}").as_bytes());
            }
            Self::GmailRaw(s) => {
                buf.extend_from_slice(b"X-GM-RAW ");
                write_astring(buf, s);
            }
            Self::GmailMessageId(id) => {
                buf.extend_from_slice(format!("X-GM-MSGID {id}").as_bytes());
            }
            Self::GmailThreadId(id) => {
                buf.extend_from_slice(format!("X-GM-THRID {id}").as_bytes());
            }
            Self::GmailLabel(label) => {
                buf.extend_from_slice(b"X-GM-LABELS ");
                write_astring(buf, label);
            }
            Self::Annotation {
                entry,
                attribute,
                value,
            } => {
                buf.extend_from_slice(b"ANNOTATION ");
                write_astring(buf, entry);
                buf.push(b' ');
                write_astring(buf, attribute);
                buf.push(b' ');
                write_astring(buf, value);
            }
        }
    }
}

/// One sort key for the SORT command (RFC 5256).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    /// Internal date and time.
    Arrival,
    /// First Cc mailbox.
    Cc,
    /// Sent date and time.
    Date,
    /// First From mailbox.
    From,
    /// Message size in octets.
    Size,
    /// Base subject text.
    Subject,
    /// First To mailbox.
    To,
}

impl SortKey {
    /// Returns the wire token.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Arrival => "ARRIVAL",
            Self::Cc => "CC",
            Self::Date => "DATE",
            Self::From => "FROM",
            Self::Size => "SIZE",
            Self::Subject => "SUBJECT",
            Self::To => "TO",
        }
    }
}

/// A sort criterion: a key, optionally reversed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderBy {
    /// The sort key.
    pub key: SortKey,
    /// Descending order when true.
    pub reverse: bool,
}

impl OrderBy {
    /// Ascending order on the given key.
    #[must_use]
    pub fn asc(key: SortKey) -> Self {
        Self {
            key,
            reverse: false,
        }
    }

    /// Descending order on the given key.
    #[must_use]
    pub fn desc(key: SortKey) -> Self {
        Self { key, reverse: true }
    }
}

impl std::fmt::Display for OrderBy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.reverse {
            write!(f, "REVERSE {}", self.key.as_str())
        } else {
            write!(f, "{}", self.key.as_str())
        }
    }
}

/// Writes a parenthesized sort criteria list, e.g. `(REVERSE DATE SUBJECT)`.
#[must_use]
pub fn sort_criteria_to_wire(order: &[OrderBy]) -> String {
    let parts: Vec<String> = order.iter().map(ToString::to_string).collect();
    format!("({})", parts.join(" "))
}

/// ESEARCH return options (RFC 4731 / RFC 5267).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SearchOptions {
    /// Request the smallest matching number.
    pub return_min: bool,
    /// Request the largest matching number.
    pub return_max: bool,
    /// Request the full match set.
    pub return_all: bool,
    /// Request the match count.
    pub return_count: bool,
    /// Save the result on the server (SEARCHRES, RFC 5182).
    pub save: bool,
}

impl SearchOptions {
    /// Returns true if any return option is requested.
    #[must_use]
    pub fn any(&self) -> bool {
        self.return_min || self.return_max || self.return_all || self.return_count || self.save
    }

    /// Writes the `RETURN (...)` clause, empty string when unset.
    #[must_use]
    pub fn to_wire(&self) -> String {
        if !self.any() {
            return String::new();
        }
        let mut opts = Vec::new();
        if self.return_min {
            opts.push("MIN");
        }
        if self.return_max {
            opts.push("MAX");
        }
        if self.return_all {
            opts.push("ALL");
        }
        if self.return_count {
            opts.push("COUNT");
        }
        if self.save {
            opts.push("SAVE");
        }
        format!("RETURN ({})", opts.join(" "))
    }
}

/// Results of a search or sort.
///
/// Classic `* SEARCH` responses populate only `all`; ESEARCH responses may
/// populate any subset.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SearchResults {
    /// The matching numbers, in server order.
    pub all: Vec<u32>,
    /// Smallest match (ESEARCH MIN).
    pub min: Option<u32>,
    /// Largest match (ESEARCH MAX).
    pub max: Option<u32>,
    /// Match count (ESEARCH COUNT).
    pub count: Option<u32>,
    /// Highest mod-sequence among matches (CONDSTORE).
    pub mod_seq: Option<ModSeq>,
}

impl SearchResults {
    /// Returns the matches as a vector of numbers.
    #[must_use]
    pub fn numbers(&self) -> &[u32] {
        &self.all
    }

    /// Returns true if nothing matched.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.all.is_empty() && self.count.unwrap_or(0) == 0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::Uid;

    #[test]
    fn atomic_terms_lower_to_single_keys() {
        assert_eq!(SearchQuery::Unseen.to_wire(), "UNSEEN");
        assert_eq!(
            SearchQuery::Subject("hello".into()).to_wire(),
            "SUBJECT hello"
        );
        assert_eq!(
            SearchQuery::Header("Message-Id".into(), "<x@y>".into()).to_wire(),
            "HEADER Message-Id <x@y>"
        );
        assert_eq!(SearchQuery::Larger(1024).to_wire(), "LARGER 1024");
        assert_eq!(
            SearchQuery::ModSeq(ModSeq::new(500).unwrap()).to_wire(),
            "MODSEQ 500"
        );
    }

    #[test]
    fn conjunctions_concatenate() {
        let q = SearchQuery::And(vec![SearchQuery::Unseen, SearchQuery::Flagged]);
        assert_eq!(q.to_wire(), "UNSEEN FLAGGED");
    }

    #[test]
    fn disjunctions_nest() {
        let q = SearchQuery::Or(
            Box::new(SearchQuery::From("alice".into())),
            Box::new(SearchQuery::Or(
                Box::new(SearchQuery::From("bob".into())),
                Box::new(SearchQuery::From("carol".into())),
            )),
        );
        assert_eq!(q.to_wire(), "OR FROM alice OR FROM bob OR FROM carol");
    }

    #[test]
    fn negations_prefix() {
        let q = SearchQuery::Not(Box::new(SearchQuery::Deleted));
        assert_eq!(q.to_wire(), "NOT DELETED");
    }

    #[test]
    fn quoted_strings_are_escaped() {
        let q = SearchQuery::Subject("hello world".into());
        assert_eq!(q.to_wire(), "SUBJECT \"hello world\"");
    }

    #[test]
    fn uid_term() {
        let set = UidSet::range(Uid::new(1).unwrap(), Uid::new(10).unwrap());
        assert_eq!(SearchQuery::Uid(set).to_wire(), "UID 1:10");
    }

    #[test]
    fn gmail_terms() {
        assert_eq!(
            SearchQuery::GmailRaw("has:attachment".into()).to_wire(),
            "X-GM-RAW has:attachment"
        );
        assert_eq!(
            SearchQuery::GmailThreadId(1_278_455).to_wire(),
            "X-GM-THRID 1278455"
        );
    }

    #[test]
    fn charset_detection() {
        assert!(!SearchQuery::Subject("plain".into()).needs_charset());
        assert!(SearchQuery::Subject("héllo".into()).needs_charset());
        let q = SearchQuery::And(vec![
            SearchQuery::Unseen,
            SearchQuery::Not(Box::new(SearchQuery::Body("日本語".into()))),
        ]);
        assert!(q.needs_charset());
    }

    #[test]
    fn search_date() {
        assert_eq!(SearchDate::new(3, 2, 2024).unwrap().as_str(), "3-Feb-2024");
        assert!(SearchDate::new(0, 2, 2024).is_none());
        assert!(SearchDate::new(3, 13, 2024).is_none());
    }

    #[test]
    fn sort_criteria() {
        let order = [OrderBy::desc(SortKey::Date), OrderBy::asc(SortKey::Subject)];
        assert_eq!(sort_criteria_to_wire(&order), "(REVERSE DATE SUBJECT)");
    }

    #[test]
    fn search_options() {
        let opts = SearchOptions {
            return_min: true,
            return_count: true,
            ..SearchOptions::default()
        };
        assert_eq!(opts.to_wire(), "RETURN (MIN COUNT)");
        assert_eq!(SearchOptions::default().to_wire(), "");
    }

    #[test]
    fn empty_results() {
        assert!(SearchResults::default().is_empty());
        let results = SearchResults {
            count: Some(3),
            ..SearchResults::default()
        };
        assert!(!results.is_empty());
    }
}
