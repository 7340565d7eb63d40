//! Server capabilities and tagged-response status.

/// Response status from a tagged response or greeting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Command completed successfully.
    Ok,
    /// Command failed (operational error).
    No,
    /// Command rejected as malformed (protocol/syntax error).
    Bad,
    /// Greeting for a pre-authenticated connection.
    PreAuth,
    /// Server is closing the connection.
    Bye,
}

impl Status {
    /// Returns true if this is a successful status.
    #[must_use]
    pub fn is_ok(self) -> bool {
        matches!(self, Self::Ok | Self::PreAuth)
    }
}

/// A server capability token.
///
/// The registry is recomputed on every `* CAPABILITY` response and cleared
/// across the transitions that invalidate it (STARTTLS, authentication,
/// ENABLE).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Capability {
    /// `IMAP4rev1` (RFC 3501).
    Imap4Rev1,
    /// STARTTLS support.
    StartTls,
    /// LOGIN is disabled (typically before STARTTLS).
    LoginDisabled,
    /// A SASL mechanism (`AUTH=<mech>`).
    Auth(String),
    /// IDLE command (RFC 2177).
    Idle,
    /// UIDPLUS extension (RFC 4315).
    UidPlus,
    /// CONDSTORE (RFC 7162).
    CondStore,
    /// QRESYNC (RFC 7162).
    QResync,
    /// ENABLE command (RFC 5161).
    Enable,
    /// LIST-EXTENDED (RFC 5258).
    ListExtended,
    /// LIST can return STATUS (RFC 5819).
    ListStatus,
    /// SPECIAL-USE mailboxes (RFC 6154).
    SpecialUse,
    /// CREATE-SPECIAL-USE (RFC 6154).
    CreateSpecialUse,
    /// MOVE command (RFC 6851).
    Move,
    /// ESEARCH result options (RFC 4731).
    ESearch,
    /// ESORT result options (RFC 5267).
    ESort,
    /// SORT command (RFC 5256).
    Sort,
    /// A threading algorithm (`THREAD=<algo>`, RFC 5256).
    Thread(String),
    /// MULTIAPPEND (RFC 3502).
    MultiAppend,
    /// LITERAL+ non-synchronizing literals (RFC 7888).
    LiteralPlus,
    /// LITERAL- bounded non-synchronizing literals (RFC 7888).
    LiteralMinus,
    /// BINARY fetch/append (RFC 3516).
    Binary,
    /// NAMESPACE command (RFC 2342).
    Namespace,
    /// ACL (RFC 4314).
    Acl,
    /// QUOTA (RFC 2087).
    Quota,
    /// METADATA (RFC 5464).
    Metadata,
    /// Message annotations (RFC 5257).
    Annotate,
    /// A compression algorithm (`COMPRESS=<algo>`, RFC 4978).
    Compress(String),
    /// OBJECTID stable mailbox/message ids (RFC 8474).
    ObjectId,
    /// REPLACE command (RFC 8508).
    Replace,
    /// SAVEDATE fetch item (RFC 8514).
    SaveDate,
    /// WITHIN search keys (RFC 5032).
    Within,
    /// UTF8=ACCEPT (RFC 6855).
    Utf8Accept,
    /// SASL initial response (RFC 4959).
    SaslIr,
    /// ID command (RFC 2971).
    Id,
    /// CHILDREN list attributes (RFC 3348).
    Children,
    /// SEARCHRES saved search results (RFC 5182).
    SearchRes,
    /// UNSELECT command (RFC 3691).
    Unselect,
    /// NOTIFY (RFC 5465).
    Notify,
    /// UNAUTHENTICATE (RFC 8437).
    Unauthenticate,
    /// Advertised APPENDLIMIT (RFC 7889); `None` means per-mailbox limits.
    AppendLimit(Option<u32>),
    /// GMail extensions (labels, msgid, thrid, raw search).
    GmailExt1,
    /// A capability this client does not model.
    Unknown(String),
}

impl Capability {
    /// Parses a capability token.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        let upper = s.to_uppercase();
        match upper.as_str() {
            "IMAP4REV1" => Self::Imap4Rev1,
            "STARTTLS" => Self::StartTls,
            "LOGINDISABLED" => Self::LoginDisabled,
            "IDLE" => Self::Idle,
            "UIDPLUS" => Self::UidPlus,
            "CONDSTORE" => Self::CondStore,
            "QRESYNC" => Self::QResync,
            "ENABLE" => Self::Enable,
            "LIST-EXTENDED" => Self::ListExtended,
            "LIST-STATUS" => Self::ListStatus,
            "SPECIAL-USE" => Self::SpecialUse,
            "CREATE-SPECIAL-USE" => Self::CreateSpecialUse,
            "MOVE" => Self::Move,
            "ESEARCH" => Self::ESearch,
            "ESORT" => Self::ESort,
            "SORT" => Self::Sort,
            "MULTIAPPEND" => Self::MultiAppend,
            "LITERAL+" => Self::LiteralPlus,
            "LITERAL-" => Self::LiteralMinus,
            "BINARY" => Self::Binary,
            "NAMESPACE" => Self::Namespace,
            "ACL" => Self::Acl,
            "QUOTA" => Self::Quota,
            "METADATA" => Self::Metadata,
            "ANNOTATE-EXPERIMENT-1" => Self::Annotate,
            "OBJECTID" => Self::ObjectId,
            "REPLACE" => Self::Replace,
            "SAVEDATE" => Self::SaveDate,
            "WITHIN" => Self::Within,
            "UTF8=ACCEPT" => Self::Utf8Accept,
            "SASL-IR" => Self::SaslIr,
            "ID" => Self::Id,
            "CHILDREN" => Self::Children,
            "SEARCHRES" => Self::SearchRes,
            "UNSELECT" => Self::Unselect,
            "NOTIFY" => Self::Notify,
            "UNAUTHENTICATE" => Self::Unauthenticate,
            "APPENDLIMIT" => Self::AppendLimit(None),
            "X-GM-EXT-1" => Self::GmailExt1,
            _ if upper.starts_with("AUTH=") => Self::Auth(s[5..].to_string()),
            _ if upper.starts_with("THREAD=") => Self::Thread(upper[7..].to_string()),
            _ if upper.starts_with("COMPRESS=") => Self::Compress(upper[9..].to_string()),
            _ if upper.starts_with("APPENDLIMIT=") => {
                Self::AppendLimit(upper[12..].parse().ok())
            }
            _ => Self::Unknown(s.to_string()),
        }
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Imap4Rev1 => write!(f, "IMAP4rev1"),
            Self::StartTls => write!(f, "STARTTLS"),
            Self::LoginDisabled => write!(f, "LOGINDISABLED"),
            Self::Auth(mech) => write!(f, "AUTH={mech}"),
            Self::Idle => write!(f, "IDLE"),
            Self::UidPlus => write!(f, "UIDPLUS"),
            Self::CondStore => write!(f, "CONDSTORE"),
            Self::QResync => write!(f, "QRESYNC"),
            Self::Enable => write!(f, "ENABLE"),
            Self::ListExtended => write!(f, "LIST-EXTENDED"),
            Self::ListStatus => write!(f, "LIST-STATUS"),
            Self::SpecialUse => write!(f, "SPECIAL-USE"),
            Self::CreateSpecialUse => write!(f, "CREATE-SPECIAL-USE"),
            Self::Move => write!(f, "MOVE"),
            Self::ESearch => write!(f, "ESEARCH"),
            Self::ESort => write!(f, "ESORT"),
            Self::Sort => write!(f, "SORT"),
            Self::Thread(algo) => write!(f, "THREAD={algo}"),
            Self::MultiAppend => write!(f, "MULTIAPPEND"),
            Self::LiteralPlus => write!(f, "LITERAL+"),
            Self::LiteralMinus => write!(f, "LITERAL-"),
            Self::Binary => write!(f, "BINARY"),
            Self::Namespace => write!(f, "NAMESPACE"),
            Self::Acl => write!(f, "ACL"),
            Self::Quota => write!(f, "QUOTA"),
            Self::Metadata => write!(f, "METADATA"),
            Self::Annotate => write!(f, "ANNOTATE-EXPERIMENT-1"),
            Self::Compress(algo) => write!(f, "COMPRESS={algo}"),
            Self::ObjectId => write!(f, "OBJECTID"),
            Self::Replace => write!(f, "REPLACE"),
            Self::SaveDate => write!(f, "SAVEDATE"),
            Self::Within => write!(f, "WITHIN"),
            Self::Utf8Accept => write!(f, "UTF8=ACCEPT"),
            Self::SaslIr => write!(f, "SASL-IR"),
            Self::Id => write!(f, "ID"),
            Self::Children => write!(f, "CHILDREN"),
            Self::SearchRes => write!(f, "SEARCHRES"),
            Self::Unselect => write!(f, "UNSELECT"),
            Self::Notify => write!(f, "NOTIFY"),
            Self::Unauthenticate => write!(f, "UNAUTHENTICATE"),
            Self::AppendLimit(None) => write!(f, "APPENDLIMIT"),
            Self::AppendLimit(Some(n)) => write!(f, "APPENDLIMIT={n}"),
            Self::GmailExt1 => write!(f, "X-GM-EXT-1"),
            Self::Unknown(s) => write!(f, "{s}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_is_ok() {
        assert!(Status::Ok.is_ok());
        assert!(Status::PreAuth.is_ok());
        assert!(!Status::No.is_ok());
        assert!(!Status::Bad.is_ok());
        assert!(!Status::Bye.is_ok());
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(Capability::parse("imap4rev1"), Capability::Imap4Rev1);
        assert_eq!(Capability::parse("Idle"), Capability::Idle);
        assert_eq!(Capability::parse("QRESYNC"), Capability::QResync);
    }

    #[test]
    fn parse_parameterized() {
        assert_eq!(
            Capability::parse("AUTH=PLAIN"),
            Capability::Auth("PLAIN".to_string())
        );
        assert_eq!(
            Capability::parse("THREAD=REFERENCES"),
            Capability::Thread("REFERENCES".to_string())
        );
        assert_eq!(
            Capability::parse("COMPRESS=DEFLATE"),
            Capability::Compress("DEFLATE".to_string())
        );
        assert_eq!(
            Capability::parse("APPENDLIMIT=35651584"),
            Capability::AppendLimit(Some(35_651_584))
        );
        assert_eq!(
            Capability::parse("APPENDLIMIT"),
            Capability::AppendLimit(None)
        );
    }

    #[test]
    fn parse_gmail_and_unknown() {
        assert_eq!(Capability::parse("X-GM-EXT-1"), Capability::GmailExt1);
        assert_eq!(
            Capability::parse("XYZZY"),
            Capability::Unknown("XYZZY".to_string())
        );
    }

    #[test]
    fn display_round_trips() {
        for s in [
            "IMAP4rev1",
            "STARTTLS",
            "AUTH=PLAIN",
            "THREAD=REFS",
            "LITERAL+",
            "UTF8=ACCEPT",
            "X-GM-EXT-1",
            "APPENDLIMIT=1024",
        ] {
            assert_eq!(Capability::parse(s).to_string(), s);
        }
    }
}
