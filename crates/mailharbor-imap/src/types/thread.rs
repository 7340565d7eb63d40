//! Message threading (RFC 5256).

use super::Uid;

/// A threading algorithm token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThreadingAlgorithm {
    /// ORDEREDSUBJECT: flat subject-based grouping.
    OrderedSubject,
    /// REFERENCES: full References-header threading.
    References,
    /// REFS: References-only variant (no subject fallback).
    Refs,
}

impl ThreadingAlgorithm {
    /// Parses an algorithm token (as advertised in `THREAD=<algo>`).
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "ORDEREDSUBJECT" => Some(Self::OrderedSubject),
            "REFERENCES" => Some(Self::References),
            "REFS" => Some(Self::Refs),
            _ => None,
        }
    }

    /// Returns the wire form of the token.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OrderedSubject => "ORDEREDSUBJECT",
            Self::References => "REFERENCES",
            Self::Refs => "REFS",
        }
    }
}

impl std::fmt::Display for ThreadingAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One node of a message thread.
///
/// The root carries a UID, or `None` for a placeholder node the server
/// synthesized to join siblings whose common parent is missing. Threads
/// returned by the THREAD command form a forest.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MessageThread {
    /// The message at this node, if any.
    pub uid: Option<Uid>,
    /// Child threads, oldest first.
    pub children: Vec<MessageThread>,
}

impl MessageThread {
    /// Creates a leaf node for a message.
    #[must_use]
    pub fn leaf(uid: Uid) -> Self {
        Self {
            uid: Some(uid),
            children: Vec::new(),
        }
    }

    /// Creates a placeholder node with the given children.
    #[must_use]
    pub fn placeholder(children: Vec<MessageThread>) -> Self {
        Self {
            uid: None,
            children,
        }
    }

    /// Returns the number of messages in this thread (placeholders
    /// excluded).
    #[must_use]
    pub fn len(&self) -> usize {
        usize::from(self.uid.is_some()) + self.children.iter().map(MessageThread::len).sum::<usize>()
    }

    /// Returns true if the thread contains no messages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Collects every UID in the thread, depth-first.
    #[must_use]
    pub fn uids(&self) -> Vec<Uid> {
        let mut out = Vec::new();
        self.collect_uids(&mut out);
        out
    }

    fn collect_uids(&self, out: &mut Vec<Uid>) {
        if let Some(uid) = self.uid {
            out.push(uid);
        }
        for child in &self.children {
            child.collect_uids(out);
        }
    }
}
