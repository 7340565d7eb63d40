//! Command pipelining.
//!
//! Multiple tagged commands may be on the wire at once when none of them
//! needs exclusive session semantics and no unsatisfied continuation is
//! outstanding. Completions are delivered in tag order of arrival;
//! untagged responses interleaved between pipelined commands are applied
//! to folder state in wire-arrival order.

#![allow(clippy::missing_const_for_fn)]

use std::collections::VecDeque;
use std::time::Duration;

use crate::command::Command;
use crate::types::Tag;

/// Default maximum pipeline depth.
pub const DEFAULT_MAX_DEPTH: usize = 4;

/// Hard cap on pipeline depth.
pub const MAX_PIPELINE_DEPTH: usize = 16;

/// Default pipeline timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Configuration for command pipelining.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Maximum number of commands in flight plus queued.
    pub max_depth: usize,
    /// Timeout for the whole pipeline.
    pub timeout: Duration,
    /// Whether pipelining is enabled at all.
    pub enabled: bool,
    /// Whether literal-bearing commands may be queued alongside others
    /// (requires non-synchronizing literals).
    pub allow_literals: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            timeout: DEFAULT_TIMEOUT,
            enabled: true,
            allow_literals: false,
        }
    }
}

impl PipelineConfig {
    /// Creates a configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum depth, clamped to [`MAX_PIPELINE_DEPTH`].
    #[must_use]
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth.min(MAX_PIPELINE_DEPTH);
        self
    }

    /// Sets the pipeline timeout.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Enables or disables pipelining.
    #[must_use]
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Allows literal-bearing commands in a shared batch.
    #[must_use]
    pub fn allow_literals(mut self, allow: bool) -> Self {
        self.allow_literals = allow;
        self
    }
}

/// A command queued for pipelining.
#[derive(Debug, Clone)]
pub struct QueuedCommand {
    /// The command to send.
    pub command: Command,
    /// Tag assigned to this command.
    pub tag: Tag,
    /// Whether this command may share the wire with others.
    pub pipelineable: bool,
}

impl QueuedCommand {
    /// Creates a queued command, classifying its pipelining safety.
    #[must_use]
    pub fn new(command: Command, tag: Tag) -> Self {
        let pipelineable = command.is_pipelineable();
        Self {
            command,
            tag,
            pipelineable,
        }
    }
}

/// Queue of commands awaiting transmission and completion.
#[derive(Debug)]
pub struct Pipeline {
    config: PipelineConfig,
    queue: VecDeque<QueuedCommand>,
    in_flight: VecDeque<Tag>,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(PipelineConfig::default())
    }
}

impl Pipeline {
    /// Creates a pipeline with the given configuration.
    #[must_use]
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            queue: VecDeque::new(),
            in_flight: VecDeque::new(),
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Returns the number of queued (unsent) commands.
    #[must_use]
    pub fn queued_count(&self) -> usize {
        self.queue.len()
    }

    /// Returns the number of commands awaiting completion.
    #[must_use]
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    /// Returns true if the pipeline can accept more commands.
    #[must_use]
    pub fn has_capacity(&self) -> bool {
        self.in_flight.len() + self.queue.len() < self.config.max_depth
    }

    /// Returns true if there are queued commands ready to send.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.queue.is_empty()
    }

    /// Queues a command. Returns false when the pipeline is full or the
    /// command must travel alone.
    pub fn push(&mut self, command: QueuedCommand) -> bool {
        if !self.has_capacity() {
            return false;
        }

        if !self.config.enabled && !self.queue.is_empty() {
            return false;
        }

        // An exclusive command cannot join a non-empty wire.
        if !command.pipelineable && (!self.queue.is_empty() || !self.in_flight.is_empty()) {
            return false;
        }

        // Literal pacing blocks the wire unless non-sync literals are on.
        if !self.config.allow_literals
            && command.command.has_literal()
            && (!self.queue.is_empty() || !self.in_flight.is_empty())
        {
            return false;
        }

        self.queue.push_back(command);
        true
    }

    /// Takes all queued commands for transmission; their tags move to the
    /// in-flight list.
    pub fn flush(&mut self) -> Vec<QueuedCommand> {
        let commands: Vec<_> = self.queue.drain(..).collect();
        for cmd in &commands {
            self.in_flight.push_back(cmd.tag.clone());
        }
        commands
    }

    /// Marks a command complete. Returns false for an unknown tag.
    pub fn complete(&mut self, tag: &Tag) -> bool {
        if let Some(pos) = self.in_flight.iter().position(|t| t == tag) {
            if pos != 0 {
                tracing::warn!(
                    tag = %tag,
                    expected = ?self.in_flight.front(),
                    "tagged completion out of order"
                );
            }
            self.in_flight.remove(pos);
            true
        } else {
            false
        }
    }

    /// Drops every queued and in-flight command.
    pub fn clear(&mut self) {
        self.queue.clear();
        self.in_flight.clear();
    }

    /// Returns the tag expected to complete next, if any.
    #[must_use]
    pub fn next_expected(&self) -> Option<&Tag> {
        self.in_flight.front()
    }

    /// Returns true if the tag is awaiting completion.
    #[must_use]
    pub fn is_in_flight(&self, tag: &Tag) -> bool {
        self.in_flight.contains(tag)
    }
}

/// Pipelining classification of a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineSafety {
    /// May freely share the wire.
    Safe,
    /// May share the wire, but its results can affect later commands.
    Caution,
    /// Needs the wire to itself: exclusive session semantics or an
    /// unsatisfied continuation.
    Exclusive,
}

impl Command {
    /// Classifies this command for pipelining.
    #[must_use]
    pub fn pipeline_safety(&self) -> PipelineSafety {
        match self {
            // No state changes, no continuations.
            Self::Noop
            | Self::Capability
            | Self::Id { .. }
            | Self::Namespace
            | Self::List { .. }
            | Self::Lsub { .. }
            | Self::Status { .. }
            | Self::Check => PipelineSafety::Safe,

            // Data operations: safe on the wire, order-sensitive results.
            Self::Fetch { .. }
            | Self::Search { .. }
            | Self::Sort { .. }
            | Self::Thread { .. }
            | Self::Store { .. }
            | Self::Copy { .. }
            | Self::Move { .. }
            | Self::Expunge
            | Self::UidExpunge { .. }
            | Self::Create { .. }
            | Self::Delete { .. }
            | Self::Rename { .. }
            | Self::Subscribe { .. }
            | Self::Unsubscribe { .. }
            | Self::Enable { .. } => PipelineSafety::Caution,

            // Exclusive session semantics: greeting-style exchanges,
            // continuation-driven dialogs, or selection changes.
            Self::Login { .. }
            | Self::Authenticate { .. }
            | Self::StartTls
            | Self::Select { .. }
            | Self::Examine { .. }
            | Self::Close
            | Self::Unselect
            | Self::Logout
            | Self::Idle
            | Self::Done => PipelineSafety::Exclusive,
        }
    }

    /// Returns true if this command may share the wire.
    #[must_use]
    pub fn is_pipelineable(&self) -> bool {
        !matches!(self.pipeline_safety(), PipelineSafety::Exclusive)
    }

    /// Returns true if this command carries a literal that needs pacing.
    #[must_use]
    pub fn has_literal(&self) -> bool {
        // APPEND/REPLACE are built outside `Command`; of the line
        // commands, only AUTHENTICATE continues with more data.
        matches!(self, Self::Authenticate { .. })
    }
}

/// Splits commands into batches that may share the wire.
///
/// Exclusive commands travel in their own single-element batch.
#[must_use]
pub fn batch_commands(commands: Vec<Command>) -> Vec<Vec<Command>> {
    let mut batches = Vec::new();
    let mut current = Vec::new();

    for cmd in commands {
        if cmd.is_pipelineable() {
            current.push(cmd);
        } else {
            if !current.is_empty() {
                batches.push(std::mem::take(&mut current));
            }
            batches.push(vec![cmd]);
        }
    }

    if !current.is_empty() {
        batches.push(current);
    }

    batches
}
