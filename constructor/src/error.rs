//! Error types for rule execution and instance construction.

use ldc_model::Term;

/// Failure of a whole construction pass.
///
/// Every variant is fatal: the pass is aborted and nothing is written to the
/// caller's target graph.
#[derive(Debug, thiserror::Error)]
pub enum ConstructionError {
    /// Neither the class nor any of its ancestors declares a rule for the relation.
    #[error("constructor is invoked but '{relation}' is not defined for class '{class}'")]
    Configuration {
        /// The rule relation that was looked up.
        relation: Term,
        /// The class construction was requested for.
        class: Term,
    },
    /// The command interpreter rejected a rule body.
    #[error("rule {command} of class '{class}' failed: {source}")]
    Command {
        /// The class whose rule was executed.
        class: Term,
        /// The rule command node (or literal).
        command: Term,
        /// The interpreter's error.
        #[source]
        source: CommandError,
    },
}

impl ConstructionError {
    /// Returns true for a missing-rule configuration error.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(self, ConstructionError::Configuration { .. })
    }
}

/// Failure to execute a single rule command.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    /// The command text could not be parsed.
    #[error("syntax error at byte {offset}: {message}")]
    Syntax {
        /// Byte offset into the command text.
        offset: usize,
        /// What was expected.
        message: String,
    },
    /// A prefixed name uses a prefix that is neither declared in the command
    /// nor configured.
    #[error("unknown prefix '{0}:'")]
    UnknownPrefix(String),
    /// The command uses a feature the interpreter does not evaluate.
    #[error("unsupported command: {0}")]
    Unsupported(String),
}
