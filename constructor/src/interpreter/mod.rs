//! Rule command execution.
//!
//! A [`CommandInterpreter`] turns one rule [`Command`] into the triples it
//! produces for a bound instance. The constructor is generic over the
//! interpreter; [`TemplateInterpreter`] is the default.

mod template;

pub use template::TemplateInterpreter;

use ldc_model::{Graph, Term, Triple};

use crate::error::CommandError;
use crate::index::Command;
use crate::mint::BlankNodeMinter;

/// Executes rule commands.
///
/// Implementations must be usable from several constructions at once, so
/// they hold no per-execution state: everything an execution needs is passed
/// in.
pub trait CommandInterpreter: Send + Sync {
    /// Runs `command` with `?this` bound to `this` against the read-only
    /// working `model`, returning the produced triples in order.
    ///
    /// Fresh blank nodes must come from `minter` so they never collide with
    /// labels already in the target graph.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError`] if the command cannot be parsed or uses a
    /// feature the interpreter does not support.
    fn execute(
        &self,
        command: &Command,
        this: &Term,
        model: &Graph,
        minter: &mut BlankNodeMinter,
    ) -> Result<Vec<Triple>, CommandError>;
}
