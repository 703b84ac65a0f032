//! Construction-safe copy of an ontology graph.
//!
//! Rule commands are looked up by subject and predicate. Statements that
//! reasoners or earlier passes attach to a command resource (labels, inferred
//! types of the query body, stray links) would otherwise be picked up as part
//! of the command, so a command subject keeps only its `rdf:type` and
//! command-text statements.

use std::collections::HashSet;

use ldc_model::{vocab, Graph, Term};

/// Returns an independent copy of `ontology` in which every subject of a
/// `command_text` statement retains only its `rdf:type` and `command_text`
/// statements. The input graph is not modified.
#[must_use]
pub fn normalize(ontology: &Graph, command_text: &Term) -> Graph {
    let rdf_type = Term::iri(vocab::RDF_TYPE);
    let commands: HashSet<&Term> = ontology
        .matching(None, Some(command_text), None)
        .map(|t| &t.subject)
        .collect();

    let mut working = ontology.clone();
    if commands.is_empty() {
        return working;
    }

    let before = working.len();
    working.retain(|t| {
        !commands.contains(&t.subject) || t.predicate == rdf_type || &t.predicate == command_text
    });
    tracing::debug!(
        commands = commands.len(),
        stripped = before - working.len(),
        "normalized ontology for construction"
    );
    working
}
