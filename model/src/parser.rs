//! Turtle loading through `sophia_turtle`.
//!
//! Parsed terms are converted into this crate's owned [`Term`]s; blank node
//! labels assigned by the parser are kept as-is, so two loads of the same
//! document produce equal graphs.

use sophia_api::source::TripleSource;
use sophia_api::term::{SimpleTerm, Term as _, TermKind};
use sophia_turtle::parser::turtle;

use crate::graph::Graph;
use crate::term::{Literal, Term, Triple};

/// Errors raised while loading an RDF document.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// The Turtle parser rejected the document.
    #[error("invalid Turtle: {0}")]
    Turtle(String),
    /// The document contains a term kind this model does not represent
    /// (quoted triples or variables).
    #[error("unsupported RDF term: {0}")]
    UnsupportedTerm(String),
}

/// Parses a Turtle document into a [`Graph`], keeping document order.
///
/// # Errors
///
/// Returns [`ParseError::Turtle`] on syntax errors and
/// [`ParseError::UnsupportedTerm`] for RDF-star quoted triples.
pub fn parse_turtle(src: &str) -> Result<Graph, ParseError> {
    let triples: Vec<[SimpleTerm<'static>; 3]> = turtle::parse_str(src)
        .collect_triples()
        .map_err(|e| ParseError::Turtle(e.to_string()))?;

    let mut graph = Graph::new();
    for [s, p, o] in &triples {
        graph.insert(Triple::new(convert(s)?, convert(p)?, convert(o)?));
    }
    Ok(graph)
}

fn convert(term: &SimpleTerm<'_>) -> Result<Term, ParseError> {
    let unsupported = || ParseError::UnsupportedTerm(format!("{term:?}"));
    match term.kind() {
        TermKind::Iri => term
            .iri()
            .map(|iri| Term::iri(iri.as_str()))
            .ok_or_else(unsupported),
        TermKind::BlankNode => term
            .bnode_id()
            .map(|id| Term::blank(id.as_str()))
            .ok_or_else(unsupported),
        TermKind::Literal => {
            let lexical = term.lexical_form().ok_or_else(unsupported)?;
            if let Some(tag) = term.language_tag() {
                return Ok(Term::Literal(Literal::lang(&*lexical, tag.as_str())));
            }
            let datatype = term.datatype().ok_or_else(unsupported)?;
            Ok(Term::Literal(Literal::typed(&*lexical, datatype.as_str())))
        }
        TermKind::Triple | TermKind::Variable => Err(unsupported()),
    }
}
