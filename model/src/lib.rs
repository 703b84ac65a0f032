//! RDF data model for ontology-driven instance construction.
//!
//! The `ldc-model` crate provides owned RDF [`Term`]s and [`Triple`]s, an
//! insertion-ordered [`Graph`], a read-only OWL [`Ontology`] view over a graph,
//! a Turtle loader, and serializers that produce N-Triples, Turtle and
//! JSON-LD output.
//!
//! # Entry Point
//!
//! ```
//! let graph = ldc_model::parser::parse_turtle(
//!     "@prefix ex: <http://ex.org/> .
//!      @prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .
//!      ex:Person rdfs:subClassOf ex:Agent .",
//! )?;
//! let ontology = ldc_model::Ontology::new(&graph);
//! let person = ldc_model::Term::iri("http://ex.org/Person");
//! assert_eq!(ontology.ancestors(&person).len(), 1);
//! # Ok::<(), ldc_model::parser::ParseError>(())
//! ```
//!
//! # Serialization
//!
//! ```
//! let graph = ldc_model::Graph::new();
//! let prefixes = ldc_model::PrefixMap::standard();
//! let nt  = ldc_model::serializer::ntriples::to_ntriples(&graph);
//! let ttl = ldc_model::serializer::turtle::to_turtle(&graph, &prefixes);
//! # let _ = (nt, ttl);
//! ```

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

pub mod graph;
pub mod ontology;
pub mod parser;
pub mod prefix;
pub mod serializer;
pub mod term;
pub mod vocab;

pub use graph::Graph;
pub use ontology::{AllValuesFrom, Ontology, RestrictionDefect};
pub use prefix::PrefixMap;
pub use term::{Literal, Term, Triple};
