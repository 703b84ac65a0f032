//! Ontology-driven instance construction.
//!
//! Classes carry construction rules through a rule relation (by default
//! `spin:constructor`). Constructing an instance of a class runs the rules of
//! its superclasses and then its own, types the instance, and then builds one
//! linked sub-instance for every `owl:allValuesFrom` restriction the class
//! inherits, recursively.
//!
//! The default [`TemplateInterpreter`] only runs template-only constructors:
//! `CONSTRUCT { ... }` with an empty or absent `WHERE` clause. Rules that
//! compute values in `WHERE` (for example `BIND(NOW() AS ?now)`) fail with
//! [`CommandError::Unsupported`]; plug in another [`CommandInterpreter`] to
//! run them.
//!
//! # Entry Point
//!
//! ```
//! use ldc_constructor::{Constructor, ConstructorConfig};
//! use ldc_model::{parser::parse_turtle, Graph, Term};
//!
//! let ontology = parse_turtle(
//!     r#"@prefix ex: <http://ex.org/> .
//!        @prefix owl: <http://www.w3.org/2002/07/owl#> .
//!        @prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .
//!        @prefix spin: <http://spinrdf.org/spin#> .
//!        @prefix sp: <http://spinrdf.org/sp#> .
//!        ex:Person a owl:Class ;
//!            spin:constructor [ sp:text "CONSTRUCT { ?this rdfs:label \"someone\" }" ] ."#,
//! )?;
//! let constructor = Constructor::new(ConstructorConfig::default());
//! let mut target = Graph::new();
//! let built = constructor.construct(&ontology, &Term::iri("http://ex.org/Person"), &mut target)?;
//! assert_eq!(built.instance, Term::blank("b1"));
//! assert_eq!(target.len(), 2);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

pub mod config;
pub mod constructor;
pub mod error;
pub mod index;
pub mod interpreter;
pub mod mint;
pub mod normalize;
pub mod report;

pub use config::{ConfigError, ConstructorConfig, CycleGuard};
pub use constructor::{Construction, Constructor, ReachedTypes};
pub use error::{CommandError, ConstructionError};
pub use index::{Command, Resolved, Rule, RuleIndex};
pub use interpreter::{CommandInterpreter, TemplateInterpreter};
pub use mint::BlankNodeMinter;
pub use normalize::normalize;
pub use report::{ConstructionReport, EntryKind, ReportEntry, Severity};
