//! Serializers for constructed instance graphs.
//!
//! Three serialization formats are supported:
//! - **N-Triples** ([`ntriples`]): one statement per line, absolute IRIs
//! - **Turtle** ([`turtle`]): subject-grouped, compacted with a [`PrefixMap`](crate::PrefixMap)
//! - **JSON-LD** ([`jsonld`]): a flattened `@graph` document (feature `serializers`)

#[cfg(feature = "serializers")]
pub mod jsonld;
pub mod ntriples;
pub mod turtle;
