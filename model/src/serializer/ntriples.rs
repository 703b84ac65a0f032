//! N-Triples serializer.
//!
//! Produces a valid N-Triples document (one triple per line, absolute IRIs).
//! N-Triples is suitable for streaming, bulk loading, and diff-friendly storage.

use std::fmt::Write as _;

use crate::graph::Graph;

/// Serializes `graph` to an N-Triples string, in graph order.
#[must_use]
pub fn to_ntriples(graph: &Graph) -> String {
    let mut out = String::with_capacity(graph.len() * 96);
    for triple in graph {
        // Writing into a String cannot fail.
        let _ = writeln!(out, "{triple}");
    }
    out
}
