//! Turtle 1.1 serializer.
//!
//! Statements are grouped by subject in first-appearance order, then by
//! predicate. IRIs are compacted with the supplied [`PrefixMap`] when the
//! local part needs no escaping.

use std::collections::HashMap;
use std::fmt::Write as _;

use crate::graph::Graph;
use crate::prefix::PrefixMap;
use crate::term::{escape, Literal, Term};
use crate::vocab;

/// Serializes `graph` to a Turtle string.
#[must_use]
pub fn to_turtle(graph: &Graph, prefixes: &PrefixMap) -> String {
    let mut out = String::with_capacity(graph.len() * 64);

    // Prefix declarations
    for (prefix, namespace) in prefixes.iter() {
        let _ = writeln!(out, "@prefix {prefix}: <{namespace}> .");
    }
    if !prefixes.is_empty() {
        out.push('\n');
    }

    // Subjects in first-appearance order, each with (predicate, objects) groups.
    let mut order: Vec<&Term> = Vec::new();
    let mut groups: HashMap<&Term, Vec<(&Term, Vec<&Term>)>> = HashMap::new();
    for triple in graph {
        let entry = groups.entry(&triple.subject).or_insert_with(|| {
            order.push(&triple.subject);
            Vec::new()
        });
        match entry.iter_mut().find(|(p, _)| *p == &triple.predicate) {
            Some((_, objects)) => objects.push(&triple.object),
            None => entry.push((&triple.predicate, vec![&triple.object])),
        }
    }

    for subject in order {
        let Some(predicates) = groups.get(subject) else {
            continue;
        };
        out.push_str(&term(subject, prefixes));
        for (i, (predicate, objects)) in predicates.iter().enumerate() {
            let objects: Vec<String> = objects.iter().map(|o| term(o, prefixes)).collect();
            let sep = if i == 0 { "\n" } else { " ;\n" };
            let _ = write!(
                out,
                "{sep}  {} {}",
                predicate_name(predicate, prefixes),
                objects.join(" , ")
            );
        }
        out.push_str(" .\n\n");
    }

    out
}

fn predicate_name(predicate: &Term, prefixes: &PrefixMap) -> String {
    if predicate.is_iri(vocab::RDF_TYPE) {
        "a".to_owned()
    } else {
        term(predicate, prefixes)
    }
}

fn term(term: &Term, prefixes: &PrefixMap) -> String {
    match term {
        Term::Iri(iri) => iri_name(iri, prefixes),
        Term::BlankNode(label) => format!("_:{label}"),
        Term::Literal(lit) => literal(lit, prefixes),
    }
}

fn iri_name(iri: &str, prefixes: &PrefixMap) -> String {
    prefixes
        .compact(iri)
        .unwrap_or_else(|| format!("<{iri}>"))
}

fn literal(lit: &Literal, prefixes: &PrefixMap) -> String {
    let quoted = format!("\"{}\"", escape(lit.lexical()));
    match lit.language() {
        Some(tag) => format!("{quoted}@{tag}"),
        None if lit.is_string() => quoted,
        None => format!("{quoted}^^{}", iri_name(lit.datatype(), prefixes)),
    }
}
