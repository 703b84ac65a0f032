//! JSON-LD 1.1 serializer.
//!
//! Produces a flattened document: one node object per subject inside
//! `@graph`, with the prefix map emitted as `@context` so compact IRIs stay
//! resolvable.

use serde_json::{json, Map, Value};

use crate::graph::Graph;
use crate::prefix::PrefixMap;
use crate::term::Term;
use crate::vocab;

/// Serializes `graph` to a JSON-LD `Value`.
///
/// The returned value can be pretty-printed with [`serde_json::to_string_pretty`].
#[must_use]
pub fn to_json_ld(graph: &Graph, prefixes: &PrefixMap) -> Value {
    json!({
        "@context": build_context(prefixes),
        "@graph": build_graph(graph, prefixes)
    })
}

fn build_context(prefixes: &PrefixMap) -> Value {
    let mut ctx = Map::new();
    for (prefix, namespace) in prefixes.iter() {
        // The empty prefix cannot be declared as a JSON-LD term.
        if !prefix.is_empty() {
            ctx.insert(prefix.to_owned(), json!(namespace));
        }
    }
    Value::Object(ctx)
}

fn build_graph(graph: &Graph, prefixes: &PrefixMap) -> Value {
    let mut nodes: Vec<Map<String, Value>> = Vec::new();
    let mut index: Vec<&Term> = Vec::new();

    for triple in graph {
        let pos = match index.iter().position(|s| *s == &triple.subject) {
            Some(pos) => pos,
            None => {
                let mut node = Map::new();
                node.insert("@id".to_owned(), json!(id(&triple.subject, prefixes)));
                nodes.push(node);
                index.push(&triple.subject);
                nodes.len() - 1
            }
        };
        let node = &mut nodes[pos];

        if triple.predicate.is_iri(vocab::RDF_TYPE) && triple.object.is_resource() {
            push(node, "@type", json!(id(&triple.object, prefixes)));
            continue;
        }
        let key = id(&triple.predicate, prefixes);
        push(node, &key, value(&triple.object, prefixes));
    }

    Value::Array(nodes.into_iter().map(Value::Object).collect())
}

fn push(node: &mut Map<String, Value>, key: &str, value: Value) {
    match node.get_mut(key) {
        Some(Value::Array(values)) => values.push(value),
        _ => {
            node.insert(key.to_owned(), Value::Array(vec![value]));
        }
    }
}

fn id(term: &Term, prefixes: &PrefixMap) -> String {
    match term {
        Term::Iri(iri) => prefixes
            .compact(iri)
            .filter(|c| !c.starts_with(':'))
            .unwrap_or_else(|| iri.to_string()),
        Term::BlankNode(label) => format!("_:{label}"),
        Term::Literal(lit) => lit.lexical().to_owned(),
    }
}

fn value(term: &Term, prefixes: &PrefixMap) -> Value {
    match term {
        Term::Literal(lit) => match lit.language() {
            Some(tag) => json!({ "@value": lit.lexical(), "@language": tag }),
            None if lit.is_string() => json!({ "@value": lit.lexical() }),
            None => json!({
                "@value": lit.lexical(),
                "@type": prefixes.compact(lit.datatype()).unwrap_or_else(|| lit.datatype().to_owned())
            }),
        },
        _ => json!({ "@id": id(term, prefixes) }),
    }
}
