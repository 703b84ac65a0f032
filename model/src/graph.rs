//! An insertion-ordered RDF graph.
//!
//! Iteration yields triples in the order they were first inserted. Ordering
//! matters to consumers such as the superclass walk, where the first declared
//! `rdfs:subClassOf` edge is explored first.

use std::collections::{HashMap, HashSet};

use crate::term::{Term, Triple};

/// A set of RDF triples that remembers insertion order.
///
/// Inserting a triple that is already present is a no-op.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    triples: Vec<Triple>,
    members: HashSet<Triple>,
    by_subject: HashMap<Term, Vec<usize>>,
}

impl Graph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of triples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.triples.len()
    }

    /// Returns true if the graph holds no triples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    /// Inserts a triple. Returns false if it was already present.
    pub fn insert(&mut self, triple: Triple) -> bool {
        if self.members.contains(&triple) {
            return false;
        }
        self.by_subject
            .entry(triple.subject.clone())
            .or_default()
            .push(self.triples.len());
        self.members.insert(triple.clone());
        self.triples.push(triple);
        true
    }

    /// Inserts the triple `(subject, predicate, object)`.
    pub fn add(&mut self, subject: Term, predicate: Term, object: Term) -> bool {
        self.insert(Triple::new(subject, predicate, object))
    }

    /// Returns true if the triple is present.
    #[must_use]
    pub fn contains(&self, triple: &Triple) -> bool {
        self.members.contains(triple)
    }

    /// Returns true if `(subject, predicate, object)` is present.
    #[must_use]
    pub fn has(&self, subject: &Term, predicate: &Term, object: &Term) -> bool {
        self.contains(&Triple::new(subject.clone(), predicate.clone(), object.clone()))
    }

    /// Iterates over all triples in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Triple> {
        self.triples.iter()
    }

    /// Iterates over the triples matching the given pattern; `None` matches anything.
    pub fn matching<'a, 'q>(
        &'a self,
        subject: Option<&'q Term>,
        predicate: Option<&'q Term>,
        object: Option<&'q Term>,
    ) -> Box<dyn Iterator<Item = &'a Triple> + 'q>
    where
        'a: 'q,
    {
        let rest = move |t: &&'a Triple| {
            predicate.map_or(true, |p| &t.predicate == p) && object.map_or(true, |o| &t.object == o)
        };
        match subject {
            Some(s) => Box::new(
                self.by_subject
                    .get(s)
                    .into_iter()
                    .flatten()
                    .map(move |&i| &self.triples[i])
                    .filter(rest),
            ),
            None => Box::new(self.triples.iter().filter(rest)),
        }
    }

    /// Objects of `subject predicate ?o`, in insertion order.
    pub fn objects<'a, 'q>(
        &'a self,
        subject: &'q Term,
        predicate: &'q Term,
    ) -> impl Iterator<Item = &'a Term> + 'q
    where
        'a: 'q,
    {
        self.matching(Some(subject), Some(predicate), None)
            .map(|t| &t.object)
    }

    /// Subjects of `?s predicate object`, in insertion order.
    pub fn subjects<'a, 'q>(
        &'a self,
        predicate: &'q Term,
        object: &'q Term,
    ) -> impl Iterator<Item = &'a Term> + 'q
    where
        'a: 'q,
    {
        self.matching(None, Some(predicate), Some(object))
            .map(|t| &t.subject)
    }

    /// The first object of `subject predicate ?o`, if any.
    #[must_use]
    pub fn object<'a>(&'a self, subject: &Term, predicate: &Term) -> Option<&'a Term> {
        self.objects(subject, predicate).next()
    }

    /// Returns true if `term` is the subject of at least one triple.
    #[must_use]
    pub fn describes(&self, term: &Term) -> bool {
        self.by_subject.get(term).is_some_and(|v| !v.is_empty())
    }

    /// Keeps only the triples for which `keep` returns true. Order is preserved.
    pub fn retain(&mut self, mut keep: impl FnMut(&Triple) -> bool) {
        let before = self.triples.len();
        self.triples.retain(|t| keep(t));
        if self.triples.len() != before {
            self.reindex();
        }
    }

    /// Inserts every triple of `other`, preserving its order.
    pub fn extend(&mut self, other: Graph) {
        for triple in other.triples {
            self.insert(triple);
        }
    }

    /// Labels of every blank node mentioned in subject or object position.
    #[must_use]
    pub fn blank_labels(&self) -> HashSet<&str> {
        self.triples
            .iter()
            .flat_map(|t| [&t.subject, &t.object])
            .filter_map(Term::as_blank)
            .collect()
    }

    fn reindex(&mut self) {
        self.members = self.triples.iter().cloned().collect();
        self.by_subject.clear();
        for (i, t) in self.triples.iter().enumerate() {
            self.by_subject.entry(t.subject.clone()).or_default().push(i);
        }
    }
}

impl FromIterator<Triple> for Graph {
    fn from_iter<I: IntoIterator<Item = Triple>>(iter: I) -> Self {
        let mut graph = Graph::new();
        for triple in iter {
            graph.insert(triple);
        }
        graph
    }
}

impl<'a> IntoIterator for &'a Graph {
    type Item = &'a Triple;
    type IntoIter = std::slice::Iter<'a, Triple>;

    fn into_iter(self) -> Self::IntoIter {
        self.triples.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iri(s: &str) -> Term {
        Term::iri(format!("http://ex.org/{s}"))
    }

    #[test]
    fn duplicate_insert_is_noop() {
        let mut g = Graph::new();
        assert!(g.add(iri("a"), iri("p"), iri("b")));
        assert!(!g.add(iri("a"), iri("p"), iri("b")));
        assert_eq!(g.len(), 1);
    }

    #[test]
    fn objects_keep_insertion_order() {
        let mut g = Graph::new();
        g.add(iri("a"), iri("p"), iri("z"));
        g.add(iri("b"), iri("p"), iri("x"));
        g.add(iri("a"), iri("p"), iri("y"));
        let (a, p) = (iri("a"), iri("p"));
        let objs: Vec<_> = g.objects(&a, &p).cloned().collect();
        assert_eq!(objs, vec![iri("z"), iri("y")]);
    }

    #[test]
    fn matching_by_predicate_and_object() {
        let mut g = Graph::new();
        g.add(iri("a"), iri("p"), iri("x"));
        g.add(iri("b"), iri("p"), iri("x"));
        g.add(iri("c"), iri("q"), iri("x"));
        let (p, x) = (iri("p"), iri("x"));
        let subjects: Vec<_> = g.subjects(&p, &x).cloned().collect();
        assert_eq!(subjects, vec![iri("a"), iri("b")]);
    }

    #[test]
    fn retain_reindexes() {
        let mut g = Graph::new();
        g.add(iri("a"), iri("p"), iri("x"));
        g.add(iri("a"), iri("q"), iri("y"));
        g.add(iri("b"), iri("p"), iri("z"));
        let q = iri("q");
        g.retain(|t| t.predicate != q);
        assert_eq!(g.len(), 2);
        assert!(!g.has(&iri("a"), &iri("q"), &iri("y")));
        let a = iri("a");
        assert_eq!(g.matching(Some(&a), None, None).count(), 1);
        assert!(g.describes(&iri("b")));
        // a removed triple can be re-inserted
        assert!(g.add(iri("a"), iri("q"), iri("y")));
    }

    #[test]
    fn collects_blank_labels() {
        let mut g = Graph::new();
        g.add(Term::blank("b1"), iri("p"), Term::blank("b2"));
        g.add(iri("a"), iri("p"), Term::string("b3"));
        let labels = g.blank_labels();
        assert!(labels.contains("b1") && labels.contains("b2"));
        assert!(!labels.contains("b3"));
    }
}
