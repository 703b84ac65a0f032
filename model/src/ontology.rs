//! Read-only OWL view over an RDF [`Graph`].
//!
//! The view answers the questions the instance constructor asks of an
//! ontology: which classes a class is declared under, which of those are
//! `owl:allValuesFrom` restrictions, and which properties are inverses of a
//! given property. Superclass edges are expected to be materialized already;
//! the view performs no inference beyond transitively following
//! `rdfs:subClassOf`.

use std::collections::HashSet;
use std::fmt;

use crate::graph::Graph;
use crate::term::Term;
use crate::vocab;

/// An `owl:allValuesFrom` restriction attached to a class as a superclass node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllValuesFrom<'g> {
    /// The restriction node itself (usually a blank node).
    pub node: &'g Term,
    /// The restricted property (`owl:onProperty`).
    pub property: &'g Term,
    /// The class every value of `property` must belong to.
    pub value_class: &'g Term,
}

/// Why a restriction node could not be turned into an [`AllValuesFrom`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestrictionDefect {
    /// The node has no `owl:onProperty`.
    MissingProperty,
    /// `owl:onProperty` is not an IRI.
    PropertyNotIri(Term),
    /// `owl:allValuesFrom` is not an IRI.
    ValueClassNotIri(Term),
    /// `owl:allValuesFrom` names a class the graph knows nothing about.
    UnknownValueClass(Term),
}

impl fmt::Display for RestrictionDefect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RestrictionDefect::MissingProperty => write!(f, "no owl:onProperty"),
            RestrictionDefect::PropertyNotIri(t) => write!(f, "owl:onProperty {t} is not an IRI"),
            RestrictionDefect::ValueClassNotIri(t) => {
                write!(f, "owl:allValuesFrom {t} is not a named class")
            }
            RestrictionDefect::UnknownValueClass(t) => {
                write!(f, "owl:allValuesFrom {t} cannot be resolved")
            }
        }
    }
}

/// A borrowed, cheap-to-copy OWL view of a graph.
#[derive(Debug, Clone, Copy)]
pub struct Ontology<'g> {
    graph: &'g Graph,
    vocab: &'g Vocabulary,
}

/// Pre-built vocabulary terms used by [`Ontology`] lookups.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    rdf_type: Term,
    subclass_of: Term,
    on_property: Term,
    all_values_from: Term,
    inverse_of: Term,
    owl_class: Term,
    rdfs_class: Term,
}

impl Vocabulary {
    fn new() -> Self {
        Self {
            rdf_type: Term::iri(vocab::RDF_TYPE),
            subclass_of: Term::iri(vocab::RDFS_SUBCLASS_OF),
            on_property: Term::iri(vocab::OWL_ON_PROPERTY),
            all_values_from: Term::iri(vocab::OWL_ALL_VALUES_FROM),
            inverse_of: Term::iri(vocab::OWL_INVERSE_OF),
            owl_class: Term::iri(vocab::OWL_CLASS),
            rdfs_class: Term::iri(vocab::RDFS_CLASS),
        }
    }

    /// Returns the shared vocabulary instance.
    #[must_use]
    pub fn get() -> &'static Vocabulary {
        static VOCABULARY: std::sync::OnceLock<Vocabulary> = std::sync::OnceLock::new();
        VOCABULARY.get_or_init(Vocabulary::new)
    }

    /// The `rdf:type` term.
    #[must_use]
    pub fn rdf_type(&self) -> &Term {
        &self.rdf_type
    }
}

impl<'g> Ontology<'g> {
    /// Wraps `graph`.
    #[must_use]
    pub fn new(graph: &'g Graph) -> Self {
        Self {
            graph,
            vocab: Vocabulary::get(),
        }
    }

    /// The underlying graph.
    #[must_use]
    pub fn graph(&self) -> &'g Graph {
        self.graph
    }

    /// Declared `rdfs:subClassOf` targets of `class`, in declaration order.
    ///
    /// Self-edges are dropped.
    #[must_use]
    pub fn direct_superclasses(&self, class: &Term) -> Vec<&'g Term> {
        let graph = self.graph;
        graph
            .matching(Some(class), Some(&self.vocab.subclass_of), None)
            .map(|t| &t.object)
            .filter(|sup| *sup != class)
            .collect()
    }

    /// Every transitive superclass of `class` in depth-first pre-order,
    /// excluding `class` itself.
    ///
    /// Each node appears once even when the hierarchy contains cycles or
    /// diamonds.
    #[must_use]
    pub fn ancestors(&self, class: &Term) -> Vec<&'g Term> {
        let mut seen: HashSet<&'g Term> = HashSet::new();
        let mut out = Vec::new();
        self.collect_ancestors(class, class, &mut seen, &mut out);
        out
    }

    fn collect_ancestors(
        &self,
        root: &Term,
        class: &Term,
        seen: &mut HashSet<&'g Term>,
        out: &mut Vec<&'g Term>,
    ) {
        for sup in self.direct_superclasses(class) {
            if sup != root && seen.insert(sup) {
                out.push(sup);
                self.collect_ancestors(root, sup, seen, out);
            }
        }
    }

    /// Interprets `node` as an `owl:allValuesFrom` restriction.
    ///
    /// Returns `None` when `node` carries no `owl:allValuesFrom` at all, so
    /// plain named superclasses are simply not restrictions.
    ///
    /// # Errors
    ///
    /// Returns a [`RestrictionDefect`] when the node has `owl:allValuesFrom`
    /// but the property or value class cannot be resolved.
    pub fn all_values_from(
        &self,
        node: &'g Term,
    ) -> Option<Result<AllValuesFrom<'g>, RestrictionDefect>> {
        let graph = self.graph;
        let value_class = graph.object(node, &self.vocab.all_values_from)?;
        Some(self.check_restriction(node, value_class))
    }

    fn check_restriction(
        &self,
        node: &'g Term,
        value_class: &'g Term,
    ) -> Result<AllValuesFrom<'g>, RestrictionDefect> {
        let graph = self.graph;
        let property = graph
            .object(node, &self.vocab.on_property)
            .ok_or(RestrictionDefect::MissingProperty)?;
        if property.as_iri().is_none() {
            return Err(RestrictionDefect::PropertyNotIri(property.clone()));
        }
        if value_class.as_iri().is_none() {
            return Err(RestrictionDefect::ValueClassNotIri(value_class.clone()));
        }
        if !self.is_class(value_class) && !graph.describes(value_class) {
            return Err(RestrictionDefect::UnknownValueClass(value_class.clone()));
        }
        Ok(AllValuesFrom {
            node,
            property,
            value_class,
        })
    }

    /// Properties declared inverse to `property` through `owl:inverseOf`, in
    /// either direction, without duplicates.
    #[must_use]
    pub fn inverses_of(&self, property: &Term) -> Vec<&'g Term> {
        let graph = self.graph;
        let inverse_of = &self.vocab.inverse_of;
        let mut out: Vec<&'g Term> = Vec::new();
        let forward = graph
            .matching(Some(property), Some(inverse_of), None)
            .map(|t| &t.object);
        let backward = graph
            .matching(None, Some(inverse_of), Some(property))
            .map(|t| &t.subject);
        for inverse in forward.chain(backward) {
            if inverse.as_iri().is_some() && !out.contains(&inverse) {
                out.push(inverse);
            }
        }
        out
    }

    /// Returns true if `term` is typed `owl:Class` or `rdfs:Class`.
    #[must_use]
    pub fn is_class(&self, term: &Term) -> bool {
        let graph = self.graph;
        graph.has(term, &self.vocab.rdf_type, &self.vocab.owl_class)
            || graph.has(term, &self.vocab.rdf_type, &self.vocab.rdfs_class)
    }

    /// Every named class in the graph: typed classes plus IRIs with declared
    /// superclasses, in first-mention order.
    #[must_use]
    pub fn classes(&self) -> Vec<&'g Term> {
        let graph = self.graph;
        let mut seen = HashSet::new();
        graph
            .iter()
            .filter(|t| {
                t.predicate == self.vocab.subclass_of
                    || (t.predicate == self.vocab.rdf_type
                        && (t.object == self.vocab.owl_class || t.object == self.vocab.rdfs_class))
            })
            .map(|t| &t.subject)
            .filter(|s| s.as_iri().is_some())
            .filter(|s| seen.insert(*s))
            .collect()
    }
}
