//! Fresh blank node allocation.

use std::collections::HashSet;

use ldc_model::{Graph, Term};

/// Hands out blank nodes `_:<prefix>1`, `_:<prefix>2`, ... skipping every
/// label already in use.
#[derive(Debug, Clone)]
pub struct BlankNodeMinter {
    prefix: String,
    next: u64,
    taken: HashSet<String>,
    minted: Vec<Term>,
}

impl BlankNodeMinter {
    /// Creates a minter with no reserved labels.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 1,
            taken: HashSet::new(),
            minted: Vec::new(),
        }
    }

    /// Creates a minter that avoids every blank node label present in `graph`.
    pub fn avoiding(prefix: impl Into<String>, graph: &Graph) -> Self {
        let mut minter = Self::new(prefix);
        minter
            .taken
            .extend(graph.blank_labels().into_iter().map(str::to_owned));
        minter
    }

    /// Marks `term`'s label as used if it is a blank node.
    pub fn reserve(&mut self, term: &Term) {
        if let Some(label) = term.as_blank() {
            self.taken.insert(label.to_owned());
        }
    }

    /// Returns a blank node whose label has not been handed out or reserved.
    pub fn mint(&mut self) -> Term {
        loop {
            let label = format!("{}{}", self.prefix, self.next);
            self.next += 1;
            if self.taken.insert(label.clone()) {
                let term = Term::blank(label);
                self.minted.push(term.clone());
                return term;
            }
        }
    }

    /// Every blank node minted so far, in order.
    #[must_use]
    pub fn minted(&self) -> &[Term] {
        &self.minted
    }

    /// Consumes the minter, returning the minted blank nodes.
    #[must_use]
    pub fn into_minted(self) -> Vec<Term> {
        self.minted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mints_sequential_labels() {
        let mut minter = BlankNodeMinter::new("b");
        assert_eq!(minter.mint(), Term::blank("b1"));
        assert_eq!(minter.mint(), Term::blank("b2"));
        assert_eq!(minter.minted().len(), 2);
    }

    #[test]
    fn skips_labels_used_in_the_graph() {
        let mut g = Graph::new();
        g.add(
            Term::blank("b1"),
            Term::iri("http://ex.org/p"),
            Term::blank("b3"),
        );
        let mut minter = BlankNodeMinter::avoiding("b", &g);
        minter.reserve(&Term::blank("b2"));
        assert_eq!(minter.mint(), Term::blank("b4"));
        assert_eq!(minter.into_minted(), vec![Term::blank("b4")]);
    }
}
