//! Class → rule mapping built from a working model.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use ldc_model::{Graph, Ontology, Term};

/// An executable rule body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    /// The command resource, or the literal itself for inline commands.
    pub node: Term,
    /// The command text handed to the interpreter.
    pub text: Arc<str>,
}

/// A construction rule attached directly to a class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    /// The class the rule is declared on.
    pub class: Term,
    /// The rule body.
    pub command: Command,
}

/// The rules of one class, as found by [`RuleIndex::resolve`].
#[derive(Debug, Clone, Copy)]
pub struct Resolved<'i> {
    /// The class the rules are declared on: the requested class or its
    /// nearest rule-bearing ancestor.
    pub class: &'i Term,
    /// The rules, in discovery order.
    pub rules: &'i [Rule],
}

/// Rules keyed by the class they are declared on.
#[derive(Debug, Default)]
pub struct RuleIndex {
    rules: HashMap<Term, Vec<Rule>>,
    order: Vec<Term>,
}

impl RuleIndex {
    /// Indexes every `class rule_relation command` statement of `working`.
    ///
    /// A resource command contributes one rule per `command_text` literal it
    /// carries; a literal command is its own text. Commands without any text
    /// are skipped.
    #[must_use]
    pub fn build(working: &Graph, rule_relation: &Term, command_text: &Term) -> Self {
        let mut index = RuleIndex::default();
        for stmt in working.matching(None, Some(rule_relation), None) {
            let texts: Vec<Arc<str>> = match &stmt.object {
                Term::Literal(lit) => vec![Arc::from(lit.lexical())],
                node => working
                    .objects(node, command_text)
                    .filter_map(Term::as_literal)
                    .map(|lit| Arc::from(lit.lexical()))
                    .collect(),
            };
            if texts.is_empty() {
                tracing::debug!(
                    class = %stmt.subject,
                    command = %stmt.object,
                    "rule command has no command text; skipped"
                );
                continue;
            }
            for text in texts {
                index.push(Rule {
                    class: stmt.subject.clone(),
                    command: Command {
                        node: stmt.object.clone(),
                        text,
                    },
                });
            }
        }
        index
    }

    fn push(&mut self, rule: Rule) {
        let entry = self.rules.entry(rule.class.clone()).or_insert_with(|| {
            self.order.push(rule.class.clone());
            Vec::new()
        });
        entry.push(rule);
    }

    /// Rules declared directly on `class`; empty if there are none.
    #[must_use]
    pub fn rules_for(&self, class: &Term) -> &[Rule] {
        self.rules.get(class).map(Vec::as_slice).unwrap_or_default()
    }

    /// Classes with at least one rule, in discovery order.
    pub fn classes(&self) -> impl Iterator<Item = &Term> {
        self.order.iter()
    }

    /// Number of classes with rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns true if no class has a rule.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Finds the nearest rule-bearing class for `class`: itself, or else the
    /// first rule-bearing superclass found by a depth-first walk over the
    /// declared superclasses in order.
    ///
    /// Returns `None` when no class in the ancestor chain has a rule. Use
    /// [`inherited`](Self::inherited) for the full set of rules to run.
    #[must_use]
    pub fn resolve<'i>(&'i self, ontology: &Ontology<'_>, class: &Term) -> Option<Resolved<'i>> {
        let mut visited = HashSet::new();
        self.resolve_from(ontology, class, &mut visited)
    }

    fn resolve_from<'i>(
        &'i self,
        ontology: &Ontology<'_>,
        class: &Term,
        visited: &mut HashSet<Term>,
    ) -> Option<Resolved<'i>> {
        if !visited.insert(class.clone()) {
            return None;
        }
        if let Some((class, rules)) = self.rules.get_key_value(class) {
            return Some(Resolved { class, rules });
        }
        ontology
            .direct_superclasses(class)
            .into_iter()
            .find_map(|sup| self.resolve_from(ontology, sup, visited))
    }

    /// Every rule that applies to `class` when it is constructed: the rules
    /// of its superclasses first, depth-first over the declared superclasses
    /// in order, then its own.
    ///
    /// Each class contributes once, however many paths reach it.
    #[must_use]
    pub fn inherited<'i>(&'i self, ontology: &Ontology<'_>, class: &Term) -> Vec<&'i Rule> {
        let mut visited = HashSet::new();
        let mut rules = Vec::new();
        self.collect_inherited(ontology, class, &mut visited, &mut rules);
        rules
    }

    fn collect_inherited<'i>(
        &'i self,
        ontology: &Ontology<'_>,
        class: &Term,
        visited: &mut HashSet<Term>,
        out: &mut Vec<&'i Rule>,
    ) {
        if !visited.insert(class.clone()) {
            return;
        }
        for sup in ontology.direct_superclasses(class) {
            self.collect_inherited(ontology, sup, visited, out);
        }
        out.extend(self.rules_for(class));
    }
}
