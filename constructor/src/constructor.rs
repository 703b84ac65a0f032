//! Recursive instance construction.

use std::collections::HashSet;

use ldc_model::{vocab, Graph, Ontology, Term};

use crate::config::{ConstructorConfig, CycleGuard};
use crate::error::ConstructionError;
use crate::index::RuleIndex;
use crate::interpreter::{CommandInterpreter, TemplateInterpreter};
use crate::mint::BlankNodeMinter;
use crate::normalize::normalize;
use crate::report::{ConstructionReport, EntryKind, ReportEntry};

/// Classes already expanded in a construction.
///
/// A restriction whose value class is in the set is not expanded again,
/// which bounds recursion over cyclic restriction graphs. The same set is
/// threaded through every recursive call of one construction; callers may
/// seed it to block classes up front.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReachedTypes(HashSet<Term>);

impl ReachedTypes {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `class`; returns false if it was already present.
    pub fn insert(&mut self, class: Term) -> bool {
        self.0.insert(class)
    }

    /// Removes `class`; returns false if it was absent.
    pub fn remove(&mut self, class: &Term) -> bool {
        self.0.remove(class)
    }

    /// Returns true if `class` has been reached.
    #[must_use]
    pub fn contains(&self, class: &Term) -> bool {
        self.0.contains(class)
    }

    /// Number of reached classes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if no class has been reached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the reached classes in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &Term> {
        self.0.iter()
    }
}

/// Outcome of a successful construction.
#[derive(Debug)]
pub struct Construction {
    /// The constructed (root) instance.
    pub instance: Term,
    /// What happened along the way.
    pub report: ConstructionReport,
}

/// Builds instances of ontology classes by running their construction rules
/// and expanding their all-values-from restrictions.
///
/// A constructor holds no per-construction state and can be shared across
/// threads.
#[derive(Debug, Clone)]
pub struct Constructor<I = TemplateInterpreter> {
    interpreter: I,
    config: ConstructorConfig,
}

impl Default for Constructor {
    fn default() -> Self {
        Self::new(ConstructorConfig::default())
    }
}

impl Constructor {
    /// Creates a constructor using the [`TemplateInterpreter`] with the
    /// configured prefixes.
    #[must_use]
    pub fn new(config: ConstructorConfig) -> Self {
        Self {
            interpreter: TemplateInterpreter::from_config(&config),
            config,
        }
    }
}

impl<I: CommandInterpreter> Constructor<I> {
    /// Creates a constructor with a custom command interpreter.
    pub fn with_interpreter(config: ConstructorConfig, interpreter: I) -> Self {
        Self {
            interpreter,
            config,
        }
    }

    /// The configuration.
    #[must_use]
    pub fn config(&self) -> &ConstructorConfig {
        &self.config
    }

    /// The command interpreter.
    #[must_use]
    pub fn interpreter(&self) -> &I {
        &self.interpreter
    }

    /// Constructs a fresh blank-node instance of `for_class` using the
    /// configured rule relation.
    ///
    /// # Errors
    ///
    /// See [`add_instance`](Self::add_instance).
    pub fn construct(
        &self,
        ontology: &Graph,
        for_class: &Term,
        target: &mut Graph,
    ) -> Result<Construction, ConstructionError> {
        let instance = BlankNodeMinter::avoiding(self.config.blank_node_prefix.as_str(), target).mint();
        let relation = self.config.rule_relation_term();
        let mut reached = ReachedTypes::new();
        let mut construction = self.add_instance(
            ontology,
            for_class,
            &relation,
            instance.clone(),
            target,
            &mut reached,
        )?;
        construction.report.new_resources.insert(0, instance);
        Ok(construction)
    }

    /// Makes `instance` an instance of `for_class`.
    ///
    /// Runs the rules `rule_relation` attaches to `for_class` and to its
    /// superclasses, superclasses first and each class once, asserts
    /// `instance rdf:type for_class`,
    /// then creates and recursively constructs one sub-instance per
    /// all-values-from restriction among the ancestors of `for_class`.
    /// `reached` records the classes entered so far and is shared by every
    /// recursive call.
    ///
    /// All statements are collected first and added to `target` only once the
    /// whole construction has succeeded. `ontology` is never modified.
    ///
    /// # Errors
    ///
    /// Returns [`ConstructionError::Configuration`] when a class reached
    /// during construction has no rule anywhere in its ancestry, and
    /// [`ConstructionError::Command`] when the interpreter rejects a rule.
    /// `target` is left untouched in both cases.
    pub fn add_instance(
        &self,
        ontology: &Graph,
        for_class: &Term,
        rule_relation: &Term,
        instance: Term,
        target: &mut Graph,
        reached: &mut ReachedTypes,
    ) -> Result<Construction, ConstructionError> {
        let _span = tracing::debug_span!("add_instance", class = %for_class, instance = %instance)
            .entered();
        let command_text = self.config.command_text_term();
        let working = normalize(ontology, &command_text);
        let index = RuleIndex::build(&working, rule_relation, &command_text);
        tracing::debug!(rule_classes = index.len(), "indexed construction rules");

        let mut minter = BlankNodeMinter::avoiding(self.config.blank_node_prefix.as_str(), target);
        minter.reserve(&instance);
        let mut pass = Pass {
            interpreter: &self.interpreter,
            guard: self.config.cycle_guard,
            relation: rule_relation,
            ontology: Ontology::new(&working),
            index: &index,
            rdf_type: Term::iri(vocab::RDF_TYPE),
            delta: Graph::new(),
            minter,
            report: ConstructionReport::new(),
        };
        pass.instantiate(for_class, &instance, reached)?;

        let Pass {
            delta,
            minter,
            mut report,
            ..
        } = pass;
        report.new_resources = minter.into_minted();
        let before = target.len();
        target.extend(delta);
        tracing::info!(
            class = %for_class,
            instance = %instance,
            added = target.len() - before,
            rules = report.rules_executed(),
            warnings = report.warning_count(),
            "constructed instance"
        );
        Ok(Construction { instance, report })
    }
}

/// State of one construction: everything is written to `delta` until the
/// pass succeeds.
struct Pass<'p, I> {
    interpreter: &'p I,
    guard: CycleGuard,
    relation: &'p Term,
    ontology: Ontology<'p>,
    index: &'p RuleIndex,
    rdf_type: Term,
    delta: Graph,
    minter: BlankNodeMinter,
    report: ConstructionReport,
}

impl<I: CommandInterpreter> Pass<'_, I> {
    fn instantiate(
        &mut self,
        for_class: &Term,
        instance: &Term,
        reached: &mut ReachedTypes,
    ) -> Result<(), ConstructionError> {
        let entered = reached.insert(for_class.clone());
        let result = self.expand(for_class, instance, reached);
        if self.guard == CycleGuard::Path && entered {
            reached.remove(for_class);
        }
        result
    }

    fn expand(
        &mut self,
        for_class: &Term,
        instance: &Term,
        reached: &mut ReachedTypes,
    ) -> Result<(), ConstructionError> {
        let ontology = self.ontology;
        let index = self.index;
        let interpreter = self.interpreter;
        if index.resolve(&ontology, for_class).is_none() {
            tracing::error!(
                class = %for_class,
                relation = %self.relation,
                "no construction rule in the class or its ancestors"
            );
            return Err(ConstructionError::Configuration {
                relation: self.relation.clone(),
                class: for_class.clone(),
            });
        }

        for rule in index.inherited(&ontology, for_class) {
            let produced = interpreter
                .execute(&rule.command, instance, ontology.graph(), &mut self.minter)
                .map_err(|source| ConstructionError::Command {
                    class: rule.class.clone(),
                    command: rule.command.node.clone(),
                    source,
                })?;
            tracing::debug!(
                class = %for_class,
                rule_class = %rule.class,
                triples = produced.len(),
                "executed construction rule"
            );
            let message = format!(
                "rule {} of {} produced {} triple(s)",
                rule.command.node,
                rule.class,
                produced.len()
            );
            for triple in produced {
                self.delta.insert(triple);
            }
            self.record(
                EntryKind::RuleExecuted {
                    rule_class: rule.class.clone(),
                },
                for_class,
                instance,
                message,
            );
        }

        self.delta
            .add(instance.clone(), self.rdf_type.clone(), for_class.clone());

        for node in ontology.ancestors(for_class) {
            let restriction = match ontology.all_values_from(node) {
                None => continue,
                Some(Ok(restriction)) => restriction,
                Some(Err(defect)) => {
                    tracing::warn!(
                        class = %for_class,
                        restriction = %node,
                        %defect,
                        "skipping unresolvable restriction"
                    );
                    self.record(
                        EntryKind::RestrictionSkipped,
                        for_class,
                        instance,
                        format!("restriction {node} skipped: {defect}"),
                    );
                    continue;
                }
            };
            let value_class = restriction.value_class;
            if value_class == for_class {
                self.record(
                    EntryKind::SelfReference,
                    for_class,
                    instance,
                    format!("{} refers back to {for_class}", restriction.property),
                );
                continue;
            }
            if reached.contains(value_class) {
                tracing::debug!(
                    class = %for_class,
                    value_class = %value_class,
                    "value class already reached; not expanded"
                );
                self.record(
                    EntryKind::CycleGuardTrip,
                    for_class,
                    instance,
                    format!("{value_class} already reached via {}", restriction.property),
                );
                continue;
            }

            let sub = self.minter.mint();
            self.delta
                .add(sub.clone(), self.rdf_type.clone(), value_class.clone());
            self.delta
                .add(instance.clone(), restriction.property.clone(), sub.clone());
            for inverse in ontology.inverses_of(restriction.property) {
                self.delta.add(sub.clone(), inverse.clone(), instance.clone());
            }
            tracing::debug!(
                class = %for_class,
                property = %restriction.property,
                value_class = %value_class,
                sub_instance = %sub,
                "expanding restriction"
            );
            self.instantiate(value_class, &sub, reached)?;
        }
        Ok(())
    }

    fn record(&mut self, kind: EntryKind, class: &Term, instance: &Term, message: String) {
        self.report.push(ReportEntry {
            kind,
            class: class.clone(),
            instance: instance.clone(),
            message,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CommandError;
    use crate::index::Command;
    use ldc_model::Triple;

    fn ex(s: &str) -> Term {
        Term::iri(format!("http://ex.org/{s}"))
    }

    /// Emits `?this ex:touched ex:yes` for every rule.
    struct Marker;

    impl CommandInterpreter for Marker {
        fn execute(
            &self,
            _command: &Command,
            this: &Term,
            _model: &Graph,
            _minter: &mut BlankNodeMinter,
        ) -> Result<Vec<Triple>, CommandError> {
            Ok(vec![Triple::new(this.clone(), ex("touched"), ex("yes"))])
        }
    }

    struct Failing;

    impl CommandInterpreter for Failing {
        fn execute(
            &self,
            _command: &Command,
            _this: &Term,
            _model: &Graph,
            _minter: &mut BlankNodeMinter,
        ) -> Result<Vec<Triple>, CommandError> {
            Err(CommandError::Unsupported("anything".to_owned()))
        }
    }

    fn with_rule(g: &mut Graph, class: &str) {
        g.add(ex(class), Term::iri(vocab::SPIN_CONSTRUCTOR), Term::string("rule"));
    }

    #[test]
    fn reached_types_basics() {
        let mut reached = ReachedTypes::new();
        assert!(reached.insert(ex("A")));
        assert!(!reached.insert(ex("A")));
        assert!(reached.contains(&ex("A")));
        assert_eq!(reached.iter().count(), 1);
        assert!(reached.remove(&ex("A")));
        assert!(reached.is_empty());
    }

    #[test]
    fn custom_interpreter_output_lands_in_target() {
        let mut g = Graph::new();
        with_rule(&mut g, "A");
        let constructor = Constructor::with_interpreter(ConstructorConfig::default(), Marker);
        let mut target = Graph::new();
        let built = constructor.construct(&g, &ex("A"), &mut target);
        let instance = built.map(|c| c.instance).unwrap_or_else(|_| Term::blank("none"));
        assert_eq!(instance, Term::blank("b1"));
        assert!(target.has(&instance, &ex("touched"), &ex("yes")));
        assert!(target.has(&instance, &Term::iri(vocab::RDF_TYPE), &ex("A")));
    }

    #[test]
    fn command_errors_name_the_rule_class() {
        let mut g = Graph::new();
        with_rule(&mut g, "A");
        g.add(ex("B"), Term::iri(vocab::RDFS_SUBCLASS_OF), ex("A"));
        let constructor = Constructor::with_interpreter(ConstructorConfig::default(), Failing);
        let mut target = Graph::new();
        let err = constructor.construct(&g, &ex("B"), &mut target).err();
        assert!(matches!(
            err,
            Some(ConstructionError::Command { ref class, .. }) if *class == ex("A")
        ));
        assert!(target.is_empty());
    }

    #[test]
    fn path_mode_releases_classes_after_their_subtree() {
        let mut g = Graph::new();
        g.add(ex("A"), Term::iri(vocab::SPIN_CONSTRUCTOR), Term::string("CONSTRUCT { }"));
        let relation = Term::iri(vocab::SPIN_CONSTRUCTOR);
        for (guard, expected) in [(CycleGuard::Tree, 1), (CycleGuard::Path, 0)] {
            let constructor = Constructor::new(ConstructorConfig {
                cycle_guard: guard,
                ..ConstructorConfig::default()
            });
            let mut reached = ReachedTypes::new();
            let mut target = Graph::new();
            let result = constructor.add_instance(
                &g,
                &ex("A"),
                &relation,
                ex("a1"),
                &mut target,
                &mut reached,
            );
            assert!(result.is_ok());
            assert_eq!(reached.len(), expected);
        }
    }

    #[test]
    fn seeded_classes_stay_in_path_mode() {
        let mut g = Graph::new();
        g.add(ex("A"), Term::iri(vocab::SPIN_CONSTRUCTOR), Term::string("CONSTRUCT { }"));
        let constructor = Constructor::new(ConstructorConfig {
            cycle_guard: CycleGuard::Path,
            ..ConstructorConfig::default()
        });
        let mut reached = ReachedTypes::new();
        reached.insert(ex("A"));
        let mut target = Graph::new();
        let result = constructor.add_instance(
            &g,
            &ex("A"),
            &Term::iri(vocab::SPIN_CONSTRUCTOR),
            ex("a1"),
            &mut target,
            &mut reached,
        );
        assert!(result.is_ok());
        assert!(reached.contains(&ex("A")));
    }
}
