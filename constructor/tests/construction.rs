//! End-to-end construction over Turtle ontologies.

use std::sync::Arc;
use std::thread;

use ldc_constructor::{
    CommandError, ConstructionError, Constructor, ConstructorConfig, CycleGuard, EntryKind,
    ReachedTypes,
};
use ldc_model::parser::parse_turtle;
use ldc_model::{vocab, Graph, Literal, Term, Triple};

const EX: &str = "http://example.org/";

const PROLOGUE: &str = "\
@prefix : <http://example.org/> .
@prefix owl: <http://www.w3.org/2002/07/owl#> .
@prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .
@prefix sp: <http://spinrdf.org/sp#> .
@prefix spin: <http://spinrdf.org/spin#> .
";

fn ex(local: &str) -> Term {
    Term::iri(format!("{EX}{local}"))
}

fn rdf_type() -> Term {
    Term::iri(vocab::RDF_TYPE)
}

fn relation() -> Term {
    Term::iri(vocab::SPIN_CONSTRUCTOR)
}

fn yes() -> Term {
    Term::Literal(Literal::typed("true", vocab::XSD_BOOLEAN))
}

fn ontology(body: &str) -> Graph {
    parse_turtle(&format!("{PROLOGUE}{body}")).expect("test ontology is valid Turtle")
}

fn config(guard: CycleGuard) -> ConstructorConfig {
    let mut config = ConstructorConfig {
        cycle_guard: guard,
        ..ConstructorConfig::default()
    };
    config.prefixes.insert(String::new(), EX.to_owned());
    config
}

fn constructor() -> Constructor {
    Constructor::new(config(CycleGuard::Tree))
}

/// Instances typed `class` in `graph`.
fn instances_of<'g>(graph: &'g Graph, class: &Term) -> Vec<&'g Term> {
    graph.subjects(&rdf_type(), class).collect()
}

const PERSON_ADDRESS: &str = r#"
:Person a owl:Class ;
    rdfs:subClassOf [ a owl:Restriction ; owl:onProperty :hasAddress ; owl:allValuesFrom :Address ] ;
    spin:constructor [ a sp:Construct ; sp:text "CONSTRUCT { }" ] .
:Address a owl:Class ;
    spin:constructor [ a sp:Construct ; sp:text "CONSTRUCT { }" ] .
:hasAddress a owl:ObjectProperty ; owl:inverseOf :addressOf .
"#;

#[test]
fn person_with_address() {
    let onto = ontology(PERSON_ADDRESS);
    let mut target = Graph::new();
    let mut reached = ReachedTypes::new();
    let built = constructor()
        .add_instance(&onto, &ex("Person"), &relation(), ex("p1"), &mut target, &mut reached)
        .expect("construction succeeds");

    let address = Term::blank("b1");
    let expected = [
        Triple::new(ex("p1"), rdf_type(), ex("Person")),
        Triple::new(ex("p1"), ex("hasAddress"), address.clone()),
        Triple::new(address.clone(), rdf_type(), ex("Address")),
        Triple::new(address.clone(), ex("addressOf"), ex("p1")),
    ];
    assert_eq!(target.len(), expected.len());
    for triple in &expected {
        assert!(target.contains(triple), "missing {triple}");
    }
    assert_eq!(built.instance, ex("p1"));
    assert_eq!(built.report.new_resources, vec![address]);
    assert_eq!(built.report.rules_executed(), 2);
    assert!(reached.contains(&ex("Address")));
}

#[test]
fn person_with_address_from_typing_rules() {
    let onto = ontology(
        r#"
:Person a owl:Class ;
    rdfs:subClassOf [ a owl:Restriction ; owl:onProperty :hasAddress ; owl:allValuesFrom :Address ] ;
    spin:constructor [ a sp:Construct ; sp:text "CONSTRUCT { ?this a :Person }" ] .
:Address a owl:Class ;
    spin:constructor [ a sp:Construct ; sp:text "CONSTRUCT { ?this a :Address }" ] .
:hasAddress a owl:ObjectProperty ; owl:inverseOf :addressOf .
"#,
    );
    let mut target = Graph::new();
    let built = constructor()
        .add_instance(
            &onto,
            &ex("Person"),
            &relation(),
            ex("p1"),
            &mut target,
            &mut ReachedTypes::new(),
        )
        .expect("construction succeeds");

    let address = Term::blank("b1");
    let expected = [
        Triple::new(ex("p1"), rdf_type(), ex("Person")),
        Triple::new(ex("p1"), ex("hasAddress"), address.clone()),
        Triple::new(address.clone(), rdf_type(), ex("Address")),
        Triple::new(address.clone(), ex("addressOf"), ex("p1")),
    ];
    assert_eq!(target.len(), expected.len());
    for triple in &expected {
        assert!(target.contains(triple), "missing {triple}");
    }
    assert_eq!(built.report.rules_executed(), 2);
}

#[test]
fn missing_rule_is_a_configuration_error() {
    let onto = ontology(":X rdfs:subClassOf :Y .\n:Y a owl:Class .\n");
    let mut target = Graph::new();
    target.add(ex("existing"), ex("p"), ex("o"));
    let err = constructor()
        .construct(&onto, &ex("X"), &mut target)
        .expect_err("no rule anywhere");

    assert!(err.is_configuration());
    let message = err.to_string();
    assert!(message.contains(vocab::SPIN_CONSTRUCTOR), "{message}");
    assert!(message.contains("http://example.org/X"), "{message}");
    assert_eq!(target.len(), 1);
}

#[test]
fn missing_rule_deep_in_the_recursion_aborts_everything() {
    let onto = ontology(
        r#"
:Car a owl:Class ;
    rdfs:subClassOf [ owl:onProperty :engine ; owl:allValuesFrom :Engine ] ;
    spin:constructor [ sp:text "CONSTRUCT { ?this :wheels 4 }" ] .
:Engine a owl:Class .
"#,
    );
    let mut target = Graph::new();
    let err = constructor()
        .construct(&onto, &ex("Car"), &mut target)
        .expect_err("engine has no rule");
    assert!(matches!(
        err,
        ConstructionError::Configuration { ref class, .. } if *class == ex("Engine")
    ));
    assert!(target.is_empty());
}

#[test]
fn rules_are_inherited_from_ancestors() {
    let onto = ontology(
        r#"
:Animal a owl:Class ;
    spin:constructor [ sp:text "CONSTRUCT { ?this :source :Animal }" ] .
:Mammal rdfs:subClassOf :Animal .
:Dog rdfs:subClassOf :Mammal .
"#,
    );
    let mut target = Graph::new();
    let built = constructor()
        .construct(&onto, &ex("Dog"), &mut target)
        .expect("inherited rule");
    assert!(target.has(&built.instance, &ex("source"), &ex("Animal")));
    assert!(target.has(&built.instance, &rdf_type(), &ex("Dog")));
    assert_eq!(
        built.report.count(&EntryKind::RuleExecuted {
            rule_class: ex("Animal")
        }),
        1
    );
}

#[test]
fn superclass_rules_run_before_the_class_rules() {
    let onto = ontology(
        r#"
:Agent a owl:Class ;
    spin:constructor [ sp:text "CONSTRUCT { ?this :agentPart true }" ] .
:Person a owl:Class ;
    rdfs:subClassOf :Agent ;
    spin:constructor [ sp:text "CONSTRUCT { ?this :personPart true }" ] .
"#,
    );
    let mut target = Graph::new();
    let built = constructor()
        .construct(&onto, &ex("Person"), &mut target)
        .expect("both levels have rules");
    assert!(target.has(&built.instance, &ex("agentPart"), &yes()));
    assert!(target.has(&built.instance, &ex("personPart"), &yes()));
    assert!(target.has(&built.instance, &rdf_type(), &ex("Person")));
    assert_eq!(target.len(), 3);

    let order: Vec<&Term> = built
        .report
        .entries
        .iter()
        .filter_map(|entry| match &entry.kind {
            EntryKind::RuleExecuted { rule_class } => Some(rule_class),
            _ => None,
        })
        .collect();
    assert_eq!(order, vec![&ex("Agent"), &ex("Person")]);
}

#[test]
fn shared_superclass_rules_run_once() {
    let onto = ontology(
        r#"
:Thing a owl:Class ;
    spin:constructor [ sp:text "CONSTRUCT { ?this :thingPart true }" ] .
:Left rdfs:subClassOf :Thing .
:Right rdfs:subClassOf :Thing .
:Both rdfs:subClassOf :Left , :Right .
"#,
    );
    let mut target = Graph::new();
    let built = constructor()
        .construct(&onto, &ex("Both"), &mut target)
        .expect("diamond hierarchy");
    assert_eq!(built.report.rules_executed(), 1);
    assert!(target.has(&built.instance, &ex("thingPart"), &yes()));
}

#[test]
fn self_referencing_restriction_adds_no_edge() {
    let onto = ontology(
        r#"
:Node a owl:Class ;
    rdfs:subClassOf [ owl:onProperty :next ; owl:allValuesFrom :Node ] ;
    spin:constructor [ sp:text "CONSTRUCT { }" ] .
"#,
    );
    let mut target = Graph::new();
    let built = constructor()
        .construct(&onto, &ex("Node"), &mut target)
        .expect("self reference is skipped");
    assert_eq!(target.matching(None, Some(&ex("next")), None).count(), 0);
    assert_eq!(target.len(), 1);
    assert_eq!(built.report.count(&EntryKind::SelfReference), 1);
}

const CYCLE: &str = r#"
:A a owl:Class ;
    rdfs:subClassOf [ owl:onProperty :toB ; owl:allValuesFrom :B ] ;
    spin:constructor [ sp:text "CONSTRUCT { }" ] .
:B a owl:Class ;
    rdfs:subClassOf [ owl:onProperty :toA ; owl:allValuesFrom :A ] ;
    spin:constructor [ sp:text "CONSTRUCT { }" ] .
"#;

#[test]
fn restriction_cycles_terminate() {
    let onto = ontology(CYCLE);
    for guard in [CycleGuard::Tree, CycleGuard::Path] {
        let mut target = Graph::new();
        let built = Constructor::new(config(guard))
            .construct(&onto, &ex("A"), &mut target)
            .expect("cycle is cut");
        assert_eq!(instances_of(&target, &ex("A")).len(), 1);
        assert_eq!(instances_of(&target, &ex("B")).len(), 1);
        assert_eq!(target.matching(None, Some(&ex("toA")), None).count(), 0);
        assert_eq!(built.report.count(&EntryKind::CycleGuardTrip), 1);
    }
}

const TWO_PATHS: &str = r#"
:Trip a owl:Class ;
    rdfs:subClassOf [ owl:onProperty :origin ; owl:allValuesFrom :Place ] ,
                    [ owl:onProperty :destination ; owl:allValuesFrom :Place ] ;
    spin:constructor [ sp:text "CONSTRUCT { }" ] .
:Place a owl:Class ;
    spin:constructor [ sp:text "CONSTRUCT { ?this :named false }" ] .
"#;

#[test]
fn tree_guard_expands_a_class_once_per_construction() {
    let onto = ontology(TWO_PATHS);
    let mut target = Graph::new();
    let built = constructor()
        .construct(&onto, &ex("Trip"), &mut target)
        .expect("tree guard");
    assert_eq!(instances_of(&target, &ex("Place")).len(), 1);
    assert!(target.object(&built.instance, &ex("origin")).is_some());
    assert!(target.object(&built.instance, &ex("destination")).is_none());
    assert_eq!(built.report.count(&EntryKind::CycleGuardTrip), 1);
}

#[test]
fn path_guard_expands_sibling_restrictions() {
    let onto = ontology(TWO_PATHS);
    let mut target = Graph::new();
    let built = Constructor::new(config(CycleGuard::Path))
        .construct(&onto, &ex("Trip"), &mut target)
        .expect("path guard");
    assert_eq!(instances_of(&target, &ex("Place")).len(), 2);
    let origin = target.object(&built.instance, &ex("origin"));
    let destination = target.object(&built.instance, &ex("destination"));
    assert!(origin.is_some() && destination.is_some());
    assert_ne!(origin, destination);
    assert!(built.report.is_clean());
}

#[test]
fn malformed_restrictions_are_skipped_with_a_warning() {
    let onto = ontology(
        r#"
:Order a owl:Class ;
    rdfs:subClassOf [ owl:allValuesFrom :Item ] ,
                    [ owl:onProperty :customer ; owl:allValuesFrom "literal" ] ,
                    [ owl:onProperty :item ; owl:allValuesFrom :Item ] ;
    spin:constructor [ sp:text "CONSTRUCT { }" ] .
:Item a owl:Class ;
    spin:constructor [ sp:text "CONSTRUCT { }" ] .
"#,
    );
    let mut target = Graph::new();
    let built = constructor()
        .construct(&onto, &ex("Order"), &mut target)
        .expect("malformed restrictions are not fatal");
    assert_eq!(built.report.warning_count(), 2);
    assert!(target.object(&built.instance, &ex("item")).is_some());
    assert!(target.object(&built.instance, &ex("customer")).is_none());
}

#[test]
fn rule_output_uses_fresh_blank_nodes_and_prefixes() {
    let onto = ontology(
        r#"
:Team a owl:Class ;
    spin:constructor [ sp:text "CONSTRUCT { ?this :coach _:c . _:c a :Coach ; rdfs:label 'coach'@en }" ] .
"#,
    );
    let mut target = Graph::new();
    target.add(Term::blank("b1"), ex("taken"), Term::blank("b2"));
    let built = constructor()
        .construct(&onto, &ex("Team"), &mut target)
        .expect("construction succeeds");
    assert_eq!(built.instance, Term::blank("b3"));
    let coach = target
        .object(&built.instance, &ex("coach"))
        .cloned()
        .expect("coach edge");
    assert_eq!(coach, Term::blank("b4"));
    assert!(target.has(&coach, &rdf_type(), &ex("Coach")));
    assert_eq!(
        built.report.new_resources,
        vec![Term::blank("b3"), Term::blank("b4")]
    );
}

#[test]
fn command_failures_leave_the_target_untouched() {
    let onto = ontology(
        r#"
:Report a owl:Class ;
    spin:constructor [ sp:text "CONSTRUCT { ?this :p ?o } WHERE { ?this :q ?o }" ] .
"#,
    );
    let mut target = Graph::new();
    let err = constructor()
        .construct(&onto, &ex("Report"), &mut target)
        .expect_err("WHERE patterns are rejected");
    assert!(matches!(
        err,
        ConstructionError::Command {
            source: CommandError::Unsupported(_),
            ..
        }
    ));
    assert!(target.is_empty());
}

#[test]
fn the_ontology_is_never_modified() {
    let onto = ontology(&format!(
        "{PERSON_ADDRESS}\n[] sp:text \"CONSTRUCT {{ }}\" ; rdfs:comment \"stripped from the working copy only\" ."
    ));
    let before: Vec<Triple> = onto.iter().cloned().collect();
    let mut target = Graph::new();
    constructor()
        .construct(&onto, &ex("Person"), &mut target)
        .expect("construction succeeds");
    let after: Vec<Triple> = onto.iter().cloned().collect();
    assert_eq!(before, after);
}

#[test]
fn rule_relation_is_chosen_per_call() {
    let onto = ontology(
        r#"
:Widget a owl:Class ;
    :factory [ sp:text "CONSTRUCT { ?this :made :byFactory }" ] .
"#,
    );
    let ctor = constructor();
    let mut target = Graph::new();
    let err = ctor.construct(&onto, &ex("Widget"), &mut target).err();
    assert!(err.is_some_and(|e| e.is_configuration()));

    let built = ctor
        .add_instance(
            &onto,
            &ex("Widget"),
            &ex("factory"),
            ex("w1"),
            &mut target,
            &mut ReachedTypes::new(),
        )
        .expect("factory relation has a rule");
    assert!(target.has(&built.instance, &ex("made"), &ex("byFactory")));
}

#[test]
fn concurrent_constructions_share_one_ontology() {
    let onto = Arc::new(ontology(PERSON_ADDRESS));
    let ctor = constructor();
    let graphs: Vec<Graph> = thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let onto = Arc::clone(&onto);
                let ctor = &ctor;
                scope.spawn(move || {
                    let mut target = Graph::new();
                    ctor.add_instance(
                        &onto,
                        &ex("Person"),
                        &relation(),
                        ex(&format!("p{i}")),
                        &mut target,
                        &mut ReachedTypes::new(),
                    )
                    .expect("construction succeeds");
                    target
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().expect("thread completes"))
            .collect()
    });
    for (i, graph) in graphs.iter().enumerate() {
        assert_eq!(graph.len(), 4);
        assert!(graph.has(&ex(&format!("p{i}")), &rdf_type(), &ex("Person")));
    }
}
