//! `ldc-inspect`: lists the construction rules and restrictions of an
//! ontology, checking every rule command with the template interpreter.
//!
//! **Usage:**
//! ```
//! ldc-inspect <ontology.ttl> [--config <path>] [--prefix NAME=NS]...
//! ```
//!
//! Exits non-zero if any rule command would be rejected.

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

use std::path::PathBuf;
use std::process;

use anyhow::Result;
use clap::Parser;
use ldc_clients::{apply_prefixes, init_logging, load_config, load_ontology};
use ldc_constructor::{normalize, RuleIndex, TemplateInterpreter};
use ldc_model::{Ontology, PrefixMap, Term};

/// Inspect the construction rules of an ontology.
#[derive(Parser)]
#[command(name = "ldc-inspect", about = "Inspect the construction rules of an ontology")]
struct Args {
    /// Turtle file holding the ontology and its construction rules.
    ontology: PathBuf,

    /// Constructor configuration (TOML).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Additional prefix binding, NAME=NAMESPACE. May be repeated.
    #[arg(long = "prefix")]
    prefixes: Vec<String>,

    /// Log debug output (overridden by RUST_LOG).
    #[arg(short, long)]
    verbose: bool,
}

fn name(term: &Term, prefixes: &PrefixMap) -> String {
    term.as_iri()
        .and_then(|iri| prefixes.compact(iri))
        .unwrap_or_else(|| term.to_string())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose, false);

    let mut config = load_config(args.config.as_deref())?;
    apply_prefixes(&mut config, &args.prefixes)?;
    let prefixes = config.prefix_map();
    let ontology = load_ontology(&args.ontology)?;

    let command_text = config.command_text_term();
    let working = normalize(&ontology, &command_text);
    let index = RuleIndex::build(&working, &config.rule_relation_term(), &command_text);
    let interpreter = TemplateInterpreter::from_config(&config);
    let view = Ontology::new(&working);

    println!("Construction Rules ({})", name(&config.rule_relation_term(), &prefixes));
    println!("==================");
    println!();

    let mut failed = 0usize;
    for class in index.classes() {
        println!("{}", name(class, &prefixes));
        for rule in index.rules_for(class) {
            match interpreter.check(&rule.command.text) {
                Ok(count) => println!("  [OK]   {} ({} template triple(s))", rule.command.node, count),
                Err(err) => {
                    failed += 1;
                    println!("  [FAIL] {}: {}", rule.command.node, err);
                }
            }
        }
    }

    println!();
    println!("Classes");
    println!("=======");
    println!();

    let mut unruled = 0usize;
    for class in view.classes() {
        let mut sources: Vec<&Term> = Vec::new();
        for rule in index.inherited(&view, class) {
            if !sources.contains(&&rule.class) {
                sources.push(&rule.class);
            }
        }
        let rules = if sources.is_empty() {
            unruled += 1;
            "NO RULES".to_owned()
        } else {
            let names: Vec<String> = sources.iter().map(|c| name(c, &prefixes)).collect();
            format!("runs rules of {}", names.join(", "))
        };
        println!("{}: {}", name(class, &prefixes), rules);
        for node in view.ancestors(class) {
            match view.all_values_from(node) {
                Some(Ok(restriction)) => println!(
                    "    {} only {}",
                    name(restriction.property, &prefixes),
                    name(restriction.value_class, &prefixes)
                ),
                Some(Err(defect)) => println!("    [WARN] restriction {node}: {defect}"),
                None => {}
            }
        }
    }

    println!();
    println!(
        "Summary: {} rule class(es), {} class(es) without rules, {} rejected command(s)",
        index.len(),
        unruled,
        failed
    );

    if failed > 0 {
        eprintln!("Inspection FAILED: {} command(s) would be rejected.", failed);
        process::exit(1);
    }
    Ok(())
}
