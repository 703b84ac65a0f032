//! `ldc-construct`: builds an instance of an ontology class and writes the
//! resulting graph.
//!
//! **Usage:**
//! ```
//! ldc-construct <ontology.ttl> --class <CURIE|IRI> [--instance <CURIE|IRI|_:label>]
//!               [--relation <CURIE|IRI>] [--config <path>] [--prefix NAME=NS]...
//!               [--format nt|turtle|jsonld] [--out <path>] [--report]
//! ```
//!
//! Exits non-zero if the construction fails; nothing is written in that case.

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use ldc_clients::{
    apply_prefixes, init_logging, load_config, load_ontology, render, resource, OutputFormat,
};
use ldc_constructor::{BlankNodeMinter, Constructor, ReachedTypes, Severity};
use ldc_model::Graph;

/// Construct an instance of an ontology class.
#[derive(Parser)]
#[command(name = "ldc-construct", about = "Construct an instance of an ontology class")]
struct Args {
    /// Turtle file holding the ontology and its construction rules.
    ontology: PathBuf,

    /// Class to instantiate.
    #[arg(long)]
    class: String,

    /// Existing resource to make an instance of the class (default: a fresh blank node).
    #[arg(long)]
    instance: Option<String>,

    /// Rule relation to use instead of the configured one.
    #[arg(long)]
    relation: Option<String>,

    /// Constructor configuration (TOML).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Additional prefix binding, NAME=NAMESPACE. May be repeated.
    #[arg(long = "prefix")]
    prefixes: Vec<String>,

    /// Output format.
    #[arg(long, value_enum, default_value = "turtle")]
    format: OutputFormat,

    /// Output file (default: standard output).
    #[arg(long)]
    out: Option<PathBuf>,

    /// Print the construction report to standard error.
    #[arg(long)]
    report: bool,

    /// Log debug output (overridden by RUST_LOG).
    #[arg(short, long)]
    verbose: bool,

    /// Silence all logging.
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose, args.quiet);

    let mut config = load_config(args.config.as_deref())?;
    apply_prefixes(&mut config, &args.prefixes)?;
    let prefixes = config.prefix_map();
    let ontology = load_ontology(&args.ontology)?;

    let class = resource(&args.class, &prefixes);
    let constructor = Constructor::new(config);

    let mut target = Graph::new();
    let construction = match (&args.instance, &args.relation) {
        (None, None) => constructor.construct(&ontology, &class, &mut target),
        (instance, relation) => {
            let relation = match relation {
                Some(name) => resource(name, &prefixes),
                None => constructor.config().rule_relation_term(),
            };
            let instance = match instance {
                Some(name) => resource(name, &prefixes),
                None => BlankNodeMinter::new(constructor.config().blank_node_prefix.as_str()).mint(),
            };
            constructor.add_instance(
                &ontology,
                &class,
                &relation,
                instance,
                &mut target,
                &mut ReachedTypes::new(),
            )
        }
    }
    .with_context(|| format!("Failed to construct an instance of {class}"))?;

    if args.report {
        eprintln!("Construction Report for {}", construction.instance);
        eprintln!("==========================");
        for entry in &construction.report.entries {
            let status = match entry.severity() {
                Severity::Info => "INFO",
                Severity::Warning => "WARN",
            };
            eprintln!("[{}] {} {}: {}", status, entry.class, entry.instance, entry.message);
        }
        eprintln!();
        eprintln!(
            "Summary: {} rule(s) executed, {} new resource(s), {} warning(s), {} triple(s)",
            construction.report.rules_executed(),
            construction.report.new_resources.len(),
            construction.report.warning_count(),
            target.len()
        );
    }

    let text = render(&target, &prefixes, args.format)?;
    match &args.out {
        Some(path) => {
            fs::write(path, &text)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("  Written: {}", path.display());
        }
        None => print!("{text}"),
    }
    Ok(())
}
