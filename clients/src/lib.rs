//! Shared plumbing for the `ldc-*` binaries: logging, input loading and
//! output rendering.

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use clap::ValueEnum;
use ldc_constructor::ConstructorConfig;
use ldc_model::serializer::{jsonld, ntriples, turtle};
use ldc_model::{Graph, PrefixMap, Term};

/// Output serialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// N-Triples.
    Nt,
    /// Turtle, compacted with the configured prefixes.
    Turtle,
    /// Flattened JSON-LD.
    Jsonld,
}

/// Installs the stderr log subscriber.
///
/// `--quiet` silences everything; otherwise `RUST_LOG` wins when set, and
/// the fallback level is `debug` with `--verbose` and `warn` without.
pub fn init_logging(verbose: bool, quiet: bool) {
    let filter = if quiet {
        tracing_subscriber::EnvFilter::new("off")
    } else {
        let fallback = if verbose { "debug" } else { "warn" };
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(fallback))
    };
    let ansi = std::env::var_os("NO_COLOR").is_none();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(ansi)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

/// Reads and parses a Turtle ontology file.
///
/// # Errors
///
/// Fails if the file cannot be read or is not valid Turtle.
pub fn load_ontology(path: &Path) -> Result<Graph> {
    let src = fs::read_to_string(path)
        .with_context(|| format!("Failed to read ontology: {}", path.display()))?;
    let graph = ldc_model::parser::parse_turtle(&src)
        .with_context(|| format!("Failed to parse ontology: {}", path.display()))?;
    tracing::info!(path = %path.display(), triples = graph.len(), "loaded ontology");
    Ok(graph)
}

/// Loads the constructor configuration, or the defaults when no path is given.
///
/// # Errors
///
/// Fails if the file cannot be read or holds an invalid configuration.
pub fn load_config(path: Option<&Path>) -> Result<ConstructorConfig> {
    let Some(path) = path else {
        return Ok(ConstructorConfig::default());
    };
    let src = fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration: {}", path.display()))?;
    ConstructorConfig::from_toml_str(&src)
        .with_context(|| format!("Invalid configuration: {}", path.display()))
}

/// Applies `name=namespace` bindings from the command line to `config`.
///
/// # Errors
///
/// Fails on a binding without `=`.
pub fn apply_prefixes(config: &mut ConstructorConfig, bindings: &[String]) -> Result<()> {
    for binding in bindings {
        let (prefix, namespace) = binding
            .split_once('=')
            .with_context(|| format!("Prefix binding must be NAME=NAMESPACE, got '{binding}'"))?;
        config
            .prefixes
            .insert(prefix.to_owned(), namespace.to_owned());
    }
    Ok(())
}

/// Turns a command-line resource name into a term: `_:label` is a blank
/// node, `<iri>` and known CURIEs are IRIs, anything else is taken as an IRI.
#[must_use]
pub fn resource(name: &str, prefixes: &PrefixMap) -> Term {
    match name.strip_prefix("_:") {
        Some(label) => Term::blank(label),
        None => Term::iri(prefixes.resolve(name)),
    }
}

/// Serializes `graph` in `format`.
///
/// # Errors
///
/// Fails only if JSON-LD output cannot be encoded.
pub fn render(graph: &Graph, prefixes: &PrefixMap, format: OutputFormat) -> Result<String> {
    let text = match format {
        OutputFormat::Nt => ntriples::to_ntriples(graph),
        OutputFormat::Turtle => turtle::to_turtle(graph, prefixes),
        OutputFormat::Jsonld => serde_json::to_string_pretty(&jsonld::to_json_ld(graph, prefixes))
            .context("Failed to serialize graph to JSON-LD")?,
    };
    Ok(text)
}
