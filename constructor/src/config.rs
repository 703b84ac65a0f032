//! Constructor configuration, loadable from TOML.
//!
//! ```toml
//! rule_relation = "http://spinrdf.org/spin#constructor"
//! command_text = "http://spinrdf.org/sp#text"
//! cycle_guard = "tree"
//! blank_node_prefix = "b"
//!
//! [prefixes]
//! ex = "http://example.org/"
//! ```

use std::collections::BTreeMap;

use ldc_model::{vocab, PrefixMap, Term};
use serde::Deserialize;

/// How [`ReachedTypes`](crate::ReachedTypes) is maintained during a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CycleGuard {
    /// A class entered anywhere in the construction tree is never expanded again.
    #[default]
    Tree,
    /// A class blocks re-expansion only among its own descendants; it leaves
    /// the set once its subtree is complete.
    Path,
}

/// Settings shared by every construction a [`Constructor`](crate::Constructor) runs.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConstructorConfig {
    /// IRI of the class → rule relation used by [`construct`](crate::Constructor::construct).
    pub rule_relation: String,
    /// IRI of the predicate carrying a rule's command text.
    pub command_text: String,
    /// Cycle guard discipline.
    pub cycle_guard: CycleGuard,
    /// Label prefix for minted blank nodes (`b` yields `_:b1`, `_:b2`, ...).
    pub blank_node_prefix: String,
    /// Prefixes available to rule commands and CURIE expansion, on top of the
    /// standard `rdf`, `rdfs`, `owl`, `xsd`, `sp` and `spin` bindings.
    pub prefixes: BTreeMap<String, String>,
}

impl Default for ConstructorConfig {
    fn default() -> Self {
        Self {
            rule_relation: vocab::SPIN_CONSTRUCTOR.to_owned(),
            command_text: vocab::SP_TEXT.to_owned(),
            cycle_guard: CycleGuard::default(),
            blank_node_prefix: "b".to_owned(),
            prefixes: BTreeMap::new(),
        }
    }
}

/// Errors raised while loading a [`ConstructorConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The TOML document is malformed or has unknown keys.
    #[error("invalid constructor configuration: {0}")]
    Toml(#[from] toml::de::Error),
    /// A field that must hold an IRI is empty.
    #[error("configuration field '{0}' must be a non-empty IRI")]
    EmptyIri(&'static str),
    /// The blank-node prefix is not a valid blank node label start.
    #[error("blank_node_prefix '{0}' must start with an ASCII letter and contain only letters, digits or '_'")]
    BlankNodePrefix(String),
}

impl ConstructorConfig {
    /// Parses and validates a TOML document. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the document is malformed or a value is invalid.
    pub fn from_toml_str(src: &str) -> Result<Self, ConfigError> {
        let config: ConstructorConfig = toml::from_str(src)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks field values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] naming the first invalid field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rule_relation.trim().is_empty() {
            return Err(ConfigError::EmptyIri("rule_relation"));
        }
        if self.command_text.trim().is_empty() {
            return Err(ConfigError::EmptyIri("command_text"));
        }
        let mut chars = self.blank_node_prefix.chars();
        let valid = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
            && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !valid {
            return Err(ConfigError::BlankNodePrefix(
                self.blank_node_prefix.clone(),
            ));
        }
        Ok(())
    }

    /// The rule relation as a term.
    #[must_use]
    pub fn rule_relation_term(&self) -> Term {
        Term::iri(&self.rule_relation)
    }

    /// The command-text predicate as a term.
    #[must_use]
    pub fn command_text_term(&self) -> Term {
        Term::iri(&self.command_text)
    }

    /// Standard prefixes extended with the configured ones.
    #[must_use]
    pub fn prefix_map(&self) -> PrefixMap {
        let mut map = PrefixMap::standard();
        for (prefix, namespace) in &self.prefixes {
            map.insert(prefix.clone(), namespace.clone());
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = ConstructorConfig::from_toml_str("").ok();
        assert_eq!(config, Some(ConstructorConfig::default()));
    }

    #[test]
    fn reads_every_field() {
        let src = r#"
            rule_relation = "http://ex.org/constructor"
            command_text = "http://ex.org/text"
            cycle_guard = "path"
            blank_node_prefix = "n"

            [prefixes]
            "" = "http://ex.org/"
            ex = "http://ex.org/"
        "#;
        let config = ConstructorConfig::from_toml_str(src).unwrap_or_default();
        assert_eq!(config.rule_relation, "http://ex.org/constructor");
        assert_eq!(config.command_text_term(), Term::iri("http://ex.org/text"));
        assert_eq!(config.cycle_guard, CycleGuard::Path);
        assert_eq!(config.blank_node_prefix, "n");
        let map = config.prefix_map();
        assert_eq!(map.namespace(""), Some("http://ex.org/"));
        assert_eq!(map.namespace("owl"), Some(vocab::OWL));
    }

    #[test]
    fn rejects_unknown_keys() {
        let err = ConstructorConfig::from_toml_str("rule = \"x\"").err();
        assert!(matches!(err, Some(ConfigError::Toml(_))));
    }

    #[test]
    fn rejects_bad_blank_node_prefix() {
        let err = ConstructorConfig::from_toml_str("blank_node_prefix = \"1x\"").err();
        assert!(matches!(err, Some(ConfigError::BlankNodePrefix(_))));
    }

    #[test]
    fn rejects_empty_relation() {
        let err = ConstructorConfig::from_toml_str("rule_relation = \" \"").err();
        assert!(matches!(err, Some(ConfigError::EmptyIri("rule_relation"))));
    }
}
