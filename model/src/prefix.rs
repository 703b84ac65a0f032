//! Prefix maps for CURIE expansion and IRI compaction.

use crate::vocab;

/// An ordered mapping from prefix labels to namespace IRIs.
///
/// Later bindings of the same label replace earlier ones in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrefixMap {
    entries: Vec<(String, String)>,
}

impl PrefixMap {
    /// Creates an empty prefix map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a map holding the `rdf`, `rdfs`, `owl`, `xsd`, `sp` and `spin` prefixes.
    #[must_use]
    pub fn standard() -> Self {
        let mut map = Self::new();
        map.insert("rdf", vocab::RDF);
        map.insert("rdfs", vocab::RDFS);
        map.insert("owl", vocab::OWL);
        map.insert("xsd", vocab::XSD);
        map.insert("sp", vocab::SP);
        map.insert("spin", vocab::SPIN);
        map
    }

    /// Binds `prefix` to `namespace`.
    pub fn insert(&mut self, prefix: impl Into<String>, namespace: impl Into<String>) {
        let prefix = prefix.into();
        let namespace = namespace.into();
        match self.entries.iter_mut().find(|(p, _)| *p == prefix) {
            Some(entry) => entry.1 = namespace,
            None => self.entries.push((prefix, namespace)),
        }
    }

    /// Looks up the namespace bound to `prefix`.
    #[must_use]
    pub fn namespace(&self, prefix: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(p, _)| p == prefix)
            .map(|(_, ns)| ns.as_str())
    }

    /// Expands a `prefix:local` name. Returns `None` for unknown prefixes or
    /// input without a colon.
    #[must_use]
    pub fn expand(&self, curie: &str) -> Option<String> {
        let (prefix, local) = curie.split_once(':')?;
        self.namespace(prefix).map(|ns| format!("{ns}{local}"))
    }

    /// Expands `name` if it is a known CURIE, otherwise returns it unchanged.
    /// Input wrapped in angle brackets is unwrapped.
    #[must_use]
    pub fn resolve(&self, name: &str) -> String {
        if let Some(inner) = name.strip_prefix('<').and_then(|n| n.strip_suffix('>')) {
            return inner.to_owned();
        }
        self.expand(name).unwrap_or_else(|| name.to_owned())
    }

    /// Compacts `iri` with the longest matching namespace whose remainder is a
    /// valid Turtle local name.
    #[must_use]
    pub fn compact(&self, iri: &str) -> Option<String> {
        self.entries
            .iter()
            .filter(|(_, ns)| !ns.is_empty() && iri.starts_with(ns.as_str()))
            .filter(|(_, ns)| is_local_name(&iri[ns.len()..]))
            .max_by_key(|(_, ns)| ns.len())
            .map(|(p, ns)| format!("{p}:{}", &iri[ns.len()..]))
    }

    /// Iterates over `(prefix, namespace)` pairs in binding order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(p, ns)| (p.as_str(), ns.as_str()))
    }

    /// Number of bindings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no prefix is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Conservative check for a Turtle `PN_LOCAL` that needs no escaping.
fn is_local_name(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        None => true,
        Some(c) if c.is_ascii_alphanumeric() || c == '_' => {
            !s.ends_with('.')
                && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
        }
        Some(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_known_prefix() {
        let map = PrefixMap::standard();
        assert_eq!(map.expand("owl:Thing").as_deref(), Some(vocab::OWL_THING));
        assert_eq!(map.expand("nope:Thing"), None);
        assert_eq!(map.expand("Thing"), None);
    }

    #[test]
    fn resolve_unwraps_angle_brackets() {
        let map = PrefixMap::standard();
        assert_eq!(map.resolve("<http://ex.org/a>"), "http://ex.org/a");
        assert_eq!(map.resolve("http://ex.org/a"), "http://ex.org/a");
    }

    #[test]
    fn compacts_with_longest_namespace() {
        let mut map = PrefixMap::new();
        map.insert("ex", "http://ex.org/");
        map.insert("exv", "http://ex.org/vocab#");
        assert_eq!(
            map.compact("http://ex.org/vocab#Person").as_deref(),
            Some("exv:Person")
        );
        assert_eq!(map.compact("http://ex.org/a/b"), None);
        assert_eq!(map.compact("http://other.org/a"), None);
    }

    #[test]
    fn rebinding_replaces_in_place() {
        let mut map = PrefixMap::new();
        map.insert("", "http://a.org/");
        map.insert("ex", "http://ex.org/");
        map.insert("", "http://b.org/");
        assert_eq!(map.len(), 2);
        assert_eq!(map.namespace(""), Some("http://b.org/"));
        assert_eq!(map.iter().next(), Some(("", "http://b.org/")));
    }
}
