//! Prefix table used to shorten IRIs in serialized output

use crate::core::vocab;
use crate::error::{Error, Result};
use regex::Regex;
use std::sync::OnceLock;

/// Local parts we are willing to write as `prefix:local`. Anything else keeps the full IRI.
fn local_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9_](?:[A-Za-z0-9_.\-]*[A-Za-z0-9_\-])?$")
            .expect("local name pattern is valid")
    })
}

/// Ordered mapping from short name to namespace IRI.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrefixTable {
    entries: Vec<(String, String)>,
}

impl PrefixTable {
    /// Build a table, rejecting duplicate short names.
    pub fn new<I, K, V>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut table = Self::default();
        for (short, namespace) in entries {
            let short = short.into();
            if table.namespace(&short).is_some() {
                return Err(Error::Config(format!("duplicate prefix '{}'", short)));
            }
            if !short.is_empty() && !local_name_pattern().is_match(&short) {
                return Err(Error::Config(format!("invalid prefix name '{}'", short)));
            }
            table.entries.push((short, namespace.into()));
        }
        Ok(table)
    }

    /// Prefixes for the vocabularies the publisher writes.
    pub fn default_ldes() -> Self {
        Self {
            entries: [
                ("rdf", vocab::RDF),
                ("xsd", vocab::XSD),
                ("sh", vocab::SH),
                ("tree", vocab::TREE),
                ("ldes", vocab::LDES),
                ("dct", vocab::DCT),
            ]
            .into_iter()
            .map(|(s, n)| (s.to_string(), n.to_string()))
            .collect(),
        }
    }

    /// Return a table extended with `extra`, rejecting duplicates.
    pub fn extended_with<I, K, V>(&self, extra: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let combined = self
            .entries
            .iter()
            .cloned()
            .chain(extra.into_iter().map(|(k, v)| (k.into(), v.into())));
        Self::new(combined)
    }

    pub fn namespace(&self, short: &str) -> Option<&str> {
        self.entries.iter().find(|(s, _)| s == short).map(|(_, n)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(s, n)| (s.as_str(), n.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Shorten `iri` to `(short, local)` using the longest matching namespace.
    pub fn shorten<'a>(&'a self, iri: &'a str) -> Option<(&'a str, &'a str)> {
        self.entries
            .iter()
            .filter(|(_, ns)| !ns.is_empty() && iri.starts_with(ns.as_str()))
            .max_by_key(|(_, ns)| ns.len())
            .and_then(|(short, ns)| {
                let local = &iri[ns.len()..];
                if local.is_empty() || local_name_pattern().is_match(local) {
                    Some((short.as_str(), local))
                } else {
                    None
                }
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_prefix_rejected() {
        let result = PrefixTable::new([("ex", "http://ex.org/"), ("ex", "http://other.org/")]);
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_shorten_uses_longest_namespace() {
        let table =
            PrefixTable::new([("ex", "http://ex.org/"), ("exv", "http://ex.org/vocab#")]).unwrap();
        assert_eq!(table.shorten("http://ex.org/vocab#name"), Some(("exv", "name")));
        assert_eq!(table.shorten("http://ex.org/alice"), Some(("ex", "alice")));
    }

    #[test]
    fn test_unsafe_local_part_is_not_shortened() {
        let table = PrefixTable::new([("ex", "http://ex.org/")]).unwrap();
        assert_eq!(table.shorten("http://ex.org/a/b"), None);
        assert_eq!(table.shorten("http://ex.org/trailing."), None);
        assert_eq!(table.shorten("http://other.org/x"), None);
    }

    #[test]
    fn test_extended_with_keeps_order() {
        let table = PrefixTable::default_ldes().extended_with([("ex", "http://ex.org/")]).unwrap();
        let names: Vec<&str> = table.iter().map(|(s, _)| s).collect();
        assert_eq!(names.first(), Some(&"rdf"));
        assert_eq!(names.last(), Some(&"ex"));
    }
}
