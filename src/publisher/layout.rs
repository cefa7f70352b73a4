//! URL layout of a stream on storage and the metadata triples describing it.
//!
//! ```text
//! {base}.meta            stream metadata (event stream, view, relations, shape link)
//! {base}shape            inferred shape
//! {base}{millis}/        bucket container, one per boundary
//! {base}{millis}/{id}    member document
//! ```

use crate::bucketing::{millis_to_date_time, Millis};
use crate::core::{vocab, Term, Triple};
use crate::serialization::serialize_ntriples;
use chrono::SecondsFormat;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamLayout {
    base: String,
}

impl StreamLayout {
    /// `base` must end with `/`.
    pub fn new(base: impl Into<String>) -> Self {
        Self { base: base.into() }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn metadata_url(&self) -> String {
        format!("{}.meta", self.base)
    }

    pub fn stream_id(&self) -> String {
        format!("{}#EventStream", self.base)
    }

    pub fn shape_url(&self) -> String {
        format!("{}shape", self.base)
    }

    pub fn bucket_url(&self, boundary: Millis) -> String {
        format!("{}{}/", self.base, boundary)
    }

    pub fn member_url(&self, boundary: Millis, id: &str) -> String {
        format!("{}{}", self.bucket_url(boundary), id)
    }

    /// Event stream declaration written once at initialization.
    pub fn stream_triples(&self, timestamp_path: &str) -> Vec<Triple> {
        let stream = Term::named(self.stream_id());
        vec![
            Triple::new(stream.clone(), vocab::RDF_TYPE, Term::named(vocab::LDES_EVENT_STREAM)),
            Triple::new(stream.clone(), vocab::LDES_TIMESTAMP_PATH, Term::named(timestamp_path)),
            Triple::new(stream, vocab::TREE_VIEW, Term::named(self.base.as_str())),
        ]
    }

    /// `tree:relation` from the view to the bucket at `boundary`.
    pub fn relation_triples(&self, boundary: Millis, timestamp_path: &str) -> Vec<Triple> {
        let relation = Term::blank(format!("r{}", boundary));
        let value = millis_to_date_time(boundary).to_rfc3339_opts(SecondsFormat::Millis, true);
        vec![
            Triple::new(Term::named(self.base.as_str()), vocab::TREE_RELATION, relation.clone()),
            Triple::new(relation.clone(), vocab::RDF_TYPE, Term::named(vocab::TREE_GTE_RELATION)),
            Triple::new(relation.clone(), vocab::TREE_NODE, Term::named(self.bucket_url(boundary))),
            Triple::new(relation.clone(), vocab::TREE_PATH, Term::named(timestamp_path)),
            Triple::new(relation, vocab::TREE_VALUE, Term::typed_literal(value, vocab::XSD_DATE_TIME)),
        ]
    }

    pub fn shape_link(&self) -> Triple {
        Triple::new(
            Term::named(self.stream_id()),
            vocab::TREE_SHAPE,
            Term::named(self.shape_url()),
        )
    }
}

/// SPARQL update adding `triples` to a document.
pub fn insert_data(triples: &[Triple]) -> String {
    format!("INSERT DATA {{\n{}}}", serialize_ntriples(triples))
}
