//! Textual graph output

pub mod compact_turtle;

pub use compact_turtle::{serialize, serialize_ntriples, serialize_triples};
