//! Graph extraction of stream members

pub mod graph_extractor;

pub use graph_extractor::{extract, main_subjects};
