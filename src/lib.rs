//! # Solid LDES
//!
//! Publishes timestamped RDF resources as a Linked Data Event Stream: an append-only,
//! time-bucketed sequence of member documents on a document store such as a Solid pod.
//!
//! The pipeline is built from four synchronous pieces and one orchestrator:
//!
//! - [`extraction`] splits a flat triple collection into self-contained resources
//! - [`shape`] infers a SHACL shape from one sample resource
//! - [`bucketing`] assigns resources to time buckets and rebalances them under a capacity
//! - [`serialization`] writes resources as compact Turtle
//! - [`publisher`] drives all of the above against a [`storage::Storage`] backend
//!
//! ## Example
//!
//! ```rust,no_run
//! use solid_ldes::{parsing, MemoryStorage, Publisher, PublisherConfig, Result};
//!
//! async fn example(turtle: &str) -> Result<()> {
//!     let config = PublisherConfig::new("http://localhost:3000/stream/");
//!     let publisher = Publisher::new(MemoryStorage::new(), config)?;
//!     let mut stream = publisher.initialize(0).await?;
//!
//!     let report = stream.append(&parsing::parse_turtle(turtle)?).await?;
//!     println!("{} members admitted", report.admitted.len());
//!     Ok(())
//! }
//! ```

#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::redundant_closure_for_method_calls)]
#![allow(clippy::new_without_default)]
#![allow(clippy::cast_possible_truncation)]

/// Core data structures and types
pub mod core;

/// Time buckets, assignment and rebalancing
pub mod bucketing;

pub mod config;

pub mod error;

/// Resource extraction from flat triple collections
pub mod extraction;

/// Module for parsing RDF input
pub mod parsing;

pub mod publisher;

/// Compact Turtle serialization
pub mod serialization;

/// SHACL shape inference
pub mod shape;

pub mod storage;

// Re-export commonly used types
pub use config::PublisherConfig;
pub use error::{Error, Result};
pub use publisher::{ActivePublisher, AppendReport, Publisher, ShapeOutcome};
pub use storage::{HttpStorage, MemoryStorage, Storage};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Config("test error".to_string());
        assert_eq!(format!("{}", err), "Configuration error: test error");
    }
}
