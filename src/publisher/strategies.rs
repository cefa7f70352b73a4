//! Pluggable steps of the publishing pipeline.

use crate::bucketing::{read_timestamp, BucketIndex, Millis};
use crate::core::{PrefixTable, Resource};
use crate::error::Result;
use crate::serialization::serialize;
use crate::storage::TURTLE;

/// Reads the instant a resource belongs to.
pub trait TimestampExtractor: Send + Sync {
    fn timestamp(&self, resource: &Resource) -> Result<Millis>;
}

/// Chooses the bucket boundary a timestamp goes to.
pub trait AssignmentPolicy: Send + Sync {
    fn assign(&self, index: &BucketIndex, timestamp: Millis) -> Result<Millis>;
}

/// Renders a resource as a member document.
pub trait ResourceSerializer: Send + Sync {
    fn serialize(&self, resource: &Resource) -> Result<String>;

    fn content_type(&self) -> &str {
        TURTLE
    }
}

/// First `xsd:dateTime` literal at a fixed predicate of the main subject.
#[derive(Debug, Clone)]
pub struct PathTimestamp {
    path: String,
}

impl PathTimestamp {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

impl TimestampExtractor for PathTimestamp {
    fn timestamp(&self, resource: &Resource) -> Result<Millis> {
        Ok(read_timestamp(resource, &self.path)?.timestamp_millis())
    }
}

/// Greatest boundary not after the timestamp.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClosestPastBoundary;

impl AssignmentPolicy for ClosestPastBoundary {
    fn assign(&self, index: &BucketIndex, timestamp: Millis) -> Result<Millis> {
        index.assign(timestamp)
    }
}

#[derive(Debug, Clone)]
pub struct CompactTurtle {
    prefixes: PrefixTable,
}

impl CompactTurtle {
    pub fn new(prefixes: PrefixTable) -> Self {
        Self { prefixes }
    }
}

impl ResourceSerializer for CompactTurtle {
    fn serialize(&self, resource: &Resource) -> Result<String> {
        serialize(resource, &self.prefixes)
    }
}
