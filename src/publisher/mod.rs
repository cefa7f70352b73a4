//! Stream orchestration: extraction, shape publication, bucket assignment and rebalancing
//! against a [`Storage`](crate::storage::Storage) backend.

pub mod layout;
pub mod ldes_publisher;
pub mod strategies;

pub use layout::StreamLayout;
pub use ldes_publisher::{
    ActivePublisher, AdmittedMember, AppendReport, Publisher, Rejection, ShapeOutcome,
};
pub use strategies::{
    AssignmentPolicy, ClosestPastBoundary, CompactTurtle, PathTimestamp, ResourceSerializer,
    TimestampExtractor,
};
