//! Schema inference for stream members

pub mod shape_generator;

pub use shape_generator::{generate_shape, local_name, shape_iri, NodeKind};
