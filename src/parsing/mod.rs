//! Parsing of RDF input documents

pub mod rdf_parser;

pub use rdf_parser::{parse_document, parse_ntriples_line, parse_turtle, parse_turtle_with_base, RdfSyntax};
