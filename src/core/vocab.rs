//! IRIs of the vocabularies the publisher reads and writes.

pub const RDF: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
pub const XSD: &str = "http://www.w3.org/2001/XMLSchema#";
pub const SH: &str = "http://www.w3.org/ns/shacl#";
pub const TREE: &str = "https://w3id.org/tree#";
pub const LDES: &str = "https://w3id.org/ldes#";
pub const DCT: &str = "http://purl.org/dc/terms/";

pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
pub const RDF_LANG_STRING: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#langString";

pub const XSD_STRING: &str = "http://www.w3.org/2001/XMLSchema#string";
pub const XSD_INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";
pub const XSD_DATE_TIME: &str = "http://www.w3.org/2001/XMLSchema#dateTime";

pub const SH_NODE_SHAPE: &str = "http://www.w3.org/ns/shacl#NodeShape";
pub const SH_TARGET_CLASS: &str = "http://www.w3.org/ns/shacl#targetClass";
pub const SH_PROPERTY: &str = "http://www.w3.org/ns/shacl#property";
pub const SH_PATH: &str = "http://www.w3.org/ns/shacl#path";
pub const SH_NODE_KIND: &str = "http://www.w3.org/ns/shacl#nodeKind";
pub const SH_MIN_COUNT: &str = "http://www.w3.org/ns/shacl#minCount";
pub const SH_MAX_COUNT: &str = "http://www.w3.org/ns/shacl#maxCount";
pub const SH_NODE: &str = "http://www.w3.org/ns/shacl#node";
pub const SH_LITERAL: &str = "http://www.w3.org/ns/shacl#Literal";
pub const SH_BLANK_NODE: &str = "http://www.w3.org/ns/shacl#BlankNode";
pub const SH_IRI: &str = "http://www.w3.org/ns/shacl#IRI";

pub const TREE_MEMBER: &str = "https://w3id.org/tree#member";
pub const TREE_RELATION: &str = "https://w3id.org/tree#relation";
pub const TREE_NODE: &str = "https://w3id.org/tree#node";
pub const TREE_PATH: &str = "https://w3id.org/tree#path";
pub const TREE_VALUE: &str = "https://w3id.org/tree#value";
pub const TREE_SHAPE: &str = "https://w3id.org/tree#shape";
pub const TREE_VIEW: &str = "https://w3id.org/tree#view";
pub const TREE_GTE_RELATION: &str = "https://w3id.org/tree#GreaterThanOrEqualToRelation";

pub const LDES_EVENT_STREAM: &str = "https://w3id.org/ldes#EventStream";
pub const LDES_TIMESTAMP_PATH: &str = "https://w3id.org/ldes#timestampPath";

pub const DCT_CREATED: &str = "http://purl.org/dc/terms/created";
