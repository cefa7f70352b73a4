//! Single-sample SHACL shape inference.
//!
//! Every typed entity in the sampled resource yields a node shape targeting its class; each
//! of its properties becomes a property constraint whose `sh:maxCount` is the number of
//! distinct values observed for that subject and predicate. Untyped entities are skipped.

use crate::core::{vocab, Resource, Term, Triple};
use std::collections::{HashMap, HashSet};

/// Node kind classification of an observed value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Literal,
    BlankNode,
    Iri,
}

impl NodeKind {
    pub fn of(term: &Term) -> Self {
        match term {
            Term::Literal { .. } => NodeKind::Literal,
            Term::BlankNode(_) => NodeKind::BlankNode,
            Term::NamedNode(_) => NodeKind::Iri,
        }
    }

    pub fn iri(self) -> &'static str {
        match self {
            NodeKind::Literal => vocab::SH_LITERAL,
            NodeKind::BlankNode => vocab::SH_BLANK_NODE,
            NodeKind::Iri => vocab::SH_IRI,
        }
    }
}

/// Local name of an IRI: whatever follows the last `#` or `/`.
pub fn local_name(iri: &str) -> &str {
    iri.rsplit(|c| c == '#' || c == '/').next().unwrap_or(iri)
}

/// IRI of the node shape describing `class`.
pub fn shape_iri(namespace_base: &str, class: &str) -> String {
    format!("{}{}Shape", namespace_base, local_name(class))
}

#[derive(PartialEq, Eq, Hash)]
struct Constraint {
    shape: String,
    path: String,
    kind: NodeKind,
    max_count: usize,
    node: Option<String>,
}

/// Derive the schema graph of `resource`. Shape IRIs live under `namespace_base`.
pub fn generate_shape(resource: &Resource, namespace_base: &str) -> Resource {
    let mut triples = Vec::new();
    let mut shape_of: HashMap<&Term, String> = HashMap::new();
    let mut declared: HashSet<String> = HashSet::new();
    // classes sharing a local name share a shape but each keeps its own target
    let mut targeted: HashSet<(String, &str)> = HashSet::new();

    for triple in resource.triples().iter().filter(|t| t.predicate == vocab::RDF_TYPE) {
        let Term::NamedNode(class) = &triple.object else {
            continue;
        };
        let shape = shape_iri(namespace_base, class);
        if declared.insert(shape.clone()) {
            triples.push(Triple::new(
                Term::named(&shape),
                vocab::RDF_TYPE,
                Term::named(vocab::SH_NODE_SHAPE),
            ));
        }
        if targeted.insert((shape.clone(), class.as_str())) {
            triples.push(Triple::new(
                Term::named(&shape),
                vocab::SH_TARGET_CLASS,
                Term::named(class),
            ));
        }
        shape_of.entry(&triple.subject).or_insert(shape);
    }

    // distinct values per (subject, predicate)
    let mut values: HashMap<(&Term, &str), HashSet<&Term>> = HashMap::new();
    for triple in resource.triples() {
        values
            .entry((&triple.subject, triple.predicate.as_str()))
            .or_default()
            .insert(&triple.object);
    }

    let mut emitted: HashSet<Constraint> = HashSet::new();
    let mut counter = 0usize;
    for triple in resource.triples().iter().filter(|t| t.predicate != vocab::RDF_TYPE) {
        let Some(shape) = shape_of.get(&triple.subject) else {
            continue;
        };
        let constraint = Constraint {
            shape: shape.clone(),
            path: triple.predicate.clone(),
            kind: NodeKind::of(&triple.object),
            max_count: values
                .get(&(&triple.subject, triple.predicate.as_str()))
                .map_or(1, HashSet::len),
            node: shape_of.get(&triple.object).cloned(),
        };
        if emitted.contains(&constraint) {
            continue;
        }

        let property = Term::blank(format!("p{}", counter));
        counter += 1;
        triples.push(Triple::new(Term::named(shape), vocab::SH_PROPERTY, property.clone()));
        triples.push(Triple::new(property.clone(), vocab::SH_PATH, Term::named(&constraint.path)));
        triples.push(Triple::new(
            property.clone(),
            vocab::SH_NODE_KIND,
            Term::named(constraint.kind.iri()),
        ));
        triples.push(Triple::new(
            property.clone(),
            vocab::SH_MIN_COUNT,
            Term::typed_literal("1", vocab::XSD_INTEGER),
        ));
        triples.push(Triple::new(
            property.clone(),
            vocab::SH_MAX_COUNT,
            Term::typed_literal(constraint.max_count.to_string(), vocab::XSD_INTEGER),
        ));
        if let Some(node) = &constraint.node {
            triples.push(Triple::new(property, vocab::SH_NODE, Term::named(node)));
        }
        emitted.insert(constraint);
    }

    let root = resource
        .triples()
        .iter()
        .find(|t| t.subject == *resource.main_subject() && t.predicate == vocab::RDF_TYPE)
        .and_then(|t| t.object.as_iri())
        .map(|class| Term::named(shape_iri(namespace_base, class)))
        .unwrap_or_else(|| Term::named(namespace_base));

    tracing::debug!(shapes = declared.len(), constraints = counter, "generated shape");
    Resource::new(root, triples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::extract;

    const BASE: &str = "http://pod.example/shapes#";

    fn ex(s: &str) -> String {
        format!("http://ex.org/{}", s)
    }

    fn sample() -> Resource {
        let triples = vec![
            Triple::new(Term::named(ex("obs")), vocab::RDF_TYPE, Term::named(ex("Observation"))),
            Triple::new(Term::named(ex("obs")), vocab::DCT_CREATED, Term::literal("2024")),
            Triple::new(Term::named(ex("obs")), ex("tag"), Term::literal("a")),
            Triple::new(Term::named(ex("obs")), ex("tag"), Term::literal("b")),
            Triple::new(Term::named(ex("obs")), ex("sensor"), Term::named(ex("s1"))),
            Triple::new(Term::named(ex("s1")), vocab::RDF_TYPE, Term::named(ex("Sensor"))),
            Triple::new(Term::named(ex("s1")), ex("label"), Term::literal("thermo")),
            Triple::new(Term::named(ex("obs")), ex("untyped"), Term::named(ex("u"))),
            Triple::new(Term::named(ex("u")), ex("ignored"), Term::literal("x")),
        ];
        extract(&triples, vocab::DCT_CREATED, "http://pod.example/stream/#EventStream")
            .remove(0)
    }

    fn objects_of<'a>(shape: &'a Resource, subject: &Term, predicate: &str) -> Vec<&'a Term> {
        shape
            .triples()
            .iter()
            .filter(|t| &t.subject == subject && t.predicate == predicate)
            .map(|t| &t.object)
            .collect()
    }

    #[test]
    fn test_same_local_name_keeps_both_target_classes() {
        let triples = vec![
            Triple::new(Term::named(ex("obs")), vocab::RDF_TYPE, Term::named("http://a.org/Thing")),
            Triple::new(Term::named(ex("obs")), vocab::RDF_TYPE, Term::named("http://b.org/Thing")),
            Triple::new(Term::named(ex("obs")), vocab::DCT_CREATED, Term::literal("2024")),
        ];
        let resource =
            extract(&triples, vocab::DCT_CREATED, "http://pod.example/stream/#EventStream")
                .remove(0);
        let shape = generate_shape(&resource, BASE);
        let thing = Term::named(format!("{}ThingShape", BASE));

        let mut targets = objects_of(&shape, &thing, vocab::SH_TARGET_CLASS);
        targets.sort();
        assert_eq!(
            targets,
            vec![&Term::named("http://a.org/Thing"), &Term::named("http://b.org/Thing")]
        );
        assert_eq!(objects_of(&shape, &thing, vocab::RDF_TYPE).len(), 1);
    }

    #[test]
    fn test_one_target_class_per_type() {
        let shape = generate_shape(&sample(), BASE);
        let targets: Vec<&Triple> =
            shape.triples().iter().filter(|t| t.predicate == vocab::SH_TARGET_CLASS).collect();

        assert_eq!(targets.len(), 2);
        assert_eq!(shape.main_subject(), &Term::named(format!("{}ObservationShape", BASE)));
    }

    #[test]
    fn test_max_count_matches_observed_values() {
        let shape = generate_shape(&sample(), BASE);
        let tag_constraint = shape
            .triples()
            .iter()
            .find(|t| t.predicate == vocab::SH_PATH && t.object == Term::named(ex("tag")))
            .map(|t| t.subject.clone())
            .unwrap();

        assert_eq!(
            objects_of(&shape, &tag_constraint, vocab::SH_MAX_COUNT),
            vec![&Term::typed_literal("2", vocab::XSD_INTEGER)]
        );
        assert_eq!(
            objects_of(&shape, &tag_constraint, vocab::SH_NODE_KIND),
            vec![&Term::named(vocab::SH_LITERAL)]
        );
    }

    #[test]
    fn test_reference_to_typed_node() {
        let shape = generate_shape(&sample(), BASE);
        let sensor_constraint = shape
            .triples()
            .iter()
            .find(|t| t.predicate == vocab::SH_PATH && t.object == Term::named(ex("sensor")))
            .map(|t| t.subject.clone())
            .unwrap();

        assert_eq!(
            objects_of(&shape, &sensor_constraint, vocab::SH_NODE),
            vec![&Term::named(format!("{}SensorShape", BASE))]
        );
    }

    #[test]
    fn test_untyped_subjects_are_skipped() {
        let shape = generate_shape(&sample(), BASE);
        assert!(!shape.triples().iter().any(|t| t.object == Term::named(ex("ignored"))));
    }

    #[test]
    fn test_local_name() {
        assert_eq!(local_name("http://ex.org/vocab#Thing"), "Thing");
        assert_eq!(local_name("http://ex.org/Thing"), "Thing");
        assert_eq!(local_name("Thing"), "Thing");
    }
}
