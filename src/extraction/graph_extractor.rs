//! Splits a flat triple collection into self-contained resources.
//!
//! A resource is rooted at a subject carrying the distinguishing predicate and contains
//! everything reachable from it, except the descriptions of other resources' roots.
//! A synthetic `stream tree:member root` triple marks each resource as a stream member.

use crate::core::{vocab, Resource, Term, Triple};
use std::collections::{HashMap, HashSet, VecDeque};

/// Subjects carrying `predicate`, in first-encounter order.
pub fn main_subjects<'a>(triples: &'a [Triple], predicate: &str) -> Vec<&'a Term> {
    let mut seen = HashSet::new();
    triples
        .iter()
        .filter(|t| t.predicate == predicate)
        .map(|t| &t.subject)
        .filter(|s| seen.insert(*s))
        .collect()
}

/// Extract one resource per main subject.
///
/// Traversal is breadth-first from the root; each named or blank object is expanded at
/// most once, so cycles (including self-loops) terminate.
pub fn extract(triples: &[Triple], predicate: &str, stream_identifier: &str) -> Vec<Resource> {
    let roots = main_subjects(triples, predicate);
    if roots.is_empty() {
        return Vec::new();
    }

    let root_set: HashSet<&Term> = roots.iter().copied().collect();

    let mut by_subject: HashMap<&Term, Vec<&Triple>> = HashMap::new();
    for triple in triples {
        by_subject.entry(&triple.subject).or_default().push(triple);
    }

    roots
        .into_iter()
        .map(|root| extract_one(root, &root_set, &by_subject, stream_identifier))
        .collect()
}

fn extract_one(
    root: &Term,
    roots: &HashSet<&Term>,
    by_subject: &HashMap<&Term, Vec<&Triple>>,
    stream_identifier: &str,
) -> Resource {
    let mut collected: Vec<Triple> = Vec::new();
    let mut queue: VecDeque<Triple> = VecDeque::new();
    let mut visited: HashSet<Term> = HashSet::new();
    visited.insert(root.clone());

    if let Some(own) = by_subject.get(root) {
        queue.extend(own.iter().map(|t| (*t).clone()));
    }
    queue.push_back(Triple::new(
        Term::named(stream_identifier),
        vocab::TREE_MEMBER,
        root.clone(),
    ));

    while let Some(triple) = queue.pop_front() {
        let object = triple.object.clone();
        collected.push(triple);

        if object.is_literal() || visited.contains(&object) {
            continue;
        }
        visited.insert(object.clone());

        // Another resource's root is referenced, never pulled in.
        if roots.contains(&object) {
            continue;
        }

        if let Some(children) = by_subject.get(&object) {
            queue.extend(
                children
                    .iter()
                    .filter(|t| t.object == *root || !roots.contains(&t.object))
                    .map(|t| (*t).clone()),
            );
        }
    }

    tracing::debug!(root = %root, triples = collected.len(), "extracted resource");
    Resource::new(root.clone(), collected)
}
