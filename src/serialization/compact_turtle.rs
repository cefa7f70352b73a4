//! Compact Turtle output for resources.
//!
//! Triples are grouped per subject and predicate, repeated objects are written once, and
//! blank nodes are inlined as `[ ... ]` under the single statement that references them.
//! Inlining needs every blank node to be described in the resource and referenced exactly
//! once; other shapes are rejected as malformed input.

use crate::core::{escape_literal, vocab, PrefixTable, Resource, Term, Triple};
use crate::error::{Error, Result};
use std::collections::{HashMap, HashSet};

const INDENT: &str = "    ";

/// Predicate/object lists of one subject, in encounter order, objects deduplicated.
#[derive(Default)]
struct Group<'a> {
    predicates: Vec<(&'a str, Vec<&'a Term>)>,
}

impl<'a> Group<'a> {
    /// Returns false when the object was already recorded for this predicate.
    fn add(&mut self, predicate: &'a str, object: &'a Term) -> bool {
        let idx = match self.predicates.iter().position(|(p, _)| *p == predicate) {
            Some(idx) => idx,
            None => {
                self.predicates.push((predicate, Vec::new()));
                self.predicates.len() - 1
            }
        };
        let objects = &mut self.predicates[idx].1;
        if objects.contains(&object) {
            false
        } else {
            objects.push(object);
            true
        }
    }
}

struct Grouped<'a> {
    named: Vec<(&'a Term, Group<'a>)>,
    blank: HashMap<&'a str, Group<'a>>,
    references: HashMap<&'a str, usize>,
}

fn group(triples: &[Triple]) -> Grouped<'_> {
    let mut named: Vec<(&Term, Group)> = Vec::new();
    let mut named_index: HashMap<&Term, usize> = HashMap::new();
    let mut blank: HashMap<&str, Group> = HashMap::new();
    let mut references: HashMap<&str, usize> = HashMap::new();

    for triple in triples {
        let added = match &triple.subject {
            Term::BlankNode(id) => {
                blank.entry(id.as_str()).or_default().add(&triple.predicate, &triple.object)
            }
            subject => {
                let idx = *named_index.entry(subject).or_insert_with(|| {
                    named.push((subject, Group::default()));
                    named.len() - 1
                });
                named[idx].1.add(&triple.predicate, &triple.object)
            }
        };
        if added {
            if let Term::BlankNode(id) = &triple.object {
                *references.entry(id.as_str()).or_default() += 1;
            }
        }
    }

    Grouped { named, blank, references }
}

fn check_blank_nodes(grouped: &Grouped<'_>) -> Result<()> {
    for (id, count) in &grouped.references {
        if !grouped.blank.contains_key(id) {
            return Err(Error::MalformedInput(format!(
                "blank node _:{} is referenced but never described",
                id
            )));
        }
        if *count > 1 {
            return Err(Error::MalformedInput(format!(
                "blank node _:{} is referenced {} times and cannot be inlined",
                id, count
            )));
        }
    }
    if let Some(id) = grouped.blank.keys().find(|id| !grouped.references.contains_key(*id)) {
        return Err(Error::MalformedInput(format!("blank node _:{} is never referenced", id)));
    }
    Ok(())
}

struct TurtleWriter<'a> {
    prefixes: &'a PrefixTable,
    used: HashSet<&'a str>,
    blank: &'a HashMap<&'a str, Group<'a>>,
    inlined: usize,
}

impl<'a> TurtleWriter<'a> {
    fn iri(&mut self, iri: &'a str) -> String {
        let prefixes = self.prefixes;
        match prefixes.shorten(iri) {
            Some((short, local)) => {
                self.used.insert(short);
                format!("{}:{}", short, local)
            }
            None => format!("<{}>", iri),
        }
    }

    fn predicate(&mut self, predicate: &'a str) -> String {
        if predicate == vocab::RDF_TYPE {
            "a".to_string()
        } else {
            self.iri(predicate)
        }
    }

    fn term(&mut self, term: &'a Term, depth: usize) -> Result<String> {
        match term {
            Term::NamedNode(iri) => Ok(self.iri(iri)),
            Term::BlankNode(id) => {
                let blank = self.blank;
                let group = blank.get(id.as_str()).ok_or_else(|| {
                    Error::MalformedInput(format!("blank node _:{} is never described", id))
                })?;
                self.inlined += 1;
                let body = self.predicate_list(group, depth + 1)?;
                Ok(format!("[\n{}\n{}]", body, INDENT.repeat(depth)))
            }
            Term::Literal { value, datatype, language } => {
                let mut out = format!("\"{}\"", escape_literal(value));
                if let Some(lang) = language {
                    out.push('@');
                    out.push_str(lang);
                } else if let Some(dt) = datatype {
                    out.push_str("^^");
                    out.push_str(&self.iri(dt));
                }
                Ok(out)
            }
        }
    }

    fn predicate_list(&mut self, group: &'a Group<'a>, depth: usize) -> Result<String> {
        let indent = INDENT.repeat(depth);
        let mut lines = Vec::with_capacity(group.predicates.len());
        for (predicate, objects) in &group.predicates {
            let mut rendered = Vec::with_capacity(objects.len());
            for object in objects {
                rendered.push(self.term(object, depth)?);
            }
            lines.push(format!("{}{} {}", indent, self.predicate(predicate), rendered.join(", ")));
        }
        Ok(lines.join(" ;\n"))
    }
}

/// Serialize `resource` as compact Turtle using `prefixes`.
pub fn serialize(resource: &Resource, prefixes: &PrefixTable) -> Result<String> {
    serialize_triples(resource.triples(), prefixes)
}

/// Serialize an arbitrary triple list; see [`serialize`].
pub fn serialize_triples(triples: &[Triple], prefixes: &PrefixTable) -> Result<String> {
    let grouped = group(triples);
    check_blank_nodes(&grouped)?;

    let mut writer =
        TurtleWriter { prefixes, used: HashSet::new(), blank: &grouped.blank, inlined: 0 };

    let mut body = String::new();
    for (subject, group) in &grouped.named {
        let subject = writer.term(*subject, 0)?;
        let list = writer.predicate_list(group, 1)?;
        body.push_str(&format!("{}\n{} .\n\n", subject, list));
    }

    // Blank nodes only reachable through each other form a cycle and were never written.
    if writer.inlined != grouped.blank.len() {
        return Err(Error::MalformedInput(
            "blank nodes form a cycle and cannot be inlined".to_string(),
        ));
    }

    let mut out = String::new();
    for (short, namespace) in prefixes.iter().filter(|(s, _)| writer.used.contains(s)) {
        out.push_str(&format!("@prefix {}: <{}> .\n", short, namespace));
    }
    if !out.is_empty() {
        out.push('\n');
    }
    out.push_str(&body);
    Ok(out)
}

/// One triple per line, for `INSERT DATA` bodies.
pub fn serialize_ntriples(triples: &[Triple]) -> String {
    triples.iter().map(|t| format!("{}\n", t)).collect()
}
