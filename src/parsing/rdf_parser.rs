use crate::core::{vocab, Term, Triple};
use crate::error::{Error, Result};
use oxigraph::io::{RdfFormat, RdfParser};
use oxigraph::model::Term as OxTerm;

/// Input syntaxes accepted by [`parse_document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RdfSyntax {
    NTriples,
    Turtle,
}

impl RdfSyntax {
    /// Guess the syntax from a file name.
    pub fn from_extension(path: &str) -> Option<RdfSyntax> {
        let lower = path.to_lowercase();
        if lower.ends_with(".nt") {
            Some(RdfSyntax::NTriples)
        } else if lower.ends_with(".ttl") || lower.ends_with(".turtle") {
            Some(RdfSyntax::Turtle)
        } else {
            None
        }
    }
}

/// Parse a whole document into triples, in document order.
pub fn parse_document(text: &str, syntax: RdfSyntax) -> Result<Vec<Triple>> {
    match syntax {
        RdfSyntax::NTriples => text
            .lines()
            .enumerate()
            .filter(|(_, line)| {
                let line = line.trim();
                !line.is_empty() && !line.starts_with('#')
            })
            .map(|(number, line)| {
                parse_ntriples_line(line)
                    .map_err(|e| Error::Parse(format!("line {}: {}", number + 1, e)))
            })
            .collect(),
        RdfSyntax::Turtle => parse_turtle(text),
    }
}

/// Parse Turtle with oxigraph and convert its terms into ours.
pub fn parse_turtle(text: &str) -> Result<Vec<Triple>> {
    read_turtle(RdfParser::from_format(RdfFormat::Turtle), text)
}

/// Parse a Turtle document fetched from `base`, resolving relative IRIs against it.
pub fn parse_turtle_with_base(text: &str, base: &str) -> Result<Vec<Triple>> {
    let parser = RdfParser::from_format(RdfFormat::Turtle)
        .with_base_iri(base)
        .map_err(|e| Error::Parse(format!("invalid base IRI '{}': {}", base, e)))?;
    read_turtle(parser, text)
}

fn read_turtle(parser: RdfParser, text: &str) -> Result<Vec<Triple>> {
    let mut triples = Vec::new();
    for quad in parser.for_slice(text.as_bytes()) {
        let quad = quad.map_err(|e| Error::Parse(e.to_string()))?;
        let subject: OxTerm = quad.subject.into();
        triples.push(Triple::new(
            convert_term(subject)?,
            quad.predicate.into_string(),
            convert_term(quad.object)?,
        ));
    }
    Ok(triples)
}

fn convert_term(term: OxTerm) -> Result<Term> {
    match term {
        OxTerm::NamedNode(node) => Ok(Term::NamedNode(node.into_string())),
        OxTerm::BlankNode(node) => Ok(Term::BlankNode(node.as_str().to_string())),
        OxTerm::Literal(literal) => {
            let value = literal.value().to_string();
            if let Some(language) = literal.language() {
                return Ok(Term::lang_literal(value, language));
            }
            let datatype = literal.datatype().as_str();
            if datatype == vocab::XSD_STRING {
                Ok(Term::literal(value))
            } else {
                Ok(Term::typed_literal(value, datatype))
            }
        }
        #[allow(unreachable_patterns)]
        other => Err(Error::Parse(format!("unsupported term: {}", other))),
    }
}

/// Parse a line of N-Triples into a Triple.
/// Supports blank nodes and typed / language-tagged literals.
pub fn parse_ntriples_line(line: &str) -> Result<Triple> {
    let trimmed = line.trim();

    if trimmed.is_empty() {
        return Err(Error::Parse("Empty line".to_string()));
    }
    if trimmed.starts_with('#') {
        return Err(Error::Parse("Comment line".to_string()));
    }

    let trimmed = trimmed
        .strip_suffix('.')
        .ok_or_else(|| Error::Parse(format!("Missing terminating '.': {}", trimmed)))?
        .trim_end();

    let (subject, remaining) = parse_resource(trimmed, "subject")?;
    let (predicate, remaining) = parse_iri(remaining, "predicate")?;
    let (object, remaining) = parse_object(remaining)?;

    if !remaining.trim().is_empty() {
        return Err(Error::Parse(format!("Unexpected trailing content: {}", remaining.trim())));
    }

    Ok(Triple::new(subject, predicate, object))
}

/// Parse an IRI enclosed in angle brackets
fn parse_iri<'a>(input: &'a str, field_name: &str) -> Result<(String, &'a str)> {
    let input = input.trim_start();

    if !input.starts_with('<') {
        return Err(Error::Parse(format!("Expected '<' for {} IRI, got: {}", field_name, input)));
    }

    let end_idx = input
        .find('>')
        .ok_or_else(|| Error::Parse(format!("Missing closing '>' for {} IRI", field_name)))?;

    let iri = input[1..end_idx].to_string();
    let remaining = input[end_idx + 1..].trim_start();

    Ok((iri, remaining))
}

/// Parse a blank node label (`_:name`)
fn parse_blank<'a>(input: &'a str, field_name: &str) -> Result<(String, &'a str)> {
    let input = input.trim_start();
    let rest = input
        .strip_prefix("_:")
        .ok_or_else(|| Error::Parse(format!("Expected '_:' for {} blank node", field_name)))?;
    let end_idx = rest.find(char::is_whitespace).unwrap_or(rest.len());
    if end_idx == 0 {
        return Err(Error::Parse(format!("Empty blank node label for {}", field_name)));
    }
    Ok((rest[..end_idx].to_string(), rest[end_idx..].trim_start()))
}

/// Subjects are either IRIs or blank nodes
fn parse_resource<'a>(input: &'a str, field_name: &str) -> Result<(Term, &'a str)> {
    let input = input.trim_start();
    if input.starts_with("_:") {
        let (label, rest) = parse_blank(input, field_name)?;
        Ok((Term::BlankNode(label), rest))
    } else {
        let (iri, rest) = parse_iri(input, field_name)?;
        Ok((Term::NamedNode(iri), rest))
    }
}

/// Parse object which can be:
/// - IRI: <http://example.org/resource>
/// - Blank node: _:b0
/// - Plain literal: "some text"
/// - Typed literal: "23.5"^^<http://www.w3.org/2001/XMLSchema#decimal>
/// - Language-tagged literal: "hello"@en
fn parse_object(input: &str) -> Result<(Term, &str)> {
    let input = input.trim_start();

    if input.starts_with('"') {
        return parse_literal(input);
    }

    parse_resource(input, "object")
        .map_err(|_| Error::Parse(format!("Invalid object format: {}", input)))
}

/// Parse a literal with optional datatype or language tag
fn parse_literal(input: &str) -> Result<(Term, &str)> {
    let input = input.trim_start();

    if !input.starts_with('"') {
        return Err(Error::Parse("Literal must start with '\"'".to_string()));
    }

    // Walk the characters, unescaping as we go, until the closing quote
    let mut value = String::new();
    let mut escaped = false;
    let mut end_byte = None;
    for (idx, c) in input.char_indices().skip(1) {
        if escaped {
            value.push(match c {
                'n' => '\n',
                'r' => '\r',
                't' => '\t',
                other => other,
            });
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == '"' {
            end_byte = Some(idx);
            break;
        } else {
            value.push(c);
        }
    }

    let end_byte =
        end_byte.ok_or_else(|| Error::Parse("Missing closing quote for literal".to_string()))?;
    let after_quote = &input[end_byte + 1..];

    if let Some(after_caret) = after_quote.strip_prefix("^^") {
        let (datatype, rest) = parse_iri(after_caret, "datatype")?;
        let term = if datatype == vocab::XSD_STRING {
            Term::literal(value)
        } else {
            Term::typed_literal(value, datatype)
        };
        Ok((term, rest))
    } else if let Some(after_at) = after_quote.strip_prefix('@') {
        let lang_end = after_at.find(char::is_whitespace).unwrap_or(after_at.len());
        if lang_end == 0 {
            return Err(Error::Parse("Empty language tag".to_string()));
        }
        Ok((Term::lang_literal(value, &after_at[..lang_end]), after_at[lang_end..].trim_start()))
    } else {
        Ok((Term::literal(value), after_quote.trim_start()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_typed_literal() {
        let line = r#"<http://example.org/sensor1> <http://example.org/temperature> "23.5"^^<http://www.w3.org/2001/XMLSchema#decimal> ."#;
        let triple = parse_ntriples_line(line).unwrap();

        assert_eq!(triple.subject, Term::named("http://example.org/sensor1"));
        assert_eq!(triple.predicate, "http://example.org/temperature");
        assert_eq!(
            triple.object,
            Term::typed_literal("23.5", "http://www.w3.org/2001/XMLSchema#decimal")
        );
    }

    #[test]
    fn test_parse_plain_literal_with_escapes() {
        let line = r#"<http://example.org/s> <http://example.org/name> "A \"quoted\" name" ."#;
        let triple = parse_ntriples_line(line).unwrap();

        assert_eq!(triple.object, Term::literal("A \"quoted\" name"));
    }

    #[test]
    fn test_parse_language_literal() {
        let line = r#"<http://example.org/s> <http://example.org/label> "hallo"@nl ."#;
        let triple = parse_ntriples_line(line).unwrap();

        assert_eq!(triple.object, Term::lang_literal("hallo", "nl"));
    }

    #[test]
    fn test_parse_blank_nodes() {
        let line = r#"_:b1 <http://example.org/next> _:b2 ."#;
        let triple = parse_ntriples_line(line).unwrap();

        assert_eq!(triple.subject, Term::blank("b1"));
        assert_eq!(triple.object, Term::blank("b2"));
    }

    #[test]
    fn test_rejects_missing_dot() {
        let line = r#"<http://example.org/s> <http://example.org/p> <http://example.org/o>"#;
        assert!(parse_ntriples_line(line).is_err());
    }

    #[test]
    fn test_document_skips_comments() {
        let doc = "# header\n<http://e.org/s> <http://e.org/p> \"v\" .\n\n";
        let triples = parse_document(doc, RdfSyntax::NTriples).unwrap();
        assert_eq!(triples.len(), 1);
    }

    #[test]
    fn test_parse_turtle_converts_terms() {
        let doc = r#"
            @prefix ex: <http://example.org/> .
            ex:s ex:p [ ex:q "1"^^<http://www.w3.org/2001/XMLSchema#integer> ] ;
                 ex:name "plain" .
        "#;
        let triples = parse_turtle(doc).unwrap();
        assert_eq!(triples.len(), 3);
        assert!(triples.iter().any(|t| t.object == Term::literal("plain")));
        assert!(triples.iter().any(|t| t.subject.is_blank()));
    }

    #[test]
    fn test_parse_turtle_resolves_relative_iris() {
        let doc = "<#EventStream> <https://w3id.org/tree#shape> <shape> .";
        let triples = parse_turtle_with_base(doc, "http://pod/stream/.meta").unwrap();

        assert_eq!(triples[0].subject, Term::named("http://pod/stream/.meta#EventStream"));
        assert_eq!(triples[0].object, Term::named("http://pod/stream/shape"));
    }

    #[test]
    fn test_syntax_from_extension() {
        assert_eq!(RdfSyntax::from_extension("data.TTL"), Some(RdfSyntax::Turtle));
        assert_eq!(RdfSyntax::from_extension("data.nt"), Some(RdfSyntax::NTriples));
        assert_eq!(RdfSyntax::from_extension("data.json"), None);
    }
}
