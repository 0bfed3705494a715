//! Property path parsing and evaluation.
//!
//! Parsing reads a path expression out of the shapes graph. Evaluation walks a
//! parsed [`Path`] over the data graph from a focus node. Both recurse over
//! the path structure and share the same nesting bound; transitive operators
//! over the data graph are bounded by their visited sets instead.

use crate::backend::GraphBackend;
use crate::error::{EngineError, Result};
use crate::named_nodes::{RDF, SHACL};
use crate::types::{sorted_terms, Path};
use oxigraph::model::{NamedNodeRef, Term};
use std::collections::HashSet;

/// Maximum nesting of path operators, both when parsing and evaluating.
pub const MAX_PATH_DEPTH: usize = 10;

/// Reads the path expression rooted at `node` in the shapes graph.
pub fn parse_path(shapes: &dyn GraphBackend, node: &Term) -> Result<Path> {
    parse_path_at(shapes, node, 0)
}

fn parse_path_at(shapes: &dyn GraphBackend, node: &Term, depth: usize) -> Result<Path> {
    if depth > MAX_PATH_DEPTH {
        return Err(EngineError::PathTooDeep { depth });
    }
    let sh = SHACL::new();
    let rdf = RDF::new();
    match node {
        Term::NamedNode(p) => return Ok(Path::Predicate(p.clone())),
        Term::BlankNode(_) => {}
        _ => {
            return Err(EngineError::malformed_path(
                node,
                "a path must be an IRI or a blank node",
            ))
        }
    }

    // a blank node with rdf:first is a sequence path
    if !shapes.objects(node, rdf.first).is_empty() {
        let members = parse_list(shapes, node, depth)?;
        if members.len() < 2 {
            return Err(EngineError::malformed_path(
                node,
                format!(
                    "sequence path must have at least two members, found {}",
                    members.len()
                ),
            ));
        }
        return Ok(Path::Sequence(members));
    }

    let unary: [(NamedNodeRef<'_>, fn(Box<Path>) -> Path); 4] = [
        (sh.inverse_path, Path::Inverse),
        (sh.zero_or_more_path, Path::ZeroOrMore),
        (sh.one_or_more_path, Path::OneOrMore),
        (sh.zero_or_one_path, Path::ZeroOrOne),
    ];
    let mut found: Option<Path> = None;
    for (predicate, build) in unary {
        let objects = shapes.objects(node, predicate);
        if objects.is_empty() {
            continue;
        }
        if objects.len() > 1 || found.is_some() {
            return Err(EngineError::malformed_path(
                node,
                "a path node must have exactly one path operator",
            ));
        }
        let inner = parse_path_at(shapes, &objects[0], depth + 1)?;
        found = Some(build(Box::new(inner)));
    }

    let alternatives = shapes.objects(node, sh.alternative_path);
    if !alternatives.is_empty() {
        if alternatives.len() > 1 || found.is_some() {
            return Err(EngineError::malformed_path(
                node,
                "a path node must have exactly one path operator",
            ));
        }
        let members = parse_list(shapes, &alternatives[0], depth)?;
        if members.len() < 2 {
            return Err(EngineError::malformed_path(
                node,
                format!(
                    "alternative path must have at least two members, found {}",
                    members.len()
                ),
            ));
        }
        found = Some(Path::Alternative(members));
    }

    found.ok_or_else(|| EngineError::malformed_path(node, "blank node is not a path expression"))
}

fn parse_list(shapes: &dyn GraphBackend, head: &Term, depth: usize) -> Result<Vec<Path>> {
    let items = shapes
        .items(head)
        .ok_or_else(|| EngineError::malformed_path(head, "path list is not a well-formed RDF list"))?;
    items
        .iter()
        .map(|item| parse_path_at(shapes, item, depth + 1))
        .collect()
}

/// Value nodes reachable from `focus` via `path`, in a stable order.
pub fn value_nodes(data: &dyn GraphBackend, focus: &Term, path: &Path) -> Result<Vec<Term>> {
    let start = HashSet::from([focus.clone()]);
    let reached = step(data, &start, path, false, 0)?;
    Ok(sorted_terms(reached))
}

/// Evaluates `path` from every node in `start`. With `inverse` set, the path is
/// walked backwards (objects to subjects).
fn step(
    data: &dyn GraphBackend,
    start: &HashSet<Term>,
    path: &Path,
    inverse: bool,
    depth: usize,
) -> Result<HashSet<Term>> {
    if depth > MAX_PATH_DEPTH {
        return Err(EngineError::PathTooDeep { depth });
    }
    let mut out = HashSet::new();
    match path {
        Path::Predicate(p) => {
            for node in start {
                let next = if inverse {
                    data.subjects(p.as_ref(), node)
                } else {
                    data.objects(node, p.as_ref())
                };
                out.extend(next);
            }
        }
        Path::Inverse(inner) => {
            out = step(data, start, inner, !inverse, depth + 1)?;
        }
        Path::Sequence(members) => {
            let mut current = start.clone();
            let ordered: Vec<&Path> = if inverse {
                members.iter().rev().collect()
            } else {
                members.iter().collect()
            };
            for member in ordered {
                if current.is_empty() {
                    break;
                }
                current = step(data, &current, member, inverse, depth + 1)?;
            }
            out = current;
        }
        Path::Alternative(members) => {
            for member in members {
                out.extend(step(data, start, member, inverse, depth + 1)?);
            }
        }
        Path::ZeroOrMore(inner) => {
            out = closure(data, start, inner, inverse, depth)?;
            out.extend(start.iter().cloned());
        }
        Path::OneOrMore(inner) => {
            out = closure(data, start, inner, inverse, depth)?;
        }
        Path::ZeroOrOne(inner) => {
            out = step(data, start, inner, inverse, depth + 1)?;
            out.extend(start.iter().cloned());
        }
    }
    Ok(out)
}

/// Nodes reachable by one or more applications of `inner`, computed as a
/// fixpoint over newly discovered nodes.
fn closure(
    data: &dyn GraphBackend,
    start: &HashSet<Term>,
    inner: &Path,
    inverse: bool,
    depth: usize,
) -> Result<HashSet<Term>> {
    let mut reached = HashSet::new();
    let mut frontier = step(data, start, inner, inverse, depth + 1)?;
    while !frontier.is_empty() {
        let fresh: HashSet<Term> = frontier
            .into_iter()
            .filter(|n| reached.insert(n.clone()))
            .collect();
        if fresh.is_empty() {
            break;
        }
        frontier = step(data, &fresh, inner, inverse, depth + 1)?;
    }
    Ok(reached)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::parse_turtle;
    use oxigraph::model::NamedNode;

    fn ex(local: &str) -> Term {
        NamedNode::new_unchecked(format!("http://example.org/{}", local)).into()
    }

    fn path_of(shapes: &str) -> Result<Path> {
        let g = parse_turtle(shapes).unwrap();
        let sh = SHACL::new();
        let node = g.object(&ex("S"), sh.path).unwrap();
        parse_path(&g, &node)
    }

    const CHAIN: &str = r#"
        @prefix ex: <http://example.org/> .
        ex:a ex:next ex:b .
        ex:b ex:next ex:c .
        ex:c ex:next ex:a .
        ex:d ex:next ex:e .
        ex:a ex:label "A" .
        ex:b ex:label "B" .
    "#;

    #[test]
    fn parses_nested_paths() {
        let path = path_of(
            r#"
            @prefix ex: <http://example.org/> .
            @prefix sh: <http://www.w3.org/ns/shacl#> .
            ex:S sh:path ( ex:p [ sh:inversePath ex:q ] [ sh:alternativePath ( ex:r [ sh:zeroOrMorePath ex:s ] ) ] ) .
        "#,
        )
        .unwrap();
        let Path::Sequence(members) = &path else {
            panic!("expected a sequence, got {path}");
        };
        assert_eq!(members.len(), 3);
        assert!(matches!(members[1], Path::Inverse(_)));
        assert!(matches!(&members[2], Path::Alternative(alts) if alts.len() == 2));
    }

    #[test]
    fn one_member_sequence_is_malformed() {
        let err = path_of(
            r#"
            @prefix ex: <http://example.org/> .
            @prefix sh: <http://www.w3.org/ns/shacl#> .
            ex:S sh:path ( ex:p ) .
        "#,
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::MalformedPath { .. }));
    }

    #[test]
    fn one_member_alternative_is_malformed() {
        let err = path_of(
            r#"
            @prefix ex: <http://example.org/> .
            @prefix sh: <http://www.w3.org/ns/shacl#> .
            ex:S sh:path [ sh:alternativePath ( ex:p ) ] .
        "#,
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::MalformedPath { .. }));
    }

    #[test]
    fn literal_path_is_malformed() {
        let err = path_of(
            r#"
            @prefix ex: <http://example.org/> .
            @prefix sh: <http://www.w3.org/ns/shacl#> .
            ex:S sh:path "ex:p" .
        "#,
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::MalformedPath { .. }));
    }

    #[test]
    fn transitive_paths_terminate_on_cycles() {
        let g = parse_turtle(CHAIN).unwrap();
        let next = Path::Predicate(NamedNode::new_unchecked("http://example.org/next"));
        let star = Path::ZeroOrMore(Box::new(next.clone()));
        let plus = Path::OneOrMore(Box::new(next.clone()));

        let from_a = value_nodes(&g, &ex("a"), &star).unwrap();
        assert_eq!(from_a, vec![ex("a"), ex("b"), ex("c")]);
        // a is on a cycle, so it is reachable in one or more hops
        assert!(value_nodes(&g, &ex("a"), &plus).unwrap().contains(&ex("a")));
        // d is not
        assert_eq!(value_nodes(&g, &ex("d"), &plus).unwrap(), vec![ex("e")]);
        assert_eq!(value_nodes(&g, &ex("d"), &star).unwrap(), vec![ex("d"), ex("e")]);
    }

    #[test]
    fn zero_or_more_is_focus_plus_one_or_more() {
        let g = parse_turtle(CHAIN).unwrap();
        let next = Path::Predicate(NamedNode::new_unchecked("http://example.org/next"));
        for focus in ["a", "b", "d", "e", "missing"] {
            let f = ex(focus);
            let star = value_nodes(&g, &f, &Path::ZeroOrMore(Box::new(next.clone()))).unwrap();
            let plus = value_nodes(&g, &f, &Path::OneOrMore(Box::new(next.clone()))).unwrap();
            let expected = sorted_terms(plus.into_iter().chain([f.clone()]));
            assert_eq!(star, expected);
        }
    }

    #[test]
    fn inverse_of_sequence_walks_backwards() {
        let g = parse_turtle(CHAIN).unwrap();
        let next = Path::Predicate(NamedNode::new_unchecked("http://example.org/next"));
        let label = Path::Predicate(NamedNode::new_unchecked("http://example.org/label"));
        let seq = Path::Sequence(vec![next.clone(), next]);
        // c -> a -> b, so the inverse of next/next from b is c
        let inv = Path::Inverse(Box::new(seq));
        assert_eq!(value_nodes(&g, &ex("b"), &inv).unwrap(), vec![ex("c")]);
        let alt = Path::Alternative(vec![label, Path::ZeroOrOne(Box::new(Path::Predicate(
            NamedNode::new_unchecked("http://example.org/next"),
        )))]);
        assert_eq!(value_nodes(&g, &ex("a"), &alt).unwrap().len(), 3);
    }
}
