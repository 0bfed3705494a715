use crate::backend::GraphBackend;
use crate::error::{EngineError, Result};
use crate::named_nodes::{RDF, RDFS, SHACL};
use oxigraph::model::{NamedNode, NamedNodeRef, Term, TermRef};
use std::collections::{HashSet, VecDeque};
use std::fmt;
use std::hash::Hash;

/// Index of a shape inside the [`ShapesGraph`](crate::shapes_graph::ShapesGraph) arena.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShapeId(pub u64);

impl From<u64> for ShapeId {
    fn from(item: u64) -> Self {
        ShapeId(item)
    }
}

impl fmt::Display for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}", self.0)
    }
}

impl ShapeId {
    pub(crate) fn index(&self) -> usize {
        self.0 as usize
    }
}

/// A SHACL property path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Path {
    Predicate(NamedNode),
    Inverse(Box<Path>),
    Sequence(Vec<Path>),
    Alternative(Vec<Path>),
    ZeroOrMore(Box<Path>),
    OneOrMore(Box<Path>),
    ZeroOrOne(Box<Path>),
}

impl Path {
    /// Renders the path in SPARQL 1.1 property path syntax.
    pub fn to_sparql_path(&self) -> Result<String> {
        match self {
            Path::Predicate(nn) => Ok(format!("<{}>", nn.as_str())),
            Path::Inverse(inner) => Ok(format!("^{}", inner.to_sparql_operand()?)),
            Path::Sequence(paths) => {
                if paths.len() < 2 {
                    return Err(EngineError::malformed_path(
                        self,
                        format!(
                            "sequence path must have at least two members, found {}",
                            paths.len()
                        ),
                    ));
                }
                let parts = paths
                    .iter()
                    .map(Path::to_sparql_path)
                    .collect::<Result<Vec<_>>>()?;
                // always parenthesized so the result can be nested
                Ok(format!("({})", parts.join(" / ")))
            }
            Path::Alternative(paths) => {
                if paths.len() < 2 {
                    return Err(EngineError::malformed_path(
                        self,
                        format!(
                            "alternative path must have at least two members, found {}",
                            paths.len()
                        ),
                    ));
                }
                let parts = paths
                    .iter()
                    .map(Path::to_sparql_path)
                    .collect::<Result<Vec<_>>>()?;
                Ok(format!("({})", parts.join(" | ")))
            }
            Path::ZeroOrMore(inner) => Ok(format!("{}*", inner.to_sparql_operand()?)),
            Path::OneOrMore(inner) => Ok(format!("{}+", inner.to_sparql_operand()?)),
            Path::ZeroOrOne(inner) => Ok(format!("{}?", inner.to_sparql_operand()?)),
        }
    }

    /// The path as the operand of `^` or a modifier. Inverse and modified
    /// paths are parenthesized, sequences and alternatives already are.
    fn to_sparql_operand(&self) -> Result<String> {
        match self {
            Path::Inverse(_) | Path::ZeroOrMore(_) | Path::OneOrMore(_) | Path::ZeroOrOne(_) => {
                Ok(format!("({})", self.to_sparql_path()?))
            }
            _ => self.to_sparql_path(),
        }
    }

    /// Nesting depth of the path expression. A bare predicate has depth 1.
    pub fn depth(&self) -> usize {
        match self {
            Path::Predicate(_) => 1,
            Path::Inverse(p) | Path::ZeroOrMore(p) | Path::OneOrMore(p) | Path::ZeroOrOne(p) => {
                1 + p.depth()
            }
            Path::Sequence(ps) | Path::Alternative(ps) => {
                1 + ps.iter().map(Path::depth).max().unwrap_or(0)
            }
        }
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Path::Predicate(p) => write!(f, "{}", p),
            Path::Inverse(p) => write!(f, "^{}", p),
            Path::Sequence(ps) => write_joined(f, ps, " / "),
            Path::Alternative(ps) => write_joined(f, ps, " | "),
            Path::ZeroOrMore(p) => write!(f, "{}*", p),
            Path::OneOrMore(p) => write!(f, "{}+", p),
            Path::ZeroOrOne(p) => write!(f, "{}?", p),
        }
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, paths: &[Path], sep: &str) -> fmt::Result {
    write!(f, "(")?;
    for (i, p) in paths.iter().enumerate() {
        if i > 0 {
            write!(f, "{}", sep)?;
        }
        write!(f, "{}", p)?;
    }
    write!(f, ")")
}

/// A target declaration on a shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Class(Term),
    Node(Term),
    SubjectsOf(NamedNode),
    ObjectsOf(NamedNode),
}

impl Target {
    pub fn from_predicate_object(predicate: NamedNodeRef, object: TermRef) -> Option<Self> {
        let shacl = SHACL::new();
        if predicate == shacl.target_class {
            Some(Target::Class(object.into_owned()))
        } else if predicate == shacl.target_node {
            Some(Target::Node(object.into_owned()))
        } else if predicate == shacl.target_subjects_of {
            match object {
                TermRef::NamedNode(p) => Some(Target::SubjectsOf(p.into_owned())),
                _ => None, // predicate for SubjectsOf must be an IRI
            }
        } else if predicate == shacl.target_objects_of {
            match object {
                TermRef::NamedNode(p) => Some(Target::ObjectsOf(p.into_owned())),
                _ => None,
            }
        } else {
            None
        }
    }

    /// Resolves the target against a data graph.
    pub fn get_target_nodes(&self, data: &dyn GraphBackend) -> Vec<Term> {
        match self {
            Target::Node(t) => {
                if data.contains_term(t) {
                    vec![t.clone()]
                } else {
                    vec![]
                }
            }
            Target::Class(c) => instances_of_class(data, c),
            Target::SubjectsOf(p) => data.subjects_with_predicate(p.as_ref()),
            Target::ObjectsOf(p) => data.objects_with_predicate(p.as_ref()),
        }
    }
}

/// All SHACL instances of `class`: nodes typed with it or any transitive subclass.
pub(crate) fn instances_of_class(data: &dyn GraphBackend, class: &Term) -> Vec<Term> {
    let rdf = RDF::new();
    let mut instances = Vec::new();
    let mut seen_instances = HashSet::new();
    for c in subclass_closure(data, class) {
        for inst in data.subjects(rdf.type_, &c) {
            if seen_instances.insert(inst.clone()) {
                instances.push(inst);
            }
        }
    }
    instances
}

/// The class itself followed by all of its transitive subclasses.
pub(crate) fn subclass_closure(data: &dyn GraphBackend, class: &Term) -> Vec<Term> {
    let rdfs = RDFS::new();
    let mut seen = HashSet::new();
    let mut ordered = Vec::new();
    let mut queue = VecDeque::from([class.clone()]);
    while let Some(c) = queue.pop_front() {
        if !seen.insert(c.clone()) {
            continue;
        }
        for sub in data.subjects(rdfs.sub_class_of, &c) {
            if !seen.contains(&sub) {
                queue.push_back(sub);
            }
        }
        ordered.push(c);
    }
    ordered
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Severity {
    Info,
    Warning,
    #[default]
    Violation,
    /// A severity IRI outside of the three SHACL levels.
    Other(NamedNode),
}

impl Severity {
    pub fn from_term(term: &Term) -> Option<Self> {
        let shacl = SHACL::new();
        match term {
            Term::NamedNode(nn) if *nn == shacl.info => Some(Severity::Info),
            Term::NamedNode(nn) if *nn == shacl.warning => Some(Severity::Warning),
            Term::NamedNode(nn) if *nn == shacl.violation => Some(Severity::Violation),
            Term::NamedNode(nn) => Some(Severity::Other(nn.clone())),
            _ => None,
        }
    }

    pub fn to_named_node(&self) -> NamedNode {
        let shacl = SHACL::new();
        match self {
            Severity::Info => shacl.info.into_owned(),
            Severity::Warning => shacl.warning.into_owned(),
            Severity::Violation => shacl.violation.into_owned(),
            Severity::Other(nn) => nn.clone(),
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "sh:Info"),
            Severity::Warning => write!(f, "sh:Warning"),
            Severity::Violation => write!(f, "sh:Violation"),
            Severity::Other(nn) => write!(f, "{}", nn),
        }
    }
}

/// Values allowed for `sh:nodeKind`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Iri,
    BlankNode,
    Literal,
    BlankNodeOrIri,
    BlankNodeOrLiteral,
    IriOrLiteral,
}

impl NodeKind {
    pub fn from_term(term: &Term) -> Option<Self> {
        let shacl = SHACL::new();
        let Term::NamedNode(nn) = term else {
            return None;
        };
        let kind = if *nn == shacl.iri {
            NodeKind::Iri
        } else if *nn == shacl.blank_node {
            NodeKind::BlankNode
        } else if *nn == shacl.literal {
            NodeKind::Literal
        } else if *nn == shacl.blank_node_or_iri {
            NodeKind::BlankNodeOrIri
        } else if *nn == shacl.blank_node_or_literal {
            NodeKind::BlankNodeOrLiteral
        } else if *nn == shacl.iri_or_literal {
            NodeKind::IriOrLiteral
        } else {
            return None;
        };
        Some(kind)
    }

    pub fn matches(&self, term: &Term) -> bool {
        match term {
            Term::NamedNode(_) => matches!(
                self,
                NodeKind::Iri | NodeKind::BlankNodeOrIri | NodeKind::IriOrLiteral
            ),
            Term::BlankNode(_) => matches!(
                self,
                NodeKind::BlankNode | NodeKind::BlankNodeOrIri | NodeKind::BlankNodeOrLiteral
            ),
            Term::Literal(_) => matches!(
                self,
                NodeKind::Literal | NodeKind::BlankNodeOrLiteral | NodeKind::IriOrLiteral
            ),
            #[allow(unreachable_patterns)]
            _ => false,
        }
    }

    pub fn local_name(&self) -> &'static str {
        match self {
            NodeKind::Iri => "IRI",
            NodeKind::BlankNode => "BlankNode",
            NodeKind::Literal => "Literal",
            NodeKind::BlankNodeOrIri => "BlankNodeOrIRI",
            NodeKind::BlankNodeOrLiteral => "BlankNodeOrLiteral",
            NodeKind::IriOrLiteral => "IRIOrLiteral",
        }
    }
}

/// Sorts and deduplicates terms by their N-Triples form so that output order is stable.
pub(crate) fn sorted_terms<I: IntoIterator<Item = Term>>(terms: I) -> Vec<Term> {
    let mut seen = HashSet::new();
    let mut out: Vec<Term> = terms.into_iter().filter(|t| seen.insert(t.clone())).collect();
    out.sort_by_cached_key(|t| t.to_string());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(iri: &str) -> Path {
        Path::Predicate(NamedNode::new_unchecked(iri))
    }

    #[test]
    fn sparql_path_rendering() {
        let path = Path::Sequence(vec![
            p("http://ex/a"),
            Path::ZeroOrMore(Box::new(Path::Inverse(Box::new(p("http://ex/b"))))),
        ]);
        assert_eq!(
            path.to_sparql_path().unwrap(),
            "(<http://ex/a> / (^<http://ex/b>)*)"
        );
    }

    #[test]
    fn nested_modifiers_are_parenthesized() {
        let b = || Box::new(p("http://ex/b"));
        let optional_plus = Path::ZeroOrOne(Box::new(Path::OneOrMore(b())));
        assert_eq!(optional_plus.to_sparql_path().unwrap(), "(<http://ex/b>+)?");
        let double_inverse = Path::Inverse(Box::new(Path::Inverse(b())));
        assert_eq!(double_inverse.to_sparql_path().unwrap(), "^(^<http://ex/b>)");
        let inverse_star = Path::Inverse(Box::new(Path::ZeroOrMore(b())));
        assert_eq!(inverse_star.to_sparql_path().unwrap(), "^(<http://ex/b>*)");
        let sequence_star = Path::ZeroOrMore(Box::new(Path::Sequence(vec![*b(), p("http://ex/c")])));
        assert_eq!(
            sequence_star.to_sparql_path().unwrap(),
            "(<http://ex/b> / <http://ex/c>)*"
        );
    }

    #[test]
    fn short_alternative_is_rejected() {
        let path = Path::Alternative(vec![p("http://ex/a")]);
        assert!(matches!(
            path.to_sparql_path(),
            Err(EngineError::MalformedPath { .. })
        ));
    }

    #[test]
    fn node_kind_matching() {
        let iri: Term = NamedNode::new_unchecked("http://ex/a").into();
        let lit: Term = oxigraph::model::Literal::new_simple_literal("x").into();
        assert!(NodeKind::IriOrLiteral.matches(&iri));
        assert!(NodeKind::IriOrLiteral.matches(&lit));
        assert!(!NodeKind::BlankNodeOrIri.matches(&lit));
        assert!(!NodeKind::Literal.matches(&iri));
    }

    #[test]
    fn severity_defaults_to_violation() {
        assert_eq!(Severity::default(), Severity::Violation);
        let info: Term = SHACL::new().info.into_owned().into();
        assert_eq!(Severity::from_term(&info), Some(Severity::Info));
    }
}
