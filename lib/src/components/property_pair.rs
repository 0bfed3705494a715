use crate::context::ValidationContext;
use crate::error::{EngineError, Result};
use crate::literal::{compare_terms, is_string_literal};
use crate::shape::Shape;
use crate::types::sorted_terms;
use oxigraph::model::{NamedNode, NamedNodeRef, Term};
use std::cmp::Ordering;

use super::{make_result, ComponentKind, ComponentLoader, FocusValueNodes, Outcome, ValidateComponent};

fn load_predicates(
    kind: ComponentKind,
    loader: &ComponentLoader<'_>,
    predicate: NamedNodeRef<'_>,
) -> Result<Vec<NamedNode>> {
    loader
        .required(kind, predicate)?
        .into_iter()
        .map(|t| match t {
            Term::NamedNode(n) => Ok(n),
            other => Err(loader.error(kind, format!("{} value {} must be an IRI", predicate, other))),
        })
        .collect()
}

#[derive(Debug)]
pub struct EqualsConstraintComponent {
    predicates: Vec<NamedNode>,
}

impl EqualsConstraintComponent {
    pub(crate) fn load(loader: &ComponentLoader<'_>) -> Result<Self> {
        let kind = ComponentKind::Equals;
        let predicates = load_predicates(kind, loader, kind.parameters()[0])?;
        Ok(EqualsConstraintComponent { predicates })
    }
}

impl ValidateComponent for EqualsConstraintComponent {
    fn evaluate(
        &self,
        cx: &mut ValidationContext<'_>,
        shape: &Shape,
        focus_value_nodes: &FocusValueNodes,
    ) -> Result<Outcome> {
        let mut results = Vec::new();
        for predicate in &self.predicates {
            for (focus, values) in focus_value_nodes {
                let others = sorted_terms(cx.data().objects(focus, predicate.as_ref()));
                let missing = values.iter().filter(|v| !others.contains(v));
                let extra = others.iter().filter(|o| !values.contains(o));
                for value in missing.chain(extra) {
                    results.push(make_result(shape, ComponentKind::Equals, focus, Some(value), || {
                        format!("Value of {}->{} != {}", focus, predicate, value)
                    }));
                }
            }
        }
        Ok((results.is_empty(), results))
    }
}

#[derive(Debug)]
pub struct DisjointConstraintComponent {
    predicates: Vec<NamedNode>,
}

impl DisjointConstraintComponent {
    pub(crate) fn load(loader: &ComponentLoader<'_>) -> Result<Self> {
        let kind = ComponentKind::Disjoint;
        let predicates = load_predicates(kind, loader, kind.parameters()[0])?;
        Ok(DisjointConstraintComponent { predicates })
    }
}

impl ValidateComponent for DisjointConstraintComponent {
    fn evaluate(
        &self,
        cx: &mut ValidationContext<'_>,
        shape: &Shape,
        focus_value_nodes: &FocusValueNodes,
    ) -> Result<Outcome> {
        let mut results = Vec::new();
        for predicate in &self.predicates {
            for (focus, values) in focus_value_nodes {
                for value in values {
                    if cx.data().contains(focus, predicate.as_ref(), value) {
                        results.push(make_result(
                            shape,
                            ComponentKind::Disjoint,
                            focus,
                            Some(value),
                            || format!("Value of {}->{} == {}", focus, predicate, value),
                        ));
                    }
                }
            }
        }
        Ok((results.is_empty(), results))
    }
}

/// `sh:lessThan` and `sh:lessThanOrEquals`.
#[derive(Debug)]
pub struct LessThanConstraintComponent {
    kind: ComponentKind,
    predicates: Vec<NamedNode>,
}

impl LessThanConstraintComponent {
    pub(crate) fn load(kind: ComponentKind, loader: &ComponentLoader<'_>) -> Result<Self> {
        loader.require_property_shape(kind)?;
        let predicates = load_predicates(kind, loader, kind.parameters()[0])?;
        Ok(LessThanConstraintComponent { kind, predicates })
    }

    pub fn kind(&self) -> ComponentKind {
        self.kind
    }

    fn holds(&self, value: &Term, other: &Term) -> bool {
        let ord = match (string_operand(value), string_operand(other)) {
            (Some(a), Some(b)) => Some(a.cmp(b)),
            (None, None) => compare_terms(value, other),
            // string against non-string
            _ => None,
        };
        match (self.kind, ord) {
            (ComponentKind::LessThan, Some(Ordering::Less)) => true,
            (ComponentKind::LessThanOrEquals, Some(Ordering::Less | Ordering::Equal)) => true,
            _ => false,
        }
    }
}

/// IRIs and string literals compare by their text.
fn string_operand(term: &Term) -> Option<&str> {
    match term {
        Term::NamedNode(n) => Some(n.as_str()),
        Term::Literal(l) if is_string_literal(l) => Some(l.value()),
        _ => None,
    }
}

fn reject_blank(term: &Term, kind: ComponentKind) -> Result<()> {
    if matches!(term, Term::BlankNode(_)) {
        return Err(EngineError::Runtime(format!(
            "Cannot use {} to compare a BlankNode ({})",
            kind.name(),
            term
        )));
    }
    Ok(())
}

impl ValidateComponent for LessThanConstraintComponent {
    fn evaluate(
        &self,
        cx: &mut ValidationContext<'_>,
        shape: &Shape,
        focus_value_nodes: &FocusValueNodes,
    ) -> Result<Outcome> {
        let op = if self.kind == ComponentKind::LessThan { "<=" } else { "<" };
        let mut results = Vec::new();
        for predicate in &self.predicates {
            for (focus, values) in focus_value_nodes {
                let others = sorted_terms(cx.data().objects(focus, predicate.as_ref()));
                for value in values {
                    reject_blank(value, self.kind)?;
                    for other in &others {
                        reject_blank(other, self.kind)?;
                        if !self.holds(value, other) {
                            results.push(make_result(shape, self.kind, focus, Some(value), || {
                                format!("Value of {}->{} {} {}", focus, predicate, op, value)
                            }));
                        }
                    }
                }
            }
        }
        Ok((results.is_empty(), results))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxigraph::model::vocab::xsd;
    use oxigraph::model::Literal;

    fn lt(kind: ComponentKind) -> LessThanConstraintComponent {
        LessThanConstraintComponent {
            kind,
            predicates: vec![],
        }
    }

    fn int(v: &str) -> Term {
        Literal::new_typed_literal(v, xsd::INTEGER).into()
    }

    #[test]
    fn strict_and_non_strict() {
        assert!(lt(ComponentKind::LessThan).holds(&int("1"), &int("2")));
        assert!(!lt(ComponentKind::LessThan).holds(&int("2"), &int("2")));
        assert!(lt(ComponentKind::LessThanOrEquals).holds(&int("2"), &int("2")));
    }

    #[test]
    fn mixed_string_and_number_never_holds() {
        let s: Term = Literal::new_simple_literal("1").into();
        assert!(!lt(ComponentKind::LessThanOrEquals).holds(&s, &int("2")));
        let iri: Term = NamedNode::new_unchecked("http://ex/a").into();
        let later: Term = Literal::new_simple_literal("http://ex/b").into();
        assert!(lt(ComponentKind::LessThan).holds(&iri, &later));
    }
}
