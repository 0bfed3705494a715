use crate::context::ValidationContext;
use crate::error::Result;
use crate::literal::compare_terms;
use crate::shape::Shape;
use oxigraph::model::Term;
use std::cmp::Ordering;

use super::{make_result, ComponentKind, ComponentLoader, FocusValueNodes, Outcome, ValidateComponent};

/// `sh:minExclusive`, `sh:minInclusive`, `sh:maxExclusive` and `sh:maxInclusive`.
///
/// A value that cannot be compared with the bound (a blank node, an IRI, a
/// string against a number) does not conform.
#[derive(Debug)]
pub struct RangeConstraintComponent {
    kind: ComponentKind,
    bound: Term,
}

impl RangeConstraintComponent {
    pub fn new(kind: ComponentKind, bound: Term) -> Self {
        RangeConstraintComponent { kind, bound }
    }

    pub(crate) fn load(kind: ComponentKind, loader: &ComponentLoader<'_>) -> Result<Self> {
        let predicate = kind.parameters()[0];
        let bound = loader.exactly_one(kind, predicate)?;
        if !matches!(bound, Term::Literal(_)) {
            return Err(loader.error(kind, format!("{} value must be a literal", predicate)));
        }
        Ok(Self::new(kind, bound))
    }

    pub fn kind(&self) -> ComponentKind {
        self.kind
    }

    fn holds(&self, value: &Term) -> bool {
        let Some(ord) = compare_terms(value, &self.bound) else {
            return false;
        };
        match self.kind {
            ComponentKind::MinExclusive => ord == Ordering::Greater,
            ComponentKind::MinInclusive => ord != Ordering::Less,
            ComponentKind::MaxExclusive => ord == Ordering::Less,
            _ => ord != Ordering::Greater,
        }
    }

    fn operator(&self) -> &'static str {
        match self.kind {
            ComponentKind::MinExclusive => ">",
            ComponentKind::MinInclusive => ">=",
            ComponentKind::MaxExclusive => "<",
            _ => "<=",
        }
    }
}

impl ValidateComponent for RangeConstraintComponent {
    fn evaluate(
        &self,
        _cx: &mut ValidationContext<'_>,
        shape: &Shape,
        focus_value_nodes: &FocusValueNodes,
    ) -> Result<Outcome> {
        let mut results = Vec::new();
        for (focus, values) in focus_value_nodes {
            for value in values.iter().filter(|v| !self.holds(v)) {
                results.push(make_result(shape, self.kind, focus, Some(value), || {
                    format!("Value is not {} {}", self.operator(), self.bound)
                }));
            }
        }
        Ok((results.is_empty(), results))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxigraph::model::vocab::xsd;
    use oxigraph::model::{BlankNode, Literal, NamedNode};

    fn int(v: &str) -> Term {
        Literal::new_typed_literal(v, xsd::INTEGER).into()
    }

    #[test]
    fn inclusive_and_exclusive_bounds() {
        let min_ex = RangeConstraintComponent::new(ComponentKind::MinExclusive, int("5"));
        let max_in = RangeConstraintComponent::new(ComponentKind::MaxInclusive, int("5"));
        assert!(!min_ex.holds(&int("5")));
        assert!(min_ex.holds(&int("6")));
        assert!(max_in.holds(&int("5")));
        assert!(!max_in.holds(&int("6")));
    }

    #[test]
    fn incomparable_values_fail() {
        let c = RangeConstraintComponent::new(ComponentKind::MinInclusive, int("0"));
        assert!(!c.holds(&BlankNode::default().into()));
        assert!(!c.holds(&NamedNode::new_unchecked("http://ex/a").into()));
        assert!(!c.holds(&Literal::new_simple_literal("10").into()));
    }
}
