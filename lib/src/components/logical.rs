use crate::context::ValidationContext;
use crate::error::Result;
use crate::named_nodes::SHACL;
use crate::shape::Shape;
use oxigraph::model::{NamedNodeRef, Term};

use super::{
    conforms_to, is_maybe_recursive, make_result, resolve_shape, term_list, ComponentKind,
    ComponentLoader, FocusValueNodes, Outcome, ValidateComponent,
};

#[derive(Debug)]
pub struct NotConstraintComponent {
    shapes: Vec<Term>,
}

impl NotConstraintComponent {
    pub(crate) fn load(loader: &ComponentLoader<'_>) -> Result<Self> {
        let shapes = loader.required(ComponentKind::Not, SHACL::new().not)?;
        Ok(NotConstraintComponent { shapes })
    }
}

impl ValidateComponent for NotConstraintComponent {
    fn evaluate(
        &self,
        cx: &mut ValidationContext<'_>,
        shape: &Shape,
        focus_value_nodes: &FocusValueNodes,
    ) -> Result<Outcome> {
        let kind = ComponentKind::Not;
        let mut results = Vec::new();
        for node in &self.shapes {
            let negated = resolve_shape(cx, node, kind)?;
            if is_maybe_recursive(cx, negated, kind) {
                return Ok((true, vec![]));
            }
            for (focus, values) in focus_value_nodes {
                for value in values {
                    if conforms_to(cx, negated, value)? {
                        results.push(make_result(shape, kind, focus, Some(value), || {
                            format!("Node {} must not conform to shape {}", value, negated.node())
                        }));
                    }
                }
            }
        }
        Ok((results.is_empty(), results))
    }
}

/// Loads every list value of `predicate` as a non-empty list of shape nodes.
fn load_shape_lists(
    kind: ComponentKind,
    loader: &ComponentLoader<'_>,
    predicate: NamedNodeRef<'_>,
) -> Result<Vec<Vec<Term>>> {
    let mut lists = Vec::new();
    for head in loader.required(kind, predicate)? {
        let members = loader.list(kind, &head)?;
        if members.is_empty() {
            return Err(loader.error(kind, format!("{} list must not be empty", predicate)));
        }
        lists.push(members);
    }
    Ok(lists)
}

/// How many members of the list a value node conforms to, and how many were
/// checked at all. Maybe-recursive members are not checked.
fn count_conforming(
    cx: &mut ValidationContext<'_>,
    kind: ComponentKind,
    members: &[&Shape],
    value: &Term,
) -> Result<(usize, usize)> {
    let mut passed = 0;
    let mut checked = 0;
    for member in members {
        if is_maybe_recursive(cx, member, kind) {
            continue;
        }
        checked += 1;
        if conforms_to(cx, member, value)? {
            passed += 1;
        }
    }
    Ok((passed, checked))
}

fn resolve_list<'s>(
    cx: &ValidationContext<'s>,
    nodes: &[Term],
    kind: ComponentKind,
) -> Result<Vec<&'s Shape>> {
    nodes.iter().map(|n| resolve_shape(cx, n, kind)).collect()
}

#[derive(Debug)]
pub struct AndConstraintComponent {
    lists: Vec<Vec<Term>>,
}

impl AndConstraintComponent {
    pub(crate) fn load(loader: &ComponentLoader<'_>) -> Result<Self> {
        let lists = load_shape_lists(ComponentKind::And, loader, SHACL::new().and_)?;
        Ok(AndConstraintComponent { lists })
    }
}

impl ValidateComponent for AndConstraintComponent {
    fn evaluate(
        &self,
        cx: &mut ValidationContext<'_>,
        shape: &Shape,
        focus_value_nodes: &FocusValueNodes,
    ) -> Result<Outcome> {
        let kind = ComponentKind::And;
        let mut results = Vec::new();
        for list in &self.lists {
            let members = resolve_list(cx, list, kind)?;
            for (focus, values) in focus_value_nodes {
                for value in values {
                    let (passed, checked) = count_conforming(cx, kind, &members, value)?;
                    if passed < checked {
                        results.push(make_result(shape, kind, focus, Some(value), || {
                            format!("Node {} must conform to all shapes in {}", value, term_list(list))
                        }));
                    }
                }
            }
        }
        Ok((results.is_empty(), results))
    }
}

#[derive(Debug)]
pub struct OrConstraintComponent {
    lists: Vec<Vec<Term>>,
}

impl OrConstraintComponent {
    pub(crate) fn load(loader: &ComponentLoader<'_>) -> Result<Self> {
        let lists = load_shape_lists(ComponentKind::Or, loader, SHACL::new().or_)?;
        Ok(OrConstraintComponent { lists })
    }
}

impl ValidateComponent for OrConstraintComponent {
    fn evaluate(
        &self,
        cx: &mut ValidationContext<'_>,
        shape: &Shape,
        focus_value_nodes: &FocusValueNodes,
    ) -> Result<Outcome> {
        let kind = ComponentKind::Or;
        let mut results = Vec::new();
        for list in &self.lists {
            let members = resolve_list(cx, list, kind)?;
            for (focus, values) in focus_value_nodes {
                for value in values {
                    let (passed, _) = count_conforming(cx, kind, &members, value)?;
                    if passed == 0 {
                        results.push(make_result(shape, kind, focus, Some(value), || {
                            format!(
                                "Node {} must conform to one or more shapes in {}",
                                value,
                                term_list(list)
                            )
                        }));
                    }
                }
            }
        }
        Ok((results.is_empty(), results))
    }
}

#[derive(Debug)]
pub struct XoneConstraintComponent {
    lists: Vec<Vec<Term>>,
}

impl XoneConstraintComponent {
    pub(crate) fn load(loader: &ComponentLoader<'_>) -> Result<Self> {
        let lists = load_shape_lists(ComponentKind::Xone, loader, SHACL::new().xone)?;
        Ok(XoneConstraintComponent { lists })
    }
}

impl ValidateComponent for XoneConstraintComponent {
    fn evaluate(
        &self,
        cx: &mut ValidationContext<'_>,
        shape: &Shape,
        focus_value_nodes: &FocusValueNodes,
    ) -> Result<Outcome> {
        let kind = ComponentKind::Xone;
        let mut results = Vec::new();
        for list in &self.lists {
            let members = resolve_list(cx, list, kind)?;
            for (focus, values) in focus_value_nodes {
                for value in values {
                    let (passed, _) = count_conforming(cx, kind, &members, value)?;
                    if passed != 1 {
                        results.push(make_result(shape, kind, focus, Some(value), || {
                            format!(
                                "Node {} must conform to exactly one shape in {}",
                                value,
                                term_list(list)
                            )
                        }));
                    }
                }
            }
        }
        Ok((results.is_empty(), results))
    }
}
