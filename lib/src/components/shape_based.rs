use crate::context::ValidationContext;
use crate::error::{EngineError, Result};
use crate::named_nodes::SHACL;
use crate::report::ValidationResult;
use crate::shape::Shape;
use crate::types::sorted_terms;
use oxigraph::model::{Literal, NamedNodeRef, Term};

use super::{
    as_boolean, as_integer, conforms_to, is_maybe_recursive, make_result, resolve_shape, shacl_iri,
    ComponentKind, ComponentLoader, FocusValueNodes, Outcome, ValidateComponent,
};

/// `sh:node`: every value node must conform to the referenced node shape.
/// The nested results are attached to the single result as details.
#[derive(Debug)]
pub struct NodeConstraintComponent {
    shapes: Vec<Term>,
}

impl NodeConstraintComponent {
    pub(crate) fn load(loader: &ComponentLoader<'_>) -> Result<Self> {
        let shapes = loader.required(ComponentKind::Node, SHACL::new().node)?;
        Ok(NodeConstraintComponent { shapes })
    }
}

impl ValidateComponent for NodeConstraintComponent {
    fn evaluate(
        &self,
        cx: &mut ValidationContext<'_>,
        shape: &Shape,
        focus_value_nodes: &FocusValueNodes,
    ) -> Result<Outcome> {
        let kind = ComponentKind::Node;
        let mut results = Vec::new();
        for node in &self.shapes {
            let target = resolve_shape(cx, node, kind)?;
            if target.is_property_shape() {
                return Err(EngineError::Runtime(format!(
                    "Shape pointed to by sh:node must not be a PropertyShape: {}",
                    target.node()
                )));
            }
            if is_maybe_recursive(cx, target, kind) {
                continue;
            }
            for (focus, values) in focus_value_nodes {
                for value in values {
                    let (conforms, nested) = target.validate(cx, Some(std::slice::from_ref(value)))?;
                    if !conforms || !nested.is_empty() {
                        let result = make_result(shape, kind, focus, Some(value), || {
                            format!(
                                "Value does not conform to Shape {}. See details for more information.",
                                target.node()
                            )
                        });
                        results.push(result.with_details(nested));
                    }
                }
            }
        }
        Ok((results.is_empty(), results))
    }
}

/// `sh:property`: each value node becomes a focus node of the referenced
/// property shape, whose results pass through unchanged.
#[derive(Debug)]
pub struct PropertyConstraintComponent {
    shapes: Vec<Term>,
}

impl PropertyConstraintComponent {
    pub(crate) fn load(loader: &ComponentLoader<'_>) -> Result<Self> {
        let shapes = loader.required(ComponentKind::Property, SHACL::new().property)?;
        Ok(PropertyConstraintComponent { shapes })
    }
}

impl ValidateComponent for PropertyConstraintComponent {
    fn evaluate(
        &self,
        cx: &mut ValidationContext<'_>,
        _shape: &Shape,
        focus_value_nodes: &FocusValueNodes,
    ) -> Result<Outcome> {
        let kind = ComponentKind::Property;
        if focus_value_nodes.iter().all(|(_, values)| values.is_empty()) {
            return Ok((true, vec![]));
        }
        let mut conforms = true;
        let mut results = Vec::new();
        for node in &self.shapes {
            let target = resolve_shape(cx, node, kind)?;
            if !target.is_property_shape() {
                return Err(EngineError::Runtime(format!(
                    "Shape pointed to by sh:property must be a PropertyShape: {}",
                    target.node()
                )));
            }
            if is_maybe_recursive(cx, target, kind) {
                continue;
            }
            for (_, values) in focus_value_nodes {
                for value in values {
                    let (c, nested) = target.validate(cx, Some(std::slice::from_ref(value)))?;
                    conforms &= c;
                    results.extend(nested);
                }
            }
        }
        Ok((conforms, results))
    }
}

/// `sh:qualifiedValueShape` with its min/max counts and disjointness flag.
#[derive(Debug)]
pub struct QualifiedValueShapeConstraintComponent {
    shapes: Vec<Term>,
    min_count: Option<i64>,
    max_count: Option<i64>,
    disjoint: bool,
    /// Qualified value shapes of sibling property shapes, collected only when
    /// `disjoint` is set.
    siblings: Vec<Term>,
}

impl QualifiedValueShapeConstraintComponent {
    /// Returns `None` (with a warning) on a node shape.
    pub(crate) fn load(loader: &ComponentLoader<'_>) -> Result<Option<Self>> {
        let kind = ComponentKind::QualifiedValueShape;
        let sh = SHACL::new();
        if !loader.is_property_shape {
            log::warn!(
                "Ignoring sh:qualifiedValueShape on NodeShape {}: it is only valid on a PropertyShape",
                loader.node
            );
            return Ok(None);
        }
        let shapes = loader.required(kind, sh.qualified_value_shape)?;
        let count = |predicate: NamedNodeRef<'static>| -> Result<Option<i64>> {
            match loader.at_most_one(kind, predicate)? {
                None => Ok(None),
                Some(t) => as_integer(&t).map(Some).ok_or_else(|| {
                    loader.error(kind, format!("{} must be an xsd:integer", predicate))
                }),
            }
        };
        let min_count = count(sh.qualified_min_count)?;
        let max_count = count(sh.qualified_max_count)?;
        if min_count.is_none() && max_count.is_none() {
            return Err(loader.error(
                kind,
                "requires at least one of sh:qualifiedMinCount or sh:qualifiedMaxCount",
            ));
        }
        let disjoint = loader
            .objects(sh.qualified_value_shapes_disjoint)
            .iter()
            .any(|t| as_boolean(t) == Some(true));
        let mut siblings = Vec::new();
        if disjoint {
            for parent in loader.graph.subjects(sh.property, loader.node) {
                for sibling in loader.graph.objects(&parent, sh.property) {
                    siblings.extend(loader.graph.objects(&sibling, sh.qualified_value_shape));
                }
            }
        }
        Ok(Some(QualifiedValueShapeConstraintComponent {
            shapes,
            min_count,
            max_count,
            disjoint,
            siblings: sorted_terms(siblings),
        }))
    }

    fn count_result(
        &self,
        shape: &Shape,
        focus: &Term,
        local_name: &str,
        bound_name: &str,
        bound: i64,
        target: &Term,
    ) -> ValidationResult {
        let messages = if shape.messages().is_empty() {
            vec![Literal::new_simple_literal(format!(
                "Focus node does not conform to shape {} {}: {}",
                bound_name, bound, target
            ))]
        } else {
            shape.messages().to_vec()
        };
        ValidationResult::new(
            shape,
            shacl_iri(local_name),
            ComponentKind::QualifiedValueShape.name(),
            focus.clone(),
        )
        .with_messages(messages)
    }
}

impl ValidateComponent for QualifiedValueShapeConstraintComponent {
    fn evaluate(
        &self,
        cx: &mut ValidationContext<'_>,
        shape: &Shape,
        focus_value_nodes: &FocusValueNodes,
    ) -> Result<Outcome> {
        let kind = ComponentKind::QualifiedValueShape;
        let no_values = focus_value_nodes.iter().all(|(_, values)| values.is_empty());
        if !self.disjoint && no_values && self.min_count.map_or(true, |m| m < 1) {
            return Ok((true, vec![]));
        }
        let mut results = Vec::new();
        for node in &self.shapes {
            let target = resolve_shape(cx, node, kind)?;
            if is_maybe_recursive(cx, target, kind) {
                continue;
            }
            let siblings = self
                .siblings
                .iter()
                .filter(|s| *s != node)
                .map(|s| resolve_shape(cx, s, kind))
                .collect::<Result<Vec<_>>>()?;
            for (focus, values) in focus_value_nodes {
                let mut count: i64 = 0;
                for value in values {
                    if !conforms_to(cx, target, value)? {
                        continue;
                    }
                    let mut in_sibling = false;
                    for sibling in &siblings {
                        if conforms_to(cx, sibling, value)? {
                            in_sibling = true;
                            break;
                        }
                    }
                    if !in_sibling {
                        count += 1;
                    }
                }
                if let Some(min) = self.min_count {
                    if count < min {
                        results.push(self.count_result(
                            shape,
                            focus,
                            "QualifiedMinCountConstraintComponent",
                            "MinCount",
                            min,
                            node,
                        ));
                    }
                }
                if let Some(max) = self.max_count {
                    if count > max {
                        results.push(self.count_result(
                            shape,
                            focus,
                            "QualifiedMaxCountConstraintComponent",
                            "MaxCount",
                            max,
                            node,
                        ));
                    }
                }
            }
        }
        Ok((results.is_empty(), results))
    }
}
