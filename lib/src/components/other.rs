use crate::context::ValidationContext;
use crate::error::Result;
use crate::named_nodes::{RDF, RDFS, SHACL};
use crate::shape::Shape;
use crate::types::Path;
use oxigraph::model::{NamedNode, Term};
use std::collections::BTreeSet;

use super::{
    as_boolean, focus_path_label, make_result, term_list, ComponentKind, ComponentLoader,
    FocusValueNodes, Outcome, ValidateComponent,
};

/// `sh:closed true`: value nodes may only use the predicates of the shape's
/// own property shapes, plus the ignored ones.
#[derive(Debug)]
pub struct ClosedConstraintComponent {
    closed: bool,
    allowed: BTreeSet<String>,
    ignored: BTreeSet<String>,
}

impl ClosedConstraintComponent {
    pub(crate) fn load(loader: &ComponentLoader<'_>) -> Result<Self> {
        let kind = ComponentKind::Closed;
        let sh = SHACL::new();
        let closed = match loader.at_most_one(kind, sh.closed)? {
            Some(value) => as_boolean(&value)
                .ok_or_else(|| loader.error(kind, "sh:closed must be an xsd:boolean"))?,
            None => {
                return Err(loader.error(kind, "sh:ignoredProperties requires sh:closed"));
            }
        };
        let mut ignored = BTreeSet::new();
        for head in loader.objects(sh.ignored_properties) {
            for item in loader.list(kind, &head)? {
                match item {
                    Term::NamedNode(n) => {
                        ignored.insert(n.as_str().to_string());
                    }
                    other => {
                        return Err(loader.error(
                            kind,
                            format!("ignored property {} must be an IRI", other),
                        ))
                    }
                }
            }
        }
        let mut allowed = BTreeSet::new();
        for property_shape in loader.objects(sh.property) {
            for path in loader.graph.objects(&property_shape, sh.path) {
                if let Term::NamedNode(p) = path {
                    allowed.insert(p.as_str().to_string());
                }
            }
        }
        Ok(ClosedConstraintComponent {
            closed,
            allowed,
            ignored,
        })
    }

    fn permits(&self, predicate: &NamedNode, object: &Term) -> bool {
        let p = predicate.as_str();
        if self.allowed.contains(p) || self.ignored.contains(p) {
            return true;
        }
        // every node is implicitly an rdfs:Resource
        *predicate == RDF::new().type_ && matches!(object, Term::NamedNode(o) if *o == RDFS::new().resource)
    }
}

impl ValidateComponent for ClosedConstraintComponent {
    fn evaluate(
        &self,
        cx: &mut ValidationContext<'_>,
        shape: &Shape,
        focus_value_nodes: &FocusValueNodes,
    ) -> Result<Outcome> {
        if !self.closed {
            return Ok((true, vec![]));
        }
        let kind = ComponentKind::Closed;
        let mut results = Vec::new();
        for (focus, values) in focus_value_nodes {
            for value in values {
                let mut pairs = cx.data().predicate_objects(value);
                pairs.sort_by_cached_key(|(p, o)| (p.as_str().to_string(), o.to_string()));
                for (predicate, object) in pairs {
                    if self.permits(&predicate, &object) {
                        continue;
                    }
                    let result = make_result(shape, kind, focus, Some(&object), || {
                        format!("Node {} is closed. It cannot have value: {}", focus, object)
                    });
                    results.push(result.with_result_path(Path::Predicate(predicate)));
                }
            }
        }
        Ok((results.is_empty(), results))
    }
}

#[derive(Debug)]
pub struct HasValueConstraintComponent {
    values: Vec<Term>,
}

impl HasValueConstraintComponent {
    pub(crate) fn load(loader: &ComponentLoader<'_>) -> Result<Self> {
        let values = loader.required(ComponentKind::HasValue, SHACL::new().has_value)?;
        Ok(HasValueConstraintComponent { values })
    }
}

impl ValidateComponent for HasValueConstraintComponent {
    fn evaluate(
        &self,
        _cx: &mut ValidationContext<'_>,
        shape: &Shape,
        focus_value_nodes: &FocusValueNodes,
    ) -> Result<Outcome> {
        let mut results = Vec::new();
        for (focus, values) in focus_value_nodes {
            for required in &self.values {
                if !values.contains(required) {
                    results.push(make_result(shape, ComponentKind::HasValue, focus, None, || {
                        format!(
                            "Node {} does not contain a value in the set: {}",
                            focus_path_label(shape, focus),
                            term_list(&self.values)
                        )
                    }));
                }
            }
        }
        Ok((results.is_empty(), results))
    }
}

#[derive(Debug)]
pub struct InConstraintComponent {
    allowed: Vec<Term>,
}

impl InConstraintComponent {
    pub(crate) fn load(loader: &ComponentLoader<'_>) -> Result<Self> {
        let kind = ComponentKind::In;
        let head = loader.exactly_one(kind, SHACL::new().in_)?;
        let allowed = loader.list(kind, &head)?;
        Ok(InConstraintComponent { allowed })
    }
}

impl ValidateComponent for InConstraintComponent {
    fn evaluate(
        &self,
        _cx: &mut ValidationContext<'_>,
        shape: &Shape,
        focus_value_nodes: &FocusValueNodes,
    ) -> Result<Outcome> {
        let mut results = Vec::new();
        for (focus, values) in focus_value_nodes {
            for value in values.iter().filter(|v| !self.allowed.contains(v)) {
                results.push(make_result(shape, ComponentKind::In, focus, Some(value), || {
                    format!("Value {} not in list {}", value, term_list(&self.allowed))
                }));
            }
        }
        Ok((results.is_empty(), results))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closed_permits_listed_and_resource_typing() {
        let c = ClosedConstraintComponent {
            closed: true,
            allowed: BTreeSet::from(["http://ex/name".to_string()]),
            ignored: BTreeSet::new(),
        };
        let name = NamedNode::new_unchecked("http://ex/name");
        let extra = NamedNode::new_unchecked("http://ex/extra");
        let lit: Term = oxigraph::model::Literal::new_simple_literal("x").into();
        let resource: Term = RDFS::new().resource.into_owned().into();
        let class: Term = NamedNode::new_unchecked("http://ex/C").into();
        assert!(c.permits(&name, &lit));
        assert!(!c.permits(&extra, &lit));
        assert!(c.permits(&RDF::new().type_.into_owned(), &resource));
        assert!(!c.permits(&RDF::new().type_.into_owned(), &class));
    }
}
