use crate::backend::GraphBackend;
use crate::context::ValidationContext;
use crate::error::Result;
use crate::literal;
use crate::named_nodes::{RDF, RDFS, SHACL};
use crate::shape::Shape;
use crate::types::NodeKind;
use oxigraph::model::{NamedNode, Term};

use super::{make_result, ComponentKind, ComponentLoader, FocusValueNodes, Outcome, ValidateComponent};

#[derive(Debug)]
pub struct ClassConstraintComponent {
    classes: Vec<Term>,
}

impl ClassConstraintComponent {
    pub fn new(classes: Vec<Term>) -> Self {
        ClassConstraintComponent { classes }
    }

    pub(crate) fn load(loader: &ComponentLoader<'_>) -> Result<Self> {
        let kind = ComponentKind::Class;
        let classes = loader.required(kind, SHACL::new().class)?;
        if let Some(lit) = classes.iter().find(|c| matches!(c, Term::Literal(_))) {
            return Err(loader.error(kind, format!("sh:class value {} must not be a literal", lit)));
        }
        Ok(Self::new(classes))
    }
}

/// True if `value` has an `rdf:type` equal to `class`, or a type that is a
/// direct `rdfs:subClassOf` of it. Only one subclass step is taken.
fn has_class(data: &dyn GraphBackend, value: &Term, class: &Term) -> bool {
    let rdfs = RDFS::new();
    data.objects(value, RDF::new().type_)
        .iter()
        .any(|t| t == class || data.contains(t, rdfs.sub_class_of, class))
}

impl ValidateComponent for ClassConstraintComponent {
    fn evaluate(
        &self,
        cx: &mut ValidationContext<'_>,
        shape: &Shape,
        focus_value_nodes: &FocusValueNodes,
    ) -> Result<Outcome> {
        let data = cx.data();
        let mut results = Vec::new();
        for (focus, values) in focus_value_nodes {
            for value in values {
                for class in &self.classes {
                    if !has_class(data, value, class) {
                        results.push(make_result(
                            shape,
                            ComponentKind::Class,
                            focus,
                            Some(value),
                            || format!("Value does not have class {}", class),
                        ));
                    }
                }
            }
        }
        Ok((results.is_empty(), results))
    }
}

#[derive(Debug)]
pub struct DatatypeConstraintComponent {
    datatype: NamedNode,
}

impl DatatypeConstraintComponent {
    pub fn new(datatype: NamedNode) -> Self {
        DatatypeConstraintComponent { datatype }
    }

    pub(crate) fn load(loader: &ComponentLoader<'_>) -> Result<Self> {
        let kind = ComponentKind::Datatype;
        match loader.exactly_one(kind, SHACL::new().datatype)? {
            Term::NamedNode(dt) => Ok(Self::new(dt)),
            other => Err(loader.error(kind, format!("sh:datatype value {} must be an IRI", other))),
        }
    }

    fn matches(&self, value: &Term) -> bool {
        let Term::Literal(lit) = value else {
            return false;
        };
        if self.datatype == RDFS::new().literal {
            return true;
        }
        lit.datatype() == self.datatype.as_ref() && !literal::is_ill_typed(lit)
    }
}

impl ValidateComponent for DatatypeConstraintComponent {
    fn evaluate(
        &self,
        _cx: &mut ValidationContext<'_>,
        shape: &Shape,
        focus_value_nodes: &FocusValueNodes,
    ) -> Result<Outcome> {
        let mut results = Vec::new();
        for (focus, values) in focus_value_nodes {
            for value in values.iter().filter(|v| !self.matches(v)) {
                results.push(make_result(
                    shape,
                    ComponentKind::Datatype,
                    focus,
                    Some(value),
                    || format!("Value is not Literal with datatype {}", self.datatype),
                ));
            }
        }
        Ok((results.is_empty(), results))
    }
}

#[derive(Debug)]
pub struct NodeKindConstraintComponent {
    node_kind: NodeKind,
}

impl NodeKindConstraintComponent {
    pub fn new(node_kind: NodeKind) -> Self {
        NodeKindConstraintComponent { node_kind }
    }

    pub(crate) fn load(loader: &ComponentLoader<'_>) -> Result<Self> {
        let kind = ComponentKind::NodeKind;
        let value = loader.exactly_one(kind, SHACL::new().node_kind)?;
        let node_kind = NodeKind::from_term(&value).ok_or_else(|| {
            loader.error(kind, format!("{} is not one of the six SHACL node kinds", value))
        })?;
        Ok(Self::new(node_kind))
    }
}

impl ValidateComponent for NodeKindConstraintComponent {
    fn evaluate(
        &self,
        _cx: &mut ValidationContext<'_>,
        shape: &Shape,
        focus_value_nodes: &FocusValueNodes,
    ) -> Result<Outcome> {
        let mut results = Vec::new();
        for (focus, values) in focus_value_nodes {
            for value in values.iter().filter(|v| !self.node_kind.matches(v)) {
                results.push(make_result(
                    shape,
                    ComponentKind::NodeKind,
                    focus,
                    Some(value),
                    || format!("Value is not of Node Kind sh:{}", self.node_kind.local_name()),
                ));
            }
        }
        Ok((results.is_empty(), results))
    }
}
