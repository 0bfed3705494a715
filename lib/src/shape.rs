use crate::backend::GraphBackend;
use crate::components::sparql::CustomComponentBinding;
use crate::components::{
    as_boolean, Component, ComponentKind, ComponentLoader, CustomConstraintComponent,
    FocusValueNodes, Outcome, ValidateComponent,
};
use crate::context::ValidationContext;
use crate::error::{EngineError, Result};
use crate::named_nodes::{OWL, RDF, RDFS, SHACL};
use crate::path::{parse_path, value_nodes};
use crate::types::{sorted_terms, subclass_closure, Path, Severity, ShapeId, Target};
use oxigraph::model::{Literal, Term};

/// A node shape or property shape, with its constraint components parsed.
#[derive(Debug)]
pub struct Shape {
    id: ShapeId,
    node: Term,
    path: Option<Path>,
    deactivated: bool,
    severity: Severity,
    messages: Vec<Literal>,
    names: Vec<Literal>,
    descriptions: Vec<Literal>,
    targets: Vec<Target>,
    components: Vec<Component>,
    custom: Vec<CustomComponentBinding>,
}

fn literals(graph: &dyn GraphBackend, node: &Term, predicate: oxigraph::model::NamedNodeRef<'_>) -> Vec<Literal> {
    sorted_terms(graph.objects(node, predicate))
        .into_iter()
        .filter_map(|t| match t {
            Term::Literal(l) => Some(l),
            _ => None,
        })
        .collect()
}

impl Shape {
    /// Reads the shape at `node`. The caller has already decided whether it is
    /// a property shape.
    pub(crate) fn load(
        graph: &dyn GraphBackend,
        node: Term,
        id: ShapeId,
        is_property_shape: bool,
        custom_components: &[CustomConstraintComponent],
    ) -> Result<Self> {
        let sh = SHACL::new();

        let path = if is_property_shape {
            match graph.objects(&node, sh.path).as_slice() {
                [path_node] => Some(parse_path(graph, path_node)?),
                paths => {
                    return Err(EngineError::shape_load(
                        &node,
                        format!("property shape needs exactly one sh:path, found {}", paths.len()),
                    ))
                }
            }
        } else {
            None
        };

        let deactivated = match graph.objects(&node, sh.deactivated).as_slice() {
            [] => false,
            [value] => as_boolean(value).ok_or_else(|| {
                EngineError::shape_load(&node, format!("sh:deactivated must be an xsd:boolean, found {}", value))
            })?,
            _ => return Err(EngineError::shape_load(&node, "more than one sh:deactivated")),
        };

        let severity = match sorted_terms(graph.objects(&node, sh.severity)).first() {
            None => Severity::Violation,
            Some(t) => Severity::from_term(t).ok_or_else(|| {
                EngineError::shape_load(&node, format!("sh:severity must be an IRI, found {}", t))
            })?,
        };

        let mut targets = Vec::new();
        for predicate in [sh.target_class, sh.target_node, sh.target_subjects_of, sh.target_objects_of] {
            for object in sorted_terms(graph.objects(&node, predicate)) {
                match Target::from_predicate_object(predicate, object.as_ref()) {
                    Some(target) => targets.push(target),
                    None => {
                        return Err(EngineError::shape_load(
                            &node,
                            format!("{} value {} must be an IRI", predicate, object),
                        ))
                    }
                }
            }
        }
        if is_implicit_class(graph, &node) {
            targets.push(Target::Class(node.clone()));
        }

        let loader = ComponentLoader::new(graph, &node, is_property_shape);
        let mut components = Vec::new();
        for kind in ComponentKind::BUILT_IN {
            let present = kind
                .parameters()
                .iter()
                .any(|p| !graph.objects(&node, *p).is_empty());
            if !present {
                continue;
            }
            if let Some(component) = Component::load(kind, &loader)? {
                components.push(component);
            }
        }
        let mut custom = Vec::new();
        for (index, definition) in custom_components.iter().enumerate() {
            if let Some(binding) = definition.bind(index, &loader)? {
                custom.push(binding);
            }
        }

        let shape = Shape {
            id,
            path,
            deactivated,
            severity,
            messages: literals(graph, &node, sh.message),
            names: literals(graph, &node, sh.name),
            descriptions: literals(graph, &node, sh.description),
            targets,
            components,
            custom,
            node,
        };
        log::debug!(
            "Loaded {} {} with {} component(s)",
            if shape.is_property_shape() { "property shape" } else { "node shape" },
            shape.node,
            shape.components.len() + shape.custom.len()
        );
        Ok(shape)
    }

    pub fn id(&self) -> ShapeId {
        self.id
    }

    pub fn node(&self) -> &Term {
        &self.node
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_ref()
    }

    pub fn is_property_shape(&self) -> bool {
        self.path.is_some()
    }

    pub fn is_deactivated(&self) -> bool {
        self.deactivated
    }

    pub fn severity(&self) -> &Severity {
        &self.severity
    }

    pub fn messages(&self) -> &[Literal] {
        &self.messages
    }

    pub fn names(&self) -> &[Literal] {
        &self.names
    }

    pub fn descriptions(&self) -> &[Literal] {
        &self.descriptions
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub(crate) fn uses_sparql(&self) -> bool {
        !self.custom.is_empty() || self.components.iter().any(|c| c.kind() == ComponentKind::Sparql)
    }

    /// Union of all target nodes in the data graph, term-sorted.
    pub fn focus_nodes(&self, data: &dyn GraphBackend) -> Vec<Term> {
        sorted_terms(self.targets.iter().flat_map(|t| t.get_target_nodes(data)))
    }

    /// Value nodes per focus node: the focus itself for node shapes, the path
    /// values for property shapes.
    pub fn value_nodes(&self, data: &dyn GraphBackend, focus: &[Term]) -> Result<FocusValueNodes> {
        focus
            .iter()
            .map(|f| match &self.path {
                Some(path) => Ok((f.clone(), value_nodes(data, f, path)?)),
                None => Ok((f.clone(), vec![f.clone()])),
            })
            .collect()
    }

    fn severity_is_allowed(&self, cx: &ValidationContext<'_>) -> bool {
        let options = cx.options();
        match self.severity {
            Severity::Info => options.allow_infos || options.allow_warnings,
            Severity::Warning => options.allow_warnings,
            _ => false,
        }
    }

    /// Validates `focus` (or this shape's own focus nodes) against every
    /// component of the shape. Conformance is strict: any failing component
    /// makes the shape non-conforming whatever its severity.
    pub fn validate(&self, cx: &mut ValidationContext<'_>, focus: Option<&[Term]>) -> Result<Outcome> {
        self.run(cx, focus, false)
    }

    /// Entry point for the top-level loop. Failures of a severity the options
    /// allow are still reported but keep the shape conforming.
    pub fn validate_top_level(
        &self,
        cx: &mut ValidationContext<'_>,
        focus: Option<&[Term]>,
    ) -> Result<Outcome> {
        let allowed = self.severity_is_allowed(cx);
        self.run(cx, focus, allowed)
    }

    fn run(&self, cx: &mut ValidationContext<'_>, focus: Option<&[Term]>, allowed: bool) -> Result<Outcome> {
        if cx.eval_path.len() >= cx.options().max_validation_depth {
            return Err(EngineError::Runtime(format!(
                "Evaluation path too deep!\n{}",
                cx.eval_path
            )));
        }
        if self.deactivated {
            return Ok((true, vec![]));
        }
        let focus = match focus {
            Some(f) => f.to_vec(),
            None => self.focus_nodes(cx.data()),
        };
        if focus.is_empty() {
            return Ok((true, vec![]));
        }
        let focus_value_nodes = self.value_nodes(cx.data(), &focus)?;
        let abort_on_first = cx.options().abort_on_first;

        let mut conforms = true;
        let mut results = Vec::new();
        for component in &self.components {
            let kind = component.kind();
            log::debug!("Evaluating {} on {} ({} focus nodes)", kind.name(), self.node, focus.len());
            cx.eval_path.push(self.id, kind);
            let outcome = component.evaluate(cx, self, &focus_value_nodes);
            cx.eval_path.pop();
            let (component_conforms, component_results) = outcome?;
            if !component_conforms && !allowed {
                conforms = false;
            }
            results.extend(component_results);
            if abort_on_first && !conforms {
                return Ok((conforms, results));
            }
        }
        for binding in &self.custom {
            cx.eval_path.push(self.id, ComponentKind::Custom);
            let outcome = binding.evaluate(cx, self, &focus_value_nodes);
            cx.eval_path.pop();
            let (component_conforms, component_results) = outcome?;
            if !component_conforms && !allowed {
                conforms = false;
            }
            results.extend(component_results);
            if abort_on_first && !conforms {
                break;
            }
        }
        Ok((conforms, results))
    }
}

/// A shape that is also a class targets its own instances.
fn is_implicit_class(graph: &dyn GraphBackend, node: &Term) -> bool {
    if matches!(node, Term::Literal(_)) {
        return false;
    }
    let rdfs_class: Term = RDFS::new().class.into_owned().into();
    let owl_class: Term = OWL::new().class.into_owned().into();
    let class_types = subclass_closure(graph, &rdfs_class);
    graph
        .objects(node, RDF::new().type_)
        .iter()
        .any(|t| *t == owl_class || class_types.contains(t))
}
