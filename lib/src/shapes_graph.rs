//! Shape discovery and the shape arena.

use crate::backend::GraphBackend;
use crate::components::sparql::discover_custom_components;
use crate::components::CustomConstraintComponent;
use crate::context::ids::IDLookupTable;
use crate::error::{EngineError, Result};
use crate::named_nodes::{RDF, SHACL};
use crate::shape::Shape;
use crate::types::{sorted_terms, ShapeId};
use oxigraph::model::{Graph, Term};
use std::collections::BTreeMap;

/// Every shape of a shapes graph, owned in one arena and addressed by
/// [`ShapeId`]. Shapes are stored in the order of their node's N-Triples form.
#[derive(Debug)]
pub struct ShapesGraph {
    shapes: Vec<Shape>,
    ids: IDLookupTable<ShapeId>,
    custom_components: Vec<CustomConstraintComponent>,
}

impl ShapesGraph {
    /// Discovers and loads all shapes and custom constraint components.
    pub fn load(graph: &Graph) -> Result<Self> {
        Self::load_from(graph)
    }

    pub(crate) fn load_from(graph: &dyn GraphBackend) -> Result<Self> {
        let custom_components = discover_custom_components(graph)?;
        let discovered = discover_shapes(graph)?;
        log::info!(
            "Discovered {} shape(s) and {} custom constraint component(s)",
            discovered.len(),
            custom_components.len()
        );

        let mut ids = IDLookupTable::new();
        let mut shapes = Vec::with_capacity(discovered.len());
        for (node, is_property_shape) in discovered {
            let id = ids.insert_new(node.clone()).ok_or_else(|| {
                EngineError::shape_load(&node, "shape is already defined")
            })?;
            shapes.push(Shape::load(graph, node, id, is_property_shape, &custom_components)?);
        }
        Ok(ShapesGraph {
            shapes,
            ids,
            custom_components,
        })
    }

    pub fn lookup(&self, node: &Term) -> Option<&Shape> {
        self.ids.get(node).and_then(|id| self.shape(id))
    }

    pub fn shape(&self, id: ShapeId) -> Option<&Shape> {
        self.shapes.get(id.index())
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn custom_components(&self) -> &[CustomConstraintComponent] {
        &self.custom_components
    }

    pub(crate) fn custom_component(&self, index: usize) -> Option<&CustomConstraintComponent> {
        self.custom_components.get(index)
    }

    /// True if any shape needs a query engine to be validated.
    pub fn uses_sparql(&self) -> bool {
        self.shapes.iter().any(|s| s.uses_sparql())
    }
}

/// Finds every shape node and whether it is a property shape, in term order.
fn discover_shapes(graph: &dyn GraphBackend) -> Result<Vec<(Term, bool)>> {
    let sh = SHACL::new();
    let rdf = RDF::new();
    let node_shape: Term = sh.node_shape.into_owned().into();
    let property_shape: Term = sh.property_shape.into_owned().into();

    let mut classified: BTreeMap<String, (Term, bool)> = BTreeMap::new();

    // explicitly typed
    let typed_node = graph.subjects(rdf.type_, &node_shape);
    let typed_property = graph.subjects(rdf.type_, &property_shape);
    for node in sorted_terms(typed_node.iter().cloned()) {
        if typed_property.contains(&node) {
            return Err(EngineError::shape_load(
                &node,
                "a shape cannot be both a NodeShape and a PropertyShape",
            ));
        }
        if !graph.objects(&node, sh.path).is_empty() {
            return Err(EngineError::shape_load(&node, "a NodeShape cannot have sh:path"));
        }
        classified.insert(node.to_string(), (node, false));
    }
    for node in sorted_terms(typed_property) {
        let paths = graph.objects(&node, sh.path).len();
        if paths != 1 {
            return Err(EngineError::shape_load(
                &node,
                format!("a PropertyShape needs exactly one sh:path, found {}", paths),
            ));
        }
        classified.insert(node.to_string(), (node, true));
    }

    // implicit: subjects of targets or of sh:property/sh:node, values of
    // shape-expecting parameters
    let mut implicit = Vec::new();
    for predicate in [
        sh.target_class,
        sh.target_node,
        sh.target_subjects_of,
        sh.target_objects_of,
        sh.property,
        sh.node,
    ] {
        implicit.extend(graph.subjects_with_predicate(predicate));
    }
    for predicate in [sh.property, sh.node, sh.not, sh.qualified_value_shape] {
        implicit.extend(graph.objects_with_predicate(predicate));
    }
    for predicate in [sh.and_, sh.or_, sh.xone] {
        for head in graph.objects_with_predicate(predicate) {
            // malformed lists are reported when the component is loaded
            if let Some(members) = graph.items(&head) {
                implicit.extend(members);
            }
        }
    }

    for node in sorted_terms(implicit) {
        if matches!(node, Term::Literal(_)) || classified.contains_key(&node.to_string()) {
            continue;
        }
        let is_property_shape = match graph.objects(&node, sh.path).len() {
            0 => false,
            1 => true,
            n => {
                return Err(EngineError::shape_load(
                    &node,
                    format!("a shape can have at most one sh:path, found {}", n),
                ))
            }
        };
        classified.insert(node.to_string(), (node, is_property_shape));
    }
    Ok(classified.into_values().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::parse_turtle;
    use oxigraph::model::NamedNode;

    fn ex(local: &str) -> Term {
        NamedNode::new_unchecked(format!("http://example.org/{}", local)).into()
    }

    const PREFIXES: &str = "@prefix sh: <http://www.w3.org/ns/shacl#> .\n\
        @prefix ex: <http://example.org/> .\n";

    #[test]
    fn discovers_explicit_and_implicit_shapes() {
        let graph = parse_turtle(&format!(
            "{}ex:A a sh:NodeShape ; sh:property ex:B ; sh:not ex:C .\n\
             ex:B sh:path ex:p ; sh:minCount 1 .\n\
             ex:C sh:or ( ex:D ex:E ) .\n\
             ex:D sh:nodeKind sh:IRI .\n\
             ex:E sh:path ex:q .\n\
             ex:F sh:targetNode ex:x .",
            PREFIXES
        ))
        .unwrap();
        let shapes = ShapesGraph::load(&graph).unwrap();
        let nodes: Vec<&Term> = shapes.shapes().iter().map(|s| s.node()).collect();
        assert_eq!(nodes, vec![&ex("A"), &ex("B"), &ex("C"), &ex("D"), &ex("E"), &ex("F")]);
        assert!(shapes.lookup(&ex("B")).unwrap().is_property_shape());
        assert!(shapes.lookup(&ex("E")).unwrap().is_property_shape());
        assert!(!shapes.lookup(&ex("D")).unwrap().is_property_shape());
        assert!(shapes.lookup(&ex("x")).is_none());
    }

    #[test]
    fn shape_ids_index_the_arena() {
        let graph = parse_turtle(&format!(
            "{}ex:A a sh:NodeShape .\n ex:B a sh:NodeShape .",
            PREFIXES
        ))
        .unwrap();
        let shapes = ShapesGraph::load(&graph).unwrap();
        let b = shapes.lookup(&ex("B")).unwrap();
        assert_eq!(shapes.shape(b.id()).unwrap().node(), &ex("B"));
        assert_eq!(shapes.len(), 2);
    }

    #[test]
    fn conflicting_shape_types_fail_to_load() {
        let both = parse_turtle(&format!(
            "{}ex:A a sh:NodeShape, sh:PropertyShape ; sh:path ex:p .",
            PREFIXES
        ))
        .unwrap();
        assert!(matches!(ShapesGraph::load(&both), Err(EngineError::ShapeLoad { .. })));

        let node_with_path =
            parse_turtle(&format!("{}ex:A a sh:NodeShape ; sh:path ex:p .", PREFIXES)).unwrap();
        assert!(ShapesGraph::load(&node_with_path).is_err());

        let property_without_path =
            parse_turtle(&format!("{}ex:A a sh:PropertyShape .", PREFIXES)).unwrap();
        assert!(ShapesGraph::load(&property_without_path).is_err());

        let two_paths = parse_turtle(&format!(
            "{}ex:A sh:targetNode ex:x ; sh:path ex:p, ex:q .",
            PREFIXES
        ))
        .unwrap();
        assert!(ShapesGraph::load(&two_paths).is_err());
    }
}
