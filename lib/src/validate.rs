use crate::backend::{OxigraphQueryEngine, QueryEngine};
use crate::context::ValidationContext;
use crate::error::{EngineError, Result};
use crate::report::ValidationReport;
use crate::shape::Shape;
use crate::shapes_graph::ShapesGraph;
use oxigraph::model::{Graph, NamedNode, Term};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Options for one validation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationOptions {
    /// Stop at the first non-conforming shape (and, inside a shape, at the
    /// first non-conforming component).
    pub abort_on_first: bool,
    /// `sh:Info` results do not make the run non-conformant.
    pub allow_infos: bool,
    /// `sh:Info` and `sh:Warning` results do not make the run non-conformant.
    pub allow_warnings: bool,
    /// Maximum number of nested (shape, component) frames.
    pub max_validation_depth: usize,
    /// Validate only these shapes (IRIs).
    pub use_shapes: Option<Vec<String>>,
    /// Restrict or override the focus nodes (IRIs).
    pub focus_nodes: Option<Vec<String>>,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        ValidationOptions {
            abort_on_first: false,
            allow_infos: false,
            allow_warnings: false,
            max_validation_depth: 15,
            use_shapes: None,
            focus_nodes: None,
        }
    }
}

/// Expands the working data graph before validation, e.g. with RDFS entailments.
pub trait Inferencer {
    fn expand(&self, graph: &mut Graph) -> Result<()>;
}

fn parse_iris(iris: &[String], what: &str) -> Result<Vec<Term>> {
    iris.iter()
        .map(|iri| {
            NamedNode::new(iri.as_str())
                .map(Term::from)
                .map_err(|e| EngineError::Runtime(format!("invalid {} IRI {}: {}", what, iri, e)))
        })
        .collect()
}

/// Runs a shapes graph against data graphs. Holds the run options and the
/// optional collaborators: a query engine, an inferencer and an ontology
/// graph mixed into the data.
pub struct Validator<'a> {
    options: ValidationOptions,
    query_engine: Option<&'a dyn QueryEngine>,
    inferencer: Option<&'a dyn Inferencer>,
    ontology: Option<&'a Graph>,
}

impl<'a> Validator<'a> {
    pub fn new(options: ValidationOptions) -> Self {
        Validator {
            options,
            query_engine: None,
            inferencer: None,
            ontology: None,
        }
    }

    pub fn with_query_engine(mut self, engine: &'a dyn QueryEngine) -> Self {
        self.query_engine = Some(engine);
        self
    }

    pub fn with_inferencer(mut self, inferencer: &'a dyn Inferencer) -> Self {
        self.inferencer = Some(inferencer);
        self
    }

    pub fn with_ontology(mut self, ontology: &'a Graph) -> Self {
        self.ontology = Some(ontology);
        self
    }

    pub fn options(&self) -> &ValidationOptions {
        &self.options
    }

    /// The graph that is actually validated. The caller's graph is only
    /// copied when an ontology or inferencer has to change it.
    fn working_graph<'g>(&self, data: &'g Graph) -> Result<Cow<'g, Graph>> {
        if self.ontology.is_none() && self.inferencer.is_none() {
            return Ok(Cow::Borrowed(data));
        }
        let mut working = data.clone();
        if let Some(ontology) = self.ontology {
            log::info!("Mixing {} ontology triples into the data graph", ontology.len());
            for triple in ontology.iter() {
                working.insert(triple);
            }
        }
        if let Some(inferencer) = self.inferencer {
            let before = working.len();
            inferencer.expand(&mut working)?;
            log::info!("Inference added {} triples", working.len().saturating_sub(before));
        }
        Ok(Cow::Owned(working))
    }

    fn selected_shapes<'s>(&self, shapes: &'s ShapesGraph) -> Result<Vec<&'s Shape>> {
        match &self.options.use_shapes {
            None => Ok(shapes.shapes().iter().collect()),
            Some(names) => parse_iris(names, "shape")?
                .iter()
                .map(|node| {
                    shapes.lookup(node).ok_or_else(|| {
                        EngineError::Runtime(format!("shape {} was not found in the shapes graph", node))
                    })
                })
                .collect(),
        }
    }

    pub fn validate(&self, shapes: &ShapesGraph, data: &Graph) -> Result<ValidationReport> {
        let working = self.working_graph(data)?;
        let data: &Graph = &working;
        let selected = self.selected_shapes(shapes)?;
        let focus_filter = match &self.options.focus_nodes {
            Some(nodes) => Some(parse_iris(nodes, "focus node")?),
            None => None,
        };
        log::info!(
            "Validating {} shape(s) against {} data triples",
            selected.len(),
            data.len()
        );

        let mut conforms = true;
        let mut results = Vec::new();
        for shape in selected {
            let focus = match (&self.options.use_shapes, &focus_filter) {
                (Some(_), Some(nodes)) => Some(nodes.clone()),
                (None, Some(nodes)) => Some(
                    shape
                        .focus_nodes(data)
                        .into_iter()
                        .filter(|f| nodes.contains(f))
                        .collect(),
                ),
                (_, None) => None,
            };
            let mut cx = ValidationContext::new(shapes, data, &self.options, self.query_engine);
            let (shape_conforms, shape_results) =
                shape.validate_top_level(&mut cx, focus.as_deref())?;
            log::debug!(
                "Shape {} conforms: {} ({} results)",
                shape.node(),
                shape_conforms,
                shape_results.len()
            );
            conforms &= shape_conforms;
            results.extend(shape_results);
            if self.options.abort_on_first && !conforms {
                log::info!("Stopping after the first non-conforming shape");
                break;
            }
        }
        Ok(ValidationReport::new(conforms, results))
    }
}

/// Validates `data` against loaded shapes. When the shapes contain SPARQL
/// text, an [`OxigraphQueryEngine`] over the data graph is used to run it.
pub fn validate(
    shapes: &ShapesGraph,
    data: &Graph,
    options: &ValidationOptions,
) -> Result<ValidationReport> {
    let engine = if shapes.uses_sparql() {
        Some(OxigraphQueryEngine::from_graph(data)?)
    } else {
        None
    };
    let mut validator = Validator::new(options.clone());
    if let Some(engine) = &engine {
        validator = validator.with_query_engine(engine);
    }
    validator.validate(shapes, data)
}

/// Loads `shapes` and validates `data` against it.
pub fn validate_graphs(
    shapes: &Graph,
    data: &Graph,
    options: &ValidationOptions,
) -> Result<ValidationReport> {
    let shapes = ShapesGraph::load(shapes)?;
    validate(&shapes, data, options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_default_and_deserialize() {
        let defaults = ValidationOptions::default();
        assert_eq!(defaults.max_validation_depth, 15);
        assert!(!defaults.abort_on_first);

        let parsed: ValidationOptions =
            serde_json::from_str(r#"{"allow_warnings": true, "focus_nodes": ["http://ex/a"]}"#).unwrap();
        assert!(parsed.allow_warnings);
        assert_eq!(parsed.max_validation_depth, 15);
        assert_eq!(parsed.focus_nodes, Some(vec!["http://ex/a".to_string()]));
    }

    #[test]
    fn unknown_use_shape_is_a_runtime_error() {
        let shapes = ShapesGraph::load(&Graph::new()).unwrap();
        let options = ValidationOptions {
            use_shapes: Some(vec!["http://example.org/Missing".to_string()]),
            ..Default::default()
        };
        let err = validate(&shapes, &Graph::new(), &options).unwrap_err();
        assert!(matches!(err, EngineError::Runtime(_)));
    }
}
