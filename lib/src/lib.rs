//! A SHACL Core validation engine over oxigraph graphs.
//!
//! [`load_shapes`] turns a shapes graph into a [`ShapesGraph`]; [`validate`]
//! runs it against a data graph and returns a [`ValidationReport`]. Malformed
//! shapes and unresolvable references fail with an [`EngineError`]; a
//! non-conforming data graph is a report, not an error.

pub mod backend;
pub mod components;
pub mod context;
pub mod error;
pub mod literal;
mod named_nodes;
pub mod path;
pub mod report;
pub mod shape;
pub mod shapes_graph;
pub mod test_utils;
pub mod types;
mod validate;

use oxigraph::model::Graph;

pub use backend::{GraphBackend, OxigraphQueryEngine, QueryBindings, QueryEngine, QuerySolution};
pub use components::ComponentKind;
pub use error::{EngineError, Result};
pub use report::{ValidationReport, ValidationResult};
pub use shape::Shape;
pub use shapes_graph::ShapesGraph;
pub use types::{NodeKind, Path, Severity, ShapeId, Target};
pub use validate::{validate, validate_graphs, Inferencer, ValidationOptions, Validator};

/// Discovers and loads every shape of `shapes`.
pub fn load_shapes(shapes: &Graph) -> Result<ShapesGraph> {
    ShapesGraph::load(shapes)
}
