//! Per-run evaluation state.

use crate::backend::{GraphBackend, QueryEngine};
use crate::error::{EngineError, Result};
use crate::shapes_graph::ShapesGraph;
use crate::validate::ValidationOptions;
use oxigraph::model::Term;

mod eval_path;
pub(crate) mod ids;

pub use eval_path::EvaluationPath;

/// Everything a shape or component needs while validating: the shapes, the
/// data graph, the run options, the optional query collaborator and the
/// evaluation path of the current nested call.
pub struct ValidationContext<'a> {
    pub(crate) shapes: &'a ShapesGraph,
    pub(crate) data: &'a dyn GraphBackend,
    pub(crate) options: &'a ValidationOptions,
    pub(crate) query_engine: Option<&'a dyn QueryEngine>,
    pub(crate) eval_path: EvaluationPath,
}

impl<'a> ValidationContext<'a> {
    pub fn new(
        shapes: &'a ShapesGraph,
        data: &'a dyn GraphBackend,
        options: &'a ValidationOptions,
        query_engine: Option<&'a dyn QueryEngine>,
    ) -> Self {
        ValidationContext {
            shapes,
            data,
            options,
            query_engine,
            eval_path: EvaluationPath::new(),
        }
    }

    pub fn shapes(&self) -> &'a ShapesGraph {
        self.shapes
    }

    pub fn data(&self) -> &'a dyn GraphBackend {
        self.data
    }

    pub fn options(&self) -> &'a ValidationOptions {
        self.options
    }

    pub fn eval_path(&self) -> &EvaluationPath {
        &self.eval_path
    }

    /// The query collaborator, or an error naming the construct that needed it.
    pub(crate) fn query_engine(&self, needed_by: &str) -> Result<&'a dyn QueryEngine> {
        self.query_engine.ok_or_else(|| {
            EngineError::QueryEngine(format!(
                "{} requires a query engine, but none was configured",
                needed_by
            ))
        })
    }
}

/// Short label for a term: the local name of an IRI, or the lexical form of a literal.
pub(crate) fn format_term_for_label(term: &Term) -> String {
    match term {
        Term::NamedNode(nn) => {
            let iri = nn.as_str();
            let trimmed = iri.trim_end_matches(['/', '#']);
            match trimmed.rfind(['#', '/']) {
                Some(idx) if idx + 1 < trimmed.len() => trimmed[idx + 1..].to_string(),
                _ => iri.to_string(),
            }
        }
        Term::BlankNode(b) => format!("_:{}", b.as_str()),
        Term::Literal(lit) => lit.value().to_string(),
        #[allow(unreachable_patterns)]
        _ => term.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxigraph::model::{Literal, NamedNode};

    #[test]
    fn labels() {
        let hash: Term = NamedNode::new_unchecked("http://www.w3.org/ns/shacl#minCount").into();
        let slash: Term = NamedNode::new_unchecked("http://example.org/people/").into();
        let lit: Term = Literal::new_simple_literal("x").into();
        assert_eq!(format_term_for_label(&hash), "minCount");
        assert_eq!(format_term_for_label(&slash), "people");
        assert_eq!(format_term_for_label(&lit), "x");
    }
}
