//! Validation results and the assembled report.

use crate::error::{EngineError, Result};
use crate::named_nodes::{RDF, SHACL};
use crate::shape::Shape;
use crate::types::{Path, Severity};
use oxigraph::io::{RdfFormat, RdfSerializer};
use oxigraph::model::vocab::xsd;
use oxigraph::model::{BlankNode, Graph, Literal, NamedNode, Subject, Term, Triple};
use serde::Serialize;
use std::fmt::Write as _;

/// One non-conformance record produced by a constraint component.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationResult {
    severity: Severity,
    focus_node: Term,
    value: Option<Term>,
    result_path: Option<Path>,
    source_shape: Term,
    source_constraint_component: NamedNode,
    constraint_name: String,
    source_constraint: Option<Term>,
    messages: Vec<Literal>,
    details: Vec<ValidationResult>,
}

impl ValidationResult {
    /// A result sourced from `shape`. Severity and, for property shapes, the
    /// result path are taken from the shape.
    pub(crate) fn new(
        shape: &Shape,
        component: NamedNode,
        constraint_name: impl Into<String>,
        focus_node: Term,
    ) -> Self {
        ValidationResult {
            severity: shape.severity().clone(),
            focus_node,
            value: None,
            result_path: shape.path().cloned(),
            source_shape: shape.node().clone(),
            source_constraint_component: component,
            constraint_name: constraint_name.into(),
            source_constraint: None,
            messages: Vec::new(),
            details: Vec::new(),
        }
    }

    pub(crate) fn with_value(mut self, value: Term) -> Self {
        self.value = Some(value);
        self
    }

    pub(crate) fn with_result_path(mut self, path: Path) -> Self {
        self.result_path = Some(path);
        self
    }

    pub(crate) fn with_source_constraint(mut self, constraint: Term) -> Self {
        self.source_constraint = Some(constraint);
        self
    }

    pub(crate) fn with_messages(mut self, messages: Vec<Literal>) -> Self {
        self.messages = messages;
        self
    }

    pub(crate) fn with_details(mut self, details: Vec<ValidationResult>) -> Self {
        self.details = details;
        self
    }

    pub fn severity(&self) -> &Severity {
        &self.severity
    }

    pub fn focus_node(&self) -> &Term {
        &self.focus_node
    }

    pub fn value(&self) -> Option<&Term> {
        self.value.as_ref()
    }

    pub fn result_path(&self) -> Option<&Path> {
        self.result_path.as_ref()
    }

    pub fn source_shape(&self) -> &Term {
        &self.source_shape
    }

    pub fn source_constraint_component(&self) -> &NamedNode {
        &self.source_constraint_component
    }

    pub fn constraint_name(&self) -> &str {
        &self.constraint_name
    }

    pub fn source_constraint(&self) -> Option<&Term> {
        self.source_constraint.as_ref()
    }

    pub fn messages(&self) -> &[Literal] {
        &self.messages
    }

    /// Nested results that led to this one (only `sh:node` produces these).
    pub fn details(&self) -> &[ValidationResult] {
        &self.details
    }

    /// Human-readable description of the result.
    pub fn description(&self) -> String {
        let severity_desc = if self.severity == Severity::Violation {
            "Constraint Violation"
        } else {
            "Validation Result"
        };
        let mut desc = format!(
            "{} in {} ({}):\n\tSeverity: {}\n\tSource Shape: {}\n\tFocus Node: {}\n",
            severity_desc,
            self.constraint_name,
            self.source_constraint_component.as_str(),
            self.severity,
            self.source_shape,
            self.focus_node,
        );
        if let Some(v) = &self.value {
            let _ = writeln!(desc, "\tValue Node: {}", v);
        }
        if let Some(p) = &self.result_path {
            let _ = writeln!(desc, "\tResult Path: {}", p);
        }
        if let Some(c) = &self.source_constraint {
            let _ = writeln!(desc, "\tSource Constraint: {}", c);
        }
        for m in &self.messages {
            let _ = writeln!(desc, "\tMessage: {}", m.value());
        }
        if !self.details.is_empty() {
            desc.push_str("\tDetails:\n");
            for d in &self.details {
                for line in d.description().lines() {
                    let _ = writeln!(desc, "\t\t{}", line);
                }
            }
        }
        desc
    }

    fn insert_into(&self, graph: &mut Graph) -> Subject {
        let sh = SHACL::new();
        let rdf = RDF::new();
        let node: Subject = BlankNode::default().into();
        graph.insert(&Triple::new(node.clone(), rdf.type_, sh.validation_result.into_owned()));
        graph.insert(&Triple::new(node.clone(), sh.focus_node, self.focus_node.clone()));
        if let Some(v) = &self.value {
            graph.insert(&Triple::new(node.clone(), sh.value, v.clone()));
        }
        if let Some(p) = &self.result_path {
            let path = path_to_rdf(p, graph);
            graph.insert(&Triple::new(node.clone(), sh.result_path, path));
        }
        graph.insert(&Triple::new(node.clone(), sh.source_shape, self.source_shape.clone()));
        graph.insert(&Triple::new(
            node.clone(),
            sh.source_constraint_component,
            self.source_constraint_component.clone(),
        ));
        if let Some(c) = &self.source_constraint {
            graph.insert(&Triple::new(node.clone(), sh.source_constraint, c.clone()));
        }
        graph.insert(&Triple::new(
            node.clone(),
            sh.result_severity,
            self.severity.to_named_node(),
        ));
        for m in &self.messages {
            graph.insert(&Triple::new(node.clone(), sh.result_message, m.clone()));
        }
        for d in &self.details {
            let detail = d.insert_into(graph);
            graph.insert(&Triple::new(node.clone(), sh.detail, detail));
        }
        node
    }

    fn record(&self) -> ResultRecord {
        ResultRecord {
            severity: self.severity.to_named_node().as_str().to_string(),
            focus_node: self.focus_node.to_string(),
            value: self.value.as_ref().map(Term::to_string),
            result_path: self.result_path.as_ref().map(Path::to_string),
            source_shape: self.source_shape.to_string(),
            source_constraint_component: self.source_constraint_component.as_str().to_string(),
            source_constraint: self.source_constraint.as_ref().map(Term::to_string),
            messages: self.messages.iter().map(|m| m.value().to_string()).collect(),
            details: self.details.iter().map(ValidationResult::record).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ResultRecord {
    severity: String,
    focus_node: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    result_path: Option<String>,
    source_shape: String,
    source_constraint_component: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    source_constraint: Option<String>,
    messages: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    details: Vec<ResultRecord>,
}

#[derive(Debug, Serialize)]
struct ReportRecord {
    conforms: bool,
    results: Vec<ResultRecord>,
}

/// The outcome of a validation run: overall conformance plus every result, in
/// a stable order.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationReport {
    conforms: bool,
    results: Vec<ValidationResult>,
}

impl ValidationReport {
    pub(crate) fn new(conforms: bool, results: Vec<ValidationResult>) -> Self {
        ValidationReport { conforms, results }
    }

    pub fn conforms(&self) -> bool {
        self.conforms
    }

    pub fn results(&self) -> &[ValidationResult] {
        &self.results
    }

    /// The plain-text report.
    pub fn text(&self) -> String {
        let mut text = format!(
            "Validation Report\nConforms: {}\n",
            if self.conforms { "True" } else { "False" }
        );
        if !self.results.is_empty() {
            let _ = writeln!(text, "Results ({}):", self.results.len());
            for r in &self.results {
                text.push_str(&r.description());
            }
        }
        text
    }

    /// The report as an RDF graph in the SHACL results vocabulary.
    pub fn to_graph(&self) -> Graph {
        let sh = SHACL::new();
        let rdf = RDF::new();
        let mut graph = Graph::new();
        let report: Subject = BlankNode::default().into();
        graph.insert(&Triple::new(report.clone(), rdf.type_, sh.validation_report.into_owned()));
        graph.insert(&Triple::new(
            report.clone(),
            sh.conforms,
            Literal::new_typed_literal(if self.conforms { "true" } else { "false" }, xsd::BOOLEAN),
        ));
        for result in &self.results {
            let node = result.insert_into(&mut graph);
            graph.insert(&Triple::new(report.clone(), sh.result, node));
        }
        graph
    }

    pub fn to_rdf(&self, format: RdfFormat) -> Result<String> {
        let graph = self.to_graph();
        let mut writer = Vec::new();
        let mut serializer = RdfSerializer::from_format(format)
            .with_prefix("sh", "http://www.w3.org/ns/shacl#")
            .and_then(|s| s.with_prefix("rdf", "http://www.w3.org/1999/02/22-rdf-syntax-ns#"))
            .and_then(|s| s.with_prefix("rdfs", "http://www.w3.org/2000/01/rdf-schema#"))
            .and_then(|s| s.with_prefix("xsd", "http://www.w3.org/2001/XMLSchema#"))
            .map_err(|e| EngineError::Serialization(e.to_string()))?
            .for_writer(&mut writer);
        for triple in graph.iter() {
            serializer
                .serialize_triple(triple)
                .map_err(|e| EngineError::Serialization(e.to_string()))?;
        }
        serializer
            .finish()
            .map_err(|e| EngineError::Serialization(e.to_string()))?;
        String::from_utf8(writer).map_err(|e| EngineError::Serialization(e.to_string()))
    }

    pub fn to_turtle(&self) -> Result<String> {
        self.to_rdf(RdfFormat::Turtle)
    }

    pub fn to_json(&self) -> Result<String> {
        let record = ReportRecord {
            conforms: self.conforms,
            results: self.results.iter().map(ValidationResult::record).collect(),
        };
        serde_json::to_string_pretty(&record).map_err(|e| EngineError::Serialization(e.to_string()))
    }
}

/// Re-encodes a path in the SHACL path vocabulary and returns its root node.
fn path_to_rdf(path: &Path, graph: &mut Graph) -> Term {
    let sh = SHACL::new();
    let wrap = |predicate, inner: &Path, graph: &mut Graph| -> Term {
        let bn: Subject = BlankNode::default().into();
        let inner_term = path_to_rdf(inner, graph);
        graph.insert(&Triple::new(bn.clone(), predicate, inner_term));
        bn.into()
    };
    match path {
        Path::Predicate(p) => p.clone().into(),
        Path::Inverse(inner) => wrap(sh.inverse_path, inner, graph),
        Path::ZeroOrMore(inner) => wrap(sh.zero_or_more_path, inner, graph),
        Path::OneOrMore(inner) => wrap(sh.one_or_more_path, inner, graph),
        Path::ZeroOrOne(inner) => wrap(sh.zero_or_one_path, inner, graph),
        Path::Sequence(paths) => {
            let items: Vec<Term> = paths.iter().map(|p| path_to_rdf(p, graph)).collect();
            build_rdf_list(items, graph)
        }
        Path::Alternative(paths) => {
            let bn: Subject = BlankNode::default().into();
            let items: Vec<Term> = paths.iter().map(|p| path_to_rdf(p, graph)).collect();
            let list_head = build_rdf_list(items, graph);
            graph.insert(&Triple::new(bn.clone(), sh.alternative_path, list_head));
            bn.into()
        }
    }
}

fn build_rdf_list(items: Vec<Term>, graph: &mut Graph) -> Term {
    let rdf = RDF::new();
    let mut head: Term = rdf.nil.into_owned().into();
    for item in items.into_iter().rev() {
        let cell: Subject = BlankNode::default().into();
        graph.insert(&Triple::new(cell.clone(), rdf.first, item));
        graph.insert(&Triple::new(cell.clone(), rdf.rest, head));
        head = cell.into();
    }
    head
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::GraphBackend;
    use crate::path::parse_path;

    fn p(iri: &str) -> Path {
        Path::Predicate(NamedNode::new_unchecked(iri))
    }

    #[test]
    fn path_encoding_parses_back() {
        let path = Path::Sequence(vec![
            p("http://ex/a"),
            Path::Alternative(vec![
                Path::Inverse(Box::new(p("http://ex/b"))),
                Path::OneOrMore(Box::new(p("http://ex/c"))),
            ]),
        ]);
        let mut graph = Graph::new();
        let root = path_to_rdf(&path, &mut graph);
        assert_eq!(parse_path(&graph, &root).unwrap(), path);
        assert!(graph.items(&root).is_some());
    }

    #[test]
    fn empty_report_text() {
        let report = ValidationReport::new(true, vec![]);
        assert_eq!(report.text(), "Validation Report\nConforms: True\n");
        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(json["conforms"], serde_json::Value::Bool(true));
    }
}
