//! Collaborator seams for graph access and SPARQL execution.
//!
//! The engine reads both the shapes graph and the data graph through
//! [`GraphBackend`], and hands SPARQL text to a [`QueryEngine`]. Neither trait
//! is tied to a particular store; in-memory `oxigraph` graphs implement the
//! first, and [`OxigraphQueryEngine`] adapts the oxigraph store to the second.

use crate::error::{EngineError, Result};
use crate::named_nodes::RDF;
use oxigraph::model::{
    GraphNameRef, Graph, NamedNode, NamedNodeRef, SubjectRef, Term, TermRef,
};
use oxigraph::sparql::{QueryOptions, QueryResults, Variable};
use oxigraph::store::Store;
use std::collections::{BTreeMap, HashSet};

/// Read-only query surface over an RDF graph.
///
/// All set-valued methods return each term at most once.
pub trait GraphBackend {
    /// Objects of triples `(subject, predicate, ?)`.
    fn objects(&self, subject: &Term, predicate: NamedNodeRef<'_>) -> Vec<Term>;

    /// Subjects of triples `(?, predicate, object)`.
    fn subjects(&self, predicate: NamedNodeRef<'_>, object: &Term) -> Vec<Term>;

    /// All `(predicate, object)` pairs of `subject`.
    fn predicate_objects(&self, subject: &Term) -> Vec<(NamedNode, Term)>;

    /// Subjects of any triple using `predicate`.
    fn subjects_with_predicate(&self, predicate: NamedNodeRef<'_>) -> Vec<Term>;

    /// Objects of any triple using `predicate`.
    fn objects_with_predicate(&self, predicate: NamedNodeRef<'_>) -> Vec<Term>;

    /// True if `term` occurs anywhere in the graph as subject, predicate or object.
    fn contains_term(&self, term: &Term) -> bool;

    /// True if the exact triple is present.
    fn contains(&self, subject: &Term, predicate: NamedNodeRef<'_>, object: &Term) -> bool;

    /// Members of the RDF list starting at `head`, or `None` if the list is malformed
    /// (missing or repeated `rdf:first`/`rdf:rest`, or a cycle).
    fn items(&self, head: &Term) -> Option<Vec<Term>> {
        let rdf = RDF::new();
        let nil: Term = rdf.nil.into_owned().into();
        let mut items = Vec::new();
        let mut visited = HashSet::new();
        let mut current = head.clone();
        while current != nil {
            if !visited.insert(current.clone()) {
                return None;
            }
            let mut firsts = self.objects(&current, rdf.first);
            let mut rests = self.objects(&current, rdf.rest);
            if firsts.len() != 1 || rests.len() != 1 {
                return None;
            }
            items.extend(firsts.pop());
            current = rests.pop()?;
        }
        Some(items)
    }

    /// First object of `(subject, predicate, ?)`, if any.
    fn object(&self, subject: &Term, predicate: NamedNodeRef<'_>) -> Option<Term> {
        self.objects(subject, predicate).into_iter().next()
    }
}

/// Converts a term to a triple subject. Literals cannot be subjects.
pub(crate) fn as_subject(term: &Term) -> Option<SubjectRef<'_>> {
    match term {
        Term::NamedNode(n) => Some(n.as_ref().into()),
        Term::BlankNode(b) => Some(b.as_ref().into()),
        _ => None,
    }
}

impl GraphBackend for Graph {
    fn objects(&self, subject: &Term, predicate: NamedNodeRef<'_>) -> Vec<Term> {
        let Some(subject) = as_subject(subject) else {
            return Vec::new();
        };
        self.objects_for_subject_predicate(subject, predicate)
            .map(TermRef::into_owned)
            .collect()
    }

    fn subjects(&self, predicate: NamedNodeRef<'_>, object: &Term) -> Vec<Term> {
        self.subjects_for_predicate_object(predicate, object.as_ref())
            .map(|s| Term::from(s.into_owned()))
            .collect()
    }

    fn predicate_objects(&self, subject: &Term) -> Vec<(NamedNode, Term)> {
        let Some(subject) = as_subject(subject) else {
            return Vec::new();
        };
        self.triples_for_subject(subject)
            .map(|t| (t.predicate.into_owned(), t.object.into_owned()))
            .collect()
    }

    fn subjects_with_predicate(&self, predicate: NamedNodeRef<'_>) -> Vec<Term> {
        let mut seen = HashSet::new();
        self.triples_for_predicate(predicate)
            .map(|t| Term::from(t.subject.into_owned()))
            .filter(|s| seen.insert(s.clone()))
            .collect()
    }

    fn objects_with_predicate(&self, predicate: NamedNodeRef<'_>) -> Vec<Term> {
        let mut seen = HashSet::new();
        self.triples_for_predicate(predicate)
            .map(|t| t.object.into_owned())
            .filter(|o| seen.insert(o.clone()))
            .collect()
    }

    fn contains_term(&self, term: &Term) -> bool {
        if let Some(subject) = as_subject(term) {
            if self.triples_for_subject(subject).next().is_some() {
                return true;
            }
        }
        if let Term::NamedNode(p) = term {
            if self.triples_for_predicate(p.as_ref()).next().is_some() {
                return true;
            }
        }
        self.triples_for_object(term.as_ref()).next().is_some()
    }

    fn contains(&self, subject: &Term, predicate: NamedNodeRef<'_>, object: &Term) -> bool {
        let Some(subject) = as_subject(subject) else {
            return false;
        };
        self.objects_for_subject_predicate(subject, predicate)
            .any(|o| o == object.as_ref())
    }
}

/// Variables pre-bound before a query is handed to the [`QueryEngine`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryBindings {
    bindings: BTreeMap<String, Term>,
}

impl QueryBindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&mut self, name: impl Into<String>, value: Term) -> &mut Self {
        self.bindings.insert(name.into(), value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Term> {
        self.bindings.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Term)> {
        self.bindings.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// One row of a SELECT result, keyed by variable name without the `?`/`$` sigil.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuerySolution {
    values: BTreeMap<String, Term>,
}

impl QuerySolution {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: Term) -> Self {
        self.values.insert(name.into(), value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Term> {
        self.values.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Term)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Executes SPARQL text against the data graph.
///
/// The engine never interprets SPARQL itself; it prepares the text (prefixes,
/// `$PATH` substitution) and the initial bindings, then delegates here.
pub trait QueryEngine {
    fn ask(&self, query: &str, bindings: &QueryBindings) -> Result<bool>;

    fn select(&self, query: &str, bindings: &QueryBindings) -> Result<Vec<QuerySolution>>;
}

/// [`QueryEngine`] over an in-memory oxigraph store holding a copy of the data graph.
pub struct OxigraphQueryEngine {
    store: Store,
}

impl OxigraphQueryEngine {
    pub fn from_graph(graph: &Graph) -> Result<Self> {
        let store = Store::new().map_err(|e| EngineError::QueryEngine(e.to_string()))?;
        for triple in graph.iter() {
            store
                .insert(triple.in_graph(GraphNameRef::DefaultGraph))
                .map_err(|e| EngineError::QueryEngine(e.to_string()))?;
        }
        Ok(Self { store })
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    fn run(&self, query: &str, bindings: &QueryBindings) -> Result<QueryResults> {
        let mut substitutions = Vec::new();
        for (name, value) in bindings.iter() {
            let var =
                Variable::new(name).map_err(|e| EngineError::QueryEngine(e.to_string()))?;
            substitutions.push((var, value.clone()));
        }
        self.store
            .query_opt_with_substituted_variables(query, QueryOptions::default(), substitutions)
            .map_err(|e| EngineError::QueryEngine(format!("{}\n{}", e, query)))
    }
}

impl QueryEngine for OxigraphQueryEngine {
    fn ask(&self, query: &str, bindings: &QueryBindings) -> Result<bool> {
        match self.run(query, bindings)? {
            QueryResults::Boolean(b) => Ok(b),
            _ => Err(EngineError::QueryEngine(
                "expected a boolean result from an ASK query".to_string(),
            )),
        }
    }

    fn select(&self, query: &str, bindings: &QueryBindings) -> Result<Vec<QuerySolution>> {
        match self.run(query, bindings)? {
            QueryResults::Solutions(solutions) => {
                let mut rows = Vec::new();
                for solution in solutions {
                    let solution =
                        solution.map_err(|e| EngineError::QueryEngine(e.to_string()))?;
                    let mut row = QuerySolution::new();
                    for (var, value) in solution.iter() {
                        row = row.with(var.as_str(), value.clone());
                    }
                    rows.push(row);
                }
                Ok(rows)
            }
            _ => Err(EngineError::QueryEngine(
                "expected solutions from a SELECT query".to_string(),
            )),
        }
    }
}
