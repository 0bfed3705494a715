//! SPARQL-based constraints and user-declared constraint components.
//!
//! The engine never runs SPARQL itself. It checks the query text for the
//! constructs SHACL forbids, substitutes `$PATH`, pre-binds `this`, `value`,
//! `currentShape` and component parameters, and hands the text to the
//! [`QueryEngine`](crate::backend::QueryEngine) of the context.

use crate::backend::{GraphBackend, QueryBindings, QuerySolution};
use crate::context::{format_term_for_label, ValidationContext};
use crate::error::{EngineError, Result};
use crate::named_nodes::{RDF, SHACL, SH_NS};
use crate::report::ValidationResult;
use crate::shape::Shape;
use crate::types::{sorted_terms, subclass_closure, Path};
use oxigraph::model::{Literal, NamedNode, NamedNodeRef, Term};
use regex::{NoExpand, Regex};
use std::collections::BTreeMap;
use std::sync::LazyLock;

use super::{as_boolean, ComponentKind, ComponentLoader, FocusValueNodes, Outcome, ValidateComponent};

/// Names that cannot be used for custom component parameters.
const RESERVED_NAMES: [&str; 6] = ["this", "shapesGraph", "currentShape", "path", "PATH", "value"];

static TEMPLATE_VAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{[$?]([^{}]+)\}").expect("template variable pattern"));
static VARIABLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|[^\w$?])[$?](\w+)").expect("variable pattern"));
static COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)(^|\s)#[^\n]*").expect("comment pattern"));
static FORBIDDEN_CLAUSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:^|[^?$\w])(MINUS|VALUES|SERVICE)\b").expect("forbidden clause pattern")
});
static REBINDING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bAS\s+[$?](\w+)").expect("rebinding pattern"));
static PATH_VAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[$?]PATH\b").expect("path variable pattern"));

/// Text of a term as it is spliced into messages.
fn template_value(term: &Term) -> String {
    match term {
        Term::NamedNode(n) => n.as_str().to_string(),
        Term::Literal(l) => l.value().to_string(),
        other => other.to_string(),
    }
}

/// Replaces `{$var}` and `{?var}` with the value `lookup` finds for `var`.
/// Unknown variables are left in place.
fn fill_template(text: &str, lookup: impl Fn(&str) -> Option<Term>) -> String {
    TEMPLATE_VAR
        .replace_all(text, |caps: &regex::Captures<'_>| match lookup(&caps[1]) {
            Some(t) => template_value(&t),
            None => caps[0].to_string(),
        })
        .into_owned()
}

/// Builds the messages of a SPARQL-sourced result: the constraint's own
/// messages first, then the shape's, each filled from the parameters and the
/// solution row.
fn result_messages(
    own: &[Literal],
    shape: &Shape,
    parameters: &[(String, Term)],
    vars: &QuerySolution,
) -> Vec<Literal> {
    let lookup = |name: &str| -> Option<Term> {
        vars.get(name).cloned().or_else(|| {
            parameters
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, t)| t.clone())
        })
    };
    let mut messages: Vec<Literal> = Vec::new();
    for m in own.iter().chain(shape.messages().iter().filter(|m| !own.contains(*m))) {
        let text = fill_template(m.value(), &lookup);
        let filled = match m.language() {
            Some(lang) => Literal::new_language_tagged_literal_unchecked(text, lang),
            None => Literal::new_simple_literal(text),
        };
        if !messages.contains(&filled) {
            messages.push(filled);
        }
    }
    messages
}

fn single_literal(
    graph: &dyn GraphBackend,
    node: &Term,
    predicate: NamedNodeRef<'_>,
    component: &str,
) -> Result<String> {
    let mut values = graph.objects(node, predicate);
    if values.len() != 1 {
        return Err(EngineError::constraint_load(
            component,
            node,
            format!("requires exactly one {} value, found {}", predicate, values.len()),
        ));
    }
    match values.pop() {
        Some(Term::Literal(l)) => Ok(l.value().to_string()),
        other => Err(EngineError::constraint_load(
            component,
            node,
            format!("{} value must be a string literal, found {:?}", predicate, other),
        )),
    }
}

fn literal_messages(graph: &dyn GraphBackend, node: &Term, component: &str) -> Result<Vec<Literal>> {
    sorted_terms(graph.objects(node, SHACL::new().message))
        .into_iter()
        .map(|m| match m {
            Term::Literal(l) => Ok(l),
            other => Err(EngineError::constraint_load(
                component,
                node,
                format!("sh:message value {} must be a literal", other),
            )),
        })
        .collect()
}

/// A SPARQL query text with the prefixes declared for it.
#[derive(Debug, Clone)]
pub(crate) struct SparqlQuery {
    node: Term,
    text: String,
    prefixes: BTreeMap<String, String>,
}

impl SparqlQuery {
    fn load(graph: &dyn GraphBackend, node: &Term, text: String, component: &str) -> Result<Self> {
        let sh = SHACL::new();
        let mut prefixes = BTreeMap::from([
            ("owl".to_string(), "http://www.w3.org/2002/07/owl#".to_string()),
            ("rdf".to_string(), "http://www.w3.org/1999/02/22-rdf-syntax-ns#".to_string()),
            ("rdfs".to_string(), "http://www.w3.org/2000/01/rdf-schema#".to_string()),
        ]);
        for declarations in sorted_terms(graph.objects(node, sh.prefixes)) {
            for declaration in sorted_terms(graph.objects(&declarations, sh.declare)) {
                if matches!(declaration, Term::Literal(_)) {
                    return Err(EngineError::constraint_load(
                        component,
                        node,
                        "sh:declare value must be an IRI or a blank node",
                    ));
                }
                let prefix = single_literal(graph, &declaration, sh.prefix, component)?;
                let mut namespaces = graph.objects(&declaration, sh.namespace);
                let namespace = match (namespaces.pop(), namespaces.is_empty()) {
                    (Some(Term::Literal(l)), true) => l.value().to_string(),
                    (Some(Term::NamedNode(n)), true) => n.as_str().to_string(),
                    _ => {
                        return Err(EngineError::constraint_load(
                            component,
                            node,
                            format!("prefix declaration {} needs exactly one sh:namespace", prefix),
                        ))
                    }
                };
                prefixes.insert(prefix, namespace);
            }
        }
        Ok(SparqlQuery {
            node: node.clone(),
            text,
            prefixes,
        })
    }

    fn mentions(&self, name: &str) -> bool {
        VARIABLE.captures_iter(&self.text).any(|caps| &caps[1] == name)
    }

    /// Rejects the constructs a SPARQL-based constraint must not use.
    fn check(&self, prebound: &[&str]) -> Result<()> {
        let without_comments = COMMENT.replace_all(&self.text, "$1");
        if let Some(caps) = FORBIDDEN_CLAUSE.captures(&without_comments) {
            return Err(EngineError::Runtime(format!(
                "A SPARQL constraint must not contain a {} clause ({})",
                caps[1].to_uppercase(),
                self.node
            )));
        }
        for caps in REBINDING.captures_iter(&without_comments) {
            if prebound.contains(&&caps[1]) {
                return Err(EngineError::Runtime(format!(
                    "Cannot use AS to re-bind the pre-bound variable {} ({})",
                    &caps[1], self.node
                )));
            }
        }
        Ok(())
    }

    /// The executable text and initial bindings for one focus (and value) node.
    fn prepare(
        &self,
        shape: &Shape,
        focus: &Term,
        value: Option<&Term>,
        parameters: &[(String, Term)],
    ) -> Result<(String, QueryBindings)> {
        let mut prebound = vec!["this", "shapesGraph", "currentShape"];
        if value.is_some() {
            prebound.push("value");
        }
        prebound.extend(parameters.iter().map(|(n, _)| n.as_str()));
        self.check(&prebound)?;

        let mut bindings = QueryBindings::new();
        if self.mentions("this") {
            bindings.bind("this", focus.clone());
        }
        if let Some(v) = value {
            if self.mentions("value") {
                bindings.bind("value", v.clone());
            }
        }
        if self.mentions("currentShape") {
            bindings.bind("currentShape", shape.node().clone());
        }
        if self.mentions("shapesGraph") {
            return Err(EngineError::Runtime(format!(
                "$shapesGraph is not supported in SPARQL constraint {}",
                self.node
            )));
        }
        for (name, term) in parameters {
            if self.mentions(name) {
                bindings.bind(name.clone(), term.clone());
            }
        }

        let text = match shape.path() {
            Some(path) => PATH_VAR
                .replace_all(&self.text, NoExpand(&path.to_sparql_path()?))
                .into_owned(),
            None if PATH_VAR.is_match(&self.text) => {
                return Err(EngineError::Runtime(format!(
                    "SPARQL text of {} uses $PATH, but shape {} has no path",
                    self.node,
                    shape.node()
                )))
            }
            None => self.text.clone(),
        };

        let mut query = String::new();
        for (prefix, namespace) in &self.prefixes {
            query.push_str(&format!("PREFIX {}: <{}>\n", prefix, namespace));
        }
        query.push_str(&text);
        Ok((query, bindings))
    }
}

/// Turns SELECT solutions into results. Rows are deduplicated on their
/// `this`/`path`/`value` bindings; a row with `failure` true aborts the run.
#[allow(clippy::too_many_arguments)]
fn results_from_rows(
    rows: &[QuerySolution],
    shape: &Shape,
    focus: &Term,
    component: &NamedNode,
    constraint_name: &str,
    source_constraint: Option<&Term>,
    messages: &[Literal],
    parameters: &[(String, Term)],
) -> Result<Vec<ValidationResult>> {
    // node shapes report the focus node as the value unless the row says otherwise
    let default_value = if shape.is_property_shape() { None } else { Some(focus) };
    let mut seen = Vec::new();
    let mut results = Vec::new();
    for row in rows {
        if row.get("failure").and_then(as_boolean) == Some(true) {
            return Err(EngineError::Runtime(format!(
                "SPARQL query of {} reported a failure for focus node {}",
                source_constraint.unwrap_or(shape.node()),
                focus
            )));
        }
        let this = row.get("this").unwrap_or(focus);
        let path = match row.get("path") {
            Some(Term::NamedNode(p)) => Some(Path::Predicate(p.clone())),
            _ => None,
        };
        let value = row.get("value").or(default_value);
        let key = (this.clone(), path.clone(), value.cloned());
        if seen.contains(&key) {
            continue;
        }
        seen.push(key);

        // pre-bound variables may be missing from the row
        let mut vars = row.clone();
        if vars.get("this").is_none() {
            vars = vars.with("this", this.clone());
        }
        if let Some(v) = value.filter(|_| vars.get("value").is_none()) {
            vars = vars.with("value", v.clone());
        }
        let mut result = ValidationResult::new(shape, component.clone(), constraint_name, this.clone())
            .with_messages(result_messages(messages, shape, parameters, &vars));
        if let Some(c) = source_constraint {
            result = result.with_source_constraint(c.clone());
        }
        if let Some(v) = value {
            result = result.with_value(v.clone());
        }
        if let Some(p) = path {
            result = result.with_result_path(p);
        }
        results.push(result);
    }
    Ok(results)
}

#[derive(Debug)]
struct SparqlConstraint {
    query: SparqlQuery,
    messages: Vec<Literal>,
    deactivated: bool,
}

/// `sh:sparql`: one or more SELECT-based constraints on the shape.
#[derive(Debug)]
pub struct SparqlConstraintComponent {
    constraints: Vec<SparqlConstraint>,
}

impl SparqlConstraintComponent {
    pub(crate) fn load(loader: &ComponentLoader<'_>) -> Result<Self> {
        let kind = ComponentKind::Sparql;
        let sh = SHACL::new();
        let mut constraints = Vec::new();
        for node in loader.required(kind, sh.sparql)? {
            let text = single_literal(loader.graph, &node, sh.select, kind.name())?;
            let messages = literal_messages(loader.graph, &node, kind.name())?;
            let deactivated = match loader.graph.objects(&node, sh.deactivated).as_slice() {
                [] => false,
                [value] => as_boolean(value).ok_or_else(|| {
                    loader.error(kind, "sh:deactivated of a SPARQL constraint must be an xsd:boolean")
                })?,
                _ => return Err(loader.error(kind, "more than one sh:deactivated on a SPARQL constraint")),
            };
            let query = SparqlQuery::load(loader.graph, &node, text, kind.name())?;
            constraints.push(SparqlConstraint {
                query,
                messages,
                deactivated,
            });
        }
        Ok(SparqlConstraintComponent { constraints })
    }
}

impl ValidateComponent for SparqlConstraintComponent {
    fn evaluate(
        &self,
        cx: &mut ValidationContext<'_>,
        shape: &Shape,
        focus_value_nodes: &FocusValueNodes,
    ) -> Result<Outcome> {
        let kind = ComponentKind::Sparql;
        let engine = cx.query_engine("sh:sparql")?;
        let mut results = Vec::new();
        for constraint in self.constraints.iter().filter(|c| !c.deactivated) {
            for (focus, _) in focus_value_nodes {
                let (query, bindings) = constraint.query.prepare(shape, focus, None, &[])?;
                let rows = engine.select(&query, &bindings)?;
                results.extend(results_from_rows(
                    &rows,
                    shape,
                    focus,
                    &kind.iri(),
                    kind.name(),
                    Some(&constraint.query.node),
                    &constraint.messages,
                    &[],
                )?);
            }
        }
        Ok((results.is_empty(), results))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QueryForm {
    Ask,
    Select,
}

#[derive(Debug)]
struct Validator {
    form: QueryForm,
    query: SparqlQuery,
    messages: Vec<Literal>,
}

impl Validator {
    fn load(graph: &dyn GraphBackend, node: &Term, component: &str) -> Result<Self> {
        let sh = SHACL::new();
        let types = graph.objects(node, RDF::new().type_);
        let typed = |t: NamedNodeRef<'_>| types.iter().any(|x| matches!(x, Term::NamedNode(n) if *n == t));
        let has_select = !graph.objects(node, sh.select).is_empty();
        let has_ask = !graph.objects(node, sh.ask).is_empty();
        let form = if has_select && has_ask {
            return Err(EngineError::constraint_load(
                component,
                node,
                "validator has both sh:select and sh:ask",
            ));
        } else if typed(sh.sparql_select_validator) {
            QueryForm::Select
        } else if typed(sh.sparql_ask_validator) {
            QueryForm::Ask
        } else if has_select {
            QueryForm::Select
        } else if has_ask {
            QueryForm::Ask
        } else {
            return Err(EngineError::constraint_load(
                component,
                node,
                "validator must be a sh:SPARQLSelectValidator or sh:SPARQLAskValidator",
            ));
        };
        let predicate = match form {
            QueryForm::Select => sh.select,
            QueryForm::Ask => sh.ask,
        };
        let text = single_literal(graph, node, predicate, component)?;
        Ok(Validator {
            form,
            query: SparqlQuery::load(graph, node, text, component)?,
            messages: literal_messages(graph, node, component)?,
        })
    }
}

#[derive(Debug)]
struct Parameter {
    path: NamedNode,
    name: String,
    optional: bool,
}

/// A user-declared constraint component: typed `sh:ConstraintComponent` (or a
/// subclass of it), with parameters and SPARQL validators.
#[derive(Debug)]
pub struct CustomConstraintComponent {
    node: Term,
    iri: NamedNode,
    parameters: Vec<Parameter>,
    validator: Option<Validator>,
    node_validator: Option<Validator>,
    property_validator: Option<Validator>,
}

impl CustomConstraintComponent {
    pub(crate) fn load(graph: &dyn GraphBackend, node: &Term) -> Result<Self> {
        let sh = SHACL::new();
        let name = ComponentKind::Custom.name();
        let load_error = |msg: String| EngineError::constraint_load(name, node, msg);

        let mut parameters = Vec::new();
        for param in sorted_terms(graph.objects(node, sh.parameter)) {
            let path = match graph.objects(&param, sh.path).as_slice() {
                [Term::NamedNode(p)] => p.clone(),
                [other] => return Err(load_error(format!("parameter path {} must be an IRI", other))),
                paths => {
                    return Err(load_error(format!(
                        "parameter {} must have exactly one sh:path, found {}",
                        param,
                        paths.len()
                    )))
                }
            };
            let label = format_term_for_label(&Term::NamedNode(path.clone()));
            if RESERVED_NAMES.contains(&label.as_str()) {
                return Err(load_error(format!("parameter name {} cannot be used", label)));
            }
            let optional = graph
                .objects(&param, sh.optional)
                .iter()
                .any(|t| as_boolean(t) == Some(true));
            parameters.push(Parameter {
                path,
                name: label,
                optional,
            });
        }
        if parameters.is_empty() {
            return Err(load_error("requires at least one sh:parameter".to_string()));
        }
        if parameters.iter().all(|p| p.optional) {
            return Err(load_error("requires at least one non-optional parameter".to_string()));
        }

        let role = |predicate: NamedNodeRef<'static>| -> Result<Option<Validator>> {
            match sorted_terms(graph.objects(node, predicate)).first() {
                Some(v) => Validator::load(graph, v, name).map(Some),
                None => Ok(None),
            }
        };
        let validator = role(sh.validator)?;
        let node_validator = role(sh.node_validator)?;
        let property_validator = role(sh.property_validator)?;
        if validator.is_none() && node_validator.is_none() && property_validator.is_none() {
            return Err(load_error(
                "requires one of sh:validator, sh:nodeValidator or sh:propertyValidator".to_string(),
            ));
        }
        if validator.as_ref().is_some_and(|v| v.form != QueryForm::Ask) {
            return Err(load_error("sh:validator must be a SPARQL ASK validator".to_string()));
        }

        let iri = match node {
            Term::NamedNode(n) => n.clone(),
            _ => sh.constraint_component.into_owned(),
        };
        Ok(CustomConstraintComponent {
            node: node.clone(),
            iri,
            parameters,
            validator,
            node_validator,
            property_validator,
        })
    }

    pub fn node(&self) -> &Term {
        &self.node
    }

    fn validator_for(&self, is_property_shape: bool) -> Option<&Validator> {
        let specific = if is_property_shape {
            self.property_validator.as_ref()
        } else {
            self.node_validator.as_ref()
        };
        specific.or(self.validator.as_ref())
    }

    /// Binds this component to a shape node. `Ok(None)` when a mandatory
    /// parameter is missing, so the component does not apply.
    pub(crate) fn bind(
        &self,
        index: usize,
        loader: &ComponentLoader<'_>,
    ) -> Result<Option<CustomComponentBinding>> {
        let mut bound = Vec::new();
        for param in &self.parameters {
            match loader.objects(param.path.as_ref()).into_iter().next() {
                Some(value) => bound.push((param.name.clone(), value)),
                None if param.optional => {}
                None => return Ok(None),
            }
        }
        if self.validator_for(loader.is_property_shape).is_none() {
            return Err(EngineError::constraint_load(
                ComponentKind::Custom.name(),
                loader.node,
                format!("component {} has no validator for this kind of shape", self.node),
            ));
        }
        Ok(Some(CustomComponentBinding {
            component: index,
            parameters: bound,
        }))
    }
}

/// All custom component declarations in the shapes graph, outside the `sh:`
/// namespace, in term order.
pub(crate) fn discover_custom_components(graph: &dyn GraphBackend) -> Result<Vec<CustomConstraintComponent>> {
    let marker: Term = SHACL::new().constraint_component.into_owned().into();
    let mut nodes = Vec::new();
    for class in subclass_closure(graph, &marker) {
        nodes.extend(graph.subjects(RDF::new().type_, &class));
    }
    sorted_terms(nodes)
        .into_iter()
        .filter(|n| !matches!(n, Term::NamedNode(nn) if nn.as_str().starts_with(SH_NS)))
        .map(|n| CustomConstraintComponent::load(graph, &n))
        .collect()
}

/// A custom component applied to one shape, with the shape's parameter values.
#[derive(Debug)]
pub(crate) struct CustomComponentBinding {
    component: usize,
    parameters: Vec<(String, Term)>,
}

impl ValidateComponent for CustomComponentBinding {
    fn evaluate(
        &self,
        cx: &mut ValidationContext<'_>,
        shape: &Shape,
        focus_value_nodes: &FocusValueNodes,
    ) -> Result<Outcome> {
        let definition = cx.shapes().custom_component(self.component).ok_or_else(|| {
            EngineError::Runtime(format!("unknown custom component #{}", self.component))
        })?;
        let Some(validator) = definition.validator_for(shape.is_property_shape()) else {
            return Ok((true, vec![]));
        };
        let engine = cx.query_engine("a SPARQL-based constraint component")?;
        let name = ComponentKind::Custom.name();
        let mut results = Vec::new();
        for (focus, values) in focus_value_nodes {
            match validator.form {
                QueryForm::Ask => {
                    for value in values {
                        let (query, bindings) =
                            validator.query.prepare(shape, focus, Some(value), &self.parameters)?;
                        if engine.ask(&query, &bindings)? {
                            continue;
                        }
                        let vars = QuerySolution::new()
                            .with("this", focus.clone())
                            .with("value", value.clone());
                        let messages =
                            result_messages(&validator.messages, shape, &self.parameters, &vars);
                        results.push(
                            ValidationResult::new(shape, definition.iri.clone(), name, focus.clone())
                                .with_value(value.clone())
                                .with_messages(messages),
                        );
                    }
                }
                QueryForm::Select => {
                    let (query, bindings) =
                        validator.query.prepare(shape, focus, None, &self.parameters)?;
                    let rows = engine.select(&query, &bindings)?;
                    results.extend(results_from_rows(
                        &rows,
                        shape,
                        focus,
                        &definition.iri,
                        name,
                        None,
                        &validator.messages,
                        &self.parameters,
                    )?);
                }
            }
        }
        Ok((results.is_empty(), results))
    }
}
