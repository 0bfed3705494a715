//! Constraint components.
//!
//! Every built-in component is a variant of [`Component`], parsed from a shape
//! node when the shapes graph is loaded. [`ComponentKind`] is the closed
//! registry that maps constraint parameters to components; a predicate that is
//! not a parameter of any kind is ignored.

use crate::backend::GraphBackend;
use crate::context::ValidationContext;
use crate::error::{EngineError, Result};
use crate::named_nodes::{SHACL, SH_NS};
use crate::report::ValidationResult;
use crate::shape::Shape;
use oxigraph::model::{Literal, NamedNode, NamedNodeRef, Term};

mod cardinality;
mod logical;
mod other;
mod property_pair;
mod shape_based;
pub(crate) mod sparql;
mod string_based;
mod value_range;
mod value_type;

pub(crate) use cardinality::{MaxCountConstraintComponent, MinCountConstraintComponent};
pub(crate) use logical::{
    AndConstraintComponent, NotConstraintComponent, OrConstraintComponent,
    XoneConstraintComponent,
};
pub(crate) use other::{ClosedConstraintComponent, HasValueConstraintComponent, InConstraintComponent};
pub(crate) use property_pair::{
    DisjointConstraintComponent, EqualsConstraintComponent, LessThanConstraintComponent,
};
pub(crate) use shape_based::{
    NodeConstraintComponent, PropertyConstraintComponent, QualifiedValueShapeConstraintComponent,
};
pub(crate) use sparql::{CustomConstraintComponent, SparqlConstraintComponent};
pub(crate) use string_based::{
    LanguageInConstraintComponent, LengthConstraintComponent, PatternConstraintComponent,
    UniqueLangConstraintComponent,
};
pub(crate) use value_range::RangeConstraintComponent;
pub(crate) use value_type::{
    ClassConstraintComponent, DatatypeConstraintComponent, NodeKindConstraintComponent,
};

/// Value nodes per focus node, in focus-node order.
pub type FocusValueNodes = Vec<(Term, Vec<Term>)>;

/// Conformance plus the results produced by one evaluation.
pub type Outcome = (bool, Vec<ValidationResult>);

/// The closed set of constraint component kinds.
///
/// Declaration order is evaluation order within a shape.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ComponentKind {
    Class,
    Datatype,
    NodeKind,
    MinCount,
    MaxCount,
    MinExclusive,
    MinInclusive,
    MaxExclusive,
    MaxInclusive,
    MinLength,
    MaxLength,
    Pattern,
    LanguageIn,
    UniqueLang,
    Equals,
    Disjoint,
    LessThan,
    LessThanOrEquals,
    Not,
    And,
    Or,
    Xone,
    Node,
    Property,
    QualifiedValueShape,
    Closed,
    HasValue,
    In,
    Sparql,
    /// A user-declared parameterized component.
    Custom,
}

impl ComponentKind {
    /// All kinds that are triggered by a parameter predicate on a shape.
    pub const BUILT_IN: [ComponentKind; 29] = [
        ComponentKind::Class,
        ComponentKind::Datatype,
        ComponentKind::NodeKind,
        ComponentKind::MinCount,
        ComponentKind::MaxCount,
        ComponentKind::MinExclusive,
        ComponentKind::MinInclusive,
        ComponentKind::MaxExclusive,
        ComponentKind::MaxInclusive,
        ComponentKind::MinLength,
        ComponentKind::MaxLength,
        ComponentKind::Pattern,
        ComponentKind::LanguageIn,
        ComponentKind::UniqueLang,
        ComponentKind::Equals,
        ComponentKind::Disjoint,
        ComponentKind::LessThan,
        ComponentKind::LessThanOrEquals,
        ComponentKind::Not,
        ComponentKind::And,
        ComponentKind::Or,
        ComponentKind::Xone,
        ComponentKind::Node,
        ComponentKind::Property,
        ComponentKind::QualifiedValueShape,
        ComponentKind::Closed,
        ComponentKind::HasValue,
        ComponentKind::In,
        ComponentKind::Sparql,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ComponentKind::Class => "ClassConstraintComponent",
            ComponentKind::Datatype => "DatatypeConstraintComponent",
            ComponentKind::NodeKind => "NodeKindConstraintComponent",
            ComponentKind::MinCount => "MinCountConstraintComponent",
            ComponentKind::MaxCount => "MaxCountConstraintComponent",
            ComponentKind::MinExclusive => "MinExclusiveConstraintComponent",
            ComponentKind::MinInclusive => "MinInclusiveConstraintComponent",
            ComponentKind::MaxExclusive => "MaxExclusiveConstraintComponent",
            ComponentKind::MaxInclusive => "MaxInclusiveConstraintComponent",
            ComponentKind::MinLength => "MinLengthConstraintComponent",
            ComponentKind::MaxLength => "MaxLengthConstraintComponent",
            ComponentKind::Pattern => "PatternConstraintComponent",
            ComponentKind::LanguageIn => "LanguageInConstraintComponent",
            ComponentKind::UniqueLang => "UniqueLangConstraintComponent",
            ComponentKind::Equals => "EqualsConstraintComponent",
            ComponentKind::Disjoint => "DisjointConstraintComponent",
            ComponentKind::LessThan => "LessThanConstraintComponent",
            ComponentKind::LessThanOrEquals => "LessThanOrEqualsConstraintComponent",
            ComponentKind::Not => "NotConstraintComponent",
            ComponentKind::And => "AndConstraintComponent",
            ComponentKind::Or => "OrConstraintComponent",
            ComponentKind::Xone => "XoneConstraintComponent",
            ComponentKind::Node => "NodeConstraintComponent",
            ComponentKind::Property => "PropertyConstraintComponent",
            ComponentKind::QualifiedValueShape => "QualifiedValueShapeConstraintComponent",
            ComponentKind::Closed => "ClosedConstraintComponent",
            ComponentKind::HasValue => "HasValueConstraintComponent",
            ComponentKind::In => "InConstraintComponent",
            ComponentKind::Sparql => "SPARQLConstraintComponent",
            ComponentKind::Custom => "ConstraintComponent",
        }
    }

    /// The `sh:` IRI of the component. Qualified value shapes report under
    /// `sh:QualifiedMinCountConstraintComponent`/`sh:QualifiedMaxCountConstraintComponent` instead.
    pub fn iri(&self) -> NamedNode {
        shacl_iri(self.name())
    }

    /// Predicates that make a shape carry this component.
    pub fn parameters(&self) -> Vec<NamedNodeRef<'static>> {
        let sh = SHACL::new();
        match self {
            ComponentKind::Class => vec![sh.class],
            ComponentKind::Datatype => vec![sh.datatype],
            ComponentKind::NodeKind => vec![sh.node_kind],
            ComponentKind::MinCount => vec![sh.min_count],
            ComponentKind::MaxCount => vec![sh.max_count],
            ComponentKind::MinExclusive => vec![sh.min_exclusive],
            ComponentKind::MinInclusive => vec![sh.min_inclusive],
            ComponentKind::MaxExclusive => vec![sh.max_exclusive],
            ComponentKind::MaxInclusive => vec![sh.max_inclusive],
            ComponentKind::MinLength => vec![sh.min_length],
            ComponentKind::MaxLength => vec![sh.max_length],
            ComponentKind::Pattern => vec![sh.pattern],
            ComponentKind::LanguageIn => vec![sh.language_in],
            ComponentKind::UniqueLang => vec![sh.unique_lang],
            ComponentKind::Equals => vec![sh.equals],
            ComponentKind::Disjoint => vec![sh.disjoint],
            ComponentKind::LessThan => vec![sh.less_than],
            ComponentKind::LessThanOrEquals => vec![sh.less_than_or_equals],
            ComponentKind::Not => vec![sh.not],
            ComponentKind::And => vec![sh.and_],
            ComponentKind::Or => vec![sh.or_],
            ComponentKind::Xone => vec![sh.xone],
            ComponentKind::Node => vec![sh.node],
            ComponentKind::Property => vec![sh.property],
            ComponentKind::QualifiedValueShape => vec![
                sh.qualified_value_shape,
                sh.qualified_min_count,
                sh.qualified_max_count,
                sh.qualified_value_shapes_disjoint,
            ],
            ComponentKind::Closed => vec![sh.closed, sh.ignored_properties],
            ComponentKind::HasValue => vec![sh.has_value],
            ComponentKind::In => vec![sh.in_],
            ComponentKind::Sparql => vec![sh.sparql],
            ComponentKind::Custom => vec![],
        }
    }

    pub fn for_parameter(predicate: NamedNodeRef<'_>) -> Option<ComponentKind> {
        ComponentKind::BUILT_IN
            .into_iter()
            .find(|kind| kind.parameters().iter().any(|p| *p == predicate))
    }
}

pub(crate) fn shacl_iri(local: &str) -> NamedNode {
    NamedNode::new_unchecked(format!("{}{}", SH_NS, local))
}

pub(crate) trait ValidateComponent {
    fn evaluate(
        &self,
        cx: &mut ValidationContext<'_>,
        shape: &Shape,
        focus_value_nodes: &FocusValueNodes,
    ) -> Result<Outcome>;
}

#[derive(Debug)]
pub enum Component {
    // value type
    Class(ClassConstraintComponent),
    Datatype(DatatypeConstraintComponent),
    NodeKind(NodeKindConstraintComponent),

    // cardinality
    MinCount(MinCountConstraintComponent),
    MaxCount(MaxCountConstraintComponent),

    // value range
    Range(RangeConstraintComponent),

    // string based
    Length(LengthConstraintComponent),
    Pattern(PatternConstraintComponent),
    LanguageIn(LanguageInConstraintComponent),
    UniqueLang(UniqueLangConstraintComponent),

    // property pair
    Equals(EqualsConstraintComponent),
    Disjoint(DisjointConstraintComponent),
    LessThan(LessThanConstraintComponent),

    // logical
    Not(NotConstraintComponent),
    And(AndConstraintComponent),
    Or(OrConstraintComponent),
    Xone(XoneConstraintComponent),

    // shape based
    Node(NodeConstraintComponent),
    Property(PropertyConstraintComponent),
    QualifiedValueShape(QualifiedValueShapeConstraintComponent),

    // other
    Closed(ClosedConstraintComponent),
    HasValue(HasValueConstraintComponent),
    In(InConstraintComponent),

    Sparql(SparqlConstraintComponent),
}

impl Component {
    /// Parses the component of `kind` from the shape node. `Ok(None)` means the
    /// component was skipped with a load warning.
    pub(crate) fn load(kind: ComponentKind, loader: &ComponentLoader<'_>) -> Result<Option<Self>> {
        let component = match kind {
            ComponentKind::Class => Component::Class(ClassConstraintComponent::load(loader)?),
            ComponentKind::Datatype => {
                Component::Datatype(DatatypeConstraintComponent::load(loader)?)
            }
            ComponentKind::NodeKind => {
                Component::NodeKind(NodeKindConstraintComponent::load(loader)?)
            }
            ComponentKind::MinCount => {
                Component::MinCount(MinCountConstraintComponent::load(loader)?)
            }
            ComponentKind::MaxCount => {
                Component::MaxCount(MaxCountConstraintComponent::load(loader)?)
            }
            ComponentKind::MinExclusive
            | ComponentKind::MinInclusive
            | ComponentKind::MaxExclusive
            | ComponentKind::MaxInclusive => {
                Component::Range(RangeConstraintComponent::load(kind, loader)?)
            }
            ComponentKind::MinLength | ComponentKind::MaxLength => {
                Component::Length(LengthConstraintComponent::load(kind, loader)?)
            }
            ComponentKind::Pattern => Component::Pattern(PatternConstraintComponent::load(loader)?),
            ComponentKind::LanguageIn => {
                Component::LanguageIn(LanguageInConstraintComponent::load(loader)?)
            }
            ComponentKind::UniqueLang => match UniqueLangConstraintComponent::load(loader)? {
                Some(c) => Component::UniqueLang(c),
                None => return Ok(None),
            },
            ComponentKind::Equals => Component::Equals(EqualsConstraintComponent::load(loader)?),
            ComponentKind::Disjoint => {
                Component::Disjoint(DisjointConstraintComponent::load(loader)?)
            }
            ComponentKind::LessThan | ComponentKind::LessThanOrEquals => {
                Component::LessThan(LessThanConstraintComponent::load(kind, loader)?)
            }
            ComponentKind::Not => Component::Not(NotConstraintComponent::load(loader)?),
            ComponentKind::And => Component::And(AndConstraintComponent::load(loader)?),
            ComponentKind::Or => Component::Or(OrConstraintComponent::load(loader)?),
            ComponentKind::Xone => Component::Xone(XoneConstraintComponent::load(loader)?),
            ComponentKind::Node => Component::Node(NodeConstraintComponent::load(loader)?),
            ComponentKind::Property => {
                Component::Property(PropertyConstraintComponent::load(loader)?)
            }
            ComponentKind::QualifiedValueShape => {
                match QualifiedValueShapeConstraintComponent::load(loader)? {
                    Some(c) => Component::QualifiedValueShape(c),
                    None => return Ok(None),
                }
            }
            ComponentKind::Closed => Component::Closed(ClosedConstraintComponent::load(loader)?),
            ComponentKind::HasValue => {
                Component::HasValue(HasValueConstraintComponent::load(loader)?)
            }
            ComponentKind::In => Component::In(InConstraintComponent::load(loader)?),
            ComponentKind::Sparql => Component::Sparql(SparqlConstraintComponent::load(loader)?),
            ComponentKind::Custom => {
                return Err(loader.error(kind, "custom components are not loaded by parameter"))
            }
        };
        Ok(Some(component))
    }

    pub fn kind(&self) -> ComponentKind {
        match self {
            Component::Class(_) => ComponentKind::Class,
            Component::Datatype(_) => ComponentKind::Datatype,
            Component::NodeKind(_) => ComponentKind::NodeKind,
            Component::MinCount(_) => ComponentKind::MinCount,
            Component::MaxCount(_) => ComponentKind::MaxCount,
            Component::Range(c) => c.kind(),
            Component::Length(c) => c.kind(),
            Component::Pattern(_) => ComponentKind::Pattern,
            Component::LanguageIn(_) => ComponentKind::LanguageIn,
            Component::UniqueLang(_) => ComponentKind::UniqueLang,
            Component::Equals(_) => ComponentKind::Equals,
            Component::Disjoint(_) => ComponentKind::Disjoint,
            Component::LessThan(c) => c.kind(),
            Component::Not(_) => ComponentKind::Not,
            Component::And(_) => ComponentKind::And,
            Component::Or(_) => ComponentKind::Or,
            Component::Xone(_) => ComponentKind::Xone,
            Component::Node(_) => ComponentKind::Node,
            Component::Property(_) => ComponentKind::Property,
            Component::QualifiedValueShape(_) => ComponentKind::QualifiedValueShape,
            Component::Closed(_) => ComponentKind::Closed,
            Component::HasValue(_) => ComponentKind::HasValue,
            Component::In(_) => ComponentKind::In,
            Component::Sparql(_) => ComponentKind::Sparql,
        }
    }

    pub(crate) fn evaluate(
        &self,
        cx: &mut ValidationContext<'_>,
        shape: &Shape,
        focus_value_nodes: &FocusValueNodes,
    ) -> Result<Outcome> {
        match self {
            Component::Class(c) => c.evaluate(cx, shape, focus_value_nodes),
            Component::Datatype(c) => c.evaluate(cx, shape, focus_value_nodes),
            Component::NodeKind(c) => c.evaluate(cx, shape, focus_value_nodes),
            Component::MinCount(c) => c.evaluate(cx, shape, focus_value_nodes),
            Component::MaxCount(c) => c.evaluate(cx, shape, focus_value_nodes),
            Component::Range(c) => c.evaluate(cx, shape, focus_value_nodes),
            Component::Length(c) => c.evaluate(cx, shape, focus_value_nodes),
            Component::Pattern(c) => c.evaluate(cx, shape, focus_value_nodes),
            Component::LanguageIn(c) => c.evaluate(cx, shape, focus_value_nodes),
            Component::UniqueLang(c) => c.evaluate(cx, shape, focus_value_nodes),
            Component::Equals(c) => c.evaluate(cx, shape, focus_value_nodes),
            Component::Disjoint(c) => c.evaluate(cx, shape, focus_value_nodes),
            Component::LessThan(c) => c.evaluate(cx, shape, focus_value_nodes),
            Component::Not(c) => c.evaluate(cx, shape, focus_value_nodes),
            Component::And(c) => c.evaluate(cx, shape, focus_value_nodes),
            Component::Or(c) => c.evaluate(cx, shape, focus_value_nodes),
            Component::Xone(c) => c.evaluate(cx, shape, focus_value_nodes),
            Component::Node(c) => c.evaluate(cx, shape, focus_value_nodes),
            Component::Property(c) => c.evaluate(cx, shape, focus_value_nodes),
            Component::QualifiedValueShape(c) => c.evaluate(cx, shape, focus_value_nodes),
            Component::Closed(c) => c.evaluate(cx, shape, focus_value_nodes),
            Component::HasValue(c) => c.evaluate(cx, shape, focus_value_nodes),
            Component::In(c) => c.evaluate(cx, shape, focus_value_nodes),
            Component::Sparql(c) => c.evaluate(cx, shape, focus_value_nodes),
        }
    }
}

/// Read access to one shape node's parameters while its components are loaded.
pub(crate) struct ComponentLoader<'a> {
    pub(crate) graph: &'a dyn GraphBackend,
    pub(crate) node: &'a Term,
    pub(crate) is_property_shape: bool,
}

impl<'a> ComponentLoader<'a> {
    pub(crate) fn new(graph: &'a dyn GraphBackend, node: &'a Term, is_property_shape: bool) -> Self {
        ComponentLoader {
            graph,
            node,
            is_property_shape,
        }
    }

    pub(crate) fn error(&self, kind: ComponentKind, message: impl Into<String>) -> EngineError {
        EngineError::constraint_load(kind.name(), self.node, message)
    }

    pub(crate) fn objects(&self, predicate: NamedNodeRef<'_>) -> Vec<Term> {
        crate::types::sorted_terms(self.graph.objects(self.node, predicate))
    }

    /// Values of a parameter that must be present at least once.
    pub(crate) fn required(&self, kind: ComponentKind, predicate: NamedNodeRef<'_>) -> Result<Vec<Term>> {
        let values = self.objects(predicate);
        if values.is_empty() {
            return Err(self.error(kind, format!("requires at least one {} value", predicate)));
        }
        Ok(values)
    }

    /// The single value of a parameter that must be present exactly once.
    pub(crate) fn exactly_one(&self, kind: ComponentKind, predicate: NamedNodeRef<'_>) -> Result<Term> {
        let mut values = self.objects(predicate);
        match values.len() {
            1 => Ok(values.remove(0)),
            0 => Err(self.error(kind, format!("requires exactly one {} value", predicate))),
            n => Err(self.error(
                kind,
                format!("requires exactly one {} value, found {}", predicate, n),
            )),
        }
    }

    /// The value of a parameter that may appear at most once.
    pub(crate) fn at_most_one(&self, kind: ComponentKind, predicate: NamedNodeRef<'_>) -> Result<Option<Term>> {
        let mut values = self.objects(predicate);
        match values.len() {
            0 => Ok(None),
            1 => Ok(Some(values.remove(0))),
            n => Err(self.error(
                kind,
                format!("allows at most one {} value, found {}", predicate, n),
            )),
        }
    }

    pub(crate) fn require_property_shape(&self, kind: ComponentKind) -> Result<()> {
        if self.is_property_shape {
            Ok(())
        } else {
            Err(self.error(kind, "is only allowed on property shapes"))
        }
    }

    /// Members of the RDF list at `head`.
    pub(crate) fn list(&self, kind: ComponentKind, head: &Term) -> Result<Vec<Term>> {
        self.graph
            .items(head)
            .ok_or_else(|| self.error(kind, format!("value {} is not a well-formed RDF list", head)))
    }
}

pub(crate) fn as_integer(term: &Term) -> Option<i64> {
    match term {
        Term::Literal(l) => crate::literal::integer_value(l),
        _ => None,
    }
}

pub(crate) fn as_non_negative(term: &Term) -> Option<u64> {
    as_integer(term).and_then(|i| u64::try_from(i).ok())
}

pub(crate) fn as_boolean(term: &Term) -> Option<bool> {
    match term {
        Term::Literal(l) => match crate::literal::LiteralValue::from_literal(l)? {
            crate::literal::LiteralValue::Boolean(b) => Some(b),
            _ => None,
        },
        _ => None,
    }
}

/// Builds a result for `shape` under component `kind`. The shape's own
/// `sh:message` values take precedence over the generic message.
pub(crate) fn make_result(
    shape: &Shape,
    kind: ComponentKind,
    focus: &Term,
    value: Option<&Term>,
    generic_message: impl FnOnce() -> String,
) -> ValidationResult {
    let messages = if shape.messages().is_empty() {
        vec![Literal::new_simple_literal(generic_message())]
    } else {
        shape.messages().to_vec()
    };
    let mut result = ValidationResult::new(shape, kind.iri(), kind.name(), focus.clone())
        .with_messages(messages);
    if let Some(v) = value {
        result = result.with_value(v.clone());
    }
    result
}

/// Renders a list of terms as `(a, b, c)` for messages.
pub(crate) fn term_list(terms: &[Term]) -> String {
    let parts: Vec<String> = terms.iter().map(|t| t.to_string()).collect();
    format!("({})", parts.join(", "))
}

/// `focus->path` for property shapes, the focus node alone for node shapes.
pub(crate) fn focus_path_label(shape: &Shape, focus: &Term) -> String {
    match shape.path() {
        Some(p) => format!("{}->{}", focus, p),
        None => focus.to_string(),
    }
}

/// True if `target` was flagged by the recursion heuristic for the frame on
/// top of the evaluation path. The caller skips it.
pub(crate) fn is_maybe_recursive(cx: &ValidationContext<'_>, target: &Shape, kind: ComponentKind) -> bool {
    let recursive = cx.eval_path.recursion_triggers().contains(&target.id());
    if recursive {
        log::warn!(
            "Skipping {} on shape {}: shape {} is potentially recursive ({})",
            kind.name(),
            cx.eval_path.frames().last().map(|(s, _)| s.to_string()).unwrap_or_default(),
            target.node(),
            cx.eval_path
        );
    }
    recursive
}

/// Validates one value node against `shape` and keeps only the verdict.
/// Nested results are logged and dropped.
pub(crate) fn conforms_to(cx: &mut ValidationContext<'_>, shape: &Shape, value: &Term) -> Result<bool> {
    let (conforms, results) = shape.validate(cx, Some(std::slice::from_ref(value)))?;
    if !results.is_empty() {
        log::debug!(
            "Discarding {} nested result(s) of {} for value {}",
            results.len(),
            shape.node(),
            value
        );
    }
    Ok(conforms)
}

/// The shape a nested validation resolves to, or the runtime failure for an
/// unresolvable reference.
pub(crate) fn resolve_shape<'s>(
    cx: &ValidationContext<'s>,
    node: &Term,
    kind: ComponentKind,
) -> Result<&'s Shape> {
    cx.shapes.lookup(node).ok_or_else(|| {
        EngineError::Runtime(format!(
            "Shape {} pointed to by {} does not exist or is not a well-formed SHACL Shape",
            node,
            kind.name()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parameter_registry_is_exhaustive_and_unique() {
        let mut seen = std::collections::HashSet::new();
        for kind in ComponentKind::BUILT_IN {
            let params = kind.parameters();
            assert!(!params.is_empty(), "{:?} has no parameters", kind);
            for p in params {
                assert!(seen.insert(p), "{} claimed twice", p);
                assert_eq!(ComponentKind::for_parameter(p), Some(kind));
            }
        }
        assert_eq!(ComponentKind::for_parameter(SHACL::new().path), None);
    }

    #[test]
    fn component_iris() {
        assert_eq!(
            ComponentKind::MinCount.iri().as_str(),
            "http://www.w3.org/ns/shacl#MinCountConstraintComponent"
        );
        assert_eq!(ComponentKind::Sparql.name(), "SPARQLConstraintComponent");
    }

    #[test]
    fn integer_parameters() {
        let int: Term = Literal::new_typed_literal("3", oxigraph::model::vocab::xsd::INTEGER).into();
        let neg: Term = Literal::new_typed_literal("-1", oxigraph::model::vocab::xsd::INTEGER).into();
        let s: Term = Literal::new_simple_literal("3").into();
        assert_eq!(as_non_negative(&int), Some(3));
        assert_eq!(as_non_negative(&neg), None);
        assert_eq!(as_integer(&s), None);
    }
}
