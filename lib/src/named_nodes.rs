use oxigraph::model::NamedNodeRef;

pub const SH_NS: &str = "http://www.w3.org/ns/shacl#";

/// Terms of the SHACL vocabulary used by the engine.
pub struct SHACL {
    pub class: NamedNodeRef<'static>,
    pub node: NamedNodeRef<'static>,
    pub property: NamedNodeRef<'static>,
    pub qualified_value_shape: NamedNodeRef<'static>,
    pub qualified_min_count: NamedNodeRef<'static>,
    pub qualified_max_count: NamedNodeRef<'static>,
    pub qualified_value_shapes_disjoint: NamedNodeRef<'static>,
    pub min_count: NamedNodeRef<'static>,
    pub max_count: NamedNodeRef<'static>,
    pub not: NamedNodeRef<'static>,
    pub node_kind: NamedNodeRef<'static>,
    pub datatype: NamedNodeRef<'static>,
    pub min_exclusive: NamedNodeRef<'static>,
    pub min_inclusive: NamedNodeRef<'static>,
    pub max_exclusive: NamedNodeRef<'static>,
    pub max_inclusive: NamedNodeRef<'static>,
    pub min_length: NamedNodeRef<'static>,
    pub max_length: NamedNodeRef<'static>,
    pub pattern: NamedNodeRef<'static>,
    pub flags: NamedNodeRef<'static>,
    pub language_in: NamedNodeRef<'static>,
    pub unique_lang: NamedNodeRef<'static>,
    pub node_shape: NamedNodeRef<'static>,
    pub property_shape: NamedNodeRef<'static>,
    pub and_: NamedNodeRef<'static>,
    pub or_: NamedNodeRef<'static>,
    pub xone: NamedNodeRef<'static>,

    // Paths
    pub path: NamedNodeRef<'static>,
    pub inverse_path: NamedNodeRef<'static>,
    pub alternative_path: NamedNodeRef<'static>,
    pub zero_or_more_path: NamedNodeRef<'static>,
    pub one_or_more_path: NamedNodeRef<'static>,
    pub zero_or_one_path: NamedNodeRef<'static>,

    // Targets
    pub target_class: NamedNodeRef<'static>,
    pub target_node: NamedNodeRef<'static>,
    pub target_objects_of: NamedNodeRef<'static>,
    pub target_subjects_of: NamedNodeRef<'static>,

    // Property pairs
    pub equals: NamedNodeRef<'static>,
    pub disjoint: NamedNodeRef<'static>,
    pub less_than: NamedNodeRef<'static>,
    pub less_than_or_equals: NamedNodeRef<'static>,
    pub closed: NamedNodeRef<'static>,
    pub ignored_properties: NamedNodeRef<'static>,
    pub has_value: NamedNodeRef<'static>,
    pub in_: NamedNodeRef<'static>,

    // NodeKind instances
    pub iri: NamedNodeRef<'static>,
    pub literal: NamedNodeRef<'static>,
    pub blank_node: NamedNodeRef<'static>,
    pub blank_node_or_iri: NamedNodeRef<'static>,
    pub blank_node_or_literal: NamedNodeRef<'static>,
    pub iri_or_literal: NamedNodeRef<'static>,

    // Severities
    pub severity: NamedNodeRef<'static>,
    pub info: NamedNodeRef<'static>,
    pub warning: NamedNodeRef<'static>,
    pub violation: NamedNodeRef<'static>,

    // Shape metadata
    pub deactivated: NamedNodeRef<'static>,
    pub message: NamedNodeRef<'static>,
    pub name: NamedNodeRef<'static>,
    pub description: NamedNodeRef<'static>,

    // SPARQL
    pub sparql: NamedNodeRef<'static>,
    pub select: NamedNodeRef<'static>,
    pub ask: NamedNodeRef<'static>,
    pub prefixes: NamedNodeRef<'static>,
    pub declare: NamedNodeRef<'static>,
    pub prefix: NamedNodeRef<'static>,
    pub namespace: NamedNodeRef<'static>,

    // Custom constraint components
    pub constraint_component: NamedNodeRef<'static>,
    pub parameter: NamedNodeRef<'static>,
    pub optional: NamedNodeRef<'static>,
    pub validator: NamedNodeRef<'static>,
    pub node_validator: NamedNodeRef<'static>,
    pub property_validator: NamedNodeRef<'static>,
    pub sparql_ask_validator: NamedNodeRef<'static>,
    pub sparql_select_validator: NamedNodeRef<'static>,

    // Validation Report
    pub validation_report: NamedNodeRef<'static>,
    pub conforms: NamedNodeRef<'static>,
    pub result: NamedNodeRef<'static>,
    pub validation_result: NamedNodeRef<'static>,
    pub focus_node: NamedNodeRef<'static>,
    pub value: NamedNodeRef<'static>,
    pub result_path: NamedNodeRef<'static>,
    pub source_shape: NamedNodeRef<'static>,
    pub source_constraint_component: NamedNodeRef<'static>,
    pub source_constraint: NamedNodeRef<'static>,
    pub result_message: NamedNodeRef<'static>,
    pub result_severity: NamedNodeRef<'static>,
    pub detail: NamedNodeRef<'static>,
}

impl SHACL {
    pub const fn new() -> Self {
        SHACL {
            class: NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#class"),
            node: NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#node"),
            property: NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#property"),
            qualified_value_shape: NamedNodeRef::new_unchecked(
                "http://www.w3.org/ns/shacl#qualifiedValueShape",
            ),
            qualified_min_count: NamedNodeRef::new_unchecked(
                "http://www.w3.org/ns/shacl#qualifiedMinCount",
            ),
            qualified_max_count: NamedNodeRef::new_unchecked(
                "http://www.w3.org/ns/shacl#qualifiedMaxCount",
            ),
            qualified_value_shapes_disjoint: NamedNodeRef::new_unchecked(
                "http://www.w3.org/ns/shacl#qualifiedValueShapesDisjoint",
            ),
            min_count: NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#minCount"),
            max_count: NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#maxCount"),
            not: NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#not"),
            node_kind: NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#nodeKind"),
            datatype: NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#datatype"),
            min_exclusive: NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#minExclusive"),
            min_inclusive: NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#minInclusive"),
            max_exclusive: NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#maxExclusive"),
            max_inclusive: NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#maxInclusive"),
            min_length: NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#minLength"),
            max_length: NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#maxLength"),
            pattern: NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#pattern"),
            flags: NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#flags"),
            language_in: NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#languageIn"),
            unique_lang: NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#uniqueLang"),
            node_shape: NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#NodeShape"),
            property_shape: NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#PropertyShape"),
            and_: NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#and"),
            or_: NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#or"),
            xone: NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#xone"),
            path: NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#path"),
            inverse_path: NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#inversePath"),
            alternative_path: NamedNodeRef::new_unchecked(
                "http://www.w3.org/ns/shacl#alternativePath",
            ),
            zero_or_more_path: NamedNodeRef::new_unchecked(
                "http://www.w3.org/ns/shacl#zeroOrMorePath",
            ),
            one_or_more_path: NamedNodeRef::new_unchecked(
                "http://www.w3.org/ns/shacl#oneOrMorePath",
            ),
            zero_or_one_path: NamedNodeRef::new_unchecked(
                "http://www.w3.org/ns/shacl#zeroOrOnePath",
            ),
            target_class: NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#targetClass"),
            target_node: NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#targetNode"),
            target_objects_of: NamedNodeRef::new_unchecked(
                "http://www.w3.org/ns/shacl#targetObjectsOf",
            ),
            target_subjects_of: NamedNodeRef::new_unchecked(
                "http://www.w3.org/ns/shacl#targetSubjectsOf",
            ),
            equals: NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#equals"),
            disjoint: NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#disjoint"),
            less_than: NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#lessThan"),
            less_than_or_equals: NamedNodeRef::new_unchecked(
                "http://www.w3.org/ns/shacl#lessThanOrEquals",
            ),
            closed: NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#closed"),
            ignored_properties: NamedNodeRef::new_unchecked(
                "http://www.w3.org/ns/shacl#ignoredProperties",
            ),
            has_value: NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#hasValue"),
            in_: NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#in"),
            iri: NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#IRI"),
            literal: NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#Literal"),
            blank_node: NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#BlankNode"),
            blank_node_or_iri: NamedNodeRef::new_unchecked(
                "http://www.w3.org/ns/shacl#BlankNodeOrIRI",
            ),
            blank_node_or_literal: NamedNodeRef::new_unchecked(
                "http://www.w3.org/ns/shacl#BlankNodeOrLiteral",
            ),
            iri_or_literal: NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#IRIOrLiteral"),
            severity: NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#severity"),
            info: NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#Info"),
            warning: NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#Warning"),
            violation: NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#Violation"),
            deactivated: NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#deactivated"),
            message: NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#message"),
            name: NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#name"),
            description: NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#description"),
            sparql: NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#sparql"),
            select: NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#select"),
            ask: NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#ask"),
            prefixes: NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#prefixes"),
            declare: NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#declare"),
            prefix: NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#prefix"),
            namespace: NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#namespace"),
            constraint_component: NamedNodeRef::new_unchecked(
                "http://www.w3.org/ns/shacl#ConstraintComponent",
            ),
            parameter: NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#parameter"),
            optional: NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#optional"),
            validator: NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#validator"),
            node_validator: NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#nodeValidator"),
            property_validator: NamedNodeRef::new_unchecked(
                "http://www.w3.org/ns/shacl#propertyValidator",
            ),
            sparql_ask_validator: NamedNodeRef::new_unchecked(
                "http://www.w3.org/ns/shacl#SPARQLAskValidator",
            ),
            sparql_select_validator: NamedNodeRef::new_unchecked(
                "http://www.w3.org/ns/shacl#SPARQLSelectValidator",
            ),
            validation_report: NamedNodeRef::new_unchecked(
                "http://www.w3.org/ns/shacl#ValidationReport",
            ),
            conforms: NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#conforms"),
            result: NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#result"),
            validation_result: NamedNodeRef::new_unchecked(
                "http://www.w3.org/ns/shacl#ValidationResult",
            ),
            focus_node: NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#focusNode"),
            value: NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#value"),
            result_path: NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#resultPath"),
            source_shape: NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#sourceShape"),
            source_constraint_component: NamedNodeRef::new_unchecked(
                "http://www.w3.org/ns/shacl#sourceConstraintComponent",
            ),
            source_constraint: NamedNodeRef::new_unchecked(
                "http://www.w3.org/ns/shacl#sourceConstraint",
            ),
            result_message: NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#resultMessage"),
            result_severity: NamedNodeRef::new_unchecked(
                "http://www.w3.org/ns/shacl#resultSeverity",
            ),
            detail: NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#detail"),
        }
    }
}

/// Terms of the RDF vocabulary.
pub struct RDF {
    pub type_: NamedNodeRef<'static>,
    pub first: NamedNodeRef<'static>,
    pub rest: NamedNodeRef<'static>,
    pub nil: NamedNodeRef<'static>,
    pub lang_string: NamedNodeRef<'static>,
}

impl RDF {
    pub const fn new() -> Self {
        RDF {
            type_: NamedNodeRef::new_unchecked("http://www.w3.org/1999/02/22-rdf-syntax-ns#type"),
            first: NamedNodeRef::new_unchecked("http://www.w3.org/1999/02/22-rdf-syntax-ns#first"),
            rest: NamedNodeRef::new_unchecked("http://www.w3.org/1999/02/22-rdf-syntax-ns#rest"),
            nil: NamedNodeRef::new_unchecked("http://www.w3.org/1999/02/22-rdf-syntax-ns#nil"),
            lang_string: NamedNodeRef::new_unchecked(
                "http://www.w3.org/1999/02/22-rdf-syntax-ns#langString",
            ),
        }
    }
}

/// Terms of the RDFS vocabulary.
pub struct RDFS {
    pub sub_class_of: NamedNodeRef<'static>,
    pub class: NamedNodeRef<'static>,
    pub resource: NamedNodeRef<'static>,
    pub literal: NamedNodeRef<'static>,
}

impl RDFS {
    pub const fn new() -> Self {
        RDFS {
            sub_class_of: NamedNodeRef::new_unchecked(
                "http://www.w3.org/2000/01/rdf-schema#subClassOf",
            ),
            class: NamedNodeRef::new_unchecked("http://www.w3.org/2000/01/rdf-schema#Class"),
            resource: NamedNodeRef::new_unchecked("http://www.w3.org/2000/01/rdf-schema#Resource"),
            literal: NamedNodeRef::new_unchecked("http://www.w3.org/2000/01/rdf-schema#Literal"),
        }
    }
}

/// Terms of the OWL vocabulary.
pub struct OWL {
    pub class: NamedNodeRef<'static>,
}

impl OWL {
    pub const fn new() -> Self {
        OWL {
            class: NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#Class"),
        }
    }
}
