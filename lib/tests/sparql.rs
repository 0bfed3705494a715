use oxigraph::model::{Literal, NamedNode, Term};
use shacl::test_utils::parse_turtle;
use shacl::{
    load_shapes, validate, EngineError, ValidationOptions, ValidationReport, Validator,
};
use std::error::Error;

const PREFIXES: &str = "@prefix sh: <http://www.w3.org/ns/shacl#> .
@prefix xsd: <http://www.w3.org/2001/XMLSchema#> .
@prefix ex: <http://example.org/> .
";

fn ex(local: &str) -> Term {
    NamedNode::new_unchecked(format!("http://example.org/{}", local)).into()
}

fn lit(value: &str) -> Term {
    Literal::new_simple_literal(value).into()
}

fn run(shapes: &str, data: &str) -> Result<shacl::Result<ValidationReport>, Box<dyn Error>> {
    let shapes = load_shapes(&parse_turtle(&format!("{PREFIXES}{shapes}"))?)?;
    let data = parse_turtle(&format!("{PREFIXES}{data}"))?;
    Ok(validate(&shapes, &data, &ValidationOptions::default()))
}

const PEOPLE: &str = "ex:alice a ex:Person ; ex:name \"Alice\" ; ex:code \"AB12\" .
ex:bob a ex:Person ; ex:name \"Bob\" ; ex:code \"XY\" .";

#[test]
fn select_constraint_reports_solution_rows() -> Result<(), Box<dyn Error>> {
    let shapes = r#"
ex:PersonShape a sh:NodeShape ; sh:targetClass ex:Person ;
    sh:sparql [
        sh:message "Person {$this} has the forbidden name {?value}" ;
        sh:prefixes ex:Declarations ;
        sh:select """SELECT $this ?value WHERE { $this ex:name ?value . FILTER(?value = "Bob") }"""
    ] .
ex:Declarations sh:declare [ sh:prefix "ex" ; sh:namespace "http://example.org/"^^xsd:anyURI ] .
"#;
    let report = run(shapes, PEOPLE)??;
    assert!(!report.conforms());
    assert_eq!(report.results().len(), 1);
    let result = &report.results()[0];
    assert_eq!(result.focus_node(), &ex("bob"));
    assert_eq!(result.value(), Some(&lit("Bob")));
    assert!(result.source_constraint().is_some());
    assert_eq!(
        result.source_constraint_component().as_str(),
        "http://www.w3.org/ns/shacl#SPARQLConstraintComponent"
    );
    assert_eq!(
        result.messages()[0].value(),
        "Person http://example.org/bob has the forbidden name Bob"
    );
    Ok(())
}

#[test]
fn path_is_substituted_for_property_shapes() -> Result<(), Box<dyn Error>> {
    let shapes = r#"
ex:CodeShape a sh:PropertyShape ; sh:targetClass ex:Person ; sh:path ex:code ;
    sh:sparql [
        sh:select """SELECT $this ?value WHERE { $this $PATH ?value . FILTER(STRLEN(STR(?value)) > 3) }"""
    ] .
"#;
    let report = run(shapes, PEOPLE)??;
    assert_eq!(report.results().len(), 1);
    let result = &report.results()[0];
    assert_eq!(result.focus_node(), &ex("alice"));
    assert_eq!(result.value(), Some(&lit("AB12")));
    assert_eq!(result.result_path().map(|p| p.to_string()), Some("<http://example.org/code>".to_string()));
    Ok(())
}

#[test]
fn deactivated_sparql_constraint_is_skipped() -> Result<(), Box<dyn Error>> {
    let shapes = r#"
ex:PersonShape a sh:NodeShape ; sh:targetClass ex:Person ;
    sh:sparql [ sh:deactivated true ; sh:select "SELECT $this WHERE { $this ?p ?o }" ] .
"#;
    assert!(run(shapes, PEOPLE)??.conforms());
    Ok(())
}

#[test]
fn forbidden_clauses_and_failures_are_fatal() -> Result<(), Box<dyn Error>> {
    let minus = r#"
ex:S a sh:NodeShape ; sh:targetClass ex:Person ;
    sh:sparql [ sh:select "SELECT $this WHERE { $this ?p ?o MINUS { $this a ?t } }" ] .
"#;
    assert!(matches!(run(minus, PEOPLE)?, Err(EngineError::Runtime(_))));

    let failure = r#"
ex:S a sh:NodeShape ; sh:targetClass ex:Person ;
    sh:sparql [ sh:select "SELECT $this ?failure WHERE { BIND(true AS ?failure) }" ] .
"#;
    assert!(matches!(run(failure, PEOPLE)?, Err(EngineError::Runtime(_))));

    let shapes_graph = r#"
ex:S a sh:NodeShape ; sh:targetClass ex:Person ;
    sh:sparql [ sh:select "SELECT $this WHERE { GRAPH $shapesGraph { $this ?p ?o } }" ] .
"#;
    assert!(matches!(run(shapes_graph, PEOPLE)?, Err(EngineError::Runtime(_))));
    Ok(())
}

#[test]
fn missing_query_engine_is_reported() -> Result<(), Box<dyn Error>> {
    let shapes = load_shapes(&parse_turtle(&format!(
        "{PREFIXES}ex:S a sh:NodeShape ; sh:targetClass ex:Person ;
            sh:sparql [ sh:select \"SELECT $this WHERE {{ $this ?p ?o }}\" ] ."
    ))?)?;
    let data = parse_turtle(&format!("{PREFIXES}{PEOPLE}"))?;
    let err = Validator::new(ValidationOptions::default())
        .validate(&shapes, &data)
        .err()
        .ok_or("expected a query engine error")?;
    assert!(matches!(err, EngineError::QueryEngine(_)));
    Ok(())
}

#[test]
fn select_without_string_literal_fails_to_load() -> Result<(), Box<dyn Error>> {
    let graph = parse_turtle(&format!(
        "{PREFIXES}ex:S a sh:NodeShape ; sh:sparql [ sh:select ex:notText ] ."
    ))?;
    let err = load_shapes(&graph).err().ok_or("expected a load error")?;
    assert!(err.is_load_error());
    assert!(matches!(err, EngineError::ConstraintLoad { .. }));
    Ok(())
}

const PREFIX_COMPONENT: &str = r#"
ex:HasPrefixComponent a sh:ConstraintComponent ;
    sh:parameter [ sh:path ex:requiredPrefix ] ;
    sh:validator ex:HasPrefixValidator .
ex:HasPrefixValidator a sh:SPARQLAskValidator ;
    sh:message "Value {$value} does not start with {$requiredPrefix}" ;
    sh:ask """ASK { FILTER(STRSTARTS(STR($value), $requiredPrefix)) }""" .
"#;

#[test]
fn custom_ask_component_runs_per_value_node() -> Result<(), Box<dyn Error>> {
    let shapes = format!(
        "{PREFIX_COMPONENT}
ex:PersonShape a sh:NodeShape ; sh:targetClass ex:Person ;
    sh:property [ sh:path ex:code ; ex:requiredPrefix \"AB\" ] ."
    );
    let report = run(&shapes, PEOPLE)??;
    assert!(!report.conforms());
    assert_eq!(report.results().len(), 1);
    let result = &report.results()[0];
    assert_eq!(result.focus_node(), &ex("bob"));
    assert_eq!(result.value(), Some(&lit("XY")));
    assert_eq!(
        result.source_constraint_component().as_str(),
        "http://example.org/HasPrefixComponent"
    );
    assert_eq!(result.messages()[0].value(), "Value XY does not start with AB");
    Ok(())
}

#[test]
fn custom_component_needs_its_mandatory_parameters() -> Result<(), Box<dyn Error>> {
    let shapes = format!(
        "{PREFIX_COMPONENT}
ex:PersonShape a sh:NodeShape ; sh:targetClass ex:Person ;
    sh:property [ sh:path ex:code ; sh:minCount 1 ] ."
    );
    assert!(run(&shapes, PEOPLE)??.conforms());
    Ok(())
}

#[test]
fn custom_select_node_validator() -> Result<(), Box<dyn Error>> {
    let shapes = r#"
ex:ForbiddenPredicateComponent a sh:ConstraintComponent ;
    sh:parameter [ sh:path ex:forbidden ] ;
    sh:nodeValidator [
        a sh:SPARQLSelectValidator ;
        sh:message "Uses {$forbidden}" ;
        sh:select """SELECT $this ?value WHERE { $this $forbidden ?value }"""
    ] .
ex:PersonShape a sh:NodeShape ; sh:targetClass ex:Person ; ex:forbidden ex:code .
"#;
    let report = run(shapes, PEOPLE)??;
    let focus: Vec<&Term> = report.results().iter().map(|r| r.focus_node()).collect();
    assert_eq!(focus, vec![&ex("alice"), &ex("bob")]);
    assert_eq!(report.results()[0].messages()[0].value(), "Uses http://example.org/code");
    assert_eq!(report.results()[1].value(), Some(&lit("XY")));
    Ok(())
}

#[test]
fn malformed_component_declarations_fail_to_load() -> Result<(), Box<dyn Error>> {
    let no_parameters = "ex:C a sh:ConstraintComponent ;
        sh:validator [ a sh:SPARQLAskValidator ; sh:ask \"ASK {}\" ] .";
    let only_optional = "ex:C a sh:ConstraintComponent ;
        sh:parameter [ sh:path ex:p ; sh:optional true ] ;
        sh:validator [ a sh:SPARQLAskValidator ; sh:ask \"ASK {}\" ] .";
    let select_validator = "ex:C a sh:ConstraintComponent ;
        sh:parameter [ sh:path ex:p ] ;
        sh:validator [ sh:select \"SELECT $this WHERE {}\" ] .";
    let reserved = "ex:C a sh:ConstraintComponent ;
        sh:parameter [ sh:path ex:value ] ;
        sh:validator [ sh:ask \"ASK {}\" ] .";
    let both = "ex:C a sh:ConstraintComponent ;
        sh:parameter [ sh:path ex:p ] ;
        sh:nodeValidator [ sh:ask \"ASK {}\" ; sh:select \"SELECT $this WHERE {}\" ] .";
    for declaration in [no_parameters, only_optional, select_validator, reserved, both] {
        let graph = parse_turtle(&format!("{PREFIXES}{declaration}"))?;
        assert!(
            matches!(load_shapes(&graph), Err(EngineError::ConstraintLoad { .. })),
            "{}",
            declaration
        );
    }
    Ok(())
}
