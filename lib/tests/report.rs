use oxigraph::model::{Graph, NamedNode, NamedNodeRef, Term, TermRef, TripleRef};
use shacl::test_utils::parse_turtle;
use shacl::{
    load_shapes, validate, validate_graphs, Inferencer, Severity, ValidationOptions, Validator,
};
use std::error::Error;

const PREFIXES: &str = "@prefix sh: <http://www.w3.org/ns/shacl#> .
@prefix rdf: <http://www.w3.org/1999/02/22-rdf-syntax-ns#> .
@prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .
@prefix xsd: <http://www.w3.org/2001/XMLSchema#> .
@prefix ex: <http://example.org/> .
";

fn ex(local: &str) -> Term {
    NamedNode::new_unchecked(format!("http://example.org/{}", local)).into()
}

fn graph(turtle: &str) -> Result<Graph, Box<dyn Error>> {
    Ok(parse_turtle(&format!("{PREFIXES}{turtle}"))?)
}

#[test]
fn text_report_for_a_single_violation() -> Result<(), Box<dyn Error>> {
    let shapes = graph("ex:S a sh:NodeShape ; sh:targetNode ex:a ; sh:nodeKind sh:Literal .")?;
    let data = graph("ex:a ex:p ex:b .")?;
    let report = validate_graphs(&shapes, &data, &ValidationOptions::default())?;
    assert_eq!(
        report.text(),
        "Validation Report\n\
         Conforms: False\n\
         Results (1):\n\
         Constraint Violation in NodeKindConstraintComponent (http://www.w3.org/ns/shacl#NodeKindConstraintComponent):\n\
         \tSeverity: sh:Violation\n\
         \tSource Shape: <http://example.org/S>\n\
         \tFocus Node: <http://example.org/a>\n\
         \tValue Node: <http://example.org/a>\n\
         \tMessage: Value is not of Node Kind sh:Literal\n"
    );
    Ok(())
}

#[test]
fn rdf_and_json_renderings() -> Result<(), Box<dyn Error>> {
    let shapes = graph(
        "ex:S a sh:NodeShape ; sh:targetNode ex:a ;
            sh:property [ sh:path ex:age ; sh:datatype xsd:integer ; sh:message \"age must be an integer\" ] .",
    )?;
    let data = graph("ex:a ex:age \"old\" .")?;
    let report = validate_graphs(&shapes, &data, &ValidationOptions::default())?;

    let rdf = report.to_graph();
    let sh = |local: &str| NamedNode::new_unchecked(format!("http://www.w3.org/ns/shacl#{}", local));
    let conforms_false = rdf
        .iter()
        .any(|t| t.predicate == sh("conforms").as_ref() && t.object.to_string().starts_with("\"false\""));
    assert!(conforms_false);
    let results = rdf.iter().filter(|t| t.predicate == sh("result").as_ref()).count();
    assert_eq!(results, 1);
    let component = sh("DatatypeConstraintComponent");
    assert!(rdf
        .iter()
        .any(|t| t.predicate == sh("sourceConstraintComponent").as_ref()
            && t.object == TermRef::from(component.as_ref())));

    let turtle = report.to_turtle()?;
    assert!(turtle.contains("sh:ValidationReport"));
    assert!(turtle.contains("age must be an integer"));
    assert_eq!(parse_turtle(&turtle)?.len(), rdf.len());

    let json: serde_json::Value = serde_json::from_str(&report.to_json()?)?;
    assert_eq!(json["conforms"], serde_json::Value::Bool(false));
    let result = &json["results"][0];
    assert_eq!(result["focus_node"], "<http://example.org/a>");
    assert_eq!(result["result_path"], "<http://example.org/age>");
    assert_eq!(result["messages"][0], "age must be an integer");
    assert_eq!(result["severity"], "http://www.w3.org/ns/shacl#Violation");
    Ok(())
}

const SEVERITIES: &str = "
ex:InfoShape a sh:NodeShape ; sh:targetNode ex:a ; sh:severity sh:Info ; sh:class ex:Thing .
ex:WarningShape a sh:NodeShape ; sh:targetNode ex:a ; sh:severity sh:Warning ; sh:nodeKind sh:Literal .
";

#[test]
fn allowed_severities_keep_the_report_conforming() -> Result<(), Box<dyn Error>> {
    let shapes = graph(SEVERITIES)?;
    let data = graph("ex:a ex:p 1 .")?;

    let strict = validate_graphs(&shapes, &data, &ValidationOptions::default())?;
    assert!(!strict.conforms());
    assert_eq!(strict.results().len(), 2);

    let infos = ValidationOptions {
        allow_infos: true,
        ..Default::default()
    };
    let report = validate_graphs(&shapes, &data, &infos)?;
    assert!(!report.conforms());

    let warnings = ValidationOptions {
        allow_warnings: true,
        ..Default::default()
    };
    let report = validate_graphs(&shapes, &data, &warnings)?;
    assert!(report.conforms());
    // results are still reported
    let severities: Vec<&Severity> = report.results().iter().map(|r| r.severity()).collect();
    assert_eq!(severities, vec![&Severity::Info, &Severity::Warning]);
    assert!(report.text().contains("Validation Result in ClassConstraintComponent"));
    Ok(())
}

#[test]
fn allowed_severities_do_not_relax_referenced_shapes() -> Result<(), Box<dyn Error>> {
    let shapes = graph(
        "ex:S a sh:NodeShape ; sh:targetNode ex:a ; sh:not ex:W .
         ex:W a sh:NodeShape ; sh:severity sh:Warning ; sh:nodeKind sh:Literal .",
    )?;
    let data = graph("ex:a ex:p 1 .")?;
    let options = ValidationOptions {
        allow_warnings: true,
        ..Default::default()
    };
    let report = validate_graphs(&shapes, &data, &options)?;
    assert!(report.conforms());
    assert!(report.results().is_empty());

    let node_shapes = graph(
        "ex:S a sh:NodeShape ; sh:targetNode ex:a ; sh:node ex:W .
         ex:W a sh:NodeShape ; sh:severity sh:Warning ; sh:nodeKind sh:Literal .",
    )?;
    let report = validate_graphs(&node_shapes, &data, &options)?;
    assert!(!report.conforms());
    assert_eq!(report.results().len(), 1);
    assert_eq!(report.results()[0].constraint_name(), "NodeConstraintComponent");
    Ok(())
}

#[test]
fn abort_on_first_stops_after_the_first_failing_shape() -> Result<(), Box<dyn Error>> {
    let shapes = graph(
        "ex:A a sh:NodeShape ; sh:targetNode ex:a ; sh:nodeKind sh:Literal ; sh:class ex:Thing .
         ex:B a sh:NodeShape ; sh:targetNode ex:a ; sh:hasValue ex:other .",
    )?;
    let data = graph("ex:a ex:p 1 .")?;
    let all = validate_graphs(&shapes, &data, &ValidationOptions::default())?;
    assert_eq!(all.results().len(), 3);

    let options = ValidationOptions {
        abort_on_first: true,
        ..Default::default()
    };
    let report = validate_graphs(&shapes, &data, &options)?;
    assert!(!report.conforms());
    assert_eq!(report.results().len(), 1);
    assert_eq!(report.results()[0].source_shape(), &ex("A"));
    Ok(())
}

const FOCUS_SHAPES: &str = "
ex:PersonShape a sh:NodeShape ; sh:targetClass ex:Person ;
    sh:property [ sh:path ex:name ; sh:minCount 1 ] .
ex:OtherShape a sh:NodeShape ; sh:targetNode ex:c ; sh:nodeKind sh:Literal .
";
const FOCUS_DATA: &str = "ex:a a ex:Person . ex:b a ex:Person . ex:c ex:p 1 .";

#[test]
fn focus_nodes_filter_each_shapes_targets() -> Result<(), Box<dyn Error>> {
    let shapes = graph(FOCUS_SHAPES)?;
    let data = graph(FOCUS_DATA)?;
    let options = ValidationOptions {
        focus_nodes: Some(vec!["http://example.org/b".to_string()]),
        ..Default::default()
    };
    let report = validate_graphs(&shapes, &data, &options)?;
    assert_eq!(report.results().len(), 1);
    assert_eq!(report.results()[0].focus_node(), &ex("b"));
    Ok(())
}

#[test]
fn use_shapes_with_focus_nodes_validates_exactly_those_nodes() -> Result<(), Box<dyn Error>> {
    let shapes = graph(FOCUS_SHAPES)?;
    let data = graph(FOCUS_DATA)?;
    let options = ValidationOptions {
        use_shapes: Some(vec!["http://example.org/OtherShape".to_string()]),
        focus_nodes: Some(vec!["http://example.org/a".to_string()]),
        ..Default::default()
    };
    let report = validate_graphs(&shapes, &data, &options)?;
    assert_eq!(report.results().len(), 1);
    assert_eq!(report.results()[0].source_shape(), &ex("OtherShape"));
    assert_eq!(report.results()[0].focus_node(), &ex("a"));

    let only_shape = ValidationOptions {
        use_shapes: Some(vec!["http://example.org/OtherShape".to_string()]),
        ..Default::default()
    };
    let report = validate_graphs(&shapes, &data, &only_shape)?;
    assert_eq!(report.results().len(), 1);
    assert_eq!(report.results()[0].focus_node(), &ex("c"));
    Ok(())
}

#[test]
fn ontology_triples_are_mixed_into_the_data() -> Result<(), Box<dyn Error>> {
    let shapes = load_shapes(&graph(
        "ex:S a sh:NodeShape ; sh:targetNode ex:a ; sh:class ex:Animal .",
    )?)?;
    let data = graph("ex:a a ex:Dog .")?;
    let ontology = graph("ex:Dog rdfs:subClassOf ex:Animal .")?;

    let plain = Validator::new(ValidationOptions::default()).validate(&shapes, &data)?;
    assert!(!plain.conforms());

    let report = Validator::new(ValidationOptions::default())
        .with_ontology(&ontology)
        .validate(&shapes, &data)?;
    assert!(report.conforms());
    // the caller's graph is left untouched
    assert_eq!(data.len(), 1);
    Ok(())
}

/// Adds `?x rdf:type ex:Animal` for every `?x rdf:type ex:Dog`.
struct DogsAreAnimals;

impl Inferencer for DogsAreAnimals {
    fn expand(&self, graph: &mut Graph) -> shacl::Result<()> {
        let rdf_type = NamedNodeRef::new_unchecked("http://www.w3.org/1999/02/22-rdf-syntax-ns#type");
        let dog = NamedNodeRef::new_unchecked("http://example.org/Dog");
        let animal = NamedNodeRef::new_unchecked("http://example.org/Animal");
        let dogs: Vec<_> = graph
            .subjects_for_predicate_object(rdf_type, dog)
            .map(|s| s.into_owned())
            .collect();
        for subject in &dogs {
            graph.insert(TripleRef::new(subject.as_ref(), rdf_type, animal));
        }
        Ok(())
    }
}

#[test]
fn inferencer_expands_the_working_graph() -> Result<(), Box<dyn Error>> {
    let shapes = load_shapes(&graph(
        "ex:S a sh:NodeShape ; sh:targetClass ex:Animal ; sh:nodeKind sh:BlankNode .",
    )?)?;
    let data = graph("ex:rex a ex:Dog .")?;

    assert!(validate(&shapes, &data, &ValidationOptions::default())?.conforms());

    let report = Validator::new(ValidationOptions::default())
        .with_inferencer(&DogsAreAnimals)
        .validate(&shapes, &data)?;
    assert!(!report.conforms());
    assert_eq!(report.results()[0].focus_node(), &ex("rex"));
    Ok(())
}

#[test]
fn repeated_runs_produce_identical_reports() -> Result<(), Box<dyn Error>> {
    let shapes = load_shapes(&graph(
        "ex:S a sh:NodeShape ; sh:targetSubjectsOf ex:p ;
            sh:property [ sh:path ex:p ; sh:datatype xsd:string ; sh:maxCount 1 ] ;
            sh:property [ sh:path [ sh:inversePath ex:q ] ; sh:minCount 1 ] .",
    )?)?;
    let data = graph(
        "ex:c ex:p 3, 4 . ex:a ex:p \"x\" . ex:b ex:p 1 . ex:z ex:q ex:a .",
    )?;
    let first = validate(&shapes, &data, &ValidationOptions::default())?;
    let second = validate(&shapes, &data, &ValidationOptions::default())?;
    assert_eq!(first, second);
    assert_eq!(first.text(), second.text());

    assert_eq!(first.results().len(), 6);
    let mut focus: Vec<&Term> = first.results().iter().map(|r| r.focus_node()).collect();
    focus.sort_by_key(|t| t.to_string());
    focus.dedup();
    assert_eq!(focus, vec![&ex("b"), &ex("c")]);
    Ok(())
}
