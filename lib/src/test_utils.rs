//! Graph fixtures for tests.

use oxigraph::io::{RdfFormat, RdfParser};
use oxigraph::model::Graph;

/// Parses a Turtle document into a graph.
pub fn parse_turtle(turtle: &str) -> Result<Graph, String> {
    parse_rdf(turtle, RdfFormat::Turtle)
}

pub fn parse_rdf(content: &str, format: RdfFormat) -> Result<Graph, String> {
    let mut graph = Graph::new();
    for quad in RdfParser::from_format(format).for_reader(content.as_bytes()) {
        let quad = quad.map_err(|e| format!("Failed to parse {} input: {}", format, e))?;
        graph.insert(&oxigraph::model::Triple::from(quad));
    }
    Ok(graph)
}
