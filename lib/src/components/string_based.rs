use crate::context::ValidationContext;
use crate::error::Result;
use crate::literal::string_form;
use crate::named_nodes::SHACL;
use crate::shape::Shape;
use oxigraph::model::Term;
use regex::{Regex, RegexBuilder};
use std::collections::BTreeMap;

use super::{
    as_boolean, as_non_negative, make_result, term_list, ComponentKind, ComponentLoader,
    FocusValueNodes, Outcome, ValidateComponent,
};

/// `sh:minLength` and `sh:maxLength`, counted in characters of the string form.
#[derive(Debug)]
pub struct LengthConstraintComponent {
    kind: ComponentKind,
    length: u64,
}

impl LengthConstraintComponent {
    pub fn new(kind: ComponentKind, length: u64) -> Self {
        LengthConstraintComponent { kind, length }
    }

    pub(crate) fn load(kind: ComponentKind, loader: &ComponentLoader<'_>) -> Result<Self> {
        let predicate = kind.parameters()[0];
        let value = loader.exactly_one(kind, predicate)?;
        let length = as_non_negative(&value).ok_or_else(|| {
            loader.error(kind, format!("{} must be a non-negative xsd:integer", predicate))
        })?;
        Ok(Self::new(kind, length))
    }

    pub fn kind(&self) -> ComponentKind {
        self.kind
    }

    fn holds(&self, value: &Term) -> bool {
        let Some(text) = string_form(value) else {
            return false;
        };
        let len = text.chars().count() as u64;
        if self.kind == ComponentKind::MinLength {
            len >= self.length
        } else {
            len <= self.length
        }
    }
}

impl ValidateComponent for LengthConstraintComponent {
    fn evaluate(
        &self,
        _cx: &mut ValidationContext<'_>,
        shape: &Shape,
        focus_value_nodes: &FocusValueNodes,
    ) -> Result<Outcome> {
        // even a blank node has length >= 0
        if self.kind == ComponentKind::MinLength && self.length == 0 {
            return Ok((true, vec![]));
        }
        let op = if self.kind == ComponentKind::MinLength { ">=" } else { "<=" };
        let mut results = Vec::new();
        for (focus, values) in focus_value_nodes {
            for value in values.iter().filter(|v| !self.holds(v)) {
                results.push(make_result(shape, self.kind, focus, Some(value), || {
                    format!("String length not {} {}", op, self.length)
                }));
            }
        }
        Ok((results.is_empty(), results))
    }
}

#[derive(Debug)]
pub struct PatternConstraintComponent {
    patterns: Vec<(String, Regex)>,
}

impl PatternConstraintComponent {
    pub(crate) fn load(loader: &ComponentLoader<'_>) -> Result<Self> {
        let kind = ComponentKind::Pattern;
        let sh = SHACL::new();
        let flags = match loader.at_most_one(kind, sh.flags)? {
            Some(Term::Literal(l)) => l.value().to_string(),
            Some(other) => {
                return Err(loader.error(kind, format!("sh:flags value {} must be a literal", other)))
            }
            None => String::new(),
        };
        let mut patterns = Vec::new();
        for value in loader.required(kind, sh.pattern)? {
            let Term::Literal(lit) = &value else {
                return Err(loader.error(kind, format!("sh:pattern value {} must be a literal", value)));
            };
            let re = RegexBuilder::new(lit.value())
                .case_insensitive(flags.contains('i'))
                .multi_line(flags.contains('m'))
                .dot_matches_new_line(flags.contains('s'))
                .ignore_whitespace(flags.contains('x'))
                .build()
                .map_err(|e| loader.error(kind, format!("invalid sh:pattern '{}': {}", lit.value(), e)))?;
            patterns.push((lit.value().to_string(), re));
        }
        Ok(PatternConstraintComponent { patterns })
    }
}

impl ValidateComponent for PatternConstraintComponent {
    fn evaluate(
        &self,
        _cx: &mut ValidationContext<'_>,
        shape: &Shape,
        focus_value_nodes: &FocusValueNodes,
    ) -> Result<Outcome> {
        let mut results = Vec::new();
        for (focus, values) in focus_value_nodes {
            for value in values {
                for (source, re) in &self.patterns {
                    let matched = string_form(value).is_some_and(|text| re.is_match(text));
                    if !matched {
                        results.push(make_result(
                            shape,
                            ComponentKind::Pattern,
                            focus,
                            Some(value),
                            || format!("Value does not match pattern '{}'", source),
                        ));
                    }
                }
            }
        }
        Ok((results.is_empty(), results))
    }
}

#[derive(Debug)]
pub struct LanguageInConstraintComponent {
    ranges: Vec<Term>,
}

impl LanguageInConstraintComponent {
    pub(crate) fn load(loader: &ComponentLoader<'_>) -> Result<Self> {
        let kind = ComponentKind::LanguageIn;
        let head = loader.exactly_one(kind, SHACL::new().language_in)?;
        let ranges = loader.list(kind, &head)?;
        if let Some(bad) = ranges.iter().find(|r| !matches!(r, Term::Literal(_))) {
            return Err(loader.error(kind, format!("language range {} must be a literal", bad)));
        }
        Ok(LanguageInConstraintComponent { ranges })
    }

    fn holds(&self, value: &Term) -> bool {
        let Term::Literal(lit) = value else {
            return false;
        };
        let Some(lang) = lit.language() else {
            return false;
        };
        let lang = lang.to_ascii_lowercase();
        self.ranges.iter().any(|range| {
            let range = string_form(range).unwrap_or_default().to_ascii_lowercase();
            range == "*"
                || lang == range
                || (lang.starts_with(&range) && lang[range.len()..].starts_with('-'))
        })
    }
}

impl ValidateComponent for LanguageInConstraintComponent {
    fn evaluate(
        &self,
        _cx: &mut ValidationContext<'_>,
        shape: &Shape,
        focus_value_nodes: &FocusValueNodes,
    ) -> Result<Outcome> {
        let mut results = Vec::new();
        for (focus, values) in focus_value_nodes {
            for value in values.iter().filter(|v| !self.holds(v)) {
                results.push(make_result(
                    shape,
                    ComponentKind::LanguageIn,
                    focus,
                    Some(value),
                    || format!("String language is not in {}", term_list(&self.ranges)),
                ));
            }
        }
        Ok((results.is_empty(), results))
    }
}

#[derive(Debug)]
pub struct UniqueLangConstraintComponent;

impl UniqueLangConstraintComponent {
    /// `sh:uniqueLang false` loads as no component at all.
    pub(crate) fn load(loader: &ComponentLoader<'_>) -> Result<Option<Self>> {
        let kind = ComponentKind::UniqueLang;
        loader.require_property_shape(kind)?;
        let value = loader.exactly_one(kind, SHACL::new().unique_lang)?;
        match as_boolean(&value) {
            Some(true) => Ok(Some(UniqueLangConstraintComponent)),
            Some(false) => Ok(None),
            None => Err(loader.error(kind, "sh:uniqueLang must be an xsd:boolean")),
        }
    }
}

impl ValidateComponent for UniqueLangConstraintComponent {
    fn evaluate(
        &self,
        _cx: &mut ValidationContext<'_>,
        shape: &Shape,
        focus_value_nodes: &FocusValueNodes,
    ) -> Result<Outcome> {
        let mut results = Vec::new();
        for (focus, values) in focus_value_nodes {
            let mut seen: BTreeMap<String, usize> = BTreeMap::new();
            for value in values {
                if let Term::Literal(lit) = value {
                    if let Some(lang) = lit.language() {
                        *seen.entry(lang.to_ascii_lowercase()).or_default() += 1;
                    }
                }
            }
            for _ in seen.values().filter(|count| **count > 1) {
                results.push(make_result(shape, ComponentKind::UniqueLang, focus, None, || {
                    "More than one String shares the same Language".to_string()
                }));
            }
        }
        Ok((results.is_empty(), results))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxigraph::model::{BlankNode, Literal, NamedNode};

    fn tagged(text: &str, lang: &str) -> Term {
        Literal::new_language_tagged_literal_unchecked(text, lang).into()
    }

    #[test]
    fn length_uses_string_form() {
        let max = LengthConstraintComponent::new(ComponentKind::MaxLength, 12);
        assert!(max.holds(&NamedNode::new_unchecked("http://ex/a").into()));
        assert!(!max.holds(&NamedNode::new_unchecked("http://example.org/long").into()));
        assert!(!max.holds(&BlankNode::default().into()));
        let min = LengthConstraintComponent::new(ComponentKind::MinLength, 2);
        assert!(min.holds(&Literal::new_simple_literal("äö").into()));
    }

    #[test]
    fn language_ranges() {
        let c = LanguageInConstraintComponent {
            ranges: vec![
                Literal::new_simple_literal("en").into(),
                Literal::new_simple_literal("fr").into(),
            ],
        };
        assert!(c.holds(&tagged("colour", "en")));
        assert!(c.holds(&tagged("colour", "en-GB")));
        assert!(!c.holds(&tagged("Farbe", "de")));
        assert!(!c.holds(&tagged("x", "english")));
        assert!(!c.holds(&Literal::new_simple_literal("untagged").into()));

        let any = LanguageInConstraintComponent {
            ranges: vec![Literal::new_simple_literal("*").into()],
        };
        assert!(any.holds(&tagged("Farbe", "de")));
    }
}
