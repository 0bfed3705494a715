use crate::context::ValidationContext;
use crate::error::Result;
use crate::named_nodes::SHACL;
use crate::shape::Shape;

use super::{
    as_non_negative, focus_path_label, make_result, ComponentKind, ComponentLoader,
    FocusValueNodes, Outcome, ValidateComponent,
};

#[derive(Debug)]
pub struct MinCountConstraintComponent {
    min_count: u64,
}

impl MinCountConstraintComponent {
    pub fn new(min_count: u64) -> Self {
        MinCountConstraintComponent { min_count }
    }

    pub(crate) fn load(loader: &ComponentLoader<'_>) -> Result<Self> {
        let kind = ComponentKind::MinCount;
        loader.require_property_shape(kind)?;
        let value = loader.exactly_one(kind, SHACL::new().min_count)?;
        let min_count = as_non_negative(&value)
            .ok_or_else(|| loader.error(kind, "sh:minCount must be a non-negative xsd:integer"))?;
        Ok(Self::new(min_count))
    }
}

impl ValidateComponent for MinCountConstraintComponent {
    fn evaluate(
        &self,
        _cx: &mut ValidationContext<'_>,
        shape: &Shape,
        focus_value_nodes: &FocusValueNodes,
    ) -> Result<Outcome> {
        // a minimum of zero holds for any number of values
        if self.min_count == 0 {
            return Ok((true, vec![]));
        }
        let mut results = Vec::new();
        for (focus, values) in focus_value_nodes {
            if (values.len() as u64) < self.min_count {
                results.push(make_result(shape, ComponentKind::MinCount, focus, None, || {
                    format!(
                        "Less than {} values on {}",
                        self.min_count,
                        focus_path_label(shape, focus)
                    )
                }));
            }
        }
        Ok((results.is_empty(), results))
    }
}

#[derive(Debug)]
pub struct MaxCountConstraintComponent {
    max_count: u64,
}

impl MaxCountConstraintComponent {
    pub fn new(max_count: u64) -> Self {
        MaxCountConstraintComponent { max_count }
    }

    pub(crate) fn load(loader: &ComponentLoader<'_>) -> Result<Self> {
        let kind = ComponentKind::MaxCount;
        loader.require_property_shape(kind)?;
        let value = loader.exactly_one(kind, SHACL::new().max_count)?;
        let max_count = as_non_negative(&value)
            .ok_or_else(|| loader.error(kind, "sh:maxCount must be a non-negative xsd:integer"))?;
        Ok(Self::new(max_count))
    }
}

impl ValidateComponent for MaxCountConstraintComponent {
    fn evaluate(
        &self,
        _cx: &mut ValidationContext<'_>,
        shape: &Shape,
        focus_value_nodes: &FocusValueNodes,
    ) -> Result<Outcome> {
        let mut results = Vec::new();
        for (focus, values) in focus_value_nodes {
            if (values.len() as u64) > self.max_count {
                results.push(make_result(shape, ComponentKind::MaxCount, focus, None, || {
                    format!(
                        "More than {} values on {}",
                        self.max_count,
                        focus_path_label(shape, focus)
                    )
                }));
            }
        }
        Ok((results.is_empty(), results))
    }
}
