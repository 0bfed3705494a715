use crate::components::ComponentKind;
use crate::types::ShapeId;
use std::fmt;

/// Frames counted back from the top before a repeat is considered a cycle.
const TRIGGER_DEPTH: usize = 3;

/// The active chain of (shape, component) frames for the current nested
/// validation. Pushed before a component evaluates and popped after.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EvaluationPath {
    frames: Vec<(ShapeId, ComponentKind)>,
}

impl EvaluationPath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, shape: ShapeId, kind: ComponentKind) {
        self.frames.push((shape, kind));
    }

    pub fn pop(&mut self) -> Option<(ShapeId, ComponentKind)> {
        self.frames.pop()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn frames(&self) -> &[(ShapeId, ComponentKind)] {
        &self.frames
    }

    /// Shapes that the component on top of the path may be re-entering.
    ///
    /// Looks for earlier frames with the same shape and component kind as the
    /// top frame; the shape validated right after each such frame is reported
    /// as maybe recursive. Nothing is reported until the path is at least the
    /// lookback length deep. The lookback doubles when a `sh:property` and a
    /// `sh:node` frame are stacked on each other, since such cycles take two
    /// hops per repetition.
    ///
    /// This is a heuristic, not a cycle proof. The hard bound on nesting is
    /// the maximum validation depth.
    pub fn recursion_triggers(&self) -> Vec<ShapeId> {
        let n = self.frames.len();
        if n < 2 {
            return Vec::new();
        }
        let (shape, kind) = self.frames[n - 1];
        let (_, prev_kind) = self.frames[n - 2];
        let mixed = matches!(
            (kind, prev_kind),
            (ComponentKind::Property, ComponentKind::Node)
                | (ComponentKind::Node, ComponentKind::Property)
        );
        let lookback = if mixed {
            TRIGGER_DEPTH * 4
        } else {
            TRIGGER_DEPTH * 2
        };
        // each frame stands for a shape and a component
        if n * 2 < lookback {
            return Vec::new();
        }
        let mut maybe_recursive = Vec::new();
        for j in 0..n - 1 {
            let (s, k) = self.frames[j];
            if s == shape && k == kind {
                maybe_recursive.push(self.frames[j + 1].0);
            }
        }
        maybe_recursive
    }
}

impl fmt::Display for EvaluationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (shape, kind)) in self.frames.iter().enumerate() {
            if i > 0 {
                write!(f, "->")?;
            }
            write!(f, "{}:{}", shape, kind.name())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(frames: &[(u64, ComponentKind)]) -> EvaluationPath {
        let mut p = EvaluationPath::new();
        for (s, k) in frames {
            p.push(ShapeId(*s), *k);
        }
        p
    }

    #[test]
    fn shallow_paths_never_trigger() {
        let p = path(&[(0, ComponentKind::Node), (1, ComponentKind::Node)]);
        assert!(p.recursion_triggers().is_empty());
    }

    #[test]
    fn repeated_node_frame_flags_the_next_shape() {
        use ComponentKind::Node;
        let p = path(&[(0, Node), (1, Node), (0, Node)]);
        assert_eq!(p.recursion_triggers(), vec![ShapeId(1)]);
    }

    #[test]
    fn property_node_mix_needs_a_longer_path() {
        use ComponentKind::{Node, Property};
        let short = path(&[(0, Property), (1, Node), (2, Property), (1, Node)]);
        assert!(short.recursion_triggers().is_empty());
        let long = path(&[
            (0, Property),
            (1, Node),
            (2, Property),
            (1, Node),
            (2, Property),
            (1, Node),
        ]);
        assert_eq!(long.recursion_triggers(), vec![ShapeId(2), ShapeId(2)]);
    }

    #[test]
    fn different_component_kind_is_not_a_repeat() {
        use ComponentKind::{Node, Not};
        let p = path(&[(0, Not), (1, Node), (0, Node)]);
        assert!(p.recursion_triggers().is_empty());
    }

    #[test]
    fn push_pop_is_a_stack() {
        let mut p = EvaluationPath::new();
        p.push(ShapeId(3), ComponentKind::And);
        p.push(ShapeId(4), ComponentKind::Or);
        assert_eq!(p.pop(), Some((ShapeId(4), ComponentKind::Or)));
        assert_eq!(p.len(), 1);
        assert_eq!(p.to_string(), "s3:AndConstraintComponent");
    }
}
