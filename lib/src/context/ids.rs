use oxigraph::model::Term;
use std::collections::HashMap;
use std::hash::Hash;

/// Maps shape nodes to dense arena ids, in insertion order.
#[derive(Debug)]
pub(crate) struct IDLookupTable<IdType: Copy + Eq + Hash> {
    id_map: HashMap<Term, IdType>,
    terms: Vec<Term>,
}

impl<IdType: Copy + Eq + Hash + From<u64>> IDLookupTable<IdType> {
    pub(crate) fn new() -> Self {
        Self {
            id_map: HashMap::new(),
            terms: Vec::new(),
        }
    }

    /// Assigns the next id to `term`. Returns `None` if it already has one.
    pub(crate) fn insert_new(&mut self, term: Term) -> Option<IdType> {
        if self.id_map.contains_key(&term) {
            return None;
        }
        let id: IdType = (self.terms.len() as u64).into();
        self.id_map.insert(term.clone(), id);
        self.terms.push(term);
        Some(id)
    }

    pub(crate) fn get(&self, term: &Term) -> Option<IdType> {
        self.id_map.get(term).copied()
    }

    pub(crate) fn len(&self) -> usize {
        self.terms.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ShapeId;
    use oxigraph::model::NamedNode;

    #[test]
    fn ids_are_dense_and_unique() {
        let mut table: IDLookupTable<ShapeId> = IDLookupTable::new();
        let a: Term = NamedNode::new_unchecked("http://ex/a").into();
        let b: Term = NamedNode::new_unchecked("http://ex/b").into();
        assert_eq!(table.insert_new(a.clone()), Some(ShapeId(0)));
        assert_eq!(table.insert_new(b.clone()), Some(ShapeId(1)));
        assert_eq!(table.insert_new(a.clone()), None);
        assert_eq!(table.get(&b), Some(ShapeId(1)));
        assert_eq!(table.len(), 2);
    }
}
