use crate::element::ElementId;
use crate::predicate::Predicate;
use crate::statement::Statement;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::HashMap;

/// Append-only multiset of statements with pattern lookup.
///
/// Nodes are element ids, edges point at the statement list, so parallel
/// edges keep duplicate triples and lookups return them in insertion order.
#[derive(Debug, Clone, Default)]
pub struct FactStore {
    statements: Vec<Statement>,

    /// Directed multigraph (subject -> object, edge = statement position)
    graph: DiGraph<ElementId, usize>,

    /// Element id -> NodeIndex mapping for fast lookup
    node_index: HashMap<ElementId, NodeIndex>,

    /// Predicate -> statement positions, for predicate-only scans
    predicate_index: HashMap<Predicate, Vec<usize>>,
}

impl FactStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_statements(statements: impl IntoIterator<Item = Statement>) -> Self {
        let mut store = Self::new();
        for statement in statements {
            store.insert(statement);
        }
        store
    }

    /// Append a statement; duplicates are kept
    pub fn insert(&mut self, statement: Statement) {
        let position = self.statements.len();
        let from = self.ensure_node(&statement.subject);
        let to = self.ensure_node(&statement.object);
        self.graph.add_edge(from, to, position);
        self.predicate_index
            .entry(statement.predicate)
            .or_default()
            .push(position);
        self.statements.push(statement);
    }

    fn ensure_node(&mut self, id: &ElementId) -> NodeIndex {
        if let Some(&idx) = self.node_index.get(id) {
            return idx;
        }
        let idx = self.graph.add_node(id.clone());
        self.node_index.insert(id.clone(), idx);
        idx
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// All statements in insertion order
    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    /// Number of distinct ids appearing as subject or object
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Statements matching the pattern; `None` leaves a position unbound.
    pub fn matching(
        &self,
        subject: Option<&str>,
        predicate: Option<Predicate>,
        object: Option<&str>,
    ) -> Vec<&Statement> {
        let mut positions: Vec<usize> = match (subject, object) {
            (Some(subject), _) => self.adjacent(subject, Direction::Outgoing),
            (None, Some(object)) => self.adjacent(object, Direction::Incoming),
            (None, None) => match predicate {
                Some(predicate) => self
                    .predicate_index
                    .get(&predicate)
                    .cloned()
                    .unwrap_or_default(),
                None => (0..self.statements.len()).collect(),
            },
        };
        positions.sort_unstable();

        positions
            .into_iter()
            .map(|pos| &self.statements[pos])
            .filter(|st| predicate.map_or(true, |p| st.predicate == p))
            .filter(|st| subject.map_or(true, |s| st.subject.as_str() == s))
            .filter(|st| object.map_or(true, |o| st.object.as_str() == o))
            .collect()
    }

    pub fn count_matching(
        &self,
        subject: Option<&str>,
        predicate: Option<Predicate>,
        object: Option<&str>,
    ) -> usize {
        self.matching(subject, predicate, object).len()
    }

    fn adjacent(&self, id: &str, direction: Direction) -> Vec<usize> {
        match self.node_index.get(id) {
            Some(&node) => self
                .graph
                .edges_directed(node, direction)
                .map(|e| *e.weight())
                .collect(),
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn fixture() -> FactStore {
        FactStore::from_statements([
            Statement::new("I.prop.14", Predicate::Cites, "I.def.6"),
            Statement::new("I.prop.14", Predicate::Cites, "I.prop.11"),
            Statement::new("I.prop.14", Predicate::Cites, "I.prop.5"),
            Statement::new("I.prop.15", Predicate::Cites, "I.prop.14"),
            Statement::new("I.prop.15", Predicate::Cites, "I.prop.14"),
            Statement::new("I.prop.15", Predicate::NecessarilyFollows, "I.prop.14"),
        ])
    }

    #[test]
    fn subject_lookup_preserves_insertion_order() {
        let store = fixture();
        let objects: Vec<_> = store
            .matching(Some("I.prop.14"), Some(Predicate::Cites), None)
            .into_iter()
            .map(|st| st.object.as_str())
            .collect();
        assert_eq!(objects, vec!["I.def.6", "I.prop.11", "I.prop.5"]);
    }

    #[test]
    fn duplicates_are_counted() {
        let store = fixture();
        assert_eq!(
            store.count_matching(Some("I.prop.15"), Some(Predicate::Cites), Some("I.prop.14")),
            2
        );
        assert_eq!(store.count_matching(None, None, Some("I.prop.14")), 3);
        assert_eq!(store.len(), 6);
    }

    #[test]
    fn predicate_scan_and_full_scan() {
        let store = fixture();
        assert_eq!(store.count_matching(None, Some(Predicate::Cites), None), 5);
        assert_eq!(store.count_matching(None, None, None), 6);
        assert_eq!(store.count_matching(None, Some(Predicate::GroundedIn), None), 0);
    }

    #[test]
    fn unknown_ids_match_nothing() {
        let store = fixture();
        assert!(store.matching(Some("I.prop.99"), None, None).is_empty());
        assert!(store.matching(None, None, Some("")).is_empty());
        assert!(FactStore::new().matching(None, None, None).is_empty());
    }

    #[test]
    fn self_loops_are_found_both_ways() {
        let store = FactStore::from_statements([Statement::new("A", Predicate::Cites, "A")]);
        assert_eq!(store.count_matching(Some("A"), None, None), 1);
        assert_eq!(store.count_matching(None, None, Some("A")), 1);
        assert_eq!(store.node_count(), 1);
    }
}
