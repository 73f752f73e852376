use crate::types::{ChainKind, ChainRecord, Direction, PathStep, RelationshipRecord};
use ethica_facts::{FactStore, Predicate, Statement};

/// Derived predicates reported as dependency chains
const CHAIN_PREDICATES: [Predicate; 2] = [Predicate::TransitivelyDependsOn, Predicate::DependsOn];

/// Uniform read view over the asserted and derived stores.
///
/// Derived predicates are looked up in the derived store, everything else in
/// the asserted store. An empty derived store simply yields no inferred records.
#[derive(Debug, Clone, Copy)]
pub struct RelationshipGraph<'a> {
    asserted: &'a FactStore,
    derived: &'a FactStore,
}

impl<'a> RelationshipGraph<'a> {
    pub fn new(asserted: &'a FactStore, derived: &'a FactStore) -> Self {
        Self { asserted, derived }
    }

    fn store_for(&self, predicate: Predicate) -> &'a FactStore {
        if predicate.is_derived() {
            self.derived
        } else {
            self.asserted
        }
    }

    /// Find all statements where `element_id` is subject or object.
    ///
    /// Grouped by predicate in vocabulary order, outbound before inbound, store
    /// order within a group. Duplicate triples produce duplicate records.
    pub fn query(&self, element_id: &str) -> Vec<RelationshipRecord> {
        let mut records = Vec::new();

        for &predicate in Predicate::ALL {
            let store = self.store_for(predicate);
            let inferred = predicate.is_derived();

            for st in store.matching(Some(element_id), Some(predicate), None) {
                records.push(RelationshipRecord {
                    subject: st.subject.clone(),
                    predicate: predicate.wire_name().to_string(),
                    object: st.object.clone(),
                    direction: Direction::Outbound,
                    inferred,
                });
            }

            for st in store.matching(None, Some(predicate), Some(element_id)) {
                records.push(RelationshipRecord {
                    subject: st.subject.clone(),
                    predicate: predicate.inverse_name(),
                    object: st.object.clone(),
                    direction: Direction::Inbound,
                    inferred,
                });
            }
        }

        log::debug!("Relationships for {element_id}: {}", records.len());
        records
    }

    /// Find the single-edge dependency chains touching `element_id`.
    ///
    /// Only the derived store is read; multi-hop closure is the oracle's job.
    pub fn find_chains(&self, element_id: &str) -> Vec<ChainRecord> {
        let mut chains = Vec::new();

        for predicate in CHAIN_PREDICATES {
            let outbound = self
                .derived
                .matching(Some(element_id), Some(predicate), None)
                .into_iter()
                .map(|st| (st, Direction::Outbound));
            let inbound = self
                .derived
                .matching(None, Some(predicate), Some(element_id))
                .into_iter()
                .map(|st| (st, Direction::Inbound));

            for (st, direction) in outbound.chain(inbound) {
                if let Some(kind) = ChainKind::of(predicate, direction) {
                    chains.push(chain_record(kind, st));
                }
            }
        }

        chains
    }
}

fn chain_record(kind: ChainKind, st: &Statement) -> ChainRecord {
    ChainRecord {
        kind,
        start: st.subject.clone(),
        end: st.object.clone(),
        relationship: st.predicate,
        inferred: true,
        path: vec![PathStep {
            from: st.subject.clone(),
            to: st.object.clone(),
            relationship: st.predicate,
        }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn asserted() -> FactStore {
        FactStore::from_statements([
            Statement::new("I.prop.14", Predicate::Cites, "I.def.6"),
            Statement::new("I.prop.14", Predicate::Cites, "I.prop.11"),
            Statement::new("I.prop.14", Predicate::Cites, "I.prop.5"),
            Statement::new("I.prop.15", Predicate::GroundedIn, "I.prop.14"),
        ])
    }

    fn derived() -> FactStore {
        FactStore::from_statements([
            Statement::new("I.prop.14", Predicate::DependsOn, "I.def.6"),
            Statement::new("I.prop.14", Predicate::TransitivelyDependsOn, "I.def.6"),
            Statement::new("I.prop.15", Predicate::TransitivelyDependsOn, "I.prop.14"),
        ])
    }

    #[test]
    fn inbound_records_use_inverse_names() {
        let (a, d) = (asserted(), derived());
        let graph = RelationshipGraph::new(&a, &d);
        let records = graph.query("I.def.6");

        assert!(records.contains(&RelationshipRecord {
            subject: "I.prop.14".into(),
            predicate: "citedBy".to_string(),
            object: "I.def.6".into(),
            direction: Direction::Inbound,
            inferred: false,
        }));
        assert!(records.contains(&RelationshipRecord {
            subject: "I.prop.14".into(),
            predicate: "inverse_dependsOn".to_string(),
            object: "I.def.6".into(),
            direction: Direction::Inbound,
            inferred: true,
        }));
    }

    #[test]
    fn inferred_flag_follows_vocabulary() {
        let (a, d) = (asserted(), derived());
        let records = RelationshipGraph::new(&a, &d).query("I.prop.14");
        for record in &records {
            let outbound = record.direction == Direction::Outbound;
            let expected = ["dependsOn", "transitivelyDependsOn", "inverse_transitivelyDependsOn"]
                .contains(&record.predicate.as_str());
            assert_eq!(record.inferred, expected, "{record:?} (outbound={outbound})");
        }
        assert_eq!(records.len(), 7);
    }

    #[test]
    fn chains_come_from_derived_store_only() {
        let (a, d) = (asserted(), derived());
        let graph = RelationshipGraph::new(&a, &d);
        let chains = graph.find_chains("I.prop.14");
        let kinds: Vec<_> = chains.iter().map(|c| c.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ChainKind::TransitiveDependency,
                ChainKind::TransitiveDependent,
                ChainKind::DirectDependency,
            ]
        );
        assert!(chains.iter().all(|c| c.inferred && c.path.len() == 1));
        assert_eq!(chains[1].start.as_str(), "I.prop.15");
        assert_eq!(chains[1].end.as_str(), "I.prop.14");
    }

    #[test]
    fn empty_derived_store_yields_no_chains() {
        let a = asserted();
        let empty = FactStore::new();
        let graph = RelationshipGraph::new(&a, &empty);
        assert!(graph.find_chains("I.prop.14").is_empty());
        assert!(graph.query("I.prop.14").iter().all(|r| !r.inferred));
    }

    #[test]
    fn unknown_ids_yield_nothing() {
        let (a, d) = (asserted(), derived());
        let graph = RelationshipGraph::new(&a, &d);
        assert!(graph.query("I.prop.999").is_empty());
        assert!(graph.query("").is_empty());
        assert!(graph.find_chains("???").is_empty());
    }
}
