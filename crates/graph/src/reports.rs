//! Citation and authority reports: stateless aggregate queries over the asserted store.

use ethica_facts::{Category, ElementCatalog, ElementId, FactStore, IdParts, Predicate};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CitationCount {
    pub element_id: ElementId,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofCount {
    /// Owning proposition (or lemma) id, e.g. `I.prop.11`
    pub proposition: ElementId,
    pub count: usize,
    pub proofs: Vec<ElementId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredicateCount {
    pub predicate: Predicate,
    pub count: usize,
}

/// Occurrence counts in first-seen order
pub(crate) fn tally<'s>(ids: impl IntoIterator<Item = &'s ElementId>) -> Vec<(&'s ElementId, usize)> {
    let mut positions: HashMap<&ElementId, usize> = HashMap::new();
    let mut counts: Vec<(&ElementId, usize)> = Vec::new();
    for id in ids {
        match positions.get(id) {
            Some(&pos) => counts[pos].1 += 1,
            None => {
                positions.insert(id, counts.len());
                counts.push((id, 1));
            }
        }
    }
    counts
}

/// Most-cited elements, descending by count; ties keep first-seen order
pub fn citation_counts(store: &FactStore, top_n: usize) -> Vec<CitationCount> {
    let cited = store.matching(None, Some(Predicate::Cites), None);
    let mut counts = tally(cited.iter().map(|st| &st.object));
    counts.sort_by(|a, b| b.1.cmp(&a.1));

    counts
        .into_iter()
        .take(top_n)
        .map(|(id, count)| CitationCount {
            element_id: id.clone(),
            count,
        })
        .collect()
}

/// Propositions with more than one proof, descending by proof count.
///
/// Proofs are subjects of `(x a Proof)` statements in store order, followed by
/// catalog proofs not declared in the store (sorted by id). Ids that do not
/// follow the element grammar cannot be attributed and are skipped.
pub fn multi_proof_propositions(store: &FactStore, catalog: &ElementCatalog) -> Vec<ProofCount> {
    let mut seen: HashSet<&ElementId> = HashSet::new();
    let mut proofs: Vec<&ElementId> = Vec::new();

    for st in store.matching(None, Some(Predicate::Type), None) {
        if Category::from_class(st.object.as_str()) == Some(Category::Proof) && seen.insert(&st.subject) {
            proofs.push(&st.subject);
        }
    }

    let mut from_catalog: Vec<&ElementId> = catalog
        .iter()
        .filter(|e| e.category == Category::Proof)
        .map(|e| &e.id)
        .filter(|id| !seen.contains(id))
        .collect();
    from_catalog.sort();
    proofs.extend(from_catalog);

    let mut order: Vec<ElementId> = Vec::new();
    let mut groups: HashMap<ElementId, Vec<ElementId>> = HashMap::new();
    for proof in proofs {
        let Some(parts) = IdParts::parse(proof.as_str()) else {
            log::debug!("Proof {proof} has no parsable owner; skipped");
            continue;
        };
        let owner = ElementId::new(parts.owner());
        groups
            .entry(owner.clone())
            .or_insert_with(|| {
                order.push(owner);
                Vec::new()
            })
            .push(proof.clone());
    }

    let mut report: Vec<ProofCount> = order
        .into_iter()
        .filter_map(|owner| {
            let proofs = groups.remove(&owner)?;
            (proofs.len() > 1).then(|| ProofCount {
                proposition: owner,
                count: proofs.len(),
                proofs,
            })
        })
        .collect();
    report.sort_by(|a, b| b.count.cmp(&a.count));
    report
}

/// Distinct subjects of reductio statements, in first-seen order
pub fn reductio_subjects(store: &FactStore) -> Vec<ElementId> {
    let mut seen = HashSet::new();
    store
        .matching(None, Some(Predicate::RefutedByAbsurdity), None)
        .into_iter()
        .filter(|st| seen.insert(&st.subject))
        .map(|st| st.subject.clone())
        .collect()
}

/// Non-zero counts for the semantic predicates, in fixed report order
pub fn predicate_histogram(store: &FactStore) -> Vec<PredicateCount> {
    Predicate::SEMANTIC
        .iter()
        .map(|&predicate| PredicateCount {
            predicate,
            count: store.count_matching(None, Some(predicate), None),
        })
        .filter(|entry| entry.count > 0)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethica_facts::{Element, Statement};
    use pretty_assertions::assert_eq;

    fn ids(values: &[&str]) -> Vec<ElementId> {
        values.iter().map(|v| ElementId::from(*v)).collect()
    }

    #[test]
    fn citation_ties_keep_first_seen_order() {
        let store = FactStore::from_statements([
            Statement::new("I.prop.2", Predicate::Cites, "I.def.3"),
            Statement::new("I.prop.2", Predicate::Cites, "I.ax.1"),
            Statement::new("I.prop.4", Predicate::Cites, "I.ax.1"),
            Statement::new("I.prop.5", Predicate::Cites, "I.def.3"),
            Statement::new("I.prop.5", Predicate::Cites, "I.prop.4"),
            Statement::new("I.prop.6", Predicate::Cites, "I.ax.1"),
        ]);
        let counts = citation_counts(&store, 10);
        assert_eq!(
            counts,
            vec![
                CitationCount { element_id: "I.ax.1".into(), count: 3 },
                CitationCount { element_id: "I.def.3".into(), count: 2 },
                CitationCount { element_id: "I.prop.4".into(), count: 1 },
            ]
        );
        assert_eq!(citation_counts(&store, 1).len(), 1);
        assert!(citation_counts(&store, 0).is_empty());
    }

    #[test]
    fn multi_proof_groups_by_owner() {
        let store = FactStore::from_statements([
            Statement::new("I.prop.11.proof1", Predicate::Type, "Proof"),
            Statement::new("I.prop.11.proof2", Predicate::Type, "Proof"),
            Statement::new("I.prop.8.proof1", Predicate::Type, "Proof"),
            Statement::new("I.prop.8.proof2", Predicate::Type, "Proof"),
            Statement::new("I.prop.5.proof", Predicate::Type, "Proof"),
            Statement::new("I.prop.11.proof1", Predicate::Type, "Proof"),
        ]);
        let catalog = ElementCatalog::from_elements([
            Element::new("I.prop.11.proof3", Category::Proof).with_parent("I.prop.11"),
            Element::new("I.prop.11", Category::Proposition),
        ]);

        let report = multi_proof_propositions(&store, &catalog);
        assert_eq!(report.len(), 2);
        assert_eq!(report[0].proposition.as_str(), "I.prop.11");
        assert_eq!(report[0].count, 3);
        assert_eq!(
            report[0].proofs,
            ids(&["I.prop.11.proof1", "I.prop.11.proof2", "I.prop.11.proof3"])
        );
        assert_eq!(report[1].proposition.as_str(), "I.prop.8");
        assert_eq!(report[1].count, 2);
    }

    #[test]
    fn reductio_subjects_are_distinct() {
        let store = FactStore::from_statements([
            Statement::new("X", Predicate::RefutedByAbsurdity, "Y"),
            Statement::new("Y", Predicate::RefutedByAbsurdity, "X"),
            Statement::new("X", Predicate::RefutedByAbsurdity, "Z"),
            Statement::new("W", Predicate::Cites, "X"),
        ]);
        assert_eq!(reductio_subjects(&store), ids(&["X", "Y"]));
    }

    #[test]
    fn histogram_reports_non_zero_counts_in_fixed_order() {
        let store = FactStore::from_statements([
            Statement::new("A", Predicate::BuildsUpon, "B"),
            Statement::new("A", Predicate::NecessarilyFollows, "B"),
            Statement::new("C", Predicate::NecessarilyFollows, "B"),
            Statement::new("C", Predicate::Cites, "B"),
        ]);
        assert_eq!(
            predicate_histogram(&store),
            vec![
                PredicateCount { predicate: Predicate::NecessarilyFollows, count: 2 },
                PredicateCount { predicate: Predicate::BuildsUpon, count: 1 },
            ]
        );
    }

    #[test]
    fn empty_store_reports_nothing() {
        let store = FactStore::new();
        assert!(citation_counts(&store, 5).is_empty());
        assert!(multi_proof_propositions(&store, &ElementCatalog::new()).is_empty());
        assert!(reductio_subjects(&store).is_empty());
        assert!(predicate_histogram(&store).is_empty());
    }
}
