//! Structural checks and statistics over the asserted store.

use crate::reports::{tally, CitationCount};
use ethica_facts::{Category, ElementCatalog, ElementId, FactStore, Predicate};
use serde::Serialize;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    UndefinedCitation,
    SelfCitation,
    Unplaced,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub kind: IssueKind,
    pub element_id: ElementId,
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Check citations against declared elements and placement in the hierarchy.
///
/// An id counts as defined when it is typed in the store or present in the
/// catalog. Placement is only checked once the store carries any `partOf` facts.
pub fn validate(store: &FactStore, catalog: &ElementCatalog) -> ValidationReport {
    let mut report = ValidationReport::default();

    let typed = store.matching(None, Some(Predicate::Type), None);
    let defined: HashSet<&str> = typed.iter().map(|st| st.subject.as_str()).collect();
    let is_defined = |id: &str| defined.contains(id) || catalog.contains(id);

    for st in store.matching(None, Some(Predicate::Cites), None) {
        if !is_defined(st.object.as_str()) {
            report.errors.push(ValidationIssue {
                kind: IssueKind::UndefinedCitation,
                element_id: st.subject.clone(),
                message: format!("{} cites undefined element: {}", st.subject, st.object),
            });
        }
        if st.subject == st.object {
            report.warnings.push(ValidationIssue {
                kind: IssueKind::SelfCitation,
                element_id: st.subject.clone(),
                message: format!("self-citation detected: {} cites itself", st.subject),
            });
        }
    }

    if store.count_matching(None, Some(Predicate::PartOf), None) > 0 {
        let mut checked = HashSet::new();
        for st in &typed {
            let placeable = matches!(
                Category::from_class(st.object.as_str()),
                Some(Category::Definition | Category::Axiom | Category::Proposition)
            );
            if !placeable || !checked.insert(st.subject.as_str()) {
                continue;
            }
            if store.count_matching(Some(st.subject.as_str()), Some(Predicate::PartOf), None) == 0 {
                report.warnings.push(ValidationIssue {
                    kind: IssueKind::Unplaced,
                    element_id: st.subject.clone(),
                    message: format!("{} is not assigned to a section", st.subject),
                });
            }
        }
    }

    report
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeCount {
    pub class: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreStatistics {
    pub total_triples: usize,
    /// Number of type statements
    pub total_elements: usize,
    pub total_citations: usize,
    /// Descending by count; ties keep first-seen order
    pub element_types: Vec<TypeCount>,
    /// Outbound citations per citing element, first-seen order
    pub citations_by_citer: Vec<CitationCount>,
}

pub fn statistics(store: &FactStore) -> StoreStatistics {
    let typed = store.matching(None, Some(Predicate::Type), None);
    let citations = store.matching(None, Some(Predicate::Cites), None);

    let mut element_types: Vec<TypeCount> = tally(typed.iter().map(|st| &st.object))
        .into_iter()
        .map(|(class, count)| TypeCount {
            class: class.to_string(),
            count,
        })
        .collect();
    element_types.sort_by(|a, b| b.count.cmp(&a.count));

    let citations_by_citer = tally(citations.iter().map(|st| &st.subject))
        .into_iter()
        .map(|(id, count)| CitationCount {
            element_id: id.clone(),
            count,
        })
        .collect();

    StoreStatistics {
        total_triples: store.len(),
        total_elements: typed.len(),
        total_citations: citations.len(),
        element_types,
        citations_by_citer,
    }
}
