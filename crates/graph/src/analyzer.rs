use crate::config::AnalyzerConfig;
use crate::types::{BreakdownEntry, Direction, WeightAnalysis};
use ethica_facts::{ElementCatalog, FactStore};
use std::collections::{HashMap, HashSet};

/// Weight analyzer over the asserted store.
///
/// Every metric is a pure function of the store contents and the config
/// tables, so results are recomputed per selection and never cached across calls.
pub struct WeightAnalyzer<'a> {
    store: &'a FactStore,
    catalog: &'a ElementCatalog,
    config: &'a AnalyzerConfig,
}

impl<'a> WeightAnalyzer<'a> {
    pub fn new(store: &'a FactStore, catalog: &'a ElementCatalog, config: &'a AnalyzerConfig) -> Self {
        Self {
            store,
            catalog,
            config,
        }
    }

    pub fn analyze(&self, element_id: &str) -> WeightAnalysis {
        let mut breakdown = Vec::new();
        let inbound_weight = self.directional_weight(element_id, Direction::Inbound, &mut breakdown);
        let outbound_weight =
            self.directional_weight(element_id, Direction::Outbound, &mut breakdown);
        breakdown.sort_by(|a, b| (a.predicate, a.direction).cmp(&(b.predicate, b.direction)));

        let mut visited = HashSet::new();
        let transitive_influence = self.transitive_influence(element_id, 0, &mut visited);
        let dependency_depth = self.dependency_depth(element_id);

        let foundational_score =
            self.foundational_score(element_id, inbound_weight, outbound_weight, transitive_influence);
        let influence_reach = (transitive_influence / self.config.reach_divisor).round() as u64;

        log::debug!(
            "Weights for {element_id}: in={inbound_weight} out={outbound_weight} \
             influence={transitive_influence} depth={dependency_depth}"
        );

        WeightAnalysis {
            element_id: element_id.into(),
            inbound_weight,
            outbound_weight,
            transitive_influence,
            foundational_score,
            dependency_depth,
            influence_reach,
            relationship_breakdown: breakdown,
        }
    }

    /// Σ count × weight over weighted predicates on one side of the element
    fn directional_weight(
        &self,
        element_id: &str,
        direction: Direction,
        breakdown: &mut Vec<BreakdownEntry>,
    ) -> f64 {
        let mut total = 0.0;

        for (predicate, weight) in self.config.weighted() {
            let matches = match direction {
                Direction::Inbound => self.store.matching(None, Some(predicate), Some(element_id)),
                Direction::Outbound => self.store.matching(Some(element_id), Some(predicate), None),
            };
            if matches.is_empty() {
                continue;
            }

            let related: Vec<_> = matches
                .iter()
                .map(|st| match direction {
                    Direction::Inbound => st.subject.clone(),
                    Direction::Outbound => st.object.clone(),
                })
                .collect();
            let summed = matches.len() as f64 * weight;
            total += summed;

            breakdown.push(BreakdownEntry {
                predicate,
                direction,
                count: matches.len(),
                weight: summed,
                related,
            });
        }

        total
    }

    /// Depth-bounded sum of weighted dependents, with diminishing contribution per level.
    ///
    /// `visited` is shared across sibling branches: an element reached on one
    /// branch is not expanded again on another within the same traversal.
    fn transitive_influence(&self, element_id: &str, depth: u32, visited: &mut HashSet<String>) -> f64 {
        if depth > self.config.max_influence_depth || !visited.insert(element_id.to_string()) {
            return 0.0;
        }

        let multiplier = self.config.depth_multiplier_ceiling.saturating_sub(depth) as f64;
        let mut influence = 0.0;

        for (predicate, weight) in self.config.weighted() {
            for st in self.store.matching(None, Some(predicate), Some(element_id)) {
                influence += weight * multiplier;
                influence += self.transitive_influence(st.subject.as_str(), depth + 1, visited);
            }
        }

        influence
    }

    /// Longest outbound chain over weighted predicates
    fn dependency_depth(&self, element_id: &str) -> usize {
        let mut settled = HashMap::new();
        self.depth_from(element_id, &HashSet::new(), &mut settled).0
    }

    /// Returns `(depth, path_independent)`.
    ///
    /// Each branch gets its own copy of the path set, so a sibling's cycle never
    /// truncates another branch. Results that never touched the path set do not
    /// depend on it and are kept in `settled`.
    fn depth_from(
        &self,
        element_id: &str,
        visited: &HashSet<String>,
        settled: &mut HashMap<String, usize>,
    ) -> (usize, bool) {
        if visited.contains(element_id) {
            return (0, false);
        }
        if let Some(&depth) = settled.get(element_id) {
            return (depth, true);
        }

        let mut path = visited.clone();
        path.insert(element_id.to_string());

        let mut deepest = 0;
        let mut independent = true;
        for (predicate, _) in self.config.weighted() {
            for st in self.store.matching(Some(element_id), Some(predicate), None) {
                let (depth, clean) = self.depth_from(st.object.as_str(), &path, settled);
                deepest = deepest.max(depth + 1);
                independent &= clean;
            }
        }

        if independent {
            settled.insert(element_id.to_string(), deepest);
        }
        (deepest, independent)
    }

    fn foundational_score(&self, element_id: &str, inbound: f64, outbound: f64, influence: f64) -> f64 {
        let base = self.config.base_score(self.catalog.category_of(element_id));
        let ratio = if outbound == 0.0 {
            1.0
        } else {
            (inbound / outbound).min(1.0)
        };

        let score = base
            + inbound * self.config.inbound_factor
            + influence * self.config.influence_factor
            + ratio * self.config.ratio_factor;
        score.max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethica_facts::{Predicate, Statement};

    fn store(edges: &[(&str, Predicate, &str)]) -> FactStore {
        FactStore::from_statements(edges.iter().map(|(s, p, o)| Statement::new(*s, *p, *o)))
    }

    fn analyze(store: &FactStore, id: &str) -> WeightAnalysis {
        let catalog = ElementCatalog::new();
        let config = AnalyzerConfig::default();
        WeightAnalyzer::new(store, &catalog, &config).analyze(id)
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_influence_diminishes_with_depth() {
        let store = store(&[
            ("B", Predicate::Cites, "A"),
            ("C", Predicate::NecessarilyFollows, "B"),
        ]);
        let result = analyze(&store, "A");

        assert!(close(result.inbound_weight, 1.0));
        assert!(close(result.outbound_weight, 0.0));
        // 1 × 5 at depth 0, 3 × 4 at depth 1
        assert!(close(result.transitive_influence, 17.0));
        assert_eq!(result.influence_reach, 2);
        assert!(close(result.foundational_score, 1.5 + 3.4 + 5.0));

        assert_eq!(analyze(&store, "C").dependency_depth, 2);
    }

    #[test]
    fn test_influence_shares_visited_across_siblings() {
        let store = store(&[
            ("B", Predicate::Cites, "A"),
            ("C", Predicate::Cites, "A"),
            ("D", Predicate::Cites, "B"),
            ("D", Predicate::Cites, "C"),
            ("E", Predicate::Cites, "D"),
        ]);
        // A: B(+5) → D(+4) → E(+3); C(+5) → D(+4), D already expanded
        assert!(close(analyze(&store, "A").transitive_influence, 21.0));
    }

    #[test]
    fn test_depth_copies_visited_per_branch() {
        let store = store(&[
            ("A", Predicate::Cites, "C"),
            ("A", Predicate::Cites, "B"),
            ("B", Predicate::Cites, "C"),
            ("C", Predicate::Cites, "D"),
        ]);
        assert_eq!(analyze(&store, "A").dependency_depth, 3);
    }

    #[test]
    fn test_cycles_terminate() {
        let store = store(&[
            ("A", Predicate::NecessarilyFollows, "B"),
            ("B", Predicate::NecessarilyFollows, "A"),
        ]);
        let result = analyze(&store, "A");
        assert!(close(result.transitive_influence, 15.0 + 12.0));
        assert_eq!(result.dependency_depth, 2);
        assert!(close(result.inbound_weight, 3.0));
        assert!(close(result.outbound_weight, 3.0));
    }

    #[test]
    fn test_influence_stops_below_depth_cap() {
        let store = store(&[
            ("N1", Predicate::Cites, "N0"),
            ("N2", Predicate::Cites, "N1"),
            ("N3", Predicate::Cites, "N2"),
            ("N4", Predicate::Cites, "N3"),
            ("N5", Predicate::Cites, "N4"),
            ("N6", Predicate::Cites, "N5"),
        ]);
        // depths 0..=4 contribute 5 + 4 + 3 + 2 + 1
        assert!(close(analyze(&store, "N0").transitive_influence, 15.0));
        assert_eq!(analyze(&store, "N6").dependency_depth, 6);
    }

    #[test]
    fn test_unweighted_predicates_are_ignored() {
        let store = store(&[
            ("B", Predicate::EvidentFrom, "A"),
            ("B", Predicate::PartOf, "A"),
            ("B", Predicate::Type, "Proposition"),
        ]);
        let result = analyze(&store, "A");
        assert!(close(result.inbound_weight, 0.0));
        assert!(result.relationship_breakdown.is_empty());
        assert!(close(result.foundational_score, 5.0));
    }

    #[test]
    fn test_breakdown_lists_related_ids() {
        let store = store(&[
            ("P2", Predicate::Cites, "D1"),
            ("P3", Predicate::Cites, "D1"),
            ("P3", Predicate::Cites, "D1"),
            ("D1", Predicate::GroundedIn, "X"),
        ]);
        let result = analyze(&store, "D1");
        let cited = result.breakdown(Predicate::Cites, Direction::Inbound).unwrap();
        assert_eq!(cited.count, 3);
        assert!(close(cited.weight, 3.0));
        let related: Vec<_> = cited.related.iter().map(|id| id.as_str()).collect();
        assert_eq!(related, vec!["P2", "P3", "P3"]);

        let grounded = result.breakdown(Predicate::GroundedIn, Direction::Outbound).unwrap();
        assert!(close(grounded.weight, 2.0));
        assert!(close(result.outbound_weight, 2.0));
        assert!(result.breakdown(Predicate::Cites, Direction::Outbound).is_none());
    }

    #[test]
    fn test_base_score_uses_category() {
        let store = FactStore::new();
        let catalog = ElementCatalog::new();
        let config = AnalyzerConfig::default();
        let analyzer = WeightAnalyzer::new(&store, &catalog, &config);

        // no relationships: base + ratio bonus
        assert!(close(analyzer.analyze("I.def.1").foundational_score, 15.0));
        assert!(close(analyzer.analyze("I.ax.1").foundational_score, 13.0));
        assert!(close(analyzer.analyze("I.prop.4.note").foundational_score, 5.5));
        assert!(close(analyzer.analyze("unparsed").foundational_score, 5.0));
    }

    #[test]
    fn test_ratio_rewards_being_depended_upon() {
        let store = store(&[
            ("A", Predicate::NecessarilyFollows, "B"),
            ("C", Predicate::Cites, "A"),
        ]);
        let result = analyze(&store, "A");
        // ratio = 1 / 3
        let expected = 1.0 * 1.5 + 5.0 * 0.2 + (1.0 / 3.0) * 5.0;
        assert!(close(result.foundational_score, expected));
    }
}
