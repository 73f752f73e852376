use ethica_graph::facts::{ElementCatalog, FactStore, Predicate, Statement};
use ethica_graph::{AnalyzerConfig, Direction, RelationshipGraph, WeightAnalyzer};
use proptest::prelude::*;

const NODES: usize = 8;

fn weighted_predicate() -> impl Strategy<Value = Predicate> {
    let weighted: Vec<Predicate> = Predicate::weighted().map(|(p, _)| p).collect();
    prop::sample::select(weighted)
}

fn any_predicate() -> impl Strategy<Value = Predicate> {
    prop::sample::select(Predicate::ASSERTED.to_vec())
}

fn edges(predicate: impl Strategy<Value = Predicate>) -> impl Strategy<Value = Vec<Statement>> {
    prop::collection::vec((0..NODES, predicate, 0..NODES), 0..32).prop_map(|edges| {
        edges
            .into_iter()
            .map(|(s, p, o)| Statement::new(format!("N{s}"), p, format!("N{o}")))
            .collect()
    })
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

proptest! {
    #[test]
    fn proptest_analysis_terminates_and_is_repeatable(statements in edges(any_predicate()), target in 0..NODES) {
        let store = FactStore::from_statements(statements);
        let catalog = ElementCatalog::new();
        let config = AnalyzerConfig::default();
        let analyzer = WeightAnalyzer::new(&store, &catalog, &config);

        let id = format!("N{target}");
        let first = analyzer.analyze(&id);
        let second = analyzer.analyze(&id);
        prop_assert_eq!(&first, &second);
        prop_assert!(first.foundational_score >= 0.0);
        prop_assert!(first.inbound_weight >= 0.0 && first.outbound_weight >= 0.0);
        prop_assert!(first.dependency_depth <= store.len());
    }

    #[test]
    fn proptest_fresh_citation_never_lowers_score(statements in edges(weighted_predicate()), target in 0..NODES) {
        let catalog = ElementCatalog::new();
        let config = AnalyzerConfig::default();
        let id = format!("N{target}");

        let before_store = FactStore::from_statements(statements.clone());
        let before = WeightAnalyzer::new(&before_store, &catalog, &config).analyze(&id);

        let mut after_store = FactStore::from_statements(statements);
        after_store.insert(Statement::new("Fresh", Predicate::Cites, id.as_str()));
        let after = WeightAnalyzer::new(&after_store, &catalog, &config).analyze(&id);

        prop_assert!(close(after.inbound_weight, before.inbound_weight + 1.0));
        prop_assert!(close(after.transitive_influence, before.transitive_influence + 5.0));
        prop_assert!(after.foundational_score >= before.foundational_score);
    }

    #[test]
    fn proptest_query_mirrors_every_edge(statements in edges(any_predicate()), target in 0..NODES) {
        let store = FactStore::from_statements(statements);
        let derived = FactStore::new();
        let graph = RelationshipGraph::new(&store, &derived);
        let id = format!("N{target}");

        let records = graph.query(&id);
        let outbound = records.iter().filter(|r| r.direction == Direction::Outbound).count();
        let inbound = records.iter().filter(|r| r.direction == Direction::Inbound).count();
        prop_assert_eq!(outbound, store.count_matching(Some(id.as_str()), None, None));
        prop_assert_eq!(inbound, store.count_matching(None, None, Some(id.as_str())));
        prop_assert!(records.iter().all(|r| !r.inferred));
    }
}
