use crate::analyzer::WeightAnalyzer;
use crate::config::AnalyzerConfig;
use crate::error::Result;
use crate::graph::RelationshipGraph;
use crate::reports::{self, CitationCount, PredicateCount, ProofCount};
use crate::types::{ChainRecord, ElementAnalysis, RelationshipRecord, WeightAnalysis};
use crate::validation::{self, StoreStatistics, ValidationReport};
use ethica_facts::{
    ensure_derived, ElementCatalog, ElementId, FactStore, InferenceOracle, OracleError, RuleSet,
    Statement,
};
use std::sync::{Arc, PoisonError, RwLock};

/// Read API over one loaded fact base.
///
/// The catalog and asserted store are fixed at construction. The derived store
/// starts empty and is only ever swapped wholesale; each query works on the
/// snapshot it took when it started.
pub struct Session {
    catalog: Arc<ElementCatalog>,
    asserted: Arc<FactStore>,
    derived: RwLock<Arc<FactStore>>,
    config: AnalyzerConfig,
}

impl Session {
    pub fn new(catalog: ElementCatalog, asserted: FactStore) -> Self {
        log::info!(
            "Session loaded: {} elements, {} asserted statements",
            catalog.len(),
            asserted.len()
        );
        Self {
            catalog: Arc::new(catalog),
            asserted: Arc::new(asserted),
            derived: RwLock::new(Arc::new(FactStore::new())),
            config: AnalyzerConfig::default(),
        }
    }

    /// Session whose catalog is built from the store's type statements
    pub fn from_asserted(asserted: FactStore) -> Self {
        let catalog = ElementCatalog::from_store(&asserted);
        Self::new(catalog, asserted)
    }

    pub fn with_config(mut self, config: AnalyzerConfig) -> Result<Self> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    pub fn catalog(&self) -> &ElementCatalog {
        &self.catalog
    }

    pub fn asserted(&self) -> &FactStore {
        &self.asserted
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Current derived store snapshot
    pub fn derived(&self) -> Arc<FactStore> {
        self.derived
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Swap in a new derived store
    pub fn replace_derived(&self, store: FactStore) {
        let store = Arc::new(store);
        *self.derived.write().unwrap_or_else(PoisonError::into_inner) = store;
    }

    /// Run the oracle and install its output, propagating oracle failures.
    ///
    /// On failure the previous derived store stays in place.
    pub fn try_reason(&self, oracle: &dyn InferenceOracle, rules: &RuleSet) -> Result<usize> {
        let statements = ensure_derived(oracle.infer(&self.asserted, rules)?)?;
        Ok(self.install(oracle.name(), statements))
    }

    /// Run the oracle; any failure leaves an empty derived store
    pub fn reason(&self, oracle: &dyn InferenceOracle, rules: &RuleSet) -> usize {
        self.accept(oracle.name(), oracle.infer(&self.asserted, rules))
    }

    /// Install an oracle answer obtained elsewhere (e.g. on a blocking task).
    ///
    /// Errors and output outside the derived vocabulary are logged and replaced
    /// by an empty derived store.
    pub fn accept(
        &self,
        oracle_name: &str,
        answer: std::result::Result<Vec<Statement>, OracleError>,
    ) -> usize {
        match answer.and_then(ensure_derived) {
            Ok(statements) => self.install(oracle_name, statements),
            Err(err) => {
                log::warn!("Oracle '{oracle_name}' failed, continuing without inferred facts: {err}");
                self.replace_derived(FactStore::new());
                0
            }
        }
    }

    fn install(&self, oracle_name: &str, statements: Vec<Statement>) -> usize {
        let count = statements.len();
        self.replace_derived(FactStore::from_statements(statements));
        log::info!("Oracle '{oracle_name}' derived {count} statements");
        count
    }

    pub fn query(&self, element_id: &str) -> Vec<RelationshipRecord> {
        let derived = self.derived();
        RelationshipGraph::new(&self.asserted, &derived).query(element_id)
    }

    pub fn find_chains(&self, element_id: &str) -> Vec<ChainRecord> {
        let derived = self.derived();
        RelationshipGraph::new(&self.asserted, &derived).find_chains(element_id)
    }

    pub fn analyze(&self, element_id: &str) -> WeightAnalysis {
        WeightAnalyzer::new(&self.asserted, &self.catalog, &self.config).analyze(element_id)
    }

    /// Relationships, chains and weights for one selected element
    pub fn analyze_element(&self, element_id: &str) -> ElementAnalysis {
        let derived = self.derived();
        let graph = RelationshipGraph::new(&self.asserted, &derived);

        ElementAnalysis {
            element_id: ElementId::from(element_id),
            label: self.label(element_id),
            relationships: graph.query(element_id),
            chains: graph.find_chains(element_id),
            weights: self.analyze(element_id),
        }
    }

    pub fn label(&self, element_id: &str) -> String {
        self.catalog.label(element_id)
    }

    pub fn citation_counts(&self, top_n: usize) -> Vec<CitationCount> {
        reports::citation_counts(&self.asserted, top_n)
    }

    pub fn multi_proof_propositions(&self) -> Vec<ProofCount> {
        reports::multi_proof_propositions(&self.asserted, &self.catalog)
    }

    pub fn reductio_subjects(&self) -> Vec<ElementId> {
        reports::reductio_subjects(&self.asserted)
    }

    pub fn predicate_histogram(&self) -> Vec<PredicateCount> {
        reports::predicate_histogram(&self.asserted)
    }

    pub fn validate(&self) -> ValidationReport {
        validation::validate(&self.asserted, &self.catalog)
    }

    pub fn statistics(&self) -> StoreStatistics {
        validation::statistics(&self.asserted)
    }
}
