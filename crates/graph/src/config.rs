use crate::error::{GraphError, Result};
use ethica_facts::{Category, Predicate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Weight and scoring tables for the weight analyzer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Asserted predicates that take part in weighting, with their weight
    pub weights: BTreeMap<Predicate, f64>,

    /// Base value per element category (absent = 0)
    pub base_scores: BTreeMap<Category, f64>,

    /// Deepest level visited by the transitive-influence traversal
    pub max_influence_depth: u32,

    /// Contribution at depth `d` is `weight × (ceiling − d)`
    pub depth_multiplier_ceiling: u32,

    /// Foundational score multiplier for inbound weight
    pub inbound_factor: f64,

    /// Foundational score multiplier for transitive influence
    pub influence_factor: f64,

    /// Foundational score multiplier for the inbound/outbound ratio
    pub ratio_factor: f64,

    /// Influence reach = round(transitive influence / divisor)
    pub reach_divisor: f64,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            weights: Predicate::weighted().collect(),
            base_scores: BTreeMap::from([
                (Category::Definition, 10.0),
                (Category::Axiom, 8.0),
                (Category::Proposition, 3.0),
                (Category::Corollary, 2.0),
                (Category::Proof, 1.0),
                (Category::Note, 0.5),
            ]),
            max_influence_depth: 4,
            depth_multiplier_ceiling: 5,
            inbound_factor: 1.5,
            influence_factor: 0.2,
            ratio_factor: 5.0,
            reach_divisor: 10.0,
        }
    }
}

impl AnalyzerConfig {
    /// Only citations carry weight; everything else keeps its default
    pub fn citations_only() -> Self {
        Self {
            weights: BTreeMap::from([(Predicate::Cites, 1.0)]),
            ..Default::default()
        }
    }

    /// Load a JSON config; omitted fields keep their defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn weight(&self, predicate: Predicate) -> Option<f64> {
        self.weights.get(&predicate).copied()
    }

    /// Weighted predicates in vocabulary order
    pub fn weighted(&self) -> impl Iterator<Item = (Predicate, f64)> + '_ {
        self.weights.iter().map(|(p, w)| (*p, *w))
    }

    pub fn base_score(&self, category: Option<Category>) -> f64 {
        category
            .and_then(|c| self.base_scores.get(&c).copied())
            .unwrap_or(0.0)
    }

    pub fn validate(&self) -> Result<()> {
        for (predicate, weight) in &self.weights {
            if predicate.is_derived() {
                return Err(GraphError::InvalidConfig(format!(
                    "weights may only name asserted predicates (found {predicate})"
                )));
            }
            if !weight.is_finite() || *weight < 0.0 {
                return Err(GraphError::InvalidConfig(format!(
                    "weight for {predicate} must be a non-negative number (got {weight})"
                )));
            }
        }

        if let Some((category, score)) = self.base_scores.iter().find(|(_, s)| !s.is_finite()) {
            return Err(GraphError::InvalidConfig(format!(
                "base score for {category:?} must be finite (got {score})"
            )));
        }

        if self.max_influence_depth >= self.depth_multiplier_ceiling {
            return Err(GraphError::InvalidConfig(format!(
                "max_influence_depth ({}) must stay below depth_multiplier_ceiling ({})",
                self.max_influence_depth, self.depth_multiplier_ceiling
            )));
        }

        for (name, factor) in [
            ("inbound_factor", self.inbound_factor),
            ("influence_factor", self.influence_factor),
            ("ratio_factor", self.ratio_factor),
        ] {
            if !factor.is_finite() || factor < 0.0 {
                return Err(GraphError::InvalidConfig(format!(
                    "{name} must be a non-negative number (got {factor})"
                )));
            }
        }

        if !(self.reach_divisor.is_finite() && self.reach_divisor > 0.0) {
            return Err(GraphError::InvalidConfig(format!(
                "reach_divisor must be > 0 (got {})",
                self.reach_divisor
            )));
        }

        Ok(())
    }
}
