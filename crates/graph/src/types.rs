use ethica_facts::{ElementId, Predicate};
use serde::{Deserialize, Serialize};

/// Which side of a statement the queried element sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// The element is the subject
    Outbound,
    /// The element is the object
    Inbound,
}

/// One relationship touching the queried element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipRecord {
    pub subject: ElementId,

    /// Wire name for outbound records, inverse name for inbound ones
    pub predicate: String,

    pub object: ElementId,

    pub direction: Direction,

    /// True iff the predicate belongs to the derived vocabulary
    pub inferred: bool,
}

/// Display grouping for chain records (predicate × direction)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChainKind {
    /// Element transitively depends on the end
    TransitiveDependency,
    /// Start transitively depends on the element
    TransitiveDependent,
    /// Element directly depends on the end
    DirectDependency,
    /// Start directly depends on the element
    DirectDependent,
}

impl ChainKind {
    pub fn of(predicate: Predicate, direction: Direction) -> Option<Self> {
        match (predicate, direction) {
            (Predicate::TransitivelyDependsOn, Direction::Outbound) => {
                Some(ChainKind::TransitiveDependency)
            }
            (Predicate::TransitivelyDependsOn, Direction::Inbound) => {
                Some(ChainKind::TransitiveDependent)
            }
            (Predicate::DependsOn, Direction::Outbound) => Some(ChainKind::DirectDependency),
            (Predicate::DependsOn, Direction::Inbound) => Some(ChainKind::DirectDependent),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathStep {
    pub from: ElementId,
    pub to: ElementId,
    pub relationship: Predicate,
}

/// A single derived dependency edge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainRecord {
    #[serde(rename = "type")]
    pub kind: ChainKind,
    pub start: ElementId,
    pub end: ElementId,
    pub relationship: Predicate,
    pub inferred: bool,
    pub path: Vec<PathStep>,
}

/// Matches of one `(predicate, direction)` pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakdownEntry {
    pub predicate: Predicate,
    pub direction: Direction,
    pub count: usize,
    /// `count × weight`
    pub weight: f64,
    /// Ids on the other side of each match, in store order
    pub related: Vec<ElementId>,
}

/// Per-query result of the weight analyzer; never persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightAnalysis {
    pub element_id: ElementId,
    pub inbound_weight: f64,
    pub outbound_weight: f64,
    pub transitive_influence: f64,
    pub foundational_score: f64,
    pub dependency_depth: usize,
    pub influence_reach: u64,
    /// One entry per `(predicate, direction)` pair with at least one match
    pub relationship_breakdown: Vec<BreakdownEntry>,
}

impl WeightAnalysis {
    pub fn breakdown(&self, predicate: Predicate, direction: Direction) -> Option<&BreakdownEntry> {
        self.relationship_breakdown
            .iter()
            .find(|e| e.predicate == predicate && e.direction == direction)
    }
}

/// Composite answer for one element selection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElementAnalysis {
    pub element_id: ElementId,
    pub label: String,
    pub relationships: Vec<RelationshipRecord>,
    pub chains: Vec<ChainRecord>,
    pub weights: WeightAnalysis,
}
