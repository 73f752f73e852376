//! # Ethica Graph
//!
//! Relationship weighting and transitive-influence analysis over a loaded
//! fact base.
//!
//! ## Features
//!
//! - **Relationship queries** - every asserted and inferred link of an element
//! - **Dependency chains** - derived `dependsOn` / `transitivelyDependsOn` edges
//! - **Weight analysis** - inbound/outbound weight, influence, foundational score
//! - **Authority reports** - most-cited elements, multi-proof propositions, reductio usage
//!
//! ## Architecture
//!
//! ```text
//! FactStore (asserted) ─┬──────────────────────────────┐
//!                       │                              │
//!                       ├──> InferenceOracle           │
//!                       │      └─ FactStore (derived)  │
//!                       │               │              │
//!                       ├──> RelationshipGraph <───────┘
//!                       │      ├─ query(id)
//!                       │      └─ find_chains(id)
//!                       │
//!                       ├──> WeightAnalyzer (asserted only)
//!                       │      └─ analyze(id)
//!                       │
//!                       └──> reports / validation
//! ```
//!
//! [`Session`] ties the pieces together and holds the derived store as an
//! atomically replaced snapshot.

mod analyzer;
mod config;
mod error;
mod graph;
mod reports;
mod session;
mod types;
mod validation;

pub use analyzer::WeightAnalyzer;
pub use config::AnalyzerConfig;
pub use error::{GraphError, Result};
pub use graph::RelationshipGraph;
pub use reports::{
    citation_counts, multi_proof_propositions, predicate_histogram, reductio_subjects,
    CitationCount, PredicateCount, ProofCount,
};
pub use session::Session;
pub use types::{
    BreakdownEntry, ChainKind, ChainRecord, Direction, ElementAnalysis, PathStep,
    RelationshipRecord, WeightAnalysis,
};
pub use validation::{
    statistics, validate, IssueKind, StoreStatistics, TypeCount, ValidationIssue,
    ValidationReport,
};

pub use ethica_facts as facts;
