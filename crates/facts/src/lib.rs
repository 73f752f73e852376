//! # Ethica Facts
//!
//! Typed fact base for the relationship analyzer: the element model, the
//! closed predicate vocabulary, the append-only [`FactStore`], the N3 loader
//! and the inference-oracle seam.
//!
//! ## Architecture
//!
//! ```text
//! N3 text
//!     │
//!     ├──> n3::parse_document ──> Statement[] ──> FactStore (asserted)
//!     │
//!     └──> InferenceOracle::infer(asserted, RuleSet)
//!            └──> Statement[] (derived vocabulary only) ──> FactStore (derived)
//! ```
//!
//! Both stores share the same [`Statement`] model. Stores are write-once:
//! a new reasoning pass produces a new derived store instead of mutating the
//! old one.

mod element;
mod error;
pub mod n3;
mod oracle;
mod predicate;
mod statement;
mod store;

pub use element::{Category, Element, ElementCatalog, ElementId, IdParts};
pub use error::{FactsError, OracleError, Result};
pub use oracle::{
    ensure_derived, FixedRuleOracle, InferenceOracle, Rule, RuleSet, StaticOracle,
    LOGICAL_DEPENDENCIES,
};
pub use predicate::{Predicate, PredicateInfo};
pub use statement::Statement;
pub use store::FactStore;

/// Parse an N3 document straight into a store
pub fn load_store(text: &str) -> Result<FactStore> {
    let doc = n3::parse_document(text)?;
    Ok(FactStore::from_statements(doc.statements))
}
