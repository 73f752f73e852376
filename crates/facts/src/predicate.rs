use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed vocabulary of relationship predicates.
///
/// The asserted family carries author-supplied facts; the derived family is
/// only ever produced by an inference oracle. Wire names are case-sensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Predicate {
    #[serde(rename = "cites")]
    Cites,
    #[serde(rename = "necessarilyFollows")]
    NecessarilyFollows,
    #[serde(rename = "clearlyfollowsFrom")]
    ClearlyFollowsFrom,
    #[serde(rename = "evidentFrom")]
    EvidentFrom,
    #[serde(rename = "provedBy")]
    ProvedBy,
    #[serde(rename = "appliesResultFrom")]
    AppliesResultFrom,
    #[serde(rename = "refutedByAbsurdity")]
    RefutedByAbsurdity,
    #[serde(rename = "buildsUpon")]
    BuildsUpon,
    #[serde(rename = "groundedIn")]
    GroundedIn,
    #[serde(rename = "demonstratedBy")]
    DemonstratedBy,
    #[serde(rename = "corollaryOf")]
    CorollaryOf,
    #[serde(rename = "partOf")]
    PartOf,
    /// rdf:type, written `a` in N3
    #[serde(rename = "a")]
    Type,

    #[serde(rename = "transitivelyDependsOn")]
    TransitivelyDependsOn,
    #[serde(rename = "dependsOn")]
    DependsOn,
    #[serde(rename = "circularArgument")]
    CircularArgument,
    #[serde(rename = "derivedFrom")]
    DerivedFrom,
    #[serde(rename = "explains")]
    Explains,
}

/// Static properties of one predicate
#[derive(Debug, Clone, Copy)]
pub struct PredicateInfo {
    pub wire: &'static str,
    /// Human-facing name used when the queried element is the object
    pub inverse: Option<&'static str>,
    /// Default weight in the weight analyzer (unweighted when `None`)
    pub weight: Option<f64>,
    pub derived: bool,
    /// Counted by the semantic predicate histogram
    pub semantic: bool,
}

const fn asserted(
    wire: &'static str,
    inverse: &'static str,
    weight: Option<f64>,
    semantic: bool,
) -> PredicateInfo {
    PredicateInfo {
        wire,
        inverse: Some(inverse),
        weight,
        derived: false,
        semantic,
    }
}

const fn derived(wire: &'static str) -> PredicateInfo {
    PredicateInfo {
        wire,
        inverse: None,
        weight: None,
        derived: true,
        semantic: false,
    }
}

impl Predicate {
    pub const ALL: &'static [Predicate] = &[
        Predicate::Cites,
        Predicate::NecessarilyFollows,
        Predicate::ClearlyFollowsFrom,
        Predicate::EvidentFrom,
        Predicate::ProvedBy,
        Predicate::AppliesResultFrom,
        Predicate::RefutedByAbsurdity,
        Predicate::BuildsUpon,
        Predicate::GroundedIn,
        Predicate::DemonstratedBy,
        Predicate::CorollaryOf,
        Predicate::PartOf,
        Predicate::Type,
        Predicate::TransitivelyDependsOn,
        Predicate::DependsOn,
        Predicate::CircularArgument,
        Predicate::DerivedFrom,
        Predicate::Explains,
    ];

    pub const ASSERTED: &'static [Predicate] = &[
        Predicate::Cites,
        Predicate::NecessarilyFollows,
        Predicate::ClearlyFollowsFrom,
        Predicate::EvidentFrom,
        Predicate::ProvedBy,
        Predicate::AppliesResultFrom,
        Predicate::RefutedByAbsurdity,
        Predicate::BuildsUpon,
        Predicate::GroundedIn,
        Predicate::DemonstratedBy,
        Predicate::CorollaryOf,
        Predicate::PartOf,
        Predicate::Type,
    ];

    pub const DERIVED: &'static [Predicate] = &[
        Predicate::TransitivelyDependsOn,
        Predicate::DependsOn,
        Predicate::CircularArgument,
        Predicate::DerivedFrom,
        Predicate::Explains,
    ];

    /// Predicates listed by the semantic histogram, in report order
    pub const SEMANTIC: &'static [Predicate] = &[
        Predicate::ClearlyFollowsFrom,
        Predicate::NecessarilyFollows,
        Predicate::GroundedIn,
        Predicate::EvidentFrom,
        Predicate::RefutedByAbsurdity,
        Predicate::AppliesResultFrom,
        Predicate::DemonstratedBy,
        Predicate::ProvedBy,
        Predicate::BuildsUpon,
    ];

    pub fn info(self) -> PredicateInfo {
        match self {
            Predicate::Cites => asserted("cites", "citedBy", Some(1.0), false),
            Predicate::NecessarilyFollows => {
                asserted("necessarilyFollows", "necessarilyFollowedBy", Some(3.0), true)
            }
            Predicate::ClearlyFollowsFrom => {
                asserted("clearlyfollowsFrom", "clearlyYields", Some(2.0), true)
            }
            Predicate::EvidentFrom => asserted("evidentFrom", "makesEvident", None, true),
            Predicate::ProvedBy => asserted("provedBy", "proves", Some(2.0), true),
            Predicate::AppliesResultFrom => {
                asserted("appliesResultFrom", "resultAppliedBy", Some(2.0), true)
            }
            Predicate::RefutedByAbsurdity => {
                asserted("refutedByAbsurdity", "refutesByAbsurdity", Some(1.5), true)
            }
            Predicate::BuildsUpon => asserted("buildsUpon", "builtUponBy", Some(1.5), true),
            Predicate::GroundedIn => asserted("groundedIn", "grounds", Some(2.0), true),
            Predicate::DemonstratedBy => {
                asserted("demonstratedBy", "demonstrates", Some(2.0), true)
            }
            Predicate::CorollaryOf => asserted("corollaryOf", "hasCorollary", None, false),
            Predicate::PartOf => asserted("partOf", "hasPart", None, false),
            Predicate::Type => asserted("a", "hasInstance", None, false),
            Predicate::TransitivelyDependsOn => derived("transitivelyDependsOn"),
            Predicate::DependsOn => derived("dependsOn"),
            Predicate::CircularArgument => derived("circularArgument"),
            Predicate::DerivedFrom => derived("derivedFrom"),
            Predicate::Explains => derived("explains"),
        }
    }

    pub fn wire_name(self) -> &'static str {
        self.info().wire
    }

    pub fn is_derived(self) -> bool {
        self.info().derived
    }

    pub fn default_weight(self) -> Option<f64> {
        self.info().weight
    }

    /// Name used for a statement seen from its object's side.
    ///
    /// Predicates without a registered inverse fall back to `inverse_<wire>`.
    pub fn inverse_name(self) -> String {
        match self.info().inverse {
            Some(name) => name.to_string(),
            None => format!("inverse_{}", self.wire_name()),
        }
    }

    /// Look up a predicate by exact wire name. `rdf:type` is accepted for `a`.
    pub fn from_wire(name: &str) -> Option<Predicate> {
        if name == "rdf:type" {
            return Some(Predicate::Type);
        }
        Predicate::ALL
            .iter()
            .copied()
            .find(|p| p.wire_name() == name)
    }

    /// Predicates carrying a default weight, in vocabulary order
    pub fn weighted() -> impl Iterator<Item = (Predicate, f64)> {
        Predicate::ASSERTED
            .iter()
            .filter_map(|p| p.default_weight().map(|w| (*p, w)))
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}
