use crate::element::ElementId;
use crate::error::OracleError;
use crate::predicate::Predicate;
use crate::statement::Statement;
use crate::store::FactStore;
use std::collections::{HashMap, HashSet, VecDeque};

/// Inference rules understood by the reasoning pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rule {
    /// `(a cites b)` ⇒ `(a dependsOn b)`
    CitationDependency,
    /// `(a p b)` for a logical-consequence predicate ⇒ `(a dependsOn b)`
    LogicalDependency,
    /// `dependsOn` closes into `transitivelyDependsOn`
    TransitiveDependency,
    /// `(x refutedByAbsurdity y) ∧ (y refutedByAbsurdity x)` ⇒ `(x circularArgument y)`
    CircularArgument,
    /// `(p provedBy q) ∧ (q cites c)` ⇒ `(p derivedFrom c)`; `(c corollaryOf p)` ⇒ `(c derivedFrom p)`
    ProofDerivation,
    /// `(a evidentFrom b)` ⇒ `(b explains a)`
    Explanation,
}

/// Predicates that count as a logical dependency of the subject on the object
pub const LOGICAL_DEPENDENCIES: &[Predicate] = &[
    Predicate::NecessarilyFollows,
    Predicate::ClearlyFollowsFrom,
    Predicate::AppliesResultFrom,
    Predicate::GroundedIn,
    Predicate::BuildsUpon,
];

/// Fixed set of rules handed to an oracle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// Every documented rule
    pub fn standard() -> Self {
        Self::new(vec![
            Rule::CitationDependency,
            Rule::LogicalDependency,
            Rule::TransitiveDependency,
            Rule::CircularArgument,
            Rule::ProofDerivation,
            Rule::Explanation,
        ])
    }

    pub fn contains(&self, rule: Rule) -> bool {
        self.rules.contains(&rule)
    }

    pub fn iter(&self) -> impl Iterator<Item = Rule> + '_ {
        self.rules.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::standard()
    }
}

/// Black-box reasoner: facts × rules → newly derivable facts.
pub trait InferenceOracle: Send + Sync {
    fn name(&self) -> &str;

    fn infer(&self, facts: &FactStore, rules: &RuleSet) -> Result<Vec<Statement>, OracleError>;
}

/// Reject oracle output that strays outside the derived vocabulary
pub fn ensure_derived(statements: Vec<Statement>) -> Result<Vec<Statement>, OracleError> {
    if let Some(foreign) = statements.iter().find(|st| !st.is_derived()) {
        return Err(OracleError::ForeignPredicate(foreign.to_string()));
    }
    Ok(statements)
}

/// Oracle that always answers with the same statements
#[derive(Debug, Clone, Default)]
pub struct StaticOracle {
    statements: Vec<Statement>,
}

impl StaticOracle {
    pub fn new(statements: Vec<Statement>) -> Self {
        Self { statements }
    }
}

impl InferenceOracle for StaticOracle {
    fn name(&self) -> &str {
        "static"
    }

    fn infer(&self, _facts: &FactStore, _rules: &RuleSet) -> Result<Vec<Statement>, OracleError> {
        Ok(self.statements.clone())
    }
}

/// In-process forward chainer for the fixed [`Rule`] set.
///
/// The rules are stratified (only `TransitiveDependency` feeds on derived
/// facts), so one pass plus a reachability closure reaches the fixpoint.
/// Output is deduplicated and ordered by first derivation.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedRuleOracle;

struct Derivations {
    statements: Vec<Statement>,
    seen: HashSet<Statement>,
}

impl Derivations {
    fn add(&mut self, subject: &ElementId, predicate: Predicate, object: &ElementId) {
        let statement = Statement::new(subject.clone(), predicate, object.clone());
        if self.seen.insert(statement.clone()) {
            self.statements.push(statement);
        }
    }
}

impl InferenceOracle for FixedRuleOracle {
    fn name(&self) -> &str {
        "fixed-rules"
    }

    fn infer(&self, facts: &FactStore, rules: &RuleSet) -> Result<Vec<Statement>, OracleError> {
        let mut out = Derivations {
            statements: Vec::new(),
            seen: HashSet::new(),
        };

        for st in facts.statements() {
            let (s, o) = (&st.subject, &st.object);
            match st.predicate {
                Predicate::Cites if rules.contains(Rule::CitationDependency) => {
                    out.add(s, Predicate::DependsOn, o);
                }
                p if LOGICAL_DEPENDENCIES.contains(&p) && rules.contains(Rule::LogicalDependency) => {
                    out.add(s, Predicate::DependsOn, o);
                }
                Predicate::RefutedByAbsurdity if rules.contains(Rule::CircularArgument) => {
                    let mutual = facts.count_matching(
                        Some(o.as_str()),
                        Some(Predicate::RefutedByAbsurdity),
                        Some(s.as_str()),
                    ) > 0;
                    if mutual {
                        out.add(s, Predicate::CircularArgument, o);
                    }
                }
                Predicate::ProvedBy if rules.contains(Rule::ProofDerivation) => {
                    for cited in facts.matching(Some(o.as_str()), Some(Predicate::Cites), None) {
                        out.add(s, Predicate::DerivedFrom, &cited.object);
                    }
                }
                Predicate::CorollaryOf if rules.contains(Rule::ProofDerivation) => {
                    out.add(s, Predicate::DerivedFrom, o);
                }
                Predicate::EvidentFrom if rules.contains(Rule::Explanation) => {
                    out.add(o, Predicate::Explains, s);
                }
                _ => {}
            }
        }

        if rules.contains(Rule::TransitiveDependency) {
            close_dependencies(facts, &mut out);
        }

        log::debug!(
            "Fixed-rule inference derived {} statements from {}",
            out.statements.len(),
            facts.len()
        );
        Ok(out.statements)
    }
}

/// Add `transitivelyDependsOn` for every id reachable over `dependsOn` edges
fn close_dependencies(facts: &FactStore, out: &mut Derivations) {
    let mut order: Vec<ElementId> = Vec::new();
    let mut edges: HashMap<ElementId, Vec<ElementId>> = HashMap::new();
    let direct = facts
        .matching(None, Some(Predicate::DependsOn), None)
        .into_iter()
        .cloned()
        .chain(
            out.statements
                .iter()
                .filter(|st| st.predicate == Predicate::DependsOn)
                .cloned(),
        )
        .collect::<Vec<_>>();

    for st in direct {
        let targets = edges.entry(st.subject.clone()).or_insert_with(|| {
            order.push(st.subject.clone());
            Vec::new()
        });
        targets.push(st.object);
    }

    for source in &order {
        let mut visited: HashSet<&ElementId> = HashSet::new();
        let mut queue: VecDeque<&ElementId> = VecDeque::new();
        queue.push_back(source);

        while let Some(current) = queue.pop_front() {
            let Some(targets) = edges.get(current) else {
                continue;
            };
            for target in targets {
                if visited.insert(target) {
                    out.add(source, Predicate::TransitivelyDependsOn, target);
                    queue.push_back(target);
                }
            }
        }
    }
}
