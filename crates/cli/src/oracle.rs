use anyhow::Context as AnyhowContext;
use ethica_facts::n3::{self, DEFAULT_NAMESPACE, DEFAULT_PREFIX};
use ethica_facts::{
    FactStore, InferenceOracle, OracleError, Predicate, Rule, RuleSet, Statement,
    LOGICAL_DEPENDENCIES,
};
use ethica_graph::Session;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::runtime::Handle;

/// Slack for the blocking task on top of the reasoner's own deadline
const JOIN_GRACE: Duration = Duration::from_secs(2);

/// External reasoner process.
///
/// Facts and rules go to stdin as N3; stdout must hold only the newly derived
/// statements (e.g. `eye --nope --pass-only-new -`). The child is killed when
/// the deadline passes.
pub struct CommandOracle {
    program: String,
    args: Vec<String>,
    timeout: Duration,
    runtime: Handle,
}

impl CommandOracle {
    /// Must be called from within the tokio runtime
    pub fn new(command_line: &str, timeout: Duration) -> anyhow::Result<Self> {
        let mut parts = command_line.split_whitespace().map(str::to_string);
        let program = parts
            .next()
            .context("--reasoner must name a program")?;
        let runtime = Handle::try_current().context("reasoner requires a tokio runtime")?;

        Ok(Self {
            program,
            args: parts.collect(),
            timeout,
            runtime,
        })
    }

    async fn run(&self, input: String) -> Result<String, OracleError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|err| OracleError::Failed(format!("cannot start {}: {err}", self.program)))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| OracleError::Failed("reasoner stdin unavailable".to_string()))?;
        let feed = async move {
            let written = stdin.write_all(input.as_bytes()).await;
            drop(stdin);
            written
        };

        let (fed, output) = tokio::time::timeout(self.timeout, async move {
            tokio::join!(feed, child.wait_with_output())
        })
        .await
        .map_err(|_| OracleError::Timeout(self.timeout.as_secs()))?;

        let output =
            output.map_err(|err| OracleError::Failed(format!("reasoner I/O failed: {err}")))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OracleError::Failed(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }
        if let Err(err) = fed {
            log::debug!("Reasoner closed stdin early: {err}");
        }

        String::from_utf8(output.stdout)
            .map_err(|_| OracleError::Failed("reasoner output is not UTF-8".to_string()))
    }
}

impl InferenceOracle for CommandOracle {
    fn name(&self) -> &str {
        &self.program
    }

    /// Blocks the calling thread; run it off the async workers
    fn infer(&self, facts: &FactStore, rules: &RuleSet) -> Result<Vec<Statement>, OracleError> {
        let mut input = n3::to_n3(facts.statements(), DEFAULT_PREFIX, DEFAULT_NAMESPACE);
        input.push('\n');
        input.push_str(&rules_to_n3(rules, DEFAULT_PREFIX));
        log::debug!(
            "Sending {} statements and {} rules to {}",
            facts.len(),
            rules.len(),
            self.program
        );

        let output = self.runtime.block_on(self.run(input))?;
        let doc = n3::parse_document(&output)
            .map_err(|err| OracleError::Failed(format!("unreadable reasoner output: {err}")))?;
        Ok(doc.statements)
    }
}

/// N3 rule blocks for the given rule set
pub fn rules_to_n3(rules: &RuleSet, prefix: &str) -> String {
    let p = |predicate: Predicate| format!("{prefix}:{}", predicate.wire_name());
    let mut out = String::new();
    let mut rule = |premise: String, conclusion: String| {
        out.push_str(&format!("{{ {premise} }} => {{ {conclusion} }} .\n"));
    };

    for r in rules.iter() {
        match r {
            Rule::CitationDependency => rule(
                format!("?a {} ?b", p(Predicate::Cites)),
                format!("?a {} ?b", p(Predicate::DependsOn)),
            ),
            Rule::LogicalDependency => {
                for &predicate in LOGICAL_DEPENDENCIES {
                    rule(
                        format!("?a {} ?b", p(predicate)),
                        format!("?a {} ?b", p(Predicate::DependsOn)),
                    );
                }
            }
            Rule::TransitiveDependency => {
                let transitive = p(Predicate::TransitivelyDependsOn);
                rule(
                    format!("?a {} ?b", p(Predicate::DependsOn)),
                    format!("?a {transitive} ?b"),
                );
                rule(
                    format!("?a {transitive} ?b . ?b {transitive} ?c"),
                    format!("?a {transitive} ?c"),
                );
            }
            Rule::CircularArgument => {
                let reductio = p(Predicate::RefutedByAbsurdity);
                rule(
                    format!("?x {reductio} ?y . ?y {reductio} ?x"),
                    format!("?x {} ?y", p(Predicate::CircularArgument)),
                );
            }
            Rule::ProofDerivation => {
                rule(
                    format!("?p {} ?q . ?q {} ?c", p(Predicate::ProvedBy), p(Predicate::Cites)),
                    format!("?p {} ?c", p(Predicate::DerivedFrom)),
                );
                rule(
                    format!("?c {} ?p", p(Predicate::CorollaryOf)),
                    format!("?c {} ?p", p(Predicate::DerivedFrom)),
                );
            }
            Rule::Explanation => rule(
                format!("?a {} ?b", p(Predicate::EvidentFrom)),
                format!("?b {} ?a", p(Predicate::Explains)),
            ),
        }
    }
    out
}

/// Run the oracle on a blocking task under a deadline and install its answer.
///
/// Any failure (including the deadline) leaves the session with an empty
/// derived store.
pub async fn reason_with_timeout(
    session: &Arc<Session>,
    oracle: Arc<dyn InferenceOracle>,
    timeout: Duration,
) -> usize {
    let name = oracle.name().to_string();
    let task = {
        let session = Arc::clone(session);
        tokio::task::spawn_blocking(move || oracle.infer(session.asserted(), &RuleSet::standard()))
    };

    let answer = match tokio::time::timeout(timeout + JOIN_GRACE, task).await {
        Ok(Ok(answer)) => answer,
        Ok(Err(err)) => Err(OracleError::Failed(format!("reasoning task aborted: {err}"))),
        Err(_) => Err(OracleError::Timeout(timeout.as_secs())),
    };
    session.accept(&name, answer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethica_facts::FixedRuleOracle;

    fn session() -> Arc<Session> {
        Arc::new(Session::from_asserted(FactStore::from_statements([
            Statement::new("A", Predicate::Cites, "B"),
            Statement::new("B", Predicate::GroundedIn, "C"),
        ])))
    }

    #[test]
    fn rule_blocks_are_skipped_by_the_loader() {
        let text = rules_to_n3(&RuleSet::standard(), DEFAULT_PREFIX);
        let doc = n3::parse_document(&format!(
            "@prefix ethics: <{DEFAULT_NAMESPACE}> .\n{text}"
        ))
        .unwrap();
        assert!(doc.statements.is_empty());
        // one block per logical predicate plus two each for transitivity and proofs
        assert_eq!(doc.rule_blocks, 1 + LOGICAL_DEPENDENCIES.len() + 2 + 1 + 2 + 1);
    }

    #[test]
    fn empty_command_line_is_rejected() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let _guard = runtime.enter();
        assert!(CommandOracle::new("   ", Duration::from_secs(1)).is_err());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn in_process_oracle_runs_on_blocking_task() {
        let session = session();
        let derived =
            reason_with_timeout(&session, Arc::new(FixedRuleOracle), Duration::from_secs(5)).await;
        assert!(derived > 0);
        assert_eq!(session.find_chains("A").len(), 3);
    }

    #[cfg(unix)]
    #[tokio::test(flavor = "multi_thread")]
    async fn missing_reasoner_degrades_to_empty_store() {
        let session = session();
        session.replace_derived(FactStore::from_statements([Statement::new(
            "A",
            Predicate::DependsOn,
            "B",
        )]));
        let oracle = CommandOracle::new("ethica-no-such-reasoner", Duration::from_secs(5)).unwrap();
        assert_eq!(
            reason_with_timeout(&session, Arc::new(oracle), Duration::from_secs(5)).await,
            0
        );
        assert!(session.derived().is_empty());
    }

    #[cfg(unix)]
    #[tokio::test(flavor = "multi_thread")]
    async fn slow_reasoner_times_out() {
        let session = session();
        let oracle = CommandOracle::new("sleep 10", Duration::from_secs(1)).unwrap();
        let started = std::time::Instant::now();
        assert_eq!(
            reason_with_timeout(&session, Arc::new(oracle), Duration::from_secs(1)).await,
            0
        );
        assert!(started.elapsed() < Duration::from_secs(5));
        assert!(session.derived().is_empty());
    }

    #[cfg(unix)]
    #[tokio::test(flavor = "multi_thread")]
    async fn reasoner_output_becomes_derived_store() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("reasoner.sh");
        std::fs::write(
            &script,
            "cat > /dev/null\n\
             echo '@prefix ethics: <http://example.org/ethics#> .'\n\
             echo 'ethics:A ethics:transitivelyDependsOn ethics:C .'\n",
        )
        .unwrap();

        let session = session();
        let oracle =
            CommandOracle::new(&format!("sh {}", script.display()), Duration::from_secs(5)).unwrap();
        assert_eq!(
            reason_with_timeout(&session, Arc::new(oracle), Duration::from_secs(5)).await,
            1
        );
        let chains = session.find_chains("A");
        assert_eq!(chains.len(), 1);
        assert_eq!(chains[0].end.as_str(), "C");
    }
}
