use anyhow::{bail, Context as AnyhowContext, Result};
use clap::{Args, Parser, Subcommand};
use ethica_facts::{ensure_derived, n3, FactStore, FixedRuleOracle, InferenceOracle};
use ethica_graph::{AnalyzerConfig, Session};
use oracle::{reason_with_timeout, CommandOracle};
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

mod oracle;
mod render;

fn print_stdout(text: &str) -> Result<()> {
    use std::io::Write;

    let mut stdout = io::stdout().lock();
    if let Err(err) = stdout
        .write_all(text.as_bytes())
        .and_then(|_| {
            if text.ends_with('\n') {
                Ok(())
            } else {
                stdout.write_all(b"\n")
            }
        })
        .and_then(|_| stdout.flush())
    {
        if err.kind() == io::ErrorKind::BrokenPipe {
            return Ok(());
        }
        return Err(err.into());
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    print_stdout(&serde_json::to_string_pretty(value)?)
}

#[derive(Parser)]
#[command(name = "ethica")]
#[command(about = "Relationship weighting and transitive influence analysis", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors
    #[arg(long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List every relationship touching an element
    Query(ElementArgs),

    /// List derived dependency chains of an element
    Chains(ElementArgs),

    /// Compute weights and foundational score of an element
    Analyze(ElementArgs),

    /// Relationships, chains and weights in one answer
    Inspect(ElementArgs),

    /// Citation and authority reports
    Report(ReportArgs),

    /// Check citations, hierarchy placement and N3 syntax
    Validate(SourceArgs),

    /// Summary statistics of the asserted facts
    Stats(SourceArgs),

    /// Run the reasoner and print the derived facts as N3
    Reason(SourceArgs),
}

#[derive(Args)]
struct SourceArgs {
    /// N3 fact file (repeatable)
    #[arg(long = "facts", required = true)]
    facts: Vec<PathBuf>,

    /// Pre-computed derived facts (N3); the reasoner is not run
    #[arg(long)]
    derived: Option<PathBuf>,

    /// Analyzer config (JSON); omitted fields keep their defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// External reasoner command line; reads N3 on stdin, writes new facts on stdout
    #[arg(long)]
    reasoner: Option<String>,

    /// Deadline for one reasoning pass
    #[arg(long, default_value_t = 30)]
    oracle_timeout_secs: u64,

    /// Skip reasoning; inferred relationships and chains stay empty
    #[arg(long)]
    no_reason: bool,

    /// Output as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct ElementArgs {
    /// Element id, e.g. I.prop.14
    id: String,

    #[command(flatten)]
    source: SourceArgs,
}

#[derive(Args)]
struct ReportArgs {
    /// Number of most-cited elements to list
    #[arg(long, default_value_t = 10)]
    top: usize,

    #[command(flatten)]
    source: SourceArgs,
}

impl Commands {
    fn source(&self) -> &SourceArgs {
        match self {
            Commands::Query(args)
            | Commands::Chains(args)
            | Commands::Analyze(args)
            | Commands::Inspect(args) => &args.source,
            Commands::Report(args) => &args.source,
            Commands::Validate(args) | Commands::Stats(args) | Commands::Reason(args) => args,
        }
    }

    /// Commands whose answers read the derived store
    fn needs_derived(&self) -> bool {
        matches!(
            self,
            Commands::Query(_) | Commands::Chains(_) | Commands::Inspect(_) | Commands::Reason(_)
        )
    }
}

#[derive(Serialize)]
struct ReportOutput {
    most_cited: Vec<ethica_graph::CitationCount>,
    multi_proof: Vec<ethica_graph::ProofCount>,
    reductio: Vec<ethica_facts::ElementId>,
    semantic_relationships: Vec<ethica_graph::PredicateCount>,
}

#[derive(Serialize)]
struct LintOutput {
    path: PathBuf,
    report: n3::LintReport,
}

#[derive(Serialize)]
struct ValidateOutput {
    structure: ethica_graph::ValidationReport,
    syntax: Vec<LintOutput>,
}

struct Loaded {
    session: Arc<Session>,
    texts: Vec<(PathBuf, String)>,
}

fn load_facts(paths: &[PathBuf]) -> Result<(FactStore, Vec<(PathBuf, String)>)> {
    let mut store = FactStore::new();
    let mut texts = Vec::with_capacity(paths.len());

    for path in paths {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read facts from {}", path.display()))?;
        let doc = n3::parse_document(&text)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        log::debug!(
            "{}: {} statements, {} rule blocks skipped",
            path.display(),
            doc.statements.len(),
            doc.rule_blocks
        );
        for statement in doc.statements {
            store.insert(statement);
        }
        texts.push((path.clone(), text));
    }

    Ok((store, texts))
}

fn load_derived(path: &Path) -> Result<FactStore> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read derived facts from {}", path.display()))?;
    let doc = n3::parse_document(&text)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    let statements = ensure_derived(doc.statements)
        .with_context(|| format!("{} contains asserted facts", path.display()))?;
    Ok(FactStore::from_statements(statements))
}

async fn load(source: &SourceArgs, needs_derived: bool) -> Result<Loaded> {
    let config = match &source.config {
        Some(path) => AnalyzerConfig::from_path(path)
            .with_context(|| format!("Invalid config {}", path.display()))?,
        None => AnalyzerConfig::default(),
    };

    let (store, texts) = load_facts(&source.facts)?;
    let session = Arc::new(Session::from_asserted(store).with_config(config)?);

    if let Some(path) = &source.derived {
        session.replace_derived(load_derived(path)?);
    } else if needs_derived && !source.no_reason {
        let timeout = Duration::from_secs(source.oracle_timeout_secs);
        let oracle: Arc<dyn InferenceOracle> = match &source.reasoner {
            Some(command) => Arc::new(CommandOracle::new(command, timeout)?),
            None => Arc::new(FixedRuleOracle),
        };
        reason_with_timeout(&session, oracle, timeout).await;
    }

    Ok(Loaded { session, texts })
}

pub async fn main_entry() -> Result<()> {
    let mut cli = Cli::parse();

    // Keep stdout clean for JSON consumers
    if cli.command.source().json {
        cli.quiet = true;
    }

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    let source = cli.command.source();
    let json = source.json;
    let Loaded { session, texts } = load(source, cli.command.needs_derived()).await?;

    match &cli.command {
        Commands::Query(args) => {
            let records = session.query(&args.id);
            if json {
                print_json(&records)?;
            } else {
                print_stdout(&render::render_relationships(&session, &args.id, &records))?;
            }
        }
        Commands::Chains(args) => {
            let chains = session.find_chains(&args.id);
            if json {
                print_json(&chains)?;
            } else {
                print_stdout(&render::render_chains(&args.id, &chains))?;
            }
        }
        Commands::Analyze(args) => {
            let weights = session.analyze(&args.id);
            if json {
                print_json(&weights)?;
            } else {
                print_stdout(&render::render_weights(&weights))?;
            }
        }
        Commands::Inspect(args) => {
            let analysis = session.analyze_element(&args.id);
            if json {
                print_json(&analysis)?;
            } else {
                print_stdout(&render::render_inspection(&session, &analysis))?;
            }
        }
        Commands::Report(args) => {
            let output = ReportOutput {
                most_cited: session.citation_counts(args.top),
                multi_proof: session.multi_proof_propositions(),
                reductio: session.reductio_subjects(),
                semantic_relationships: session.predicate_histogram(),
            };
            if json {
                print_json(&output)?;
            } else {
                print_stdout(&render::render_report(
                    &session,
                    &output.most_cited,
                    &output.multi_proof,
                    &output.reductio,
                    &output.semantic_relationships,
                ))?;
            }
        }
        Commands::Validate(_) => {
            let structure = session.validate();
            let syntax: Vec<LintOutput> = texts
                .into_iter()
                .map(|(path, text)| LintOutput {
                    report: n3::lint(&text),
                    path,
                })
                .collect();
            let errors = structure.errors.len()
                + syntax.iter().map(|s| s.report.errors.len()).sum::<usize>();

            if json {
                print_json(&ValidateOutput { structure, syntax })?;
            } else {
                let lint: Vec<_> = syntax.into_iter().map(|s| (s.path, s.report)).collect();
                print_stdout(&render::render_validation(&structure, &lint))?;
            }
            if errors > 0 {
                bail!("Validation failed with {errors} error(s)");
            }
        }
        Commands::Stats(_) => {
            let stats = session.statistics();
            if json {
                print_json(&stats)?;
            } else {
                print_stdout(&render::render_statistics(&stats))?;
            }
        }
        Commands::Reason(_) => {
            let derived = session.derived();
            if json {
                print_json(&derived.statements())?;
            } else {
                print_stdout(&render::render_derived(derived.statements()))?;
            }
        }
    }

    Ok(())
}
