//! Hintikka CLI: check, update and inspect epistemic models from the shell.

mod commands;
mod manifest;

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use hintikka_session::{Representation, SessionConfig};
use tracing_subscriber::EnvFilter;

use manifest::HintikkaManifest;

#[derive(Parser)]
#[command(name = "hintikka", version, about = "Dynamic epistemic logic model checker")]
struct Cli {
    /// Log at debug level (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,
    /// Use this hintikka.toml instead of searching upward from the current directory
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Model representation; defaults to the manifest setting
    #[arg(long, global = true, value_enum)]
    representation: Option<ReprArg>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, ValueEnum)]
enum ReprArg {
    /// Explicit worlds and edges for every agent
    Explicit,
    /// One agent with an implicit total relation
    Agent,
}

impl From<ReprArg> for Representation {
    fn from(arg: ReprArg) -> Self {
        match arg {
            ReprArg::Explicit => Representation::Explicit,
            ReprArg::Agent => Representation::Agent,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate formulas at the pointed world of a model
    Check {
        /// Model description (JSON)
        model: PathBuf,
        /// Formulas in s-expression syntax, e.g. "(K a p)"
        formulas: Vec<String>,
        /// JSON file with an array of query objects
        #[arg(long)]
        queries: Option<PathBuf>,
        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },
    /// Tell the default agent a valuation, then evaluate formulas
    Update {
        /// Model description (JSON)
        model: PathBuf,
        /// Literals such as `p`, `!q` or `r=false`
        facts: Vec<String>,
        /// Formula to evaluate after the update (repeatable)
        #[arg(long = "check")]
        checks: Vec<String>,
        #[arg(long)]
        json: bool,
    },
    /// Publicly announce formulas, in order
    Announce {
        /// Model description (JSON)
        model: PathBuf,
        /// Formulas to announce
        formulas: Vec<String>,
        /// Named action from the description to perform before the formulas (repeatable)
        #[arg(long = "action")]
        actions: Vec<String>,
        /// Formula to evaluate afterwards (repeatable)
        #[arg(long = "check")]
        checks: Vec<String>,
        /// Write the resulting explicit model as a description
        #[arg(long)]
        export: Option<PathBuf>,
        #[arg(long)]
        json: bool,
    },
    /// Compute the bisimulation contraction of a model
    Contract {
        /// Model description (JSON)
        model: PathBuf,
        /// Agents to contract for (default: every agent of the model)
        #[arg(long, value_delimiter = ',')]
        agents: Vec<String>,
        /// Write the contracted model as a description
        #[arg(long)]
        output: Option<PathBuf>,
        #[arg(long)]
        json: bool,
    },
    /// Show worlds, relations and statistics of a model
    Inspect {
        /// Model description (JSON)
        model: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Find a shortest accessibility path between two worlds
    Path {
        /// Model description (JSON)
        model: PathBuf,
        /// Source world
        from: String,
        /// Target world; without it, list distances from the source
        to: Option<String>,
        /// Hop limit when listing distances
        #[arg(long, default_value_t = usize::MAX)]
        max_distance: usize,
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = run(cli);
    if let Err(e) = result {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?;
    let mut config = load_config(&cwd, cli.config.as_deref())?;
    if let Some(repr) = cli.representation {
        config.representation = repr.into();
    }

    match cli.command {
        Commands::Check {
            model,
            formulas,
            queries,
            json,
        } => commands::check::run(&model, config, &formulas, queries.as_deref(), json),

        Commands::Update {
            model,
            facts,
            checks,
            json,
        } => commands::update::run(&model, config, &facts, &checks, json),

        Commands::Announce {
            model,
            formulas,
            actions,
            checks,
            export,
            json,
        } => commands::announce::run(
            &model,
            config,
            &commands::announce::Steps {
                actions: &actions,
                formulas: &formulas,
                checks: &checks,
            },
            export.as_deref(),
            json,
        ),

        Commands::Contract {
            model,
            agents,
            output,
            json,
        } => commands::contract::run(&model, &config, &agents, output.as_deref(), json),

        Commands::Inspect { model, json } => commands::inspect::run(&model, &config, json),

        Commands::Path {
            model,
            from,
            to,
            max_distance,
            json,
        } => commands::path::run(&model, &config, &from, to.as_deref(), max_distance, json),
    }
}

/// `--config` wins; otherwise the nearest hintikka.toml; otherwise defaults.
fn load_config(cwd: &Path, explicit: Option<&Path>) -> anyhow::Result<SessionConfig> {
    if let Some(path) = explicit {
        let manifest = HintikkaManifest::load(path)?;
        return Ok(manifest.session);
    }
    match HintikkaManifest::find_and_load(cwd)? {
        Some((manifest, dir)) => {
            tracing::debug!(dir = %dir.display(), "using hintikka.toml");
            Ok(manifest.session)
        }
        None => Ok(SessionConfig::default()),
    }
}
