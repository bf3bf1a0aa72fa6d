use clap::{Args, Parser, Subcommand, ValueEnum};
use shopfit::engine::config::Algorithm;
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "shopfit - lay out tools on a workshop floor against safety and workflow research.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads used to score candidate layouts.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search for a tool layout and write the best one found.
    Optimize(OptimizeArgs),
    /// Inspect research data files.
    Research(ResearchArgs),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum AlgorithmArg {
    Grid,
    Annealing,
    Genetic,
}

impl From<AlgorithmArg> for Algorithm {
    fn from(arg: AlgorithmArg) -> Self {
        match arg {
            AlgorithmArg::Grid => Algorithm::GridRepair,
            AlgorithmArg::Annealing => Algorithm::SimulatedAnnealing,
            AlgorithmArg::Genetic => Algorithm::Genetic,
        }
    }
}

/// Arguments for the `optimize` subcommand.
#[derive(Args, Debug)]
pub struct OptimizeArgs {
    // --- Workshop ---
    /// Floor size in inches as LENGTHxWIDTH (e.g., 213x103).
    #[arg(short = 'f', long, required = true, value_name = "LxW", value_parser = parse_floor_size)]
    pub floor: (f64, f64),

    /// Ceiling height in inches.
    #[arg(long, default_value_t = 96.0, value_name = "INCHES")]
    pub height: f64,

    /// Workshop name stored with the layout.
    #[arg(long, default_value = "Workshop", value_name = "NAME")]
    pub name: String,

    // --- Inputs ---
    /// Tool catalog CSV. Defaults to the built-in eight-tool roster.
    #[arg(short, long, value_name = "PATH")]
    pub tools: Option<PathBuf>,

    /// Mark these tool ids as mobile (comma separated).
    #[arg(short, long, value_delimiter = ',', value_name = "ID,...")]
    pub mobile: Vec<String>,

    /// Research data TOML. Defaults to the built-in research tables.
    #[arg(short, long, value_name = "PATH")]
    pub research: Option<PathBuf>,

    /// Search configuration TOML.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    // --- Search overrides ---
    /// Override the search algorithm.
    #[arg(short, long, value_enum)]
    pub algorithm: Option<AlgorithmArg>,

    /// Override the iteration budget.
    #[arg(long, value_name = "INT")]
    pub max_iterations: Option<usize>,

    /// Override the wall-clock budget, in seconds.
    #[arg(long, value_name = "SECS")]
    pub time_limit: Option<f64>,

    /// Override the random seed.
    #[arg(long, value_name = "INT")]
    pub seed: Option<u64>,

    /// Restrict workflow rules to these project types (repeatable).
    #[arg(short = 'p', long = "project-type", value_name = "TYPE")]
    pub project_types: Vec<String>,

    // --- Output ---
    /// Write the best layout as TOML to this path.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

/// Arguments for the `research` subcommand.
#[derive(Args, Debug)]
pub struct ResearchArgs {
    #[command(subcommand)]
    pub command: ResearchCommands,
}

#[derive(Subcommand, Debug)]
pub enum ResearchCommands {
    /// Load a research file and report what it contains and what was skipped.
    Check {
        #[arg(required = true, value_name = "PATH")]
        path: PathBuf,
    },
    /// List the constraints built from a research file for the given roster.
    Constraints {
        /// Research data TOML. Defaults to the built-in research tables.
        #[arg(value_name = "PATH")]
        path: Option<PathBuf>,
        /// Restrict workflow rules to these project types (repeatable).
        #[arg(short = 'p', long = "project-type", value_name = "TYPE")]
        project_types: Vec<String>,
    },
}

fn parse_floor_size(raw: &str) -> Result<(f64, f64), String> {
    let (length, width) = raw
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected LENGTHxWIDTH, got '{raw}'"))?;
    let parse = |part: &str| {
        part.trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite() && *v >= 0.0)
            .ok_or_else(|| format!("'{}' is not a non-negative length", part.trim()))
    };
    Ok((parse(length)?, parse(width)?))
}
