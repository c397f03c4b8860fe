//! Binary entry point for the `rbtree` CLI.
#![forbid(unsafe_code)]

mod config;
mod ui;

use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use paged_rbtree::{
    admin::{stats, verify, VerifyLevel},
    cli::{run_load, LoadConfig, LoadSummary},
    keys::jenkins_one_at_a_time,
    tree::{RbTree, TreeOptions},
};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use config::CliConfig;
use ui::{Theme, Ui};

#[derive(Parser, Debug)]
#[command(
    name = "rbtree",
    version,
    about = "Load newline-delimited records into a paged red-black tree",
    disable_help_subcommand = true
)]
struct Cli {
    #[arg(
        long,
        global = true,
        value_enum,
        help = "Output format for structured responses [default: text]"
    )]
    format: Option<OutputFormat>,

    #[arg(
        long,
        global = true,
        value_name = "N",
        help = "log2 of the node slots allocated per storage row"
    )]
    row_shift: Option<u32>,

    #[arg(
        long,
        global = true,
        value_name = "FILE",
        env = "RBTREE_CONFIG",
        help = "Config file (defaults to <config dir>/paged-rbtree/config.toml)"
    )]
    config: Option<PathBuf>,

    #[arg(
        long,
        global = true,
        value_name = "FILTER",
        help = "Log filter, e.g. `debug` or `paged_rbtree=trace` (overrides RUST_LOG)"
    )]
    log_level: Option<String>,

    #[arg(long, global = true, value_enum, help = "Color theme [default: auto]")]
    theme: Option<Theme>,

    #[arg(long, short, global = true, help = "Plain output without icons or spinners")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Insert every record and print a load summary
    Load {
        #[arg(value_name = "INPUT", help = "Input file (stdin when omitted)")]
        input: Option<PathBuf>,
        #[arg(long, value_name = "FILE", help = "Write the tree as Graphviz DOT")]
        export: Option<PathBuf>,
    },
    /// Load records and check every tree invariant
    Verify {
        #[arg(value_name = "INPUT", help = "Input file (stdin when omitted)")]
        input: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = VerifyLevelArg::Full)]
        level: VerifyLevelArg,
    },
    /// Load records and report tree shape and storage usage
    Stats {
        #[arg(value_name = "INPUT", help = "Input file (stdin when omitted)")]
        input: Option<PathBuf>,
    },
    /// Print the ordering key of each string
    Hash {
        #[arg(value_name = "STRING", required = true)]
        strings: Vec<String>,
    },
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum VerifyLevelArg {
    Fast,
    Full,
}

impl From<VerifyLevelArg> for VerifyLevel {
    fn from(value: VerifyLevelArg) -> Self {
        match value {
            VerifyLevelArg::Fast => VerifyLevel::Fast,
            VerifyLevelArg::Full => VerifyLevel::Full,
        }
    }
}

/// Effective settings after merging the config file and flags.
struct Settings {
    format: OutputFormat,
    tree: TreeOptions,
    ui: Ui,
}

#[derive(Serialize)]
struct HashEntry<'a> {
    input: &'a str,
    key: u64,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let config = CliConfig::load(cli.config.clone())?;
    init_tracing(cli.log_level.as_deref(), config.log_level())?;
    debug!(path = ?config.path(), "cli.config.loaded");

    let settings = resolve_settings(&cli, &config);
    match cli.command {
        Command::Load { input, export } => {
            let (_, summary) = load(&settings, input, export)?;
            emit(settings.format, &summary, || {
                settings.ui.load_summary(&summary)
            })?;
        }
        Command::Verify { input, level } => {
            let (tree, _) = load(&settings, input, None)?;
            let report = verify(&tree, level.into());
            emit(settings.format, &report, || {
                settings.ui.verify_report(&report)
            })?;
            if !report.success {
                std::process::exit(2);
            }
        }
        Command::Stats { input } => {
            let (tree, _) = load(&settings, input, None)?;
            let report = stats(&tree);
            emit(settings.format, &report, || {
                settings.ui.stats_report(&report)
            })?;
        }
        Command::Hash { strings } => {
            let entries: Vec<HashEntry<'_>> = strings
                .iter()
                .map(|s| HashEntry {
                    input: s.as_str(),
                    key: jenkins_one_at_a_time(s.as_bytes()),
                })
                .collect();
            emit(settings.format, &entries, || {
                for entry in &entries {
                    println!("{:#018x}  {}", entry.key, entry.input);
                }
            })?;
        }
    }

    Ok(())
}

/// `--log-level` wins, then `RUST_LOG`, then the config file, then `warn`.
fn init_tracing(flag: Option<&str>, config: Option<&str>) -> Result<(), Box<dyn Error>> {
    let filter = match flag {
        Some(directive) => parse_filter(directive)?,
        None => match EnvFilter::try_from_default_env() {
            Ok(filter) => filter,
            Err(_) => parse_filter(config.unwrap_or("warn"))?,
        },
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| format!("failed to install log subscriber: {err}"))?;
    Ok(())
}

fn parse_filter(directive: &str) -> Result<EnvFilter, String> {
    EnvFilter::try_new(directive).map_err(|err| format!("invalid log filter '{directive}': {err}"))
}

fn resolve_settings(cli: &Cli, config: &CliConfig) -> Settings {
    let format = cli
        .format
        .or(config.format())
        .unwrap_or(OutputFormat::Text);
    let theme = cli.theme.or(config.theme()).unwrap_or(Theme::Auto);
    let mut tree = config.tree_options();
    if let Some(shift) = cli.row_shift {
        tree = tree.row_shift(shift);
    }
    Settings {
        format,
        tree,
        ui: Ui::new(theme, cli.quiet),
    }
}

fn load(
    settings: &Settings,
    input: Option<PathBuf>,
    export: Option<PathBuf>,
) -> Result<(RbTree<String>, LoadSummary), Box<dyn Error>> {
    let cfg = LoadConfig {
        input,
        export,
        tree: settings.tree.clone(),
    };
    let progress = settings.ui.load_progress();
    let result = run_load(&cfg, |read| progress.records(read))?;
    progress.done();
    Ok(result)
}

fn emit<T, F>(format: OutputFormat, value: &T, printer: F) -> Result<(), Box<dyn Error>>
where
    T: Serialize,
    F: FnOnce(),
{
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(value)?;
            println!("{json}");
        }
        OutputFormat::Text => printer(),
    }
    Ok(())
}
