use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "geomcache", version)]
struct Cli {
    /// Log verbosity (written to stderr).
    #[arg(long, value_enum, global = true, default_value_t = LogLevel::Warn)]
    log_level: LogLevel,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replay a scenario against headless collaborators and print a JSON report.
    Replay(ReplayArgs),
    /// Validate backend options and print them with defaults filled in.
    CheckConfig(CheckConfigArgs),
}

#[derive(Parser, Debug)]
struct ReplayArgs {
    /// Input scenario JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Print compact JSON instead of pretty JSON.
    #[arg(long, default_value_t = false)]
    compact: bool,
}

#[derive(Parser, Debug)]
struct CheckConfigArgs {
    /// Input options JSON.
    #[arg(long = "in")]
    in_path: PathBuf,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::from(cli.log_level))
        .with_writer(std::io::stderr)
        .init();

    match cli.cmd {
        Command::Replay(args) => cmd_replay(args),
        Command::CheckConfig(args) => cmd_check_config(args),
    }
}

fn cmd_replay(args: ReplayArgs) -> anyhow::Result<()> {
    let scenario = geomcache::replay::Scenario::from_path(&args.in_path)?;
    let report = geomcache::replay::run_scenario(&scenario)
        .with_context(|| format!("replay '{}'", args.in_path.display()))?;

    let json = if args.compact {
        serde_json::to_string(&report)
    } else {
        serde_json::to_string_pretty(&report)
    }
    .context("serialize replay report")?;
    println!("{json}");
    Ok(())
}

fn cmd_check_config(args: CheckConfigArgs) -> anyhow::Result<()> {
    let opts = geomcache::BackendOpts::from_path(&args.in_path)?;
    let json = serde_json::to_string_pretty(&opts).context("serialize backend options")?;
    println!("{json}");
    Ok(())
}
