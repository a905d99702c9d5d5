//! HostAudit CLI - Point-in-time security audit of the local host
//! Composition root: wires the subprocess runner, built-in probes and sinks

mod logging;
mod output;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use hostaudit_core::application::config::default_concurrency;
use hostaudit_core::application::{cancel_channel, Executor, ExecutorConfig, ProbeRegistry};
use hostaudit_core::port::time_provider::SystemTimeProvider;
use hostaudit_core::port::ReportSink;
use hostaudit_infra_system::{JsonFileSink, SubprocessRunner};
use hostaudit_probes::{builtin_registry, with_scan_timeouts, CATALOGUE, CATEGORIES};

use output::{ConsoleSink, OutputFormat};

const DEFAULT_REPORT_DIR: &str = "~/.hostaudit/reports";

/// Variables passed through to audited commands (LC_ALL=C is always set)
const ENV_ALLOWLIST: &[&str] = &["PATH", "HOME", "USER", "LOGNAME", "TERM", "DOCKER_HOST"];

/// Exit code after Ctrl+C (128 + SIGINT)
const EXIT_CANCELLED: u8 = 130;

#[derive(Parser)]
#[command(name = "hostaudit")]
#[command(about = "Point-in-time security audit of the local host", long_about = None)]
#[command(version)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    run: RunArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the audit (default)
    Run(RunArgs),

    /// List the built-in probes
    List {
        /// Command timeout for categories without their own (seconds)
        #[arg(long, env = "HOSTAUDIT_TIMEOUT_SECS", default_value_t = 20)]
        timeout_secs: u64,
    },
}

#[derive(Args, Clone)]
struct RunArgs {
    /// Maximum number of probes running at once (default: CPU count)
    #[arg(short, long, env = "HOSTAUDIT_CONCURRENCY")]
    concurrency: Option<usize>,

    /// Command timeout for categories without their own (seconds)
    #[arg(long, env = "HOSTAUDIT_TIMEOUT_SECS", default_value_t = 20)]
    timeout_secs: u64,

    /// Cancel the whole run after this many seconds
    #[arg(long, env = "HOSTAUDIT_DEADLINE_SECS")]
    deadline_secs: Option<u64>,

    /// Only run these categories (repeatable or comma-separated)
    #[arg(long = "category", value_delimiter = ',')]
    categories: Vec<String>,

    /// Directory for JSON reports
    #[arg(long, env = "HOSTAUDIT_REPORT_DIR", default_value = DEFAULT_REPORT_DIR)]
    report_dir: String,

    /// Do not write the JSON report file
    #[arg(long)]
    no_save: bool,

    /// Console output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// Run without root privileges (many probes will fail)
    #[arg(long)]
    skip_root_check: bool,
}

impl RunArgs {
    fn executor_config(&self) -> ExecutorConfig {
        let mut config = ExecutorConfig::default()
            .with_concurrency(self.concurrency.unwrap_or_else(default_concurrency))
            .with_default_timeout(Duration::from_secs(self.timeout_secs));
        if let Some(secs) = self.deadline_secs {
            config = config.with_run_deadline(Duration::from_secs(secs));
        }
        with_scan_timeouts(config)
    }

    /// Registry restricted to the requested categories
    fn registry(&self) -> Result<ProbeRegistry> {
        let registry = builtin_registry().context("Failed to build probe registry")?;
        if self.categories.is_empty() {
            return Ok(registry);
        }

        let unknown: Vec<&str> = self
            .categories
            .iter()
            .map(String::as_str)
            .filter(|c| !CATEGORIES.contains(c))
            .collect();
        if !unknown.is_empty() {
            anyhow::bail!(
                "Unknown categories: {} (available: {})",
                unknown.join(", "),
                CATEGORIES.join(", ")
            );
        }

        Ok(registry.filter_categories(&self.categories))
    }
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    logging::init()?;

    match cli.command {
        Some(Commands::List { timeout_secs }) => {
            let config = with_scan_timeouts(
                ExecutorConfig::default().with_default_timeout(Duration::from_secs(timeout_secs)),
            );
            output::print_catalogue(CATALOGUE, &config);
            Ok(ExitCode::SUCCESS)
        }
        Some(Commands::Run(args)) => run(args),
        None => run(cli.run),
    }
}

#[tokio::main]
async fn run(args: RunArgs) -> Result<ExitCode> {
    info!("HostAudit v{} starting...", hostaudit_core::VERSION);

    // 1. Preconditions
    if !args.skip_root_check {
        ensure_root()?;
    }

    let registry = args.registry()?;
    let config = args.executor_config();
    config.validate().context("Invalid configuration")?;

    let report_dir = shellexpand::tilde(&args.report_dir).into_owned();

    // 2. Setup dependencies (DI wiring)
    let time_provider = Arc::new(SystemTimeProvider);
    let runner = Arc::new(SubprocessRunner::new(
        time_provider.clone(),
        ENV_ALLOWLIST.iter().map(|v| v.to_string()).collect(),
    ));
    let executor = Executor::new(runner, config, time_provider);

    let mut sinks: Vec<Box<dyn ReportSink>> = vec![Box::new(ConsoleSink::new(args.format))];
    if !args.no_save {
        sinks.push(Box::new(JsonFileSink::new(&report_dir)));
    }

    // 3. Ctrl+C cancels the run; in-flight probes get the grace period
    let (cancel_tx, cancel) = cancel_channel();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, cancelling audit run");
            cancel_tx.cancel();
        }
    });

    // 4. Run
    let report = executor.run(&registry, cancel).await;

    // 5. Deliver
    for sink in &sinks {
        let written = sink
            .write(&report)
            .await
            .with_context(|| format!("Report sink '{}' failed", sink.name()))?;
        if let Some(path) = written {
            eprintln!("{} {}", "✓ Report saved to".green().bold(), path.display());
        }
    }

    if report.is_cancelled() {
        return Ok(ExitCode::from(EXIT_CANCELLED));
    }
    Ok(ExitCode::SUCCESS)
}

#[cfg(unix)]
fn ensure_root() -> Result<()> {
    if !nix::unistd::geteuid().is_root() {
        anyhow::bail!("hostaudit must run as root (use sudo), or pass --skip-root-check");
    }
    Ok(())
}

#[cfg(not(unix))]
fn ensure_root() -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("hostaudit").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_no_arguments_runs_with_defaults() {
        let cli = parse(&[]);
        assert!(cli.command.is_none());
        assert_eq!(cli.run.timeout_secs, 20);
        assert_eq!(cli.run.format, OutputFormat::Table);
        assert!(!cli.run.no_save);
    }

    #[test]
    fn test_run_subcommand_flags() {
        let cli = parse(&[
            "run",
            "--concurrency",
            "2",
            "--deadline-secs",
            "60",
            "--category",
            "kernel,network",
            "--category",
            "sudo",
            "--format",
            "json",
        ]);

        let Some(Commands::Run(args)) = cli.command else {
            panic!("expected run subcommand");
        };
        assert_eq!(args.categories, vec!["kernel", "network", "sudo"]);

        let config = args.executor_config();
        assert_eq!(config.concurrency_limit, 2);
        assert_eq!(config.run_deadline, Some(Duration::from_secs(60)));
        assert_eq!(config.timeout_for("malware_protection"), Duration::from_secs(30));
        assert_eq!(config.timeout_for("kernel"), Duration::from_secs(20));
    }

    #[test]
    fn test_category_filter() {
        let cli = parse(&["--category", "kernel"]);
        let registry = cli.run.registry().unwrap();

        assert!(!registry.is_empty());
        assert_eq!(registry.categories(), vec!["kernel"]);
    }

    #[test]
    fn test_unknown_category_is_rejected() {
        let cli = parse(&["--category", "kernal"]);
        let err = cli.run.registry().unwrap_err();
        assert!(err.to_string().contains("Unknown categories: kernal"));
    }
}
