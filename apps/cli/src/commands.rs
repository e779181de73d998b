//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use elemdoc_core::pipeline::{Enricher, FileOutcome, ProgressReporter, RunSummary, scan_tree};
use elemdoc_fetcher::DocFetcher;
use elemdoc_shared::{AppConfig, EnrichConfig, Workflow, init_config, load_config, load_config_from};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// elemdoc: embed reference documentation into HTML element sources.
#[derive(Parser)]
#[command(
    name = "elemdoc",
    version,
    about = "Embed HTML element reference pages as comments in element source files.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file to use instead of ~/.elemdoc/elemdoc.toml.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Workflow selection on the command line.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub(crate) enum WorkflowArg {
    /// Implemented, undocumented files: documentation goes at the end.
    Append,
    /// Stub files: documentation goes at the top.
    Prepend,
}

impl From<WorkflowArg> for Workflow {
    fn from(arg: WorkflowArg) -> Self {
        match arg {
            WorkflowArg::Append => Workflow::Append,
            WorkflowArg::Prepend => Workflow::Prepend,
        }
    }
}

/// Overrides for the `[source]` config section.
#[derive(clap::Args, Debug, Default)]
pub(crate) struct SourceArgs {
    /// Root directory containing element files.
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Element file extension (without the dot).
    #[arg(long)]
    pub extension: Option<String>,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Fetch documentation and write it into element files.
    Enrich {
        /// Which files to target and where to insert the documentation.
        #[arg(short, long, value_enum)]
        workflow: WorkflowArg,

        #[command(flatten)]
        source: SourceArgs,

        /// Pause after each enriched file, in milliseconds.
        #[arg(long)]
        delay_ms: Option<u64>,

        /// Report what would be enriched without fetching or writing.
        #[arg(long)]
        dry_run: bool,
    },

    /// List element files with their classification (no network).
    Scan {
        #[command(flatten)]
        source: SourceArgs,

        /// Print the report as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "elemdoc=info,elemdoc_core=info,elemdoc_fetcher=info,elemdoc_shared=info",
        1 => "elemdoc=debug,elemdoc_core=debug,elemdoc_fetcher=debug,elemdoc_shared=debug",
        _ => "elemdoc=trace,elemdoc_core=trace,elemdoc_fetcher=trace,elemdoc_shared=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config;
    match cli.command {
        Command::Enrich {
            workflow,
            source,
            delay_ms,
            dry_run,
        } => cmd_enrich(config_path.as_deref(), workflow.into(), &source, delay_ms, dry_run).await,
        Command::Scan { source, json } => cmd_scan(config_path.as_deref(), &source, json),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(config_path.as_deref()),
        },
    }
}

/// Load the config file (explicit path or the default location).
fn resolve_app_config(path: Option<&Path>) -> Result<AppConfig> {
    let config = match path {
        Some(p) => load_config_from(p)?,
        None => load_config()?,
    };
    Ok(config)
}

/// Merge CLI overrides into the runtime config.
fn enrich_config(app: &AppConfig, source: &SourceArgs, delay_ms: Option<u64>) -> EnrichConfig {
    let mut config = EnrichConfig::from(app);
    if let Some(root) = &source.root {
        config.root_dir = root.clone();
    }
    if let Some(ext) = &source.extension {
        config.extension = ext.clone();
    }
    if let Some(ms) = delay_ms {
        config.request_delay = Duration::from_millis(ms);
    }
    config
}

async fn cmd_enrich(
    config_path: Option<&Path>,
    workflow: Workflow,
    source: &SourceArgs,
    delay_ms: Option<u64>,
    dry_run: bool,
) -> Result<()> {
    let app = resolve_app_config(config_path)?;
    let config = enrich_config(&app, source, delay_ms);

    if !config.root_dir.is_dir() {
        return Err(eyre!(
            "root directory '{}' does not exist or is not a directory",
            config.root_dir.display()
        ));
    }

    info!(
        %workflow,
        root = %config.root_dir.display(),
        extension = %config.extension,
        dry_run,
        "enriching element files"
    );

    let fetcher = DocFetcher::new(config.clone())?;
    let enricher = Enricher::new(config, fetcher, workflow)?.dry_run(dry_run);

    let reporter = CliProgress::new();
    let summary = enricher.run(&reporter).await?;

    print_summary(&summary);
    Ok(())
}

fn print_summary(summary: &RunSummary) {
    println!();
    println!("  Done! ({} workflow)", summary.workflow);
    println!("  Scanned:  {}", summary.files_scanned);
    if summary.planned.is_empty() {
        println!("  Enriched: {}", summary.enriched.len());
    } else {
        println!("  Would enrich: {}", summary.planned.len());
        for (path, element) in &summary.planned {
            println!("    <{element}> {}", path.display());
        }
    }
    println!("  Skipped:  {}", summary.skipped.len());
    println!("  Failed:   {}", summary.failed.len());
    for (path, err) in &summary.failed {
        println!("    {}: {err}", path.display());
    }
    println!("  Time:     {:.1}s", summary.elapsed.as_secs_f64());
    println!();
}

fn cmd_scan(config_path: Option<&Path>, source: &SourceArgs, json: bool) -> Result<()> {
    let app = resolve_app_config(config_path)?;
    let config = enrich_config(&app, source, None);
    let entries = scan_tree(&config)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    for entry in &entries {
        let target = entry.target.map(Workflow::as_str).unwrap_or("-");
        println!(
            "{:<24} {:<12} {:<8} {}",
            entry.classification.label(),
            entry.element.as_deref().unwrap_or("?"),
            target,
            entry.path.display()
        );
    }
    println!();
    println!("  {} element files", entries.len());
    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(config_path: Option<&Path>) -> Result<()> {
    let config = resolve_app_config(config_path)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif bar.
struct CliProgress {
    bar: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let bar = ProgressBar::new(0);
        let style = ProgressStyle::with_template("{spinner:.cyan} [{pos}/{len}] {wide_msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
        bar.set_style(style);
        bar.enable_steady_tick(Duration::from_millis(80));
        Self { bar }
    }
}

impl ProgressReporter for CliProgress {
    fn started(&self, workflow: Workflow, total: usize) {
        self.bar.set_length(total as u64);
        self.bar.set_message(format!("{workflow}: {total} element files"));
    }

    fn file_started(&self, path: &Path, current: usize, _total: usize) {
        self.bar.set_position(current.saturating_sub(1) as u64);
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.bar.set_message(name);
    }

    fn file_finished(&self, _path: &Path, outcome: &FileOutcome) {
        if let FileOutcome::Enriched { element, .. } = outcome {
            self.bar.set_message(format!("added <{element}> documentation"));
        }
        self.bar.inc(1);
    }

    fn done(&self, _summary: &RunSummary) {
        self.bar.finish_and_clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_enrich_command() {
        let cli = Cli::try_parse_from([
            "elemdoc",
            "enrich",
            "--workflow",
            "prepend",
            "--root",
            "/tmp/elements",
            "--delay-ms",
            "0",
            "--dry-run",
        ])
        .expect("parse");

        match cli.command {
            Command::Enrich {
                workflow,
                source,
                delay_ms,
                dry_run,
            } => {
                assert_eq!(Workflow::from(workflow), Workflow::Prepend);
                assert_eq!(source.root, Some(PathBuf::from("/tmp/elements")));
                assert_eq!(delay_ms, Some(0));
                assert!(dry_run);
            }
            _ => panic!("expected enrich"),
        }
    }

    #[test]
    fn config_path_comes_only_from_flag() {
        use clap::CommandFactory;

        let cmd = Cli::command();
        let arg = cmd
            .get_arguments()
            .find(|a| a.get_id() == "config")
            .expect("config arg");
        assert!(arg.get_env().is_none());

        let cli = Cli::try_parse_from(["elemdoc", "--config", "/etc/elemdoc.toml", "scan"])
            .expect("parse");
        assert_eq!(cli.config, Some(PathBuf::from("/etc/elemdoc.toml")));
    }

    #[test]
    fn enrich_requires_workflow() {
        assert!(Cli::try_parse_from(["elemdoc", "enrich"]).is_err());
    }

    #[test]
    fn overrides_apply_to_runtime_config() {
        let app = AppConfig::default();
        let args = SourceArgs {
            root: Some(PathBuf::from("/src/elements")),
            extension: Some("impl".into()),
        };
        let config = enrich_config(&app, &args, Some(250));

        assert_eq!(config.root_dir, PathBuf::from("/src/elements"));
        assert_eq!(config.extension, "impl");
        assert_eq!(config.request_delay, Duration::from_millis(250));
        assert_eq!(config.content_selector, "article");
    }

    #[test]
    fn defaults_kept_without_overrides() {
        let app = AppConfig::default();
        let config = enrich_config(&app, &SourceArgs::default(), None);
        assert_eq!(config.root_dir, PathBuf::from("Sources/HTML Elements"));
        assert_eq!(config.request_delay, Duration::from_secs(2));
    }
}
