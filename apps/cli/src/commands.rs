//! CLI command definitions, routing, tracing setup, and exit codes.

use std::io::Write as _;
use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use color_eyre::eyre::{Report, Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use draftmill_assembler::{BodySource, CommandGenerator, NoopGenerator};
use draftmill_core::{ProgressReporter, RunConfig, RunOutcome};
use draftmill_selector::cooldown;
use draftmill_shared::{
    AppConfig, DraftmillError, SelectionState, init_config, load_config,
};
use draftmill_state::StateStore;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// Draftmill — pick the next topic, produce the next draft.
#[derive(Parser)]
#[command(
    name = "draftmill",
    version,
    about = "Select a topic from a curated catalog and assemble a dated blog draft.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Execute one pipeline run: select a topic and write a draft.
    Run {
        /// Run date as YYYY-MM-DD (defaults to today; for testing/backfill).
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Catalog file path (overrides config).
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// State file path (overrides config).
        #[arg(long)]
        state: Option<PathBuf>,

        /// Drafts output directory (overrides config).
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// List catalog entries with their current cooldown status.
    Topics {
        /// Catalog file path (overrides config).
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// State file path (overrides config).
        #[arg(long)]
        state: Option<PathBuf>,
    },

    /// Print recent selection records, newest first.
    History {
        /// State file path (overrides config).
        #[arg(long)]
        state: Option<PathBuf>,

        /// Maximum records to print.
        #[arg(short = 'n', long, default_value = "10")]
        limit: usize,
    },

    /// Clear the selection history.
    Reset {
        /// State file path (overrides config).
        #[arg(long)]
        state: Option<PathBuf>,

        /// Skip the confirmation prompt.
        #[arg(short = 'y', long)]
        yes: bool,
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
        0 => "draftmill=info",
        1 => "draftmill=debug",
        _ => "draftmill=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt().with_env_filter(env_filter).with_target(false).init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Exit codes
// ---------------------------------------------------------------------------

/// Map an error to the documented process exit code.
///
/// 2 catalog, 3 state persistence, 4 artifact write, 5 selection,
/// 1 anything else.
pub(crate) fn exit_code(report: &Report) -> u8 {
    match report.downcast_ref::<DraftmillError>() {
        Some(DraftmillError::Catalog { .. }) => 2,
        Some(DraftmillError::Persistence(_)) => 3,
        Some(DraftmillError::Write { .. }) => 4,
        Some(DraftmillError::Selection { .. }) => 5,
        _ => 1,
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Run {
            date,
            catalog,
            state,
            out,
        } => cmd_run(date, catalog, state, out).await,
        Command::Topics { catalog, state } => cmd_topics(catalog, state),
        Command::History { state, limit } => cmd_history(state, limit),
        Command::Reset { state, yes } => cmd_reset(state, yes),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(),
        },
    }
}

/// Resolve a flag-or-config path pair.
fn resolve(flag: Option<PathBuf>, config_value: &str) -> PathBuf {
    flag.unwrap_or_else(|| PathBuf::from(config_value))
}

/// Zero in config means "derive from catalog size".
fn nonzero(value: usize) -> Option<usize> {
    (value > 0).then_some(value)
}

async fn cmd_run(
    date: Option<NaiveDate>,
    catalog: Option<PathBuf>,
    state: Option<PathBuf>,
    out: Option<PathBuf>,
) -> Result<()> {
    let config = load_config()?;

    let run_config = RunConfig {
        catalog_path: resolve(catalog, &config.defaults.catalog_path),
        state_path: resolve(state, &config.defaults.state_path),
        drafts_dir: resolve(out, &config.defaults.drafts_dir),
        date: date.unwrap_or_else(|| chrono::Local::now().date_naive()),
        min_gap: nonzero(config.defaults.min_gap),
        history_limit: nonzero(config.defaults.history_limit),
    };

    info!(
        date = %run_config.date,
        catalog = %run_config.catalog_path.display(),
        "starting run"
    );

    let reporter = CliProgress::new();

    let outcome = if config.generator.command.is_empty() {
        draftmill_core::run(&run_config, &NoopGenerator, &reporter).await?
    } else {
        let generator = CommandGenerator::from_config(&config.generator);
        draftmill_core::run(&run_config, &generator, &reporter).await?
    };

    println!();
    println!("  Draft created!");
    println!("  Topic:  {} ({})", outcome.title, outcome.topic_id);
    println!("  Path:   {}", outcome.draft_path.display());
    println!(
        "  Body:   {}",
        match outcome.body_source {
            BodySource::Generated => "generated",
            BodySource::Skeleton => "skeleton (edit by hand)",
        }
    );
    println!("  Run:    {}", outcome.run_id);
    println!("  Time:   {:.1}s", outcome.elapsed.as_secs_f64());
    println!();

    Ok(())
}

fn cmd_topics(catalog: Option<PathBuf>, state: Option<PathBuf>) -> Result<()> {
    let config = load_config()?;
    let catalog_path = resolve(catalog, &config.defaults.catalog_path);
    let state_path = resolve(state, &config.defaults.state_path);

    let catalog = draftmill_catalog::load_catalog(&catalog_path)?;
    let state = StateStore::new(&state_path).load()?;

    let min_gap = nonzero(config.defaults.min_gap).unwrap_or(catalog.len() / 2);

    println!("{} topics (cooldown gap: {min_gap})", catalog.len());
    for topic in catalog.topics() {
        let status = match cooldown(topic, &catalog, &state) {
            Some(c) if c <= min_gap => format!("cooling down ({c} of {min_gap})"),
            Some(c) => format!("eligible (last seen {c} ago)"),
            None => "eligible (never selected)".to_string(),
        };
        let tags = if topic.tags.is_empty() {
            String::new()
        } else {
            format!(" [{}]", topic.tags.join(", "))
        };
        println!("  {:<20} {}{tags}", topic.id, status);
    }

    Ok(())
}

fn cmd_history(state: Option<PathBuf>, limit: usize) -> Result<()> {
    let config = load_config()?;
    let state_path = resolve(state, &config.defaults.state_path);
    let state = StateStore::new(&state_path).load()?;

    if state.records.is_empty() {
        println!("No selections recorded yet.");
        return Ok(());
    }

    for record in state.recent().take(limit) {
        println!(
            "  {}  {:<20} {}",
            record.selected_at.format("%Y-%m-%d %H:%M"),
            record.topic_id,
            record.draft_path
        );
    }

    Ok(())
}

fn cmd_reset(state: Option<PathBuf>, yes: bool) -> Result<()> {
    let config = load_config()?;
    let state_path = resolve(state, &config.defaults.state_path);
    let store = StateStore::new(&state_path);

    let current = store.load()?;
    if current.records.is_empty() {
        println!("Selection history is already empty.");
        return Ok(());
    }

    if !yes {
        print!(
            "Clear {} selection record(s) at {}? [y/N] ",
            current.records.len(),
            state_path.display()
        );
        std::io::stdout().flush().ok();

        let mut answer = String::new();
        std::io::stdin()
            .read_line(&mut answer)
            .map_err(|e| eyre!("failed to read confirmation: {e}"))?;
        if !matches!(answer.trim(), "y" | "Y" | "yes") {
            println!("Aborted.");
            return Ok(());
        }
    }

    store.save(&SelectionState::default())?;
    println!("Cleared {} selection record(s).", current.records.len());

    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap()
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn done(&self, _outcome: &RunOutcome) {
        self.spinner.finish_and_clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_by_category() {
        let catalog: Report = DraftmillError::catalog("empty").into();
        let persistence: Report = DraftmillError::Persistence("disk full".into()).into();
        let write: Report = DraftmillError::write("denied").into();
        let selection: Report = DraftmillError::selection("empty catalog").into();
        let other: Report = eyre!("something else");

        assert_eq!(exit_code(&catalog), 2);
        assert_eq!(exit_code(&persistence), 3);
        assert_eq!(exit_code(&write), 4);
        assert_eq!(exit_code(&selection), 5);
        assert_eq!(exit_code(&other), 1);
    }

    #[test]
    fn nonzero_maps_zero_to_none() {
        assert_eq!(nonzero(0), None);
        assert_eq!(nonzero(3), Some(3));
    }
}
