//! End-to-end run pipeline: catalog + state → selection → draft → state.
//!
//! One run walks four phases: LOADING, SELECTING, ASSEMBLING,
//! PERSISTING. Side-effect ordering is the whole point of this module:
//! the artifact is written before the state is saved, so the history
//! never records a topic for which no artifact exists. The reverse
//! (an artifact on disk with no history record, after a save failure)
//! is a documented, operator-reconcilable asymmetry.

use std::path::PathBuf;
use std::time::Instant;

use chrono::NaiveDate;
use tracing::{info, instrument, warn};

use draftmill_assembler::{BodyGenerator, BodySource};
use draftmill_selector::SelectorOptions;
use draftmill_shared::{Result, RunId, SelectionRecord};
use draftmill_state::StateStore;

/// Configuration for one pipeline run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Path to the topic catalog file.
    pub catalog_path: PathBuf,
    /// Path to the selection state file.
    pub state_path: PathBuf,
    /// Directory draft artifacts are written under.
    pub drafts_dir: PathBuf,
    /// Run date (drives the selection seed and the artifact path).
    pub date: NaiveDate,
    /// Minimum cooldown gap override. `None` derives from catalog size.
    pub min_gap: Option<usize>,
    /// History retention override. `None` derives from catalog size.
    pub history_limit: Option<usize>,
}

/// Result of a completed run.
#[derive(Debug)]
pub struct RunOutcome {
    /// Path to the written `draft.md`.
    pub draft_path: PathBuf,
    /// Id of the chosen topic.
    pub topic_id: String,
    /// Title of the chosen topic.
    pub title: String,
    /// Identifier of this run.
    pub run_id: RunId,
    /// Whether the body was generated or is the skeleton fallback.
    pub body_source: BodySource,
    /// Total elapsed time.
    pub elapsed: std::time::Duration,
}

/// Progress callback for reporting run status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called when the run completes.
    fn done(&self, outcome: &RunOutcome);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn done(&self, _outcome: &RunOutcome) {}
}

/// Run the full pipeline once.
///
/// 1. Load catalog and selection state
/// 2. Select the next topic
/// 3. Assemble and write the draft artifact
/// 4. Append a selection record and save the state atomically
#[instrument(skip_all, fields(date = %config.date, catalog = %config.catalog_path.display()))]
pub async fn run<G: BodyGenerator>(
    config: &RunConfig,
    generator: &G,
    progress: &dyn ProgressReporter,
) -> Result<RunOutcome> {
    let start = Instant::now();
    let run_id = RunId::new();

    info!(%run_id, date = %config.date, "starting pipeline run");

    // --- Phase 1: Loading ---
    progress.phase("Loading catalog and state");
    let catalog = draftmill_catalog::load_catalog(&config.catalog_path)?;
    let store = StateStore::new(&config.state_path);
    let mut state = store.load()?;

    // --- Phase 2: Selecting ---
    progress.phase("Selecting topic");
    let options = SelectorOptions {
        date: config.date,
        min_gap: config.min_gap,
    };
    let topic = draftmill_selector::select(&catalog, &state, &options)?.clone();

    info!(topic_id = %topic.id, title = %topic.title, "topic selected");

    // --- Phase 3: Assembling ---
    progress.phase("Assembling draft");
    let artifact = draftmill_assembler::assemble(&topic, config.date, generator).await;

    if artifact.body_source == BodySource::Skeleton {
        warn!(topic_id = %topic.id, "draft body is the skeleton fallback");
    }

    // Write failure aborts with no state mutation.
    let draft_path =
        draftmill_assembler::write_artifact(&artifact, &topic, &run_id, &config.drafts_dir)?;

    // --- Phase 4: Persisting ---
    progress.phase("Persisting selection state");
    let limit = config.history_limit.unwrap_or(catalog.len());
    state.push_trimmed(
        SelectionRecord {
            topic_id: topic.id.clone(),
            selected_at: chrono::Utc::now(),
            draft_path: draft_path.display().to_string(),
        },
        limit,
    );

    // A failure past this point leaves an orphan artifact but no record;
    // the guard is "never record a selection without an artifact".
    store.save(&state)?;

    let outcome = RunOutcome {
        draft_path,
        topic_id: topic.id,
        title: topic.title,
        run_id,
        body_source: artifact.body_source,
        elapsed: start.elapsed(),
    };

    progress.done(&outcome);

    info!(
        run_id = %outcome.run_id,
        topic_id = %outcome.topic_id,
        draft = %outcome.draft_path.display(),
        elapsed_ms = outcome.elapsed.as_millis(),
        "pipeline run complete"
    );

    Ok(outcome)
}
