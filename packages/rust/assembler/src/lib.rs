//! Draft assembler.
//!
//! Turns a chosen topic into a draft artifact: a deterministic
//! `<date>-<slug>/` directory containing `draft.md` (front matter plus
//! body) and a `metadata.json` sidecar. Body text comes from the
//! external generation collaborator when one is configured; any
//! generation failure falls back to a skeleton body so a run always
//! produces a file to edit by hand.

pub mod generator;

use std::path::{Path, PathBuf};

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info, instrument, warn};

use draftmill_shared::{DraftmillError, Result, RunId, Topic};

pub use generator::{BodyGenerator, CommandGenerator, NoopGenerator, render_template};

// ---------------------------------------------------------------------------
// Artifact types
// ---------------------------------------------------------------------------

/// Whether the body came from the generator or the skeleton fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodySource {
    Generated,
    Skeleton,
}

/// A fully assembled draft, ready to be written to disk.
#[derive(Debug, Clone)]
pub struct DraftArtifact {
    /// Run date the artifact is keyed by.
    pub date: NaiveDate,
    /// Id of the selected topic.
    pub topic_id: String,
    /// Topic title.
    pub title: String,
    /// Directory name of the form `<date>-<slug>`.
    pub dir_name: String,
    /// Rendered YAML front matter block.
    pub front_matter: String,
    /// Draft body text.
    pub body: String,
    /// Where the body came from.
    pub body_source: BodySource,
}

/// The `metadata.json` sidecar written next to each draft.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftMetadata {
    pub topic_id: String,
    pub title: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
    pub run_id: RunId,
    pub generated_at: chrono::DateTime<Utc>,
    pub word_count: usize,
    /// SHA-256 of the draft body.
    pub content_hash: String,
    pub body_source: BodySource,
}

// ---------------------------------------------------------------------------
// Deterministic string construction
// ---------------------------------------------------------------------------

/// Slugify a title into a filesystem-safe token.
///
/// Lowercases, keeps alphanumeric runs, joins them with single hyphens.
pub fn slugify(title: &str) -> String {
    title
        .to_lowercase()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Directory name for a draft: `<date>-<slug>`.
///
/// Falls back to the topic id when the title yields an empty slug.
pub fn artifact_dir_name(date: NaiveDate, topic: &Topic) -> String {
    let slug = slugify(&topic.title);
    let slug = if slug.is_empty() {
        slugify(&topic.id)
    } else {
        slug
    };
    format!("{}-{slug}", date.format("%Y-%m-%d"))
}

/// Render the fixed YAML front matter block for a draft.
pub fn build_front_matter(topic: &Topic, date: NaiveDate) -> String {
    let tags = topic
        .tags
        .iter()
        .map(|t| format!("\"{t}\""))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "---\ntitle: \"{}\"\ndate: {}\ntopic_id: {}\ntags: [{tags}]\nstatus: draft\n---\n",
        topic.title.replace('"', "\\\""),
        date.format("%Y-%m-%d"),
        topic.id,
    )
}

/// The placeholder body used when no generated text is available.
fn skeleton_body(topic: &Topic) -> String {
    format!(
        "# {}\n\n*Body not generated. Edit this draft by hand.*\n",
        topic.title
    )
}

// ---------------------------------------------------------------------------
// Assembly
// ---------------------------------------------------------------------------

/// Assemble a draft artifact for a topic.
///
/// Invokes the generation collaborator best-effort: on any error the
/// body falls back to the skeleton and the outcome is recorded in
/// [`DraftArtifact::body_source`]. This function never fails.
#[instrument(skip_all, fields(topic_id = %topic.id, date = %date))]
pub async fn assemble<G: BodyGenerator>(
    topic: &Topic,
    date: NaiveDate,
    generator: &G,
) -> DraftArtifact {
    let front_matter = build_front_matter(topic, date);

    let (body, body_source) = match generator.generate(topic, &front_matter).await {
        Ok(text) => (text, BodySource::Generated),
        Err(e) => {
            warn!(error = %e, "body generation failed, using skeleton");
            (skeleton_body(topic), BodySource::Skeleton)
        }
    };

    DraftArtifact {
        date,
        topic_id: topic.id.clone(),
        title: topic.title.clone(),
        dir_name: artifact_dir_name(date, topic),
        front_matter,
        body,
        body_source,
    }
}

/// Write the draft directory: `draft.md` plus `metadata.json`.
///
/// Returns the path to the written `draft.md`. Any filesystem failure is
/// a [`DraftmillError::Write`] and leaves the selection state untouched
/// (the orchestrator persists only after this succeeds).
#[instrument(skip_all, fields(dir = %artifact.dir_name))]
pub fn write_artifact(
    artifact: &DraftArtifact,
    topic: &Topic,
    run_id: &RunId,
    drafts_dir: &Path,
) -> Result<PathBuf> {
    let dir = drafts_dir.join(&artifact.dir_name);
    std::fs::create_dir_all(&dir)
        .map_err(|e| DraftmillError::write(format!("cannot create {}: {e}", dir.display())))?;

    let draft_path = dir.join("draft.md");
    let document = format!("{}\n{}", artifact.front_matter, artifact.body);
    std::fs::write(&draft_path, &document).map_err(|e| {
        DraftmillError::write(format!("cannot write {}: {e}", draft_path.display()))
    })?;

    let metadata = DraftMetadata {
        topic_id: artifact.topic_id.clone(),
        title: artifact.title.clone(),
        tags: topic.tags.clone(),
        keywords: topic.keywords.clone(),
        run_id: run_id.clone(),
        generated_at: Utc::now(),
        word_count: artifact.body.split_whitespace().count(),
        content_hash: content_hash(&artifact.body),
        body_source: artifact.body_source,
    };

    let metadata_path = dir.join("metadata.json");
    let json = serde_json::to_string_pretty(&metadata)
        .map_err(|e| DraftmillError::write(format!("metadata serialization failed: {e}")))?;
    std::fs::write(&metadata_path, json).map_err(|e| {
        DraftmillError::write(format!("cannot write {}: {e}", metadata_path.display()))
    })?;

    info!(
        path = %draft_path.display(),
        words = metadata.word_count,
        source = ?artifact.body_source,
        "draft written"
    );
    debug!(path = %metadata_path.display(), "metadata written");

    Ok(draft_path)
}

/// Compute SHA-256 hash of content.
fn content_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn topic() -> Topic {
        Topic {
            id: "a".into(),
            title: "Widgets & Layout: a Primer".into(),
            tags: vec!["ui".into(), "layout".into()],
            weight: 1.0,
            keywords: vec![],
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()
    }

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("dm-assembler-test-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn slugify_basic() {
        assert_eq!(slugify("Widgets"), "widgets");
        assert_eq!(slugify("Widgets & Layout: a Primer"), "widgets-layout-a-primer");
        assert_eq!(slugify("  --  "), "");
    }

    #[test]
    fn dir_name_is_date_plus_slug() {
        assert_eq!(
            artifact_dir_name(date(), &topic()),
            "2026-01-01-widgets-layout-a-primer"
        );
    }

    #[test]
    fn dir_name_falls_back_to_id() {
        let mut t = topic();
        t.title = "???".into();
        assert_eq!(artifact_dir_name(date(), &t), "2026-01-01-a");
    }

    #[test]
    fn front_matter_fields() {
        let fm = build_front_matter(&topic(), date());
        assert!(fm.starts_with("---\n"));
        assert!(fm.contains("title: \"Widgets & Layout: a Primer\""));
        assert!(fm.contains("date: 2026-01-01"));
        assert!(fm.contains("topic_id: a"));
        assert!(fm.contains("tags: [\"ui\", \"layout\"]"));
        assert!(fm.ends_with("---\n"));
    }

    #[tokio::test]
    async fn assemble_falls_back_to_skeleton() {
        let artifact = assemble(&topic(), date(), &NoopGenerator).await;
        assert_eq!(artifact.body_source, BodySource::Skeleton);
        assert!(artifact.body.contains("# Widgets & Layout: a Primer"));
    }

    #[tokio::test]
    async fn assemble_uses_generated_body() {
        struct FixedBody;
        impl BodyGenerator for FixedBody {
            async fn generate(&self, _t: &Topic, _fm: &str) -> draftmill_shared::Result<String> {
                Ok("Generated prose.".into())
            }
        }

        let artifact = assemble(&topic(), date(), &FixedBody).await;
        assert_eq!(artifact.body_source, BodySource::Generated);
        assert_eq!(artifact.body, "Generated prose.");
    }

    #[tokio::test]
    async fn write_artifact_creates_draft_and_metadata() {
        let tmp = temp_dir();
        let t = topic();
        let artifact = assemble(&t, date(), &NoopGenerator).await;

        let run_id = RunId::new();
        let draft_path = write_artifact(&artifact, &t, &run_id, &tmp).expect("write");

        assert!(draft_path.ends_with("2026-01-01-widgets-layout-a-primer/draft.md"));
        let content = std::fs::read_to_string(&draft_path).unwrap();
        assert!(content.starts_with("---\n"));
        assert!(content.contains("# Widgets & Layout: a Primer"));

        let metadata_path = draft_path.parent().unwrap().join("metadata.json");
        let metadata: DraftMetadata =
            serde_json::from_str(&std::fs::read_to_string(&metadata_path).unwrap()).unwrap();
        assert_eq!(metadata.topic_id, "a");
        assert_eq!(metadata.run_id, run_id);
        assert_eq!(metadata.body_source, BodySource::Skeleton);
        assert_eq!(metadata.content_hash.len(), 64);
        assert!(metadata.word_count > 0);

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[tokio::test]
    async fn write_artifact_unwritable_path_is_write_error() {
        let t = topic();
        let artifact = assemble(&t, date(), &NoopGenerator).await;

        let err = write_artifact(
            &artifact,
            &t,
            &RunId::new(),
            Path::new("/proc/draftmill-denied"),
        )
        .unwrap_err();
        assert!(matches!(err, DraftmillError::Write { .. }));
    }
}
