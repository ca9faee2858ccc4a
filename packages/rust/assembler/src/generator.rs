//! External body-generation collaborator.
//!
//! The generator is a black box: it receives a topic and the rendered
//! front matter and returns body text. Failures are always recovered by
//! the assembler with the skeleton fallback, so nothing here is fatal to
//! a run.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use draftmill_shared::{DraftmillError, GeneratorConfig, Result, Topic};

/// Produces draft body text for a topic. Best-effort by contract.
#[allow(async_fn_in_trait)]
pub trait BodyGenerator {
    async fn generate(&self, topic: &Topic, front_matter: &str) -> Result<String>;
}

// ---------------------------------------------------------------------------
// NoopGenerator
// ---------------------------------------------------------------------------

/// Generator used when no external command is configured.
///
/// Always errors so the assembler takes the skeleton-fallback path.
pub struct NoopGenerator;

impl BodyGenerator for NoopGenerator {
    async fn generate(&self, _topic: &Topic, _front_matter: &str) -> Result<String> {
        Err(DraftmillError::Generation(
            "no generator command configured".into(),
        ))
    }
}

// ---------------------------------------------------------------------------
// CommandGenerator
// ---------------------------------------------------------------------------

/// Spawns a configured external command, writes a rendered prompt to its
/// stdin, and reads the draft body from its stdout, bounded by a timeout.
pub struct CommandGenerator {
    command: String,
    args: Vec<String>,
    template_path: PathBuf,
    timeout: Duration,
}

impl CommandGenerator {
    /// Build a generator from the `[generator]` config section.
    pub fn from_config(config: &GeneratorConfig) -> Self {
        Self {
            command: config.command.clone(),
            args: config.args.clone(),
            template_path: PathBuf::from(&config.prompt_template),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    /// Render the prompt template for a topic.
    ///
    /// Supported placeholders: `{title}`, `{tags}`, `{keywords}`,
    /// `{front_matter}`.
    fn render_prompt(&self, topic: &Topic, front_matter: &str) -> Result<String> {
        let template = std::fs::read_to_string(&self.template_path).map_err(|e| {
            DraftmillError::Generation(format!(
                "cannot read prompt template {}: {e}",
                self.template_path.display()
            ))
        })?;

        Ok(render_template(&template, topic, front_matter))
    }
}

/// Substitute topic fields into a prompt template.
pub fn render_template(template: &str, topic: &Topic, front_matter: &str) -> String {
    template
        .replace("{title}", &topic.title)
        .replace("{tags}", &topic.tags.join(", "))
        .replace("{keywords}", &topic.keywords.join(", "))
        .replace("{front_matter}", front_matter)
}

impl BodyGenerator for CommandGenerator {
    async fn generate(&self, topic: &Topic, front_matter: &str) -> Result<String> {
        let prompt = self.render_prompt(topic, front_matter)?;

        info!(
            command = %self.command,
            topic_id = %topic.id,
            timeout_secs = self.timeout.as_secs(),
            "invoking body generator"
        );

        let mut child = tokio::process::Command::new(&self.command)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| {
                DraftmillError::Generation(format!(
                    "failed to spawn generator '{}': {e}",
                    self.command
                ))
            })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| DraftmillError::Generation("failed to capture generator stdin".into()))?;
        stdin
            .write_all(prompt.as_bytes())
            .await
            .map_err(|e| DraftmillError::Generation(format!("failed to send prompt: {e}")))?;
        drop(stdin); // Close stdin so the generator sees EOF.

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| {
                DraftmillError::Generation(format!(
                    "generator timed out after {}s",
                    self.timeout.as_secs()
                ))
            })?
            .map_err(|e| DraftmillError::Generation(format!("generator I/O failed: {e}")))?;

        if !output.status.success() {
            return Err(DraftmillError::Generation(format!(
                "generator exited with status {}",
                output.status.code().unwrap_or(-1)
            )));
        }

        let body = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if body.is_empty() {
            return Err(DraftmillError::Generation(
                "generator returned an empty body".into(),
            ));
        }

        debug!(bytes = body.len(), "generator returned body text");
        Ok(body)
    }
}
