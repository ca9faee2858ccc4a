//! Topic catalog loader.
//!
//! Reads the `topics.toml` catalog file and validates it as a whole.
//! A single invalid entry rejects the entire catalog so the selection
//! pool is never silently narrowed.

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, info};

use draftmill_shared::{Catalog, DraftmillError, Result, Topic};

/// On-disk catalog file shape: a list of `[[topics]]` tables.
#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    topics: Vec<Topic>,
}

/// Load and validate the catalog from a TOML file.
///
/// Fails with a [`DraftmillError::Catalog`] naming the specific violation:
/// missing or malformed file, empty catalog, duplicate id, non-positive
/// weight, empty id or title. No side effects beyond reading.
pub fn load_catalog(path: &Path) -> Result<Catalog> {
    if !path.exists() {
        return Err(DraftmillError::catalog(format!(
            "catalog file not found: {}",
            path.display()
        )));
    }

    let content = std::fs::read_to_string(path).map_err(|e| DraftmillError::io(path, e))?;
    let catalog = parse_catalog(&content).map_err(|e| match e {
        DraftmillError::Catalog { message } => {
            DraftmillError::catalog(format!("{}: {message}", path.display()))
        }
        other => other,
    })?;

    info!(
        path = %path.display(),
        topics = catalog.len(),
        "catalog loaded"
    );

    Ok(catalog)
}

/// Parse and validate catalog TOML content.
pub fn parse_catalog(content: &str) -> Result<Catalog> {
    let file: CatalogFile = toml::from_str(content)
        .map_err(|e| DraftmillError::catalog(format!("malformed catalog: {e}")))?;

    validate(&file.topics)?;

    debug!(topics = file.topics.len(), "catalog validated");
    Ok(Catalog::from_validated(file.topics))
}

/// Reject the whole catalog on the first violation found.
fn validate(topics: &[Topic]) -> Result<()> {
    if topics.is_empty() {
        return Err(DraftmillError::catalog("catalog contains no topics"));
    }

    let mut seen: HashSet<&str> = HashSet::with_capacity(topics.len());

    for topic in topics {
        if topic.id.trim().is_empty() {
            return Err(DraftmillError::catalog(format!(
                "topic '{}' has an empty id",
                topic.title
            )));
        }
        if topic.title.trim().is_empty() {
            return Err(DraftmillError::catalog(format!(
                "topic '{}' has an empty title",
                topic.id
            )));
        }
        if !seen.insert(topic.id.as_str()) {
            return Err(DraftmillError::catalog(format!(
                "duplicate topic id '{}'",
                topic.id
            )));
        }
        if !(topic.weight > 0.0) {
            return Err(DraftmillError::catalog(format!(
                "topic '{}' has non-positive weight {}",
                topic.id, topic.weight
            )));
        }
    }

    Ok(())
}
