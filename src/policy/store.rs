//! In-memory policy store behind the config API.
//!
//! Holds the source table, the designated source key and the label
//! rewrite flag. Changes apply to the next playlist request; nothing is
//! persisted back to the configuration file.

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, warn};
use url::Url;

use crate::config::PolicyConfig;
use crate::errors::{AppError, AppResult};
use crate::models::{MergePolicy, SourceEntry};

/// Partial update for the global policy fields. The source table has its
/// own per-row operations.
///
/// An empty or blank `designated_source` clears the designated key.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PolicyUpdate {
    #[serde(default)]
    pub designated_source: Option<String>,
    #[serde(default)]
    pub rewrite_labels: Option<bool>,
}

/// Partial update for one source table row.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceUpdate {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub enabled: Option<bool>,
}

pub struct PolicyStore {
    state: RwLock<PolicyConfig>,
}

impl PolicyStore {
    pub fn new(seed: PolicyConfig) -> Self {
        Self {
            state: RwLock::new(seed),
        }
    }

    /// Current settings document, as served by the config API.
    pub async fn settings(&self) -> PolicyConfig {
        self.state.read().await.clone()
    }

    /// Apply a partial update to the global policy fields, leaving absent
    /// fields untouched. Returns the updated settings document.
    pub async fn update_policy(&self, update: PolicyUpdate) -> PolicyConfig {
        let mut state = self.state.write().await;
        if let Some(key) = update.designated_source {
            let key = key.trim();
            state.designated_source = (!key.is_empty()).then(|| key.to_string());
        }
        if let Some(rewrite) = update.rewrite_labels {
            state.rewrite_labels = rewrite;
        }
        debug!("Policy settings updated");
        state.clone()
    }

    pub async fn sources(&self) -> Vec<SourceEntry> {
        self.state.read().await.sources.clone()
    }

    /// Add a source row. The key must not already exist.
    pub async fn add_source(&self, entry: SourceEntry) -> AppResult<SourceEntry> {
        validate_entry(&entry)?;
        let mut state = self.state.write().await;
        if state.sources.iter().any(|s| s.key == entry.key) {
            return Err(AppError::conflict("source", &entry.key));
        }
        state.sources.push(entry.clone());
        debug!("Added source '{}'", entry.key);
        Ok(entry)
    }

    /// Apply a partial update to an existing source row.
    pub async fn update_source(&self, key: &str, update: SourceUpdate) -> AppResult<SourceEntry> {
        let mut state = self.state.write().await;
        let entry = state
            .sources
            .iter_mut()
            .find(|s| s.key == key)
            .ok_or_else(|| AppError::not_found("source", key))?;

        if let Some(url) = update.url {
            validate_url(&url)?;
            entry.url = url;
        }
        if let Some(enabled) = update.enabled {
            entry.enabled = enabled;
        }
        debug!("Updated source '{}'", key);
        Ok(entry.clone())
    }

    /// Remove a source row. Removing the designated source clears the
    /// designated key as well, so the store never points at a row that no
    /// longer exists.
    pub async fn remove_source(&self, key: &str) -> AppResult<()> {
        let mut state = self.state.write().await;
        let before = state.sources.len();
        state.sources.retain(|s| s.key != key);
        if state.sources.len() == before {
            return Err(AppError::not_found("source", key));
        }
        if state.designated_source.as_deref() == Some(key) {
            warn!("Removed source '{}' was the designated source; clearing the designated key", key);
            state.designated_source = None;
        }
        debug!("Removed source '{}'", key);
        Ok(())
    }

    /// Resolve the stored settings into the effective merge policy:
    /// enabled source URLs in table order, and the designated key mapped
    /// to its URL. A designated key that does not name an enabled source
    /// resolves to unset with a warning, so classification falls back to
    /// content detection instead of matching nothing.
    pub async fn resolve(&self) -> MergePolicy {
        let state = self.state.read().await;
        let sources: Vec<String> = state
            .sources
            .iter()
            .filter(|s| s.enabled)
            .map(|s| s.url.clone())
            .collect();

        let designated_source = state
            .designated_source
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .and_then(
                |key| match state.sources.iter().find(|s| s.enabled && s.key == key) {
                    Some(entry) => Some(entry.url.clone()),
                    None => {
                        warn!(
                            "Designated source key '{}' does not name an enabled source; ignoring it",
                            key
                        );
                        None
                    }
                },
            );

        MergePolicy {
            sources,
            designated_source,
            rewrite_labels: state.rewrite_labels,
        }
    }
}

fn validate_entry(entry: &SourceEntry) -> AppResult<()> {
    if entry.key.trim().is_empty() {
        return Err(AppError::validation("source key must not be empty"));
    }
    validate_url(&entry.url)
}

fn validate_url(url: &str) -> AppResult<()> {
    if url.trim().is_empty() {
        return Err(AppError::validation("source URL must not be empty"));
    }
    if Url::parse(url).is_err() {
        return Err(AppError::validation(format!("invalid source URL '{url}'")));
    }
    Ok(())
}
