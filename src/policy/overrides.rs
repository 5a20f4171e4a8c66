//! Per-request policy overrides.
//!
//! Playlist requests can reshape the stored policy through query
//! parameters without writing anything back to the store:
//!
//! * `sources` - comma-separated source specs replacing the whole list
//! * `designatedSource` - source spec for the designated source
//! * `designatedUrl` - percent-encoded literal designated URL
//! * `rewriteLabels` - `1`/`true` to rewrite group labels, else off
//! * `config` - base64-encoded JSON bundle carrying any of the above,
//!   applied last so it wins over the individual parameters
//! * `debug` - `1` renders the diagnostics report instead of a playlist
//!
//! A source spec is either a key from the source table or a literal URL.
//! Malformed values are logged and ignored, never fatal: the request
//! proceeds with whatever overrides did parse.

use std::collections::HashMap;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::errors::{OverrideError, OverrideResult};
use crate::models::{MergePolicy, SourceEntry};

/// Override bundle carried by the `config` parameter. Field names follow
/// the query parameter contract, not the config file.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OverrideBundle {
    #[serde(default)]
    sources: Option<Vec<String>>,
    #[serde(default)]
    designated_source: Option<String>,
    #[serde(default)]
    rewrite_labels: Option<bool>,
}

#[derive(Debug, Default, Clone)]
pub struct RequestOverrides {
    pub sources: Option<Vec<String>>,
    pub designated_source: Option<String>,
    pub designated_url: Option<String>,
    pub rewrite_labels: Option<bool>,
    pub debug: bool,
}

impl RequestOverrides {
    /// Extract overrides from already-decoded query parameters.
    pub fn from_params(params: &HashMap<String, String>) -> Self {
        let mut overrides = Self::default();

        if let Some(raw) = params.get("sources") {
            // An empty list is preserved as-is; the pipeline treats it as
            // a configuration error rather than falling back to the store.
            overrides.sources = Some(split_specs(raw));
        }

        if let Some(spec) = params.get("designatedSource") {
            let spec = spec.trim();
            if !spec.is_empty() {
                overrides.designated_source = Some(spec.to_string());
            }
        }

        if let Some(encoded) = params.get("designatedUrl") {
            if !encoded.is_empty() {
                match percent_decode("designatedUrl", encoded) {
                    Ok(url) => overrides.designated_url = Some(url),
                    Err(error) => {
                        warn!("Ignoring malformed designatedUrl override: {}", error);
                    }
                }
            }
        }

        if let Some(value) = params.get("rewriteLabels") {
            overrides.rewrite_labels = Some(parse_flag(value));
        }

        if let Some(encoded) = params.get("config") {
            match decode_bundle(encoded) {
                Ok(bundle) => {
                    debug!("Applying config override bundle");
                    if let Some(specs) = bundle.sources {
                        overrides.sources = Some(specs);
                    }
                    if let Some(spec) = bundle.designated_source {
                        let spec = spec.trim().to_string();
                        if !spec.is_empty() {
                            overrides.designated_source = Some(spec);
                            overrides.designated_url = None;
                        }
                    }
                    if let Some(rewrite) = bundle.rewrite_labels {
                        overrides.rewrite_labels = Some(rewrite);
                    }
                }
                Err(error) => {
                    warn!("Ignoring malformed config override bundle: {}", error);
                }
            }
        }

        overrides.debug = params.get("debug").map(String::as_str) == Some("1");
        overrides
    }

    /// True when any parameter reshapes the policy. Such requests bypass
    /// the response cache in both directions.
    pub fn reshapes_policy(&self) -> bool {
        self.sources.is_some()
            || self.designated_source.is_some()
            || self.designated_url.is_some()
            || self.rewrite_labels.is_some()
    }

    /// Layer these overrides onto a resolved policy. Specs are resolved
    /// against the source table; a key that is not in the table is used
    /// as a literal URL.
    pub fn apply(&self, policy: &mut MergePolicy, table: &[SourceEntry]) {
        if let Some(specs) = &self.sources {
            policy.sources = specs.iter().map(|spec| resolve_spec(spec, table)).collect();
        }
        if let Some(spec) = &self.designated_source {
            policy.designated_source = Some(resolve_spec(spec, table));
        }
        if let Some(url) = &self.designated_url {
            policy.designated_source = Some(url.clone());
        }
        if let Some(rewrite) = self.rewrite_labels {
            policy.rewrite_labels = rewrite;
        }
    }
}

fn split_specs(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|spec| !spec.is_empty())
        .map(str::to_string)
        .collect()
}

fn resolve_spec(spec: &str, table: &[SourceEntry]) -> String {
    table
        .iter()
        .find(|entry| entry.key == spec)
        .map(|entry| entry.url.clone())
        .unwrap_or_else(|| spec.to_string())
}

fn parse_flag(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true")
}

/// Decode a parameter that arrives percent-encoded on top of the normal
/// query encoding.
fn percent_decode(parameter: &str, value: &str) -> OverrideResult<String> {
    urlencoding::decode(value)
        .map(|decoded| decoded.into_owned())
        .map_err(|e| OverrideError::InvalidEncoding {
            parameter: parameter.to_string(),
            message: e.to_string(),
        })
}

fn decode_bundle(encoded: &str) -> OverrideResult<OverrideBundle> {
    let bytes = STANDARD.decode(encoded)?;
    let text = String::from_utf8(bytes)?;
    Ok(serde_json::from_str(&text)?)
}
