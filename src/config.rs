//! YAML configuration loading.
//!
//! The newsletter is driven by four files in the config directory:
//!
//! | File | Shape | Meaning |
//! |------|-------|---------|
//! | `competitors.yaml` | list | Smart-dimming competitor names |
//! | `vips.yaml` | list | People whose statements are tracked |
//! | `keywords.yaml` | list | Industry keywords for news search and scoring |
//! | `competitor_urls.yaml` | map | Category -> list of competitor homepages |
//!
//! A missing file is not an error and yields an empty value. Malformed YAML
//! is reported to the caller.

use serde_yaml::Value;
use std::error::Error;
use std::path::Path;
use tracing::{info, instrument, warn};

/// Category -> homepage URLs, in document order.
pub type CompetitorUrls = Vec<(String, Vec<String>)>;

/// Everything read from the config directory at startup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewsletterConfig {
    pub competitors: Vec<String>,
    pub vips: Vec<String>,
    pub keywords: Vec<String>,
    pub competitor_urls: CompetitorUrls,
}

impl NewsletterConfig {
    /// Load all four files from `config_dir`.
    #[instrument(level = "info", skip_all, fields(config_dir = %config_dir.display()))]
    pub fn load(config_dir: &Path) -> Result<Self, Box<dyn Error>> {
        let config = Self {
            competitors: load_yaml_list(&config_dir.join("competitors.yaml"))?,
            vips: load_yaml_list(&config_dir.join("vips.yaml"))?,
            keywords: load_yaml_list(&config_dir.join("keywords.yaml"))?,
            competitor_urls: load_yaml_map(&config_dir.join("competitor_urls.yaml"))?,
        };
        info!(
            competitors = config.competitors.len(),
            vips = config.vips.len(),
            keywords = config.keywords.len(),
            url_categories = config.competitor_urls.len(),
            "Loaded configuration"
        );
        Ok(config)
    }
}

/// Read a YAML list of strings.
///
/// A mapping contributes its values instead. Entries are trimmed and blank
/// entries dropped.
pub fn load_yaml_list(path: &Path) -> Result<Vec<String>, Box<dyn Error>> {
    let Some(doc) = read_yaml(path)? else {
        return Ok(Vec::new());
    };
    let values: Vec<&Value> = match &doc {
        Value::Sequence(seq) => seq.iter().collect(),
        Value::Mapping(map) => map.values().collect(),
        _ => {
            warn!(path = %path.display(), "Expected a YAML list; ignoring file");
            Vec::new()
        }
    };
    Ok(values
        .into_iter()
        .filter_map(scalar_to_string)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect())
}

/// Read a YAML mapping of category -> URL list, keeping document order.
///
/// A scalar value counts as a single URL.
pub fn load_yaml_map(path: &Path) -> Result<CompetitorUrls, Box<dyn Error>> {
    let Some(doc) = read_yaml(path)? else {
        return Ok(Vec::new());
    };
    let Value::Mapping(map) = doc else {
        warn!(path = %path.display(), "Expected a YAML mapping; ignoring file");
        return Ok(Vec::new());
    };

    let mut out = Vec::with_capacity(map.len());
    for (key, value) in &map {
        let Some(category) = scalar_to_string(key) else {
            continue;
        };
        let urls = match value {
            Value::Sequence(seq) => seq
                .iter()
                .filter_map(scalar_to_string)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            other => scalar_to_string(other)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .into_iter()
                .collect(),
        };
        out.push((category, urls));
    }
    Ok(out)
}

fn read_yaml(path: &Path) -> Result<Option<Value>, Box<dyn Error>> {
    if !path.exists() {
        warn!(path = %path.display(), "Config file not found; using empty value");
        return Ok(None);
    }
    let text = std::fs::read_to_string(path)?;
    let doc: Value = serde_yaml::from_str(&text)?;
    Ok(Some(doc))
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
