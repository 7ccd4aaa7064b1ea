//! Command-line interface definitions for NEV Weekly.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! API keys and the model endpoint can also be provided via environment
//! variables.

use crate::narrative::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for the NEV Weekly generator.
///
/// # Examples
///
/// ```sh
/// # Defaults: read ./config, write ./public
/// nev_weekly
///
/// # Custom locations with search enabled
/// TAVILY_API_KEY=... nev_weekly -c ./config -o ./site
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Directory holding competitors.yaml, vips.yaml, keywords.yaml and competitor_urls.yaml
    #[arg(short, long, default_value = "config")]
    pub config_dir: PathBuf,

    /// Directory the newsletter artifacts are written to
    #[arg(short, long, default_value = "public")]
    pub output_dir: PathBuf,

    /// Tavily search API key; without it every search returns nothing
    #[arg(long, env = "TAVILY_API_KEY", hide_env_values = true)]
    pub tavily_api_key: Option<String>,

    /// Language model API key; without it the narrative is rendered from a template
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: Option<String>,

    /// Base URL of an OpenAI-compatible chat-completions API
    #[arg(long, env = "OPENAI_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub openai_base_url: String,

    /// Model used for the narrative
    #[arg(long, env = "OPENAI_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Smart-dimming search hits to collect before ranking
    #[arg(long, default_value_t = 50)]
    pub dimming_target: usize,

    /// Smart-dimming news items to keep
    #[arg(long, default_value_t = 10)]
    pub dimming_top_n: usize,

    /// Minimum size of the competitor link pool before top-up searches stop
    #[arg(long, default_value_t = 100)]
    pub min_links: usize,
}
