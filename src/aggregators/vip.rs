//! Statements from industry VIPs over the last seven days.
//!
//! One search per configured name. Quotes are text wrapped in curly (“”) or
//! straight ("") double quotes, 10 to 200 characters long.

use super::week_before;
use crate::extract::summarize;
use crate::models::{SearchResult, VipVoice};
use crate::search::{SearchGateway, SearchProvider};
use crate::utils::truncate_chars;
use chrono::NaiveDate;
use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, instrument};

/// Summary used when a VIP search returns nothing.
pub const NO_COVERAGE: &str = "No recent coverage found";

const VIP_MAX_RESULTS: usize = 10;
const MAX_QUOTES: usize = 3;
const MAX_SOURCES: usize = 3;
const FALLBACK_SNIPPET_CHARS: usize = 300;

static QUOTE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"“([^”]{10,200})”|"([^"]{10,200})""#).expect("quote pattern compiles")
});

/// Query for `name` over the week ending `today`.
pub fn vip_query(name: &str, today: NaiveDate) -> String {
    format!(
        "{name} 演讲 采访 观点 {}..{} 新能源 汽车",
        week_before(today),
        today
    )
}

/// One [`VipVoice`] per name, in the order given.
#[instrument(level = "info", skip(search, vip_names), fields(vips = vip_names.len()))]
pub async fn get_vip_voices<T: SearchProvider>(
    search: &SearchGateway<T>,
    vip_names: &[String],
    today: NaiveDate,
) -> Vec<VipVoice> {
    let mut voices = Vec::with_capacity(vip_names.len());
    for name in vip_names {
        let results = search.search(&vip_query(name, today), VIP_MAX_RESULTS).await;
        let voice = voice_from_results(name, &results);
        debug!(
            %name,
            quotes = voice.quotes.len(),
            sources = voice.sources.len(),
            "VIP voice collected"
        );
        voices.push(voice);
    }
    voices
}

/// Build the voice for `name` from its search results.
///
/// The summary condenses every quote found, or the start of the first
/// snippet when nobody was quoted.
pub fn voice_from_results(name: &str, results: &[SearchResult]) -> VipVoice {
    if results.is_empty() {
        return VipVoice {
            name: name.to_string(),
            quotes: Vec::new(),
            summary: NO_COVERAGE.to_string(),
            sources: Vec::new(),
        };
    }

    let quotes: Vec<String> = results
        .iter()
        .flat_map(|r| extract_quotes(&r.content))
        .unique()
        .collect();
    let sources: Vec<String> = results
        .iter()
        .map(|r| r.url.clone())
        .filter(|u| !u.is_empty())
        .take(MAX_SOURCES)
        .collect();

    let summary = if quotes.is_empty() {
        summarize(truncate_chars(&results[0].content, FALLBACK_SNIPPET_CHARS))
    } else {
        summarize(&quotes.join("\n"))
    };

    VipVoice {
        name: name.to_string(),
        quotes: quotes.into_iter().take(MAX_QUOTES).collect(),
        summary,
        sources,
    }
}

/// Quoted passages in `text`, in order of appearance.
pub fn extract_quotes(text: &str) -> Vec<String> {
    QUOTE_RE
        .captures_iter(text)
        .filter_map(|c| c.get(1).or_else(|| c.get(2)))
        .map(|m| m.as_str().to_string())
        .collect()
}
