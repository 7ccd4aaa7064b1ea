//! Data models for search results and the assembled report sections.
//!
//! This module defines the structures that flow through the pipeline:
//! - [`SearchResult`]: One normalized hit returned by the search gateway
//! - Section items: [`RankingEntry`], [`LaunchItem`], [`UpcomingItem`],
//!   [`VipVoice`], [`DimmingNewsItem`]
//! - Competitor data: [`CompetitorItem`], [`CompetitorSummary`]
//! - [`ReportSections`]: Everything a single run produces, handed to the
//!   narrative formatter and the HTML renderer
//!
//! Every list keeps first-seen order unless a section explicitly ranks it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A normalized search hit.
///
/// Missing fields from the provider are represented as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct SearchResult {
    pub title: String,
    pub content: String,
    pub url: String,
}

impl SearchResult {
    /// Title and content joined by a newline, the text model extraction runs over.
    pub fn headline_text(&self) -> String {
        format!("{}\n{}", self.title, self.content)
    }
}

/// Price band a sales ranking was collected for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum PriceBand {
    #[serde(rename = ">250k")]
    Over250k,
    #[serde(rename = ">350k")]
    Over350k,
}

impl PriceBand {
    /// Key used for the band in reports (`over_250k`, `over_350k`).
    pub fn key(&self) -> &'static str {
        match self {
            PriceBand::Over250k => "over_250k",
            PriceBand::Over350k => "over_350k",
        }
    }
}

impl fmt::Display for PriceBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriceBand::Over250k => f.write_str(">250k"),
            PriceBand::Over350k => f.write_str(">350k"),
        }
    }
}

/// One model in a sales ranking.
///
/// `rank` is the position the model was extracted at inside its search
/// result, not a sales-volume rank.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RankingEntry {
    pub model: String,
    pub rank: usize,
    pub price_hint: PriceBand,
    pub source: String,
}

/// Rankings for both price bands.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct SalesRankings {
    pub over_250k: Vec<RankingEntry>,
    pub over_350k: Vec<RankingEntry>,
}

impl SalesRankings {
    /// Bands in report order.
    pub fn bands(&self) -> [(PriceBand, &[RankingEntry]); 2] {
        [
            (PriceBand::Over250k, self.over_250k.as_slice()),
            (PriceBand::Over350k, self.over_350k.as_slice()),
        ]
    }
}

/// A car launched during the past week.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LaunchItem {
    pub model: String,
    pub price: String,
    pub highlights: Vec<String>,
    pub source: String,
}

/// A car expected to launch soon.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct UpcomingItem {
    pub model: String,
    pub window: String,
    pub notes: Vec<String>,
    pub source: String,
}

/// Recent public statements attributed to one configured VIP.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct VipVoice {
    pub name: String,
    /// At most three quotes.
    pub quotes: Vec<String>,
    pub summary: String,
    /// At most three source URLs.
    pub sources: Vec<String>,
}

/// A scored smart-dimming industry news item. Unique by title.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DimmingNewsItem {
    pub title: String,
    pub url: String,
    pub score: u32,
    pub summary: String,
}

/// Homepage probe and search links for one competitor URL.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CompetitorItem {
    pub category: String,
    pub url: String,
    pub domain: String,
    /// HTTP status of the homepage fetch, 0 when the request itself failed.
    pub status: u16,
    pub features: Vec<String>,
    pub links: Vec<String>,
}

/// Result of the competitor analysis.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct CompetitorSummary {
    pub total_competitors: usize,
    /// Deduplicated link pool in discovery order.
    pub unique_links: Vec<String>,
    pub items: Vec<CompetitorItem>,
}

/// Reachability of a single URL.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LinkStatus {
    pub url: String,
    pub status: u16,
    pub ok: bool,
}

/// All sections of one newsletter run.
///
/// Built once per run and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ReportSections {
    /// UTC generation time, e.g. `2025-05-06 08:00:00.000000Z`.
    pub generated_at: String,
    pub sales: SalesRankings,
    pub launches: Vec<LaunchItem>,
    pub upcoming: Vec<UpcomingItem>,
    pub vip_voices: Vec<VipVoice>,
    pub dimming_news: Vec<DimmingNewsItem>,
    pub competitors: CompetitorSummary,
}
