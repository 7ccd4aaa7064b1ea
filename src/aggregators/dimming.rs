//! Smart-dimming glass industry intelligence.
//!
//! Queries are the cross product of configured competitors and keywords.
//! Collection stops as soon as `target_count` hits are gathered, both inside
//! a query's result list and across queries. Hits are then scored, deduped by
//! exact title (first occurrence wins) and stably sorted by descending score.
//!
//! # Scoring
//!
//! | Signal | Points |
//! |--------|--------|
//! | Each configured keyword found (case-insensitive) | +2 |
//! | Each tag in [`CATEGORY_TAGS`] found | +1 |

use crate::extract::summarize;
use crate::models::DimmingNewsItem;
use crate::search::{SearchGateway, SearchProvider};
use crate::utils::truncate_chars;
use std::collections::HashSet;
use tracing::{debug, info, instrument};

/// Tags signalling partnerships, technology, manufacturing and patents.
pub const CATEGORY_TAGS: [&str; 7] = [
    "partnership",
    "合作",
    "技术",
    "factory",
    "工厂",
    "量产",
    "专利",
];

const PER_QUERY_MAX_RESULTS: usize = 10;
const SUMMARY_SOURCE_CHARS: usize = 600;

/// A search hit kept for scoring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectedNews {
    pub title: String,
    pub url: String,
    pub content: String,
}

pub fn dimming_query(competitor: &str, keyword: &str) -> String {
    format!("{competitor} {keyword} 智能 调光 玻璃 新闻 合作 工厂 技术")
}

/// Top `top_n` smart-dimming news items across all competitor/keyword pairs.
#[instrument(
    level = "info",
    skip(search, competitors, keywords),
    fields(competitors = competitors.len(), keywords = keywords.len())
)]
pub async fn get_smart_dimming_news<T: SearchProvider>(
    search: &SearchGateway<T>,
    competitors: &[String],
    keywords: &[String],
    target_count: usize,
    top_n: usize,
) -> Vec<DimmingNewsItem> {
    let per_query = PER_QUERY_MAX_RESULTS.min(target_count);
    let mut collected: Vec<CollectedNews> = Vec::new();

    'queries: for competitor in competitors {
        for keyword in keywords {
            if collected.len() >= target_count {
                break 'queries;
            }
            let query = dimming_query(competitor, keyword);
            for hit in search.search(&query, per_query).await {
                let title = hit.title.trim();
                let url = hit.url.trim();
                if !title.is_empty() && !url.is_empty() {
                    collected.push(CollectedNews {
                        title: title.to_string(),
                        url: url.to_string(),
                        content: hit.content,
                    });
                }
                if collected.len() >= target_count {
                    break 'queries;
                }
            }
        }
    }

    info!(collected = collected.len(), "Collected smart-dimming news");
    rank_news(collected, keywords, top_n)
}

/// Keyword and tag score of `content`.
pub fn score_content(content: &str, keywords: &[String]) -> u32 {
    let low = content.to_lowercase();
    let keyword_hits = keywords
        .iter()
        .filter(|kw| low.contains(&kw.to_lowercase()))
        .count() as u32;
    let tag_hits = CATEGORY_TAGS.iter().filter(|tag| low.contains(*tag)).count() as u32;
    keyword_hits * 2 + tag_hits
}

/// Dedupe by title, score, and keep the best `top_n`.
///
/// Ties keep collection order.
pub fn rank_news(
    collected: Vec<CollectedNews>,
    keywords: &[String],
    top_n: usize,
) -> Vec<DimmingNewsItem> {
    let mut seen = HashSet::new();
    let mut unique: Vec<DimmingNewsItem> = Vec::new();
    for news in collected {
        if !seen.insert(news.title.clone()) {
            debug!(title = %news.title, "Dropping duplicate title");
            continue;
        }
        unique.push(DimmingNewsItem {
            score: score_content(&news.content, keywords),
            summary: summarize(truncate_chars(&news.content, SUMMARY_SOURCE_CHARS)),
            title: news.title,
            url: news.url,
        });
    }
    unique.sort_by(|a, b| b.score.cmp(&a.score));
    unique.truncate(top_n);
    unique
}
