//! Competitor landscape for smart-dimming glass.
//!
//! For each configured `(category, url)` pair the homepage is fetched
//! directly and matched against [`FEATURE_KEYWORDS`], and one search per
//! domain collects related links. All links then go into a deduplicated
//! [`LinkPool`]. When the pool is smaller than the requested minimum,
//! `site:<domain>` searches top it up, competitor by competitor, until the
//! minimum is met or every competitor has been tried.
//!
//! A failed fetch is recorded with status 0 and never aborts the batch.

use crate::config::CompetitorUrls;
use crate::models::{CompetitorItem, CompetitorSummary};
use crate::search::{SearchGateway, SearchProvider};
use crate::utils::{domain_of, truncate_chars};
use futures::stream::{self, StreamExt};
use reqwest::Client;
use std::collections::HashSet;
use tracing::{debug, info, instrument, warn};

/// Feature vocabulary, in reporting order.
pub const FEATURE_KEYWORDS: [&str; 12] = [
    "electrochromic",
    "EC glass",
    "smart window",
    "PDLC",
    "SPD",
    "privacy glass",
    "automotive",
    "architectural",
    "factory",
    "manufacturing",
    "partnership",
    "patent",
];

const MAX_FEATURES: usize = 6;
const MAX_ITEM_LINKS: usize = 5;
const BODY_PREFIX_CHARS: usize = 2000;
const DOMAIN_MAX_RESULTS: usize = 10;
const TOP_UP_MAX_RESULTS: usize = 20;

/// Insertion-ordered set of URLs. Only ever grows.
#[derive(Debug, Default, Clone)]
pub struct LinkPool {
    seen: HashSet<String>,
    links: Vec<String>,
}

impl LinkPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `url` unless it is blank or already present. Returns whether it was added.
    pub fn insert(&mut self, url: &str) -> bool {
        if url.is_empty() || self.seen.contains(url) {
            return false;
        }
        self.seen.insert(url.to_string());
        self.links.push(url.to_string());
        true
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn into_links(self) -> Vec<String> {
        self.links
    }
}

pub fn domain_links_query(domain: &str) -> String {
    format!("{domain} electrochromic PDLC SPD smart window automotive architectural factory partnership")
}

pub fn top_up_query(domain: &str) -> String {
    format!("site:{domain} smart window electrochromic")
}

/// Fetch a homepage, returning its status and the first 2000 characters.
///
/// Any request failure yields `(0, "")`. Non-2xx responses keep their status.
#[instrument(level = "info", skip(client))]
pub async fn fetch_home(client: &Client, url: &str) -> (u16, String) {
    let resp = match client.get(url).send().await {
        Ok(resp) => resp,
        Err(e) => {
            warn!(error = %e, "Homepage fetch failed");
            return (0, String::new());
        }
    };
    let status = resp.status().as_u16();
    match resp.text().await {
        Ok(body) => {
            debug!(status, bytes = body.len(), "Fetched homepage");
            (status, truncate_chars(&body, BODY_PREFIX_CHARS).to_string())
        }
        Err(e) => {
            warn!(status, error = %e, "Reading homepage body failed");
            (0, String::new())
        }
    }
}

/// Vocabulary terms present in `body`, case-insensitive, at most six.
pub fn detect_features(body: &str) -> Vec<String> {
    let low = body.to_lowercase();
    FEATURE_KEYWORDS
        .iter()
        .filter(|kw| low.contains(&kw.to_lowercase()))
        .take(MAX_FEATURES)
        .map(|kw| kw.to_string())
        .collect()
}

/// Probe every configured competitor and build the link pool.
#[instrument(level = "info", skip(search, client, url_map), fields(categories = url_map.len()))]
pub async fn analyze_competitors<T: SearchProvider>(
    search: &SearchGateway<T>,
    client: &Client,
    url_map: &CompetitorUrls,
    min_links: usize,
) -> CompetitorSummary {
    let pairs: Vec<(&str, &str)> = url_map
        .iter()
        .flat_map(|(category, urls)| urls.iter().map(move |u| (category.as_str(), u.as_str())))
        .collect();

    let items: Vec<CompetitorItem> = stream::iter(pairs)
        .then(|(category, url)| analyze_one(search, client, category, url))
        .collect()
        .await;

    let mut pool = LinkPool::new();
    for link in items.iter().flat_map(|item| item.links.iter()) {
        pool.insert(link);
    }
    info!(items = items.len(), links = pool.len(), min_links, "Collected competitor links");

    if pool.len() < min_links {
        top_up_links(search, url_map, &mut pool, min_links).await;
    }
    if pool.is_empty() {
        warn!("No competitor links collected");
    }

    CompetitorSummary {
        total_competitors: items.len(),
        unique_links: pool.into_links(),
        items,
    }
}

async fn analyze_one<T: SearchProvider>(
    search: &SearchGateway<T>,
    client: &Client,
    category: &str,
    url: &str,
) -> CompetitorItem {
    let (status, body) = fetch_home(client, url).await;
    let domain = domain_of(url);
    let links = search
        .search(&domain_links_query(&domain), DOMAIN_MAX_RESULTS)
        .await
        .into_iter()
        .map(|hit| hit.url)
        .filter(|u| !u.is_empty())
        .take(MAX_ITEM_LINKS)
        .collect();

    CompetitorItem {
        category: category.to_string(),
        url: url.to_string(),
        features: detect_features(&body),
        domain,
        status,
        links,
    }
}

/// Best-effort `site:` searches until `pool` holds `min_links` URLs.
#[instrument(level = "info", skip_all, fields(start = pool.len(), min_links = min_links))]
pub async fn top_up_links<T: SearchProvider>(
    search: &SearchGateway<T>,
    url_map: &CompetitorUrls,
    pool: &mut LinkPool,
    min_links: usize,
) {
    'competitors: for url in url_map.iter().flat_map(|(_, urls)| urls.iter()) {
        if pool.len() >= min_links {
            break;
        }
        let hits = search
            .search(&top_up_query(&domain_of(url)), TOP_UP_MAX_RESULTS)
            .await;
        for hit in hits {
            pool.insert(&hit.url);
            if pool.len() >= min_links {
                break 'competitors;
            }
        }
    }
    info!(links = pool.len(), "Link top-up finished");
}
