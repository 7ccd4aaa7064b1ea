//! HTTP reachability checks for collected links.
//!
//! Every URL is requested once, in order. A status in `200..400` counts as
//! reachable; a request that fails outright is recorded as status 0.

use crate::models::LinkStatus;
use futures::stream::{self, StreamExt};
use reqwest::Client;
use tracing::{debug, info, instrument, warn};

/// Check each URL with `client`, preserving input order.
#[instrument(level = "info", skip_all, fields(count = urls.len()))]
pub async fn check_links(client: &Client, urls: &[String]) -> Vec<LinkStatus> {
    let report: Vec<LinkStatus> = stream::iter(urls)
        .then(|url| check_link(client, url))
        .collect()
        .await;
    let invalid = report.iter().filter(|l| !l.ok).count();
    info!(checked = report.len(), invalid, "Link validation finished");
    report
}

async fn check_link(client: &Client, url: &str) -> LinkStatus {
    let status = match client.get(url).send().await {
        Ok(resp) => resp.status().as_u16(),
        Err(e) => {
            warn!(%url, error = %e, "Link check failed");
            0
        }
    };
    debug!(%url, status, "Checked link");
    LinkStatus {
        url: url.to_string(),
        status,
        ok: is_reachable(status),
    }
}

/// `true` for 2xx and 3xx.
pub fn is_reachable(status: u16) -> bool {
    (200..400).contains(&status)
}
