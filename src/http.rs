//! Shared HTTP clients.
//!
//! All clients are built once at startup and reused read-only for the whole
//! run.

use reqwest::Client;
use reqwest::redirect::Policy;
use std::time::Duration;
use tracing::{debug, instrument};

/// User agent sent with direct page fetches.
pub const USER_AGENT: &str = "Mozilla/5.0";

/// Timeout for competitor homepage fetches.
pub const PAGE_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Timeout for link validation requests.
pub const LINK_CHECK_TIMEOUT: Duration = Duration::from_secs(8);

const API_TIMEOUT: Duration = Duration::from_secs(30);
const MODEL_TIMEOUT: Duration = Duration::from_secs(120);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for JSON APIs such as the search provider.
pub fn api_client() -> reqwest::Result<Client> {
    Client::builder()
        .timeout(API_TIMEOUT)
        .connect_timeout(CONNECT_TIMEOUT)
        .build()
}

/// Client for chat-completion calls, which can take a while to answer.
pub fn model_client() -> reqwest::Result<Client> {
    Client::builder()
        .timeout(MODEL_TIMEOUT)
        .connect_timeout(CONNECT_TIMEOUT)
        .build()
}

/// Redirect-following browser-like client with the given total timeout.
#[instrument(level = "debug")]
pub fn page_client(timeout: Duration) -> reqwest::Result<Client> {
    debug!("Building page client");
    Client::builder()
        .timeout(timeout)
        .redirect(Policy::limited(10))
        .user_agent(USER_AGENT)
        .build()
}
