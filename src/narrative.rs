//! Prose for the weekly report and Markdown for the competitor report.
//!
//! [`NarrativeFormatter`] is chosen once at startup. With a model API key it
//! asks an OpenAI-compatible chat-completions endpoint to write the text;
//! without one it renders a fixed template. The remote variant falls back to
//! the same template on any failure, so both entry points always return
//! usable text and never touch the network in deterministic mode.

use crate::models::{CompetitorSummary, ReportSections};
use crate::retry::RetryPolicy;
use crate::utils::truncate_for_log;
use reqwest::Client;
use serde::Serialize;
use serde_json::{Value, json};
use std::error::Error;
use std::fmt;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

const WEEKLY_SYSTEM_PROMPT: &str = "You are an automotive industry analyst. \
Generate a concise, professional NEV Weekly report with clear sections: \
Sales Rankings, New Launches, Upcoming Releases, VIP Voices, Smart Dimming Intelligence. \
Use bullet points for items and keep it factual.";

const COMPETITOR_SYSTEM_PROMPT: &str = "Generate a concise competitor analysis in Markdown \
with headings per category, bulleted features per company, and note notable partnerships, \
manufacturing, and patents.";

const WEEKLY_TEMPERATURE: f32 = 0.3;
const COMPETITOR_TEMPERATURE: f32 = 0.2;

/// Minimal OpenAI-compatible chat-completions client.
///
/// Every call goes through a [`RetryPolicy`].
pub struct ChatClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    retry: RetryPolicy,
}

impl ChatClient {
    pub fn new(client: Client, api_key: String, base_url: &str, model: &str) -> Self {
        Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            retry: RetryPolicy::default(),
        }
    }

    #[cfg(test)]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// One system + user exchange, retried with backoff.
    ///
    /// An empty answer counts as a failed attempt.
    #[instrument(level = "info", skip_all, fields(model = %self.model))]
    pub async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        temperature: f32,
    ) -> Result<String, Box<dyn Error>> {
        self.retry
            .run("chat completion", || {
                self.complete_once(system_prompt, user_prompt, temperature)
            })
            .await
    }

    async fn complete_once(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        temperature: f32,
    ) -> Result<String, Box<dyn Error>> {
        let t0 = Instant::now();
        let url = format!("{}/chat/completions", self.base_url);
        let body = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": system_prompt},
                {"role": "user", "content": user_prompt}
            ],
            "temperature": temperature,
        });

        let value: Value = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let content = value["choices"][0]["message"]["content"]
            .as_str()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or("model returned an empty completion")?;

        info!(
            elapsed_ms = t0.elapsed().as_millis() as u64,
            chars = content.chars().count(),
            "Completion received"
        );
        debug!(preview = %truncate_for_log(content, 200), "Completion preview");
        Ok(content.to_string())
    }
}

impl fmt::Debug for ChatClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatClient")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("retry", &self.retry)
            .finish()
    }
}

/// Narrative source, selected by capability at construction time.
#[derive(Debug)]
pub enum NarrativeFormatter {
    /// Ask a language model, falling back to the template on failure.
    Remote(ChatClient),
    /// Render the fixed template only.
    Deterministic,
}

impl NarrativeFormatter {
    /// Remote when a non-blank API key is given, deterministic otherwise.
    pub fn new(client: Client, api_key: Option<String>, base_url: &str, model: &str) -> Self {
        match api_key.filter(|k| !k.trim().is_empty()) {
            Some(key) => {
                info!(%base_url, %model, "Language model summaries enabled");
                NarrativeFormatter::Remote(ChatClient::new(client, key, base_url, model))
            }
            None => {
                warn!("OPENAI_API_KEY not set; using template narrative");
                NarrativeFormatter::Deterministic
            }
        }
    }

    /// Weekly report prose for `sections`.
    #[instrument(level = "info", skip_all)]
    pub async fn weekly_report(&self, sections: &ReportSections) -> String {
        match self {
            NarrativeFormatter::Deterministic => fallback_weekly_report(sections),
            NarrativeFormatter::Remote(chat) => {
                match ask_about(
                    chat,
                    WEEKLY_SYSTEM_PROMPT,
                    "Summarize this structured data into a weekly report:",
                    sections,
                    WEEKLY_TEMPERATURE,
                )
                .await
                {
                    Ok(text) => text,
                    Err(e) => {
                        warn!(error = %e, "Weekly report generation failed; using template");
                        fallback_weekly_report(sections)
                    }
                }
            }
        }
    }

    /// Competitor analysis Markdown for `summary`.
    #[instrument(level = "info", skip_all)]
    pub async fn competitor_report(&self, summary: &CompetitorSummary) -> String {
        match self {
            NarrativeFormatter::Deterministic => fallback_competitor_report(summary),
            NarrativeFormatter::Remote(chat) => {
                match ask_about(
                    chat,
                    COMPETITOR_SYSTEM_PROMPT,
                    "Analyze this competitor dataset:",
                    summary,
                    COMPETITOR_TEMPERATURE,
                )
                .await
                {
                    Ok(text) => text,
                    Err(e) => {
                        warn!(error = %e, "Competitor report generation failed; using template");
                        fallback_competitor_report(summary)
                    }
                }
            }
        }
    }
}

async fn ask_about<D: Serialize>(
    chat: &ChatClient,
    system_prompt: &str,
    instruction: &str,
    data: &D,
    temperature: f32,
) -> Result<String, Box<dyn Error>> {
    let payload = serde_json::to_string_pretty(data)?;
    chat.complete(system_prompt, &format!("{instruction}\n{payload}"), temperature)
        .await
}

/// Template weekly report covering every section.
pub fn fallback_weekly_report(sections: &ReportSections) -> String {
    let mut lines = vec![
        "NEV Weekly Report".to_string(),
        format!("Generated: {}", sections.generated_at),
        String::new(),
        "Sales Rankings (>250k and >350k):".to_string(),
    ];
    for (band, entries) in sections.sales.bands() {
        lines.push(format!("- {}:", band.key()));
        for entry in entries {
            lines.push(format!(
                "  {}. {} ({})",
                entry.rank, entry.model, entry.price_hint
            ));
        }
    }

    lines.push(String::new());
    lines.push("New Car Launches:".to_string());
    for launch in &sections.launches {
        lines.push(format!(
            "- {} | {} | Highlights: {}",
            launch.model,
            launch.price,
            launch.highlights.join(", ")
        ));
    }

    lines.push(String::new());
    lines.push("Upcoming (Next Month):".to_string());
    for upcoming in &sections.upcoming {
        lines.push(format!("- {} | {}", upcoming.model, upcoming.notes.join(", ")));
    }

    lines.push(String::new());
    lines.push("VIP Voices (Last 7 Days):".to_string());
    for voice in &sections.vip_voices {
        lines.push(format!("- {}: {}", voice.name, voice.summary));
    }

    lines.push(String::new());
    lines.push("Smart Dimming Top 10:".to_string());
    for news in &sections.dimming_news {
        lines.push(format!("- {} | {}", news.title, news.summary));
    }

    lines.join("\n")
}

/// Template competitor report in Markdown.
pub fn fallback_competitor_report(summary: &CompetitorSummary) -> String {
    let mut lines = vec![
        "# Competitor Analysis".to_string(),
        format!("Total competitors: {}", summary.total_competitors),
        format!("Unique links collected: {}", summary.unique_links.len()),
        String::new(),
    ];
    for item in &summary.items {
        lines.push(format!(
            "- [{}] {} status={} features={}",
            item.category,
            item.domain,
            item.status,
            item.features.join(", ")
        ));
    }
    lines.join("\n")
}
