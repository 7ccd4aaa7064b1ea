//! Heuristic text extraction over free-text search snippets.
//!
//! Everything here is best-effort: a miss yields an empty list or the
//! [`PRICE_NOT_FOUND`] sentinel, never an error.
//!
//! Model names are pulled by an ordered list of independent [`MatchRule`]s.
//! Each rule yields candidate strings; the candidates of all rules are
//! concatenated in rule order and deduplicated by first occurrence. The rule
//! table [`MODEL_NAME_PATTERNS`] is plain data so alternative rule sets can be
//! built with [`ModelNameMatcher::from_patterns`].

use crate::utils::truncate_chars;
use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::trace;

/// Upper bound on names returned by [`extract_model_names`].
pub const MAX_MODEL_NAMES: usize = 20;

/// Returned by [`extract_price`] when no price is mentioned.
pub const PRICE_NOT_FOUND: &str = "N/A";

const SUMMARY_MAX_CHARS: usize = 240;
const MAX_BULLETS: usize = 5;
const MAX_SENTENCES: usize = 3;
const MIN_SENTENCE_CHARS: usize = 30;

/// Built-in model-name rules as `(name, pattern)`, in match order.
///
/// Brand rules come first so that a brand-prefixed name wins over a stray
/// capitalized token in the same headline.
pub const MODEL_NAME_PATTERNS: &[(&str, &str)] = &[
    ("li_auto", r"理想[LM][0-9]?"),
    ("aito", r"问界[\w\-]+"),
    ("byd", r"比亚迪[\w\-]+"),
    ("nio", r"蔚来[\w\-]+"),
    ("xpeng", r"小鹏[\w\-]+"),
    ("tesla", r"特斯拉Model\s?[S3XY]"),
    ("capitalized", r"[A-Z][A-Za-z0-9\-\s]{1,20}\b(?:Pro|Max|Plus)?"),
];

static DEFAULT_MATCHER: Lazy<ModelNameMatcher> = Lazy::new(|| {
    ModelNameMatcher::from_patterns(MODEL_NAME_PATTERNS, MAX_MODEL_NAMES)
        .expect("built-in model name patterns compile")
});

static PRICE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{2,3})\s*万|RMB\s*(\d{5,6})").expect("price pattern compiles"));

static BULLET_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[•\-]\s*(.{10,120})").expect("bullet pattern compiles"));

static SENTENCE_BREAK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[。.!?]\s+").expect("sentence pattern compiles"));

static WHITESPACE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("whitespace pattern compiles"));

/// A single named pattern producing candidate strings.
#[derive(Debug, Clone)]
pub struct MatchRule {
    pub name: String,
    regex: Regex,
}

impl MatchRule {
    pub fn new(name: &str, pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            name: name.to_string(),
            regex: Regex::new(pattern)?,
        })
    }

    /// All non-overlapping matches in `text`, trimmed, blanks dropped.
    pub fn candidates<'t>(&self, text: &'t str) -> impl Iterator<Item = &'t str> {
        self.regex
            .find_iter(text)
            .map(|m| m.as_str().trim())
            .filter(|s| !s.is_empty())
    }
}

/// Ordered union of [`MatchRule`]s with a result cap.
#[derive(Debug, Clone)]
pub struct ModelNameMatcher {
    rules: Vec<MatchRule>,
    limit: usize,
}

impl ModelNameMatcher {
    pub fn new(rules: Vec<MatchRule>, limit: usize) -> Self {
        Self { rules, limit }
    }

    /// Compile a rule table such as [`MODEL_NAME_PATTERNS`].
    pub fn from_patterns(patterns: &[(&str, &str)], limit: usize) -> Result<Self, regex::Error> {
        let rules = patterns
            .iter()
            .map(|(name, pattern)| MatchRule::new(name, pattern))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(rules, limit))
    }

    pub fn extract(&self, text: &str) -> Vec<String> {
        self.rules
            .iter()
            .flat_map(|rule| {
                rule.candidates(text).inspect(move |candidate| {
                    trace!(rule = %rule.name, %candidate, "Model name candidate")
                })
            })
            .unique()
            .take(self.limit)
            .map(str::to_string)
            .collect()
    }
}

/// Vehicle model names mentioned in `text`, unique, at most [`MAX_MODEL_NAMES`].
pub fn extract_model_names(text: &str) -> Vec<String> {
    DEFAULT_MATCHER.extract(text)
}

/// First price mention such as `28万` or `RMB 259000`, verbatim.
pub fn extract_price(text: &str) -> String {
    PRICE_RE
        .find(text)
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| PRICE_NOT_FOUND.to_string())
}

/// Up to five bullet lines (`•` or `-`), or failing that up to three long sentences.
pub fn extract_highlights(text: &str) -> Vec<String> {
    let bullets: Vec<String> = BULLET_RE
        .captures_iter(text)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .take(MAX_BULLETS)
        .collect();
    if !bullets.is_empty() {
        return bullets;
    }

    SENTENCE_BREAK_RE
        .split(text)
        .map(str::trim)
        .filter(|part| part.chars().count() > MIN_SENTENCE_CHARS)
        .take(MAX_SENTENCES)
        .map(str::to_string)
        .collect()
}

/// Collapse whitespace and cap at 240 characters, appending `…` when cut.
pub fn summarize(text: &str) -> String {
    let collapsed = WHITESPACE_RE.replace_all(text, " ");
    let collapsed = collapsed.trim();
    if collapsed.chars().count() <= SUMMARY_MAX_CHARS {
        return collapsed.to_string();
    }
    format!("{}…", truncate_chars(collapsed, SUMMARY_MAX_CHARS))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brand_names_come_before_generic_tokens() {
        let models = extract_model_names("比亚迪海豹 Pro 上市\n售价28万");
        assert_eq!(models[0], "比亚迪海豹");
        assert!(models.contains(&"Pro".to_string()));
    }

    #[test]
    fn test_model_names_are_unique_in_first_seen_order() {
        let text = "理想L9 对比 问界M9，理想L9 销量领先；蔚来ET7 和 小鹏G9 紧随其后";
        let models = extract_model_names(text);
        assert_eq!(models[..4], ["理想L9", "问界M9", "蔚来ET7", "小鹏G9"]);
        assert!(models.iter().all_unique());
        assert_eq!(models.iter().filter(|m| *m == "理想L9").count(), 1);
    }

    #[test]
    fn test_model_names_capped_at_twenty() {
        let text = (0..40)
            .map(|i| format!("问界M{i}"))
            .collect::<Vec<_>>()
            .join(" ");
        let models = extract_model_names(&text);
        assert_eq!(models.len(), MAX_MODEL_NAMES);
        assert_eq!(models[0], "问界M0");
        assert!(models.iter().all_unique());
    }

    #[test]
    fn test_tesla_rule() {
        let models = extract_model_names("特斯拉Model Y 降价");
        assert_eq!(models[0], "特斯拉Model Y");
    }

    #[test]
    fn test_no_models_in_plain_text() {
        assert!(extract_model_names("本周 新能源 市场 平稳").is_empty());
        assert!(extract_model_names("").is_empty());
    }

    #[test]
    fn test_custom_rule_table() {
        let matcher = ModelNameMatcher::from_patterns(&[("zeekr", r"极氪\d+")], 1).unwrap();
        assert_eq!(matcher.extract("极氪001 与 极氪007"), vec!["极氪001"]);
    }

    #[test]
    fn test_invalid_rule_is_rejected() {
        assert!(MatchRule::new("broken", "(").is_err());
    }

    #[test]
    fn test_extract_price_wan() {
        assert_eq!(extract_price("新车售价28万起，续航700km"), "28万");
        assert_eq!(extract_price("售价 35 万元"), "35 万");
    }

    #[test]
    fn test_extract_price_rmb() {
        let text = "Starting at RMB 259000 for the base trim";
        let price = extract_price(text);
        assert_eq!(price, "RMB 259000");
        assert!(text.contains(&price));
    }

    #[test]
    fn test_extract_price_missing() {
        assert_eq!(extract_price("价格待公布"), PRICE_NOT_FOUND);
        assert_eq!(extract_price("5万"), PRICE_NOT_FOUND);
    }

    #[test]
    fn test_highlights_prefer_bullets() {
        let text = "新车亮点如下\n• 续航提升至 700 公里以上\n• 搭载全新智能驾驶系统\n普通句子。";
        let highlights = extract_highlights(text);
        assert_eq!(
            highlights,
            vec!["续航提升至 700 公里以上", "搭载全新智能驾驶系统"]
        );
    }

    #[test]
    fn test_highlights_capped_at_five() {
        let text = (0..8)
            .map(|i| format!("- highlight number {i} here"))
            .collect::<Vec<_>>()
            .join("\n");
        assert_eq!(extract_highlights(&text).len(), 5);
    }

    #[test]
    fn test_highlights_fall_back_to_long_sentences() {
        let text = "Short one. This sentence is definitely longer than thirty characters. \
                    Another sentence that also exceeds the thirty character minimum! Tiny?";
        let highlights = extract_highlights(text);
        assert_eq!(highlights.len(), 2);
        assert!(highlights[0].starts_with("This sentence"));
    }

    #[test]
    fn test_highlights_empty_when_nothing_qualifies() {
        assert!(extract_highlights("too short").is_empty());
    }

    #[test]
    fn test_summarize_collapses_whitespace() {
        assert_eq!(summarize("  a \n\t b   c "), "a b c");
    }

    #[test]
    fn test_summarize_truncates_long_text() {
        let text = "字".repeat(300);
        let summary = summarize(&text);
        assert_eq!(summary.chars().count(), 241);
        assert!(summary.ends_with('…'));
    }

    #[test]
    fn test_summarize_idempotent_on_short_text() {
        for text in ["", "hello   world", &"x".repeat(240)] {
            let once = summarize(text);
            assert_eq!(summarize(&once), once);
        }
    }
}
