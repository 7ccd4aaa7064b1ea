//! HTML rendering for the newsletter page.
//!
//! [`render_html`] is a pure function of the narrative and the report
//! sections. Every interpolated value is escaped; list fields are rendered in
//! the order they appear in the sections.

use crate::models::{CompetitorSummary, RankingEntry, ReportSections};
use html_escape::{encode_double_quoted_attribute as attr, encode_text as text};
use std::fmt::Write;

/// Full `index.html` document.
pub fn render_html(narrative: &str, sections: &ReportSections) -> String {
    let mut html = String::with_capacity(8 * 1024);

    let _ = write!(
        html,
        r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8"/>
  <meta name="viewport" content="width=device-width,initial-scale=1"/>
  <title>NEV Weekly Newsletter</title>
  <link rel="stylesheet" href="./style.css"/>
</head>
<body>
  <div class="container">
    <header>
      <h1>NEV Weekly Newsletter</h1>
      <p class="meta">Generated at {generated}</p>
    </header>

    <section class="section">
      <h2>Executive Summary</h2>
      <pre style="white-space:pre-wrap">{narrative}</pre>
    </section>
"#,
        generated = text(&sections.generated_at),
        narrative = text(narrative),
    );

    html.push_str("\n    <section class=\"section\">\n      <h2>Sales Rankings</h2>\n");
    push_ranking(&mut html, "&gt; 250k RMB", &sections.sales.over_250k);
    push_ranking(&mut html, "&gt; 350k RMB", &sections.sales.over_350k);
    html.push_str("    </section>\n");

    html.push_str("\n    <section class=\"section\">\n      <h2>New Car Launches</h2>\n");
    for launch in &sections.launches {
        let _ = writeln!(
            html,
            r#"      <div class="item"><strong>{}</strong> — {}<br/><small>{}</small> <a href="{}">source</a></div>"#,
            text(&launch.model),
            text(&launch.price),
            text(&launch.highlights.join(", ")),
            attr(&launch.source),
        );
    }
    html.push_str("    </section>\n");

    html.push_str("\n    <section class=\"section\">\n      <h2>Upcoming Releases (Next Month)</h2>\n");
    for upcoming in &sections.upcoming {
        let _ = writeln!(
            html,
            r#"      <div class="item"><strong>{}</strong> — {}<br/><small>{}</small> <a href="{}">source</a></div>"#,
            text(&upcoming.model),
            text(&upcoming.window),
            text(&upcoming.notes.join(", ")),
            attr(&upcoming.source),
        );
    }
    html.push_str("    </section>\n");

    html.push_str("\n    <section class=\"section\">\n      <h2>VIP Voices</h2>\n");
    for voice in &sections.vip_voices {
        let _ = write!(
            html,
            r#"      <div class="item"><strong>{}</strong><br/><small>{}</small>"#,
            text(&voice.name),
            text(&voice.summary),
        );
        for quote in &voice.quotes {
            let _ = write!(html, "<blockquote>{}</blockquote>", text(quote));
        }
        for source in &voice.sources {
            let _ = write!(html, r#" <a href="{}">source</a>"#, attr(source));
        }
        html.push_str("</div>\n");
    }
    html.push_str("    </section>\n");

    html.push_str(
        "\n    <section class=\"section\">\n      <h2>Smart Dimming Intelligence</h2>\n      <ol>\n",
    );
    for news in &sections.dimming_news {
        let _ = writeln!(
            html,
            r#"        <li><a href="{}">{}</a><br/><small>{}</small></li>"#,
            attr(&news.url),
            text(&news.title),
            text(&news.summary),
        );
    }
    html.push_str("      </ol>\n    </section>\n");

    push_competitors(&mut html, &sections.competitors);

    html.push_str(
        r#"
    <footer class="section">
      <small>Powered by Tavily search + LLM summarization. This page updates weekly.</small>
    </footer>
  </div>
</body>
</html>
"#,
    );
    html
}

fn push_ranking(html: &mut String, label: &str, entries: &[RankingEntry]) {
    let _ = write!(
        html,
        "      <div class=\"item\">\n        <strong>{label}</strong>\n        <ol>\n"
    );
    for entry in entries {
        let _ = writeln!(
            html,
            r#"          <li>{} (rank {}) <a href="{}">source</a></li>"#,
            text(&entry.model),
            entry.rank,
            attr(&entry.source),
        );
    }
    html.push_str("        </ol>\n      </div>\n");
}

fn push_competitors(html: &mut String, competitors: &CompetitorSummary) {
    html.push_str("\n    <section class=\"section\">\n      <h2>Competitor Analysis</h2>\n");
    for item in &competitors.items {
        let _ = writeln!(
            html,
            r#"      <div class="item"><strong>[{}] {}</strong> — status {}<br/><small>{}</small></div>"#,
            text(&item.category),
            text(&item.domain),
            item.status,
            text(&item.features.join(", ")),
        );
    }
    html.push_str("    </section>\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        CompetitorItem, DimmingNewsItem, LaunchItem, PriceBand, SalesRankings, VipVoice,
    };

    fn sections() -> ReportSections {
        ReportSections {
            generated_at: "2025-05-13 08:00:00.000000Z".to_string(),
            sales: SalesRankings {
                over_250k: vec![RankingEntry {
                    model: "理想L9".to_string(),
                    rank: 1,
                    price_hint: PriceBand::Over250k,
                    source: "https://a?x=1&y=2".to_string(),
                }],
                over_350k: vec![],
            },
            launches: vec![LaunchItem {
                model: "<script>alert(1)</script>".to_string(),
                price: "28万".to_string(),
                highlights: vec!["续航提升".to_string()],
                source: "https://b".to_string(),
            }],
            upcoming: vec![],
            vip_voices: vec![VipVoice {
                name: "李斌".to_string(),
                quotes: vec!["first quote".to_string(), "second quote".to_string()],
                summary: "summary".to_string(),
                sources: vec!["https://v\"1".to_string()],
            }],
            dimming_news: vec![
                DimmingNewsItem {
                    title: "High".to_string(),
                    url: "https://h".to_string(),
                    score: 5,
                    summary: "h".to_string(),
                },
                DimmingNewsItem {
                    title: "Low".to_string(),
                    url: "https://l".to_string(),
                    score: 1,
                    summary: "l".to_string(),
                },
            ],
            competitors: CompetitorSummary {
                total_competitors: 1,
                unique_links: vec![],
                items: vec![CompetitorItem {
                    category: "ec".to_string(),
                    url: "https://www.view.com".to_string(),
                    domain: "www.view.com".to_string(),
                    status: 200,
                    features: vec!["electrochromic".to_string()],
                    links: vec![],
                }],
            },
        }
    }

    #[test]
    fn test_render_contains_every_section() {
        let html = render_html("narrative text", &sections());
        for heading in [
            "Executive Summary",
            "Sales Rankings",
            "New Car Launches",
            "Upcoming Releases (Next Month)",
            "VIP Voices",
            "Smart Dimming Intelligence",
            "Competitor Analysis",
        ] {
            assert!(html.contains(heading), "missing {heading}");
        }
        assert!(html.contains("Generated at 2025-05-13 08:00:00.000000Z"));
        assert!(html.contains("narrative text"));
        assert!(html.contains("理想L9 (rank 1)"));
        assert!(html.contains("[ec] www.view.com</strong> — status 200"));
    }

    #[test]
    fn test_render_escapes_text_and_attributes() {
        let html = render_html("a < b & c", &sections());
        assert!(html.contains("a &lt; b &amp; c"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains(r#"href="https://a?x=1&amp;y=2""#));
        assert!(html.contains(r#"href="https://v&quot;1""#));
    }

    #[test]
    fn test_render_keeps_list_order() {
        let html = render_html("", &sections());
        let first = html.find("first quote").unwrap();
        let second = html.find("second quote").unwrap();
        assert!(first < second);
        let high = html.find(">High<").unwrap();
        let low = html.find(">Low<").unwrap();
        assert!(high < low);
    }

    #[test]
    fn test_render_empty_sections() {
        let html = render_html("", &ReportSections::default());
        assert!(html.starts_with("<!doctype html>"));
        assert!(html.trim_end().ends_with("</html>"));
    }
}
