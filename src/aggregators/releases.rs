//! New car launches from the past week and releases expected next month.
//!
//! Both sections walk the search results in order, skip hits without an
//! extractable model name and stop once enough items are collected. The model
//! comes from title and content; price, highlights and notes come from the
//! content alone.

use super::week_before;
use crate::extract::{extract_highlights, extract_model_names, extract_price};
use crate::models::{LaunchItem, SearchResult, UpcomingItem};
use crate::search::{SearchGateway, SearchProvider};
use chrono::NaiveDate;
use tracing::{info, instrument};

const LAUNCH_MAX_RESULTS: usize = 25;
const UPCOMING_MAX_RESULTS: usize = 30;
const UPCOMING_QUERY: &str = "下月 预计 发布 新车 中国 NEV 上市 预告";
const UPCOMING_WINDOW: &str = "Next Month";
const UPCOMING_MAX_NOTES: usize = 2;

/// Launch query for the week ending `today`.
pub fn launch_query(today: NaiveDate) -> String {
    format!("过去一周 新车 发布 上市 中国 NEV {}", week_before(today))
}

/// Cars launched in the week before `today`, at most `max_items`.
#[instrument(level = "info", skip(search))]
pub async fn get_new_car_launches<T: SearchProvider>(
    search: &SearchGateway<T>,
    max_items: usize,
    today: NaiveDate,
) -> Vec<LaunchItem> {
    let results = search.search(&launch_query(today), LAUNCH_MAX_RESULTS).await;
    let launches = collect_launches(&results, max_items);
    info!(results = results.len(), launches = launches.len(), "Collected new launches");
    launches
}

pub fn collect_launches(results: &[SearchResult], max_items: usize) -> Vec<LaunchItem> {
    results
        .iter()
        .filter_map(|result| {
            let model = extract_model_names(&result.headline_text())
                .into_iter()
                .next()?;
            Some(LaunchItem {
                model,
                price: extract_price(&result.content),
                highlights: extract_highlights(&result.content),
                source: result.url.clone(),
            })
        })
        .take(max_items)
        .collect()
}

/// Cars expected next month, at most `max_items`.
#[instrument(level = "info", skip(search))]
pub async fn get_upcoming_releases<T: SearchProvider>(
    search: &SearchGateway<T>,
    max_items: usize,
) -> Vec<UpcomingItem> {
    let results = search.search(UPCOMING_QUERY, UPCOMING_MAX_RESULTS).await;
    let upcoming = collect_upcoming(&results, max_items);
    info!(results = results.len(), upcoming = upcoming.len(), "Collected upcoming releases");
    upcoming
}

pub fn collect_upcoming(results: &[SearchResult], max_items: usize) -> Vec<UpcomingItem> {
    results
        .iter()
        .filter_map(|result| {
            let model = extract_model_names(&result.headline_text())
                .into_iter()
                .next()?;
            let mut notes = extract_highlights(&result.content);
            notes.truncate(UPCOMING_MAX_NOTES);
            Some(UpcomingItem {
                model,
                window: UPCOMING_WINDOW.to_string(),
                notes,
                source: result.url.clone(),
            })
        })
        .take(max_items)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::PRICE_NOT_FOUND;
    use crate::search::testing::{StubSearch, fast_gateway, result};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, 13).unwrap()
    }

    #[test]
    fn test_launch_query_uses_week_old_date() {
        assert_eq!(
            launch_query(today()),
            "过去一周 新车 发布 上市 中国 NEV 2025-05-06"
        );
    }

    #[tokio::test]
    async fn test_launch_entry_from_search_result() {
        let stub = StubSearch::new().respond(
            "过去一周",
            vec![result(
                "比亚迪海豹 Pro 上市",
                "新车售价28万起\n• 续航提升至 700 公里以上",
                "https://news.example/seal",
            )],
        );
        let gateway = fast_gateway(stub);
        let launches = get_new_car_launches(&gateway, 3, today()).await;
        assert_eq!(launches.len(), 1);
        let launch = &launches[0];
        assert!(launch.model.starts_with("比亚迪"));
        assert_eq!(launch.price, "28万");
        assert!(launch.highlights.iter().any(|h| h.contains("续航提升")));
        assert_eq!(launch.source, "https://news.example/seal");
    }

    #[test]
    fn test_launches_skip_results_without_models() {
        let results = vec![
            result("行业观察", "本周 市场 平稳", "https://a"),
            result("蔚来ET5 上市", "价格待定", "https://b"),
        ];
        let launches = collect_launches(&results, 3);
        assert_eq!(launches.len(), 1);
        assert_eq!(launches[0].model, "蔚来ET5");
        assert_eq!(launches[0].price, PRICE_NOT_FOUND);
    }

    #[test]
    fn test_launches_stop_at_max_items() {
        let results: Vec<_> = (0..6)
            .map(|i| result(&format!("问界M{i} 上市"), "", &format!("https://{i}")))
            .collect();
        let launches = collect_launches(&results, 3);
        assert_eq!(launches.len(), 3);
        assert_eq!(launches[2].model, "问界M2");
    }

    #[test]
    fn test_upcoming_notes_capped_at_two() {
        let content = "- 预计下月正式发布新车型\n- 搭载高阶智能驾驶辅助系统\n- 提供多种续航版本可选";
        let results = vec![result("小鹏MONA 预告", content, "https://x")];
        let upcoming = collect_upcoming(&results, 5);
        assert_eq!(upcoming.len(), 1);
        assert_eq!(upcoming[0].model, "小鹏MONA");
        assert_eq!(upcoming[0].window, "Next Month");
        assert_eq!(upcoming[0].notes.len(), 2);
    }

    #[tokio::test]
    async fn test_degraded_search_yields_empty_sections() {
        let gateway: SearchGateway<StubSearch> = SearchGateway::disabled();
        assert!(get_new_car_launches(&gateway, 3, today()).await.is_empty());
        assert!(get_upcoming_releases(&gateway, 5).await.is_empty());
    }
}
