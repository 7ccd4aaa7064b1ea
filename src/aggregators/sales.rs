//! Weekly NEV sales rankings for the >250k and >350k RMB bands.
//!
//! Queries target CPCA (乘联会) and Dongchedi (懂车帝) weekly summaries. The
//! rank of an entry is the position its model was extracted at inside the
//! search result, not a sales-volume rank.

use crate::extract::extract_model_names;
use crate::models::{PriceBand, RankingEntry, SalesRankings, SearchResult};
use crate::search::{SearchGateway, SearchProvider};
use itertools::Itertools;
use tracing::{info, instrument};

const SALES_MAX_RESULTS: usize = 20;

/// Query template per band.
pub const SALES_QUERIES: [(PriceBand, &str); 2] = [
    (
        PriceBand::Over250k,
        "中国 新能源 周销量 高端 SUV 轿车 25万以上 乘联会 懂车帝",
    ),
    (
        PriceBand::Over350k,
        "中国 新能源 周销量 高端 SUV 轿车 35万以上 乘联会 懂车帝",
    ),
];

/// Collect one ranking of at most `top_n` models per price band.
#[instrument(level = "info", skip(search))]
pub async fn get_sales_rankings<T: SearchProvider>(
    search: &SearchGateway<T>,
    top_n: usize,
) -> SalesRankings {
    let mut rankings = SalesRankings::default();
    for (band, query) in SALES_QUERIES {
        let results = search.search(query, SALES_MAX_RESULTS).await;
        let ranked = rank_band(&results, band, top_n);
        info!(band = %band, results = results.len(), ranked = ranked.len(), "Ranked sales band");
        match band {
            PriceBand::Over250k => rankings.over_250k = ranked,
            PriceBand::Over350k => rankings.over_350k = ranked,
        }
    }
    rankings
}

/// Turn search results into a deduplicated ranking for `band`.
///
/// Every result contributes up to `top_n` models, ranked 1.. in extraction
/// order. The first entry for a model wins and the list is cut at `top_n`.
pub fn rank_band(results: &[SearchResult], band: PriceBand, top_n: usize) -> Vec<RankingEntry> {
    results
        .iter()
        .flat_map(|result| {
            extract_model_names(&result.headline_text())
                .into_iter()
                .take(top_n)
                .enumerate()
                .map(move |(idx, model)| RankingEntry {
                    model,
                    rank: idx + 1,
                    price_hint: band,
                    source: result.url.clone(),
                })
        })
        .unique_by(|entry| entry.model.clone())
        .take(top_n)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::testing::{StubSearch, fast_gateway, result};

    #[test]
    fn test_rank_band_ranks_by_extraction_order() {
        let results = vec![result(
            "乘联会周榜",
            "理想L9 领跑，问界M9 第二，蔚来ET9 第三",
            "https://cpca.example/1",
        )];
        let ranked = rank_band(&results, PriceBand::Over250k, 10);
        assert_eq!(ranked[0].model, "理想L9");
        assert_eq!(ranked[0].rank, 1);
        assert_eq!(ranked[1].model, "问界M9");
        assert_eq!(ranked[1].rank, 2);
        assert!(ranked.iter().all(|e| e.price_hint == PriceBand::Over250k));
        assert!(ranked.iter().all(|e| e.source == "https://cpca.example/1"));
    }

    #[test]
    fn test_rank_band_dedupes_across_results() {
        let results = vec![
            result("", "比亚迪汉 比亚迪唐", "https://a"),
            result("", "比亚迪唐 比亚迪宋", "https://b"),
        ];
        let ranked = rank_band(&results, PriceBand::Over350k, 10);
        let models: Vec<&str> = ranked.iter().map(|e| e.model.as_str()).collect();
        assert_eq!(models, vec!["比亚迪汉", "比亚迪唐", "比亚迪宋"]);
        assert_eq!(ranked[1].source, "https://a");
        assert_eq!(ranked[2].rank, 2);
    }

    #[test]
    fn test_rank_band_respects_top_n() {
        let results = vec![result("", "理想L6 理想L7 理想L8 理想L9", "https://a")];
        assert_eq!(rank_band(&results, PriceBand::Over250k, 2).len(), 2);
        assert!(rank_band(&results, PriceBand::Over250k, 0).is_empty());
    }

    #[tokio::test]
    async fn test_get_sales_rankings_per_band() {
        let stub = StubSearch::new()
            .respond("25万以上", vec![result("", "理想L6 热销", "https://a")])
            .respond("35万以上", vec![result("", "问界M9 热销", "https://b")]);
        let gateway = fast_gateway(stub);
        let sales = get_sales_rankings(&gateway, 10).await;
        assert_eq!(sales.over_250k[0].model, "理想L6");
        assert_eq!(sales.over_250k[0].price_hint, PriceBand::Over250k);
        assert_eq!(sales.over_350k[0].model, "问界M9");
        assert_eq!(sales.over_350k[0].price_hint, PriceBand::Over350k);
    }

    #[tokio::test]
    async fn test_get_sales_rankings_degraded() {
        let gateway: SearchGateway<StubSearch> = SearchGateway::disabled();
        let sales = get_sales_rankings(&gateway, 10).await;
        assert_eq!(sales, SalesRankings::default());
    }
}
