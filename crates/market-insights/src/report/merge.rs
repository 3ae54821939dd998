use std::collections::HashMap;

use tracing::debug;

use super::views::{CommunityPerformance, TopLot};
use crate::analytics::queries::{is_placeholder_lot, CommunityClicks, CommunityLoads, LotClicks};

/// `round(clicks / loads * 1000) / 10`, or zero without map loads.
pub fn click_through_rate(lot_clicks: u64, map_loads: u64) -> f64 {
    if map_loads == 0 {
        return 0.0;
    }
    (lot_clicks as f64 / map_loads as f64 * 1000.0).round() / 10.0
}

/// `round(clicks / total * 10000) / 100`, or zero when nothing was clicked.
pub fn click_share(clicks: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (clicks as f64 / total as f64 * 10000.0).round() / 100.0
}

/// Map loads decide membership: click rows for a community with no map-load
/// row are dropped. The result is stably sorted by map loads, descending.
pub fn merge_community_performance(
    loads: &[CommunityLoads],
    clicks: &[CommunityClicks],
) -> Vec<CommunityPerformance> {
    let mut records: Vec<CommunityPerformance> = Vec::with_capacity(loads.len());
    let mut positions: HashMap<&str, usize> = HashMap::with_capacity(loads.len());

    for entry in loads {
        if let Some(&index) = positions.get(entry.name.as_str()) {
            records[index].map_loads += entry.map_loads;
            continue;
        }
        positions.insert(entry.name.as_str(), records.len());
        records.push(CommunityPerformance {
            name: entry.name.clone(),
            path: entry.path.clone(),
            map_loads: entry.map_loads,
            lot_clicks: 0,
            ctr: 0.0,
        });
    }

    for entry in clicks {
        match positions.get(entry.name.as_str()) {
            Some(&index) => {
                let record = &mut records[index];
                record.lot_clicks += entry.lot_clicks;
                record.ctr = click_through_rate(record.lot_clicks, record.map_loads);
            }
            None => {
                debug!(
                    community = %entry.name,
                    clicks = entry.lot_clicks,
                    "dropping lot clicks without map loads"
                );
            }
        }
    }

    records.sort_by(|a, b| b.map_loads.cmp(&a.map_loads));
    records
}

pub fn rank_top_lots(rows: &[LotClicks]) -> Vec<TopLot> {
    let kept: Vec<&LotClicks> = rows
        .iter()
        .filter(|row| !is_placeholder_lot(&row.lot))
        .collect();
    let total: u64 = kept.iter().map(|row| row.clicks).sum();

    kept.into_iter()
        .enumerate()
        .map(|(index, row)| TopLot {
            rank: index + 1,
            lot: row.lot.clone(),
            community: lot_community(&row.lot),
            clicks: row.clicks,
            share: click_share(row.clicks, total),
        })
        .collect()
}

pub fn lot_community(lot: &str) -> String {
    lot.rsplit(',').next().unwrap_or(lot).trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loads(name: &str, map_loads: u64) -> CommunityLoads {
        CommunityLoads {
            name: name.to_string(),
            path: format!("/maps/{}", name.to_ascii_lowercase()),
            map_loads,
        }
    }

    fn clicks(name: &str, lot_clicks: u64) -> CommunityClicks {
        CommunityClicks {
            name: name.to_string(),
            lot_clicks,
        }
    }

    fn lot(label: &str, count: u64) -> LotClicks {
        LotClicks {
            lot: label.to_string(),
            clicks: count,
        }
    }

    #[test]
    fn merge_matches_reference_example() {
        let merged = merge_community_performance(
            &[loads("A", 100), loads("B", 50)],
            &[clicks("A", 25)],
        );

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].name, "A");
        assert_eq!(merged[0].ctr, 25.0);
        assert_eq!(merged[0].lot_clicks, 25);
        assert_eq!(merged[1].name, "B");
        assert_eq!(merged[1].ctr, 0.0);
    }

    #[test]
    fn click_only_communities_never_appear() {
        let merged = merge_community_performance(
            &[loads("A", 10)],
            &[clicks("Ghost", 99), clicks("A", 3)],
        );

        assert_eq!(merged.len(), 1);
        assert!(merged.iter().all(|record| record.name != "Ghost"));
        assert_eq!(merged[0].ctr, 30.0);
    }

    #[test]
    fn sort_is_descending_and_stable_on_ties() {
        let merged = merge_community_performance(
            &[loads("C", 5), loads("A", 40), loads("B", 40), loads("D", 40)],
            &[],
        );
        let names: Vec<&str> = merged.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "D", "C"]);
    }

    #[test]
    fn ctr_rounds_to_one_decimal_and_never_divides_by_zero() {
        assert_eq!(click_through_rate(1, 3), 33.3);
        assert_eq!(click_through_rate(2, 3), 66.7);
        assert_eq!(click_through_rate(7, 0), 0.0);
        assert_eq!(click_through_rate(0, 12), 0.0);
    }

    #[test]
    fn ranks_and_shares_match_reference_example() {
        let ranked = rank_top_lots(&[lot("L1", 30), lot("L2", 10)]);

        assert_eq!(ranked.len(), 2);
        assert_eq!((ranked[0].rank, ranked[0].share), (1, 75.0));
        assert_eq!((ranked[1].rank, ranked[1].share), (2, 25.0));
    }

    #[test]
    fn placeholders_are_excluded_before_totals() {
        let ranked = rank_top_lots(&[
            lot("Lot 4, Riverbend", 10),
            lot("-", 90),
            lot("(not set)", 50),
            lot("", 5),
            lot("Lot 9, Riverbend", 10),
        ]);

        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].share, 50.0);
        assert_eq!(ranked[1].rank, 2);
        assert_eq!(ranked[1].community, "Riverbend");
    }

    #[test]
    fn zero_clicks_means_zero_share() {
        let ranked = rank_top_lots(&[lot("L1", 0), lot("L2", 0)]);
        assert!(ranked.iter().all(|entry| entry.share == 0.0));
    }

    #[test]
    fn shares_sum_to_about_one_hundred() {
        let ranked = rank_top_lots(&[lot("L1", 1), lot("L2", 1), lot("L3", 1)]);
        let sum: f64 = ranked.iter().map(|entry| entry.share).sum();
        assert!((sum - 100.0).abs() <= 0.1, "shares summed to {sum}");
    }

    #[test]
    fn lot_community_uses_last_segment() {
        assert_eq!(lot_community("Lot 12, Phase 2, Kings Landing "), "Kings Landing");
        assert_eq!(lot_community("Lot 12"), "Lot 12");
    }
}
