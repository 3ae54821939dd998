use super::views::{CommunityPerformance, Insight, InsightKind, TopLot};

const OPPORTUNITY_MAX_CTR: f64 = 50.0;
const OPPORTUNITY_MIN_LOADS: u64 = 20;

/// `communities` must already be sorted by map loads, descending.
pub(crate) fn generate_insights(
    communities: &[CommunityPerformance],
    top_lots: &[TopLot],
) -> Vec<Insight> {
    let mut insights = Vec::with_capacity(3);

    if let Some(top) = communities.first() {
        insights.push(Insight {
            kind: InsightKind::Trending,
            title: format!("{} is leading engagement", top.name),
            description: format!(
                "{} drew {} map load{} and {} lot click{} this period.",
                top.name,
                top.map_loads,
                plural(top.map_loads),
                top.lot_clicks,
                plural(top.lot_clicks)
            ),
        });
    }

    if let Some(lot) = top_lots.first() {
        insights.push(Insight {
            kind: InsightKind::Hot,
            title: format!("{} is the most-clicked lot", lot.lot),
            description: format!(
                "{} click{}, {}% of all lot clicks.",
                lot.clicks,
                plural(lot.clicks),
                lot.share
            ),
        });
    }

    if let Some(candidate) = communities
        .iter()
        .find(|c| c.ctr < OPPORTUNITY_MAX_CTR && c.map_loads > OPPORTUNITY_MIN_LOADS)
    {
        insights.push(Insight {
            kind: InsightKind::Opportunity,
            title: format!("{} has room to convert", candidate.name),
            description: format!(
                "{} map loads but only a {:.1}% click-through rate; refresh lot photos or pricing.",
                candidate.map_loads, candidate.ctr
            ),
        });
    }

    insights
}

fn plural(count: u64) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn community(name: &str, map_loads: u64, lot_clicks: u64, ctr: f64) -> CommunityPerformance {
        CommunityPerformance {
            name: name.to_string(),
            path: String::new(),
            map_loads,
            lot_clicks,
            ctr,
        }
    }

    fn top_lot(lot: &str, clicks: u64, share: f64) -> TopLot {
        TopLot {
            rank: 1,
            lot: lot.to_string(),
            community: String::new(),
            clicks,
            share,
        }
    }

    #[test]
    fn empty_inputs_produce_no_insights() {
        assert!(generate_insights(&[], &[]).is_empty());
    }

    #[test]
    fn rules_fire_in_fixed_order() {
        let communities = vec![
            community("Kings Landing", 200, 120, 60.0),
            community("Riverbend", 80, 8, 10.0),
            community("Oak Hollow", 60, 6, 10.0),
        ];
        let lots = vec![top_lot("Lot 7, Kings Landing", 45, 37.5)];

        let insights = generate_insights(&communities, &lots);
        let kinds: Vec<InsightKind> = insights.iter().map(|i| i.kind).collect();
        assert_eq!(
            kinds,
            vec![InsightKind::Trending, InsightKind::Hot, InsightKind::Opportunity]
        );

        assert!(insights[0].title.contains("Kings Landing"));
        assert!(insights[0].description.contains("200 map loads"));
        assert!(insights[1].description.contains("45 clicks, 37.5%"));
        assert!(insights[2].title.starts_with("Riverbend"));
        assert!(insights[2].description.contains("10.0%"));
    }

    #[test]
    fn hot_lot_cites_the_recorded_share() {
        let lots = vec![top_lot("Lot 2, Riverbend", 1, 33.33)];

        let insights = generate_insights(&[], &lots);
        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].kind, InsightKind::Hot);
        assert_eq!(insights[0].description, "1 click, 33.33% of all lot clicks.");
    }

    #[test]
    fn opportunity_requires_enough_traffic() {
        let communities = vec![
            community("Kings Landing", 20, 1, 5.0),
            community("Riverbend", 21, 20, 95.2),
        ];

        let insights = generate_insights(&communities, &[]);
        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].kind, InsightKind::Trending);
    }
}
