//! Ranker service for ordering listings by aggregate score

use rayon::prelude::*;

use crate::services::formatter::CriterionFormatter;
use crate::services::normalizer::round_one_decimal;
use crate::types::{
    CriterionKind, Listing, RankedListing, RankingSummary, ScoreGrade, TierDistribution,
};

/// Ranker for scoring and ordering listings
pub struct Ranker;

impl Ranker {
    /// Score every listing and sort by descending aggregate.
    ///
    /// The sort is stable: listings with equal scores keep their input order.
    pub fn rank(listings: Vec<Listing>) -> Vec<RankedListing> {
        // par_iter().map().collect() preserves input order
        let cards: Vec<_> = listings
            .par_iter()
            .map(CriterionFormatter::scorecard)
            .collect();

        let mut ranked: Vec<RankedListing> = listings
            .into_iter()
            .zip(cards)
            .map(|(listing, card)| RankedListing {
                rank: 0,
                card,
                listing,
            })
            .collect();

        ranked.sort_by(|a, b| b.card.score.total_cmp(&a.card.score));

        for (i, entry) in ranked.iter_mut().enumerate() {
            entry.rank = i + 1;
        }
        ranked
    }

    /// Count, mean, extremes and tier distribution per criterion
    pub fn summary(ranked: &[RankedListing]) -> RankingSummary {
        if ranked.is_empty() {
            return RankingSummary {
                tiers: CriterionKind::all()
                    .iter()
                    .map(|&kind| TierDistribution::new(kind))
                    .collect(),
                ..RankingSummary::default()
            };
        }

        let scores: Vec<f64> = ranked.iter().map(|r| r.card.score).collect();
        let total: f64 = scores.iter().sum();
        let best = scores.iter().copied().fold(f64::MIN, f64::max);
        let worst = scores.iter().copied().fold(f64::MAX, f64::min);

        let mut tiers: Vec<TierDistribution> = CriterionKind::all()
            .iter()
            .map(|&kind| TierDistribution::new(kind))
            .collect();
        for entry in ranked {
            for badge in &entry.card.badges {
                if let Some(dist) = tiers.iter_mut().find(|d| d.kind == badge.kind) {
                    dist.add(badge.tier);
                }
            }
        }

        RankingSummary {
            count: ranked.len(),
            mean: round_one_decimal(total / ranked.len() as f64),
            best,
            worst,
            good: ranked
                .iter()
                .filter(|r| r.card.grade == ScoreGrade::Good)
                .count(),
            tiers,
        }
    }

    /// Position of a listing id in a ranking
    pub fn find<'a>(ranked: &'a [RankedListing], id: &str) -> Option<&'a RankedListing> {
        ranked.iter().find(|r| r.card.id == id)
    }
}
