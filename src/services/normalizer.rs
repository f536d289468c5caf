//! Score normalization service
//!
//! Reconciles each criterion's stored tier with the value its badge shows,
//! then maps tiers to points. The aggregate ("mega") score and every badge
//! are derived from the same [`ScoreNormalizer::reconcile`] output, so the
//! ranking always equals what the badges add up to.
//!
//! Rules per criterion:
//! - Location, Price, Style, Bathtub: stored score verbatim
//! - Exposure: tier forced from the brightness bucket, tier1/2/3 → 20/10/0
//! - Kitchen: tier forced from kitchen openness, tier1/2/3 → 10/5/0

use crate::types::{Brightness, Criterion, CriterionKind, CriterionScore, Derived, Listing, Tier};

/// Orientation values that carry no information
const UNKNOWN_ORIENTATIONS: &[&str] = &[
    "inconnu",
    "inconnue",
    "nonspecifie",
    "nonspecifiee",
    "nonprecise",
    "unknown",
    "na",
    "nc",
];

/// Stateless scoring entry points
pub struct ScoreNormalizer;

impl ScoreNormalizer {
    /// Reconciled criteria for every group present in `scores_detail`, in
    /// display order. Absent groups are omitted (they contribute nothing).
    pub fn reconcile(listing: &Listing) -> Vec<Criterion> {
        let Some(detail) = listing.scores_detail.as_ref() else {
            return Vec::new();
        };

        CriterionKind::all()
            .iter()
            .filter_map(|&kind| {
                let stored = detail.get(kind)?;
                Some(Self::reconcile_one(listing, kind, stored))
            })
            .collect()
    }

    fn reconcile_one(listing: &Listing, kind: CriterionKind, stored: &CriterionScore) -> Criterion {
        match kind {
            CriterionKind::Exposure => {
                let bucket = Self::brightness(listing);
                Self::from_table(kind, bucket.tier(), Derived::Brightness(bucket))
            }
            CriterionKind::Kitchen => {
                let open = Self::kitchen_open(listing);
                let tier = if open { Tier::Tier1 } else { Tier::Tier3 };
                Self::from_table(kind, tier, Derived::KitchenOpen(open))
            }
            CriterionKind::Location
            | CriterionKind::Price
            | CriterionKind::Style
            | CriterionKind::Bathtub => Criterion {
                kind,
                tier: stored.tier.unwrap_or_default(),
                points: stored.score.unwrap_or(0.0),
                derived: Derived::Stored,
            },
        }
    }

    fn from_table(kind: CriterionKind, tier: Tier, derived: Derived) -> Criterion {
        let points = kind
            .tier_points()
            .map(|table| table[tier.index()])
            .unwrap_or(0.0);
        Criterion {
            kind,
            tier,
            points,
            derived,
        }
    }

    /// Sum of criterion points, never negative, rounded to one decimal
    pub fn total(criteria: &[Criterion]) -> f64 {
        let sum: f64 = criteria.iter().map(|c| c.points).sum();
        if sum <= 0.0 {
            return 0.0;
        }
        round_one_decimal(sum)
    }

    /// Aggregate score of a listing
    ///
    /// # Examples
    /// ```
    /// use homescore::services::ScoreNormalizer;
    /// use homescore::types::Listing;
    ///
    /// assert_eq!(ScoreNormalizer::mega_score(&Listing::default()), 0.0);
    /// ```
    pub fn mega_score(listing: &Listing) -> f64 {
        Self::total(&Self::reconcile(listing))
    }

    /// Exposure bucket: pre-formatted label first, then orientation, then
    /// the luminosity classification. A formatted group without a label
    /// means the backend found nothing and counts as dark.
    pub fn brightness(listing: &Listing) -> Brightness {
        let formatted = match listing.formatted_exposure() {
            Some(formatted) => match formatted.main_value.as_deref() {
                Some(label) => brightness_from_label(label),
                None => return Brightness::Dark,
            },
            None => None,
        };
        formatted
            .or_else(|| listing.orientation().and_then(brightness_from_orientation))
            .unwrap_or_else(|| {
                let kind = listing
                    .luminosity()
                    .and_then(|l| l.kind.as_deref())
                    .unwrap_or("");
                brightness_from_luminosity(kind)
            })
    }

    /// Kitchen openness; unknown counts as closed
    pub fn kitchen_open(listing: &Listing) -> bool {
        listing
            .kitchen_analysis()
            .and_then(|k| k.open)
            .unwrap_or(false)
    }
}

/// Round half away from zero to one decimal place
pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Replace French accented letters by their base letter
pub fn fold_accents(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            'é' | 'è' | 'ê' | 'ë' | 'É' | 'È' | 'Ê' => 'e',
            'à' | 'â' | 'ä' | 'À' | 'Â' => 'a',
            'î' | 'ï' | 'Î' => 'i',
            'ô' | 'ö' | 'Ô' => 'o',
            'ù' | 'û' | 'ü' | 'Û' => 'u',
            'ç' | 'Ç' => 'c',
            other => other,
        })
        .collect()
}

/// Canonical orientation key: "Sud-Ouest" → "sudouest"
pub fn normalize_orientation(orientation: &str) -> String {
    fold_accents(&orientation.to_lowercase())
        .chars()
        .filter(|c| !matches!(c, '_' | '-' | '\'') && !c.is_whitespace())
        .collect()
}

/// Whether an orientation string carries a direction at all
pub fn is_known_orientation(orientation: &str) -> bool {
    let key = normalize_orientation(orientation);
    !key.is_empty() && !UNKNOWN_ORIENTATIONS.contains(&key.as_str())
}

/// South family → Bright, north family → Dark, anything else known → Medium.
/// Returns `None` when the orientation is empty or explicitly unknown.
pub fn brightness_from_orientation(orientation: &str) -> Option<Brightness> {
    if !is_known_orientation(orientation) {
        return None;
    }
    let key = normalize_orientation(orientation);
    let key = key.strip_prefix("plein").unwrap_or(&key);

    if key.starts_with("sud") || key.starts_with("south") {
        Some(Brightness::Bright)
    } else if key.starts_with("nord") || key.starts_with("north") {
        Some(Brightness::Dark)
    } else {
        Some(Brightness::Medium)
    }
}

/// Luminosity classification: "excellent" → Bright, "good"/"medium" →
/// Medium, anything else (including empty) → Dark
pub fn brightness_from_luminosity(kind: &str) -> Brightness {
    let kind = fold_accents(&kind.to_lowercase());
    if kind.contains("excellent") {
        Brightness::Bright
    } else if ["bonne", "bon", "good", "moyenne", "medium"]
        .iter()
        .any(|word| kind.contains(word))
    {
        Brightness::Medium
    } else {
        Brightness::Dark
    }
}

/// Parse a pre-formatted badge label back into a bucket
pub fn brightness_from_label(label: &str) -> Option<Brightness> {
    let label = fold_accents(&label.trim().to_lowercase());
    match label.as_str() {
        "lumineux" | "bright" => Some(Brightness::Bright),
        "luminosite moyenne" | "moyenne" | "medium" => Some(Brightness::Medium),
        "sombre" | "dark" => Some(Brightness::Dark),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn listing(value: Value) -> Listing {
        serde_json::from_value(value).unwrap()
    }

    fn points_of(criteria: &[Criterion], kind: CriterionKind) -> Option<f64> {
        criteria.iter().find(|c| c.kind == kind).map(|c| c.points)
    }

    // ========== Aggregate ==========

    #[test]
    fn test_empty_record_scores_zero() {
        assert_eq!(ScoreNormalizer::mega_score(&listing(json!({}))), 0.0);
    }

    #[test]
    fn test_no_scores_detail_scores_zero() {
        let l = listing(json!({
            "style_analysis": {"cuisine": {"ouverte": true}, "luminosite": {"type": "excellente"}},
            "exposition": {"exposition": "sud"}
        }));
        assert_eq!(ScoreNormalizer::mega_score(&l), 0.0);
        assert!(ScoreNormalizer::reconcile(&l).is_empty());
    }

    #[test]
    fn test_reference_listing_scores_78() {
        let l = listing(json!({
            "scores_detail": {
                "location": {"score": 15},
                "price": {"score": 18},
                "style": {"score": 10},
                "exposure": {"score": 0, "tier": "tier3"},
                "kitchen": {"score": 0, "tier": "tier3"},
                "bathtub": {"score": 5}
            },
            "exposition": {"exposition": "sud"},
            "style_analysis": {"kitchen": {"open": true}}
        }));
        assert_eq!(ScoreNormalizer::mega_score(&l), 78.0);
    }

    #[test]
    fn test_absent_groups_contribute_nothing() {
        let l = listing(json!({
            "scores_detail": {"location": {"score": 12}},
            "exposition": {"exposition": "sud"},
            "style_analysis": {"kitchen": {"open": true}}
        }));
        assert_eq!(ScoreNormalizer::mega_score(&l), 12.0);
    }

    #[test]
    fn test_rounded_to_one_decimal() {
        let l = listing(json!({
            "scores_detail": {"location": {"score": 12.34}, "price": {"score": 3.33}}
        }));
        assert_eq!(ScoreNormalizer::mega_score(&l), 15.7);
    }

    #[test]
    fn test_negative_total_clamped_to_zero() {
        let l = listing(json!({"scores_detail": {"location": {"score": -4}}}));
        assert_eq!(ScoreNormalizer::mega_score(&l), 0.0);
    }

    #[test]
    fn test_malformed_score_contributes_zero() {
        let l = listing(json!({
            "scores_detail": {"location": {"score": "quinze"}, "price": {"score": "18"}}
        }));
        assert_eq!(ScoreNormalizer::mega_score(&l), 18.0);
    }

    #[test]
    fn test_idempotent() {
        let l = listing(json!({
            "scores_detail": {"location": {"score": 7.5}, "exposure": {"tier": "tier1"}},
            "style_analysis": {"luminosite": {"type": "bonne"}}
        }));
        let first = ScoreNormalizer::mega_score(&l);
        let second = ScoreNormalizer::mega_score(&l);
        assert_eq!(first, second);
        assert_eq!(first, 17.5);
    }

    // ========== Exposure reconciliation ==========

    #[test]
    fn test_exposure_points_ignore_stored_tier() {
        for stored in ["tier1", "tier2", "tier3"] {
            let bright = listing(json!({
                "scores_detail": {"exposure": {"score": 3, "tier": stored}},
                "exposition": {"exposition": "Sud-Est"}
            }));
            let medium = listing(json!({
                "scores_detail": {"exposure": {"score": 3, "tier": stored}},
                "exposition": {"exposition": "Ouest"}
            }));
            let dark = listing(json!({
                "scores_detail": {"exposure": {"score": 3, "tier": stored}},
                "exposition": {"exposition": "nord"}
            }));
            assert_eq!(ScoreNormalizer::mega_score(&bright), 20.0);
            assert_eq!(ScoreNormalizer::mega_score(&medium), 10.0);
            assert_eq!(ScoreNormalizer::mega_score(&dark), 0.0);
        }
    }

    #[test]
    fn test_exposure_tier_overridden() {
        let l = listing(json!({
            "scores_detail": {"exposure": {"score": 20, "tier": "tier1"}},
            "exposition": {"exposition": "nord-ouest"}
        }));
        let criteria = ScoreNormalizer::reconcile(&l);
        assert_eq!(criteria[0].tier, Tier::Tier3);
        assert_eq!(criteria[0].points, 0.0);
        assert_eq!(criteria[0].derived, Derived::Brightness(Brightness::Dark));
    }

    #[test]
    fn test_formatted_label_wins_over_orientation() {
        let l = listing(json!({
            "scores_detail": {"exposure": {}},
            "formatted_data": {"exposition": {"main_value": "Luminosité moyenne"}},
            "exposition": {"exposition": "sud"}
        }));
        assert_eq!(ScoreNormalizer::brightness(&l), Brightness::Medium);
        assert_eq!(ScoreNormalizer::mega_score(&l), 10.0);
    }

    #[test]
    fn test_unrecognized_formatted_label_falls_through() {
        let l = listing(json!({
            "formatted_data": {"exposition": {"main_value": "???"}},
            "exposition": {"exposition": "sud"}
        }));
        assert_eq!(ScoreNormalizer::brightness(&l), Brightness::Bright);
    }

    #[test]
    fn test_formatted_group_without_label_is_dark() {
        let l = listing(json!({
            "scores_detail": {"exposure": {"score": 20, "tier": "tier1"}},
            "formatted_data": {"exposition": {"indices": "Pas d'indice", "confidence": 0.4}},
            "exposition": {"exposition": "sud"},
            "style_analysis": {"luminosite": {"type": "excellente"}}
        }));
        assert_eq!(ScoreNormalizer::brightness(&l), Brightness::Dark);
        assert_eq!(ScoreNormalizer::mega_score(&l), 0.0);
    }

    #[test]
    fn test_orientation_wins_over_luminosity() {
        let l = listing(json!({
            "exposition": {"exposition": "nord"},
            "style_analysis": {"luminosite": {"type": "excellente"}}
        }));
        assert_eq!(ScoreNormalizer::brightness(&l), Brightness::Dark);
    }

    #[test]
    fn test_unknown_orientation_falls_back_to_luminosity() {
        let l = listing(json!({
            "exposition": {"exposition": "Inconnue"},
            "style_analysis": {"luminosite": {"type": "excellente"}}
        }));
        assert_eq!(ScoreNormalizer::brightness(&l), Brightness::Bright);
    }

    #[test]
    fn test_no_exposure_data_is_dark() {
        let l = listing(json!({"scores_detail": {"exposure": {"tier": "tier1", "score": 20}}}));
        assert_eq!(ScoreNormalizer::brightness(&l), Brightness::Dark);
        assert_eq!(ScoreNormalizer::mega_score(&l), 0.0);
    }

    #[test]
    fn test_orientation_families() {
        let cases = [
            ("sud", Some(Brightness::Bright)),
            ("Sud_Ouest", Some(Brightness::Bright)),
            ("sud est", Some(Brightness::Bright)),
            ("plein sud", Some(Brightness::Bright)),
            ("South-West", Some(Brightness::Bright)),
            ("Nord", Some(Brightness::Dark)),
            ("nord-est", Some(Brightness::Dark)),
            ("north", Some(Brightness::Dark)),
            ("Est", Some(Brightness::Medium)),
            ("ouest", Some(Brightness::Medium)),
            ("west", Some(Brightness::Medium)),
            ("", None),
            ("   ", None),
            ("inconnu", None),
            ("Non spécifiée", None),
        ];
        for (input, expected) in cases {
            assert_eq!(brightness_from_orientation(input), expected, "{input:?}");
        }
    }

    #[test]
    fn test_luminosity_classification() {
        assert_eq!(brightness_from_luminosity("excellente"), Brightness::Bright);
        assert_eq!(brightness_from_luminosity("Excellent"), Brightness::Bright);
        assert_eq!(brightness_from_luminosity("bonne"), Brightness::Medium);
        assert_eq!(brightness_from_luminosity("moyenne"), Brightness::Medium);
        assert_eq!(brightness_from_luminosity("good"), Brightness::Medium);
        assert_eq!(brightness_from_luminosity("faible"), Brightness::Dark);
        assert_eq!(brightness_from_luminosity(""), Brightness::Dark);
    }

    #[test]
    fn test_brightness_labels() {
        assert_eq!(brightness_from_label("Lumineux"), Some(Brightness::Bright));
        assert_eq!(brightness_from_label("Luminosité moyenne"), Some(Brightness::Medium));
        assert_eq!(brightness_from_label("Sombre"), Some(Brightness::Dark));
        assert_eq!(brightness_from_label("Dark"), Some(Brightness::Dark));
        assert_eq!(brightness_from_label("Très lumineux"), None);
    }

    // ========== Kitchen reconciliation ==========

    #[test]
    fn test_kitchen_points_ignore_stored_tier() {
        for stored in ["tier1", "tier2", "tier3"] {
            let open = listing(json!({
                "scores_detail": {"kitchen": {"score": 5, "tier": stored}},
                "style_analysis": {"cuisine": {"ouverte": true}}
            }));
            let closed = listing(json!({
                "scores_detail": {"kitchen": {"score": 5, "tier": stored}},
                "style_analysis": {"cuisine": {"ouverte": false}}
            }));
            assert_eq!(ScoreNormalizer::mega_score(&open), 10.0);
            assert_eq!(ScoreNormalizer::mega_score(&closed), 0.0);
        }
    }

    #[test]
    fn test_kitchen_unknown_is_closed() {
        let l = listing(json!({"scores_detail": {"kitchen": {"score": 10, "tier": "tier1"}}}));
        let criteria = ScoreNormalizer::reconcile(&l);
        assert_eq!(criteria[0].tier, Tier::Tier3);
        assert_eq!(criteria[0].derived, Derived::KitchenOpen(false));
        assert_eq!(points_of(&criteria, CriterionKind::Kitchen), Some(0.0));
    }

    // ========== Stored criteria ==========

    #[test]
    fn test_stored_criteria_keep_tier_and_score() {
        let l = listing(json!({
            "scores_detail": {
                "style": {"score": 20, "tier": "tier1"},
                "bathtub": {"score": 0}
            }
        }));
        let criteria = ScoreNormalizer::reconcile(&l);
        assert_eq!(criteria.len(), 2);
        assert_eq!(criteria[0].kind, CriterionKind::Style);
        assert_eq!(criteria[0].tier, Tier::Tier1);
        assert_eq!(criteria[0].points, 20.0);
        assert_eq!(criteria[1].kind, CriterionKind::Bathtub);
        assert_eq!(criteria[1].tier, Tier::Tier3);
        assert_eq!(criteria[1].derived, Derived::Stored);
    }

    #[test]
    fn test_reconcile_display_order() {
        let l = listing(json!({
            "scores_detail": {
                "bathtub": {}, "kitchen": {}, "exposure": {},
                "style": {}, "price": {}, "location": {}
            }
        }));
        let kinds: Vec<_> = ScoreNormalizer::reconcile(&l).iter().map(|c| c.kind).collect();
        assert_eq!(kinds, CriterionKind::all().to_vec());
    }

    // ========== Helpers ==========

    #[test]
    fn test_round_one_decimal() {
        assert_eq!(round_one_decimal(78.0), 78.0);
        assert_eq!(round_one_decimal(12.25), 12.3);
        assert_eq!(round_one_decimal(12.24), 12.2);
    }

    #[test]
    fn test_normalize_orientation() {
        assert_eq!(normalize_orientation("Sud-Ouest"), "sudouest");
        assert_eq!(normalize_orientation("Non spécifiée"), "nonspecifiee");
        assert_eq!(normalize_orientation("nord_est"), "nordest");
    }
}
