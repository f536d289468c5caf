//! Scoring types: tiers, criteria and the scorecards built from them

use serde::{Deserialize, Serialize};

/// Maximum aggregate a listing can reach; used for the overall badge grade
pub const MAX_SCORE: f64 = 90.0;

/// Coarse qualitative bucket, tier1 best
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Tier1,
    Tier2,
    #[default]
    Tier3,
}

impl Tier {
    /// Parse "tier1".."tier3" (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tier1" => Some(Self::Tier1),
            "tier2" => Some(Self::Tier2),
            "tier3" => Some(Self::Tier3),
            _ => None,
        }
    }

    pub fn from_rank(rank: u64) -> Option<Self> {
        match rank {
            1 => Some(Self::Tier1),
            2 => Some(Self::Tier2),
            3 => Some(Self::Tier3),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Tier1 => "tier1",
            Self::Tier2 => "tier2",
            Self::Tier3 => "tier3",
        }
    }

    /// Position in a three-entry point table
    pub fn index(self) -> usize {
        match self {
            Self::Tier1 => 0,
            Self::Tier2 => 1,
            Self::Tier3 => 2,
        }
    }
}

/// Exposure brightness bucket derived from the listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Brightness {
    Bright,
    Medium,
    Dark,
}

impl Brightness {
    /// Badge label, in the language of the listings
    pub fn label(self) -> &'static str {
        match self {
            Self::Bright => "Lumineux",
            Self::Medium => "Luminosité moyenne",
            Self::Dark => "Sombre",
        }
    }

    /// The only tier consistent with this bucket
    pub fn tier(self) -> Tier {
        match self {
            Self::Bright => Tier::Tier1,
            Self::Medium => Tier::Tier2,
            Self::Dark => Tier::Tier3,
        }
    }
}

/// One scored dimension of a listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CriterionKind {
    Location,
    Price,
    Style,
    Exposure,
    Kitchen,
    Bathtub,
}

impl CriterionKind {
    /// All criteria in display order
    pub fn all() -> &'static [CriterionKind] {
        &[
            Self::Location,
            Self::Price,
            Self::Style,
            Self::Exposure,
            Self::Kitchen,
            Self::Bathtub,
        ]
    }

    /// Badge title
    pub fn label(self) -> &'static str {
        match self {
            Self::Location => "Localisation",
            Self::Price => "Prix",
            Self::Style => "Style",
            Self::Exposure => "Exposition",
            Self::Kitchen => "Cuisine ouverte",
            Self::Bathtub => "Baignoire",
        }
    }

    /// Fixed tier→points table; `None` means the stored score is used verbatim
    pub fn tier_points(self) -> Option<[f64; 3]> {
        match self {
            Self::Exposure => Some([20.0, 10.0, 0.0]),
            Self::Kitchen => Some([10.0, 5.0, 0.0]),
            Self::Location | Self::Price | Self::Style | Self::Bathtub => None,
        }
    }
}

/// The value a criterion's tier was reconciled from
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Derived {
    /// Stored score and tier used as-is
    Stored,
    Brightness(Brightness),
    KitchenOpen(bool),
}

/// A reconciled criterion: the tier is consistent with the derived value and
/// `points` is what the criterion contributes to the aggregate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Criterion {
    pub kind: CriterionKind,
    pub tier: Tier,
    pub points: f64,
    pub derived: Derived,
}

/// Display form of a criterion
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Badge {
    pub kind: CriterionKind,
    pub name: &'static str,
    pub tier: Tier,
    pub points: f64,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier_label: Option<&'static str>,
    /// Confidence percentage (0-100)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hints: Option<String>,
}

/// Overall grade of an aggregate score relative to [`MAX_SCORE`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreGrade {
    Good,
    Fair,
    Poor,
}

impl ScoreGrade {
    /// >= 80% good, >= 60% fair, otherwise poor
    pub fn from_score(score: f64) -> Self {
        let scaled = score * 100.0;
        if scaled >= MAX_SCORE * 80.0 {
            Self::Good
        } else if scaled >= MAX_SCORE * 60.0 {
            Self::Fair
        } else {
            Self::Poor
        }
    }
}

/// Everything the dashboard shows for one listing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreCard {
    pub id: String,
    pub title: String,
    pub subtitle: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub score: f64,
    pub grade: ScoreGrade,
    pub badges: Vec<Badge>,
}

/// A listing with its computed scorecard
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedListing {
    /// 1-based position in the ranking
    pub rank: usize,
    pub card: ScoreCard,
    #[serde(skip)]
    pub listing: super::Listing,
}

/// Tier counts for one criterion across a ranking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TierDistribution {
    pub kind: CriterionKind,
    pub tier1: usize,
    pub tier2: usize,
    pub tier3: usize,
}

impl TierDistribution {
    pub fn new(kind: CriterionKind) -> Self {
        Self {
            kind,
            tier1: 0,
            tier2: 0,
            tier3: 0,
        }
    }

    pub fn add(&mut self, tier: Tier) {
        match tier {
            Tier::Tier1 => self.tier1 += 1,
            Tier::Tier2 => self.tier2 += 1,
            Tier::Tier3 => self.tier3 += 1,
        }
    }

    /// Listings that carry this criterion at all
    pub fn total(&self) -> usize {
        self.tier1 + self.tier2 + self.tier3
    }
}

/// Overview of a ranking
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RankingSummary {
    pub count: usize,
    pub mean: f64,
    pub best: f64,
    pub worst: f64,
    /// Number of listings graded good
    pub good: usize,
    pub tiers: Vec<TierDistribution>,
}
