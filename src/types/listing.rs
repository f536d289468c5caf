//! Listing record types
//!
//! Listings arrive as loosely-typed JSON produced by the scraping and
//! analysis pipeline. Every group is optional and decoding is lenient: a
//! malformed group or value is treated as absent instead of rejecting the
//! whole record. Both the English field names and the French names used by
//! the scraper are accepted.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::Tier;

/// One apartment listing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub url: Option<String>,
    #[serde(default, alias = "titre", deserialize_with = "lenient_string")]
    pub title: Option<String>,
    /// Asking price as scraped, e.g. "750 000 €"
    #[serde(default, alias = "prix", deserialize_with = "lenient_string")]
    pub price: Option<String>,
    /// Surface as scraped, e.g. "62 m²"
    #[serde(default, deserialize_with = "lenient_string")]
    pub surface: Option<String>,
    #[serde(default, alias = "pieces", deserialize_with = "lenient_string")]
    pub rooms: Option<String>,
    /// Free-text location, e.g. "Paris 19e (75019)"
    #[serde(default, alias = "localisation", deserialize_with = "lenient_string")]
    pub location: Option<String>,
    #[serde(default, alias = "prix_m2", deserialize_with = "lenient_string")]
    pub price_m2: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: Option<String>,
    #[serde(default, alias = "etage", deserialize_with = "lenient_floor")]
    pub floor: Option<Floor>,
    #[serde(default, alias = "caracteristiques", deserialize_with = "lenient")]
    pub characteristics: Option<Characteristics>,
    #[serde(
        default,
        alias = "scoresDetail",
        alias = "scores_detaille",
        deserialize_with = "lenient"
    )]
    pub scores_detail: Option<ScoresDetail>,
    #[serde(default, alias = "styleAnalysis", deserialize_with = "lenient")]
    pub style_analysis: Option<StyleAnalysis>,
    #[serde(default, deserialize_with = "lenient")]
    pub exposition: Option<Exposition>,
    #[serde(default, alias = "formattedData", deserialize_with = "lenient")]
    pub formatted_data: Option<FormattedData>,
    #[serde(
        default,
        alias = "baignoire_data",
        alias = "bathtubData",
        deserialize_with = "lenient"
    )]
    pub bathtub_data: Option<BathtubData>,
    #[serde(default, alias = "mapInfo", deserialize_with = "lenient")]
    pub map_info: Option<MapInfo>,
}

impl Listing {
    /// Listing id, or an empty string when the record carries none
    pub fn id(&self) -> &str {
        self.id.as_deref().unwrap_or("")
    }

    /// Directional orientation string, e.g. "Sud-Ouest"
    pub fn orientation(&self) -> Option<&str> {
        self.exposition.as_ref()?.orientation.as_deref()
    }

    /// Whether the orientation was explicitly mentioned in the ad text.
    /// `None` for records produced before the flag existed.
    pub fn orientation_explicit(&self) -> Option<bool> {
        self.exposition.as_ref()?.explicit
    }

    /// Luminosity classification from photo analysis, e.g. "excellente"
    pub fn luminosity(&self) -> Option<&Classification> {
        self.style_analysis.as_ref()?.luminosity.as_ref()
    }

    /// Kitchen analysis from photo analysis
    pub fn kitchen_analysis(&self) -> Option<&KitchenAnalysis> {
        self.style_analysis.as_ref()?.kitchen.as_ref()
    }

    /// Pre-formatted exposure display from the backend
    pub fn formatted_exposure(&self) -> Option<&FormattedExposure> {
        self.formatted_data.as_ref()?.exposition.as_ref()
    }

    /// Neighbourhood found near the photos' location, e.g. "Jourdain (proximité)"
    pub fn photo_quartier(&self) -> Option<&str> {
        self.exposition
            .as_ref()?
            .details
            .as_ref()?
            .photo_details
            .as_ref()?
            .quartier
            .as_ref()?
            .quartier
            .as_deref()
    }

    /// Stored score group for one criterion
    pub fn criterion_score(&self, kind: super::CriterionKind) -> Option<&CriterionScore> {
        self.scores_detail.as_ref()?.get(kind)
    }
}

/// Floor as scraped: either a level number or a label like "3e étage"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Floor {
    Level(i64),
    Label(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Characteristics {
    #[serde(default, alias = "etage", deserialize_with = "lenient_floor")]
    pub floor: Option<Floor>,
}

/// Per-criterion stored scores
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoresDetail {
    #[serde(default, alias = "localisation", deserialize_with = "lenient")]
    pub location: Option<CriterionScore>,
    #[serde(default, alias = "prix", deserialize_with = "lenient")]
    pub price: Option<CriterionScore>,
    #[serde(default, deserialize_with = "lenient")]
    pub style: Option<CriterionScore>,
    #[serde(default, alias = "ensoleillement", deserialize_with = "lenient")]
    pub exposure: Option<CriterionScore>,
    #[serde(default, alias = "cuisine", deserialize_with = "lenient")]
    pub kitchen: Option<CriterionScore>,
    #[serde(default, alias = "baignoire", deserialize_with = "lenient")]
    pub bathtub: Option<CriterionScore>,
}

impl ScoresDetail {
    pub fn get(&self, kind: super::CriterionKind) -> Option<&CriterionScore> {
        use super::CriterionKind;
        match kind {
            CriterionKind::Location => self.location.as_ref(),
            CriterionKind::Price => self.price.as_ref(),
            CriterionKind::Style => self.style.as_ref(),
            CriterionKind::Exposure => self.exposure.as_ref(),
            CriterionKind::Kitchen => self.kitchen.as_ref(),
            CriterionKind::Bathtub => self.bathtub.as_ref(),
        }
    }
}

/// Stored score for one criterion. `score` may be stale relative to the
/// reconciled tier for criteria with a fixed tier table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CriterionScore {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub score: Option<f64>,
    #[serde(default, deserialize_with = "lenient_tier")]
    pub tier: Option<Tier>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub justification: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StyleAnalysis {
    #[serde(default, deserialize_with = "lenient")]
    pub style: Option<Classification>,
    #[serde(default, alias = "luminosite", deserialize_with = "lenient")]
    pub luminosity: Option<Classification>,
    #[serde(default, alias = "cuisine", deserialize_with = "lenient")]
    pub kitchen: Option<KitchenAnalysis>,
}

/// Free-text classification with an optional model confidence
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    #[serde(rename = "type", default, deserialize_with = "lenient_string")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub confidence: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KitchenAnalysis {
    #[serde(default, alias = "ouverte", deserialize_with = "lenient_bool")]
    pub open: Option<bool>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub confidence: Option<f64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub details: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Exposition {
    /// Orientation; the scraper stores it under `exposition` as well
    #[serde(
        default,
        alias = "exposition",
        alias = "direction",
        deserialize_with = "lenient_string"
    )]
    pub orientation: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub confidence: Option<f64>,
    #[serde(
        default,
        alias = "exposition_explicite",
        alias = "explicitlyMentioned",
        deserialize_with = "lenient_bool"
    )]
    pub explicit: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    pub details: Option<ExpositionDetails>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpositionDetails {
    #[serde(default, alias = "photoDetails", deserialize_with = "lenient")]
    pub photo_details: Option<PhotoDetails>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PhotoDetails {
    #[serde(default, deserialize_with = "lenient")]
    pub quartier: Option<PhotoQuartier>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PhotoQuartier {
    #[serde(default, deserialize_with = "lenient_string")]
    pub quartier: Option<String>,
}

/// Map lookup results attached by the scraper
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MapInfo {
    /// e.g. "Place des Fêtes (score: 3)"
    #[serde(default, deserialize_with = "lenient_string")]
    pub quartier: Option<String>,
    /// Nearby stations, closest first
    #[serde(default, deserialize_with = "lenient")]
    pub metros: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormattedData {
    #[serde(default, deserialize_with = "lenient")]
    pub exposition: Option<FormattedExposure>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormattedExposure {
    #[serde(default, alias = "mainValue", deserialize_with = "lenient_string")]
    pub main_value: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub indices: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub confidence: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BathtubData {
    #[serde(default, alias = "has_baignoire", deserialize_with = "lenient_bool")]
    pub has_bathtub: Option<bool>,
    #[serde(default, alias = "has_douche", deserialize_with = "lenient_bool")]
    pub has_shower: Option<bool>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub confidence: Option<f64>,
}

// ========== Lenient field decoders ==========

/// Decode a nested group, treating any shape mismatch as absent.
///
/// A group carrying both spellings of one field (`location` and
/// `localisation`) is a duplicate-field error and is discarded too.
fn lenient<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| {
        serde_json::from_value(v)
            .map_err(|e| {
                tracing::warn!(
                    group = std::any::type_name::<T>(),
                    error = %e,
                    "discarding malformed listing group"
                )
            })
            .ok()
    }))
}

/// Accept numbers and numeric strings ("15", "12,5"); anything else is absent
fn lenient_f64<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| parse_number(&v)))
}

pub(crate) fn parse_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', ".").parse::<f64>().ok(),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

/// Accept strings and numbers; empty strings are absent
fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        Value::String(s) if !s.trim().is_empty() => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }))
}

fn lenient_bool<'de, D>(deserializer: D) -> std::result::Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        Value::Bool(b) => Some(b),
        Value::Number(n) => n.as_f64().map(|f| f != 0.0),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "oui" | "yes" | "1" => Some(true),
            "false" | "non" | "no" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }))
}

fn lenient_tier<'de, D>(deserializer: D) -> std::result::Result<Option<Tier>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        Value::String(s) => Tier::parse(&s),
        Value::Number(n) => n.as_u64().and_then(Tier::from_rank),
        _ => None,
    }))
}

fn lenient_floor<'de, D>(deserializer: D) -> std::result::Result<Option<Floor>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f as i64))
            .map(Floor::Level),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else if let Ok(level) = trimmed.parse::<i64>() {
                Some(Floor::Level(level))
            } else {
                Some(Floor::Label(trimmed.to_string()))
            }
        }
        _ => None,
    }))
}
