//! Badge and card formatting
//!
//! Turns reconciled criteria into display badges. Tiers and points are
//! always taken from [`ScoreNormalizer::reconcile`]; this module only
//! decides the text shown next to them.

use std::sync::LazyLock;

use regex::Regex;

use crate::services::normalizer::{is_known_orientation, ScoreNormalizer};
use crate::types::{
    Badge, Criterion, CriterionKind, Derived, Floor, Listing, ScoreCard, ScoreGrade, Tier,
};

static METRO_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)métro\s+([A-Za-z\s\-éàèùîêôûçâë']+?)(?:[,.]|\s+(?:zone|ligne|arrondissement)|\s*$)",
    )
    .expect("valid regex")
});

static QUARTIER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)quartier\s+([A-Za-z\s\-éàèùîêôûçâë']+?)[,.]").expect("valid regex")
});

/// Known neighbourhoods, tried in priority order against the location
static KNOWN_QUARTIER_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)Buttes[- ]Chaumont",
        r"(?i)Place des Fêtes",
        r"(?i)Place de la Réunion",
        r"(?i)Jourdain",
        r"(?i)Pyrénées",
        r"(?i)Belleville",
        r"(?i)Ménilmontant",
        r"(?i)Canal de l'Ourcq",
    ]
    .into_iter()
    .map(|pattern| Regex::new(pattern).expect("valid regex"))
    .collect()
});

static MAP_SCORE_SUFFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\(score:\s*\d+\)").expect("valid regex"));

static PROXIMITY_SUFFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\(proximité\)").expect("valid regex"));

static METRO_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^métro\s+").expect("valid regex"));

static ARRONDISSEMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Paris (\d+e)").expect("valid regex"));

static SURFACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\s*m²").expect("valid regex"));

static FIRST_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)").expect("valid regex"));

/// Floor patterns tried in order against the description
static FLOOR_RES: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        Regex::new(r"(?i)(\d+)\s*(?:er|ère|ème|eme|e)\s*(?:étage|ét\.)").expect("valid regex"),
        Regex::new(r"(?i)étage\s*(\d+)").expect("valid regex"),
        Regex::new(r"(?i)\bRDC\b|rez[- ]de[- ]chaussée").expect("valid regex"),
    ]
});

const REJECTED_QUARTIERS: &[&str] = &[
    "non identifié",
    "non identifiée",
    "correcte",
    "bonnes zones",
];

const REJECTED_METROS: &[&str] = &["non trouvé", "proximité", "immédiate"];

/// Builds badges and score cards from listings
pub struct CriterionFormatter;

impl CriterionFormatter {
    /// One badge per reconciled criterion, in display order
    pub fn badges(listing: &Listing) -> Vec<Badge> {
        ScoreNormalizer::reconcile(listing)
            .iter()
            .map(|criterion| Self::badge(listing, criterion))
            .collect()
    }

    /// Display form of a reconciled criterion
    pub fn badge(listing: &Listing, criterion: &Criterion) -> Badge {
        let mut badge = Badge {
            kind: criterion.kind,
            name: criterion.kind.label(),
            tier: criterion.tier,
            points: criterion.points,
            value: String::new(),
            tier_label: None,
            confidence: None,
            hints: None,
        };

        match criterion.kind {
            CriterionKind::Location => {
                badge.value = location_label(listing);
            }
            CriterionKind::Price => {
                badge.value =
                    price_per_m2(listing).unwrap_or_else(|| "Prix/m² non disponible".to_string());
                badge.tier_label = Some(price_tier_label(criterion.tier));
            }
            CriterionKind::Style => {
                badge.value = style_tier_label(criterion.tier).to_string();
                badge.confidence = listing
                    .style_analysis
                    .as_ref()
                    .and_then(|s| s.style.as_ref())
                    .and_then(|s| s.confidence)
                    .and_then(confidence_percent);
            }
            CriterionKind::Exposure => {
                let label = match criterion.derived {
                    Derived::Brightness(bucket) => bucket.label(),
                    _ => ScoreNormalizer::brightness(listing).label(),
                };
                badge.value = label.to_string();
                badge.confidence = exposure_confidence(listing);
                badge.hints = exposure_hints(listing);
            }
            CriterionKind::Kitchen => {
                let open = match criterion.derived {
                    Derived::KitchenOpen(open) => open,
                    _ => ScoreNormalizer::kitchen_open(listing),
                };
                badge.value = if open { "Ouverte" } else { "Fermée" }.to_string();
                badge.confidence = listing
                    .kitchen_analysis()
                    .and_then(|k| k.confidence)
                    .and_then(confidence_percent);
            }
            CriterionKind::Bathtub => {
                let data = listing.bathtub_data.as_ref();
                let has_bathtub = data
                    .and_then(|b| b.has_bathtub)
                    .unwrap_or(criterion.tier == Tier::Tier1);
                badge.value = if has_bathtub { "Oui" } else { "Non" }.to_string();
                badge.confidence = data.and_then(|b| b.confidence).and_then(confidence_percent);
                badge.hints = bathtub_hints(listing, has_bathtub);
            }
        }

        badge
    }

    /// Full card for one listing: title, subtitle, aggregate and badges
    pub fn scorecard(listing: &Listing) -> ScoreCard {
        let criteria = ScoreNormalizer::reconcile(listing);
        let score = ScoreNormalizer::total(&criteria);
        let badges = criteria
            .iter()
            .map(|criterion| Self::badge(listing, criterion))
            .collect();

        ScoreCard {
            id: listing.id().to_string(),
            title: title(listing),
            subtitle: subtitle(listing),
            url: listing.url.clone(),
            score,
            grade: ScoreGrade::from_score(score),
            badges,
        }
    }
}

/// Aggregate as displayed: "78" rather than "78.0"
pub fn score_text(score: f64) -> String {
    let text = format!("{:.1}", score);
    match text.strip_suffix(".0") {
        Some(whole) => whole.to_string(),
        None => text,
    }
}

/// Integer with space thousands separators: 11500 → "11 500"
pub fn format_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(' ');
        }
        out.push(c);
    }
    out
}

/// Leading integer of a scraped amount, ignoring inner spaces ("750 000 €" → 750000)
fn leading_number(text: &str) -> Option<u64> {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    FIRST_NUMBER_RE
        .captures(&compact)
        .and_then(|caps| caps[1].parse().ok())
}

/// Asking price in thousands: "750 000 €" → "750k"
pub fn price_k(price: &str) -> Option<String> {
    let digits: String = price.chars().filter(char::is_ascii_digit).collect();
    let value: u64 = digits.parse().ok()?;
    Some(format!("{}k", (value as f64 / 1000.0).round() as u64))
}

/// Price per m², from `price_m2` when usable, else price ÷ surface
pub fn price_per_m2(listing: &Listing) -> Option<String> {
    let stored = listing
        .price_m2
        .as_deref()
        .filter(|p| !p.contains("non trouvé"))
        .and_then(leading_number);

    let per_m2 = stored.or_else(|| {
        let surface = FIRST_NUMBER_RE
            .captures(listing.surface.as_deref()?)?
            .get(1)?
            .as_str()
            .parse::<u64>()
            .ok()?;
        let price = leading_number(listing.price.as_deref()?)?;
        (surface > 0).then(|| price / surface)
    })?;

    Some(format!("{} € / m²", format_thousands(per_m2)))
}

pub fn price_tier_label(tier: Tier) -> &'static str {
    match tier {
        Tier::Tier1 => "Good",
        Tier::Tier2 => "Moyen",
        Tier::Tier3 => "Bad",
    }
}

pub fn style_tier_label(tier: Tier) -> &'static str {
    match tier {
        Tier::Tier1 => "Ancien",
        Tier::Tier2 => "Atypique",
        Tier::Tier3 => "Neuf",
    }
}

/// Model confidence as a whole percentage. Values up to 1 are fractions,
/// values up to 100 are already percentages, anything else is dropped.
pub fn confidence_percent(confidence: f64) -> Option<u8> {
    if !confidence.is_finite() || confidence < 0.0 {
        None
    } else if confidence <= 1.0 {
        Some((confidence * 100.0).round() as u8)
    } else if confidence <= 100.0 {
        Some(confidence.round() as u8)
    } else {
        None
    }
}

fn exposure_confidence(listing: &Listing) -> Option<u8> {
    let confidence = match listing.formatted_exposure() {
        Some(formatted) => formatted.confidence,
        None => listing
            .exposition
            .as_ref()
            .and_then(|e| e.confidence)
            .or_else(|| listing.luminosity().and_then(|l| l.confidence)),
    };
    confidence.and_then(confidence_percent)
}

/// Backend-formatted hints when the record carries them. Otherwise the
/// floor, any vis-à-vis mention, then the detected orientation; the
/// orientation hint is hidden only when the record says it was not
/// explicitly mentioned.
fn exposure_hints(listing: &Listing) -> Option<String> {
    if let Some(formatted) = listing.formatted_exposure() {
        return formatted
            .indices
            .as_deref()
            .map(str::trim)
            .filter(|indices| !indices.is_empty())
            .map(str::to_string);
    }

    let mut hints = Vec::new();
    if let Some(floor) = floor_label(listing) {
        hints.push(floor);
    }
    if let Some(vis_a_vis) = vis_a_vis_hint(listing) {
        hints.push(vis_a_vis.to_string());
    }

    let show_orientation = listing.orientation_explicit().unwrap_or(true);
    if let Some(orientation) = listing.orientation().filter(|_| show_orientation) {
        if is_known_orientation(orientation) {
            hints.push(format!("Exposition {} détectée", orientation.trim()));
        }
    }

    (!hints.is_empty()).then(|| hints.join(" · "))
}

fn vis_a_vis_hint(listing: &Listing) -> Option<&'static str> {
    let description = listing.description.as_deref()?.to_lowercase();
    if description.contains("pas de vis") {
        Some("pas de vis à vis")
    } else if description.contains("vis-à-vis") || description.contains("vis à vis") {
        Some("vis à vis")
    } else {
        None
    }
}

fn bathtub_hints(listing: &Listing, has_bathtub: bool) -> Option<String> {
    let justification = listing
        .criterion_score(CriterionKind::Bathtub)?
        .justification
        .as_deref()?;
    let has_shower = listing
        .bathtub_data
        .as_ref()
        .and_then(|b| b.has_shower)
        .unwrap_or(false);
    let lower = justification.to_lowercase();

    if ["photo", "détectée", "analysée"].iter().any(|w| lower.contains(w)) {
        if has_bathtub {
            Some("Analyse photo : Baignoire détectée".to_string())
        } else if has_shower {
            Some("Analyse photo : Douche détectée".to_string())
        } else {
            None
        }
    } else if lower.contains("description") || lower.contains("caractéristiques") {
        if has_bathtub {
            Some("Baignoire mentionnée dans le texte".to_string())
        } else if has_shower {
            Some("Douche mentionnée dans le texte".to_string())
        } else {
            None
        }
    } else if justification.chars().count() < 100 {
        Some(justification.to_string())
    } else {
        None
    }
}

/// "RDC", "1er étage", "4e étage"
pub fn floor_level_label(level: i64) -> String {
    match level {
        0 => "RDC".to_string(),
        1 => "1er étage".to_string(),
        n => format!("{}e étage", n),
    }
}

fn floor_text(floor: &Floor) -> String {
    match floor {
        Floor::Level(level) => floor_level_label(*level),
        Floor::Label(label) => label.clone(),
    }
}

/// Floor from the explicit field, the characteristics, or the description
pub fn floor_label(listing: &Listing) -> Option<String> {
    if let Some(floor) = listing.floor.as_ref() {
        return Some(floor_text(floor));
    }
    if let Some(floor) = listing.characteristics.as_ref().and_then(|c| c.floor.as_ref()) {
        return Some(floor_text(floor));
    }

    let description = listing.description.as_deref()?;
    let [ordinal, after, ground] = &*FLOOR_RES;
    for re in [ordinal, after] {
        if let Some(level) = re
            .captures(description)
            .and_then(|caps| caps[1].parse::<i64>().ok())
        {
            return Some(floor_level_label(level));
        }
    }
    ground.is_match(description).then(|| "RDC".to_string())
}

fn location_justification(listing: &Listing) -> &str {
    listing
        .criterion_score(CriterionKind::Location)
        .and_then(|s| s.justification.as_deref())
        .unwrap_or("")
}

fn usable_metro(metro: &str) -> Option<String> {
    let len = metro.chars().count();
    let rejected = REJECTED_METROS.contains(&metro.to_lowercase().as_str());
    (len > 2 && len < 50 && !rejected).then(|| metro.to_string())
}

fn usable_quartier(quartier: &str) -> Option<String> {
    let quartier = quartier.trim();
    let rejected = REJECTED_QUARTIERS.contains(&quartier.to_lowercase().as_str());
    (!quartier.is_empty() && !rejected).then(|| quartier.to_string())
}

/// Nearest metro station: the location justification, then the first
/// station from the map lookup
pub fn metro_name(listing: &Listing) -> Option<String> {
    if let Some(caps) = METRO_RE.captures(location_justification(listing)) {
        if let Some(metro) = usable_metro(caps[1].trim()) {
            return Some(metro);
        }
    }

    let first = listing.map_info.as_ref()?.metros.as_ref()?.first()?;
    usable_metro(METRO_PREFIX_RE.replace(first.trim(), "").trim())
}

/// Neighbourhood, from the first source that names one: the map lookup, the
/// location justification, the photo analysis, then a known name in the
/// free-text location
pub fn quartier_name(listing: &Listing) -> Option<String> {
    let from_map = listing
        .map_info
        .as_ref()
        .and_then(|m| m.quartier.as_deref())
        .filter(|q| !q.trim().eq_ignore_ascii_case("quartier non identifié"))
        .and_then(|q| usable_quartier(&MAP_SCORE_SUFFIX_RE.replace_all(q, "")));
    if from_map.is_some() {
        return from_map;
    }

    if let Some(caps) = QUARTIER_RE.captures(location_justification(listing)) {
        let quartier = caps[1].trim();
        if quartier.chars().count() > 3 {
            if let Some(quartier) = usable_quartier(quartier) {
                return Some(quartier);
            }
        }
    }

    let from_photos = listing
        .photo_quartier()
        .and_then(|q| usable_quartier(&PROXIMITY_SUFFIX_RE.replace_all(q, "")));
    if from_photos.is_some() {
        return from_photos;
    }

    let location = listing.location.as_deref()?;
    KNOWN_QUARTIER_RES
        .iter()
        .find_map(|re| re.find(location))
        .map(|m| m.as_str().to_string())
}

/// "Metro Jourdain · Place des Fêtes", or "Non spécifié"
pub fn location_label(listing: &Listing) -> String {
    let mut parts = Vec::new();
    if let Some(metro) = metro_name(listing) {
        parts.push(format!("Metro {}", metro));
    }
    if let Some(quartier) = quartier_name(listing) {
        parts.push(quartier);
    }
    if parts.is_empty() {
        "Non spécifié".to_string()
    } else {
        parts.join(" · ")
    }
}

/// Photo-analysis style for the subtitle, e.g. "Style Haussmannien"
pub fn style_name(listing: &Listing) -> Option<String> {
    let kind = listing
        .style_analysis
        .as_ref()?
        .style
        .as_ref()?
        .kind
        .as_deref()?
        .trim();
    let lower = kind.to_lowercase();
    if lower.is_empty() || lower == "autre" || lower == "inconnu" {
        return None;
    }

    let name = if lower.contains("70") || lower.contains("seventies") {
        "70s".to_string()
    } else if lower.contains("haussmann") {
        "Haussmannien".to_string()
    } else {
        let mut chars = kind.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => return None,
        }
    };
    Some(format!("Style {}", name))
}

/// "750k · Jourdain", falling back through metro, arrondissement and raw location
pub fn title(listing: &Listing) -> String {
    let price = listing.price.as_deref().and_then(price_k);
    let quartier = quartier_name(listing);
    let metro = metro_name(listing);
    let location = listing.location.as_deref().unwrap_or("");

    match (price, quartier.or(metro)) {
        (Some(price), Some(place)) => format!("{} · {}", price, place),
        (Some(price), None) => match ARRONDISSEMENT_RE.captures(location) {
            Some(caps) => format!("{} · Paris {}", price, &caps[1]),
            None if location.is_empty() => price,
            None => format!("{} · {}", price, location),
        },
        (None, Some(place)) => place,
        (None, None) if location.is_empty() => "Appartement".to_string(),
        (None, None) => location.to_string(),
    }
}

/// "62 m² · 3e étage · Style Haussmannien"
pub fn subtitle(listing: &Listing) -> String {
    let surface = [listing.surface.as_deref(), listing.title.as_deref()]
        .into_iter()
        .flatten()
        .find_map(|text| SURFACE_RE.captures(text).map(|caps| format!("{} m²", &caps[1])));

    let parts: Vec<String> = [surface, floor_label(listing), style_name(listing)]
        .into_iter()
        .flatten()
        .collect();

    if parts.is_empty() {
        [listing.surface.as_deref(), listing.rooms.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" · ")
    } else {
        parts.join(" · ")
    }
}
