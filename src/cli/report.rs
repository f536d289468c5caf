//! Plain-text rendering for `rank`, `show` and `watch`

use std::fmt::Write;

use crate::services::score_text;
use crate::types::{Badge, RankedListing, RankingSummary, ScoreCard, MAX_SCORE};

const TITLE_WIDTH: usize = 36;

/// Ranked table, one listing per line
pub fn render_table(ranked: &[RankedListing], limit: Option<usize>) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>4}  {:>5}  {:<width$}  {}",
        "#",
        "SCORE",
        "LISTING",
        "ID",
        width = TITLE_WIDTH
    );

    let shown = limit.unwrap_or(ranked.len()).min(ranked.len());
    for entry in &ranked[..shown] {
        let _ = writeln!(
            out,
            "{:>4}  {:>5}  {:<width$}  {}",
            entry.rank,
            score_text(entry.card.score),
            truncate(&entry.card.title, TITLE_WIDTH),
            entry.card.id,
            width = TITLE_WIDTH
        );
    }
    if shown < ranked.len() {
        let _ = writeln!(out, "      … {} more", ranked.len() - shown);
    }
    out
}

pub fn render_summary(summary: &RankingSummary) -> String {
    if summary.count == 0 {
        return "No listings.\n".to_string();
    }
    let mut out = format!(
        "{} listings · mean {} · best {} · worst {} · {} good\n",
        summary.count,
        score_text(summary.mean),
        score_text(summary.best),
        score_text(summary.worst),
        summary.good
    );
    for dist in &summary.tiers {
        if dist.total() == 0 {
            continue;
        }
        let _ = writeln!(
            out,
            "  {:<16} tier1 {:>3}  tier2 {:>3}  tier3 {:>3}",
            dist.kind.label(),
            dist.tier1,
            dist.tier2,
            dist.tier3
        );
    }
    out
}

/// Full card with one line per badge
pub fn render_card(card: &ScoreCard) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", card.title);
    if !card.subtitle.is_empty() {
        let _ = writeln!(out, "{}", card.subtitle);
    }
    let _ = writeln!(
        out,
        "Score: {} / {} ({:?})",
        score_text(card.score),
        MAX_SCORE,
        card.grade
    );
    if let Some(url) = &card.url {
        let _ = writeln!(out, "{}", url);
    }
    out.push('\n');
    for badge in &card.badges {
        out.push_str(&render_badge(badge));
    }
    out
}

fn render_badge(badge: &Badge) -> String {
    let mut line = format!(
        "  {:<16} {:>4} pts  [{}]  {}",
        badge.name,
        score_text(badge.points),
        badge.tier.as_str(),
        badge.value
    );
    if let Some(label) = badge.tier_label {
        let _ = write!(line, " ({})", label);
    }
    if let Some(confidence) = badge.confidence {
        let _ = write!(line, " · {}% confiance", confidence);
    }
    line.push('\n');
    if let Some(hints) = &badge.hints {
        let _ = writeln!(line, "  {:<16} {}", "", hints);
    }
    line
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
        cut.push('…');
        cut
    }
}
