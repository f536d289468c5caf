//! Ranking view widget - one row per listing, best first

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use crate::services::{score_text, LoadResult};
use crate::tui::theme::Theme;
use crate::types::{RankingSummary, MAX_SCORE};

/// Format a score bar with filled/empty blocks
/// Example: 45 of 90 with width 10 → "█████░░░░░"
pub fn score_bar(score: f64, width: usize) -> String {
    let ratio = (score / MAX_SCORE).clamp(0.0, 1.0);
    let filled = (ratio * width as f64).round() as usize;
    let empty = width.saturating_sub(filled);
    format!("{}{}", "█".repeat(filled), "░".repeat(empty))
}

/// First row index to draw so that `selected` stays visible
pub fn scroll_offset(selected: usize, visible_rows: usize) -> usize {
    if visible_rows == 0 || selected < visible_rows {
        0
    } else {
        selected + 1 - visible_rows
    }
}

/// Truncate to `width` chars, UTF-8 safe
fn fit(text: &str, width: usize) -> String {
    if text.chars().count() > width {
        format!(
            "{}…",
            text.chars().take(width.saturating_sub(1)).collect::<String>()
        )
    } else {
        text.to_string()
    }
}

/// Maximum content width for the ranking view
const MAX_CONTENT_WIDTH: u16 = 170;

/// Table width: Marker(2) + Rank(5) + Score(8) + Bar(12) + Listing(40) + Details(40) = 107
const TABLE_WIDTH: u16 = 107;

/// Ranking view widget
pub struct ListingsView<'a> {
    data: &'a LoadResult,
    selected: usize,
    theme: Theme,
    status: Option<&'a str>,
}

impl<'a> ListingsView<'a> {
    pub fn new(data: &'a LoadResult, selected: usize, theme: Theme) -> Self {
        Self {
            data,
            selected,
            theme,
            status: None,
        }
    }

    /// Right-aligned status text in the title line (reload progress, errors)
    pub fn with_status(mut self, status: Option<&'a str>) -> Self {
        self.status = status;
        self
    }
}

impl Widget for ListingsView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let content_width = area.width.min(MAX_CONTENT_WIDTH);
        let x_offset = (area.width.saturating_sub(content_width)) / 2;
        let centered_area = Rect {
            x: area.x + x_offset,
            y: area.y,
            width: content_width,
            height: area.height,
        };

        let chunks = Layout::vertical([
            Constraint::Length(1), // Top padding
            Constraint::Length(1), // Title
            Constraint::Length(1), // Summary
            Constraint::Length(1), // Separator
            Constraint::Length(1), // Header
            Constraint::Min(1),    // Listing rows
            Constraint::Length(1), // Separator
            Constraint::Length(1), // Keybindings
        ])
        .split(centered_area);

        self.render_title(chunks[1], buf);
        self.render_summary(chunks[2], buf);
        self.render_separator(chunks[3], buf);
        self.render_header(chunks[4], buf);
        self.render_rows(chunks[5], buf);
        self.render_separator(chunks[6], buf);
        self.render_keybindings(chunks[7], buf);
    }
}

impl ListingsView<'_> {
    fn table_area(&self, area: Rect) -> Rect {
        let offset = area.width.saturating_sub(TABLE_WIDTH) / 2;
        Rect {
            x: area.x + offset,
            y: area.y,
            width: TABLE_WIDTH.min(area.width),
            height: area.height,
        }
    }

    fn render_title(&self, area: Rect, buf: &mut Buffer) {
        let title = Line::from(vec![
            Span::styled(
                "homescore",
                Style::default()
                    .fg(self.theme.text())
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  updated {}", self.data.loaded_at.format("%H:%M:%S")),
                Style::default().fg(self.theme.muted()),
            ),
        ]);
        Paragraph::new(title)
            .alignment(Alignment::Left)
            .render(self.table_area(area), buf);

        if let Some(status) = self.status {
            Paragraph::new(Span::styled(status, Style::default().fg(self.theme.fair())))
                .alignment(Alignment::Right)
                .render(self.table_area(area), buf);
        }
    }

    fn render_summary(&self, area: Rect, buf: &mut Buffer) {
        let line = summary_line(&self.data.summary, self.data.warnings.len(), self.theme);
        Paragraph::new(line)
            .alignment(Alignment::Left)
            .render(self.table_area(area), buf);
    }

    fn render_separator(&self, area: Rect, buf: &mut Buffer) {
        let line = "─".repeat(area.width as usize);
        buf.set_string(
            area.x,
            area.y,
            &line,
            Style::default().fg(self.theme.muted()),
        );
    }

    fn render_header(&self, area: Rect, buf: &mut Buffer) {
        let bold = Style::default()
            .fg(self.theme.text())
            .add_modifier(Modifier::BOLD);
        let header = Line::from(vec![
            Span::styled(format!("  {:>4} ", "#"), bold),
            Span::styled(format!("{:>7} ", "Score"), bold),
            Span::styled(format!("{:<12}", ""), bold),
            Span::styled(format!("{:<40}", "Listing"), bold),
            Span::styled(format!("{:<40}", "Details"), bold),
        ]);
        Paragraph::new(header)
            .alignment(Alignment::Left)
            .render(self.table_area(area), buf);
    }

    fn render_rows(&self, area: Rect, buf: &mut Buffer) {
        let ranked = &self.data.ranked;
        if ranked.is_empty() {
            let msg = Span::styled(
                "No listings in this source yet",
                Style::default().fg(self.theme.muted()),
            );
            Paragraph::new(msg)
                .alignment(Alignment::Center)
                .render(area, buf);
            return;
        }

        let visible = area.height as usize;
        let start = scroll_offset(self.selected, visible);
        let table = self.table_area(area);

        for (i, entry) in ranked.iter().skip(start).take(visible).enumerate() {
            let y = area.y + i as u16;
            let is_selected = start + i == self.selected;
            let card = &entry.card;

            let base = if is_selected {
                Style::default().bg(self.theme.selection_bg())
            } else {
                Style::default()
            };
            let marker = if is_selected { "▶ " } else { "  " };

            let row = Line::from(vec![
                Span::styled(marker, base.fg(self.theme.accent())),
                Span::styled(format!("{:>4} ", entry.rank), base.fg(self.theme.muted())),
                Span::styled(
                    format!("{:>7} ", score_text(card.score)),
                    base.fg(self.theme.grade_color(card.grade))
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!("{:<12}", score_bar(card.score, 10)),
                    base.fg(self.theme.grade_color(card.grade)),
                ),
                Span::styled(
                    format!("{:<40}", fit(&card.title, 38)),
                    base.fg(self.theme.text()),
                ),
                Span::styled(
                    format!("{:<40}", fit(&card.subtitle, 40)),
                    base.fg(self.theme.muted()),
                ),
            ]);

            Paragraph::new(row).style(base).render(
                Rect {
                    x: table.x,
                    y,
                    width: table.width,
                    height: 1,
                },
                buf,
            );
        }
    }

    fn render_keybindings(&self, area: Rect, buf: &mut Buffer) {
        let bindings = Paragraph::new(Line::from(vec![
            Span::styled("q", Style::default().fg(self.theme.accent())),
            Span::styled(": Quit", Style::default().fg(self.theme.muted())),
            Span::raw("  "),
            Span::styled("j/k", Style::default().fg(self.theme.accent())),
            Span::styled(": Move", Style::default().fg(self.theme.muted())),
            Span::raw("  "),
            Span::styled("Enter", Style::default().fg(self.theme.accent())),
            Span::styled(": Details", Style::default().fg(self.theme.muted())),
            Span::raw("  "),
            Span::styled("r", Style::default().fg(self.theme.accent())),
            Span::styled(": Reload", Style::default().fg(self.theme.muted())),
            Span::raw("  "),
            Span::styled("?", Style::default().fg(self.theme.accent())),
            Span::styled(": Help", Style::default().fg(self.theme.muted())),
        ]))
        .alignment(Alignment::Center);

        bindings.render(area, buf);
    }
}

/// "12 listings · mean 41.5 · best 78 · 3 good · 1 skipped"
fn summary_line(summary: &RankingSummary, skipped: usize, theme: Theme) -> Line<'static> {
    let muted = Style::default().fg(theme.muted());
    let text = Style::default().fg(theme.text());
    if summary.count == 0 {
        return Line::from(Span::styled("0 listings", muted));
    }

    let mut spans = vec![
        Span::styled(summary.count.to_string(), text),
        Span::styled(" listings · mean ", muted),
        Span::styled(score_text(summary.mean), text),
        Span::styled(" · best ", muted),
        Span::styled(score_text(summary.best), Style::default().fg(theme.good())),
        Span::styled(" · worst ", muted),
        Span::styled(score_text(summary.worst), text),
        Span::styled(" · ", muted),
        Span::styled(summary.good.to_string(), Style::default().fg(theme.good())),
        Span::styled(" good", muted),
    ];
    if skipped > 0 {
        spans.push(Span::styled(" · ", muted));
        spans.push(Span::styled(
            format!("{} skipped", skipped),
            Style::default().fg(theme.error()),
        ));
    }
    Line::from(spans)
}
