//! Detail view widget - every criterion badge of one listing

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget, Wrap},
};

use crate::services::score_text;
use crate::tui::theme::Theme;
use crate::types::{Badge, RankedListing, MAX_SCORE};

/// Maximum content width for the detail view
const MAX_CONTENT_WIDTH: u16 = 100;

/// Width of the badge name column
const NAME_WIDTH: usize = 18;

/// Detail view widget
pub struct DetailView<'a> {
    entry: &'a RankedListing,
    total: usize,
    theme: Theme,
}

impl<'a> DetailView<'a> {
    /// `total` is the size of the ranking the entry belongs to
    pub fn new(entry: &'a RankedListing, total: usize, theme: Theme) -> Self {
        Self {
            entry,
            total,
            theme,
        }
    }
}

impl Widget for DetailView<'_> {
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
            Constraint::Length(1), // Subtitle
            Constraint::Length(1), // Score
            Constraint::Length(1), // URL
            Constraint::Length(1), // Separator
            Constraint::Min(1),    // Badges
            Constraint::Length(1), // Separator
            Constraint::Length(1), // Keybindings
        ])
        .split(centered_area);

        self.render_heading(&chunks[1..5], buf);
        self.render_separator(chunks[5], buf);
        Paragraph::new(self.badge_lines())
            .wrap(Wrap { trim: false })
            .render(chunks[6], buf);
        self.render_separator(chunks[7], buf);
        self.render_keybindings(chunks[8], buf);
    }
}

impl DetailView<'_> {
    fn render_heading(&self, rows: &[Rect], buf: &mut Buffer) {
        let card = &self.entry.card;

        let title = Line::from(vec![
            Span::styled(
                format!("#{} of {}  ", self.entry.rank, self.total),
                Style::default().fg(self.theme.muted()),
            ),
            Span::styled(
                card.title.as_str(),
                Style::default()
                    .fg(self.theme.text())
                    .add_modifier(Modifier::BOLD),
            ),
        ]);
        Paragraph::new(title).render(rows[0], buf);

        Paragraph::new(Span::styled(
            card.subtitle.as_str(),
            Style::default().fg(self.theme.muted()),
        ))
        .render(rows[1], buf);

        let score = Line::from(vec![
            Span::styled("Score ", Style::default().fg(self.theme.muted())),
            Span::styled(
                score_text(card.score),
                Style::default()
                    .fg(self.theme.grade_color(card.grade))
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!(" / {}", score_text(MAX_SCORE)),
                Style::default().fg(self.theme.muted()),
            ),
        ]);
        Paragraph::new(score).render(rows[2], buf);

        if let Some(url) = &card.url {
            Paragraph::new(Span::styled(
                url.as_str(),
                Style::default().fg(self.theme.accent()),
            ))
            .render(rows[3], buf);
        }
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

    fn badge_lines(&self) -> Vec<Line<'_>> {
        let mut lines = Vec::new();
        for badge in &self.entry.card.badges {
            lines.push(self.badge_line(badge));
            if let Some(hints) = &badge.hints {
                lines.push(Line::from(vec![
                    Span::raw(" ".repeat(NAME_WIDTH + 12)),
                    Span::styled(hints.as_str(), Style::default().fg(self.theme.muted())),
                ]));
            }
        }
        if lines.is_empty() {
            lines.push(Line::from(Span::styled(
                "No scored criteria",
                Style::default().fg(self.theme.muted()),
            )));
        }
        lines
    }

    fn badge_line<'b>(&self, badge: &'b Badge) -> Line<'b> {
        let tier_color = self.theme.tier_color(badge.tier);
        let mut spans = vec![
            Span::styled("● ", Style::default().fg(tier_color)),
            Span::styled(
                format!("{:<width$}", badge.name, width = NAME_WIDTH),
                Style::default().fg(self.theme.text()),
            ),
            Span::styled(
                format!("{:>5} pts  ", score_text(badge.points)),
                Style::default().fg(tier_color).add_modifier(Modifier::BOLD),
            ),
            Span::styled(badge.value.as_str(), Style::default().fg(self.theme.text())),
        ];
        if let Some(label) = badge.tier_label {
            spans.push(Span::styled(
                format!(" ({})", label),
                Style::default().fg(tier_color),
            ));
        }
        if let Some(confidence) = badge.confidence {
            spans.push(Span::styled(
                format!(" · {}%", confidence),
                Style::default().fg(self.theme.muted()),
            ));
        }
        Line::from(spans)
    }

    fn render_keybindings(&self, area: Rect, buf: &mut Buffer) {
        let bindings = Paragraph::new(Line::from(vec![
            Span::styled("Esc", Style::default().fg(self.theme.accent())),
            Span::styled(": Back", Style::default().fg(self.theme.muted())),
            Span::raw("  "),
            Span::styled("j/k", Style::default().fg(self.theme.accent())),
            Span::styled(": Prev/Next listing", Style::default().fg(self.theme.muted())),
            Span::raw("  "),
            Span::styled("?", Style::default().fg(self.theme.accent())),
            Span::styled(": Help", Style::default().fg(self.theme.muted())),
        ]))
        .alignment(Alignment::Center);

        bindings.render(area, buf);
    }
}
