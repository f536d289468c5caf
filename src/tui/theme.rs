//! Terminal theme detection and color definitions

use ratatui::style::Color;

use crate::types::{ScoreGrade, Tier};

/// Terminal color scheme (dark or light background)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    /// Auto-detect terminal theme from background luminance.
    /// Must be called **before** entering raw mode (ratatui::init).
    /// Falls back to Dark if detection fails.
    pub fn detect() -> Self {
        match terminal_light::luma() {
            Ok(luma) if luma > 0.6 => Self::Light,
            _ => Self::Dark,
        }
    }

    /// Primary text color (titles, badge values)
    pub fn text(self) -> Color {
        match self {
            Self::Dark => Color::White,
            Self::Light => Color::Black,
        }
    }

    /// Active/accent color (selection marker, keybinding keys)
    pub fn accent(self) -> Color {
        match self {
            Self::Dark => Color::Cyan,
            Self::Light => Color::Indexed(25), // dark blue (ANSI 256)
        }
    }

    /// Secondary/muted text (separators, subtitles, hints)
    pub fn muted(self) -> Color {
        match self {
            Self::Dark => Color::DarkGray,
            Self::Light => Color::Gray,
        }
    }

    /// Background of the selected row
    pub fn selection_bg(self) -> Color {
        match self {
            Self::Dark => Color::Indexed(236),
            Self::Light => Color::Indexed(254),
        }
    }

    pub fn good(self) -> Color {
        match self {
            Self::Dark => Color::Green,
            Self::Light => Color::Indexed(22), // dark green (ANSI 256)
        }
    }

    pub fn fair(self) -> Color {
        match self {
            Self::Dark => Color::Yellow,
            Self::Light => Color::Indexed(130), // dark orange/yellow (ANSI 256)
        }
    }

    /// Error/poor indicator color
    pub fn error(self) -> Color {
        match self {
            Self::Dark => Color::Red,
            Self::Light => Color::Indexed(124), // dark red (ANSI 256)
        }
    }

    /// Badge color: tier1 green, tier2 yellow, tier3 red
    pub fn tier_color(self, tier: Tier) -> Color {
        match tier {
            Tier::Tier1 => self.good(),
            Tier::Tier2 => self.fair(),
            Tier::Tier3 => self.error(),
        }
    }

    /// Overall score color
    pub fn grade_color(self, grade: ScoreGrade) -> Color {
        match grade {
            ScoreGrade::Good => self.good(),
            ScoreGrade::Fair => self.fair(),
            ScoreGrade::Poor => self.error(),
        }
    }
}
