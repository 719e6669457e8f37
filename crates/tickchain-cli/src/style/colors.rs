//! Semantic color palette for terminal output.
//!
//! Bands run green (A+) to red (D); dt health runs green (nominal) to red
//! (stalled).

use owo_colors::{OwoColorize, Style};
use tickchain::{Band, DtHealth};

/// Returns the style for success messages (green bold).
pub fn success_style() -> Style {
    Style::new().green().bold()
}

/// Returns the style for error messages (red bold).
pub fn error_style() -> Style {
    Style::new().red().bold()
}

/// Returns the style for warning messages (yellow).
pub fn warning_style() -> Style {
    Style::new().yellow()
}

/// Returns the style for informational messages (cyan).
pub fn info_style() -> Style {
    Style::new().cyan()
}

/// Returns the style for muted/secondary text (dimmed).
pub fn muted_style() -> Style {
    Style::new().dimmed()
}

/// Returns the style for headers (bold).
pub fn header_style() -> Style {
    Style::new().bold()
}

pub fn band_style(band: Band) -> Style {
    match band {
        Band::APlus => Style::new().green().bold(),
        Band::A => Style::new().green(),
        Band::B => Style::new().cyan(),
        Band::C => Style::new().yellow(),
        Band::D => Style::new().red().bold(),
    }
}

pub fn health_style(health: DtHealth) -> Style {
    match health {
        DtHealth::Nominal => Style::new().green(),
        DtHealth::Drifting => Style::new().yellow(),
        DtHealth::Stalled => Style::new().red().bold(),
        DtHealth::Unknown => Style::new().dimmed(),
    }
}

fn paint(text: &impl std::fmt::Display, style: Style) -> String {
    if super::no_color() {
        text.to_string()
    } else {
        text.style(style).to_string()
    }
}

/// Trait extension to apply semantic styles.
pub trait SemanticStyle: Sized {
    /// Apply success styling (green bold).
    fn success(&self) -> String;
    /// Apply error styling (red bold).
    fn error(&self) -> String;
    /// Apply warning styling (yellow).
    fn warning(&self) -> String;
    /// Apply info styling (cyan).
    fn info(&self) -> String;
    /// Apply muted styling (dimmed).
    fn muted(&self) -> String;
    /// Apply header styling (bold).
    fn header(&self) -> String;
    /// Colour by stability band.
    fn for_band(&self, band: Band) -> String;
    /// Colour by dt health.
    fn for_health(&self, health: DtHealth) -> String;
}

impl<T: std::fmt::Display> SemanticStyle for T {
    fn success(&self) -> String {
        paint(self, success_style())
    }

    fn error(&self) -> String {
        paint(self, error_style())
    }

    fn warning(&self) -> String {
        paint(self, warning_style())
    }

    fn info(&self) -> String {
        paint(self, info_style())
    }

    fn muted(&self) -> String {
        paint(self, muted_style())
    }

    fn header(&self) -> String {
        paint(self, header_style())
    }

    fn for_band(&self, band: Band) -> String {
        paint(self, band_style(band))
    }

    fn for_health(&self, health: DtHealth) -> String {
        paint(self, health_style(health))
    }
}
