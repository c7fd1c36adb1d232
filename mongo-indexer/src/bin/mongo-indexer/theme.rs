use colored::Color;
use once_cell::sync::Lazy;

/// Colors used by help rendering and tables.
pub struct Palette {
    pub primary: Color,
    pub secondary: Color,
    pub highlight: Color,
    pub muted: Color,
    pub key: Color,
    pub value: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
}

pub static THEME: Lazy<Palette> = Lazy::new(|| Palette {
    primary: Color::BrightBlue,
    secondary: Color::Magenta,
    highlight: Color::Cyan,
    muted: Color::BrightBlack,
    key: Color::BrightCyan,
    value: Color::White,
    success: Color::Green,
    warning: Color::Yellow,
    error: Color::Red,
});

pub const ARROW: &str = "→";

/// Kind of status line printed by the output manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Success,
    Error,
    Warning,
    Info,
    Detail,
    Progress,
}

impl Tone {
    pub fn icon(self) -> &'static str {
        match self {
            Self::Success => "✓",
            Self::Error => "✗",
            Self::Warning => "⚠",
            Self::Info => "ℹ",
            Self::Detail => ARROW,
            Self::Progress => "⟳",
        }
    }

    pub fn color(self) -> Color {
        match self {
            Self::Success => THEME.success,
            Self::Error => THEME.error,
            Self::Warning => THEME.warning,
            Self::Info => Color::Blue,
            Self::Detail => THEME.muted,
            Self::Progress => THEME.highlight,
        }
    }
}
