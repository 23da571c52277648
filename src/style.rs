use std::str::FromStr;

use ratatui::style::{Color, Modifier, Style as RatStyle};
use serde::Deserialize;

use crate::view::Tone;

/// A terminal color read from a theme table. Accepts anything ratatui can
/// parse from a string (`"lightred"`, `"#268bd2"`), an `[r, g, b]` triple
/// or a 256-color index.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(try_from = "ColorSpec")]
pub struct ThemeColor(pub Color);

#[derive(Deserialize)]
#[serde(untagged)]
enum ColorSpec {
    Text(String),
    Rgb([u8; 3]),
    Indexed(u8),
}

impl TryFrom<ColorSpec> for ThemeColor {
    type Error = String;

    fn try_from(spec: ColorSpec) -> Result<Self, Self::Error> {
        match spec {
            ColorSpec::Text(text) => Color::from_str(&text)
                .map(ThemeColor)
                .map_err(|_| format!("unknown color: {}", text)),
            ColorSpec::Rgb([r, g, b]) => Ok(ThemeColor(Color::Rgb(r, g, b))),
            ColorSpec::Indexed(i) => Ok(ThemeColor(Color::Indexed(i))),
        }
    }
}

/// Colors and modifiers for one kind of screen element
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ElementStyle {
    pub fg: Option<ThemeColor>,
    pub bg: Option<ThemeColor>,
    pub bold: bool,
    pub dim: bool,
}

impl ElementStyle {
    pub fn fg(color: Color) -> Self {
        Self {
            fg: Some(ThemeColor(color)),
            ..Default::default()
        }
    }

    pub fn on(mut self, color: Color) -> Self {
        self.bg = Some(ThemeColor(color));
        self
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn to_ratatui(&self) -> RatStyle {
        let mut modifiers = Modifier::empty();
        if self.bold {
            modifiers |= Modifier::BOLD;
        }
        if self.dim {
            modifiers |= Modifier::DIM;
        }

        let mut style = RatStyle::default().add_modifier(modifiers);
        if let Some(ThemeColor(fg)) = self.fg {
            style = style.fg(fg);
        }
        if let Some(ThemeColor(bg)) = self.bg {
            style = style.bg(bg);
        }
        style
    }
}

/// Complete theme configuration. Fields missing from a theme file fall
/// back to the dark theme.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Theme {
    pub name: String,

    pub background: Option<ThemeColor>,

    // Table
    pub cell: ElementStyle,
    pub row_cursor: ElementStyle,
    pub header: ElementStyle,
    pub header_selected: ElementStyle,

    // Change cells
    pub positive: ElementStyle,
    pub negative: ElementStyle,
    pub neutral: ElementStyle,

    // Summary bar
    pub summary_label: ElementStyle,
    pub summary_value: ElementStyle,

    // Status panels
    pub panel_info: ElementStyle,
    pub panel_error: ElementStyle,

    pub status_bar: ElementStyle,
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl Theme {
    /// Dark theme (default)
    pub fn dark() -> Self {
        use Color::*;
        Self {
            name: "dark".to_string(),
            background: None,
            cell: ElementStyle::fg(White),
            row_cursor: ElementStyle::fg(Black).on(LightCyan),
            header: ElementStyle::fg(LightGreen).bold(),
            header_selected: ElementStyle::fg(Black).on(LightGreen).bold(),
            positive: ElementStyle::fg(LightRed),
            negative: ElementStyle::fg(LightBlue),
            neutral: ElementStyle::fg(Gray),
            summary_label: ElementStyle::fg(Gray),
            summary_value: ElementStyle::fg(LightYellow).bold(),
            panel_info: ElementStyle::fg(LightCyan),
            panel_error: ElementStyle::fg(LightRed).bold(),
            status_bar: ElementStyle::fg(White).on(DarkGray),
        }
    }

    pub fn light() -> Self {
        use Color::*;
        Self {
            name: "light".to_string(),
            background: None,
            cell: ElementStyle::fg(Black),
            row_cursor: ElementStyle::fg(White).on(Blue),
            header: ElementStyle::fg(Blue).bold(),
            header_selected: ElementStyle::fg(White).on(Blue).bold(),
            positive: ElementStyle::fg(Red),
            negative: ElementStyle::fg(Blue),
            neutral: ElementStyle::fg(DarkGray),
            summary_label: ElementStyle::fg(DarkGray),
            summary_value: ElementStyle::fg(Black).bold(),
            panel_info: ElementStyle::fg(Blue),
            panel_error: ElementStyle::fg(Red).bold(),
            status_bar: ElementStyle::fg(Black).on(Gray),
        }
    }

    pub fn solarized_dark() -> Self {
        let base03 = Color::Rgb(0, 43, 54);
        let base02 = Color::Rgb(7, 54, 66);
        let base01 = Color::Rgb(88, 110, 117);
        let base0 = Color::Rgb(131, 148, 150);
        let base1 = Color::Rgb(147, 161, 161);
        let yellow = Color::Rgb(181, 137, 0);
        let red = Color::Rgb(220, 50, 47);
        let blue = Color::Rgb(38, 139, 210);
        let cyan = Color::Rgb(42, 161, 152);
        let green = Color::Rgb(133, 153, 0);

        Self {
            name: "solarized-dark".to_string(),
            background: Some(ThemeColor(base03)),
            cell: ElementStyle::fg(base0),
            row_cursor: ElementStyle::fg(base03).on(blue),
            header: ElementStyle::fg(green).bold(),
            header_selected: ElementStyle::fg(base03).on(green).bold(),
            positive: ElementStyle::fg(red),
            negative: ElementStyle::fg(blue),
            neutral: ElementStyle::fg(base01),
            summary_label: ElementStyle::fg(base01),
            summary_value: ElementStyle::fg(yellow).bold(),
            panel_info: ElementStyle::fg(cyan),
            panel_error: ElementStyle::fg(red).bold(),
            status_bar: ElementStyle::fg(base1).on(base02),
        }
    }

    /// Get theme by name
    pub fn by_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "dark" => Some(Self::dark()),
            "light" => Some(Self::light()),
            "solarized" | "solarized-dark" => Some(Self::solarized_dark()),
            _ => None,
        }
    }

    pub fn builtin_names() -> &'static [&'static str] {
        &["dark", "light", "solarized-dark"]
    }
}

/// Runtime style manager
pub struct Style {
    pub theme: Theme,
}

impl Style {
    pub fn with_theme(theme: Theme) -> Self {
        Self { theme }
    }

    pub fn cell(&self) -> RatStyle {
        self.theme.cell.to_ratatui()
    }

    pub fn row_cursor(&self) -> RatStyle {
        self.theme.row_cursor.to_ratatui()
    }

    pub fn header(&self, selected: bool) -> RatStyle {
        if selected {
            self.theme.header_selected.to_ratatui()
        } else {
            self.theme.header.to_ratatui()
        }
    }

    /// Style for a table cell of the given tone
    pub fn tone(&self, tone: Tone) -> RatStyle {
        match tone {
            Tone::Plain => self.cell(),
            Tone::Positive => self.theme.positive.to_ratatui(),
            Tone::Negative => self.theme.negative.to_ratatui(),
            Tone::Neutral => self.theme.neutral.to_ratatui(),
        }
    }

    pub fn summary_label(&self) -> RatStyle {
        self.theme.summary_label.to_ratatui()
    }

    pub fn summary_value(&self) -> RatStyle {
        self.theme.summary_value.to_ratatui()
    }

    pub fn panel_info(&self) -> RatStyle {
        self.theme.panel_info.to_ratatui()
    }

    pub fn panel_error(&self) -> RatStyle {
        self.theme.panel_error.to_ratatui()
    }

    pub fn status_bar(&self) -> RatStyle {
        self.theme.status_bar.to_ratatui()
    }

    pub fn background(&self) -> Option<Color> {
        self.theme.background.map(|c| c.0)
    }
}
