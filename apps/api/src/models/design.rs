//! Design settings shared by every template.
//!
//! Stored documents created before design settings existed carry no `design`
//! key at all; `#[serde(default)]` on the owning struct makes those load with
//! `Design::default()` instead of failing.

use serde::{Deserialize, Serialize};

/// Hex accent color used when a document has none, or an unparsable one.
pub const DEFAULT_COLOR: &str = "#2563eb";

/// The three font families offered in the design panel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontFamily {
    /// Humanist sans-serif.
    #[default]
    Inter,
    /// Old-style serif.
    Garamond,
    /// Geometric humanist sans-serif, slightly wider than Inter.
    Lato,
}

impl FontFamily {
    pub const ALL: [FontFamily; 3] = [FontFamily::Inter, FontFamily::Garamond, FontFamily::Lato];

    /// CSS `font-family` stack used in rendered HTML.
    pub fn css_stack(&self) -> &'static str {
        match self {
            FontFamily::Inter => "'Inter', 'Helvetica Neue', Arial, sans-serif",
            FontFamily::Garamond => "'EB Garamond', Garamond, 'Times New Roman', serif",
            FontFamily::Lato => "'Lato', 'Segoe UI', Arial, sans-serif",
        }
    }

    /// File name looked up in `FONT_DIR` when rasterizing text.
    pub fn font_file(&self) -> &'static str {
        match self {
            FontFamily::Inter => "Inter-Regular.ttf",
            FontFamily::Garamond => "EBGaramond-Regular.ttf",
            FontFamily::Lato => "Lato-Regular.ttf",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontSize {
    Small,
    #[default]
    Medium,
    Large,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineSpacing {
    Compact,
    #[default]
    Normal,
    Relaxed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Corners {
    Square,
    #[default]
    Rounded,
    Pill,
}

/// User-chosen visual parameters. Every field falls back individually.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Design {
    pub color: String,
    pub font_family: FontFamily,
    pub font_size: FontSize,
    pub line_spacing: LineSpacing,
    pub corners: Corners,
}

impl Default for Design {
    fn default() -> Self {
        Self {
            color: DEFAULT_COLOR.to_string(),
            font_family: FontFamily::default(),
            font_size: FontSize::default(),
            line_spacing: LineSpacing::default(),
            corners: Corners::default(),
        }
    }
}

/// An sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const WHITE: Rgb = Rgb(255, 255, 255);
    pub const INK: Rgb = Rgb(31, 41, 55);
    pub const MUTED: Rgb = Rgb(107, 114, 128);
    pub const HAIRLINE: Rgb = Rgb(229, 231, 235);

    /// Parses `#rgb` or `#rrggbb` (leading `#` optional).
    pub fn parse_hex(value: &str) -> Option<Rgb> {
        let hex = value.trim().trim_start_matches('#');
        let expanded: String = match hex.len() {
            3 => hex.chars().flat_map(|c| [c, c]).collect(),
            6 => hex.to_string(),
            _ => return None,
        };
        let channel = |i: usize| u8::from_str_radix(&expanded[i..i + 2], 16).ok();
        Some(Rgb(channel(0)?, channel(2)?, channel(4)?))
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }

    /// Mixes this color toward white; `amount` 0.0 keeps it, 1.0 is white.
    pub fn tint(&self, amount: f32) -> Rgb {
        let amount = amount.clamp(0.0, 1.0);
        let mix = |c: u8| (c as f32 + (255.0 - c as f32) * amount).round() as u8;
        Rgb(mix(self.0), mix(self.1), mix(self.2))
    }
}

/// Concrete rendering parameters derived from a `Design`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedDesign {
    pub accent: Rgb,
    pub font: FontFamily,
    /// Body text size in CSS px.
    pub base_size_px: f32,
    /// Line-height factor applied to every text run.
    pub line_height: f32,
    pub radius_px: f32,
}

impl ResolvedDesign {
    pub fn heading_size_px(&self) -> f32 {
        self.base_size_px * 1.15
    }

    pub fn name_size_px(&self) -> f32 {
        self.base_size_px * 2.1
    }

    pub fn small_size_px(&self) -> f32 {
        self.base_size_px * 0.85
    }
}

impl Design {
    /// Resolves the settings to concrete values. Never fails: an unparsable
    /// color resolves to the default accent.
    pub fn resolve(&self) -> ResolvedDesign {
        let accent = Rgb::parse_hex(&self.color)
            .or_else(|| Rgb::parse_hex(DEFAULT_COLOR))
            .unwrap_or(Rgb::INK);
        ResolvedDesign {
            accent,
            font: self.font_family,
            base_size_px: match self.font_size {
                FontSize::Small => 12.0,
                FontSize::Medium => 13.0,
                FontSize::Large => 14.5,
            },
            line_height: match self.line_spacing {
                LineSpacing::Compact => 1.3,
                LineSpacing::Normal => 1.5,
                LineSpacing::Relaxed => 1.7,
            },
            radius_px: match self.corners {
                Corners::Square => 0.0,
                Corners::Rounded => 6.0,
                Corners::Pill => 14.0,
            },
        }
    }
}
