//! Output mode control.
//!
//! [`OutputMode`] decides whether command output is a styled terminal
//! listing or a structured document.

use clap::ValueEnum;
use console::{Color, Style, Term};

/// Controls how command output is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputMode {
    /// Aligned listing, styled when stdout supports color
    #[default]
    Term,
    /// Aligned listing without ANSI codes
    Text,
    /// JSON document
    Json,
    /// YAML document
    Yaml,
    /// CSS custom properties
    Css,
}

impl OutputMode {
    /// Resolves the mode to a concrete decision about whether to use color.
    pub fn should_use_color(&self) -> bool {
        match self {
            OutputMode::Term => Term::stdout().features().colors_supported(),
            OutputMode::Text | OutputMode::Json | OutputMode::Yaml | OutputMode::Css => false,
        }
    }
}

/// Styles used by the listings.
#[derive(Debug, Clone)]
pub struct Palette {
    pub name: Style,
    pub value: Style,
    pub muted: Style,
    pub header: Style,
    pub winner: Style,
    color: bool,
}

impl Palette {
    pub fn new(color: bool) -> Self {
        Self {
            name: Style::new().cyan().force_styling(color),
            value: Style::new().force_styling(color),
            muted: Style::new().dim().force_styling(color),
            header: Style::new().bold().force_styling(color),
            winner: Style::new().green().bold().force_styling(color),
            color,
        }
    }

    /// A two-cell color preview for `rgb(...)` and `#rrggbb` values, or
    /// nothing when color is off or the value is not a plain color.
    pub fn preview(&self, value: &str) -> String {
        if !self.color {
            return String::new();
        }
        match parse_rgb(value) {
            Some(rgb) => {
                let swatch = Style::new()
                    .bg(Color::Color256(rgb_to_ansi256(rgb)))
                    .force_styling(true);
                format!("{} ", swatch.apply_to("  "))
            }
            None => String::new(),
        }
    }
}

/// Parses `rgb(r,g,b)` or `#rrggbb`.
pub fn parse_rgb(value: &str) -> Option<(u8, u8, u8)> {
    let value = value.trim();
    if let Some(hex) = value.strip_prefix('#') {
        if hex.len() != 6 {
            return None;
        }
        let channel = |at: usize| u8::from_str_radix(hex.get(at..at + 2)?, 16).ok();
        return Some((channel(0)?, channel(2)?, channel(4)?));
    }

    let inner = value.strip_prefix("rgb(")?.strip_suffix(')')?;
    let mut channels = inner.split(',').map(|c| c.trim().parse::<u8>().ok());
    let rgb = (channels.next()??, channels.next()??, channels.next()??);
    match channels.next() {
        None => Some(rgb),
        Some(_) => None,
    }
}

/// Maps an RGB triplet to the nearest xterm 256-color index.
///
/// Channels snap to the nearest level of the 6x6x6 cube (0, 95, 135, 175,
/// 215, 255). Near-neutral colors use the 24-step gray ramp when a ramp
/// entry is closer than the cube's gray.
pub fn rgb_to_ansi256((r, g, b): (u8, u8, u8)) -> u8 {
    const LEVELS: [u8; 6] = [0, 95, 135, 175, 215, 255];

    let level = |channel: u8| -> usize {
        LEVELS
            .iter()
            .enumerate()
            .min_by_key(|(_, level)| (i32::from(**level) - i32::from(channel)).abs())
            .map_or(0, |(at, _)| at)
    };
    let distance = |(r2, g2, b2): (u8, u8, u8)| -> i32 {
        let d = |a: u8, b: u8| (i32::from(a) - i32::from(b)).pow(2);
        d(r, r2) + d(g, g2) + d(b, b2)
    };

    let (ri, gi, bi) = (level(r), level(g), level(b));
    let cube = 16 + 36 * ri + 6 * gi + bi;
    let cube_distance = distance((LEVELS[ri], LEVELS[gi], LEVELS[bi]));

    let mean = (u16::from(r) + u16::from(g) + u16::from(b)) / 3;
    let step = (mean.saturating_sub(3) / 10).min(23) as u8;
    let gray = 8 + 10 * step;
    if distance((gray, gray, gray)) < cube_distance {
        232 + step
    } else {
        cube as u8
    }
}
