//! Named color interpolation schemes
//!
//! A closed set of schemes, each mapping a normalized position `t` in
//! [0.0, 1.0] to a color. Positions outside that interval clamp to the
//! nearest end.

use serde::{Deserialize, Serialize};
use std::fmt;

/// 8-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    fn lerp(a: Rgb, b: Rgb, t: f64) -> Rgb {
        let mix = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * t).round() as u8;
        Rgb::new(mix(a.r, b.r), mix(a.g, b.g), mix(a.b, b.b))
    }
}

impl fmt::Display for Rgb {
    /// CSS hex form: `#rrggbb`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

const VIRIDIS: [Rgb; 10] = [
    Rgb::new(0x44, 0x01, 0x54),
    Rgb::new(0x48, 0x28, 0x78),
    Rgb::new(0x3e, 0x49, 0x89),
    Rgb::new(0x31, 0x68, 0x8e),
    Rgb::new(0x26, 0x82, 0x8e),
    Rgb::new(0x1f, 0x9e, 0x89),
    Rgb::new(0x35, 0xb7, 0x79),
    Rgb::new(0x6e, 0xce, 0x58),
    Rgb::new(0xb5, 0xde, 0x2b),
    Rgb::new(0xfd, 0xe7, 0x25),
];

// Red at 0.0, blue at 1.0
const RD_BU: [Rgb; 11] = [
    Rgb::new(0x67, 0x00, 0x1f),
    Rgb::new(0xb2, 0x18, 0x2b),
    Rgb::new(0xd6, 0x60, 0x4d),
    Rgb::new(0xf4, 0xa5, 0x82),
    Rgb::new(0xfd, 0xdb, 0xc7),
    Rgb::new(0xf7, 0xf7, 0xf7),
    Rgb::new(0xd1, 0xe5, 0xf0),
    Rgb::new(0x92, 0xc5, 0xde),
    Rgb::new(0x43, 0x93, 0xc3),
    Rgb::new(0x21, 0x66, 0xac),
    Rgb::new(0x05, 0x30, 0x61),
];

const RD_YL_BU: [Rgb; 11] = [
    Rgb::new(0xa5, 0x00, 0x26),
    Rgb::new(0xd7, 0x30, 0x27),
    Rgb::new(0xf4, 0x6d, 0x43),
    Rgb::new(0xfd, 0xae, 0x61),
    Rgb::new(0xfe, 0xe0, 0x90),
    Rgb::new(0xff, 0xff, 0xbf),
    Rgb::new(0xe0, 0xf3, 0xf8),
    Rgb::new(0xab, 0xd9, 0xe9),
    Rgb::new(0x74, 0xad, 0xd1),
    Rgb::new(0x45, 0x75, 0xb4),
    Rgb::new(0x31, 0x36, 0x95),
];

const BLUES: [Rgb; 9] = [
    Rgb::new(0xf7, 0xfb, 0xff),
    Rgb::new(0xde, 0xeb, 0xf7),
    Rgb::new(0xc6, 0xdb, 0xef),
    Rgb::new(0x9e, 0xca, 0xe1),
    Rgb::new(0x6b, 0xae, 0xd6),
    Rgb::new(0x42, 0x92, 0xc6),
    Rgb::new(0x21, 0x71, 0xb5),
    Rgb::new(0x08, 0x51, 0x9c),
    Rgb::new(0x08, 0x30, 0x6b),
];

/// Interpolation schemes known to the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColorScheme {
    /// Rainbow-like perceptual scheme, the default for sequential data
    Turbo,
    Viridis,
    /// Red (low) through white to blue (high)
    RdBu,
    /// Red (low) through yellow to blue (high)
    RdYlBu,
    Blues,
}

impl ColorScheme {
    /// Look up a scheme by name
    ///
    /// Case-insensitive; an `interpolate` prefix ("interpolateTurbo") is
    /// accepted.
    pub fn from_name(name: &str) -> Option<Self> {
        let lower = name.trim().to_lowercase();
        let bare = lower.strip_prefix("interpolate").unwrap_or(&lower);
        match bare {
            "turbo" => Some(ColorScheme::Turbo),
            "viridis" => Some(ColorScheme::Viridis),
            "rdbu" => Some(ColorScheme::RdBu),
            "rdylbu" => Some(ColorScheme::RdYlBu),
            "blues" => Some(ColorScheme::Blues),
            _ => None,
        }
    }

    /// Look up a scheme by name, falling back to the default for unknown names
    pub fn from_name_or_default(name: &str) -> Self {
        Self::from_name(name).unwrap_or_default()
    }

    /// Canonical name as used in series documents
    pub fn name(&self) -> &'static str {
        match self {
            ColorScheme::Turbo => "turbo",
            ColorScheme::Viridis => "viridis",
            ColorScheme::RdBu => "RdBu",
            ColorScheme::RdYlBu => "RdYlBu",
            ColorScheme::Blues => "Blues",
        }
    }

    /// Color at normalized position `t` (clamped to [0.0, 1.0])
    pub fn interpolate(&self, t: f64) -> Rgb {
        let t = if t.is_nan() { 0.5 } else { t.clamp(0.0, 1.0) };

        match self {
            ColorScheme::Turbo => turbo(t),
            ColorScheme::Viridis => ramp(&VIRIDIS, t),
            ColorScheme::RdBu => ramp(&RD_BU, t),
            ColorScheme::RdYlBu => ramp(&RD_YL_BU, t),
            ColorScheme::Blues => ramp(&BLUES, t),
        }
    }

    pub fn all_variants() -> &'static [ColorScheme] {
        &[
            ColorScheme::Turbo,
            ColorScheme::Viridis,
            ColorScheme::RdBu,
            ColorScheme::RdYlBu,
            ColorScheme::Blues,
        ]
    }
}

impl Default for ColorScheme {
    fn default() -> Self {
        ColorScheme::Turbo
    }
}

impl fmt::Display for ColorScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Polynomial approximation of the Turbo colormap
fn turbo(t: f64) -> Rgb {
    let channel = |v: f64| v.round().clamp(0.0, 255.0) as u8;
    let r = 34.61 + t * (1172.33 - t * (10793.56 - t * (33300.12 - t * (38394.49 - t * 14825.05))));
    let g = 23.31 + t * (557.33 + t * (1225.33 - t * (3574.96 - t * (1073.77 + t * 707.56))));
    let b = 27.2 + t * (3211.1 - t * (15327.97 - t * (27814.0 - t * (22569.18 - t * 6838.66))));
    Rgb::new(channel(r), channel(g), channel(b))
}

/// Piecewise-linear interpolation across evenly spaced stops
fn ramp(stops: &[Rgb], t: f64) -> Rgb {
    let segments = (stops.len() - 1) as f64;
    let scaled = t * segments;
    let i = (scaled.floor() as usize).min(stops.len() - 2);
    Rgb::lerp(stops[i], stops[i + 1], scaled - i as f64)
}
