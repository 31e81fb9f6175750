use ratatui::style::Color;

/// Colour maps for the heatmap panels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Colormap {
    /// Broad black-purple-blue-green-yellow-red-grey sweep (nipy_spectral).
    Spectral,
    /// Blue (low) through cyan, yellow to red (high).
    Jet,
}

// nipy_spectral control points at t = 0.00, 0.05, ..., 1.00
const SPECTRAL: [(f64, f64, f64); 21] = [
    (0.0, 0.0, 0.0),
    (0.4667, 0.0, 0.5333),
    (0.5333, 0.0, 0.6),
    (0.0, 0.0, 0.6667),
    (0.0, 0.0, 0.8667),
    (0.0, 0.4667, 0.8667),
    (0.0, 0.6, 0.8667),
    (0.0, 0.6667, 0.6667),
    (0.0, 0.6667, 0.5333),
    (0.0, 0.6, 0.0),
    (0.0, 0.7333, 0.0),
    (0.0, 0.8667, 0.0),
    (0.0, 1.0, 0.0),
    (0.7333, 1.0, 0.0),
    (0.9333, 0.9333, 0.0),
    (1.0, 0.8, 0.0),
    (1.0, 0.6, 0.0),
    (1.0, 0.0, 0.0),
    (0.8667, 0.0, 0.0),
    (0.8, 0.0, 0.0),
    (0.8, 0.8, 0.8),
];

impl Colormap {
    /// RGB for a normalized position `t` in [0, 1]. Out-of-range input is clamped.
    pub fn rgb(self, t: f64) -> (u8, u8, u8) {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let (r, g, b) = match self {
            Self::Spectral => spectral(t),
            Self::Jet => jet(t),
        };
        (to_byte(r), to_byte(g), to_byte(b))
    }

    pub fn color(self, t: f64) -> Color {
        let (r, g, b) = self.rgb(t);
        Color::Rgb(r, g, b)
    }
}

fn spectral(t: f64) -> (f64, f64, f64) {
    let pos = t * (SPECTRAL.len() - 1) as f64;
    let i = (pos.floor() as usize).min(SPECTRAL.len() - 2);
    let f = pos - i as f64;
    let (a, b) = (SPECTRAL[i], SPECTRAL[i + 1]);
    (lerp(a.0, b.0, f), lerp(a.1, b.1, f), lerp(a.2, b.2, f))
}

fn jet(t: f64) -> (f64, f64, f64) {
    let ramp = |center: f64| (1.5 - (4.0 * t - center).abs()).clamp(0.0, 1.0);
    (ramp(3.0), ramp(2.0), ramp(1.0))
}

fn lerp(a: f64, b: f64, f: f64) -> f64 {
    a + (b - a) * f
}

fn to_byte(v: f64) -> u8 {
    (v * 255.0).round().clamp(0.0, 255.0) as u8
}

/// Linear normalization of one grid's values onto [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorScale {
    pub min: f64,
    pub max: f64,
}

impl ColorScale {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Position of `v` on the scale. A flat scale maps everything to 0.
    pub fn fraction(&self, v: f64) -> f64 {
        let span = self.max - self.min;
        if span > 0.0 {
            ((v - self.min) / span).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}
