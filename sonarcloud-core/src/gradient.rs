//! Default heat map color gradient

use crate::point::Color;
use crate::traits::ColorGradient;

/// A color stop on a gradient
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
    pub color: Color,
    /// Position of the stop in `[0, 1]`
    pub value: f32,
}

/// Piecewise linear gradient through a sorted list of stops.
///
/// The default is the classic five-stop heat map:
/// blue → cyan → green → yellow → red.
#[derive(Debug, Clone, PartialEq)]
pub struct HeatMapGradient {
    stops: Vec<GradientStop>,
}

impl HeatMapGradient {
    /// Build a gradient from stops; stops are sorted by value.
    pub fn from_stops(mut stops: Vec<GradientStop>) -> Self {
        stops.sort_by(|a, b| a.value.total_cmp(&b.value));
        Self { stops }
    }

    pub fn stops(&self) -> &[GradientStop] {
        &self.stops
    }
}

impl Default for HeatMapGradient {
    fn default() -> Self {
        Self::from_stops(vec![
            GradientStop { color: [0.0, 0.0, 1.0], value: 0.0 },
            GradientStop { color: [0.0, 1.0, 1.0], value: 0.25 },
            GradientStop { color: [0.0, 1.0, 0.0], value: 0.5 },
            GradientStop { color: [1.0, 1.0, 0.0], value: 0.75 },
            GradientStop { color: [1.0, 0.0, 0.0], value: 1.0 },
        ])
    }
}

impl ColorGradient for HeatMapGradient {
    fn color_at(&self, value: f32) -> Color {
        let Some(first) = self.stops.first() else {
            return [0.0, 0.0, 0.0];
        };
        // NaN falls to the bottom of the scale
        let value = if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) };

        if value <= first.value {
            return first.color;
        }

        for pair in self.stops.windows(2) {
            let (prev, curr) = (pair[0], pair[1]);
            if value < curr.value {
                let span = curr.value - prev.value;
                let t = if span > 0.0 { (value - prev.value) / span } else { 0.0 };
                return [
                    prev.color[0] + (curr.color[0] - prev.color[0]) * t,
                    prev.color[1] + (curr.color[1] - prev.color[1]) * t,
                    prev.color[2] + (curr.color[2] - prev.color[2]) * t,
                ];
            }
        }

        self.stops[self.stops.len() - 1].color
    }
}
