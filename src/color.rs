use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Color mapping: historical series → Color32
// ---------------------------------------------------------------------------

/// One colour per historical series; its chosen reference curve and the
/// observations assigned to that curve share it.
#[derive(Debug, Clone, Default)]
pub struct ColorMap {
    by_series: BTreeMap<String, Color32>,
    by_reference: BTreeMap<String, Color32>,
}

impl ColorMap {
    /// `pairs` yields `(historical_id, reference_id)` in display order.
    pub fn new<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let pairs: Vec<(&str, &str)> = pairs.into_iter().collect();
        let palette = generate_palette(pairs.len());
        let mut map = ColorMap::default();
        for ((series, reference), color) in pairs.into_iter().zip(palette) {
            map.by_series.insert(series.to_string(), color);
            // first series routed to a reference decides its colour
            map.by_reference
                .entry(reference.to_string())
                .or_insert(color);
        }
        map
    }

    pub fn series_color(&self, historical_id: &str) -> Color32 {
        self.by_series
            .get(historical_id)
            .copied()
            .unwrap_or(Color32::LIGHT_BLUE)
    }

    /// Colour for an observation group; unassigned points are grey.
    pub fn reference_color(&self, reference_id: Option<&str>) -> Color32 {
        reference_id
            .and_then(|r| self.by_reference.get(r))
            .copied()
            .unwrap_or(Color32::GRAY)
    }
}
