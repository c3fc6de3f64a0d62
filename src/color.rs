use std::collections::{BTreeMap, BTreeSet};

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize, saturation: f32, lightness: f32) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, saturation, lightness);
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
// Color mapping: categorical label → Color32
// ---------------------------------------------------------------------------

/// Maps the vocabulary of one categorical field to distinct colours. Built
/// from the whole store, so a label keeps its colour when filters change.
#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: BTreeMap<String, Color32>,
    default_color: Color32,
}

impl ColorMap {
    /// Build a colour map from a sorted vocabulary.
    pub fn new(vocabulary: &BTreeSet<String>) -> Self {
        Self::with_tone(vocabulary, 0.75, 0.55)
    }

    /// Softer colours, for large filled areas such as pie slices.
    pub fn pastel(vocabulary: &BTreeSet<String>) -> Self {
        Self::with_tone(vocabulary, 0.6, 0.72)
    }

    fn with_tone(vocabulary: &BTreeSet<String>, saturation: f32, lightness: f32) -> Self {
        let palette = generate_palette(vocabulary.len(), saturation, lightness);
        let mapping = vocabulary.iter().cloned().zip(palette).collect();

        ColorMap {
            mapping,
            default_color: Color32::GRAY,
        }
    }

    /// Look up the colour for a label.
    pub fn color_for(&self, label: &str) -> Color32 {
        self.mapping
            .get(label)
            .copied()
            .unwrap_or(self.default_color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_has_requested_size_and_distinct_colours() {
        let colours = generate_palette(4, 0.75, 0.55);
        assert_eq!(colours.len(), 4);
        let unique: BTreeSet<[u8; 4]> = colours.iter().map(|c| c.to_array()).collect();
        assert_eq!(unique.len(), 4);
        assert!(generate_palette(0, 0.75, 0.55).is_empty());
    }

    #[test]
    fn unknown_label_falls_back_to_grey() {
        let vocab: BTreeSet<String> = ["A1", "B1"].into_iter().map(String::from).collect();
        let map = ColorMap::new(&vocab);
        assert_ne!(map.color_for("A1"), map.color_for("B1"));
        assert_eq!(map.color_for("C"), Color32::GRAY);
    }
}
