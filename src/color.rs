use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use crate::data::model::Category;

// ---------------------------------------------------------------------------
// Theme colours
// ---------------------------------------------------------------------------

/// Purple accent used by most single-series charts (#8e44ad).
pub const ACCENT: Color32 = Color32::from_rgb(0x8e, 0x44, 0xad);
/// Neutral grey for the trend and country-sales charts (#7f8c8d).
pub const SLATE: Color32 = Color32::from_rgb(0x7f, 0x8c, 0x8d);
/// Sidebar title colour (#6a0dad).
pub const TITLE: Color32 = Color32::from_rgb(0x6a, 0x0d, 0xad);

/// Discrete sequence for the membership bars, cycled by position.
pub const MEMBERSHIP_SEQUENCE: [Color32; 3] = [
    Color32::from_rgb(0x9b, 0x59, 0xb6),
    Color32::from_rgb(0xbd, 0xc3, 0xc7),
    Color32::from_rgb(0x8e, 0x44, 0xad),
];

pub fn membership_color(position: usize) -> Color32 {
    MEMBERSHIP_SEQUENCE[position % MEMBERSHIP_SEQUENCE.len()]
}

// ---------------------------------------------------------------------------
// Sequential purple ramp
// ---------------------------------------------------------------------------

const PURPLE_HUE: f32 = 280.0;

/// Generates `n` purples from dark to light at a fixed hue.
pub fn purple_ramp(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let t = if n == 1 { 0.5 } else { i as f32 / (n - 1) as f32 };
            let hsl = Hsl::new(PURPLE_HUE, 0.55, 0.25 + 0.55 * t);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0).round() as u8,
                (rgb.green * 255.0).round() as u8,
                (rgb.blue * 255.0).round() as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Color mapping: category → Color32
// ---------------------------------------------------------------------------

/// Maps the categories of one chart to distinct shades of the ramp.
#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: BTreeMap<Category, Color32>,
    default_color: Color32,
}

impl ColorMap {
    /// Build a colour map for the given categories, in the given order.
    pub fn new<'a>(categories: impl IntoIterator<Item = &'a Category>) -> Self {
        let categories: Vec<&Category> = categories.into_iter().collect();
        let ramp = purple_ramp(categories.len());
        let mapping = categories
            .into_iter()
            .zip(ramp)
            .map(|(c, col)| (c.clone(), col))
            .collect();

        ColorMap {
            mapping,
            default_color: Color32::GRAY,
        }
    }

    pub fn color_for(&self, value: &Category) -> Color32 {
        self.mapping
            .get(value)
            .copied()
            .unwrap_or(self.default_color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ramp_goes_from_dark_to_light() {
        let ramp = purple_ramp(5);
        assert_eq!(ramp.len(), 5);
        let brightness = |c: &Color32| c.r() as u32 + c.g() as u32 + c.b() as u32;
        assert!(ramp.windows(2).all(|w| brightness(&w[0]) < brightness(&w[1])));
    }

    #[test]
    fn ramp_handles_degenerate_sizes() {
        assert!(purple_ramp(0).is_empty());
        assert_eq!(purple_ramp(1).len(), 1);
    }

    #[test]
    fn color_map_is_distinct_with_grey_fallback() {
        let cats = [Category::from("Cash"), Category::from("Credit Card"), Category::Missing];
        let cm = ColorMap::new(&cats);
        assert_ne!(cm.color_for(&cats[0]), cm.color_for(&cats[1]));
        assert_ne!(cm.color_for(&cats[1]), cm.color_for(&cats[2]));
        assert_eq!(cm.color_for(&Category::from("Bitcoin")), Color32::GRAY);
    }

    #[test]
    fn membership_sequence_cycles() {
        assert_eq!(membership_color(0), membership_color(3));
        assert_eq!(membership_color(2), ACCENT);
    }
}
