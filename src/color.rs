use std::str::FromStr;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use crate::config::ColorConfig;

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
// Configured series colours
// ---------------------------------------------------------------------------

/// Parse `#RRGGBB` / `#RGB` (leading `#` optional).
pub fn parse_hex(s: &str) -> Option<Color32> {
    let rgb = Srgb::<u8>::from_str(s.trim()).ok()?;
    Some(Color32::from_rgb(rgb.red, rgb.green, rgb.blue))
}

/// Colours for metric A, metric B and the correlation overlay. An entry that
/// fails to parse is replaced by a generated hue.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesColors {
    pub metric_a: Color32,
    pub metric_b: Color32,
    pub correlation: Color32,
}

impl SeriesColors {
    pub fn from_config(config: &ColorConfig) -> Self {
        let fallback = generate_palette(3);
        let pick = |hex: &str, i: usize| {
            parse_hex(hex).unwrap_or_else(|| {
                log::warn!("Invalid colour '{hex}', using a generated one");
                fallback[i]
            })
        };
        SeriesColors {
            metric_a: pick(&config.metric_a, 0),
            metric_b: pick(&config.metric_b, 1),
            correlation: pick(&config.correlation, 2),
        }
    }
}

impl Default for SeriesColors {
    fn default() -> Self {
        Self::from_config(&ColorConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex() {
        assert_eq!(parse_hex("#17BECF"), Some(Color32::from_rgb(0x17, 0xBE, 0xCF)));
        assert_eq!(parse_hex("b22222"), Some(Color32::from_rgb(0xB2, 0x22, 0x22)));
        assert_eq!(parse_hex("not a colour"), None);
    }

    #[test]
    fn test_invalid_entry_falls_back() {
        let config = ColorConfig {
            metric_b: "oops".to_string(),
            ..ColorConfig::default()
        };
        let colors = SeriesColors::from_config(&config);
        assert_eq!(colors.metric_a, Color32::from_rgb(0x17, 0xBE, 0xCF));
        assert_eq!(colors.metric_b, generate_palette(3)[1]);
    }

    #[test]
    fn test_palette_size() {
        assert!(generate_palette(0).is_empty());
        assert_eq!(generate_palette(5).len(), 5);
    }
}
