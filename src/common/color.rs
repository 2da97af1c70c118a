//! Color conversions between config hex strings and egui colors
//!
//! Config files store colors as `#RRGGBB` (or `#AARRGGBB`) strings. The overlay
//! applies window opacity on top of the stored color at paint time.

/// Hex color in ARGB32 format (#AARRGGBB)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HexColor(u32);

impl HexColor {
    /// Parse hex color string supporting multiple formats:
    /// - 6 digits: RRGGBB (full opacity assumed, becomes FFRRGGBB)
    /// - 8 digits: AARRGGBB (explicit alpha)
    /// - Optional '#' prefix supported but not required
    pub fn parse(hex: &str) -> Option<Self> {
        let hex = hex.trim();
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let value = u32::from_str_radix(hex, 16).ok()?;

        match hex.len() {
            6 => Some(Self(0xFF_00_00_00 | value)),
            8 => Some(Self(value)),
            _ => None,
        }
    }

    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self(0xFF_00_00_00 | (r as u32) << 16 | (g as u32) << 8 | b as u32)
    }

    fn channels(self) -> (u8, u8, u8, u8) {
        (
            (self.0 >> 24) as u8,
            (self.0 >> 16) as u8,
            (self.0 >> 8) as u8,
            self.0 as u8,
        )
    }

    /// Convert to an egui color, keeping the stored alpha
    pub fn to_color32(self) -> egui::Color32 {
        let (a, r, g, b) = self.channels();
        egui::Color32::from_rgba_unmultiplied(r, g, b, a)
    }

    /// Format as `#RRGGBB`, the form written back to the config file
    pub fn to_rgb_string(self) -> String {
        let (_, r, g, b) = self.channels();
        format!("#{:02X}{:02X}{:02X}", r, g, b)
    }
}

/// Window opacity as a fraction (0.0-1.0)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Opacity(f32);

impl Opacity {
    /// Create from fraction (clamped to 0.0-1.0, NaN treated as opaque)
    pub fn from_fraction(fraction: f32) -> Self {
        if fraction.is_nan() {
            return Self(1.0);
        }
        Self(fraction.clamp(0.0, 1.0))
    }

    pub fn percent(self) -> u8 {
        (self.0 * 100.0).round() as u8
    }

    /// Alpha channel value (0-255)
    pub fn alpha(self) -> u8 {
        (self.0 * 255.0).round() as u8
    }
}

/// Convert HEX string to egui::Color32, falling back when the string is invalid
pub fn hex_to_color32_or(hex: &str, fallback: egui::Color32) -> egui::Color32 {
    HexColor::parse(hex)
        .map(HexColor::to_color32)
        .unwrap_or(fallback)
}

/// Convert egui::Color32 to HEX string (#RRGGBB), dropping alpha
pub fn color32_to_hex(color: egui::Color32) -> String {
    let [r, g, b, _] = color.to_srgba_unmultiplied();
    HexColor::from_rgb(r, g, b).to_rgb_string()
}

/// Apply window opacity to an opaque color
pub fn with_opacity(color: egui::Color32, opacity: Opacity) -> egui::Color32 {
    let [r, g, b, _] = color.to_srgba_unmultiplied();
    egui::Color32::from_rgba_unmultiplied(r, g, b, opacity.alpha())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_color_parsing() {
        // 8-digit format (AARRGGBB)
        assert_eq!(HexColor::parse("#7FFF0000"), Some(HexColor(0x7FFF0000)));
        assert_eq!(HexColor::parse("FFFFFFFF"), Some(HexColor(0xFFFFFFFF)));

        // 6-digit format (RRGGBB) - should prepend FF for full opacity
        assert_eq!(HexColor::parse("#2E2E2E"), Some(HexColor(0xFF2E2E2E)));
        assert_eq!(HexColor::parse("28a745"), Some(HexColor(0xFF28A745)));

        // Invalid
        assert_eq!(HexColor::parse("invalid"), None);
        assert_eq!(HexColor::parse(""), None);
        assert_eq!(HexColor::parse("#FFF"), None);
        assert_eq!(HexColor::parse("SystemButtonFace"), None);
        assert_eq!(HexColor::parse("#+FFFFF"), None);
        assert_eq!(HexColor::parse("+FFFFFFF"), None);
    }

    #[test]
    fn test_rgb_string_formatting() {
        let color = HexColor::parse("#dc3545").unwrap();
        assert_eq!(color.to_rgb_string(), "#DC3545");
        assert_eq!(HexColor::from_rgb(0, 255, 0).to_rgb_string(), "#00FF00");
    }

    #[test]
    fn test_color32_conversion() {
        let color = HexColor::parse("#FFFFFF").unwrap().to_color32();
        assert_eq!(color, egui::Color32::WHITE);

        assert_eq!(color32_to_hex(egui::Color32::from_rgb(0x28, 0xA7, 0x45)), "#28A745");
    }

    #[test]
    fn test_fallback_on_invalid_hex() {
        let color = hex_to_color32_or("not a color", egui::Color32::BLACK);
        assert_eq!(color, egui::Color32::BLACK);
    }

    #[test]
    fn test_opacity_clamping() {
        assert_eq!(Opacity::from_fraction(0.95).percent(), 95);
        assert_eq!(Opacity::from_fraction(1.5).percent(), 100);
        assert_eq!(Opacity::from_fraction(-0.2).percent(), 0);
        assert_eq!(Opacity::from_fraction(f32::NAN).percent(), 100);
    }

    #[test]
    fn test_with_opacity() {
        let color = with_opacity(egui::Color32::BLACK, Opacity::from_fraction(0.5));
        let [_, _, _, a] = color.to_srgba_unmultiplied();
        assert!((127..=128).contains(&a));
    }
}
