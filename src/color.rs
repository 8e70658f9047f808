use eframe::egui::Color32;
use palette::{LinSrgb, Mix, Srgb};

// ---------------------------------------------------------------------------
// Fixed colours
// ---------------------------------------------------------------------------

pub const TEMPERATURE: Color32 = Color32::from_rgb(0xff, 0x00, 0x00);
pub const HUMIDITY: Color32 = Color32::from_rgb(0x00, 0x00, 0xff);
pub const SETPOINT: Color32 = Color32::from_rgb(0xff, 0x00, 0x00);
pub const ACTUAL: Color32 = Color32::from_rgb(0x00, 0x00, 0xff);
pub const GAUGE_BAND: Color32 = Color32::from_rgb(0xd3, 0xd3, 0xd3);
pub const GAUGE_COLD_BAND: Color32 = Color32::from_rgb(0x00, 0xff, 0xff);
pub const GAUGE_THRESHOLD: Color32 = Color32::RED;
pub const DELTA_UP: Color32 = Color32::from_rgb(0x3d, 0x99, 0x70);
pub const DELTA_DOWN: Color32 = Color32::from_rgb(0xff, 0x41, 0x36);
pub const MISSING: Color32 = Color32::GRAY;

// ---------------------------------------------------------------------------
// Diverging colour scale for the correlation heatmap
// ---------------------------------------------------------------------------

/// ColorBrewer "Spectral", from -1 (dark red) to +1 (violet).
const SPECTRAL: [(u8, u8, u8); 11] = [
    (0x9e, 0x01, 0x42),
    (0xd5, 0x3e, 0x4f),
    (0xf4, 0x6d, 0x43),
    (0xfd, 0xae, 0x61),
    (0xfe, 0xe0, 0x8b),
    (0xff, 0xff, 0xbf),
    (0xe6, 0xf5, 0x98),
    (0xab, 0xdd, 0xa4),
    (0x66, 0xc2, 0xa5),
    (0x32, 0x88, 0xbd),
    (0x5e, 0x4f, 0xa2),
];

fn linear(stop: (u8, u8, u8)) -> LinSrgb {
    Srgb::new(stop.0, stop.1, stop.2)
        .into_format::<f32>()
        .into_linear()
}

fn to_color32(c: LinSrgb) -> Color32 {
    let rgb: Srgb<u8> = Srgb::<f32>::from_linear(c).into_format();
    Color32::from_rgb(rgb.red, rgb.green, rgb.blue)
}

/// Colour for `value` on a scale spanning `[min, max]`.
/// Out-of-range values are clamped; NaN maps to [`MISSING`].
pub fn spectral(value: f64, min: f64, max: f64) -> Color32 {
    if value.is_nan() {
        return MISSING;
    }
    let t = ((value - min) / (max - min)).clamp(0.0, 1.0) as f32;
    let pos = t * (SPECTRAL.len() - 1) as f32;
    let lo = (pos.floor() as usize).min(SPECTRAL.len() - 2);
    let frac = pos - lo as f32;
    to_color32(linear(SPECTRAL[lo]).mix(linear(SPECTRAL[lo + 1]), frac))
}

/// Black or white, whichever reads better on `background`.
pub fn text_on(background: Color32) -> Color32 {
    let lin = linear((background.r(), background.g(), background.b()));
    let luminance = 0.2126 * lin.red + 0.7152 * lin.green + 0.0722 * lin.blue;
    if luminance > 0.4 {
        Color32::BLACK
    } else {
        Color32::WHITE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spectral_endpoints_match_stops() {
        assert_eq!(spectral(-1.0, -1.0, 1.0), Color32::from_rgb(0x9e, 0x01, 0x42));
        assert_eq!(spectral(1.0, -1.0, 1.0), Color32::from_rgb(0x5e, 0x4f, 0xa2));
        assert_eq!(spectral(0.0, -1.0, 1.0), Color32::from_rgb(0xff, 0xff, 0xbf));
    }

    #[test]
    fn spectral_clamps_and_handles_nan() {
        assert_eq!(spectral(-3.0, -1.0, 1.0), spectral(-1.0, -1.0, 1.0));
        assert_eq!(spectral(f64::NAN, -1.0, 1.0), MISSING);
    }

    #[test]
    fn text_contrast() {
        assert_eq!(text_on(Color32::from_rgb(0xff, 0xff, 0xbf)), Color32::BLACK);
        assert_eq!(text_on(Color32::from_rgb(0x5e, 0x4f, 0xa2)), Color32::WHITE);
    }
}
