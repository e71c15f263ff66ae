use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use retention_dashboard::Segment;

fn hsl_to_color32(hue: f32, saturation: f32, lightness: f32) -> Color32 {
    let rgb: Srgb = Hsl::new(hue, saturation, lightness).into_color();
    Color32::from_rgb(
        (rgb.red * 255.0) as u8,
        (rgb.green * 255.0) as u8,
        (rgb.blue * 255.0) as u8,
    )
}

// ---------------------------------------------------------------------------
// Series colours
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues, one
/// per bar of a categorical series.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    (0..n)
        .map(|i| hsl_to_color32((i as f32 / n as f32) * 360.0, 0.75, 0.55))
        .collect()
}

/// Red at a 0% return rate through amber to green at 100%.
pub fn rate_color(rate: f64) -> Color32 {
    let hue = (rate.clamp(0.0, 1.0) as f32) * 120.0;
    hsl_to_color32(hue, 0.70, 0.45)
}

/// Fixed colours so a segment looks the same in every chart.
pub fn segment_color(segment: Segment) -> Color32 {
    match segment {
        Segment::Low => hsl_to_color32(200.0, 0.45, 0.70),
        Segment::Medium => hsl_to_color32(210.0, 0.60, 0.55),
        Segment::High => hsl_to_color32(220.0, 0.75, 0.40),
    }
}
