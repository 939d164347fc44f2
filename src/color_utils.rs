//! Color helpers for class definitions.
//!
//! Classes created from a plain name list get their colors from a fixed
//! palette, indexed by position. Projects with more classes than palette
//! entries fall back to generated colors spread by the golden angle.

/// Fixed palette assigned to classes in definition order.
pub const CLASS_PALETTE: [&str; 51] = [
    "#F0F8FF", "#E6E6FA", "#D3D3D3", "#DCDCDC", "#F5F5F5", "#FFF0F5", "#FAFAD2", "#FFFACD",
    "#FFFAF0", "#F0FFF0", "#F5FFFA", "#F0FFCC", "#FFFFE0", "#E0FFFF", "#E0F7FA", "#B2EBF2",
    "#80DEEA", "#4DD0E1", "#26C6DA", "#00BCD4", "#00ACC1", "#0097A7", "#00796B", "#004D40",
    "#00897B", "#009688", "#00796B", "#004D40", "#4CAF50", "#388E3C", "#2E7D32", "#1B5E20",
    "#C2185B", "#D32F2F", "#C2185B", "#880E4F", "#8E24AA", "#7B1FA2", "#6A1B9A", "#4A148C",
    "#9C27B0", "#8E24AA", "#673AB7", "#512DA8", "#3F51B5", "#303F9F", "#1E88E5", "#1976D2",
    "#1565C0", "#0288D1", "#039BE5",
];

/// Color for the class at `index` in definition order.
pub fn class_color(index: usize) -> String {
    match CLASS_PALETTE.get(index) {
        Some(color) => (*color).to_string(),
        None => {
            let hue = (index as f32 * 137.5) % 360.0;
            let (r, g, b) = hsv_to_rgb(hue, 0.7, 0.9);
            rgb_to_hex(r, g, b)
        }
    }
}

/// Convert HSV to RGB.
///
/// # Arguments
/// * `h` - Hue in degrees (0-360)
/// * `s` - Saturation (0.0-1.0)
/// * `v` - Value/brightness (0.0-1.0)
pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> (f32, f32, f32) {
    let c = v * s;
    let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
    let m = v - c;

    let (r, g, b) = match h {
        h if h < 60.0 => (c, x, 0.0),
        h if h < 120.0 => (x, c, 0.0),
        h if h < 180.0 => (0.0, c, x),
        h if h < 240.0 => (0.0, x, c),
        h if h < 300.0 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    (r + m, g + m, b + m)
}

/// Format 0.0-1.0 channels as a `#RRGGBB` string.
pub fn rgb_to_hex(r: f32, g: f32, b: f32) -> String {
    let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    format!("#{:02X}{:02X}{:02X}", channel(r), channel(g), channel(b))
}
