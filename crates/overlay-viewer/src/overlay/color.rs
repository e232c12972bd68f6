use egui::Color32;

/// 31-based string hash, wrapping at 32 bits. Deterministic across runs;
/// the only requirement is stable, well-spread group colors.
fn hash_name(name: &str) -> u32 {
    let mut hash: i32 = 0;
    for c in name.chars() {
        hash = (c as i32).wrapping_add(hash.wrapping_shl(5).wrapping_sub(hash));
    }
    hash.unsigned_abs()
}

fn hsl_to_color32(hue: f32, saturation: f32, lightness: f32) -> Color32 {
    let s = saturation / 100.0;
    let l = lightness / 100.0;

    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let x = c * (1.0 - ((hue / 60.0) % 2.0 - 1.0).abs());
    let m = l - c / 2.0;

    let (r, g, b) = match hue as u32 {
        0..60 => (c, x, 0.0),
        60..120 => (x, c, 0.0),
        120..180 => (0.0, c, x),
        180..240 => (0.0, x, c),
        240..300 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    Color32::from_rgb(
        ((r + m) * 255.0).round() as u8,
        ((g + m) * 255.0).round() as u8,
        ((b + m) * 255.0).round() as u8,
    )
}

/// Deterministic color for an evidence group name: hue from the full hash
/// range, saturation 50-99, lightness 40-59. Pure function of the string.
pub fn color_for_group(name: &str) -> Color32 {
    let hash = hash_name(name);
    let hue = (hash % 360) as f32;
    let saturation = (50 + hash % 50) as f32;
    let lightness = (40 + hash % 20) as f32;
    hsl_to_color32(hue, saturation, lightness)
}
