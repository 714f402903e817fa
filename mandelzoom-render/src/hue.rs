use mandelzoom_core::Escape;

/// Opaque black, used for points inside the set and out-of-range hues.
pub const BLACK: [u8; 4] = [0, 0, 0, 0xFF];

/// Fully transparent: a pixel the current pass has not reached yet.
pub const TRANSPARENT: [u8; 4] = [0, 0, 0, 0];

/// Convert a hue in degrees (`0..=360`) at full saturation and brightness
/// to RGBA.
///
/// Each 60° segment `[k·60, (k+1)·60)` ramps one channel; the final segment is
/// closed so that `360` lands in segment 5 (red). Anything outside
/// `0..=360` (including NaN) is black.
pub fn hue_to_rgb(h: f64) -> [u8; 4] {
    if !(0.0..=360.0).contains(&h) {
        return BLACK;
    }

    let sector = h / 60.0;
    // Truncating cast is the intended quantisation.
    let x = (255.0 * (1.0 - ((sector % 2.0) - 1.0).abs())) as u8;

    match (sector.floor() as u32).min(5) {
        0 => [0xFF, x, 0, 0xFF],
        1 => [x, 0xFF, 0, 0xFF],
        2 => [0, 0xFF, x, 0xFF],
        3 => [0, x, 0xFF, 0xFF],
        4 => [x, 0, 0xFF, 0xFF],
        _ => [0xFF, 0, x, 0xFF],
    }
}

/// Colour for an evaluated point: black inside the set, otherwise a hue
/// proportional to how quickly the orbit escaped.
#[inline]
pub fn escape_colour(escape: Escape, max_iterations: u32) -> [u8; 4] {
    match escape {
        Escape::Interior => BLACK,
        escaped => hue_to_rgb(360.0 * escaped.ratio(max_iterations)),
    }
}
