use mandelzoom_core::BoxShape;

/// Placement of the uploaded image on the surface: top-left corner in
/// surface pixels and a uniform scale factor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sprite {
    pub x: f32,
    pub y: f32,
    pub scale: f32,
}

impl Sprite {
    /// Drawn at the origin, one image pixel per surface pixel.
    pub const IDENTITY: Sprite = Sprite {
        x: 0.0,
        y: 0.0,
        scale: 1.0,
    };
}

/// A presentation target with a single image slot.
///
/// `update` replaces the image; every following `draw` places that image
/// until the next `update`. Drawing accumulates into a back frame that only
/// becomes visible on `present`.
pub trait Surface {
    fn resize(&mut self, width: u32, height: u32);

    /// Upload `width × height` tightly packed RGBA8 pixels.
    fn update(&mut self, rgba: &[u8], width: u32, height: u32);

    fn draw(&mut self, sprite: Sprite);

    /// Outline a zoom-box rectangle on top of whatever has been drawn.
    fn draw_outline(&mut self, shape: &BoxShape);

    /// Clear the back frame to black.
    fn clear(&mut self);

    fn present(&mut self);
}
