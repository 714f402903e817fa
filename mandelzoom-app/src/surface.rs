use eframe::egui;
use tracing::debug;

use mandelzoom_core::BoxShape;
use mandelzoom_render::{Sprite, Surface};

/// Zoom-box outline: teal at half opacity, one pixel wide.
const OUTLINE_COLOUR: egui::Color32 = egui::Color32::from_rgba_premultiplied(0, 64, 64, 128);

enum DrawCommand {
    Image {
        texture: egui::TextureHandle,
        sprite: Sprite,
    },
    Outline(BoxShape),
}

/// [`Surface`] backed by egui textures.
///
/// egui repaints everything every frame, so drawing is recorded as a list of
/// commands: `present` swaps the recorded list in as the visible frame and
/// [`paint`](Self::paint) replays it. One egui point is treated as one
/// surface pixel.
pub(crate) struct EguiSurface {
    ctx: egui::Context,
    image: Option<egui::TextureHandle>,
    pending: Vec<DrawCommand>,
    pending_cleared: bool,
    presented: Vec<DrawCommand>,
}

impl EguiSurface {
    pub(crate) fn new(ctx: &egui::Context) -> Self {
        Self {
            ctx: ctx.clone(),
            image: None,
            pending: Vec::new(),
            pending_cleared: false,
            presented: Vec::new(),
        }
    }

    /// Replay the presented frame into `rect`.
    pub(crate) fn paint(&self, painter: &egui::Painter, rect: egui::Rect) {
        let painter = painter.with_clip_rect(rect);
        painter.rect_filled(rect, 0.0, egui::Color32::BLACK);

        let uv = egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
        for cmd in &self.presented {
            match cmd {
                DrawCommand::Image { texture, sprite } => {
                    let size = texture.size_vec2() * sprite.scale;
                    let min = rect.min + egui::vec2(sprite.x, sprite.y);
                    let target = egui::Rect::from_min_size(min, size);
                    painter.image(texture.id(), target, uv, egui::Color32::WHITE);
                }
                DrawCommand::Outline(shape) => {
                    let min = rect.min + egui::vec2(shape.x, shape.y);
                    let target =
                        egui::Rect::from_min_size(min, egui::vec2(shape.width, shape.height));
                    painter.rect_stroke(
                        target,
                        0.0,
                        egui::Stroke::new(1.0, OUTLINE_COLOUR),
                        egui::StrokeKind::Outside,
                    );
                }
            }
        }
    }
}

impl Surface for EguiSurface {
    fn resize(&mut self, width: u32, height: u32) {
        debug!(width, height, "Surface resized");
        self.image = None;
        self.pending.clear();
        self.presented.clear();
    }

    fn update(&mut self, rgba: &[u8], width: u32, height: u32) {
        let image =
            egui::ColorImage::from_rgba_unmultiplied([width as usize, height as usize], rgba);
        self.image = Some(
            self.ctx
                .load_texture("mandelzoom-frame", image, egui::TextureOptions::NEAREST),
        );
    }

    fn draw(&mut self, sprite: Sprite) {
        if let Some(texture) = &self.image {
            self.pending.push(DrawCommand::Image {
                texture: texture.clone(),
                sprite,
            });
        }
    }

    fn draw_outline(&mut self, shape: &BoxShape) {
        self.pending.push(DrawCommand::Outline(*shape));
    }

    fn clear(&mut self) {
        self.pending.clear();
        self.pending_cleared = true;
    }

    fn present(&mut self) {
        if self.pending_cleared {
            self.presented = std::mem::take(&mut self.pending);
        } else {
            self.presented.append(&mut self.pending);
        }
        self.pending_cleared = false;
        self.ctx.request_repaint();
    }
}
