use eframe::egui;
use tracing::{error, info};

use mandelzoom_core::{Complex, DoubleDouble, Mandelbrot, View};
use mandelzoom_render::{Controller, EventOutcome, InputEvent, MouseButton, RenderState};

use crate::config::{AppConfig, Precision};
use crate::surface::EguiSurface;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Smooth-scroll distance that counts as one wheel notch.
pub(crate) const POINTS_PER_NOTCH: f32 = 50.0;
/// Lines per page for page-wise wheel scrolling.
pub(crate) const LINES_PER_PAGE: f32 = 3.0;
pub(crate) const HUD_MARGIN: f32 = 8.0;

// ---------------------------------------------------------------------------
// Controller for the configured precision
// ---------------------------------------------------------------------------

pub(crate) enum AnyController {
    Fast(Controller<f64>),
    Precise(Controller<DoubleDouble>),
}

impl AnyController {
    fn build(config: &AppConfig, width: u32, height: u32) -> mandelzoom_render::Result<Self> {
        let threads = config.render_threads;
        Ok(match config.precision {
            Precision::F64 => {
                let centre = Complex::from_f64(config.home_re, config.home_im);
                let view = View::new(centre, config.home_zoom, width, height)?;
                Self::Fast(Controller::new(view, Mandelbrot, threads)?)
            }
            Precision::DoubleDouble => {
                let centre = Complex::from_f64(config.home_re, config.home_im);
                let view = View::new(centre, config.home_zoom, width, height)?;
                Self::Precise(Controller::new(view, Mandelbrot, threads)?)
            }
        })
    }

    fn handle_event(&mut self, event: InputEvent) -> EventOutcome {
        match self {
            Self::Fast(c) => c.handle_event(event),
            Self::Precise(c) => c.handle_event(event),
        }
    }

    fn tick(&mut self, surface: &mut EguiSurface) -> bool {
        match self {
            Self::Fast(c) => c.tick(surface),
            Self::Precise(c) => c.tick(surface),
        }
    }

    fn needs_redraw(&self) -> bool {
        match self {
            Self::Fast(c) => c.needs_redraw(),
            Self::Precise(c) => c.needs_redraw(),
        }
    }

    fn state(&self) -> RenderState {
        match self {
            Self::Fast(c) => c.state(),
            Self::Precise(c) => c.state(),
        }
    }

    fn progress(&self) -> (usize, usize) {
        match self {
            Self::Fast(c) => c.progress(),
            Self::Precise(c) => c.progress(),
        }
    }

    fn view_summary(&self) -> String {
        match self {
            Self::Fast(c) => c.view().to_string(),
            Self::Precise(c) => c.view().to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Application
// ---------------------------------------------------------------------------

pub(crate) struct MandelzoomApp {
    config: AppConfig,
    /// Built on the first frame, once the canvas size is known.
    controller: Option<AnyController>,
    startup_error: Option<String>,
    surface: EguiSurface,
    closing: bool,
}

impl MandelzoomApp {
    pub(crate) fn new(ctx: &egui::Context, config: AppConfig) -> Self {
        Self {
            config,
            controller: None,
            startup_error: None,
            surface: EguiSurface::new(ctx),
            closing: false,
        }
    }

    fn ensure_controller(&mut self, width: u32, height: u32) {
        if self.controller.is_some() || self.startup_error.is_some() {
            return;
        }
        match AnyController::build(&self.config, width, height) {
            Ok(controller) => {
                info!(precision = ?self.config.precision, "Renderer started");
                self.controller = Some(controller);
            }
            Err(e) => {
                error!("Could not start renderer: {e}");
                self.startup_error = Some(e.to_string());
            }
        }
    }
}

impl eframe::App for MandelzoomApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if ctx.input(|i| i.viewport().close_requested()) && !self.closing {
            self.closing = true;
            if let Some(controller) = self.controller.as_mut() {
                controller.handle_event(InputEvent::Close);
            }
            return;
        }

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                let available = ui.available_size();
                let width = available.x.max(1.0) as u32;
                let height = available.y.max(1.0) as u32;
                let (response, painter) =
                    ui.allocate_painter(available, egui::Sense::click_and_drag());
                let rect = response.rect;

                self.ensure_controller(width, height);
                let Some(controller) = self.controller.as_mut() else {
                    let message = self.startup_error.as_deref().unwrap_or("Renderer unavailable");
                    painter.text(
                        rect.center(),
                        egui::Align2::CENTER_CENTER,
                        message,
                        egui::FontId::proportional(16.0),
                        egui::Color32::LIGHT_RED,
                    );
                    return;
                };

                controller.handle_event(InputEvent::Resize { width, height });
                for event in collect_input(ctx, rect, &self.config) {
                    controller.handle_event(event);
                }

                controller.tick(&mut self.surface);
                self.surface.paint(&painter, rect);
                draw_status(&painter, rect, controller);

                if controller.needs_redraw() {
                    ctx.request_repaint();
                }
            });
    }
}

// ---------------------------------------------------------------------------
// Overlay
// ---------------------------------------------------------------------------

fn draw_status(painter: &egui::Painter, rect: egui::Rect, controller: &AnyController) {
    let state = controller.state();
    if state == RenderState::Rendering {
        let (done, total) = controller.progress();
        if total > 0 {
            let frac = (done as f32 / total as f32).clamp(0.0, 1.0);
            let bar_h = 3.0;
            let bar_y = rect.max.y - bar_h;
            let bg_rect = egui::Rect::from_min_size(
                egui::pos2(rect.min.x, bar_y),
                egui::vec2(rect.width(), bar_h),
            );
            painter.rect_filled(
                bg_rect,
                0.0,
                egui::Color32::from_rgba_premultiplied(0, 0, 0, 120),
            );
            if frac > 0.0 {
                let fill_rect = egui::Rect::from_min_size(
                    egui::pos2(rect.min.x, bar_y),
                    egui::vec2(rect.width() * frac, bar_h),
                );
                painter.rect_filled(fill_rect, 0.0, egui::Color32::from_rgb(80, 200, 255));
            }
        }
    }

    painter.text(
        egui::pos2(rect.min.x + HUD_MARGIN, rect.max.y - HUD_MARGIN),
        egui::Align2::LEFT_BOTTOM,
        format!("{}  {}", state.label(), controller.view_summary()),
        egui::FontId::monospace(12.0),
        egui::Color32::from_gray(200),
    );
}

// ---------------------------------------------------------------------------
// egui → InputEvent
// ---------------------------------------------------------------------------

/// Translate this frame's raw egui events into controller events, with
/// pointer positions relative to the canvas.
fn collect_input(ctx: &egui::Context, rect: egui::Rect, config: &AppConfig) -> Vec<InputEvent> {
    let to_pixel = |pos: egui::Pos2| ((pos.x - rect.min.x) as i32, (pos.y - rect.min.y) as i32);

    ctx.input(|input| {
        let hovered = input.pointer.hover_pos().is_some_and(|p| rect.contains(p));
        let mut events = Vec::new();
        for event in &input.events {
            match event {
                egui::Event::PointerMoved(pos) => {
                    let (x, y) = to_pixel(*pos);
                    events.push(InputEvent::MouseMove { x, y });
                }
                egui::Event::PointerButton {
                    pos,
                    button,
                    pressed,
                    ..
                } => {
                    let Some(button) = map_button(*button) else {
                        continue;
                    };
                    let (x, y) = to_pixel(*pos);
                    if !*pressed {
                        events.push(InputEvent::MouseUp { button, x, y });
                    } else if rect.contains(*pos) {
                        events.push(InputEvent::MouseDown { button, x, y });
                    }
                }
                egui::Event::MouseWheel { unit, delta, .. } if hovered => {
                    let notches = wheel_notches(*unit, delta.y);
                    if notches != 0.0 {
                        // Wheel up zooms in, i.e. lowers the zoom exponent.
                        events.push(InputEvent::Zoom {
                            delta: -(notches as f64) * config.zoom_step,
                        });
                    }
                }
                egui::Event::Key {
                    key, pressed: true, ..
                } => {
                    if let Some(e) = map_key(*key, config.pan_step) {
                        events.push(e);
                    }
                }
                _ => {}
            }
        }
        events
    })
}

pub(crate) fn map_button(button: egui::PointerButton) -> Option<MouseButton> {
    match button {
        egui::PointerButton::Primary => Some(MouseButton::Left),
        egui::PointerButton::Secondary => Some(MouseButton::Right),
        egui::PointerButton::Middle => Some(MouseButton::Middle),
        _ => None,
    }
}

/// Wheel movement in notches, positive when scrolling up.
pub(crate) fn wheel_notches(unit: egui::MouseWheelUnit, dy: f32) -> f32 {
    match unit {
        egui::MouseWheelUnit::Line => dy,
        egui::MouseWheelUnit::Page => dy * LINES_PER_PAGE,
        egui::MouseWheelUnit::Point => dy / POINTS_PER_NOTCH,
    }
}

/// Arrows/WASD pan, `R` resets, `Escape` drops the zoom box.
pub(crate) fn map_key(key: egui::Key, pan_step: f64) -> Option<InputEvent> {
    use egui::Key;
    let event = match key {
        Key::ArrowLeft | Key::A => InputEvent::Pan {
            dx: -pan_step,
            dy: 0.0,
        },
        Key::ArrowRight | Key::D => InputEvent::Pan {
            dx: pan_step,
            dy: 0.0,
        },
        Key::ArrowUp | Key::W => InputEvent::Pan {
            dx: 0.0,
            dy: -pan_step,
        },
        Key::ArrowDown | Key::S => InputEvent::Pan {
            dx: 0.0,
            dy: pan_step,
        },
        Key::R => InputEvent::Reset,
        Key::Escape => InputEvent::CancelZoomBox,
        _ => return None,
    };
    Some(event)
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub(crate) fn run() -> eframe::Result {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Starting Mandelzoom");

    let config = AppConfig::load();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Mandelzoom")
            .with_inner_size([config.window_width, config.window_height]),
        ..Default::default()
    };

    eframe::run_native(
        "Mandelzoom",
        options,
        Box::new(move |cc| Ok(Box::new(MandelzoomApp::new(&cc.egui_ctx, config)))),
    )
}
