use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

// ---------------------------------------------------------------------------
// Numeric backend
// ---------------------------------------------------------------------------

/// Which number type the renderer computes with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Precision {
    /// Native `f64`: fast, good to a zoom of about 2^-45.
    #[default]
    F64,
    /// Double-double (~31 significant digits): slower, zooms much deeper.
    DoubleDouble,
}

// ---------------------------------------------------------------------------
// Application configuration
// ---------------------------------------------------------------------------

/// Startup settings read from `config.json`. Every field is optional in the
/// file; missing ones take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_window_width")]
    pub window_width: f32,
    #[serde(default = "default_window_height")]
    pub window_height: f32,
    /// Home view: the start-up view and the target of the reset key.
    #[serde(default = "default_home_re")]
    pub home_re: f64,
    #[serde(default)]
    pub home_im: f64,
    #[serde(default = "default_home_zoom")]
    pub home_zoom: f64,
    /// Keyboard pan distance, in units of the view scale.
    #[serde(default = "default_pan_step")]
    pub pan_step: f64,
    /// Zoom exponent change per mouse-wheel notch.
    #[serde(default = "default_zoom_step")]
    pub zoom_step: f64,
    #[serde(default)]
    pub precision: Precision,
    /// Render pool size; 0 uses one thread per logical core.
    #[serde(default)]
    pub render_threads: usize,
}

fn default_window_width() -> f32 {
    1200.0
}
fn default_window_height() -> f32 {
    900.0
}
fn default_home_re() -> f64 {
    -0.5
}
fn default_home_zoom() -> f64 {
    1.0
}
fn default_pan_step() -> f64 {
    0.25
}
fn default_zoom_step() -> f64 {
    1.0
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            window_width: default_window_width(),
            window_height: default_window_height(),
            home_re: default_home_re(),
            home_im: 0.0,
            home_zoom: default_home_zoom(),
            pan_step: default_pan_step(),
            zoom_step: default_zoom_step(),
            precision: Precision::default(),
            render_threads: 0,
        }
    }
}

impl AppConfig {
    /// Load the configuration from the OS config directory, falling back to
    /// defaults.
    pub fn load() -> Self {
        Self::load_from(&config_path())
    }

    /// Load from an explicit path. A missing file is not an error; an
    /// unreadable or malformed one is logged and ignored.
    pub fn load_from(path: &Path) -> Self {
        if path.exists() {
            match fs::read_to_string(path) {
                Ok(json) => match serde_json::from_str::<AppConfig>(&json) {
                    Ok(config) => {
                        info!("Loaded configuration from {}", path.display());
                        return config.sanitised();
                    }
                    Err(e) => {
                        error!("Failed to parse configuration: {e}");
                    }
                },
                Err(e) => {
                    error!("Failed to read configuration file: {e}");
                }
            }
        } else {
            debug!("No configuration file at {}", path.display());
        }
        Self::default()
    }

    /// Replace values the app cannot start with by their defaults.
    fn sanitised(mut self) -> Self {
        let defaults = Self::default();
        if self.window_width.is_nan() || self.window_width < 1.0 {
            self.window_width = defaults.window_width;
        }
        if self.window_height.is_nan() || self.window_height < 1.0 {
            self.window_height = defaults.window_height;
        }
        if !self.home_re.is_finite() || !self.home_im.is_finite() {
            self.home_re = defaults.home_re;
            self.home_im = defaults.home_im;
        }
        if !self.home_zoom.is_finite() {
            self.home_zoom = defaults.home_zoom;
        }
        if !self.pan_step.is_finite() {
            self.pan_step = defaults.pan_step;
        }
        if !self.zoom_step.is_finite() {
            self.zoom_step = defaults.zoom_step;
        }
        self
    }
}

fn config_path() -> PathBuf {
    directories::ProjectDirs::from("", "", "Mandelzoom")
        .map(|d| d.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
        .join("config.json")
}
