//! Engine configuration.
//!
//! `Config` is plain serde data so a host application can keep it in JSON or
//! TOML next to its other settings.
//!
//! ```rust
//! use synvis::Config;
//!
//! let json = r#"{
//!     "database_path": "/data/navdb.dat",
//!     "index_path": "/data/navdb.idx",
//!     "display_width": 800.0,
//!     "field_of_view_deg": 50.0
//! }"#;
//! let config = Config::from_json(json).unwrap();
//! assert_eq!(config.display_width, 800.0);
//! assert_eq!(config.min_recompute_interval_ms, 100);
//! ```
use serde::de::Error;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Fixed-column navigation database the index points into.
    #[serde(default = "Config::default_database_path")]
    pub database_path: PathBuf,

    /// Binary index built by [`crate::index_db`].
    #[serde(default = "Config::default_index_path")]
    pub index_path: PathBuf,

    /// Display width in pixels.
    #[serde(default = "Config::default_display_width")]
    pub display_width: f64,

    /// Display height in pixels.
    #[serde(default = "Config::default_display_height")]
    pub display_height: f64,

    /// Horizontal field of view in degrees.
    #[serde(default = "Config::default_field_of_view_deg")]
    pub field_of_view_deg: f64,

    /// Multiplier on the screen distance. Above 1 magnifies.
    #[serde(default = "Config::default_zoom")]
    pub zoom: f64,

    /// Minimum time between two view-screen recomputations.
    #[serde(default = "Config::default_min_recompute_interval_ms")]
    pub min_recompute_interval_ms: u64,

    /// Runways whose projected vertical span is below this are not drawn.
    #[serde(default = "Config::default_min_runway_pixels")]
    pub min_runway_pixels: f64,

    /// Fraction of the display size added on every side of the clip rectangle.
    #[serde(default = "Config::default_clip_margin")]
    pub clip_margin: f64,

    /// Used when a runway record has no width.
    #[serde(default = "Config::default_runway_width_ft")]
    pub default_runway_width_ft: f64,
}

impl Config {
    fn default_database_path() -> PathBuf {
        PathBuf::from("navdata.dat")
    }

    fn default_index_path() -> PathBuf {
        PathBuf::from("navdata.idx")
    }

    const fn default_display_width() -> f64 {
        640.0
    }

    const fn default_display_height() -> f64 {
        480.0
    }

    const fn default_field_of_view_deg() -> f64 {
        60.0
    }

    const fn default_zoom() -> f64 {
        1.0
    }

    const fn default_min_recompute_interval_ms() -> u64 {
        100
    }

    const fn default_min_runway_pixels() -> f64 {
        2.0
    }

    const fn default_clip_margin() -> f64 {
        0.25
    }

    const fn default_runway_width_ft() -> f64 {
        150.0
    }

    pub fn with_database_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.database_path = path.into();
        self
    }

    pub fn with_index_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.index_path = path.into();
        self
    }

    pub fn with_display(mut self, width: f64, height: f64) -> Self {
        self.display_width = width;
        self.display_height = height;
        self
    }

    pub fn with_field_of_view(mut self, degrees: f64) -> Self {
        self.field_of_view_deg = degrees;
        self
    }

    pub fn with_zoom(mut self, zoom: f64) -> Self {
        self.zoom = zoom;
        self
    }

    pub fn with_min_recompute_interval(mut self, interval: Duration) -> Self {
        self.min_recompute_interval_ms = interval.as_millis() as u64;
        self
    }

    pub fn with_min_runway_pixels(mut self, pixels: f64) -> Self {
        self.min_runway_pixels = pixels;
        self
    }

    pub fn with_clip_margin(mut self, margin: f64) -> Self {
        self.clip_margin = margin;
        self
    }

    pub fn min_recompute_interval(&self) -> Duration {
        Duration::from_millis(self.min_recompute_interval_ms)
    }

    /// Distance from the eye to the virtual screen, in pixels.
    pub fn screen_distance(&self) -> f64 {
        let half_fov = self.field_of_view_deg.to_radians() / 2.0;
        (self.display_width / 2.0) / half_fov.tan() * self.zoom
    }

    pub fn validate(&self) -> Result<(), String> {
        if !(self.display_width.is_finite() && self.display_width > 0.0)
            || !(self.display_height.is_finite() && self.display_height > 0.0)
        {
            return Err("Display size must be positive".to_string());
        }

        if !(self.field_of_view_deg > 0.0 && self.field_of_view_deg < 180.0) {
            return Err("Field of view must be between 0 and 180 degrees".to_string());
        }

        if !(self.zoom.is_finite() && self.zoom > 0.0) {
            return Err("Zoom must be positive".to_string());
        }

        if !(self.clip_margin.is_finite() && self.clip_margin >= 0.0) {
            return Err("Clip margin must not be negative".to_string());
        }

        if !(self.min_runway_pixels.is_finite() && self.min_runway_pixels >= 0.0) {
            return Err("Minimum runway span must not be negative".to_string());
        }

        if !(self.default_runway_width_ft.is_finite() && self.default_runway_width_ft > 0.0) {
            return Err("Default runway width must be positive".to_string());
        }

        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let config: Config = serde_json::from_str(json)?;
        if let Err(e) = config.validate() {
            return Err(Error::custom(e));
        }
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    #[cfg(feature = "toml")]
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        let config: Config = toml::from_str(toml_str)?;
        if let Err(e) = config.validate() {
            return Err(toml::de::Error::custom(e));
        }
        Ok(config)
    }

    #[cfg(feature = "toml")]
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: Self::default_database_path(),
            index_path: Self::default_index_path(),
            display_width: Self::default_display_width(),
            display_height: Self::default_display_height(),
            field_of_view_deg: Self::default_field_of_view_deg(),
            zoom: Self::default_zoom(),
            min_recompute_interval_ms: Self::default_min_recompute_interval_ms(),
            min_runway_pixels: Self::default_min_runway_pixels(),
            clip_margin: Self::default_clip_margin(),
            default_runway_width_ft: Self::default_runway_width_ft(),
        }
    }
}
