//! Editor configuration.
//!
//! Every tunable constant lives here. A TOML document may override any
//! subset of keys; the rest keep their defaults.

use crate::error::EditorError;
use collage_core::{CanvasSize, MediaObjectFactory, ScaleLimits};
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub canvas: CanvasSize,
    pub max_canvas: CanvasSize,
    pub scale: ScaleLimits,
    /// Multiplier for zoom-in / zoom-out buttons.
    pub zoom_step: f64,
    pub wheel_factor: f64,
    /// Wheel factor while the precision modifier is held.
    pub wheel_factor_precise: f64,
    /// Fraction of the canvas that fit-to-screen fills.
    pub fit_padding: f64,
    pub image_max_dimension: f64,
    pub video_max_dimension: f64,
    pub duplicate_offset: f64,
    /// Where the first uploaded file lands, in content space.
    pub upload_origin: f64,
    /// Diagonal step between consecutive uploads.
    pub upload_step: f64,
    pub export_pixel_ratio: f64,
    pub jpeg_quality: f32,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            canvas: CanvasSize::default(),
            max_canvas: CanvasSize::MAX,
            scale: ScaleLimits::default(),
            zoom_step: 1.25,
            wheel_factor: 1.1,
            wheel_factor_precise: 1.02,
            fit_padding: 0.95,
            image_max_dimension: 200.0,
            video_max_dimension: 250.0,
            duplicate_offset: 20.0,
            upload_origin: 200.0,
            upload_step: 50.0,
            export_pixel_ratio: 2.0,
            jpeg_quality: 0.8,
        }
    }
}

impl EditorConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, EditorError> {
        let config: EditorConfig =
            toml::from_str(text).map_err(|e| EditorError::config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), EditorError> {
        let positive = |v: f64| v.is_finite() && v > 0.0;
        if !(positive(self.scale.min) && self.scale.min <= self.scale.max) {
            return Err(EditorError::config(format!(
                "invalid scale range {}..{}",
                self.scale.min, self.scale.max
            )));
        }
        if !(positive(self.canvas.width) && positive(self.canvas.height)) {
            return Err(EditorError::config("canvas size must be positive"));
        }
        if !(positive(self.max_canvas.width) && positive(self.max_canvas.height)) {
            return Err(EditorError::config("max canvas size must be positive"));
        }
        if !(self.zoom_step > 1.0 && self.wheel_factor > 1.0 && self.wheel_factor_precise > 1.0) {
            return Err(EditorError::config("zoom factors must be greater than 1"));
        }
        if !(positive(self.fit_padding) && self.fit_padding <= 1.0) {
            return Err(EditorError::config("fit padding must be in (0, 1]"));
        }
        if !(positive(self.image_max_dimension) && positive(self.video_max_dimension)) {
            return Err(EditorError::config("max media dimensions must be positive"));
        }
        if ![self.duplicate_offset, self.upload_origin, self.upload_step]
            .iter()
            .all(|v| v.is_finite())
        {
            return Err(EditorError::config("placement offsets must be finite"));
        }
        if !positive(self.export_pixel_ratio) {
            return Err(EditorError::config("export pixel ratio must be positive"));
        }
        if !(0.0..=1.0).contains(&self.jpeg_quality) {
            return Err(EditorError::config("jpeg quality must be in [0, 1]"));
        }
        Ok(())
    }

    pub fn factory(&self) -> MediaObjectFactory {
        MediaObjectFactory {
            image_max: self.image_max_dimension,
            video_max: self.video_max_dimension,
        }
    }
}
