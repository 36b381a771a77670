//! Canvas dimensions and the content → screen view transform.
//!
//! Screen pixel `p` shows content point `(p - translate) / scale`.
//! Zooming about a focal pixel keeps that content point under the pixel.

use crate::error::CanvasSizeError;
use kurbo::{Affine, Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// The canvas (viewport) dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: f64,
    pub height: f64,
}

impl Default for CanvasSize {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
        }
    }
}

/// Outcome of a resize request that passed validation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resized {
    pub size: CanvasSize,
    /// True when the request exceeded `max` and was cut down.
    pub clamped: bool,
}

impl CanvasSize {
    /// 8K UHD.
    pub const MAX: CanvasSize = CanvasSize {
        width: 7680.0,
        height: 4320.0,
    };

    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }

    /// Validate a requested size and clamp each side to `max`.
    pub fn resolve(width: f64, height: f64, max: CanvasSize) -> Result<Resized, CanvasSizeError> {
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(CanvasSizeError { width, height });
        }
        let size = CanvasSize::new(width.min(max.width), height.min(max.height));
        Ok(Resized {
            clamped: size.width < width || size.height < height,
            size,
        })
    }
}

/// Allowed zoom range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaleLimits {
    pub min: f64,
    pub max: f64,
}

impl Default for ScaleLimits {
    fn default() -> Self {
        Self { min: 0.25, max: 4.0 }
    }
}

impl ScaleLimits {
    /// Clamp into `min..=max`. An inverted range yields `max`; NaN yields
    /// `min`.
    pub fn clamp(&self, scale: f64) -> f64 {
        if scale.is_nan() {
            return self.min;
        }
        scale.max(self.min).min(self.max)
    }

    pub fn contains(&self, scale: f64) -> bool {
        (self.min..=self.max).contains(&scale)
    }
}

/// Uniform scale followed by a translation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewTransform {
    pub scale: f64,
    pub translate: Vec2,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ViewTransform {
    pub const IDENTITY: ViewTransform = ViewTransform {
        scale: 1.0,
        translate: Vec2::ZERO,
    };

    /// Content → screen affine.
    pub fn affine(&self) -> Affine {
        Affine::translate(self.translate) * Affine::scale(self.scale)
    }

    pub fn to_content(&self, screen: Point) -> Point {
        ((screen.to_vec2() - self.translate) / self.scale).to_point()
    }

    pub fn to_screen(&self, content: Point) -> Point {
        (content.to_vec2() * self.scale + self.translate).to_point()
    }

    /// Rescale so the content under `focal` stays under `focal`.
    /// `new_scale` is clamped to `limits`. Returns false when nothing moved:
    /// the clamped scale equals the current one, or the target or focal
    /// point is not finite.
    pub fn zoom_about(&mut self, new_scale: f64, focal: Point, limits: ScaleLimits) -> bool {
        if !(new_scale.is_finite() && focal.is_finite()) {
            return false;
        }
        let new_scale = limits.clamp(new_scale);
        if new_scale == self.scale {
            return false;
        }
        let anchor = self.to_content(focal);
        self.scale = new_scale;
        self.translate = focal.to_vec2() - anchor.to_vec2() * new_scale;
        true
    }

    /// Scale `content` to fit `canvas` (times `padding`) and centre it.
    /// Empty content resets to identity.
    pub fn fit(
        content: Option<Rect>,
        canvas: CanvasSize,
        limits: ScaleLimits,
        padding: f64,
    ) -> Self {
        let Some(bounds) = content.filter(|b| b.width() > 0.0 && b.height() > 0.0) else {
            return Self::IDENTITY;
        };
        let scale = limits.clamp(
            (canvas.width / bounds.width()).min(canvas.height / bounds.height()) * padding,
        );
        let scaled = Affine::scale(scale).transform_rect_bbox(bounds);
        let translate = Vec2::new(
            (canvas.width - scaled.width()) / 2.0 - scaled.x0,
            (canvas.height - scaled.height()) / 2.0 - scaled.y0,
        );
        Self { scale, translate }
    }
}
