//! Viewport controller: zoom, fit and canvas resizing.

use crate::config::EditorConfig;
use collage_core::{CanvasSize, CanvasSizeError, Point, Resized, ScaleLimits, ViewTransform};
use collage_render::{CoordSpace, RenderEngine};

#[derive(Debug, Clone, PartialEq)]
pub struct ViewportController {
    view: ViewTransform,
    canvas: CanvasSize,
    max_canvas: CanvasSize,
    limits: ScaleLimits,
    zoom_step: f64,
    wheel_factor: f64,
    wheel_factor_precise: f64,
    fit_padding: f64,
}

impl ViewportController {
    pub fn new(config: &EditorConfig) -> Self {
        let limits = config.scale;
        Self {
            view: ViewTransform {
                scale: limits.clamp(1.0),
                ..ViewTransform::IDENTITY
            },
            canvas: config.canvas,
            max_canvas: config.max_canvas,
            limits,
            zoom_step: config.zoom_step,
            wheel_factor: config.wheel_factor,
            wheel_factor_precise: config.wheel_factor_precise,
            fit_padding: config.fit_padding,
        }
    }

    pub fn view(&self) -> ViewTransform {
        self.view
    }

    pub fn scale(&self) -> f64 {
        self.view.scale
    }

    pub fn canvas(&self) -> CanvasSize {
        self.canvas
    }

    pub fn to_content(&self, screen: Point) -> Point {
        self.view.to_content(screen)
    }

    /// Zoom to `target` keeping `focal` fixed on screen. Redraws so zoom
    /// indicators stay current, even when the clamped scale is unchanged.
    /// Non-finite input is ignored. Returns whether the view moved.
    pub fn set_scale(&mut self, target: f64, focal: Point, engine: &mut dyn RenderEngine) -> bool {
        if !(target.is_finite() && focal.is_finite()) {
            log::warn!("ignoring zoom to {target} about {focal:?}");
            return false;
        }
        let moved = self.view.zoom_about(target, focal, self.limits);
        if moved {
            engine.set_view(self.view);
            log::debug!(
                "zoom {:.3} about ({:.1}, {:.1})",
                self.view.scale,
                focal.x,
                focal.y
            );
        }
        engine.request_redraw();
        moved
    }

    pub fn zoom_in(&mut self, engine: &mut dyn RenderEngine) -> bool {
        let target = self.view.scale * self.zoom_step;
        self.set_scale(target, self.canvas.center(), engine)
    }

    pub fn zoom_out(&mut self, engine: &mut dyn RenderEngine) -> bool {
        let target = self.view.scale / self.zoom_step;
        self.set_scale(target, self.canvas.center(), engine)
    }

    /// Wheel zoom about the pointer. Scrolling up (negative delta) zooms in.
    pub fn wheel(
        &mut self,
        delta_y: f64,
        precise: bool,
        pointer: Point,
        engine: &mut dyn RenderEngine,
    ) -> bool {
        if delta_y == 0.0 || !delta_y.is_finite() {
            return false;
        }
        let factor = if precise {
            self.wheel_factor_precise
        } else {
            self.wheel_factor
        };
        let target = if delta_y < 0.0 {
            self.view.scale * factor
        } else {
            self.view.scale / factor
        };
        self.set_scale(target, pointer, engine)
    }

    pub fn reset_zoom(&mut self, engine: &mut dyn RenderEngine) {
        self.apply(
            ViewTransform {
                scale: self.limits.clamp(1.0),
                ..ViewTransform::IDENTITY
            },
            engine,
        );
    }

    /// Scale and centre all mounted content. Empty content resets.
    pub fn fit_to_screen(&mut self, engine: &mut dyn RenderEngine) {
        let bounds = engine.bounding_box(None, CoordSpace::Content);
        let fitted = ViewTransform::fit(bounds, self.canvas, self.limits, self.fit_padding);
        self.apply(fitted, engine);
    }

    /// Resize the visible canvas, clamping to the configured maximum.
    pub fn resize_canvas(
        &mut self,
        width: f64,
        height: f64,
        engine: &mut dyn RenderEngine,
    ) -> Result<Resized, CanvasSizeError> {
        let resized = CanvasSize::resolve(width, height, self.max_canvas)?;
        if resized.clamped {
            log::warn!(
                "canvas {width}×{height} exceeds {}×{}, clamped to {}×{}",
                self.max_canvas.width,
                self.max_canvas.height,
                resized.size.width,
                resized.size.height
            );
        }
        self.canvas = resized.size;
        engine.resize(resized.size);
        engine.request_redraw();
        Ok(resized)
    }

    fn apply(&mut self, view: ViewTransform, engine: &mut dyn RenderEngine) {
        self.view = view;
        engine.set_view(view);
        engine.request_redraw();
        log::debug!(
            "view scale {:.3} translate ({:.1}, {:.1})",
            view.scale,
            view.translate.x,
            view.translate.y
        );
    }
}
