//! Media object factory: decoded media → placeable geometry.
//!
//! Oversized media is scaled down uniformly to a per-class maximum
//! dimension, then shaped according to the requested display kind.

use crate::error::FactoryError;
use crate::model::*;
use kurbo::{Point, Size};

/// The result of a successful decode, ready to be placed.
#[derive(Debug)]
pub struct MediaDescriptor {
    pub name: String,
    pub natural_width: f64,
    pub natural_height: f64,
    pub source: MediaSource,
}

impl MediaDescriptor {
    pub fn image(name: impl Into<String>, bitmap: Bitmap) -> Self {
        Self {
            name: name.into(),
            natural_width: bitmap.width as f64,
            natural_height: bitmap.height as f64,
            source: MediaSource::Image(bitmap),
        }
    }

    pub fn video(name: impl Into<String>, width: f64, height: f64, video: VideoSource) -> Self {
        Self {
            name: name.into(),
            natural_width: width,
            natural_height: height,
            source: MediaSource::Video(video),
        }
    }

    pub fn class(&self) -> MediaClass {
        self.source.class()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MediaObjectFactory {
    pub image_max: f64,
    pub video_max: f64,
}

impl Default for MediaObjectFactory {
    fn default() -> Self {
        Self {
            image_max: 200.0,
            video_max: 250.0,
        }
    }
}

/// Scale `(width, height)` down so neither side exceeds `max`,
/// preserving the aspect ratio. Smaller media is left untouched.
pub fn fit_within(width: f64, height: f64, max: f64) -> (f64, f64) {
    let larger = width.max(height);
    if larger > max {
        let k = max / larger;
        (width * k, height * k)
    } else {
        (width, height)
    }
}

impl MediaObjectFactory {
    pub fn max_dimension(&self, class: MediaClass) -> f64 {
        match class {
            MediaClass::Image => self.image_max,
            MediaClass::Video => self.video_max,
        }
    }

    /// Geometry for `kind` sized from a natural `width × height`.
    pub fn geometry(&self, kind: MediaKind, width: f64, height: f64) -> (Geometry, Size) {
        let (w, h) = fit_within(width, height, self.max_dimension(kind.class()));
        let pattern = Size::new(w, h);
        let radius = w.min(h) / 2.0;
        let geometry = match kind {
            MediaKind::ImageRect => Geometry::Rect {
                width: w,
                height: h,
            },
            MediaKind::ShapeCircle => Geometry::Circle { radius, pattern },
            MediaKind::ShapeTriangle => Geometry::Triangle { radius, pattern },
            MediaKind::Video => Geometry::Video {
                width: w,
                height: h,
            },
        };
        (geometry, pattern)
    }

    /// Build a draft centred on `position`. `kind` overrides the display
    /// kind inferred from the descriptor's class and name.
    pub fn build(
        &self,
        descriptor: MediaDescriptor,
        kind: Option<MediaKind>,
        position: Point,
    ) -> Result<MediaDraft, FactoryError> {
        let (width, height) = (descriptor.natural_width, descriptor.natural_height);
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(FactoryError::EmptyMedia { width, height });
        }

        let class = descriptor.class();
        let kind = kind.unwrap_or_else(|| MediaKind::infer(class, &descriptor.name));
        if kind.class() != class {
            return Err(FactoryError::KindMismatch { kind, class });
        }

        let (geometry, size) = self.geometry(kind, width, height);
        log::debug!(
            "factory: {:?} '{}' {}×{} → {}×{}",
            kind,
            descriptor.name,
            width,
            height,
            size.width,
            size.height
        );

        Ok(MediaDraft {
            name: descriptor.name,
            geometry,
            position,
            transform: ObjectTransform::default(),
            style: Style::default(),
            locked: false,
            source: descriptor.source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn square(n: u32) -> MediaDescriptor {
        MediaDescriptor::image("photo", Bitmap::solid(n, n, Color::WHITE).unwrap())
    }

    #[test]
    fn circle_from_large_square() {
        let factory = MediaObjectFactory::default();
        let draft = factory
            .build(square(400), Some(MediaKind::ShapeCircle), Point::new(300.0, 200.0))
            .unwrap();
        assert_eq!(
            draft.geometry,
            Geometry::Circle {
                radius: 100.0,
                pattern: Size::new(200.0, 200.0),
            }
        );
        assert_eq!(draft.position, Point::new(300.0, 200.0));
        assert_eq!(draft.style, Style::default());
    }

    #[test]
    fn downscale_preserves_aspect() {
        assert_eq!(fit_within(400.0, 100.0, 200.0), (200.0, 50.0));
        assert_eq!(fit_within(100.0, 800.0, 250.0), (31.25, 250.0));
        assert_eq!(fit_within(120.0, 80.0, 200.0), (120.0, 80.0));
    }

    #[test]
    fn small_media_keeps_natural_size() {
        let factory = MediaObjectFactory::default();
        let draft = factory.build(square(100), None, Point::ZERO).unwrap();
        assert_eq!(
            draft.geometry,
            Geometry::Rect {
                width: 100.0,
                height: 100.0
            }
        );
    }

    #[test]
    fn triangle_inferred_from_name() {
        let factory = MediaObjectFactory::default();
        let desc = MediaDescriptor::image(
            "Purple Triangle",
            Bitmap::solid(100, 80, Color::WHITE).unwrap(),
        );
        let draft = factory.build(desc, None, Point::ZERO).unwrap();
        assert_eq!(
            draft.geometry,
            Geometry::Triangle {
                radius: 40.0,
                pattern: Size::new(100.0, 80.0),
            }
        );
    }

    #[test]
    fn video_uses_video_max() {
        let factory = MediaObjectFactory::default();
        let desc = MediaDescriptor::video("clip", 1000.0, 500.0, VideoSource::new(None, None));
        let draft = factory.build(desc, None, Point::ZERO).unwrap();
        assert_eq!(
            draft.geometry,
            Geometry::Video {
                width: 250.0,
                height: 125.0
            }
        );
    }

    #[test]
    fn rejects_mismatch_and_empty() {
        let factory = MediaObjectFactory::default();
        let err = factory
            .build(square(10), Some(MediaKind::Video), Point::ZERO)
            .unwrap_err();
        assert!(matches!(err, FactoryError::KindMismatch { .. }));

        let desc = MediaDescriptor::video("clip", 0.0, 10.0, VideoSource::new(None, None));
        let err = factory.build(desc, None, Point::ZERO).unwrap_err();
        assert!(matches!(err, FactoryError::EmptyMedia { .. }));
    }
}
