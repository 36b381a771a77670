//! Media object data model.
//!
//! A placed piece of content is a `MediaObject`: a kind-specific `Geometry`
//! anchored at a content-space `position`, a `Style`, a lock flag, and the
//! decoded media that backs it. Geometry is centred on the object's local
//! origin so `position` always names the visual centre.

use crate::id::ObjectId;
use kurbo::{Affine, BezPath, Circle, Point, Rect, Shape, Size};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

// ─── Colors ──────────────────────────────────────────────────────────────

/// RGBA color. Stored as 4 × f32 [0.0, 1.0].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

/// Helper to parse a single hex digit.
fn hex_val(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

impl Color {
    pub const BLACK: Color = Color::rgba(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Parse a hex color string: `#RGB`, `#RGBA`, `#RRGGBB`, `#RRGGBBAA`.
    /// The leading `#` is optional.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim();
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let bytes = hex.as_bytes();

        let short = |i: usize| hex_val(bytes[i]).map(|v| (v * 17) as f32 / 255.0);
        let long = |i: usize| -> Option<f32> {
            Some((hex_val(bytes[i])? << 4 | hex_val(bytes[i + 1])?) as f32 / 255.0)
        };

        match bytes.len() {
            3 => Some(Self::rgba(short(0)?, short(1)?, short(2)?, 1.0)),
            4 => Some(Self::rgba(short(0)?, short(1)?, short(2)?, short(3)?)),
            6 => Some(Self::rgba(long(0)?, long(2)?, long(4)?, 1.0)),
            8 => Some(Self::rgba(long(0)?, long(2)?, long(4)?, long(6)?)),
            _ => None,
        }
    }

    /// Emit as `#RRGGBB`, or `#RRGGBBAA` when not fully opaque.
    pub fn to_hex(&self) -> String {
        let [r, g, b, a] = self.to_rgba8();
        if a == 255 {
            format!("#{r:02X}{g:02X}{b:02X}")
        } else {
            format!("#{r:02X}{g:02X}{b:02X}{a:02X}")
        }
    }

    /// Quantize to 8-bit channels.
    pub fn to_rgba8(&self) -> [u8; 4] {
        let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b), q(self.a)]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

// ─── Style ───────────────────────────────────────────────────────────────

/// Shadow drawn behind the object. Invisible while `blur` is zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Shadow {
    pub blur: f64,
    pub color: Color,
}

impl Default for Shadow {
    fn default() -> Self {
        Self {
            blur: 0.0,
            color: Color::BLACK,
        }
    }
}

/// Active stroke paint. Only exists with a positive width.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub width: f64,
    pub color: Color,
}

/// Per-object visual style.
///
/// Setters clamp to the accepted ranges. A zero stroke width drops the
/// stroke entirely, so no stale color survives as active paint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Style {
    opacity: f64,
    brightness: f64,
    contrast: f64,
    shadow: Shadow,
    stroke: Option<Stroke>,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            opacity: 1.0,
            brightness: 0.0,
            contrast: 0.0,
            shadow: Shadow::default(),
            stroke: None,
        }
    }
}

impl Style {
    pub const BRIGHTNESS_RANGE: (f64, f64) = (-1.0, 1.0);
    pub const CONTRAST_RANGE: (f64, f64) = (-100.0, 100.0);

    pub fn opacity(&self) -> f64 {
        self.opacity
    }

    pub fn brightness(&self) -> f64 {
        self.brightness
    }

    pub fn contrast(&self) -> f64 {
        self.contrast
    }

    pub fn shadow(&self) -> Shadow {
        self.shadow
    }

    pub fn stroke(&self) -> Option<Stroke> {
        self.stroke
    }

    pub fn stroke_width(&self) -> f64 {
        self.stroke.map_or(0.0, |s| s.width)
    }

    pub fn set_opacity(&mut self, opacity: f64) {
        self.opacity = clamp_finite(opacity, 0.0, 1.0, self.opacity);
    }

    pub fn set_brightness(&mut self, brightness: f64) {
        let (lo, hi) = Self::BRIGHTNESS_RANGE;
        self.brightness = clamp_finite(brightness, lo, hi, self.brightness);
    }

    pub fn set_contrast(&mut self, contrast: f64) {
        let (lo, hi) = Self::CONTRAST_RANGE;
        self.contrast = clamp_finite(contrast, lo, hi, self.contrast);
    }

    /// Set the shadow blur together with the color it is drawn in.
    pub fn set_shadow(&mut self, blur: f64, color: Color) {
        self.shadow = Shadow {
            blur: clamp_finite(blur, 0.0, f64::MAX, self.shadow.blur),
            color,
        };
    }

    pub fn set_shadow_color(&mut self, color: Color) {
        self.shadow.color = color;
    }

    /// Set the border width and the color it is painted with.
    pub fn set_stroke(&mut self, width: f64, color: Color) {
        let width = clamp_finite(width, 0.0, f64::MAX, 0.0);
        self.stroke = (width > 0.0).then_some(Stroke { width, color });
    }

    /// Recolor an existing stroke. Without one there is nothing to paint.
    pub fn set_stroke_color(&mut self, color: Color) {
        if let Some(stroke) = &mut self.stroke {
            stroke.color = color;
        }
    }
}

fn clamp_finite(value: f64, lo: f64, hi: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value.clamp(lo, hi)
    } else {
        fallback
    }
}

// ─── Kinds & geometry ────────────────────────────────────────────────────

/// How a placed object is displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MediaKind {
    ImageRect,
    ShapeCircle,
    ShapeTriangle,
    Video,
}

/// The class of decoded media backing an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaClass {
    Image,
    Video,
}

impl MediaKind {
    /// Infer the display kind from a media class and display name.
    ///
    /// Images whose name mentions `Circle` or `Triangle` are shown as
    /// pattern-filled shapes; everything else keeps its rectangle.
    pub fn infer(class: MediaClass, name: &str) -> Self {
        match class {
            MediaClass::Video => MediaKind::Video,
            MediaClass::Image if name.contains("Circle") => MediaKind::ShapeCircle,
            MediaClass::Image if name.contains("Triangle") => MediaKind::ShapeTriangle,
            MediaClass::Image => MediaKind::ImageRect,
        }
    }

    /// The media class this kind can be built from.
    pub fn class(self) -> MediaClass {
        match self {
            MediaKind::Video => MediaClass::Video,
            _ => MediaClass::Image,
        }
    }
}

/// Kind-specific geometry, centred on the object's local origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Geometry {
    /// Bitmap drawn as a `width × height` rectangle at `(-w/2, -h/2)`.
    Rect { width: f64, height: f64 },
    /// Circle filled with the bitmap scaled to `pattern`.
    Circle { radius: f64, pattern: Size },
    /// Upward-pointing regular triangle inscribed in `radius`.
    Triangle { radius: f64, pattern: Size },
    /// Video frame drawn like `Rect`.
    Video { width: f64, height: f64 },
}

/// Capabilities every geometry exposes to hit testing, bounds and painting.
pub trait VisualShape {
    fn kind(&self) -> MediaKind;

    /// Axis-aligned bounds in the object's local space.
    fn local_bounds(&self) -> Rect;

    /// Closed outline in local space.
    fn outline(&self) -> BezPath;

    /// Size the backing bitmap is stretched to when drawn.
    fn content_size(&self) -> Size;

    fn contains_local(&self, p: Point) -> bool {
        self.local_bounds().contains(p) && self.outline().contains(p)
    }
}

impl Geometry {
    fn triangle_vertices(radius: f64) -> [Point; 3] {
        let half_base = radius * (3.0f64).sqrt() / 2.0;
        [
            Point::new(0.0, -radius),
            Point::new(half_base, radius / 2.0),
            Point::new(-half_base, radius / 2.0),
        ]
    }
}

impl VisualShape for Geometry {
    fn kind(&self) -> MediaKind {
        match self {
            Geometry::Rect { .. } => MediaKind::ImageRect,
            Geometry::Circle { .. } => MediaKind::ShapeCircle,
            Geometry::Triangle { .. } => MediaKind::ShapeTriangle,
            Geometry::Video { .. } => MediaKind::Video,
        }
    }

    fn local_bounds(&self) -> Rect {
        match *self {
            Geometry::Rect { width, height } | Geometry::Video { width, height } => {
                Rect::new(-width / 2.0, -height / 2.0, width / 2.0, height / 2.0)
            }
            Geometry::Circle { radius, .. } => Rect::new(-radius, -radius, radius, radius),
            Geometry::Triangle { radius, .. } => {
                let [top, right, left] = Self::triangle_vertices(radius);
                Rect::new(left.x, top.y, right.x, right.y)
            }
        }
    }

    fn outline(&self) -> BezPath {
        match *self {
            Geometry::Rect { .. } | Geometry::Video { .. } => self.local_bounds().to_path(0.1),
            Geometry::Circle { radius, .. } => Circle::new(Point::ZERO, radius).to_path(0.1),
            Geometry::Triangle { radius, .. } => {
                let [a, b, c] = Self::triangle_vertices(radius);
                let mut path = BezPath::new();
                path.move_to(a);
                path.line_to(b);
                path.line_to(c);
                path.close_path();
                path
            }
        }
    }

    fn content_size(&self) -> Size {
        match *self {
            Geometry::Rect { width, height } | Geometry::Video { width, height } => {
                Size::new(width, height)
            }
            Geometry::Circle { pattern, .. } | Geometry::Triangle { pattern, .. } => pattern,
        }
    }

    fn contains_local(&self, p: Point) -> bool {
        match *self {
            Geometry::Rect { .. } | Geometry::Video { .. } => self.local_bounds().contains(p),
            Geometry::Circle { radius, .. } => p.to_vec2().hypot2() <= radius * radius,
            Geometry::Triangle { .. } => {
                self.local_bounds().contains(p) && self.outline().contains(p)
            }
        }
    }
}

/// Resize/rotate applied through the transform handle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObjectTransform {
    pub scale_x: f64,
    pub scale_y: f64,
    pub rotation_deg: f64,
}

impl ObjectTransform {
    pub const MIN_SCALE: f64 = 0.01;

    /// Local → content affine for an object anchored at `position`.
    pub fn affine(&self, position: Point) -> Affine {
        Affine::translate(position.to_vec2())
            * Affine::rotate(self.rotation_deg.to_radians())
            * Affine::scale_non_uniform(self.scale_x, self.scale_y)
    }
}

impl Default for ObjectTransform {
    fn default() -> Self {
        Self {
            scale_x: 1.0,
            scale_y: 1.0,
            rotation_deg: 0.0,
        }
    }
}

// ─── Media resources ─────────────────────────────────────────────────────

/// A decoded, straight-alpha RGBA8 bitmap. Cloning shares the pixels.
#[derive(Clone, PartialEq)]
pub struct Bitmap {
    pub width: u32,
    pub height: u32,
    pixels: Arc<Vec<u8>>,
}

impl Bitmap {
    /// Wrap RGBA pixels. Returns `None` when the buffer size does not match.
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> Option<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)?
            .checked_mul(4)?;
        (pixels.len() == expected && width > 0 && height > 0).then(|| Self {
            width,
            height,
            pixels: Arc::new(pixels),
        })
    }

    /// A bitmap filled with one color.
    pub fn solid(width: u32, height: u32, color: Color) -> Option<Self> {
        let px = color.to_rgba8();
        let count = (width as usize).checked_mul(height as usize)?;
        Self::from_rgba(width, height, px.repeat(count))
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// True when both bitmaps share the same pixel storage.
    pub fn shares_pixels(&self, other: &Bitmap) -> bool {
        Arc::ptr_eq(&self.pixels, &other.pixels)
    }
}

impl fmt::Debug for Bitmap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bitmap({}×{})", self.width, self.height)
    }
}

/// Host-side playback control for a video resource.
pub trait Playback: fmt::Debug {
    fn play(&mut self);
    fn pause(&mut self);
    fn is_playing(&self) -> bool;
    /// Stop playback and detach the backing resource. Idempotent.
    fn release(&mut self);

    /// The frame the decoder is showing now. Backends that cannot hand
    /// out frames keep the poster on screen.
    fn current_frame(&self) -> Option<Bitmap> {
        None
    }
}

/// Video backing: a poster frame, the last pulled frame and an optional
/// playback handle.
#[derive(Debug)]
pub struct VideoSource {
    pub poster: Option<Bitmap>,
    current: Option<Bitmap>,
    playback: Option<Box<dyn Playback>>,
}

impl VideoSource {
    pub fn new(poster: Option<Bitmap>, playback: Option<Box<dyn Playback>>) -> Self {
        Self {
            poster,
            current: None,
            playback,
        }
    }

    /// The frame on screen: the last pulled frame, else the poster.
    pub fn frame(&self) -> Option<&Bitmap> {
        self.current.as_ref().or(self.poster.as_ref())
    }

    /// Pull the playback's current frame. Returns true when it replaced
    /// the one on screen.
    pub fn refresh_frame(&mut self) -> bool {
        let Some(frame) = self.playback.as_ref().and_then(|p| p.current_frame()) else {
            return false;
        };
        if self.current.as_ref().is_some_and(|c| c.shares_pixels(&frame)) {
            return false;
        }
        self.current = Some(frame);
        true
    }

    pub fn is_playing(&self) -> bool {
        self.playback.as_ref().is_some_and(|p| p.is_playing())
    }

    pub fn has_playback(&self) -> bool {
        self.playback.is_some()
    }

    /// Start playback. Returns false when there is nothing to play.
    pub fn play(&mut self) -> bool {
        match &mut self.playback {
            Some(p) => {
                p.play();
                true
            }
            None => false,
        }
    }

    pub fn pause(&mut self) {
        if let Some(p) = &mut self.playback {
            p.pause();
        }
    }

    /// Stop and drop the playback handle.
    pub fn release(&mut self) {
        if let Some(mut p) = self.playback.take() {
            p.release();
        }
    }

    /// Copy frozen on the frame on screen, owning no playback.
    pub fn frozen_copy(&self) -> Self {
        Self {
            poster: self.frame().cloned(),
            current: None,
            playback: None,
        }
    }
}

/// Decoded media held by an object.
#[derive(Debug)]
pub enum MediaSource {
    Image(Bitmap),
    Video(VideoSource),
}

impl MediaSource {
    pub fn class(&self) -> MediaClass {
        match self {
            MediaSource::Image(_) => MediaClass::Image,
            MediaSource::Video(_) => MediaClass::Video,
        }
    }

    /// The still frame a renderer should draw, if any.
    pub fn frame(&self) -> Option<&Bitmap> {
        match self {
            MediaSource::Image(bitmap) => Some(bitmap),
            MediaSource::Video(video) => video.frame(),
        }
    }

    pub fn video(&self) -> Option<&VideoSource> {
        match self {
            MediaSource::Video(v) => Some(v),
            MediaSource::Image(_) => None,
        }
    }

    pub fn video_mut(&mut self) -> Option<&mut VideoSource> {
        match self {
            MediaSource::Video(v) => Some(v),
            MediaSource::Image(_) => None,
        }
    }

    /// Share the media with a duplicate. Videos come back frozen.
    pub fn share(&self) -> Self {
        match self {
            MediaSource::Image(bitmap) => MediaSource::Image(bitmap.clone()),
            MediaSource::Video(video) => MediaSource::Video(video.frozen_copy()),
        }
    }

    /// Release any playback resource held.
    pub fn release(&mut self) {
        if let MediaSource::Video(video) = self {
            video.release();
        }
    }
}

// ─── Media objects ───────────────────────────────────────────────────────

/// An object ready to be placed; the scene graph assigns its id.
#[derive(Debug)]
pub struct MediaDraft {
    pub name: String,
    pub geometry: Geometry,
    pub position: Point,
    pub transform: ObjectTransform,
    pub style: Style,
    pub locked: bool,
    pub source: MediaSource,
}

/// A placed, styleable unit of canvas content.
#[derive(Debug)]
pub struct MediaObject {
    pub id: ObjectId,
    pub name: String,
    pub geometry: Geometry,
    /// Visual centre in content space.
    pub position: Point,
    pub transform: ObjectTransform,
    pub style: Style,
    /// Locked objects cannot be dragged or transformed.
    pub locked: bool,
    pub source: MediaSource,
}

impl MediaObject {
    pub fn from_draft(id: ObjectId, draft: MediaDraft) -> Self {
        Self {
            id,
            name: draft.name,
            geometry: draft.geometry,
            position: draft.position,
            transform: draft.transform,
            style: draft.style,
            locked: draft.locked,
            source: draft.source,
        }
    }

    pub fn kind(&self) -> MediaKind {
        self.geometry.kind()
    }

    /// Local → content affine.
    pub fn affine(&self) -> Affine {
        self.transform.affine(self.position)
    }

    /// Axis-aligned bounds in content space.
    pub fn bounds(&self) -> Rect {
        self.affine().transform_rect_bbox(self.geometry.local_bounds())
    }

    /// True when the content-space point lies on the object's shape.
    pub fn contains(&self, p: Point) -> bool {
        let local = self.affine().inverse() * p;
        self.geometry.contains_local(local)
    }

    /// Draft of a copy offset by `offset`, sharing this object's media.
    /// The copy keeps the lock state.
    pub fn duplicate_draft(&self, offset: kurbo::Vec2) -> MediaDraft {
        MediaDraft {
            name: self.name.clone(),
            geometry: self.geometry,
            position: self.position + offset,
            transform: self.transform,
            style: self.style.clone(),
            locked: self.locked,
            source: self.source.share(),
        }
    }
}
