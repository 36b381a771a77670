//! The rendering-engine boundary.
//!
//! The editor never draws pixels itself. It mirrors scene mutations into a
//! `RenderEngine`, asks it to hit-test and measure, and requests encoded
//! snapshots for export. Every mutating editor operation ends with
//! `request_redraw`.

use crate::filter::FilterSet;
use collage_core::{CanvasSize, MediaObject, ObjectId, ViewTransform};
use kurbo::{Point, Rect};

#[derive(thiserror::Error, Debug)]
pub enum RenderError {
    #[error("cannot allocate a {width}×{height} snapshot surface")]
    Surface { width: u32, height: u32 },

    #[error("snapshot encoding failed: {0}")]
    Encode(String),
}

/// Coordinate space for bounding-box queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordSpace {
    /// Untransformed scene coordinates.
    Content,
    /// Canvas pixels, after the view transform.
    Screen,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotFormat {
    Png,
    Jpeg,
}

impl SnapshotFormat {
    pub fn mime(self) -> &'static str {
        match self {
            SnapshotFormat::Png => "image/png",
            SnapshotFormat::Jpeg => "image/jpeg",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            SnapshotFormat::Png => "png",
            SnapshotFormat::Jpeg => "jpg",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapshotRequest {
    pub format: SnapshotFormat,
    /// 0.0 ..= 1.0; ignored by lossless formats.
    pub quality: f32,
    /// Output pixels per canvas pixel.
    pub pixel_ratio: f64,
}

/// An encoded bitmap produced by `RenderEngine::snapshot`.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedImage {
    pub format: SnapshotFormat,
    pub width: u32,
    pub height: u32,
    pub bytes: Vec<u8>,
}

/// What the editor consumes from a rendering/compositing engine.
pub trait RenderEngine {
    /// Create the node group for a newly placed object, on top of the tree.
    fn mount(&mut self, object: &MediaObject);

    /// Push changed placement or style of an already mounted object.
    fn sync(&mut self, object: &MediaObject);

    fn unmount(&mut self, id: ObjectId);

    /// Remove every object node, keeping the transform handle node.
    fn unmount_all(&mut self);

    /// Reorder nodes bottom-first.
    fn reorder(&mut self, order: &[ObjectId]);

    fn set_draggable(&mut self, id: ObjectId, draggable: bool);

    /// Attach the transform handle to one node, or detach it.
    fn attach_handle(&mut self, target: Option<ObjectId>);

    /// Move the handle above every node in draw order.
    fn raise_handle(&mut self);

    fn set_handle_visible(&mut self, visible: bool);

    /// Show or hide per-object runtime controls (playback toggles).
    fn set_overlays_visible(&mut self, visible: bool);

    fn set_view(&mut self, view: ViewTransform);

    fn resize(&mut self, size: CanvasSize);

    /// Topmost object under a canvas pixel.
    fn hit_test(&self, screen: Point) -> Option<ObjectId>;

    /// Bounds of one node, or of all nodes when `target` is `None`.
    fn bounding_box(&self, target: Option<ObjectId>, space: CoordSpace) -> Option<Rect>;

    /// Re-filter a node's cached raster.
    fn apply_filters(&mut self, id: ObjectId, filters: FilterSet);

    fn start_frame_loop(&mut self, id: ObjectId);

    fn stop_frame_loop(&mut self, id: ObjectId);

    fn frame_loop_active(&self, id: ObjectId) -> bool;

    /// Render the whole tree to an encoded bitmap.
    fn snapshot(&mut self, request: &SnapshotRequest) -> Result<EncodedImage, RenderError>;

    fn request_redraw(&mut self);
}
