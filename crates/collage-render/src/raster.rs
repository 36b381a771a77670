//! CPU reference engine.
//!
//! Keeps a `DrawTree` in sync with the editor, rasterizes it with
//! tiny-skia and encodes snapshots with the `image` crate.

use crate::engine::*;
use crate::filter::FilterSet;
use crate::hit::hit_test;
use crate::paint::paint_tree;
use crate::tree::{DrawNode, DrawTree};
use collage_core::{CanvasSize, MediaObject, ObjectId, ViewTransform};
use image::codecs::jpeg::JpegEncoder;
use kurbo::{Affine, Point, Rect};
use std::io::Cursor;
use tiny_skia::Pixmap;

#[derive(Debug, Clone)]
pub struct CpuEngine {
    tree: DrawTree,
    redraws: u64,
}

impl CpuEngine {
    pub fn new(size: CanvasSize) -> Self {
        Self {
            tree: DrawTree::new(size),
            redraws: 0,
        }
    }

    pub fn tree(&self) -> &DrawTree {
        &self.tree
    }

    /// Number of redraw requests received.
    pub fn redraw_count(&self) -> u64 {
        self.redraws
    }

    /// Rasterize the current tree at `pixel_ratio`.
    pub fn render(&self, pixel_ratio: f64) -> Result<Pixmap, RenderError> {
        let width = (self.tree.size.width * pixel_ratio).round().max(0.0) as u32;
        let height = (self.tree.size.height * pixel_ratio).round().max(0.0) as u32;
        let mut pixmap = Pixmap::new(width, height).ok_or(RenderError::Surface { width, height })?;
        paint_tree(&mut pixmap, &self.tree, Affine::scale(pixel_ratio));
        Ok(pixmap)
    }
}

impl RenderEngine for CpuEngine {
    fn mount(&mut self, object: &MediaObject) {
        log::trace!("mount {}", object.id.node_name());
        self.tree.push(DrawNode::from_object(object));
    }

    fn sync(&mut self, object: &MediaObject) {
        if let Some(node) = self.tree.node_mut(object.id) {
            node.sync(object);
        }
    }

    fn unmount(&mut self, id: ObjectId) {
        self.tree.remove(id);
    }

    fn unmount_all(&mut self) {
        self.tree.clear();
    }

    fn reorder(&mut self, order: &[ObjectId]) {
        self.tree.reorder(order);
    }

    fn set_draggable(&mut self, id: ObjectId, draggable: bool) {
        if let Some(node) = self.tree.node_mut(id) {
            node.draggable = draggable;
        }
    }

    fn attach_handle(&mut self, target: Option<ObjectId>) {
        self.tree.handle.target = target.filter(|id| self.tree.node(*id).is_some());
    }

    fn raise_handle(&mut self) {
        self.tree.raise_handle();
    }

    fn set_handle_visible(&mut self, visible: bool) {
        self.tree.handle.visible = visible;
    }

    fn set_overlays_visible(&mut self, visible: bool) {
        self.tree.overlays_visible = visible;
    }

    fn set_view(&mut self, view: ViewTransform) {
        self.tree.view = view;
    }

    fn resize(&mut self, size: CanvasSize) {
        self.tree.size = size;
    }

    fn hit_test(&self, screen: Point) -> Option<ObjectId> {
        hit_test(&self.tree, screen)
    }

    fn bounding_box(&self, target: Option<ObjectId>, space: CoordSpace) -> Option<Rect> {
        let content = match target {
            Some(id) => self.tree.node(id).map(DrawNode::content_bounds),
            None => self.tree.content_bounds(),
        }?;
        Some(match space {
            CoordSpace::Content => content,
            CoordSpace::Screen => self.tree.view.affine().transform_rect_bbox(content),
        })
    }

    fn apply_filters(&mut self, id: ObjectId, filters: FilterSet) {
        if let Some(node) = self.tree.node_mut(id) {
            node.set_filters(filters);
        }
    }

    fn start_frame_loop(&mut self, id: ObjectId) {
        if self.tree.node(id).is_some() {
            self.tree.frame_loops.insert(id);
        }
    }

    fn stop_frame_loop(&mut self, id: ObjectId) {
        self.tree.frame_loops.remove(&id);
    }

    fn frame_loop_active(&self, id: ObjectId) -> bool {
        self.tree.frame_loops.contains(&id)
    }

    fn snapshot(&mut self, request: &SnapshotRequest) -> Result<EncodedImage, RenderError> {
        let mut pixmap = self.render(request.pixel_ratio)?;
        if request.format == SnapshotFormat::Jpeg {
            // no alpha in JPEG: composite over white
            let mut backdrop = Pixmap::new(pixmap.width(), pixmap.height()).ok_or(
                RenderError::Surface {
                    width: pixmap.width(),
                    height: pixmap.height(),
                },
            )?;
            backdrop.fill(tiny_skia::Color::WHITE);
            backdrop.draw_pixmap(
                0,
                0,
                pixmap.as_ref(),
                &tiny_skia::PixmapPaint::default(),
                tiny_skia::Transform::identity(),
                None,
            );
            pixmap = backdrop;
        }
        let bytes = encode(&pixmap, request)?;
        Ok(EncodedImage {
            format: request.format,
            width: pixmap.width(),
            height: pixmap.height(),
            bytes,
        })
    }

    fn request_redraw(&mut self) {
        self.redraws += 1;
    }
}

/// Encode a premultiplied pixmap as PNG or JPEG.
pub fn encode(pixmap: &Pixmap, request: &SnapshotRequest) -> Result<Vec<u8>, RenderError> {
    let mut rgba = Vec::with_capacity(pixmap.data().len());
    for px in pixmap.pixels() {
        let c = px.demultiply();
        rgba.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
    }
    let img = image::RgbaImage::from_raw(pixmap.width(), pixmap.height(), rgba)
        .ok_or_else(|| RenderError::Encode("pixel buffer size mismatch".into()))?;

    let mut bytes = Vec::new();
    match request.format {
        SnapshotFormat::Png => image::DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .map_err(|e| RenderError::Encode(e.to_string()))?,
        SnapshotFormat::Jpeg => {
            let rgb = image::DynamicImage::ImageRgba8(img).to_rgb8();
            let quality = (request.quality.clamp(0.0, 1.0) * 100.0).round().max(1.0) as u8;
            JpegEncoder::new_with_quality(&mut bytes, quality)
                .encode_image(&rgb)
                .map_err(|e| RenderError::Encode(e.to_string()))?;
        }
    }
    Ok(bytes)
}
