//! Retained draw tree mirrored from the scene graph.
//!
//! One `DrawNode` per media object, in paint order, plus the transform
//! handle. The handle sits at a z-position among the nodes: nodes mounted
//! after it paint over it until it is raised again.

use crate::filter::FilterSet;
use collage_core::{
    Bitmap, CanvasSize, Geometry, MediaObject, ObjectId, Shadow, Stroke, ViewTransform, VisualShape,
};
use kurbo::{Affine, Rect};
use std::collections::HashSet;

#[derive(Debug, Clone)]
pub struct DrawNode {
    pub id: ObjectId,
    pub name: String,
    pub geometry: Geometry,
    /// Local → content.
    pub affine: Affine,
    pub opacity: f64,
    pub shadow: Shadow,
    pub stroke: Option<Stroke>,
    pub draggable: bool,
    pub is_video: bool,
    pub playing: bool,
    /// Source frame (image bitmap, or the video frame on screen).
    pub frame: Option<Bitmap>,
    pub filters: FilterSet,
    /// Filtered copy of `frame`, present while filters are active.
    pub cached: Option<Bitmap>,
}

impl DrawNode {
    pub fn from_object(object: &MediaObject) -> Self {
        let mut node = Self {
            id: object.id,
            name: object.id.node_name(),
            geometry: object.geometry,
            affine: Affine::IDENTITY,
            opacity: 1.0,
            shadow: Shadow::default(),
            stroke: None,
            draggable: !object.locked,
            is_video: object.source.video().is_some(),
            playing: false,
            frame: None,
            filters: FilterSet::default(),
            cached: None,
        };
        node.sync(object);
        node.set_filters(FilterSet {
            brightness: object.style.brightness(),
            contrast: object.style.contrast(),
        });
        node
    }

    /// Copy placement, paint and frame from the object. A new frame is
    /// re-filtered with the current filters; filter changes themselves
    /// arrive through `set_filters`.
    pub fn sync(&mut self, object: &MediaObject) {
        self.geometry = object.geometry;
        self.affine = object.affine();
        self.opacity = object.style.opacity();
        self.shadow = object.style.shadow();
        self.stroke = object.style.stroke();
        self.draggable = !object.locked;
        self.playing = object.source.video().is_some_and(|v| v.is_playing());

        let frame = object.source.frame().cloned();
        let frame_changed = match (&self.frame, &frame) {
            (Some(a), Some(b)) => !a.shares_pixels(b),
            (None, None) => false,
            _ => true,
        };
        self.frame = frame;
        if frame_changed {
            self.set_filters(self.filters);
        }
    }

    /// Re-filter the cached raster.
    pub fn set_filters(&mut self, filters: FilterSet) {
        self.filters = filters;
        self.cached = match (&self.frame, filters.is_identity()) {
            (Some(frame), false) => Some(filters.apply(frame)),
            _ => None,
        };
    }

    /// The raster to paint: filtered cache when present.
    pub fn raster(&self) -> Option<&Bitmap> {
        self.cached.as_ref().or(self.frame.as_ref())
    }

    pub fn content_bounds(&self) -> Rect {
        self.affine.transform_rect_bbox(self.geometry.local_bounds())
    }
}

/// Selection overlay exposing resize/rotate affordances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransformHandle {
    pub target: Option<ObjectId>,
    pub visible: bool,
    /// Paint position among the nodes (`0` = below every node).
    pub z: usize,
}

#[derive(Debug, Clone)]
pub struct DrawTree {
    pub nodes: Vec<DrawNode>,
    pub handle: TransformHandle,
    pub overlays_visible: bool,
    pub frame_loops: HashSet<ObjectId>,
    pub view: ViewTransform,
    pub size: CanvasSize,
}

impl DrawTree {
    pub fn new(size: CanvasSize) -> Self {
        Self {
            nodes: Vec::new(),
            handle: TransformHandle {
                target: None,
                visible: true,
                z: 0,
            },
            overlays_visible: true,
            frame_loops: HashSet::new(),
            view: ViewTransform::IDENTITY,
            size,
        }
    }

    pub fn position(&self, id: ObjectId) -> Option<usize> {
        self.nodes.iter().position(|n| n.id == id)
    }

    pub fn node(&self, id: ObjectId) -> Option<&DrawNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn node_mut(&mut self, id: ObjectId) -> Option<&mut DrawNode> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    /// Add a node on top of everything already mounted.
    pub fn push(&mut self, node: DrawNode) {
        if let Some(existing) = self.node_mut(node.id) {
            *existing = node;
            return;
        }
        self.nodes.push(node);
    }

    pub fn remove(&mut self, id: ObjectId) -> Option<DrawNode> {
        let idx = self.position(id)?;
        if self.handle.z > idx {
            self.handle.z -= 1;
        }
        if self.handle.target == Some(id) {
            self.handle.target = None;
        }
        self.frame_loops.remove(&id);
        Some(self.nodes.remove(idx))
    }

    /// Remove every node. The handle node itself survives, detached.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.frame_loops.clear();
        self.handle.target = None;
        self.handle.z = 0;
    }

    /// Reorder nodes to match `order`. Ids not mounted are ignored and
    /// mounted ids missing from `order` keep their relative order on top.
    pub fn reorder(&mut self, order: &[ObjectId]) {
        let mut remaining = std::mem::take(&mut self.nodes);
        let mut sorted = Vec::with_capacity(remaining.len());
        for id in order {
            if let Some(idx) = remaining.iter().position(|n| n.id == *id) {
                sorted.push(remaining.remove(idx));
            }
        }
        sorted.append(&mut remaining);
        self.nodes = sorted;
    }

    pub fn raise_handle(&mut self) {
        self.handle.z = self.nodes.len();
    }

    /// True when nothing paints above the handle.
    pub fn handle_on_top(&self) -> bool {
        self.handle.z >= self.nodes.len()
    }

    /// Union of node bounds in content space.
    pub fn content_bounds(&self) -> Option<Rect> {
        self.nodes
            .iter()
            .map(DrawNode::content_bounds)
            .reduce(|a, b| a.union(b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use collage_core::*;
    use pretty_assertions::assert_eq;

    fn mounted(sg: &mut SceneGraph, tree: &mut DrawTree, x: f64) -> ObjectId {
        let draft = MediaObjectFactory::default()
            .build(
                MediaDescriptor::image("img", Bitmap::solid(20, 10, Color::WHITE).unwrap()),
                None,
                Point::new(x, 0.0),
            )
            .unwrap();
        let id = sg.add(draft);
        tree.push(DrawNode::from_object(sg.get(id).unwrap()));
        id
    }

    #[test]
    fn mounting_buries_the_handle() {
        let mut sg = SceneGraph::new();
        let mut tree = DrawTree::new(CanvasSize::default());
        let a = mounted(&mut sg, &mut tree, 0.0);
        tree.handle.target = Some(a);
        tree.raise_handle();
        assert!(tree.handle_on_top());

        mounted(&mut sg, &mut tree, 50.0);
        assert!(!tree.handle_on_top());
        tree.raise_handle();
        assert!(tree.handle_on_top());

        tree.remove(a);
        assert_eq!(tree.handle.target, None);
        assert!(tree.handle_on_top());
    }

    #[test]
    fn reorder_matches_scene() {
        let mut sg = SceneGraph::new();
        let mut tree = DrawTree::new(CanvasSize::default());
        let a = mounted(&mut sg, &mut tree, 0.0);
        let b = mounted(&mut sg, &mut tree, 10.0);
        sg.move_down(b);
        tree.reorder(&sg.ordered_ids());
        let ids: Vec<_> = tree.nodes.iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![b, a]);
    }

    #[test]
    fn filters_cache_raster() {
        let mut sg = SceneGraph::new();
        let mut tree = DrawTree::new(CanvasSize::default());
        let a = mounted(&mut sg, &mut tree, 0.0);
        assert!(tree.node(a).unwrap().cached.is_none());

        tree.node_mut(a).unwrap().set_filters(FilterSet {
            brightness: -1.0,
            contrast: 0.0,
        });
        let node = tree.node(a).unwrap();
        assert_eq!(&node.raster().unwrap().pixels()[..4], &[0u8, 0, 0, 255]);

        // a resync keeps the cache while the frame is unchanged
        tree.node_mut(a).unwrap().sync(sg.get(a).unwrap());
        assert!(tree.node(a).unwrap().cached.is_some());

        tree.node_mut(a).unwrap().set_filters(FilterSet::default());
        assert!(tree.node(a).unwrap().cached.is_none());
    }
}
