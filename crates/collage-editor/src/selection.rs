//! Single-object selection and the transform handle.
//!
//! The controller holds a non-owning id into the scene graph. Every
//! operation that removes or reorders objects goes through here so the
//! reference and the handle never outlive or lag the object they track.

use collage_core::{ObjectId, SceneGraph, Vec2};
use collage_render::RenderEngine;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectionController {
    active: Option<ObjectId>,
}

impl SelectionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> Option<ObjectId> {
        self.active
    }

    /// Make `id` the active object. The handle attaches only while the
    /// object is unlocked.
    pub fn select(
        &mut self,
        scene: &SceneGraph,
        engine: &mut dyn RenderEngine,
        id: ObjectId,
    ) -> bool {
        let Some(object) = scene.get(id) else {
            return false;
        };
        self.active = Some(id);
        engine.attach_handle((!object.locked).then_some(id));
        engine.raise_handle();
        engine.request_redraw();
        log::debug!("selected {id}");
        true
    }

    pub fn deselect_all(&mut self, engine: &mut dyn RenderEngine) {
        if let Some(id) = self.active.take() {
            log::debug!("deselected {id}");
        }
        engine.attach_handle(None);
        engine.request_redraw();
    }

    /// Delete the active object, releasing its media first.
    pub fn delete(
        &mut self,
        scene: &mut SceneGraph,
        engine: &mut dyn RenderEngine,
    ) -> Option<ObjectId> {
        let id = self.active?;
        let object = scene.get_mut(id)?;
        engine.stop_frame_loop(id);
        object.source.release();

        self.deselect_all(engine);
        engine.unmount(id);
        scene.remove(id);
        log::debug!("deleted {id}, {} objects left", scene.len());
        engine.request_redraw();
        Some(id)
    }

    /// Clone the active object one z-step above it, offset diagonally,
    /// and select the clone.
    pub fn duplicate(
        &mut self,
        scene: &mut SceneGraph,
        engine: &mut dyn RenderEngine,
        offset: f64,
    ) -> Option<ObjectId> {
        let original = self.active?;
        let draft = scene
            .get(original)?
            .duplicate_draft(Vec2::new(offset, offset));
        let clone = scene.insert_above(original, draft);
        if let Some(object) = scene.get(clone) {
            engine.mount(object);
        }
        engine.reorder(&scene.ordered_ids());
        log::debug!("duplicated {original} as {clone}");
        self.select(scene, engine, clone);
        Some(clone)
    }

    /// Flip the lock flag of the active object. Returns the new state.
    pub fn toggle_lock(
        &mut self,
        scene: &mut SceneGraph,
        engine: &mut dyn RenderEngine,
    ) -> Option<bool> {
        let id = self.active?;
        let object = scene.get_mut(id)?;
        object.locked = !object.locked;
        let locked = object.locked;
        engine.set_draggable(id, !locked);
        engine.sync(object);
        if locked {
            engine.attach_handle(None);
        } else {
            engine.attach_handle(Some(id));
            engine.raise_handle();
        }
        engine.request_redraw();
        log::debug!("{id} {}", if locked { "locked" } else { "unlocked" });
        Some(locked)
    }

    pub fn move_up(&mut self, scene: &mut SceneGraph, engine: &mut dyn RenderEngine) -> bool {
        self.restack(scene, engine, SceneGraph::move_up)
    }

    pub fn move_down(&mut self, scene: &mut SceneGraph, engine: &mut dyn RenderEngine) -> bool {
        self.restack(scene, engine, SceneGraph::move_down)
    }

    fn restack(
        &mut self,
        scene: &mut SceneGraph,
        engine: &mut dyn RenderEngine,
        step: fn(&mut SceneGraph, ObjectId) -> bool,
    ) -> bool {
        let Some(id) = self.active else {
            return false;
        };
        let moved = step(scene, id);
        if moved {
            engine.reorder(&scene.ordered_ids());
            log::debug!("restacked {id} to {:?}", scene.index_of(id));
        }
        // keep the handle on the still-selected object
        self.select(scene, engine, id);
        moved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use collage_core::*;
    use collage_render::{CpuEngine, RenderEngine};
    use pretty_assertions::assert_eq;

    fn setup(n: usize) -> (SceneGraph, CpuEngine, Vec<ObjectId>) {
        let mut scene = SceneGraph::new();
        let mut engine = CpuEngine::new(CanvasSize::default());
        let ids = (0..n)
            .map(|i| {
                let bitmap = Bitmap::solid(10, 10, Color::WHITE).unwrap();
                let draft = MediaObjectFactory::default()
                    .build(
                        MediaDescriptor::image(format!("img{i}"), bitmap),
                        None,
                        Point::new(50.0 * i as f64, 50.0),
                    )
                    .unwrap();
                let id = scene.add(draft);
                engine.mount(scene.get(id).unwrap());
                id
            })
            .collect();
        (scene, engine, ids)
    }

    #[test]
    fn select_raises_handle() {
        let (mut scene, mut engine, ids) = setup(2);
        let mut sel = SelectionController::new();
        assert!(sel.select(&scene, &mut engine, ids[0]));
        assert_eq!(engine.tree().handle.target, Some(ids[0]));
        assert!(engine.tree().handle_on_top());

        scene.remove(ids[1]);
        assert!(!sel.select(&scene, &mut engine, ids[1]));
        assert_eq!(sel.active(), Some(ids[0]));
    }

    #[test]
    fn delete_without_selection_is_noop() {
        let (mut scene, mut engine, _) = setup(2);
        let mut sel = SelectionController::new();
        assert_eq!(sel.delete(&mut scene, &mut engine), None);
        assert_eq!(scene.len(), 2);
    }

    #[test]
    fn locked_selection_detaches_handle() {
        let (mut scene, mut engine, ids) = setup(1);
        let mut sel = SelectionController::new();
        sel.select(&scene, &mut engine, ids[0]);
        assert_eq!(sel.toggle_lock(&mut scene, &mut engine), Some(true));
        assert_eq!(engine.tree().handle.target, None);
        assert!(!engine.tree().node(ids[0]).unwrap().draggable);
        // still selected for styling
        assert_eq!(sel.active(), Some(ids[0]));

        assert_eq!(sel.toggle_lock(&mut scene, &mut engine), Some(false));
        assert_eq!(engine.tree().handle.target, Some(ids[0]));
    }

    #[test]
    fn restack_keeps_handle_on_top() {
        let (mut scene, mut engine, ids) = setup(3);
        let mut sel = SelectionController::new();
        sel.select(&scene, &mut engine, ids[0]);
        assert!(sel.move_up(&mut scene, &mut engine));
        assert_eq!(scene.ordered_ids(), vec![ids[1], ids[0], ids[2]]);
        let tree_order: Vec<_> = engine.tree().nodes.iter().map(|n| n.id).collect();
        assert_eq!(tree_order, scene.ordered_ids());
        assert!(engine.tree().handle_on_top());
        assert_eq!(engine.tree().handle.target, Some(ids[0]));

        assert!(sel.move_down(&mut scene, &mut engine));
        assert!(!sel.move_down(&mut scene, &mut engine));
        assert_eq!(scene.ordered_ids(), ids);
    }
}
