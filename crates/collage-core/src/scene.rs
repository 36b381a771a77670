//! The ordered scene graph.
//!
//! Objects are kept in a flat sequence whose index is the z-order: the
//! first object is painted first (bottom), the last is topmost. The graph
//! also owns id assignment so ids stay unique for its whole lifetime.

use crate::id::{IdGenerator, ObjectId};
use crate::model::{MediaDraft, MediaObject};

#[derive(Debug, Default)]
pub struct SceneGraph {
    objects: Vec<MediaObject>,
    ids: IdGenerator,
}

impl SceneGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append on top of the z-order. Returns the new id.
    pub fn add(&mut self, draft: MediaDraft) -> ObjectId {
        let id = self.ids.next_id();
        self.objects.push(MediaObject::from_draft(id, draft));
        log::debug!("scene: added {id} at z={}", self.objects.len() - 1);
        id
    }

    /// Insert directly above `anchor`. Falls back to the top when the
    /// anchor is not in the graph.
    pub fn insert_above(&mut self, anchor: ObjectId, draft: MediaDraft) -> ObjectId {
        let id = self.ids.next_id();
        let at = self
            .index_of(anchor)
            .map_or(self.objects.len(), |idx| idx + 1);
        self.objects.insert(at, MediaObject::from_draft(id, draft));
        log::debug!("scene: inserted {id} above {anchor} at z={at}");
        id
    }

    /// Remove an object. Absent ids are a no-op.
    pub fn remove(&mut self, id: ObjectId) -> Option<MediaObject> {
        let idx = self.index_of(id)?;
        log::debug!("scene: removed {id} from z={idx}");
        Some(self.objects.remove(idx))
    }

    /// Remove everything, handing back the removed objects bottom-first.
    pub fn clear(&mut self) -> Vec<MediaObject> {
        log::debug!("scene: cleared {} objects", self.objects.len());
        std::mem::take(&mut self.objects)
    }

    /// Swap with the neighbor above. Returns true if the z-order changed.
    pub fn move_up(&mut self, id: ObjectId) -> bool {
        match self.index_of(id) {
            Some(idx) if idx + 1 < self.objects.len() => {
                self.objects.swap(idx, idx + 1);
                true
            }
            _ => false, // absent or already on top
        }
    }

    /// Swap with the neighbor below. Returns true if the z-order changed.
    pub fn move_down(&mut self, id: ObjectId) -> bool {
        match self.index_of(id) {
            Some(idx) if idx > 0 => {
                self.objects.swap(idx, idx - 1);
                true
            }
            _ => false,
        }
    }

    /// Objects in z-order, bottom first.
    pub fn ordered_objects(&self) -> &[MediaObject] {
        &self.objects
    }

    /// Ids in z-order, bottom first.
    pub fn ordered_ids(&self) -> Vec<ObjectId> {
        self.objects.iter().map(|o| o.id).collect()
    }

    pub fn get(&self, id: ObjectId) -> Option<&MediaObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut MediaObject> {
        self.objects.iter_mut().find(|o| o.id == id)
    }

    pub fn index_of(&self, id: ObjectId) -> Option<usize> {
        self.objects.iter().position(|o| o.id == id)
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.index_of(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut MediaObject> {
        self.objects.iter_mut()
    }
}
