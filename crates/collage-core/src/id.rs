use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a placed media object.
///
/// Ids are handed out by [`IdGenerator`] and are never reused, even after
/// the object they named has been deleted.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(u64);

impl ObjectId {
    /// Raw counter value.
    pub fn get(self) -> u64 {
        self.0
    }

    /// Name used for the object's node in the draw tree (`media-group-3`).
    pub fn node_name(self) -> String {
        format!("media-group-{}", self.0)
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Monotonic id counter owned by the scene graph.
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    issued: u64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue the next id. The first id issued is `#1`.
    pub fn next_id(&mut self) -> ObjectId {
        self.issued += 1;
        ObjectId(self.issued)
    }

    /// How many ids have been issued so far.
    pub fn issued(&self) -> u64 {
        self.issued
    }
}
