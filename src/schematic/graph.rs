//! Frozen identity map of an assembled schematic.
//!
//! The graph is built once during assembly and never mutated afterwards;
//! resync reads it but cannot insert or remove entries. Objects are keyed by
//! their serialized block id, never by handle identity, so a resync replay
//! always resolves the same objects.

use ahash::AHashMap;

use crate::host::scene::ObjectHandle;

pub struct SchematicGraph {
    name: String,
    root: ObjectHandle,
    object_from_id: AHashMap<i32, ObjectHandle>,
}

impl SchematicGraph {
    pub(crate) fn new(
        name: &str,
        root: ObjectHandle,
        object_from_id: AHashMap<i32, ObjectHandle>,
    ) -> Self {
        Self {
            name: name.to_string(),
            root,
            object_from_id,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root(&self) -> ObjectHandle {
        self.root
    }

    /// Resolve a block id to its materialized object
    pub fn object(&self, id: i32) -> Option<ObjectHandle> {
        self.object_from_id.get(&id).copied()
    }

    pub fn contains_id(&self, id: i32) -> bool {
        self.object_from_id.contains_key(&id)
    }

    pub fn ids(&self) -> impl Iterator<Item = i32> + '_ {
        self.object_from_id.keys().copied()
    }

    pub fn objects(&self) -> impl Iterator<Item = ObjectHandle> + '_ {
        self.object_from_id.values().copied()
    }

    pub fn len(&self) -> usize {
        self.object_from_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.object_from_id.is_empty()
    }
}
