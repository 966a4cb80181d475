//! Network replication seam.
//!
//! The replication layer establishes and revokes network visibility for
//! objects. It is assumed non-diffing: after a server-side transform change
//! the caller must unspawn and respawn to force remote observers to re-fetch
//! the authoritative transform.

use super::scene::ObjectHandle;

pub trait Replication {
    fn spawn(&mut self, object: ObjectHandle);
    fn unspawn(&mut self, object: ObjectHandle);
}

/// Replication sink that drops everything; useful for offline assembly
pub struct NullReplication;

impl Replication for NullReplication {
    fn spawn(&mut self, _object: ObjectHandle) {}
    fn unspawn(&mut self, _object: ObjectHandle) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplicationEvent {
    Spawn(ObjectHandle),
    Unspawn(ObjectHandle),
}

/// Replication sink that records every call, for tests and diagnostics
#[derive(Default)]
pub struct RecordingReplication {
    pub events: Vec<ReplicationEvent>,
}

impl RecordingReplication {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the object's latest event leaves it network-visible
    pub fn is_spawned(&self, object: ObjectHandle) -> bool {
        self.events
            .iter()
            .rev()
            .find_map(|e| match e {
                ReplicationEvent::Spawn(h) if *h == object => Some(true),
                ReplicationEvent::Unspawn(h) if *h == object => Some(false),
                _ => None,
            })
            .unwrap_or(false)
    }

    pub fn spawn_count(&self, object: ObjectHandle) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, ReplicationEvent::Spawn(h) if *h == object))
            .count()
    }
}

impl Replication for RecordingReplication {
    fn spawn(&mut self, object: ObjectHandle) {
        self.events.push(ReplicationEvent::Spawn(object));
    }

    fn unspawn(&mut self, object: ObjectHandle) {
        self.events.push(ReplicationEvent::Unspawn(object));
    }
}
