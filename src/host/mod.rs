//! Host-engine collaborators: object arena, replication and deferred scheduling

pub mod components;
pub mod prefab;
pub mod replication;
pub mod scene;
pub mod scheduler;

pub use prefab::PrefabKind;
pub use replication::{NullReplication, RecordingReplication, Replication};
pub use scene::{ObjectHandle, Scene};
pub use scheduler::Scheduler;
