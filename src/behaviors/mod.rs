//! Runtime behaviors of materialized objects, driven by host interaction
//! events after assembly completes.

pub mod spawnpoint;
pub mod teleport;

pub use spawnpoint::{eligible_spawn_points, random_spawn_position};
pub use teleport::{trigger_teleport, TeleportDestination};
