//! Serialized block records, the declarative input of the materializer.
//!
//! Field names follow the historical serialized schema, so block lists
//! written by older tooling keep loading unchanged.

use ahash::AHashMap;
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Sentinel `parent_id` for blocks attached directly to the schematic root
pub const NO_PARENT: i32 = -1;

/// Kind tag of a serialized block.
///
/// `Unknown` captures tags written by newer tooling; the materializer
/// substitutes an empty placeholder for those instead of failing the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockType {
    Empty,
    Primitive,
    Light,
    Pickup,
    Workstation,
    Text,
    Interactable,
    Waypoint,
    Locker,
    Door,
    Camera,
    ShootingTarget,
    PlayerSpawnPoint,
    Capybara,
    Teleport,
    PlayerBlocker,
    CullingParent,
    MirrorPrefab,
    Clutter,
    #[serde(other)]
    Unknown,
}

/// One serialized description of a single object to materialize
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BlockRecord {
    pub name: String,
    pub object_id: i32,
    #[serde(default = "default_parent_id")]
    pub parent_id: i32,
    #[serde(default)]
    pub animator_name: Option<String>,
    #[serde(default)]
    pub position: Vec3,
    #[serde(default)]
    pub rotation: Vec3,
    #[serde(default = "default_scale")]
    pub scale: Vec3,
    pub block_type: BlockType,
    #[serde(default)]
    pub properties: AHashMap<String, serde_json::Value>,
}

fn default_parent_id() -> i32 {
    NO_PARENT
}

fn default_scale() -> Vec3 {
    Vec3::ONE
}

impl BlockRecord {
    /// Minimal record used as a starting point by tools and tests
    pub fn new(name: &str, object_id: i32, block_type: BlockType) -> Self {
        Self {
            name: name.to_string(),
            object_id,
            parent_id: NO_PARENT,
            animator_name: None,
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
            block_type,
            properties: AHashMap::new(),
        }
    }
}
