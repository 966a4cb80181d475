//! Re-synchronization of already-materialized objects.
//!
//! Only the kinds with a two-phase or detached setup are touched:
//! workstations, lockers, doors, culling parents and mirror prefabs.
//! Everything else lives under the root and follows it for free. Doors,
//! mirrors and culling parents are temporarily re-parented under their
//! logical parent so local position and scale from the block record resolve
//! in the right space, then detached again with their world pose intact.
//!
//! The replication layer does not diff transforms, so every touched object
//! except doors-when-skipped and culling parents is unspawned and respawned.

use tracing::debug;

use crate::core::EngineConfig;
use crate::host::replication::Replication;
use crate::host::scene::{ObjectHandle, Scene};

use super::block::{BlockRecord, BlockType};
use super::graph::SchematicGraph;
use super::materializer::quantize_yaw;

const TOUCHED_KINDS: [BlockType; 5] = [
    BlockType::Workstation,
    BlockType::Locker,
    BlockType::Door,
    BlockType::CullingParent,
    BlockType::MirrorPrefab,
];

/// Reapply positions and replication state after the schematic root moved.
///
/// `update_doors = false` moves cosmetic geometry while leaving door
/// interaction state and pose untouched.
pub fn resync(
    graph: &SchematicGraph,
    blocks: &[BlockRecord],
    update_doors: bool,
    scene: &mut Scene,
    replication: &mut dyn Replication,
    config: &EngineConfig,
) {
    for block in blocks {
        if !TOUCHED_KINDS.contains(&block.block_type) {
            continue;
        }
        let Some(handle) = graph.object(block.object_id) else {
            debug!(block = %block.name, "block has no materialized object, skipping resync");
            continue;
        };
        if !scene.contains(handle) {
            continue;
        }

        // A parent that never materialized (or the root sentinel) resolves
        // to the root
        let logical_parent = graph.object(block.parent_id).unwrap_or(graph.root());

        if block.block_type == BlockType::Door && update_doors {
            reparent_dance(scene, handle, logical_parent, block);
            let position = scene.world_position(handle).unwrap_or_default();
            if let Some(waypoint) = scene
                .get_mut(handle)
                .and_then(|o| o.components.net_waypoint.as_mut())
            {
                waypoint.position = position;
            }
        }

        if block.block_type == BlockType::MirrorPrefab {
            reparent_dance(scene, handle, logical_parent, block);
        }

        if scene
            .get(handle)
            .is_some_and(|o| o.components.structure_sync.is_some())
        {
            let position = scene.world_position(handle).unwrap_or_default();
            let yaw = scene.world_yaw_degrees(handle).unwrap_or(0.0);
            if let Some(sync) = scene
                .get_mut(handle)
                .and_then(|o| o.components.structure_sync.as_mut())
            {
                sync.position = position;
                sync.rotation_y = quantize_yaw(yaw, config.yaw_quantization_step);
            }
        }

        if scene
            .get(handle)
            .is_some_and(|o| o.components.culling.is_some())
        {
            reparent_dance(scene, handle, logical_parent, block);
            let position = scene.world_position(handle).unwrap_or_default();
            if let Some(object) = scene.get_mut(handle) {
                let scale = object.local_scale;
                if let Some(culling) = object.components.culling.as_mut() {
                    culling.bounds_position = position;
                    culling.bounds_size = scale;
                }
            }
        }

        if block.block_type == BlockType::Door && !update_doors {
            continue;
        }
        if block.block_type == BlockType::CullingParent {
            continue;
        }
        replication.unspawn(handle);
        replication.spawn(handle);
    }
}

/// Parent under the logical parent, apply local position and scale from the
/// block record, then detach keeping the resulting world pose
fn reparent_dance(
    scene: &mut Scene,
    handle: ObjectHandle,
    logical_parent: ObjectHandle,
    block: &BlockRecord,
) {
    scene.set_parent_keep_world(handle, Some(logical_parent));
    if let Some(object) = scene.get_mut(handle) {
        object.local_position = block.position;
        object.local_scale = block.scale;
    }
    scene.set_parent_keep_world(handle, None);
}
