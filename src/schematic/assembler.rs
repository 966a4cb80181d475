//! Whole-schematic assembly.
//!
//! Every block materializes directly under the root, in list order; logical
//! parent edges for the handful of kinds that need them are established
//! later by resync, because the source list does not guarantee parents
//! appear before their children. A failed block is logged and skipped, never
//! aborting its siblings. After materialization a policy hook reviews the
//! result and may veto the whole schematic or substitute a different block
//! list; only after that does anything reach the replication layer.

use ahash::AHashMap;
use thiserror::Error;
use tracing::{debug, error};

use crate::host::replication::Replication;
use crate::host::scene::{ObjectHandle, Scene};

use super::block::BlockRecord;
use super::graph::SchematicGraph;
use super::lookup::LookupError;
use super::materializer::{materialize, MaterializeContext};

/// Error fatal to the whole schematic
#[derive(Debug, Error)]
pub enum SchematicError {
    #[error("Schematic '{0}' not found")]
    NotFound(String),

    #[error("Spawning of schematic '{0}' was vetoed")]
    Vetoed(String),

    #[error("Duplicate object id {0} in block list")]
    DuplicateObjectId(i32),

    #[error("Parent chain through object id {0} forms a cycle")]
    ParentCycle(i32),

    #[error(transparent)]
    Lookup(#[from] LookupError),
}

/// Decision of the spawning policy hook
pub enum SpawnDecision {
    Allow,
    /// Substitute a different block list and materialize that instead
    Replace(Vec<BlockRecord>),
    Veto,
}

/// Reviews a decoded block list right before host registration
pub trait SpawnPolicy {
    fn review(&mut self, schematic_name: &str, blocks: &[BlockRecord]) -> SpawnDecision;
}

/// Policy that lets everything through
pub struct AllowAll;

impl SpawnPolicy for AllowAll {
    fn review(&mut self, _schematic_name: &str, _blocks: &[BlockRecord]) -> SpawnDecision {
        SpawnDecision::Allow
    }
}

/// Assemble a schematic from its block list under `root`.
///
/// On error the materialized objects are destroyed; the root itself belongs
/// to the caller and is left alone.
pub fn assemble(
    name: &str,
    blocks: &[BlockRecord],
    root: ObjectHandle,
    policy: &mut dyn SpawnPolicy,
    ctx: &mut MaterializeContext<'_>,
) -> Result<SchematicGraph, SchematicError> {
    validate_parent_edges(blocks)?;
    let mut materialized = materialize_all(blocks, root, ctx);

    match policy.review(name, blocks) {
        SpawnDecision::Allow => {}
        SpawnDecision::Veto => {
            destroy_all(&materialized, ctx.scene);
            return Err(SchematicError::Vetoed(name.to_string()));
        }
        SpawnDecision::Replace(replacement) => {
            validate_parent_edges(&replacement)?;
            destroy_all(&materialized, ctx.scene);
            materialized = materialize_all(&replacement, root, ctx);
        }
    }

    let mut object_from_id = AHashMap::with_capacity(materialized.len());
    for (id, handle) in materialized {
        ctx.replication.spawn(handle);
        object_from_id.insert(id, handle);
    }

    Ok(SchematicGraph::new(name, root, object_from_id))
}

/// Materialize every block, containing per-block failures
fn materialize_all(
    blocks: &[BlockRecord],
    root: ObjectHandle,
    ctx: &mut MaterializeContext<'_>,
) -> Vec<(i32, ObjectHandle)> {
    let mut materialized = Vec::with_capacity(blocks.len());
    for block in blocks {
        match materialize(block, root, ctx) {
            Ok(Some(handle)) => materialized.push((block.object_id, handle)),
            Ok(None) => debug!(block = %block.name, "block produced no object"),
            Err(err) => {
                error!(block = %block.name, error = %err, "block failed to materialize");
            }
        }
    }
    materialized
}

/// Reject malformed parent edges before any object exists.
///
/// The serialized format never promises well-formed edges; a cyclic chain
/// would otherwise hang resync's parent resolution.
fn validate_parent_edges(blocks: &[BlockRecord]) -> Result<(), SchematicError> {
    let mut parent_of = AHashMap::with_capacity(blocks.len());
    for block in blocks {
        if block.object_id == block.parent_id {
            return Err(SchematicError::ParentCycle(block.object_id));
        }
        if parent_of.insert(block.object_id, block.parent_id).is_some() {
            return Err(SchematicError::DuplicateObjectId(block.object_id));
        }
    }

    for &start in parent_of.keys() {
        let mut current = start;
        let mut steps = 0;
        // An edge leading outside the list (including the root sentinel)
        // terminates the chain
        while let Some(&parent) = parent_of.get(&current) {
            if parent == start {
                return Err(SchematicError::ParentCycle(start));
            }
            current = parent;
            steps += 1;
            if steps > parent_of.len() {
                return Err(SchematicError::ParentCycle(start));
            }
        }
    }
    Ok(())
}

/// Doors, mirrors and culling parents detach from the root during
/// materialization, so destroying the root alone would leak them
fn destroy_all(materialized: &[(i32, ObjectHandle)], scene: &mut Scene) {
    for &(_, handle) in materialized {
        scene.destroy(handle);
    }
}
