//! Top-level spawn, update and destroy lifecycle for named schematics.
//!
//! The spawner owns the lookup source and the locked-pickup registry. A
//! spawn creates an invisible root primitive, resolves the name to a block
//! list and hands off to the assembler; any whole-schematic failure tears
//! the root down again so nothing half-built survives.

use ahash::AHashMap;
use glam::Vec3;
use rand::RngCore;
use tracing::{debug, info};

use crate::core::EngineConfig;
use crate::host::components::PrimitiveFlags;
use crate::host::prefab::PrefabKind;
use crate::host::replication::Replication;
use crate::host::scene::{euler_deg_to_quat, Scene};
use crate::host::scheduler::Scheduler;

use super::assembler::{assemble, SchematicError, SpawnPolicy};
use super::graph::SchematicGraph;
use super::lookup::SchematicSource;
use super::materializer::MaterializeContext;
use super::resync::resync;

/// Mutable host services a spawn or update call operates against
pub struct EngineContext<'a> {
    pub scene: &'a mut Scene,
    pub scheduler: &'a mut Scheduler,
    pub replication: &'a mut dyn Replication,
    pub rng: &'a mut dyn RngCore,
    pub config: &'a EngineConfig,
}

/// Placement of a schematic root in world space
#[derive(Debug, Clone, Copy)]
pub struct Placement {
    pub position: Vec3,
    /// Euler angles in degrees
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for Placement {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

pub struct SchematicSpawner<S> {
    source: S,
    button_pickups: AHashMap<u16, String>,
}

impl<S: SchematicSource> SchematicSpawner<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            button_pickups: AHashMap::new(),
        }
    }

    /// Pickup serials registered for external button handling, with the name
    /// of the schematic that owns each
    pub fn button_pickups(&self) -> &AHashMap<u16, String> {
        &self.button_pickups
    }

    /// Spawn a named schematic at `placement`.
    pub fn spawn(
        &mut self,
        name: &str,
        folder: Option<&str>,
        placement: Placement,
        policy: &mut dyn SpawnPolicy,
        env: &mut EngineContext<'_>,
    ) -> Result<SchematicGraph, SchematicError> {
        let root = env.scene.instantiate(PrefabKind::PrimitiveToy);
        if let Some(object) = env.scene.get_mut(root) {
            object.name = format!("Schematic-{name}");
            object.local_position = placement.position;
            object.local_rotation = euler_deg_to_quat(placement.rotation);
            object.local_scale = placement.scale;
            if let Some(primitive) = object.components.primitive.as_mut() {
                primitive.flags = PrimitiveFlags::NONE;
            }
            if let Some(toy) = object.components.toy.as_mut() {
                toy.movement_smoothing = env.config.default_movement_smoothing;
            }
        }

        let blocks = match self.source.try_get(name, folder) {
            Ok(Some(blocks)) => blocks,
            Ok(None) => {
                env.scene.destroy(root);
                return Err(SchematicError::NotFound(name.to_string()));
            }
            Err(err) => {
                env.scene.destroy(root);
                return Err(err.into());
            }
        };

        let mut ctx = MaterializeContext {
            scene: env.scene,
            scheduler: env.scheduler,
            replication: env.replication,
            rng: env.rng,
            config: env.config,
            schematic_name: name,
            button_pickups: &mut self.button_pickups,
        };
        let graph = match assemble(name, &blocks, root, policy, &mut ctx) {
            Ok(graph) => graph,
            Err(err) => {
                env.scene.destroy(root);
                return Err(err);
            }
        };

        env.replication.spawn(root);
        info!(schematic = name, objects = graph.len(), "schematic spawned");
        Ok(graph)
    }

    /// Re-resolve the block list and resync the placed schematic, typically
    /// after its root was moved. A lookup miss is silently ignored so a
    /// deleted definition never breaks an already-placed instance.
    pub fn update(
        &self,
        graph: &SchematicGraph,
        folder: Option<&str>,
        update_doors: bool,
        env: &mut EngineContext<'_>,
    ) -> Result<(), SchematicError> {
        let Some(blocks) = self.source.try_get(graph.name(), folder)? else {
            debug!(schematic = graph.name(), "definition no longer resolvable, skipping resync");
            return Ok(());
        };
        resync(
            graph,
            &blocks,
            update_doors,
            env.scene,
            env.replication,
            env.config,
        );
        Ok(())
    }

    /// Tear down a placed schematic: every mapped object, the root and any
    /// locked-pickup registrations it owned
    pub fn destroy(&mut self, graph: SchematicGraph, env: &mut EngineContext<'_>) {
        for handle in graph.objects() {
            env.replication.unspawn(handle);
            env.scene.destroy(handle);
        }
        env.replication.unspawn(graph.root());
        env.scene.destroy(graph.root());
        let name = graph.name().to_string();
        self.button_pickups.retain(|_, owner| *owner != name);
        info!(schematic = %name, "schematic destroyed");
    }
}
