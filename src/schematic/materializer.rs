//! Per-block materialization: serialized block record in, live host object
//! out.
//!
//! Dispatch is total over the block kind. Most creators instantiate a prefab
//! and configure its components from the property bag; a probabilistic
//! non-construction (clutter that failed its roll) is `Ok(None)`, never an
//! error. After creation every object passes through the same
//! post-construction sequence, whose ordering is load-bearing: parenting
//! before scale, detaching before bounds capture, bounds capture before the
//! teleport lift.

use glam::Vec3;
use rand::{Rng, RngCore};
use tracing::warn;

use crate::core::EngineConfig;
use crate::host::components::{
    ColliderShape, LightShadows, LightShape, LightType, PrimitiveFlags, PrimitiveType, RoleId,
    SpawnPoint, TeleportVolume,
};
use crate::host::prefab::PrefabKind;
use crate::host::replication::Replication;
use crate::host::scene::{euler_deg_to_quat, Layer, ObjectHandle, Scene};
use crate::host::scheduler::Scheduler;
use ahash::AHashMap;
use thiserror::Error;

use super::block::{BlockRecord, BlockType};
use super::kinds::{
    camera_kind_from_wire, door_prefab_from_wire, mirror_kind_from_wire, target_kind_from_wire,
};
use super::locker;
use super::properties::{coerce_i64, coerce_string, PropertyBag, PropertyError};

/// Error fatal to a single block, never to the whole schematic
#[derive(Debug, Error)]
pub enum BlockError {
    #[error(transparent)]
    Property(#[from] PropertyError),

    #[error("No prefab mapping for {kind} value {value}")]
    UnmappedVariant { kind: &'static str, value: i32 },

    #[error("Malformed '{key}' entry: {message}")]
    NestedEntry { key: &'static str, message: String },
}

/// Everything a creator may touch while materializing one block
pub struct MaterializeContext<'a> {
    pub scene: &'a mut Scene,
    pub scheduler: &'a mut Scheduler,
    pub replication: &'a mut dyn Replication,
    pub rng: &'a mut dyn RngCore,
    pub config: &'a EngineConfig,
    /// Name of the owning schematic, recorded against locked button pickups
    pub schematic_name: &'a str,
    /// Pickup serial to owning-schematic registry for locked pickups
    pub button_pickups: &'a mut AHashMap<u16, String>,
}

/// Materialize one block under `parent`.
///
/// Returns `Ok(None)` when the block legitimately produces nothing (a
/// clutter roll that failed).
pub fn materialize(
    block: &BlockRecord,
    parent: ObjectHandle,
    ctx: &mut MaterializeContext<'_>,
) -> Result<Option<ObjectHandle>, BlockError> {
    let bag = PropertyBag::new(&block.properties);

    let handle = match block.block_type {
        BlockType::Empty => Some(create_empty(ctx.scene)),
        BlockType::Primitive => Some(create_primitive(block, &bag, ctx)?),
        BlockType::Light => Some(create_light(&bag, ctx)?),
        BlockType::Pickup => Some(create_pickup(&bag, ctx)?),
        BlockType::Workstation => Some(create_workstation(&bag, ctx)?),
        BlockType::Text => Some(create_text(&bag, ctx)?),
        BlockType::Interactable => Some(create_interactable(&bag, ctx)?),
        BlockType::Waypoint => Some(ctx.scene.instantiate(PrefabKind::WaypointToy)),
        BlockType::Locker => Some(locker::create_locker(&bag, ctx)?),
        BlockType::Door => Some(create_door(&bag, ctx)?),
        BlockType::Camera => Some(create_camera(&bag, ctx)?),
        BlockType::ShootingTarget => Some(create_shooting_target(&bag, ctx)?),
        BlockType::PlayerSpawnPoint => Some(create_spawn_point(&bag, ctx)?),
        BlockType::Capybara => Some(create_capybara(ctx)),
        BlockType::Teleport => Some(create_teleport(block, &bag, ctx)?),
        BlockType::PlayerBlocker => Some(create_player_blocker(&bag, ctx)?),
        BlockType::CullingParent => Some(ctx.scene.instantiate(PrefabKind::CullingParent)),
        BlockType::MirrorPrefab => Some(create_mirror(&bag, ctx)?),
        BlockType::Clutter => create_clutter(&bag, ctx)?,
        BlockType::Unknown => {
            warn!(
                block = %block.name,
                "block kind is not recognized, substituting an empty placeholder"
            );
            Some(create_empty(ctx.scene))
        }
    };

    let Some(handle) = handle else {
        return Ok(None);
    };

    apply_common(block, &bag, handle, parent, ctx)?;
    Ok(Some(handle))
}

/// Quantize a yaw in degrees to the coarse wire representation
pub fn quantize_yaw(yaw_degrees: f32, step: f32) -> i8 {
    (yaw_degrees / step).round() as i8
}

/// Post-construction sequence shared by every materialized object
fn apply_common(
    block: &BlockRecord,
    bag: &PropertyBag<'_>,
    handle: ObjectHandle,
    parent: ObjectHandle,
    ctx: &mut MaterializeContext<'_>,
) -> Result<(), BlockError> {
    ctx.scene.set_parent_keep_local(handle, Some(parent));
    if let Some(object) = ctx.scene.get_mut(handle) {
        object.name = block.name.clone();
        object.local_position = block.position;
        object.local_rotation = euler_deg_to_quat(block.rotation);
    }

    // Waypoints carry their size through bounds, not through scale
    if block.block_type != BlockType::Waypoint {
        let scale = match block.block_type {
            BlockType::Empty | BlockType::Camera if block.scale == Vec3::ZERO => Vec3::ONE,
            _ => block.scale,
        };
        if let Some(object) = ctx.scene.get_mut(handle) {
            object.local_scale = scale;
        }
    }

    // These kinds only replicate correctly as top-level objects; detaching
    // preserves the world pose the parenting step just established
    if matches!(
        block.block_type,
        BlockType::Door | BlockType::CullingParent | BlockType::MirrorPrefab
    ) {
        ctx.scene.set_parent_keep_world(handle, None);
    }

    let has_toy = ctx
        .scene
        .get(handle)
        .is_some_and(|o| o.components.toy.is_some());
    if has_toy {
        let is_static = bag.try_get_bool("Static")?.unwrap_or(false);
        let smoothing = if is_static {
            None
        } else {
            bag.try_get_u8("MovementSmoothing")?
        };
        if let Some(toy) = ctx
            .scene
            .get_mut(handle)
            .and_then(|o| o.components.toy.as_mut())
        {
            if is_static {
                toy.is_static = true;
            } else {
                toy.movement_smoothing = smoothing.unwrap_or(ctx.config.default_movement_smoothing);
            }
        }
        if let Some(waypoint) = ctx
            .scene
            .get_mut(handle)
            .and_then(|o| o.components.waypoint.as_mut())
        {
            waypoint.bounds_size = block.scale;
        }
    }

    if ctx
        .scene
        .get(handle)
        .is_some_and(|o| o.components.culling.is_some())
    {
        let position = ctx.scene.world_position(handle).unwrap_or(Vec3::ZERO);
        if let Some(culling) = ctx
            .scene
            .get_mut(handle)
            .and_then(|o| o.components.culling.as_mut())
        {
            culling.bounds_position = position;
            culling.bounds_size = block.scale;
        }
    }

    if ctx
        .scene
        .get(handle)
        .is_some_and(|o| o.components.structure_sync.is_some())
    {
        let position = ctx.scene.world_position(handle).unwrap_or(Vec3::ZERO);
        let yaw = ctx.scene.world_yaw_degrees(handle).unwrap_or(0.0);
        let step = ctx.config.yaw_quantization_step;
        if let Some(sync) = ctx
            .scene
            .get_mut(handle)
            .and_then(|o| o.components.structure_sync.as_mut())
        {
            sync.position = position;
            sync.rotation_y = quantize_yaw(yaw, step);
        }
    }

    if block.block_type == BlockType::Teleport {
        ctx.scene
            .translate_world(handle, Vec3::Y * ctx.config.teleport_lift);
    }

    Ok(())
}

fn create_empty(scene: &mut Scene) -> ObjectHandle {
    let handle = scene.instantiate(PrefabKind::PrimitiveToy);
    if let Some(primitive) = scene
        .get_mut(handle)
        .and_then(|o| o.components.primitive.as_mut())
    {
        primitive.flags = PrimitiveFlags::NONE;
    }
    handle
}

fn create_primitive(
    block: &BlockRecord,
    bag: &PropertyBag<'_>,
    ctx: &mut MaterializeContext<'_>,
) -> Result<ObjectHandle, BlockError> {
    let wire = bag.get_i32("PrimitiveType")?;
    let primitive_type = PrimitiveType::from_wire(wire).ok_or(BlockError::UnmappedVariant {
        kind: "PrimitiveType",
        value: wire,
    })?;
    let color = bag.get_color("Color")?;

    let flags = if bag.has("PrimitiveFlags") {
        PrimitiveFlags(bag.get_u8("PrimitiveFlags")?)
    } else {
        // Old files predate the flags field; a negative X scale was the
        // editor's convention for non-collidable geometry
        let mut flags = PrimitiveFlags::VISIBLE;
        if block.scale.x >= 0.0 {
            flags = flags | PrimitiveFlags::COLLIDABLE;
        }
        flags
    };

    let handle = ctx.scene.instantiate(PrefabKind::PrimitiveToy);
    if let Some(primitive) = ctx
        .scene
        .get_mut(handle)
        .and_then(|o| o.components.primitive.as_mut())
    {
        primitive.primitive_type = primitive_type;
        primitive.color = color;
        primitive.flags = flags;
    }
    Ok(handle)
}

fn create_light(
    bag: &PropertyBag<'_>,
    ctx: &mut MaterializeContext<'_>,
) -> Result<ObjectHandle, BlockError> {
    let light_type = match bag.try_get_i32("LightType")? {
        None => LightType::Point,
        Some(wire) => LightType::from_wire(wire).ok_or(BlockError::UnmappedVariant {
            kind: "LightType",
            value: wire,
        })?,
    };
    let color = bag.get_color("Color")?;
    let intensity = bag.get_f32("Intensity")?;
    let range = bag.get_f32("Range")?;

    let handle = ctx.scene.instantiate(PrefabKind::LightToy);
    let Some(light) = ctx
        .scene
        .get_mut(handle)
        .and_then(|o| o.components.light.as_mut())
    else {
        return Ok(handle);
    };
    light.light_type = light_type;
    light.color = color;
    light.intensity = intensity;
    light.range = range;

    if bag.has("Shadows") {
        // Old files carried a single boolean instead of the full shadow block
        light.shadow_type = if bag.get_bool("Shadows")? {
            LightShadows::Soft
        } else {
            LightShadows::None
        };
    } else {
        let shadow_wire = bag.get_i32("ShadowType")?;
        light.shadow_type =
            LightShadows::from_wire(shadow_wire).ok_or(BlockError::UnmappedVariant {
                kind: "ShadowType",
                value: shadow_wire,
            })?;
        let shape_wire = bag.get_i32("Shape")?;
        light.shape = LightShape::from_wire(shape_wire).ok_or(BlockError::UnmappedVariant {
            kind: "Shape",
            value: shape_wire,
        })?;
        light.spot_angle = bag.get_f32("SpotAngle")?;
        light.inner_spot_angle = bag.get_f32("InnerSpotAngle")?;
        light.shadow_strength = bag.get_f32("ShadowStrength")?;
    }
    Ok(handle)
}

fn create_pickup(
    bag: &PropertyBag<'_>,
    ctx: &mut MaterializeContext<'_>,
) -> Result<ObjectHandle, BlockError> {
    if let Some(chance) = bag.try_get_f32("Chance")? {
        let roll = ctx.rng.gen_range(0..=100) as f32;
        if roll > chance {
            // The slot stays occupied by an inert placeholder so resyncs and
            // indicators keep a stable object per block
            return Ok(ctx.scene.instantiate(PrefabKind::Marker));
        }
    }

    let item = bag.get_i32("ItemType")?;
    let handle = ctx.scene.instantiate(PrefabKind::Pickup);
    let serial = if let Some(pickup) = ctx
        .scene
        .get_mut(handle)
        .and_then(|o| o.components.pickup.as_mut())
    {
        pickup.item = crate::host::components::ItemKind(item);
        Some(pickup.serial)
    } else {
        None
    };

    if bag.has("Locked") {
        if let Some(serial) = serial {
            ctx.button_pickups
                .insert(serial, ctx.schematic_name.to_string());
        }
    }
    Ok(handle)
}

fn create_workstation(
    bag: &PropertyBag<'_>,
    ctx: &mut MaterializeContext<'_>,
) -> Result<ObjectHandle, BlockError> {
    let interactable = bag.try_get_bool("IsInteractable")?.unwrap_or(false);
    let handle = ctx.scene.instantiate(PrefabKind::Workstation);
    if let Some(workstation) = ctx
        .scene
        .get_mut(handle)
        .and_then(|o| o.components.workstation.as_mut())
    {
        workstation.status = if interactable { 0 } else { 4 };
    }
    // Workstations replicate through their structure sync; the raw object
    // must not be independently visible
    ctx.replication.unspawn(handle);
    Ok(handle)
}

fn create_text(
    bag: &PropertyBag<'_>,
    ctx: &mut MaterializeContext<'_>,
) -> Result<ObjectHandle, BlockError> {
    let content = bag.get_string("Text")?;
    let display_size = bag.get_vec2("DisplaySize")? * 20.0;

    let handle = ctx.scene.instantiate(PrefabKind::TextToy);
    if let Some(text) = ctx
        .scene
        .get_mut(handle)
        .and_then(|o| o.components.text.as_mut())
    {
        text.text = content;
        text.display_size = display_size;
    }
    Ok(handle)
}

fn create_interactable(
    bag: &PropertyBag<'_>,
    ctx: &mut MaterializeContext<'_>,
) -> Result<ObjectHandle, BlockError> {
    let wire = bag.get_i32("Shape")?;
    let shape = ColliderShape::from_wire(wire).ok_or(BlockError::UnmappedVariant {
        kind: "Shape",
        value: wire,
    })?;
    let duration = bag.get_f32("InteractionDuration")?;
    let is_locked = bag.try_get_bool("IsLocked")?.unwrap_or(false);

    let handle = ctx.scene.instantiate(PrefabKind::InteractableToy);
    if let Some(interactable) = ctx
        .scene
        .get_mut(handle)
        .and_then(|o| o.components.interactable.as_mut())
    {
        interactable.shape = shape;
        interactable.interaction_duration = duration;
        interactable.is_locked = is_locked;
    }
    Ok(handle)
}

fn create_door(
    bag: &PropertyBag<'_>,
    ctx: &mut MaterializeContext<'_>,
) -> Result<ObjectHandle, BlockError> {
    let prefab = door_prefab_from_wire(bag.get_i32("DoorType")?);
    let is_open = bag.get_bool("IsOpen")?;
    let is_locked = bag.get_bool("IsLocked")?;
    let permissions = bag.get_u16("RequiredPermissions")?;
    let require_all = bag.get_bool("RequireAll")?;

    let handle = ctx.scene.instantiate(PrefabKind::Door(prefab));
    if let Some(door) = ctx
        .scene
        .get_mut(handle)
        .and_then(|o| o.components.door.as_mut())
    {
        // Block data is authoritative; the prefab must not re-roll the
        // initial state on spawn
        door.randomize_on_spawn = false;
        door.target_state = is_open;
        door.locked = is_locked;
        door.permissions.mask = permissions;
        door.permissions.require_all = require_all;
    }
    Ok(handle)
}

fn create_camera(
    bag: &PropertyBag<'_>,
    ctx: &mut MaterializeContext<'_>,
) -> Result<ObjectHandle, BlockError> {
    let wire = bag.get_i32("CameraType")?;
    let kind = camera_kind_from_wire(wire).ok_or(BlockError::UnmappedVariant {
        kind: "CameraType",
        value: wire,
    })?;
    let label = bag.get_string("Label")?;

    let handle = ctx.scene.instantiate(PrefabKind::Camera(kind));
    if let Some(object) = ctx.scene.get_mut(handle) {
        if let Some(toy) = object.components.toy.as_mut() {
            toy.movement_smoothing = ctx.config.default_movement_smoothing;
        }
        if let Some(camera) = object.components.camera.as_mut() {
            camera.label = label;
            camera.room = None;
        }
    }
    Ok(handle)
}

fn create_shooting_target(
    bag: &PropertyBag<'_>,
    ctx: &mut MaterializeContext<'_>,
) -> Result<ObjectHandle, BlockError> {
    let wire = bag.get_i32("TargetType")?;
    let kind = target_kind_from_wire(wire).ok_or(BlockError::UnmappedVariant {
        kind: "TargetType",
        value: wire,
    })?;
    Ok(ctx.scene.instantiate(PrefabKind::ShootingTarget(kind)))
}

fn create_spawn_point(
    bag: &PropertyBag<'_>,
    ctx: &mut MaterializeContext<'_>,
) -> Result<ObjectHandle, BlockError> {
    let mut roles = Vec::new();
    for value in bag.get_list("Roles")? {
        let role = coerce_i64(value)
            .and_then(|v| i8::try_from(v).ok())
            .ok_or_else(|| PropertyError::Type {
                key: "Roles".to_string(),
                expected: "role id",
                found: value.to_string(),
            })?;
        roles.push(RoleId(role));
    }

    let handle = ctx.scene.instantiate(PrefabKind::Marker);
    if let Some(object) = ctx.scene.get_mut(handle) {
        object.components.spawnpoint = Some(SpawnPoint { roles });
    }
    Ok(handle)
}

fn create_capybara(ctx: &mut MaterializeContext<'_>) -> ObjectHandle {
    let handle = ctx.scene.instantiate(PrefabKind::Capybara);
    if let Some(capybara) = ctx
        .scene
        .get_mut(handle)
        .and_then(|o| o.components.capybara.as_mut())
    {
        capybara.collisions_enabled = true;
    }
    handle
}

fn create_teleport(
    block: &BlockRecord,
    bag: &PropertyBag<'_>,
    ctx: &mut MaterializeContext<'_>,
) -> Result<ObjectHandle, BlockError> {
    let cooldown = bag.get_f32("Cooldown")?;
    let mut targets = Vec::new();
    for value in bag.get_list("Targets")? {
        let target = coerce_string(value).ok_or_else(|| PropertyError::Type {
            key: "Targets".to_string(),
            expected: "string",
            found: value.to_string(),
        })?;
        targets.push(target);
    }

    let handle = ctx.scene.instantiate(PrefabKind::TriggerVolume);
    if let Some(object) = ctx.scene.get_mut(handle) {
        object.components.teleport = Some(TeleportVolume {
            // Teleports find each other by block name
            id: block.name.clone(),
            cooldown,
            targets,
            next_use: AHashMap::new(),
        });
    }
    Ok(handle)
}

fn create_player_blocker(
    bag: &PropertyBag<'_>,
    ctx: &mut MaterializeContext<'_>,
) -> Result<ObjectHandle, BlockError> {
    let wire = bag.get_i32("PrimitiveType")?;
    let primitive_type = PrimitiveType::from_wire(wire).ok_or(BlockError::UnmappedVariant {
        kind: "PrimitiveType",
        value: wire,
    })?;

    let handle = ctx.scene.instantiate(PrefabKind::PrimitiveToy);
    if let Some(object) = ctx.scene.get_mut(handle) {
        object.layer = Layer::InvisibleCollider;
        if let Some(primitive) = object.components.primitive.as_mut() {
            primitive.primitive_type = primitive_type;
            primitive.flags = PrimitiveFlags::COLLIDABLE;
        }
    }
    Ok(handle)
}

fn create_mirror(
    bag: &PropertyBag<'_>,
    ctx: &mut MaterializeContext<'_>,
) -> Result<ObjectHandle, BlockError> {
    let wire = bag.get_i32("MirrorType")?;
    let kind = mirror_kind_from_wire(wire).ok_or(BlockError::UnmappedVariant {
        kind: "MirrorType",
        value: wire,
    })?;
    Ok(ctx.scene.instantiate(PrefabKind::Mirror(kind)))
}

fn create_clutter(
    bag: &PropertyBag<'_>,
    ctx: &mut MaterializeContext<'_>,
) -> Result<Option<ObjectHandle>, BlockError> {
    let chance = bag.get_f32("SpawnChance")?;
    let roll: f32 = ctx.rng.gen_range(0.0..=100.0);
    if roll > chance {
        return Ok(None);
    }
    Ok(Some(create_empty(ctx.scene)))
}
