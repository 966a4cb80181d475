//! Typed component slots carried by live host objects.
//!
//! The host engine attaches behavior to objects through components; the
//! materializer queries them as capabilities (replication smoothing, bounds
//! sync, door state and so on) without caring which prefab produced the
//! object.

use ahash::AHashMap;
use glam::{Vec2, Vec3};

use super::prefab::{CameraKind, LockerKind, TargetKind};

/// Visibility/collision flags for geometric primitives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrimitiveFlags(pub u8);

impl PrimitiveFlags {
    pub const NONE: Self = Self(0);
    pub const VISIBLE: Self = Self(1);
    pub const COLLIDABLE: Self = Self(2);

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl std::ops::BitOr for PrimitiveFlags {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// RGBA color with components in 0.0..=1.0 (values above 1.0 are allowed for
/// emissive overdrive, matching the host renderer)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Self = Self {
        r: 1.0,
        g: 1.0,
        b: 1.0,
        a: 1.0,
    };

    pub fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }
}

/// Geometric primitive shapes, in host wire order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveType {
    Sphere,
    Capsule,
    Cylinder,
    Cube,
    Plane,
    Quad,
}

impl PrimitiveType {
    pub fn from_wire(value: i32) -> Option<Self> {
        match value {
            0 => Some(Self::Sphere),
            1 => Some(Self::Capsule),
            2 => Some(Self::Cylinder),
            3 => Some(Self::Cube),
            4 => Some(Self::Plane),
            5 => Some(Self::Quad),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightType {
    Spot,
    Directional,
    Point,
    Rectangle,
    Disc,
}

impl LightType {
    pub fn from_wire(value: i32) -> Option<Self> {
        match value {
            0 => Some(Self::Spot),
            1 => Some(Self::Directional),
            2 => Some(Self::Point),
            3 => Some(Self::Rectangle),
            4 => Some(Self::Disc),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightShadows {
    None,
    Hard,
    Soft,
}

impl LightShadows {
    pub fn from_wire(value: i32) -> Option<Self> {
        match value {
            0 => Some(Self::None),
            1 => Some(Self::Hard),
            2 => Some(Self::Soft),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightShape {
    Cone,
    Pyramid,
    Box,
}

impl LightShape {
    pub fn from_wire(value: i32) -> Option<Self> {
        match value {
            0 => Some(Self::Cone),
            1 => Some(Self::Pyramid),
            2 => Some(Self::Box),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColliderShape {
    Box,
    Sphere,
    Capsule,
}

impl ColliderShape {
    pub fn from_wire(value: i32) -> Option<Self> {
        match value {
            0 => Some(Self::Box),
            1 => Some(Self::Sphere),
            2 => Some(Self::Capsule),
            _ => None,
        }
    }
}

/// Opaque inventory item kind, keyed by the host's serialized item id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ItemKind(pub i32);

/// Opaque player role identifier (signed byte on the wire)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RoleId(pub i8);

/// Replication interpolation settings shared by all toy-style objects
#[derive(Debug, Clone)]
pub struct ToySync {
    /// When true, replication interpolation is frozen entirely
    pub is_static: bool,
    pub movement_smoothing: u8,
}

impl Default for ToySync {
    fn default() -> Self {
        Self {
            is_static: false,
            movement_smoothing: 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PrimitiveShape {
    pub primitive_type: PrimitiveType,
    pub color: Color,
    pub flags: PrimitiveFlags,
}

impl Default for PrimitiveShape {
    fn default() -> Self {
        Self {
            primitive_type: PrimitiveType::Cube,
            color: Color::WHITE,
            flags: PrimitiveFlags::VISIBLE | PrimitiveFlags::COLLIDABLE,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LightSource {
    pub light_type: LightType,
    pub color: Color,
    pub intensity: f32,
    pub range: f32,
    pub shadow_type: LightShadows,
    pub shape: LightShape,
    pub spot_angle: f32,
    pub inner_spot_angle: f32,
    pub shadow_strength: f32,
}

impl Default for LightSource {
    fn default() -> Self {
        Self {
            light_type: LightType::Point,
            color: Color::WHITE,
            intensity: 1.0,
            range: 10.0,
            shadow_type: LightShadows::None,
            shape: LightShape::Cone,
            spot_angle: 30.0,
            inner_spot_angle: 0.0,
            shadow_strength: 1.0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TextDisplay {
    pub text: String,
    pub display_size: Vec2,
}

#[derive(Debug, Clone)]
pub struct Interactable {
    pub shape: ColliderShape,
    pub interaction_duration: f32,
    pub is_locked: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Waypoint {
    /// Size of the replicated bounding volume
    pub bounds_size: Vec3,
}

/// Scene culling boundary; remote observers cull everything outside the box
#[derive(Debug, Clone, Default)]
pub struct CullingBounds {
    pub bounds_position: Vec3,
    pub bounds_size: Vec3,
}

/// Coarse replicated transform for structures (lockers, workstations).
///
/// The replication layer carries a full position but only a quantized yaw;
/// the step is [`crate::core::EngineConfig::yaw_quantization_step`].
#[derive(Debug, Clone, Default)]
pub struct StructureSync {
    pub position: Vec3,
    pub rotation_y: i8,
}

/// Fixed-position waypoint used by navigation around doors; its cached
/// position must be recomputed after the owning object moves
#[derive(Debug, Clone, Default)]
pub struct NetWaypoint {
    pub position: Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DoorPermissions {
    pub mask: u16,
    pub require_all: bool,
}

#[derive(Debug, Clone)]
pub struct DoorState {
    pub target_state: bool,
    pub locked: bool,
    pub permissions: DoorPermissions,
    /// Prefab-carried behavior that randomizes the initial open state when
    /// the door spawns; schematic doors are authoritative from block data,
    /// so the materializer disables it
    pub randomize_on_spawn: bool,
}

impl Default for DoorState {
    fn default() -> Self {
        Self {
            target_state: false,
            locked: false,
            permissions: DoorPermissions {
                mask: 0,
                require_all: false,
            },
            randomize_on_spawn: true,
        }
    }
}

/// Construction phase of a locker's two-phase setup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockerPhase {
    Constructing,
    AwaitingSettle,
    Settled,
}

#[derive(Debug, Clone)]
pub struct LockerChamber {
    pub acceptable_items: Vec<ItemKind>,
    pub required_permissions: u16,
    pub is_open: bool,
    /// Whether a serialized chamber entry configured this chamber; chambers
    /// past the entry list keep prefab defaults
    pub configured: bool,
}

impl Default for LockerChamber {
    fn default() -> Self {
        Self {
            acceptable_items: Vec::new(),
            required_permissions: 0,
            is_open: false,
            configured: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LockerLoot {
    pub target_item: ItemKind,
    pub remaining_uses: i32,
    pub probability_points: i32,
    pub min_per_chamber: i32,
    pub max_per_chamber: i32,
}

#[derive(Debug, Clone)]
pub struct LockerUnit {
    pub kind: LockerKind,
    pub phase: LockerPhase,
    pub chambers: Vec<LockerChamber>,
    pub loot: Vec<LockerLoot>,
}

#[derive(Debug, Clone)]
pub struct PickupItem {
    pub item: ItemKind,
    pub serial: u16,
    /// Kinematic pickups do not simulate physics; locker contents start
    /// kinematic until the settle pass releases them
    pub kinematic: bool,
}

#[derive(Debug, Clone)]
pub struct CameraUnit {
    pub kind: CameraKind,
    pub label: String,
    /// Room association is resolved by an external room mapper, never here
    pub room: Option<String>,
}

#[derive(Debug, Clone, Copy)]
pub struct ShootingTargetUnit {
    pub kind: TargetKind,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Capybara {
    pub collisions_enabled: bool,
}

/// Teleport trigger volume with a per-actor cooldown map
#[derive(Debug, Clone, Default)]
pub struct TeleportVolume {
    /// Identifier other teleports reference through `targets`
    pub id: String,
    pub cooldown: f32,
    pub targets: Vec<String>,
    /// Earliest time (seconds) each actor may trigger this volume again
    pub next_use: AHashMap<u64, f64>,
}

#[derive(Debug, Clone, Default)]
pub struct SpawnPoint {
    pub roles: Vec<RoleId>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Workstation {
    /// Replicated status byte; 0 = interactable, 4 = inert
    pub status: u8,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TriggerVolume {
    pub is_trigger: bool,
}

/// All component slots an object may carry
#[derive(Debug, Clone, Default)]
pub struct Components {
    pub toy: Option<ToySync>,
    pub primitive: Option<PrimitiveShape>,
    pub light: Option<LightSource>,
    pub text: Option<TextDisplay>,
    pub interactable: Option<Interactable>,
    pub waypoint: Option<Waypoint>,
    pub culling: Option<CullingBounds>,
    pub structure_sync: Option<StructureSync>,
    pub net_waypoint: Option<NetWaypoint>,
    pub door: Option<DoorState>,
    pub locker: Option<LockerUnit>,
    pub pickup: Option<PickupItem>,
    pub camera: Option<CameraUnit>,
    pub target: Option<ShootingTargetUnit>,
    pub capybara: Option<Capybara>,
    pub teleport: Option<TeleportVolume>,
    pub spawnpoint: Option<SpawnPoint>,
    pub workstation: Option<Workstation>,
    pub trigger: Option<TriggerVolume>,
}
