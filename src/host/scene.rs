//! Live object arena and transform hierarchy.
//!
//! The scene owns every live object and resolves world transforms by walking
//! parent chains. Handles are plain integer keys; nothing in the engine holds
//! raw references across mutations.

use ahash::AHashMap;
use glam::{EulerRot, Quat, Vec3};

use super::components::{
    Capybara, CameraUnit, Components, CullingBounds, DoorState, Interactable, ItemKind,
    LightSource, LockerChamber, LockerPhase, LockerUnit, NetWaypoint, PickupItem, PrimitiveShape,
    ShootingTargetUnit, StructureSync, TextDisplay, ToySync, TriggerVolume, Waypoint,
};
use super::prefab::PrefabKind;

/// Unique identifier for a live object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectHandle(pub u64);

/// Collision layer assignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Layer {
    #[default]
    Default,
    /// Collides with actors but is never rendered
    InvisibleCollider,
}

/// One live object in the scene
#[derive(Debug, Clone)]
pub struct HostObject {
    pub name: String,
    pub prefab: PrefabKind,
    pub parent: Option<ObjectHandle>,
    pub local_position: Vec3,
    pub local_rotation: Quat,
    pub local_scale: Vec3,
    pub layer: Layer,
    /// Non-networked objects (editor indicators) are invisible to replication
    pub networked: bool,
    pub components: Components,
}

impl HostObject {
    fn new(name: &str, prefab: PrefabKind) -> Self {
        Self {
            name: name.to_string(),
            prefab,
            parent: None,
            local_position: Vec3::ZERO,
            local_rotation: Quat::IDENTITY,
            local_scale: Vec3::ONE,
            layer: Layer::Default,
            networked: true,
            components: Components::default(),
        }
    }
}

/// Storage for all live objects
pub struct Scene {
    objects: AHashMap<ObjectHandle, HostObject>,
    next_id: u64,
    next_serial: u16,
}

impl Scene {
    pub fn new() -> Self {
        Self {
            objects: AHashMap::new(),
            next_id: 1,
            next_serial: 1,
        }
    }

    /// Instantiate a prefab with its default component set
    pub fn instantiate(&mut self, prefab: PrefabKind) -> ObjectHandle {
        let object = match prefab {
            PrefabKind::Marker => HostObject::new("Marker", prefab),
            PrefabKind::TriggerVolume => {
                let mut o = HostObject::new("TriggerVolume", prefab);
                o.components.trigger = Some(TriggerVolume { is_trigger: true });
                o
            }
            PrefabKind::PrimitiveToy => {
                let mut o = HostObject::new("PrimitiveToy", prefab);
                o.components.toy = Some(ToySync::default());
                o.components.primitive = Some(PrimitiveShape::default());
                o
            }
            PrefabKind::LightToy => {
                let mut o = HostObject::new("LightToy", prefab);
                o.components.toy = Some(ToySync::default());
                o.components.light = Some(LightSource::default());
                o
            }
            PrefabKind::TextToy => {
                let mut o = HostObject::new("TextToy", prefab);
                o.components.toy = Some(ToySync::default());
                o.components.text = Some(TextDisplay::default());
                o
            }
            PrefabKind::InteractableToy => {
                let mut o = HostObject::new("InteractableToy", prefab);
                o.components.toy = Some(ToySync::default());
                o.components.interactable = Some(Interactable {
                    shape: super::components::ColliderShape::Box,
                    interaction_duration: 0.0,
                    is_locked: false,
                });
                o
            }
            PrefabKind::WaypointToy => {
                let mut o = HostObject::new("WaypointToy", prefab);
                o.components.toy = Some(ToySync::default());
                o.components.waypoint = Some(Waypoint::default());
                o
            }
            PrefabKind::CullingParent => {
                let mut o = HostObject::new("CullingParent", prefab);
                o.components.culling = Some(CullingBounds::default());
                o
            }
            PrefabKind::Workstation => {
                let mut o = HostObject::new("Workstation", prefab);
                o.components.workstation = Some(super::components::Workstation::default());
                o.components.structure_sync = Some(StructureSync::default());
                o
            }
            PrefabKind::Pickup => {
                let serial = self.next_serial;
                self.next_serial += 1;
                let mut o = HostObject::new("Pickup", prefab);
                o.components.pickup = Some(PickupItem {
                    item: ItemKind(0),
                    serial,
                    kinematic: false,
                });
                o
            }
            PrefabKind::Capybara => {
                let mut o = HostObject::new("Capybara", prefab);
                o.components.toy = Some(ToySync::default());
                o.components.capybara = Some(Capybara::default());
                o
            }
            PrefabKind::ShootingTarget(kind) => {
                let mut o = HostObject::new("ShootingTarget", prefab);
                o.components.toy = Some(ToySync::default());
                o.components.target = Some(ShootingTargetUnit { kind });
                o
            }
            PrefabKind::Door(_) => {
                let mut o = HostObject::new("Door", prefab);
                o.components.door = Some(DoorState::default());
                o.components.net_waypoint = Some(NetWaypoint::default());
                o
            }
            PrefabKind::Camera(kind) => {
                let mut o = HostObject::new("Camera", prefab);
                o.components.toy = Some(ToySync::default());
                o.components.camera = Some(CameraUnit {
                    kind,
                    label: String::new(),
                    room: None,
                });
                o
            }
            PrefabKind::Locker(kind) => {
                let mut o = HostObject::new("Locker", prefab);
                o.components.locker = Some(LockerUnit {
                    kind,
                    phase: LockerPhase::Constructing,
                    chambers: vec![LockerChamber::default(); kind.chamber_count()],
                    loot: Vec::new(),
                });
                o.components.structure_sync = Some(StructureSync::default());
                o
            }
            PrefabKind::Mirror(_) => HostObject::new("Mirror", prefab),
        };

        // Locker prefabs ship with one kinematic pickup per chamber
        let chamber_count = object
            .components
            .locker
            .as_ref()
            .map(|l| l.chambers.len())
            .unwrap_or(0);

        let handle = self.insert(object);

        for _ in 0..chamber_count {
            let child = self.instantiate(PrefabKind::Pickup);
            if let Some(pickup) = self.objects.get_mut(&child).and_then(|o| o.components.pickup.as_mut()) {
                pickup.kinematic = true;
            }
            self.set_parent_keep_local(child, Some(handle));
        }

        handle
    }

    fn insert(&mut self, object: HostObject) -> ObjectHandle {
        let handle = ObjectHandle(self.next_id);
        self.next_id += 1;
        self.objects.insert(handle, object);
        handle
    }

    /// Destroy an object together with its children, transitively
    pub fn destroy(&mut self, handle: ObjectHandle) {
        let children = self.children(handle);
        for child in children {
            self.destroy(child);
        }
        self.objects.remove(&handle);
    }

    pub fn contains(&self, handle: ObjectHandle) -> bool {
        self.objects.contains_key(&handle)
    }

    pub fn get(&self, handle: ObjectHandle) -> Option<&HostObject> {
        self.objects.get(&handle)
    }

    pub fn get_mut(&mut self, handle: ObjectHandle) -> Option<&mut HostObject> {
        self.objects.get_mut(&handle)
    }

    /// Direct children of an object
    pub fn children(&self, handle: ObjectHandle) -> Vec<ObjectHandle> {
        self.objects
            .iter()
            .filter(|(_, o)| o.parent == Some(handle))
            .map(|(h, _)| *h)
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ObjectHandle, &HostObject)> {
        self.objects.iter().map(|(h, o)| (*h, o))
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Reassign the parent without touching the local transform.
    ///
    /// The object's world pose changes; used right before the caller assigns
    /// explicit local values anyway.
    pub fn set_parent_keep_local(&mut self, handle: ObjectHandle, parent: Option<ObjectHandle>) {
        if let Some(object) = self.objects.get_mut(&handle) {
            object.parent = parent;
        }
    }

    /// Reassign the parent while preserving the object's world pose, the way
    /// the host engine reparents by default.
    pub fn set_parent_keep_world(&mut self, handle: ObjectHandle, parent: Option<ObjectHandle>) {
        let Some((world_pos, world_rot, world_scale)) = self.world_transform(handle) else {
            return;
        };

        let (parent_pos, parent_rot, parent_scale) = match parent {
            Some(p) => match self.world_transform(p) {
                Some(t) => t,
                None => (Vec3::ZERO, Quat::IDENTITY, Vec3::ONE),
            },
            None => (Vec3::ZERO, Quat::IDENTITY, Vec3::ONE),
        };

        if let Some(object) = self.objects.get_mut(&handle) {
            object.parent = parent;
            let inv_rot = parent_rot.inverse();
            object.local_position = inv_rot * (world_pos - parent_pos) / non_zero(parent_scale);
            object.local_rotation = inv_rot * world_rot;
            object.local_scale = world_scale / non_zero(parent_scale);
        }
    }

    /// Resolve world position, rotation and lossy scale by walking the
    /// parent chain (uniform TRS composition, no shear)
    pub fn world_transform(&self, handle: ObjectHandle) -> Option<(Vec3, Quat, Vec3)> {
        let object = self.objects.get(&handle)?;

        let (parent_pos, parent_rot, parent_scale) = match object.parent {
            Some(p) => self
                .world_transform(p)
                .unwrap_or((Vec3::ZERO, Quat::IDENTITY, Vec3::ONE)),
            None => (Vec3::ZERO, Quat::IDENTITY, Vec3::ONE),
        };

        let position = parent_pos + parent_rot * (parent_scale * object.local_position);
        let rotation = parent_rot * object.local_rotation;
        let scale = parent_scale * object.local_scale;
        Some((position, rotation, scale))
    }

    pub fn world_position(&self, handle: ObjectHandle) -> Option<Vec3> {
        self.world_transform(handle).map(|(p, _, _)| p)
    }

    /// World-space yaw in degrees, in -180.0..=180.0
    pub fn world_yaw_degrees(&self, handle: ObjectHandle) -> Option<f32> {
        self.world_transform(handle)
            .map(|(_, rotation, _)| rotation.to_euler(EulerRot::YXZ).0.to_degrees())
    }

    /// Move an object by a world-space delta, keeping its parent
    pub fn translate_world(&mut self, handle: ObjectHandle, delta: Vec3) {
        let parent = match self.objects.get(&handle) {
            Some(o) => o.parent,
            None => return,
        };
        let (_, parent_rot, parent_scale) = match parent {
            Some(p) => self
                .world_transform(p)
                .unwrap_or((Vec3::ZERO, Quat::IDENTITY, Vec3::ONE)),
            None => (Vec3::ZERO, Quat::IDENTITY, Vec3::ONE),
        };
        if let Some(object) = self.objects.get_mut(&handle) {
            object.local_position += parent_rot.inverse() * delta / non_zero(parent_scale);
        }
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert Euler angles in degrees (host convention: yaw, then pitch, then
/// roll) to a rotation
pub fn euler_deg_to_quat(euler: Vec3) -> Quat {
    Quat::from_euler(
        EulerRot::YXZ,
        euler.y.to_radians(),
        euler.x.to_radians(),
        euler.z.to_radians(),
    )
}

/// Guard against division by a zero scale component
fn non_zero(scale: Vec3) -> Vec3 {
    Vec3::new(
        if scale.x == 0.0 { 1.0 } else { scale.x },
        if scale.y == 0.0 { 1.0 } else { scale.y },
        if scale.z == 0.0 { 1.0 } else { scale.z },
    )
}
