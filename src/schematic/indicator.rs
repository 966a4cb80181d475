//! Editing indicators: local-only visual proxies for placed schematics.
//!
//! An indicator is a translucent red cube at the schematic's placement so an
//! editor can see and target it. It is never networked; remote observers
//! only ever see the real objects.

use crate::host::components::{Color, PrimitiveFlags, PrimitiveType};
use crate::host::prefab::PrefabKind;
use crate::host::scene::{euler_deg_to_quat, ObjectHandle, Scene};

use super::spawner::Placement;

/// Overdriven red, visible through the translucency
const INDICATOR_COLOR: Color = Color {
    r: 2.0,
    g: 0.0,
    b: 0.0,
    a: 0.9,
};

/// Create an indicator at `placement`, or move an existing one there.
///
/// Passing a handle that no longer resolves creates a fresh indicator.
pub fn spawn_or_update_indicator(
    scene: &mut Scene,
    existing: Option<ObjectHandle>,
    placement: Placement,
) -> ObjectHandle {
    let handle = match existing.filter(|&h| scene.contains(h)) {
        Some(handle) => handle,
        None => {
            let handle = scene.instantiate(PrefabKind::PrimitiveToy);
            if let Some(object) = scene.get_mut(handle) {
                object.name = "Indicator".to_string();
                object.networked = false;
                if let Some(primitive) = object.components.primitive.as_mut() {
                    primitive.primitive_type = PrimitiveType::Cube;
                    primitive.color = INDICATOR_COLOR;
                    primitive.flags = PrimitiveFlags::VISIBLE;
                }
            }
            handle
        }
    };

    if let Some(object) = scene.get_mut(handle) {
        object.local_position = placement.position;
        object.local_rotation = euler_deg_to_quat(placement.rotation);
        object.local_scale = placement.scale;
    }
    handle
}
