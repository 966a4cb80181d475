//! Teleport trigger volumes.
//!
//! A teleport picks a random target id from its list and resolves it against
//! every teleport volume currently in the scene, including volumes from
//! other schematics. A successful trigger puts the actor on cooldown at both
//! ends so an immediate bounce-back cannot happen.

use glam::{EulerRot, Vec3};
use rand::{Rng, RngCore};
use tracing::trace;

use crate::host::scene::{ObjectHandle, Scene};

/// Where a triggered teleport sends the actor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TeleportDestination {
    pub target: ObjectHandle,
    pub position: Vec3,
    /// Euler angles in degrees the actor should face on arrival
    pub look_rotation: Vec3,
}

/// Process an actor entering a teleport volume at time `now` (seconds).
///
/// Returns `None` when the actor is on cooldown, the volume has no targets,
/// or no volume in the scene answers to the chosen target id.
pub fn trigger_teleport(
    scene: &mut Scene,
    teleport: ObjectHandle,
    actor: u64,
    now: f64,
    rng: &mut dyn RngCore,
) -> Option<TeleportDestination> {
    let (cooldown, target_id) = {
        let volume = scene.get(teleport)?.components.teleport.as_ref()?;
        if volume.next_use.get(&actor).is_some_and(|&next| next > now) {
            trace!(actor, "teleport on cooldown");
            return None;
        }
        if volume.targets.is_empty() {
            return None;
        }
        let index = rng.gen_range(0..volume.targets.len());
        (volume.cooldown, volume.targets[index].clone())
    };

    let target = scene.iter().find_map(|(handle, object)| {
        object
            .components
            .teleport
            .as_ref()
            .filter(|v| v.id == target_id)
            .map(|_| handle)
    })?;

    let next_use = now + f64::from(cooldown);
    for handle in [teleport, target] {
        if let Some(volume) = scene
            .get_mut(handle)
            .and_then(|o| o.components.teleport.as_mut())
        {
            volume.next_use.insert(actor, next_use);
        }
    }

    let (position, rotation, _) = scene.world_transform(target)?;
    let (yaw, pitch, roll) = rotation.to_euler(EulerRot::YXZ);
    Some(TeleportDestination {
        target,
        position,
        look_rotation: Vec3::new(pitch.to_degrees(), yaw.to_degrees(), roll.to_degrees()),
    })
}
