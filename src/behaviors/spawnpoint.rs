//! Player spawn point queries.

use glam::Vec3;
use rand::{Rng, RngCore};

use crate::host::components::RoleId;
use crate::host::scene::{ObjectHandle, Scene};

/// All spawn point markers that accept `role`
pub fn eligible_spawn_points(scene: &Scene, role: RoleId) -> Vec<ObjectHandle> {
    scene
        .iter()
        .filter(|(_, object)| {
            object
                .components
                .spawnpoint
                .as_ref()
                .is_some_and(|s| s.roles.contains(&role))
        })
        .map(|(handle, _)| handle)
        .collect()
}

/// World position of a random eligible spawn point for `role`
pub fn random_spawn_position(scene: &Scene, role: RoleId, rng: &mut dyn RngCore) -> Option<Vec3> {
    let eligible = eligible_spawn_points(scene, role);
    if eligible.is_empty() {
        return None;
    }
    let handle = eligible[rng.gen_range(0..eligible.len())];
    scene.world_position(handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::components::SpawnPoint;
    use crate::host::prefab::PrefabKind;
    use rand::rngs::mock::StepRng;

    fn spawn_point(scene: &mut Scene, roles: &[i8], position: Vec3) -> ObjectHandle {
        let handle = scene.instantiate(PrefabKind::Marker);
        let object = scene.get_mut(handle).unwrap();
        object.local_position = position;
        object.components.spawnpoint = Some(SpawnPoint {
            roles: roles.iter().map(|&r| RoleId(r)).collect(),
        });
        handle
    }

    #[test]
    fn test_filters_by_role() {
        let mut scene = Scene::new();
        let guard = spawn_point(&mut scene, &[1, 2], Vec3::ZERO);
        spawn_point(&mut scene, &[3], Vec3::new(5.0, 0.0, 0.0));

        let eligible = eligible_spawn_points(&scene, RoleId(1));
        assert_eq!(eligible, vec![guard]);
        assert!(eligible_spawn_points(&scene, RoleId(9)).is_empty());
    }

    #[test]
    fn test_random_position_resolves_world_space() {
        let mut scene = Scene::new();
        spawn_point(&mut scene, &[1], Vec3::new(4.0, 0.0, 4.0));
        let mut rng = StepRng::new(0, 0);

        let position = random_spawn_position(&scene, RoleId(1), &mut rng).unwrap();
        assert!((position - Vec3::new(4.0, 0.0, 4.0)).length() < 1e-6);
        assert!(random_spawn_position(&scene, RoleId(2), &mut rng).is_none());
    }
}
