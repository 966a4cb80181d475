//! Locker construction and its deferred settle pass.
//!
//! Lockers materialize in two phases. The first phase instantiates the
//! prefab, installs the loot table, configures chambers from the serialized
//! entries and hides the object from replication. The second phase runs a
//! quarter second later: it releases the kinematic chamber pickups and
//! applies the serialized open states. The delay gives the physics step a
//! chance to settle the prefab before its contents go live.

use crate::host::components::{ItemKind, LockerLoot, LockerPhase};
use crate::host::prefab::PrefabKind;
use crate::host::replication::Replication;
use crate::host::scene::{ObjectHandle, Scene};

use super::kinds::{decode_nested, locker_kind_from_wire, SerializedChamber, SerializedLoot};
use super::materializer::{BlockError, MaterializeContext};
use super::properties::PropertyBag;

pub fn create_locker(
    bag: &PropertyBag<'_>,
    ctx: &mut MaterializeContext<'_>,
) -> Result<ObjectHandle, BlockError> {
    let wire = bag.get_i32("LockerType")?;
    let kind = locker_kind_from_wire(wire).ok_or(BlockError::UnmappedVariant {
        kind: "LockerType",
        value: wire,
    })?;

    let chambers = decode_entries::<SerializedChamber>(bag, "Chambers")?;
    let loot = decode_entries::<SerializedLoot>(bag, "Loot")?;

    let handle = ctx.scene.instantiate(PrefabKind::Locker(kind));
    let open_states: Vec<bool> = chambers.iter().map(|c| c.is_open).collect();

    if let Some(unit) = ctx
        .scene
        .get_mut(handle)
        .and_then(|o| o.components.locker.as_mut())
    {
        unit.loot.clear();
        for entry in &loot {
            unit.loot.push(LockerLoot {
                target_item: ItemKind(entry.target_item),
                remaining_uses: entry.remaining_uses,
                probability_points: entry.probability_points,
                min_per_chamber: entry.min_per_chamber,
                max_per_chamber: entry.max_per_chamber,
            });
        }

        // The prefab's chamber count caps how many entries apply; chambers
        // past the entry list keep prefab defaults
        let count = unit.chambers.len().min(chambers.len());
        for (chamber, entry) in unit.chambers.iter_mut().zip(chambers.iter()).take(count) {
            chamber.acceptable_items = entry.acceptable_items.iter().map(|&v| ItemKind(v)).collect();
            chamber.required_permissions = entry.required_permissions;
            chamber.configured = true;
        }

        unit.phase = LockerPhase::AwaitingSettle;
    }

    // Hidden until the owning schematic spawns everything in one pass
    ctx.replication.unspawn(handle);

    ctx.scheduler
        .schedule_in(ctx.config.locker_settle_delay, move |scene| {
            settle(scene, handle, open_states)
        });

    Ok(handle)
}

fn decode_entries<T: serde::de::DeserializeOwned>(
    bag: &PropertyBag<'_>,
    key: &'static str,
) -> Result<Vec<T>, BlockError> {
    bag.get_list(key)?
        .iter()
        .map(|value| decode_nested(value).map_err(|message| BlockError::NestedEntry { key, message }))
        .collect()
}

/// Second construction phase, run from the scheduler
fn settle(scene: &mut Scene, handle: ObjectHandle, open_states: Vec<bool>) {
    // The locker may have been destroyed before the delay elapsed
    if !scene.contains(handle) {
        return;
    }

    for child in scene.children(handle) {
        if let Some(pickup) = scene
            .get_mut(child)
            .and_then(|o| o.components.pickup.as_mut())
        {
            pickup.kinematic = false;
        }
    }

    if let Some(unit) = scene
        .get_mut(handle)
        .and_then(|o| o.components.locker.as_mut())
    {
        for (chamber, open) in unit.chambers.iter_mut().zip(open_states) {
            chamber.is_open = open;
        }
        unit.phase = LockerPhase::Settled;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::EngineConfig;
    use crate::host::replication::RecordingReplication;
    use crate::host::scheduler::Scheduler;
    use crate::schematic::block::{BlockRecord, BlockType};
    use ahash::AHashMap;
    use rand::rngs::mock::StepRng;
    use serde_json::json;

    fn locker_block(locker_type: i32, chambers: serde_json::Value) -> BlockRecord {
        let mut block = BlockRecord::new("Locker", 1, BlockType::Locker);
        block.properties = json!({
            "LockerType": locker_type,
            "Chambers": chambers,
            "Loot": [
                "{\"TargetItem\": 21, \"RemainingUses\": 3, \"ProbabilityPoints\": 100, \"MinPerChamber\": 1, \"MaxPerChamber\": 2}"
            ]
        })
        .as_object()
        .unwrap()
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
        block
    }

    struct Fixture {
        scene: Scene,
        scheduler: Scheduler,
        replication: RecordingReplication,
        rng: StepRng,
        config: EngineConfig,
        button_pickups: AHashMap<u16, String>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                scene: Scene::new(),
                scheduler: Scheduler::new(),
                replication: RecordingReplication::new(),
                rng: StepRng::new(0, 0),
                config: EngineConfig::default(),
                button_pickups: AHashMap::new(),
            }
        }

        fn create(&mut self, block: &BlockRecord) -> Result<ObjectHandle, BlockError> {
            let bag = PropertyBag::new(&block.properties);
            let mut ctx = MaterializeContext {
                scene: &mut self.scene,
                scheduler: &mut self.scheduler,
                replication: &mut self.replication,
                rng: &mut self.rng,
                config: &self.config,
                schematic_name: "Test",
                button_pickups: &mut self.button_pickups,
            };
            create_locker(&bag, &mut ctx)
        }
    }

    #[test]
    fn test_two_phase_construction() {
        let mut fx = Fixture::new();
        // LargeGun prefab has three chambers
        let block = locker_block(1, json!(["{\"AcceptableItems\": [20], \"IsOpen\": true}"]));
        let handle = fx.create(&block).unwrap();

        {
            let unit = fx
                .scene
                .get(handle)
                .unwrap()
                .components
                .locker
                .clone()
                .unwrap();
            assert_eq!(unit.phase, LockerPhase::AwaitingSettle);
            assert!(unit.chambers[0].configured);
            assert!(!unit.chambers[0].is_open);
            assert_eq!(unit.chambers[0].acceptable_items, vec![ItemKind(20)]);
            assert!(!unit.chambers[1].configured);
            assert_eq!(unit.loot.len(), 1);
            assert_eq!(unit.loot[0].target_item, ItemKind(21));
        }
        for child in fx.scene.children(handle) {
            let pickup = fx
                .scene
                .get(child)
                .unwrap()
                .components
                .pickup
                .clone()
                .unwrap();
            assert!(pickup.kinematic);
        }
        assert_eq!(fx.scheduler.pending(), 1);

        fx.scheduler
            .advance(fx.config.locker_settle_delay, &mut fx.scene);

        let unit = fx
            .scene
            .get(handle)
            .unwrap()
            .components
            .locker
            .clone()
            .unwrap();
        assert_eq!(unit.phase, LockerPhase::Settled);
        assert!(unit.chambers[0].is_open);
        for child in fx.scene.children(handle) {
            let pickup = fx
                .scene
                .get(child)
                .unwrap()
                .components
                .pickup
                .clone()
                .unwrap();
            assert!(!pickup.kinematic);
        }
    }

    #[test]
    fn test_chamber_entries_capped_by_prefab() {
        let mut fx = Fixture::new();
        // Misc prefab has two chambers; three entries arrive
        let block = locker_block(
            3,
            json!([
                {"AcceptableItems": [1]},
                {"AcceptableItems": [2]},
                {"AcceptableItems": [3]}
            ]),
        );
        let handle = fx.create(&block).unwrap();
        let unit = fx
            .scene
            .get(handle)
            .unwrap()
            .components
            .locker
            .clone()
            .unwrap();
        assert_eq!(unit.chambers.len(), 2);
        assert_eq!(unit.chambers[0].acceptable_items, vec![ItemKind(1)]);
        assert_eq!(unit.chambers[1].acceptable_items, vec![ItemKind(2)]);
    }

    #[test]
    fn test_fewer_entries_than_chambers_keeps_defaults() {
        let mut fx = Fixture::new();
        let block = locker_block(3, json!([{"RequiredPermissions": 8}]));
        let handle = fx.create(&block).unwrap();
        let unit = fx
            .scene
            .get(handle)
            .unwrap()
            .components
            .locker
            .clone()
            .unwrap();
        assert_eq!(unit.chambers[0].required_permissions, 8);
        assert!(unit.chambers[0].configured);
        assert!(!unit.chambers[1].configured);
        assert_eq!(unit.chambers[1].required_permissions, 0);
    }

    #[test]
    fn test_settle_noops_when_locker_destroyed() {
        let mut fx = Fixture::new();
        let block = locker_block(0, json!([]));
        let handle = fx.create(&block).unwrap();
        fx.scene.destroy(handle);

        // Must not panic or resurrect anything
        fx.scheduler.advance(1.0, &mut fx.scene);
        assert!(!fx.scene.contains(handle));
    }

    #[test]
    fn test_malformed_chamber_entry_is_block_fatal() {
        let mut fx = Fixture::new();
        let block = locker_block(0, json!(["not valid json"]));
        assert!(matches!(
            fx.create(&block),
            Err(BlockError::NestedEntry { key: "Chambers", .. })
        ));
    }

    #[test]
    fn test_unmapped_locker_type() {
        let mut fx = Fixture::new();
        let block = locker_block(99, json!([]));
        assert!(matches!(
            fx.create(&block),
            Err(BlockError::UnmappedVariant { kind: "LockerType", value: 99 })
        ));
    }
}
