//! Integration tests for the full schematic lifecycle: lookup, assembly,
//! deferred locker settling, resync after a root move and teardown.

use ahash::AHashMap;
use blockworks::core::EngineConfig;
use blockworks::host::components::LockerPhase;
use blockworks::host::{RecordingReplication, Scene, Scheduler};
use blockworks::schematic::{
    AllowAll, BlockRecord, BlockType, EngineContext, MemorySource, Placement, SchematicDocument,
    SchematicError, SchematicSpawner,
};
use glam::Vec3;
use rand::rngs::mock::StepRng;
use serde_json::{json, Value};

struct Host {
    scene: Scene,
    scheduler: Scheduler,
    replication: RecordingReplication,
    rng: StepRng,
    config: EngineConfig,
}

impl Host {
    fn new() -> Self {
        Self {
            scene: Scene::new(),
            scheduler: Scheduler::new(),
            replication: RecordingReplication::new(),
            rng: StepRng::new(0, 0),
            config: EngineConfig::default(),
        }
    }

    fn env(&mut self) -> EngineContext<'_> {
        EngineContext {
            scene: &mut self.scene,
            scheduler: &mut self.scheduler,
            replication: &mut self.replication,
            rng: &mut self.rng,
            config: &self.config,
        }
    }
}

fn props(value: Value) -> AHashMap<String, Value> {
    value
        .as_object()
        .unwrap()
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

fn outpost_blocks() -> Vec<BlockRecord> {
    let mut anchor = BlockRecord::new("Anchor", 1, BlockType::Empty);
    anchor.position = Vec3::new(2.0, 0.0, 0.0);

    let mut wall = BlockRecord::new("Wall", 2, BlockType::Primitive);
    wall.parent_id = 1;
    wall.properties = props(json!({"PrimitiveType": 3, "Color": "0.5, 0.5, 0.5"}));

    let mut lamp = BlockRecord::new("Lamp", 3, BlockType::Light);
    lamp.properties = props(json!({
        "Color": "1, 1, 0.8",
        "Intensity": 2.0,
        "Range": 12.0,
        "Shadows": true
    }));

    let mut door = BlockRecord::new("FrontDoor", 4, BlockType::Door);
    door.parent_id = 1;
    door.position = Vec3::new(0.0, 0.0, 3.0);
    door.properties = props(json!({
        "DoorType": 2,
        "IsOpen": false,
        "IsLocked": true,
        "RequiredPermissions": 4,
        "RequireAll": false
    }));

    let mut locker = BlockRecord::new("Stash", 5, BlockType::Locker);
    locker.properties = props(json!({
        "LockerType": 1,
        "Chambers": ["{\"AcceptableItems\": [12], \"IsOpen\": true}"],
        "Loot": ["{\"TargetItem\": 12, \"ProbabilityPoints\": 100}"]
    }));

    let mut bench = BlockRecord::new("Bench", 6, BlockType::Workstation);
    bench.properties = props(json!({"IsInteractable": true}));

    let mut bounds = BlockRecord::new("Bounds", 7, BlockType::CullingParent);
    bounds.scale = Vec3::splat(20.0);

    let mut button = BlockRecord::new("Button", 8, BlockType::Pickup);
    button.properties = props(json!({"ItemType": 30, "Locked": true}));

    let mut pad = BlockRecord::new("PadA", 9, BlockType::Teleport);
    pad.properties = props(json!({"Cooldown": 3.0, "Targets": ["PadA"]}));

    vec![anchor, wall, lamp, door, locker, bench, bounds, button, pad]
}

fn spawner_with_outpost() -> SchematicSpawner<MemorySource> {
    let mut source = MemorySource::new();
    source.insert("Outpost", outpost_blocks());
    SchematicSpawner::new(source)
}

#[test]
fn test_full_lifecycle_spawn_settle_destroy() {
    let mut host = Host::new();
    let mut spawner = spawner_with_outpost();

    let placement = Placement {
        position: Vec3::new(100.0, 0.0, 0.0),
        ..Placement::default()
    };
    let graph = spawner
        .spawn("Outpost", None, placement, &mut AllowAll, &mut host.env())
        .unwrap();

    // Identity map keys equal the materialized block ids
    let mut ids: Vec<i32> = graph.ids().collect();
    ids.sort_unstable();
    assert_eq!(ids, vec![1, 2, 3, 4, 5, 6, 7, 8, 9]);
    for id in ids {
        assert!(host.replication.is_spawned(graph.object(id).unwrap()));
    }

    // Door and culling parent end up top-level, pose intact. Assembly
    // resolves every block against the root; the anchor only matters once a
    // resync re-establishes the logical parent
    let door = graph.object(4).unwrap();
    assert_eq!(host.scene.get(door).unwrap().parent, None);
    let door_world = host.scene.world_position(door).unwrap();
    assert!((door_world - Vec3::new(100.0, 0.0, 3.0)).length() < 1e-4);
    let bounds = graph.object(7).unwrap();
    assert_eq!(host.scene.get(bounds).unwrap().parent, None);

    // The locker settles a quarter second later
    let locker = graph.object(5).unwrap();
    let phase = |scene: &Scene| {
        scene
            .get(locker)
            .unwrap()
            .components
            .locker
            .as_ref()
            .unwrap()
            .phase
    };
    assert_eq!(phase(&host.scene), LockerPhase::AwaitingSettle);
    host.scheduler.advance(0.25, &mut host.scene);
    assert_eq!(phase(&host.scene), LockerPhase::Settled);
    assert!(
        host.scene
            .get(locker)
            .unwrap()
            .components
            .locker
            .as_ref()
            .unwrap()
            .chambers[0]
            .is_open
    );

    // The locked pickup got registered against the schematic
    assert_eq!(spawner.button_pickups().len(), 1);
    assert!(spawner
        .button_pickups()
        .values()
        .all(|owner| owner == "Outpost"));

    spawner.destroy(graph, &mut host.env());
    assert!(host.scene.is_empty());
    assert!(spawner.button_pickups().is_empty());
}

#[test]
fn test_move_then_resync_twice_is_idempotent() {
    let mut host = Host::new();
    let mut spawner = spawner_with_outpost();
    let graph = spawner
        .spawn(
            "Outpost",
            None,
            Placement::default(),
            &mut AllowAll,
            &mut host.env(),
        )
        .unwrap();

    host.scene.get_mut(graph.root()).unwrap().local_position = Vec3::new(0.0, 0.0, 40.0);

    spawner.update(&graph, None, true, &mut host.env()).unwrap();
    let door = graph.object(4).unwrap();
    let bounds = graph.object(7).unwrap();
    let door_once = host.scene.world_position(door).unwrap();
    let bounds_once = host
        .scene
        .get(bounds)
        .unwrap()
        .components
        .culling
        .clone()
        .unwrap();

    spawner.update(&graph, None, true, &mut host.env()).unwrap();
    let door_twice = host.scene.world_position(door).unwrap();
    let bounds_twice = host
        .scene
        .get(bounds)
        .unwrap()
        .components
        .culling
        .clone()
        .unwrap();

    assert!((door_once - door_twice).length() < 1e-4);
    assert!((door_once - Vec3::new(2.0, 0.0, 43.0)).length() < 1e-4);
    assert!((bounds_once.bounds_position - bounds_twice.bounds_position).length() < 1e-4);
    assert_eq!(bounds_once.bounds_size, bounds_twice.bounds_size);
}

#[test]
fn test_resync_with_doors_skipped() {
    let mut host = Host::new();
    let mut spawner = spawner_with_outpost();
    let graph = spawner
        .spawn(
            "Outpost",
            None,
            Placement::default(),
            &mut AllowAll,
            &mut host.env(),
        )
        .unwrap();

    let door = graph.object(4).unwrap();
    let bounds = graph.object(7).unwrap();
    let door_before = host.scene.world_position(door).unwrap();
    let door_spawns = host.replication.spawn_count(door);

    host.scene.get_mut(graph.root()).unwrap().local_position = Vec3::new(0.0, 7.0, 0.0);
    spawner.update(&graph, None, false, &mut host.env()).unwrap();

    // Door untouched, culling bounds still follow
    assert!((host.scene.world_position(door).unwrap() - door_before).length() < 1e-6);
    assert_eq!(host.replication.spawn_count(door), door_spawns);
    let culling = host
        .scene
        .get(bounds)
        .unwrap()
        .components
        .culling
        .clone()
        .unwrap();
    assert!((culling.bounds_position - Vec3::new(0.0, 7.0, 0.0)).length() < 1e-4);
}

#[test]
fn test_unknown_schematic_leaves_no_residue() {
    let mut host = Host::new();
    let mut spawner = SchematicSpawner::new(MemorySource::new());
    let result = spawner.spawn(
        "Missing",
        None,
        Placement::default(),
        &mut AllowAll,
        &mut host.env(),
    );
    assert!(matches!(result, Err(SchematicError::NotFound(_))));
    assert!(host.scene.is_empty());
}

#[test]
fn test_document_wire_format_round_trip() {
    let text = r##"{
        "Blocks": [
            {
                "Name": "Wall",
                "ObjectId": 1,
                "ParentId": -1,
                "Position": [0.0, 1.0, 0.0],
                "Rotation": [0.0, 180.0, 0.0],
                "Scale": [4.0, 2.0, 0.2],
                "BlockType": "Primitive",
                "Properties": {"PrimitiveType": 3, "Color": "#808080"}
            },
            {
                "Name": "Future",
                "ObjectId": 2,
                "BlockType": "SomethingNewer"
            }
        ]
    }"##;

    let document: SchematicDocument = serde_json::from_str(text).unwrap();
    assert_eq!(document.blocks.len(), 2);
    assert_eq!(document.blocks[0].block_type, BlockType::Primitive);
    assert_eq!(document.blocks[1].block_type, BlockType::Unknown);

    let mut source = MemorySource::new();
    source.insert("FromDisk", document.blocks);
    let mut spawner = SchematicSpawner::new(source);
    let mut host = Host::new();
    let graph = spawner
        .spawn(
            "FromDisk",
            None,
            Placement::default(),
            &mut AllowAll,
            &mut host.env(),
        )
        .unwrap();

    // Both blocks materialize; the unknown kind becomes a placeholder
    assert_eq!(graph.len(), 2);
}
