//! Wire-value to prefab-variant mapping, plus the nested serialized records
//! embedded in locker property bags.
//!
//! Wire values are the integers written by the map editor; they are frozen
//! by existing schematic files and must never be renumbered. Door values
//! carry historical aliases that collapse onto the same prefab.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::host::prefab::{CameraKind, DoorPrefab, LockerKind, MirrorKind, TargetKind};

pub fn locker_kind_from_wire(value: i32) -> Option<LockerKind> {
    match value {
        0 => Some(LockerKind::Pedestal500),
        1 => Some(LockerKind::LargeGun),
        2 => Some(LockerKind::RifleRack),
        3 => Some(LockerKind::Misc),
        4 => Some(LockerKind::Medkit),
        5 => Some(LockerKind::Adrenaline),
        6 => Some(LockerKind::Pedestal018),
        7 => Some(LockerKind::Pedestal207),
        8 => Some(LockerKind::Pedestal244),
        9 => Some(LockerKind::Pedestal268),
        10 => Some(LockerKind::Pedestal1853),
        11 => Some(LockerKind::Pedestal2176),
        12 => Some(LockerKind::Pedestal1576),
        13 => Some(LockerKind::PedestalAnti207),
        14 => Some(LockerKind::Pedestal1344),
        15 => Some(LockerKind::ExperimentalWeapon),
        _ => None,
    }
}

/// Door mapping never fails: unmapped values fall back to the entrance door
pub fn door_prefab_from_wire(value: i32) -> DoorPrefab {
    match value {
        // 5..=8 are legacy long-form aliases kept for old schematic files
        0 | 5 => DoorPrefab::Light,
        1 | 6 => DoorPrefab::Heavy,
        2 | 7 => DoorPrefab::Entrance,
        3 => DoorPrefab::Gate,
        4 | 8 => DoorPrefab::Bulk,
        _ => DoorPrefab::Entrance,
    }
}

pub fn camera_kind_from_wire(value: i32) -> Option<CameraKind> {
    match value {
        0 => Some(CameraKind::Light),
        1 => Some(CameraKind::Heavy),
        2 => Some(CameraKind::Entrance),
        3 => Some(CameraKind::EntranceArm),
        4 => Some(CameraKind::Surface),
        _ => None,
    }
}

pub fn target_kind_from_wire(value: i32) -> Option<TargetKind> {
    match value {
        0 => Some(TargetKind::Binary),
        1 => Some(TargetKind::ClassD),
        2 => Some(TargetKind::Sport),
        _ => None,
    }
}

pub fn mirror_kind_from_wire(value: i32) -> Option<MirrorKind> {
    match value {
        0 => Some(MirrorKind::BrokenElectricalBox),
        1 => Some(MirrorKind::SimpleBoxes),
        2 => Some(MirrorKind::PipesShort),
        3 => Some(MirrorKind::BoxesLadder),
        4 => Some(MirrorKind::TankSupportedShelf),
        5 => Some(MirrorKind::AngledFences),
        6 => Some(MirrorKind::HugeOrangePipes),
        7 => Some(MirrorKind::PipesLong),
        _ => None,
    }
}

/// One serialized locker chamber configuration entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SerializedChamber {
    #[serde(default)]
    pub acceptable_items: Vec<i32>,
    #[serde(default)]
    pub required_permissions: u16,
    #[serde(default)]
    pub is_open: bool,
}

/// One serialized locker loot-table entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SerializedLoot {
    pub target_item: i32,
    #[serde(default)]
    pub remaining_uses: i32,
    #[serde(default)]
    pub probability_points: i32,
    #[serde(default)]
    pub min_per_chamber: i32,
    #[serde(default)]
    pub max_per_chamber: i32,
}

/// Decode a nested entry that may be either a JSON string (the historical
/// encoding) or an inline object
pub fn decode_nested<T: serde::de::DeserializeOwned>(value: &Value) -> Result<T, String> {
    match value {
        Value::String(s) => serde_json::from_str(s).map_err(|e| e.to_string()),
        other => serde_json::from_value(other.clone()).map_err(|e| e.to_string()),
    }
}
