//! Prefab catalog for host-instantiable object kinds.
//!
//! Every live object starts as one of these prefabs; variant-carrying kinds
//! (doors, lockers, cameras, targets, mirrors) embed the concrete prefab
//! variant resolved by the materializer.

/// Door prefab variants; historical wire aliases collapse onto these
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DoorPrefab {
    Light,
    Heavy,
    Entrance,
    Gate,
    Bulk,
}

/// Locker prefab variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LockerKind {
    Pedestal500,
    LargeGun,
    RifleRack,
    Misc,
    Medkit,
    Adrenaline,
    Pedestal018,
    Pedestal207,
    Pedestal244,
    Pedestal268,
    Pedestal1853,
    Pedestal2176,
    Pedestal1576,
    PedestalAnti207,
    Pedestal1344,
    ExperimentalWeapon,
}

impl LockerKind {
    /// Number of chambers the prefab ships with
    pub fn chamber_count(self) -> usize {
        match self {
            Self::LargeGun | Self::Medkit => 3,
            Self::RifleRack | Self::Misc | Self::Adrenaline => 2,
            _ => 1,
        }
    }
}

/// Surveillance camera prefab variants, one per facility zone style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CameraKind {
    Light,
    Heavy,
    Entrance,
    EntranceArm,
    Surface,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetKind {
    Binary,
    ClassD,
    Sport,
}

/// Decorative one-piece mirror prefab variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MirrorKind {
    BrokenElectricalBox,
    SimpleBoxes,
    PipesShort,
    BoxesLadder,
    TankSupportedShelf,
    AngledFences,
    HugeOrangePipes,
    PipesLong,
}

/// Everything the host can instantiate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefabKind {
    /// Bare node with no components at all
    Marker,
    /// Invisible trigger volume node
    TriggerVolume,
    PrimitiveToy,
    LightToy,
    TextToy,
    InteractableToy,
    WaypointToy,
    CullingParent,
    Workstation,
    Pickup,
    Capybara,
    ShootingTarget(TargetKind),
    Door(DoorPrefab),
    Camera(CameraKind),
    Locker(LockerKind),
    Mirror(MirrorKind),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chamber_counts() {
        assert_eq!(LockerKind::Pedestal500.chamber_count(), 1);
        assert_eq!(LockerKind::Misc.chamber_count(), 2);
        assert_eq!(LockerKind::LargeGun.chamber_count(), 3);
    }
}
