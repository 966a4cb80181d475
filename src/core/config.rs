//! Engine configuration with documented constants
//!
//! The tuning values that the materializer and re-sync engine share are
//! collected here rather than scattered through construction code.

/// Configuration for schematic materialization
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Delay in seconds before a locker's second construction phase runs.
    ///
    /// Chamber visuals must settle before physics and open-state are safe
    /// to apply on remote observers.
    pub locker_settle_delay: f64,

    /// Replication movement-smoothing factor applied when a block declares
    /// neither a `Static` flag nor an explicit `MovementSmoothing` value.
    pub default_movement_smoothing: u8,

    /// Step size in degrees for the coarse-quantized yaw carried by
    /// structure position sync. The replicated yaw is
    /// `round(world_yaw / yaw_quantization_step)` as a signed byte.
    pub yaw_quantization_step: f32,

    /// Vertical offset in world units applied to teleport volumes after all
    /// other adjustments, so the trigger does not clip into the ground.
    pub teleport_lift: f32,
}

impl EngineConfig {
    pub fn new() -> Self {
        Self {
            locker_settle_delay: 0.25,
            default_movement_smoothing: 60,
            yaw_quantization_step: 5.625,
            teleport_lift: 1.0,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}
