//! Blockworks - Schematic Materialization Engine

pub mod behaviors;
pub mod core;
pub mod host;
pub mod schematic;
