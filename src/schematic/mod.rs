//! Schematic materialization: block records, property decoding, the per-kind
//! materializer, graph assembly and in-place re-synchronization.

pub mod assembler;
pub mod block;
pub mod graph;
pub mod indicator;
pub mod kinds;
pub mod locker;
pub mod lookup;
pub mod materializer;
pub mod properties;
pub mod resync;
pub mod spawner;

pub use assembler::{assemble, AllowAll, SchematicError, SpawnDecision, SpawnPolicy};
pub use block::{BlockRecord, BlockType, NO_PARENT};
pub use graph::SchematicGraph;
pub use indicator::spawn_or_update_indicator;
pub use lookup::{DirectorySource, LookupError, MemorySource, SchematicDocument, SchematicSource};
pub use materializer::{materialize, BlockError, MaterializeContext};
pub use properties::{PropertyBag, PropertyError};
pub use resync::resync;
pub use spawner::{EngineContext, Placement, SchematicSpawner};
