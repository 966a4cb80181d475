use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    /// The assembler contains per-block failures itself; this conversion is
    /// for embedders driving `materialize` directly
    #[error("Block error: {0}")]
    Block(#[from] crate::schematic::materializer::BlockError),

    #[error("Schematic error: {0}")]
    Schematic(#[from] crate::schematic::assembler::SchematicError),

    #[error("Lookup error: {0}")]
    Lookup(#[from] crate::schematic::lookup::LookupError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;
