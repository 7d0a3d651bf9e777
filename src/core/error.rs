use thiserror::Error;

use crate::core::types::SquadId;
use crate::squad::formation::FormationType;
use crate::squad::grid::GridCell;

#[derive(Error, Debug)]
pub enum SquadError {
    #[error("Formation not found: {0:?}")]
    FormationNotFound(FormationType),

    #[error("Duplicate grid cell {cell:?} in formation {formation:?}")]
    DuplicateGridCell {
        formation: FormationType,
        cell: GridCell,
    },

    #[error("Formation {0:?} has no grid cells")]
    EmptyFormation(FormationType),

    #[error("Formation {0:?} defined more than once")]
    DuplicateFormation(FormationType),

    #[error("Archetype '{0}' defines no formations")]
    EmptyLibrary(String),

    #[error("Archetype not found: {0}")]
    ArchetypeNotFound(String),

    #[error("Squad not found: {0:?}")]
    SquadNotFound(SquadId),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SquadError>;
