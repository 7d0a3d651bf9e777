//! Formation data model
//!
//! A formation is a fixed list of unique grid cells, one per non-leader
//! member. A library groups the formations available to one squad archetype
//! and is shared read-only by every squad of that archetype.

use std::sync::Arc;

use ahash::AHashSet;
use serde::{Deserialize, Serialize};

use crate::core::error::{Result, SquadError};
use crate::squad::grid::GridCell;

/// Formation type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormationType {
    Line,
    Column,
    Wedge,
    Square,
    Testudo,
    Skirmish,
    Circle,
}

impl FormationType {
    pub fn name(&self) -> &'static str {
        match self {
            FormationType::Line => "line",
            FormationType::Column => "column",
            FormationType::Wedge => "wedge",
            FormationType::Square => "square",
            FormationType::Testudo => "testudo",
            FormationType::Skirmish => "skirmish",
            FormationType::Circle => "circle",
        }
    }
}

/// A named set of grid slots
#[derive(Debug, Clone, PartialEq)]
pub struct Formation {
    kind: FormationType,
    cells: Vec<GridCell>,
}

impl Formation {
    /// Build a formation, rejecting empty or duplicated cell lists
    pub fn new(kind: FormationType, cells: Vec<GridCell>) -> Result<Self> {
        if cells.is_empty() {
            return Err(SquadError::EmptyFormation(kind));
        }

        let mut seen = AHashSet::with_capacity(cells.len());
        for cell in &cells {
            if !seen.insert(*cell) {
                return Err(SquadError::DuplicateGridCell {
                    formation: kind,
                    cell: *cell,
                });
            }
        }

        Ok(Self { kind, cells })
    }

    pub fn kind(&self) -> FormationType {
        self.kind
    }

    pub fn cells(&self) -> &[GridCell] {
        &self.cells
    }

    /// Cell for a slot index, if the slot exists in this formation
    pub fn cell(&self, slot: usize) -> Option<GridCell> {
        self.cells.get(slot).copied()
    }

    /// Number of member slots
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Immutable, shared list of formations for one archetype
///
/// Cloning is cheap: all clones point at the same formations.
#[derive(Debug, Clone)]
pub struct FormationLibrary {
    formations: Arc<[Formation]>,
}

impl FormationLibrary {
    /// Build a library; the first formation is the one squads spawn in
    pub fn new(archetype: &str, formations: Vec<Formation>) -> Result<Self> {
        if formations.is_empty() {
            return Err(SquadError::EmptyLibrary(archetype.to_string()));
        }

        let mut kinds = AHashSet::with_capacity(formations.len());
        for formation in &formations {
            if !kinds.insert(formation.kind()) {
                return Err(SquadError::DuplicateFormation(formation.kind()));
            }
        }

        Ok(Self {
            formations: formations.into(),
        })
    }

    /// Formation squads are created in
    pub fn initial(&self) -> &Formation {
        &self.formations[0]
    }

    pub fn get(&self, kind: FormationType) -> Option<&Formation> {
        self.formations.iter().find(|f| f.kind() == kind)
    }

    pub fn contains(&self, kind: FormationType) -> bool {
        self.get(kind).is_some()
    }

    /// Formation following `kind` in library order, wrapping around
    ///
    /// An unknown `kind` cycles to the initial formation.
    pub fn next_after(&self, kind: FormationType) -> FormationType {
        match self.formations.iter().position(|f| f.kind() == kind) {
            Some(index) => self.formations[(index + 1) % self.formations.len()].kind(),
            None => self.initial().kind(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Formation> {
        self.formations.iter()
    }

    pub fn len(&self) -> usize {
        self.formations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.formations.is_empty()
    }

    /// True when both handles share the same underlying data
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.formations, &other.formations)
    }
}
