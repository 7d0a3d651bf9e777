//! Squad archetypes loaded from TOML
//!
//! An archetype bundles the formation library and base stats for one kind
//! of squad. Archetypes are parsed once and shared by `Arc` between every
//! squad spawned from them.

use std::path::Path;
use std::sync::Arc;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::error::{Result, SquadError};
use crate::squad::constants::DEFAULT_BASE_SPEED;
use crate::squad::formation::{Formation, FormationLibrary, FormationType};
use crate::squad::grid::GridCell;
use crate::squad::intent::BehaviorProfile;
use crate::squad::units::{OrientationPolicy, WeightClass};

const BUILTIN_ARCHETYPES: &[(&str, &str)] = &[
    (
        "legionaries",
        include_str!("../../data/archetypes/legionaries.toml"),
    ),
    (
        "skirmishers",
        include_str!("../../data/archetypes/skirmishers.toml"),
    ),
    ("pikemen", include_str!("../../data/archetypes/pikemen.toml")),
];

/// One formation as written in an archetype file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormationDef {
    pub kind: FormationType,
    pub cells: Vec<GridCell>,
}

/// Raw archetype file contents
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchetypeDef {
    pub name: String,
    #[serde(default)]
    pub behavior: BehaviorProfile,
    #[serde(default)]
    pub weight_class: WeightClass,
    #[serde(default = "default_base_speed")]
    pub base_speed: f32,
    /// Inclusive range individual speed multipliers are drawn from
    #[serde(default = "default_speed_variation")]
    pub speed_variation: [f32; 2],
    #[serde(default)]
    pub orientation: OrientationPolicy,
    pub formations: Vec<FormationDef>,
}

fn default_base_speed() -> f32 {
    DEFAULT_BASE_SPEED
}

fn default_speed_variation() -> [f32; 2] {
    [0.9, 1.1]
}

/// Validated, immutable archetype
#[derive(Debug, Clone)]
pub struct SquadArchetype {
    pub name: String,
    pub behavior: BehaviorProfile,
    pub weight_class: WeightClass,
    pub base_speed: f32,
    pub speed_variation: (f32, f32),
    pub orientation: OrientationPolicy,
    pub formations: FormationLibrary,
}

impl SquadArchetype {
    /// Validate a parsed definition
    pub fn from_def(def: ArchetypeDef) -> Result<Self> {
        if def.base_speed <= 0.0 {
            return Err(SquadError::InvalidConfig(format!(
                "archetype '{}' base_speed ({}) must be positive",
                def.name, def.base_speed
            )));
        }

        let [low, high] = def.speed_variation;
        if low <= 0.0 || low > high {
            return Err(SquadError::InvalidConfig(format!(
                "archetype '{}' speed_variation [{}, {}] must be positive and ordered",
                def.name, low, high
            )));
        }

        let formations = def
            .formations
            .into_iter()
            .map(|f| Formation::new(f.kind, f.cells))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            formations: FormationLibrary::new(&def.name, formations)?,
            name: def.name,
            behavior: def.behavior,
            weight_class: def.weight_class,
            base_speed: def.base_speed,
            speed_variation: (low, high),
            orientation: def.orientation,
        })
    }

    /// Parse an archetype from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let def: ArchetypeDef = toml::from_str(content)?;
        Self::from_def(def)
    }

    /// Load an archetype from a TOML file on disk
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// One of the archetypes compiled into the crate
    pub fn builtin(name: &str) -> Result<Self> {
        let (_, content) = BUILTIN_ARCHETYPES
            .iter()
            .find(|(builtin, _)| *builtin == name)
            .ok_or_else(|| SquadError::ArchetypeNotFound(name.to_string()))?;
        Self::from_toml_str(content)
    }

    /// Number of units a freshly spawned squad gets
    pub fn initial_unit_count(&self) -> usize {
        self.formations.initial().len()
    }
}

/// Read-only lookup of archetypes by name
#[derive(Debug, Clone, Default)]
pub struct ArchetypeRegistry {
    by_name: AHashMap<String, Arc<SquadArchetype>>,
}

impl ArchetypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every builtin archetype
    pub fn with_defaults() -> Result<Self> {
        let mut registry = Self::new();
        for (name, _) in BUILTIN_ARCHETYPES {
            registry.insert(SquadArchetype::builtin(name)?);
        }
        Ok(registry)
    }

    /// Add an archetype, replacing any previous one with the same name
    pub fn insert(&mut self, archetype: SquadArchetype) -> Arc<SquadArchetype> {
        let shared = Arc::new(archetype);
        self.by_name.insert(shared.name.clone(), Arc::clone(&shared));
        shared
    }

    /// Load every `.toml` file in a directory
    pub fn load_directory(&mut self, path: &Path) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in std::fs::read_dir(path)? {
            let entry_path = entry?.path();
            if entry_path.extension().map_or(false, |ext| ext == "toml") {
                let archetype = SquadArchetype::load(&entry_path)?;
                tracing::debug!(
                    "Loaded archetype '{}' ({} formations) from {:?}",
                    archetype.name,
                    archetype.formations.len(),
                    entry_path
                );
                names.push(archetype.name.clone());
                self.insert(archetype);
            }
        }
        names.sort();
        Ok(names)
    }

    pub fn get(&self, name: &str) -> Option<Arc<SquadArchetype>> {
        self.by_name.get(name).cloned()
    }

    /// Like `get`, but reports a missing archetype as an error
    pub fn require(&self, name: &str) -> Result<Arc<SquadArchetype>> {
        self.get(name)
            .ok_or_else(|| SquadError::ArchetypeNotFound(name.to_string()))
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.by_name.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}
