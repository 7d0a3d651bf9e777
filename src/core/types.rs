//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};

/// Simulation step counter
pub type Tick = u64;

/// Opaque identifier for a hero owned by the hero subsystem
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HeroId(pub u32);

impl HeroId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }
}

/// Handle to a squad record in the world arena
///
/// Becomes stale once the squad is despawned; lookups through a stale
/// handle return `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SquadId {
    pub index: u32,
    pub generation: u32,
}

impl SquadId {
    pub fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }
}

/// Handle to a unit record in the world arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitId {
    pub index: u32,
    pub generation: u32,
}

impl UnitId {
    pub fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }
}

/// Conversion between typed handles and raw arena slot coordinates
pub trait ArenaHandle: Copy {
    fn from_parts(index: u32, generation: u32) -> Self;
    fn index(&self) -> u32;
    fn generation(&self) -> u32;
}

impl ArenaHandle for SquadId {
    fn from_parts(index: u32, generation: u32) -> Self {
        Self::new(index, generation)
    }

    fn index(&self) -> u32 {
        self.index
    }

    fn generation(&self) -> u32 {
        self.generation
    }
}

impl ArenaHandle for UnitId {
    fn from_parts(index: u32, generation: u32) -> Self {
        Self::new(index, generation)
    }

    fn index(&self) -> u32 {
        self.index
    }

    fn generation(&self) -> u32 {
        self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_equality_includes_generation() {
        let a = SquadId::new(3, 0);
        let b = SquadId::new(3, 1);
        assert_ne!(a, b);
        assert_eq!(a, SquadId::new(3, 0));
    }

    #[test]
    fn test_handle_hash() {
        use std::collections::HashMap;
        let mut map: HashMap<UnitId, &str> = HashMap::new();
        map.insert(UnitId::new(1, 2), "pikeman");
        assert_eq!(map.get(&UnitId::new(1, 2)), Some(&"pikeman"));
        assert_eq!(map.get(&UnitId::new(1, 3)), None);
    }

    #[test]
    fn test_handle_ordering_by_index_first() {
        assert!(SquadId::new(1, 9) < SquadId::new(2, 0));
    }
}
