//! Hero Squad - formation and order core for squads led by a hero

pub mod core;
pub mod squad;
