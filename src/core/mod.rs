pub mod arena;
pub mod config;
pub mod error;
pub mod types;

pub use config::SquadConfig;
pub use error::{Result, SquadError};
