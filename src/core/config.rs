//! Squad simulation configuration with documented constants
//!
//! All tunables are collected here. A config is an explicit value handed to
//! the `SquadWorld`; nothing reads it from process-wide state.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{Result, SquadError};
use crate::squad::constants::*;

/// Configuration for the squad formation systems
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SquadConfig {
    // === GRID ===
    /// World size of one formation grid cell
    pub cell_size: f32,

    // === ORDERS ===
    /// Time a squad must wait between formation changes
    pub formation_cooldown: f32,

    /// Two hold activations closer than this become a "cycle formation"
    pub double_activation_window: f32,

    // === UNIT FORMATION FSM ===
    /// Squared distance from the squad center the reference point may drift
    /// before formed units start to react
    ///
    /// At 25.0 the hero can wander 5 units before the squad breaks formation.
    pub formation_radius_sq: f32,

    /// Squared distance under which a unit counts as arrived at its slot
    ///
    /// Every arrival check goes through this one value.
    pub arrival_tolerance_sq: f32,

    /// Lower bound of the per-unit reaction delay
    pub wait_delay_min: f32,

    /// Upper bound of the per-unit reaction delay
    ///
    /// The spread between min and max staggers units so the squad does not
    /// start moving as one rigid block.
    pub wait_delay_max: f32,

    // === TACTICAL INTENT ===
    /// Members farther than this from the reference member mark the squad dispersed
    pub cohesion_radius: f32,

    // === MOVEMENT ===
    /// Slerp rate for unit orientation, per second
    pub turn_rate: f32,

    // === SPACING ===
    /// Units closer than this push each other apart
    pub min_separation: f32,

    /// Push per unit of overlap
    pub repel_strength: f32,

    /// Cap on the summed push applied to one unit per step
    pub max_push: f32,

    // === DETERMINISM ===
    /// Base seed for per-squad random generators
    pub seed: u64,
}

impl Default for SquadConfig {
    fn default() -> Self {
        Self {
            cell_size: DEFAULT_CELL_SIZE,

            formation_cooldown: FORMATION_CHANGE_COOLDOWN,
            double_activation_window: DOUBLE_ACTIVATION_WINDOW,

            formation_radius_sq: FORMATION_RADIUS_SQ,
            arrival_tolerance_sq: ARRIVAL_TOLERANCE_SQ,
            wait_delay_min: WAIT_DELAY_MIN,
            wait_delay_max: WAIT_DELAY_MAX,

            cohesion_radius: COHESION_RADIUS,

            turn_rate: TURN_RATE,

            min_separation: MIN_SEPARATION,
            repel_strength: REPEL_STRENGTH,
            max_push: MAX_SPACING_PUSH,

            seed: 0,
        }
    }
}

impl SquadConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from TOML, filling missing fields with defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: SquadConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config from a TOML file on disk
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.cell_size <= 0.0 {
            return Err(SquadError::InvalidConfig(format!(
                "cell_size ({}) must be positive",
                self.cell_size
            )));
        }

        if self.wait_delay_min < 0.0 || self.wait_delay_min > self.wait_delay_max {
            return Err(SquadError::InvalidConfig(format!(
                "wait delay range [{}, {}] must be non-negative and ordered",
                self.wait_delay_min, self.wait_delay_max
            )));
        }

        // Arrival must be decided well inside the formation radius
        if self.arrival_tolerance_sq >= self.formation_radius_sq {
            return Err(SquadError::InvalidConfig(format!(
                "arrival_tolerance_sq ({}) should be < formation_radius_sq ({})",
                self.arrival_tolerance_sq, self.formation_radius_sq
            )));
        }

        if self.formation_cooldown < 0.0 || self.double_activation_window < 0.0 {
            return Err(SquadError::InvalidConfig(
                "timers must not be negative".into(),
            ));
        }

        if self.max_push < 0.0 || self.min_separation < 0.0 || self.repel_strength < 0.0 {
            return Err(SquadError::InvalidConfig(
                "spacing parameters must not be negative".into(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(SquadConfig::default().validate().is_ok());
    }

    #[test]
    fn test_default_values() {
        let config = SquadConfig::default();
        assert_eq!(config.cell_size, 1.0);
        assert_eq!(config.formation_cooldown, 1.0);
        assert_eq!(config.double_activation_window, 0.5);
        assert_eq!(config.formation_radius_sq, 25.0);
        assert_eq!(config.max_push, 0.5);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = SquadConfig::from_toml_str("formation_cooldown = 2.0\nseed = 7\n").unwrap();
        assert_eq!(config.formation_cooldown, 2.0);
        assert_eq!(config.seed, 7);
        assert_eq!(config.cohesion_radius, COHESION_RADIUS);
    }

    #[test]
    fn test_rejects_inverted_wait_range() {
        let config = SquadConfig {
            wait_delay_min: 2.0,
            wait_delay_max: 1.0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(SquadError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_zero_cell_size() {
        let result = SquadConfig::from_toml_str("cell_size = 0.0");
        assert!(matches!(result, Err(SquadError::InvalidConfig(_))));
    }

    #[test]
    fn test_malformed_toml() {
        let result = SquadConfig::from_toml_str("cell_size = \"wide\"");
        assert!(matches!(result, Err(SquadError::TomlError(_))));
    }
}
