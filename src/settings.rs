use crate::error::SettingsError;
use serde::{Deserialize, Serialize};

/// Boundary mode - how the grid edges behave
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BoundaryMode {
    /// Edges are walls; reads past an edge clamp to the edge cell
    #[default]
    Bounded,
    /// Edges connect to the opposite side (toroidal)
    Wrap,
}

impl BoundaryMode {
    pub fn name(&self) -> &str {
        match self {
            BoundaryMode::Bounded => "Bounded",
            BoundaryMode::Wrap => "Wrap",
        }
    }

    pub fn toggle(&self) -> Self {
        match self {
            BoundaryMode::Bounded => BoundaryMode::Wrap,
            BoundaryMode::Wrap => BoundaryMode::Bounded,
        }
    }

    pub fn is_wrapping(&self) -> bool {
        *self == BoundaryMode::Wrap
    }
}

/// All simulation parameters consolidated into one struct
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationSettings {
    /// Grid width in cells
    pub width: usize,
    /// Grid height in cells
    pub height: usize,
    /// Saturation cap for gas mass in a single cell
    pub max_mass: i32,
    /// What happens at the grid edges
    pub boundary: BoundaryMode,
    /// Chance that a cell starts as full gas on a random reset (0.0-1.0)
    pub seed_density: f64,
    /// Fixed RNG seed for reproducible runs
    #[serde(default)]
    pub rng_seed: Option<u64>,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            width: 48,
            height: 36,
            max_mass: 6,
            boundary: BoundaryMode::default(),
            // A cell starts as gas when a uniform draw exceeds 0.96
            seed_density: 0.04,
            rng_seed: None,
        }
    }
}

impl SimulationSettings {
    /// Reject parameters the simulation cannot run with
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.width == 0 || self.height == 0 {
            return Err(SettingsError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        if self.max_mass <= 0 {
            return Err(SettingsError::InvalidMaxMass(self.max_mass));
        }
        if !(0.0..=1.0).contains(&self.seed_density) {
            return Err(SettingsError::InvalidDensity(self.seed_density));
        }
        Ok(())
    }

    /// Adjust seed density within bounds
    pub fn adjust_seed_density(&mut self, delta: f64) {
        self.seed_density = (self.seed_density + delta).clamp(0.0, 1.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(SimulationSettings::default().validate().is_ok());
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        let settings = SimulationSettings {
            width: 0,
            ..Default::default()
        };
        assert_eq!(
            settings.validate(),
            Err(SettingsError::InvalidDimensions { width: 0, height: 36 })
        );
    }

    #[test]
    fn test_non_positive_max_mass_rejected() {
        let settings = SimulationSettings {
            max_mass: 0,
            ..Default::default()
        };
        assert_eq!(settings.validate(), Err(SettingsError::InvalidMaxMass(0)));
    }

    #[test]
    fn test_density_out_of_range_rejected() {
        let settings = SimulationSettings {
            seed_density: 1.2,
            ..Default::default()
        };
        assert_eq!(settings.validate(), Err(SettingsError::InvalidDensity(1.2)));
    }

    #[test]
    fn test_adjust_seed_density_clamps() {
        let mut settings = SimulationSettings::default();
        settings.adjust_seed_density(-1.0);
        assert_eq!(settings.seed_density, 0.0);
        settings.adjust_seed_density(5.0);
        assert_eq!(settings.seed_density, 1.0);
    }

    #[test]
    fn test_boundary_toggle() {
        assert_eq!(BoundaryMode::Bounded.toggle(), BoundaryMode::Wrap);
        assert_eq!(BoundaryMode::Wrap.toggle(), BoundaryMode::Bounded);
        assert!(BoundaryMode::Wrap.is_wrapping());
        assert!(!BoundaryMode::default().is_wrapping());
    }
}
