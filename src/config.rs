use crate::error::ConfigError;
use crate::settings::SimulationSettings;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Complete application configuration for export/import
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Version field for future compatibility
    pub version: u32,
    /// All simulation settings
    pub settings: SimulationSettings,
    /// Ticks per frame (app-level)
    pub ticks_per_frame: usize,
    /// Stats panel visibility (app-level)
    pub show_stats: bool,
}

impl AppConfig {
    /// Default config file location
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("brownian-ice").join("config.json"))
    }

    /// Export config to a JSON file
    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
        }
        fs::write(path, json).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("wrote config to {}", path.display());
        Ok(())
    }

    /// Import config from a JSON file. The embedded settings must be valid.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: AppConfig = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.settings.validate()?;
        debug!("loaded config from {}", path.display());
        Ok(config)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: 1,
            settings: SimulationSettings::default(),
            ticks_per_frame: 3,
            show_stats: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::BoundaryMode;
    use tempfile::NamedTempFile;

    #[test]
    fn test_all_fields_preserved() {
        let original = AppConfig {
            version: 1,
            settings: SimulationSettings {
                width: 64,
                height: 40,
                max_mass: 8,
                boundary: BoundaryMode::Wrap,
                seed_density: 0.2,
                rng_seed: Some(99),
            },
            ticks_per_frame: 12,
            show_stats: false,
        };

        let json = serde_json::to_string(&original).unwrap();
        let restored: AppConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, original);
    }

    #[test]
    fn test_config_file_save_and_load() {
        let config = AppConfig::default();
        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path().to_path_buf();

        config.save_to_file(&path).unwrap();
        let loaded = AppConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_seed_defaults_to_none() {
        let json = r#"{
            "version": 1,
            "settings": {"width": 10, "height": 10, "max_mass": 6, "boundary": "Bounded", "seed_density": 0.04},
            "ticks_per_frame": 3,
            "show_stats": true
        }"#;
        let config: AppConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.settings.rng_seed, None);
    }

    #[test]
    fn test_invalid_settings_rejected_on_load() {
        let mut config = AppConfig::default();
        config.settings.max_mass = -3;
        let temp_file = NamedTempFile::new().unwrap();
        config.save_to_file(temp_file.path()).unwrap();

        let result = AppConfig::load_from_file(temp_file.path());
        assert!(matches!(result, Err(ConfigError::Settings(_))));
    }

    #[test]
    fn test_invalid_config_file() {
        let temp_file = NamedTempFile::new().unwrap();
        std::fs::write(temp_file.path(), "not valid json").unwrap();

        let result = AppConfig::load_from_file(temp_file.path());
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_missing_config_file() {
        let result = AppConfig::load_from_file(Path::new("/nonexistent/path/config.json"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }
}
