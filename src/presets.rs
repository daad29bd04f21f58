use crate::error::ConfigError;
use crate::settings::{BoundaryMode, SimulationSettings};
use log::warn;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// A named set of rule parameters. Board dimensions are not part of a
/// preset; applying one keeps the current grid size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    pub name: String,
    pub description: String,
    pub max_mass: i32,
    pub boundary: BoundaryMode,
    pub seed_density: f64,
}

impl Preset {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        max_mass: i32,
        boundary: BoundaryMode,
        seed_density: f64,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            max_mass,
            boundary,
            seed_density,
        }
    }

    /// Copy this preset's parameters onto `settings`
    pub fn apply(&self, settings: &mut SimulationSettings) {
        settings.max_mass = self.max_mass;
        settings.boundary = self.boundary;
        settings.seed_density = self.seed_density;
    }
}

/// Built-in presets plus user presets stored as JSON files
pub struct PresetManager {
    /// Built-in presets that ship with the app
    pub builtin: Vec<Preset>,
    /// User-created presets loaded from disk
    pub user: Vec<Preset>,
    dir: Option<PathBuf>,
}

impl Default for PresetManager {
    fn default() -> Self {
        Self::new()
    }
}

impl PresetManager {
    /// Load built-ins and the user presets from the config directory
    pub fn new() -> Self {
        Self::with_dir(Self::default_dir())
    }

    /// Load built-ins and the user presets from `dir`
    pub fn with_dir(dir: Option<PathBuf>) -> Self {
        let mut manager = Self {
            builtin: builtin_presets(),
            user: Vec::new(),
            dir,
        };
        manager.load_user_presets();
        manager
    }

    /// Get the presets directory path
    fn default_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("brownian-ice").join("presets"))
    }

    /// Load user presets from disk
    fn load_user_presets(&mut self) {
        let Some(dir) = &self.dir else {
            return;
        };
        let Ok(entries) = fs::read_dir(dir) else {
            return;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if !path.extension().is_some_and(|e| e == "json") {
                continue;
            }
            match read_preset(&path) {
                Ok(preset) => self.user.push(preset),
                Err(err) => warn!("skipping preset: {}", err),
            }
        }
        self.user.sort_by(|a, b| a.name.cmp(&b.name));
    }

    fn preset_path(&self, name: &str) -> Result<PathBuf, ConfigError> {
        let dir = self.dir.as_ref().ok_or(ConfigError::NoConfigDir)?;
        Ok(dir.join(format!("{}.json", sanitize(name))))
    }

    /// Save a preset to disk, replacing a user preset of the same name
    pub fn save_preset(&mut self, preset: Preset) -> Result<(), ConfigError> {
        let path = self.preset_path(&preset.name)?;
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
        }

        let json = serde_json::to_string_pretty(&preset)?;
        fs::write(&path, json).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;

        match self.user.iter_mut().find(|p| p.name == preset.name) {
            Some(existing) => *existing = preset,
            None => self.user.push(preset),
        }
        Ok(())
    }

    /// Delete a user preset
    pub fn delete_preset(&mut self, name: &str) -> Result<(), ConfigError> {
        let path = self.preset_path(name)?;
        self.user.retain(|p| p.name != name);
        if path.exists() {
            fs::remove_file(&path).map_err(|source| ConfigError::Io { path, source })?;
        }
        Ok(())
    }

    /// Get all presets (builtin + user)
    pub fn all_presets(&self) -> impl Iterator<Item = &Preset> {
        self.builtin.iter().chain(self.user.iter())
    }

    /// Find a preset by name
    pub fn find(&self, name: &str) -> Option<&Preset> {
        self.all_presets().find(|p| p.name.eq_ignore_ascii_case(name))
    }

    pub fn len(&self) -> usize {
        self.builtin.len() + self.user.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Preset at a position in `all_presets` order, wrapping around
    pub fn get_wrapped(&self, index: usize) -> Option<&Preset> {
        if self.is_empty() {
            return None;
        }
        self.all_presets().nth(index % self.len())
    }
}

/// The parameter sets the simulation has historically been run with
fn builtin_presets() -> Vec<Preset> {
    vec![
        Preset::new(
            "Classic",
            "Sparse gas in a walled box",
            6,
            BoundaryMode::Bounded,
            0.04,
        ),
        Preset::new(
            "Toroidal",
            "Classic rules on a wrapping board",
            6,
            BoundaryMode::Wrap,
            0.04,
        ),
        Preset::new(
            "Dense",
            "Crowded board with a higher saturation cap",
            8,
            BoundaryMode::Bounded,
            0.20,
        ),
        Preset::new(
            "Trickle",
            "Very little gas, slow thin growth",
            6,
            BoundaryMode::Bounded,
            0.01,
        ),
        Preset::new(
            "Storm",
            "Heavy gas on a wrapping board",
            8,
            BoundaryMode::Wrap,
            0.10,
        ),
    ]
}

fn read_preset(path: &Path) -> Result<Preset, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Sanitize a preset name into a file stem
fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_builtins_are_valid() {
        let manager = PresetManager::with_dir(None);
        assert_eq!(manager.len(), 5);
        for preset in manager.all_presets() {
            let mut settings = SimulationSettings::default();
            preset.apply(&mut settings);
            assert!(settings.validate().is_ok(), "{} is invalid", preset.name);
        }
    }

    #[test]
    fn test_find_is_case_insensitive() {
        let manager = PresetManager::with_dir(None);
        let preset = manager.find("dense").unwrap();
        assert_eq!(preset.max_mass, 8);
        assert!(manager.find("nope").is_none());
    }

    #[test]
    fn test_apply_keeps_dimensions() {
        let manager = PresetManager::with_dir(None);
        let mut settings = SimulationSettings {
            width: 11,
            height: 7,
            ..Default::default()
        };
        manager.find("Storm").unwrap().apply(&mut settings);
        assert_eq!((settings.width, settings.height), (11, 7));
        assert_eq!(settings.boundary, BoundaryMode::Wrap);
        assert_eq!(settings.seed_density, 0.10);
    }

    #[test]
    fn test_get_wrapped() {
        let manager = PresetManager::with_dir(None);
        assert_eq!(manager.get_wrapped(0).unwrap().name, "Classic");
        assert_eq!(manager.get_wrapped(5).unwrap().name, "Classic");
        assert_eq!(manager.get_wrapped(6).unwrap().name, "Toroidal");
    }

    #[test]
    fn test_save_load_and_delete_user_preset() {
        let dir = tempdir().unwrap();
        let presets_dir = dir.path().join("presets");

        let mut manager = PresetManager::with_dir(Some(presets_dir.clone()));
        let preset = Preset::new("My Mix!", "custom", 7, BoundaryMode::Wrap, 0.15);
        manager.save_preset(preset.clone()).unwrap();
        assert!(presets_dir.join("My_Mix_.json").exists());

        let reloaded = PresetManager::with_dir(Some(presets_dir.clone()));
        assert_eq!(reloaded.user, vec![preset]);
        assert_eq!(reloaded.find("my mix!").map(|p| p.max_mass), Some(7));

        manager.delete_preset("My Mix!").unwrap();
        assert!(manager.user.is_empty());
        assert!(!presets_dir.join("My_Mix_.json").exists());
    }

    #[test]
    fn test_invalid_preset_files_are_skipped() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("broken.json"), "not valid json").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        let manager = PresetManager::with_dir(Some(dir.path().to_path_buf()));
        assert!(manager.user.is_empty());
    }

    #[test]
    fn test_save_without_dir_fails() {
        let mut manager = PresetManager::with_dir(None);
        let result = manager.save_preset(Preset::new("x", "", 6, BoundaryMode::Bounded, 0.1));
        assert!(matches!(result, Err(ConfigError::NoConfigDir)));
    }
}
