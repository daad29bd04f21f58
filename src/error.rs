//! Error types for the simulator.

use std::path::PathBuf;
use thiserror::Error;

/// Invalid simulation parameters, rejected at construction time.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SettingsError {
    /// Grid extents must both be positive.
    #[error("board dimensions must be positive, got {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    /// The saturation cap must be positive.
    #[error("max mass must be positive, got {0}")]
    InvalidMaxMass(i32),

    /// Seed density is a probability.
    #[error("seed density must be within 0.0..=1.0, got {0}")]
    InvalidDensity(f64),
}

/// Failures while reading or writing config and preset files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine config directory")]
    NoConfigDir,

    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error(transparent)]
    Settings(#[from] SettingsError),
}

/// Failures while exporting snapshots or recordings.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("board is too large to export ({width}x{height})")]
    TooLarge { width: usize, height: usize },

    #[error("failed to write image: {0}")]
    Image(#[from] image::ImageError),

    #[error("failed to encode gif: {0}")]
    Gif(#[from] gif::EncodingError),

    #[error("failed to create {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_error_messages() {
        let err = SettingsError::InvalidDimensions { width: 0, height: 4 };
        assert_eq!(err.to_string(), "board dimensions must be positive, got 0x4");
        assert_eq!(
            SettingsError::InvalidMaxMass(-2).to_string(),
            "max mass must be positive, got -2"
        );
    }

    #[test]
    fn test_config_error_wraps_settings_error() {
        let err: ConfigError = SettingsError::InvalidDensity(1.5).into();
        assert!(err.to_string().contains("1.5"));
    }
}
