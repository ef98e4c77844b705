// Configuration management
//
// Handles presenter configuration and settings persistence.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::PathBuf;

use crate::viewport::ScalingMode;

/// Default configuration file path
const CONFIG_FILE: &str = "retroframe.toml";

/// Presenter configuration
///
/// Stores all user-configurable settings for the presentation pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresenterConfig {
    /// Video settings
    pub video: VideoConfig,

    /// Screenshot settings
    pub screenshot: ScreenshotConfig,
}

/// Video configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoConfig {
    /// Scaling mode at startup
    pub scaling: ScalingMode,

    /// Blend detected dither patterns
    pub filter_dithering: bool,

    /// Enable VSync
    pub vsync: bool,

    /// Conversion worker threads (0 = one per CPU core)
    pub workers: usize,
}

/// Screenshot configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenshotConfig {
    /// Screenshot directory
    pub screenshot_directory: PathBuf,
}

impl Default for PresenterConfig {
    fn default() -> Self {
        PresenterConfig {
            video: VideoConfig {
                scaling: ScalingMode::AspectFit,
                filter_dithering: true,
                vsync: true,
                workers: 0,
            },
            screenshot: ScreenshotConfig {
                screenshot_directory: PathBuf::from("screenshots"),
            },
        }
    }
}

impl PresenterConfig {
    /// Load configuration from file or create default
    ///
    /// If the configuration file doesn't exist, creates a default configuration
    /// and saves it to the file.
    ///
    /// # Returns
    ///
    /// The loaded or default configuration
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|_| {
            let config = Self::default();
            // Try to save the default config, but don't fail if we can't
            let _ = config.save();
            config
        })
    }

    /// Load configuration from file
    ///
    /// # Returns
    ///
    /// Result containing the configuration or an error
    pub fn load() -> Result<Self, io::Error> {
        let contents = fs::read_to_string(CONFIG_FILE)?;
        toml::from_str(&contents).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    /// Save configuration to file
    ///
    /// # Returns
    ///
    /// Result indicating success or error
    pub fn save(&self) -> Result<(), io::Error> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(CONFIG_FILE, contents)
    }

    /// Worker thread count with the 0 = auto rule resolved
    pub fn effective_workers(&self) -> usize {
        if self.video.workers == 0 {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        } else {
            self.video.workers
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PresenterConfig::default();
        assert_eq!(config.video.scaling, ScalingMode::AspectFit);
        assert!(config.video.filter_dithering);
        assert!(config.video.vsync);
        assert_eq!(config.video.workers, 0);
    }

    #[test]
    fn test_config_serialization() {
        let config = PresenterConfig::default();
        let toml_str = toml::to_string(&config).expect("Failed to serialize");
        let deserialized: PresenterConfig =
            toml::from_str(&toml_str).expect("Failed to deserialize");

        assert_eq!(config.video.scaling, deserialized.video.scaling);
        assert_eq!(config.video.filter_dithering, deserialized.video.filter_dithering);
    }

    #[test]
    fn test_scaling_mode_round_trips_as_snake_case() {
        let toml_str = "scaling = \"hq_stretch\"\nfilter_dithering = false\nvsync = true\nworkers = 4\n";
        let video: VideoConfig = toml::from_str(toml_str).expect("Failed to deserialize");
        assert_eq!(video.scaling, ScalingMode::HqStretch);
        assert_eq!(video.workers, 4);
    }

    #[test]
    fn test_effective_workers_explicit() {
        let mut config = PresenterConfig::default();
        config.video.workers = 3;
        assert_eq!(config.effective_workers(), 3);
    }

    #[test]
    fn test_effective_workers_auto_is_nonzero() {
        let config = PresenterConfig::default();
        assert!(config.effective_workers() >= 1);
    }
}
