use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::profile::{GeoCoordinate, LocationPreset};

/// Top-level configuration for the exif-forge library.
///
/// Controls the catalogs profiles are drawn from, the fixed authorship
/// identity, compression defaults and remote fetch behavior.
///
/// # Loading
///
/// ```rust,no_run
/// use exif_forge::config::Config;
///
/// // From a JSON file
/// let config = Config::load(Some("config.json".as_ref())).unwrap();
///
/// // Or use defaults and customize
/// let mut config = Config::default();
/// config.encoding.webp_quality = 80;
/// config.profiles.authorship.artist = "Jane Doe".into();
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Camera catalog, location presets and authorship identity.
    pub profiles: ProfileConfig,
    /// Default compression qualities per output format.
    pub encoding: EncodingConfig,
    /// Remote image fetch settings.
    pub fetch: FetchConfig,
}

/// Catalogs used by the profile generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileConfig {
    /// Brands in selection order; each model belongs to exactly one brand.
    pub cameras: Vec<CameraBrand>,
    /// Location presets; latitude and longitude always travel together.
    pub locations: Vec<LocationPreset>,
    /// Software label stamped on camera profiles.
    pub camera_software: String,
    /// Fixed identity used for authorship profiles.
    pub authorship: AuthorshipIdentity,
}

/// A camera brand and the models it sells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraBrand {
    pub make: String,
    pub models: Vec<String>,
}

/// The non-random identity written into authorship profiles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorshipIdentity {
    pub make: String,
    pub model: String,
    pub software: String,
    pub artist: String,
    /// Rendered as `Copyright {year} {copyright_holder}`.
    pub copyright_holder: String,
}

/// Compression defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncodingConfig {
    /// JPEG outputs carrying EXIF.
    pub jpeg_quality: u8,
    /// WebP outputs.
    pub webp_quality: u8,
    /// The JPEG hop of the JPEG→WebP pipeline.
    pub intermediate_jpeg_quality: u8,
}

/// Remote fetch settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Prefix joined with bare document identifiers. Absolute URLs ignore it.
    pub base_url: Option<String>,
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            profiles: ProfileConfig {
                cameras: vec![
                    CameraBrand {
                        make: "SONY".to_string(),
                        models: vec!["ILCE-7M3".to_string(), "ILCE-9".to_string()],
                    },
                    CameraBrand {
                        make: "Canon".to_string(),
                        models: vec![
                            "Canon EOS R5".to_string(),
                            "Canon EOS Rebel T8i".to_string(),
                        ],
                    },
                ],
                locations: vec![
                    LocationPreset {
                        name: "New York".to_string(),
                        latitude: GeoCoordinate::new([40, 42, 46], 'N'),
                        longitude: GeoCoordinate::new([74, 0, 21], 'W'),
                    },
                    LocationPreset {
                        name: "Los Angeles".to_string(),
                        latitude: GeoCoordinate::new([34, 3, 8], 'N'),
                        longitude: GeoCoordinate::new([118, 14, 37], 'W'),
                    },
                    LocationPreset {
                        name: "Algiers".to_string(),
                        latitude: GeoCoordinate::new([36, 45, 0], 'N'),
                        longitude: GeoCoordinate::new([3, 3, 0], 'E'),
                    },
                ],
                camera_software: "Adobe Lightroom".to_string(),
                authorship: AuthorshipIdentity {
                    make: "Canon".to_string(),
                    model: "Canon EOS R5".to_string(),
                    software: "Adobe Lightroom".to_string(),
                    artist: "exif-forge".to_string(),
                    copyright_holder: "exif-forge".to_string(),
                },
            },
            encoding: EncodingConfig {
                jpeg_quality: 95,
                webp_quality: 90,
                intermediate_jpeg_quality: 95,
            },
            fetch: FetchConfig {
                base_url: None,
                timeout_secs: 30,
            },
        }
    }
}

impl Config {
    /// Resolve the config file path, next to the executable.
    pub fn config_path() -> Result<PathBuf> {
        let exe_path = std::env::current_exe().context("Failed to get executable path")?;
        let exe_dir = exe_path
            .parent()
            .context("Failed to get executable directory")?;
        Ok(exe_dir.join("config.json"))
    }

    /// Load config from the given path, or from the default location.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path()?,
        };

        if !config_path.exists() {
            log::warn!(
                "Config file not found at {}. Using defaults.",
                config_path.display()
            );
            return Ok(Self::default());
        }

        let contents =
            std::fs::read_to_string(&config_path).context("Failed to read config file")?;
        let config: Config =
            serde_json::from_str(&contents).context("Failed to parse config file")?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to the given path, or to the default location.
    pub fn save(&self, path: Option<&Path>) -> Result<()> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path()?,
        };

        let contents = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(&config_path, contents).context("Failed to write config file")?;
        log::info!("Config saved to {}", config_path.display());
        Ok(())
    }

    /// Reject catalogs the generator cannot draw from and out-of-range qualities.
    pub fn validate(&self) -> Result<()> {
        if self.profiles.cameras.is_empty() {
            anyhow::bail!("profiles.cameras must list at least one brand");
        }
        if let Some(brand) = self.profiles.cameras.iter().find(|b| b.models.is_empty()) {
            anyhow::bail!("camera brand {:?} has no models", brand.make);
        }
        if self.profiles.locations.is_empty() {
            anyhow::bail!("profiles.locations must list at least one preset");
        }
        for (name, q) in [
            ("jpeg_quality", self.encoding.jpeg_quality),
            ("webp_quality", self.encoding.webp_quality),
            ("intermediate_jpeg_quality", self.encoding.intermediate_jpeg_quality),
        ] {
            if !(1..=100).contains(&q) {
                anyhow::bail!("encoding.{name} must be in 1..=100 (got {q})");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_is_valid() {
        Config::default().validate().unwrap();
    }

    #[test]
    fn default_catalog_matches_presets() {
        let config = Config::default();
        let makes: Vec<&str> = config.profiles.cameras.iter().map(|b| b.make.as_str()).collect();
        assert_eq!(makes, ["SONY", "Canon"]);
        assert_eq!(config.profiles.locations.len(), 3);
        assert_eq!(config.profiles.locations[0].latitude.dms, [40, 42, 46]);
        assert_eq!(config.profiles.locations[0].longitude.reference, 'W');
    }

    #[test]
    fn save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");

        let mut config = Config::default();
        config.encoding.webp_quality = 75;
        config.fetch.base_url = Some("https://images.example.com/".to_string());
        config.save(Some(&path)).unwrap();

        let loaded = Config::load(Some(&path)).unwrap();
        assert_eq!(loaded.encoding.webp_quality, 75);
        assert_eq!(loaded.fetch.base_url.as_deref(), Some("https://images.example.com/"));
        assert_eq!(loaded.profiles.cameras, config.profiles.cameras);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load(Some(&dir.path().join("absent.json"))).unwrap();
        assert_eq!(config.encoding.jpeg_quality, 95);
    }

    #[test]
    fn rejects_empty_model_list() {
        let mut config = Config::default();
        config.profiles.cameras[1].models.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_quality_out_of_range() {
        let mut config = Config::default();
        config.encoding.webp_quality = 0;
        assert!(config.validate().is_err());
        config.encoding.webp_quality = 101;
        assert!(config.validate().is_err());
    }

    #[test]
    fn invalid_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(Config::load(Some(&path)).is_err());
    }
}
