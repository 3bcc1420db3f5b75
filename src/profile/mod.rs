//! Metadata profile synthesis.
//!
//! A [`MetadataProfile`] is the semantic, pre-binary description of what ends
//! up in the EXIF container. It is either a randomized camera profile (brand,
//! model and location drawn from the configured catalogs) or a fixed
//! authorship profile carrying artist, copyright and optional caption text.
//! The two shapes are separate variants so the container builder can match on
//! them exhaustively.

mod random;

pub use random::{Picker, RngPicker, SequencePicker, ThreadRngPicker, pick};

use anyhow::Result;
use chrono::{Datelike, Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::config::{CameraBrand, ProfileConfig};

/// EXIF date-time layout, `YYYY:MM:DD HH:MM:SS`.
pub const TIMESTAMP_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

/// One axis of a GPS position: a degree/minute/second triplet plus hemisphere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeoCoordinate {
    pub dms: [u32; 3],
    /// `N`/`S` for latitude, `E`/`W` for longitude.
    pub reference: char,
}

impl GeoCoordinate {
    pub const fn new(dms: [u32; 3], reference: char) -> Self {
        Self { dms, reference }
    }
}

/// A named latitude/longitude pair. Both axes are always taken from the same preset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationPreset {
    pub name: String,
    pub latitude: GeoCoordinate,
    pub longitude: GeoCoordinate,
}

/// GPS data attached to a camera profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GpsPosition {
    pub latitude: GeoCoordinate,
    pub longitude: GeoCoordinate,
}

impl From<&LocationPreset> for GpsPosition {
    fn from(preset: &LocationPreset) -> Self {
        Self {
            latitude: preset.latitude,
            longitude: preset.longitude,
        }
    }
}

/// Fields shared by every profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capture {
    pub make: String,
    pub model: String,
    pub software: String,
    /// Formatted with [`TIMESTAMP_FORMAT`].
    pub timestamp: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraProfile {
    pub capture: Capture,
    pub gps: Option<GpsPosition>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorshipProfile {
    pub capture: Capture,
    pub artist: String,
    pub copyright: String,
    pub description: Option<String>,
    pub keywords: Option<String>,
}

/// Immutable metadata to embed, in exactly one of the two generation modes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataProfile {
    Camera(CameraProfile),
    Authorship(AuthorshipProfile),
}

impl MetadataProfile {
    pub fn capture(&self) -> &Capture {
        match self {
            Self::Camera(p) => &p.capture,
            Self::Authorship(p) => &p.capture,
        }
    }

    pub fn gps(&self) -> Option<&GpsPosition> {
        match self {
            Self::Camera(p) => p.gps.as_ref(),
            Self::Authorship(_) => None,
        }
    }

    pub fn keywords(&self) -> Option<&str> {
        match self {
            Self::Camera(_) => None,
            Self::Authorship(p) => p.keywords.as_deref(),
        }
    }
}

/// Which kind of profile to generate.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ProfileMode {
    #[default]
    Camera,
    Authorship {
        description: Option<String>,
        keywords: Option<String>,
    },
}

/// Draws profiles from a validated [`ProfileConfig`].
#[derive(Debug, Clone)]
pub struct ProfileGenerator {
    config: ProfileConfig,
}

impl ProfileGenerator {
    /// Fails when a catalog the camera mode draws from is empty.
    pub fn new(config: ProfileConfig) -> Result<Self> {
        if config.cameras.is_empty() || config.cameras.iter().any(|b| b.models.is_empty()) {
            anyhow::bail!("camera catalog needs at least one brand, each with at least one model");
        }
        if config.locations.is_empty() {
            anyhow::bail!("location catalog needs at least one preset");
        }
        Ok(Self { config })
    }

    /// Generate a profile stamped with the local clock.
    pub fn generate(
        &self,
        mode: &ProfileMode,
        width: u32,
        height: u32,
        picker: &mut dyn Picker,
    ) -> MetadataProfile {
        self.generate_at(mode, width, height, picker, Local::now().naive_local())
    }

    /// Generate a profile as of `now`.
    pub fn generate_at(
        &self,
        mode: &ProfileMode,
        width: u32,
        height: u32,
        picker: &mut dyn Picker,
        now: NaiveDateTime,
    ) -> MetadataProfile {
        let timestamp = now.format(TIMESTAMP_FORMAT).to_string();

        match mode {
            ProfileMode::Camera => {
                let (brand, model) = self.pick_camera(picker);
                let location = self.pick_location(picker);
                log::debug!(
                    "Camera profile: {} {} at {}",
                    brand.make,
                    model,
                    location.name
                );
                MetadataProfile::Camera(CameraProfile {
                    capture: Capture {
                        make: brand.make.clone(),
                        model: model.to_string(),
                        software: self.config.camera_software.clone(),
                        timestamp,
                        width,
                        height,
                    },
                    gps: Some(GpsPosition::from(location)),
                })
            }
            ProfileMode::Authorship {
                description,
                keywords,
            } => {
                let identity = &self.config.authorship;
                MetadataProfile::Authorship(AuthorshipProfile {
                    capture: Capture {
                        make: identity.make.clone(),
                        model: identity.model.clone(),
                        software: identity.software.clone(),
                        timestamp,
                        width,
                        height,
                    },
                    artist: identity.artist.clone(),
                    copyright: format!("Copyright {} {}", now.year(), identity.copyright_holder),
                    description: non_blank(description.as_deref()),
                    keywords: non_blank(keywords.as_deref()),
                })
            }
        }
    }

    fn pick_camera(&self, picker: &mut dyn Picker) -> (&CameraBrand, &str) {
        let cameras = &self.config.cameras;
        let brand = pick(picker, cameras).unwrap_or(&cameras[0]);
        let model = pick(picker, &brand.models).unwrap_or(&brand.models[0]);
        (brand, model.as_str())
    }

    fn pick_location(&self, picker: &mut dyn Picker) -> &LocationPreset {
        let locations = &self.config.locations;
        pick(picker, locations).unwrap_or(&locations[0])
    }
}

/// Blank optional text counts as absent; anything else is kept verbatim.
fn non_blank(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty()).map(str::to_string)
}
