//! # exif-forge
//!
//! Synthesize plausible camera, location and authorship metadata, serialize
//! it into a TIFF/EXIF container, and re-encode images to JPEG or WebP with
//! that container embedded.
//!
//! ## Quick Start
//!
//! The pipeline handles the full decode → synthesize → encode flow:
//!
//! ```rust,no_run
//! use exif_forge::codec::TargetFormat;
//! use exif_forge::config::Config;
//! use exif_forge::pipeline::{Pipeline, PipelineVariant, ProcessRequest};
//! use exif_forge::profile::{ProfileMode, ThreadRngPicker};
//!
//! fn main() -> anyhow::Result<()> {
//!     let pipeline = Pipeline::new(Config::load(Some("config.json".as_ref()))?)?;
//!
//!     let request = ProcessRequest {
//!         variant: PipelineVariant::Direct(TargetFormat::WebP),
//!         metadata: Some(ProfileMode::Authorship {
//!             description: Some("sunset".into()),
//!             keywords: Some("beach,summer".into()),
//!         }),
//!         quality: None,
//!     };
//!
//!     let input = std::fs::read("photo.png")?;
//!     let output = pipeline.process(&input, &request, &mut ThreadRngPicker)?;
//!     std::fs::write("photo.webp", &output.bytes)?;
//!     println!("EXIF: {:?}", output.exif);
//!     Ok(())
//! }
//! ```
//!
//! ## Lower-Level Usage
//!
//! Profiles and containers can be built without touching pixels:
//!
//! ```rust,no_run
//! use exif_forge::config::Config;
//! use exif_forge::exif;
//! use exif_forge::profile::{ProfileGenerator, ProfileMode, SequencePicker};
//!
//! # fn main() -> anyhow::Result<()> {
//! let generator = ProfileGenerator::new(Config::default().profiles)?;
//! let profile = generator.generate(&ProfileMode::Camera, 800, 600, &mut SequencePicker::new([0]));
//! let tiff = exif::build(&profile)?;
//! println!("{} byte EXIF block", tiff.len());
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`config`] — Configuration types and loading/saving
//! - [`profile`] — Metadata profile generation and the injectable random picker
//! - [`exif`] — Field encoding, container building and reading EXIF back
//! - [`codec`] — Pixel decode/encode seam and the default JPEG/WebP codec
//! - [`pipeline`] — Re-encode pipeline variants and batch input collection
//! - [`fetch`] — Remote image fetching and input sources
//! - [`error`] — Request-scoped error taxonomy

pub mod codec;
pub mod config;
pub mod error;
pub mod exif;
pub mod fetch;
pub mod pipeline;
pub mod profile;
