use anyhow::Result as AnyResult;
use image::{ImageFormat, RgbImage};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::codec::{DefaultCodec, ImageCodec, Quality, TargetFormat};
use crate::config::{Config, EncodingConfig};
use crate::error::Result;
use crate::exif;
use crate::profile::{MetadataProfile, Picker, ProfileGenerator, ProfileMode};

/// Shape of the re-encode step.
///
/// `JpegThenWebp` is kept as its own variant rather than being collapsed into
/// `Direct(WebP)`: the intermediate JPEG pass changes the compression
/// characteristics of the final WebP even though its EXIF does not survive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineVariant {
    /// Decode and encode once into the target format.
    Direct(TargetFormat),
    /// Decode, encode to JPEG with EXIF, decode that JPEG, encode to WebP.
    JpegThenWebp,
}

impl PipelineVariant {
    /// Container format of the final output.
    pub fn output_format(&self) -> TargetFormat {
        match self {
            Self::Direct(format) => *format,
            Self::JpegThenWebp => TargetFormat::WebP,
        }
    }
}

/// What happened to the synthesized EXIF block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExifOutcome {
    /// No metadata was requested.
    NotRequested,
    /// The block is present in the output.
    Embedded,
    /// The block was written into the intermediate JPEG but the WebP hop
    /// did not carry it forward.
    DroppedAtWebpHop,
}

/// One conversion request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessRequest {
    pub variant: PipelineVariant,
    /// `None` skips metadata synthesis entirely.
    pub metadata: Option<ProfileMode>,
    /// Overrides the configured default for the output format.
    pub quality: Option<Quality>,
}

impl Default for ProcessRequest {
    fn default() -> Self {
        Self {
            variant: PipelineVariant::Direct(TargetFormat::Jpeg),
            metadata: Some(ProfileMode::Camera),
            quality: None,
        }
    }
}

/// The result of processing a single image.
#[derive(Debug, Clone)]
pub struct Reencoded {
    pub bytes: Vec<u8>,
    pub format: TargetFormat,
    pub exif: ExifOutcome,
    /// The profile that was synthesized, if any.
    pub profile: Option<MetadataProfile>,
}

/// Request-scoped decode → synthesize → encode pipeline.
///
/// A `Pipeline` holds no mutable state, so one instance can serve any number
/// of concurrent requests; each call brings its own [`Picker`].
///
/// # Example
///
/// ```rust,no_run
/// use exif_forge::config::Config;
/// use exif_forge::pipeline::{Pipeline, ProcessRequest};
/// use exif_forge::profile::ThreadRngPicker;
///
/// let pipeline = Pipeline::new(Config::default()).unwrap();
/// let input = std::fs::read("photo.png").unwrap();
/// let output = pipeline
///     .process(&input, &ProcessRequest::default(), &mut ThreadRngPicker)
///     .unwrap();
/// std::fs::write("photo.jpg", &output.bytes).unwrap();
/// ```
pub struct Pipeline {
    encoding: EncodingConfig,
    generator: ProfileGenerator,
    codec: Box<dyn ImageCodec>,
}

impl Pipeline {
    /// Build a pipeline over the default codec. Fails on an invalid config.
    pub fn new(config: Config) -> AnyResult<Self> {
        Self::with_codec(config, Box::new(DefaultCodec))
    }

    pub fn with_codec(config: Config, codec: Box<dyn ImageCodec>) -> AnyResult<Self> {
        config.validate()?;
        Ok(Self {
            generator: ProfileGenerator::new(config.profiles)?,
            encoding: config.encoding,
            codec,
        })
    }

    pub fn generator(&self) -> &ProfileGenerator {
        &self.generator
    }

    /// Configured quality for a final output format.
    pub fn default_quality(&self, format: TargetFormat) -> Result<Quality> {
        match format {
            TargetFormat::Jpeg => Quality::new(self.encoding.jpeg_quality),
            TargetFormat::WebP => Quality::new(self.encoding.webp_quality),
        }
    }

    /// Decode `input`, attach a freshly synthesized profile if requested and
    /// re-encode it. Nothing is returned unless every stage succeeds.
    pub fn process(
        &self,
        input: &[u8],
        request: &ProcessRequest,
        picker: &mut dyn Picker,
    ) -> Result<Reencoded> {
        let pixels = self.codec.decode(input)?;
        let (width, height) = pixels.dimensions();

        let profile = request
            .metadata
            .as_ref()
            .map(|mode| self.generator.generate(mode, width, height, picker));
        let blob = profile.as_ref().map(exif::build).transpose()?;

        let quality = match request.quality {
            Some(quality) => quality,
            None => self.default_quality(request.variant.output_format())?,
        };

        let (bytes, outcome) =
            self.reencode(&pixels, request.variant, blob.as_deref(), quality)?;
        log::info!(
            "Encoded {}x{} image as {} ({} bytes, EXIF {:?})",
            width,
            height,
            request.variant.output_format(),
            bytes.len(),
            outcome
        );

        Ok(Reencoded {
            bytes,
            format: request.variant.output_format(),
            exif: outcome,
            profile,
        })
    }

    /// Encode a decoded buffer according to `variant`.
    ///
    /// For `JpegThenWebp`, `quality` applies to the final WebP pass; the JPEG
    /// hop uses the configured intermediate quality.
    pub fn reencode(
        &self,
        pixels: &RgbImage,
        variant: PipelineVariant,
        exif: Option<&[u8]>,
        quality: Quality,
    ) -> Result<(Vec<u8>, ExifOutcome)> {
        match variant {
            PipelineVariant::Direct(format) => {
                let bytes = self.codec.encode(pixels, format, quality, exif)?;
                let outcome = if exif.is_some() {
                    ExifOutcome::Embedded
                } else {
                    ExifOutcome::NotRequested
                };
                Ok((bytes, outcome))
            }
            PipelineVariant::JpegThenWebp => {
                let intermediate_quality = Quality::new(self.encoding.intermediate_jpeg_quality)?;
                let jpeg = self
                    .codec
                    .encode(pixels, TargetFormat::Jpeg, intermediate_quality, exif)?;
                log::debug!("Intermediate JPEG: {} bytes", jpeg.len());

                let decoded = self.codec.decode(&jpeg)?;
                let webp = self.codec.encode(&decoded, TargetFormat::WebP, quality, None)?;

                let outcome = if exif.is_some() {
                    log::warn!("EXIF written to the intermediate JPEG is not carried into the WebP output");
                    ExifOutcome::DroppedAtWebpHop
                } else {
                    ExifOutcome::NotRequested
                };
                Ok((webp, outcome))
            }
        }
    }
}

/// Expand command-line paths into the image files a batch run converts.
///
/// Directories are walked recursively in file-name order, following
/// symlinks. A file named explicitly but not decodable, or a path that does
/// not exist, is reported and skipped; the rest of the batch still runs.
pub fn collect_images(paths: &[PathBuf]) -> Vec<PathBuf> {
    paths
        .iter()
        .flat_map(|root| {
            if !root.exists() {
                log::warn!("Path does not exist: {}", root.display());
                return Vec::new();
            }
            if root.is_file() && !is_decodable(root) {
                log::warn!("Not a decodable image, skipping: {}", root.display());
                return Vec::new();
            }
            WalkDir::new(root)
                .follow_links(true)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|entry| entry.ok())
                .filter(|entry| entry.file_type().is_file() && is_decodable(entry.path()))
                .map(walkdir::DirEntry::into_path)
                .collect()
        })
        .collect()
}

/// Whether the extension names a format the default codec decodes.
fn is_decodable(path: &Path) -> bool {
    matches!(
        ImageFormat::from_path(path),
        Ok(ImageFormat::Jpeg
            | ImageFormat::Png
            | ImageFormat::WebP
            | ImageFormat::Gif
            | ImageFormat::Bmp
            | ImageFormat::Tiff)
    )
}

/// Where to write the converted form of `input`.
///
/// The file stem is kept and the extension replaced. An output that would
/// overwrite its own source gets a `-forged` suffix instead.
pub fn output_path(input: &Path, out_dir: Option<&Path>, format: TargetFormat) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    let dir = match out_dir {
        Some(dir) => dir.to_path_buf(),
        None => input.parent().map(Path::to_path_buf).unwrap_or_default(),
    };

    let candidate = dir.join(format!("{stem}.{}", format.extension()));
    if candidate == input {
        dir.join(format!("{stem}-forged.{}", format.extension()))
    } else {
        candidate
    }
}
