//! Pixel decode/encode behind the [`ImageCodec`] seam.
//!
//! The pipeline never touches compression itself. [`DefaultCodec`] decodes
//! with `image`, encodes JPEG with `image`'s encoder and WebP with libwebp,
//! and embeds the EXIF block with `img-parts`.

use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, ImageEncoder, RgbImage};
use img_parts::jpeg::Jpeg;
use img_parts::riff::{RiffChunk, RiffContent};
use img_parts::webp::WebP;
use img_parts::{Bytes, ImageEXIF};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

const CHUNK_VP8X: [u8; 4] = *b"VP8X";
const CHUNK_EXIF: [u8; 4] = *b"EXIF";
/// VP8X flag bit announcing an `EXIF` chunk.
const VP8X_EXIF_FLAG: u8 = 0x08;
const VP8X_LEN: usize = 10;

/// Output container format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetFormat {
    Jpeg,
    WebP,
}

impl TargetFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::WebP => "image/webp",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::WebP => "webp",
        }
    }
}

impl fmt::Display for TargetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Jpeg => f.write_str("JPEG"),
            Self::WebP => f.write_str("WebP"),
        }
    }
}

impl FromStr for TargetFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            "webp" => Ok(Self::WebP),
            other => anyhow::bail!("unsupported output format {other:?} (expected jpeg or webp)"),
        }
    }
}

/// Compression quality in `1..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(u8);

impl Quality {
    pub fn new(value: u8) -> Result<Self> {
        if (1..=100).contains(&value) {
            Ok(Self(value))
        } else {
            Err(Error::Encode(format!("quality must be in 1..=100 (got {value})")))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

/// Decode arbitrary image bytes and encode RGB buffers into a target format.
pub trait ImageCodec: Send + Sync {
    /// Decode to 8-bit RGB. Alpha is discarded.
    fn decode(&self, bytes: &[u8]) -> Result<RgbImage>;

    /// Encode `pixels`, embedding `exif` (a bare TIFF block) when given.
    fn encode(
        &self,
        pixels: &RgbImage,
        format: TargetFormat,
        quality: Quality,
        exif: Option<&[u8]>,
    ) -> Result<Vec<u8>>;
}

/// Reject buffers no encoder can represent.
pub fn ensure_encodable(pixels: &RgbImage) -> Result<()> {
    let (width, height) = pixels.dimensions();
    if width == 0 || height == 0 {
        return Err(Error::Encode(format!(
            "cannot encode a {width}x{height} image"
        )));
    }
    Ok(())
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultCodec;

impl ImageCodec for DefaultCodec {
    fn decode(&self, bytes: &[u8]) -> Result<RgbImage> {
        let image = image::load_from_memory(bytes).map_err(|e| Error::Decode(e.to_string()))?;
        log::debug!("Decoded {}x{} image", image.width(), image.height());
        Ok(image.to_rgb8())
    }

    fn encode(
        &self,
        pixels: &RgbImage,
        format: TargetFormat,
        quality: Quality,
        exif: Option<&[u8]>,
    ) -> Result<Vec<u8>> {
        ensure_encodable(pixels)?;
        match format {
            TargetFormat::Jpeg => encode_jpeg(pixels, quality, exif),
            TargetFormat::WebP => encode_webp(pixels, quality, exif),
        }
    }
}

fn encode_jpeg(pixels: &RgbImage, quality: Quality, exif: Option<&[u8]>) -> Result<Vec<u8>> {
    let (width, height) = pixels.dimensions();
    let mut encoded = Vec::new();
    JpegEncoder::new_with_quality(&mut encoded, quality.get())
        .write_image(pixels.as_raw(), width, height, ExtendedColorType::Rgb8)
        .map_err(|e| Error::Encode(format!("JPEG encode failed: {e}")))?;

    match exif {
        Some(exif) => embed_exif_jpeg(encoded, exif),
        None => Ok(encoded),
    }
}

fn encode_webp(pixels: &RgbImage, quality: Quality, exif: Option<&[u8]>) -> Result<Vec<u8>> {
    let (width, height) = pixels.dimensions();
    let encoder = webp::Encoder::from_rgb(pixels.as_raw(), width, height);
    let memory = encoder
        .encode_simple(false, f32::from(quality.get()))
        .map_err(|e| Error::Encode(format!("WebP encode failed: {e:?}")))?;
    let encoded = memory.to_vec();

    match exif {
        Some(exif) => embed_exif_webp(encoded, exif, width, height),
        None => Ok(encoded),
    }
}

/// Find the position of the EXIF APP1 segment in a JPEG.
fn find_exif_segment_pos(jpeg: &Jpeg) -> Option<usize> {
    const EXIF_PREFIX: &[u8] = b"Exif\0\0";
    jpeg.segments()
        .iter()
        .position(|s| s.marker() == 0xE1 && s.contents().starts_with(EXIF_PREFIX))
}

/// Put the EXIF block in an APP1 segment directly after SOI/APP0.
fn embed_exif_jpeg(encoded: Vec<u8>, exif: &[u8]) -> Result<Vec<u8>> {
    let mut jpeg = Jpeg::from_bytes(Bytes::from(encoded))
        .map_err(|e| Error::Encode(format!("Failed to parse encoded JPEG: {e}")))?;
    jpeg.set_exif(Some(Bytes::copy_from_slice(exif)));

    // set_exif() inserts at a fixed index; readers expect EXIF ahead of the
    // quantization tables, right after JFIF APP0 if there is one.
    if let Some(pos) = find_exif_segment_pos(&jpeg) {
        let segments = jpeg.segments_mut();
        let target = usize::from(segments.first().is_some_and(|s| s.marker() == 0xE0));
        if pos > target {
            let segment = segments.remove(pos);
            segments.insert(target, segment);
        }
    }

    Ok(jpeg.encoder().bytes().to_vec())
}

/// Store the EXIF block in the WebP-native `EXIF` RIFF chunk.
///
/// The chunk holds the bare TIFF block (no `Exif\0\0` prefix). A simple
/// lossy file is promoted to the extended layout with a VP8X header whose
/// EXIF flag is set.
fn embed_exif_webp(encoded: Vec<u8>, exif: &[u8], width: u32, height: u32) -> Result<Vec<u8>> {
    let mut webp = WebP::from_bytes(Bytes::from(encoded))
        .map_err(|e| Error::Encode(format!("Failed to parse encoded WebP: {e}")))?;

    let chunks = webp.chunks_mut();
    chunks.retain(|chunk| chunk.id() != CHUNK_EXIF);

    let header = match chunks.iter().position(|chunk| chunk.id() == CHUNK_VP8X) {
        Some(pos) => {
            let existing = chunks.remove(pos);
            let mut data = match existing.content() {
                RiffContent::Data(data) if data.len() >= VP8X_LEN => data.to_vec(),
                _ => return Err(Error::Encode("malformed VP8X chunk".to_string())),
            };
            data[0] |= VP8X_EXIF_FLAG;
            data
        }
        None => vp8x_header(width, height, VP8X_EXIF_FLAG),
    };
    chunks.insert(0, RiffChunk::new(CHUNK_VP8X, RiffContent::Data(Bytes::from(header))));
    chunks.push(RiffChunk::new(
        CHUNK_EXIF,
        RiffContent::Data(Bytes::copy_from_slice(exif)),
    ));

    let mut output = Vec::new();
    webp.encoder()
        .write_to(&mut output)
        .map_err(|e| Error::Encode(format!("Failed to write WebP with EXIF: {e}")))?;
    Ok(output)
}

/// VP8X payload: flags, three reserved bytes, then canvas width and height
/// minus one as 24-bit little-endian values.
fn vp8x_header(width: u32, height: u32, flags: u8) -> Vec<u8> {
    let mut data = vec![flags, 0, 0, 0];
    data.extend_from_slice(&(width - 1).to_le_bytes()[..3]);
    data.extend_from_slice(&(height - 1).to_le_bytes()[..3]);
    data
}

/// The TIFF block from a WebP `EXIF` chunk.
///
/// Some writers prefix the chunk with `Exif\0\0`; that prefix is dropped.
pub(crate) fn webp_exif(webp: &WebP) -> Option<Vec<u8>> {
    const EXIF_PREFIX: &[u8] = b"Exif\0\0";
    let chunk = webp.chunks().iter().find(|chunk| chunk.id() == CHUNK_EXIF)?;
    match chunk.content() {
        RiffContent::Data(data) => {
            let tiff = data.strip_prefix(EXIF_PREFIX).unwrap_or(&data[..]);
            Some(tiff.to_vec())
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([(x * 255 / width) as u8, (y * 255 / height) as u8, 128])
        })
    }

    fn sample_exif() -> Vec<u8> {
        // Minimal valid TIFF block: header plus an empty 0th IFD.
        let mut tiff = b"II*\0".to_vec();
        tiff.extend_from_slice(&8u32.to_le_bytes());
        tiff.extend_from_slice(&0u16.to_le_bytes());
        tiff.extend_from_slice(&0u32.to_le_bytes());
        tiff
    }

    // ── TargetFormat / Quality ───────────────────────────────────────

    #[test]
    fn format_parsing() {
        assert_eq!("jpeg".parse::<TargetFormat>().unwrap(), TargetFormat::Jpeg);
        assert_eq!("JPG".parse::<TargetFormat>().unwrap(), TargetFormat::Jpeg);
        assert_eq!("webp".parse::<TargetFormat>().unwrap(), TargetFormat::WebP);
        assert!("png".parse::<TargetFormat>().is_err());
    }

    #[test]
    fn format_mime_types() {
        assert_eq!(TargetFormat::Jpeg.mime_type(), "image/jpeg");
        assert_eq!(TargetFormat::WebP.mime_type(), "image/webp");
        assert_eq!(TargetFormat::WebP.extension(), "webp");
    }

    #[test]
    fn quality_bounds() {
        assert!(Quality::new(0).is_err());
        assert!(Quality::new(101).is_err());
        assert_eq!(Quality::new(1).unwrap().get(), 1);
        assert_eq!(Quality::new(100).unwrap().get(), 100);
    }

    // ── decode ───────────────────────────────────────────────────────

    #[test]
    fn decode_rejects_garbage() {
        let err = DefaultCodec.decode(b"not an image").unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }

    #[test]
    fn decode_rejects_empty_input() {
        assert!(matches!(DefaultCodec.decode(&[]), Err(Error::Decode(_))));
    }

    // ── encode ───────────────────────────────────────────────────────

    #[test]
    fn jpeg_round_trip_keeps_dimensions() {
        let q = Quality::new(90).unwrap();
        let bytes = DefaultCodec.encode(&gradient(32, 24), TargetFormat::Jpeg, q, None).unwrap();
        assert!(bytes.starts_with(&[0xFF, 0xD8]));
        let decoded = DefaultCodec.decode(&bytes).unwrap();
        assert_eq!(decoded.dimensions(), (32, 24));
    }

    #[test]
    fn webp_round_trip_keeps_dimensions() {
        let q = Quality::new(90).unwrap();
        let bytes = DefaultCodec.encode(&gradient(32, 24), TargetFormat::WebP, q, None).unwrap();
        assert_eq!(&bytes[..4], b"RIFF");
        assert_eq!(&bytes[8..12], b"WEBP");
        let decoded = DefaultCodec.decode(&bytes).unwrap();
        assert_eq!(decoded.dimensions(), (32, 24));
    }

    #[test]
    fn jpeg_embeds_exif_verbatim() {
        let exif = sample_exif();
        let q = Quality::new(95).unwrap();
        let bytes = DefaultCodec
            .encode(&gradient(8, 8), TargetFormat::Jpeg, q, Some(&exif))
            .unwrap();

        let jpeg = Jpeg::from_bytes(Bytes::from(bytes.clone())).unwrap();
        assert_eq!(jpeg.exif().as_deref(), Some(exif.as_slice()));
        assert!(find_exif_segment_pos(&jpeg).unwrap() <= 1);
        assert!(DefaultCodec.decode(&bytes).is_ok());
    }

    fn chunk_data(webp: &WebP, id: [u8; 4]) -> Vec<u8> {
        let chunk = webp.chunks().iter().find(|c| c.id() == id).unwrap();
        match chunk.content() {
            RiffContent::Data(data) => data.to_vec(),
            _ => panic!("expected a data chunk"),
        }
    }

    #[test]
    fn webp_exif_chunk_holds_bare_tiff() {
        let exif = sample_exif();
        let q = Quality::new(90).unwrap();
        let bytes = DefaultCodec
            .encode(&gradient(8, 8), TargetFormat::WebP, q, Some(&exif))
            .unwrap();

        let webp = WebP::from_bytes(Bytes::from(bytes.clone())).unwrap();
        let payload = chunk_data(&webp, CHUNK_EXIF);
        assert!(payload.starts_with(b"II*\0"), "payload starts {:?}", &payload[..6]);
        assert_eq!(payload, exif);
        assert_eq!(webp_exif(&webp), Some(exif));
        assert!(DefaultCodec.decode(&bytes).is_ok());
    }

    #[test]
    fn webp_with_exif_gets_vp8x_header() {
        let q = Quality::new(90).unwrap();
        let bytes = DefaultCodec
            .encode(&gradient(30, 20), TargetFormat::WebP, q, Some(&sample_exif()))
            .unwrap();

        let webp = WebP::from_bytes(Bytes::from(bytes)).unwrap();
        assert_eq!(webp.chunks()[0].id(), CHUNK_VP8X);
        let header = chunk_data(&webp, CHUNK_VP8X);
        assert_eq!(header.len(), VP8X_LEN);
        assert_eq!(header[0] & VP8X_EXIF_FLAG, VP8X_EXIF_FLAG);
        assert_eq!(&header[4..7], &[29, 0, 0]);
        assert_eq!(&header[7..10], &[19, 0, 0]);
    }

    #[test]
    fn prefixed_exif_chunks_are_still_read() {
        let q = Quality::new(90).unwrap();
        let plain = DefaultCodec.encode(&gradient(8, 8), TargetFormat::WebP, q, None).unwrap();
        let mut webp = WebP::from_bytes(Bytes::from(plain)).unwrap();
        let mut prefixed = b"Exif\0\0".to_vec();
        prefixed.extend_from_slice(&sample_exif());
        webp.chunks_mut()
            .push(RiffChunk::new(CHUNK_EXIF, RiffContent::Data(Bytes::from(prefixed))));
        assert_eq!(webp_exif(&webp), Some(sample_exif()));
    }

    #[test]
    fn zero_sized_buffer_is_an_encode_error() {
        let q = Quality::new(90).unwrap();
        for format in [TargetFormat::Jpeg, TargetFormat::WebP] {
            let err = DefaultCodec.encode(&RgbImage::new(0, 0), format, q, None).unwrap_err();
            assert!(matches!(err, Error::Encode(_)), "{format}: {err}");
        }
        let err = DefaultCodec
            .encode(&RgbImage::new(10, 0), TargetFormat::Jpeg, q, None)
            .unwrap_err();
        assert!(matches!(err, Error::Encode(_)));
    }
}
