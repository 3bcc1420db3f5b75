use anyhow::{Context, Result};
use img_parts::jpeg::Jpeg;
use img_parts::webp::WebP;
use img_parts::{Bytes, ImageEXIF};
use nom_exif::*;
use serde::Serialize;
use std::io::Cursor;

use super::tags::*;
use crate::codec::webp_exif;

/// EXIF fields read back from an encoded image.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExifSummary {
    pub make: Option<String>,
    pub model: Option<String>,
    pub software: Option<String>,
    pub date_time: Option<String>,
    pub date_time_original: Option<String>,
    pub pixel_width: Option<u32>,
    pub pixel_height: Option<u32>,
    pub description: Option<String>,
    pub artist: Option<String>,
    pub copyright: Option<String>,
    pub has_gps: bool,
    pub gps_latitude: Option<f64>,
    pub gps_longitude: Option<f64>,
}

impl ExifSummary {
    pub fn is_empty(&self) -> bool {
        self.make.is_none()
            && self.model.is_none()
            && self.software.is_none()
            && self.date_time.is_none()
            && self.date_time_original.is_none()
            && self.pixel_width.is_none()
            && self.pixel_height.is_none()
            && self.description.is_none()
            && self.artist.is_none()
            && self.copyright.is_none()
            && !self.has_gps
    }
}

/// Return the raw TIFF block embedded in a JPEG APP1 segment or a WebP
/// `EXIF` chunk. A bare TIFF block is returned as is.
pub fn extract_exif(bytes: &[u8]) -> Option<Vec<u8>> {
    if bytes.starts_with(b"II*\0") || bytes.starts_with(b"MM\0*") {
        return Some(bytes.to_vec());
    }
    let data = Bytes::copy_from_slice(bytes);
    if let Ok(jpeg) = Jpeg::from_bytes(data.clone()) {
        return jpeg.exif().map(|exif| exif.to_vec());
    }
    if let Ok(webp) = WebP::from_bytes(data) {
        return webp_exif(&webp);
    }
    None
}

/// Read EXIF fields from a JPEG, a WebP, or a bare TIFF block.
///
/// Inputs without metadata give an empty summary rather than an error.
pub fn read_exif(bytes: &[u8]) -> Result<ExifSummary> {
    // nom-exif reads JPEG directly; WebP metadata is handed over as the TIFF
    // block from its EXIF chunk.
    let source = if bytes.starts_with(&[0xFF, 0xD8]) {
        bytes.to_vec()
    } else {
        match extract_exif(bytes) {
            Some(tiff) => tiff,
            None => {
                log::debug!("No EXIF block found");
                return Ok(ExifSummary::default());
            }
        }
    };

    let mut parser = MediaParser::new();
    let ms = MediaSource::seekable(Cursor::new(source)).context("Failed to open image data")?;

    let iter: ExifIter = match parser.parse(ms) {
        Ok(iter) => iter,
        Err(_) => {
            log::debug!("No EXIF data found");
            return Ok(ExifSummary::default());
        }
    };

    // Parse GPS info before converting to Exif (consumes the iterator)
    let gps_info = iter.parse_gps_info().ok().flatten();
    let exif: Exif = iter.into();

    let text = |tag: u16| exif.get_by_ifd_tag_code(0, tag).and_then(entry_to_string);
    let number = |tag: u16| text(tag).and_then(|s| s.parse::<u32>().ok());

    let mut data = ExifSummary {
        make: text(TAG_MAKE),
        model: text(TAG_MODEL),
        software: text(TAG_SOFTWARE),
        date_time: text(TAG_DATE_TIME),
        date_time_original: text(TAG_DATE_TIME_ORIGINAL),
        pixel_width: number(TAG_PIXEL_X_DIMENSION),
        pixel_height: number(TAG_PIXEL_Y_DIMENSION),
        description: text(TAG_IMAGE_DESCRIPTION),
        artist: text(TAG_ARTIST),
        copyright: text(TAG_COPYRIGHT),
        ..ExifSummary::default()
    };

    if let Some(gps) = gps_info {
        data.has_gps = true;
        data.gps_latitude = Some(latlng_to_decimal(&gps.latitude, gps.latitude_ref));
        data.gps_longitude = Some(latlng_to_decimal(&gps.longitude, gps.longitude_ref));
    }

    Ok(data)
}

/// Convert an EntryValue to an Option<String>.
fn entry_to_string(val: &EntryValue) -> Option<String> {
    let s = val.to_string();
    let s = s.trim().trim_matches('"').to_string();
    if s.is_empty() { None } else { Some(s) }
}

/// Convert a nom-exif LatLng (3 URationals: deg, min, sec) to decimal degrees.
fn latlng_to_decimal(latlng: &LatLng, reference: char) -> f64 {
    let degrees = latlng.0.0 as f64 / latlng.0.1 as f64;
    let minutes = latlng.1.0 as f64 / latlng.1.1 as f64;
    let seconds = latlng.2.0 as f64 / latlng.2.1 as f64;

    let mut coord = degrees + minutes / 60.0 + seconds / 3600.0;

    if reference == 'S' || reference == 'W' {
        coord = -coord;
    }

    coord
}
