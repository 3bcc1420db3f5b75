use std::collections::BTreeMap;

use super::encode::{self, TagValue};
use super::tags::*;
use crate::error::EncodingError;
use crate::profile::{GpsPosition, MetadataProfile};

/// Largest TIFF payload that fits an APP1 segment: 65535 minus the length
/// field (2) and the `Exif\0\0` prefix (6).
pub const MAX_CONTAINER_LEN: usize = 65_527;

const TIFF_HEADER_LEN: usize = 8;
const IFD_ENTRY_LEN: usize = 12;

/// Tags that must be present for each IFD to be written.
const ZEROTH_REQUIRED: &[u16] = &[TAG_MAKE, TAG_MODEL, TAG_SOFTWARE, TAG_DATE_TIME];
const EXIF_REQUIRED: &[u16] = &[
    TAG_DATE_TIME_ORIGINAL,
    TAG_PIXEL_X_DIMENSION,
    TAG_PIXEL_Y_DIMENSION,
];
/// Offsets the serializer computes itself; never accepted from a caller.
const POINTER_TAGS: &[u16] = &[
    TAG_EXIF_IFD_POINTER,
    TAG_GPS_IFD_POINTER,
    TAG_INTEROP_IFD_POINTER,
];
const GPS_REQUIRED: &[u16] = &[
    TAG_GPS_LATITUDE_REF,
    TAG_GPS_LATITUDE,
    TAG_GPS_LONGITUDE_REF,
    TAG_GPS_LONGITUDE,
];

/// One image file directory: tag → value, kept in ascending tag order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ifd {
    entries: BTreeMap<u16, TagValue>,
}

impl Ifd {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, tag: u16, value: TagValue) {
        self.entries.insert(tag, value);
    }

    pub fn get(&self, tag: u16) -> Option<&TagValue> {
        self.entries.get(&tag)
    }

    pub fn contains(&self, tag: u16) -> bool {
        self.entries.contains_key(&tag)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u16, &TagValue)> {
        self.entries.iter().map(|(tag, value)| (*tag, value))
    }

    fn require(&self, tags: &[u16], gps: bool) -> Result<(), EncodingError> {
        match tags.iter().find(|tag| !self.contains(**tag)) {
            Some(&missing) => Err(EncodingError::MissingField(tag_name(missing, gps))),
            None => Ok(()),
        }
    }

    fn reject_pointers(&self) -> Result<(), EncodingError> {
        match POINTER_TAGS.iter().find(|tag| self.contains(**tag)) {
            Some(&pointer) => Err(EncodingError::ReservedTag(tag_name(pointer, false))),
            None => Ok(()),
        }
    }
}

/// The three IFDs of an EXIF block. The GPS IFD is absent, not empty, when
/// the profile has no position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExifContainer {
    pub zeroth: Ifd,
    pub exif: Ifd,
    pub gps: Option<Ifd>,
}

impl ExifContainer {
    /// Encode every profile field into its IFD.
    ///
    /// Fails on the first field that cannot be encoded; nothing is returned
    /// for a partially populated profile.
    pub fn from_profile(profile: &MetadataProfile) -> Result<Self, EncodingError> {
        let capture = profile.capture();
        if capture.width == 0 || capture.height == 0 {
            return Err(EncodingError::ZeroDimension {
                width: capture.width,
                height: capture.height,
            });
        }

        let mut zeroth = Ifd::new();
        zeroth.insert(TAG_MAKE, encode::required_ascii("Make", &capture.make)?);
        zeroth.insert(TAG_MODEL, encode::required_ascii("Model", &capture.model)?);
        zeroth.insert(TAG_SOFTWARE, encode::required_ascii("Software", &capture.software)?);
        zeroth.insert(TAG_DATE_TIME, encode::timestamp(&capture.timestamp)?);

        let mut exif = Ifd::new();
        exif.insert(TAG_DATE_TIME_ORIGINAL, encode::timestamp(&capture.timestamp)?);
        exif.insert(TAG_PIXEL_X_DIMENSION, encode::dimension(capture.width));
        exif.insert(TAG_PIXEL_Y_DIMENSION, encode::dimension(capture.height));

        let gps = match profile {
            MetadataProfile::Camera(camera) => camera.gps.as_ref().map(gps_ifd).transpose()?,
            MetadataProfile::Authorship(author) => {
                zeroth.insert(TAG_ARTIST, encode::required_ascii("Artist", &author.artist)?);
                zeroth.insert(
                    TAG_COPYRIGHT,
                    encode::required_ascii("Copyright", &author.copyright)?,
                );
                if let Some(description) = &author.description {
                    zeroth.insert(
                        TAG_IMAGE_DESCRIPTION,
                        encode::ascii("ImageDescription", description)?,
                    );
                }
                if let Some(keywords) = &author.keywords {
                    zeroth.insert(TAG_XP_KEYWORDS, encode::utf16le(keywords));
                }
                None
            }
        };

        log::debug!(
            "EXIF container: {} 0th, {} Exif, {} GPS tags",
            zeroth.len(),
            exif.len(),
            gps.as_ref().map_or(0, Ifd::len)
        );

        Ok(Self { zeroth, exif, gps })
    }

    /// Serialize to a little-endian TIFF block: header, 0th IFD, Exif IFD,
    /// then the GPS IFD when present. Each IFD is followed by its out-of-line
    /// values, word aligned.
    pub fn to_bytes(&self) -> Result<Vec<u8>, EncodingError> {
        self.zeroth.require(ZEROTH_REQUIRED, false)?;
        self.zeroth.reject_pointers()?;
        self.exif.require(EXIF_REQUIRED, false)?;
        self.exif.reject_pointers()?;
        if let Some(gps) = &self.gps {
            gps.require(GPS_REQUIRED, true)?;
        }

        // Pointer values are patched once the layout is known; their entry
        // size does not depend on the value.
        let mut zeroth = self.zeroth.clone();
        zeroth.insert(TAG_EXIF_IFD_POINTER, TagValue::Long(vec![0]));
        if self.gps.is_some() {
            zeroth.insert(TAG_GPS_IFD_POINTER, TagValue::Long(vec![0]));
        }

        let exif_offset = TIFF_HEADER_LEN + block_len(&zeroth);
        let gps_offset = exif_offset + block_len(&self.exif);
        let total = gps_offset + self.gps.as_ref().map_or(0, block_len);
        if total > MAX_CONTAINER_LEN {
            return Err(EncodingError::ContainerTooLarge(total));
        }

        zeroth.insert(TAG_EXIF_IFD_POINTER, TagValue::Long(vec![exif_offset as u32]));
        if self.gps.is_some() {
            zeroth.insert(TAG_GPS_IFD_POINTER, TagValue::Long(vec![gps_offset as u32]));
        }

        let mut out = Vec::with_capacity(total);
        out.extend_from_slice(b"II");
        out.extend_from_slice(&42u16.to_le_bytes());
        out.extend_from_slice(&(TIFF_HEADER_LEN as u32).to_le_bytes());

        write_ifd(&mut out, &zeroth);
        write_ifd(&mut out, &self.exif);
        if let Some(gps) = &self.gps {
            write_ifd(&mut out, gps);
        }

        debug_assert_eq!(out.len(), total);
        Ok(out)
    }
}

/// Build the EXIF block for a profile.
///
/// The output is a pure function of the profile: the same profile always
/// yields the same bytes.
pub fn build(profile: &MetadataProfile) -> Result<Vec<u8>, EncodingError> {
    ExifContainer::from_profile(profile)?.to_bytes()
}

fn gps_ifd(position: &GpsPosition) -> Result<Ifd, EncodingError> {
    let mut gps = Ifd::new();
    gps.insert(
        TAG_GPS_LATITUDE_REF,
        encode::hemisphere("latitude", &position.latitude, ['N', 'S'])?,
    );
    gps.insert(TAG_GPS_LATITUDE, encode::dms_rationals(&position.latitude));
    gps.insert(
        TAG_GPS_LONGITUDE_REF,
        encode::hemisphere("longitude", &position.longitude, ['E', 'W'])?,
    );
    gps.insert(TAG_GPS_LONGITUDE, encode::dms_rationals(&position.longitude));
    Ok(gps)
}

/// An IFD entry with its value either inline or in the data area.
struct RawIfdEntry {
    tag_id: u16,
    data_format: u16,
    count: u32,
    inline_value: [u8; 4],
    extra_data: Option<Vec<u8>>,
}

impl RawIfdEntry {
    fn new(tag_id: u16, value: &TagValue) -> Self {
        let data = value.to_le_bytes();
        let (inline_value, extra_data) = if data.len() <= 4 {
            let mut inline = [0u8; 4];
            inline[..data.len()].copy_from_slice(&data);
            (inline, None)
        } else {
            ([0u8; 4], Some(data))
        };

        RawIfdEntry {
            tag_id,
            data_format: value.field_type(),
            count: value.count() as u32,
            inline_value,
            extra_data,
        }
    }
}

/// Size of an out-of-line value, padded to a word boundary.
fn padded(len: usize) -> usize {
    len + len % 2
}

/// Bytes taken by an IFD: count, entries, next pointer and data area.
fn block_len(ifd: &Ifd) -> usize {
    let data: usize = ifd
        .iter()
        .map(|(_, value)| {
            let size = value.to_le_bytes().len();
            if size <= 4 { 0 } else { padded(size) }
        })
        .sum();
    2 + ifd.len() * IFD_ENTRY_LEN + 4 + data
}

/// Append an IFD at the current end of `out`. The next-IFD pointer is always 0.
fn write_ifd(out: &mut Vec<u8>, ifd: &Ifd) {
    let start = out.len();
    let mut data_off = start + 2 + ifd.len() * IFD_ENTRY_LEN + 4;
    let mut data_area: Vec<u8> = Vec::new();

    out.extend_from_slice(&(ifd.len() as u16).to_le_bytes());
    for (tag, value) in ifd.iter() {
        let entry = RawIfdEntry::new(tag, value);
        out.extend_from_slice(&entry.tag_id.to_le_bytes());
        out.extend_from_slice(&entry.data_format.to_le_bytes());
        out.extend_from_slice(&entry.count.to_le_bytes());
        match entry.extra_data {
            Some(extra) => {
                out.extend_from_slice(&(data_off as u32).to_le_bytes());
                data_off += padded(extra.len());
                let odd = extra.len() % 2 == 1;
                data_area.extend_from_slice(&extra);
                if odd {
                    data_area.push(0);
                }
            }
            None => out.extend_from_slice(&entry.inline_value),
        }
    }
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(&data_area);
}
