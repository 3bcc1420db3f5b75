//! Tag identifiers from the TIFF 6.0 / Exif 2.3 registries.

// 0th IFD
pub const TAG_IMAGE_DESCRIPTION: u16 = 0x010E;
pub const TAG_MAKE: u16 = 0x010F;
pub const TAG_MODEL: u16 = 0x0110;
pub const TAG_SOFTWARE: u16 = 0x0131;
pub const TAG_DATE_TIME: u16 = 0x0132;
pub const TAG_ARTIST: u16 = 0x013B;
pub const TAG_COPYRIGHT: u16 = 0x8298;
pub const TAG_EXIF_IFD_POINTER: u16 = 0x8769;
pub const TAG_GPS_IFD_POINTER: u16 = 0x8825;
/// Windows XP keywords, UTF-16LE in a BYTE array (40094).
pub const TAG_XP_KEYWORDS: u16 = 0x9C9E;

// Exif sub-IFD
pub const TAG_DATE_TIME_ORIGINAL: u16 = 0x9003;
pub const TAG_PIXEL_X_DIMENSION: u16 = 0xA002;
pub const TAG_PIXEL_Y_DIMENSION: u16 = 0xA003;
pub const TAG_INTEROP_IFD_POINTER: u16 = 0xA005;

// GPS IFD
pub const TAG_GPS_LATITUDE_REF: u16 = 0x0001;
pub const TAG_GPS_LATITUDE: u16 = 0x0002;
pub const TAG_GPS_LONGITUDE_REF: u16 = 0x0003;
pub const TAG_GPS_LONGITUDE: u16 = 0x0004;

// TIFF field types
pub const TYPE_BYTE: u16 = 1;
pub const TYPE_ASCII: u16 = 2;
pub const TYPE_LONG: u16 = 4;
pub const TYPE_RATIONAL: u16 = 5;

/// Human-readable name for the tags this crate writes.
pub fn tag_name(tag: u16, gps: bool) -> &'static str {
    if gps {
        return match tag {
            TAG_GPS_LATITUDE_REF => "GPSLatitudeRef",
            TAG_GPS_LATITUDE => "GPSLatitude",
            TAG_GPS_LONGITUDE_REF => "GPSLongitudeRef",
            TAG_GPS_LONGITUDE => "GPSLongitude",
            _ => "GPSUnknown",
        };
    }
    match tag {
        TAG_IMAGE_DESCRIPTION => "ImageDescription",
        TAG_MAKE => "Make",
        TAG_MODEL => "Model",
        TAG_SOFTWARE => "Software",
        TAG_DATE_TIME => "DateTime",
        TAG_ARTIST => "Artist",
        TAG_COPYRIGHT => "Copyright",
        TAG_EXIF_IFD_POINTER => "ExifIFDPointer",
        TAG_GPS_IFD_POINTER => "GPSInfo",
        TAG_XP_KEYWORDS => "XPKeywords",
        TAG_DATE_TIME_ORIGINAL => "DateTimeOriginal",
        TAG_PIXEL_X_DIMENSION => "PixelXDimension",
        TAG_PIXEL_Y_DIMENSION => "PixelYDimension",
        TAG_INTEROP_IFD_POINTER => "InteroperabilityIFDPointer",
        _ => "Unknown",
    }
}
