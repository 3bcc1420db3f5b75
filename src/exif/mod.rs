//! EXIF block synthesis and read-back.
//!
//! - [`encode`]: profile values to TIFF primitives (rationals, ASCII, UTF-16LE)
//! - [`container`]: the 0th/Exif/GPS IFD set and its binary layout
//! - [`read_exif`]: read fields back from an encoded JPEG or WebP
//!
//! The block produced by [`build`] is a bare little-endian TIFF structure,
//! ready for a JPEG APP1 segment (behind `Exif\0\0`) or a WebP `EXIF` chunk.

pub mod container;
pub mod encode;
mod reader;
pub mod tags;

pub use container::{ExifContainer, Ifd, MAX_CONTAINER_LEN, build};
pub use encode::TagValue;
pub use reader::{ExifSummary, extract_exif, read_exif};
