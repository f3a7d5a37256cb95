//! CUR container layout.
//!
//! A cursor file here holds exactly one image whose pixels are an embedded
//! PNG stream:
//!
//! ```text
//! [ICONDIR 6][ICONDIRENTRY 16][BITMAPINFOHEADER 40][PNG payload]
//! ```
//!
//! All multi-byte fields are little endian.
//! Format references:
//! https://en.wikipedia.org/wiki/ICO_(file_format)
//! https://www.daubnet.com/en/file-format-cur

use std::io::{self, Read, Write};

use crate::error::CurError;

pub const CONTAINER_HEADER_SIZE: usize = 6;
pub const DIRECTORY_ENTRY_SIZE: usize = 16;
pub const BITMAP_INFO_HEADER_SIZE: usize = 40;

/// Bytes in front of the payload.
pub const HEADERS_SIZE: usize = CONTAINER_HEADER_SIZE + DIRECTORY_ENTRY_SIZE + BITMAP_INFO_HEADER_SIZE;

/// Where the payload starts, counted from the beginning of the file.
pub const PAYLOAD_OFFSET: u32 = HEADERS_SIZE as u32;

/// Resource type in the container header (1 = icon, 2 = cursor).
const RESOURCE_TYPE_CURSOR: u16 = 2;

/// BI_PNG: the bitmap data is a complete PNG stream.
const COMPRESSION_PNG: u32 = 5;

const COPY_BUFFER_SIZE: usize = 8 * 1024;

/// Everything needed to describe the single image inside the cursor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImageMetadata {
    pub width: u32,
    pub height: u32,
    pub hotspot_x: i32,
    pub hotspot_y: i32,
    pub payload_len: u32,
}

/// ICONDIR
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ContainerHeader {
    pub reserved: u16,
    pub resource_type: u16,
    pub image_count: u16,
}

impl ContainerHeader {
    pub fn cursor() -> Self {
        Self {
            reserved: 0,
            resource_type: RESOURCE_TYPE_CURSOR,
            image_count: 1,
        }
    }

    pub fn to_bytes(&self) -> [u8; CONTAINER_HEADER_SIZE] {
        let mut bytes = [0u8; CONTAINER_HEADER_SIZE];
        bytes[0..2].copy_from_slice(&self.reserved.to_le_bytes());
        bytes[2..4].copy_from_slice(&self.resource_type.to_le_bytes());
        bytes[4..6].copy_from_slice(&self.image_count.to_le_bytes());
        bytes
    }
}

/// ICONDIRENTRY, cursor flavour: the planes/bit count pair of an icon entry
/// holds the hotspot instead.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub width: u8,
    pub height: u8,
    pub color_count: u8,
    pub reserved: u8,
    pub hotspot_x: u16,
    pub hotspot_y: u16,
    pub payload_len: u32,
    pub payload_offset: u32,
}

impl DirectoryEntry {
    /// Dimensions keep only their low byte, so 256 is stored as 0. Hotspots
    /// are truncated to 16 bits.
    pub fn for_image(metadata: &ImageMetadata) -> Self {
        Self {
            width: metadata.width as u8,
            height: metadata.height as u8,
            color_count: 0,
            reserved: 0,
            hotspot_x: metadata.hotspot_x as u16,
            hotspot_y: metadata.hotspot_y as u16,
            payload_len: metadata.payload_len,
            payload_offset: PAYLOAD_OFFSET,
        }
    }

    pub fn to_bytes(&self) -> [u8; DIRECTORY_ENTRY_SIZE] {
        let mut bytes = [0u8; DIRECTORY_ENTRY_SIZE];
        bytes[0] = self.width;
        bytes[1] = self.height;
        bytes[2] = self.color_count;
        bytes[3] = self.reserved;
        bytes[4..6].copy_from_slice(&self.hotspot_x.to_le_bytes());
        bytes[6..8].copy_from_slice(&self.hotspot_y.to_le_bytes());
        bytes[8..12].copy_from_slice(&self.payload_len.to_le_bytes());
        bytes[12..16].copy_from_slice(&self.payload_offset.to_le_bytes());
        bytes
    }
}

/// BITMAPINFOHEADER
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BitmapInfoHeader {
    pub header_size: u32,
    pub width: i32,
    pub height: i32,
    pub planes: u16,
    pub bits_per_pixel: u16,
    pub compression: u32,
    pub payload_len: u32,
    pub x_pixels_per_meter: i32,
    pub y_pixels_per_meter: i32,
    pub colors_used: u32,
    pub colors_important: u32,
}

impl BitmapInfoHeader {
    pub fn for_image(metadata: &ImageMetadata) -> Self {
        Self {
            header_size: BITMAP_INFO_HEADER_SIZE as u32,
            width: metadata.width as i32,
            height: metadata.height as i32,
            planes: 1,
            bits_per_pixel: 32,
            compression: COMPRESSION_PNG,
            payload_len: metadata.payload_len,
            x_pixels_per_meter: 0,
            y_pixels_per_meter: 0,
            colors_used: 0,
            colors_important: 0,
        }
    }

    pub fn to_bytes(&self) -> [u8; BITMAP_INFO_HEADER_SIZE] {
        let mut bytes = [0u8; BITMAP_INFO_HEADER_SIZE];
        bytes[0..4].copy_from_slice(&self.header_size.to_le_bytes());
        bytes[4..8].copy_from_slice(&self.width.to_le_bytes());
        bytes[8..12].copy_from_slice(&self.height.to_le_bytes());
        bytes[12..14].copy_from_slice(&self.planes.to_le_bytes());
        bytes[14..16].copy_from_slice(&self.bits_per_pixel.to_le_bytes());
        bytes[16..20].copy_from_slice(&self.compression.to_le_bytes());
        bytes[20..24].copy_from_slice(&self.payload_len.to_le_bytes());
        bytes[24..28].copy_from_slice(&self.x_pixels_per_meter.to_le_bytes());
        bytes[28..32].copy_from_slice(&self.y_pixels_per_meter.to_le_bytes());
        bytes[32..36].copy_from_slice(&self.colors_used.to_le_bytes());
        bytes[36..40].copy_from_slice(&self.colors_important.to_le_bytes());
        bytes
    }
}

/// Writes a single-image cursor file around an already encoded PNG.
pub struct CurFileBuilder {
    metadata: ImageMetadata,
}

impl CurFileBuilder {
    pub fn new(metadata: ImageMetadata) -> Self {
        Self { metadata }
    }

    /// The three headers, back to back.
    pub fn headers(&self) -> [u8; HEADERS_SIZE] {
        let mut bytes = [0u8; HEADERS_SIZE];
        let (container, rest) = bytes.split_at_mut(CONTAINER_HEADER_SIZE);
        let (entry, info) = rest.split_at_mut(DIRECTORY_ENTRY_SIZE);

        container.copy_from_slice(&ContainerHeader::cursor().to_bytes());
        entry.copy_from_slice(&DirectoryEntry::for_image(&self.metadata).to_bytes());
        info.copy_from_slice(&BitmapInfoHeader::for_image(&self.metadata).to_bytes());
        bytes
    }

    /// Writes the headers followed by the payload and returns the number of
    /// bytes written.
    ///
    /// The payload must yield exactly `payload_len` bytes. The headers are
    /// already out by the time a short or long payload is noticed, so both
    /// cases are errors rather than being patched up.
    pub fn build<R: Read, W: Write>(&self, mut payload: R, mut out: W) -> Result<u64, CurError> {
        out.write_all(&self.headers()).map_err(CurError::Write)?;

        let expected = u64::from(self.metadata.payload_len);
        let mut copied = 0u64;
        let mut buffer = [0u8; COPY_BUFFER_SIZE];

        while copied < expected {
            let want = (expected - copied).min(COPY_BUFFER_SIZE as u64) as usize;
            let read = match payload.read(&mut buffer[..want]) {
                Ok(0) => {
                    return Err(CurError::PayloadRead {
                        expected,
                        actual: copied,
                        source: None,
                    })
                }
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    return Err(CurError::PayloadRead {
                        expected,
                        actual: copied,
                        source: Some(e),
                    })
                }
            };
            out.write_all(&buffer[..read]).map_err(CurError::Write)?;
            copied += read as u64;
        }

        // One more byte is enough to show the declared length was wrong.
        let mut extra = [0u8; 1];
        loop {
            match payload.read(&mut extra) {
                Ok(0) => break,
                Ok(_) => return Err(CurError::PayloadLengthMismatch { declared: expected }),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    return Err(CurError::PayloadRead {
                        expected,
                        actual: copied,
                        source: Some(e),
                    })
                }
            }
        }

        out.flush().map_err(CurError::Write)?;
        log::debug!("Wrote {} header bytes and {} payload bytes", HEADERS_SIZE, copied);

        Ok(HEADERS_SIZE as u64 + copied)
    }
}
