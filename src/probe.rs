use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::validate::ColorModel;

/// What the cursor builder needs to know about an input PNG.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    pub color_model: ColorModel,
    /// Size of the whole PNG file, which becomes the cursor payload.
    pub payload_len: u32,
}

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("Failed to access {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{} is not a readable PNG image", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: png::DecodingError,
    },

    #[error("{} is {size} bytes, too large for a cursor payload", path.display())]
    PayloadTooLarge { path: PathBuf, size: u64 },
}

/// Reads the PNG header of `path` without decoding any pixel data.
///
/// The color model comes straight from IHDR, before any palette expansion.
pub fn probe_png(path: &Path) -> Result<ImageInfo, ProbeError> {
    let io_error = |source| ProbeError::Io {
        path: path.to_path_buf(),
        source,
    };

    let size = std::fs::metadata(path).map_err(io_error)?.len();
    let payload_len = u32::try_from(size).map_err(|_| ProbeError::PayloadTooLarge {
        path: path.to_path_buf(),
        size,
    })?;

    let file = File::open(path).map_err(io_error)?;
    let mut decoder = png::Decoder::new(BufReader::new(file));
    let header = decoder.read_header_info().map_err(|source| ProbeError::Decode {
        path: path.to_path_buf(),
        source,
    })?;

    let (width, height) = (header.width, header.height);
    let color_model = ColorModel::from_png(header.color_type, header.bit_depth);
    log::debug!(
        "Probed {}: {}x{} px, {:?} at {:?}, {} bytes",
        path.display(),
        width,
        height,
        header.color_type,
        header.bit_depth,
        payload_len
    );

    Ok(ImageInfo {
        width,
        height,
        color_model,
        payload_len,
    })
}
