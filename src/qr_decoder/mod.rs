//! QrDecoder - reads the `alias-code` QR payload out of a snapshot
//!
//! ## Responsibilities
//!
//! - Decode the (sanitized) snapshot bytes as an image
//! - Run QR grid detection over the luminance plane
//! - Parse the first decodable payload into a [`QrPayload`]

use crate::error::{Error, Result};
use rqrr::PreparedImage;
use std::str::FromStr;

/// Separator between alias and numeric code in the QR text
pub const PAYLOAD_SEPARATOR: char = '-';

/// Parsed QR payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrPayload {
    pub alias: String,
    pub code: i64,
}

impl FromStr for QrPayload {
    type Err = Error;

    fn from_str(text: &str) -> Result<Self> {
        let parts: Vec<&str> = text.split(PAYLOAD_SEPARATOR).collect();
        let [alias, code] = parts.as_slice() else {
            return Err(Error::InvalidPayload(format!(
                "QR code payload '{text}' is not of the form alias-code"
            )));
        };

        let code = code.trim().parse::<i64>().map_err(|_| {
            Error::InvalidPayload(format!(
                "QR code payload '{text}' has non-integer code '{code}'"
            ))
        })?;

        Ok(Self {
            alias: alias.to_string(),
            code,
        })
    }
}

/// Decode a snapshot and extract its QR payload
pub fn decode(data: &[u8]) -> Result<QrPayload> {
    let image = image::load_from_memory(data).map_err(|e| {
        tracing::debug!(error = %e, size = data.len(), "Snapshot is not a decodable image");
        Error::Decode("No Image Found".to_string())
    })?;

    let luma = image.to_luma8();
    let (width, height) = luma.dimensions();

    let mut prepared =
        PreparedImage::prepare_from_greyscale(width as usize, height as usize, |x, y| {
            luma.get_pixel(x as u32, y as u32)[0]
        });
    let grids = prepared.detect_grids();

    tracing::debug!(width, height, candidates = grids.len(), "QR detection complete");

    // first candidate in detector order that actually decodes
    let content = grids
        .iter()
        .find_map(|grid| match grid.decode() {
            Ok((_, content)) => Some(content),
            Err(e) => {
                tracing::debug!(error = %e, "Skipping undecodable QR candidate");
                None
            }
        })
        .ok_or(Error::QrNotFound)?;

    content.parse()
}
