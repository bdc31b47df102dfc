//! JpegSanitizer - trims framing around a JPEG payload
//!
//! Some cameras wrap the snapshot in transport framing or leave stray bytes
//! before SOI / after EOI. The payload is cut down to the span between the
//! first start-of-image marker and the last end-of-image marker.

/// Start of image
pub const SOI: [u8; 2] = [0xFF, 0xD8];
/// End of image
pub const EOI: [u8; 2] = [0xFF, 0xD9];

/// Trim `data` to `[first SOI, last EOI + 2)`
///
/// - No SOI: `data` is returned unchanged
/// - SOI but no EOI after it: everything from SOI on
pub fn sanitize(data: &[u8]) -> &[u8] {
    let Some(start) = data.windows(2).position(|w| w == SOI) else {
        return data;
    };

    let tail = &data[start..];
    match tail.windows(2).rposition(|w| w == EOI) {
        Some(end) => &tail[..end + 2],
        None => tail,
    }
}
