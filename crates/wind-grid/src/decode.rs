//! Binary wind payload decoding.
//!
//! A payload is a DEFLATE stream (zlib or gzip wrapped) whose body is:
//!
//! ```text
//! offset  size  type  field
//!      0     8  i64   nx
//!      8     8  i64   ny
//!     16     8  f64   dx
//!     24     8  f64   dy
//!     32     8  f64   lo1
//!     40     8  f64   la1
//!     48     *  u8    quantized samples (U grid, then optionally V grid)
//! ```
//!
//! All multi-byte fields are little-endian.

use std::io::Read;

use bytes::Buf;
use flate2::read::{GzDecoder, ZlibDecoder};
use tracing::debug;

use crate::error::{GridError, Result};
use crate::types::{DecodedGrid, GridHeader};

/// Size of the fixed header in bytes.
pub const HEADER_LEN: usize = 48;

/// Lower bound of the quantized range in m/s.
pub const QUANT_MIN: f32 = -65.0;

/// Upper bound of the quantized range in m/s.
pub const QUANT_MAX: f32 = 65.0;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Map a quantized byte back onto [-65, 65] m/s.
#[inline]
pub fn dequantize(q: u8) -> f32 {
    (q as f32 / 255.0) * (QUANT_MAX - QUANT_MIN) + QUANT_MIN
}

/// Inflate a compressed payload, detecting gzip or zlib framing from the header.
pub fn decompress(compressed: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(compressed.len() * 4);
    if compressed.starts_with(&GZIP_MAGIC) {
        GzDecoder::new(compressed).read_to_end(&mut out)?;
    } else {
        ZlibDecoder::new(compressed).read_to_end(&mut out)?;
    }
    debug!(
        compressed = compressed.len(),
        decompressed = out.len(),
        "Inflated wind payload"
    );
    Ok(out)
}

/// Parse the fixed header at the start of a decompressed buffer.
pub fn decode_header(buffer: &[u8]) -> Result<GridHeader> {
    if buffer.len() < HEADER_LEN {
        return Err(GridError::Truncated {
            expected: HEADER_LEN,
            actual: buffer.len(),
        });
    }

    let mut cursor = &buffer[..HEADER_LEN];
    let nx = cursor.get_i64_le();
    let ny = cursor.get_i64_le();
    let dx = cursor.get_f64_le();
    let dy = cursor.get_f64_le();
    let lo1 = cursor.get_f64_le();
    let la1 = cursor.get_f64_le();

    let nx = usize::try_from(nx)
        .map_err(|_| GridError::invalid_header(format!("nx must be positive, got {}", nx)))?;
    let ny = usize::try_from(ny)
        .map_err(|_| GridError::invalid_header(format!("ny must be positive, got {}", ny)))?;
    if nx.checked_mul(ny).and_then(|points| points.checked_mul(2)).is_none() {
        return Err(GridError::invalid_header(format!("grid {}x{} overflows", nx, ny)));
    }

    let header = GridHeader::new(nx, ny, dx, dy, lo1, la1);
    header.validate()?;
    Ok(header)
}

/// Decode a decompressed buffer into U/V components.
///
/// A body holding exactly one grid of samples is treated as a U-only field
/// and V is filled with zeros.
pub fn decode(buffer: &[u8]) -> Result<DecodedGrid> {
    let header = decode_header(buffer)?;
    let samples = &buffer[HEADER_LEN..];
    let points = header.len();

    let (u, v) = if samples.len() % 2 == 0 && samples.len() / 2 == points {
        let (u_raw, v_raw) = samples.split_at(points);
        (
            u_raw.iter().copied().map(dequantize).collect::<Vec<_>>(),
            v_raw.iter().copied().map(dequantize).collect::<Vec<_>>(),
        )
    } else if samples.len() == points {
        debug!(points, "Payload carries a single component, V filled with zeros");
        (
            samples.iter().copied().map(dequantize).collect::<Vec<_>>(),
            vec![0.0; points],
        )
    } else {
        return Err(GridError::SampleCount {
            points,
            actual: samples.len(),
        });
    };

    DecodedGrid::new(header, u, v)
}

/// Inflate and decode a payload as delivered over the wire.
pub fn decode_payload(compressed: &[u8]) -> Result<DecodedGrid> {
    let body = decompress(compressed)?;
    decode(&body)
}
