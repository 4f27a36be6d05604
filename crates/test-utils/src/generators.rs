//! Test data generators for wind payloads.
//!
//! These produce byte-exact payloads in the wire format the overlay fetches:
//! a 48-byte little-endian header followed by quantized u8 samples, wrapped
//! in a zlib or gzip stream.

use std::io::Write;

use flate2::write::{GzEncoder, ZlibEncoder};
use flate2::Compression;

/// Lower bound of the quantized wind range (m/s).
pub const QUANT_MIN: f32 = -65.0;

/// Upper bound of the quantized wind range (m/s).
pub const QUANT_MAX: f32 = 65.0;

/// Grid geometry for generated payloads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PayloadGeometry {
    pub nx: i64,
    pub ny: i64,
    pub dx: f64,
    pub dy: f64,
    pub lo1: f64,
    pub la1: f64,
}

impl PayloadGeometry {
    pub const fn new(nx: i64, ny: i64, dx: f64, dy: f64, lo1: f64, la1: f64) -> Self {
        Self {
            nx,
            ny,
            dx,
            dy,
            lo1,
            la1,
        }
    }

    /// Number of samples per component.
    pub fn points(&self) -> usize {
        (self.nx.max(0) * self.ny.max(0)) as usize
    }
}

/// Quantize a wind component into the 0..=255 payload range.
///
/// Values outside [-65, 65] are clamped.
pub fn quantize(value: f32) -> u8 {
    let clamped = value.clamp(QUANT_MIN, QUANT_MAX);
    ((clamped - QUANT_MIN) / (QUANT_MAX - QUANT_MIN) * 255.0).round() as u8
}

/// Build an uncompressed payload body.
pub fn encode_wind_body(geometry: &PayloadGeometry, samples: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(48 + samples.len());
    buf.extend_from_slice(&geometry.nx.to_le_bytes());
    buf.extend_from_slice(&geometry.ny.to_le_bytes());
    buf.extend_from_slice(&geometry.dx.to_le_bytes());
    buf.extend_from_slice(&geometry.dy.to_le_bytes());
    buf.extend_from_slice(&geometry.lo1.to_le_bytes());
    buf.extend_from_slice(&geometry.la1.to_le_bytes());
    buf.extend_from_slice(samples);
    buf
}

/// Wrap bytes in a zlib stream.
pub fn zlib_compress(data: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).expect("writing to Vec cannot fail");
    encoder.finish().expect("writing to Vec cannot fail")
}

/// Wrap bytes in a gzip stream.
pub fn gzip_compress(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).expect("writing to Vec cannot fail");
    encoder.finish().expect("writing to Vec cannot fail")
}

/// Quantized samples for a field with the same (u, v) everywhere.
pub fn create_uniform_samples(points: usize, u_ms: f32, v_ms: f32) -> Vec<u8> {
    let mut samples = vec![quantize(u_ms); points];
    samples.extend(std::iter::repeat(quantize(v_ms)).take(points));
    samples
}

/// A complete compressed payload with uniform wind.
pub fn create_uniform_payload(geometry: &PayloadGeometry, u_ms: f32, v_ms: f32) -> Vec<u8> {
    let samples = create_uniform_samples(geometry.points(), u_ms, v_ms);
    zlib_compress(&encode_wind_body(geometry, &samples))
}

/// Creates a U-component wind grid (west-east component).
///
/// U varies by row from -20 to +20 m/s, simulating a latitude-dependent
/// band of westerlies.
pub fn create_u_wind_grid(width: usize, height: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for _col in 0..width {
            let lat_factor = (row as f32 / height.max(1) as f32 - 0.5) * 2.0; // -1 to 1
            data.push(lat_factor * 20.0);
        }
    }
    data
}

/// Creates a V-component wind grid (south-north component).
///
/// V varies by column from -15 to +15 m/s.
pub fn create_v_wind_grid(width: usize, height: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(width * height);
    for _row in 0..height {
        for col in 0..width {
            let lon_factor = (col as f32 / width.max(1) as f32 - 0.5) * 2.0; // -1 to 1
            data.push(lon_factor * 15.0);
        }
    }
    data
}

/// A compressed payload carrying the sheared U/V grids above.
pub fn create_sheared_payload(geometry: &PayloadGeometry) -> Vec<u8> {
    let (w, h) = (geometry.nx as usize, geometry.ny as usize);
    let samples: Vec<u8> = create_u_wind_grid(w, h)
        .into_iter()
        .chain(create_v_wind_grid(w, h))
        .map(quantize)
        .collect();
    zlib_compress(&encode_wind_body(geometry, &samples))
}
