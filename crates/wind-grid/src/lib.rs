//! Wind grid decoding and field interpolation.
//!
//! This crate turns the compressed binary wind payload into a continuous
//! vector field:
//!
//! ```text
//! compressed bytes
//!      │
//!      ▼
//! decompress()        zlib or gzip framing
//!      │
//!      ▼
//! decode()            48-byte header + quantized u8 samples
//!      │
//!      ▼
//! DecodedGrid         dequantized U/V components in m/s
//!      │
//!      ▼
//! Interpolator        bilinear (u, v) at any lat/lon
//! ```
//!
//! # Example
//!
//! ```ignore
//! use wind_grid::{decode_payload, Interpolator};
//!
//! let grid = decode_payload(&compressed)?;
//! let field = Interpolator::new(grid);
//! if let Some(wind) = field.interpolate(52.5, 13.4) {
//!     println!("{:.1} m/s", wind.speed());
//! }
//! ```

pub mod decode;
pub mod error;
pub mod interpolation;
pub mod types;

pub use decode::{decode, decode_header, decode_payload, decompress, dequantize, HEADER_LEN};
pub use error::{GridError, Result};
pub use interpolation::{normalize_longitude, Interpolator, WindVector};
pub use types::{is_sentinel, DecodedGrid, GridHeader, SENTINEL};
