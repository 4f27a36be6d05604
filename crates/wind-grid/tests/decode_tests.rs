//! Tests for payload decompression and decoding.

use test_utils::{
    assert_approx_eq, create_uniform_payload, encode_wind_body, geometry, gzip_compress,
    zlib_compress, PayloadGeometry,
};
use wind_grid::{decode, decode_payload, decompress, dequantize, GridError, HEADER_LEN};

// ============================================================================
// decompress tests
// ============================================================================

#[test]
fn test_decompress_zlib_and_gzip_agree() {
    let body = encode_wind_body(&geometry::UNIT_2X2, &[0, 255, 0, 255, 128, 128, 128, 128]);
    let from_zlib = decompress(&zlib_compress(&body)).unwrap();
    let from_gzip = decompress(&gzip_compress(&body)).unwrap();
    assert_eq!(from_zlib, body);
    assert_eq!(from_gzip, body);
}

#[test]
fn test_decompress_garbage_is_decompress_error() {
    let err = decompress(b"definitely not deflate").unwrap_err();
    assert!(err.is_decompress());
}

#[test]
fn test_decode_payload_reports_stage() {
    // Valid stream, invalid body: must be a decode error, not a decompress one
    let err = decode_payload(&zlib_compress(&[1, 2, 3])).unwrap_err();
    assert!(!err.is_decompress());
    assert!(matches!(err, GridError::Truncated { expected: HEADER_LEN, actual: 3 }));
}

// ============================================================================
// decode tests
// ============================================================================

#[test]
fn test_decode_two_component_payload() {
    let body = encode_wind_body(&geometry::UNIT_2X2, &[0, 255, 0, 255, 128, 128, 128, 128]);
    let grid = decode(&body).unwrap();

    let header = grid.header();
    assert_eq!((header.nx, header.ny), (2, 2));
    assert_eq!((header.lo1, header.la1), (0.0, 1.0));

    assert_approx_eq!(grid.u_components()[0], -65.0, 1e-4);
    assert_approx_eq!(grid.u_components()[1], 65.0, 1e-4);
    for v in grid.v_components() {
        assert_approx_eq!(*v, dequantize(128), 1e-6);
    }
}

#[test]
fn test_decode_single_component_zero_fills_v() {
    let body = encode_wind_body(&geometry::UNIT_2X2, &[10, 20, 30, 40]);
    let grid = decode(&body).unwrap();
    assert_eq!(grid.u_components().len(), 4);
    assert_eq!(grid.v_components(), &[0.0, 0.0, 0.0, 0.0]);
}

#[test]
fn test_decode_rejects_odd_sample_counts() {
    for count in [0usize, 3, 5, 7, 9] {
        let body = encode_wind_body(&geometry::UNIT_2X2, &vec![128; count]);
        let err = decode(&body).unwrap_err();
        assert_eq!(
            err,
            GridError::SampleCount {
                points: 4,
                actual: count
            },
            "count {}",
            count
        );
    }
}

#[test]
fn test_decode_rejects_degenerate_header() {
    let one_column = PayloadGeometry::new(1, 4, 1.0, 1.0, 0.0, 0.0);
    let body = encode_wind_body(&one_column, &[0; 8]);
    assert!(matches!(decode(&body), Err(GridError::InvalidHeader(_))));

    let negative = PayloadGeometry::new(-2, 2, 1.0, 1.0, 0.0, 0.0);
    let body = encode_wind_body(&negative, &[]);
    assert!(matches!(decode(&body), Err(GridError::InvalidHeader(_))));

    let flat = PayloadGeometry::new(2, 2, 0.0, 1.0, 0.0, 0.0);
    let body = encode_wind_body(&flat, &[0; 8]);
    assert!(matches!(decode(&body), Err(GridError::InvalidHeader(_))));
}

#[test]
fn test_decode_rejects_grid_too_large_for_two_components() {
    // nx*ny fits in a usize but the U+V sample count does not
    let huge = PayloadGeometry::new(1 << 32, 1 << 31, 1.0, 1.0, 0.0, 0.0);
    let body = encode_wind_body(&huge, &[0; 4]);
    assert!(matches!(decode(&body), Err(GridError::InvalidHeader(_))));
}

#[test]
fn test_sample_count_message_saturates() {
    let err = GridError::SampleCount {
        points: usize::MAX,
        actual: 3,
    };
    assert!(err.to_string().contains(&usize::MAX.to_string()));
}

#[test]
fn test_decode_regional_payload() {
    let payload = create_uniform_payload(&geometry::GERMANY, 10.0, -5.0);
    let grid = decode_payload(&payload).unwrap();

    assert_eq!(grid.header().len(), 41 * 33);
    let (u, v) = grid.components_at(100);
    // Quantization step is 130/255 m/s
    assert_approx_eq!(u, 10.0, 0.26);
    assert_approx_eq!(v, -5.0, 0.26);

    let [min_lon, min_lat, max_lon, max_lat] = grid.header().bounds();
    assert_approx_eq!(min_lon, 5.0, 1e-9);
    assert_approx_eq!(max_lon, 15.0, 1e-9);
    assert_approx_eq!(min_lat, 47.0, 1e-9);
    assert_approx_eq!(max_lat, 55.0, 1e-9);
}
