//! Field sampling through a host projection.

use projection::MapProjection;
use test_utils::{assert_approx_eq, create_uniform_payload, geometry, FakeMap};
use wind_grid::{decode_payload, dequantize, Interpolator};
use wind_overlay::{FieldSampler, VelocitySampler};

fn field(u: f32, v: f32) -> Interpolator {
    Interpolator::new(decode_payload(&create_uniform_payload(&geometry::GERMANY, u, v)).unwrap())
}

#[test]
fn test_sample_scales_and_flips_v() {
    let field = field(10.0, 10.0);
    let map = FakeMap::germany(900, 600);
    let sampler = FieldSampler::new(&field, &map, 0.3);

    let velocity = sampler.sample(450.0, 300.0).unwrap();
    let (u, v) = field.grid().components_at(0);
    assert_approx_eq!(velocity.dx, u as f64 * 0.3, 1e-9);
    // Northward wind moves up the screen
    assert_approx_eq!(velocity.dy, -(v as f64) * 0.3, 1e-9);
    assert!(velocity.dy < 0.0);
    assert_approx_eq!(u, dequantize(147), 1e-6);
}

#[test]
fn test_sample_outside_grid_is_none() {
    let field = field(5.0, 0.0);
    let map = FakeMap::germany(900, 600);
    let sampler = FieldSampler::new(&field, &map, 0.3);
    // 2000 px east of the left edge is ~25.5° E, beyond the grid
    assert!(sampler.sample(2000.0, 10.0).is_none());
    assert!(map.project_to_geo(projection::ScreenPoint::new(2000.0, 10.0)).is_ok());
}

#[test]
fn test_sample_without_projection_is_none() {
    let field = field(5.0, 0.0);
    let mut map = FakeMap::germany(900, 600);
    map.ready = false;
    let sampler = FieldSampler::new(&field, &map, 0.3);
    assert!(sampler.sample(10.0, 10.0).is_none());
}
