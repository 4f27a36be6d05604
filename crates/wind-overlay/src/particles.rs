//! Particle system advected through the wind field.
//!
//! Particles live in canvas pixel space. Each frame they move by their
//! stored velocity, draw a short trail segment, and resample the field at
//! their new position. Particles that age out, leave the canvas, or land on
//! missing data are respawned at a random position.

use metrics::{counter, gauge};
use projection::{MapProjection, ScreenPoint};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use renderer::{speed_color, Surface};
use wind_grid::Interpolator;

/// Frames a particle lives before it is recycled.
pub const MAX_AGE: u32 = 90;

/// Upper bound on the pool size regardless of canvas area.
pub const MAX_PARTICLES: usize = 3000;

/// Extra sampling attempts when spawning before falling back to calm air.
pub const SPAWN_RETRIES: usize = 10;

/// Alpha kept per frame by the trail fade.
pub const FADE_ALPHA: f32 = 0.96;

/// Trail stroke width in pixels.
pub const LINE_WIDTH: f32 = 1.2;

/// Pool size for a canvas: `round(w * h * multiplier)`, within `[1, MAX_PARTICLES]`.
pub fn particle_count(width: u32, height: u32, multiplier: f64) -> usize {
    let raw = (width as f64 * height as f64 * multiplier).round();
    if !raw.is_finite() || raw < 1.0 {
        return 1;
    }
    (raw as usize).min(MAX_PARTICLES)
}

/// Screen-space displacement per frame, already multiplied by the
/// velocity scale. `dy` is positive southward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Velocity {
    pub dx: f64,
    pub dy: f64,
}

impl Velocity {
    pub fn new(dx: f64, dy: f64) -> Self {
        Self { dx, dy }
    }

    pub fn zero() -> Self {
        Self { dx: 0.0, dy: 0.0 }
    }

    /// Pixels per frame.
    pub fn magnitude(&self) -> f64 {
        self.dx.hypot(self.dy)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub x: f64,
    pub y: f64,
    /// None once the particle's last sample was invalid.
    pub velocity: Option<Velocity>,
    pub age: u32,
}

/// Answers "how fast does a particle at this canvas pixel move".
pub trait VelocitySampler {
    fn sample(&self, x: f64, y: f64) -> Option<Velocity>;
}

impl<F> VelocitySampler for F
where
    F: Fn(f64, f64) -> Option<Velocity>,
{
    fn sample(&self, x: f64, y: f64) -> Option<Velocity> {
        self(x, y)
    }
}

/// Samples an interpolated field through the host map's inverse projection.
pub struct FieldSampler<'a, P: MapProjection + ?Sized> {
    field: &'a Interpolator,
    projection: &'a P,
    velocity_scale: f64,
}

impl<'a, P: MapProjection + ?Sized> FieldSampler<'a, P> {
    pub fn new(field: &'a Interpolator, projection: &'a P, velocity_scale: f64) -> Self {
        Self {
            field,
            projection,
            velocity_scale,
        }
    }
}

impl<P: MapProjection + ?Sized> VelocitySampler for FieldSampler<'_, P> {
    fn sample(&self, x: f64, y: f64) -> Option<Velocity> {
        let geo = self.projection.project_to_geo(ScreenPoint::new(x, y)).ok()?;
        let wind = self.field.interpolate(geo.lat, geo.lon)?;
        // v points north, screen y points south
        Some(Velocity::new(
            wind.u * self.velocity_scale,
            -wind.v * self.velocity_scale,
        ))
    }
}

/// Counters from one update pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepStats {
    pub drawn: usize,
    pub respawned: usize,
}

/// A pool of particles bound to one canvas size.
#[derive(Debug, Clone)]
pub struct ParticleSystem {
    particles: Vec<Particle>,
    width: u32,
    height: u32,
    velocity_scale: f64,
    particle_multiplier: f64,
    rng: StdRng,
}

impl ParticleSystem {
    pub fn new(velocity_scale: f64, particle_multiplier: f64) -> Self {
        Self::with_rng(velocity_scale, particle_multiplier, StdRng::from_entropy())
    }

    /// Deterministic system for reproducible runs.
    pub fn with_seed(velocity_scale: f64, particle_multiplier: f64, seed: u64) -> Self {
        Self::with_rng(velocity_scale, particle_multiplier, StdRng::seed_from_u64(seed))
    }

    fn with_rng(velocity_scale: f64, particle_multiplier: f64, rng: StdRng) -> Self {
        Self {
            particles: Vec::new(),
            width: 0,
            height: 0,
            velocity_scale,
            particle_multiplier,
            rng,
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Canvas size the pool was generated for.
    pub fn bounds(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn velocity_scale(&self) -> f64 {
        self.velocity_scale
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }

    /// Mutable access to the rng, e.g. for deriving ids from the same seed.
    pub fn rng_mut(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    /// Throw away every particle and spawn a fresh pool for the canvas size.
    pub fn regenerate<V: VelocitySampler + ?Sized>(&mut self, width: u32, height: u32, sampler: &V) {
        self.width = width;
        self.height = height;
        let count = particle_count(width, height, self.particle_multiplier);

        let Self { particles, rng, .. } = self;
        particles.clear();
        particles.reserve(count);
        for _ in 0..count {
            particles.push(spawn_particle(rng, width, height, sampler));
        }

        gauge!("wind_particles").set(count as f64);
    }

    /// Spawn a single particle at a random position on the canvas.
    pub fn spawn<V: VelocitySampler + ?Sized>(&mut self, sampler: &V) -> Particle {
        spawn_particle(&mut self.rng, self.width, self.height, sampler)
    }

    /// Advance every particle one frame, stroking trails onto `surface`.
    pub fn step<V, S>(&mut self, sampler: &V, surface: &mut S) -> StepStats
    where
        V: VelocitySampler + ?Sized,
        S: Surface + ?Sized,
    {
        let (width, height) = (self.width, self.height);
        let scale = self.velocity_scale;
        let mut stats = StepStats::default();

        let Self { particles, rng, .. } = self;
        for particle in particles.iter_mut() {
            particle.age += 1;

            let velocity = match particle.velocity {
                Some(velocity) if particle.age < MAX_AGE => velocity,
                _ => {
                    *particle = spawn_particle(rng, width, height, sampler);
                    stats.respawned += 1;
                    continue;
                }
            };

            let x = particle.x + velocity.dx;
            let y = particle.y + velocity.dy;
            if !in_bounds(x, y, width, height) {
                *particle = spawn_particle(rng, width, height, sampler);
                stats.respawned += 1;
                continue;
            }

            let color = speed_color(velocity.magnitude() / scale);
            surface.stroke_segment((particle.x, particle.y), (x, y), color, LINE_WIDTH);
            stats.drawn += 1;

            particle.x = x;
            particle.y = y;
            particle.velocity = sampler.sample(x, y);
            if particle.velocity.is_none() {
                *particle = spawn_particle(rng, width, height, sampler);
                stats.respawned += 1;
            }
        }

        counter!("wind_particle_respawns_total").increment(stats.respawned as u64);
        stats
    }
}

fn in_bounds(x: f64, y: f64, width: u32, height: u32) -> bool {
    x >= 0.0 && y >= 0.0 && x < width as f64 && y < height as f64
}

fn spawn_particle<V: VelocitySampler + ?Sized>(
    rng: &mut StdRng,
    width: u32,
    height: u32,
    sampler: &V,
) -> Particle {
    let age = rng.gen_range(0..MAX_AGE);
    let mut x = 0.0;
    let mut y = 0.0;
    for _ in 0..=SPAWN_RETRIES {
        x = rng.gen::<f64>() * width as f64;
        y = rng.gen::<f64>() * height as f64;
        if let Some(velocity) = sampler.sample(x, y) {
            return Particle {
                x,
                y,
                velocity: Some(velocity),
                age,
            };
        }
    }
    // No valid sample nearby: keep the last position with calm air
    Particle {
        x,
        y,
        velocity: Some(Velocity::zero()),
        age,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use renderer::{Color, TrailCanvas};

    fn calm(_x: f64, _y: f64) -> Option<Velocity> {
        Some(Velocity::zero())
    }

    fn eastward(_x: f64, _y: f64) -> Option<Velocity> {
        Some(Velocity::new(3.0, 0.0))
    }

    fn nothing(_x: f64, _y: f64) -> Option<Velocity> {
        None
    }

    #[test]
    fn test_particle_count_bounds() {
        assert_eq!(particle_count(1500, 1, 1.0 / 1500.0), 1);
        assert_eq!(particle_count(0, 0, 1.0 / 1500.0), 1);
        assert_eq!(particle_count(10, 10, 1.0 / 1500.0), 1);
        assert_eq!(particle_count(1000, 600, 1.0 / 1500.0), 400);
        assert_eq!(particle_count(4000, 3000, 1.0 / 1500.0), MAX_PARTICLES);
    }

    #[test]
    fn test_regenerate_fills_pool() {
        let mut system = ParticleSystem::with_seed(0.3, 1.0 / 1500.0, 7);
        system.regenerate(300, 200, &eastward);
        assert_eq!(system.len(), 40);
        for p in system.particles() {
            assert!(p.x >= 0.0 && p.x < 300.0);
            assert!(p.y >= 0.0 && p.y < 200.0);
            assert!(p.age < MAX_AGE);
            assert_eq!(p.velocity, Some(Velocity::new(3.0, 0.0)));
        }
    }

    #[test]
    fn test_spawn_falls_back_to_calm() {
        let mut system = ParticleSystem::with_seed(0.3, 1.0 / 1500.0, 1);
        system.regenerate(100, 100, &nothing);
        assert!(system
            .particles()
            .iter()
            .all(|p| p.velocity == Some(Velocity::zero())));
    }

    #[test]
    fn test_spawn_retries_until_valid() {
        let mut system = ParticleSystem::with_seed(0.3, 1.0 / 1500.0, 3);
        system.regenerate(100, 100, &calm);
        let attempts = std::cell::Cell::new(0);
        let flaky = |_x: f64, _y: f64| {
            attempts.set(attempts.get() + 1);
            (attempts.get() == 4).then(|| Velocity::new(1.0, 1.0))
        };
        let particle = system.spawn(&flaky);
        assert_eq!(attempts.get(), 4);
        assert_eq!(particle.velocity, Some(Velocity::new(1.0, 1.0)));
    }

    #[test]
    fn test_step_keeps_ages_in_range() {
        let mut system = ParticleSystem::with_seed(0.3, 1.0 / 100.0, 11);
        let mut canvas = TrailCanvas::new(200, 100);
        system.regenerate(200, 100, &eastward);
        for _ in 0..250 {
            system.step(&eastward, &mut canvas);
            assert!(system.particles().iter().all(|p| p.age < MAX_AGE));
        }
    }

    #[test]
    fn test_step_moves_and_draws() {
        let mut system = ParticleSystem::with_seed(0.3, 1.0 / 1500.0, 5);
        system.regenerate(300, 5, &eastward);
        system.particles[0] = Particle {
            x: 10.0,
            y: 2.0,
            velocity: Some(Velocity::new(3.0, 0.0)),
            age: 0,
        };
        let mut canvas = TrailCanvas::new(300, 5);
        let stats = system.step(&eastward, &mut canvas);
        assert_eq!(stats.drawn, 1);
        assert_eq!(system.particles()[0].x, 13.0);
        assert_eq!(system.particles()[0].age, 1);
        assert!(canvas.painted_pixels() > 0);
    }

    #[test]
    fn test_step_color_uses_unscaled_speed() {
        // 3 px/frame at scale 0.3 is 10 m/s: pure yellow
        let mut system = ParticleSystem::with_seed(0.3, 1.0 / 1500.0, 5);
        system.regenerate(1500, 1, &eastward);
        system.particles[0] = Particle {
            x: 10.0,
            y: 0.5,
            velocity: Some(Velocity::new(3.0, 0.0)),
            age: 0,
        };

        struct Colors(Vec<Color>);
        impl Surface for Colors {
            fn create(_: u32, _: u32) -> Self {
                Colors(Vec::new())
            }
            fn width(&self) -> u32 {
                1500
            }
            fn height(&self) -> u32 {
                1
            }
            fn resize(&mut self, _: u32, _: u32) {}
            fn clear(&mut self) {}
            fn fade(&mut self, _: f32) {}
            fn stroke_segment(&mut self, _: (f64, f64), _: (f64, f64), color: Color, _: f32) {
                self.0.push(color);
            }
            fn set_translation(&mut self, _: i32, _: i32) {}
            fn translation(&self) -> (i32, i32) {
                (0, 0)
            }
        }

        let mut colors = Colors(Vec::new());
        system.step(&eastward, &mut colors);
        assert_eq!(colors.0, vec![Color::rgb(255, 255, 0)]);
    }

    #[test]
    fn test_step_respawns_out_of_bounds() {
        let mut system = ParticleSystem::with_seed(0.3, 1.0 / 1500.0, 9);
        system.regenerate(50, 30, &eastward);
        system.particles[0] = Particle {
            x: 49.0,
            y: 10.0,
            velocity: Some(Velocity::new(3.0, 0.0)),
            age: 0,
        };
        let mut canvas = TrailCanvas::new(50, 30);
        let stats = system.step(&eastward, &mut canvas);
        assert_eq!(stats.respawned, 1);
        assert_eq!(stats.drawn, 0);
        assert_eq!(canvas.painted_pixels(), 0);
    }

    #[test]
    fn test_step_respawns_aged_and_invalid() {
        let mut system = ParticleSystem::with_seed(0.3, 1.0 / 1500.0, 2);
        system.regenerate(60, 50, &calm);
        system.particles[0].age = MAX_AGE - 1;
        system.particles[1] = Particle {
            x: 5.0,
            y: 5.0,
            velocity: None,
            age: 0,
        };
        // 60x50 px holds exactly two particles
        assert_eq!(system.len(), 2);
        let mut canvas = TrailCanvas::new(60, 50);
        let stats = system.step(&calm, &mut canvas);
        assert_eq!(stats.respawned, 2);
    }
}
