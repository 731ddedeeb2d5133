// Copyright (c) 2026 rezky_nightky

use crate::particle::Particle;
use crate::preset::SimConfig;
use crate::store::ParticleStore;
use crate::surface::{FillRect, Surface};

/// Lateral spread factor applied to `velocity.x` while a drop pools.
const POOL_SPREAD: f32 = 100.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Motion {
    Falling,
    Pooling,
    Fading,
}

/// Height at which drops stop falling, or `None` when the viewport is
/// unusable and everything should be treated as already pooled.
fn floor_for(cfg: &SimConfig, viewport_height: f32) -> Option<f32> {
    if viewport_height.is_finite() && viewport_height > 0.0 {
        Some(viewport_height * cfg.floor_ratio)
    } else {
        None
    }
}

/// Moves one particle forward by a frame.
pub fn advance(p: &mut Particle, cfg: &SimConfig, viewport_height: f32) -> Motion {
    if !cfg.pool {
        p.position += p.velocity;
        p.alpha *= cfg.fade;
        return Motion::Fading;
    }

    match floor_for(cfg, viewport_height) {
        Some(floor) if p.position.y < floor => {
            p.velocity.y += cfg.gravity;
            p.position += p.velocity;
            Motion::Falling
        }
        _ => {
            p.position.x += p.velocity.x * POOL_SPREAD;
            p.alpha *= cfg.pool_decay;
            Motion::Pooling
        }
    }
}

fn round_px(v: f32) -> f32 {
    (v + 0.5).floor()
}

/// Square covering `p`, pixel aligned, centred horizontally on the drop.
pub fn draw_rect(p: &Particle) -> FillRect {
    let size = p.size();
    FillRect {
        x: round_px(p.position.x - 1.0) - size / 2.0,
        y: round_px(p.position.y - 1.0),
        size,
        color: p.rgba(),
    }
}

/// Per-frame physics and redraw.
#[derive(Clone, Debug)]
pub struct Stepper {
    cfg: SimConfig,
    surface_has_content: bool,
}

impl Stepper {
    pub fn new(cfg: SimConfig) -> Self {
        Self {
            cfg,
            surface_has_content: false,
        }
    }

    pub fn config(&self) -> &SimConfig {
        &self.cfg
    }

    /// Advances and draws every particle, then trims the store. With nothing
    /// to draw the surface is left alone, apart from wiping what the last
    /// drawn frame left behind.
    pub fn step<S: Surface + ?Sized>(&mut self, store: &mut ParticleStore, surface: &mut S) {
        if store.is_empty() {
            if self.surface_has_content {
                surface.clear();
                self.surface_has_content = false;
            }
            return;
        }

        let height = surface.viewport().height;
        surface.clear();
        for p in store.iter_mut() {
            advance(p, &self.cfg, height);
            surface.fill_rect(&draw_rect(p));
        }
        self.surface_has_content = true;

        store.trim_and_filter(self.cfg.max_particles);
    }

    /// Forget what is on the surface, e.g. after it was recreated.
    pub fn reset_surface(&mut self) {
        self.surface_has_content = false;
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::particle::{Rgb, Vec2};
    use crate::preset::Preset;
    use crate::surface::testing::Recording;

    fn drop_at(x: f32, y: f32, vx: f32, vy: f32) -> Particle {
        Particle::new(Vec2::new(x, y), Vec2::new(vx, vy), Rgb::new(255, 0, 0), 3.0)
    }

    #[test]
    fn falling_accumulates_gravity_before_moving() {
        let cfg = Preset::Drip.config();
        let mut p = drop_at(10.0, 10.0, 0.01, 1.0);

        assert_eq!(advance(&mut p, &cfg, 1000.0), Motion::Falling);
        assert!((p.velocity.y - 1.075).abs() < 1e-6);
        assert!((p.position.y - 11.075).abs() < 1e-5);
        assert!((p.position.x - 10.01).abs() < 1e-6);
        assert_eq!(p.alpha, 1.0);
    }

    #[test]
    fn pooling_freezes_y_spreads_x_and_decays() {
        let cfg = Preset::Drip.config();
        let mut p = drop_at(10.0, 990.0, 0.01, 2.0);

        assert_eq!(advance(&mut p, &cfg, 1000.0), Motion::Pooling);
        assert_eq!(p.position.y, 990.0);
        assert!((p.position.x - 11.0).abs() < 1e-5);
        assert!((p.alpha - 0.99).abs() < 1e-6);
        assert_eq!(p.velocity.y, 2.0);
    }

    #[test]
    fn without_pooling_everything_fades_while_moving() {
        let cfg = SimConfig {
            pool: false,
            ..Preset::Drip.config()
        };
        let mut p = drop_at(0.0, 995.0, 0.0, 1.0);

        assert_eq!(advance(&mut p, &cfg, 1000.0), Motion::Fading);
        assert_eq!(p.position.y, 996.0);
        assert_eq!(p.velocity.y, 1.0);
        assert!((p.alpha - 0.96).abs() < 1e-6);
    }

    #[test]
    fn degenerate_viewport_means_pooling() {
        let cfg = Preset::Drip.config();
        for h in [0.0, -5.0, f32::NAN, f32::INFINITY] {
            let mut p = drop_at(5.0, -20.0, 0.0, 1.0);
            assert_eq!(advance(&mut p, &cfg, h), Motion::Pooling);
            assert!(p.position.x.is_finite() && p.position.y.is_finite());
            assert!(p.alpha.is_finite());
        }
    }

    #[test]
    fn draw_rect_is_pixel_aligned_and_centred() {
        let p = Particle::new(Vec2::new(100.4, 50.5), Vec2::default(), Rgb::new(1, 2, 3), 3.0);
        let r = draw_rect(&p);
        assert_eq!(r.x, 99.0 - 1.5);
        assert_eq!(r.y, 50.0);
        assert_eq!(r.size, 3.0);
        assert_eq!(r.color.rgb, Rgb::new(1, 2, 3));
        assert_eq!(r.color.a, 1.0);
    }

    #[test]
    fn step_draws_every_particle_then_trims() {
        let cfg = SimConfig {
            max_particles: 2,
            ..Preset::Drip.config()
        };
        let mut stepper = Stepper::new(cfg);
        let mut store = ParticleStore::default();
        store.append((0..3).map(|i| drop_at(i as f32, 0.0, 0.0, 1.0)));
        let mut surface = Recording::new(640.0, 480.0);

        stepper.step(&mut store, &mut surface);

        assert_eq!(surface.clears, 1);
        assert_eq!(surface.rects.len(), 3);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn empty_store_clears_leftovers_once() {
        let mut stepper = Stepper::new(Preset::Drip.config());
        let mut store = ParticleStore::default();
        let mut surface = Recording::new(640.0, 480.0);

        stepper.step(&mut store, &mut surface);
        assert_eq!(surface.clears, 0);

        let mut p = drop_at(0.0, 0.0, 0.0, 1.0);
        p.alpha = 0.05;
        store.append([p]);
        stepper.step(&mut store, &mut surface);
        assert!(store.is_empty());
        assert_eq!(surface.clears, 1);

        stepper.step(&mut store, &mut surface);
        stepper.step(&mut store, &mut surface);
        assert_eq!(surface.clears, 2);
        assert!(surface.rects.is_empty());
    }

    proptest! {
        #[test]
        fn alpha_never_increases(
            y in -200.0f32..1200.0,
            vx in -0.01f32..=0.01,
            vy in 1.0f32..=2.0,
            pool in any::<bool>(),
            stream in any::<bool>(),
        ) {
            let preset = if stream { Preset::Stream } else { Preset::Drip };
            let cfg = SimConfig { pool, ..preset.config() };
            let mut p = drop_at(50.0, y, vx, vy);
            for _ in 0..300 {
                let before = p.alpha;
                advance(&mut p, &cfg, 1000.0);
                prop_assert!(p.alpha <= before);
            }
        }

        #[test]
        fn falling_drop_reaches_floor_and_stays(
            y in 0.0f32..980.0,
            vy in 1.0f32..=2.0,
        ) {
            let cfg = Preset::Drip.config();
            let floor = 1000.0 * cfg.floor_ratio;
            let mut p = drop_at(50.0, y, 0.0, vy);

            // Starting at rest, gravity alone covers 990 px in well under
            // 200 frames.
            let mut frames = 0;
            while advance(&mut p, &cfg, 1000.0) == Motion::Falling {
                frames += 1;
                prop_assert!(frames < 200);
            }
            prop_assert!(p.position.y >= floor);

            let settled = p.position.y;
            for _ in 0..50 {
                prop_assert_eq!(advance(&mut p, &cfg, 1000.0), Motion::Pooling);
                prop_assert_eq!(p.position.y, settled);
            }
        }
    }
}
