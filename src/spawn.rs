// Copyright (c) 2026 rezky_nightky

use std::time::Instant;

use rand::{
    distr::{Distribution, Uniform},
    rngs::StdRng,
    Rng,
};

use crate::particle::{Particle, Rgb, Vec2};
use crate::preset::SimConfig;
use crate::store::ParticleStore;
use crate::throttle::RateLimiter;

/// Turns cursor positions into bursts of drops.
pub struct SpawnController {
    amount: u32,
    drop_size: f32,
    spawn_chance: Option<f32>,
    color: Rgb,

    limiter: RateLimiter,
    mt: StdRng,

    rand_chance: Uniform<f32>,
    rand_vx: Uniform<f32>,
    rand_vy: Uniform<f32>,
    rand_big_size: Option<Uniform<f32>>,
    big_vy: f32,
}

impl SpawnController {
    pub fn new(cfg: &SimConfig, color: Rgb, mt: StdRng) -> Self {
        let (vx_lo, vx_hi) = cfg.velocity_x;
        let (vy_lo, vy_hi) = cfg.velocity_y;
        Self {
            amount: cfg.amount,
            drop_size: cfg.drop_size,
            spawn_chance: cfg.spawn_chance,
            color,
            limiter: RateLimiter::new(cfg.throttle),
            mt,
            rand_chance: Uniform::new(0.0, 1.0).expect("valid range"),
            rand_vx: Uniform::new_inclusive(vx_lo, vx_hi).expect("valid range"),
            rand_vy: Uniform::new_inclusive(vy_lo, vy_hi).expect("valid range"),
            rand_big_size: cfg
                .big_drop_size
                .map(|(lo, hi)| Uniform::new_inclusive(lo, hi).expect("valid range")),
            big_vy: vy_hi,
        }
    }

    /// Coin flip deciding whether a cursor move bleeds at all. Always true
    /// when the preset has no gate.
    pub fn should_drip(&mut self) -> bool {
        match self.spawn_chance {
            Some(chance) => self.rand_chance.sample(&mut self.mt) < chance,
            None => true,
        }
    }

    /// Throttled entry point. Returns how many drops were added, zero when
    /// the call landed inside the cooldown window.
    pub fn try_spawn(&mut self, origin: Vec2, now: Instant, store: &mut ParticleStore) -> usize {
        if !self.limiter.try_admit(now) {
            tracing::trace!(x = origin.x, y = origin.y, "burst throttled");
            return 0;
        }
        let burst = self.spawn(origin);
        let n = burst.len();
        store.append(burst);
        tracing::debug!(x = origin.x, y = origin.y, count = n, "burst spawned");
        n
    }

    /// One unthrottled burst of `amount..=2*amount` drops at `origin`.
    pub fn spawn(&mut self, origin: Vec2) -> Vec<Particle> {
        let extra = (self.mt.random::<f32>() * self.amount as f32).round() as u32;
        let count = self.amount + extra.min(self.amount);
        let color = self.color;

        let mut out = Vec::with_capacity(count as usize);
        for i in 0..count {
            let vx = self.rand_vx.sample(&mut self.mt);
            let (vy, size) = match &self.rand_big_size {
                Some(big) if i == 0 => (self.big_vy, big.sample(&mut self.mt)),
                _ => (self.rand_vy.sample(&mut self.mt), self.drop_size),
            };
            out.push(Particle::new(origin, Vec2::new(vx, vy), color, size));
        }
        out
    }

    pub fn reset(&mut self) {
        self.limiter.reset();
    }
}
