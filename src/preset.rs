// Copyright (c) 2026 rezky_nightky

use std::time::Duration;

/// Tuning for one flavour of the effect. Values come from [`Preset`]; only
/// `pool` is switchable at runtime.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimConfig {
    pub max_particles: usize,
    pub gravity: f32,
    /// Per-frame alpha factor while pooling.
    pub pool_decay: f32,
    /// Per-frame alpha factor when pooling is off.
    pub fade: f32,
    pub pool: bool,
    /// Fraction of the viewport height where drops stop falling.
    pub floor_ratio: f32,

    pub amount: u32,
    pub velocity_x: (f32, f32),
    pub velocity_y: (f32, f32),
    pub drop_size: f32,
    /// `Some((min, max))` when the first drop of a burst is a big one.
    pub big_drop_size: Option<(f32, f32)>,
    /// Chance that a cursor move tries to spawn at all.
    pub spawn_chance: Option<f32>,
    pub throttle: Duration,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Preset {
    /// 300 drops, slow pool fade, a big drop leads every burst, 1 in 3
    /// cursor moves bleed.
    #[default]
    #[value(name = "drip")]
    Drip,
    /// 500 drops, faster pool fade, uniform drops, every cursor move bleeds.
    #[value(name = "stream")]
    Stream,
}

const BASE: SimConfig = SimConfig {
    max_particles: 300,
    gravity: 0.075,
    pool_decay: 0.99,
    fade: 0.96,
    pool: true,
    floor_ratio: 0.99,
    amount: 10,
    velocity_x: (-0.01, 0.01),
    velocity_y: (1.0, 2.0),
    drop_size: 3.0,
    big_drop_size: Some((4.0, 7.0)),
    spawn_chance: Some(0.33),
    throttle: Duration::from_millis(25),
};

impl Preset {
    pub const ALL: [Preset; 2] = [Preset::Drip, Preset::Stream];

    pub fn config(self) -> SimConfig {
        match self {
            Preset::Drip => BASE,
            Preset::Stream => SimConfig {
                max_particles: 500,
                pool_decay: 0.98,
                big_drop_size: None,
                spawn_chance: None,
                ..BASE
            },
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Preset::Drip => "drip",
            Preset::Stream => "stream",
        }
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Preset::default().config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_differ_only_where_variants_differ() {
        let drip = Preset::Drip.config();
        let stream = Preset::Stream.config();

        assert_eq!((drip.max_particles, stream.max_particles), (300, 500));
        assert_eq!((drip.pool_decay, stream.pool_decay), (0.99, 0.98));
        assert!(drip.big_drop_size.is_some() && stream.big_drop_size.is_none());
        assert!(drip.spawn_chance.is_some() && stream.spawn_chance.is_none());

        assert_eq!(drip.gravity, stream.gravity);
        assert_eq!(drip.amount, stream.amount);
        assert_eq!(drip.throttle, Duration::from_millis(25));
    }

    #[test]
    fn big_drop_is_bigger_than_normal_drop() {
        let cfg = Preset::Drip.config();
        let (lo, hi) = cfg.big_drop_size.unwrap();
        assert!(lo > cfg.drop_size && hi >= lo);
    }
}
