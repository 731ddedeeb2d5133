// Copyright (c) 2026 rezky_nightky

use std::time::{Duration, Instant};

use crate::particle::Vec2;
use crate::preset::SimConfig;
use crate::schedule::FrameLoop;
use crate::spawn::SpawnController;
use crate::stepper::Stepper;
use crate::store::ParticleStore;
use crate::surface::{Surface, Viewport};

/// The simulation context: particles, the spawn side, the stepper and the
/// surface they draw on, driven by one frame loop.
///
/// Cursor notifications only queue an origin; the burst is created on the
/// next frame so all store mutation happens inside `tick`.
pub struct Overlay<S: Surface> {
    store: ParticleStore,
    stepper: Stepper,
    spawner: SpawnController,
    surface: Option<S>,
    frames: FrameLoop,
    pending: Vec<Vec2>,
    peak: usize,
}

impl<S: Surface> Overlay<S> {
    pub fn new(cfg: SimConfig, spawner: SpawnController, frames: FrameLoop) -> Self {
        Self {
            store: ParticleStore::with_capacity(cfg.max_particles * 2),
            stepper: Stepper::new(cfg),
            spawner,
            surface: None,
            frames,
            pending: Vec::new(),
            peak: 0,
        }
    }

    /// Attaches the drawing surface and starts the frame loop.
    pub fn mount(&mut self, surface: S, now: Instant) {
        if self.frames.is_active() {
            tracing::debug!("overlay remounted, previous surface dropped");
        }
        let vp = surface.viewport();
        tracing::info!(
            width = vp.width,
            height = vp.height,
            max_particles = self.stepper.config().max_particles,
            "overlay mounted"
        );
        self.surface = Some(surface);
        self.stepper.reset_surface();
        self.frames.start(now);
    }

    pub fn is_mounted(&self) -> bool {
        self.surface.is_some()
    }

    /// Cursor moved to `(x, y)` in pixel space.
    pub fn on_cursor_event(&mut self, x: f32, y: f32) {
        if !self.is_mounted() || !x.is_finite() || !y.is_finite() {
            return;
        }
        if self.spawner.should_drip() {
            self.pending.push(Vec2::new(x, y));
        }
    }

    pub fn frame_due(&self, now: Instant) -> bool {
        self.frames.is_due(now)
    }

    pub fn time_until_frame(&self, now: Instant) -> Option<Duration> {
        self.frames.time_until_due(now)
    }

    /// Runs one frame if it is due. Returns whether anything ran; after
    /// teardown this is always false.
    pub fn tick(&mut self, now: Instant) -> bool {
        if !self.frames.is_due(now) {
            return false;
        }
        let Some(surface) = self.surface.as_mut() else {
            self.frames.cancel();
            return false;
        };

        for origin in self.pending.drain(..) {
            self.spawner.try_spawn(origin, now, &mut self.store);
        }
        self.peak = self.peak.max(self.store.len());

        self.stepper.step(&mut self.store, surface);
        tracing::trace!(population = self.store.len(), "frame");

        self.frames.complete(now);
        true
    }

    /// New viewport for the surface. Particles keep their coordinates.
    pub fn resize(&mut self, viewport: Viewport) {
        if let Some(surface) = self.surface.as_mut() {
            tracing::info!(
                width = viewport.width,
                height = viewport.height,
                "overlay resized"
            );
            surface.resize(viewport);
            self.stepper.reset_surface();
        }
    }

    /// Cancels the frame loop, drops every particle and hands the surface
    /// back. Safe to call any number of times.
    pub fn teardown(&mut self) -> Option<S> {
        self.frames.cancel();
        self.pending.clear();
        self.store.clear();
        self.spawner.reset();
        let surface = self.surface.take();
        if surface.is_some() {
            tracing::info!(peak_population = self.peak, "overlay torn down");
        }
        surface
    }

    pub fn population(&self) -> usize {
        self.store.len()
    }

    pub fn peak_population(&self) -> usize {
        self.peak
    }

    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    #[cfg(test)]
    pub fn store(&self) -> &ParticleStore {
        &self.store
    }
}

impl<S: Surface> Drop for Overlay<S> {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::particle::Rgb;
    use crate::preset::Preset;
    use crate::surface::testing::Recording;

    const FRAME: Duration = Duration::from_millis(16);

    fn overlay(preset: Preset) -> Overlay<Recording> {
        let cfg = preset.config();
        let spawner = SpawnController::new(&cfg, Rgb::new(255, 0, 0), StdRng::seed_from_u64(9));
        Overlay::new(cfg, spawner, FrameLoop::new(FRAME))
    }

    #[test]
    fn cursor_event_spawns_on_next_frame() {
        let t0 = Instant::now();
        let mut ov = overlay(Preset::Stream);
        ov.mount(Recording::new(800.0, 600.0), t0);

        ov.on_cursor_event(100.0, 50.0);
        assert_eq!(ov.population(), 0);

        assert!(ov.tick(t0));
        let n = ov.population();
        assert!((10..=20).contains(&n));
        assert_eq!(ov.surface().unwrap().rects.len(), n);
    }

    #[test]
    fn events_before_mount_are_ignored() {
        let t0 = Instant::now();
        let mut ov = overlay(Preset::Stream);
        ov.on_cursor_event(10.0, 10.0);
        assert!(!ov.tick(t0));
        ov.mount(Recording::new(800.0, 600.0), t0);
        assert!(ov.tick(t0));
        assert_eq!(ov.population(), 0);
    }

    #[test]
    fn bursts_within_a_frame_are_throttled() {
        let t0 = Instant::now();
        let mut ov = overlay(Preset::Stream);
        ov.mount(Recording::new(800.0, 600.0), t0);

        for i in 0..5 {
            ov.on_cursor_event(100.0 + i as f32, 50.0);
        }
        ov.tick(t0);
        let first = ov.population();
        assert!((10..=20).contains(&first));

        // 16 ms later the 25 ms window is still closed.
        ov.on_cursor_event(100.0, 50.0);
        assert!(ov.tick(t0 + FRAME));
        assert_eq!(ov.population(), first);

        ov.on_cursor_event(100.0, 50.0);
        assert!(ov.tick(t0 + FRAME * 2));
        assert!(ov.population() >= first + 10);
    }

    #[test]
    fn teardown_is_idempotent_and_stops_frames() {
        let t0 = Instant::now();
        let mut ov = overlay(Preset::Stream);
        ov.mount(Recording::new(800.0, 600.0), t0);
        ov.on_cursor_event(100.0, 50.0);
        ov.tick(t0);

        assert!(ov.teardown().is_some());
        assert!(ov.teardown().is_none());
        assert_eq!(ov.population(), 0);
        assert!(!ov.frame_due(t0 + Duration::from_secs(1)));
        assert!(!ov.tick(t0 + Duration::from_secs(1)));

        ov.on_cursor_event(100.0, 50.0);
        assert!(!ov.tick(t0 + Duration::from_secs(2)));
        assert_eq!(ov.population(), 0);
    }

    #[test]
    fn resize_keeps_particles_in_place() {
        let t0 = Instant::now();
        let mut ov = overlay(Preset::Stream);
        ov.mount(Recording::new(800.0, 600.0), t0);
        ov.on_cursor_event(100.0, 50.0);
        ov.tick(t0);
        let before: Vec<_> = ov.store().iter().map(|p| p.position).collect();

        ov.resize(Viewport::new(400.0, 300.0));
        let after: Vec<_> = ov.store().iter().map(|p| p.position).collect();
        assert_eq!(before, after);
        assert_eq!(ov.surface().unwrap().viewport, Viewport::new(400.0, 300.0));
    }

    #[test]
    fn end_to_end_burst_falls_and_pools() {
        let t0 = Instant::now();
        let height = 600.0;
        let floor = height * 0.99;
        let mut ov = overlay(Preset::Drip);
        ov.mount(Recording::new(800.0, height), t0);

        // Bypass the random gate so the burst is guaranteed.
        let burst = ov.spawner.spawn(Vec2::new(100.0, 50.0));
        assert!((10..=20).contains(&burst.len()));
        assert!(burst.iter().all(|p| p.position == Vec2::new(100.0, 50.0)
            && p.alpha == 1.0
            && p.color() == Rgb::new(255, 0, 0)));
        ov.store.append(burst);

        let mut now = t0;
        for _ in 0..200 {
            assert!(ov.tick(now));
            assert!(ov.population() <= 300);
            for p in ov.store().iter() {
                assert!(p.position.y >= 50.0_f32.min(floor));
                assert!(p.alpha <= 1.0);
            }
            now += FRAME;
        }
        assert!(ov.store().iter().all(|p| p.position.y >= floor));
    }
}
