// Copyright (c) 2026 rezky_nightky

use crate::particle::Particle;

/// Particles at or below this opacity are dropped on the next trim.
pub const VISIBILITY_THRESHOLD: f32 = 0.1;

/// Live particles in insertion order, oldest first.
#[derive(Clone, Debug, Default)]
pub struct ParticleStore {
    particles: Vec<Particle>,
}

impl ParticleStore {
    pub fn with_capacity(cap: usize) -> Self {
        Self {
            particles: Vec::with_capacity(cap),
        }
    }

    /// Adds a burst at the young end. Capacity is enforced by the next trim,
    /// not here.
    pub fn append<I>(&mut self, particles: I)
    where
        I: IntoIterator<Item = Particle>,
    {
        self.particles.extend(particles);
    }

    /// Keeps the `max_count` youngest particles, then drops the ones that
    /// have faded out. Age first: a bright old particle can be evicted for
    /// being old, a faded young one is still removed.
    pub fn trim_and_filter(&mut self, max_count: usize) {
        let excess = self.particles.len().saturating_sub(max_count);
        if excess > 0 {
            self.particles.drain(..excess);
        }
        self.particles.retain(|p| p.alpha > VISIBILITY_THRESHOLD);
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }

    #[cfg(test)]
    pub fn iter(&self) -> std::slice::Iter<'_, Particle> {
        self.particles.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Particle> {
        self.particles.iter_mut()
    }
}
