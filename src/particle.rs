// Copyright (c) 2026 rezky_nightky

use std::ops::{Add, AddAssign};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, o: Vec2) -> Vec2 {
        Vec2::new(self.x + o.x, self.y + o.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, o: Vec2) {
        self.x += o.x;
        self.y += o.y;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Colour plus opacity as handed to a drawing surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgba {
    pub rgb: Rgb,
    pub a: f32,
}

/// One droplet. Shape, colour and size are fixed at creation; only
/// `position`, `velocity` and `alpha` change while it lives.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    pub position: Vec2,
    pub velocity: Vec2,
    pub alpha: f32,
    color: Rgb,
    size: f32,
}

impl Particle {
    pub fn new(position: Vec2, velocity: Vec2, color: Rgb, size: f32) -> Self {
        Self {
            position,
            velocity,
            alpha: 1.0,
            color,
            size,
        }
    }

    pub fn color(&self) -> Rgb {
        self.color
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn rgba(&self) -> Rgba {
        Rgba {
            rgb: self.color(),
            a: self.alpha,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_particle_is_fully_opaque() {
        let p = Particle::new(
            Vec2::new(3.0, 4.0),
            Vec2::new(0.0, 1.5),
            Rgb::new(255, 0, 0),
            3.0,
        );
        assert_eq!(p.alpha, 1.0);
        assert_eq!(p.rgba().rgb, Rgb::new(255, 0, 0));
        assert_eq!(p.size(), 3.0);
    }

    #[test]
    fn vec2_add_assign_accumulates() {
        let mut v = Vec2::new(1.0, 2.0);
        v += Vec2::new(0.5, -1.0);
        assert_eq!(v, Vec2::new(1.5, 1.0));
        assert_eq!(v + Vec2::new(1.0, 1.0), Vec2::new(2.5, 2.0));
    }
}
