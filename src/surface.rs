// Copyright (c) 2026 rezky_nightky

use crate::particle::Rgba;

/// Viewport dimensions in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// A filled square, top-left corner in pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FillRect {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub color: Rgba,
}

/// Overlay drawing target. Every frame is a full clear followed by rects.
pub trait Surface {
    fn viewport(&self) -> Viewport;
    fn resize(&mut self, viewport: Viewport);
    fn clear(&mut self);
    fn fill_rect(&mut self, rect: &FillRect);
}

#[cfg(test)]
pub mod testing {
    use super::*;

    /// Keeps the commands of the last frame instead of rasterizing them.
    #[derive(Debug, Default)]
    pub struct Recording {
        pub viewport: Viewport,
        pub rects: Vec<FillRect>,
        pub clears: usize,
    }

    impl Recording {
        pub fn new(width: f32, height: f32) -> Self {
            Self {
                viewport: Viewport::new(width, height),
                ..Self::default()
            }
        }
    }

    impl Surface for Recording {
        fn viewport(&self) -> Viewport {
            self.viewport
        }

        fn resize(&mut self, viewport: Viewport) {
            self.viewport = viewport;
        }

        fn clear(&mut self) {
            self.rects.clear();
            self.clears += 1;
        }

        fn fill_rect(&mut self, rect: &FillRect) {
            self.rects.push(*rect);
        }
    }
}
