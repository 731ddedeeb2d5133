// Copyright (c) 2026 rezky_nightky

use crossterm::style::Color;

use crate::particle::{Rgb, Rgba};
use crate::runtime::ColorMode;

/// Below this the overlay pixel is treated as empty.
const MIN_VISIBLE_ALPHA: f32 = 1.0 / 255.0;
/// Mono terminals cannot shade, so a drop shows only while mostly opaque.
const MONO_ALPHA_CUTOFF: f32 = 0.35;

fn dist2(a: Rgb, b: Rgb) -> i32 {
    let dr = (a.r as i32) - (b.r as i32);
    let dg = (a.g as i32) - (b.g as i32);
    let db = (a.b as i32) - (b.b as i32);
    (dr * dr) + (dg * dg) + (db * db)
}

fn rgb_to_ansi256(c: Rgb) -> u8 {
    const CUBE_LEVELS: [u8; 6] = [0, 95, 135, 175, 215, 255];

    let level = |v: u8| (((v as u16 * 5) + 127) / 255) as u8;
    let (r6, g6, b6) = (level(c.r), level(c.g), level(c.b));
    let cube = Rgb::new(
        CUBE_LEVELS[r6 as usize],
        CUBE_LEVELS[g6 as usize],
        CUBE_LEVELS[b6 as usize],
    );
    let cube_idx = 16 + (36 * r6) + (6 * g6) + b6;

    let avg = ((c.r as u16 + c.g as u16 + c.b as u16) / 3) as u8;
    let (gray_idx, gray) = if avg < 8 {
        (16, Rgb::new(0, 0, 0))
    } else if avg > 238 {
        (231, Rgb::new(255, 255, 255))
    } else {
        let idx = 232 + ((avg - 8) / 10);
        let v = 8 + 10 * (idx - 232);
        (idx, Rgb::new(v, v, v))
    };

    if dist2(c, gray) < dist2(c, cube) {
        gray_idx
    } else {
        cube_idx
    }
}

fn rgb_to_color16(c: Rgb) -> Color {
    const TABLE: [(Color, Rgb); 16] = [
        (Color::Black, Rgb::new(0, 0, 0)),
        (Color::DarkGrey, Rgb::new(128, 128, 128)),
        (Color::Grey, Rgb::new(192, 192, 192)),
        (Color::White, Rgb::new(255, 255, 255)),
        (Color::DarkRed, Rgb::new(128, 0, 0)),
        (Color::Red, Rgb::new(255, 0, 0)),
        (Color::DarkGreen, Rgb::new(0, 128, 0)),
        (Color::Green, Rgb::new(0, 255, 0)),
        (Color::DarkBlue, Rgb::new(0, 0, 128)),
        (Color::Blue, Rgb::new(0, 0, 255)),
        (Color::DarkCyan, Rgb::new(0, 128, 128)),
        (Color::Cyan, Rgb::new(0, 255, 255)),
        (Color::DarkMagenta, Rgb::new(128, 0, 128)),
        (Color::Magenta, Rgb::new(255, 0, 255)),
        (Color::DarkYellow, Rgb::new(128, 128, 0)),
        (Color::Yellow, Rgb::new(255, 255, 0)),
    ];

    let mut best = Color::White;
    let mut best_d = i32::MAX;
    for (color, rgb) in TABLE {
        let d = dist2(c, rgb);
        if d < best_d {
            best_d = d;
            best = color;
        }
    }
    best
}

fn lerp_u8(a: u8, b: u8, t: f32) -> u8 {
    let a = a as f32;
    let b = b as f32;
    (a + (b - a) * t).round().clamp(0.0, 255.0) as u8
}

/// Maps overlay pixels to terminal colours for one colour mode and
/// background.
#[derive(Clone, Copy, Debug)]
pub struct Palette {
    pub mode: ColorMode,
    /// Colour the overlay is blended against.
    pub backdrop: Rgb,
    /// Background written to empty cells; `None` keeps the terminal's own.
    pub bg: Option<Color>,
}

impl Palette {
    pub fn new(mode: ColorMode, default_background: bool) -> Self {
        let backdrop = Rgb::new(0, 0, 0);
        let bg = if default_background || mode == ColorMode::Mono {
            None
        } else {
            Some(match mode {
                ColorMode::Color16 => Color::Black,
                ColorMode::TrueColor => Color::Rgb { r: 0, g: 0, b: 0 },
                _ => Color::AnsiValue(16),
            })
        };
        Self { mode, backdrop, bg }
    }

    pub fn is_visible(&self, px: Rgba) -> bool {
        match self.mode {
            ColorMode::Mono => px.a >= MONO_ALPHA_CUTOFF,
            _ => px.a >= MIN_VISIBLE_ALPHA,
        }
    }

    /// Composites `px` over the backdrop and converts it for the terminal.
    /// `None` means "nothing to paint" (or mono, where the default
    /// foreground is used).
    pub fn color_for(&self, px: Rgba) -> Option<Color> {
        if !self.is_visible(px) {
            return None;
        }
        let a = px.a.clamp(0.0, 1.0);
        let c = Rgb::new(
            lerp_u8(self.backdrop.r, px.rgb.r, a),
            lerp_u8(self.backdrop.g, px.rgb.g, a),
            lerp_u8(self.backdrop.b, px.rgb.b, a),
        );
        self.term_color(c)
    }

    pub fn term_color(&self, c: Rgb) -> Option<Color> {
        match self.mode {
            ColorMode::Mono => None,
            ColorMode::TrueColor => Some(Color::Rgb {
                r: c.r,
                g: c.g,
                b: c.b,
            }),
            ColorMode::Color256 => Some(Color::AnsiValue(rgb_to_ansi256(c))),
            ColorMode::Color16 => Some(rgb_to_color16(c)),
        }
    }
}
