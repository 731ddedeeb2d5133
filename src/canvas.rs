// Copyright (c) 2026 rezky_nightky

use crate::cell::Cell;
use crate::palette::Palette;
use crate::particle::{Rgb, Rgba};
use crate::surface::{FillRect, Surface, Viewport};

const UPPER_HALF: char = '\u{2580}';
const LOWER_HALF: char = '\u{2584}';
const FULL_BLOCK: char = '\u{2588}';

/// Pixel size of one terminal cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellMetrics {
    pub width: f32,
    pub height: f32,
}

impl CellMetrics {
    pub const FALLBACK: CellMetrics = CellMetrics {
        width: 8.0,
        height: 16.0,
    };

    /// Uses the window's pixel size when the terminal reports one.
    pub fn from_window(cols: u16, rows: u16, width_px: u16, height_px: u16) -> Self {
        if cols == 0 || rows == 0 || width_px == 0 || height_px == 0 {
            return Self::FALLBACK;
        }
        Self {
            width: width_px as f32 / cols as f32,
            height: height_px as f32 / rows as f32,
        }
    }

    pub fn detect(cols: u16, rows: u16) -> Self {
        match crossterm::terminal::window_size() {
            Ok(ws) => Self::from_window(cols, rows, ws.width, ws.height),
            Err(_) => Self::FALLBACK,
        }
    }

    pub fn viewport(&self, cols: u16, rows: u16) -> Viewport {
        Viewport::new(cols as f32 * self.width, rows as f32 * self.height)
    }
}

/// Premultiplied colour and coverage of one sub-pixel.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct Px {
    r: f32,
    g: f32,
    b: f32,
    a: f32,
}

impl Px {
    fn over(&mut self, src: Rgba) {
        let a = src.a.clamp(0.0, 1.0);
        let keep = 1.0 - a;
        self.r = src.rgb.r as f32 * a + self.r * keep;
        self.g = src.rgb.g as f32 * a + self.g * keep;
        self.b = src.rgb.b as f32 * a + self.b * keep;
        self.a = a + self.a * keep;
    }

    fn rgba(self) -> Rgba {
        if self.a <= 0.0 {
            return Rgba {
                rgb: Rgb::new(0, 0, 0),
                a: 0.0,
            };
        }
        let un = |v: f32| (v / self.a).round().clamp(0.0, 255.0) as u8;
        Rgba {
            rgb: Rgb::new(un(self.r), un(self.g), un(self.b)),
            a: self.a.min(1.0),
        }
    }
}

/// Overlay raster at half-block resolution: each terminal cell holds two
/// stacked sub-pixels.
#[derive(Clone, Debug)]
pub struct Canvas {
    metrics: CellMetrics,
    viewport: Viewport,
    cols: u16,
    rows: u16,
    pixels: Vec<Px>,
}

impl Canvas {
    pub fn new(cols: u16, rows: u16, metrics: CellMetrics) -> Self {
        let mut canvas = Self {
            metrics,
            viewport: metrics.viewport(cols, rows),
            cols: 0,
            rows: 0,
            pixels: Vec::new(),
        };
        canvas.resize_cells(cols, rows);
        canvas
    }

    #[cfg(test)]
    pub fn cols(&self) -> u16 {
        self.cols
    }

    #[cfg(test)]
    pub fn rows(&self) -> u16 {
        self.rows
    }

    fn resize_cells(&mut self, cols: u16, rows: u16) {
        self.cols = cols;
        self.rows = rows;
        self.pixels.clear();
        self.pixels
            .resize(cols as usize * rows as usize * 2, Px::default());
    }

    fn sub_height(&self) -> f32 {
        self.metrics.height / 2.0
    }

    /// Colour of sub-pixel `(x, sy)`, `sy` counting half-cells from the top.
    pub fn pixel(&self, x: u16, sy: u32) -> Rgba {
        if x >= self.cols || sy >= self.rows as u32 * 2 {
            return Px::default().rgba();
        }
        self.pixels[sy as usize * self.cols as usize + x as usize].rgba()
    }

    /// Overlays this canvas on `base` for the cell at `(col, row)`. Text
    /// under a drop stays readable: the glyph is kept and the drop tints
    /// the background.
    pub fn paint_cell(&self, col: u16, row: u16, base: Cell, palette: &Palette) -> Cell {
        let top = self.pixel(col, row as u32 * 2);
        let bottom = self.pixel(col, row as u32 * 2 + 1);
        let show_top = palette.is_visible(top);
        let show_bottom = palette.is_visible(bottom);
        if !show_top && !show_bottom {
            return base;
        }

        if base.ch != ' ' {
            let strongest = if top.a >= bottom.a { top } else { bottom };
            return Cell {
                bg: palette.color_for(strongest).or(base.bg),
                bold: true,
                ..base
            };
        }

        let top_c = palette.color_for(top);
        let bottom_c = palette.color_for(bottom);
        let (ch, fg, bg) = match (show_top, show_bottom) {
            (true, true) if top_c == bottom_c => (FULL_BLOCK, top_c, base.bg),
            (true, true) => (UPPER_HALF, top_c, bottom_c),
            (true, false) => (UPPER_HALF, top_c, base.bg),
            _ => (LOWER_HALF, bottom_c, base.bg),
        };
        Cell {
            ch,
            fg,
            bg,
            bold: false,
        }
    }

    #[cfg(test)]
    pub fn is_blank(&self) -> bool {
        self.pixels.iter().all(|p| p.a <= 0.0)
    }
}

impl Surface for Canvas {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn resize(&mut self, viewport: Viewport) {
        let cols = (viewport.width / self.metrics.width).round().max(0.0) as u16;
        let rows = (viewport.height / self.metrics.height).round().max(0.0) as u16;
        self.viewport = viewport;
        self.resize_cells(cols, rows);
    }

    fn clear(&mut self) {
        self.pixels.fill(Px::default());
    }

    fn fill_rect(&mut self, rect: &FillRect) {
        if !(rect.x.is_finite() && rect.y.is_finite() && rect.size.is_finite()) {
            return;
        }
        if self.cols == 0 || self.rows == 0 || rect.color.a <= 0.0 {
            return;
        }

        let sw = self.metrics.width;
        let sh = self.sub_height();
        let span = |start: f32, len: f32, unit: f32, limit: i64| -> Option<(usize, usize)> {
            let lo = (start / unit).floor() as i64;
            let hi = (((start + len) / unit).ceil() as i64).max(lo + 1);
            let lo = lo.max(0);
            let hi = hi.min(limit);
            (lo < hi).then_some((lo as usize, hi as usize))
        };

        let Some((x0, x1)) = span(rect.x, rect.size, sw, self.cols as i64) else {
            return;
        };
        let Some((y0, y1)) = span(rect.y, rect.size, sh, self.rows as i64 * 2) else {
            return;
        };

        let stride = self.cols as usize;
        for sy in y0..y1 {
            for px in &mut self.pixels[sy * stride + x0..sy * stride + x1] {
                px.over(rect.color);
            }
        }
    }
}
