// Copyright (c) 2026 rezky_nightky

use std::time::{Duration, Instant};

use crossterm::style::Color;

use crate::canvas::CellMetrics;
use crate::cell::Cell;
use crate::frame::Frame;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Edit {
    Insert(char),
    Newline,
    Backspace,
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
    Clear,
}

/// Screen cell holding the text cursor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CursorCell {
    pub col: u16,
    pub row: u16,
}

impl CursorCell {
    /// Where drops leave the cursor: bottom centre of its cell, in pixels.
    pub fn origin(self, metrics: CellMetrics) -> (f32, f32) {
        (
            (self.col as f32 + 0.5) * metrics.width,
            (self.row as f32 + 1.0) * metrics.height,
        )
    }
}

/// A tiny full-screen editor below a one-line status bar. It is the host
/// whose text cursor the drops follow.
#[derive(Clone, Debug)]
pub struct Scratchpad {
    lines: Vec<Vec<char>>,
    row: usize,
    col: usize,
    width: u16,
    height: u16,
    top: u16,
}

impl Scratchpad {
    /// `top` is the first screen row of the editing area.
    pub fn new(cols: u16, rows: u16, top: u16) -> Self {
        Self {
            lines: vec![Vec::new()],
            row: 0,
            col: 0,
            width: cols,
            height: rows.saturating_sub(top),
            top,
        }
    }

    pub fn resize(&mut self, cols: u16, rows: u16) {
        self.width = cols;
        self.height = rows.saturating_sub(self.top);
        self.reflow();
    }

    pub fn cursor(&self) -> CursorCell {
        CursorCell {
            col: self.col as u16,
            row: self.top + self.row as u16,
        }
    }

    pub fn is_full(&self) -> bool {
        self.height == 0 || self.lines.len() >= self.height as usize
    }

    #[cfg(test)]
    pub fn text(&self) -> String {
        let lines: Vec<String> = self.lines.iter().map(|l| l.iter().collect()).collect();
        lines.join("\n")
    }

    /// Applies an edit and reports the new cursor cell if the cursor moved.
    pub fn apply(&mut self, edit: Edit) -> Option<CursorCell> {
        let before = self.cursor();
        match edit {
            Edit::Insert(ch) => self.insert(ch),
            Edit::Newline => self.newline(),
            Edit::Backspace => self.backspace(),
            Edit::Left => {
                if self.col > 0 {
                    self.col -= 1;
                } else if self.row > 0 {
                    self.row -= 1;
                    self.col = self.lines[self.row].len();
                }
            }
            Edit::Right => {
                if self.col < self.lines[self.row].len() {
                    self.col += 1;
                } else if self.row + 1 < self.lines.len() {
                    self.row += 1;
                    self.col = 0;
                }
            }
            Edit::Up => {
                if self.row > 0 {
                    self.row -= 1;
                    self.col = self.col.min(self.lines[self.row].len());
                }
            }
            Edit::Down => {
                if self.row + 1 < self.lines.len() {
                    self.row += 1;
                    self.col = self.col.min(self.lines[self.row].len());
                }
            }
            Edit::Home => self.col = 0,
            Edit::End => self.col = self.lines[self.row].len(),
            Edit::Clear => {
                self.lines = vec![Vec::new()];
                self.row = 0;
                self.col = 0;
            }
        }
        let after = self.cursor();
        (after != before).then_some(after)
    }

    fn max_col(&self) -> usize {
        self.width.saturating_sub(1) as usize
    }

    fn insert(&mut self, ch: char) {
        if self.width == 0 || self.height == 0 {
            return;
        }
        if self.lines[self.row].len() > self.max_col() {
            self.newline();
        }
        self.lines[self.row].insert(self.col, ch);
        self.col += 1;
        if self.col > self.max_col() && self.lines[self.row].len() > self.max_col() {
            self.newline();
        }
    }

    fn newline(&mut self) {
        if self.height == 0 {
            return;
        }
        let rest = self.lines[self.row].split_off(self.col);
        self.lines.insert(self.row + 1, rest);
        self.row += 1;
        self.col = 0;
        self.scroll();
    }

    fn backspace(&mut self) {
        if self.col > 0 {
            self.col -= 1;
            self.lines[self.row].remove(self.col);
        } else if self.row > 0 {
            let line = self.lines.remove(self.row);
            self.row -= 1;
            self.col = self.lines[self.row].len();
            self.lines[self.row].extend(line);
            self.reflow();
        }
    }

    fn scroll(&mut self) {
        let max_lines = self.height.max(1) as usize;
        while self.lines.len() > max_lines {
            self.lines.remove(0);
            self.row = self.row.saturating_sub(1);
        }
    }

    /// Re-wraps lines that no longer fit after a resize or a join.
    fn reflow(&mut self) {
        let width = self.width.max(1) as usize;
        let mut i = 0;
        while i < self.lines.len() {
            if self.lines[i].len() > width {
                let tail = self.lines[i].split_off(width);
                self.lines.insert(i + 1, tail);
                if self.row == i && self.col >= width {
                    self.row += 1;
                    self.col -= width;
                } else if self.row > i {
                    self.row += 1;
                }
            }
            i += 1;
        }
        self.scroll();
        self.col = self.col.min(self.lines[self.row].len()).min(self.max_col());
    }

    /// Draws the status bar and the text into `frame`.
    pub fn draw(&self, frame: &mut Frame, status: &str, status_fg: Option<Color>) {
        let blank = frame.blank();
        let bg = blank.bg;

        let mut chars = status.chars();
        for x in 0..frame.width {
            for y in 0..self.top.min(frame.height) {
                let ch = if y == 0 { chars.next().unwrap_or(' ') } else { ' ' };
                frame.set(
                    x,
                    y,
                    Cell {
                        ch,
                        fg: status_fg,
                        bg,
                        bold: ch != ' ',
                    },
                );
            }
        }

        for y in self.top..frame.height {
            let line = self.lines.get((y - self.top) as usize);
            for x in 0..frame.width {
                let ch = line.and_then(|l| l.get(x as usize)).copied();
                let cell = match ch {
                    Some(ch) => Cell::text(ch, None, bg),
                    None => blank,
                };
                frame.set(x, y, cell);
            }
        }
    }
}

/// Types a phrase into the scratchpad on its own, one key at a time.
#[derive(Clone, Debug)]
pub struct Typist {
    text: Vec<char>,
    idx: usize,
    interval: Duration,
    next: Instant,
}

impl Typist {
    pub fn new(text: &str, interval: Duration, now: Instant) -> Self {
        let mut text: Vec<char> = text.chars().filter(|c| !c.is_control()).collect();
        if text.is_empty() {
            text.push('.');
        }
        Self {
            text,
            idx: 0,
            interval,
            next: now,
        }
    }

    pub fn time_until_key(&self, now: Instant) -> Duration {
        self.next.saturating_duration_since(now)
    }

    /// Next keystroke if one is due. A newline follows each pass over the
    /// phrase; a full pad is cleared first.
    pub fn poll(&mut self, now: Instant, pad: &Scratchpad) -> Option<Edit> {
        if now < self.next {
            return None;
        }
        self.next = now + self.interval;

        if self.idx == self.text.len() {
            self.idx = 0;
            if pad.is_full() {
                return Some(Edit::Clear);
            }
            return Some(Edit::Newline);
        }
        let ch = self.text[self.idx];
        self.idx += 1;
        Some(Edit::Insert(ch))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(pad: &mut Scratchpad, s: &str) {
        for ch in s.chars() {
            pad.apply(Edit::Insert(ch));
        }
    }

    #[test]
    fn typing_moves_cursor_and_reports_it() {
        let mut pad = Scratchpad::new(20, 10, 1);
        assert_eq!(pad.cursor(), CursorCell { col: 0, row: 1 });
        assert_eq!(pad.apply(Edit::Insert('h')), Some(CursorCell { col: 1, row: 1 }));
        assert_eq!(pad.apply(Edit::Newline), Some(CursorCell { col: 0, row: 2 }));
        assert_eq!(pad.apply(Edit::Home), None);
    }

    #[test]
    fn backspace_joins_lines() {
        let mut pad = Scratchpad::new(20, 10, 1);
        typed(&mut pad, "ab");
        pad.apply(Edit::Newline);
        typed(&mut pad, "cd");
        pad.apply(Edit::Home);
        pad.apply(Edit::Backspace);
        assert_eq!(pad.text(), "abcd");
        assert_eq!(pad.cursor(), CursorCell { col: 2, row: 1 });
    }

    #[test]
    fn long_lines_wrap_at_the_edge() {
        let mut pad = Scratchpad::new(4, 10, 1);
        typed(&mut pad, "abcdef");
        assert_eq!(pad.text(), "abcd\nef");
        assert_eq!(pad.cursor(), CursorCell { col: 2, row: 2 });
    }

    #[test]
    fn full_pad_scrolls() {
        let mut pad = Scratchpad::new(10, 4, 1);
        for line in ["a", "b", "c", "d"] {
            typed(&mut pad, line);
            pad.apply(Edit::Newline);
        }
        assert!(pad.is_full());
        assert_eq!(pad.text(), "c\nd\n");
        assert_eq!(pad.cursor().row, 3);
    }

    #[test]
    fn arrows_stay_inside_text() {
        let mut pad = Scratchpad::new(10, 5, 0);
        typed(&mut pad, "abc");
        pad.apply(Edit::Newline);
        typed(&mut pad, "x");
        pad.apply(Edit::Up);
        assert_eq!(pad.cursor(), CursorCell { col: 1, row: 0 });
        pad.apply(Edit::End);
        pad.apply(Edit::Right);
        assert_eq!(pad.cursor(), CursorCell { col: 0, row: 1 });
        assert_eq!(pad.apply(Edit::Down), None);
        pad.apply(Edit::Left);
        assert_eq!(pad.cursor(), CursorCell { col: 3, row: 0 });
    }

    #[test]
    fn cursor_origin_is_bottom_centre() {
        let c = CursorCell { col: 2, row: 3 };
        assert_eq!(c.origin(CellMetrics::FALLBACK), (20.0, 64.0));
    }

    #[test]
    fn draw_puts_status_and_text_in_place() {
        let mut pad = Scratchpad::new(8, 4, 1);
        typed(&mut pad, "hi");
        let mut frame = Frame::new(8, 4, None);
        pad.draw(&mut frame, "ok", None);
        assert_eq!(frame.get(0, 0).unwrap().ch, 'o');
        assert_eq!(frame.get(1, 1).unwrap().ch, 'i');
        assert_eq!(frame.get(2, 1).unwrap().ch, ' ');
    }

    #[test]
    fn typist_types_then_breaks_line() {
        let t0 = Instant::now();
        let step = Duration::from_millis(90);
        let pad = Scratchpad::new(20, 10, 1);
        let mut typist = Typist::new("ab", step, t0);

        assert_eq!(typist.poll(t0, &pad), Some(Edit::Insert('a')));
        assert_eq!(typist.poll(t0, &pad), None);
        assert_eq!(typist.poll(t0 + step, &pad), Some(Edit::Insert('b')));
        assert_eq!(typist.poll(t0 + step * 2, &pad), Some(Edit::Newline));
        assert_eq!(typist.poll(t0 + step * 3, &pad), Some(Edit::Insert('a')));
    }
}
