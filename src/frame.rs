// Copyright (c) 2026 rezky_nightky

use crossterm::style::Color;

use crate::cell::Cell;

/// Cell grid handed to the terminal. Writes that do not change a cell are
/// ignored, so a frame rebuilt from scratch every tick still only reports
/// the cells that actually differ.
#[derive(Clone, Debug)]
pub struct Frame {
    pub width: u16,
    pub height: u16,
    cells: Vec<Cell>,
    blank: Cell,
    dirty_all: bool,
    dirty_map: Vec<bool>,
    dirty: Vec<usize>,
}

impl Frame {
    pub fn new(width: u16, height: u16, bg: Option<Color>) -> Self {
        let len = width as usize * height as usize;
        let blank = Cell::blank_with_bg(bg);
        Self {
            width,
            height,
            cells: vec![blank; len],
            blank,
            dirty_all: true,
            dirty_map: vec![false; len],
            dirty: Vec::new(),
        }
    }

    pub fn blank(&self) -> Cell {
        self.blank
    }

    pub fn is_dirty_all(&self) -> bool {
        self.dirty_all
    }

    pub fn dirty_indices(&self) -> &[usize] {
        &self.dirty
    }

    pub fn has_changes(&self) -> bool {
        self.dirty_all || !self.dirty.is_empty()
    }

    pub fn clear_dirty(&mut self) {
        if self.dirty_all {
            self.dirty_all = false;
            self.dirty_map.fill(false);
            self.dirty.clear();
            return;
        }

        for &i in &self.dirty {
            if let Some(v) = self.dirty_map.get_mut(i) {
                *v = false;
            }
        }
        self.dirty.clear();
    }

    pub fn index(&self, x: u16, y: u16) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        self.index(x, y).map(|i| &self.cells[i])
    }

    pub fn cell_at_index(&self, i: usize) -> Cell {
        self.cells.get(i).copied().unwrap_or(self.blank)
    }

    pub fn set(&mut self, x: u16, y: u16, cell: Cell) {
        let Some(i) = self.index(x, y) else {
            return;
        };
        if self.cells[i] == cell {
            return;
        }
        self.cells[i] = cell;
        if !self.dirty_all && !self.dirty_map[i] {
            self.dirty_map[i] = true;
            self.dirty.push(i);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_frame_needs_full_redraw() {
        let f = Frame::new(3, 2, None);
        assert!(f.is_dirty_all());
        assert!(f.has_changes());
        assert_eq!(f.get(2, 1).unwrap().ch, ' ');
        assert!(f.get(3, 0).is_none());
    }

    #[test]
    fn unchanged_writes_are_not_dirty() {
        let mut f = Frame::new(3, 2, None);
        f.clear_dirty();

        f.set(0, 0, f.blank());
        assert!(!f.has_changes());

        f.set(1, 1, Cell::text('x', None, None));
        f.set(1, 1, Cell::text('x', None, None));
        assert_eq!(f.dirty_indices(), &[4]);

        f.clear_dirty();
        assert!(!f.has_changes());
        assert_eq!(f.cell_at_index(4).ch, 'x');
    }

    #[test]
    fn out_of_bounds_set_is_ignored() {
        let mut f = Frame::new(2, 2, None);
        f.clear_dirty();
        f.set(5, 5, Cell::text('x', None, None));
        assert!(!f.has_changes());
    }
}
