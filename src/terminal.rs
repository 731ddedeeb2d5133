// Copyright (c) 2026 rezky_nightky

use std::io::{stdout, Result, Stdout, Write};

use crossterm::{
    cursor, event,
    style::{
        Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor,
    },
    terminal, ExecutableCommand, QueueableCommand,
};

use crate::cell::Cell;
use crate::frame::Frame;

/// Pen state while queueing a frame, so unchanged attributes are not
/// re-sent for every cell.
#[derive(Default)]
struct Pen {
    fg: Option<Color>,
    bg: Option<Color>,
    bold: bool,
    pos: Option<(u16, u16)>,
}

pub struct Terminal {
    stdout: Stdout,
    mouse: bool,
    run_buf: String,
    dirty_sorted: Vec<usize>,
}

impl Terminal {
    pub fn new(mouse: bool) -> Result<Self> {
        let mut out = stdout();
        terminal::enable_raw_mode()?;
        let init_res: Result<()> = (|| {
            out.execute(terminal::EnterAlternateScreen)?;
            out.execute(cursor::Hide)?;
            let _ = out.execute(terminal::DisableLineWrap);
            if mouse {
                out.execute(event::EnableMouseCapture)?;
            }
            out.execute(SetAttribute(Attribute::Reset))?;
            out.execute(ResetColor)?;
            out.execute(terminal::Clear(terminal::ClearType::All))?;
            out.flush()?;
            Ok(())
        })();
        if let Err(e) = init_res {
            restore(&mut out, mouse);
            return Err(e);
        }
        Ok(Self {
            stdout: out,
            mouse,
            run_buf: String::with_capacity(64),
            dirty_sorted: Vec::new(),
        })
    }

    pub fn size(&self) -> Result<(u16, u16)> {
        terminal::size()
    }

    pub fn poll_event(timeout: std::time::Duration) -> Result<bool> {
        event::poll(timeout)
    }

    pub fn read_event() -> Result<event::Event> {
        event::read()
    }

    /// Writes the changed cells of `frame` and leaves the text cursor at
    /// `cursor_at` (hidden when `None`).
    pub fn draw(&mut self, frame: &mut Frame, cursor_at: Option<(u16, u16)>) -> Result<()> {
        self.stdout.queue(terminal::BeginSynchronizedUpdate)?;
        self.stdout.queue(cursor::Hide)?;
        let mut pen = Pen::default();

        if frame.is_dirty_all() {
            self.stdout
                .queue(terminal::Clear(terminal::ClearType::All))?;
            for y in 0..frame.height {
                self.stdout.queue(cursor::MoveTo(0, y))?;
                pen.pos = Some((0, y));
                for x in 0..frame.width {
                    let idx = y as usize * frame.width as usize + x as usize;
                    let cell = frame.cell_at_index(idx);
                    self.apply_style(&mut pen, &cell)?;
                    self.stdout.queue(Print(cell.ch))?;
                }
            }
        } else {
            self.dirty_sorted.clear();
            self.dirty_sorted.extend_from_slice(frame.dirty_indices());
            self.dirty_sorted.sort_unstable();

            let width = frame.width as usize;
            let mut i = 0usize;
            while i < self.dirty_sorted.len() {
                let idx0 = self.dirty_sorted[i];
                let cell0 = frame.cell_at_index(idx0);
                let (x0, y0) = ((idx0 % width) as u16, (idx0 / width) as u16);

                // Merge horizontally adjacent cells that share a style.
                self.run_buf.clear();
                self.run_buf.push(cell0.ch);
                let mut run_len: u16 = 1;
                let mut j = i + 1;
                while j < self.dirty_sorted.len() {
                    let idx1 = self.dirty_sorted[j];
                    if idx1 != idx0 + run_len as usize || idx1 / width != idx0 / width {
                        break;
                    }
                    let cell1 = frame.cell_at_index(idx1);
                    if cell1.fg != cell0.fg || cell1.bg != cell0.bg || cell1.bold != cell0.bold {
                        break;
                    }
                    self.run_buf.push(cell1.ch);
                    run_len += 1;
                    j += 1;
                }

                if pen.pos != Some((x0, y0)) {
                    self.stdout.queue(cursor::MoveTo(x0, y0))?;
                }
                self.apply_style(&mut pen, &cell0)?;
                self.stdout.queue(Print(self.run_buf.as_str()))?;
                let next_x = x0.saturating_add(run_len);
                pen.pos = (next_x < frame.width).then_some((next_x, y0));

                i = j;
            }
        }

        self.stdout.queue(SetAttribute(Attribute::Reset))?;
        self.stdout.queue(ResetColor)?;
        if let Some((x, y)) = cursor_at {
            self.stdout.queue(cursor::MoveTo(x, y))?;
            self.stdout.queue(cursor::Show)?;
        }
        self.stdout.queue(terminal::EndSynchronizedUpdate)?;
        self.stdout.flush()?;
        frame.clear_dirty();
        Ok(())
    }

    fn apply_style(&mut self, pen: &mut Pen, cell: &Cell) -> Result<()> {
        if cell.fg != pen.fg {
            self.stdout
                .queue(SetForegroundColor(cell.fg.unwrap_or(Color::Reset)))?;
            pen.fg = cell.fg;
        }
        if cell.bg != pen.bg {
            self.stdout
                .queue(SetBackgroundColor(cell.bg.unwrap_or(Color::Reset)))?;
            pen.bg = cell.bg;
        }
        if cell.bold != pen.bold {
            self.stdout.queue(SetAttribute(if cell.bold {
                Attribute::Bold
            } else {
                Attribute::NormalIntensity
            }))?;
            pen.bold = cell.bold;
        }
        Ok(())
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        restore(&mut self.stdout, self.mouse);
    }
}

fn restore(out: &mut Stdout, mouse: bool) {
    if mouse {
        let _ = out.execute(event::DisableMouseCapture);
    }
    let _ = out.execute(SetAttribute(Attribute::Reset));
    let _ = out.execute(ResetColor);
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::EnableLineWrap);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();
    let _ = out.flush();
}

/// Puts the terminal back from a panic hook or signal handler, where the
/// `Terminal` value is out of reach. Mouse capture is released blindly.
pub fn restore_terminal_best_effort() {
    restore(&mut stdout(), true);
}
