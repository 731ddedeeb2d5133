// Copyright (c) 2026 rezky_nightky

use std::time::{Duration, Instant};

/// Repeating frame task. The host asks whether a frame is due, runs it,
/// then reports completion so the next one gets scheduled. Cancelling drops
/// the pending frame; nothing fires afterwards until `start` is called again.
#[derive(Clone, Debug)]
pub struct FrameLoop {
    period: Duration,
    next_due: Option<Instant>,
}

impl FrameLoop {
    pub fn new(period: Duration) -> Self {
        Self {
            period: period.max(Duration::from_micros(1)),
            next_due: None,
        }
    }

    pub fn from_fps(fps: f64) -> Self {
        Self::new(Duration::from_secs_f64(1.0 / fps.max(0.001)))
    }

    /// Schedules the first frame right away.
    pub fn start(&mut self, now: Instant) {
        self.next_due = Some(now);
    }

    pub fn cancel(&mut self) {
        self.next_due = None;
    }

    pub fn is_active(&self) -> bool {
        self.next_due.is_some()
    }

    pub fn is_due(&self, now: Instant) -> bool {
        self.next_due.is_some_and(|due| now >= due)
    }

    /// Time left before the next frame, `None` when cancelled.
    pub fn time_until_due(&self, now: Instant) -> Option<Duration> {
        self.next_due.map(|due| due.saturating_duration_since(now))
    }

    /// Reschedules after a frame ran. A late loop skips ahead instead of
    /// firing a burst of catch-up frames.
    pub fn complete(&mut self, now: Instant) {
        let Some(due) = self.next_due else {
            return;
        };
        let mut next = due + self.period;
        if now > next {
            next = now;
        }
        self.next_due = Some(next);
    }
}
