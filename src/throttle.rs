// Copyright (c) 2026 rezky_nightky

use std::time::{Duration, Instant};

/// Leading-edge rate limiter: the first call of a window goes through, the
/// rest of the window is dropped. Nothing is queued for later.
#[derive(Clone, Debug)]
pub struct RateLimiter {
    window: Duration,
    last_admitted: Option<Instant>,
}

impl RateLimiter {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_admitted: None,
        }
    }

    pub fn try_admit(&mut self, now: Instant) -> bool {
        let open = match self.last_admitted {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= self.window,
        };
        if open {
            self.last_admitted = Some(now);
        }
        open
    }

    pub fn reset(&mut self) {
        self.last_admitted = None;
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    const WINDOW: Duration = Duration::from_millis(25);

    #[test]
    fn first_call_is_admitted() {
        let mut rl = RateLimiter::new(WINDOW);
        assert!(rl.try_admit(Instant::now()));
    }

    #[test]
    fn window_reopens_after_its_length() {
        let t0 = Instant::now();
        let mut rl = RateLimiter::new(WINDOW);
        assert!(rl.try_admit(t0));
        assert!(!rl.try_admit(t0 + Duration::from_millis(24)));
        assert!(rl.try_admit(t0 + WINDOW));
        assert!(!rl.try_admit(t0 + WINDOW + Duration::from_millis(1)));
    }

    #[test]
    fn dropped_calls_do_not_extend_the_window() {
        let t0 = Instant::now();
        let mut rl = RateLimiter::new(WINDOW);
        assert!(rl.try_admit(t0));
        for ms in 1..25 {
            assert!(!rl.try_admit(t0 + Duration::from_millis(ms)));
        }
        assert!(rl.try_admit(t0 + Duration::from_millis(25)));
    }

    #[test]
    fn reset_reopens_immediately() {
        let t0 = Instant::now();
        let mut rl = RateLimiter::new(WINDOW);
        assert!(rl.try_admit(t0));
        rl.reset();
        assert!(rl.try_admit(t0));
    }

    proptest! {
        #[test]
        fn at_most_one_admitted_per_window(
            mut offsets in prop::collection::vec(0u64..25_000, 1..64),
        ) {
            offsets.sort_unstable();
            let t0 = Instant::now();
            let mut rl = RateLimiter::new(WINDOW);
            let admitted = offsets
                .iter()
                .filter(|&&us| rl.try_admit(t0 + Duration::from_micros(us)))
                .count();
            prop_assert_eq!(admitted, 1);
        }
    }
}
