//! Fixed-rate frame clock.
//!
//! Each tick sleeps until the next scheduled frame and returns the real time
//! elapsed since the previous one. A frame that is more than two seconds
//! overdue, or a sleep outside `0..=2` seconds, counts as a clock panic: the
//! schedule is rebased to now and the tick does not sleep.

use std::fmt;
use std::time::{Duration, Instant};

const MAX_SLEEP: f64 = 2.0;
/// Added to every sleep in case the system wakes a little early.
const SLEEP_SLACK: f64 = 0.001;

pub struct FrameClock {
    period: f64,
    start: Instant,
    /// Seconds since `start`.
    prev: f64,
    next: f64,
    frames: u64,
    panics: u64,
}

/// End-of-run statistics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClockReport {
    pub frames: u64,
    pub elapsed: f64,
    pub panics: u64,
    pub average_hz: f64,
}

impl fmt::Display for ClockReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} frames in {:.03} s. {} clock panics. Average rate {:.03} Hz.",
            self.frames, self.elapsed, self.panics, self.average_hz
        )
    }
}

/// Rates outside `1..=1000` Hz fall back to 60.
pub fn sanitize_rate(rate_hz: f64) -> f64 {
    if (1.0..=1000.0).contains(&rate_hz) { rate_hz } else { 60.0 }
}

impl FrameClock {
    pub fn new(rate_hz: f64) -> Self {
        let period = 1.0 / sanitize_rate(rate_hz);
        // Pretend the previous frame was one period ago so the first tick
        // reports a sane interval without sleeping.
        Self {
            period,
            start: Instant::now(),
            prev: -period,
            next: 0.0,
            frames: 0,
            panics: 0,
        }
    }

    pub fn period(&self) -> f64 {
        self.period
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn panics(&self) -> u64 {
        self.panics
    }

    fn now(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }

    /// Block until the next frame is due. Returns elapsed seconds.
    pub fn tick(&mut self) -> f64 {
        let mut now = self.now();
        if !self.check_stall(now) {
            while now < self.next {
                let Some(sleep) = self.sleep_time(now) else { break };
                std::thread::sleep(Duration::from_secs_f64(sleep));
                now = self.now();
            }
        }
        self.finish_tick(now)
    }

    /// Rebase if the due frame is more than `MAX_SLEEP` behind `now`.
    /// Otherwise the loop would run frames back to back until it caught up.
    fn check_stall(&mut self, now: f64) -> bool {
        let late = now - self.next;
        if late <= MAX_SLEEP {
            return false;
        }
        tracing::warn!("Clock panic: frame is {:.3}s overdue, resetting schedule", late);
        self.rebase(now);
        true
    }

    /// How long to sleep at `now`, or `None` after a clock panic.
    fn sleep_time(&mut self, now: f64) -> Option<f64> {
        let sleep = self.next - now + SLEEP_SLACK;
        if !(0.0..=MAX_SLEEP).contains(&sleep) {
            tracing::warn!("Clock panic: computed sleep of {:.3}s, resetting schedule", sleep);
            self.rebase(now);
            return None;
        }
        Some(sleep)
    }

    fn rebase(&mut self, now: f64) {
        self.panics += 1;
        self.next = now;
        self.prev = now - self.period;
    }

    fn finish_tick(&mut self, now: f64) -> f64 {
        let elapsed = now - self.prev;
        self.prev = now;
        self.next += self.period;
        self.frames += 1;
        elapsed
    }

    /// `None` until at least one frame has run.
    pub fn report(&self) -> Option<ClockReport> {
        if self.frames < 1 {
            return None;
        }
        let elapsed = self.now();
        if elapsed <= 0.0 {
            return None;
        }
        Some(ClockReport {
            frames: self.frames,
            elapsed,
            panics: self.panics,
            average_hz: self.frames as f64 / elapsed,
        })
    }
}
