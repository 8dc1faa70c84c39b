use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Host-driven monotonic clock.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameClock {
    now: Duration,
}

impl FrameClock {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn advance(&mut self, by: Duration) -> Duration {
        self.now += by;
        self.now
    }
}

/// Repeating timer polled by the host. A running timer is never started twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntervalTimer {
    interval: Duration,
    next_due: Option<Duration>,
}

impl IntervalTimer {
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_due: None,
        }
    }

    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.next_due.is_some()
    }

    /// Returns `false` when the timer was already running.
    pub fn start(&mut self, now: Duration) -> bool {
        if self.is_running() {
            return false;
        }
        self.next_due = Some(now + self.interval);
        true
    }

    /// Returns `false` when the timer was already stopped.
    pub fn stop(&mut self) -> bool {
        self.next_due.take().is_some()
    }

    /// Number of intervals that elapsed up to `now`.
    pub fn poll(&mut self, now: Duration) -> u32 {
        let Some(mut due) = self.next_due else {
            return 0;
        };
        if self.interval.is_zero() {
            self.next_due = Some(now);
            return u32::from(now >= due);
        }
        let mut fired = 0u32;
        while due <= now {
            fired = fired.saturating_add(1);
            due += self.interval;
        }
        self.next_due = Some(due);
        fired
    }
}

/// Frame index animated by an `IntervalTimer`, wrapping to 0 after the last
/// frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playback {
    timer: IntervalTimer,
    index: usize,
    frame_count: usize,
    /// Set by `scrub`; the next poll keeps the scrubbed index.
    scrubbed: bool,
}

impl Playback {
    #[must_use]
    pub fn new(frame_count: usize, interval: Duration) -> Self {
        Self {
            timer: IntervalTimer::new(interval),
            index: 0,
            frame_count,
            scrubbed: false,
        }
    }

    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.timer.is_running()
    }

    pub fn set_frame_count(&mut self, frame_count: usize) {
        self.frame_count = frame_count;
        self.index = self.index.min(frame_count.saturating_sub(1));
    }

    /// Starts the timer; a no-op while playing.
    pub fn start(&mut self, now: Duration) -> bool {
        let started = self.timer.start(now);
        if started {
            debug!(index = self.index, "playback started");
        }
        started
    }

    /// Cancels the pending tick; a no-op while stopped.
    pub fn stop(&mut self) -> bool {
        let stopped = self.timer.stop();
        if stopped {
            debug!(index = self.index, "playback stopped");
        }
        stopped
    }

    pub fn reset(&mut self) {
        self.index = 0;
    }

    /// Jumps to `index`, clamped to the last frame. The index survives the
    /// next `poll` even when a tick is already due.
    pub fn scrub(&mut self, index: usize) -> usize {
        self.index = index.min(self.frame_count.saturating_sub(1));
        self.scrubbed = true;
        self.index
    }

    /// Advances once per elapsed interval; returns whether a new frame is due.
    pub fn poll(&mut self, now: Duration) -> bool {
        let fired = self.timer.poll(now);
        if std::mem::take(&mut self.scrubbed) {
            trace!(fired, index = self.index, "playback held on scrubbed frame");
            return false;
        }
        if fired == 0 || self.frame_count == 0 {
            return false;
        }
        for _ in 0..fired {
            self.index = if self.index + 1 >= self.frame_count {
                0
            } else {
                self.index + 1
            };
        }
        trace!(fired, index = self.index, "playback advanced");
        self.frame_count > 1
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{IntervalTimer, Playback};

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn timer_counts_elapsed_intervals() {
        let mut timer = IntervalTimer::new(ms(100));
        assert_eq!(timer.poll(ms(500)), 0);
        assert!(timer.start(ms(0)));
        assert_eq!(timer.poll(ms(99)), 0);
        assert_eq!(timer.poll(ms(100)), 1);
        assert_eq!(timer.poll(ms(350)), 2);
        assert!(timer.stop());
        assert!(!timer.stop());
        assert_eq!(timer.poll(ms(1_000)), 0);
    }

    #[test]
    fn playback_wraps_after_last_frame() {
        let mut playback = Playback::new(3, ms(100));
        playback.start(ms(0));
        assert!(playback.poll(ms(100)));
        assert_eq!(playback.index(), 1);
        playback.poll(ms(200));
        assert_eq!(playback.index(), 2);
        playback.poll(ms(300));
        assert_eq!(playback.index(), 0);
    }

    #[test]
    fn scrub_while_playing_survives_a_due_tick() {
        let mut playback = Playback::new(5, ms(100));
        playback.start(ms(0));
        assert!(!playback.poll(ms(50)));
        playback.scrub(3);
        assert!(!playback.poll(ms(100)));
        assert_eq!(playback.index(), 3);
        assert!(playback.poll(ms(200)));
        assert_eq!(playback.index(), 4);
    }

    #[test]
    fn scrub_clamps_and_works_while_stopped() {
        let mut playback = Playback::new(215, ms(100));
        assert_eq!(playback.scrub(42), 42);
        assert_eq!(playback.scrub(1_000), 214);
        playback.reset();
        assert_eq!(playback.index(), 0);
    }
}
