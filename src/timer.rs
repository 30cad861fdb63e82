//! Timer module for running a single focus session.

use std::io::{self, Write};
use std::thread;
use std::time::{Duration, Instant};

use chrono::{DateTime, FixedOffset, Local};

use crate::session::SessionRecord;

/// How often the loop wakes up to check elapsed time and redraw.
pub const POLL_QUANTUM: Duration = Duration::from_millis(100);

const SEPARATOR: &str = "=============================";

/// Cursor up one line, then clear that line.
const ERASE_PREVIOUS_LINE: &str = "\x1b[1A\x1b[K";

pub fn duration_from_minutes(minutes: u64) -> Duration {
    Duration::from_secs(minutes * 60)
}

/// Time source for the timer loop.
pub trait Clock {
    /// Monotonic instant used to measure elapsed time.
    fn now(&self) -> Instant;
    /// Timezone-aware wall-clock time recorded as the session start.
    fn wall_now(&self) -> DateTime<FixedOffset>;
    fn sleep(&self, duration: Duration);
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Instant {
        (**self).now()
    }

    fn wall_now(&self) -> DateTime<FixedOffset> {
        (**self).wall_now()
    }

    fn sleep(&self, duration: Duration) {
        (**self).sleep(duration);
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn wall_now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }

    fn sleep(&self, duration: Duration) {
        thread::sleep(duration);
    }
}

/// Polling session timer with optional in-place elapsed-time display.
pub struct Timer<C, W> {
    clock: C,
    out: W,
    quantum: Duration,
}

impl Timer<SystemClock, io::Stdout> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock, io::stdout())
    }
}

impl Default for Timer<SystemClock, io::Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock, W: Write> Timer<C, W> {
    pub fn with_clock(clock: C, out: W) -> Self {
        Self {
            clock,
            out,
            quantum: POLL_QUANTUM,
        }
    }

    #[cfg(test)]
    fn quantum(mut self, quantum: Duration) -> Self {
        self.quantum = quantum;
        self
    }

    /// Blocks until `duration` has elapsed and returns the completed session.
    ///
    /// Elapsed time is polled once per quantum, so the call may overshoot the
    /// target by up to one quantum plus the cost of rendering. The recorded
    /// minute count is always derived from `duration`, never from the measured wait.
    pub fn run(&mut self, duration: Duration, category: &str, render: bool) -> SessionRecord {
        let start = self.clock.wall_now();
        let started = self.clock.now();
        log::debug!("session started at {start} for {duration:?} ({category})");

        if render {
            self.print_frame();
        }

        let mut elapsed = self.clock.now().duration_since(started);
        while elapsed < duration {
            if render {
                self.print_elapsed(elapsed);
            }
            self.clock.sleep(self.quantum);
            elapsed = self.clock.now().duration_since(started);
        }

        log::debug!("session finished after {elapsed:?}");
        SessionRecord::new(start, duration, category)
    }

    // Display failures are not worth aborting a running session over.
    fn print_frame(&mut self) {
        let _ = writeln!(self.out, "{SEPARATOR}");
        let _ = writeln!(self.out, "{SEPARATOR}");
        let _ = self.out.flush();
    }

    fn print_elapsed(&mut self, elapsed: Duration) {
        let _ = writeln!(self.out, "{ERASE_PREVIOUS_LINE}{}", format_elapsed(elapsed));
        let _ = self.out.flush();
    }

    #[cfg(test)]
    fn into_output(self) -> W {
        self.out
    }
}

/// Runs one session against the system clock, drawing to stdout.
pub fn run_session(duration: Duration, category: &str, render: bool) -> SessionRecord {
    Timer::new().run(duration, category, render)
}

/// Elapsed time truncated to whole seconds: `MM:SS`, or `H:MM:SS` past the first hour.
pub fn format_elapsed(elapsed: Duration) -> String {
    let total = elapsed.as_secs();
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{:02}:{:02}", minutes, seconds)
    }
}
