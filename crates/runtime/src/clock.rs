use foundation::time::Millis;

/// Configuration for the repeating animation clock.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ClockConfig {
    /// Tick period in logical milliseconds.
    pub period_ms: u64,
    /// Logical seconds the clock advances per tick.
    pub step_seconds: f64,
    /// Loop length in logical seconds; time wraps back to zero here.
    pub loop_seconds: f64,
    /// Visible trail length in logical seconds (3D arc window).
    pub trail_seconds: f64,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            period_ms: 10,
            step_seconds: 60.0,
            loop_seconds: 6.0 * 60.0 * 60.0,
            trail_seconds: 60.0 * 60.0,
        }
    }
}

/// One animation frame handed to the renderers.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ClockFrame {
    /// Current logical time in seconds, in `[0, loop_seconds)`.
    pub time: f64,
    /// Normalized loop progress in `[0, 1)`.
    pub progress: f64,
    /// Visible window `[window_start, time]` for time-staggered arcs.
    pub window_start: f64,
}

/// Repeating logical-time animation clock.
///
/// All animated layers read the same clock so 2D dot trails and 3D arcs
/// stay in phase. The clock only advances while started, and it must be
/// stopped on teardown; `poll` on a stopped clock yields nothing.
#[derive(Debug)]
pub struct AnimationClock {
    config: ClockConfig,
    current: f64,
    running: bool,
    last_tick: Millis,
}

impl AnimationClock {
    pub fn new(config: ClockConfig) -> Self {
        Self {
            config,
            current: 0.0,
            running: false,
            last_tick: Millis::ZERO,
        }
    }

    pub fn config(&self) -> ClockConfig {
        self.config
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn start(&mut self, now: Millis) {
        self.running = true;
        self.last_tick = now;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Advances by one tick and returns the resulting frame.
    pub fn advance(&mut self) -> ClockFrame {
        self.current = (self.current + self.config.step_seconds) % self.config.loop_seconds;
        self.frame()
    }

    /// Consumes the elapsed periods since the previous poll.
    ///
    /// Returns the frame after the final elapsed tick, or `None` when the
    /// clock is stopped or no full period has passed.
    pub fn poll(&mut self, now: Millis) -> Option<ClockFrame> {
        if !self.running || self.config.period_ms == 0 {
            return None;
        }
        let elapsed = now.since(self.last_tick);
        let ticks = elapsed / self.config.period_ms;
        if ticks == 0 {
            return None;
        }
        self.last_tick = self.last_tick.after(ticks * self.config.period_ms);
        let mut frame = None;
        for _ in 0..ticks {
            frame = Some(self.advance());
        }
        frame
    }

    pub fn frame(&self) -> ClockFrame {
        ClockFrame {
            time: self.current,
            progress: self.current / self.config.loop_seconds,
            window_start: (self.current - self.config.trail_seconds).max(0.0),
        }
    }
}
