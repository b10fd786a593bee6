//! Frame timing

use std::time::{Duration, Instant};

/// Measures the time between consecutive frames
pub struct Timer {
    last_frame: Instant,
    delta_time: f32,
    total_time: f32,
    frame_count: u64,
    max_delta: f32,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer {
    /// Create a timer starting now
    pub fn new() -> Self {
        Self {
            last_frame: Instant::now(),
            delta_time: 0.0,
            total_time: 0.0,
            frame_count: 0,
            max_delta: 0.25,
        }
    }

    /// Clamp reported frame times to `max_delta` seconds
    ///
    /// Keeps a debugger pause or a slow load from producing one huge step.
    pub fn with_max_delta(mut self, max_delta: f32) -> Self {
        self.max_delta = max_delta;
        self
    }

    /// Start a new frame and return its delta in seconds
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_frame);
        self.last_frame = now;
        self.advance(elapsed)
    }

    /// Advance by a fixed duration instead of the wall clock
    pub fn advance(&mut self, elapsed: Duration) -> f32 {
        self.delta_time = elapsed.as_secs_f32().min(self.max_delta);
        self.total_time += self.delta_time;
        self.frame_count += 1;
        self.delta_time
    }

    /// Seconds between the last two ticks
    pub fn delta_time(&self) -> f32 {
        self.delta_time
    }

    /// Sum of all reported deltas
    pub fn total_time(&self) -> f32 {
        self.total_time
    }

    /// Number of ticks so far
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Average frames per second since creation
    pub fn average_fps(&self) -> f32 {
        if self.total_time > 0.0 {
            self.frame_count as f32 / self.total_time
        } else {
            0.0
        }
    }
}
