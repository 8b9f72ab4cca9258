use std::time::Instant;

/// Measures the time between frame updates
#[derive(Debug, Default)]
pub struct FrameTimer {
    start: Option<Instant>,
}

impl FrameTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self) {
        self.start = Some(Instant::now());
    }

    /// Seconds since the last (re)start, 0 if the timer was never started.
    /// The timer is running afterwards either way.
    pub fn elapsed_and_restart(&mut self) -> f64 {
        let now = Instant::now();
        let elapsed = self
            .start
            .map(|start| now.duration_since(start).as_secs_f64())
            .unwrap_or(0.);

        self.start = Some(now);
        elapsed
    }
}
