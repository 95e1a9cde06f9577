use std::time::Instant;

/// Wall-clock frame timer producing a bounded per-frame delta.
///
/// The clamp keeps a backgrounded window or a long stall from turning into
/// one enormous interpolation jump: the worst-case single-frame position
/// change is bounded by `max_delta_ms / interpolation_ms` of a span.
#[derive(Debug)]
pub struct FrameClock {
    last_ms: Option<f64>,
    max_delta_ms: f32,
    epoch: Instant,
}

impl FrameClock {
    pub fn new(max_delta_ms: f32) -> Self {
        Self {
            last_ms: None,
            max_delta_ms,
            epoch: Instant::now(),
        }
    }

    /// Record a frame timestamp (milliseconds) and return the clamped delta
    /// since the previous one. The first tick returns 0.
    pub fn tick(&mut self, now_ms: f64) -> f32 {
        let delta = match self.last_ms {
            Some(last) => ((now_ms - last).max(0.0) as f32).min(self.max_delta_ms),
            None => 0.0,
        };
        self.last_ms = Some(now_ms);
        delta
    }

    /// Convenience for callers on the render thread: tick with the current
    /// wall-clock time.
    pub fn tick_now(&mut self) -> f32 {
        let now_ms = self.epoch.elapsed().as_secs_f64() * 1000.0;
        self.tick(now_ms)
    }

    pub fn max_delta_ms(&self) -> f32 {
        self.max_delta_ms
    }
}
