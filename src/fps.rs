use std::collections::VecDeque;
use std::fmt;
use std::time::Instant;

use crate::config::FPS_WINDOW;

/// Frame-rate meter over a rolling window of instantaneous samples.
///
/// Each `sample` turns the gap since the previous sample into a rate and
/// folds it into the window (FIFO, capped at `FPS_WINDOW` entries);
/// statistics are recomputed over the whole window every time. The
/// origin timestamp is fixed at construction, so even the first sample
/// has a well-defined elapsed time.
pub struct FpsMeter {
    last: Instant,
    window: VecDeque<f64>,
}

/// Snapshot of the meter after one sample.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameStats {
    pub latest: f64,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

impl FpsMeter {
    pub fn new() -> Self {
        Self::with_origin(Instant::now())
    }

    pub fn with_origin(origin: Instant) -> Self {
        Self {
            last: origin,
            window: VecDeque::with_capacity(FPS_WINDOW + 1),
        }
    }

    /// Record one frame boundary and return statistics over the window.
    pub fn sample(&mut self, now: Instant) -> FrameStats {
        let elapsed = now.saturating_duration_since(self.last);
        self.last = now;

        let rate = 1.0 / elapsed.as_secs_f64().max(1e-6);
        self.window.push_back(rate);
        if self.window.len() > FPS_WINDOW {
            self.window.pop_front();
        }

        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut sum = 0.0;
        for &fps in &self.window {
            min = min.min(fps);
            max = max.max(fps);
            sum += fps;
        }

        FrameStats {
            latest: rate,
            mean: sum / self.window.len() as f64,
            min,
            max,
        }
    }

    pub fn window_len(&self) -> usize {
        self.window.len()
    }
}

impl fmt::Display for FrameStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "fps {} (avg {}, min {}, max {})",
            self.latest.round(),
            self.mean.round(),
            self.min.round(),
            self.max.round()
        )
    }
}
