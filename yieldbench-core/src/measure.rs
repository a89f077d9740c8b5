//! Phase Timing
//!
//! Wall-clock timing for generation and rendering phases, reported in
//! fractional milliseconds.

use std::time::Instant;

/// Timer for measuring one phase
#[derive(Debug, Clone, Copy)]
pub struct Timer {
    start: Instant,
}

impl Timer {
    /// Start a new timer
    #[inline]
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Milliseconds elapsed since start
    #[inline]
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

/// Run `f`, log its duration under `phase`, and return the result with the
/// elapsed milliseconds.
pub fn timed<T>(phase: &str, f: impl FnOnce() -> T) -> (T, f64) {
    let timer = Timer::start();
    let value = f();
    let elapsed_ms = timer.elapsed_ms();
    tracing::debug!(phase, duration_ms = elapsed_ms, "phase complete");
    (value, elapsed_ms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_timer_elapsed() {
        let timer = Timer::start();
        std::thread::sleep(Duration::from_millis(10));
        let elapsed = timer.elapsed_ms();

        assert!(elapsed >= 5.0);
        assert!(elapsed < 1000.0);
    }

    #[test]
    fn test_timed_returns_value() {
        let (value, ms) = timed("sum", || (1..=100u64).sum::<u64>());
        assert_eq!(value, 5050);
        assert!(ms >= 0.0);
    }
}
