/// Fixed rate timer - accumulates real elapsed time and fires at a steady Hz
/// no matter how often it is polled
#[derive(Debug, Clone, Copy)]
pub struct FixedHz {
    interval: f32,
    accumulator: f32,
    max_catch_up: u32,
}

impl FixedHz {
    /// Default cap on ticks delivered by a single poll
    pub const DEFAULT_MAX_CATCH_UP: u32 = 8;

    /// Create timer that fires at given frequency
    pub fn new(hz: f32) -> Self {
        Self {
            interval: 1.0 / hz.max(f32::EPSILON),
            accumulator: 0.0,
            max_catch_up: Self::DEFAULT_MAX_CATCH_UP,
        }
    }

    pub fn with_max_catch_up(mut self, max_catch_up: u32) -> Self {
        self.max_catch_up = max_catch_up.max(1);
        self
    }

    /// Update with delta seconds, returns how many times the timer fired.
    /// A backlog beyond `max_catch_up` is dropped rather than replayed.
    pub fn tick(&mut self, delta: f32) -> u32 {
        self.accumulator += delta.max(0.0);

        let due = (self.accumulator / self.interval).floor() as u32;
        if due > self.max_catch_up {
            self.accumulator %= self.interval;
            self.max_catch_up
        } else {
            self.accumulator -= due as f32 * self.interval;
            due
        }
    }

    /// Seconds between fires
    pub fn interval(&self) -> f32 {
        self.interval
    }

    /// Progress towards the next fire in [0, 1)
    pub fn alpha(&self) -> f32 {
        self.accumulator / self.interval
    }

    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_hz_fires_at_rate() {
        let mut timer = FixedHz::new(30.0); // ~0.0333s

        // Small delta - no fire
        assert_eq!(timer.tick(0.02), 0);

        // Accumulate past threshold
        assert_eq!(timer.tick(0.02), 1);

        // Immediate next - no fire
        assert_eq!(timer.tick(0.001), 0);
    }

    #[test]
    fn fixed_hz_rate_is_independent_of_poll_rate() {
        let mut fast = FixedHz::new(30.0);
        let mut slow = FixedHz::new(30.0);

        // One simulated second polled at 144Hz and at 24Hz
        let fast_fires: u32 = (0..144).map(|_| fast.tick(1.0 / 144.0)).sum();
        let slow_fires: u32 = (0..24).map(|_| slow.tick(1.0 / 24.0)).sum();

        assert!((29..=30).contains(&fast_fires), "fast fired {}", fast_fires);
        assert!((29..=30).contains(&slow_fires), "slow fired {}", slow_fires);
    }

    #[test]
    fn fixed_hz_caps_catch_up() {
        let mut timer = FixedHz::new(30.0).with_max_catch_up(4);
        assert_eq!(timer.tick(10.0), 4);
        assert!(timer.alpha() < 1.0);
    }

    #[test]
    fn fixed_hz_reset_clears_progress() {
        let mut timer = FixedHz::new(30.0);
        timer.tick(0.03);
        timer.reset();
        assert_eq!(timer.alpha(), 0.0);
        assert_eq!(timer.tick(0.01), 0);
    }
}
