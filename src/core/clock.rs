use std::time::Instant;

/// Wall clock for the render loop - reports seconds between display refreshes
#[derive(Debug)]
pub struct Clock {
    started: Instant,
    last_tick: Instant,
    ticks: u64,
}

impl Clock {
    /// Create new clock starting now
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            started: now,
            last_tick: now,
            ticks: 0,
        }
    }

    /// Seconds since the previous tick, advancing the clock
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let delta = now.duration_since(self.last_tick).as_secs_f32();
        self.last_tick = now;
        self.ticks += 1;
        delta
    }

    /// Seconds since the clock was created
    pub fn elapsed(&self) -> f32 {
        self.started.elapsed().as_secs_f32()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Forget time spent while the loop was stopped
    pub fn reset(&mut self) {
        self.last_tick = Instant::now();
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}
