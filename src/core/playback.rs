use log::{debug, warn};

/// Frames in a freshly created timeline
pub const DEFAULT_DURATION: u32 = 240;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayState {
    #[default]
    Paused,
    Playing,
}

/// Timeline position. Valid frames are `0..=duration`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackState {
    pub current_frame: u32,
    pub duration: u32,
    pub play_state: PlayState,
}

impl PlaybackState {
    pub fn new(duration: u32) -> Self {
        Self {
            current_frame: 0,
            duration: duration.max(1),
            play_state: PlayState::Paused,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.play_state == PlayState::Playing
    }
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self::new(DEFAULT_DURATION)
    }
}

/// Frame counter with play/pause state and wraparound
#[derive(Debug, Clone, Default)]
pub struct PlaybackClock {
    state: PlaybackState,
}

impl PlaybackClock {
    pub fn new(duration: u32) -> Self {
        Self {
            state: PlaybackState::new(duration),
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn current_frame(&self) -> u32 {
        self.state.current_frame
    }

    pub fn duration(&self) -> u32 {
        self.state.duration
    }

    pub fn is_playing(&self) -> bool {
        self.state.is_playing()
    }

    pub fn play(&mut self) {
        self.state.play_state = PlayState::Playing;
    }

    pub fn pause(&mut self) {
        self.state.play_state = PlayState::Paused;
    }

    /// Flip between playing and paused, returning the new state
    pub fn toggle(&mut self) -> PlayState {
        self.state.play_state = match self.state.play_state {
            PlayState::Paused => PlayState::Playing,
            PlayState::Playing => PlayState::Paused,
        };
        self.state.play_state
    }

    /// Scrub. Takes effect immediately and leaves the play state alone.
    pub fn set_frame(&mut self, frame: u32) {
        self.state.current_frame = frame;
    }

    /// Change the timeline length without touching the current frame
    pub fn set_duration(&mut self, duration: u32) {
        if duration == 0 {
            warn!("Duration must be at least one frame, clamping 0 to 1");
        }
        self.state.duration = duration.max(1);
        debug!("Timeline duration set to {} frames", self.state.duration);
    }

    pub fn reset(&mut self) {
        self.state.current_frame = 0;
    }

    /// One fixed-rate playback step. No-op while paused.
    pub fn tick(&mut self) -> u32 {
        if self.state.is_playing() {
            let span = u64::from(self.state.duration) + 1;
            let next = (u64::from(self.state.current_frame) + 1) % span;
            self.state.current_frame = next as u32;
        }
        self.state.current_frame
    }
}
