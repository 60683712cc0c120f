pub mod clock;
pub mod frame;
pub mod keyframe;
pub mod playback;
pub mod reconciler;
pub mod scheduler;
pub mod timer;
pub mod viewport;

pub use clock::Clock;
pub use frame::TickReport;
pub use keyframe::{evaluate, sample_transform};
pub use playback::{PlayState, PlaybackClock, PlaybackState, DEFAULT_DURATION};
pub use reconciler::{ReconcileStats, Reconciler, RenderNode};
pub use scheduler::{Cadence, Firing, Scheduler, TaskHandle, TaskId};
pub use timer::FixedHz;
pub use viewport::Viewport;
