pub mod camera;
pub mod cli;
pub mod config;
pub mod core;
pub mod headless;
pub mod loaders;
pub mod math;
pub mod renderer;
pub mod scene;
pub mod traits;
pub mod types;

pub use crate::core::{PlaybackState, ReconcileStats, Reconciler, TickReport, Viewport};
pub use config::ViewerConfig;
pub use headless::RecordingRenderer;
pub use math::Color;
pub use scene::{SceneDocument, SceneObject, SceneSnapshot};
pub use traits::{MeshHandle, RendererError, SceneRenderer};
