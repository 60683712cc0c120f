pub mod objects;

pub use objects::{load_scene_objects, parse_scene_objects};
