mod document;
mod object;
mod transform;

pub use document::{CubeOptions, ObjectPatch, SceneDocument, CITY_SPACING, DEFAULT_CITY_SIZE, MAX_CITY_SIZE};
pub use object::{
    AnimatedProperty, Keyframe, KeyframeTracks, ObjectKind, SceneObject, SceneSnapshot, ShapeKind,
    Track,
};
pub use transform::Transform;
