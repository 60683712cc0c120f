use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use log::warn;
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};

use super::transform::Transform;
use crate::math::Color;

/// Shared, immutable object list. Replaced wholesale on every edit; pointer
/// identity tells the viewport whether a structural sync is needed.
pub type SceneSnapshot = Arc<[SceneObject]>;

/// Primitive shapes the renderer knows how to build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Cube,
}

impl ShapeKind {
    pub fn name(self) -> &'static str {
        match self {
            ShapeKind::Cube => "cube",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "cube" => Some(ShapeKind::Cube),
            _ => None,
        }
    }
}

/// Object kind as found in data. Names with no matching shape are kept
/// verbatim so the reconciler can skip them without failing the whole list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ObjectKind {
    Shape(ShapeKind),
    Unrecognized(String),
}

impl ObjectKind {
    pub fn shape(&self) -> Option<ShapeKind> {
        match self {
            ObjectKind::Shape(shape) => Some(*shape),
            ObjectKind::Unrecognized(_) => None,
        }
    }
}

impl From<ShapeKind> for ObjectKind {
    fn from(shape: ShapeKind) -> Self {
        ObjectKind::Shape(shape)
    }
}

impl From<String> for ObjectKind {
    fn from(name: String) -> Self {
        match ShapeKind::from_name(&name.to_ascii_lowercase()) {
            Some(shape) => ObjectKind::Shape(shape),
            None => ObjectKind::Unrecognized(name),
        }
    }
}

impl From<ObjectKind> for String {
    fn from(kind: ObjectKind) -> Self {
        kind.to_string()
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectKind::Shape(shape) => f.write_str(shape.name()),
            ObjectKind::Unrecognized(name) => f.write_str(name),
        }
    }
}

/// Transform channels that keyframe tracks can drive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AnimatedProperty {
    #[serde(rename = "rotationY")]
    RotationY,
}

impl AnimatedProperty {
    pub fn name(self) -> &'static str {
        match self {
            AnimatedProperty::RotationY => "rotationY",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "rotationY" => Some(AnimatedProperty::RotationY),
            _ => None,
        }
    }

    /// Overwrite this property's channel on `transform`
    pub fn apply(self, transform: &mut Transform, value: f32) {
        match self {
            AnimatedProperty::RotationY => transform.rotation.y = value,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    #[serde(alias = "f")]
    pub frame: u32,
    #[serde(alias = "v")]
    pub value: f32,
}

impl Keyframe {
    pub const fn new(frame: u32, value: f32) -> Self {
        Self { frame, value }
    }
}

/// Ordered keyframes for one property. Empty means "not animated"; only the
/// first and last entries take part in interpolation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Track {
    keys: Vec<Keyframe>,
}

impl Track {
    pub fn new(keys: Vec<Keyframe>) -> Self {
        Self { keys }
    }

    /// Two-key track from `start` to `end`
    pub fn linear(start: Keyframe, end: Keyframe) -> Self {
        Self::new(vec![start, end])
    }

    pub fn keys(&self) -> &[Keyframe] {
        &self.keys
    }

    pub fn is_animated(&self) -> bool {
        self.keys.len() >= 2
    }

    pub fn endpoints(&self) -> Option<(Keyframe, Keyframe)> {
        match self.keys.as_slice() {
            [first, .., last] => Some((*first, *last)),
            _ => None,
        }
    }

    /// Animated track whose endpoints share a frame
    pub fn is_degenerate(&self) -> bool {
        self.endpoints()
            .is_some_and(|(start, end)| start.frame == end.frame)
    }
}

pub type KeyframeTracks = BTreeMap<AnimatedProperty, Track>;

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTracks {
    Map(BTreeMap<String, RawTrack>),
    Malformed(IgnoredAny),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTrack {
    Keys(Track),
    Malformed(IgnoredAny),
}

/// Read a keyframe map, dropping unknown property names and unreadable
/// tracks with a warning instead of failing the enclosing object
pub(crate) fn deserialize_tracks<'de, D>(deserializer: D) -> Result<KeyframeTracks, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(deserialize_optional_tracks(deserializer)?.unwrap_or_default())
}

pub(crate) fn deserialize_optional_tracks<'de, D>(deserializer: D) -> Result<Option<KeyframeTracks>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = match Option::<RawTracks>::deserialize(deserializer)? {
        None => return Ok(None),
        Some(RawTracks::Malformed(_)) => {
            warn!("Ignoring keyframes that are not a property map");
            return Ok(None);
        }
        Some(RawTracks::Map(raw)) => raw,
    };

    let tracks = raw
        .into_iter()
        .filter_map(|(name, entry)| {
            let Some(property) = AnimatedProperty::from_name(&name) else {
                warn!("Ignoring keyframes for unknown property '{}'", name);
                return None;
            };
            match entry {
                RawTrack::Keys(track) => Some((property, track)),
                RawTrack::Malformed(_) => {
                    warn!("Ignoring unreadable '{}' track", property.name());
                    None
                }
            }
        })
        .collect();
    Ok(Some(tracks))
}

fn unit_scale() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}

/// Declarative description of one renderable entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneObject {
    pub id: String,
    #[serde(rename = "type", alias = "kind")]
    pub kind: ObjectKind,
    pub position: [f32; 3],
    #[serde(default)]
    pub rotation: [f32; 3],
    #[serde(default = "unit_scale")]
    pub scale: [f32; 3],
    #[serde(default)]
    pub color: Color,
    #[serde(default, alias = "keyframeTracks", deserialize_with = "deserialize_tracks")]
    pub keyframes: KeyframeTracks,
}

impl SceneObject {
    /// Unanimated unit cube at `position`
    pub fn cube(id: impl Into<String>, position: [f32; 3]) -> Self {
        Self {
            id: id.into(),
            kind: ShapeKind::Cube.into(),
            position,
            rotation: [0.0; 3],
            scale: unit_scale(),
            color: Color::default(),
            keyframes: KeyframeTracks::new(),
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_rotation(mut self, rotation: [f32; 3]) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: [f32; 3]) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_track(mut self, property: AnimatedProperty, track: Track) -> Self {
        self.keyframes.insert(property, track);
        self
    }

    pub fn transform(&self) -> Transform {
        Transform::from_arrays(self.position, self.rotation, self.scale)
    }

    pub fn is_animated(&self) -> bool {
        self.keyframes.values().any(Track::is_animated)
    }
}
