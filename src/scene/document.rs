use std::f32::consts::TAU;
use std::sync::Arc;

use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::object::{
    deserialize_optional_tracks, AnimatedProperty, Keyframe, KeyframeTracks, ObjectKind, SceneObject,
    SceneSnapshot, Track,
};
use crate::core::playback::DEFAULT_DURATION;
use crate::math::Color;

pub const CITY_SPACING: f32 = 2.0;
pub const DEFAULT_CITY_SIZE: u32 = 6;
/// Largest grid side `generate_city_blocks` will build
pub const MAX_CITY_SIZE: u32 = 256;

/// Overrides for [`SceneDocument::add_cube`]; unset fields are randomized
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CubeOptions {
    pub position: Option<[f32; 3]>,
    pub color: Option<Color>,
}

/// Fields to overwrite on an existing object. `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectPatch {
    #[serde(rename = "type", alias = "kind")]
    pub kind: Option<ObjectKind>,
    pub position: Option<[f32; 3]>,
    pub rotation: Option<[f32; 3]>,
    pub scale: Option<[f32; 3]>,
    pub color: Option<Color>,
    #[serde(alias = "keyframeTracks", deserialize_with = "deserialize_optional_tracks")]
    pub keyframes: Option<KeyframeTracks>,
}

impl ObjectPatch {
    fn apply(&self, object: &mut SceneObject) {
        if let Some(kind) = &self.kind {
            object.kind = kind.clone();
        }
        if let Some(position) = self.position {
            object.position = position;
        }
        if let Some(rotation) = self.rotation {
            object.rotation = rotation;
        }
        if let Some(scale) = self.scale {
            object.scale = scale;
        }
        if let Some(color) = self.color {
            object.color = color;
        }
        if let Some(keyframes) = &self.keyframes {
            object.keyframes = keyframes.clone();
        }
    }
}

const ID_DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// `len` lowercase base-36 characters
fn id_suffix(rng: &mut StdRng, len: usize) -> String {
    (0..len)
        .map(|_| char::from(ID_DIGITS[rng.gen_range(0..ID_DIGITS.len())]))
        .collect()
}

/// The editable object list. Every mutation publishes a fresh snapshot, so
/// holders of an older one can tell the list changed by pointer alone.
#[derive(Debug, Clone)]
pub struct SceneDocument {
    objects: SceneSnapshot,
    duration: u32,
    rng: StdRng,
}

impl SceneDocument {
    pub fn new(duration: u32) -> Self {
        Self {
            objects: Arc::from(Vec::new()),
            duration: duration.max(1),
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic document for reproducible scenes
    pub fn with_seed(duration: u32, seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            ..Self::new(duration)
        }
    }

    pub fn snapshot(&self) -> SceneSnapshot {
        Arc::clone(&self.objects)
    }

    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Timeline length new cubes get their spin track built for
    pub fn duration(&self) -> u32 {
        self.duration
    }

    pub fn set_duration(&mut self, duration: u32) {
        self.duration = duration.max(1);
    }

    /// Replace the whole list
    pub fn replace(&mut self, objects: Vec<SceneObject>) {
        self.objects = Arc::from(objects);
    }

    /// Append a cube spinning once around Y over the timeline. Returns its id.
    pub fn add_cube(&mut self, options: CubeOptions) -> String {
        let id = format!("{}_{}", chrono::Utc::now().timestamp_millis(), id_suffix(&mut self.rng, 6));
        let position = options.position.unwrap_or_else(|| {
            [self.rng.gen_range(-2.0..2.0), 0.5, self.rng.gen_range(-2.0..2.0)]
        });
        let color = options.color.unwrap_or_else(|| {
            let hue = self.rng.gen_range(0..360) as f32;
            Color::from_hsl(hue, 0.70, 0.55)
        });

        let cube = SceneObject::cube(id.clone(), position)
            .with_color(color)
            .with_track(
                AnimatedProperty::RotationY,
                Track::linear(Keyframe::new(0, 0.0), Keyframe::new(self.duration, TAU)),
            );
        debug!("Adding cube '{}' at {:?}", id, position);

        let mut objects = self.objects.to_vec();
        objects.push(cube);
        self.replace(objects);
        id
    }

    pub fn clear(&mut self) {
        debug!("Clearing {} objects", self.objects.len());
        self.replace(Vec::new());
    }

    /// Replace the list with a `size` x `size` grid of static blocks of
    /// random height, centred on the origin. Returns how many were built.
    /// `size` is capped at [`MAX_CITY_SIZE`].
    pub fn generate_city_blocks(&mut self, size: u32) -> usize {
        if size > MAX_CITY_SIZE {
            warn!("City size {} exceeds {}, clamping", size, MAX_CITY_SIZE);
        }
        let size = size.min(MAX_CITY_SIZE);
        let start = -((size / 2) as f32) * CITY_SPACING;
        let mut blocks = Vec::with_capacity((size * size) as usize);

        for x in 0..size {
            for z in 0..size {
                let height = self.rng.gen_range(0.5..3.5);
                let lightness = self.rng.gen_range(0.40..0.60);
                let hue = ((x * 30 + z * 20) % 360) as f32;
                let id = format!("b_{}_{}_{}", x, z, id_suffix(&mut self.rng, 3));

                blocks.push(
                    SceneObject::cube(
                        id,
                        [
                            start + x as f32 * CITY_SPACING,
                            height / 2.0,
                            start + z as f32 * CITY_SPACING,
                        ],
                    )
                    .with_scale([1.0, height, 1.0])
                    .with_color(Color::from_hsl(hue, 0.30, lightness)),
                );
            }
        }

        info!("Generated {} city blocks ({}x{})", blocks.len(), size, size);
        let count = blocks.len();
        self.replace(blocks);
        count
    }

    /// Shallow-merge `patch` into every object with this id. Returns whether
    /// any matched; an unknown id leaves the current snapshot untouched.
    pub fn update_object(&mut self, id: &str, patch: &ObjectPatch) -> bool {
        if !self.objects.iter().any(|o| o.id == id) {
            debug!("No object '{}' to update", id);
            return false;
        }

        let objects = self
            .objects
            .iter()
            .cloned()
            .map(|mut object| {
                if object.id == id {
                    patch.apply(&mut object);
                }
                object
            })
            .collect();
        self.replace(objects);
        true
    }
}

impl Default for SceneDocument {
    fn default() -> Self {
        Self::new(DEFAULT_DURATION)
    }
}
