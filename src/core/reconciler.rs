use std::collections::{HashMap, HashSet};

use log::{debug, warn};

use super::keyframe::sample_transform;
use super::playback::PlaybackState;
use crate::math::Color;
use crate::scene::{KeyframeTracks, SceneObject, ShapeKind, Track, Transform};
use crate::traits::{MeshHandle, SceneRenderer};

/// Renderer-backed node for one live object id
#[derive(Debug, Clone)]
pub struct RenderNode {
    mesh: MeshHandle,
    app_id: String,
    shape: ShapeKind,
    base: Transform,
    color: Color,
    tracks: KeyframeTracks,
}

impl RenderNode {
    pub fn mesh(&self) -> MeshHandle {
        self.mesh
    }

    /// Id of the object this node was built for
    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    pub fn shape(&self) -> ShapeKind {
        self.shape
    }

    /// Transform from the object list, before animation
    pub fn base_transform(&self) -> Transform {
        self.base
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn tracks(&self) -> &KeyframeTracks {
        &self.tracks
    }

    pub fn is_animated(&self) -> bool {
        self.tracks.values().any(Track::is_animated)
    }

    /// Transform at the given playback position, or `None` when unanimated
    pub fn animated_transform(&self, playback: &PlaybackState) -> Option<Transform> {
        sample_transform(&self.base, &self.tracks, playback.duration, playback.current_frame)
    }

    fn push<R: SceneRenderer + ?Sized>(&mut self, object: &SceneObject, renderer: &mut R) {
        self.base = object.transform();
        self.color = object.color;
        self.tracks = object.keyframes.clone();

        for (property, track) in &self.tracks {
            if track.is_degenerate() {
                warn!(
                    "Object '{}' has a {:?} track whose keyframes share a frame; holding values instead of interpolating",
                    self.app_id, property
                );
            }
        }

        renderer.set_transform(self.mesh, &self.base);
        renderer.set_color(self.mesh, self.color);
    }
}

/// What one reconciliation pass did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileStats {
    pub created: usize,
    pub updated: usize,
    pub destroyed: usize,
    pub skipped: usize,
}

impl ReconcileStats {
    pub fn is_structural(&self) -> bool {
        self.created > 0 || self.destroyed > 0
    }
}

/// Keeps the live node set in step with a declarative object list
#[derive(Debug, Default)]
pub struct Reconciler {
    nodes: HashMap<String, RenderNode>,
}

impl Reconciler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create, update and destroy nodes so the live id set equals the ids of
    /// `desired` that have a renderable shape.
    ///
    /// Every surviving node gets its transform and color pushed again, changed
    /// or not. Nodes for ids present before and after keep their mesh. A
    /// repeated id within `desired` updates the node created for its first
    /// occurrence.
    pub fn reconcile<R>(&mut self, desired: &[SceneObject], renderer: &mut R) -> ReconcileStats
    where
        R: SceneRenderer + ?Sized,
    {
        let mut stats = ReconcileStats::default();
        let mut wanted: HashSet<&str> = HashSet::with_capacity(desired.len());

        for object in desired {
            let Some(shape) = object.kind.shape() else {
                debug!("Skipping object '{}': no renderable shape for kind '{}'", object.id, object.kind);
                stats.skipped += 1;
                continue;
            };

            // A node built for another shape cannot be updated in place
            if self.nodes.get(&object.id).is_some_and(|node| node.shape != shape) {
                if let Some(node) = self.nodes.remove(&object.id) {
                    Self::release(node, renderer);
                    stats.destroyed += 1;
                }
            }

            if !self.nodes.contains_key(&object.id) {
                let Some(mesh) = renderer.create_mesh(shape, object.color) else {
                    debug!("Renderer declined to build a {} for '{}'", shape.name(), object.id);
                    stats.skipped += 1;
                    continue;
                };
                debug!("Created {} node for '{}'", shape.name(), object.id);
                self.nodes.insert(
                    object.id.clone(),
                    RenderNode {
                        mesh,
                        app_id: object.id.clone(),
                        shape,
                        base: Transform::IDENTITY,
                        color: object.color,
                        tracks: KeyframeTracks::new(),
                    },
                );
                stats.created += 1;
            } else {
                stats.updated += 1;
            }

            if let Some(node) = self.nodes.get_mut(&object.id) {
                node.push(object, renderer);
            }
            wanted.insert(object.id.as_str());
        }

        let before = self.nodes.len();
        self.nodes.retain(|id, node| {
            if wanted.contains(id.as_str()) {
                return true;
            }
            debug!("Destroying node for '{}'", id);
            if let Err(e) = renderer.destroy_mesh(node.mesh) {
                warn!("Failed to release mesh for '{}': {}", id, e);
            }
            false
        });
        stats.destroyed += before - self.nodes.len();

        stats
    }

    /// Re-evaluate every animated node at the given playback position and
    /// push the result. Returns how many nodes were updated.
    pub fn sync_animation<R>(&self, playback: &PlaybackState, renderer: &mut R) -> usize
    where
        R: SceneRenderer + ?Sized,
    {
        let mut updated = 0;
        for node in self.nodes.values() {
            if let Some(transform) = node.animated_transform(playback) {
                renderer.set_transform(node.mesh, &transform);
                updated += 1;
            }
        }
        updated
    }

    /// Destroy every node. Returns how many were released.
    pub fn clear<R>(&mut self, renderer: &mut R) -> usize
    where
        R: SceneRenderer + ?Sized,
    {
        let count = self.nodes.len();
        for (_, node) in self.nodes.drain() {
            Self::release(node, renderer);
        }
        count
    }

    pub fn get(&self, id: &str) -> Option<&RenderNode> {
        self.nodes.get(id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &RenderNode> {
        self.nodes.values()
    }

    pub fn live_ids(&self) -> HashSet<&str> {
        self.nodes.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn release<R: SceneRenderer + ?Sized>(node: RenderNode, renderer: &mut R) {
        if let Err(e) = renderer.destroy_mesh(node.mesh) {
            warn!("Failed to release mesh for '{}': {}", node.app_id, e);
        }
    }
}
