use std::collections::BTreeMap;

use log::debug;

use crate::math::Color;
use crate::scene::{ShapeKind, Transform};
use crate::traits::{MeshHandle, RendererError, SceneRenderer};

/// State of one mesh as last pushed by the viewport
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshRecord {
    pub shape: ShapeKind,
    pub color: Color,
    pub transform: Transform,
}

/// Renderer with no GPU behind it. Keeps every mesh in memory and counts
/// calls, which makes it usable for headless runs and for inspecting what a
/// viewport asked for.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    meshes: BTreeMap<MeshHandle, MeshRecord>,
    next_handle: u64,
    created: usize,
    destroyed: usize,
    transform_writes: usize,
    draws: usize,
    disposals: usize,
    size: (u32, u32),
    fail_destroy: bool,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every `destroy_mesh` report failure (the mesh is still dropped)
    pub fn failing_destroy(mut self) -> Self {
        self.fail_destroy = true;
        self
    }

    pub fn mesh(&self, handle: MeshHandle) -> Option<&MeshRecord> {
        self.meshes.get(&handle)
    }

    pub fn live_meshes(&self) -> usize {
        self.meshes.len()
    }

    pub fn created(&self) -> usize {
        self.created
    }

    pub fn destroyed(&self) -> usize {
        self.destroyed
    }

    pub fn transform_writes(&self) -> usize {
        self.transform_writes
    }

    pub fn draws(&self) -> usize {
        self.draws
    }

    pub fn disposals(&self) -> usize {
        self.disposals
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }
}

impl SceneRenderer for RecordingRenderer {
    fn create_mesh(&mut self, shape: ShapeKind, color: Color) -> Option<MeshHandle> {
        let handle = MeshHandle(self.next_handle);
        self.next_handle += 1;
        self.created += 1;
        self.meshes.insert(
            handle,
            MeshRecord {
                shape,
                color,
                transform: Transform::IDENTITY,
            },
        );
        Some(handle)
    }

    fn set_transform(&mut self, mesh: MeshHandle, transform: &Transform) {
        if let Some(record) = self.meshes.get_mut(&mesh) {
            record.transform = *transform;
            self.transform_writes += 1;
        }
    }

    fn set_color(&mut self, mesh: MeshHandle, color: Color) {
        if let Some(record) = self.meshes.get_mut(&mesh) {
            record.color = color;
        }
    }

    fn destroy_mesh(&mut self, mesh: MeshHandle) -> Result<(), RendererError> {
        self.meshes
            .remove(&mesh)
            .ok_or(RendererError::UnknownMesh(mesh))?;
        self.destroyed += 1;

        if self.fail_destroy {
            return Err(RendererError::Other(format!("simulated release failure for {:?}", mesh)));
        }
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.size = (width, height);
    }

    fn draw(&mut self) -> Result<(), RendererError> {
        if self.disposals > 0 {
            return Err(RendererError::Disposed);
        }
        self.draws += 1;
        Ok(())
    }

    fn dispose(&mut self) -> Result<(), RendererError> {
        self.disposals += 1;
        debug!(
            "Recording renderer disposed after {} draws ({} meshes created, {} destroyed)",
            self.draws, self.created, self.destroyed
        );
        Ok(())
    }
}
