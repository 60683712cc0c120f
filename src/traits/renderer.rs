use crate::math::Color;
use crate::scene::{ShapeKind, Transform};

/// Opaque id of a mesh owned by a renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshHandle(pub u64);

#[derive(Debug, thiserror::Error)]
pub enum RendererError {
    #[error("unknown mesh handle {0:?}")]
    UnknownMesh(MeshHandle),

    #[error("surface error: {0}")]
    Surface(String),

    #[error("renderer already disposed")]
    Disposed,

    #[error("{0}")]
    Other(String),
}

/// Retained-mode renderer the viewport drives - creates, updates and draws
/// meshes on request and owns whatever backs them
pub trait SceneRenderer {
    /// Allocate a mesh for `shape`. `None` if this renderer cannot build it.
    fn create_mesh(&mut self, shape: ShapeKind, color: Color) -> Option<MeshHandle>;

    /// Replace the mesh's transform
    fn set_transform(&mut self, mesh: MeshHandle, transform: &Transform);

    /// Replace the mesh's material color
    fn set_color(&mut self, mesh: MeshHandle, color: Color);

    /// Release the mesh and everything it exclusively owns
    fn destroy_mesh(&mut self, mesh: MeshHandle) -> Result<(), RendererError>;

    /// Viewport size changed, in physical pixels
    fn resize(&mut self, width: u32, height: u32);

    /// Submit one frame
    fn draw(&mut self) -> Result<(), RendererError>;

    /// Release all GPU resources. Called once, after every mesh is destroyed.
    fn dispose(&mut self) -> Result<(), RendererError>;
}
