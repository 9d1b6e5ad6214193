use crate::error::{RendererError, TilesetLoadError};
use crate::frame::Frame;
use crate::viewpoint::{CameraPose, CameraState, Frustum};
use std::future::Future;
use std::time::Duration;

/// Renderer session driven by the capture controller and the replay pipeline.
///
/// Implementations own a single camera and framebuffer; callers never issue
/// overlapping pose changes and frame reads.
pub trait Renderer {
    /// Current camera pose and projection, or `None` before the session has
    /// produced its first frame.
    fn camera_state(&self) -> Option<CameraState>;

    /// Move the camera. `frustum` is only passed when the projection should be
    /// restored as well.
    fn set_camera_view(
        &mut self,
        pose: &CameraPose,
        frustum: Option<&Frustum>,
    ) -> Result<(), RendererError>;

    /// Resolve once the renderer has had `delay` to redraw and stream content
    /// at the current pose.
    fn settle(&mut self, delay: Duration) -> impl Future<Output = ()> + Send;

    /// Read the full-resolution rendered frame.
    fn frame_buffer(&mut self) -> impl Future<Output = Result<Frame, RendererError>> + Send;
}

/// Scene side of the renderer used by the tileset catalog loader.
pub trait TilesetLoader {
    /// Handle to a loaded tileset inside the renderer's scene.
    type Tileset: Clone + Send;

    /// Remove every previously loaded tileset.
    fn clear_scene(&mut self);

    fn load_tileset(
        &mut self,
        path: &str,
    ) -> impl Future<Output = Result<Self::Tileset, TilesetLoadError>> + Send;

    fn add_to_scene(&mut self, tileset: &Self::Tileset);

    fn focus_view(&mut self, tileset: &Self::Tileset);
}
