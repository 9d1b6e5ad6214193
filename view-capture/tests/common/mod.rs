//! Scripted renderer and tileset loader shared by the integration tests.
#![allow(dead_code)]

use std::collections::HashSet;
use std::future::{Future, ready};
use std::time::Duration;
use view_capture::{
    CancelFlag, CameraPose, CameraState, Cartesian3, Frame, Frustum, Renderer, RendererError,
    TilesetLoadError, TilesetLoader, Viewpoint,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    SetView(CameraPose, Option<Frustum>),
    Settle(Duration),
    Frame,
}

/// Renderer that records every call and serves solid frames.
#[derive(Debug)]
pub struct FakeRenderer {
    pub calls: Vec<Call>,
    pub state: Option<CameraState>,
    pub frame_size: (u32, u32),
    /// Indices (0-based, counted per frame read) whose frame read fails.
    pub failing_frames: HashSet<usize>,
    /// Indices (0-based, counted per set-view) whose pose is rejected.
    pub rejected_views: HashSet<usize>,
    /// Raise this flag while serving the given frame read.
    pub cancel_on_frame: Option<(usize, CancelFlag)>,
    frames_read: usize,
    views_set: usize,
}

impl FakeRenderer {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            state: None,
            frame_size: (1920, 1080),
            failing_frames: HashSet::new(),
            rejected_views: HashSet::new(),
            cancel_on_frame: None,
            frames_read: 0,
            views_set: 0,
        }
    }

    pub fn with_state(state: CameraState) -> Self {
        Self {
            state: Some(state),
            ..Self::new()
        }
    }

    pub fn poses(&self) -> Vec<CameraPose> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                Call::SetView(pose, _) => Some(*pose),
                _ => None,
            })
            .collect()
    }

    pub fn frustums(&self) -> Vec<Option<Frustum>> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                Call::SetView(_, frustum) => Some(*frustum),
                _ => None,
            })
            .collect()
    }
}

impl Renderer for FakeRenderer {
    fn camera_state(&self) -> Option<CameraState> {
        self.state
    }

    fn set_camera_view(
        &mut self,
        pose: &CameraPose,
        frustum: Option<&Frustum>,
    ) -> Result<(), RendererError> {
        let index = self.views_set;
        self.views_set += 1;
        self.calls.push(Call::SetView(*pose, frustum.copied()));
        if self.rejected_views.contains(&index) {
            return Err(RendererError::InvalidPose(format!("pose {index} rejected")));
        }
        Ok(())
    }

    fn settle(&mut self, delay: Duration) -> impl Future<Output = ()> + Send {
        self.calls.push(Call::Settle(delay));
        ready(())
    }

    fn frame_buffer(&mut self) -> impl Future<Output = Result<Frame, RendererError>> + Send {
        let index = self.frames_read;
        self.frames_read += 1;
        self.calls.push(Call::Frame);
        if let Some((at, flag)) = &self.cancel_on_frame {
            if *at == index {
                flag.cancel();
            }
        }

        let (width, height) = self.frame_size;
        let result = if self.failing_frames.contains(&index) {
            Err(RendererError::FrameCapture("swapchain lost".into()))
        } else {
            Ok(Frame::filled(width, height, [90, 140, 200, 255]))
        };
        ready(result)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SceneOp {
    Clear,
    Add(String),
    Focus(String),
}

/// Loader that fails for a configured set of paths.
#[derive(Debug, Default)]
pub struct FakeLoader {
    pub ops: Vec<SceneOp>,
    pub broken: HashSet<String>,
}

impl FakeLoader {
    pub fn with_broken(paths: &[&str]) -> Self {
        Self {
            ops: Vec::new(),
            broken: paths.iter().map(|p| p.to_string()).collect(),
        }
    }
}

impl TilesetLoader for FakeLoader {
    type Tileset = String;

    fn clear_scene(&mut self) {
        self.ops.push(SceneOp::Clear);
    }

    fn load_tileset(
        &mut self,
        path: &str,
    ) -> impl Future<Output = Result<String, TilesetLoadError>> + Send {
        let result = if self.broken.contains(path) {
            Err(TilesetLoadError::Failed {
                path: path.to_string(),
                reason: "404 Not Found".into(),
            })
        } else {
            Ok(path.to_string())
        };
        ready(result)
    }

    fn add_to_scene(&mut self, tileset: &String) {
        self.ops.push(SceneOp::Add(tileset.clone()));
    }

    fn focus_view(&mut self, tileset: &String) {
        self.ops.push(SceneOp::Focus(tileset.clone()));
    }
}

pub fn frustum() -> Frustum {
    Frustum {
        fov: 1.0471975511965976,
        near: 0.1,
        far: 10_000_000.0,
    }
}

pub fn viewpoint(x: f64, y: f64, z: f64) -> Viewpoint {
    Viewpoint {
        position: Cartesian3::new(x, y, z),
        direction: Cartesian3::new(0.0, 0.0, -1.0),
        up: Cartesian3::new(0.0, 1.0, 0.0),
        frustum: frustum(),
    }
}

pub fn state_at(viewpoint: &Viewpoint) -> CameraState {
    CameraState {
        pose: viewpoint.pose(),
        frustum: viewpoint.frustum,
    }
}
