use bevy::prelude::*;
use std::future::Future;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use view_capture::{
    CameraPose, CameraState, Frame, Frustum, Renderer, RendererError, TilesetLoadError,
    TilesetLoader,
};

/// Request sent from a [`ViewerHandle`] to the ECS systems.
pub enum ViewerCommand {
    SetView {
        pose: CameraPose,
        frustum: Option<Frustum>,
    },
    Settle {
        delay: Duration,
        reply: oneshot::Sender<()>,
    },
    CaptureFrame {
        reply: oneshot::Sender<Result<Frame, RendererError>>,
    },
    ClearTilesets,
    LoadTileset {
        path: String,
        reply: oneshot::Sender<Result<Entity, TilesetLoadError>>,
    },
    ShowTileset(Entity),
    FocusTileset(Entity),
}

/// Last published camera state, shared between the render loop and handles.
#[derive(Resource, Clone, Default)]
pub struct CameraMirror(Arc<RwLock<Option<CameraState>>>);

impl CameraMirror {
    pub fn publish(&self, state: CameraState) {
        if let Ok(mut slot) = self.0.write() {
            *slot = Some(state);
        }
    }

    pub fn read(&self) -> Option<CameraState> {
        self.0.read().ok().and_then(|slot| *slot)
    }
}

/// Receiving end of the command channel, drained once per frame.
#[derive(Resource)]
pub struct ViewerCommandQueue {
    pub receiver: mpsc::UnboundedReceiver<ViewerCommand>,
}

/// Renderer session handed to the capture controller, the replay pipeline
/// and the tileset catalog loader.
#[derive(Resource, Clone)]
pub struct ViewerHandle {
    commands: mpsc::UnboundedSender<ViewerCommand>,
    camera: CameraMirror,
}

pub fn viewer_channel() -> (ViewerHandle, ViewerCommandQueue, CameraMirror) {
    let (sender, receiver) = mpsc::unbounded_channel();
    let mirror = CameraMirror::default();
    let handle = ViewerHandle {
        commands: sender,
        camera: mirror.clone(),
    };
    (handle, ViewerCommandQueue { receiver }, mirror)
}

impl ViewerHandle {
    fn send(&self, command: ViewerCommand) -> bool {
        self.commands.send(command).is_ok()
    }
}

fn validate_pose(pose: &CameraPose) -> Result<(), RendererError> {
    let finite = pose.position.is_finite() && pose.direction.is_finite() && pose.up.is_finite();
    if !finite {
        return Err(RendererError::InvalidPose("non-finite component".into()));
    }
    if pose.direction.length() == 0.0 || pose.up.length() == 0.0 {
        return Err(RendererError::InvalidPose(
            "direction and up must be non-zero".into(),
        ));
    }
    Ok(())
}

impl Renderer for ViewerHandle {
    fn camera_state(&self) -> Option<CameraState> {
        self.camera.read()
    }

    fn set_camera_view(
        &mut self,
        pose: &CameraPose,
        frustum: Option<&Frustum>,
    ) -> Result<(), RendererError> {
        validate_pose(pose)?;
        let sent = self.send(ViewerCommand::SetView {
            pose: *pose,
            frustum: frustum.copied(),
        });
        if sent {
            Ok(())
        } else {
            Err(RendererError::Disconnected)
        }
    }

    fn settle(&mut self, delay: Duration) -> impl Future<Output = ()> + Send {
        let (reply, done) = oneshot::channel();
        self.send(ViewerCommand::Settle { delay, reply });
        async move {
            // A dropped sender means the app is shutting down; nothing to wait for.
            let _ = done.await;
        }
    }

    fn frame_buffer(&mut self) -> impl Future<Output = Result<Frame, RendererError>> + Send {
        let (reply, frame) = oneshot::channel();
        self.send(ViewerCommand::CaptureFrame { reply });
        async move { frame.await.map_err(|_| RendererError::Disconnected)? }
    }
}

impl TilesetLoader for ViewerHandle {
    type Tileset = Entity;

    fn clear_scene(&mut self) {
        self.send(ViewerCommand::ClearTilesets);
    }

    fn load_tileset(
        &mut self,
        path: &str,
    ) -> impl Future<Output = Result<Entity, TilesetLoadError>> + Send {
        let (reply, loaded) = oneshot::channel();
        self.send(ViewerCommand::LoadTileset {
            path: path.to_string(),
            reply,
        });
        async move { loaded.await.map_err(|_| TilesetLoadError::Disconnected)? }
    }

    fn add_to_scene(&mut self, tileset: &Entity) {
        self.send(ViewerCommand::ShowTileset(*tileset));
    }

    fn focus_view(&mut self, tileset: &Entity) {
        self.send(ViewerCommand::FocusTileset(*tileset));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use view_capture::Cartesian3;

    fn pose() -> CameraPose {
        CameraPose {
            position: Cartesian3::new(1.0, 2.0, 3.0),
            direction: Cartesian3::new(0.0, 0.0, -1.0),
            up: Cartesian3::new(0.0, 1.0, 0.0),
        }
    }

    #[test]
    fn set_view_is_queued_for_the_world() {
        let (mut handle, mut queue, _) = viewer_channel();
        handle.set_camera_view(&pose(), None).unwrap();

        match queue.receiver.try_recv() {
            Ok(ViewerCommand::SetView { pose: queued, frustum }) => {
                assert_eq!(queued, pose());
                assert!(frustum.is_none());
            }
            _ => panic!("expected a queued SetView"),
        }
    }

    #[test]
    fn degenerate_pose_is_rejected_without_sending() {
        let (mut handle, mut queue, _) = viewer_channel();
        let mut bad = pose();
        bad.direction = Cartesian3::ZERO;

        assert!(matches!(
            handle.set_camera_view(&bad, None),
            Err(RendererError::InvalidPose(_))
        ));
        assert!(queue.receiver.try_recv().is_err());
    }

    #[test]
    fn closed_world_reports_disconnected() {
        let (mut handle, queue, _) = viewer_channel();
        drop(queue);

        assert_eq!(
            handle.set_camera_view(&pose(), None),
            Err(RendererError::Disconnected)
        );
    }

    #[test]
    fn camera_state_reads_the_mirror() {
        let (handle, _queue, mirror) = viewer_channel();
        assert!(handle.camera_state().is_none());

        let state = CameraState {
            pose: pose(),
            frustum: Frustum {
                fov: 1.0,
                near: 0.1,
                far: 1000.0,
            },
        };
        mirror.publish(state);
        assert_eq!(handle.camera_state(), Some(state));
    }
}
