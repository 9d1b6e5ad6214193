use super::handle::{CameraMirror, ViewerCommand, ViewerCommandQueue};
use super::projection::{apply_frustum, frustum_from_projection, pose_from_transform, transform_from_pose};
use crate::engine::camera::viewport_camera::ViewportCamera;
use crate::engine::tilesets::loading::TilesetCommand;
use bevy::prelude::*;
use bevy::render::render_resource::TextureFormat;
use bevy::render::view::screenshot::{Screenshot, ScreenshotCaptured};
use constants::capture_settings::MIN_SETTLE_FRAMES;
use tokio::sync::oneshot;
use view_capture::{CameraState, Frame, RendererError};

struct PendingSettle {
    ready_at: f64,
    frames_left: u32,
    reply: Option<oneshot::Sender<()>>,
}

/// Settle requests waiting on both their delay and a minimum frame count.
#[derive(Resource, Default)]
pub struct PendingSettles(Vec<PendingSettle>);

impl PendingSettles {
    pub fn len(&self) -> usize {
        self.0.len()
    }
}

pub fn drain_viewer_commands(
    mut queue: ResMut<ViewerCommandQueue>,
    mut commands: Commands,
    time: Res<Time>,
    mut settles: ResMut<PendingSettles>,
    mut camera_query: Query<(&mut Transform, &mut Projection), With<Camera3d>>,
    mut viewport: ResMut<ViewportCamera>,
    mut tileset_commands: EventWriter<TilesetCommand>,
) {
    while let Ok(command) = queue.receiver.try_recv() {
        match command {
            ViewerCommand::SetView { pose, frustum } => {
                let Ok((mut transform, mut projection)) = camera_query.single_mut() else {
                    warn!("SetView ignored: no 3D camera");
                    continue;
                };
                *transform = transform_from_pose(&pose);
                viewport.snap_to(&transform);

                if let Some(frustum) = frustum {
                    match projection.as_mut() {
                        Projection::Perspective(perspective) => apply_frustum(perspective, &frustum),
                        _ => warn!("Frustum not restored: camera is not perspective"),
                    }
                }
            }
            ViewerCommand::Settle { delay, reply } => {
                settles.0.push(PendingSettle {
                    ready_at: time.elapsed_secs_f64() + delay.as_secs_f64(),
                    frames_left: MIN_SETTLE_FRAMES,
                    reply: Some(reply),
                });
            }
            ViewerCommand::CaptureFrame { reply } => {
                let mut reply = Some(reply);
                commands.spawn(Screenshot::primary_window()).observe(
                    move |trigger: Trigger<ScreenshotCaptured>| {
                        if let Some(reply) = reply.take() {
                            let _ = reply.send(frame_from_screenshot(&trigger.event().0));
                        }
                    },
                );
            }
            ViewerCommand::ClearTilesets => {
                tileset_commands.write(TilesetCommand::Clear);
            }
            ViewerCommand::LoadTileset { path, reply } => {
                tileset_commands.write(TilesetCommand::Load { path, reply });
            }
            ViewerCommand::ShowTileset(entity) => {
                tileset_commands.write(TilesetCommand::Show(entity));
            }
            ViewerCommand::FocusTileset(entity) => {
                tileset_commands.write(TilesetCommand::Focus(entity));
            }
        }
    }
}

pub fn tick_pending_settles(time: Res<Time>, mut settles: ResMut<PendingSettles>) {
    let now = time.elapsed_secs_f64();
    settles.0.retain_mut(|settle| {
        settle.frames_left = settle.frames_left.saturating_sub(1);
        if now < settle.ready_at || settle.frames_left > 0 {
            return true;
        }
        if let Some(reply) = settle.reply.take() {
            let _ = reply.send(());
        }
        false
    });
}

pub fn publish_camera_state(
    camera_query: Query<(&Transform, &Projection), With<Camera3d>>,
    mirror: Res<CameraMirror>,
) {
    let Ok((transform, projection)) = camera_query.single() else {
        return;
    };
    let Projection::Perspective(perspective) = projection else {
        return;
    };

    mirror.publish(CameraState {
        pose: pose_from_transform(transform),
        frustum: frustum_from_projection(perspective),
    });
}

/// Swapchain readback to an RGBA frame.
pub fn frame_from_screenshot(image: &Image) -> Result<Frame, RendererError> {
    let width = image.width();
    let height = image.height();
    let Some(data) = image.data.clone() else {
        return Err(RendererError::FrameCapture(
            "screenshot carried no pixel data".into(),
        ));
    };

    let frame = match image.texture_descriptor.format {
        TextureFormat::Bgra8Unorm | TextureFormat::Bgra8UnormSrgb => {
            Frame::from_bgra(width, height, data)
        }
        TextureFormat::Rgba8Unorm | TextureFormat::Rgba8UnormSrgb => {
            Frame::from_rgba(width, height, data)
        }
        other => {
            return Err(RendererError::FrameCapture(format!(
                "unsupported swapchain format {other:?}"
            )));
        }
    };
    frame.map_err(|e| RendererError::FrameCapture(e.to_string()))
}
