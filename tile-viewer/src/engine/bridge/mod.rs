//! Channel bridge between the async capture pipeline and the ECS world.
//!
//! `ViewerHandle` is the viewer's implementation of the renderer and tileset
//! loader interfaces. It never touches the `World` directly: every call is
//! sent as a [`ViewerCommand`] over an unbounded channel and answered by the
//! systems in [`systems`] on the next `Update`.
//!
//! ```text
//! IoTaskPool task                         Bevy Update
//!  ReplayPipeline ── ViewerCommand ──>  drain_viewer_commands
//!       ▲                                   ├─ camera transform / projection
//!       │                                   ├─ PendingSettles (time + frames)
//!       └──────── oneshot reply ────────    └─ Screenshot observer -> Frame
//! ```
//!
//! Camera state flows the other way through `CameraMirror`, written every
//! frame so capture reads never wait on the schedule.

/// Cloneable renderer handle and the command type it sends.
pub mod handle;

/// Conversions between Bevy camera types and stored viewpoint values.
pub mod projection;

/// Systems draining the command channel and answering replies.
pub mod systems;

use bevy::prelude::*;
use handle::viewer_channel;
use systems::{PendingSettles, drain_viewer_commands, publish_camera_state, tick_pending_settles};

pub struct ViewerBridgePlugin;

impl Plugin for ViewerBridgePlugin {
    fn build(&self, app: &mut App) {
        let (handle, queue, mirror) = viewer_channel();

        app.insert_resource(handle)
            .insert_resource(queue)
            .insert_resource(mirror)
            .init_resource::<PendingSettles>()
            .add_systems(
                Update,
                (drain_viewer_commands, tick_pending_settles).chain(),
            )
            .add_systems(PostUpdate, publish_camera_state);
    }
}
