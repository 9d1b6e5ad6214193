use crate::engine::bridge::handle::ViewerHandle;
use crate::rpc::web_rpc::WebRpcInterface;
use crate::tools::viewpoints::ViewpointSession;
use bevy::prelude::*;
use view_capture::Renderer;

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, States)]
pub enum AppState {
    #[default]
    Loading,
    Running,
}

/// Shortcut help shown on native builds.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Component)]
pub struct ShortcutHelpText;

// The viewer is ready once the camera has published its first frame.
pub fn transition_to_running(
    handle: Res<ViewerHandle>,
    mut session: ResMut<ViewpointSession>,
    mut rpc: ResMut<WebRpcInterface>,
    mut next_state: ResMut<NextState<AppState>>,
) {
    if handle.camera_state().is_none() {
        return;
    }

    session.attach(handle.clone());
    println!("→ Camera ready, transitioning to Running state");
    rpc.send_notification("viewer_ready", serde_json::json!({ "ready": true }));
    next_state.set(AppState::Running);
}

/// Keep the help overlay out of replayed frames.
#[cfg(not(target_arch = "wasm32"))]
pub fn sync_help_visibility(
    session: Res<ViewpointSession>,
    mut help: Query<&mut Visibility, With<ShortcutHelpText>>,
) {
    let wanted = if session.is_replaying() {
        Visibility::Hidden
    } else {
        Visibility::Inherited
    };
    for mut visibility in &mut help {
        visibility.set_if_neq(wanted);
    }
}
