use bevy::asset::AssetMetaCheck;
use bevy::prelude::*;
// Crate engine modules
use crate::engine::bridge::ViewerBridgePlugin;
use crate::engine::camera::viewport_camera::{ViewportCamera, camera_controller};
use crate::engine::core::app_state::{AppState, transition_to_running};
use crate::engine::core::window_config::create_window_config;
use crate::engine::tilesets::TilesetPlugin;
// Crate tools modules
use crate::tools::catalog::{
    TilesetCatalog, paths_from_args, poll_catalog_task, start_queued_catalog,
};
use crate::tools::viewpoints::{
    ReplaySettings, ViewpointSession, handle_viewpoint_shortcuts, poll_replay_task,
};
// Create Web RPC modules
use crate::rpc::web_rpc::WebRpcPlugin;

#[cfg(not(target_arch = "wasm32"))]
use crate::engine::core::app_state::{ShortcutHelpText, sync_help_visibility};

pub fn create_app() -> App {
    let mut app = App::new();

    app.add_plugins(create_default_plugins())
        .init_state::<AppState>()
        .add_plugins(ViewerBridgePlugin)
        .add_plugins(TilesetPlugin)
        .add_plugins(WebRpcPlugin);

    // Initialise resources early
    insert_viewer_resources(&mut app);
    app.insert_resource(TilesetCatalog::with_paths(paths_from_args()));

    // State-based system scheduling
    app.add_systems(Startup, setup).add_systems(
        Update,
        transition_to_running.run_if(in_state(AppState::Loading)),
    );

    let runtime_systems = (
        camera_controller,
        handle_viewpoint_shortcuts, // Native shortcuts or no-op for WASM
        poll_replay_task,
        start_queued_catalog,
        poll_catalog_task,
    );

    app.add_systems(Update, runtime_systems.run_if(in_state(AppState::Running)));

    #[cfg(not(target_arch = "wasm32"))]
    {
        app.add_systems(
            Update,
            sync_help_visibility.run_if(in_state(AppState::Running)),
        );
    }

    app
}

// Black background so screenshots and annotation masks share one background.
fn insert_viewer_resources(app: &mut App) {
    app.insert_resource(ClearColor(Color::BLACK))
        .init_resource::<ViewportCamera>()
        .init_resource::<ViewpointSession>()
        .init_resource::<ReplaySettings>();
}

fn spawn_lighting(commands: &mut Commands) {
    commands.spawn((
        DirectionalLight {
            shadows_enabled: true,
            ..default()
        },
        Transform::from_rotation(Quat::from_euler(
            EulerRot::ZYX,
            0.0,
            1.0,
            -std::f32::consts::FRAC_PI_4,
        )),
    ));
}

fn spawn_viewport_camera(commands: &mut Commands) {
    commands.spawn((
        Camera3d::default(),
        Transform::from_xyz(-2.5, 4.5, 9.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));
}

// Startup system that only handles basic initialisation
fn setup(mut commands: Commands) {
    spawn_lighting(&mut commands);
    spawn_viewport_camera(&mut commands);

    #[cfg(not(target_arch = "wasm32"))]
    {
        create_native_overlays(&mut commands);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn create_native_overlays(commands: &mut Commands) {
    commands
        .spawn(Node {
            width: Val::Percent(100.0),
            height: Val::Percent(100.0),
            ..default()
        })
        .with_children(|parent| {
            parent.spawn((
                Text::new("C capture | X export | R replay | I import | Esc cancel"),
                TextFont {
                    font_size: 14.0,
                    ..default()
                },
                TextColor(Color::srgb(0.9, 0.9, 0.9)),
                Node {
                    position_type: PositionType::Absolute,
                    bottom: Val::Px(12.0),
                    left: Val::Px(12.0),
                    ..default()
                },
                ShortcutHelpText,
            ));
        });
}

fn create_default_plugins() -> impl PluginGroup {
    let window_config = WindowPlugin {
        primary_window: Some(create_window_config()),
        ..default()
    };

    let asset_config = AssetPlugin {
        meta_check: AssetMetaCheck::Never,
        ..default()
    };

    DefaultPlugins.set(window_config).set(asset_config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scene_is_cleared_to_black() {
        let mut app = App::new();
        insert_viewer_resources(&mut app);

        assert_eq!(app.world().resource::<ClearColor>().0, Color::BLACK);
        assert!(app.world().contains_resource::<ViewpointSession>());
    }
}
