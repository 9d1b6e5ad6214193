use super::asset::TilesetAsset;
use crate::engine::bridge::projection::to_vec3;
use crate::engine::camera::viewport_camera::ViewportCamera;
use crate::tools::viewpoints::ViewpointSession;
use bevy::asset::LoadState;
use bevy::prelude::*;
use tokio::sync::oneshot;
use view_capture::{BoundingSphere, Tile, TilesetDescriptor, TilesetLoadError};

/// Scene operations requested by the catalog loader through the bridge.
#[derive(Event)]
pub enum TilesetCommand {
    Clear,
    Load {
        path: String,
        reply: oneshot::Sender<Result<Entity, TilesetLoadError>>,
    },
    Show(Entity),
    Focus(Entity),
}

/// Root entity of a loaded tileset.
#[derive(Component, Debug)]
pub struct TilesetRoot {
    pub path: String,
    pub bounds: Option<BoundingSphere>,
}

struct PendingLoad {
    path: String,
    handle: Handle<TilesetAsset>,
    reply: Option<oneshot::Sender<Result<Entity, TilesetLoadError>>>,
}

#[derive(Resource, Default)]
pub struct PendingTilesetLoads(Vec<PendingLoad>);

pub fn handle_tileset_commands(
    mut events: ResMut<Events<TilesetCommand>>,
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    mut pending: ResMut<PendingTilesetLoads>,
    mut roots: Query<(Entity, &TilesetRoot, &mut Visibility)>,
    mut camera_query: Query<&mut Transform, With<Camera3d>>,
    mut viewport: ResMut<ViewportCamera>,
) {
    for command in events.drain() {
        match command {
            TilesetCommand::Clear => {
                for (entity, root, _) in &roots {
                    info!("Removing tileset {}", root.path);
                    commands.entity(entity).despawn();
                }
                // Loads still in flight belong to the previous catalog.
                for load in pending.0.drain(..) {
                    if let Some(reply) = load.reply {
                        let _ = reply.send(Err(TilesetLoadError::Failed {
                            path: load.path,
                            reason: "superseded by a new catalog".into(),
                        }));
                    }
                }
            }
            TilesetCommand::Load { path, reply } => {
                println!("Loading tileset from: {}", path);
                pending.0.push(PendingLoad {
                    handle: asset_server.load(path.clone()),
                    path,
                    reply: Some(reply),
                });
            }
            TilesetCommand::Show(entity) => {
                if let Ok((_, _, mut visibility)) = roots.get_mut(entity) {
                    *visibility = Visibility::Inherited;
                }
            }
            TilesetCommand::Focus(entity) => {
                let Ok((_, root, _)) = roots.get(entity) else {
                    continue;
                };
                let Some(bounds) = root.bounds else {
                    warn!("Tileset {} has no bounding volume to focus", root.path);
                    continue;
                };
                let target = viewport.focus_on(to_vec3(bounds.center), bounds.radius as f32);
                if let Ok(mut transform) = camera_query.single_mut() {
                    *transform = target;
                }
                info!("Focused view on {}", root.path);
            }
        }
    }
}

pub fn poll_tileset_loads(
    mut pending: ResMut<PendingTilesetLoads>,
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    tilesets: Res<Assets<TilesetAsset>>,
) {
    pending.0.retain_mut(|load| {
        let result = match asset_server.get_load_state(load.handle.id()) {
            Some(LoadState::Loaded) => match tilesets.get(&load.handle) {
                Some(asset) => Ok(spawn_tileset(
                    &mut commands,
                    &asset_server,
                    &load.path,
                    &asset.0,
                )),
                None => return true,
            },
            Some(LoadState::Failed(err)) => Err(TilesetLoadError::Failed {
                path: load.path.clone(),
                reason: err.to_string(),
            }),
            _ => return true,
        };

        if let Some(reply) = load.reply.take() {
            let _ = reply.send(result);
        }
        false
    });
}

/// Spawn a hidden root for `descriptor` with its renderable tile content.
fn spawn_tileset(
    commands: &mut Commands,
    asset_server: &AssetServer,
    path: &str,
    descriptor: &TilesetDescriptor,
) -> Entity {
    let root = commands
        .spawn((
            Name::new(format!("Tileset {path}")),
            TilesetRoot {
                path: path.to_string(),
                bounds: descriptor.bounding_sphere(),
            },
            Transform::default(),
            Visibility::Hidden,
        ))
        .id();

    let mut skipped = 0;
    spawn_tile_content(
        commands,
        asset_server,
        root,
        path,
        &descriptor.root,
        Mat4::IDENTITY,
        &mut skipped,
    );
    if skipped > 0 {
        warn!(
            "{}: {} tiles use content formats the viewer cannot render",
            path, skipped
        );
    }
    println!(
        "✓ Tileset {} ready ({} tiles)",
        path,
        descriptor.tile_count()
    );
    root
}

fn spawn_tile_content(
    commands: &mut Commands,
    asset_server: &AssetServer,
    root: Entity,
    tileset_path: &str,
    tile: &Tile,
    parent: Mat4,
    skipped: &mut usize,
) {
    let world = match tile.transform {
        Some(m) => parent * Mat4::from_cols_array(&m.map(|v| v as f32)),
        None => parent,
    };

    if let Some(uri) = tile.content_uri() {
        if is_gltf(uri) {
            let content = resolve_content_path(tileset_path, uri);
            let scene = asset_server.load(GltfAssetLabel::Scene(0).from_asset(content));
            commands.spawn((SceneRoot(scene), Transform::from_matrix(world), ChildOf(root)));
        } else {
            *skipped += 1;
        }
    }

    for child in &tile.children {
        spawn_tile_content(commands, asset_server, root, tileset_path, child, world, skipped);
    }
}

fn is_gltf(uri: &str) -> bool {
    let path = uri.split(['?', '#']).next().unwrap_or(uri).to_ascii_lowercase();
    path.ends_with(".glb") || path.ends_with(".gltf")
}

/// Content URIs are relative to the directory of the descriptor.
pub fn resolve_content_path(tileset_path: &str, uri: &str) -> String {
    if uri.contains("://") || uri.starts_with('/') {
        return uri.to_string();
    }
    let uri = uri.strip_prefix("./").unwrap_or(uri);
    match tileset_path.rsplit_once('/') {
        Some((dir, _)) => format!("{dir}/{uri}"),
        None => uri.to_string(),
    }
}

/// Outline loaded tileset bounds. Hidden while a replay is capturing.
pub fn draw_tileset_bounds(
    mut gizmos: Gizmos,
    roots: Query<(&TilesetRoot, &Visibility)>,
    session: Option<Res<ViewpointSession>>,
) {
    if session.is_some_and(|s| s.is_replaying()) {
        return;
    }
    for (root, visibility) in &roots {
        if *visibility == Visibility::Hidden {
            continue;
        }
        if let Some(bounds) = root.bounds {
            gizmos.sphere(
                Isometry3d::from_translation(to_vec3(bounds.center)),
                bounds.radius as f32,
                Color::srgb(0.2, 0.8, 1.0),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_is_resolved_next_to_descriptor() {
        assert_eq!(
            resolve_content_path("3DTiles/block_a/tileset.json", "tiles/0.glb"),
            "3DTiles/block_a/tiles/0.glb"
        );
        assert_eq!(
            resolve_content_path("3DTiles/block_a/tileset.json", "./0.glb"),
            "3DTiles/block_a/0.glb"
        );
        assert_eq!(resolve_content_path("tileset.json", "0.glb"), "0.glb");
        assert_eq!(
            resolve_content_path("a/tileset.json", "https://cdn/x.glb"),
            "https://cdn/x.glb"
        );
    }

    #[test]
    fn only_gltf_content_is_renderable() {
        assert!(is_gltf("tiles/0.glb"));
        assert!(is_gltf("Scene.GLTF?v=2"));
        assert!(!is_gltf("tiles/0.b3dm"));
        assert!(!is_gltf("points.pnts"));
    }
}
