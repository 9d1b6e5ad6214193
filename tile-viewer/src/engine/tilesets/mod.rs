//! 3D Tiles tilesets in the scene.
//!
//! Descriptors are loaded through the asset server as JSON assets. Each
//! loaded tileset becomes a hidden root entity carrying its bounding sphere,
//! with one glTF scene child per tile whose content the viewer can render.
//! The catalog loader shows and focuses roots through bridge commands.

/// `TilesetAsset` JSON asset wrapper.
pub mod asset;

/// Tileset commands, pending loads and scene spawning.
pub mod loading;

use asset::TilesetAsset;
use bevy::prelude::*;
use bevy_common_assets::json::JsonAssetPlugin;
use loading::{
    PendingTilesetLoads, TilesetCommand, draw_tileset_bounds, handle_tileset_commands,
    poll_tileset_loads,
};

pub struct TilesetPlugin;

impl Plugin for TilesetPlugin {
    fn build(&self, app: &mut App) {
        // Registers tileset descriptors as a loadable asset type from JSON files.
        app.add_plugins(JsonAssetPlugin::<TilesetAsset>::new(&["json"]))
            .add_event::<TilesetCommand>()
            .init_resource::<PendingTilesetLoads>()
            .add_systems(
                Update,
                (handle_tileset_commands, poll_tileset_loads, draw_tileset_bounds).chain(),
            );
    }
}
