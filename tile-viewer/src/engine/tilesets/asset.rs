use bevy::prelude::*;
use serde::Deserialize;
use view_capture::TilesetDescriptor;

/// Tileset descriptor as a Bevy asset. Mirrors `tileset.json` exactly.
#[derive(Asset, TypePath, Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct TilesetAsset(pub TilesetDescriptor);
