use crate::viewpoint::Cartesian3;
use constants::coordinate_system::geodetic_to_cartesian;
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

/// Root document of a 3D Tiles tileset (`tileset.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TilesetDescriptor {
    pub asset: AssetInfo,
    pub geometric_error: f64,
    pub root: Tile,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetInfo {
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tileset_version: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tile {
    pub bounding_volume: BoundingVolume,
    pub geometric_error: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refine: Option<Refine>,
    /// Column-major 4x4 matrix, tile frame to parent frame.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<[f64; 16]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<TileContent>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Tile>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Refine {
    Add,
    Replace,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileContent {
    /// Pre-1.0 tilesets use `url`.
    #[serde(alias = "url")]
    pub uri: String,
}

/// Exactly one of the three shapes is expected; the first present one wins in
/// the order box, sphere, region.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingVolume {
    /// Centre followed by the three half-axis vectors.
    #[serde(rename = "box", default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<[f64; 12]>,
    /// Centre and radius.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sphere: Option<[f64; 4]>,
    /// West, south, east, north in radians, then min and max height in metres.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<[f64; 6]>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingSphere {
    pub center: Cartesian3,
    pub radius: f64,
}

impl TilesetDescriptor {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// World-space bounds of the root tile.
    pub fn bounding_sphere(&self) -> Option<BoundingSphere> {
        self.root.bounding_sphere()
    }

    /// Content URIs of every tile, depth first, relative to the descriptor.
    pub fn content_uris(&self) -> Vec<&str> {
        let mut uris = Vec::new();
        collect_uris(&self.root, &mut uris);
        uris
    }

    pub fn tile_count(&self) -> usize {
        count_tiles(&self.root)
    }
}

fn collect_uris<'a>(tile: &'a Tile, out: &mut Vec<&'a str>) {
    if let Some(uri) = tile.content_uri() {
        out.push(uri);
    }
    for child in &tile.children {
        collect_uris(child, out);
    }
}

fn count_tiles(tile: &Tile) -> usize {
    1 + tile.children.iter().map(count_tiles).sum::<usize>()
}

impl Tile {
    pub fn content_uri(&self) -> Option<&str> {
        self.content.as_ref().map(|c| c.uri.as_str())
    }

    /// Bounding sphere in the parent frame, with this tile's transform applied.
    /// Regions are always geodetic and ignore the transform.
    pub fn bounding_sphere(&self) -> Option<BoundingSphere> {
        let volume = &self.bounding_volume;

        let local = if let Some(b) = volume.bbox {
            let half_axes = [[b[3], b[4], b[5]], [b[6], b[7], b[8]], [b[9], b[10], b[11]]];
            let radius = half_axes
                .iter()
                .map(|a| a[0] * a[0] + a[1] * a[1] + a[2] * a[2])
                .sum::<f64>()
                .sqrt();
            BoundingSphere {
                center: Cartesian3::new(b[0], b[1], b[2]),
                radius,
            }
        } else if let Some(s) = volume.sphere {
            BoundingSphere {
                center: Cartesian3::new(s[0], s[1], s[2]),
                radius: s[3],
            }
        } else {
            return volume.region.map(region_sphere);
        };

        Some(match &self.transform {
            Some(m) => transform_sphere(m, local),
            None => local,
        })
    }
}

fn transform_sphere(m: &[f64; 16], sphere: BoundingSphere) -> BoundingSphere {
    let c = sphere.center;
    let center = Cartesian3::new(
        m[0] * c.x + m[4] * c.y + m[8] * c.z + m[12],
        m[1] * c.x + m[5] * c.y + m[9] * c.z + m[13],
        m[2] * c.x + m[6] * c.y + m[10] * c.z + m[14],
    );
    let scale = (0..3)
        .map(|col| Cartesian3::new(m[col * 4], m[col * 4 + 1], m[col * 4 + 2]).length())
        .fold(0.0_f64, f64::max);

    BoundingSphere {
        center,
        radius: sphere.radius * scale,
    }
}

fn region_sphere([west, south, east, north, min_h, max_h]: [f64; 6]) -> BoundingSphere {
    // Regions crossing the antimeridian have east < west.
    let east = if east < west { east + TAU } else { east };

    let center = Cartesian3::from_array(geodetic_to_cartesian(
        (west + east) * 0.5,
        (south + north) * 0.5,
        (min_h + max_h) * 0.5,
    ));

    let mut radius = 0.0_f64;
    for lon in [west, east] {
        for lat in [south, north] {
            for height in [min_h, max_h] {
                let corner = Cartesian3::from_array(geodetic_to_cartesian(lon, lat, height));
                radius = radius.max(center.distance(corner));
            }
        }
    }

    BoundingSphere { center, radius }
}
