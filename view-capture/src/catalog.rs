use crate::error::TilesetLoadError;
use crate::renderer::TilesetLoader;
use serde::Serialize;
use tracing::{error, info};

/// Tileset that could not be loaded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TilesetFailure {
    pub path: String,
    pub reason: String,
}

/// Outcome of loading a tileset catalog into the scene.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CatalogReport {
    pub requested: usize,
    pub loaded: Vec<String>,
    pub failures: Vec<TilesetFailure>,
    /// Path the camera was focused on, the first successful load.
    pub focused: Option<String>,
}

/// Replace the scene's tilesets with `paths`, loading them in order.
///
/// A failing path is recorded and skipped. The view is focused on the first
/// tileset that loaded; if none did the camera is left where it was.
pub async fn load_catalog<L: TilesetLoader>(loader: &mut L, paths: &[String]) -> CatalogReport {
    let mut report = CatalogReport {
        requested: paths.len(),
        ..CatalogReport::default()
    };

    loader.clear_scene();

    let mut first: Option<L::Tileset> = None;
    for path in paths {
        match loader.load_tileset(path).await {
            Ok(tileset) => {
                loader.add_to_scene(&tileset);
                info!("Loaded tileset {}", path);
                report.loaded.push(path.clone());
                if first.is_none() {
                    first = Some(tileset);
                    report.focused = Some(path.clone());
                }
            }
            Err(err) => {
                error!("Error loading tileset {}: {}", path, err);
                let reason = match err {
                    TilesetLoadError::Failed { reason, .. } => reason,
                    other => other.to_string(),
                };
                report.failures.push(TilesetFailure {
                    path: path.clone(),
                    reason,
                });
            }
        }
    }

    if let Some(tileset) = &first {
        loader.focus_view(tileset);
    }

    info!(
        "Tileset catalog: {}/{} loaded",
        report.loaded.len(),
        report.requested
    );
    report
}
