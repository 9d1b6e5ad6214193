//! HTTP catalog of tileset descriptors.
//!
//! `GET /api/tilesets` walks the tiles root and lists every `.json` file,
//! relative to that root with forward slashes. The public and tiles
//! directories are served statically so the viewer can fetch what it lists.

use axum::{
    Json, Router,
    extract::State,
    http::{Method, header},
    routing::get,
};
use constants::catalog::{
    DEFAULT_PUBLIC_DIR, DEFAULT_TILES_DIR, TILESET_EXTENSION, TILESETS_ROUTE,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tracing::{debug, error, warn};

#[derive(Debug, Clone)]
pub struct CatalogConfig {
    pub public_dir: PathBuf,
    pub tiles_dir: PathBuf,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            public_dir: PathBuf::from(DEFAULT_PUBLIC_DIR),
            tiles_dir: PathBuf::from(DEFAULT_TILES_DIR),
        }
    }
}

/// Every tileset descriptor under `root`, sorted. A missing root is logged
/// and yields an empty list.
pub fn discover_tilesets(root: &Path) -> Vec<String> {
    if !root.is_dir() {
        error!("Tiles directory not found: {}", root.display());
        return Vec::new();
    }

    let mut found = Vec::new();
    walk(root, root, &mut found);
    found.sort();
    found
}

fn walk(dir: &Path, root: &Path, found: &mut Vec<String>) {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Skipping unreadable directory {}: {}", dir.display(), e);
            return;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let Ok(file_type) = entry.file_type() else {
            continue;
        };
        // Symlinked directories are not followed; they can loop back on the root.
        if file_type.is_dir() {
            walk(&path, root, found);
        } else if file_type.is_symlink() && path.is_dir() {
            debug!("Not following directory link {}", path.display());
        } else if is_descriptor(&path) {
            if let Some(relative) = relative_path(&path, root) {
                found.push(relative);
            }
        }
    }
}

fn is_descriptor(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext == TILESET_EXTENSION)
}

fn relative_path(path: &Path, root: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Vec<_> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Some(parts.join("/"))
}

pub async fn list_tilesets(State(config): State<Arc<CatalogConfig>>) -> Json<Vec<String>> {
    let root = config.tiles_dir.clone();
    match tokio::task::spawn_blocking(move || discover_tilesets(&root)).await {
        Ok(paths) => Json(paths),
        Err(e) => {
            error!("Tileset walk failed: {}", e);
            Json(Vec::new())
        }
    }
}

pub fn router(config: CatalogConfig) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route(TILESETS_ROUTE, get(list_tilesets))
        .nest_service("/public", ServeDir::new(&config.public_dir))
        .nest_service("/tiles", ServeDir::new(&config.tiles_dir))
        .layer(cors)
        .with_state(Arc::new(config))
}
