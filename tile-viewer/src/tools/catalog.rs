use crate::engine::bridge::handle::ViewerHandle;
use crate::rpc::web_rpc::WebRpcInterface;
use bevy::prelude::*;
use bevy::tasks::{IoTaskPool, Task, block_on, futures_lite::future};
use view_capture::{CatalogReport, load_catalog};

/// Tileset catalog load in progress, plus paths queued before the viewer
/// was ready to load them.
#[derive(Resource, Default)]
pub struct TilesetCatalog {
    task: Option<Task<CatalogReport>>,
    pub queued: Vec<String>,
}

impl TilesetCatalog {
    pub fn with_paths(paths: Vec<String>) -> Self {
        Self {
            task: None,
            queued: paths,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.task.is_some()
    }

    /// Replace the scene's tilesets with `paths`. Refused while a previous
    /// catalog is still loading.
    pub fn start(&mut self, handle: &ViewerHandle, paths: Vec<String>) -> bool {
        if self.is_loading() {
            return false;
        }
        println!("Loading tileset catalog ({} paths)", paths.len());
        let mut handle = handle.clone();
        self.task = Some(
            IoTaskPool::get().spawn(async move { load_catalog(&mut handle, &paths).await }),
        );
        true
    }

    fn poll_finished(&mut self) -> Option<CatalogReport> {
        let task = self.task.as_mut()?;
        let report = block_on(future::poll_once(task))?;
        self.task = None;
        Some(report)
    }
}

/// Start loading paths given on the command line once the viewer is running.
pub fn start_queued_catalog(mut catalog: ResMut<TilesetCatalog>, handle: Res<ViewerHandle>) {
    if catalog.queued.is_empty() || catalog.is_loading() {
        return;
    }
    let paths = std::mem::take(&mut catalog.queued);
    catalog.start(&handle, paths);
}

pub fn poll_catalog_task(mut catalog: ResMut<TilesetCatalog>, mut rpc: ResMut<WebRpcInterface>) {
    let Some(report) = catalog.poll_finished() else {
        return;
    };

    if report.failures.is_empty() {
        info!("All {} tilesets loaded", report.loaded.len());
    } else {
        warn!(
            "{} of {} tilesets failed to load",
            report.failures.len(),
            report.requested
        );
    }
    match serde_json::to_value(&report) {
        Ok(value) => rpc.send_notification("tilesets_loaded", value),
        Err(e) => error!("Failed to serialise catalog report: {}", e),
    }
}

/// Tileset paths from the command line, relative to the asset directory.
#[cfg(not(target_arch = "wasm32"))]
pub fn paths_from_args() -> Vec<String> {
    std::env::args().skip(1).collect()
}

#[cfg(target_arch = "wasm32")]
pub fn paths_from_args() -> Vec<String> {
    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::bridge::handle::viewer_channel;
    use bevy::tasks::TaskPool;

    #[test]
    fn second_catalog_is_refused_while_loading() {
        IoTaskPool::get_or_init(TaskPool::new);
        let (handle, _queue, _) = viewer_channel();
        let mut catalog = TilesetCatalog::default();

        assert!(catalog.start(&handle, vec!["a/tileset.json".into()]));
        assert!(!catalog.start(&handle, vec!["b/tileset.json".into()]));
        assert!(catalog.is_loading());
    }
}
