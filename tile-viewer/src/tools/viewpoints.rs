use crate::engine::bridge::handle::ViewerHandle;
use crate::engine::camera::viewport_camera::ViewportCamera;
use crate::rpc::web_rpc::WebRpcInterface;
use crate::tools::downloads::PlatformSink;
use bevy::prelude::*;
use bevy::tasks::{IoTaskPool, Task, block_on, futures_lite::future};
use constants::capture_settings::DEFAULT_OUTPUT_DIR;
use serde::Deserialize;
use std::fmt;
use std::time::Duration;
use view_capture::{
    ArtifactSink, BatchReport, CancelFlag, CaptureController, CaptureError, ExportDocument,
    ReplayConfig, ReplayPipeline, Viewpoint, ViewpointStore,
};

#[cfg(not(target_arch = "wasm32"))]
use crate::tools::downloads::platform_sink;

/// Replay defaults and where native builds write artifacts.
#[derive(Resource, Debug, Clone)]
pub struct ReplaySettings {
    pub config: ReplayConfig,
    pub output_dir: String,
}

impl Default for ReplaySettings {
    fn default() -> Self {
        Self {
            config: ReplayConfig::default(),
            output_dir: DEFAULT_OUTPUT_DIR.to_string(),
        }
    }
}

/// Per-run overrides accepted from RPC parameters.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ReplayOverrides {
    pub settle_delay_ms: Option<u64>,
    pub crop_size: Option<u32>,
    pub restore_frustum: Option<bool>,
}

impl ReplayOverrides {
    pub fn apply(&self, base: ReplayConfig) -> Result<ReplayConfig, String> {
        let mut config = base;
        if let Some(ms) = self.settle_delay_ms {
            config.settle_delay = Duration::from_millis(ms);
        }
        if let Some(size) = self.crop_size {
            config.crop_size = size;
        }
        if let Some(restore) = self.restore_frustum {
            config.restore_frustum = restore;
        }
        config.validate().map_err(|e| e.to_string())?;
        Ok(config)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplayStartError {
    Busy,
    NoActiveRenderer,
}

impl fmt::Display for ReplayStartError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReplayStartError::Busy => f.write_str("a replay is already running"),
            ReplayStartError::NoActiveRenderer => f.write_str("no active renderer session"),
        }
    }
}

struct ActiveReplay {
    task: Task<BatchReport>,
    cancel: CancelFlag,
}

/// Captured viewpoints and the replay currently running, if any.
#[derive(Resource, Default)]
pub struct ViewpointSession {
    controller: CaptureController<ViewerHandle>,
    store: ViewpointStore,
    active: Option<ActiveReplay>,
}

impl ViewpointSession {
    pub fn attach(&mut self, handle: ViewerHandle) {
        self.controller.attach(handle);
    }

    pub fn is_attached(&self) -> bool {
        self.controller.is_attached()
    }

    /// Record the live camera. Returns the 0-based store index.
    pub fn capture(&mut self) -> Result<(usize, Viewpoint), CaptureError> {
        let viewpoint = *self.controller.capture_into(&mut self.store)?;
        Ok((self.store.len() - 1, viewpoint))
    }

    pub fn viewpoints(&self) -> &[Viewpoint] {
        self.store.as_slice()
    }

    pub fn export<S: ArtifactSink>(&self, sink: &mut S) -> Result<ExportDocument, String> {
        let document = self
            .store
            .export_document()
            .map_err(|e| format!("failed to serialise viewpoints: {e}"))?;
        sink.emit(document.file_name, &document.bytes)
            .map_err(|e| e.to_string())?;
        info!(
            "Exported {} viewpoints to {}",
            self.store.len(),
            document.file_name
        );
        Ok(document)
    }

    /// Start replaying `viewpoints` on the IO task pool.
    pub fn start_replay<S>(
        &mut self,
        viewpoints: Vec<Viewpoint>,
        config: ReplayConfig,
        sink: S,
    ) -> Result<usize, ReplayStartError>
    where
        S: ArtifactSink + Send + 'static,
    {
        if self.active.is_some() {
            return Err(ReplayStartError::Busy);
        }
        let handle = self
            .controller
            .session()
            .cloned()
            .ok_or(ReplayStartError::NoActiveRenderer)?;

        let count = viewpoints.len();
        let cancel = CancelFlag::new();
        let mut pipeline = ReplayPipeline::new(handle, sink, config).with_cancel_flag(cancel.clone());
        let task = IoTaskPool::get().spawn(async move { pipeline.run(&viewpoints).await });

        self.active = Some(ActiveReplay { task, cancel });
        Ok(count)
    }

    pub fn cancel_replay(&self) -> bool {
        match &self.active {
            Some(active) => {
                active.cancel.cancel();
                true
            }
            None => false,
        }
    }

    pub fn is_replaying(&self) -> bool {
        self.active.is_some()
    }

    fn poll_finished(&mut self) -> Option<BatchReport> {
        let active = self.active.as_mut()?;
        let report = block_on(future::poll_once(&mut active.task))?;
        self.active = None;
        Some(report)
    }
}

/// Start a replay and hand the camera over to it.
pub fn begin_replay(
    session: &mut ViewpointSession,
    viewport: &mut ViewportCamera,
    rpc: &mut WebRpcInterface,
    viewpoints: Vec<Viewpoint>,
    config: ReplayConfig,
    sink: PlatformSink,
) -> Result<usize, ReplayStartError> {
    let count = session.start_replay(viewpoints, config, sink)?;
    viewport.suspended = true;
    info!("Replay started: {} viewpoints", count);
    rpc.send_notification(
        "replay_started",
        serde_json::json!({
            "count": count,
            "crop_size": config.crop_size,
            "settle_delay_ms": config.settle_delay.as_millis() as u64,
            "restore_frustum": config.restore_frustum,
        }),
    );
    Ok(count)
}

pub fn notify_captured(rpc: &mut WebRpcInterface, index: usize, viewpoint: &Viewpoint) {
    rpc.send_notification(
        "viewpoint_captured",
        serde_json::json!({
            "index": index,
            "count": index + 1,
            "viewpoint": viewpoint,
        }),
    );
}

/// Hand the camera back once the replay task completes.
pub fn poll_replay_task(
    mut session: ResMut<ViewpointSession>,
    mut viewport: ResMut<ViewportCamera>,
    mut rpc: ResMut<WebRpcInterface>,
) {
    if !session.is_replaying() {
        return;
    }
    let Some(report) = session.poll_finished() else {
        return;
    };

    viewport.suspended = false;
    match serde_json::to_value(&report) {
        Ok(value) => rpc.send_notification("replay_finished", value),
        Err(e) => error!("Failed to serialise replay report: {}", e),
    }
}

/// Keyboard shortcuts for capture, export and replay (native builds only).
#[cfg(not(target_arch = "wasm32"))]
pub fn handle_viewpoint_shortcuts(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut session: ResMut<ViewpointSession>,
    mut viewport: ResMut<ViewportCamera>,
    mut rpc: ResMut<WebRpcInterface>,
    settings: Res<ReplaySettings>,
) {
    use constants::capture_settings::EXPORT_FILE_NAME;
    use std::path::Path;
    use view_capture::import_document;

    if keyboard.just_pressed(KeyCode::KeyC) {
        match session.capture() {
            Ok((index, viewpoint)) => {
                println!("Viewpoint {} captured", index + 1);
                notify_captured(&mut rpc, index, &viewpoint);
            }
            Err(e) => warn!("Capture failed: {}", e),
        }
    }

    if keyboard.just_pressed(KeyCode::KeyX) {
        let mut sink = platform_sink(&settings);
        if let Err(e) = session.export(&mut sink) {
            error!("Export failed: {}", e);
        }
    }

    if keyboard.just_pressed(KeyCode::KeyR) {
        let viewpoints = session.viewpoints().to_vec();
        if let Err(e) = begin_replay(
            &mut session,
            &mut viewport,
            &mut rpc,
            viewpoints,
            settings.config,
            platform_sink(&settings),
        ) {
            warn!("Replay not started: {}", e);
        }
    }

    if keyboard.just_pressed(KeyCode::KeyI) {
        let path = Path::new(&settings.output_dir).join(EXPORT_FILE_NAME);
        let viewpoints = match std::fs::read_to_string(&path) {
            Ok(text) => match import_document(&text) {
                Ok(viewpoints) => viewpoints,
                Err(e) => {
                    error!("{}: {}", path.display(), e);
                    return;
                }
            },
            Err(e) => {
                error!("Cannot read {}: {}", path.display(), e);
                return;
            }
        };
        println!("Imported {} viewpoints from {}", viewpoints.len(), path.display());
        if let Err(e) = begin_replay(
            &mut session,
            &mut viewport,
            &mut rpc,
            viewpoints,
            settings.config,
            platform_sink(&settings),
        ) {
            warn!("Replay not started: {}", e);
        }
    }

    if keyboard.just_pressed(KeyCode::Escape) && session.cancel_replay() {
        println!("Cancelling replay after the current viewpoint");
    }
}

/// Placeholder system for WASM builds where viewpoints are driven over RPC.
#[cfg(target_arch = "wasm32")]
pub fn handle_viewpoint_shortcuts() {}
