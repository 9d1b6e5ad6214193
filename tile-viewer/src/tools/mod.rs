//! Viewer tools: viewpoint capture/replay and tileset catalog loading.
//!
//! ## Viewpoint workflow
//!
//! ```text
//! C / capture_view ──> ViewpointSession.store
//! X / export_viewpoints ──> camera_views.json (download or captures/)
//! R / replay_viewpoints ──┐
//! I / import_and_replay ──┴─> ReplayPipeline task ──> view_N.jpg
//! Escape / cancel_replay ──> CancelFlag
//! ```
//!
//! While a replay runs the viewport camera is suspended and tileset bounds
//! are not drawn, so screenshots only show the scene. A second replay is
//! refused until the first one reports `replay_finished`.
//!
//! Native builds read tileset paths from the command line; web builds load
//! them through the `load_tilesets` RPC method.

/// Tileset catalog loading task.
pub mod catalog;

/// Artifact sinks for browser downloads and native files.
pub mod downloads;

/// Viewpoint session, replay task and keyboard shortcuts.
pub mod viewpoints;
