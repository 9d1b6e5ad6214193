//! JSON-RPC 2.0 communication layer for the host page.
//!
//! The viewer runs inside an iframe and talks to its parent window over
//! `postMessage`, using both request-response and notification patterns.
//!
//! ## Message Flow
//!
//! ```text
//! Host page (parent)  <──postMessage──>  Viewer (iframe)
//!        │                                     │
//!        ├─ Request (with ID) ───────────────> │
//!        │                                     ├─ Process request
//!        │ <──────────────── Response (with ID)┤
//!        │                                     │
//!        │ <──────────── Notification (no ID) ─┤
//! ```
//!
//! ## Methods
//!
//! ### Tilesets
//! - `load_tilesets {paths}`: replace the scene with the listed tilesets
//!
//! ### Viewpoints
//! - `capture_view`: record the live camera
//! - `get_viewpoints`: list recorded viewpoints
//! - `export_viewpoints`: emit `camera_views.json`
//! - `replay_viewpoints {settle_delay_ms?, crop_size?, restore_frustum?}`
//! - `import_and_replay {document, ...same options}`: replay an exported
//!   document without touching the recorded list
//! - `cancel_replay`: stop after the viewpoint in flight
//!
//! ## Notifications
//!
//! `viewpoint_captured`, `replay_started`, `replay_finished`,
//! `tilesets_loaded`, `viewer_ready` and `debug_message`.
//!
//! ## Error Handling
//!
//! Standard JSON-RPC 2.0 error codes:
//! - `-32601`: Method not found
//! - `-32602`: Invalid params (including unparseable viewpoint documents)
//! - `-32603`: Internal error
//!
//! Domain failures carry `data.kind`, e.g. `NoActiveRenderer`,
//! `InvalidCameraState`, `ParseFailure`, `ReplayBusy`, `CatalogBusy`.

/// JSON-RPC 2.0 bidirectional communication with the host page.
pub mod web_rpc;
