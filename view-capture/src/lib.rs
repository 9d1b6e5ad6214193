//! Viewpoint capture, replay and screenshot export for tileset viewers.
//!
//! The renderer is an injected collaborator: everything here talks to it
//! through the [`Renderer`] and [`TilesetLoader`] traits, so the same pipeline
//! drives the Bevy viewer and the scripted renderers used in tests.
//!
//! ## Flow
//!
//! ```text
//! CaptureController ──capture──> ViewpointStore ──export──> camera_views.json
//!                                      │                          │
//!                                      └──────────┬── import ─────┘
//!                                                 ▼
//!                                          ReplayPipeline
//!                                 set pose ─> settle ─> read frame
//!                                 ─> centre crop ─> JPEG ─> ArtifactSink
//! ```
//!
//! Each replay produces a [`BatchReport`]; individual viewpoint failures are
//! recorded and the run continues with the next index.

/// Capture controller reading the live camera into viewpoints.
pub mod capture;

/// Tileset catalog loading against an injected loader.
pub mod catalog;

/// JPEG encoding of cropped frames.
pub mod encode;

/// Error types shared by capture, import, rendering and export.
pub mod error;

/// Rendered frame buffers and centre cropping.
pub mod frame;

/// Sequential replay of viewpoints into screenshot artifacts.
pub mod pipeline;

/// Renderer and tileset loader interfaces consumed by the pipeline.
pub mod renderer;

/// Per-viewpoint outcomes collected over a replay run.
pub mod report;

/// Destinations for exported documents and screenshots.
pub mod sink;

/// Ordered viewpoint store and the exported document format.
pub mod store;

/// 3D Tiles descriptor model and bounding volumes.
pub mod tileset;

/// Camera pose and frustum value types.
pub mod viewpoint;

pub use capture::CaptureController;
pub use catalog::{CatalogReport, TilesetFailure, load_catalog};
pub use encode::encode_jpeg;
pub use error::{
    CaptureError, ConfigError, EncodeError, FrameError, ImportError, RendererError, SinkError,
    TilesetLoadError,
};
pub use frame::{Frame, center_crop, crop_origin};
pub use pipeline::{CancelFlag, ReplayConfig, ReplayPipeline, replay_document};
pub use renderer::{Renderer, TilesetLoader};
pub use report::{ArtifactRecord, BatchReport, FailureStage, ViewpointFailure};
pub use sink::{ArtifactSink, DirectorySink, MemorySink};
pub use store::{ExportDocument, ViewpointStore, import_document};
pub use tileset::{BoundingSphere, BoundingVolume, Tile, TilesetDescriptor};
pub use viewpoint::{CameraPose, CameraState, Cartesian3, Frustum, Viewpoint};
