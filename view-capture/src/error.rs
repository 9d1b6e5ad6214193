//! Error types for capture, import, rendering and export

use thiserror::Error;

/// Errors raised when reading the live camera into a viewpoint.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CaptureError {
    #[error("no active renderer session")]
    NoActiveRenderer,

    #[error("camera state contains non-finite values")]
    InvalidCameraState,
}

/// Errors raised when reading an exported viewpoint document.
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("failed to parse viewpoint document: {0}")]
    ParseFailure(#[from] serde_json::Error),
}

/// Errors reported by a renderer session.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RendererError {
    #[error("renderer session closed")]
    Disconnected,

    #[error("invalid camera pose: {0}")]
    InvalidPose(String),

    #[error("frame capture failed: {0}")]
    FrameCapture(String),
}

/// Errors building a frame from raw pixels.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FrameError {
    #[error("pixel buffer holds {actual} bytes, expected {expected} for {width}x{height} RGBA")]
    BufferSize {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
}

/// Errors encoding a cropped frame.
#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("image encoding failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("encoder returned no data")]
    Empty,
}

/// Replay settings the pipeline cannot run with.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("crop size {size} outside 1..={max}")]
    CropSize { size: u32, max: u32 },
}

/// Errors handing an artifact to its destination.
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("artifact transport failed: {0}")]
    Transport(String),
}

/// Errors loading a single tileset descriptor.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TilesetLoadError {
    #[error("tileset {path} failed to load: {reason}")]
    Failed { path: String, reason: String },

    #[error("renderer session closed")]
    Disconnected,
}
