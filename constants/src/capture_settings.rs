/// Edge length in pixels of the square crop taken from the centre of each frame.
pub const DEFAULT_CROP_SIZE: u32 = 1024;

/// Largest accepted crop edge. A crop allocates `4 * size^2` bytes before
/// encoding, so browser builds get a tighter bound.
#[cfg(target_arch = "wasm32")]
pub const MAX_CROP_SIZE: u32 = 4096;
#[cfg(not(target_arch = "wasm32"))]
pub const MAX_CROP_SIZE: u32 = 8192;

/// Time allowed for the renderer to redraw and stream tiles after a pose change.
pub const DEFAULT_SETTLE_DELAY_MS: u64 = 1000;

/// JPEG quality (1-100) for exported viewpoint screenshots.
pub const JPEG_QUALITY: u8 = 92;

/// Minimum rendered frames the viewer waits for on top of the settle delay.
pub const MIN_SETTLE_FRAMES: u32 = 2;

/// File name offered for the exported viewpoint list.
pub const EXPORT_FILE_NAME: &str = "camera_views.json";

/// Prefix and extension of replay artifacts: `view_1.jpg`, `view_2.jpg`, ...
pub const ARTIFACT_PREFIX: &str = "view_";
pub const ARTIFACT_EXTENSION: &str = "jpg";

/// Directory native builds write exports and screenshots into.
pub const DEFAULT_OUTPUT_DIR: &str = "captures";

/// Artifact file name for a 0-based replay index.
pub fn artifact_name(index: usize) -> String {
    format!("{}{}.{}", ARTIFACT_PREFIX, index + 1, ARTIFACT_EXTENSION)
}
