use crate::encode::encode_jpeg;
use crate::error::{ConfigError, ImportError};
use crate::frame::center_crop;
use crate::renderer::Renderer;
use crate::report::{ArtifactRecord, BatchReport, FailureStage, ViewpointFailure};
use crate::sink::ArtifactSink;
use crate::store::import_document;
use crate::viewpoint::Viewpoint;
use constants::capture_settings::{
    DEFAULT_CROP_SIZE, DEFAULT_SETTLE_DELAY_MS, JPEG_QUALITY, MAX_CROP_SIZE, artifact_name,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Per-run replay settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReplayConfig {
    /// Wait between moving the camera and reading the frame.
    pub settle_delay: Duration,
    /// Edge length of the square centre crop.
    pub crop_size: u32,
    pub jpeg_quality: u8,
    /// Pass the stored frustum to the renderer along with the pose.
    pub restore_frustum: bool,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_millis(DEFAULT_SETTLE_DELAY_MS),
            crop_size: DEFAULT_CROP_SIZE,
            jpeg_quality: JPEG_QUALITY,
            restore_frustum: true,
        }
    }
}

impl ReplayConfig {
    /// Crop edge must be within `1..=MAX_CROP_SIZE`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.crop_size == 0 || self.crop_size > MAX_CROP_SIZE {
            return Err(ConfigError::CropSize {
                size: self.crop_size,
                max: MAX_CROP_SIZE,
            });
        }
        Ok(())
    }
}

/// Shared stop request, checked before each viewpoint.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Drives a renderer through a list of viewpoints and emits one cropped JPEG
/// per viewpoint, strictly one at a time.
pub struct ReplayPipeline<R, S> {
    renderer: R,
    sink: S,
    config: ReplayConfig,
    cancel: CancelFlag,
}

impl<R: Renderer, S: ArtifactSink> ReplayPipeline<R, S> {
    pub fn new(renderer: R, sink: S, config: ReplayConfig) -> Self {
        Self {
            renderer,
            sink,
            config,
            cancel: CancelFlag::new(),
        }
    }

    /// Share an existing flag instead of the pipeline's own.
    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    pub fn config(&self) -> &ReplayConfig {
        &self.config
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_parts(self) -> (R, S) {
        (self.renderer, self.sink)
    }

    /// Replay `viewpoints` in order. Per-viewpoint failures are recorded in
    /// the report and never abort the run.
    pub async fn run(&mut self, viewpoints: &[Viewpoint]) -> BatchReport {
        let mut report = BatchReport::new(viewpoints.len());
        info!(
            "Replaying {} viewpoints (crop {}px, settle {:?})",
            viewpoints.len(),
            self.config.crop_size,
            self.config.settle_delay
        );

        // An unusable config fails every index without moving the camera.
        if let Err(e) = self.config.validate() {
            warn!("Replay config rejected: {}", e);
            report.failures = (0..viewpoints.len())
                .map(|index| ViewpointFailure {
                    index,
                    name: artifact_name(index),
                    stage: FailureStage::Crop,
                    reason: e.to_string(),
                })
                .collect();
            report.log_summary();
            return report;
        }

        for (index, viewpoint) in viewpoints.iter().enumerate() {
            if self.cancel.is_cancelled() {
                info!("Replay cancelled before viewpoint {}", index + 1);
                report.cancelled = true;
                break;
            }

            let name = artifact_name(index);
            match self.replay_one(viewpoint, &name).await {
                Ok(bytes) => {
                    debug!("{} exported ({} bytes)", name, bytes);
                    report.artifacts.push(ArtifactRecord { index, name, bytes });
                }
                Err((stage, reason)) => {
                    warn!("{} failed at {}: {}", name, stage, reason);
                    report.failures.push(ViewpointFailure {
                        index,
                        name,
                        stage,
                        reason,
                    });
                }
            }
        }

        report.log_summary();
        report
    }

    async fn replay_one(
        &mut self,
        viewpoint: &Viewpoint,
        name: &str,
    ) -> Result<usize, (FailureStage, String)> {
        let frustum = self.config.restore_frustum.then_some(&viewpoint.frustum);
        self.renderer
            .set_camera_view(&viewpoint.pose(), frustum)
            .map_err(|e| (FailureStage::SetView, e.to_string()))?;

        self.renderer.settle(self.config.settle_delay).await;

        let frame = self
            .renderer
            .frame_buffer()
            .await
            .map_err(|e| (FailureStage::CaptureFrame, e.to_string()))?;

        let cropped = center_crop(&frame, self.config.crop_size);
        let bytes = encode_jpeg(&cropped, self.config.jpeg_quality)
            .map_err(|e| (FailureStage::Encode, e.to_string()))?;

        self.sink
            .emit(name, &bytes)
            .map_err(|e| (FailureStage::Emit, e.to_string()))?;

        Ok(bytes.len())
    }
}

/// Parse an exported document and replay it. A malformed document fails
/// before the renderer is touched.
pub async fn replay_document<R: Renderer, S: ArtifactSink>(
    pipeline: &mut ReplayPipeline<R, S>,
    text: &str,
) -> Result<BatchReport, ImportError> {
    let viewpoints = import_document(text)?;
    Ok(pipeline.run(&viewpoints).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_capture_settings() {
        let config = ReplayConfig::default();
        assert_eq!(config.settle_delay, Duration::from_millis(1000));
        assert_eq!(config.crop_size, 1024);
        assert_eq!(config.jpeg_quality, 92);
        assert!(config.restore_frustum);
    }

    #[test]
    fn cancel_flag_is_shared_between_clones() {
        let flag = CancelFlag::new();
        let other = flag.clone();

        other.cancel();
        assert!(flag.is_cancelled());

        flag.reset();
        assert!(!other.is_cancelled());
    }

    #[test]
    fn crop_size_must_be_positive_and_bounded() {
        let with_crop = |crop_size| ReplayConfig {
            crop_size,
            ..ReplayConfig::default()
        };

        assert!(with_crop(1).validate().is_ok());
        assert!(with_crop(MAX_CROP_SIZE).validate().is_ok());
        assert_eq!(
            with_crop(0).validate(),
            Err(ConfigError::CropSize {
                size: 0,
                max: MAX_CROP_SIZE
            })
        );
        assert!(with_crop(MAX_CROP_SIZE + 1).validate().is_err());
        assert!(with_crop(u32::MAX).validate().is_err());
    }
}
