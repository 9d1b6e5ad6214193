use serde::Serialize;
use std::fmt;
use tracing::{info, warn};

/// Step of the per-viewpoint replay sequence that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStage {
    SetView,
    CaptureFrame,
    Crop,
    Encode,
    Emit,
}

impl fmt::Display for FailureStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailureStage::SetView => "set view",
            FailureStage::CaptureFrame => "capture frame",
            FailureStage::Crop => "crop",
            FailureStage::Encode => "encode",
            FailureStage::Emit => "emit",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArtifactRecord {
    pub index: usize,
    pub name: String,
    pub bytes: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewpointFailure {
    pub index: usize,
    pub name: String,
    pub stage: FailureStage,
    pub reason: String,
}

/// Outcome of one replay run. Every requested index below the cancellation
/// point appears exactly once, in `artifacts` or in `failures`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchReport {
    pub requested: usize,
    pub artifacts: Vec<ArtifactRecord>,
    pub failures: Vec<ViewpointFailure>,
    pub cancelled: bool,
}

impl BatchReport {
    pub fn new(requested: usize) -> Self {
        Self {
            requested,
            ..Self::default()
        }
    }

    pub fn succeeded(&self) -> usize {
        self.artifacts.len()
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub fn processed(&self) -> usize {
        self.succeeded() + self.failed()
    }

    pub fn is_complete(&self) -> bool {
        !self.cancelled && self.failures.is_empty() && self.succeeded() == self.requested
    }

    pub fn log_summary(&self) {
        if self.is_complete() {
            info!("Replay finished: {} screenshots exported", self.succeeded());
            return;
        }
        warn!(
            "Replay finished: {}/{} exported, {} failed{}",
            self.succeeded(),
            self.requested,
            self.failed(),
            if self.cancelled { ", cancelled" } else { "" }
        );
        for failure in &self.failures {
            warn!(
                "  {} failed at {}: {}",
                failure.name, failure.stage, failure.reason
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_and_completion() {
        let mut report = BatchReport::new(2);
        report.artifacts.push(ArtifactRecord {
            index: 0,
            name: "view_1.jpg".into(),
            bytes: 100,
        });
        assert!(!report.is_complete());

        report.failures.push(ViewpointFailure {
            index: 1,
            name: "view_2.jpg".into(),
            stage: FailureStage::CaptureFrame,
            reason: "lost".into(),
        });
        assert_eq!(report.processed(), 2);
        assert!(!report.is_complete());
    }

    #[test]
    fn stage_serialises_snake_case() {
        let value = serde_json::to_value(FailureStage::CaptureFrame).unwrap();
        assert_eq!(value, "capture_frame");
    }

    #[test]
    fn empty_run_is_complete() {
        assert!(BatchReport::new(0).is_complete());
    }
}
