//! Capture controller and tileset catalog loading.

mod common;

use common::{FakeLoader, FakeRenderer, SceneOp, state_at, viewpoint};
use view_capture::{CaptureController, CaptureError, ViewpointStore, load_catalog};

#[test]
fn test_capture_without_session_fails() {
    let controller: CaptureController<FakeRenderer> = CaptureController::new();
    let mut store = ViewpointStore::new();

    assert_eq!(
        controller.capture_into(&mut store).unwrap_err(),
        CaptureError::NoActiveRenderer
    );
    assert!(store.is_empty());
}

#[test]
fn test_capture_before_first_frame_fails() {
    let controller = CaptureController::with_session(FakeRenderer::new());
    assert_eq!(
        controller.capture_current(),
        Err(CaptureError::NoActiveRenderer)
    );
}

#[test]
fn test_capture_reads_live_camera() {
    let vp = viewpoint(12.0, -4.5, 88.0);
    let mut controller = CaptureController::new();
    controller.attach(FakeRenderer::with_state(state_at(&vp)));

    assert_eq!(controller.capture_current(), Ok(vp));
    assert!(controller.session().unwrap().calls.is_empty());
}

#[test]
fn test_repeated_captures_are_kept() {
    let vp = viewpoint(1.0, 2.0, 3.0);
    let controller = CaptureController::with_session(FakeRenderer::with_state(state_at(&vp)));
    let mut store = ViewpointStore::new();

    controller.capture_into(&mut store).unwrap();
    let second = *controller.capture_into(&mut store).unwrap();

    assert_eq!(second, vp);
    assert_eq!(store.as_slice(), &[vp, vp]);
}

#[test]
fn test_non_finite_camera_is_rejected() {
    let mut vp = viewpoint(0.0, 0.0, 0.0);
    vp.position.y = f64::NAN;
    let controller = CaptureController::with_session(FakeRenderer::with_state(state_at(&vp)));
    let mut store = ViewpointStore::new();

    assert_eq!(
        controller.capture_into(&mut store).unwrap_err(),
        CaptureError::InvalidCameraState
    );
    assert!(store.is_empty());
}

#[test]
fn test_detach_disables_capture() {
    let vp = viewpoint(0.0, 0.0, 0.0);
    let mut controller = CaptureController::with_session(FakeRenderer::with_state(state_at(&vp)));

    assert!(controller.detach().is_some());
    assert!(!controller.is_attached());
    assert_eq!(
        controller.capture_current(),
        Err(CaptureError::NoActiveRenderer)
    );
}

fn paths(list: &[&str]) -> Vec<String> {
    list.iter().map(|p| p.to_string()).collect()
}

#[tokio::test]
async fn test_catalog_focuses_first_success_only() {
    let mut loader = FakeLoader::with_broken(&["a/tileset.json"]);
    let report = load_catalog(
        &mut loader,
        &paths(&["a/tileset.json", "b/tileset.json", "c/tileset.json"]),
    )
    .await;

    assert_eq!(
        loader.ops,
        vec![
            SceneOp::Clear,
            SceneOp::Add("b/tileset.json".into()),
            SceneOp::Add("c/tileset.json".into()),
            SceneOp::Focus("b/tileset.json".into()),
        ]
    );
    assert_eq!(report.focused.as_deref(), Some("b/tileset.json"));
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].path, "a/tileset.json");
    assert_eq!(report.failures[0].reason, "404 Not Found");
}

#[tokio::test]
async fn test_catalog_with_no_successes_does_not_focus() {
    let mut loader = FakeLoader::with_broken(&["x.json", "y.json"]);
    let report = load_catalog(&mut loader, &paths(&["x.json", "y.json"])).await;

    assert_eq!(loader.ops, vec![SceneOp::Clear]);
    assert!(report.focused.is_none());
    assert!(report.loaded.is_empty());
    assert_eq!(report.requested, 2);
}

#[tokio::test]
async fn test_empty_catalog_still_clears_scene() {
    let mut loader = FakeLoader::default();
    let report = load_catalog(&mut loader, &[]).await;

    assert_eq!(loader.ops, vec![SceneOp::Clear]);
    assert_eq!(report.requested, 0);
}
