use crate::error::CaptureError;
use crate::renderer::Renderer;
use crate::store::ViewpointStore;
use crate::viewpoint::Viewpoint;
use tracing::info;

/// Reads the live camera of an attached renderer session into viewpoints.
///
/// The session is injected with [`CaptureController::attach`]; until then every
/// capture fails with [`CaptureError::NoActiveRenderer`].
#[derive(Debug)]
pub struct CaptureController<R> {
    session: Option<R>,
}

impl<R> Default for CaptureController<R> {
    fn default() -> Self {
        Self { session: None }
    }
}

impl<R: Renderer> CaptureController<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: R) -> Self {
        Self {
            session: Some(session),
        }
    }

    pub fn attach(&mut self, session: R) {
        self.session = Some(session);
    }

    pub fn detach(&mut self) -> Option<R> {
        self.session.take()
    }

    pub fn is_attached(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&R> {
        self.session.as_ref()
    }

    /// Snapshot the current camera. Never touches the renderer's state.
    pub fn capture_current(&self) -> Result<Viewpoint, CaptureError> {
        let session = self.session.as_ref().ok_or(CaptureError::NoActiveRenderer)?;
        let state = session
            .camera_state()
            .ok_or(CaptureError::NoActiveRenderer)?;

        let viewpoint = Viewpoint::from_state(&state);
        if !viewpoint.is_finite() {
            return Err(CaptureError::InvalidCameraState);
        }
        Ok(viewpoint)
    }

    /// Capture and append to `store`. The store is left untouched on failure.
    pub fn capture_into<'a>(
        &self,
        store: &'a mut ViewpointStore,
    ) -> Result<&'a Viewpoint, CaptureError> {
        let viewpoint = self.capture_current()?;
        info!("Viewpoint {} recorded: {:?}", store.len() + 1, viewpoint.position);
        Ok(store.push(viewpoint))
    }
}
