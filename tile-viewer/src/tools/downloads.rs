use crate::tools::viewpoints::ReplaySettings;

#[cfg(not(target_arch = "wasm32"))]
use view_capture::DirectorySink;

#[cfg(target_arch = "wasm32")]
use view_capture::{ArtifactSink, SinkError};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::{JsCast, JsValue};

#[cfg(target_arch = "wasm32")]
use web_sys::{Blob, BlobPropertyBag, HtmlAnchorElement, Url};

/// Offers each artifact to the user as a browser download.
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserDownloadSink;

#[cfg(target_arch = "wasm32")]
impl ArtifactSink for BrowserDownloadSink {
    fn emit(&mut self, name: &str, bytes: &[u8]) -> Result<(), SinkError> {
        trigger_download(name, bytes)
            .map_err(|e| SinkError::Transport(format!("download of {name} failed: {e:?}")))
    }
}

#[cfg(target_arch = "wasm32")]
fn trigger_download(name: &str, bytes: &[u8]) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    let parts = js_sys::Array::of1(&js_sys::Uint8Array::from(bytes));
    let options = BlobPropertyBag::new();
    options.set_type(mime_type(name));
    let blob = Blob::new_with_u8_array_sequence_and_options(&parts, &options)?;
    let url = Url::create_object_url_with_blob(&blob)?;

    let anchor: HtmlAnchorElement = document
        .create_element("a")?
        .dyn_into()
        .map_err(JsValue::from)?;
    anchor.set_href(&url);
    anchor.set_download(name);
    anchor.click();

    Url::revoke_object_url(&url)
}

pub fn mime_type(name: &str) -> &'static str {
    match name.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase()) {
        Some(ext) if ext == "jpg" || ext == "jpeg" => "image/jpeg",
        Some(ext) if ext == "json" => "application/json",
        _ => "application/octet-stream",
    }
}

/// Browser downloads on the web, files under the output directory natively.
#[cfg(target_arch = "wasm32")]
pub type PlatformSink = BrowserDownloadSink;

#[cfg(not(target_arch = "wasm32"))]
pub type PlatformSink = DirectorySink;

#[cfg(target_arch = "wasm32")]
pub fn platform_sink(_settings: &ReplaySettings) -> PlatformSink {
    BrowserDownloadSink
}

#[cfg(not(target_arch = "wasm32"))]
pub fn platform_sink(settings: &ReplaySettings) -> PlatformSink {
    DirectorySink::new(&settings.output_dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mime_types_follow_extension() {
        assert_eq!(mime_type("view_1.jpg"), "image/jpeg");
        assert_eq!(mime_type("VIEW_2.JPEG"), "image/jpeg");
        assert_eq!(mime_type("camera_views.json"), "application/json");
        assert_eq!(mime_type("notes"), "application/octet-stream");
    }
}
