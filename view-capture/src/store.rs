use crate::error::ImportError;
use crate::viewpoint::Viewpoint;
use constants::capture_settings::EXPORT_FILE_NAME;

/// Ordered, append-only list of captured viewpoints.
/// Insertion order is capture order and replay order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewpointStore {
    viewpoints: Vec<Viewpoint>,
}

/// Serialised store ready to be offered for download.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportDocument {
    pub file_name: &'static str,
    pub bytes: Vec<u8>,
}

impl ViewpointStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append and return the stored viewpoint.
    pub fn push(&mut self, viewpoint: Viewpoint) -> &Viewpoint {
        self.viewpoints.push(viewpoint);
        &self.viewpoints[self.viewpoints.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.viewpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.viewpoints.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Viewpoint> {
        self.viewpoints.get(index)
    }

    pub fn last(&self) -> Option<&Viewpoint> {
        self.viewpoints.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Viewpoint> {
        self.viewpoints.iter()
    }

    pub fn as_slice(&self) -> &[Viewpoint] {
        &self.viewpoints
    }

    /// Pretty-printed JSON array of every stored viewpoint, in order.
    pub fn export_document(&self) -> Result<ExportDocument, serde_json::Error> {
        let bytes = serde_json::to_vec_pretty(&self.viewpoints)?;
        Ok(ExportDocument {
            file_name: EXPORT_FILE_NAME,
            bytes,
        })
    }
}

impl From<Vec<Viewpoint>> for ViewpointStore {
    fn from(viewpoints: Vec<Viewpoint>) -> Self {
        Self { viewpoints }
    }
}

impl FromIterator<Viewpoint> for ViewpointStore {
    fn from_iter<I: IntoIterator<Item = Viewpoint>>(iter: I) -> Self {
        Self {
            viewpoints: iter.into_iter().collect(),
        }
    }
}

/// Parse an exported document. Any malformed entry fails the whole import.
pub fn import_document(text: &str) -> Result<Vec<Viewpoint>, ImportError> {
    Ok(serde_json::from_str(text)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewpoint::{Cartesian3, Frustum};

    fn viewpoint(x: f64) -> Viewpoint {
        Viewpoint {
            position: Cartesian3::new(x, 0.0, 0.0),
            direction: Cartesian3::new(0.0, 0.0, -1.0),
            up: Cartesian3::new(0.0, 1.0, 0.0),
            frustum: Frustum {
                fov: 1.0471975511965976,
                near: 0.1,
                far: 10_000_000.0,
            },
        }
    }

    #[test]
    fn export_is_named_and_pretty_printed() {
        let store: ViewpointStore = [viewpoint(1.0)].into_iter().collect();
        let document = store.export_document().unwrap();

        assert_eq!(document.file_name, "camera_views.json");
        let text = String::from_utf8(document.bytes).unwrap();
        assert!(text.starts_with("[\n"));
        assert!(text.contains("\"frustum\""));
    }

    #[test]
    fn push_returns_the_appended_viewpoint() {
        let mut store = ViewpointStore::new();
        store.push(viewpoint(1.0));

        assert_eq!(store.push(viewpoint(2.0)).position.x, 2.0);
        assert_eq!(store.len(), 2);
        assert_eq!(store.last(), Some(&viewpoint(2.0)));
    }

    #[test]
    fn empty_store_exports_empty_array() {
        let document = ViewpointStore::new().export_document().unwrap();
        let parsed = import_document(std::str::from_utf8(&document.bytes).unwrap()).unwrap();
        assert!(parsed.is_empty());
    }

    #[test]
    fn push_preserves_capture_order() {
        let mut store = ViewpointStore::new();
        store.push(viewpoint(1.0));
        store.push(viewpoint(2.0));
        store.push(viewpoint(1.0));

        let xs: Vec<f64> = store.iter().map(|v| v.position.x).collect();
        assert_eq!(xs, vec![1.0, 2.0, 1.0]);
        assert_eq!(store.last(), Some(&viewpoint(1.0)));
    }

    #[test]
    fn import_rejects_documents_that_are_not_arrays() {
        assert!(matches!(
            import_document("{\"position\": {}}"),
            Err(ImportError::ParseFailure(_))
        ));
    }

    #[test]
    fn import_rejects_missing_fields() {
        let text = r#"[{"position":{"x":1,"y":2,"z":3},"direction":{"x":0,"y":0,"z":-1},"up":{"x":0,"y":1,"z":0}}]"#;
        assert!(import_document(text).is_err());
    }

    #[test]
    fn import_accepts_integer_literals() {
        let text = r#"[{"position":{"x":1,"y":2,"z":3},"direction":{"x":0,"y":0,"z":-1},"up":{"x":0,"y":1,"z":0},"frustum":{"fov":1,"near":1,"far":100}}]"#;
        let parsed = import_document(text).unwrap();
        assert_eq!(parsed[0].position, Cartesian3::new(1.0, 2.0, 3.0));
        assert_eq!(parsed[0].frustum.far, 100.0);
    }
}
