use crate::error::SinkError;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Destination for named binary artifacts: exported documents and screenshots.
pub trait ArtifactSink {
    fn emit(&mut self, name: &str, bytes: &[u8]) -> Result<(), SinkError>;
}

impl<S: ArtifactSink + ?Sized> ArtifactSink for &mut S {
    fn emit(&mut self, name: &str, bytes: &[u8]) -> Result<(), SinkError> {
        (**self).emit(name, bytes)
    }
}

impl<S: ArtifactSink + ?Sized> ArtifactSink for Box<S> {
    fn emit(&mut self, name: &str, bytes: &[u8]) -> Result<(), SinkError> {
        (**self).emit(name, bytes)
    }
}

/// Writes each artifact as a file under a directory, created on first use.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    root: PathBuf,
}

impl DirectorySink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ArtifactSink for DirectorySink {
    fn emit(&mut self, name: &str, bytes: &[u8]) -> Result<(), SinkError> {
        fs::create_dir_all(&self.root)?;
        let path = self.root.join(name);
        fs::write(&path, bytes)?;
        debug!("Wrote {} bytes to {}", bytes.len(), path.display());
        Ok(())
    }
}

/// Keeps artifacts in memory in emission order.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    pub artifacts: Vec<(String, Vec<u8>)>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn names(&self) -> Vec<&str> {
        self.artifacts.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.artifacts
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, bytes)| bytes.as_slice())
    }
}

impl ArtifactSink for MemorySink {
    fn emit(&mut self, name: &str, bytes: &[u8]) -> Result<(), SinkError> {
        self.artifacts.push((name.to_string(), bytes.to_vec()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_sink_keeps_order() {
        let mut sink = MemorySink::new();
        sink.emit("view_1.jpg", b"a").unwrap();
        sink.emit("view_2.jpg", b"b").unwrap();

        assert_eq!(sink.names(), vec!["view_1.jpg", "view_2.jpg"]);
        assert_eq!(sink.get("view_2.jpg"), Some(&b"b"[..]));
        assert_eq!(sink.get("view_3.jpg"), None);
    }

    #[test]
    fn directory_sink_creates_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("captures").join("run");
        let mut sink = DirectorySink::new(&root);

        sink.emit("camera_views.json", b"[]").unwrap();
        assert_eq!(fs::read(root.join("camera_views.json")).unwrap(), b"[]");
    }

    #[test]
    fn directory_sink_overwrites_existing_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = DirectorySink::new(dir.path());

        sink.emit("view_1.jpg", b"first").unwrap();
        sink.emit("view_1.jpg", b"second").unwrap();
        assert_eq!(fs::read(dir.path().join("view_1.jpg")).unwrap(), b"second");
    }
}
