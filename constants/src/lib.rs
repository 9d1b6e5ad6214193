//! Shared defaults for the viewer, the capture pipeline and the offline tools.

/// Annotation colour classes used when converting rendered annotations into masks.
pub mod class;

/// Replay, crop and encode defaults for viewpoint screenshots.
pub mod capture_settings;

/// Tileset catalog server defaults.
pub mod catalog;

/// WGS84 ellipsoid and geodetic conversion for tileset bounding regions.
pub mod coordinate_system;
