//! Viewport camera for tileset navigation.
//!
//! Fly-through controls with yaw/pitch look, scroll dolly and keyboard
//! movement. Replays suspend the controller so poses set through the bridge
//! are not smoothed away.

/// Viewport camera resource and controller system.
pub mod viewport_camera;
