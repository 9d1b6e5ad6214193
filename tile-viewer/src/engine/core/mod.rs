//! Core application setup and state management.
//!
//! Handles application lifecycle, window configuration and the transition
//! from waiting on the first rendered camera to the running viewer.

/// Application setup and plugin configuration for the Bevy engine.
pub mod app_setup;

/// Application state machine.
///
/// The viewer stays in `Loading` until the camera mirror has published its
/// first state, then attaches the capture session and enters `Running`.
pub mod app_state;

/// Platform-specific window configuration for native and WASM builds.
pub mod window_config;
