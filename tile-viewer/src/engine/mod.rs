pub mod bridge;
pub mod camera;
pub mod core;
pub mod tilesets;
