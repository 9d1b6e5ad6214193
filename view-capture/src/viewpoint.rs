use serde::{Deserialize, Serialize};

/// Point or vector in the renderer's world frame.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Cartesian3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Cartesian3 {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn from_array([x, y, z]: [f64; 3]) -> Self {
        Self { x, y, z }
    }

    pub fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    pub fn length(self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    pub fn distance(self, other: Self) -> f64 {
        Self::new(self.x - other.x, self.y - other.y, self.z - other.z).length()
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// Perspective projection parameters. `fov` is in radians along the larger
/// frame dimension.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Frustum {
    pub fov: f64,
    pub near: f64,
    pub far: f64,
}

impl Frustum {
    pub fn is_finite(&self) -> bool {
        self.fov.is_finite() && self.near.is_finite() && self.far.is_finite()
    }
}

/// Position and orientation handed to the renderer's set-view call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub position: Cartesian3,
    pub direction: Cartesian3,
    pub up: Cartesian3,
}

/// Live camera state as reported by a renderer session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraState {
    pub pose: CameraPose,
    pub frustum: Frustum,
}

/// Captured camera pose. Field layout matches the exported document.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewpoint {
    pub position: Cartesian3,
    pub direction: Cartesian3,
    pub up: Cartesian3,
    pub frustum: Frustum,
}

impl Viewpoint {
    pub fn from_state(state: &CameraState) -> Self {
        Self {
            position: state.pose.position,
            direction: state.pose.direction,
            up: state.pose.up,
            frustum: state.frustum,
        }
    }

    pub fn pose(&self) -> CameraPose {
        CameraPose {
            position: self.position,
            direction: self.direction,
            up: self.up,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.position.is_finite()
            && self.direction.is_finite()
            && self.up.is_finite()
            && self.frustum.is_finite()
    }
}
