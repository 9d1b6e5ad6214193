use bevy::prelude::*;
use view_capture::{CameraPose, Cartesian3, Frustum};

pub fn to_vec3(c: Cartesian3) -> Vec3 {
    Vec3::new(c.x as f32, c.y as f32, c.z as f32)
}

pub fn from_vec3(v: Vec3) -> Cartesian3 {
    Cartesian3::new(v.x as f64, v.y as f64, v.z as f64)
}

/// Field of view along the larger frame dimension, from Bevy's vertical fov.
pub fn stored_fov(vertical_fov: f32, aspect_ratio: f32) -> f64 {
    let vertical = vertical_fov as f64;
    let aspect = aspect_ratio as f64;
    if aspect > 1.0 {
        2.0 * ((vertical * 0.5).tan() * aspect).atan()
    } else {
        vertical
    }
}

/// Inverse of [`stored_fov`] for the current aspect ratio.
pub fn vertical_fov(stored: f64, aspect_ratio: f32) -> f32 {
    let aspect = aspect_ratio as f64;
    let vertical = if aspect > 1.0 {
        2.0 * ((stored * 0.5).tan() / aspect).atan()
    } else {
        stored
    };
    vertical as f32
}

pub fn frustum_from_projection(projection: &PerspectiveProjection) -> Frustum {
    Frustum {
        fov: stored_fov(projection.fov, projection.aspect_ratio),
        near: projection.near as f64,
        far: projection.far as f64,
    }
}

pub fn apply_frustum(projection: &mut PerspectiveProjection, frustum: &Frustum) {
    projection.fov = vertical_fov(frustum.fov, projection.aspect_ratio);
    projection.near = frustum.near as f32;
    projection.far = frustum.far as f32;
}

pub fn pose_from_transform(transform: &Transform) -> CameraPose {
    CameraPose {
        position: from_vec3(transform.translation),
        direction: from_vec3(*transform.forward()),
        up: from_vec3(*transform.up()),
    }
}

pub fn transform_from_pose(pose: &CameraPose) -> Transform {
    Transform::from_translation(to_vec3(pose.position))
        .looking_to(to_vec3(pose.direction), to_vec3(pose.up))
}
