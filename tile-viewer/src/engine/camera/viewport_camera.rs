use bevy::input::mouse::{MouseMotion, MouseScrollUnit, MouseWheel};
use bevy::math::EulerRot;
use bevy::prelude::*;

#[derive(Resource)]
pub struct ViewportCamera {
    /// Camera eye position the controller eases towards.
    pub focus_point: Vec3,
    /// Scene scale driving move and dolly speeds.
    pub height: f32,
    pub pitch: f32,
    pub yaw: f32,
    pub last_mouse_pos: Vec2,
    /// Set while a replay drives the camera; input and easing are skipped.
    pub suspended: bool,
}

impl Default for ViewportCamera {
    fn default() -> Self {
        Self {
            focus_point: Vec3::new(-2.5, 4.5, 9.0),
            height: 100.0,
            pitch: -0.45,
            yaw: -0.27,
            last_mouse_pos: Vec2::ZERO,
            suspended: false,
        }
    }
}

impl ViewportCamera {
    fn view_rotation(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.yaw, self.pitch, 0.0)
    }

    /// Adopt an externally set transform so easing resumes from it.
    /// Roll is not representable and is dropped once input resumes.
    pub fn snap_to(&mut self, transform: &Transform) {
        self.focus_point = transform.translation;
        let (yaw, pitch) = yaw_pitch_from_direction(*transform.forward());
        self.yaw = yaw;
        self.pitch = pitch;
    }

    /// Frame a bounding sphere: back off along the current view direction far
    /// enough to see the whole sphere.
    pub fn focus_on(&mut self, center: Vec3, radius: f32) -> Transform {
        let radius = radius.max(1.0);
        self.pitch = -0.5;
        let forward = self.view_rotation() * Vec3::NEG_Z;
        self.focus_point = center - forward * radius * 2.5;
        self.height = radius;

        Transform::from_translation(self.focus_point).with_rotation(self.view_rotation())
    }
}

/// Yaw and pitch of a `YXZ` rotation whose -Z axis points along `direction`.
pub fn yaw_pitch_from_direction(direction: Vec3) -> (f32, f32) {
    let dir = direction.normalize_or(Vec3::NEG_Z);
    let pitch = dir.y.clamp(-1.0, 1.0).asin();
    let yaw = (-dir.x).atan2(-dir.z);
    (yaw, pitch)
}

pub fn camera_controller(
    mut camera_query: Query<&mut Transform, With<Camera3d>>,
    mut maps_camera: ResMut<ViewportCamera>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    mut mouse_motion: EventReader<MouseMotion>,
    mut scroll_events: EventReader<MouseWheel>,
    mut cursor_moved: EventReader<CursorMoved>,
    keyboard: Res<ButtonInput<KeyCode>>,
    time: Res<Time>,
) {
    let Ok(mut camera_transform) = camera_query.single_mut() else {
        return;
    };

    for cursor in cursor_moved.read() {
        maps_camera.last_mouse_pos = cursor.position;
    }
    let mouse_delta: Vec2 = mouse_motion.read().map(|m| m.delta).sum();
    let scroll_accum: f32 = scroll_events
        .read()
        .map(|ev| match ev.unit {
            MouseScrollUnit::Line => ev.y,
            MouseScrollUnit::Pixel => ev.y * 0.05,
        })
        .sum();

    if maps_camera.suspended {
        return;
    }

    // Right drag looks around
    if mouse_button.pressed(MouseButton::Right) && mouse_delta != Vec2::ZERO {
        maps_camera.yaw -= mouse_delta.x * 0.0035;
        maps_camera.pitch -= mouse_delta.y * 0.0030;
        maps_camera.pitch = maps_camera.pitch.clamp(-1.55, 1.55);
    }

    let view_rot = maps_camera.view_rotation();
    let forward = (view_rot * Vec3::NEG_Z).normalize();
    let right = (view_rot * Vec3::X).normalize();

    if scroll_accum.abs() > f32::EPSILON {
        let dolly_speed = (maps_camera.height * 0.2).clamp(0.5, 5000.0);
        maps_camera.focus_point += forward * scroll_accum * dolly_speed;
    }

    let mut move_input = Vec3::ZERO;
    if keyboard.pressed(KeyCode::KeyW) {
        move_input.z += 1.0;
    }
    if keyboard.pressed(KeyCode::KeyS) {
        move_input.z -= 1.0;
    }
    if keyboard.pressed(KeyCode::KeyD) {
        move_input.x += 1.0;
    }
    if keyboard.pressed(KeyCode::KeyA) {
        move_input.x -= 1.0;
    }
    if keyboard.pressed(KeyCode::KeyE) {
        move_input.y += 1.0;
    }
    if keyboard.pressed(KeyCode::KeyQ) {
        move_input.y -= 1.0;
    }

    if move_input != Vec3::ZERO {
        // Shift = faster, ctrl = slower
        let mut speed = maps_camera.height.clamp(2.0, 2000.0);
        if keyboard.any_pressed([KeyCode::ShiftLeft, KeyCode::ShiftRight]) {
            speed *= 3.5;
        }
        if keyboard.any_pressed([KeyCode::ControlLeft, KeyCode::ControlRight]) {
            speed *= 0.25;
        }

        let world_delta = right * move_input.x + Vec3::Y * move_input.y + forward * move_input.z;
        maps_camera.focus_point += world_delta.normalize() * speed * time.delta_secs();
    }

    let lerp_speed = (12.0 * time.delta_secs()).min(1.0);
    camera_transform.translation = camera_transform
        .translation
        .lerp(maps_camera.focus_point, lerp_speed);
    camera_transform.rotation = camera_transform.rotation.slerp(view_rot, lerp_speed);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yaw_pitch_reproduce_direction() {
        let direction = Vec3::new(0.3, -0.4, -0.8).normalize();
        let (yaw, pitch) = yaw_pitch_from_direction(direction);
        let rebuilt = Quat::from_euler(EulerRot::YXZ, yaw, pitch, 0.0) * Vec3::NEG_Z;

        assert!(rebuilt.distance(direction) < 1e-5);
    }

    #[test]
    fn snap_adopts_transform_position() {
        let mut camera = ViewportCamera::default();
        let transform = Transform::from_xyz(5.0, 6.0, 7.0).looking_to(Vec3::X, Vec3::Y);

        camera.snap_to(&transform);

        assert_eq!(camera.focus_point, Vec3::new(5.0, 6.0, 7.0));
        assert!((camera.pitch).abs() < 1e-5);
    }

    #[test]
    fn focus_keeps_sphere_in_front() {
        let mut camera = ViewportCamera::default();
        let transform = camera.focus_on(Vec3::new(100.0, 0.0, 0.0), 20.0);

        let to_center = (Vec3::new(100.0, 0.0, 0.0) - transform.translation).normalize();
        assert!(to_center.dot(*transform.forward()) > 0.99);
        assert!((transform.translation.distance(Vec3::new(100.0, 0.0, 0.0)) - 50.0).abs() < 1e-3);
    }
}
