//! Shared orientation math
//!
//! The world is a 2.5D side-scroller: X is horizontal travel, Y is up,
//! negative Z points at the camera. Creatures lean slightly toward the
//! camera so their silhouette reads well, hence the depth bias constant.

use glam::{Mat3, Quat, Vec3};
use std::f32::consts::{PI, TAU};

/// Small toward-camera lean mixed into facing directions.
pub const DEPTH_BIAS: Vec3 = Vec3::new(0.0, 0.0, -0.1);

/// Build a rotation whose forward axis is `forward` and whose up axis is as
/// close to `up` as the forward constraint allows.
pub fn look_rotation(forward: Vec3, up: Vec3) -> Quat {
    let f = forward.normalize_or_zero();
    if f == Vec3::ZERO {
        return Quat::IDENTITY;
    }
    let mut right = up.cross(f);
    if right.length_squared() < 1e-8 {
        // up and forward collinear, pick any perpendicular frame
        right = Vec3::Y.cross(f);
        if right.length_squared() < 1e-8 {
            right = Vec3::X.cross(f);
        }
    }
    let right = right.normalize();
    let up = f.cross(right);
    Quat::from_mat3(&Mat3::from_cols(right, up, f))
}

/// Rotate `from` toward `to` by at most `max_radians`.
pub fn rotate_towards(from: Quat, to: Quat, max_radians: f32) -> Quat {
    let angle = from.angle_between(to);
    if angle <= 1e-6 {
        return to;
    }
    from.slerp(to, (max_radians / angle).min(1.0))
}

/// Angular velocity that blends `current` toward `target` at up to
/// `speed_deg` degrees per second. Used when the host engine owns rotation
/// integration instead of the controller.
pub fn angular_velocity_for_blend(current: Quat, target: Quat, speed_deg: f32) -> Vec3 {
    let delta = target * current.inverse();
    let (axis, mut angle) = delta.to_axis_angle();
    if angle > PI {
        angle -= TAU;
    }
    if angle.abs() < 1e-6 {
        return Vec3::ZERO;
    }
    let max = speed_deg.to_radians();
    axis * angle.clamp(-max, max)
}

/// Signed heading of a direction within the XY travel plane, radians,
/// measured from world-right.
pub fn heading_angle(direction: Vec3) -> f32 {
    direction.y.atan2(direction.x)
}
