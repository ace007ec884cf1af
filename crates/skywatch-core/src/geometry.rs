//! Sensor-relative angle math.
//!
//! All angles returned here are in degrees. Bearings are measured clockwise
//! from the body's forward axis in the horizontal plane.

use glam::DVec3;

use crate::types::{Orientation, Pose, Position};

/// Forward axis flattened onto the horizontal plane.
fn horizontal_forward(orientation: &Orientation) -> DVec3 {
    let (sh, ch) = orientation.heading.sin_cos();
    DVec3::new(sh, ch, 0.0)
}

fn horizontal(v: DVec3) -> DVec3 {
    DVec3::new(v.x, v.y, 0.0)
}

/// Azimuth of a relative position, in [0, 360).
///
/// The arccosine gives the unsigned angle off the nose; the sign of the
/// right-axis projection decides which side it lies on.
pub fn bearing_of(orientation: &Orientation, relative: DVec3) -> f64 {
    let flat = horizontal(relative);
    if flat.length_squared() == 0.0 {
        return 0.0;
    }
    let cos = horizontal_forward(orientation)
        .dot(flat.normalize())
        .clamp(-1.0, 1.0);
    let mut angle = cos.acos().to_degrees();
    if orientation.right().dot(relative) < 0.0 {
        angle = 360.0 - angle;
    }
    angle.rem_euclid(360.0)
}

/// Elevation of a relative position above the horizontal plane, in degrees.
pub fn elevation_of(relative: DVec3) -> f64 {
    let horizontal_distance = horizontal(relative).length();
    relative.z.atan2(horizontal_distance).to_degrees()
}

/// Unsigned angle between the boresight and `relative`, in [0, 180].
pub fn angle_off_boresight(orientation: &Orientation, relative: DVec3) -> f64 {
    let direction = relative.normalize_or_zero();
    if direction == DVec3::ZERO {
        return 0.0;
    }
    orientation
        .forward()
        .dot(direction)
        .clamp(-1.0, 1.0)
        .acos()
        .to_degrees()
}

/// Signed horizontal bearing of `toward` as seen from `observer`, in [0, 360).
pub fn relative_angle(observer: &Pose, toward: &Position) -> f64 {
    let direction = horizontal(observer.position.vector_to(toward)).normalize_or_zero();
    let forward_dot = horizontal_forward(&observer.orientation).dot(direction);
    let right_dot = observer.orientation.right().dot(direction);
    right_dot.atan2(forward_dot).to_degrees().rem_euclid(360.0)
}
