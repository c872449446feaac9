//! Conversions between Euler angles and quaternions.
//!
//! Both directions use the sxyz convention: static (extrinsic) rotations
//! about the fixed x, y and z axes applied in that order, so the rotation
//! matrix is `Rz(yaw) · Ry(pitch) · Rx(roll)`. Quaternion components are
//! returned in `(qx, qy, qz, qw)` order, matching [`posekit_types::Pose`].

/// Build a quaternion from roll/pitch/yaw angles in radians.
pub fn quaternion_from_euler(roll: f64, pitch: f64, yaw: f64) -> [f64; 4] {
    let (sx, cx) = (roll / 2.0).sin_cos();
    let (sy, cy) = (pitch / 2.0).sin_cos();
    let (sz, cz) = (yaw / 2.0).sin_cos();

    [
        sx * cy * cz - cx * sy * sz,
        cx * sy * cz + sx * cy * sz,
        cx * cy * sz - sx * sy * cz,
        cx * cy * cz + sx * sy * sz,
    ]
}

/// Recover roll/pitch/yaw angles in radians from a quaternion.
///
/// Pitch is clamped into the valid `asin` domain so slightly non-unit
/// quaternions near gimbal lock do not produce NaN.
pub fn euler_from_quaternion(qx: f64, qy: f64, qz: f64, qw: f64) -> [f64; 3] {
    let roll = (2.0 * (qw * qx + qy * qz)).atan2(1.0 - 2.0 * (qx * qx + qy * qy));
    let pitch = (2.0 * (qw * qy - qz * qx)).clamp(-1.0, 1.0).asin();
    let yaw = (2.0 * (qw * qz + qx * qy)).atan2(1.0 - 2.0 * (qy * qy + qz * qz));
    [roll, pitch, yaw]
}
