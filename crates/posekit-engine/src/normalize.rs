//! [`Normalizer`] – canonical-pose normalization.
//!
//! Fills every missing field of a partial pose with its documented default
//! (`0.0` for position and orientation components, [`MAP_FRAME`] for the
//! frame) and interprets flat coordinate sequences of length 3, 6 and 7.
//! The 6-element path needs the Euler→quaternion conversion and is gated on
//! the orientation-conversion capability.

use posekit_types::{Capabilities, Capability, MAP_FRAME, Pose, PoseError, PoseFields, PoseRef};

use crate::convert::quaternion_from_euler;

/// Converts loosely-typed pose references into canonical [`Pose`] values.
///
/// Normalization is idempotent: a canonical pose fed back through the
/// normalizer comes out identical.
#[derive(Debug, Clone, Copy)]
pub struct Normalizer {
    caps: Capabilities,
}

impl Normalizer {
    pub fn new(caps: Capabilities) -> Self {
        Self { caps }
    }

    /// Normalize a literal pose reference.
    ///
    /// Symbolic references (`Name`, `EntityPart`) have no literal
    /// coordinates and are rejected as malformed; they must go through the
    /// resolver instead.
    pub fn normalize(&self, raw: &PoseRef) -> Result<Pose, PoseError> {
        match raw {
            PoseRef::Fields(fields) => Ok(Self::from_fields(fields)),
            PoseRef::Coords(coords) => self.from_coords(coords),
            symbolic @ (PoseRef::Name(_) | PoseRef::EntityPart { .. }) => {
                Err(PoseError::MalformedPose(format!(
                    "cannot normalize symbolic reference '{symbolic}', resolve it first"
                )))
            }
        }
    }

    fn from_fields(fields: &PoseFields) -> Pose {
        Pose {
            x: fields.x.unwrap_or(0.0),
            y: fields.y.unwrap_or(0.0),
            z: fields.z.unwrap_or(0.0),
            qx: fields.qx.unwrap_or(0.0),
            qy: fields.qy.unwrap_or(0.0),
            qz: fields.qz.unwrap_or(0.0),
            qw: fields.qw.unwrap_or(0.0),
            frame: fields.frame.clone().unwrap_or_else(|| MAP_FRAME.to_string()),
        }
    }

    fn from_coords(&self, coords: &[f64]) -> Result<Pose, PoseError> {
        match *coords {
            [x, y, z] => Ok(Pose {
                x,
                y,
                z,
                ..Pose::default()
            }),
            [x, y, z, roll, pitch, yaw] => {
                if !self.caps.orientation_conversion {
                    return Err(PoseError::CapabilityUnavailable(
                        Capability::OrientationConversion,
                    ));
                }
                let [qx, qy, qz, qw] = quaternion_from_euler(roll, pitch, yaw);
                Ok(Pose {
                    x,
                    y,
                    z,
                    qx,
                    qy,
                    qz,
                    qw,
                    frame: MAP_FRAME.to_string(),
                })
            }
            [x, y, z, qx, qy, qz, qw] => Ok(Pose {
                x,
                y,
                z,
                qx,
                qy,
                qz,
                qw,
                frame: MAP_FRAME.to_string(),
            }),
            _ => Err(PoseError::MalformedPose(format!(
                "coordinate sequence must have 3, 6 or 7 elements, got {}",
                coords.len()
            ))),
        }
    }
}
