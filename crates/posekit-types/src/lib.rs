use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

/// The canonical reference frame every resolved pose is ultimately
/// expressed in.
pub const MAP_FRAME: &str = "map";

/// The frame attached to the robot base (used by
/// `PoseResolver::base_pose`).
pub const BASE_FRAME: &str = "base_link";

/// A fully-specified pose: cartesian position in metres plus an orientation
/// quaternion, interpreted in a named reference frame.
///
/// Every field is guaranteed present once a pose has been through the
/// normalizer: absent position and orientation components default to `0.0`
/// and an absent frame defaults to [`MAP_FRAME`].
///
/// The quaternion is **not** renormalized to unit length anywhere in this
/// workspace. Callers must not assume |q| = 1 unless the source backend
/// guarantees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub qx: f64,
    pub qy: f64,
    pub qz: f64,
    pub qw: f64,
    pub frame: String,
}

impl Pose {
    /// The planar projection of the position, used by zone queries.
    pub fn xy(&self) -> (f64, f64) {
        (self.x, self.y)
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
            qx: 0.0,
            qy: 0.0,
            qz: 0.0,
            qw: 0.0,
            frame: MAP_FRAME.to_string(),
        }
    }
}

/// A partial pose: any subset of the [`Pose`] fields. Missing fields take
/// the documented defaults during normalization.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PoseFields {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub z: Option<f64>,
    pub qx: Option<f64>,
    pub qy: Option<f64>,
    pub qz: Option<f64>,
    pub qw: Option<f64>,
    pub frame: Option<String>,
}

/// A loosely-typed pose reference, as handed over by the action layer.
///
/// Symbolic variants (`Name`, `EntityPart`) are resolved against the place
/// registry and the live backends; literal variants (`Coords`, `Fields`)
/// go straight to the normalizer.
#[derive(Debug, Clone, PartialEq)]
pub enum PoseRef {
    /// A symbolic place name, a transform frame, or a tracked entity.
    Name(String),
    /// A tracked entity qualified by a sub-part (e.g. a human's pelvis).
    EntityPart { entity: String, part: String },
    /// A flat coordinate sequence: (x,y,z), (x,y,z,roll,pitch,yaw) or
    /// (x,y,z,qx,qy,qz,qw). Any other length is malformed.
    Coords(Vec<f64>),
    /// A partial field mapping.
    Fields(PoseFields),
}

impl PoseRef {
    pub fn name(name: impl Into<String>) -> Self {
        Self::Name(name.into())
    }

    pub fn entity_part(entity: impl Into<String>, part: impl Into<String>) -> Self {
        Self::EntityPart {
            entity: entity.into(),
            part: part.into(),
        }
    }

    /// Parse an untyped JSON value into a pose reference.
    ///
    /// Accepts a string (symbolic name), a two-string array (entity/part
    /// pair), an array of numbers (coordinate sequence) and an object with
    /// any subset of the pose fields. Numeric fields tolerate string-encoded
    /// numbers; anything else fails with [`PoseError::MalformedPose`].
    pub fn from_json(value: &Value) -> Result<Self, PoseError> {
        match value {
            Value::String(name) => Ok(Self::Name(name.clone())),
            Value::Array(items) => Self::from_json_array(items),
            Value::Object(map) => {
                let mut fields = PoseFields::default();
                for (key, field) in map {
                    match key.as_str() {
                        "x" => fields.x = Some(coerce_number(key, field)?),
                        "y" => fields.y = Some(coerce_number(key, field)?),
                        "z" => fields.z = Some(coerce_number(key, field)?),
                        "qx" => fields.qx = Some(coerce_number(key, field)?),
                        "qy" => fields.qy = Some(coerce_number(key, field)?),
                        "qz" => fields.qz = Some(coerce_number(key, field)?),
                        "qw" => fields.qw = Some(coerce_number(key, field)?),
                        "frame" => match field {
                            Value::String(frame) => fields.frame = Some(frame.clone()),
                            other => {
                                return Err(PoseError::MalformedPose(format!(
                                    "frame must be a string, got {other}"
                                )));
                            }
                        },
                        // Unknown keys are carried by the action layer for
                        // its own purposes and ignored here.
                        _ => {}
                    }
                }
                Ok(Self::Fields(fields))
            }
            other => Err(PoseError::MalformedPose(format!(
                "expected a name, sequence or field mapping, got {other}"
            ))),
        }
    }

    fn from_json_array(items: &[Value]) -> Result<Self, PoseError> {
        if let [Value::String(entity), Value::String(part)] = items {
            return Ok(Self::entity_part(entity.clone(), part.clone()));
        }
        let coords = items
            .iter()
            .map(|item| coerce_number("sequence element", item))
            .collect::<Result<Vec<f64>, PoseError>>()?;
        Ok(Self::Coords(coords))
    }
}

impl fmt::Display for PoseRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => write!(f, "{name}"),
            Self::EntityPart { entity, part } => write!(f, "{entity}/{part}"),
            Self::Coords(coords) => write!(f, "{coords:?}"),
            Self::Fields(fields) => write!(f, "{fields:?}"),
        }
    }
}

fn coerce_number(key: &str, value: &Value) -> Result<f64, PoseError> {
    match value {
        Value::Number(n) => n.as_f64().ok_or_else(|| {
            PoseError::MalformedPose(format!("field '{key}' is not representable as f64"))
        }),
        Value::String(s) => s.parse::<f64>().map_err(|_| {
            PoseError::MalformedPose(format!("field '{key}' is not numeric: '{s}'"))
        }),
        other => Err(PoseError::MalformedPose(format!(
            "field '{key}' must be numeric, got {other}"
        ))),
    }
}

/// A fixed, construction-time availability flag for an optional backend or
/// conversion.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Capability {
    /// A live transform tree can be queried for frame poses.
    TransformBackend,
    /// An external vision/tracking subsystem can be queried for entity poses.
    TrackingBackend,
    /// Conversions between Euler angles and quaternions are available.
    OrientationConversion,
    /// A named host module (e.g. a specific middleware component) is loaded.
    Module(String),
}

/// Answers boolean availability queries for [`Capability`] values.
///
/// Consulted exactly once, at resolver construction time; capabilities never
/// change during a session.
pub trait CapabilityProbe {
    fn has(&self, cap: &Capability) -> bool;
}

/// A probe backed by an explicit grant set, for hosts that know their
/// capabilities up front (and for tests).
#[derive(Debug, Clone, Default)]
pub struct FixedProbe {
    grants: HashSet<Capability>,
}

impl FixedProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grant(mut self, cap: Capability) -> Self {
        self.grants.insert(cap);
        self
    }
}

impl CapabilityProbe for FixedProbe {
    fn has(&self, cap: &Capability) -> bool {
        self.grants.contains(cap)
    }
}

/// The capability snapshot a resolver holds for its whole lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    pub transform: bool,
    pub tracking: bool,
    pub orientation_conversion: bool,
}

impl Capabilities {
    /// Evaluate the probe once and freeze the result.
    pub fn probe(probe: &dyn CapabilityProbe) -> Self {
        Self {
            transform: probe.has(&Capability::TransformBackend),
            tracking: probe.has(&Capability::TrackingBackend),
            orientation_conversion: probe.has(&Capability::OrientationConversion),
        }
    }

    pub fn all() -> Self {
        Self {
            transform: true,
            tracking: true,
            orientation_conversion: true,
        }
    }

    pub fn none() -> Self {
        Self::default()
    }
}

/// Errors surfaced by the pose subsystem.
///
/// Backend-level misses (unknown frame, tracking miss) never appear here:
/// they are swallowed as "try the next strategy" and only exhaustion of the
/// whole chain becomes [`PoseError::UnresolvedReference`].
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PoseError {
    #[error("malformed pose reference: {0}")]
    MalformedPose(String),

    #[error("capability unavailable: {0:?}")]
    CapabilityUnavailable(Capability),

    #[error("unresolved pose reference '{0}'")]
    UnresolvedReference(String),
}

/// A read query to the external tracking subsystem.
///
/// This is the same request envelope the action-dispatch layer uses for
/// motion commands, reused here purely for reads. The payload is opaque to
/// this workspace: a target module, a request name and positional string
/// arguments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingRequest {
    pub id: Uuid,
    pub issued_at: DateTime<Utc>,
    pub module: String,
    pub request: String,
    pub args: Vec<String>,
}

impl TrackingRequest {
    pub fn new(
        module: impl Into<String>,
        request: impl Into<String>,
        args: Vec<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            issued_at: Utc::now(),
            module: module.into(),
            request: request.into(),
            args,
        }
    }
}

/// The reply half of the tracking request channel: a success flag and a
/// flat float payload (six values for pose queries).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingReply {
    pub ok: bool,
    pub payload: Vec<f64>,
}
