//! Optional per-frame body attributes
//!
//! The set of attribute kinds is closed. A body declares the subset it
//! reports, and every frame entry for that body may carry only those kinds.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::SceneError;

/// Optional body state attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AttributeKind {
    /// Active contact point indices
    Contacts,
    Velocity,
    AngularVelocity,
    Force,
    Torque,
}

impl AttributeKind {
    pub const ALL: [AttributeKind; 5] = [
        AttributeKind::Contacts,
        AttributeKind::Velocity,
        AttributeKind::AngularVelocity,
        AttributeKind::Force,
        AttributeKind::Torque,
    ];

    /// Key used in the wire document
    pub fn wire_name(self) -> &'static str {
        match self {
            AttributeKind::Contacts => "contacts",
            AttributeKind::Velocity => "velocity",
            AttributeKind::AngularVelocity => "angularVelocity",
            AttributeKind::Force => "force",
            AttributeKind::Torque => "torque",
        }
    }
}

impl fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

impl FromStr for AttributeKind {
    type Err = SceneError;

    /// Accepts the wire name and the snake_case spelling
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "contacts" => Ok(AttributeKind::Contacts),
            "velocity" => Ok(AttributeKind::Velocity),
            "angularVelocity" | "angular_velocity" => Ok(AttributeKind::AngularVelocity),
            "force" => Ok(AttributeKind::Force),
            "torque" => Ok(AttributeKind::Torque),
            other => Err(SceneError::UnknownAttribute(other.to_string())),
        }
    }
}
