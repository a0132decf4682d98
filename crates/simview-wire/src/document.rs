//! Scene document records
//!
//! These records are the wire contract with the viewer. Field names and
//! nesting follow the document layout exactly; the model and state crates
//! convert their domain types into these records.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use simview_core::{AttributeKind, Shape};

/// Complete saved scene: model configuration plus recorded frames
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDocument {
    pub model: ModelRecord,
    pub states: Vec<StateRecord>,
}

/// Static scene configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelRecord {
    pub sim_batches: usize,
    pub scalar_names: Vec<String>,
    pub dt: f64,
    pub collapse: bool,
    pub terrain: TerrainRecord,
    pub bodies: Vec<BodyRecord>,
    pub static_objects: Vec<StaticObjectRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TerrainRecord {
    pub dimensions: TerrainDimensions,
    pub bounds: TerrainBounds,
    /// One flattened grid per stored batch element, row-major, x fastest
    pub height_data: Vec<Vec<f64>>,
    /// One list of per-cell normals per stored batch element
    pub normals: Vec<Vec<[f64; 3]>>,
    pub is_singleton: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TerrainDimensions {
    pub size_x: f64,
    pub size_y: f64,
    pub resolution_x: usize,
    pub resolution_y: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TerrainBounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
    pub min_z: f64,
    pub max_z: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BodyRecord {
    pub name: String,
    pub shape: Shape,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_attributes: Option<Vec<AttributeKind>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaticObjectRecord {
    pub name: String,
    pub is_singleton: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape: Option<Shape>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shapes: Option<Vec<Shape>>,
}

/// One recorded frame
///
/// Scalar channels are written as top-level keys next to `time` and
/// `bodies`, in declaration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateRecord {
    pub time: f64,
    pub bodies: Vec<BodyStateRecord>,
    #[serde(flatten)]
    pub scalars: ScalarChannels,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BodyStateRecord {
    pub name: String,
    /// Per batch element: position (x, y, z) then quaternion (w, x, y, z)
    pub body_transform: Vec<[f64; 7]>,
    #[serde(flatten)]
    pub attributes: AttributeRecords,
}

/// Normalized optional attributes of one body in one frame
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeRecords {
    /// Active contact indices per batch element
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contacts: Option<Vec<Vec<usize>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub velocity: Option<Nested>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub angular_velocity: Option<Nested>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub force: Option<Nested>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub torque: Option<Nested>,
}

impl AttributeRecords {
    /// Slot for a vector-valued attribute kind; `None` for contacts
    pub fn vector_slot(&mut self, kind: AttributeKind) -> Option<&mut Option<Nested>> {
        match kind {
            AttributeKind::Contacts => None,
            AttributeKind::Velocity => Some(&mut self.velocity),
            AttributeKind::AngularVelocity => Some(&mut self.angular_velocity),
            AttributeKind::Force => Some(&mut self.force),
            AttributeKind::Torque => Some(&mut self.torque),
        }
    }

    /// Kinds present in this record
    pub fn kinds(&self) -> Vec<AttributeKind> {
        let present = [
            self.contacts.is_some(),
            self.velocity.is_some(),
            self.angular_velocity.is_some(),
            self.force.is_some(),
            self.torque.is_some(),
        ];
        AttributeKind::ALL
            .into_iter()
            .zip(present)
            .filter_map(|(kind, set)| set.then_some(kind))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds().is_empty()
    }
}

/// Numeric values with their natural nesting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Nested {
    Value(f64),
    List(Vec<Nested>),
}

impl Nested {
    /// Build nested lists from row-major values and a shape.
    ///
    /// The caller guarantees `values.len()` equals the product of `shape`.
    pub fn from_shape(shape: &[usize], values: &[f64]) -> Nested {
        match shape.split_first() {
            None => Nested::Value(values.first().copied().unwrap_or_default()),
            Some((&len, rest)) => {
                let stride: usize = rest.iter().product();
                Nested::List(
                    (0..len)
                        .map(|i| Nested::from_shape(rest, &values[i * stride..(i + 1) * stride]))
                        .collect(),
                )
            }
        }
    }

    /// Number of entries at the outermost level
    pub fn len(&self) -> usize {
        match self {
            Nested::Value(_) => 1,
            Nested::List(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Nested::List(items) if items.is_empty())
    }

    /// All leaf values in row-major order
    pub fn flatten(&self) -> Vec<f64> {
        let mut out = Vec::new();
        self.flatten_into(&mut out);
        out
    }

    fn flatten_into(&self, out: &mut Vec<f64>) {
        match self {
            Nested::Value(v) => out.push(*v),
            Nested::List(items) => items.iter().for_each(|item| item.flatten_into(out)),
        }
    }
}

/// Scalar channel values of one frame, in declaration order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScalarChannels(pub Vec<(String, Vec<f64>)>);

impl ScalarChannels {
    pub fn get(&self, name: &str) -> Option<&[f64]> {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, values)| values.as_slice())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(name, _)| name.as_str())
    }
}

impl Serialize for ScalarChannels {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, values) in &self.0 {
            map.serialize_entry(name, values)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ScalarChannels {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ChannelsVisitor;

        impl<'de> Visitor<'de> for ChannelsVisitor {
            type Value = ScalarChannels;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of scalar channel name to per-batch values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut channels = Vec::new();
                while let Some((name, values)) = access.next_entry::<String, Vec<f64>>()? {
                    channels.push((name, values));
                }
                Ok(ScalarChannels(channels))
            }
        }

        deserializer.deserialize_map(ChannelsVisitor)
    }
}
