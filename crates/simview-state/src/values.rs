//! Optional attribute values

use simview_core::{AttributeKind, SceneError, SceneResult};
use simview_wire::Nested;

use crate::ContactInput;

/// Dense row-major numeric array
#[derive(Debug, Clone, PartialEq)]
pub struct NumericArray {
    pub shape: Vec<usize>,
    pub values: Vec<f64>,
}

impl NumericArray {
    pub fn new(shape: Vec<usize>, values: Vec<f64>) -> Self {
        NumericArray { shape, values }
    }

    /// `[rows.len(), 3]` array from 3-vectors
    pub fn from_vectors(rows: &[[f64; 3]]) -> Self {
        NumericArray {
            shape: vec![rows.len(), 3],
            values: rows.iter().flatten().copied().collect(),
        }
    }
}

/// Value of a vector attribute (velocity, angular velocity, force, torque)
#[derive(Debug, Clone, PartialEq)]
pub enum VectorInput {
    Array(NumericArray),
    /// Already nested, one entry per batch element
    Nested(Nested),
}

impl From<NumericArray> for VectorInput {
    fn from(array: NumericArray) -> Self {
        VectorInput::Array(array)
    }
}

impl From<Vec<[f64; 3]>> for VectorInput {
    fn from(rows: Vec<[f64; 3]>) -> Self {
        VectorInput::Array(NumericArray::from_vectors(&rows))
    }
}

impl VectorInput {
    fn into_nested(self, kind: AttributeKind) -> SceneResult<Nested> {
        let invalid = |reason: String| SceneError::InvalidAttributeFormat {
            attribute: kind.wire_name(),
            reason,
        };

        match self {
            VectorInput::Array(NumericArray { shape, values }) => {
                if shape.is_empty() {
                    return Err(invalid("scalar value, expected one entry per batch element".into()));
                }
                let expected: usize = shape.iter().product();
                if expected != values.len() {
                    return Err(invalid(format!(
                        "shape {shape:?} needs {expected} values, got {}",
                        values.len()
                    )));
                }
                SceneError::check_finite(|| kind.wire_name().to_string(), &values)?;
                Ok(Nested::from_shape(&shape, &values))
            }
            VectorInput::Nested(Nested::Value(_)) => {
                Err(invalid("scalar value, expected one entry per batch element".into()))
            }
            VectorInput::Nested(nested) => {
                SceneError::check_finite(|| kind.wire_name().to_string(), &nested.flatten())?;
                Ok(nested)
            }
        }
    }
}

/// Value of one optional attribute
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Contacts(ContactInput),
    Vector(VectorInput),
}

impl From<ContactInput> for AttributeValue {
    fn from(contacts: ContactInput) -> Self {
        AttributeValue::Contacts(contacts)
    }
}

impl From<VectorInput> for AttributeValue {
    fn from(value: VectorInput) -> Self {
        AttributeValue::Vector(value)
    }
}

impl From<NumericArray> for AttributeValue {
    fn from(array: NumericArray) -> Self {
        AttributeValue::Vector(VectorInput::Array(array))
    }
}

impl From<Vec<[f64; 3]>> for AttributeValue {
    fn from(rows: Vec<[f64; 3]>) -> Self {
        AttributeValue::Vector(rows.into())
    }
}

/// Attribute normalized for the wire record
#[derive(Debug, Clone, PartialEq)]
pub enum Normalized {
    Contacts(Vec<Vec<usize>>),
    Vector(Nested),
}

impl Normalized {
    /// Number of batch elements covered
    pub fn batch_len(&self) -> usize {
        match self {
            Normalized::Contacts(rows) => rows.len(),
            Normalized::Vector(nested) => nested.len(),
        }
    }
}

/// Normalize `value` as attribute `kind`
pub fn normalize_attribute(kind: AttributeKind, value: AttributeValue) -> SceneResult<Normalized> {
    match (kind, value) {
        (AttributeKind::Contacts, AttributeValue::Contacts(contacts)) => {
            contacts.normalize().map(Normalized::Contacts)
        }
        (
            AttributeKind::Velocity
            | AttributeKind::AngularVelocity
            | AttributeKind::Force
            | AttributeKind::Torque,
            AttributeValue::Vector(value),
        ) => value.into_nested(kind).map(Normalized::Vector),
        (AttributeKind::Contacts, AttributeValue::Vector(_)) => {
            Err(SceneError::InvalidAttributeFormat {
                attribute: kind.wire_name(),
                reason: "expected a contact mask or index list".into(),
            })
        }
        (_, AttributeValue::Contacts(_)) => Err(SceneError::InvalidAttributeFormat {
            attribute: kind.wire_name(),
            reason: "expected numeric values".into(),
        }),
    }
}
