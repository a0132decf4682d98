//! Recorded frames

use simview_wire::{AttributeRecords, BodyStateRecord, ScalarChannels, StateRecord};

/// One body in one frame, already normalized
#[derive(Debug, Clone, PartialEq)]
pub struct BodyFrame {
    pub name: String,
    /// Per batch element `[px, py, pz, qw, qx, qy, qz]`
    pub transforms: Vec<[f64; 7]>,
    pub attributes: AttributeRecords,
}

impl BodyFrame {
    pub fn to_record(&self) -> BodyStateRecord {
        BodyStateRecord {
            name: self.name.clone(),
            body_transform: self.transforms.clone(),
            attributes: self.attributes.clone(),
        }
    }
}

/// One timestep snapshot across all batch elements
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub time: f64,
    pub bodies: Vec<BodyFrame>,
    /// Scalar channels in declaration order
    pub scalars: ScalarChannels,
}

impl Frame {
    pub fn body(&self, name: &str) -> Option<&BodyFrame> {
        self.bodies.iter().find(|body| body.name == name)
    }

    pub fn scalar(&self, name: &str) -> Option<&[f64]> {
        self.scalars.get(name)
    }

    pub fn to_record(&self) -> StateRecord {
        StateRecord {
            time: self.time,
            bodies: self.bodies.iter().map(BodyFrame::to_record).collect(),
            scalars: self.scalars.clone(),
        }
    }
}
