//! Body state recorder
//!
//! Validates each frame against the scene model and appends it to an
//! append-only timeline. A frame that fails validation leaves the timeline
//! untouched.

use std::collections::{HashMap, HashSet};

use simview_core::{AttributeKind, SceneError, SceneResult};
use simview_model::SceneModel;
use simview_wire::{AttributeRecords, ScalarChannels, StateRecord};

use crate::{
    normalize_attribute, AttributeKey, AttributeValue, BodyFrame, BodyTransform, Frame, Normalized,
};

/// Append-only frame timeline
#[derive(Debug, Clone, Default)]
pub struct BodyStateRecorder {
    frames: Vec<Frame>,
}

impl BodyStateRecorder {
    pub fn new() -> Self {
        BodyStateRecorder::default()
    }

    /// Validate and append one frame
    pub fn add_state<I, K>(
        &mut self,
        model: &SceneModel,
        time: f64,
        transforms: Vec<BodyTransform>,
        scalars: I,
    ) -> SceneResult<()>
    where
        I: IntoIterator<Item = (K, Vec<f64>)>,
        K: Into<String>,
    {
        self.check_time(time)?;
        let batch_size = model.batch_size();
        let scalars = collect_scalars(model, scalars)?;

        let mut seen = HashSet::new();
        let mut bodies = Vec::with_capacity(transforms.len());
        for transform in transforms {
            if model.body(&transform.name).is_none() {
                return Err(SceneError::UnknownBody(transform.name));
            }
            if !seen.insert(transform.name.clone()) {
                return Err(SceneError::DuplicateBodyState(transform.name));
            }
            bodies.push(body_frame(model, batch_size, transform)?);
        }

        tracing::debug!(
            time,
            bodies = bodies.len(),
            frame = self.frames.len(),
            "frame recorded"
        );
        self.frames.push(Frame {
            time,
            bodies,
            scalars,
        });
        Ok(())
    }

    fn check_time(&self, time: f64) -> SceneResult<()> {
        let previous = self.last_time().unwrap_or(f64::NEG_INFINITY);
        if !time.is_finite() || time <= previous {
            return Err(SceneError::NonMonotonicTime { time, previous });
        }
        Ok(())
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn last_time(&self) -> Option<f64> {
        self.frames.last().map(|frame| frame.time)
    }

    /// Drop all frames
    pub fn clear(&mut self) {
        self.frames.clear();
    }

    pub fn to_records(&self) -> Vec<StateRecord> {
        self.frames.iter().map(Frame::to_record).collect()
    }
}

/// Check scalar keys and lengths, returning channels in declaration order
fn collect_scalars<I, K>(model: &SceneModel, scalars: I) -> SceneResult<ScalarChannels>
where
    I: IntoIterator<Item = (K, Vec<f64>)>,
    K: Into<String>,
{
    let mut supplied: HashMap<String, Vec<f64>> = HashMap::new();
    for (name, values) in scalars {
        let name: String = name.into();
        if supplied.contains_key(&name) {
            return Err(SceneError::DuplicateScalarKey(name));
        }
        supplied.insert(name, values);
    }

    let declared = model.scalar_names();
    let missing: Vec<String> = declared
        .iter()
        .filter(|name| !supplied.contains_key(*name))
        .cloned()
        .collect();
    let mut extra: Vec<String> = supplied
        .keys()
        .filter(|name| !declared.contains(*name))
        .cloned()
        .collect();
    if !missing.is_empty() || !extra.is_empty() {
        extra.sort();
        return Err(SceneError::ScalarKeyMismatch { missing, extra });
    }

    let mut channels = Vec::with_capacity(declared.len());
    for name in declared {
        let values = supplied.remove(name).unwrap_or_default();
        if values.len() != model.batch_size() {
            return Err(SceneError::batch_size(
                format!("scalar {name}"),
                model.batch_size(),
                values.len(),
            ));
        }
        SceneError::check_finite(|| format!("scalar {name}"), &values)?;
        channels.push((name.clone(), values));
    }
    Ok(ScalarChannels(channels))
}

fn body_frame(
    model: &SceneModel,
    batch_size: usize,
    transform: BodyTransform,
) -> SceneResult<BodyFrame> {
    if transform.positions.len() != batch_size {
        return Err(SceneError::batch_size(
            format!("{} positions", transform.name),
            batch_size,
            transform.positions.len(),
        ));
    }
    if transform.orientations.len() != batch_size {
        return Err(SceneError::batch_size(
            format!("{} orientations", transform.name),
            batch_size,
            transform.orientations.len(),
        ));
    }

    SceneError::check_finite(
        || format!("{} positions", transform.name),
        transform.positions.iter().flatten(),
    )?;
    SceneError::check_finite(
        || format!("{} orientations", transform.name),
        transform.orientations.iter().flatten(),
    )?;

    let transforms = transform.merged();
    let BodyTransform {
        name, attributes, ..
    } = transform;
    let records = body_attributes(model, &name, batch_size, attributes)?;

    Ok(BodyFrame {
        name,
        transforms,
        attributes: records,
    })
}

fn body_attributes(
    model: &SceneModel,
    name: &str,
    batch_size: usize,
    attributes: Vec<(AttributeKey, AttributeValue)>,
) -> SceneResult<AttributeRecords> {
    let mut records = AttributeRecords::default();
    if attributes.is_empty() {
        return Ok(records);
    }
    let body = model
        .body(name)
        .ok_or_else(|| SceneError::UnknownBody(name.to_string()))?;

    let mut given: HashSet<AttributeKind> = HashSet::new();
    for (key, value) in attributes {
        let kind = key.resolve()?;
        if !body.declares(kind) {
            return Err(SceneError::UndeclaredAttribute {
                body: name.to_string(),
                attribute: kind.wire_name(),
            });
        }
        if !given.insert(kind) {
            return Err(SceneError::InvalidAttributeFormat {
                attribute: kind.wire_name(),
                reason: format!("given twice for body {name}"),
            });
        }

        let normalized = normalize_attribute(kind, value)?;
        if normalized.batch_len() != batch_size {
            return Err(SceneError::batch_size(
                format!("{name} {kind}"),
                batch_size,
                normalized.batch_len(),
            ));
        }
        match normalized {
            Normalized::Contacts(indices) => records.contacts = Some(indices),
            Normalized::Vector(nested) => {
                if let Some(slot) = records.vector_slot(kind) {
                    *slot = Some(nested);
                }
            }
        }
    }
    Ok(records)
}
