//! Dynamic bodies

use simview_core::{AttributeKind, SceneError, SceneResult, Shape};
use simview_wire::BodyRecord;

/// A named dynamic body whose transform is recorded every frame
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    name: String,
    shape: Shape,
    available_attributes: Option<Vec<AttributeKind>>,
}

impl Body {
    pub fn new(name: impl Into<String>, shape: Shape) -> Self {
        Body {
            name: name.into(),
            shape,
            available_attributes: None,
        }
    }

    /// Body that reports the given optional attributes
    pub fn with_attributes<I>(name: impl Into<String>, shape: Shape, kinds: I) -> Self
    where
        I: IntoIterator<Item = AttributeKind>,
    {
        Body {
            name: name.into(),
            shape,
            available_attributes: Some(dedup(kinds)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn available_attributes(&self) -> Option<&[AttributeKind]> {
        self.available_attributes.as_deref()
    }

    /// Declare the optional attributes this body reports. Allowed once.
    pub fn set_available_attributes<I>(&mut self, kinds: I) -> SceneResult<()>
    where
        I: IntoIterator<Item = AttributeKind>,
    {
        if self.available_attributes.is_some() {
            return Err(SceneError::AttributesAlreadySet(self.name.clone()));
        }
        self.available_attributes = Some(dedup(kinds));
        Ok(())
    }

    /// Same as [`Body::set_available_attributes`] with attribute names
    pub fn set_available_attribute_names<I, S>(&mut self, names: I) -> SceneResult<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let kinds = names
            .into_iter()
            .map(|name| name.as_ref().parse::<AttributeKind>())
            .collect::<SceneResult<Vec<_>>>()?;
        self.set_available_attributes(kinds)
    }

    /// Whether frames may carry `kind` for this body
    pub fn declares(&self, kind: AttributeKind) -> bool {
        self.available_attributes
            .as_ref()
            .is_some_and(|kinds| kinds.contains(&kind))
    }

    pub fn to_record(&self) -> BodyRecord {
        BodyRecord {
            name: self.name.clone(),
            shape: self.shape.clone(),
            available_attributes: self.available_attributes.clone(),
        }
    }
}

fn dedup<I: IntoIterator<Item = AttributeKind>>(kinds: I) -> Vec<AttributeKind> {
    let mut out = Vec::new();
    for kind in kinds {
        if !out.contains(&kind) {
            out.push(kind);
        }
    }
    out
}
