//! Scene and save configuration

use crate::{SceneError, SceneResult};

/// Frame keys that a scalar channel may not shadow
pub const RESERVED_FRAME_KEYS: [&str; 2] = ["time", "bodies"];

/// Static scene configuration, fixed at model creation
#[derive(Clone, Debug, PartialEq)]
pub struct SceneConfig {
    /// Number of parallel simulation instances
    pub batch_size: usize,
    /// Declared scalar channels, in declaration order
    pub scalar_names: Vec<String>,
    /// Simulation time step
    pub dt: f64,
    /// Viewer hint: collapse batch elements into one view
    pub collapse: bool,
}

impl Default for SceneConfig {
    fn default() -> Self {
        SceneConfig {
            batch_size: 1,
            scalar_names: Vec::new(),
            dt: 0.01,
            collapse: false,
        }
    }
}

impl SceneConfig {
    pub fn new<I, S>(batch_size: usize, scalar_names: I, dt: f64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        SceneConfig {
            batch_size,
            scalar_names: scalar_names.into_iter().map(Into::into).collect(),
            dt,
            collapse: false,
        }
    }

    pub fn with_collapse(mut self, collapse: bool) -> Self {
        self.collapse = collapse;
        self
    }

    pub fn with_dt(mut self, dt: f64) -> Self {
        self.dt = dt;
        self
    }

    /// Check batch size, time step and scalar channel names
    pub fn validate(&self) -> SceneResult<()> {
        if self.batch_size == 0 {
            return Err(SceneError::InvalidBatchSize(self.batch_size));
        }
        SceneError::check_finite(|| "dt".into(), [&self.dt])?;

        for (i, name) in self.scalar_names.iter().enumerate() {
            if RESERVED_FRAME_KEYS.contains(&name.as_str()) {
                return Err(SceneError::ReservedScalarName(name.clone()));
            }
            if self.scalar_names[..i].contains(name) {
                return Err(SceneError::DuplicateScalarName(name.clone()));
            }
        }

        Ok(())
    }
}

/// How a scene document is written to disk
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SaveOptions {
    /// Write to a sibling temporary file, then rename over the target
    pub atomic: bool,
    /// Create missing parent directories
    pub create_dirs: bool,
    /// Indented JSON output
    pub pretty: bool,
}

impl Default for SaveOptions {
    fn default() -> Self {
        SaveOptions {
            atomic: true,
            create_dirs: true,
            pretty: false,
        }
    }
}

impl SaveOptions {
    /// Compact single-line output (default)
    pub fn compact() -> Self {
        Self::default()
    }

    /// Indented output, for inspecting documents by hand
    pub fn pretty() -> Self {
        SaveOptions {
            pretty: true,
            ..Self::default()
        }
    }

    /// Single direct write, no temporary file
    pub fn direct() -> Self {
        SaveOptions {
            atomic: false,
            ..Self::default()
        }
    }
}
