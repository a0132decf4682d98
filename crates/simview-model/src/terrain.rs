//! Terrain - height field and surface normals shared by the batch
//!
//! Grids are linearized row-major with x varying fastest: the column index
//! grows with x, the row index grows with y. The viewer relies on this layout
//! bit for bit.

use simview_core::{BroadcastPolicy, SceneError, SceneResult};
use simview_wire::{TerrainBounds, TerrainDimensions, TerrainRecord};

/// Dense row-major grid with an explicit shape
#[derive(Debug, Clone, PartialEq)]
pub struct GridData {
    shape: Vec<usize>,
    values: Vec<f64>,
}

impl GridData {
    /// Wrap `values` laid out row-major according to `shape`
    pub fn new(shape: Vec<usize>, values: Vec<f64>) -> SceneResult<Self> {
        let expected: usize = shape.iter().product();
        if shape.is_empty() || expected != values.len() {
            return Err(SceneError::ShapeRankMismatch(format!(
                "grid of shape {:?} needs {} values, got {}",
                shape,
                expected,
                values.len()
            )));
        }
        Ok(GridData { shape, values })
    }

    /// Grid of the given shape with every value set to `value`
    pub fn filled(shape: Vec<usize>, value: f64) -> Self {
        let len = shape.iter().product();
        GridData {
            shape,
            values: vec![value; len],
        }
    }

    /// Single height grid from rows (`rows[y][x]`)
    pub fn from_rows(rows: &[Vec<f64>]) -> SceneResult<Self> {
        let cols = rows.first().map_or(0, Vec::len);
        if rows.iter().any(|row| row.len() != cols) {
            return Err(SceneError::ShapeRankMismatch(
                "height rows must all have the same length".into(),
            ));
        }
        GridData::new(vec![rows.len(), cols], rows.concat())
    }

    /// Channels-first normal grid (`[3, rows, cols]`) with one normal everywhere
    pub fn uniform_normals(rows: usize, cols: usize, normal: [f64; 3]) -> Self {
        let cells = rows * cols;
        let values = normal
            .iter()
            .flat_map(|&c| std::iter::repeat(c).take(cells))
            .collect();
        GridData {
            shape: vec![3, rows, cols],
            values,
        }
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn rank(&self) -> usize {
        self.shape.len()
    }
}

/// One terrain grid together with its resolved broadcast policy
#[derive(Debug, Clone, PartialEq)]
pub struct TerrainLayer<T> {
    policy: BroadcastPolicy,
    rows: Vec<Vec<T>>,
}

impl<T: Clone> TerrainLayer<T> {
    pub fn policy(&self) -> BroadcastPolicy {
        self.policy
    }

    /// Rows actually held in memory (one for a singleton layer)
    pub fn stored(&self) -> &[Vec<T>] {
        &self.rows
    }

    /// Flattened grid seen by batch element `index`
    pub fn row(&self, index: usize) -> Option<&[T]> {
        let row = match self.policy {
            BroadcastPolicy::Singleton => self.rows.first(),
            BroadcastPolicy::PerBatch => self.rows.get(index),
        };
        row.map(Vec::as_slice)
    }

    /// One row per batch element, repeating a singleton row
    fn expanded(&self, batch_size: usize) -> Vec<Vec<T>> {
        match self.policy {
            BroadcastPolicy::Singleton => vec![self.rows[0].clone(); batch_size],
            BroadcastPolicy::PerBatch => self.rows.clone(),
        }
    }
}

/// Batch-consistent terrain
#[derive(Debug, Clone, PartialEq)]
pub struct Terrain {
    batch_size: usize,
    x_range: (f64, f64),
    y_range: (f64, f64),
    min_z: f64,
    max_z: f64,
    resolution_x: usize,
    resolution_y: usize,
    heights: TerrainLayer<f64>,
    normals: TerrainLayer<[f64; 3]>,
    is_singleton: bool,
}

impl Terrain {
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn extent_x(&self) -> f64 {
        self.x_range.1 - self.x_range.0
    }

    pub fn extent_y(&self) -> f64 {
        self.y_range.1 - self.y_range.0
    }

    /// Grid columns (x direction)
    pub fn resolution_x(&self) -> usize {
        self.resolution_x
    }

    /// Grid rows (y direction)
    pub fn resolution_y(&self) -> usize {
        self.resolution_y
    }

    pub fn cell_count(&self) -> usize {
        self.resolution_x * self.resolution_y
    }

    /// Global height range over every supplied grid
    pub fn z_range(&self) -> (f64, f64) {
        (self.min_z, self.max_z)
    }

    pub fn heights(&self) -> &TerrainLayer<f64> {
        &self.heights
    }

    pub fn normals(&self) -> &TerrainLayer<[f64; 3]> {
        &self.normals
    }

    /// True when both the height and the normal grid are shared by all batch
    /// elements
    pub fn is_singleton(&self) -> bool {
        self.is_singleton
    }

    /// Height at grid cell (`x` column, `y` row) for one batch element
    pub fn height_at(&self, batch: usize, x: usize, y: usize) -> Option<f64> {
        if x >= self.resolution_x || y >= self.resolution_y {
            return None;
        }
        self.heights
            .row(batch)
            .and_then(|row| row.get(y * self.resolution_x + x))
            .copied()
    }

    /// Wire record. A singleton terrain carries one row per grid; otherwise
    /// every grid is written once per batch element.
    pub fn to_record(&self) -> TerrainRecord {
        let (height_data, normals) = if self.is_singleton {
            (self.heights.rows.clone(), self.normals.rows.clone())
        } else {
            (
                self.heights.expanded(self.batch_size),
                self.normals.expanded(self.batch_size),
            )
        };

        TerrainRecord {
            dimensions: TerrainDimensions {
                size_x: self.extent_x(),
                size_y: self.extent_y(),
                resolution_x: self.resolution_x,
                resolution_y: self.resolution_y,
            },
            bounds: TerrainBounds {
                min_x: self.x_range.0,
                min_y: self.y_range.0,
                max_x: self.x_range.1,
                max_y: self.y_range.1,
                min_z: self.min_z,
                max_z: self.max_z,
            },
            height_data,
            normals,
            is_singleton: self.is_singleton,
        }
    }
}

/// Builds terrain for a model with a fixed batch size
#[derive(Debug, Clone, Copy)]
pub struct TerrainBuilder {
    batch_size: usize,
}

impl TerrainBuilder {
    pub fn new(batch_size: usize) -> Self {
        TerrainBuilder { batch_size }
    }

    /// Normalize a height grid and a channels-first normal grid.
    ///
    /// Heights are `[rows, cols]` or `[batch, rows, cols]`; normals are
    /// `[3, rows, cols]` or `[batch, 3, rows, cols]`. Grids without a batch
    /// dimension count as one batch element. A batch dimension of 1 is shared
    /// by every batch element and stored once; any other batch dimension must
    /// equal the model batch size.
    pub fn create(
        &self,
        heights: &GridData,
        normals: &GridData,
        x_range: (f64, f64),
        y_range: (f64, f64),
    ) -> SceneResult<Terrain> {
        let (bh, rows, cols) = match *heights.shape() {
            [rows, cols] => (1, rows, cols),
            [b, rows, cols] => (b, rows, cols),
            _ => {
                return Err(SceneError::ShapeRankMismatch(format!(
                    "heightmap must be [rows, cols] or [batch, rows, cols], got {:?}",
                    heights.shape()
                )))
            }
        };

        let (bn, channels, n_rows, n_cols) = match *normals.shape() {
            [c, rows, cols] => (1, c, rows, cols),
            [b, c, rows, cols] => (b, c, rows, cols),
            _ => {
                return Err(SceneError::ShapeRankMismatch(format!(
                    "normals must be [3, rows, cols] or [batch, 3, rows, cols], got {:?}",
                    normals.shape()
                )))
            }
        };

        if channels != 3 {
            return Err(SceneError::ShapeRankMismatch(format!(
                "normals must have 3 channels, got {channels}"
            )));
        }
        if (rows, cols) != (n_rows, n_cols) {
            return Err(SceneError::ShapeRankMismatch(format!(
                "heightmap grid {rows}x{cols} does not match normal grid {n_rows}x{n_cols}"
            )));
        }
        if rows == 0 || cols == 0 {
            return Err(SceneError::ShapeRankMismatch("terrain grid is empty".into()));
        }

        let height_policy = BroadcastPolicy::resolve("heightmap", bh, self.batch_size)?;
        let normal_policy = BroadcastPolicy::resolve("normals", bn, self.batch_size)?;

        SceneError::check_finite(|| "heightmap".into(), heights.values())?;
        SceneError::check_finite(|| "normals".into(), normals.values())?;
        SceneError::check_finite(
            || "terrain bounds".into(),
            &[x_range.0, x_range.1, y_range.0, y_range.1],
        )?;

        let (min_z, max_z) = heights
            .values()
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &z| {
                (lo.min(z), hi.max(z))
            });

        let cells = rows * cols;
        let height_rows = heights
            .values()
            .chunks(cells)
            .map(<[f64]>::to_vec)
            .collect();
        let normal_rows = normals
            .values()
            .chunks(3 * cells)
            .map(|grid| channels_last(grid, cells))
            .collect();

        let is_singleton = height_policy.is_singleton() && normal_policy.is_singleton();

        tracing::debug!(
            rows,
            cols,
            is_singleton,
            "terrain built for {} batch elements",
            self.batch_size
        );

        Ok(Terrain {
            batch_size: self.batch_size,
            x_range,
            y_range,
            min_z,
            max_z,
            resolution_x: cols,
            resolution_y: rows,
            heights: TerrainLayer {
                policy: height_policy,
                rows: height_rows,
            },
            normals: TerrainLayer {
                policy: normal_policy,
                rows: normal_rows,
            },
            is_singleton,
        })
    }
}

/// `[3, cells]` channel planes into per-cell `[x, y, z]` normals
fn channels_last(grid: &[f64], cells: usize) -> Vec<[f64; 3]> {
    (0..cells)
        .map(|i| [grid[i], grid[cells + i], grid[2 * cells + i]])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ramp(rows: usize, cols: usize) -> GridData {
        let values = (0..rows * cols).map(|i| i as f64).collect();
        GridData::new(vec![rows, cols], values).unwrap()
    }

    #[test]
    fn test_row_major_x_fastest() {
        // 2 rows (y), 3 columns (x)
        let heights = GridData::from_rows(&[vec![0.0, 1.0, 2.0], vec![10.0, 11.0, 12.0]]).unwrap();
        let normals = GridData::uniform_normals(2, 3, [0.0, 0.0, 1.0]);

        let terrain = TerrainBuilder::new(1)
            .create(&heights, &normals, (0.0, 3.0), (0.0, 2.0))
            .unwrap();

        assert_eq!(terrain.resolution_x(), 3);
        assert_eq!(terrain.resolution_y(), 2);
        assert_eq!(
            terrain.heights().row(0).unwrap(),
            &[0.0, 1.0, 2.0, 10.0, 11.0, 12.0]
        );
        assert_eq!(terrain.height_at(0, 2, 0), Some(2.0));
        assert_eq!(terrain.height_at(0, 0, 1), Some(10.0));
        assert_eq!(terrain.height_at(0, 3, 0), None);
    }

    #[test]
    fn test_normals_channels_last() {
        // Channel planes: x = 1..4, y = 5..8, z = 9..12
        let values: Vec<f64> = (1..=12).map(f64::from).collect();
        let normals = GridData::new(vec![3, 2, 2], values).unwrap();

        let terrain = TerrainBuilder::new(1)
            .create(&ramp(2, 2), &normals, (0.0, 1.0), (0.0, 1.0))
            .unwrap();

        assert_eq!(
            terrain.normals().row(0).unwrap(),
            &[[1.0, 5.0, 9.0], [2.0, 6.0, 10.0], [3.0, 7.0, 11.0], [4.0, 8.0, 12.0]]
        );
    }

    #[test]
    fn test_global_height_bounds() {
        let heights =
            GridData::new(vec![2, 1, 2], vec![-1.0, 0.5, 2.0, 3.5]).unwrap();
        let normals = GridData::uniform_normals(1, 2, [0.0, 0.0, 1.0]);

        let terrain = TerrainBuilder::new(2)
            .create(&heights, &normals, (-5.0, 5.0), (-2.0, 2.0))
            .unwrap();

        assert_eq!(terrain.z_range(), (-1.0, 3.5));
        assert_eq!(terrain.extent_x(), 10.0);
        assert_eq!(terrain.extent_y(), 4.0);
        assert!(!terrain.is_singleton());
        assert_eq!(terrain.heights().policy(), BroadcastPolicy::PerBatch);
        assert_eq!(terrain.normals().policy(), BroadcastPolicy::Singleton);
    }

    #[test]
    fn test_mixed_broadcast_expands_on_wire() {
        let heights = GridData::new(vec![2, 1, 2], vec![0.0, 1.0, 2.0, 3.0]).unwrap();
        let normals = GridData::uniform_normals(1, 2, [0.0, 0.0, 1.0]);

        let terrain = TerrainBuilder::new(2)
            .create(&heights, &normals, (0.0, 1.0), (0.0, 1.0))
            .unwrap();
        assert_eq!(terrain.normals().stored().len(), 1);

        let record = terrain.to_record();
        assert!(!record.is_singleton);
        assert_eq!(record.height_data.len(), 2);
        assert_eq!(record.normals.len(), 2);
        assert_eq!(record.normals[0], record.normals[1]);
    }

    #[test]
    fn test_normal_channels_checked() {
        let normals = GridData::filled(vec![2, 4, 4], 0.0);
        let err = TerrainBuilder::new(1)
            .create(&ramp(4, 4), &normals, (0.0, 1.0), (0.0, 1.0))
            .unwrap_err();
        assert!(matches!(err, SceneError::ShapeRankMismatch(_)));
    }

    #[test]
    fn test_grid_size_mismatch() {
        let normals = GridData::uniform_normals(3, 4, [0.0, 0.0, 1.0]);
        let err = TerrainBuilder::new(1)
            .create(&ramp(4, 4), &normals, (0.0, 1.0), (0.0, 1.0))
            .unwrap_err();
        assert!(matches!(err, SceneError::ShapeRankMismatch(_)));
    }

    #[test]
    fn test_non_finite_grids_rejected() {
        let normals = GridData::uniform_normals(2, 2, [0.0, 0.0, 1.0]);
        let heights = GridData::new(vec![2, 2], vec![0.0, f64::NAN, 1.0, 2.0]).unwrap();
        let err = TerrainBuilder::new(1)
            .create(&heights, &normals, (0.0, 1.0), (0.0, 1.0))
            .unwrap_err();
        assert!(matches!(err, SceneError::NonFiniteValue { ref what } if what == "heightmap"));

        let normals = GridData::uniform_normals(2, 2, [0.0, f64::INFINITY, 1.0]);
        let err = TerrainBuilder::new(1)
            .create(&ramp(2, 2), &normals, (0.0, 1.0), (0.0, 1.0))
            .unwrap_err();
        assert!(matches!(err, SceneError::NonFiniteValue { ref what } if what == "normals"));

        let normals = GridData::uniform_normals(2, 2, [0.0, 0.0, 1.0]);
        assert!(TerrainBuilder::new(1)
            .create(&ramp(2, 2), &normals, (0.0, f64::INFINITY), (0.0, 1.0))
            .is_err());
    }

    #[test]
    fn test_grid_value_count_checked() {
        assert!(GridData::new(vec![2, 2], vec![0.0; 3]).is_err());
        assert!(GridData::from_rows(&[vec![0.0, 1.0], vec![2.0]]).is_err());
    }

    #[test]
    fn test_singleton_record() {
        let terrain = TerrainBuilder::new(4)
            .create(
                &GridData::filled(vec![4, 4], 0.0),
                &GridData::uniform_normals(4, 4, [0.0, 0.0, 1.0]),
                (-5.0, 5.0),
                (-5.0, 5.0),
            )
            .unwrap();

        let record = terrain.to_record();
        assert!(record.is_singleton);
        assert_eq!(record.height_data.len(), 1);
        assert_eq!(record.height_data[0].len(), 16);
        assert_eq!(record.normals[0][5], [0.0, 0.0, 1.0]);
        assert_eq!(record.dimensions.resolution_x, 4);
        assert_eq!(record.bounds.min_z, 0.0);
    }

    proptest! {
        #[test]
        fn prop_single_batch_grid_is_singleton(
            n in 1usize..16,
            rows in 1usize..8,
            cols in 1usize..8,
        ) {
            let heights = GridData::filled(vec![1, rows, cols], 0.25);
            let normals = GridData::uniform_normals(rows, cols, [0.0, 0.0, 1.0]);

            let terrain = TerrainBuilder::new(n)
                .create(&heights, &normals, (0.0, 1.0), (0.0, 1.0))
                .unwrap();

            prop_assert!(terrain.is_singleton());
            let stored: usize = terrain.heights().stored().iter().map(Vec::len).sum();
            prop_assert_eq!(stored, rows * cols);
            prop_assert_eq!(terrain.to_record().height_data.len(), 1);
        }

        #[test]
        fn prop_foreign_batch_dimension_rejected(
            n in 2usize..12,
            b in 2usize..24,
        ) {
            prop_assume!(b != n);
            let heights = GridData::filled(vec![b, 2, 2], 0.0);
            let normals = GridData::uniform_normals(2, 2, [0.0, 0.0, 1.0]);

            let result = TerrainBuilder::new(n).create(&heights, &normals, (0.0, 1.0), (0.0, 1.0));
            let is_batch_mismatch = matches!(result, Err(SceneError::BatchMismatch { .. }));
            prop_assert!(is_batch_mismatch);
        }
    }
}
