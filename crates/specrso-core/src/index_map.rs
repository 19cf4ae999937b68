//! Precomputed gather/scatter tables between lifted blocks and the tensor grid
//!
//! The lifted matrix is never materialized. Instead, a vector indexed by a
//! row block (shape `p`) or a column block (shape `q`) is embedded into the
//! `n1×n2×n3` grid at its block-local coordinates, and read back the same
//! way. Each [`IndexMap`] stores, for every flattened block coordinate, the
//! row-major linear index of the same coordinate in the full grid.
//!
//! Tables are built once per tensor shape and shared across iterations.

use crate::error::{CoreError, CoreResult};
use crate::plan::{linear_index, HankelPlan, LiftCase};
use scirs2_core::ndarray_ext::{Array1, Array3, ArrayView1};
use scirs2_core::numeric::Complex64;

/// Linear-index table for one block shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexMap {
    block: [usize; 3],
    grid: [usize; 3],
    indices: Vec<usize>,
}

impl IndexMap {
    /// Build the table for `block` embedded at the origin of `grid`
    ///
    /// # Examples
    ///
    /// ```
    /// use specrso_core::IndexMap;
    ///
    /// let map = IndexMap::new([2, 1, 2], [3, 3, 3]).unwrap();
    /// assert_eq!(map.as_slice(), &[0, 1, 9, 10]);
    /// ```
    pub fn new(block: [usize; 3], grid: [usize; 3]) -> CoreResult<Self> {
        if block.iter().zip(grid.iter()).any(|(&b, &n)| b == 0 || b > n) {
            return Err(CoreError::InvalidShape(format!(
                "block {:?} does not fit in grid {:?}",
                block, grid
            )));
        }

        let mut indices = Vec::with_capacity(block.iter().product());
        for i1 in 0..block[0] {
            for i2 in 0..block[1] {
                // Innermost axis is contiguous in row-major order
                let start = linear_index(grid, i1, i2, 0);
                indices.extend(start..start + block[2]);
            }
        }

        Ok(Self {
            block,
            grid,
            indices,
        })
    }

    /// Block shape
    pub fn block(&self) -> [usize; 3] {
        self.block
    }

    /// Grid shape
    pub fn grid(&self) -> [usize; 3] {
        self.grid
    }

    /// Number of block entries
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Whether the block is empty (never true for a constructed map)
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Raw table
    pub fn as_slice(&self) -> &[usize] {
        &self.indices
    }

    /// Read the block entries out of a grid tensor
    pub fn gather(&self, grid: &Array3<Complex64>) -> CoreResult<Array1<Complex64>> {
        let data = grid_slice(grid, self.grid)?;
        Ok(self.indices.iter().map(|&idx| data[idx]).collect())
    }

    /// Embed block values into a zero grid tensor, optionally conjugating
    pub fn scatter(
        &self,
        values: ArrayView1<'_, Complex64>,
        conjugate: bool,
    ) -> CoreResult<Array3<Complex64>> {
        if values.len() != self.len() {
            return Err(CoreError::length_mismatch(
                "IndexMap::scatter",
                self.len(),
                values.len(),
            ));
        }

        let mut data = vec![Complex64::new(0.0, 0.0); self.grid.iter().product()];
        for (&idx, &value) in self.indices.iter().zip(values.iter()) {
            data[idx] = if conjugate { value.conj() } else { value };
        }

        Array3::from_shape_vec((self.grid[0], self.grid[1], self.grid[2]), data)
            .map_err(|e| CoreError::InvalidShape(e.to_string()))
    }

    /// Reshape a block vector into its 3-D block tensor
    pub fn block_tensor(&self, values: ArrayView1<'_, Complex64>) -> CoreResult<Array3<Complex64>> {
        if values.len() != self.len() {
            return Err(CoreError::length_mismatch(
                "IndexMap::block_tensor",
                self.len(),
                values.len(),
            ));
        }
        Array3::from_shape_vec(
            (self.block[0], self.block[1], self.block[2]),
            values.iter().copied().collect(),
        )
        .map_err(|e| CoreError::InvalidShape(e.to_string()))
    }
}

/// Index tables for both roles of a lifting plan
///
/// In the symmetric case the row and column blocks coincide and a single
/// table serves both roles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexMaps {
    rows: IndexMap,
    cols: Option<IndexMap>,
}

impl IndexMaps {
    /// Build the tables for `plan`
    pub fn new(plan: &HankelPlan) -> CoreResult<Self> {
        let dims = plan.dims();
        let rows = IndexMap::new(plan.row_shape(), dims)?;
        let cols = match plan.case() {
            LiftCase::Symmetric => None,
            LiftCase::General => Some(IndexMap::new(plan.col_shape(), dims)?),
        };
        Ok(Self { rows, cols })
    }

    /// Row-block (`p`-shaped) table
    pub fn rows(&self) -> &IndexMap {
        &self.rows
    }

    /// Column-block (`q`-shaped) table
    pub fn cols(&self) -> &IndexMap {
        self.cols.as_ref().unwrap_or(&self.rows)
    }
}

fn grid_slice(grid: &Array3<Complex64>, dims: [usize; 3]) -> CoreResult<&[Complex64]> {
    let (n1, n2, n3) = grid.dim();
    if [n1, n2, n3] != dims {
        return Err(CoreError::InvalidShape(format!(
            "expected grid {:?}, got {:?}",
            dims,
            [n1, n2, n3]
        )));
    }
    grid.as_slice()
        .ok_or_else(|| CoreError::InvalidShape("grid tensor is not contiguous".to_string()))
}
