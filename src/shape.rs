//! Shape and stride metadata for 2-D tensors. No data lives here; see `storage`.

use std::fmt;
use thiserror::Error;

/// Error when a shape is invalid for an operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("shape error: {0}")]
pub struct ShapeError(pub String);

/// Dimensions of a 2-D tensor: `rows` x `cols`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Shape {
    pub rows: usize,
    pub cols: usize,
}

impl Shape {
    pub fn new(rows: usize, cols: usize) -> Self {
        Shape { rows, cols }
    }

    /// Total number of addressable elements (rows * cols).
    pub fn numel(&self) -> usize {
        self.rows * self.cols
    }

    pub fn same_as(&self, other: &Shape) -> bool {
        self.rows == other.rows && self.cols == other.cols
    }

    pub fn is_scalar(&self) -> bool {
        self.numel() == 1
    }

    /// Output shape of a broadcasting add: max along each dimension.
    pub fn broadcast_with(&self, other: &Shape) -> Result<Shape, ShapeError> {
        let rows = self.rows.max(other.rows);
        let cols = self.cols.max(other.cols);
        let compatible =
            |dim: usize, out: usize| -> bool { dim == out || dim == 1 };
        if !compatible(self.rows, rows)
            || !compatible(other.rows, rows)
            || !compatible(self.cols, cols)
            || !compatible(other.cols, cols)
        {
            return Err(ShapeError(format!(
                "cannot broadcast {} against {}",
                self, other
            )));
        }
        Ok(Shape { rows, cols })
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.rows, self.cols)
    }
}

/// Row/column strides, in flat-buffer elements. `addr(i,j) = offset + i*row + j*col`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Strides {
    pub row: usize,
    pub col: usize,
}

impl Strides {
    /// Standard row-major strides for a `cols`-wide row.
    pub fn row_major(cols: usize) -> Self {
        Strides { row: cols, col: 1 }
    }

    /// Strides after swapping the two dimensions (zero-copy transpose).
    pub fn transposed(&self) -> Self {
        Strides {
            row: self.col,
            col: self.row,
        }
    }
}
