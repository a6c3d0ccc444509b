//! Partition Engine
//!
//! Splits a filter result into a two-dimensional matrix of card subsets by
//! row and column axis tags. A card lands in every cell whose row tag and
//! column tag it carries — "card multiplicity" is first-class and nothing is
//! deduplicated across cells. Cells hold bitmaps of card indices into the
//! shared registry snapshot; card data itself is never copied.

use crate::registry::CardRegistry;
use crate::tags::TagId;
use roaring::RoaringBitmap;

/// Rectangular array of card subsets, labeled by the axis tag ids.
///
/// With no axis tags the matrix is a single cell holding the whole result;
/// with one empty axis it degenerates to a vector.
#[derive(Debug, Clone, PartialEq)]
pub struct CardMatrix {
    row_axis: Vec<TagId>,
    col_axis: Vec<TagId>,
    /// Row-major cells, `rows() x cols()` of them.
    cells: Vec<Vec<RoaringBitmap>>,
}

impl CardMatrix {
    /// Number of rows: one per row-axis tag, or a single implicit row.
    pub fn rows(&self) -> usize {
        self.cells.len()
    }

    /// Number of columns: one per column-axis tag, or a single implicit
    /// column.
    pub fn cols(&self) -> usize {
        self.cells.first().map(Vec::len).unwrap_or(0)
    }

    pub fn cell(&self, row: usize, col: usize) -> &RoaringBitmap {
        &self.cells[row][col]
    }

    pub fn row_axis(&self) -> &[TagId] {
        &self.row_axis
    }

    pub fn col_axis(&self) -> &[TagId] {
        &self.col_axis
    }

    /// Total number of (card, cell) placements. Exceeds the result
    /// cardinality whenever cards replicate across cells.
    pub fn total_placements(&self) -> u64 {
        self.cells
            .iter()
            .flat_map(|row| row.iter())
            .map(RoaringBitmap::len)
            .sum()
    }

    /// How many cells contain the given card index.
    pub fn placements_of(&self, index: u32) -> usize {
        self.cells
            .iter()
            .flat_map(|row| row.iter())
            .filter(|cell| cell.contains(index))
            .count()
    }
}

/// Partition `result` along the given axes.
///
/// Rows and columns keep the axis tag order; within a cell, cards sit in
/// ascending card-index order (bitmap iteration order). Cost is bounded by
/// the number of (card, cell) placements.
pub fn partition(
    result: &RoaringBitmap,
    row_axis: &[TagId],
    col_axis: &[TagId],
    registry: &CardRegistry,
) -> CardMatrix {
    let row_classes = axis_classes(result, row_axis, registry);
    let col_count = col_axis.len().max(1);

    let mut cells = Vec::with_capacity(row_classes.len());
    for row_set in &row_classes {
        let mut row_cells = Vec::with_capacity(col_count);
        if col_axis.is_empty() {
            row_cells.push(row_set.clone());
        } else {
            for col_tag in col_axis {
                row_cells.push(row_set & registry.cards_with_tag(*col_tag));
            }
        }
        cells.push(row_cells);
    }

    CardMatrix {
        row_axis: row_axis.to_vec(),
        col_axis: col_axis.to_vec(),
        cells,
    }
}

/// Per-axis-tag membership classes within `result`; one class holding all
/// of `result` when the axis is empty.
fn axis_classes(
    result: &RoaringBitmap,
    axis: &[TagId],
    registry: &CardRegistry,
) -> Vec<RoaringBitmap> {
    if axis.is_empty() {
        vec![result.clone()]
    } else {
        axis.iter()
            .map(|tag| result & registry.cards_with_tag(*tag))
            .collect()
    }
}
