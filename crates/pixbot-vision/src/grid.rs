use anyhow::Result;
use image::RgbaImage;
use itertools::iproduct;
use pixbot_capture::{crop_region, Point, Region};

/// One cell of a slot grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub column: u32,
    pub row: u32,
    /// Click target: the center of the full cell
    pub center: Point,
    /// The cell shrunk past its border, used for classification
    pub inner: Region,
}

/// Geometry of a cell at (`column`, `row`) in a grid anchored at `top_left`.
///
/// `inner` is shrunk by `border_shrink` of the cell size on every side so
/// that neither the border nor a neighbouring cell leaks into it.
pub fn cell_region(
    top_left: Point,
    cell_width: u32,
    cell_height: u32,
    column: u32,
    row: u32,
    border_shrink: f64,
) -> (Point, Region) {
    let slot = top_left.offset(
        (cell_width * column) as i32,
        (cell_height * row) as i32,
    );
    let offset_w = (cell_width as f64 * border_shrink) as u32;
    let offset_h = (cell_height as f64 * border_shrink) as u32;

    let inner = Region::new(
        (slot.x + offset_w as i32).max(0) as u32,
        (slot.y + offset_h as i32).max(0) as u32,
        cell_width.saturating_sub(2 * offset_w),
        cell_height.saturating_sub(2 * offset_h),
    );
    let center = slot.offset((cell_width / 2) as i32, (cell_height / 2) as i32);
    (center, inner)
}

/// A rectangular grid of equally sized slots, e.g. the inventory.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlotGrid {
    pub top_left: Point,
    pub cell_width: u32,
    pub cell_height: u32,
    pub border_shrink: f64,
}

impl SlotGrid {
    pub fn cell(&self, column: u32, row: u32) -> Cell {
        let (center, inner) = cell_region(
            self.top_left,
            self.cell_width,
            self.cell_height,
            column,
            row,
            self.border_shrink,
        );
        Cell {
            column,
            row,
            center,
            inner,
        }
    }

    /// Cells in scan order: columns outer, rows inner, both ascending from 0.
    pub fn cells(&self, columns: u32, rows: u32) -> impl Iterator<Item = Cell> + '_ {
        iproduct!(0..columns, 0..rows).map(move |(column, row)| self.cell(column, row))
    }

    pub fn crop(&self, frame: &RgbaImage, cell: &Cell) -> RgbaImage {
        crop_region(frame, &cell.inner)
    }

    /// True as soon as one cell satisfies `occupied`.
    pub fn has_any_item<F>(&self, frame: &RgbaImage, columns: u32, rows: u32, occupied: F) -> bool
    where
        F: Fn(&RgbaImage) -> bool,
    {
        self.cells(columns, rows)
            .any(|cell| occupied(&self.crop(frame, &cell)))
    }

    /// Click centers of every cell accepted by `matcher`, in scan order.
    pub fn enumerate_matches<F>(
        &self,
        frame: &RgbaImage,
        columns: u32,
        rows: u32,
        mut matcher: F,
    ) -> Result<Vec<Point>>
    where
        F: FnMut(&RgbaImage) -> Result<bool>,
    {
        let mut matches = Vec::new();
        for cell in self.cells(columns, rows) {
            if matcher(&self.crop(frame, &cell))? {
                matches.push(cell.center);
            }
        }
        Ok(matches)
    }
}
