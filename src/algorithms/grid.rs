//! Raster occupancy grid: world↔cell mapping, free-space tests, line-of-sight
//! raster traversal, and morphological dilation for C-space expansion.

use crate::error::{PlannerError, PlannerResult};
use crate::messages::{Cell, GridFrame, WorldOrd};

/// Cell values strictly greater than this are considered free. Values at or
/// below it are occupied or unknown and are rejected.
pub const FREE_THRESHOLD: u8 = 127;

/// A greyscale raster occupancy grid, immutable once handed to the planner
/// for one build cycle.
#[derive(Debug, Clone)]
pub struct Grid {
    width_cells: usize,
    height_cells: usize,
    resolution_m_per_cell: f64,
    reference: WorldOrd,
    cells: Vec<u8>,
    /// Diameter this grid was last dilated with, so repeated
    /// `expand_cspace` calls with the same diameter are no-ops.
    dilated_diameter: Option<f64>,
}

impl Grid {
    /// Build a grid from a raw frame crossing the producer boundary.
    pub fn from_frame(frame: &GridFrame) -> PlannerResult<Self> {
        if frame.bytes.len() != frame.width * frame.height {
            return Err(PlannerError::MalformedGrid(format!(
                "expected {} bytes for a {}x{} grid, got {}",
                frame.width * frame.height,
                frame.width,
                frame.height,
                frame.bytes.len()
            )));
        }
        Ok(Self {
            width_cells: frame.width,
            height_cells: frame.height,
            resolution_m_per_cell: frame.resolution,
            reference: frame.reference_pose,
            cells: frame.bytes.clone(),
            dilated_diameter: None,
        })
    }

    /// Construct an all-free grid, mainly useful for tests.
    pub fn all_free(width_cells: usize, height_cells: usize, resolution: f64, reference: WorldOrd) -> Self {
        Self {
            width_cells,
            height_cells,
            resolution_m_per_cell: resolution,
            reference,
            cells: vec![255; width_cells * height_cells],
            dilated_diameter: None,
        }
    }

    pub fn width_cells(&self) -> usize {
        self.width_cells
    }

    pub fn height_cells(&self) -> usize {
        self.height_cells
    }

    pub fn resolution(&self) -> f64 {
        self.resolution_m_per_cell
    }

    pub fn reference(&self) -> WorldOrd {
        self.reference
    }

    /// Occupy a cell directly; used by tests to build obstacles.
    pub fn set_occupied(&mut self, cell: Cell) {
        if let Some(idx) = self.index(cell) {
            self.cells[idx] = 0;
        }
    }

    fn in_bounds(&self, cell: Cell) -> bool {
        cell.col >= 0
            && cell.row >= 0
            && (cell.col as usize) < self.width_cells
            && (cell.row as usize) < self.height_cells
    }

    fn index(&self, cell: Cell) -> Option<usize> {
        if self.in_bounds(cell) {
            Some(cell.row as usize * self.width_cells + cell.col as usize)
        } else {
            None
        }
    }

    /// `col = round((p.x - ref.x)/res + width/2)`,
    /// `row = round(height/2 - (p.y - ref.y)/res)`.
    pub fn world_to_cell(&self, p: WorldOrd) -> Cell {
        let res = self.resolution_m_per_cell;
        let col = ((p.x - self.reference.x) / res + self.width_cells as f64 / 2.0).round() as i64;
        let row = (self.height_cells as f64 / 2.0 - (p.y - self.reference.y) / res).round() as i64;
        Cell::new(col, row)
    }

    /// Inverse of `world_to_cell`, using cell centres.
    pub fn cell_to_world(&self, cell: Cell) -> WorldOrd {
        let res = self.resolution_m_per_cell;
        let x = self.reference.x + (cell.col as f64 - self.width_cells as f64 / 2.0) * res;
        let y = self.reference.y + (self.height_cells as f64 / 2.0 - cell.row as f64) * res;
        WorldOrd::new(x, y)
    }

    /// True iff `cell` is inside bounds and its occupancy byte exceeds
    /// [`FREE_THRESHOLD`]. Out-of-bounds cells are occupied, not an error.
    pub fn is_free(&self, cell: Cell) -> bool {
        match self.index(cell) {
            Some(idx) => self.cells[idx] > FREE_THRESHOLD,
            None => false,
        }
    }

    /// Dilate occupied (non-free) regions outward by
    /// `ceil(robot_diameter_m / (2 * resolution))` cells using a square
    /// structuring element, so the robot can be treated as a point.
    /// Idempotent under repeated application with the same diameter.
    pub fn expand_cspace(&mut self, robot_diameter_m: f64) {
        if self.dilated_diameter == Some(robot_diameter_m) {
            log::debug!("grid already dilated for diameter {robot_diameter_m}, skipping");
            return;
        }

        let radius_cells =
            (robot_diameter_m / (2.0 * self.resolution_m_per_cell)).ceil() as i64;

        if radius_cells <= 0 {
            self.dilated_diameter = Some(robot_diameter_m);
            return;
        }

        let source = self.cells.clone();
        let w = self.width_cells as i64;
        let h = self.height_cells as i64;

        for row in 0..h {
            for col in 0..w {
                let idx = (row * w + col) as usize;
                if source[idx] > FREE_THRESHOLD {
                    continue; // already free, dilation only grows occupied regions
                }
                // Occupied/unknown source cell: stamp a square of the same
                // value outward so neighbouring free cells become occupied.
                for dr in -radius_cells..=radius_cells {
                    for dc in -radius_cells..=radius_cells {
                        let nr = row + dr;
                        let nc = col + dc;
                        if nr < 0 || nc < 0 || nr >= h || nc >= w {
                            continue;
                        }
                        let nidx = (nr * w + nc) as usize;
                        if self.cells[nidx] > source[idx] {
                            self.cells[nidx] = source[idx];
                        }
                    }
                }
            }
        }

        self.dilated_diameter = Some(robot_diameter_m);
        log::debug!("dilated grid for robot diameter {robot_diameter_m}m ({radius_cells} cell radius)");
    }

    /// Rasterise the segment `a -> b` with Bresenham's algorithm; true iff
    /// every visited cell is free.
    pub fn can_connect(&self, a: Cell, b: Cell) -> bool {
        bresenham_line(a, b).into_iter().all(|c| self.is_free(c))
    }
}

/// Bresenham's line algorithm, integer-only, inclusive of both endpoints.
pub fn bresenham_line(a: Cell, b: Cell) -> Vec<Cell> {
    let mut cells = Vec::new();

    let dx = (b.col - a.col).abs();
    let dy = (b.row - a.row).abs();
    let sx = if a.col < b.col { 1 } else { -1 };
    let sy = if a.row < b.row { 1 } else { -1 };
    let mut err = dx - dy;

    let mut col = a.col;
    let mut row = a.row;

    loop {
        cells.push(Cell::new(col, row));

        if col == b.col && row == b.row {
            break;
        }

        let e2 = 2 * err;

        if e2 > -dy {
            err -= dy;
            col += sx;
        }
        if e2 < dx {
            err += dx;
            row += sy;
        }
    }

    cells
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin_grid() -> Grid {
        Grid::all_free(40, 40, 0.1, WorldOrd::new(0.0, 0.0))
    }

    #[test]
    fn world_to_cell_inverts_through_cell_to_world() {
        let grid = origin_grid();
        for row in 0..grid.height_cells() as i64 {
            for col in (0..grid.width_cells() as i64).step_by(7) {
                let cell = Cell::new(col, row);
                let world = grid.cell_to_world(cell);
                assert_eq!(grid.world_to_cell(world), cell);
            }
        }
    }

    #[test]
    fn positive_world_y_maps_to_smaller_row() {
        let grid = origin_grid();
        let up = grid.world_to_cell(WorldOrd::new(0.0, 1.0));
        let down = grid.world_to_cell(WorldOrd::new(0.0, -1.0));
        assert!(up.row < down.row);
    }

    #[test]
    fn out_of_bounds_cell_is_not_free() {
        let grid = origin_grid();
        assert!(!grid.is_free(Cell::new(-1, -1)));
        assert!(!grid.is_free(Cell::new(1000, 1000)));
    }

    #[test]
    fn can_connect_true_on_clear_line() {
        let grid = origin_grid();
        assert!(grid.can_connect(Cell::new(0, 0), Cell::new(39, 39)));
    }

    #[test]
    fn can_connect_false_through_obstacle() {
        let mut grid = origin_grid();
        for row in 0..40 {
            grid.set_occupied(Cell::new(20, row));
        }
        assert!(!grid.can_connect(Cell::new(0, 20), Cell::new(39, 20)));
    }

    #[test]
    fn expand_cspace_is_idempotent() {
        let mut grid = origin_grid();
        grid.set_occupied(Cell::new(20, 20));
        grid.expand_cspace(0.3);
        let once = grid.cells.clone();
        grid.expand_cspace(0.3);
        assert_eq!(once, grid.cells);
    }

    #[test]
    fn expand_cspace_only_grows_occupied_regions() {
        let mut grid = origin_grid();
        grid.set_occupied(Cell::new(20, 20));
        grid.expand_cspace(0.4); // radius = ceil(0.4 / 0.2) = 2 cells
        assert!(!grid.is_free(Cell::new(20, 20)));
        assert!(!grid.is_free(Cell::new(21, 20)));
        assert!(!grid.is_free(Cell::new(22, 20)));
        assert!(grid.is_free(Cell::new(25, 20)));
    }

    #[test]
    fn from_frame_rejects_mismatched_byte_length() {
        let frame = GridFrame::new(vec![255; 10], 4, 4, 0.1, WorldOrd::new(0.0, 0.0), 0);
        assert!(Grid::from_frame(&frame).is_err());
    }
}
