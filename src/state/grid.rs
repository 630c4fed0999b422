use ndarray::{Array2, Array3};

use super::params::Params;
use super::weights::equilibrium_at_rest;
use crate::errors::{SolverError, SolverResult};

/// The full-domain grid, allocated only on rank 0 (§9 "ownership model").
/// Storage is row-major: `cells[(j, i, k)]` is direction `k` of cell
/// (row `j`, column `i`).
pub struct GlobalGrid {
    pub nx: usize,
    pub ny: usize,
    pub cells: Array3<f32>,
    pub obstacles: Array2<bool>,
}

impl GlobalGrid {
    /// Build the initial grid: every non-obstacle cell starts at the
    /// equilibrium distribution for `params.density`; obstacles start
    /// false everywhere until `apply_obstacles` is called (§4.A).
    pub fn initialize(params: &Params) -> Self {
        let eq = equilibrium_at_rest(params.density);
        let mut cells = Array3::zeros((params.ny, params.nx, 9));
        for mut row in cells.outer_iter_mut() {
            for mut cell in row.outer_iter_mut() {
                cell.assign(&ndarray::arr1(&eq));
            }
        }
        Self {
            nx: params.nx,
            ny: params.ny,
            cells,
            obstacles: Array2::from_elem((params.ny, params.nx), false),
        }
    }

    /// Mark the given (x, y) coordinates as solid. Bounds are validated by
    /// the caller (`io::obstacle_file::load`) before this is invoked.
    pub fn set_obstacle(&mut self, x: usize, y: usize) {
        self.obstacles[(y, x)] = true;
    }

    /// Count of non-obstacle cells across the whole grid — `N_flow` (§4.C).
    pub fn count_flow_cells(&self) -> usize {
        self.obstacles.iter().filter(|&&o| !o).count()
    }

    /// Extract the contiguous row range `[row_start, row_start+rows)` as a
    /// plain `(cells, obstacles)` pair, used by `Scatter` (§4.F).
    pub fn row_strip(&self, row_start: usize, rows: usize) -> (Array3<f32>, Array2<bool>) {
        let cells = self
            .cells
            .slice(ndarray::s![row_start..row_start + rows, .., ..])
            .to_owned();
        let obstacles = self
            .obstacles
            .slice(ndarray::s![row_start..row_start + rows, ..])
            .to_owned();
        (cells, obstacles)
    }

    /// Write a contiguous row range back into the global grid, used by
    /// `Gather` (§4.F).
    pub fn set_row_strip(&mut self, row_start: usize, cells: &Array3<f32>, obstacles: &Array2<bool>) {
        let rows = cells.shape()[0];
        self.cells
            .slice_mut(ndarray::s![row_start..row_start + rows, .., ..])
            .assign(cells);
        self.obstacles
            .slice_mut(ndarray::s![row_start..row_start + rows, ..])
            .assign(obstacles);
    }

    pub fn validate_obstacle_coord(nx: usize, ny: usize, x: i64, y: i64) -> SolverResult<(usize, usize)> {
        if x < 0 || y < 0 || x as usize >= nx || y as usize >= ny {
            return Err(SolverError::InvalidObstacle { x, y });
        }
        Ok((x as usize, y as usize))
    }
}
