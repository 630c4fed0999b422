use ndarray::{Array2, Array3, Axis};

/// Per-rank subgrid: `rows` computational rows plus one halo row above and
/// below (§3 "Local subgrid"). Local row 0 is the bottom halo, local row
/// `rows+1` is the top halo; computational rows are `1..=rows`.
///
/// `cells` and `tmp_cells` alternate per §5: `propagate` reads `cells` and
/// writes `tmp_cells`; `rebound`/`collision` read `tmp_cells` and write
/// `cells`. They are never aliased.
pub struct LocalGrid {
    pub nx: usize,
    pub rows: usize,
    pub cells: Array3<f32>,
    pub tmp_cells: Array3<f32>,
    pub obstacles: Array2<bool>,
}

impl LocalGrid {
    pub fn new(nx: usize, rows: usize) -> Self {
        Self {
            nx,
            rows,
            cells: Array3::zeros((rows + 2, nx, 9)),
            tmp_cells: Array3::zeros((rows + 2, nx, 9)),
            obstacles: Array2::from_elem((rows + 2, nx), false),
        }
    }

    /// Populate the computational rows (not the halos) from a row strip
    /// received during `Scatter`.
    pub fn install_strip(&mut self, cells: &Array3<f32>, obstacles: &Array2<bool>) {
        debug_assert_eq!(cells.shape()[0], self.rows);
        self.cells
            .slice_mut(ndarray::s![1..=self.rows, .., ..])
            .assign(cells);
        self.obstacles
            .slice_mut(ndarray::s![1..=self.rows, ..])
            .assign(obstacles);
    }

    /// Extract the computational rows, for `Gather`.
    pub fn extract_strip(&self) -> (Array3<f32>, Array2<bool>) {
        (
            self.cells.slice(ndarray::s![1..=self.rows, .., ..]).to_owned(),
            self.obstacles.slice(ndarray::s![1..=self.rows, ..]).to_owned(),
        )
    }

    /// Bottom-most computational row (local row 1), sent to the below
    /// neighbor during halo exchange (§4.E step 1).
    pub fn bottom_computational_row(&self) -> (ndarray::ArrayView2<f32>, ndarray::ArrayView1<bool>) {
        (self.cells.index_axis(Axis(0), 1), self.obstacles.index_axis(Axis(0), 1))
    }

    /// Top-most computational row (local row `rows`), sent to the above
    /// neighbor during halo exchange (§4.E step 2).
    pub fn top_computational_row(&self) -> (ndarray::ArrayView2<f32>, ndarray::ArrayView1<bool>) {
        (
            self.cells.index_axis(Axis(0), self.rows),
            self.obstacles.index_axis(Axis(0), self.rows),
        )
    }

    /// Write into the top halo row (local row `rows+1`), received from the
    /// above neighbor.
    pub fn set_top_halo(&mut self, cells: ndarray::ArrayView2<f32>, obstacles: ndarray::ArrayView1<bool>) {
        self.cells.index_axis_mut(Axis(0), self.rows + 1).assign(&cells);
        self.obstacles.index_axis_mut(Axis(0), self.rows + 1).assign(&obstacles);
    }

    /// Write into the bottom halo row (local row 0), received from the
    /// below neighbor.
    pub fn set_bottom_halo(&mut self, cells: ndarray::ArrayView2<f32>, obstacles: ndarray::ArrayView1<bool>) {
        self.cells.index_axis_mut(Axis(0), 0).assign(&cells);
        self.obstacles.index_axis_mut(Axis(0), 0).assign(&obstacles);
    }

    /// Sum of all populations over non-obstacle computational cells — used
    /// only by the mass-conservation test (§8 property 1), not by the
    /// physics itself.
    pub fn total_mass(&self) -> f64 {
        let mut total = 0.0f64;
        for j in 1..=self.rows {
            for i in 0..self.nx {
                if self.obstacles[(j, i)] {
                    continue;
                }
                for k in 0..9 {
                    total += self.cells[(j, i, k)] as f64;
                }
            }
        }
        total
    }
}
