//! The four fused per-timestep stencil/pointwise operators (§4.B):
//! `accelerate_flow`, `propagate`, `rebound`, `collision`. Order within a
//! timestep is always accelerate -> propagate -> rebound -> collision.

use ndarray::parallel::prelude::*;
use ndarray::Axis;

use crate::state::weights::{CS2, DIRECTIONS, OPPOSITE, WEIGHTS};
use crate::state::LocalGrid;

/// Apply the body-force row injection to the local row carrying the global
/// accelerate-row, if any lies within this rank's strip. `row_offset` is
/// the global row index held at local row 1 (bottom-most computational
/// row). Scratch buffer reuse is unnecessary here: the operator only
/// touches one row.
pub fn accelerate_flow(local: &mut LocalGrid, accel_global_row: usize, row_offset: usize, density: f32, accel: f32) {
    if accel_global_row < row_offset || accel_global_row >= row_offset + local.rows {
        return;
    }
    let j = accel_global_row - row_offset + 1;

    let w1 = density * accel / 9.0;
    let w2 = density * accel / 36.0;

    for i in 0..local.nx {
        if local.obstacles[(j, i)] {
            continue;
        }
        let s3 = local.cells[(j, i, 3)];
        let s6 = local.cells[(j, i, 6)];
        let s7 = local.cells[(j, i, 7)];
        if s3 > w1 && s6 > w2 && s7 > w2 {
            local.cells[(j, i, 1)] += w1;
            local.cells[(j, i, 5)] += w2;
            local.cells[(j, i, 8)] += w2;
            local.cells[(j, i, 3)] -= w1;
            local.cells[(j, i, 6)] -= w2;
            local.cells[(j, i, 7)] -= w2;
        }
    }
}

/// Stream populations one cell along their direction, reading `cells` and
/// writing `tmp_cells`. Horizontal wrap is periodic; vertical neighbors
/// come from the halo rows, which must already be valid (§4.B, §5).
pub fn propagate(local: &mut LocalGrid) {
    let nx = local.nx;
    let rows = local.rows;
    let cells = &local.cells;
    let mut tmp = local.tmp_cells.view_mut();

    tmp.axis_iter_mut(Axis(0))
        .into_par_iter()
        .enumerate()
        .for_each(|(j, mut row_out)| {
            if j == 0 || j > rows {
                return;
            }
            for i in 0..nx {
                let x_w = (i + nx - 1) % nx;
                let x_e = (i + 1) % nx;

                row_out[(i, 0)] = cells[(j, i, 0)];
                row_out[(i, 1)] = cells[(j, x_w, 1)];
                row_out[(i, 2)] = cells[(j - 1, i, 2)];
                row_out[(i, 3)] = cells[(j, x_e, 3)];
                row_out[(i, 4)] = cells[(j + 1, i, 4)];
                row_out[(i, 5)] = cells[(j - 1, x_w, 5)];
                row_out[(i, 6)] = cells[(j - 1, x_e, 6)];
                row_out[(i, 7)] = cells[(j + 1, x_e, 7)];
                row_out[(i, 8)] = cells[(j + 1, x_w, 8)];
            }
        });
}

/// At every obstacle cell, copy `tmp_cells` into `cells` with directions
/// swapped pairwise (1<->3, 2<->4, 5<->7, 6<->8). The rest speed (index 0)
/// is left untouched; non-obstacle cells are not written here.
pub fn rebound(local: &mut LocalGrid) {
    let nx = local.nx;
    let rows = local.rows;
    let tmp = &local.tmp_cells;
    let obstacles = &local.obstacles;
    let mut cells = local.cells.view_mut();

    cells
        .axis_iter_mut(Axis(0))
        .into_par_iter()
        .enumerate()
        .for_each(|(j, mut row_out)| {
            if j == 0 || j > rows {
                return;
            }
            for i in 0..nx {
                if !obstacles[(j, i)] {
                    continue;
                }
                for k in 1..9 {
                    row_out[(i, OPPOSITE[k])] = tmp[(j, i, k)];
                }
            }
        });
}

/// BGK relaxation toward the local equilibrium at every non-obstacle cell,
/// reading `tmp_cells` and writing `cells`.
pub fn collision(local: &mut LocalGrid, omega: f32) {
    let nx = local.nx;
    let rows = local.rows;
    let tmp = &local.tmp_cells;
    let obstacles = &local.obstacles;
    let mut cells = local.cells.view_mut();

    cells
        .axis_iter_mut(Axis(0))
        .into_par_iter()
        .enumerate()
        .for_each(|(j, mut row_out)| {
            if j == 0 || j > rows {
                return;
            }
            for i in 0..nx {
                if obstacles[(j, i)] {
                    continue;
                }

                let mut s = [0.0f32; 9];
                for k in 0..9 {
                    s[k] = tmp[(j, i, k)];
                }
                let rho_l: f32 = s.iter().sum();

                let u_x = (s[1] + s[5] + s[8] - s[3] - s[6] - s[7]) / rho_l;
                let u_y = (s[2] + s[5] + s[6] - s[4] - s[7] - s[8]) / rho_l;
                let u_sq = u_x * u_x + u_y * u_y;

                for k in 0..9 {
                    let (ex, ey) = DIRECTIONS[k];
                    let u_k = ex * u_x + ey * u_y;
                    let d_eq = WEIGHTS[k]
                        * rho_l
                        * (1.0 + u_k / CS2 + (u_k * u_k) / (2.0 * CS2 * CS2) - u_sq / (2.0 * CS2));
                    row_out[(i, k)] = s[k] + omega * (d_eq - s[k]);
                }
            }
        });
}
