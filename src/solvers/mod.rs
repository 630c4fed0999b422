pub mod kernel;

#[cfg(test)]
mod tests {
    use super::kernel::*;
    use crate::state::{weights, LocalGrid, Params};

    fn make_params() -> Params {
        Params {
            nx: 4,
            ny: 4,
            max_iters: 1,
            reynolds_dim: 100,
            density: 0.1,
            accel: 0.005,
            omega: 1.0,
        }
    }

    fn uniform_local(params: &Params, rows: usize) -> LocalGrid {
        let mut local = LocalGrid::new(params.nx, rows);
        let eq = weights::equilibrium_at_rest(params.density);
        for j in 0..rows + 2 {
            for i in 0..params.nx {
                for k in 0..9 {
                    local.cells[(j, i, k)] = eq[k];
                    local.tmp_cells[(j, i, k)] = eq[k];
                }
            }
        }
        local
    }

    #[test]
    fn accelerate_flow_increases_east_decreases_west() {
        let params = make_params();
        let mut local = uniform_local(&params, params.ny);
        let accel_row = params.accel_row();

        accelerate_flow(&mut local, accel_row, 0, params.density, params.accel);

        let j = accel_row + 1;
        for i in 0..params.nx {
            assert!(local.cells[(j, i, 1)] > params.density / 9.0);
            assert!(local.cells[(j, i, 3)] < params.density / 9.0);
            assert!(local.cells[(j, i, 5)] > params.density / 36.0);
            assert!(local.cells[(j, i, 8)] > params.density / 36.0);
            assert!(local.cells[(j, i, 6)] < params.density / 36.0);
            assert!(local.cells[(j, i, 7)] < params.density / 36.0);
        }
    }

    #[test]
    fn accelerate_flow_out_of_strip_is_noop() {
        let params = make_params();
        let mut local = uniform_local(&params, 1);
        let before = local.cells.clone();

        // accel row (global 2) is not in a 1-row strip starting at offset 0
        accelerate_flow(&mut local, params.accel_row(), 0, params.density, params.accel);

        assert_eq!(local.cells, before);
    }

    #[test]
    fn rebound_swaps_opposite_directions() {
        let params = make_params();
        let mut local = uniform_local(&params, params.ny);
        for i in 0..params.nx {
            local.obstacles[(1, i)] = true;
            for k in 0..9 {
                local.tmp_cells[(1, i, k)] = (k + 1) as f32;
            }
        }

        rebound(&mut local);

        for i in 0..params.nx {
            assert_eq!(local.cells[(1, i, 1)], 3.0);
            assert_eq!(local.cells[(1, i, 3)], 1.0);
            assert_eq!(local.cells[(1, i, 2)], 4.0);
            assert_eq!(local.cells[(1, i, 4)], 2.0);
            assert_eq!(local.cells[(1, i, 5)], 7.0);
            assert_eq!(local.cells[(1, i, 7)], 5.0);
            assert_eq!(local.cells[(1, i, 6)], 8.0);
            assert_eq!(local.cells[(1, i, 8)], 6.0);
        }
    }

    #[test]
    fn collision_relaxes_uniform_state_to_itself() {
        let params = make_params();
        let mut local = uniform_local(&params, params.ny);

        collision(&mut local, params.omega);

        let eq = weights::equilibrium_at_rest(params.density);
        for j in 1..=params.ny {
            for i in 0..params.nx {
                for k in 0..9 {
                    assert!((local.cells[(j, i, k)] - eq[k]).abs() < 1e-6);
                }
            }
        }
    }

    #[test]
    fn propagate_wraps_horizontally_and_uses_halos() {
        let params = make_params();
        let mut local = uniform_local(&params, params.ny);
        // set distinguishable halo rows so propagate pulls from them
        for i in 0..params.nx {
            for k in 0..9 {
                local.cells[(0, i, k)] = 9.0;
                local.cells[(params.ny + 1, i, k)] = 9.0;
            }
        }

        propagate(&mut local);

        // row 1's south neighbor (direction 4) comes from local row 2, not
        // the halo, so it should stay at the uniform equilibrium value.
        let eq = weights::equilibrium_at_rest(params.density);
        assert!((local.tmp_cells[(1, 0, 4)] - eq[4]).abs() < 1e-6);
        // row 1's north neighbor (direction 2) comes from local row 0 (halo).
        assert_eq!(local.tmp_cells[(1, 0, 2)], 9.0);
    }
}
