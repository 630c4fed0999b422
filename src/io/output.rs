//! Output writers (§6): `av_vels.dat` and `final_state.dat`.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::errors::{SolverError, SolverResult};
use crate::state::weights::CS2;
use crate::state::GlobalGrid;

const AV_VELS_TAG: &str = "io::output::av_vels";
const FINAL_STATE_TAG: &str = "io::output::final_state";

/// Write one `"<t>:\t<value>\n"` line per timestep, value in scientific
/// notation with 12 digits after the decimal.
pub fn write_av_vels(path: &Path, av_vels: &[f64]) -> SolverResult<()> {
    let file = File::create(path).map_err(|e| SolverError::io(AV_VELS_TAG, path.display().to_string(), e))?;
    let mut w = BufWriter::new(file);
    for (t, v) in av_vels.iter().enumerate() {
        writeln!(w, "{}:\t{:.12e}", t, v).map_err(|e| SolverError::io(AV_VELS_TAG, path.display().to_string(), e))?;
    }
    w.flush().map_err(|e| SolverError::io(AV_VELS_TAG, path.display().to_string(), e))?;
    Ok(())
}

/// Write one `"<i> <j> <u_x> <u_y> <|u|> <p> <obstacle>\n"` line per cell.
/// Obstacle cells report zero velocity and pressure `density*CS2`;
/// non-obstacle cells report the computed pressure `rho_l*CS2`. The
/// obstacle column is indexed `obstacles[(j, i)]`, i.e. row-major by (j,
/// row; i, column) — the source's `obstacles[ii*nx+jj]` transposition is a
/// bug (§9) and is not reproduced here.
pub fn write_final_state(path: &Path, grid: &GlobalGrid, density: f32) -> SolverResult<()> {
    let file =
        File::create(path).map_err(|e| SolverError::io(FINAL_STATE_TAG, path.display().to_string(), e))?;
    let mut w = BufWriter::new(file);

    for j in 0..grid.ny {
        for i in 0..grid.nx {
            let is_obstacle = grid.obstacles[(j, i)];
            let (u_x, u_y, u_mag, pressure) = if is_obstacle {
                (0.0f32, 0.0f32, 0.0f32, density * CS2)
            } else {
                let mut s = [0.0f32; 9];
                for k in 0..9 {
                    s[k] = grid.cells[(j, i, k)];
                }
                let rho_l: f32 = s.iter().sum();
                let u_x = (s[1] + s[5] + s[8] - s[3] - s[6] - s[7]) / rho_l;
                let u_y = (s[2] + s[5] + s[6] - s[4] - s[7] - s[8]) / rho_l;
                let u_mag = (u_x * u_x + u_y * u_y).sqrt();
                (u_x, u_y, u_mag, rho_l * CS2)
            };

            writeln!(
                w,
                "{} {} {:.12e} {:.12e} {:.12e} {:.12e} {}",
                i,
                j,
                u_x,
                u_y,
                u_mag,
                pressure,
                is_obstacle as i32
            )
            .map_err(|e| SolverError::io(FINAL_STATE_TAG, path.display().to_string(), e))?;
        }
    }

    w.flush().map_err(|e| SolverError::io(FINAL_STATE_TAG, path.display().to_string(), e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Params;

    #[test]
    fn s1_no_obstacles_reports_rest_pressure() {
        let params = Params {
            nx: 4,
            ny: 4,
            max_iters: 0,
            reynolds_dim: 100,
            density: 0.1,
            accel: 0.005,
            omega: 1.0,
        };
        let grid = GlobalGrid::initialize(&params);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("final_state.dat");
        write_final_state(&path, &grid, params.density).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 16);
        for line in lines {
            let fields: Vec<&str> = line.split_whitespace().collect();
            let u_x: f32 = fields[2].parse().unwrap();
            let u_y: f32 = fields[3].parse().unwrap();
            let u_mag: f32 = fields[4].parse().unwrap();
            let p: f32 = fields[5].parse().unwrap();
            assert!(u_x.abs() < 1e-6);
            assert!(u_y.abs() < 1e-6);
            assert!(u_mag.abs() < 1e-6);
            assert!((p - params.density / 3.0).abs() < 1e-6);
        }
    }

    #[test]
    fn av_vels_empty_for_zero_iterations() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("av_vels.dat");
        write_av_vels(&path, &[]).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.is_empty());
    }
}
