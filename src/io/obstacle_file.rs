//! Obstacle file loader (§6): zero or more `x y 1` lines.

use std::fs;
use std::path::Path;

use crate::errors::{SolverError, SolverResult};
use crate::state::GlobalGrid;

const TAG: &str = "io::obstacle_file";

/// Parse and apply the obstacle list to `grid`. Coordinates out of range or
/// a third field other than `1` are fatal input errors (§7).
pub fn load(path: &Path, grid: &mut GlobalGrid) -> SolverResult<()> {
    let text = fs::read_to_string(path).map_err(|e| SolverError::io(TAG, path.display().to_string(), e))?;

    for (lineno, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let mut parts = line.split_whitespace();
        let x_raw = parts.next().ok_or_else(|| malformed(path, lineno, line))?;
        let y_raw = parts.next().ok_or_else(|| malformed(path, lineno, line))?;
        let flag_raw = parts.next().ok_or_else(|| malformed(path, lineno, line))?;
        if parts.next().is_some() {
            return Err(malformed(path, lineno, line));
        }

        let x: i64 = x_raw.parse().map_err(|_| malformed(path, lineno, line))?;
        let y: i64 = y_raw.parse().map_err(|_| malformed(path, lineno, line))?;
        let flag: i32 = flag_raw.parse().map_err(|_| malformed(path, lineno, line))?;
        if flag != 1 {
            return Err(malformed(path, lineno, line));
        }

        let (x, y) = GlobalGrid::validate_obstacle_coord(grid.nx, grid.ny, x, y)?;
        grid.set_obstacle(x, y);
    }

    Ok(())
}

fn malformed(path: &Path, lineno: usize, line: &str) -> SolverError {
    SolverError::Parse {
        tag: TAG,
        path: path.display().to_string(),
        line: lineno + 1,
        reason: format!("expected `x y 1`, got `{line}`"),
    }
}
