//! Parameter file loader (§6): seven newline-separated fields, in order.

use std::fs;
use std::path::Path;

use crate::errors::{SolverError, SolverResult};
use crate::state::Params;

const TAG: &str = "io::params_file";

pub fn load(path: &Path) -> SolverResult<Params> {
    let text = fs::read_to_string(path).map_err(|e| SolverError::io(TAG, path.display().to_string(), e))?;

    let mut fields = text.lines().enumerate().filter(|(_, l)| !l.trim().is_empty());

    let nx = next_field(&mut fields, path, "nx")?;
    let ny = next_field(&mut fields, path, "ny")?;
    let max_iters = next_field(&mut fields, path, "max_iters")?;
    let reynolds_dim = next_field(&mut fields, path, "reynolds_dim")?;
    let density = next_field(&mut fields, path, "density")?;
    let accel = next_field(&mut fields, path, "accel")?;
    let omega = next_field(&mut fields, path, "omega")?;

    Ok(Params {
        nx,
        ny,
        max_iters,
        reynolds_dim,
        density,
        accel,
        omega,
    })
}

fn next_field<'a, T, I>(lines: &mut I, path: &Path, field: &'static str) -> SolverResult<T>
where
    T: std::str::FromStr,
    I: Iterator<Item = (usize, &'a str)>,
{
    let (lineno, raw) = lines.next().ok_or_else(|| SolverError::Parse {
        tag: TAG,
        path: path.display().to_string(),
        line: 0,
        reason: format!("missing field `{field}`"),
    })?;

    raw.trim().parse::<T>().map_err(|_| SolverError::Parse {
        tag: TAG,
        path: path.display().to_string(),
        line: lineno + 1,
        reason: format!("expected {field}, got `{raw}`"),
    })
}
