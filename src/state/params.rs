use crate::errors::{SolverError, SolverResult};

/// Immutable run parameters (§3). Loaded once at `Init` and never mutated.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Params {
    pub nx: usize,
    pub ny: usize,
    pub max_iters: usize,
    pub reynolds_dim: i32,
    pub density: f32,
    pub accel: f32,
    pub omega: f32,
}

impl Params {
    /// Validate the BGK stability invariant and basic positivity constraints.
    /// `num_procs` is checked against `ny` per §4.D ("ny should be at least
    /// as large as the process count along the partitioned axis").
    pub fn validate(&self, num_procs: usize) -> SolverResult<()> {
        if self.nx == 0 {
            return Err(SolverError::InvalidParam {
                field: "nx",
                value: self.nx.to_string(),
            });
        }
        if self.ny < 2 {
            return Err(SolverError::InvalidParam {
                field: "ny",
                value: self.ny.to_string(),
            });
        }
        if !(self.omega > 0.0 && self.omega < 2.0) {
            return Err(SolverError::InvalidParam {
                field: "omega",
                value: self.omega.to_string(),
            });
        }
        if self.ny < num_procs {
            return Err(SolverError::Decomposition {
                reason: format!(
                    "ny ({}) must be >= process count ({})",
                    self.ny, num_procs
                ),
            });
        }
        Ok(())
    }

    /// Global row targeted by `accelerate_flow`: one below the top row.
    #[inline]
    pub fn accel_row(&self) -> usize {
        self.ny - 2
    }
}
