//! Row-strip partitioning (§4.D): assign each rank a near-equal contiguous
//! band of global rows, plus the ring-neighbor ranks used by halo exchange.

use crate::errors::{SolverError, SolverResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RankPlan {
    pub rank: usize,
    pub num_procs: usize,
    /// Global row index held at local computational row 1.
    pub row_offset: usize,
    /// Number of computational rows this rank owns.
    pub rows: usize,
    pub below: usize,
    pub above: usize,
}

/// Build the per-rank decomposition plan for `ny` rows split over
/// `num_procs` ranks. Rank `P-1` absorbs the remainder (`ny mod P`).
pub fn plan(ny: usize, num_procs: usize) -> SolverResult<Vec<RankPlan>> {
    if num_procs == 0 {
        return Err(SolverError::Decomposition {
            reason: "process count must be >= 1".into(),
        });
    }
    if ny < num_procs {
        return Err(SolverError::Decomposition {
            reason: format!("ny ({ny}) must be >= process count ({num_procs})"),
        });
    }

    let base_rows = ny / num_procs;
    let mut plans = Vec::with_capacity(num_procs);
    for r in 0..num_procs {
        let row_offset = r * base_rows;
        let rows = if r == num_procs - 1 {
            ny - row_offset
        } else {
            base_rows
        };
        let below = (r + num_procs - 1) % num_procs;
        let above = (r + 1) % num_procs;
        plans.push(RankPlan {
            rank: r,
            num_procs,
            row_offset,
            rows,
            below,
            above,
        });
    }
    Ok(plans)
}
