//! Synchronous rendezvous message passing emulating the MPI ring described
//! in §4.E/§4.K. Every channel is zero-capacity (`bounded(0)`): a `send`
//! does not return until the matching `recv` has started, exactly as §5
//! requires for "rendezvous" sends.

use crossbeam::channel::{bounded, Receiver, Sender};
use ndarray::{Array2, Array3, ArrayView2, Axis};

use crate::decomposition::RankPlan;
use crate::errors::{SolverError, SolverResult};
use crate::state::LocalGrid;

type RowMsg = Array2<f32>;

fn chan_err(tag: &'static str, reason: impl std::fmt::Display) -> SolverError {
    SolverError::Exchange {
        tag,
        reason: reason.to_string(),
    }
}

/// Per-rank handles into the halo ring (population rows only — tag 0 in
/// §4.E; obstacle rows are exchanged once, at scatter time, per the design
/// note in §9).
pub struct RingLinks {
    send_bottom: Sender<RowMsg>,
    recv_top_halo: Receiver<RowMsg>,
    send_top: Sender<RowMsg>,
    recv_bottom_halo: Receiver<RowMsg>,
    /// True when this rank is its own ring neighbor (`num_procs == 1`). A
    /// zero-capacity channel round trip to oneself on a single thread would
    /// block forever, since nothing concurrently receives; the halo is
    /// copied directly instead.
    self_loop: bool,
}

/// Build one `RingLinks` per rank. Each directed ring edge gets its own
/// zero-capacity channel so a send rendezvouses with exactly one matching
/// receive.
pub fn build_rings(plans: &[RankPlan]) -> Vec<RingLinks> {
    let num_procs = plans.len();

    // bottom_channels[r]: carries r's bottom computational row, consumed by
    // below(r) as its top halo.
    let bottom_channels: Vec<(Sender<RowMsg>, Receiver<RowMsg>)> =
        (0..num_procs).map(|_| bounded(0)).collect();
    // top_channels[r]: carries r's top computational row, consumed by
    // above(r) as its bottom halo.
    let top_channels: Vec<(Sender<RowMsg>, Receiver<RowMsg>)> =
        (0..num_procs).map(|_| bounded(0)).collect();

    plans
        .iter()
        .map(|p| RingLinks {
            send_bottom: bottom_channels[p.rank].0.clone(),
            recv_top_halo: bottom_channels[p.above].1.clone(),
            send_top: top_channels[p.rank].0.clone(),
            recv_bottom_halo: top_channels[p.below].1.clone(),
            self_loop: p.num_procs == 1,
        })
        .collect()
}

/// Perform both paired exchanges of §4.E. Every rank reaches this function
/// with both sends and both receives still pending, and on a ring the
/// naive "send, then recv" order deadlocks for any `num_procs >= 2`: rank
/// `r`'s `send_bottom` rendezvous can only complete once `below(r)` posts
/// its `recv_top_halo`, but `below(r)` is itself stuck in its own
/// `send_bottom` first. Posting the two sends on a sibling thread so they
/// run concurrently with this thread's two receives breaks the circular
/// wait regardless of `num_procs` (even, odd, or prime) without requiring
/// rank-parity bookkeeping.
pub fn halo_exchange(local: &mut LocalGrid, links: &RingLinks) -> SolverResult<()> {
    if links.self_loop {
        let bottom_row = local.bottom_computational_row().0.to_owned();
        let top_row = local.top_computational_row().0.to_owned();
        write_row(&mut local.cells, local.rows + 1, bottom_row.view());
        write_row(&mut local.cells, 0, top_row.view());
        return Ok(());
    }

    let bottom_row = local.bottom_computational_row().0.to_owned();
    let top_row = local.top_computational_row().0.to_owned();

    std::thread::scope(|scope| -> SolverResult<()> {
        let sender = scope.spawn(|| -> SolverResult<()> {
            links
                .send_bottom
                .send(bottom_row)
                .map_err(|e| chan_err("halo_send_bottom", e))?;
            links
                .send_top
                .send(top_row)
                .map_err(|e| chan_err("halo_send_top", e))?;
            Ok(())
        });

        let top_halo: RowMsg = links
            .recv_top_halo
            .recv()
            .map_err(|e| chan_err("halo_recv_top", e))?;
        write_row(&mut local.cells, local.rows + 1, top_halo.view());

        let bottom_halo: RowMsg = links
            .recv_bottom_halo
            .recv()
            .map_err(|e| chan_err("halo_recv_bottom", e))?;
        write_row(&mut local.cells, 0, bottom_halo.view());

        sender.join().map_err(|_| chan_err("halo_send_thread", "send thread panicked"))?
    })
}

fn write_row(cells: &mut Array3<f32>, row: usize, data: ArrayView2<f32>) {
    cells.index_axis_mut(Axis(0), row).assign(&data);
}

/// One-shot ring exchange of the obstacle mask's halo rows, performed once
/// right after `Scatter` since obstacles never change during the run.
pub struct ObstacleRingLinks {
    send_bottom: Sender<Vec<bool>>,
    recv_top_halo: Receiver<Vec<bool>>,
    send_top: Sender<Vec<bool>>,
    recv_bottom_halo: Receiver<Vec<bool>>,
    self_loop: bool,
}

pub fn build_obstacle_rings(plans: &[RankPlan]) -> Vec<ObstacleRingLinks> {
    let num_procs = plans.len();
    let bottom_channels: Vec<(Sender<Vec<bool>>, Receiver<Vec<bool>>)> =
        (0..num_procs).map(|_| bounded(0)).collect();
    let top_channels: Vec<(Sender<Vec<bool>>, Receiver<Vec<bool>>)> =
        (0..num_procs).map(|_| bounded(0)).collect();

    plans
        .iter()
        .map(|p| ObstacleRingLinks {
            send_bottom: bottom_channels[p.rank].0.clone(),
            recv_top_halo: bottom_channels[p.above].1.clone(),
            send_top: top_channels[p.rank].0.clone(),
            recv_bottom_halo: top_channels[p.below].1.clone(),
            self_loop: p.num_procs == 1,
        })
        .collect()
}

/// Same deadlock hazard and fix as `halo_exchange`: both sends run on a
/// sibling thread concurrently with this thread's two receives.
pub fn obstacle_halo_exchange(local: &mut LocalGrid, links: &ObstacleRingLinks) -> SolverResult<()> {
    if links.self_loop {
        let bottom_row: Vec<bool> = (0..local.nx).map(|i| local.obstacles[(1, i)]).collect();
        let top_row: Vec<bool> = (0..local.nx).map(|i| local.obstacles[(local.rows, i)]).collect();
        for (i, v) in bottom_row.into_iter().enumerate() {
            local.obstacles[(local.rows + 1, i)] = v;
        }
        for (i, v) in top_row.into_iter().enumerate() {
            local.obstacles[(0, i)] = v;
        }
        return Ok(());
    }

    let bottom_row: Vec<bool> = (0..local.nx).map(|i| local.obstacles[(1, i)]).collect();
    let top_row: Vec<bool> = (0..local.nx).map(|i| local.obstacles[(local.rows, i)]).collect();

    let (top_halo, bottom_halo) = std::thread::scope(|scope| -> SolverResult<(Vec<bool>, Vec<bool>)> {
        let sender = scope.spawn(|| -> SolverResult<()> {
            links
                .send_bottom
                .send(bottom_row)
                .map_err(|e| chan_err("obstacle_send_bottom", e))?;
            links
                .send_top
                .send(top_row)
                .map_err(|e| chan_err("obstacle_send_top", e))?;
            Ok(())
        });

        let top_halo = links
            .recv_top_halo
            .recv()
            .map_err(|e| chan_err("obstacle_recv_top", e))?;
        let bottom_halo = links
            .recv_bottom_halo
            .recv()
            .map_err(|e| chan_err("obstacle_recv_bottom", e))?;

        sender.join().map_err(|_| chan_err("obstacle_send_thread", "send thread panicked"))??;
        Ok((top_halo, bottom_halo))
    })?;

    for (i, v) in top_halo.into_iter().enumerate() {
        local.obstacles[(local.rows + 1, i)] = v;
    }
    for (i, v) in bottom_halo.into_iter().enumerate() {
        local.obstacles[(0, i)] = v;
    }

    Ok(())
}
