//! Driver state machine (§4.F): `Init -> Scatter -> Loop(t) -> Gather ->
//! Report -> Finalize`. Each "process" of the distilled spec is emulated by
//! one scoped OS thread (§4.K); rank 0's thread additionally owns the
//! global grid and drives scatter/gather.

use std::path::PathBuf;
use std::thread;

use crossbeam::channel::{bounded, Receiver, Sender};
use indicatif::{ProgressBar, ProgressStyle};
use ndarray::{Array2, Array3};

use crate::decomposition::{self, RankPlan};
use crate::errors::{SolverError, SolverResult};
use crate::exchange::{self, ObstacleRingLinks, RingLinks};
use crate::io::{obstacle_file, output, params_file};
use crate::reduction;
use crate::solvers::kernel;
use crate::state::{GlobalGrid, LocalGrid, Params};

type Strip = (Array3<f32>, Array2<bool>);
type GatherMsg = (Strip, Vec<f64>);

pub struct RunConfig {
    pub param_path: PathBuf,
    pub obstacle_path: PathBuf,
    pub av_vels_path: PathBuf,
    pub final_state_path: PathBuf,
    pub num_procs: usize,
}

pub struct RunReport {
    pub reynolds_number: f64,
    pub final_av_vel: f64,
}

fn chan_err(tag: &'static str, reason: impl std::fmt::Display) -> SolverError {
    SolverError::Exchange {
        tag,
        reason: reason.to_string(),
    }
}

pub fn run(config: &RunConfig) -> SolverResult<RunReport> {
    log::info!("Init: loading parameters from {}", config.param_path.display());
    let params = params_file::load(&config.param_path)?;
    params.validate(config.num_procs)?;

    log::info!(
        "Init: rank 0 loading obstacles from {}",
        config.obstacle_path.display()
    );
    let mut global = GlobalGrid::initialize(&params);
    obstacle_file::load(&config.obstacle_path, &mut global)?;
    let n_flow = global.count_flow_cells();

    let plans = decomposition::plan(params.ny, config.num_procs)?;
    let rings: Vec<RingLinks> = exchange::build_rings(&plans);
    let obstacle_rings: Vec<ObstacleRingLinks> = exchange::build_obstacle_rings(&plans);

    let num_procs = plans.len();
    let mut scatter_senders: Vec<Sender<Strip>> = Vec::with_capacity(num_procs);
    let mut scatter_receivers: Vec<Option<Receiver<Strip>>> = Vec::with_capacity(num_procs);
    for _ in 0..num_procs {
        let (s, r) = bounded::<Strip>(0);
        scatter_senders.push(s);
        scatter_receivers.push(Some(r));
    }

    let mut gather_senders: Vec<Option<Sender<GatherMsg>>> = Vec::with_capacity(num_procs);
    let mut gather_receivers: Vec<Receiver<GatherMsg>> = Vec::with_capacity(num_procs);
    for _ in 0..num_procs {
        let (s, r) = bounded::<GatherMsg>(0);
        gather_senders.push(Some(s));
        gather_receivers.push(r);
    }

    let progress = (params.max_iters > 64).then(|| {
        let pb = ProgressBar::new(params.max_iters as u64);
        pb.set_style(
            ProgressStyle::with_template("{msg} [{bar:40.cyan/blue}] {pos}/{len}")
                .unwrap()
                .progress_chars("=>-"),
        );
        pb.set_message("timestep loop");
        pb
    });

    log::info!(
        "Scatter: distributing {} rows across {} ranks",
        params.ny, num_procs
    );

    let mut raw_sums = vec![0.0f64; params.max_iters];

    thread::scope(|scope| -> SolverResult<()> {
        let mut worker_handles = Vec::with_capacity(num_procs - 1);

        for ((plan, ring), obstacle_ring) in plans
            .iter()
            .skip(1)
            .copied()
            .zip(rings.iter().skip(1))
            .zip(obstacle_rings.iter().skip(1))
        {
            let scatter_recv = scatter_receivers[plan.rank].take().unwrap();
            let gather_send = gather_senders[plan.rank].take().unwrap();
            let params = params;
            let h = scope.spawn(move || {
                worker_rank(plan, &scatter_recv, &gather_send, ring, obstacle_ring, &params)
            });
            worker_handles.push(h);
        }

        rank0(
            &plans,
            &mut global,
            &scatter_senders,
            &gather_receivers,
            &rings[0],
            &obstacle_rings[0],
            &params,
            progress.as_ref(),
            &mut raw_sums,
        )?;

        for h in worker_handles {
            h.join().map_err(|_| SolverError::Exchange {
                tag: "driver::join",
                reason: "worker rank thread panicked".into(),
            })??;
        }

        Ok(())
    })?;

    if let Some(pb) = &progress {
        pb.finish_and_clear();
    }

    log::info!("Report: normalizing average velocity and writing output files");
    let av_vels = reduction::normalize(&raw_sums, n_flow);
    output::write_av_vels(&config.av_vels_path, &av_vels)?;
    output::write_final_state(&config.final_state_path, &global, params.density)?;

    let final_av_vel = av_vels.last().copied().unwrap_or(0.0);
    let viscosity = (2.0 / params.omega as f64 - 1.0) / 6.0;
    let reynolds_number = final_av_vel * params.reynolds_dim as f64 / viscosity;

    log::info!(
        "Finalize: {} timesteps complete, Reynolds number = {reynolds_number:.6}",
        params.max_iters
    );

    Ok(RunReport {
        reynolds_number,
        final_av_vel,
    })
}

#[allow(clippy::too_many_arguments)]
fn rank0(
    plans: &[RankPlan],
    global: &mut GlobalGrid,
    scatter_senders: &[Sender<Strip>],
    gather_receivers: &[Receiver<GatherMsg>],
    ring: &RingLinks,
    obstacle_ring: &ObstacleRingLinks,
    params: &Params,
    progress: Option<&ProgressBar>,
    raw_sums: &mut [f64],
) -> SolverResult<()> {
    let plan = plans[0];

    for other in plans.iter().skip(1) {
        let strip = global.row_strip(other.row_offset, other.rows);
        scatter_senders[other.rank]
            .send(strip)
            .map_err(|e| chan_err("scatter_send", e))?;
    }

    let (own_cells, own_obstacles) = global.row_strip(plan.row_offset, plan.rows);
    let mut local = LocalGrid::new(params.nx, plan.rows);
    local.install_strip(&own_cells, &own_obstacles);

    exchange::obstacle_halo_exchange(&mut local, obstacle_ring)?;

    run_timestep_loop(&mut local, plan, params, ring, progress, raw_sums)?;

    let (final_cells, final_obstacles) = local.extract_strip();
    global.set_row_strip(plan.row_offset, &final_cells, &final_obstacles);

    for other in plans.iter().skip(1) {
        let ((cells, obstacles), their_sums) =
            gather_receivers[other.rank].recv().map_err(|e| chan_err("gather_recv", e))?;
        global.set_row_strip(other.row_offset, &cells, &obstacles);
        for (t, v) in their_sums.iter().enumerate() {
            raw_sums[t] += v;
        }
    }

    Ok(())
}

fn worker_rank(
    plan: RankPlan,
    scatter_recv: &Receiver<Strip>,
    gather_send: &Sender<GatherMsg>,
    ring: &RingLinks,
    obstacle_ring: &ObstacleRingLinks,
    params: &Params,
) -> SolverResult<()> {
    let (cells, obstacles) = scatter_recv.recv().map_err(|e| chan_err("scatter_recv", e))?;
    let mut local = LocalGrid::new(params.nx, plan.rows);
    local.install_strip(&cells, &obstacles);

    exchange::obstacle_halo_exchange(&mut local, obstacle_ring)?;

    let mut raw_sums = vec![0.0f64; params.max_iters];
    run_timestep_loop(&mut local, plan, params, ring, None, &mut raw_sums)?;

    let strip = local.extract_strip();
    gather_send
        .send((strip, raw_sums))
        .map_err(|e| chan_err("gather_send", e))?;
    Ok(())
}

fn run_timestep_loop(
    local: &mut LocalGrid,
    plan: RankPlan,
    params: &Params,
    ring: &RingLinks,
    progress: Option<&ProgressBar>,
    raw_sums: &mut [f64],
) -> SolverResult<()> {
    let accel_row = params.accel_row();
    for t in 0..params.max_iters {
        exchange::halo_exchange(local, ring)?;
        kernel::accelerate_flow(local, accel_row, plan.row_offset, params.density, params.accel);
        kernel::propagate(local);
        kernel::rebound(local);
        kernel::collision(local, params.omega);
        raw_sums[t] = reduction::local_partial_sum(local);
        if let Some(pb) = progress {
            pb.inc(1);
        }
    }
    Ok(())
}
