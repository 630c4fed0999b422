use std::path::PathBuf;
use std::process::ExitCode;

use lbm_d2q9_rs::{driver::RunConfig, run};

fn main() -> ExitCode {
    logger_bro::init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() != 3 {
        eprintln!("usage: {} <paramfile> <obstaclefile>", args.first().map(String::as_str).unwrap_or("lbm"));
        return ExitCode::FAILURE;
    }

    let num_procs = std::env::var("LBM_PROCS")
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or_else(|| std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1));

    let config = RunConfig {
        param_path: PathBuf::from(&args[1]),
        obstacle_path: PathBuf::from(&args[2]),
        av_vels_path: PathBuf::from("av_vels.dat"),
        final_state_path: PathBuf::from("final_state.dat"),
        num_procs,
    };

    match run(&config) {
        Ok(report) => {
            log::info!(
                "run complete: final average velocity = {:.12e}, Reynolds number = {:.6}",
                report.final_av_vel, report.reynolds_number
            );
            println!("Reynolds number:\t\t{:.12e}", report.reynolds_number);
            ExitCode::SUCCESS
        }
        Err(err) => {
            log::error!("{err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
