mod presenter;
mod summary;

use clap::Parser;
use lib::clock::{FixedClock, FrameClock, ThrottledClock};
use lib::config::*;
use lib::error::SimulationError;
use lib::output_log::{ComparisonReport, ExecutionMode, RunLog};
use lib::simulator::{simulate, RunOutcome};
use log::info;
use presenter::{wait_for_enter, TerminalPresenter};
use std::error::Error;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use summary::format_summary;

#[derive(Parser)]
#[clap(
    name = "serial_vs_parallel",
    version = "1.0",
    about = "About:
    Runs a batch of tasks on a single core, then spreads the same batch over several cores
    with a greedy count-balancing assignment, and compares the two execution times."
)]
struct ArgParser {
    ///Number of tasks.
    #[clap(
        short = 't',
        long = "number_of_tasks",
        default_value_t = DEFAULT_NUMBER_OF_TASKS as i64,
        allow_negative_numbers = true
    )]
    number_of_tasks: i64,
    ///Number of processing cores in parallel mode.
    #[clap(
        short = 'c',
        long = "number_of_cores",
        default_value_t = DEFAULT_NUMBER_OF_CORES as i64,
        allow_negative_numbers = true
    )]
    number_of_cores: i64,
    ///Pull out-of-range counts back into bounds instead of rejecting them.
    #[clap(long = "clamp")]
    clamp: bool,
    ///Work units consumed per millisecond of frame time.
    #[clap(short = 's', long = "speed_factor", default_value_t = DEFAULT_SPEED_FACTOR)]
    speed_factor: f64,
    ///Maximum number of ticks per second.
    #[clap(short = 'r', long = "tick_rate", default_value_t = DEFAULT_TICK_RATE)]
    tick_rate: u32,
    ///Seed for the task sizes.
    #[clap(long = "seed")]
    seed: Option<u64>,
    ///Do not pace ticks with the wall clock; every tick counts as one full frame.
    #[clap(long = "headless")]
    headless: bool,
    ///Draw new task sizes for the parallel mode.
    #[clap(long = "fresh_batch")]
    fresh_batch: bool,
    ///Redraw the terminal every N ticks.
    #[clap(long = "render_every", default_value_t = 1)]
    render_every: u64,
    ///Do not wait for Enter between the modes.
    #[clap(long = "no_pause")]
    no_pause: bool,
    ///Print the comparison report as YAML.
    #[clap(long = "yaml")]
    yaml: bool,
}

fn create_config(arg: &ArgParser) -> Result<SimulationConfig, Box<dyn Error>> {
    let counts = if arg.clamp {
        SimulationConfig::with_clamped_counts(arg.number_of_tasks, arg.number_of_cores)
    } else {
        SimulationConfig::with_counts(arg.number_of_tasks, arg.number_of_cores)?
    };
    let config = SimulationConfig {
        speed_factor: arg.speed_factor,
        tick_rate: arg.tick_rate,
        seed: arg.seed,
        ..counts
    };
    config.validate()?;
    Ok(config)
}

fn run_mode(
    arg: &ArgParser,
    config: &SimulationConfig,
    mode: ExecutionMode,
    task_sizes: &[f64],
    shutdown: &Arc<AtomicBool>,
) -> Result<Option<RunLog>, SimulationError> {
    let mut clock: Box<dyn FrameClock> = if arg.headless {
        Box::new(FixedClock::from_tick_rate(config.tick_rate))
    } else {
        Box::new(ThrottledClock::new(config.tick_rate))
    };
    let mut presenter = TerminalPresenter::new(mode, arg.render_every, shutdown.clone());
    match simulate(config, mode, task_sizes, clock.as_mut(), &mut presenter)? {
        RunOutcome::Finished(run_log) => Ok(Some(run_log)),
        RunOutcome::Cancelled { .. } => Ok(None),
    }
}

fn intermission(arg: &ArgParser, message: &str, shutdown: &AtomicBool) -> bool {
    if arg.no_pause {
        println!("{}", message);
        return !shutdown.load(Ordering::Relaxed);
    }
    wait_for_enter(message, shutdown)
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let arg: ArgParser = ArgParser::parse();
    let config = create_config(&arg)?;

    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_clone = shutdown.clone();
    ctrlc::set_handler(move || {
        shutdown_clone.store(true, Ordering::Relaxed);
    })?;

    let mut rng = config.create_rng();
    let serial_task_sizes = config.generate_task_sizes(&mut rng);

    info!(
        "Running mode 1 (single) with {} tasks",
        config.number_of_tasks
    );
    let Some(serial) = run_mode(
        &arg,
        &config,
        ExecutionMode::Serial,
        &serial_task_sizes,
        &shutdown,
    )?
    else {
        info!("User cancelled.");
        return Ok(());
    };
    let message = format!(
        "Mode 1 finished. Execution time: {:.2} s",
        serial.elapsed_secs
    );
    if !intermission(&arg, &message, &shutdown) {
        info!("User cancelled.");
        return Ok(());
    }

    let parallel_task_sizes = if arg.fresh_batch {
        config.generate_task_sizes(&mut rng)
    } else {
        serial_task_sizes
    };
    info!(
        "Running mode 2 (parallel) with {} cores and {} tasks",
        config.number_of_cores, config.number_of_tasks
    );
    let Some(parallel) = run_mode(
        &arg,
        &config,
        ExecutionMode::Parallel,
        &parallel_task_sizes,
        &shutdown,
    )?
    else {
        info!("User cancelled.");
        return Ok(());
    };
    let message = format!(
        "Mode 2 finished. Execution time: {:.2} s",
        parallel.elapsed_secs
    );
    if !intermission(&arg, &message, &shutdown) {
        info!("User cancelled.");
        return Ok(());
    }

    let report = ComparisonReport::new(serial, parallel);
    println!("{}", format_summary(&report));
    if arg.yaml {
        println!("{}", report.to_yaml()?);
    }
    Ok(())
}
