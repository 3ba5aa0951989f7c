//! Per-run simulation context and the tick loop that drives it to completion.
use crate::{
    clock::FrameClock,
    config::SimulationConfig,
    core::ProcessResult,
    distributor::distribute,
    error::SimulationError,
    homogeneous::HomogeneousProcessor,
    output_log::{ExecutionMode, ProcessorLog, RunLog, TaskLog},
    snapshot::{CoreSnapshot, ProcessorSnapshot},
    task::{create_task_batch, Task, TaskId},
};
use log::info;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulationState {
    Running,
    Finished,
}

/// Answer of the presentation layer at each tick boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickControl {
    Continue,
    Cancel,
}

pub trait SimulationObserver {
    fn on_tick(&mut self, snapshot: &ProcessorSnapshot) -> TickControl;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl SimulationObserver for NullObserver {
    fn on_tick(&mut self, _snapshot: &ProcessorSnapshot) -> TickControl {
        TickControl::Continue
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    Finished(RunLog),
    /// Stopped from outside; nothing is reported for this run.
    Cancelled { tick: u64 },
}

/// State of a single run: the task batch, the cores owning it and the run logs.
///
/// A context is built per run and dropped when the run ends. Tasks are assigned
/// to cores once, on construction.
#[derive(Debug, Clone)]
pub struct SimulationContext {
    mode: ExecutionMode,
    tasks: Vec<Task>,
    processor: HomogeneousProcessor,
    state: SimulationState,
    current_tick: u64,
    done_count: usize,
    completion_order: Vec<TaskId>,
    task_logs: Vec<TaskLog>,
    processor_log: ProcessorLog,
}

impl SimulationContext {
    pub fn new(mode: ExecutionMode, task_sizes: &[f64], num_cores: usize) -> Self {
        let mut tasks = create_task_batch(task_sizes);
        let mut processor = HomogeneousProcessor::new(num_cores);
        distribute(&mut tasks, &mut processor);

        let mut processor_log = ProcessorLog::new(num_cores);
        for task in tasks.iter() {
            let Some(core_id) = task.core_id() else {
                panic!("Task {} was not assigned to any core", task.id());
            };
            processor_log.core_logs[core_id].assigned_tasks += 1;
            processor_log.core_logs[core_id].total_work += task.total_size();
        }
        let task_logs = tasks.iter().map(TaskLog::new).collect();

        Self {
            mode,
            tasks,
            processor,
            state: SimulationState::Running,
            current_tick: 0,
            done_count: 0,
            completion_order: Vec::new(),
            task_logs,
            processor_log,
        }
    }

    /// Advances every core, in creation order, by `work_amount` and returns the
    /// tasks finished during this tick.
    ///
    /// The result only depends on the current state and `work_amount`, so any
    /// cadence can drive it. The run finishes once every task is complete.
    pub fn step(&mut self, work_amount: f64) -> Vec<TaskId> {
        assert!(
            self.state == SimulationState::Running,
            "Cannot step a finished simulation"
        );
        self.current_tick += 1;

        let mut finish_tasks = Vec::new();
        let process_result = self.processor.process(&mut self.tasks, work_amount);
        for (core_id, result) in process_result.into_iter().enumerate() {
            match result {
                ProcessResult::Idle => {}
                ProcessResult::Continue => {
                    self.processor_log.core_logs[core_id].busy_ticks += 1;
                }
                ProcessResult::Done(task_id) => {
                    self.processor_log.core_logs[core_id].busy_ticks += 1;
                    let task_log = &mut self.task_logs[task_id];
                    task_log.start_tick.get_or_insert(self.current_tick);
                    task_log.finish_tick = Some(self.current_tick);
                    self.completion_order.push(task_id);
                    finish_tasks.push(task_id);
                }
            }
        }
        for core in self.processor.get_cores() {
            if let Some(task_id) = core.processing_task() {
                self.task_logs[task_id]
                    .start_tick
                    .get_or_insert(self.current_tick);
            }
        }

        self.done_count = self.tasks.iter().filter(|task| task.is_complete()).count();
        if self.done_count == self.tasks.len() {
            self.state = SimulationState::Finished;
        }
        finish_tasks
    }

    pub fn snapshot(&self) -> ProcessorSnapshot {
        ProcessorSnapshot {
            tick: self.current_tick,
            core_snapshots: self
                .processor
                .get_cores()
                .iter()
                .map(|core| CoreSnapshot::new(core, &self.tasks))
                .collect(),
            done_count: self.done_count,
            total_tasks: self.tasks.len(),
        }
    }

    pub fn into_run_log(mut self, elapsed: Duration) -> RunLog {
        self.processor_log
            .calculate_cores_utilization(self.current_tick);
        self.processor_log.calculate_average_utilization();
        self.processor_log.calculate_variance_utilization();

        RunLog {
            mode: self.mode,
            number_of_cores: self.processor.get_number_of_cores(),
            number_of_tasks: self.tasks.len(),
            total_ticks: self.current_tick,
            elapsed_secs: elapsed.as_secs_f64(),
            completion_order: self.completion_order,
            task_logs: self.task_logs,
            processor_log: self.processor_log,
        }
    }

    pub fn mode(&self) -> ExecutionMode {
        self.mode
    }

    pub fn state(&self) -> SimulationState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state == SimulationState::Finished
    }

    pub fn current_tick(&self) -> u64 {
        self.current_tick
    }

    pub fn done_count(&self) -> usize {
        self.done_count
    }

    pub fn total_tasks(&self) -> usize {
        self.tasks.len()
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn processor(&self) -> &HomogeneousProcessor {
        &self.processor
    }

    pub fn completion_order(&self) -> &[TaskId] {
        &self.completion_order
    }
}

/// Ticks `context` until every task is complete or `observer` cancels the run.
///
/// Each tick turns the interval reported by `clock` into work through
/// `speed_factor`, advances the context, then hands a snapshot to `observer`.
/// The elapsed time is real wall time from the first tick to the finishing one.
pub fn run_simulation<C, O>(
    mut context: SimulationContext,
    clock: &mut C,
    speed_factor: f64,
    observer: &mut O,
) -> RunOutcome
where
    C: FrameClock + ?Sized,
    O: SimulationObserver + ?Sized,
{
    info!(
        "Start {:?} run: {} tasks on {} cores",
        context.mode(),
        context.total_tasks(),
        context.processor().get_number_of_cores()
    );
    let start_time = Instant::now();
    loop {
        let work_amount = clock.tick() * speed_factor;
        context.step(work_amount);

        if context.is_finished() {
            let elapsed = start_time.elapsed();
            observer.on_tick(&context.snapshot());
            let run_log = context.into_run_log(elapsed);
            info!(
                "{:?} run finished after {} ticks in {:.2} s",
                run_log.mode, run_log.total_ticks, run_log.elapsed_secs
            );
            return RunOutcome::Finished(run_log);
        }

        if observer.on_tick(&context.snapshot()) == TickControl::Cancel {
            info!(
                "{:?} run cancelled at tick {}",
                context.mode(),
                context.current_tick()
            );
            return RunOutcome::Cancelled {
                tick: context.current_tick(),
            };
        }
    }
}

/// Runs one mode of the comparison: a single core for the serial mode, the
/// configured number of cores for the parallel one.
///
/// `config` is validated before any core is built.
pub fn simulate<C, O>(
    config: &SimulationConfig,
    mode: ExecutionMode,
    task_sizes: &[f64],
    clock: &mut C,
    observer: &mut O,
) -> Result<RunOutcome, SimulationError>
where
    C: FrameClock + ?Sized,
    O: SimulationObserver + ?Sized,
{
    config.validate()?;
    let num_cores = match mode {
        ExecutionMode::Serial => 1,
        ExecutionMode::Parallel => config.number_of_cores,
    };
    let context = SimulationContext::new(mode, task_sizes, num_cores);
    Ok(run_simulation(context, clock, config.speed_factor, observer))
}
