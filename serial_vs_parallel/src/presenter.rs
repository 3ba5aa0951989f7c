use lib::{
    output_log::ExecutionMode,
    simulator::{SimulationObserver, TickControl},
    snapshot::ProcessorSnapshot,
};
use log::warn;
use std::{
    fmt::Write as _,
    io::{self, BufRead, Write},
    sync::{
        atomic::{AtomicBool, Ordering},
        mpsc::{self, Receiver, RecvTimeoutError},
        Arc,
    },
    thread,
    time::Duration,
};

const PROGRESS_BAR_WIDTH: usize = 60;
const CORE_BAR_WIDTH: usize = 24;
const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Renders `ratio` (clamped to `[0, 1]`) as a fixed-width bar.
pub fn render_bar(ratio: f64, width: usize) -> String {
    let filled = ((ratio.clamp(0.0, 1.0) * width as f64).round() as usize).min(width);
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}

pub fn render_frame(mode: ExecutionMode, snapshot: &ProcessorSnapshot) -> String {
    let percent = snapshot.progress_percent();
    let mut frame = String::new();
    let _ = writeln!(frame, "{}", mode.title());
    let _ = writeln!(
        frame,
        "Tasks done: {}/{}   Progress: {:.1}%",
        snapshot.done_count, snapshot.total_tasks, percent
    );
    let _ = writeln!(frame, "{}", render_bar(percent / 100.0, PROGRESS_BAR_WIDTH));
    let _ = writeln!(frame);
    for core in snapshot.core_snapshots.iter() {
        let _ = writeln!(
            frame,
            "Core {:<3} | queue:{:<4} {}",
            core.core_id + 1,
            core.backlog_len,
            render_bar(
                core.current_task_progress.unwrap_or_default(),
                CORE_BAR_WIDTH
            )
        );
    }
    frame
}

/// Draws every `render_every`-th tick to the terminal and turns the Ctrl-C flag
/// into a cancellation.
pub struct TerminalPresenter {
    mode: ExecutionMode,
    render_every: u64,
    shutdown: Arc<AtomicBool>,
}

impl TerminalPresenter {
    pub fn new(mode: ExecutionMode, render_every: u64, shutdown: Arc<AtomicBool>) -> Self {
        Self {
            mode,
            render_every: render_every.max(1),
            shutdown,
        }
    }

    fn should_render(&self, snapshot: &ProcessorSnapshot) -> bool {
        snapshot.tick % self.render_every == 0 || snapshot.done_count == snapshot.total_tasks
    }
}

impl SimulationObserver for TerminalPresenter {
    fn on_tick(&mut self, snapshot: &ProcessorSnapshot) -> TickControl {
        if self.shutdown.load(Ordering::Relaxed) {
            return TickControl::Cancel;
        }
        if self.should_render(snapshot) {
            let frame = render_frame(self.mode, snapshot);
            let mut stdout = io::stdout().lock();
            let drawn = write!(stdout, "{}{}", CLEAR_SCREEN, frame).and_then(|_| stdout.flush());
            if let Err(err) = drawn {
                warn!("Failed to draw frame: {}", err);
            }
        }
        TickControl::Continue
    }
}

const INPUT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Blocks until a line arrives on `lines` or `shutdown` is set.
///
/// Returns true when a line was read, false when Ctrl-C was pressed first.
fn wait_for_line(lines: &Receiver<()>, shutdown: &AtomicBool) -> bool {
    while !shutdown.load(Ordering::Relaxed) {
        match lines.recv_timeout(INPUT_POLL_INTERVAL) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                return !shutdown.load(Ordering::Relaxed)
            }
            Err(RecvTimeoutError::Timeout) => {}
        }
    }
    false
}

/// Shows `message` and blocks until Enter is pressed.
///
/// Stdin is read on a helper thread so Ctrl-C ends the wait right away.
/// Returns false in that case.
pub fn wait_for_enter(message: &str, shutdown: &AtomicBool) -> bool {
    println!("{}", message);
    println!("Press Enter to continue.");
    let (sender, receiver) = mpsc::channel();
    thread::spawn(move || {
        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(_) => {
                let _ = sender.send(());
            }
            Err(err) => warn!("Failed to read from stdin: {}", err),
        }
    });
    wait_for_line(&receiver, shutdown)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lib::snapshot::CoreSnapshot;

    fn create_snapshot(tick: u64, done_count: usize) -> ProcessorSnapshot {
        ProcessorSnapshot {
            tick,
            core_snapshots: vec![
                CoreSnapshot {
                    core_id: 0,
                    current_task_progress: Some(0.5),
                    backlog_len: 3,
                },
                CoreSnapshot {
                    core_id: 1,
                    current_task_progress: None,
                    backlog_len: 0,
                },
            ],
            done_count,
            total_tasks: 4,
        }
    }

    #[test]
    fn test_render_bar_normal() {
        assert_eq!(render_bar(0.0, 4), "[----]");
        assert_eq!(render_bar(0.5, 4), "[##--]");
        assert_eq!(render_bar(1.0, 4), "[####]");
    }

    #[test]
    fn test_render_bar_out_of_range() {
        assert_eq!(render_bar(1.7, 4), "[####]");
        assert_eq!(render_bar(-0.3, 4), "[----]");
    }

    #[test]
    fn test_render_frame_normal() {
        let frame = render_frame(ExecutionMode::Parallel, &create_snapshot(3, 1));
        let lines: Vec<&str> = frame.lines().collect();
        assert_eq!(lines[0], "MODE 2: PARALLEL PROCESSING + SCHEDULING");
        assert_eq!(lines[1], "Tasks done: 1/4   Progress: 25.0%");
        assert!(lines[4].starts_with("Core 1   | queue:3"));
        assert!(lines[4].ends_with(&render_bar(0.5, CORE_BAR_WIDTH)));
        assert!(lines[5].starts_with("Core 2   | queue:0"));
        assert!(lines[5].ends_with(&render_bar(0.0, CORE_BAR_WIDTH)));
    }

    #[test]
    fn test_terminal_presenter_cancel_on_shutdown() {
        let shutdown = Arc::new(AtomicBool::new(false));
        let mut presenter = TerminalPresenter::new(ExecutionMode::Serial, 1000, shutdown.clone());
        assert_eq!(
            presenter.on_tick(&create_snapshot(1, 0)),
            TickControl::Continue
        );
        shutdown.store(true, Ordering::Relaxed);
        assert_eq!(
            presenter.on_tick(&create_snapshot(2, 0)),
            TickControl::Cancel
        );
    }

    #[test]
    fn test_terminal_presenter_should_render() {
        let presenter =
            TerminalPresenter::new(ExecutionMode::Serial, 5, Arc::new(AtomicBool::new(false)));
        assert!(!presenter.should_render(&create_snapshot(3, 0)));
        assert!(presenter.should_render(&create_snapshot(5, 0)));
        assert!(presenter.should_render(&create_snapshot(7, 4)));
    }

    #[test]
    fn test_wait_for_line_input() {
        let (sender, receiver) = mpsc::channel();
        sender.send(()).unwrap();
        assert!(wait_for_line(&receiver, &AtomicBool::new(false)));
    }

    #[test]
    fn test_wait_for_line_shutdown_without_input() {
        let (sender, receiver) = mpsc::channel::<()>();
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_clone = shutdown.clone();
        let handle = thread::spawn(move || wait_for_line(&receiver, &shutdown_clone));
        thread::sleep(Duration::from_millis(20));
        shutdown.store(true, Ordering::Relaxed);
        assert!(!handle.join().unwrap());
        drop(sender);
    }

    #[test]
    fn test_wait_for_line_closed_input() {
        let (sender, receiver) = mpsc::channel::<()>();
        drop(sender);
        assert!(wait_for_line(&receiver, &AtomicBool::new(false)));
    }
}
