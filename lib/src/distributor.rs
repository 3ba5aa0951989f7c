//! One-shot assignment of a task batch to the cores of a processor.
use crate::{homogeneous::HomogeneousProcessor, task::Task};
use log::debug;

/// Hands every task, in batch order, to the core currently holding the fewest tasks.
///
/// Balancing is by task count only; task sizes are ignored. Ties go to the core
/// with the lowest index, so the result depends only on the batch order and the
/// number of cores. Called once before the first tick. Tasks never move afterwards.
pub fn distribute(tasks: &mut [Task], processor: &mut HomogeneousProcessor) {
    for task in tasks.iter_mut() {
        let core_index = processor.get_least_loaded_core_index();
        processor.enqueue(core_index, task);
    }
    debug!(
        "Distributed {} tasks, loads per core: {:?}",
        tasks.len(),
        processor
            .get_cores()
            .iter()
            .map(|core| core.load())
            .collect::<Vec<usize>>()
    );
}
