use crate::{
    core::{Core, ProcessResult},
    task::Task,
};

/// A set of identical cores advanced together, in creation order.
#[derive(Debug, Clone)]
pub struct HomogeneousProcessor {
    cores: Vec<Core>,
}

impl HomogeneousProcessor {
    pub fn new(num_cores: usize) -> Self {
        assert!(num_cores > 0, "A processor needs at least one core");
        let cores = (0..num_cores).map(Core::new).collect::<Vec<Core>>();
        Self { cores }
    }

    pub fn enqueue(&mut self, core_id: usize, task: &mut Task) {
        self.cores[core_id].enqueue(task);
    }

    pub fn process(&mut self, tasks: &mut [Task], work_amount: f64) -> Vec<ProcessResult> {
        self.cores
            .iter_mut()
            .map(|core| core.process(tasks, work_amount))
            .collect()
    }

    pub fn get_number_of_cores(&self) -> usize {
        self.cores.len()
    }

    /// Index of the core holding the fewest tasks. Ties go to the lowest index.
    pub fn get_least_loaded_core_index(&self) -> usize {
        let mut least_loaded = 0;
        for (core_index, core) in self.cores.iter().enumerate().skip(1) {
            if core.load() < self.cores[least_loaded].load() {
                least_loaded = core_index;
            }
        }
        least_loaded
    }

    pub fn get_cores(&self) -> &[Core] {
        &self.cores
    }
}
