use crate::model::Task;

/// Receives one callback per simulated task while a batch is processed.
pub trait ProgressObserver {
    fn on_batch(&self, total: usize) {
        let _ = total;
    }

    /// `index` is 1-based; `balance` is the point total after crediting.
    fn on_task(&self, index: usize, task: &Task, balance: u64);
}

pub struct NoopObserver;

impl ProgressObserver for NoopObserver {
    fn on_task(&self, _index: usize, _task: &Task, _balance: u64) {}
}
