use log::info;
use std::sync::atomic::{AtomicUsize, Ordering};

/// How many progress lines a phase logs at most, besides its start and end.
const STEPS: usize = 10;

/// Counts finished work items across worker threads and logs every tenth of
/// the total.
#[derive(Debug)]
pub struct Progress {
    label: &'static str,
    total: usize,
    every: usize,
    done: AtomicUsize,
}

impl Progress {
    pub fn new(label: &'static str, total: usize) -> Self {
        Progress {
            label,
            total,
            every: (total / STEPS).max(1),
            done: AtomicUsize::new(0),
        }
    }

    /// Record one finished item, returning how many are done so far.
    pub fn inc(&self) -> usize {
        let done = self.done.fetch_add(1, Ordering::Relaxed) + 1;
        if done % self.every == 0 || done == self.total {
            info!("{} {}/{}", self.label, done, self.total);
        }
        done
    }

    pub fn done(&self) -> usize {
        self.done.load(Ordering::Relaxed)
    }
}
