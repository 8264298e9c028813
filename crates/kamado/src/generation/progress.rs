use std::time::{Duration, Instant};
use uuid::Uuid;

/// Per-batch progress reporting for a generation run.
///
/// Purely observational, reports through the `log` facade.
pub(crate) struct Progress {
    description: &'static str,
    run_id: Uuid,
    total_batches: Option<usize>,
    batches: usize,
    examples: usize,
    started: Instant,
}

impl Progress {
    pub(crate) fn new(description: &'static str, total_batches: Option<usize>) -> Self {
        let run_id = Uuid::new_v4();
        log::info!("{} [{}]: starting", description, run_id);
        Self {
            description,
            run_id,
            total_batches,
            batches: 0,
            examples: 0,
            started: Instant::now(),
        }
    }

    /// Record a finished batch of `examples` examples.
    pub(crate) fn tick(&mut self, examples: usize) {
        self.batches += 1;
        self.examples += examples;
        let count = match self.total_batches {
            Some(total) => format!("{}/{}", self.batches, total),
            None => self.batches.to_string(),
        };
        log::info!(
            "{} [{}]: {} batch ({} examples) | {:.2} batch/s",
            self.description,
            self.run_id,
            count,
            self.examples,
            self.rate()
        );
    }

    pub(crate) fn finish(&self) {
        log::info!(
            "{} [{}]: done, {} batches, {} examples in {:.1?}",
            self.description,
            self.run_id,
            self.batches,
            self.examples,
            self.started.elapsed()
        );
    }

    /// Batches per second since the run started
    pub(crate) fn rate(&self) -> f64 {
        rate(self.batches, self.started.elapsed())
    }

    #[cfg(test)]
    pub(crate) fn batches(&self) -> usize {
        self.batches
    }

    #[cfg(test)]
    pub(crate) fn examples(&self) -> usize {
        self.examples
    }
}

fn rate(count: usize, elapsed: Duration) -> f64 {
    count as f64 / elapsed.as_secs_f64().max(f64::EPSILON)
}
