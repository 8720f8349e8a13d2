use crate::Error;
use log::*;
use rand::Rng;
use serde::Serialize;
use std::fmt;
use std::ops::Range;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub const DEFAULT_TOTAL_BATCHES: usize = 100;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SimulationConfig {
    /// How many values go into each sample
    pub sample_size: usize,
    /// How many sample means to collect
    pub target_sample_count: usize,
    /// The simulation is split into this many batches.  This only controls
    /// how often the caller gets to look at the results.
    pub total_batches: usize,
}

impl SimulationConfig {
    pub fn new(sample_size: usize, target_sample_count: usize) -> SimulationConfig {
        SimulationConfig {
            sample_size,
            target_sample_count,
            total_batches: DEFAULT_TOTAL_BATCHES,
        }
    }

    /// The number of samples drawn per batch, rounded up.  The last batch
    /// isn't shortened, so a run may overshoot `target_sample_count` by up
    /// to `total_batches - 1` samples.
    pub fn batch_size(&self) -> usize {
        (self.target_sample_count + self.total_batches - 1) / self.total_batches
    }

    fn validate(&self) -> Result<(), Error> {
        if self.sample_size == 0 {
            return Err(Error::InvalidSampleSize);
        }
        if self.target_sample_count == 0 {
            return Err(Error::InvalidTargetSampleCount);
        }
        if self.total_batches == 0 {
            return Err(Error::InvalidBatchCount);
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Idle,
    Running,
    Finished,
    Cancelled,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Status::Idle => "idle",
            Status::Running => "running",
            Status::Finished => "finished",
            Status::Cancelled => "cancelled",
        })
    }
}

/// Stops a running simulation from the outside.
///
/// The flag is only looked at between batches, so a cancelled run may
/// still complete the batch it's in the middle of.  Cloning gives another
/// handle to the same flag; it's fine to trigger it from another thread or
/// a signal handler.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// The part of the sample-mean series which was added by one batch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchReport {
    /// Zero-based
    pub index: usize,
    /// Where the new means live in `SimulationRun::sample_means()`
    pub means: Range<usize>,
}

/// One run of the resampling experiment: draw lots of samples (with
/// replacement) from the population, and record the mean of each.
///
/// The run doesn't go off and do the work by itself.  Call `step()` to do
/// one batch; in between calls you can look at the means collected so far,
/// redraw things, or cancel.
///
/// ```text
/// idle --start--> running --(last batch)--> finished
///                    |
///                    +--cancel--> cancelled
/// ```
///
/// `start()` may be called in any state.  It stops whatever was going on
/// and begins again with an empty series.
pub struct SimulationRun<'p> {
    population: &'p [f64],
    config: SimulationConfig,
    status: Status,
    batches_completed: usize,
    sample_means: Vec<f64>,
    cancel: CancelToken,
}

impl<'p> SimulationRun<'p> {
    pub fn new(
        population: &'p [f64],
        config: SimulationConfig,
    ) -> Result<SimulationRun<'p>, Error> {
        if population.is_empty() {
            return Err(Error::EmptyPopulation);
        }
        config.validate()?;
        Ok(SimulationRun {
            population,
            config,
            status: Status::Idle,
            batches_completed: 0,
            sample_means: vec![],
            cancel: CancelToken::default(),
        })
    }

    pub fn config(&self) -> SimulationConfig {
        self.config
    }
    pub fn status(&self) -> Status {
        self.status
    }
    pub fn batches_completed(&self) -> usize {
        self.batches_completed
    }
    pub fn total_batches(&self) -> usize {
        self.config.total_batches
    }
    pub fn target_sample_count(&self) -> usize {
        self.config.target_sample_count
    }
    pub fn sample_means(&self) -> &[f64] {
        &self.sample_means
    }
    /// Fraction of batches done, in [0, 1]
    pub fn progress(&self) -> f64 {
        self.batches_completed as f64 / self.config.total_batches as f64
    }

    /// A handle for cancelling the current run.  Each `start()` or
    /// `reset()` makes a new token, so old handles can't cancel a later run.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Back to `Idle`, with the series emptied.
    pub fn reset(&mut self) {
        self.status = Status::Idle;
        self.batches_completed = 0;
        self.sample_means.clear();
        self.cancel = CancelToken::default();
    }

    pub fn start(&mut self) {
        if self.status == Status::Running {
            debug!(
                "Stopping the active run after {}/{} batches",
                self.batches_completed, self.config.total_batches
            );
            self.cancel();
        }
        self.reset();
        self.sample_means
            .reserve(self.config.batch_size() * self.config.total_batches);
        self.status = Status::Running;
        debug!(
            "Starting run: {} samples of size {} in {} batches of {}",
            self.config.target_sample_count,
            self.config.sample_size,
            self.config.total_batches,
            self.config.batch_size(),
        );
    }

    /// Stop the run.  The means collected so far are kept.  Does nothing
    /// unless the run is `Running`.
    pub fn cancel(&mut self) {
        if self.status != Status::Running {
            return;
        }
        self.cancel.cancel();
        self.status = Status::Cancelled;
        info!(
            "Cancelled after {}/{} batches ({} means)",
            self.batches_completed,
            self.config.total_batches,
            self.sample_means.len()
        );
    }

    /// Run the next batch.  Returns `None`, without touching the series, if
    /// the run isn't `Running` or was cancelled through its token.
    pub fn step<R: Rng>(&mut self, rng: &mut R) -> Option<BatchReport> {
        if self.status != Status::Running {
            return None;
        }
        if self.cancel.is_cancelled() {
            self.cancel();
            return None;
        }
        if self.batches_completed >= self.config.total_batches {
            self.status = Status::Finished;
            return None;
        }

        let start = self.sample_means.len();
        for _ in 0..self.config.batch_size() {
            let mean = sample_mean(self.population, self.config.sample_size, rng);
            self.sample_means.push(mean);
        }
        let report = BatchReport {
            index: self.batches_completed,
            means: start..self.sample_means.len(),
        };
        self.batches_completed += 1;
        trace!(
            "Batch {}/{}: {} means",
            self.batches_completed,
            self.config.total_batches,
            self.sample_means.len()
        );

        if self.batches_completed == self.config.total_batches {
            self.status = Status::Finished;
            info!("Finished: collected {} sample means", self.sample_means.len());
        }
        Some(report)
    }

    /// Keep stepping until the run stops.  Returns the final status.
    pub fn run_to_end<R: Rng>(&mut self, rng: &mut R) -> Status {
        while self.step(rng).is_some() {}
        self.status
    }
}

/// Draw `sample_size` values from `population` with replacement, and
/// return their mean.
pub fn sample_mean<R: Rng>(population: &[f64], sample_size: usize, rng: &mut R) -> f64 {
    let sum: f64 = (0..sample_size)
        .map(|_| population[rng.gen_range(0..population.len())])
        .sum();
    sum / sample_size as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distribution::*;
    use crate::stats::*;
    use approx::assert_abs_diff_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn population() -> Vec<f64> {
        (1..=10).map(f64::from).collect()
    }

    #[test]
    fn bad_config() {
        let pop = population();
        assert!(matches!(
            SimulationRun::new(&[], SimulationConfig::new(5, 10)),
            Err(Error::EmptyPopulation)
        ));
        assert!(matches!(
            SimulationRun::new(&pop, SimulationConfig::new(0, 10)),
            Err(Error::InvalidSampleSize)
        ));
        assert!(matches!(
            SimulationRun::new(&pop, SimulationConfig::new(5, 0)),
            Err(Error::InvalidTargetSampleCount)
        ));
        let config = SimulationConfig {
            total_batches: 0,
            ..SimulationConfig::new(5, 10)
        };
        assert!(matches!(
            SimulationRun::new(&pop, config),
            Err(Error::InvalidBatchCount)
        ));
    }

    #[test]
    fn batch_size() {
        assert_eq!(SimulationConfig::new(30, 5000).batch_size(), 50);
        assert_eq!(SimulationConfig::new(30, 5001).batch_size(), 51);
        assert_eq!(SimulationConfig::new(30, 1).batch_size(), 1);
    }

    #[test]
    fn runs_in_batches() {
        let pop = population();
        let mut rng = StdRng::seed_from_u64(1);
        let mut run = SimulationRun::new(&pop, SimulationConfig::new(4, 1000)).unwrap();
        assert_eq!(run.status(), Status::Idle);
        assert_eq!(run.step(&mut rng), None);

        run.start();
        assert_eq!(run.status(), Status::Running);
        let mut last = 0;
        for i in 0..100 {
            let report = run.step(&mut rng).unwrap();
            assert_eq!(report.index, i);
            assert_eq!(report.means, last..last + 10);
            last = report.means.end;
            assert_eq!(run.batches_completed(), i + 1);
            assert_eq!(run.sample_means().len(), last);
        }
        assert_eq!(run.status(), Status::Finished);
        assert_eq!(run.progress(), 1.);
        assert_eq!(run.step(&mut rng), None);
        assert_eq!(run.batches_completed(), 100);
        assert_eq!(run.sample_means().len(), 1000);
        assert!(run.sample_means().iter().all(|x| (1. ..=10.).contains(x)));
    }

    #[test]
    fn overshoots_target() {
        let pop = population();
        let mut rng = StdRng::seed_from_u64(1);
        let config = SimulationConfig {
            total_batches: 4,
            ..SimulationConfig::new(2, 10)
        };
        let mut run = SimulationRun::new(&pop, config).unwrap();
        run.start();
        assert_eq!(run.run_to_end(&mut rng), Status::Finished);
        assert_eq!(run.batches_completed(), 4);
        assert_eq!(run.sample_means().len(), 12);
    }

    #[test]
    fn cancel_is_idempotent() {
        let pop = population();
        let mut rng = StdRng::seed_from_u64(2);
        let mut run = SimulationRun::new(&pop, SimulationConfig::new(3, 500)).unwrap();
        run.start();
        run.step(&mut rng).unwrap();
        run.cancel();
        assert_eq!(run.status(), Status::Cancelled);
        let means = run.sample_means().to_vec();
        assert_eq!(means.len(), 5);

        run.cancel();
        assert_eq!(run.step(&mut rng), None);
        assert_eq!(run.status(), Status::Cancelled);
        assert_eq!(run.sample_means(), &means[..]);
        assert_eq!(run.batches_completed(), 1);
    }

    #[test]
    fn cancel_from_token() {
        let pop = population();
        let mut rng = StdRng::seed_from_u64(3);
        let mut run = SimulationRun::new(&pop, SimulationConfig::new(3, 500)).unwrap();
        run.start();
        let token = run.cancel_token();
        run.step(&mut rng).unwrap();
        run.step(&mut rng).unwrap();
        std::thread::spawn(move || token.cancel()).join().unwrap();
        assert_eq!(run.status(), Status::Running);
        assert_eq!(run.step(&mut rng), None);
        assert_eq!(run.status(), Status::Cancelled);
        assert_eq!(run.sample_means().len(), 10);

        // The old token doesn't reach the next run
        run.start();
        assert!(run.step(&mut rng).is_some());
    }

    #[test]
    fn cancel_after_finish_is_a_no_op() {
        let pop = population();
        let mut rng = StdRng::seed_from_u64(4);
        let mut run = SimulationRun::new(&pop, SimulationConfig::new(3, 100)).unwrap();
        run.start();
        run.run_to_end(&mut rng);
        run.cancel();
        assert_eq!(run.status(), Status::Finished);
        assert_eq!(run.sample_means().len(), 100);
    }

    #[test]
    fn restart_clears_series() {
        let pop = population();
        let mut rng = StdRng::seed_from_u64(5);
        let mut run = SimulationRun::new(&pop, SimulationConfig::new(3, 200)).unwrap();
        run.start();
        run.run_to_end(&mut rng);
        assert_eq!(run.sample_means().len(), 200);

        run.start();
        assert_eq!(run.status(), Status::Running);
        assert!(run.sample_means().is_empty());
        assert_eq!(run.batches_completed(), 0);
        let report = run.step(&mut rng).unwrap();
        assert_eq!(report.means, 0..2);
        assert_eq!(run.sample_means().len(), 2);
    }

    #[test]
    fn restart_while_running() {
        let pop = population();
        let mut rng = StdRng::seed_from_u64(6);
        let mut run = SimulationRun::new(&pop, SimulationConfig::new(3, 200)).unwrap();
        run.start();
        let old_token = run.cancel_token();
        run.step(&mut rng).unwrap();
        run.start();
        assert!(old_token.is_cancelled());
        assert_eq!(run.status(), Status::Running);
        assert!(run.sample_means().is_empty());
    }

    #[test]
    fn reset() {
        let pop = population();
        let mut rng = StdRng::seed_from_u64(7);
        let mut run = SimulationRun::new(&pop, SimulationConfig::new(3, 200)).unwrap();
        run.start();
        run.step(&mut rng).unwrap();
        run.cancel();
        run.reset();
        assert_eq!(run.status(), Status::Idle);
        assert!(run.sample_means().is_empty());
        assert_eq!(run.step(&mut rng), None);
    }

    #[test]
    fn sample_size_larger_than_population() {
        let pop = [1., 3.];
        let mut rng = StdRng::seed_from_u64(8);
        let mean = sample_mean(&pop, 1000, &mut rng);
        assert_abs_diff_eq!(mean, 2., epsilon = 0.2);
    }

    #[test]
    fn central_limit_theorem() {
        let mut rng = StdRng::seed_from_u64(2024);
        let spec = DistributionSpec {
            mean: Some(5.),
            std_dev: Some(1.5),
            ..DistributionSpec::new(DistributionKind::Uniform, 10_000)
        };
        let population = generate(&spec, &mut rng).unwrap();
        let mut run = SimulationRun::new(&population, SimulationConfig::new(30, 5000)).unwrap();
        run.start();
        assert_eq!(run.run_to_end(&mut rng), Status::Finished);
        assert_eq!(run.sample_means().len(), 5000);

        let simulated = summarize(run.sample_means());
        let theory = Theory::new(summarize(&population), 30);
        assert_abs_diff_eq!(simulated.mean, 5., epsilon = 0.1);
        let expected = 1.5 / 30_f64.sqrt();
        assert_abs_diff_eq!(simulated.std_dev, expected, epsilon = 0.2 * expected);
        assert!(Comparison::new(simulated, theory).std_dev_rel_error().abs() < 0.2);
    }
}
