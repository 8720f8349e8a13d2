use crate::painter::Painter;
use crate::population::*;
use crate::pretty;
use anyhow::{anyhow, Context, Result};
use bpaf::Bpaf;
use clt_engine::*;
use log::*;
use std::io::Write;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Bpaf)]
pub struct SimulationOpts {
    /// The number of values in each sample
    #[bpaf(short, long, argument("N"), fallback(30), display_fallback)]
    pub sample_size: usize,
    /// The number of sample means to collect
    #[bpaf(long, argument("N"), fallback(5000), display_fallback)]
    pub samples: usize,
    /// Split the work into this many batches
    #[bpaf(long, argument("N"), fallback(DEFAULT_TOTAL_BATCHES), display_fallback)]
    pub batches: usize,
}

impl SimulationOpts {
    pub fn config(&self) -> SimulationConfig {
        SimulationConfig {
            sample_size: self.sample_size,
            target_sample_count: self.samples,
            total_batches: self.batches,
        }
    }
}

#[derive(Debug, Clone, Bpaf)]
pub struct SimulateOpts {
    /// Read the population from stdin (one value per line) instead of
    /// generating it
    stdin: bool,
    #[bpaf(external(population_opts))]
    population: PopulationOpts,
    #[bpaf(external(simulation_opts))]
    simulation: SimulationOpts,
    /// The number of bins in the live histogram
    #[bpaf(argument("N"), fallback(20), display_fallback)]
    bins: usize,
    /// Stop early after this long (eg. "2s", "500ms")
    #[bpaf(argument("DURATION"))]
    timeout: Option<humantime::Duration>,
    /// Don't draw the live histogram
    quiet: bool,
}

pub fn simulate(opts: SimulateOpts) -> Result<()> {
    let mut rng = opts.population.rng();
    let population = if opts.stdin {
        read_values(std::io::stdin().lock()).context("Couldn't read the population")?
    } else {
        opts.population.generate(&mut rng)?
    };
    let population_stats = summarize(&population);
    info!(
        "Population: {} values, mean {:.4}, std. dev. {:.4}",
        population.len(),
        population_stats.mean,
        population_stats.std_dev
    );

    // Bin the sample means against the population's domain, so it's easy
    // to see how much narrower they are
    let hist = Histogram::fit(&population, opts.bins)
        .ok_or_else(|| anyhow!("The population is empty or unbounded"))?;
    let mut run = SimulationRun::new(&population, opts.simulation.config())?;

    let mut painter = if opts.quiet {
        None
    } else {
        match Painter::new() {
            Ok(painter) => Some(painter),
            Err(e) => {
                info!("{}; not drawing the live view", e);
                None
            }
        }
    };

    run.start();
    if let Some(timeout) = opts.timeout {
        let token = run.cancel_token();
        let timeout: Duration = timeout.into();
        std::thread::spawn(move || {
            std::thread::sleep(timeout);
            token.cancel();
        });
    }

    let mut last_print = Instant::now();
    while let Some(report) = run.step(&mut rng) {
        trace!(
            "Batch {} added means {}..{}",
            report.index,
            report.means.start,
            report.means.end
        );
        if let Some(ref mut painter) = painter {
            if last_print.elapsed() > Duration::from_millis(100) {
                last_print = Instant::now();
                painter.print(&pretty::render_progress(&run, &hist.bin(run.sample_means()))?)?;
            }
        }
    }
    if let Some(ref mut painter) = painter {
        painter.print(&pretty::render_progress(&run, &hist.bin(run.sample_means()))?)?;
    }

    if run.status() == Status::Cancelled {
        warn!(
            "Timed out after {}/{} batches",
            run.batches_completed(),
            run.total_batches()
        );
    }

    let theory = Theory::new(population_stats, opts.simulation.sample_size);
    let cmp = Comparison::new(summarize(run.sample_means()), theory);
    let stdout = std::io::stdout();
    let mut stdout = stdout.lock();
    writeln!(
        stdout,
        "\n{} sample means of {} values each:",
        run.sample_means().len(),
        opts.simulation.sample_size
    )?;
    stdout.write_all(&pretty::render_comparison(population_stats, cmp)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bpaf::Parser;

    #[test]
    fn flags() {
        let opts = simulate_opts()
            .to_options()
            .run_inner(&["-s", "12", "--samples", "900", "--timeout", "1s", "--quiet"])
            .unwrap();
        let config = opts.simulation.config();
        assert_eq!(config.sample_size, 12);
        assert_eq!(config.target_sample_count, 900);
        assert_eq!(config.total_batches, DEFAULT_TOTAL_BATCHES);
        assert_eq!(config.batch_size(), 9);
        let timeout: Option<Duration> = opts.timeout.map(Into::into);
        assert_eq!(timeout, Some(Duration::from_secs(1)));
        assert!(opts.quiet);
        assert!(!opts.stdin);
    }
}
