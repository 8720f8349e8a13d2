use anyhow::{Context, Result};
use bpaf::Bpaf;
use clt_engine::{DistributionKind, DistributionSpec};
use log::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io::Read;

#[derive(Debug, Clone, Bpaf)]
pub struct PopulationOpts {
    /// normal, uniform, beta, bimodal, positive-skew, or negative-skew
    #[bpaf(short, long, argument("KIND"), fallback(DistributionKind::Normal), display_fallback)]
    pub distribution: DistributionKind,
    /// The number of values in the population
    #[bpaf(short('n'), long, argument("N"), fallback(10_000), display_fallback)]
    pub count: usize,
    /// Target mean [default: 5]
    #[bpaf(argument("X"))]
    pub mean: Option<f64>,
    /// Target standard deviation [default: 1.5]
    #[bpaf(argument("X"))]
    pub std_dev: Option<f64>,
    /// First shape parameter of the beta distribution [default: 2]
    #[bpaf(argument("X"))]
    pub alpha: Option<f64>,
    /// Second shape parameter of the beta distribution [default: 5]
    #[bpaf(argument("X"))]
    pub beta: Option<f64>,
    /// Seed the random number generator, for reproducible output
    #[bpaf(argument("SEED"))]
    pub seed: Option<u64>,
}

impl PopulationOpts {
    pub fn spec(&self) -> DistributionSpec {
        DistributionSpec {
            kind: self.distribution,
            mean: self.mean,
            std_dev: self.std_dev,
            alpha: self.alpha,
            beta: self.beta,
            count: self.count,
        }
    }

    pub fn generate(&self, rng: &mut StdRng) -> Result<Vec<f64>> {
        let population = clt_engine::generate(&self.spec(), rng)?;
        info!(
            "Drew {} values from the {} distribution",
            population.len(),
            self.distribution
        );
        Ok(population)
    }

    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => {
                debug!("Using seed {}", seed);
                StdRng::seed_from_u64(seed)
            }
            None => StdRng::from_entropy(),
        }
    }
}

/// Reads numbers from the first column of some CSV.  Blank lines are
/// skipped, and so is the first line if it isn't a number (ie. it's a
/// header).
pub fn read_values(rdr: impl Read) -> Result<Vec<f64>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(rdr);
    let mut values = vec![];
    for (idx, row) in rdr.records().enumerate() {
        let row = row?;
        let field = match row.get(0) {
            Some(x) if !x.is_empty() => x,
            _ => continue,
        };
        match field.parse::<f64>() {
            Ok(x) => values.push(x),
            Err(_) if idx == 0 => info!("Assuming \"{}\" is a column header", field),
            Err(e) => {
                // The reader skips blank lines, so `idx` can't be used here
                let line = row.position().map_or(idx as u64 + 1, |pos| pos.line());
                return Err(e).with_context(|| format!("Line {}: \"{}\"", line, field));
            }
        }
    }
    Ok(values)
}
