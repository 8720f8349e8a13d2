/*! The sampling engine behind the Central Limit Theorem lab.

Generate a synthetic population from one of a handful of distribution
families, repeatedly resample it, and watch the distribution of the sample
means approach the Normal shape the CLT promises.

## Example

```
use clt_engine::*;
use rand::SeedableRng;

let mut rng = rand::rngs::StdRng::seed_from_u64(7);
let spec = DistributionSpec::new(DistributionKind::PositiveSkew, 2000);
let population = generate(&spec, &mut rng).unwrap();
let population_bins = bin(&population, 20, None);
assert_eq!(population_bins.iter().map(|b| b.count).sum::<usize>(), 2000);

let config = SimulationConfig::new(25, 1000);
let mut run = SimulationRun::new(&population, config).unwrap();
run.start();
while run.step(&mut rng).is_some() {}
assert_eq!(run.status(), Status::Finished);

let theory = Theory::new(summarize(&population), 25);
let simulated = summarize(run.sample_means());
assert!((simulated.mean - theory.mean).abs() < 0.1);
```

*/

mod distribution;
mod histogram;
mod simulation;
mod stats;

pub use distribution::*;
pub use histogram::*;
pub use simulation::*;
pub use stats::*;

#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    UnknownDistributionKind(String),
    InvalidCount,
    InvalidBetaShape { alpha: f64, beta: f64 },
    EmptyPopulation,
    InvalidSampleSize,
    InvalidTargetSampleCount,
    InvalidBatchCount,
}

use std::fmt;
impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::UnknownDistributionKind(x) => write!(
                f,
                "Unknown distribution \"{}\" (expected one of: {})",
                x,
                DistributionKind::NAMES.join(", ")
            ),
            Error::InvalidCount => f.write_str("The number of values to generate must be positive"),
            Error::InvalidBetaShape { alpha, beta } => write!(
                f,
                "Can't sample Beta({}, {}): both shape parameters must be positive",
                alpha, beta
            ),
            Error::EmptyPopulation => f.write_str("Can't resample an empty population"),
            Error::InvalidSampleSize => f.write_str("The sample size must be positive"),
            Error::InvalidTargetSampleCount => {
                f.write_str("The number of samples to draw must be positive")
            }
            Error::InvalidBatchCount => f.write_str("The number of batches must be positive"),
        }
    }
}
impl std::error::Error for Error {}
