use serde::Serialize;
use std::iter::FromIterator;

#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct StatsBuilder {
    /// the number of values seen so far
    count: usize,
    /// the mean of the entire dataset
    mean: f64,
    /// the squared distance from the mean
    m2: f64,
}

impl StatsBuilder {
    pub fn update(&mut self, x: f64) {
        // Welford's online algorithm
        self.count += 1;
        let delta1 = x - self.mean; // diff from the old mean
        self.mean += delta1 / self.count as f64;
        let delta2 = x - self.mean; // diff from the new mean
        self.m2 += delta1 * delta2;
    }

    pub fn count(self) -> usize {
        self.count
    }

    pub fn mean(self) -> f64 {
        if self.count == 0 {
            f64::NAN
        } else {
            self.mean
        }
    }

    /// Variance with denominator N.
    pub fn population_var(self) -> f64 {
        if self.count == 0 {
            f64::NAN
        } else {
            self.m2 / self.count as f64
        }
    }
}

impl Extend<f64> for StatsBuilder {
    fn extend<T: IntoIterator<Item = f64>>(&mut self, iter: T) {
        for x in iter {
            self.update(x);
        }
    }
}

impl<'a> Extend<&'a f64> for StatsBuilder {
    fn extend<T: IntoIterator<Item = &'a f64>>(&mut self, iter: T) {
        self.extend(iter.into_iter().copied())
    }
}

/// Mean and (population) standard deviation of a set of values.
///
/// Fewer than two values give `{ mean: 0, std_dev: 0 }` rather than NaN:
/// the variance of a singleton isn't meaningful, and the charts that
/// consume these numbers would rather show a zero.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryStats {
    pub mean: f64,
    pub std_dev: f64,
}

impl From<StatsBuilder> for SummaryStats {
    fn from(x: StatsBuilder) -> SummaryStats {
        if x.count() < 2 {
            return SummaryStats::default();
        }
        SummaryStats {
            mean: x.mean(),
            std_dev: x.population_var().sqrt(),
        }
    }
}

impl FromIterator<f64> for SummaryStats {
    fn from_iter<T: IntoIterator<Item = f64>>(iter: T) -> SummaryStats {
        let mut bldr = StatsBuilder::default();
        bldr.extend(iter);
        bldr.into()
    }
}

impl<'a> FromIterator<&'a f64> for SummaryStats {
    fn from_iter<T: IntoIterator<Item = &'a f64>>(iter: T) -> SummaryStats {
        iter.into_iter().copied().collect()
    }
}

pub fn summarize(values: &[f64]) -> SummaryStats {
    values.iter().collect()
}

/// What the Central Limit Theorem predicts for the sampling distribution
/// of the mean.
///
/// The sample means should be centred on the population mean, with a
/// spread (the standard error) of σ/√n, where n is the sample size.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Theory {
    pub mean: f64,
    pub standard_error: f64,
}

impl Theory {
    pub fn new(population: SummaryStats, sample_size: usize) -> Theory {
        Theory {
            mean: population.mean,
            standard_error: population.std_dev / (sample_size as f64).sqrt(),
        }
    }
}

/// Simulated statistics side-by-side with the theoretical ones.  The
/// theory is reported, never substituted for the simulated values.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Comparison {
    pub simulated: SummaryStats,
    pub theory: Theory,
}

impl Comparison {
    pub fn new(simulated: SummaryStats, theory: Theory) -> Comparison {
        Comparison { simulated, theory }
    }

    pub fn mean_error(self) -> f64 {
        self.simulated.mean - self.theory.mean
    }

    /// `mean_error` as a fraction of the theoretical mean.  NaN if that's
    /// zero.
    pub fn mean_rel_error(self) -> f64 {
        if self.theory.mean == 0. {
            f64::NAN
        } else {
            self.mean_error() / self.theory.mean.abs()
        }
    }

    /// How far the simulated spread is from the standard error, as a
    /// fraction of the standard error.  NaN if the standard error is zero.
    pub fn std_dev_rel_error(self) -> f64 {
        if self.theory.standard_error == 0. {
            f64::NAN
        } else {
            (self.simulated.std_dev - self.theory.standard_error) / self.theory.standard_error
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test() {
        let mut bldr = StatsBuilder::default();
        bldr.extend(vec![1.0_f64, 2., 3.]);
        assert_eq!(bldr.count(), 3);
        assert_eq!(bldr.mean(), 2.);
        assert_relative_eq!(bldr.population_var(), 2. / 3.);

        let stats = (0..=100).map(f64::from).collect::<SummaryStats>();
        assert_eq!(stats.mean, 50.);
        assert_relative_eq!(stats.std_dev, 850.0_f64.sqrt(), max_relative = 1e-12);
    }

    #[test]
    fn too_few_values() {
        assert_eq!(summarize(&[]), SummaryStats { mean: 0., std_dev: 0. });
        assert_eq!(summarize(&[3.0]), SummaryStats { mean: 0., std_dev: 0. });
    }

    #[test]
    fn population_variance() {
        assert_eq!(summarize(&[2., 4.]), SummaryStats { mean: 3., std_dev: 1. });
        let stats = summarize(&[2., 4., 4., 4., 5., 5., 7., 9.]);
        assert_relative_eq!(stats.mean, 5., epsilon = 1e-12);
        assert_relative_eq!(stats.std_dev, 2., epsilon = 1e-12);
    }

    #[test]
    fn standard_error() {
        let population = SummaryStats { mean: 5., std_dev: 1.5 };
        let theory = Theory::new(population, 30);
        assert_eq!(theory.mean, 5.);
        assert_relative_eq!(theory.standard_error, 0.273_861_278_752_583, epsilon = 1e-12);

        let cmp = Comparison::new(
            SummaryStats { mean: 5.05, std_dev: 0.3 },
            Theory { mean: 5., standard_error: 0.25 },
        );
        assert_relative_eq!(cmp.mean_error(), 0.05, epsilon = 1e-12);
        assert_relative_eq!(cmp.mean_rel_error(), 0.01, epsilon = 1e-12);
        assert_relative_eq!(cmp.std_dev_rel_error(), 0.2, epsilon = 1e-12);

        let flat = Comparison::new(
            SummaryStats::default(),
            Theory::new(SummaryStats::default(), 4),
        );
        assert!(flat.mean_rel_error().is_nan());
        assert!(flat.std_dev_rel_error().is_nan());
    }
}
