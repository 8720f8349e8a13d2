use crate::Error;
use log::*;
use rand::Rng;
use rand_distr::{Beta, Distribution, StandardNormal};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_MEAN: f64 = 5.;
pub const DEFAULT_STD_DEV: f64 = 1.5;
pub const DEFAULT_ALPHA: f64 = 2.;
pub const DEFAULT_BETA: f64 = 5.;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DistributionKind {
    Normal,
    Uniform,
    Beta,
    Bimodal,
    PositiveSkew,
    NegativeSkew,
}

impl DistributionKind {
    pub const ALL: [DistributionKind; 6] = [
        DistributionKind::Normal,
        DistributionKind::Uniform,
        DistributionKind::Beta,
        DistributionKind::Bimodal,
        DistributionKind::PositiveSkew,
        DistributionKind::NegativeSkew,
    ];
    pub const NAMES: [&'static str; 6] = [
        "normal",
        "uniform",
        "beta",
        "bimodal",
        "positive-skew",
        "negative-skew",
    ];

    pub fn name(self) -> &'static str {
        DistributionKind::NAMES[self as usize]
    }
}

impl FromStr for DistributionKind {
    type Err = Error;
    fn from_str(x: &str) -> Result<DistributionKind, Error> {
        DistributionKind::NAMES
            .iter()
            .position(|name| *name == x)
            .map(|idx| DistributionKind::ALL[idx])
            .ok_or_else(|| Error::UnknownDistributionKind(x.to_string()))
    }
}

impl fmt::Display for DistributionKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which distribution to draw a population from, and how big it should be.
///
/// Parameters which are left unset fall back to `DEFAULT_*`.  `mean` and
/// `std_dev` are ignored by `Beta`; `alpha` and `beta` are only used by
/// `Beta`.
#[derive(Clone, Debug, PartialEq)]
pub struct DistributionSpec {
    pub kind: DistributionKind,
    pub mean: Option<f64>,
    pub std_dev: Option<f64>,
    pub alpha: Option<f64>,
    pub beta: Option<f64>,
    pub count: usize,
}

impl DistributionSpec {
    pub fn new(kind: DistributionKind, count: usize) -> DistributionSpec {
        DistributionSpec {
            kind,
            mean: None,
            std_dev: None,
            alpha: None,
            beta: None,
            count,
        }
    }
    pub fn mean(&self) -> f64 {
        self.mean.unwrap_or(DEFAULT_MEAN)
    }
    pub fn std_dev(&self) -> f64 {
        self.std_dev.unwrap_or(DEFAULT_STD_DEV)
    }
    pub fn alpha(&self) -> f64 {
        self.alpha.unwrap_or(DEFAULT_ALPHA)
    }
    pub fn beta(&self) -> f64 {
        self.beta.unwrap_or(DEFAULT_BETA)
    }
}

/// Draw `spec.count` independent values from the distribution described by
/// `spec`.
///
/// The numeric parameters aren't sanity-checked: a negative `std_dev`
/// mirrors the draws, and a non-positive mean makes `PositiveSkew` produce
/// NaNs.  The only thing we refuse is a Beta shape the sampler can't
/// represent.
pub fn generate<R: Rng>(spec: &DistributionSpec, rng: &mut R) -> Result<Vec<f64>, Error> {
    if spec.count == 0 {
        return Err(Error::InvalidCount);
    }
    let count = spec.count;
    let mean = spec.mean();
    let std_dev = spec.std_dev();
    debug!("Generating {} values from {:?}", count, spec);
    let data: Vec<f64> = match spec.kind {
        DistributionKind::Normal => (0..count).map(|_| normal(rng, mean, std_dev)).collect(),
        DistributionKind::Uniform => {
            // A uniform distribution on [a, b) has σ = (b - a) / √12
            let half_range = std_dev * 3_f64.sqrt();
            let min = mean - half_range;
            let max = mean + half_range;
            (0..count)
                .map(|_| min + (max - min) * rng.gen::<f64>())
                .collect()
        }
        DistributionKind::Beta => {
            let dist = beta(spec.alpha(), spec.beta())?;
            (0..count).map(|_| dist.sample(rng)).collect()
        }
        DistributionKind::Bimodal => {
            let spread = 0.8 * std_dev;
            let left = mean - 1.2 * std_dev;
            let right = mean + 1.2 * std_dev;
            (0..count)
                .map(|_| {
                    let centre = if rng.gen::<f64>() < 0.5 { left } else { right };
                    normal(rng, centre, spread)
                })
                .collect()
        }
        DistributionKind::PositiveSkew => {
            if mean <= 0. {
                warn!("positive-skew needs a positive mean (got {}); expect NaNs", mean);
            }
            // Pick the underlying Normal so that the log-normal has roughly
            // the requested mean and standard deviation
            let spread = 1. + (std_dev * std_dev) / (mean * mean);
            let log_mean = mean.ln() - 0.5 * spread.ln();
            let log_std_dev = spread.ln().sqrt();
            (0..count)
                .map(|_| normal(rng, log_mean, log_std_dev).exp())
                .collect()
        }
        DistributionKind::NegativeSkew => {
            let dist = beta(5., 2.)?;
            (0..count)
                .map(|_| mean + dist.sample(rng) * std_dev * 3. - std_dev * 1.5)
                .collect()
        }
    };
    Ok(data)
}

fn normal<R: Rng>(rng: &mut R, mean: f64, std_dev: f64) -> f64 {
    let z: f64 = StandardNormal.sample(rng);
    mean + std_dev * z
}

fn beta(alpha: f64, beta: f64) -> Result<Beta<f64>, Error> {
    let bad_shape = || Error::InvalidBetaShape { alpha, beta };
    if !(alpha > 0. && alpha.is_finite() && beta > 0. && beta.is_finite()) {
        return Err(bad_shape());
    }
    Beta::new(alpha, beta).map_err(|_| bad_shape())
}

/// A population request, as sent by the lab's frontend.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub distribution: String,
    pub count: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mean: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub std_dev: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alpha: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub beta: Option<f64>,
}

impl GenerateRequest {
    pub fn to_spec(&self) -> Result<DistributionSpec, Error> {
        let kind = self.distribution.parse::<DistributionKind>()?;
        if self.count <= 0 {
            return Err(Error::InvalidCount);
        }
        Ok(DistributionSpec {
            kind,
            mean: self.mean,
            std_dev: self.std_dev,
            alpha: self.alpha,
            beta: self.beta,
            count: self.count as usize,
        })
    }
}

impl From<&DistributionSpec> for GenerateRequest {
    fn from(spec: &DistributionSpec) -> GenerateRequest {
        GenerateRequest {
            distribution: spec.kind.to_string(),
            count: spec.count as i64,
            mean: spec.mean,
            std_dev: spec.std_dev,
            alpha: spec.alpha,
            beta: spec.beta,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub data: Vec<f64>,
}

pub fn serve<R: Rng>(req: &GenerateRequest, rng: &mut R) -> Result<GenerateResponse, Error> {
    let spec = req.to_spec()?;
    let data = generate(&spec, rng)?;
    Ok(GenerateResponse { data })
}
