use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bin {
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub label: String,
    pub count: usize,
}

/// Split `domain` (or the range of `data`, if no domain is given) into
/// `num_bins` equal-width bins and count the values falling into each.
///
/// Each bin is half-open, except the last which also includes `max`.
/// Values outside the domain are counted in the nearest edge bin, so the
/// counts always add up to `data.len()`.  This matters when the sample
/// means are binned against the population's domain.
///
/// Returns no bins if there's nothing sensible to return: no data, no bins,
/// an infinite domain, or a domain with `max < min`.
pub fn bin(data: &[f64], num_bins: usize, domain: Option<(f64, f64)>) -> Vec<Bin> {
    if data.is_empty() || num_bins == 0 {
        return vec![];
    }
    let (mut min, mut max) = domain.unwrap_or_else(|| extent(data));
    if min == max {
        min -= 1.;
        max += 1.;
    }
    let bin_size = (max - min) / num_bins as f64;
    if !(bin_size > 0. && bin_size.is_finite()) {
        return vec![];
    }

    let mut counts = vec![0; num_bins];
    let last = (num_bins - 1) as f64;
    for x in data {
        // NaN casts to 0, so those land in the first bin
        let idx = ((x - min) / bin_size).floor().clamp(0., last) as usize;
        counts[idx] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| {
            let lower_bound = min + i as f64 * bin_size;
            Bin {
                lower_bound,
                upper_bound: min + (i + 1) as f64 * bin_size,
                label: format!("{:.2}", lower_bound),
                count,
            }
        })
        .collect()
}

/// The smallest and largest values in `data`.  NaNs are skipped.
pub fn extent(data: &[f64]) -> (f64, f64) {
    data.iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), x| {
            (min.min(*x), max.max(*x))
        })
}

/// A fixed binning scheme, so several datasets can be drawn on the same
/// axes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Histogram {
    pub num_bins: usize,
    pub domain: (f64, f64),
}

impl Histogram {
    /// Use the range of `data` as the domain.  Returns `None` if `data` is
    /// empty or its range isn't finite.
    pub fn fit(data: &[f64], num_bins: usize) -> Option<Histogram> {
        let domain = extent(data);
        if !(domain.0.is_finite() && domain.1.is_finite()) {
            return None;
        }
        Some(Histogram { num_bins, domain })
    }

    pub fn bin(&self, data: &[f64]) -> Vec<Bin> {
        bin(data, self.num_bins, Some(self.domain))
    }
}
