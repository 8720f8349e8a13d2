use crate::population::read_values;
use anyhow::{bail, Result};
use bpaf::Bpaf;
use clt_engine::{bin, Bin};
use log::*;
use std::io::Write;

#[derive(Debug, Clone, Bpaf)]
pub struct HistogramOpts {
    /// The number of bins
    #[bpaf(short, long, argument("N"), fallback(20), display_fallback)]
    bins: usize,
    /// Lower end of the binned range (needs --max).  Smaller values are
    /// counted in the first bin.
    #[bpaf(argument("MIN"))]
    min: Option<f64>,
    /// Upper end of the binned range (needs --min).  Larger values are
    /// counted in the last bin.
    #[bpaf(argument("MAX"))]
    max: Option<f64>,
    /// Print the bins as JSON instead of CSV
    json: bool,
}

impl HistogramOpts {
    fn domain(&self) -> Result<Option<(f64, f64)>> {
        match (self.min, self.max) {
            (Some(min), Some(max)) => Ok(Some((min, max))),
            (None, None) => Ok(None),
            _ => bail!("--min and --max must be used together"),
        }
    }
}

/// Reads values (one per line) from stdin and prints a histogram
pub fn histogram(opts: HistogramOpts) -> Result<()> {
    let domain = opts.domain()?;
    let values = read_values(std::io::stdin().lock())?;
    info!("Read {} values", values.len());
    let bins = bin(&values, opts.bins, domain);
    if bins.is_empty() {
        warn!("Nothing to bin");
    }

    let stdout = std::io::stdout();
    let mut stdout = stdout.lock();
    if opts.json {
        serde_json::to_writer(&mut stdout, &bins)?;
        writeln!(stdout)?;
    } else {
        write_csv(&mut stdout, &bins)?;
    }
    Ok(())
}

fn write_csv(out: impl Write, bins: &[Bin]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record(["lower", "upper", "label", "count"])?;
    for bin in bins {
        wtr.write_record([
            bin.lower_bound.to_string(),
            bin.upper_bound.to_string(),
            bin.label.clone(),
            bin.count.to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}
