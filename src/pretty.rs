use ansi_term::{Color, Style};
use anyhow::Result;
use clt_engine::{Bin, Comparison, SimulationRun, SummaryStats};
use std::fmt;
use std::io::Write;

const BAR_WIDTH: usize = 50;

/// A horizontal bar chart of `bins`, one line per bin
pub fn render_bins(out: &mut impl Write, bins: &[Bin]) -> Result<()> {
    let biggest = bins.iter().map(|b| b.count).max().unwrap_or(0).max(1);
    let mut out = tabwriter::TabWriter::new(out);
    for bin in bins {
        let len = (bin.count * BAR_WIDTH + biggest / 2) / biggest;
        writeln!(out, "{}\t{}\t{}", bin.label, "█".repeat(len), bin.count)?;
    }
    out.flush()?;
    Ok(())
}

/// What the live view shows between batches
pub fn render_progress(run: &SimulationRun, bins: &[Bin]) -> Result<Vec<u8>> {
    let mut out = vec![];
    writeln!(
        out,
        "Batch {}/{} ({:.0}%, {}/{} sample means, {})",
        run.batches_completed(),
        run.total_batches(),
        run.progress() * 100.,
        run.sample_means().len(),
        run.target_sample_count(),
        run.status(),
    )?;
    render_bins(&mut out, bins)?;
    Ok(out)
}

pub fn render_comparison(population: SummaryStats, cmp: Comparison) -> Result<Vec<u8>> {
    let mut buf = vec![];
    let mut out = tabwriter::TabWriter::new(&mut buf);
    writeln!(out, "\tpopulation\tsimulated\ttheory\t")?;
    writeln!(
        out,
        "mean:\t{:.4}\t{:.4}\t{:.4}\t{}",
        population.mean,
        cmp.simulated.mean,
        cmp.theory.mean,
        PrettyError(cmp.mean_rel_error()),
    )?;
    writeln!(
        out,
        "std. dev.:\t{:.4}\t{:.4}\t{:.4}\t{}",
        population.std_dev,
        cmp.simulated.std_dev,
        cmp.theory.standard_error,
        PrettyError(cmp.std_dev_rel_error()),
    )?;
    out.flush()?;
    drop(out);
    Ok(buf)
}

/// A relative error, coloured by how worried you should be about it
pub struct PrettyError(pub f64);

impl fmt::Display for PrettyError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let x = self.0;
        if !x.is_finite() {
            return write!(f, "{}", Style::new().dimmed().paint("n/a"));
        }
        let s = format!("{:+.1}%", x * 100.);
        if x.abs() < 0.05 {
            write!(f, "{}", Color::Green.paint(s))
        } else if x.abs() < 0.2 {
            write!(f, "{}", Color::Yellow.paint(s))
        } else {
            write!(f, "{}", Color::Red.paint(s))
        }
    }
}
