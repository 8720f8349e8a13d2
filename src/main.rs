mod generate;
mod histogram;
mod painter;
mod plot;
mod population;
mod pretty;
mod simulate;

use bpaf::Bpaf;
use generate::{generate_opts, GenerateOpts};
use histogram::{histogram_opts, HistogramOpts};
use plot::{plot_opts, PlotOpts};
use simulate::{simulate_opts, SimulateOpts};

/// Explore the Central Limit Theorem
#[derive(Bpaf)]
#[bpaf(options, version)]
enum Subcommand {
    /// Draw a population from a distribution and print it as JSON
    #[bpaf(command)]
    Generate(#[bpaf(external(generate_opts))] GenerateOpts),
    /// Bin values read from stdin into an equal-width histogram
    #[bpaf(command)]
    Histogram(#[bpaf(external(histogram_opts))] HistogramOpts),
    /// Resample a population and compare the sample means with the theory
    #[bpaf(command)]
    Simulate(#[bpaf(external(simulate_opts))] SimulateOpts),
    /// Print a vega-lite spec showing the population and the sample means
    #[bpaf(command)]
    Plot(#[bpaf(external(plot_opts))] PlotOpts),
}

fn main() {
    env_logger::init();
    let result = match subcommand().run() {
        Subcommand::Generate(opts) => generate::generate(opts),
        Subcommand::Histogram(opts) => histogram::histogram(opts),
        Subcommand::Simulate(opts) => simulate::simulate(opts),
        Subcommand::Plot(opts) => plot::plot(opts),
    };
    match result {
        Ok(()) => (),
        Err(e) => {
            // Ignore EPIPE
            if let Some(e) = e.downcast_ref::<std::io::Error>() {
                if e.kind() == std::io::ErrorKind::BrokenPipe {
                    return;
                }
            }
            eprintln!("Error: {:#}", e);
            std::process::exit(1)
        }
    }
}
