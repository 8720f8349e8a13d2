use crate::population::*;
use crate::simulate::*;
use anyhow::{anyhow, Result};
use bpaf::Bpaf;
use clt_engine::*;
use log::*;
use serde_json::json;

/// Prints a vega-lite plot specification on stdout
#[derive(Debug, Clone, Bpaf)]
pub struct PlotOpts {
    #[bpaf(external(population_opts))]
    population: PopulationOpts,
    #[bpaf(external(simulation_opts))]
    simulation: SimulationOpts,
    /// The number of bins in each histogram
    #[bpaf(argument("N"), fallback(30), display_fallback)]
    bins: usize,
    /// Leave the data out of the spec, and just print the chart layout
    omit_data: bool,
}

pub fn mk_chart(title: &str, bins: &[Bin], color: &str) -> serde_json::Value {
    json!({
        "title": title,
        "width": 640,
        "height": 180,
        "mark": {
            "type": "bar",
            "color": color,
            "opacity": 0.8,
        },
        "encoding": {
            "x": {
                "field": "lowerBound",
                "type": "quantitative",
                "bin": { "binned": true },
                "title": "value",
            },
            "x2": { "field": "upperBound" },
            "y": { "field": "count", "type": "quantitative" },
        },
        "data": { "values": bins },
    })
}

/// The population and the sample means, drawn on the same x axis
pub fn render(
    population: &[f64],
    sample_means: &[f64],
    num_bins: usize,
    sample_size: usize,
) -> Result<serde_json::Value> {
    let hist = Histogram::fit(population, num_bins)
        .ok_or_else(|| anyhow!("The population is empty or unbounded"))?;
    let charts = vec![
        mk_chart("Population", &hist.bin(population), "#4c78a8"),
        mk_chart(
            &format!("Means of samples of size {}", sample_size),
            &hist.bin(sample_means),
            "#f58518",
        ),
    ];
    Ok(json!({
        "$schema": "https://vega.github.io/schema/vega-lite/v5.json",
        "vconcat": charts,
        "resolve": { "scale": { "x": "shared" } },
    }))
}

pub fn plot(opts: PlotOpts) -> Result<()> {
    let mut rng = opts.population.rng();
    let population = opts.population.generate(&mut rng)?;
    let mut run = SimulationRun::new(&population, opts.simulation.config())?;
    run.start();
    run.run_to_end(&mut rng);
    info!("Collected {} sample means", run.sample_means().len());

    let mut plot = render(&population, run.sample_means(), opts.bins, opts.simulation.sample_size)?;
    if opts.omit_data {
        if let Some(charts) = plot["vconcat"].as_array_mut() {
            for chart in charts {
                if let Some(chart) = chart.as_object_mut() {
                    chart.remove("data");
                }
            }
        }
    }
    println!("{}", plot);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_axis() {
        let population = [0., 1., 2., 3., 4., 5., 6., 7., 8., 9., 10.];
        let means = [4.5, 5.5, 5.2];
        let plot = render(&population, &means, 5, 4).unwrap();
        let charts = plot["vconcat"].as_array().unwrap();
        assert_eq!(charts.len(), 2);
        assert_eq!(charts[1]["title"], "Means of samples of size 4");

        let pop_bins = charts[0]["data"]["values"].as_array().unwrap();
        let mean_bins = charts[1]["data"]["values"].as_array().unwrap();
        assert_eq!(pop_bins.len(), 5);
        assert_eq!(mean_bins.len(), 5);
        for (x, y) in pop_bins.iter().zip(mean_bins) {
            assert_eq!(x["lowerBound"], y["lowerBound"]);
        }
        let counts = mean_bins
            .iter()
            .map(|b| b["count"].as_u64().unwrap())
            .collect::<Vec<_>>();
        assert_eq!(counts, vec![0, 0, 3, 0, 0]);
    }

    #[test]
    fn empty_population() {
        assert!(render(&[], &[], 5, 4).is_err());
    }
}
