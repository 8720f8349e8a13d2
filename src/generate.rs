use crate::population::*;
use anyhow::{Context, Result};
use bpaf::Bpaf;
use clt_engine::{serve, GenerateRequest, GenerateResponse};
use log::*;
use rand::Rng;
use std::io::Write;

#[derive(Debug, Clone, Bpaf)]
pub struct GenerateOpts {
    /// Read a JSON request from stdin instead of using the flags, eg.
    /// {"distribution": "beta", "count": 100, "alpha": 2, "beta": 5}
    stdin: bool,
    #[bpaf(external(population_opts))]
    population: PopulationOpts,
}

pub fn generate(opts: GenerateOpts) -> Result<()> {
    let req = if opts.stdin {
        serde_json::from_reader(std::io::stdin().lock()).context("Couldn't parse the request")?
    } else {
        GenerateRequest::from(&opts.population.spec())
    };
    let mut rng = opts.population.rng();
    let resp = respond(&req, &mut rng)?;

    let stdout = std::io::stdout();
    let mut stdout = stdout.lock();
    serde_json::to_writer(&mut stdout, &resp)?;
    writeln!(stdout)?;
    Ok(())
}

fn respond<R: Rng>(req: &GenerateRequest, rng: &mut R) -> Result<GenerateResponse> {
    debug!("Request: {:?}", req);
    let resp = serve(req, rng).with_context(|| format!("Bad request for {}", req.distribution))?;
    info!("Generated {} values", resp.data.len());
    Ok(resp)
}
