use anyhow::{Context, Result, bail};
use clap::Parser;
use mailprobe_lib::Verifier;
use tracing_subscriber::EnvFilter;

use std::io::{self, BufRead};

mod args;
mod output;

use args::{Cli, Commands};
use output::Report;

fn init_tracing(verbose: bool) -> Result<()> {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(true)
        .try_init()
        .map_err(|err| anyhow::anyhow!(err))
        .context("install tracing subscriber")
}

fn read_stdin_addresses() -> Result<Vec<String>> {
    let mut addresses = Vec::new();
    for line in io::stdin().lock().lines() {
        let line = line.context("read stdin")?;
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            addresses.push(trimmed.to_string());
        }
    }
    Ok(addresses)
}

fn run(cli: &Cli) -> Result<i32> {
    let options = cli.options()?;
    let verifier = Verifier::new(options).context("initialise verifier")?;

    match &cli.cmd {
        Commands::Verify { email } => {
            let report = Report::Single(verifier.verify_single(email));
            output::write_report(&report, cli)?;
            Ok(output::exit_code(report.results()))
        }
        Commands::Bulk { emails, stdin, .. } => {
            let mut addresses = emails.clone();
            if *stdin {
                addresses.extend(read_stdin_addresses()?);
            }
            if addresses.is_empty() {
                bail!("no address given: pass them as arguments or use --stdin");
            }
            // concurrency already folded into the options
            let report = Report::Bulk(verifier.verify_bulk(&addresses, None));
            output::write_report(&report, cli)?;
            Ok(output::exit_code(report.results()))
        }
        Commands::Mx { domain } => {
            let domain = domain.trim().trim_end_matches('.').to_ascii_lowercase();
            let lookup = verifier.resolve_mx(&domain);
            output::write_mx(&domain, &lookup, cli)?;
            Ok(if lookup.is_ok() { 0 } else { 2 })
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    // codes de sortie : 0 OK, 2 non délivrable/invalide, 1 fatal
    let code = run(&cli)?;
    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}
