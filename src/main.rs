use annotated_scan::cli::Cli;
use annotated_scan::config::{Environment, resolve_config};
use annotated_scan::report::scan_roots;
use anyhow::{Context, Result};
use clap::Parser;
use log::debug;
use std::io::{BufWriter, Write};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let config = match resolve_config(&cli, &Environment::from_process()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("[annotated-scan] {e}");
            return Ok(());
        }
    };
    debug!(
        "Scanning {} roots for {:?}",
        config.roots.len(),
        config.markers
    );

    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let mut err = std::io::stderr().lock();
    scan_roots(&config.roots, &config.markers, &mut out, &mut err)?;
    out.flush().context("Failed to flush report")?;

    Ok(())
}
