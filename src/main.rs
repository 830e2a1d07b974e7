use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use jacoco2csv::config::{Config, CONFIG_FILE};
use jacoco2csv::{convert_file, logging};

#[derive(Parser)]
#[command(name = "jacoco2csv")]
#[command(about = "Convert a JaCoCo XML coverage report into per-method CSV")]
#[command(version)]
struct Cli {
    /// JaCoCo XML report (default: jacoco.xml)
    input: Option<PathBuf>,
}

fn main() {
    logging::init();

    if let Err(e) = run() {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load_or_default(Path::new(CONFIG_FILE))
        .with_context(|| format!("Could not load {}", CONFIG_FILE))?;

    let input = cli.input.unwrap_or_else(|| config.input.clone());

    match config.output {
        Some(ref path) => {
            let file = File::create(path)
                .with_context(|| format!("Could not create output file: {}", path.display()))?;
            convert_to(&input, BufWriter::new(file), &config)
        }
        None => convert_to(&input, BufWriter::new(io::stdout().lock()), &config),
    }
}

fn convert_to<W: Write>(input: &Path, output: W, config: &Config) -> Result<()> {
    convert_file(input, output, config.style)
        .with_context(|| format!("Could not convert {}", input.display()))?;
    Ok(())
}
