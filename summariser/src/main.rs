use anyhow::Context;
use clap::Parser;
use log::debug;

pub(crate) mod cli;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = cli::SummariserCli::parse();
    debug!("Loading run logs from {}", cli.results_dir.display());

    let mut stdout = std::io::stdout().lock();
    pattern_summariser::summarise_directory(&cli.results_dir, &mut stdout)
        .context("Failed to summarise run logs")?;

    Ok(())
}
