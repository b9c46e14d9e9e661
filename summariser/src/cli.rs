use clap::Parser;
use pattern_summariser::DEFAULT_RESULTS_DIR;
use std::path::PathBuf;

/// Summarise pattern simulation run logs into a table of generations, peak population and
/// run time.
#[derive(Parser, Debug)]
#[command(about, long_about = None)]
pub struct SummariserCli {
    /// Directory containing one `.csv` run log per pattern. Sub-directories are not searched.
    #[clap(short, long, env = "RESULTS_DIR", default_value = DEFAULT_RESULTS_DIR)]
    pub results_dir: PathBuf,
}
