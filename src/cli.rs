use clap::Parser;
use std::path::PathBuf;

use crate::config::{ImportOptions, DEFAULT_BATCH_SIZE, DEFAULT_OUTPUT};

#[derive(Parser, Debug)]
#[command(name = "fdc-to-sqlite")]
#[command(version, about = "Convert USDA FoodData Central CSV files to SQLite")]
pub struct Cli {
    /// Base directory with the *.csv files
    #[arg(short, long, default_value = ".")]
    pub directory: PathBuf,

    /// Batch inserts into sets of this length
    #[arg(
        short,
        long,
        default_value_t = DEFAULT_BATCH_SIZE as u64,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub batch: u64,

    /// Output SQLite database path
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,

    /// Overwrite the output file if it exists
    #[arg(short, long)]
    pub force: bool,

    /// Log every insert statement and row count
    #[arg(short, long)]
    pub verbose: bool,

    /// Only check the database, don't create it
    #[arg(short, long)]
    pub check: bool,

    /// Show a full-screen progress view
    #[arg(long)]
    pub tui: bool,

    /// Print the verification report as JSON on stdout
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }

    pub fn import_options(&self) -> ImportOptions {
        ImportOptions {
            directory: self.directory.clone(),
            output: self.output.clone(),
            batch_size: usize::try_from(self.batch).unwrap_or(usize::MAX),
            force: self.force,
            verbose: self.verbose,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["fdc-to-sqlite"]).unwrap();
        let opts = cli.import_options();
        assert_eq!(opts.directory, PathBuf::from("."));
        assert_eq!(opts.output, PathBuf::from("usda_food_data.db"));
        assert_eq!(opts.batch_size, 1000);
        assert!(!cli.check && !cli.force && !cli.verbose);
    }

    #[test]
    fn test_short_flags() {
        let cli = Cli::try_parse_from([
            "fdc-to-sqlite", "-d", "data", "-b", "50", "-o", "out.db", "-f", "-v", "-c",
        ])
        .unwrap();
        assert_eq!(cli.directory, PathBuf::from("data"));
        assert_eq!(cli.batch, 50);
        assert_eq!(cli.output, PathBuf::from("out.db"));
        assert!(cli.force && cli.verbose && cli.check);
    }

    #[test]
    fn test_zero_batch_rejected_by_parser() {
        assert!(Cli::try_parse_from(["fdc-to-sqlite", "-b", "0"]).is_err());
        assert!(Cli::try_parse_from(["fdc-to-sqlite", "--batch", "-5"]).is_err());
        let cli = Cli::try_parse_from(["fdc-to-sqlite", "--batch", "1"]).unwrap();
        assert_eq!(cli.import_options().batch_size, 1);
    }
}
