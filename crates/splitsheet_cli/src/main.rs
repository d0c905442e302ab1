use std::path::PathBuf;

use clap::Parser;
use splitsheet_cli::{SpecSplitConfig, run};

#[derive(Parser)]
#[command(name = "split-sheet")]
#[command(
    about = "Split a CSV/XLSX/XLS/ODS table into the sheets of an XLSX workbook",
    long_about = None
)]
struct Cli {
    /// Input file (.csv, .xlsx, .xls or .ods)
    input_file: PathBuf,
    /// Output workbook (.xlsx)
    output_file: PathBuf,
    /// Split by the distinct values (or years, for date columns) of this column
    #[arg(short, long)]
    column_name: Option<String>,
    /// Split into chunks of this many rows
    #[arg(short, long)]
    number: Option<usize>,
    /// Worksheet to read from a spreadsheet input
    #[arg(long, default_value_t = 0)]
    sheet_index: usize,
    /// CSV field separator
    #[arg(long, default_value_t = ',')]
    separator: char,
    /// Write missing values as NA/NaN/Inf text instead of blank cells
    #[arg(long)]
    keep_missing: bool,
    /// Raise log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn into_config(self) -> anyhow::Result<SpecSplitConfig> {
        if !self.separator.is_ascii() {
            anyhow::bail!(
                "separator must be a single-byte character (got {:?})",
                self.separator
            );
        }
        let n_separator = self.separator as u8;

        let mut config = SpecSplitConfig::new(self.input_file, self.output_file);
        config.column_name = self.column_name;
        config.number = self.number;
        config.read_options.sheet_index = self.sheet_index;
        config.read_options.csv_separator = n_separator;
        config.write_options.keep_missing_values = self.keep_missing;
        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let c_level_default = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(c_level_default))
        .init();

    let config = cli.into_config()?;
    let report = run(&config)?;
    println!("{report}");
    Ok(())
}
