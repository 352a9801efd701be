use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

use crate::{
    chart::ChartKind,
    selection::{ArrestFilter, FilterSelection},
};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Explore crime incident extracts from the terminal",
    long_about = None
)]
pub struct Cli {
    #[command(flatten)]
    pub source: SourceArgs,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show headline metrics for the filtered incidents
    Summary(FilterArgs),
    /// List the values offered by each filter
    Options,
    /// Print the filtered incidents and descriptive statistics
    Preview(PreviewArgs),
    /// Draw one chart from the chart gallery
    Chart(ChartArgs),
    /// Plot incidents with coordinates on a text map
    Map(MapArgs),
    /// Start an interactive session that reads commands from stdin
    Explore,
}

#[derive(Debug, Clone, Default, Args)]
pub struct SourceArgs {
    /// Incident CSV file (defaults to the config's `dataset`, then dataset.csv)
    #[arg(short = 'i', long = "input", global = true)]
    pub input: Option<PathBuf>,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter, global = true)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding", global = true)]
    pub input_encoding: Option<String>,
    /// YAML file with dashboard defaults
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Args)]
pub struct FilterArgs {
    /// Keep only these years (repeatable or comma-separated; omit for all)
    #[arg(long = "year", value_delimiter = ',', action = ArgAction::Append)]
    pub years: Vec<i64>,
    /// Keep only these primary crime types (repeatable; omit for all)
    #[arg(long = "crime-type", action = ArgAction::Append)]
    pub crime_types: Vec<String>,
    /// Keep only these location descriptions (repeatable; omit for all)
    #[arg(long = "location", action = ArgAction::Append)]
    pub locations: Vec<String>,
    /// Arrest made
    #[arg(long, value_enum, default_value_t = ArrestFilter::Any)]
    pub arrest: ArrestFilter,
}

impl FilterArgs {
    pub fn selection(&self) -> FilterSelection {
        FilterSelection::new(
            self.years.clone(),
            self.crime_types.clone(),
            self.locations.clone(),
            self.arrest,
        )
    }
}

#[derive(Debug, Clone, Args)]
pub struct PreviewArgs {
    #[command(flatten)]
    pub filters: FilterArgs,
    /// Cap the number of rows printed (all rows when omitted)
    #[arg(long)]
    pub rows: Option<usize>,
}

#[derive(Debug, Clone, Args)]
pub struct ChartArgs {
    #[command(flatten)]
    pub filters: FilterArgs,
    /// Chart to draw
    #[arg(long, value_enum, default_value_t = ChartKind::CrimeTypes)]
    pub kind: ChartKind,
    /// Number of categories for ranked charts (defaults to the config's `top_n`)
    #[arg(long)]
    pub top: Option<usize>,
}

#[derive(Debug, Clone, Args)]
pub struct MapArgs {
    #[command(flatten)]
    pub filters: FilterArgs,
    /// Maximum points to display (clamped to 100..=min(1000, available))
    #[arg(long = "max-points")]
    pub max_points: Option<usize>,
    /// Disable ANSI colours in the map grid and legend
    #[arg(long = "no-color")]
    pub no_color: bool,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}
