pub mod aggregate;
pub mod chart;
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod data;
pub mod dataset;
pub mod filter;
pub mod frequency;
pub mod io_utils;
pub mod map;
pub mod preview;
pub mod render;
pub mod selection;
pub mod session;
pub mod stats;
pub mod table;

use std::{
    env,
    io::{self, IsTerminal},
    sync::OnceLock,
};

use anyhow::{Context, Result, bail};
use clap::Parser;
use log::{LevelFilter, debug, info};

use crate::{
    cli::{Cli, Commands},
    config::DashboardConfig,
    dashboard::Dashboard,
    selection::FilterSelection,
    session::Session,
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("crime_dashboard", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    let config = DashboardConfig::load_or_default(cli.source.config.as_deref())?;

    let input = cli
        .source
        .input
        .clone()
        .unwrap_or_else(|| config.dataset.clone());
    if matches!(cli.command, Commands::Explore) && io_utils::is_dash(&input) {
        bail!("explore reads commands from stdin; pass the dataset as a file path instead of '-'");
    }
    let configured_delimiter = config
        .delimiter
        .as_deref()
        .map(cli::parse_delimiter)
        .transpose()
        .map_err(anyhow::Error::msg)
        .context("Reading delimiter from config")?;
    let delimiter =
        io_utils::resolve_input_delimiter(&input, cli.source.delimiter.or(configured_delimiter));
    let encoding = io_utils::resolve_encoding(
        cli.source
            .input_encoding
            .as_deref()
            .or(config.input_encoding.as_deref()),
    )?;
    info!(
        "Opening '{}' with delimiter '{}'",
        input.display(),
        printable_delimiter(delimiter)
    );
    let dataset = dataset::init(&input, delimiter, encoding)
        .with_context(|| format!("Loading dataset {input:?}"))?;

    let color = match &cli.command {
        Commands::Map(args) if args.no_color => false,
        _ => config.map.color.unwrap_or_else(|| io::stdout().is_terminal()),
    };
    debug!("Colour output: {color}");
    let dashboard = Dashboard::new(dataset, config, color);

    match cli.command {
        Commands::Summary(filters) => print!("{}", dashboard.summary(&filters.selection())),
        Commands::Options => print!("{}", dashboard.options()),
        Commands::Preview(args) => {
            print!("{}", dashboard.preview(&args.filters.selection(), args.rows))
        }
        Commands::Chart(args) => print!(
            "{}",
            dashboard.chart(&args.filters.selection(), args.kind, args.top)
        ),
        Commands::Map(args) => print!(
            "{}",
            dashboard.map(&args.filters.selection(), args.max_points)
        ),
        Commands::Explore => {
            print!("{}", dashboard.summary(&FilterSelection::default()));
            let stdin = io::stdin();
            Session::new(dashboard).run(stdin.lock(), io::stdout().lock())?;
        }
    }
    Ok(())
}

pub(crate) fn printable_delimiter(delimiter: u8) -> String {
    match delimiter {
        b',' => ",".to_string(),
        b'\t' => "\\t".to_string(),
        b'\n' => "\\n".to_string(),
        other => (other as char).to_string(),
    }
}
