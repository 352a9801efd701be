use std::io::{BufRead, Write};

use anyhow::Result;
use log::{debug, info};
use thiserror::Error;

use crate::{
    chart::ChartKind,
    dashboard::Dashboard,
    selection::{ArrestFilter, FilterSelection},
};

pub const PROMPT: &str = "crime> ";

pub const HELP: &str = "\
Commands:
  year <y1;y2;...>          restrict to years
  type <t1;t2;...>          restrict to primary crime types
  location <l1;l2;...>      restrict to location descriptions
  arrest any|yes|no         arrest filter
  clear [year|type|location|arrest|all]
  filters                   show the active filters
  summary | options
  preview [rows]
  chart crime-types|yearly|locations|arrest-rate
  map [points]
  help | quit
";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown command '{0}' (type 'help' for a list)")]
    Unknown(String),
    #[error("'{0}' needs at least one value")]
    MissingValues(&'static str),
    #[error("'{0}' is not a valid year")]
    InvalidYear(String),
    #[error("'{0}' is not a valid arrest filter (expected any, yes or no)")]
    InvalidArrest(String),
    #[error("'{0}' is not a chart (expected crime-types, yearly, locations or arrest-rate)")]
    InvalidChart(String),
    #[error("'{0}' is not a positive number")]
    InvalidCount(String),
    #[error("cannot clear '{0}' (expected year, type, location, arrest or all)")]
    InvalidClearTarget(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearTarget {
    Year,
    Type,
    Location,
    Arrest,
    All,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interaction {
    Years(Vec<i64>),
    Types(Vec<String>),
    Locations(Vec<String>),
    Arrest(ArrestFilter),
    Clear(ClearTarget),
    Filters,
    Summary,
    Options,
    Preview(Option<usize>),
    Chart(ChartKind),
    Map(Option<usize>),
    Help,
    Quit,
}

/// Parses one input line; blank lines and `#` comments yield `None`.
pub fn parse_command(line: &str) -> Result<Option<Interaction>, CommandError> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }
    let (command, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (trimmed, ""),
    };

    let interaction = match command.to_ascii_lowercase().as_str() {
        "year" | "years" => {
            let years = rest
                .split([';', ','])
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(|v| {
                    v.parse::<i64>()
                        .map_err(|_| CommandError::InvalidYear(v.to_string()))
                })
                .collect::<Result<Vec<_>, _>>()?;
            if years.is_empty() {
                return Err(CommandError::MissingValues("year"));
            }
            Interaction::Years(years)
        }
        "type" | "types" => Interaction::Types(labels(rest, "type")?),
        "location" | "locations" => Interaction::Locations(labels(rest, "location")?),
        "arrest" => Interaction::Arrest(
            ArrestFilter::parse(rest).ok_or_else(|| CommandError::InvalidArrest(rest.to_string()))?,
        ),
        "clear" => Interaction::Clear(match rest.to_ascii_lowercase().as_str() {
            "" | "all" => ClearTarget::All,
            "year" | "years" => ClearTarget::Year,
            "type" | "types" => ClearTarget::Type,
            "location" | "locations" => ClearTarget::Location,
            "arrest" => ClearTarget::Arrest,
            _ => return Err(CommandError::InvalidClearTarget(rest.to_string())),
        }),
        "filters" => Interaction::Filters,
        "summary" => Interaction::Summary,
        "options" => Interaction::Options,
        "preview" => Interaction::Preview(optional_count(rest)?),
        "chart" => Interaction::Chart(
            ChartKind::parse(rest).ok_or_else(|| CommandError::InvalidChart(rest.to_string()))?,
        ),
        "map" => Interaction::Map(optional_count(rest)?),
        "help" | "?" => Interaction::Help,
        "quit" | "exit" => Interaction::Quit,
        other => return Err(CommandError::Unknown(other.to_string())),
    };
    Ok(Some(interaction))
}

/// Labels are `;`-separated because location descriptions contain commas.
fn labels(rest: &str, command: &'static str) -> Result<Vec<String>, CommandError> {
    let values = rest
        .split(';')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect::<Vec<_>>();
    if values.is_empty() {
        Err(CommandError::MissingValues(command))
    } else {
        Ok(values)
    }
}

fn optional_count(rest: &str) -> Result<Option<usize>, CommandError> {
    if rest.is_empty() {
        return Ok(None);
    }
    match rest.parse::<usize>() {
        Ok(count) if count > 0 => Ok(Some(count)),
        _ => Err(CommandError::InvalidCount(rest.to_string())),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Continue(String),
    Quit,
}

pub struct Session<'a> {
    dashboard: Dashboard<'a>,
    years: Vec<i64>,
    types: Vec<String>,
    locations: Vec<String>,
    arrest: ArrestFilter,
}

impl<'a> Session<'a> {
    pub fn new(dashboard: Dashboard<'a>) -> Self {
        Self {
            dashboard,
            years: Vec::new(),
            types: Vec::new(),
            locations: Vec::new(),
            arrest: ArrestFilter::Any,
        }
    }

    pub fn selection(&self) -> FilterSelection {
        FilterSelection::new(
            self.years.clone(),
            self.types.clone(),
            self.locations.clone(),
            self.arrest,
        )
    }

    pub fn handle(&mut self, interaction: Interaction) -> Outcome {
        debug!("Session interaction: {interaction:?}");
        let output = match interaction {
            Interaction::Years(years) => {
                self.years = years;
                self.filters_line()
            }
            Interaction::Types(types) => {
                self.types = types;
                self.filters_line()
            }
            Interaction::Locations(locations) => {
                self.locations = locations;
                self.filters_line()
            }
            Interaction::Arrest(arrest) => {
                self.arrest = arrest;
                self.filters_line()
            }
            Interaction::Clear(target) => {
                if matches!(target, ClearTarget::Year | ClearTarget::All) {
                    self.years.clear();
                }
                if matches!(target, ClearTarget::Type | ClearTarget::All) {
                    self.types.clear();
                }
                if matches!(target, ClearTarget::Location | ClearTarget::All) {
                    self.locations.clear();
                }
                if matches!(target, ClearTarget::Arrest | ClearTarget::All) {
                    self.arrest = ArrestFilter::Any;
                }
                self.filters_line()
            }
            Interaction::Filters => self.filters_line(),
            Interaction::Summary => self.dashboard.summary(&self.selection()),
            Interaction::Options => self.dashboard.options(),
            Interaction::Preview(rows) => self.dashboard.preview(&self.selection(), rows),
            Interaction::Chart(kind) => self.dashboard.chart(&self.selection(), kind, None),
            Interaction::Map(points) => self.dashboard.map(&self.selection(), points),
            Interaction::Help => HELP.to_string(),
            Interaction::Quit => return Outcome::Quit,
        };
        Outcome::Continue(output)
    }

    fn filters_line(&self) -> String {
        format!("Filters: {}\n", self.selection())
    }

    pub fn run<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> Result<()> {
        info!(
            "Exploring {} incident(s); type 'help' for commands",
            self.dashboard.dataset().len()
        );
        write!(output, "{PROMPT}")?;
        output.flush()?;
        for line in input.lines() {
            let line = line?;
            match parse_command(&line) {
                Ok(None) => {}
                Ok(Some(interaction)) => match self.handle(interaction) {
                    Outcome::Continue(text) => write!(output, "{text}")?,
                    Outcome::Quit => return Ok(()),
                },
                Err(err) => writeln!(output, "error: {err}")?,
            }
            write!(output, "{PROMPT}")?;
            output.flush()?;
        }
        writeln!(output)?;
        Ok(())
    }
}
