use std::fmt::Write as _;

use itertools::Itertools;
use log::debug;

use crate::{
    aggregate,
    chart::{self, ChartKind},
    config::DashboardConfig,
    dataset::Dataset,
    filter::{self, FilteredView},
    map, preview,
    selection::FilterSelection,
    table,
};

pub const TITLE: &str = "Crime Incidents Dashboard";
pub const DATA_SOURCE: &str = "Data Source: Chicago Police Department Crime Incidents Dataset";

pub struct Dashboard<'a> {
    dataset: &'a Dataset,
    config: DashboardConfig,
    color: bool,
}

impl<'a> Dashboard<'a> {
    pub fn new(dataset: &'a Dataset, config: DashboardConfig, color: bool) -> Self {
        Self {
            dataset,
            config,
            color,
        }
    }

    pub fn dataset(&self) -> &'a Dataset {
        self.dataset
    }

    fn view(&self, selection: &FilterSelection) -> FilteredView<'a> {
        let view = filter::apply(self.dataset, selection);
        debug!(
            "Selection [{selection}] kept {} of {} row(s)",
            view.len(),
            self.dataset.len()
        );
        view
    }

    pub fn summary(&self, selection: &FilterSelection) -> String {
        let view = self.view(selection);
        with_footer(summary_header(&view, selection))
    }

    pub fn options(&self) -> String {
        let options = filter::filter_options(self.dataset);
        let mut out = String::new();
        let _ = writeln!(out, "Select Year(s): {}", list_or_none(options.years.iter()));
        let _ = writeln!(
            out,
            "Select Crime Type(s): {}",
            list_or_none(options.primary_types.iter())
        );
        let _ = writeln!(
            out,
            "Select Location Description(s): {}",
            list_or_none(options.locations.iter())
        );
        let _ = writeln!(out, "Arrest Made: All, Yes, No");
        out
    }

    pub fn preview(&self, selection: &FilterSelection, rows: Option<usize>) -> String {
        let view = self.view(selection);
        let mut out = summary_header(&view, selection);
        out.push('\n');
        out.push_str(&preview::render_preview(&view, rows));
        with_footer(out)
    }

    pub fn chart(&self, selection: &FilterSelection, kind: ChartKind, top: Option<usize>) -> String {
        let view = self.view(selection);
        let top = top.unwrap_or(self.config.top_n);
        let mut out = summary_header(&view, selection);
        out.push('\n');
        out.push_str(
            &chart::build_chart(&view, kind, top).render(chart::DEFAULT_CHART_WIDTH, self.color),
        );
        with_footer(out)
    }

    pub fn map(&self, selection: &FilterSelection, max_points: Option<usize>) -> String {
        let view = self.view(selection);
        let requested = max_points.unwrap_or(self.config.map.default_points);
        let mut out = summary_header(&view, selection);
        out.push('\n');
        out.push_str(&map::build_map(&view, requested).render(self.config.grid(), self.color));
        with_footer(out)
    }
}

fn summary_header(view: &FilteredView<'_>, selection: &FilterSelection) -> String {
    let metrics = aggregate::summarize(view);
    let cards = [
        ("Total Incidents", metrics.total.to_string()),
        ("Arrests Made", metrics.arrests.to_string()),
        ("Crime Types", metrics.crime_types.to_string()),
        ("Year Range", metrics.year_range.to_string()),
    ];
    let mut out = String::new();
    let _ = writeln!(out, "{TITLE}");
    let _ = writeln!(out, "Filters: {selection}");
    let _ = writeln!(out, "{}", table::render_cards(&cards));
    out
}

fn with_footer(mut out: String) -> String {
    out.push('\n');
    out.push_str(DATA_SOURCE);
    out.push('\n');
    out
}

fn list_or_none<T: std::fmt::Display>(values: impl Iterator<Item = T>) -> String {
    let joined = values.map(|v| v.to_string()).join(" | ");
    if joined.is_empty() {
        "(none)".to_string()
    } else {
        joined
    }
}
