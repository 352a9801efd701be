use clap::ValueEnum;
use ratatui::{
    buffer::Buffer,
    layout::Direction,
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::Line,
    widgets::{
        Axis, Bar as BarItem, BarChart, BarGroup, Block, Chart, Dataset as Series, GraphType,
        Paragraph,
    },
};

use crate::{
    aggregate::{self, Metric},
    data::format_number,
    dataset::Field,
    filter::FilteredView,
    frequency, render,
};

pub const DEFAULT_CHART_WIDTH: u16 = 80;
pub const LINE_CHART_HEIGHT: u16 = 20;
const MIN_CHART_WIDTH: u16 = 20;
const SERIES_COLOR: Color = Color::Cyan;
const NO_DATA: &str = "(no data)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "kebab-case")]
pub enum ChartKind {
    /// Top crime types by frequency
    CrimeTypes,
    /// Incidents per year
    Yearly,
    /// Top location descriptions by frequency
    Locations,
    /// Top crime types by arrest rate
    ArrestRate,
}

impl ChartKind {
    pub fn parse(value: &str) -> Option<Self> {
        ChartKind::from_str(value.trim(), true).ok()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChartPanel {
    Bars {
        title: String,
        x_label: String,
        y_label: String,
        bars: Vec<Bar>,
    },
    Line {
        title: String,
        x_label: String,
        y_label: String,
        points: Vec<(i64, usize)>,
    },
    Warning(String),
}

pub fn build_chart(view: &FilteredView<'_>, kind: ChartKind, top: usize) -> ChartPanel {
    match kind {
        ChartKind::CrimeTypes => frequency_chart(
            view,
            Field::PrimaryType,
            top,
            top_title(top, "Crime Types by Frequency"),
            "Crime Type",
        ),
        ChartKind::Locations => frequency_chart(
            view,
            Field::LocationDescription,
            top,
            top_title(top, "Location Descriptions by Frequency"),
            "Location Description",
        ),
        ChartKind::Yearly => match aggregate::yearly_counts(view) {
            Metric::Available(points) => ChartPanel::Line {
                title: "Crime Incidents by Year".to_string(),
                x_label: "Year".to_string(),
                y_label: "Number of Incidents".to_string(),
                points,
            },
            Metric::NotAvailable => ChartPanel::Warning("Year column not available".to_string()),
        },
        ChartKind::ArrestRate => match aggregate::arrest_rates(view, top) {
            Metric::Available(rates) => ChartPanel::Bars {
                title: top_title(top, "Crime Types by Arrest Rate"),
                x_label: "Arrest Rate (%)".to_string(),
                y_label: "Crime Type".to_string(),
                bars: rates
                    .into_iter()
                    .map(|rate| Bar {
                        label: rate.group,
                        value: rate.rate,
                    })
                    .collect(),
            },
            Metric::NotAvailable => ChartPanel::Warning(
                "Required columns (Primary Type, Arrest) not available".to_string(),
            ),
        },
    }
}

/// `top == 0` keeps every group, so the title drops the count.
fn top_title(top: usize, subject: &str) -> String {
    if top == 0 {
        subject.to_string()
    } else {
        format!("Top {top} {subject}")
    }
}

fn frequency_chart(
    view: &FilteredView<'_>,
    field: Field,
    top: usize,
    title: String,
    y_label: &str,
) -> ChartPanel {
    match frequency::top_values(view, field, top) {
        Metric::Available(counts) => ChartPanel::Bars {
            title,
            x_label: "Number of Incidents".to_string(),
            y_label: y_label.to_string(),
            bars: counts
                .into_iter()
                .map(|entry| Bar {
                    label: entry.value,
                    value: entry.count as f64,
                })
                .collect(),
        },
        Metric::NotAvailable => ChartPanel::Warning(format!("{field} column not available")),
    }
}

impl ChartPanel {
    pub fn is_warning(&self) -> bool {
        matches!(self, ChartPanel::Warning(_))
    }

    pub fn render(&self, width: u16, color: bool) -> String {
        let width = width.clamp(MIN_CHART_WIDTH, render::MAX_EDGE);
        let buffer = match self {
            ChartPanel::Warning(message) => return format!("warning: {message}\n"),
            ChartPanel::Bars {
                title,
                x_label,
                y_label,
                bars,
            } => {
                let block = Block::bordered()
                    .title(title.as_str())
                    .title_bottom(Line::from(y_label.as_str()).left_aligned())
                    .title_bottom(Line::from(x_label.as_str()).right_aligned());
                if bars.is_empty() {
                    render::draw(Paragraph::new(NO_DATA).block(block), width, 3)
                } else {
                    draw_bars(bars, block, width)
                }
            }
            ChartPanel::Line {
                title,
                x_label,
                y_label,
                points,
            } => {
                let block = Block::bordered().title(title.as_str());
                if points.is_empty() {
                    render::draw(Paragraph::new(NO_DATA).block(block), width, 3)
                } else {
                    draw_line(points, x_label, y_label, block, width)
                }
            }
        };
        render::buffer_to_text(&buffer, color)
    }
}

fn draw_bars(bars: &[Bar], block: Block<'_>, width: u16) -> Buffer {
    let items = bars
        .iter()
        .map(|bar| {
            BarItem::default()
                .label(Line::from(bar.label.as_str()))
                .value((bar.value * 10.0).round().max(0.0) as u64)
                .text_value(format_number_short(bar.value))
        })
        .collect::<Vec<_>>();
    let height = u16::try_from(items.len())
        .unwrap_or(render::MAX_EDGE)
        .saturating_add(2)
        .min(render::MAX_EDGE);
    let chart = BarChart::default()
        .block(block)
        .direction(Direction::Horizontal)
        .bar_width(1)
        .bar_gap(0)
        .bar_style(Style::default().fg(SERIES_COLOR))
        .value_style(Style::default().add_modifier(Modifier::BOLD))
        .data(BarGroup::default().bars(&items));
    render::draw(chart, width, height)
}

fn draw_line(
    points: &[(i64, usize)],
    x_label: &str,
    y_label: &str,
    block: Block<'_>,
    width: u16,
) -> Buffer {
    let data = points
        .iter()
        .map(|(year, count)| (*year as f64, *count as f64))
        .collect::<Vec<_>>();
    let first = points.first().map_or(0, |(year, _)| *year);
    let last = points.last().map_or(0, |(year, _)| *year);
    let peak = points.iter().map(|(_, count)| *count).max().unwrap_or(0);

    let (x_bounds, x_labels) = if first == last {
        (
            [first as f64 - 1.0, last as f64 + 1.0],
            vec![String::new(), first.to_string(), String::new()],
        )
    } else {
        (
            [first as f64, last as f64],
            vec![first.to_string(), last.to_string()],
        )
    };
    let series = Series::default()
        .name("Incidents")
        .marker(Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(SERIES_COLOR))
        .data(&data);
    let chart = Chart::new(vec![series])
        .block(block)
        .x_axis(
            Axis::default()
                .title(x_label)
                .bounds(x_bounds)
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .title(y_label)
                .bounds([0.0, peak.max(1) as f64])
                .labels(["0".to_string(), peak.to_string()]),
        );
    render::draw(chart, width, LINE_CHART_HEIGHT)
}

fn format_number_short(value: f64) -> String {
    if value.fract() == 0.0 {
        format_number(value)
    } else {
        format!("{value:.1}")
    }
}
