use std::collections::HashMap;
use std::fmt::Write as _;

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::{Color, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{Block, Paragraph, Widget, canvas::Canvas},
};

use crate::{
    dataset::{Field, Incident},
    filter::FilteredView,
    render, table,
};

pub const MIN_POINTS: usize = 100;
pub const MAX_POINTS: usize = 1000;
pub const DEFAULT_POINTS: usize = 500;
pub const DEFAULT_GRID_WIDTH: usize = 72;
pub const DEFAULT_GRID_HEIGHT: usize = 24;

const NO_COORDINATES: &str = "No data points with valid coordinates available";
const GLYPHS: [char; 10] = ['●', '▲', '■', '◆', '✚', '★', '▼', '◼', '✖', '◉'];
const COLORS: [Color; 6] = [
    Color::Red,
    Color::Green,
    Color::Yellow,
    Color::Blue,
    Color::Magenta,
    Color::Cyan,
];
const UNCATEGORISED: (char, Color) = ('•', Color::Gray);
const FLAT_SPAN: f64 = 0.005;

/// Limit actually applied for a requested point count: within
/// `[MIN_POINTS, min(MAX_POINTS, available)]`, never below `MIN_POINTS`.
pub fn clamp_point_limit(requested: usize, available: usize) -> usize {
    let upper = available.min(MAX_POINTS).max(MIN_POINTS);
    requested.clamp(MIN_POINTS, upper)
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapPoint {
    pub latitude: f64,
    pub longitude: f64,
    pub category: Option<String>,
    /// Hover fields after the category name, e.g. `Date` and `Description`.
    pub hover: Vec<(Field, String)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    pub category: String,
    pub glyph: char,
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MapPanel {
    Warning(String),
    Scatter {
        available: usize,
        limit: usize,
        points: Vec<MapPoint>,
        legend: Vec<LegendEntry>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridSize {
    pub width: usize,
    pub height: usize,
}

impl Default for GridSize {
    fn default() -> Self {
        Self {
            width: DEFAULT_GRID_WIDTH,
            height: DEFAULT_GRID_HEIGHT,
        }
    }
}

pub fn build_map(view: &FilteredView<'_>, requested: usize) -> MapPanel {
    let located = view
        .iter()
        .filter(|incident| incident.coordinates().is_some())
        .collect::<Vec<_>>();
    if located.is_empty() {
        return MapPanel::Warning(NO_COORDINATES.to_string());
    }

    let available = located.len();
    let limit = clamp_point_limit(requested, available);
    let colored = view.has(Field::PrimaryType);
    let hover_fields = [Field::Date, Field::Description]
        .into_iter()
        .filter(|field| view.has(*field))
        .collect::<Vec<_>>();

    let points = located
        .into_iter()
        .take(limit)
        .filter_map(|incident| to_point(incident, colored, &hover_fields))
        .collect::<Vec<_>>();
    let legend = build_legend(&points);
    MapPanel::Scatter {
        available,
        limit,
        points,
        legend,
    }
}

fn to_point(incident: &Incident, colored: bool, hover_fields: &[Field]) -> Option<MapPoint> {
    let (latitude, longitude) = incident.coordinates()?;
    let category = if colored {
        incident.primary_type.clone()
    } else {
        None
    };
    let hover = hover_fields
        .iter()
        .map(|field| {
            let value = incident.label(*field).map(|v| v.into_owned()).unwrap_or_default();
            (*field, value)
        })
        .collect();
    Some(MapPoint {
        latitude,
        longitude,
        category,
        hover,
    })
}

fn build_legend(points: &[MapPoint]) -> Vec<LegendEntry> {
    let mut legend: Vec<LegendEntry> = Vec::new();
    for category in points.iter().filter_map(|p| p.category.as_deref()) {
        if legend.iter().any(|entry| entry.category == category) {
            continue;
        }
        let slot = legend.len();
        legend.push(LegendEntry {
            category: category.to_string(),
            glyph: GLYPHS[slot % GLYPHS.len()],
            color: COLORS[slot % COLORS.len()],
        });
    }
    legend
}

impl MapPanel {
    pub fn render(&self, grid: GridSize, color: bool) -> String {
        let (available, limit, points, legend) = match self {
            MapPanel::Warning(message) => return format!("warning: {message}\n"),
            MapPanel::Scatter {
                available,
                limit,
                points,
                legend,
            } => (*available, *limit, points, legend),
        };

        let mut out = String::new();
        let _ = writeln!(out, "Showing {available} incidents with valid coordinates");
        let _ = writeln!(
            out,
            "Plotting {} point(s) (limit {limit}, range {MIN_POINTS}-{})",
            points.len(),
            available.min(MAX_POINTS).max(MIN_POINTS)
        );
        out.push_str(&render::buffer_to_text(&draw_scatter(points, legend, grid), color));

        let mut headers = vec![
            Field::Latitude.header().to_string(),
            Field::Longitude.header().to_string(),
            Field::PrimaryType.header().to_string(),
        ];
        if let Some(first) = points.first() {
            headers.extend(first.hover.iter().map(|(field, _)| field.header().to_string()));
        }
        let rows = points
            .iter()
            .map(|point| {
                let mut row = vec![
                    format!("{:.6}", point.latitude),
                    format!("{:.6}", point.longitude),
                    point.category.clone().unwrap_or_default(),
                ];
                row.extend(point.hover.iter().map(|(_, value)| value.clone()));
                row
            })
            .collect::<Vec<_>>();
        out.push_str(&table::render_table(&headers, &rows));
        out
    }
}

fn draw_scatter(points: &[MapPoint], legend: &[LegendEntry], grid: GridSize) -> Buffer {
    let (lat_min, lat_max) = span(points.iter().map(|p| p.latitude));
    let (lon_min, lon_max) = span(points.iter().map(|p| p.longitude));
    let styles = legend
        .iter()
        .map(|entry| (entry.category.as_str(), (entry.glyph, entry.color)))
        .collect::<HashMap<_, _>>();

    let map_width = render::edge(grid.width).saturating_add(2);
    let map_height = render::edge(grid.height).saturating_add(2);
    let legend_width = if legend.is_empty() {
        0
    } else {
        let widest = legend
            .iter()
            .map(|entry| table::display_width(&entry.category) + 2)
            .fold("Legend".len(), usize::max);
        render::edge(widest).saturating_add(2)
    };
    let legend_height = u16::try_from(legend.len())
        .unwrap_or(render::MAX_EDGE)
        .saturating_add(2);
    let height = map_height.max(legend_height).min(render::MAX_EDGE);

    let mut buffer = Buffer::empty(Rect::new(0, 0, map_width + legend_width, height));
    let [map_area, legend_area] = Layout::horizontal([
        Constraint::Length(map_width),
        Constraint::Length(legend_width),
    ])
    .areas(buffer.area);

    Canvas::default()
        .block(
            Block::bordered()
                .title(format!("{lat_max:.4}"))
                .title_bottom(format!("{lat_min:.4}  {lon_min:.4} .. {lon_max:.4}")),
        )
        .marker(Marker::Dot)
        .x_bounds([lon_min, lon_max])
        .y_bounds([lat_min, lat_max])
        .paint(|ctx| {
            for point in points {
                let (glyph, fg) = point
                    .category
                    .as_deref()
                    .and_then(|category| styles.get(category).copied())
                    .unwrap_or(UNCATEGORISED);
                ctx.print(
                    point.longitude,
                    point.latitude,
                    Span::styled(glyph.to_string(), Style::default().fg(fg)),
                );
            }
        })
        .render(
            Rect {
                height: map_height,
                ..map_area
            },
            &mut buffer,
        );

    if !legend.is_empty() {
        let lines = legend
            .iter()
            .map(|entry| {
                Line::from(vec![
                    Span::styled(entry.glyph.to_string(), Style::default().fg(entry.color)),
                    Span::raw(" "),
                    Span::raw(entry.category.as_str()),
                ])
            })
            .collect::<Vec<_>>();
        Paragraph::new(lines)
            .block(Block::bordered().title("Legend"))
            .render(legend_area, &mut buffer);
    }
    buffer
}

fn span(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), value| {
        (min.min(value), max.max(value))
    });
    if max - min > 0.0 {
        (min, max)
    } else {
        (min - FLAT_SPAN, max + FLAT_SPAN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{dataset::Dataset, filter, selection::FilterSelection};
    use encoding_rs::UTF_8;

    fn dataset(csv: &str) -> Dataset {
        Dataset::from_reader(csv.as_bytes(), b',', UTF_8).expect("dataset")
    }

    #[test]
    fn point_limit_stays_within_slider_bounds() {
        assert_eq!(clamp_point_limit(500, 5000), 500);
        assert_eq!(clamp_point_limit(5000, 5000), MAX_POINTS);
        assert_eq!(clamp_point_limit(10, 5000), MIN_POINTS);
        assert_eq!(clamp_point_limit(500, 300), 300);
        assert_eq!(clamp_point_limit(500, 40), MIN_POINTS);
    }

    #[test]
    fn rows_without_coordinates_produce_warning() {
        let data = dataset("Primary Type,Latitude,Longitude\nTHEFT,,\nTHEFT,41.9,\n");
        let view = filter::apply(&data, &FilterSelection::default());
        assert_eq!(
            build_map(&view, DEFAULT_POINTS),
            MapPanel::Warning(NO_COORDINATES.to_string())
        );
    }

    #[test]
    fn missing_coordinate_columns_produce_warning() {
        let data = dataset("Primary Type\nTHEFT\n");
        let view = filter::apply(&data, &FilterSelection::default());
        let panel = build_map(&view, DEFAULT_POINTS);
        assert!(panel.render(GridSize::default(), false).starts_with("warning: "));
    }

    #[test]
    fn hover_includes_date_and_description_when_present() {
        let data = dataset(
            "Date,Primary Type,Description,Latitude,Longitude\n\
             01/01/2023 01:00:00 AM,THEFT,$500 AND UNDER,41.88,-87.63\n",
        );
        let view = filter::apply(&data, &FilterSelection::default());
        let MapPanel::Scatter { points, legend, .. } = build_map(&view, DEFAULT_POINTS) else {
            panic!("expected scatter");
        };
        assert_eq!(points[0].category.as_deref(), Some("THEFT"));
        assert_eq!(
            points[0].hover,
            vec![
                (Field::Date, "2023-01-01 01:00:00".to_string()),
                (Field::Description, "$500 AND UNDER".to_string()),
            ]
        );
        assert_eq!(legend.len(), 1);
        assert_eq!(legend[0].glyph, GLYPHS[0]);
    }

    #[test]
    fn render_places_points_north_up_with_legend() {
        let data = dataset(
            "Primary Type,Latitude,Longitude\nTHEFT,41.5,-88.0\nBATTERY,42.0,-87.5\n",
        );
        let view = filter::apply(&data, &FilterSelection::default());
        let rendered = build_map(&view, DEFAULT_POINTS).render(
            GridSize {
                width: 10,
                height: 4,
            },
            false,
        );
        assert!(rendered.starts_with("Showing 2 incidents with valid coordinates\n"));
        let map_rows = rendered
            .lines()
            .skip(2)
            .take(6)
            .map(|line| line.chars().take(12).collect::<String>())
            .collect::<Vec<_>>();
        // Northernmost point (BATTERY) lands top-right, THEFT bottom-left.
        assert_eq!(map_rows[1], "│         ▲│");
        assert_eq!(map_rows[4], "│●         │");
        assert!(rendered.contains("Legend"));
        assert!(rendered.contains("● THEFT"));
        assert!(rendered.contains("▲ BATTERY"));
        assert!(!rendered.contains('\u{1b}'));
    }

    #[test]
    fn coloured_render_paints_categories() {
        let data = dataset("Primary Type,Latitude,Longitude\nTHEFT,41.5,-88.0\n");
        let view = filter::apply(&data, &FilterSelection::default());
        let rendered = build_map(&view, DEFAULT_POINTS).render(GridSize::default(), true);
        assert!(rendered.contains('\u{1b}'));
    }

    #[test]
    fn single_location_gets_a_padded_span() {
        assert_eq!(span([41.9, 41.9].into_iter()), (41.9 - FLAT_SPAN, 41.9 + FLAT_SPAN));
        assert_eq!(span([41.5, 42.0].into_iter()), (41.5, 42.0));
    }
}
