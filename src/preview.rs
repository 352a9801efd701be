use std::fmt::Write as _;

use crate::{filter::FilteredView, stats, table};

pub fn render_preview(view: &FilteredView<'_>, row_cap: Option<usize>) -> String {
    let dataset = view.dataset();
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Showing {} rows (out of {} total)",
        view.len(),
        dataset.len()
    );

    let shown = row_cap.map_or(view.len(), |cap| cap.min(view.len()));
    let rows = view
        .iter()
        .take(shown)
        .map(|incident| incident.cells.clone())
        .collect::<Vec<_>>();
    out.push_str(&table::render_table(dataset.headers(), &rows));
    if shown < view.len() {
        let _ = writeln!(out, "... {} more row(s) not shown", view.len() - shown);
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Dataset Statistics");
    let described = stats::describe(view);
    if described.is_empty() {
        let _ = writeln!(out, "(no numeric columns)");
    } else {
        let (headers, rows) = stats::render_rows(&described);
        out.push_str(&table::render_table(&headers, &rows));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dataset::Dataset,
        filter,
        selection::{ArrestFilter, FilterSelection},
    };
    use encoding_rs::UTF_8;

    const SAMPLE: &str = "ID,Year,Primary Type,Arrest\n\
        1,2022,THEFT,true\n\
        2,2023,BATTERY,false\n\
        3,2023,THEFT,false\n";

    #[test]
    fn preview_reports_filtered_and_total_counts() {
        let data = Dataset::from_reader(SAMPLE.as_bytes(), b',', UTF_8).unwrap();
        let selection = FilterSelection::new(vec![2023], Vec::new(), Vec::new(), ArrestFilter::Any);
        let view = filter::apply(&data, &selection);
        let rendered = render_preview(&view, None);
        assert!(rendered.starts_with("Showing 2 rows (out of 3 total)\n"));
        assert!(rendered.contains("BATTERY"));
        assert!(!rendered.contains("2022"));
        assert!(rendered.contains("Dataset Statistics"));
        assert!(rendered.contains("count"));
    }

    #[test]
    fn row_cap_notes_hidden_rows() {
        let data = Dataset::from_reader(SAMPLE.as_bytes(), b',', UTF_8).unwrap();
        let view = filter::apply(&data, &FilterSelection::default());
        let rendered = render_preview(&view, Some(1));
        assert!(rendered.contains("... 2 more row(s) not shown"));
    }

    #[test]
    fn text_only_table_has_no_statistics() {
        let data = Dataset::from_reader("Primary Type\nTHEFT\n".as_bytes(), b',', UTF_8).unwrap();
        let view = filter::apply(&data, &FilterSelection::default());
        assert!(render_preview(&view, None).contains("(no numeric columns)"));
    }
}
