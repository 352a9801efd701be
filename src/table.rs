use std::borrow::Cow;
use std::fmt::Write as _;

use crate::data::coerce_number;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
}

pub fn render_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let column_count = headers.len();
    let mut widths = headers.iter().map(|h| display_width(h)).collect::<Vec<_>>();
    let mut numeric = vec![true; column_count];
    let mut populated = vec![false; column_count];

    for row in rows {
        for (idx, cell) in row.iter().enumerate().take(column_count) {
            widths[idx] = widths[idx].max(display_width(cell));
            if !cell.trim().is_empty() {
                populated[idx] = true;
                numeric[idx] &= coerce_number(cell).is_some();
            }
        }
    }

    for width in &mut widths {
        *width = (*width).max(1);
    }
    let aligns = numeric
        .iter()
        .zip(&populated)
        .map(|(is_numeric, has_values)| {
            if *is_numeric && *has_values {
                Align::Right
            } else {
                Align::Left
            }
        })
        .collect::<Vec<_>>();

    let mut output = String::new();
    let _ = writeln!(output, "{}", format_row(headers, &widths, &aligns));

    let separator_widths = widths.iter().map(|w| (*w).max(3)).collect::<Vec<usize>>();
    let separator_cells = separator_widths
        .iter()
        .map(|w| "-".repeat(*w))
        .collect::<Vec<_>>();
    let _ = writeln!(
        output,
        "{}",
        format_row(&separator_cells, &separator_widths, &aligns)
    );

    for row in rows {
        let _ = writeln!(output, "{}", format_row(row, &widths, &aligns));
    }

    output
}

pub fn render_cards(cards: &[(&str, String)]) -> String {
    cards
        .iter()
        .map(|(label, value)| format!("{label}: {value}"))
        .collect::<Vec<_>>()
        .join(" | ")
}

fn format_row(values: &[String], widths: &[usize], aligns: &[Align]) -> String {
    let mut cells = Vec::with_capacity(values.len());
    for (idx, value) in values.iter().enumerate() {
        let Some(&width) = widths.get(idx) else {
            break;
        };
        let sanitized = sanitize_cell(value);
        let padding = " ".repeat(width.saturating_sub(display_width(sanitized.as_ref())));
        let cell = match aligns.get(idx).copied().unwrap_or(Align::Left) {
            Align::Left => format!("{sanitized}{padding}"),
            Align::Right => format!("{padding}{sanitized}"),
        };
        cells.push(cell);
    }
    let mut line = cells.join("  ");
    while line.ends_with(' ') {
        line.pop();
    }
    line
}

pub(crate) fn display_width(value: &str) -> usize {
    let mut width = 0usize;
    let mut chars = value.chars();
    while let Some(ch) = chars.next() {
        if ch == '\u{1b}' {
            // Skip ANSI escape sequence (e.g. \x1b[31m)
            for next in chars.by_ref() {
                if next == 'm' {
                    break;
                }
            }
        } else {
            width += 1;
        }
    }
    width
}

fn sanitize_cell(value: &str) -> Cow<'_, str> {
    if value.contains(['\n', '\r', '\t']) {
        Cow::Owned(value.replace(['\n', '\r', '\t'], " "))
    } else {
        Cow::Borrowed(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn numeric_columns_align_right() {
        let rendered = render_table(
            &strings(&["Primary Type", "count"]),
            &[strings(&["THEFT", "120"]), strings(&["BATTERY", "7"])],
        );
        let lines = rendered.lines().collect::<Vec<_>>();
        assert_eq!(lines[0], "Primary Type  count");
        assert_eq!(lines[1], "------------  -----");
        assert_eq!(lines[2], "THEFT           120");
        assert_eq!(lines[3], "BATTERY           7");
    }

    #[test]
    fn ansi_sequences_do_not_count_toward_width() {
        assert_eq!(display_width("\u{1b}[31m●\u{1b}[0m"), 1);
    }

    #[test]
    fn control_whitespace_is_flattened() {
        let rendered = render_table(&strings(&["Description"]), &[strings(&["TO\nPROPERTY"])]);
        assert!(rendered.contains("TO PROPERTY"));
    }

    #[test]
    fn cards_join_with_pipes() {
        let cards = [("Total Incidents", "3".to_string()), ("Arrests Made", "N/A".to_string())];
        assert_eq!(render_cards(&cards), "Total Incidents: 3 | Arrests Made: N/A");
    }
}
