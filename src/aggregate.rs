use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

use crate::{dataset::Field, filter::FilteredView};

pub const DEFAULT_TOP_N: usize = 15;

#[derive(Debug, Clone, PartialEq)]
pub enum Metric<T> {
    Available(T),
    NotAvailable,
}

impl<T> Metric<T> {
    pub fn when(available: bool, compute: impl FnOnce() -> T) -> Self {
        if available {
            Metric::Available(compute())
        } else {
            Metric::NotAvailable
        }
    }

    pub fn as_option(&self) -> Option<&T> {
        match self {
            Metric::Available(value) => Some(value),
            Metric::NotAvailable => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Metric::Available(_))
    }
}

impl<T: fmt::Display> fmt::Display for Metric<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metric::Available(value) => value.fmt(f),
            Metric::NotAvailable => f.write_str("N/A"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearRange {
    pub min: i64,
    pub max: i64,
}

impl fmt::Display for YearRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.min, self.max)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryMetrics {
    pub total: usize,
    pub arrests: Metric<usize>,
    pub crime_types: Metric<usize>,
    pub year_range: Metric<YearRange>,
}

pub fn summarize(view: &FilteredView<'_>) -> SummaryMetrics {
    SummaryMetrics {
        total: view.len(),
        arrests: arrest_count(view),
        crime_types: distinct_crime_types(view),
        year_range: year_range(view),
    }
}

pub fn arrest_count(view: &FilteredView<'_>) -> Metric<usize> {
    Metric::when(view.has(Field::Arrest), || {
        view.iter()
            .filter(|incident| incident.arrest == Some(true))
            .count()
    })
}

pub fn distinct_crime_types(view: &FilteredView<'_>) -> Metric<usize> {
    Metric::when(view.has(Field::PrimaryType), || {
        view.iter()
            .filter_map(|incident| incident.primary_type.as_deref())
            .collect::<HashSet<_>>()
            .len()
    })
}

pub fn year_range(view: &FilteredView<'_>) -> Metric<YearRange> {
    if !view.has(Field::Year) {
        return Metric::NotAvailable;
    }
    let mut years = view.iter().filter_map(|incident| incident.year);
    let Some(first) = years.next() else {
        return Metric::NotAvailable;
    };
    let (min, max) = years.fold((first, first), |(lo, hi), year| (lo.min(year), hi.max(year)));
    Metric::Available(YearRange { min, max })
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupRate {
    pub group: String,
    pub rate: f64,
    pub rows: usize,
}

/// Percentage of arrests per crime type, highest first, ties in first-seen
/// order. Rows with an unknown arrest value count toward their group's size
/// only.
pub fn arrest_rates(view: &FilteredView<'_>, top: usize) -> Metric<Vec<GroupRate>> {
    if !view.has(Field::PrimaryType) || !view.has(Field::Arrest) {
        return Metric::NotAvailable;
    }
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(&str, usize, usize)> = Vec::new();
    for incident in view.iter() {
        let Some(group) = incident.primary_type.as_deref() else {
            continue;
        };
        let slot = *index.entry(group).or_insert_with(|| {
            groups.push((group, 0, 0));
            groups.len() - 1
        });
        let entry = &mut groups[slot];
        entry.1 += 1;
        if incident.arrest == Some(true) {
            entry.2 += 1;
        }
    }

    let mut rates = groups
        .into_iter()
        .filter(|(_, rows, _)| *rows > 0)
        .map(|(group, rows, arrests)| GroupRate {
            group: group.to_string(),
            rate: arrests as f64 / rows as f64 * 100.0,
            rows,
        })
        .collect::<Vec<_>>();
    rates.sort_by(|a, b| b.rate.total_cmp(&a.rate));
    if top > 0 {
        rates.truncate(top);
    }
    Metric::Available(rates)
}

pub fn yearly_counts(view: &FilteredView<'_>) -> Metric<Vec<(i64, usize)>> {
    Metric::when(view.has(Field::Year), || {
        let mut counts = BTreeMap::new();
        for year in view.iter().filter_map(|incident| incident.year) {
            *counts.entry(year).or_insert(0usize) += 1;
        }
        counts.into_iter().collect()
    })
}
