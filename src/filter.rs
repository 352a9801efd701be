use std::collections::BTreeSet;

use log::debug;

use crate::{
    dataset::{Dataset, Field, Incident},
    selection::{ArrestFilter, FilterSelection},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Year,
    PrimaryType,
    LocationDescription,
    Arrest,
}

impl Dimension {
    pub const ALL: [Dimension; 4] = [
        Dimension::Year,
        Dimension::PrimaryType,
        Dimension::LocationDescription,
        Dimension::Arrest,
    ];

    pub fn field(self) -> Field {
        match self {
            Dimension::Year => Field::Year,
            Dimension::PrimaryType => Field::PrimaryType,
            Dimension::LocationDescription => Field::LocationDescription,
            Dimension::Arrest => Field::Arrest,
        }
    }

    fn is_active(self, selection: &FilterSelection) -> bool {
        match self {
            Dimension::Year => selection.years.is_restricted(),
            Dimension::PrimaryType => selection.primary_types.is_restricted(),
            Dimension::LocationDescription => selection.locations.is_restricted(),
            Dimension::Arrest => selection.arrest != ArrestFilter::Any,
        }
    }

    fn admits(self, selection: &FilterSelection, incident: &Incident) -> bool {
        match self {
            Dimension::Year => selection.years.admits(incident.year.as_ref()),
            Dimension::PrimaryType => selection
                .primary_types
                .admits(incident.primary_type.as_ref()),
            Dimension::LocationDescription => selection
                .locations
                .admits(incident.location_description.as_ref()),
            Dimension::Arrest => match selection.arrest.wanted() {
                Some(wanted) => incident.arrest == Some(wanted),
                None => true,
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    dataset: &'a Dataset,
    rows: Vec<&'a Incident>,
}

impl<'a> FilteredView<'a> {
    pub fn unfiltered(dataset: &'a Dataset) -> Self {
        Self {
            dataset,
            rows: dataset.incidents().iter().collect(),
        }
    }

    pub fn dataset(&self) -> &'a Dataset {
        self.dataset
    }

    pub fn has(&self, field: Field) -> bool {
        self.dataset.has(field)
    }

    pub fn rows(&self) -> &[&'a Incident] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Incident> + '_ {
        self.rows.iter().copied()
    }
}

pub fn apply<'a>(dataset: &'a Dataset, selection: &FilterSelection) -> FilteredView<'a> {
    apply_in_order(dataset, selection, &Dimension::ALL)
}

/// Applies dimension filters one after another in the given order. Dimensions
/// that are unrestricted, or whose column is absent from the table, are
/// skipped.
pub fn apply_in_order<'a>(
    dataset: &'a Dataset,
    selection: &FilterSelection,
    order: &[Dimension],
) -> FilteredView<'a> {
    let mut view = FilteredView::unfiltered(dataset);
    for &dimension in order {
        if !dimension.is_active(selection) {
            continue;
        }
        if !dataset.has(dimension.field()) {
            debug!(
                "Skipping {:?} filter; column '{}' not present",
                dimension,
                dimension.field()
            );
            continue;
        }
        view.rows
            .retain(|incident| dimension.admits(selection, incident));
        debug!("{:?} filter kept {} row(s)", dimension, view.rows.len());
    }
    view
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterOptions {
    pub years: Vec<i64>,
    pub primary_types: Vec<String>,
    pub locations: Vec<String>,
}

pub fn filter_options(dataset: &Dataset) -> FilterOptions {
    let mut years = BTreeSet::new();
    let mut primary_types = BTreeSet::new();
    let mut locations = BTreeSet::new();
    for incident in dataset.incidents() {
        if let Some(year) = incident.year {
            years.insert(year);
        }
        if let Some(label) = &incident.primary_type {
            primary_types.insert(label.as_str());
        }
        if let Some(label) = &incident.location_description {
            locations.insert(label.as_str());
        }
    }
    FilterOptions {
        years: years.into_iter().collect(),
        primary_types: primary_types.into_iter().map(str::to_string).collect(),
        locations: locations.into_iter().map(str::to_string).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::UTF_8;

    const SAMPLE: &str = "Year,Primary Type,Location Description,Arrest\n\
        2023,THEFT,STREET,true\n\
        2023,BATTERY,RESIDENCE,false\n\
        2024,THEFT,RESIDENCE,false\n\
        ,THEFT,,\n";

    fn dataset(csv: &str) -> Dataset {
        Dataset::from_reader(csv.as_bytes(), b',', UTF_8).expect("dataset")
    }

    #[test]
    fn unrestricted_selection_keeps_every_row() {
        let data = dataset(SAMPLE);
        let view = apply(&data, &FilterSelection::default());
        assert_eq!(view.len(), data.len());
    }

    #[test]
    fn dimensions_combine_with_and() {
        let data = dataset(SAMPLE);
        let selection = FilterSelection::new(
            vec![2023],
            vec!["THEFT".to_string()],
            Vec::new(),
            ArrestFilter::Any,
        );
        let view = apply(&data, &selection);
        assert_eq!(view.len(), 1);
        assert_eq!(view.rows()[0].location_description.as_deref(), Some("STREET"));
    }

    #[test]
    fn arrest_filter_never_matches_unknown_values() {
        let data = dataset(SAMPLE);
        let no = FilterSelection {
            arrest: ArrestFilter::No,
            ..FilterSelection::default()
        };
        assert_eq!(apply(&data, &no).len(), 2);
        let yes = FilterSelection {
            arrest: ArrestFilter::Yes,
            ..FilterSelection::default()
        };
        assert_eq!(apply(&data, &yes).len(), 1);
    }

    #[test]
    fn absent_column_disables_its_filter() {
        let data = dataset("Primary Type\nTHEFT\nBATTERY\n");
        let selection = FilterSelection::new(vec![1999], Vec::new(), Vec::new(), ArrestFilter::Yes);
        assert_eq!(apply(&data, &selection).len(), 2);
    }

    #[test]
    fn options_are_sorted_and_skip_nulls() {
        let data = dataset(SAMPLE);
        let options = filter_options(&data);
        assert_eq!(options.years, vec![2023, 2024]);
        assert_eq!(options.primary_types, vec!["BATTERY", "THEFT"]);
        assert_eq!(options.locations, vec!["RESIDENCE", "STREET"]);
    }

    #[test]
    fn options_are_empty_for_missing_columns() {
        let data = dataset("Primary Type\nTHEFT\n");
        let options = filter_options(&data);
        assert!(options.years.is_empty());
        assert!(options.locations.is_empty());
        assert_eq!(options.primary_types, vec!["THEFT"]);
    }
}
