use std::collections::BTreeSet;
use std::fmt;

use clap::ValueEnum;
use itertools::Itertools;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Restriction<T: Ord> {
    Unrestricted,
    RestrictedTo(BTreeSet<T>),
}

impl<T: Ord> Default for Restriction<T> {
    fn default() -> Self {
        Restriction::Unrestricted
    }
}

impl<T: Ord> Restriction<T> {
    /// Empty input means no restriction.
    pub fn from_values<I: IntoIterator<Item = T>>(values: I) -> Self {
        let set = values.into_iter().collect::<BTreeSet<_>>();
        if set.is_empty() {
            Restriction::Unrestricted
        } else {
            Restriction::RestrictedTo(set)
        }
    }

    pub fn is_restricted(&self) -> bool {
        matches!(self, Restriction::RestrictedTo(_))
    }

    /// Null values never satisfy a restriction.
    pub fn admits(&self, value: Option<&T>) -> bool {
        match self {
            Restriction::Unrestricted => true,
            Restriction::RestrictedTo(set) => value.is_some_and(|v| set.contains(v)),
        }
    }
}

impl<T: Ord + fmt::Display> fmt::Display for Restriction<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Restriction::Unrestricted => f.write_str("all"),
            Restriction::RestrictedTo(set) => write!(f, "{}", set.iter().join(", ")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "kebab-case")]
pub enum ArrestFilter {
    #[default]
    Any,
    Yes,
    No,
}

impl ArrestFilter {
    pub fn wanted(self) -> Option<bool> {
        match self {
            ArrestFilter::Any => None,
            ArrestFilter::Yes => Some(true),
            ArrestFilter::No => Some(false),
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "any" | "all" => Some(ArrestFilter::Any),
            "yes" | "true" | "y" => Some(ArrestFilter::Yes),
            "no" | "false" | "n" => Some(ArrestFilter::No),
            _ => None,
        }
    }
}

impl fmt::Display for ArrestFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ArrestFilter::Any => "All",
            ArrestFilter::Yes => "Yes",
            ArrestFilter::No => "No",
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSelection {
    pub years: Restriction<i64>,
    pub primary_types: Restriction<String>,
    pub locations: Restriction<String>,
    pub arrest: ArrestFilter,
}

impl FilterSelection {
    pub fn new(
        years: Vec<i64>,
        primary_types: Vec<String>,
        locations: Vec<String>,
        arrest: ArrestFilter,
    ) -> Self {
        Self {
            years: Restriction::from_values(years),
            primary_types: Restriction::from_values(clean_labels(primary_types)),
            locations: Restriction::from_values(clean_labels(locations)),
            arrest,
        }
    }

    pub fn is_unrestricted(&self) -> bool {
        !self.years.is_restricted()
            && !self.primary_types.is_restricted()
            && !self.locations.is_restricted()
            && self.arrest == ArrestFilter::Any
    }
}

impl fmt::Display for FilterSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "years: {}; crime types: {}; locations: {}; arrest: {}",
            self.years, self.primary_types, self.locations, self.arrest
        )
    }
}

fn clean_labels(values: Vec<String>) -> impl Iterator<Item = String> {
    values
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
