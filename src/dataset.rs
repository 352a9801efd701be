//! Incident table loading and the process-wide shared table.
//!
//! The extract is read once into a [`Dataset`]: raw cells for every column
//! plus typed accessors for the handful of fields the dashboard understands.
//! Which of those fields the file actually carries is captured once, at load
//! time, in a [`FieldSet`]; every filter, aggregate and view asks
//! [`Dataset::has`] instead of probing headers itself.
//!
//! [`init`] installs the loaded table into a `OnceLock` so repeated
//! interactions within a session reuse the same read-only table.

use std::{
    borrow::Cow,
    collections::BTreeMap,
    fmt,
    io::Read,
    path::Path,
    sync::OnceLock,
};

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use encoding_rs::Encoding;
use log::{debug, info};

use crate::{data, io_utils};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    Date,
    Year,
    PrimaryType,
    LocationDescription,
    Arrest,
    Latitude,
    Longitude,
    Description,
}

impl Field {
    pub const ALL: [Field; 8] = [
        Field::Date,
        Field::Year,
        Field::PrimaryType,
        Field::LocationDescription,
        Field::Arrest,
        Field::Latitude,
        Field::Longitude,
        Field::Description,
    ];

    pub fn header(self) -> &'static str {
        match self {
            Field::Date => "Date",
            Field::Year => "Year",
            Field::PrimaryType => "Primary Type",
            Field::LocationDescription => "Location Description",
            Field::Arrest => "Arrest",
            Field::Latitude => "Latitude",
            Field::Longitude => "Longitude",
            Field::Description => "Description",
        }
    }

    pub fn from_header(header: &str) -> Option<Field> {
        let trimmed = header.trim();
        Field::ALL
            .into_iter()
            .find(|field| field.header().eq_ignore_ascii_case(trimmed))
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSet {
    positions: BTreeMap<Field, usize>,
}

impl FieldSet {
    pub fn from_headers(headers: &[String]) -> Self {
        let mut positions = BTreeMap::new();
        for (idx, header) in headers.iter().enumerate() {
            if let Some(field) = Field::from_header(header) {
                // First occurrence wins when a header is duplicated.
                positions.entry(field).or_insert(idx);
            }
        }
        Self { positions }
    }

    pub fn has(&self, field: Field) -> bool {
        self.positions.contains_key(&field)
    }

    pub fn position(&self, field: Field) -> Option<usize> {
        self.positions.get(&field).copied()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Numeric,
    Timestamp,
    Text,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Incident {
    /// Display cells for every column, with `Date` and `Year` normalized.
    pub cells: Vec<String>,
    pub date: Option<NaiveDateTime>,
    pub year: Option<i64>,
    pub primary_type: Option<String>,
    pub location_description: Option<String>,
    pub arrest: Option<bool>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub description: Option<String>,
}

impl Incident {
    fn from_cells(mut cells: Vec<String>, fields: &FieldSet, width: usize) -> Self {
        cells.resize(width, String::new());
        let cell = |field: Field| {
            fields
                .position(field)
                .and_then(|idx| cells.get(idx))
                .map(|s| s.as_str())
                .unwrap_or("")
        };

        let date = data::coerce_timestamp(cell(Field::Date));
        let year = data::coerce_year(cell(Field::Year));
        let primary_type = data::coerce_label(cell(Field::PrimaryType));
        let location_description = data::coerce_label(cell(Field::LocationDescription));
        let arrest = data::coerce_flag(cell(Field::Arrest));
        let latitude = data::coerce_number(cell(Field::Latitude));
        let longitude = data::coerce_number(cell(Field::Longitude));
        let description = data::coerce_label(cell(Field::Description));

        if let Some(idx) = fields.position(Field::Date) {
            cells[idx] = data::format_timestamp(date.as_ref());
        }
        if let Some(idx) = fields.position(Field::Year) {
            cells[idx] = year.map(|y| y.to_string()).unwrap_or_default();
        }

        Self {
            cells,
            date,
            year,
            primary_type,
            location_description,
            arrest,
            latitude,
            longitude,
            description,
        }
    }

    pub fn coordinates(&self) -> Option<(f64, f64)> {
        Some((self.latitude?, self.longitude?))
    }

    /// Display label of a known field, `None` when the value is null.
    pub fn label(&self, field: Field) -> Option<Cow<'_, str>> {
        match field {
            Field::Date => self.date.as_ref().map(|ts| Cow::Owned(data::format_timestamp(Some(ts)))),
            Field::Year => self.year.map(|year| Cow::Owned(year.to_string())),
            Field::PrimaryType => self.primary_type.as_deref().map(Cow::Borrowed),
            Field::LocationDescription => self.location_description.as_deref().map(Cow::Borrowed),
            Field::Arrest => self.arrest.map(|flag| Cow::Owned(flag.to_string())),
            Field::Latitude => self.latitude.map(|v| Cow::Owned(v.to_string())),
            Field::Longitude => self.longitude.map(|v| Cow::Owned(v.to_string())),
            Field::Description => self.description.as_deref().map(Cow::Borrowed),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Dataset {
    headers: Vec<String>,
    fields: FieldSet,
    kinds: Vec<ColumnKind>,
    incidents: Vec<Incident>,
}

impl Dataset {
    pub fn load(path: &Path, delimiter: u8, encoding: &'static Encoding) -> Result<Self> {
        let reader = io_utils::open_csv_reader_from_path(path, delimiter)?;
        let dataset = Self::from_csv(reader, encoding)
            .with_context(|| format!("Loading incidents from {path:?}"))?;
        info!(
            "Loaded {} incident(s) across {} column(s) from {:?}",
            dataset.len(),
            dataset.headers.len(),
            path
        );
        Ok(dataset)
    }

    pub fn from_reader<R: Read>(
        reader: R,
        delimiter: u8,
        encoding: &'static Encoding,
    ) -> Result<Self> {
        Self::from_csv(io_utils::open_csv_reader(reader, delimiter), encoding)
    }

    fn from_csv<R: Read>(mut reader: csv::Reader<R>, encoding: &'static Encoding) -> Result<Self> {
        let headers = io_utils::reader_headers(&mut reader, encoding)?;
        let fields = FieldSet::from_headers(&headers);
        for field in Field::ALL {
            if !fields.has(field) {
                debug!("Column '{field}' absent; dependent views will be skipped");
            }
        }

        let mut incidents = Vec::new();
        for (row_idx, record) in reader.byte_records().enumerate() {
            let record = record.with_context(|| format!("Reading row {}", row_idx + 2))?;
            let decoded = io_utils::decode_record(&record, encoding)
                .with_context(|| format!("Decoding row {}", row_idx + 2))?;
            incidents.push(Incident::from_cells(decoded, &fields, headers.len()));
        }

        let kinds = infer_column_kinds(&headers, &fields, &incidents);
        Ok(Self {
            headers,
            fields,
            kinds,
            incidents,
        })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn fields(&self) -> &FieldSet {
        &self.fields
    }

    pub fn has(&self, field: Field) -> bool {
        self.fields.has(field)
    }

    pub fn incidents(&self) -> &[Incident] {
        &self.incidents
    }

    pub fn len(&self) -> usize {
        self.incidents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.incidents.is_empty()
    }

    pub fn column_kind(&self, index: usize) -> Option<ColumnKind> {
        self.kinds.get(index).copied()
    }

    pub fn numeric_columns(&self) -> Vec<usize> {
        self.kinds
            .iter()
            .enumerate()
            .filter(|(_, kind)| **kind == ColumnKind::Numeric)
            .map(|(idx, _)| idx)
            .collect()
    }
}

fn infer_column_kinds(
    headers: &[String],
    fields: &FieldSet,
    incidents: &[Incident],
) -> Vec<ColumnKind> {
    (0..headers.len())
        .map(|idx| {
            if fields.position(Field::Date) == Some(idx) {
                return ColumnKind::Timestamp;
            }
            if fields.position(Field::Year) == Some(idx) {
                return ColumnKind::Numeric;
            }
            let mut saw_value = false;
            for incident in incidents {
                let cell = incident.cells[idx].trim();
                if cell.is_empty() {
                    continue;
                }
                if data::coerce_number(cell).is_none() {
                    return ColumnKind::Text;
                }
                saw_value = true;
            }
            if saw_value {
                ColumnKind::Numeric
            } else {
                ColumnKind::Text
            }
        })
        .collect()
}

static DATASET: OnceLock<Dataset> = OnceLock::new();

/// Loads the process-wide table on first call; later calls return the
/// already-loaded table and ignore their arguments.
pub fn init(path: &Path, delimiter: u8, encoding: &'static Encoding) -> Result<&'static Dataset> {
    if let Some(existing) = DATASET.get() {
        debug!("Reusing loaded incident table ({} rows)", existing.len());
        return Ok(existing);
    }
    let loaded = Dataset::load(path, delimiter, encoding)?;
    Ok(DATASET.get_or_init(|| loaded))
}

pub fn get() -> Option<&'static Dataset> {
    DATASET.get()
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::UTF_8;

    fn load(csv: &str) -> Dataset {
        Dataset::from_reader(csv.as_bytes(), b',', UTF_8).expect("load dataset")
    }

    #[test]
    fn init_loads_once_and_reuses_the_table() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("crimes.csv");
        std::fs::write(&path, "Primary Type\nTHEFT\n").expect("write csv");

        let first = init(&path, b',', UTF_8).expect("first load");
        assert_eq!(first.len(), 1);

        std::fs::write(&path, "Primary Type\nTHEFT\nBATTERY\n").expect("rewrite csv");
        let again = init(&path, b',', UTF_8).expect("cached table");
        let missing = init(&dir.path().join("absent.csv"), b',', UTF_8).expect("cached table");
        assert!(std::ptr::eq(first, again));
        assert!(std::ptr::eq(first, missing));
        assert_eq!(missing.len(), 1);
        assert!(get().is_some_and(|loaded| std::ptr::eq(loaded, first)));
    }

    #[test]
    fn field_set_records_present_columns_only() {
        let dataset = load("ID,Primary Type,Arrest\n1,THEFT,true\n");
        assert!(dataset.has(Field::PrimaryType));
        assert!(dataset.has(Field::Arrest));
        assert!(!dataset.has(Field::Year));
        assert!(!dataset.has(Field::Latitude));
        assert_eq!(dataset.fields().position(Field::Arrest), Some(2));
    }

    #[test]
    fn malformed_optional_values_become_null() {
        let dataset = load(
            "Date,Year,Arrest,Latitude\n\
             garbage,not-a-year,perhaps,north\n\
             01/02/2023 10:00:00 AM,2023,false,41.9\n",
        );
        assert_eq!(dataset.len(), 2);
        let bad = &dataset.incidents()[0];
        assert_eq!(bad.date, None);
        assert_eq!(bad.year, None);
        assert_eq!(bad.arrest, None);
        assert_eq!(bad.latitude, None);
        assert_eq!(bad.cells[0], "");
        assert_eq!(bad.cells[1], "");

        let good = &dataset.incidents()[1];
        assert_eq!(good.year, Some(2023));
        assert_eq!(good.arrest, Some(false));
        assert_eq!(good.cells[0], "2023-01-02 10:00:00");
    }

    #[test]
    fn ragged_rows_are_padded() {
        let dataset = load("Primary Type,Description,Latitude\nTHEFT\n");
        let incident = &dataset.incidents()[0];
        assert_eq!(incident.cells.len(), 3);
        assert_eq!(incident.primary_type.as_deref(), Some("THEFT"));
        assert_eq!(incident.description, None);
    }

    #[test]
    fn column_kinds_separate_numeric_from_text() {
        let dataset = load(
            "ID,Date,Year,Primary Type,Beat,Empty\n\
             10,2023-01-01,2023,THEFT,1011,\n\
             11,2023-01-02,oops,BATTERY,,\n",
        );
        assert_eq!(dataset.column_kind(0), Some(ColumnKind::Numeric));
        assert_eq!(dataset.column_kind(1), Some(ColumnKind::Timestamp));
        assert_eq!(dataset.column_kind(2), Some(ColumnKind::Numeric));
        assert_eq!(dataset.column_kind(3), Some(ColumnKind::Text));
        assert_eq!(dataset.column_kind(4), Some(ColumnKind::Numeric));
        assert_eq!(dataset.column_kind(5), Some(ColumnKind::Text));
        assert_eq!(dataset.numeric_columns(), vec![0, 2, 4]);
    }

    #[test]
    fn coordinates_require_both_axes() {
        let dataset = load("Latitude,Longitude\n41.8,-87.6\n41.8,\n");
        assert_eq!(dataset.incidents()[0].coordinates(), Some((41.8, -87.6)));
        assert_eq!(dataset.incidents()[1].coordinates(), None);
    }

    #[test]
    fn headers_match_case_insensitively() {
        assert_eq!(Field::from_header(" primary type "), Some(Field::PrimaryType));
        assert_eq!(Field::from_header("ARREST"), Some(Field::Arrest));
        assert_eq!(Field::from_header("Ward"), None);
    }
}
