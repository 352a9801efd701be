use crate::{
    data::{coerce_number, format_number},
    filter::FilteredView,
};

pub const STAT_LABELS: [&str; 8] = ["count", "mean", "std", "min", "25%", "50%", "75%", "max"];

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnStats {
    name: String,
    values: Vec<f64>,
    sum: f64,
    min: Option<f64>,
    max: Option<f64>,
}

impl ColumnStats {
    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: Vec::new(),
            sum: 0.0,
            min: None,
            max: None,
        }
    }

    pub fn add_value(&mut self, value: f64) {
        self.sum += value;
        self.min = Some(self.min.map_or(value, |current| current.min(value)));
        self.max = Some(self.max.map_or(value, |current| current.max(value)));
        self.values.push(value);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn count(&self) -> usize {
        self.values.len()
    }

    pub fn min(&self) -> Option<f64> {
        self.min
    }

    pub fn max(&self) -> Option<f64> {
        self.max
    }

    pub fn mean(&self) -> Option<f64> {
        if self.values.is_empty() {
            None
        } else {
            Some(self.sum / self.count() as f64)
        }
    }

    /// Sample standard deviation (n - 1 denominator).
    pub fn std_dev(&self) -> Option<f64> {
        let count = self.count();
        if count < 2 {
            return None;
        }
        let mean = self.mean()?;
        let squared_deviations = self
            .values
            .iter()
            .map(|value| (value - mean).powi(2))
            .sum::<f64>();
        Some((squared_deviations / (count as f64 - 1.0)).sqrt())
    }

    /// Quantile by linear interpolation between the closest ranks.
    pub fn quantile(&self, q: f64) -> Option<f64> {
        if self.values.is_empty() {
            return None;
        }
        let mut sorted = self.values.clone();
        sorted.sort_by(f64::total_cmp);
        let position = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
        let lower = position.floor() as usize;
        let upper = position.ceil() as usize;
        let fraction = position - lower as f64;
        Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
    }

    fn metrics(&self) -> [Option<f64>; 8] {
        [
            Some(self.count() as f64),
            self.mean(),
            self.std_dev(),
            self.min,
            self.quantile(0.25),
            self.quantile(0.5),
            self.quantile(0.75),
            self.max,
        ]
    }
}

pub fn describe(view: &FilteredView<'_>) -> Vec<ColumnStats> {
    let dataset = view.dataset();
    let columns = dataset.numeric_columns();
    let mut stats = columns
        .iter()
        .map(|&idx| ColumnStats::with_name(dataset.headers()[idx].clone()))
        .collect::<Vec<_>>();
    for incident in view.iter() {
        for (slot, &idx) in columns.iter().enumerate() {
            if let Some(value) = incident.cells.get(idx).and_then(|cell| coerce_number(cell)) {
                stats[slot].add_value(value);
            }
        }
    }
    stats
}

pub fn render_rows(stats: &[ColumnStats]) -> (Vec<String>, Vec<Vec<String>>) {
    let mut headers = vec![String::new()];
    headers.extend(stats.iter().map(|s| s.name.clone()));
    let metrics = stats.iter().map(ColumnStats::metrics).collect::<Vec<_>>();
    let rows = STAT_LABELS
        .iter()
        .enumerate()
        .map(|(metric_idx, label)| {
            let mut row = vec![label.to_string()];
            row.extend(
                metrics
                    .iter()
                    .map(|values| values[metric_idx].map(format_number).unwrap_or_default()),
            );
            row
        })
        .collect();
    (headers, rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats_of(values: &[f64]) -> ColumnStats {
        let mut stats = ColumnStats::with_name("Ward");
        for value in values {
            stats.add_value(*value);
        }
        stats
    }

    #[test]
    fn quartiles_interpolate_between_ranks() {
        let stats = stats_of(&[4.0, 1.0, 3.0, 2.0]);
        assert_eq!(stats.quantile(0.25), Some(1.75));
        assert_eq!(stats.quantile(0.5), Some(2.5));
        assert_eq!(stats.quantile(0.75), Some(3.25));
        assert_eq!(stats.min(), Some(1.0));
        assert_eq!(stats.max(), Some(4.0));
    }

    #[test]
    fn std_dev_uses_sample_denominator() {
        let stats = stats_of(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert_eq!(stats.mean(), Some(5.0));
        let std = stats.std_dev().unwrap();
        assert!((std - 2.138089935).abs() < 1e-6, "std was {std}");
    }

    #[test]
    fn std_dev_keeps_precision_for_large_identifiers() {
        let ids = (1..=10).map(|offset| 1.0e9 + offset as f64).collect::<Vec<_>>();
        let std = stats_of(&ids).std_dev().unwrap();
        assert!((std - 3.0276503540974917).abs() < 1e-9, "std was {std}");
    }

    #[test]
    fn single_value_has_no_spread() {
        let stats = stats_of(&[12.0]);
        assert_eq!(stats.std_dev(), None);
        assert_eq!(stats.quantile(0.75), Some(12.0));
    }

    #[test]
    fn empty_column_renders_count_only() {
        let (headers, rows) = render_rows(&[ColumnStats::with_name("Beat")]);
        assert_eq!(headers, vec!["".to_string(), "Beat".to_string()]);
        assert_eq!(rows[0], vec!["count".to_string(), "0".to_string()]);
        assert_eq!(rows[1], vec!["mean".to_string(), String::new()]);
        assert_eq!(rows.len(), STAT_LABELS.len());
    }
}
