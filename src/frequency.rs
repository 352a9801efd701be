use std::collections::HashMap;

use crate::{aggregate::Metric, dataset::Field, filter::FilteredView};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueCount {
    pub value: String,
    pub count: usize,
}

/// The `top` most frequent non-null values of `field`, ties in first-seen
/// order. `top == 0` keeps every value.
pub fn top_values(view: &FilteredView<'_>, field: Field, top: usize) -> Metric<Vec<ValueCount>> {
    if !view.has(field) {
        return Metric::NotAvailable;
    }
    let mut accumulator = FrequencyAccumulator::default();
    for incident in view.iter() {
        if let Some(label) = incident.label(field) {
            accumulator.ingest(label.as_ref());
        }
    }
    Metric::Available(accumulator.ranked(top))
}

#[derive(Debug, Default)]
struct FrequencyAccumulator {
    index: HashMap<String, usize>,
    counts: Vec<ValueCount>,
}

impl FrequencyAccumulator {
    fn ingest(&mut self, value: &str) {
        match self.index.get(value) {
            Some(&slot) => self.counts[slot].count += 1,
            None => {
                self.index.insert(value.to_string(), self.counts.len());
                self.counts.push(ValueCount {
                    value: value.to_string(),
                    count: 1,
                });
            }
        }
    }

    fn ranked(self, top: usize) -> Vec<ValueCount> {
        let mut items = self.counts;
        // `sort_by` is stable, so equal counts stay in first-seen order.
        items.sort_by(|a, b| b.count.cmp(&a.count));
        if top > 0 && items.len() > top {
            items.truncate(top);
        }
        items
    }
}
