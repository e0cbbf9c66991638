use crate::models::{AggregationDataError, PropertyRecord, RawRecord};
use crate::prelude::*;

/// Coerced reference dataset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub records: Vec<PropertyRecord>,

    /// Fields excluded during coercion.
    pub rejected: Vec<AggregationDataError>,
}

impl Dataset {
    #[instrument(level = "debug", skip_all, fields(n_rows = raw.len()))]
    pub fn from_raw(raw: Vec<RawRecord>) -> Self {
        let mut dataset = Self {
            records: Vec::with_capacity(raw.len()),
            rejected: Vec::new(),
        };
        for (row, raw) in raw.into_iter().enumerate() {
            let (record, errors) = PropertyRecord::coerce(row, raw);
            for error in &errors {
                debug!("{:#}", error);
            }
            dataset.records.push(record);
            dataset.rejected.extend(errors);
        }
        if !dataset.rejected.is_empty() {
            warn!(
                n_rejected = dataset.rejected.len(),
                n_rows = dataset.records.len(),
                "some fields are excluded from aggregation"
            );
        }
        dataset
    }
}
