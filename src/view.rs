use super::{Measure, SeriesTable, COL_PRICE};
use crate::utils::last_n_years;
use chrono::prelude::*;
use log::{debug, warn};
use rayon::prelude::*;
use std::collections::BTreeSet;

pub const DEFAULT_YEAR_COUNT: usize = 5;

/// What the user picked: years, curves, and whether to rebase to 100.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewOptions {
    pub years: BTreeSet<i32>,
    pub measures: Vec<Measure>,
    pub normalize: bool,
}

impl ViewOptions {
    /// The last five years of the table and the given curves, not normalized.
    pub fn defaults_for(table: &SeriesTable, measures: &[Measure]) -> ViewOptions {
        ViewOptions {
            years: default_years(table),
            measures: measures.to_vec(),
            normalize: false,
        }
    }
}

pub fn default_years(table: &SeriesTable) -> BTreeSet<i32> {
    last_n_years(&table.years(), DEFAULT_YEAR_COUNT)
        .into_iter()
        .collect()
}

/// Keep the rows of the selected years. No years selected gives an empty table.
pub fn filter_years(table: &SeriesTable, years: &BTreeSet<i32>) -> SeriesTable {
    table.retain_rows(|d| years.contains(&d.year()))
}

/// Rescale a column so that its first value is 100.
/// None when there is no first value or it cannot be divided by.
pub fn base100(values: &[f64]) -> Option<Vec<f64>> {
    let first = *values.first()?;
    if first == 0. || !first.is_finite() {
        return None;
    }
    Some(values.iter().map(|v| v / first * 100.).collect())
}

/// Add a `<LABEL>_norm` column for every selected measure whose column is present,
/// computed from the base column against the first row of `table`.
/// Derived columns are always rebuilt from the base columns, so applying this twice changes nothing.
pub fn normalize(table: &SeriesTable, measures: &[Measure]) -> SeriesTable {
    let mut out = table.clone();
    if table.is_empty() {
        return out;
    }
    let derived: Vec<(Measure, Option<Vec<f64>>)> = measures
        .par_iter()
        .filter_map(|m| table.column(m.column()).map(|v| (*m, base100(v))))
        .collect();
    for (m, values) in derived {
        match values {
            Some(values) => out.set_column(m.norm_column(), values),
            None => warn!(
                "cannot rebase {} to 100, its first value in range is {:?}",
                m,
                table.column(m.column()).and_then(|v| v.first())
            ),
        }
    }
    out
}

/// Filter by year, then rebase if asked.
pub fn apply(table: &SeriesTable, opts: &ViewOptions) -> SeriesTable {
    let filtered = filter_years(table, &opts.years);
    debug!(
        "{} of {} rows in years {:?}",
        filtered.len(),
        table.len(),
        opts.years
    );
    if opts.normalize {
        normalize(&filtered, &opts.measures)
    } else {
        filtered
    }
}

/// Columns of the data table and of the export, after `Date`:
/// the selected indices in selection order, then the price when SP95 is selected.
pub fn displayed_columns(measures: &[Measure]) -> Vec<&'static str> {
    let mut cols: Vec<&'static str> = measures
        .iter()
        .filter(|m| **m != Measure::Sp95)
        .map(|m| m.column())
        .collect();
    if measures.contains(&Measure::Sp95) {
        cols.push(COL_PRICE);
    }
    cols
}

/// One point of the long layout used by the interactive chart.
#[derive(Debug, Clone, PartialEq)]
pub struct LongRow {
    pub date: NaiveDate,
    pub value: f64,
    pub series: &'static str,
}

/// Reshape the wide table to `(date, value, series)` rows, one block per selected measure.
/// Measures without a backing column are skipped.
pub fn to_long(table: &SeriesTable, measures: &[Measure], normalized: bool) -> Vec<LongRow> {
    let mut rows = Vec::with_capacity(table.len() * measures.len());
    for m in measures.iter() {
        let values = match table.column(&m.plot_column(normalized)) {
            Some(v) => v,
            None => continue,
        };
        rows.extend(table.time.iter().zip(values).map(|(d, v)| LongRow {
            date: *d,
            value: *v,
            series: m.label(),
        }));
    }
    rows
}
