use super::{SeriesTable, COL_DATE, COL_PRICE};
use crate::error::DashboardError;
use crate::utils::{parse_date, parse_finite};
use chrono::prelude::*;
use log::{debug, info, warn};
use std::path::Path;

/// The SP95 price time series read from the local csv.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FuelPrices {
    pub time: Vec<NaiveDate>,
    pub price: Vec<f64>,
}

impl FuelPrices {
    pub fn new(capacity: usize) -> FuelPrices {
        FuelPrices {
            time: Vec::with_capacity(capacity),
            price: Vec::with_capacity(capacity),
        }
    }

    /// Initiate FuelPrices from a csv with at least the `Date` and `Prix` columns.
    /// Rows with an unreadable date or a missing, non numeric or negative price are dropped.
    /// The result is sorted by date; for repeated dates the first row in file order is kept.
    /// Fail only when the file itself cannot be opened or lacks the required columns.
    pub fn from_csv<P>(fin: P) -> Result<FuelPrices, DashboardError>
    where
        P: AsRef<Path>,
    {
        let fin = fin.as_ref();
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_path(fin)
            .map_err(|e| DashboardError::file_access(fin, e))?;
        let headers = reader
            .headers()
            .map_err(|e| DashboardError::file_access(fin, e))?
            .clone();
        let idx_date = header_index(&headers, COL_DATE)
            .ok_or_else(|| DashboardError::file_access(fin, "missing Date column"))?;
        let idx_price = header_index(&headers, COL_PRICE)
            .ok_or_else(|| DashboardError::file_access(fin, "missing Prix column"))?;

        let mut rows: Vec<(NaiveDate, f64)> = Vec::new();
        let mut dropped = 0usize;
        for (n, record) in reader.records().enumerate() {
            let record = match record {
                Ok(r) => r,
                Err(e) => {
                    debug!("could not read line {} of {:?}: {}", n + 2, fin, e);
                    dropped += 1;
                    continue;
                }
            };
            let raw_date = record.get(idx_date).unwrap_or("");
            let raw_price = record.get(idx_price).unwrap_or("");
            match parse_row(raw_date, raw_price) {
                Ok(row) => rows.push(row),
                Err(e) => {
                    debug!("dropping line {} of {:?}: {}", n + 2, fin, e);
                    dropped += 1;
                }
            }
        }

        rows.sort_by_key(|(d, _)| *d);
        let before = rows.len();
        rows.dedup_by_key(|(d, _)| *d);
        if rows.len() < before {
            warn!(
                "{} repeated dates in {:?}, kept the first of each",
                before - rows.len(),
                fin
            );
        }

        let mut fp = FuelPrices::new(rows.len());
        for (d, p) in rows {
            fp.time.push(d);
            fp.price.push(p);
        }
        info!(
            "read {} fuel prices from {:?} ({} rows dropped)",
            fp.len(),
            fin,
            dropped
        );
        Ok(fp)
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    pub fn to_table(&self) -> SeriesTable {
        let mut table = SeriesTable::new(self.time.clone());
        table.set_column(COL_PRICE, self.price.clone());
        table
    }
}

fn header_index(headers: &csv::StringRecord, name: &str) -> Option<usize> {
    headers.iter().position(|h| h.trim_start_matches('\u{feff}') == name)
}

fn parse_row(raw_date: &str, raw_price: &str) -> Result<(NaiveDate, f64), DashboardError> {
    let date = parse_date(raw_date).ok_or_else(|| DashboardError::parse(COL_DATE, raw_date))?;
    let price = parse_finite(raw_price)
        .filter(|p| *p >= 0.)
        .ok_or_else(|| DashboardError::parse(COL_PRICE, raw_price))?;
    Ok((date, price))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(content: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn read_sample_fixture() {
        let fp = FuelPrices::from_csv("./test/prix_sp95_sample.csv").unwrap();
        assert!(!fp.is_empty());
        assert!(fp.time.windows(2).all(|w| w[1] > w[0]));
        assert!(fp.price.iter().all(|p| *p >= 0.));
    }

    #[test]
    fn drops_invalid_rows_and_sorts() {
        let f = write_csv(
            "Date,Prix,Station\n\
             2024-03-01,1.90,a\n\
             2024-01-01,1.85,b\n\
             not a date,1.70,c\n\
             2024-02-01,,d\n\
             2024-04-01,abc,e\n\
             2024-05-01,-1.2,f\n\
             2024-06-01,NaN,g\n",
        );
        let fp = FuelPrices::from_csv(f.path()).unwrap();
        assert_eq!(fp.time, vec![d(2024, 1, 1), d(2024, 3, 1)]);
        assert_eq!(fp.price, vec![1.85, 1.90]);
    }

    #[test]
    fn repeated_dates_keep_first() {
        let f = write_csv("Prix,Date\n1.80,2024-01\n1.99,2024-01-01\n1.70,2023-12\n");
        let fp = FuelPrices::from_csv(f.path()).unwrap();
        assert_eq!(fp.time, vec![d(2023, 12, 1), d(2024, 1, 1)]);
        assert_eq!(fp.price, vec![1.70, 1.80]);
    }

    #[test]
    fn missing_file_is_file_access_error() {
        let err = FuelPrices::from_csv("./test/does_not_exist.csv").unwrap_err();
        assert!(matches!(err, DashboardError::FileAccess { .. }));
    }

    #[test]
    fn missing_price_column_is_file_access_error() {
        let f = write_csv("Date,Price\n2024-01-01,1.85\n");
        let err = FuelPrices::from_csv(f.path()).unwrap_err();
        assert!(matches!(err, DashboardError::FileAccess { .. }));
    }

    #[test]
    fn to_table_has_price_column() {
        let f = write_csv("Date,Prix\n2024-01-01,1.85\n");
        let t = FuelPrices::from_csv(f.path()).unwrap().to_table();
        assert_eq!(t.column(COL_PRICE), Some(&[1.85][..]));
    }
}
