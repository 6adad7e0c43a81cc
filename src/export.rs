use super::{Measure, SeriesTable, COL_DATE};
use crate::error::DashboardError;
use crate::utils::format_value;
use crate::view::displayed_columns;
use log::info;
use std::path::Path;

/// Serialize the displayed view: `Date` and the non normalized columns of the selected measures.
/// Comma delimited, header row, no index, dates as `YYYY-MM-DD`,
/// values written as in the printed table.
pub fn to_csv_bytes(table: &SeriesTable, measures: &[Measure]) -> Result<Vec<u8>, DashboardError> {
    let shown = table.select(&displayed_columns(measures));
    let mut wtr = csv::Writer::from_writer(Vec::new());
    let mut header = vec![COL_DATE];
    header.extend(shown.column_names());
    wtr.write_record(&header)?;
    for (i, t) in shown.time.iter().enumerate() {
        let mut record = Vec::with_capacity(shown.columns.len() + 1);
        record.push(t.format("%Y-%m-%d").to_string());
        for c in shown.columns.iter() {
            record.push(format_value(c.values[i]));
        }
        wtr.write_record(&record)?;
    }
    wtr.into_inner()
        .map_err(|e| DashboardError::Export(e.to_string()))
}

/// Write the displayed view to the given file.
pub fn write_csv<P>(table: &SeriesTable, measures: &[Measure], fout: P) -> Result<(), DashboardError>
where
    P: AsRef<Path>,
{
    let fout = fout.as_ref();
    let bytes = to_csv_bytes(table, measures)?;
    std::fs::write(fout, bytes).map_err(|e| DashboardError::Export(format!("{:?}: {}", fout, e)))?;
    info!("{} rows exported to {:?}", table.len(), fout);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::normalize;
    use crate::{COL_IPC, COL_IPCH, COL_ISJ, COL_PRICE};
    use chrono::prelude::*;

    fn table() -> SeriesTable {
        let mut t = SeriesTable::new(vec![
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
        ]);
        t.set_column(COL_IPCH, vec![118.2, 118.5]);
        t.set_column(COL_ISJ, vec![120.1, 120.4]);
        t.set_column(COL_IPC, vec![117.5, 117.8]);
        t.set_column(COL_PRICE, vec![1.85, 1.9]);
        t
    }

    #[test]
    fn exports_displayed_columns_in_order() {
        let bytes = to_csv_bytes(&table(), &[Measure::Sp95, Measure::Ipc]).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(text, "Date,IPC,Prix\n2024-01-01,117.5,1.85\n2024-02-01,117.8,1.9\n");
    }

    #[test]
    fn whole_values_match_the_printed_table() {
        let mut t = table();
        t.set_column(COL_PRICE, vec![2., 1.9]);
        let text = String::from_utf8(to_csv_bytes(&t, &[Measure::Sp95]).unwrap()).unwrap();
        assert_eq!(text, "Date,Prix\n2024-01-01,2.0\n2024-02-01,1.9\n");
        let printed = t.select(&[COL_PRICE]).to_string();
        assert!(printed.lines().nth(1).unwrap().ends_with(" 2.0"));
    }

    #[test]
    fn normalized_columns_are_not_exported() {
        let n = normalize(&table(), &[Measure::Ipch]);
        let text = String::from_utf8(to_csv_bytes(&n, &[Measure::Ipch]).unwrap()).unwrap();
        assert_eq!(text.lines().next(), Some("Date,IPCH"));
        assert!(!text.contains("_norm"));
    }

    #[test]
    fn empty_view_is_header_only() {
        let empty = table().retain_rows(|_| false);
        let text = String::from_utf8(to_csv_bytes(&empty, &[Measure::Isj]).unwrap()).unwrap();
        assert_eq!(text, "Date,ISJ\n");
    }

    #[test]
    fn absent_price_is_skipped_in_inflation_view() {
        let t = table().select(&[COL_IPCH, COL_ISJ, COL_IPC]);
        let text = String::from_utf8(to_csv_bytes(&t, &[Measure::Sp95, Measure::Ipc]).unwrap()).unwrap();
        assert_eq!(text.lines().next(), Some("Date,IPC"));
    }

    #[test]
    fn write_csv_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let fout = dir.path().join(crate::SP95_EXPORT_NAME);
        write_csv(&table(), &[Measure::Isj], &fout).unwrap();
        let text = std::fs::read_to_string(&fout).unwrap();
        assert!(text.starts_with("Date,ISJ\n2024-01-01,120.1\n"));
    }
}
