use super::{FuelPrices, InflationSeries, SeriesTable, COL_IPC, COL_IPCH, COL_ISJ, COL_PRICE};
use log::info;
use std::cmp::Ordering;

/// Inner join of the inflation indices and the fuel prices on the exact date.
/// Both inputs are sorted with unique dates, so a single sorted-merge pass is enough.
/// Columns: IPCH, ISJ, IPC, Prix.
pub fn merge(fuel: &FuelPrices, inflation: &InflationSeries) -> SeriesTable {
    let capacity = fuel.len().min(inflation.len());
    let mut time = Vec::with_capacity(capacity);
    let mut ipch = Vec::with_capacity(capacity);
    let mut isj = Vec::with_capacity(capacity);
    let mut ipc = Vec::with_capacity(capacity);
    let mut price = Vec::with_capacity(capacity);

    let (mut i, mut j) = (0usize, 0usize);
    while i < inflation.len() && j < fuel.len() {
        match inflation.time[i].cmp(&fuel.time[j]) {
            Ordering::Less => i += 1,
            Ordering::Greater => j += 1,
            Ordering::Equal => {
                time.push(inflation.time[i]);
                ipch.push(inflation.ipch[i]);
                isj.push(inflation.isj[i]);
                ipc.push(inflation.ipc[i]);
                price.push(fuel.price[j]);
                i += 1;
                j += 1;
            }
        }
    }
    info!(
        "merged {} inflation months with {} fuel prices into {} rows",
        inflation.len(),
        fuel.len(),
        time.len()
    );

    let mut table = SeriesTable::new(time);
    table.set_column(COL_IPCH, ipch);
    table.set_column(COL_ISJ, isj);
    table.set_column(COL_IPC, ipc);
    table.set_column(COL_PRICE, price);
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::prelude::*;

    fn ym(y: i32, m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, 1).unwrap()
    }

    fn inflation() -> InflationSeries {
        InflationSeries {
            time: vec![ym(2024, 1), ym(2024, 2)],
            ipch: vec![118.2, 118.5],
            isj: vec![120.1, 120.4],
            ipc: vec![117.5, 117.8],
        }
    }

    #[test]
    fn keeps_only_common_dates() {
        let fuel = FuelPrices {
            time: vec![ym(2024, 1), ym(2024, 3)],
            price: vec![1.85, 1.90],
        };
        let m = merge(&fuel, &inflation());
        assert_eq!(m.time, vec![ym(2024, 1)]);
        assert_eq!(m.column(COL_IPCH), Some(&[118.2][..]));
        assert_eq!(m.column(COL_ISJ), Some(&[120.1][..]));
        assert_eq!(m.column(COL_IPC), Some(&[117.5][..]));
        assert_eq!(m.column(COL_PRICE), Some(&[1.85][..]));
    }

    #[test]
    fn row_iff_date_in_both() {
        let fuel = FuelPrices {
            time: vec![ym(2023, 11), ym(2024, 2), ym(2024, 5), ym(2024, 6)],
            price: vec![1.7, 1.8, 1.9, 2.0],
        };
        let inf = InflationSeries {
            time: vec![ym(2023, 12), ym(2024, 2), ym(2024, 3), ym(2024, 6)],
            ipch: vec![1., 2., 3., 4.],
            isj: vec![1., 2., 3., 4.],
            ipc: vec![1., 2., 3., 4.],
        };
        let m = merge(&fuel, &inf);
        assert!(m.len() <= fuel.len().min(inf.len()));
        for d in fuel.time.iter().chain(inf.time.iter()) {
            let in_both = fuel.time.contains(d) && inf.time.contains(d);
            assert_eq!(m.time.contains(d), in_both, "date {}", d);
        }
        assert_eq!(m.column(COL_PRICE), Some(&[1.8, 2.0][..]));
        assert!(m.is_ordered());
    }

    #[test]
    fn day_must_match_exactly() {
        let fuel = FuelPrices {
            time: vec![NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()],
            price: vec![1.85],
        };
        assert!(merge(&fuel, &inflation()).is_empty());
    }

    #[test]
    fn empty_input_gives_empty_table_with_columns() {
        let m = merge(&FuelPrices::default(), &inflation());
        assert!(m.is_empty());
        assert_eq!(m.column_names(), vec![COL_IPCH, COL_ISJ, COL_IPC, COL_PRICE]);
    }
}
