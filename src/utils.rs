use chrono::prelude::*;

/// If longer than two years, keep only the year;
/// if not, but longer than three months, add the month.
/// Otherwise keep the full date.
pub fn suitable_xfmt(d: chrono::Duration) -> &'static str {
    let xfmt = if d > chrono::Duration::days(2 * 366) {
        "%Y"
    } else if d > chrono::Duration::days(92) {
        "%Y-%m"
    } else {
        "%Y-%m-%d"
    };
    return xfmt;
}

/// Parse the date forms found in the fuel price exports.
/// `YYYY-MM` is read as the first day of the month, the same key the scraper produces.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d);
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%d/%m/%Y") {
        return Some(d);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.date());
    }
    parse_year_month(s)
}

/// Parse `YYYY-MM` to the first day of that month.
pub fn parse_year_month(s: &str) -> Option<NaiveDate> {
    let (y, m) = s.trim().split_once('-')?;
    if y.len() != 4 || m.len() != 2 {
        return None;
    }
    NaiveDate::from_ymd_opt(y.parse().ok()?, m.parse().ok()?, 1)
}

/// Parse a decimal, rejecting NaN and infinities.
pub fn parse_finite(s: &str) -> Option<f64> {
    match s.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Some(v),
        _ => None,
    }
}

pub fn min_and_max<'a, I, T>(mut s: I) -> Option<(T, T)>
where
    I: Iterator<Item = &'a T>,
    T: 'a + std::cmp::PartialOrd + Clone,
{
    let (mut min, mut max) = match s.next() {
        Some(v) => (v, v),
        None => return None,
    };
    for es in s {
        if es > max {
            max = es
        } else if es < min {
            min = es
        }
    }
    Some((min.clone(), max.clone()))
}

/// Widen a value range by a tenth of its span on each side,
/// by one unit when the span is zero.
pub fn padded_range(min: f64, max: f64) -> (f64, f64) {
    let span = (max - min) / 10f64;
    let pad = if span > 0. { span } else { 1. };
    (min - pad, max + pad)
}

/// Text of a value in the printed table and in the export:
/// shortest round-trip digits, with a trailing `.0` for whole numbers.
pub fn format_value(v: f64) -> String {
    if v.is_finite() && v.fract() == 0. && v.abs() < 1e15 {
        format!("{:.1}", v)
    } else {
        v.to_string()
    }
}

/// The last `n` entries of an ascending list of years.
pub fn last_n_years(years: &[i32], n: usize) -> Vec<i32> {
    years[years.len().saturating_sub(n)..].to_vec()
}
