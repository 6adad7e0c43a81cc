use super::{SeriesTable, COL_IPC, COL_IPCH, COL_ISJ, USER_AGENT};
use crate::error::DashboardError;
use crate::utils::{parse_finite, parse_year_month};
use chrono::prelude::*;
use log::{debug, info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Node};
use std::time::Duration;

const MAX_ATTEMPTS: u32 = 3;
const INITIAL_BACKOFF_MS: u64 = 500;
/// Index levels and yearly rates are far below this; larger values mean the columns moved.
const PLAUSIBLE_LIMIT: f64 = 1000.;

static ROW_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d{4}-\d{2})\s+([\d\.\-]+)\s+([\d\.\-]+)\s+([\d\.\-]+)").unwrap()
});

/// Where the inflation page comes from.
pub trait PageSource {
    fn fetch(&self, url: &str) -> Result<String, DashboardError>;
}

/// Blocking HTTP source with a browser-like user agent.
/// Transport errors and 5xx responses are retried with exponential backoff,
/// other non 2xx statuses fail at once.
pub struct HttpSource {
    client: reqwest::blocking::Client,
    max_attempts: u32,
    initial_backoff: Duration,
}

enum Attempt {
    Retry(String),
    GiveUp(String),
}

impl HttpSource {
    pub fn new(timeout: Duration) -> Result<HttpSource, DashboardError> {
        HttpSource::with_retry(timeout, MAX_ATTEMPTS, Duration::from_millis(INITIAL_BACKOFF_MS))
    }

    /// At most `max_attempts` requests per fetch, waiting `initial_backoff` after the first
    /// failure and twice as long after each following one.
    pub fn with_retry(
        timeout: Duration,
        max_attempts: u32,
        initial_backoff: Duration,
    ) -> Result<HttpSource, DashboardError> {
        let client = client_builder(timeout)
            .build()
            .map_err(|e| DashboardError::Fetch {
                url: String::from("(client setup)"),
                reason: e.to_string(),
            })?;
        Ok(HttpSource {
            client,
            max_attempts: max_attempts.max(1),
            initial_backoff,
        })
    }

    fn get_once(&self, url: &str) -> Result<String, Attempt> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| Attempt::Retry(e.to_string()))?;
        let status = response.status();
        if status.is_server_error() {
            return Err(Attempt::Retry(format!("HTTP {}", status)));
        }
        if !status.is_success() {
            return Err(Attempt::GiveUp(format!("HTTP {}", status)));
        }
        response.text().map_err(|e| Attempt::Retry(e.to_string()))
    }
}

fn client_builder(timeout: Duration) -> reqwest::blocking::ClientBuilder {
    reqwest::blocking::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
}

impl PageSource for HttpSource {
    fn fetch(&self, url: &str) -> Result<String, DashboardError> {
        let mut backoff = self.initial_backoff;
        let mut attempt = 1;
        loop {
            info!("GET {} (attempt {}/{})", url, attempt, self.max_attempts);
            let reason = match self.get_once(url) {
                Ok(body) => return Ok(body),
                Err(Attempt::GiveUp(reason)) => {
                    return Err(DashboardError::Fetch {
                        url: url.to_owned(),
                        reason,
                    })
                }
                Err(Attempt::Retry(reason)) => reason,
            };
            if attempt >= self.max_attempts {
                return Err(DashboardError::Fetch {
                    url: url.to_owned(),
                    reason,
                });
            }
            warn!("GET {} failed: {}, retrying in {:?}", url, reason, backoff);
            std::thread::sleep(backoff);
            backoff *= 2;
            attempt += 1;
        }
    }
}

/// One textual match, before any number parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawRow<'a> {
    pub month: &'a str,
    pub ipch: &'a str,
    pub isj: &'a str,
    pub ipc: &'a str,
}

/// The monthly inflation indices scraped from the INSEE page.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InflationSeries {
    pub time: Vec<NaiveDate>,
    pub ipch: Vec<f64>,
    pub isj: Vec<f64>,
    pub ipc: Vec<f64>,
}

impl InflationSeries {
    pub fn new(capacity: usize) -> InflationSeries {
        InflationSeries {
            time: Vec::with_capacity(capacity),
            ipch: Vec::with_capacity(capacity),
            isj: Vec::with_capacity(capacity),
            ipc: Vec::with_capacity(capacity),
        }
    }

    /// Fetch the page once and scrape it.
    pub fn fetch<S>(source: &S, url: &str) -> Result<InflationSeries, DashboardError>
    where
        S: PageSource + ?Sized,
    {
        let html = source.fetch(url)?;
        InflationSeries::from_html(&html, url)
    }

    /// Scrape the series out of an html document.
    /// Rows with a number that does not parse, or that fails the plausibility check, are dropped.
    /// The output is sorted by month; a month seen twice keeps its first occurrence in the page.
    /// `url` only labels the error when nothing usable is found.
    pub fn from_html(html: &str, url: &str) -> Result<InflationSeries, DashboardError> {
        let text = flatten_html(html);
        let raw = extract_rows(&text);
        let matched = raw.len();
        let mut rows: Vec<(NaiveDate, f64, f64, f64)> = Vec::with_capacity(matched);
        for r in raw.iter() {
            match parse_raw_row(r) {
                Ok(row) => rows.push(row),
                Err(e) => debug!("dropping scraped row {:?}: {}", r, e),
            }
        }
        if rows.is_empty() {
            warn!("{} matches in {}, none usable", matched, url);
            return Err(DashboardError::EmptyResult {
                url: url.to_owned(),
            });
        }

        rows.sort_by_key(|r| r.0);
        let before = rows.len();
        rows.dedup_by_key(|r| r.0);
        if rows.len() < before {
            warn!(
                "{} months listed more than once in {}, kept the first of each",
                before - rows.len(),
                url
            );
        }

        let mut series = InflationSeries::new(rows.len());
        for (d, ipch, isj, ipc) in rows {
            series.time.push(d);
            series.ipch.push(ipch);
            series.isj.push(isj);
            series.ipc.push(ipc);
        }
        info!(
            "scraped {} months from {} ({} matches)",
            series.len(),
            url,
            matched
        );
        Ok(series)
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    pub fn to_table(&self) -> SeriesTable {
        let mut table = SeriesTable::new(self.time.clone());
        table.set_column(COL_IPCH, self.ipch.clone());
        table.set_column(COL_ISJ, self.isj.clone());
        table.set_column(COL_IPC, self.ipc.clone());
        table
    }
}

/// Phrasing tags whose text belongs to the surrounding word, as in `118<span>.2</span>`.
const INLINE_TAGS: [&str; 10] = ["a", "abbr", "b", "em", "font", "i", "small", "span", "strong", "u"];

/// Strip the markup and keep the text.
/// Every other element starts a new line, so adjacent table cells stay separate tokens
/// while a number split by inline markup is glued back together.
/// Script and style bodies are skipped.
pub fn flatten_html(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut text = String::with_capacity(html.len() / 2);
    for node in document.tree.root().descendants() {
        match node.value() {
            Node::Element(e) if !INLINE_TAGS.contains(&e.name()) => text.push('\n'),
            Node::Text(t) => {
                let in_code = node
                    .parent()
                    .and_then(|p| p.value().as_element().map(|e| e.name()))
                    .map_or(false, |name| name == "script" || name == "style");
                if !in_code {
                    text.push_str(t);
                }
            }
            _ => {}
        }
    }
    text
}

/// Find every `YYYY-MM` followed by three numeric tokens, in text order.
/// The tokens are taken positionally as IPCH, ISJ and IPC, the column order of the INSEE table;
/// if the page reorders its columns this is the only place to change.
pub fn extract_rows(text: &str) -> Vec<RawRow<'_>> {
    ROW_PATTERN
        .captures_iter(text)
        .filter_map(|c| {
            Some(RawRow {
                month: c.get(1)?.as_str(),
                ipch: c.get(2)?.as_str(),
                isj: c.get(3)?.as_str(),
                ipc: c.get(4)?.as_str(),
            })
        })
        .collect()
}

fn parse_raw_row(r: &RawRow) -> Result<(NaiveDate, f64, f64, f64), DashboardError> {
    let d = parse_year_month(r.month).ok_or_else(|| DashboardError::parse("month", r.month))?;
    let ipch = parse_plausible(COL_IPCH, r.ipch)?;
    let isj = parse_plausible(COL_ISJ, r.isj)?;
    let ipc = parse_plausible(COL_IPC, r.ipc)?;
    Ok((d, ipch, isj, ipc))
}

fn parse_plausible(field: &'static str, s: &str) -> Result<f64, DashboardError> {
    parse_finite(s)
        .filter(|v| v.abs() < PLAUSIBLE_LIMIT)
        .ok_or_else(|| DashboardError::parse(field, s))
}
