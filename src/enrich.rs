use crate::error::Result;
use crate::ingest::read_raw_records;
use crate::schema::{month_name, RawRecord, TimeOfDay, Transaction};
use chrono::{Datelike, NaiveDate, NaiveTime, Timelike};
use log::{debug, info};
use std::collections::BTreeSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Calendar format of the `Date` column.
pub const DATE_FORMAT: &str = "%m/%d/%Y";
/// 24-hour clock format of the `Time` column.
pub const TIME_FORMAT: &str = "%H:%M:%S";

fn parse_measure(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Assigns a clock time to its time-of-day bucket. The boundaries sit on
/// whole hours: Morning [05:00, 12:00), Afternoon [12:00, 17:00), Evening
/// for everything else including the stretch past midnight.
pub fn time_bucket(time: NaiveTime) -> TimeOfDay {
    match time.hour() {
        5..=11 => TimeOfDay::Morning,
        12..=16 => TimeOfDay::Afternoon,
        _ => TimeOfDay::Evening,
    }
}

/// Converts a raw row into an enriched transaction. Pure: identical input
/// always yields the identical row, and the source record is untouched.
pub fn enrich(raw: &RawRecord) -> Transaction {
    let date = NaiveDate::parse_from_str(raw.date.trim(), DATE_FORMAT).ok();
    let time = NaiveTime::parse_from_str(raw.time.trim(), TIME_FORMAT).ok();

    let weekday = date.map(|d| d.weekday());
    let day_of_week = weekday.map(|w| w.num_days_from_monday());

    Transaction {
        invoice_id: raw.invoice_id.trim().to_string(),
        branch: raw.branch.trim().to_string(),
        city: raw.city.trim().to_string(),
        customer_type: raw.customer_type.trim().to_string(),
        gender: raw.gender.trim().to_string(),
        product_line: raw.product_line.trim().to_string(),
        payment: raw.payment.trim().to_string(),

        unit_price: parse_measure(&raw.unit_price),
        quantity: parse_measure(&raw.quantity),
        tax: parse_measure(&raw.tax),
        total: parse_measure(&raw.total),
        cogs: parse_measure(&raw.cogs),
        gross_margin_pct: parse_measure(&raw.gross_margin_pct),
        gross_income: parse_measure(&raw.gross_income),
        rating: parse_measure(&raw.rating),

        date,
        time,
        hour: time.map(|t| t.hour()),
        weekday,
        month_name: date.and_then(|d| month_name(d.month())),
        day_of_week,
        is_weekend: day_of_week.map(|i| i >= 5),
        time_of_day: time.map(time_bucket),
    }
}

/// The enriched base table. Built once per process, owned by the host, and
/// handed out by shared reference; filtering always produces a new borrowed
/// view and never touches the rows stored here.
#[derive(Debug, Clone)]
pub struct SalesTable {
    rows: Vec<Transaction>,
}

impl SalesTable {
    pub fn from_raw(records: &[RawRecord]) -> Self {
        let rows = records.iter().map(enrich).collect::<Vec<_>>();
        debug!("Enriched {} transactions", rows.len());
        Self { rows }
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let records = read_raw_records(reader)?;
        Ok(Self::from_raw(&records))
    }

    pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let table = Self::from_reader(file)?;
        info!(
            "Loaded {} transactions from {}",
            table.len(),
            path.display()
        );
        Ok(table)
    }

    pub fn rows(&self) -> &[Transaction] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Distinct branch codes, in sorted order. The presentation layer uses
    /// this as the default "everything selected" branch set.
    pub fn distinct_branches(&self) -> BTreeSet<String> {
        self.rows.iter().map(|t| t.branch.clone()).collect()
    }

    /// Distinct city names, in sorted order.
    pub fn distinct_cities(&self) -> BTreeSet<String> {
        self.rows.iter().map(|t| t.city.clone()).collect()
    }

    /// Earliest and latest transaction dates, ignoring rows whose date
    /// failed to parse. `None` when no row carries a date.
    pub fn date_span(&self) -> Option<(NaiveDate, NaiveDate)> {
        let mut dates = self.rows.iter().filter_map(|t| t.date);
        let first = dates.next()?;
        let (min, max) = dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d)));
        Some((min, max))
    }
}
