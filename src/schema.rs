use chrono::{NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

/// One line of the source CSV, exactly as parsed from text. Field names map
/// onto the fixed dataset header; every value stays a string until enrichment
/// decides how (and whether) it converts.
#[derive(Debug, Clone, Deserialize)]
pub struct RawRecord {
    #[serde(rename = "Invoice ID")]
    pub invoice_id: String,
    #[serde(rename = "Branch")]
    pub branch: String,
    #[serde(rename = "City")]
    pub city: String,
    #[serde(rename = "Customer type")]
    pub customer_type: String,
    #[serde(rename = "Gender")]
    pub gender: String,
    #[serde(rename = "Product line")]
    pub product_line: String,
    #[serde(rename = "Unit price")]
    pub unit_price: String,
    #[serde(rename = "Quantity")]
    pub quantity: String,
    #[serde(rename = "Tax 5%")]
    pub tax: String,
    #[serde(rename = "Total")]
    pub total: String,
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Time")]
    pub time: String,
    #[serde(rename = "Payment")]
    pub payment: String,
    #[serde(rename = "cogs")]
    pub cogs: String,
    #[serde(rename = "gross margin percentage")]
    pub gross_margin_pct: String,
    #[serde(rename = "gross income")]
    pub gross_income: String,
    #[serde(rename = "Rating")]
    pub rating: String,
}

/// Time-of-day bucket. Evening wraps across midnight: it covers
/// [17:00, 24:00) and [00:00, 05:00).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Evening,
}

impl TimeOfDay {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeOfDay::Morning => "Morning",
            TimeOfDay::Afternoon => "Afternoon",
            TimeOfDay::Evening => "Evening",
        }
    }
}

/// Categorical grouping columns exposed to the aggregation catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Dimension {
    Branch,
    City,
    CustomerType,
    Gender,
    ProductLine,
    Payment,
}

impl Dimension {
    pub fn label(&self) -> &'static str {
        match self {
            Dimension::Branch => "Branch",
            Dimension::City => "City",
            Dimension::CustomerType => "Customer type",
            Dimension::Gender => "Gender",
            Dimension::ProductLine => "Product line",
            Dimension::Payment => "Payment",
        }
    }

    pub fn value<'a>(&self, t: &'a Transaction) -> &'a str {
        match self {
            Dimension::Branch => &t.branch,
            Dimension::City => &t.city,
            Dimension::CustomerType => &t.customer_type,
            Dimension::Gender => &t.gender,
            Dimension::ProductLine => &t.product_line,
            Dimension::Payment => &t.payment,
        }
    }
}

/// An enriched transaction row. Measures that failed numeric conversion and
/// temporal fields that failed the fixed-format parse carry `None`; the row
/// itself is always kept.
#[derive(Debug, Clone)]
pub struct Transaction {
    pub invoice_id: String,
    pub branch: String,
    pub city: String,
    pub customer_type: String,
    pub gender: String,
    pub product_line: String,
    pub payment: String,

    pub unit_price: Option<f64>,
    pub quantity: Option<f64>,
    pub tax: Option<f64>,
    pub total: Option<f64>,
    pub cogs: Option<f64>,
    pub gross_margin_pct: Option<f64>,
    pub gross_income: Option<f64>,
    pub rating: Option<f64>,

    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,

    // Derived at enrichment, immutable afterwards.
    pub hour: Option<u32>,
    pub weekday: Option<Weekday>,
    pub month_name: Option<&'static str>,
    /// Monday = 0 .. Sunday = 6.
    pub day_of_week: Option<u32>,
    pub is_weekend: Option<bool>,
    pub time_of_day: Option<TimeOfDay>,
}

/// The fixed numeric measure columns, in dataset order. Shared by the
/// correlation matrix, the summary statistics and the data-quality audit.
pub const MEASURE_COLUMNS: [(&str, fn(&Transaction) -> Option<f64>); 8] = [
    ("Unit price", |t| t.unit_price),
    ("Quantity", |t| t.quantity),
    ("Tax 5%", |t| t.tax),
    ("Total", |t| t.total),
    ("cogs", |t| t.cogs),
    ("gross margin percentage", |t| t.gross_margin_pct),
    ("gross income", |t| t.gross_income),
    ("Rating", |t| t.rating),
];

/// The fixed header of the source file, in column order.
pub const SOURCE_COLUMNS: [&str; 17] = [
    "Invoice ID",
    "Branch",
    "City",
    "Customer type",
    "Gender",
    "Product line",
    "Unit price",
    "Quantity",
    "Tax 5%",
    "Total",
    "Date",
    "Time",
    "Payment",
    "cogs",
    "gross margin percentage",
    "gross income",
    "Rating",
];

/// Columns appended by enrichment, in the order they appear in exports.
pub const DERIVED_COLUMNS: [&str; 6] = [
    "hour",
    "day_name",
    "month_name",
    "day_of_week",
    "is_weekend",
    "time_of_day",
];

pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

pub fn month_name(month: u32) -> Option<&'static str> {
    Some(match month {
        1 => "January",
        2 => "February",
        3 => "March",
        4 => "April",
        5 => "May",
        6 => "June",
        7 => "July",
        8 => "August",
        9 => "September",
        10 => "October",
        11 => "November",
        12 => "December",
        _ => return None,
    })
}
