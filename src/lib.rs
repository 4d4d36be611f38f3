//! # Salescope
//!
//! The analytics core of a retail sales dashboard: loads a supermarket
//! transaction CSV, derives calendar and time-of-day features, filters by
//! date range / branch / city, and answers a fixed catalog of aggregation
//! queries that feed the dashboard views and the exported reports.
//!
//! ## Core Concepts
//!
//! - **Enriched table** ([`SalesTable`]): the base dataset plus derived
//!   calendar/time-bucket columns, built once and never mutated.
//! - **Filtered view** ([`filter::View`]): a borrowed row subset matching the
//!   active selection; recomputed per interaction, never persisted.
//! - **Aggregations** ([`aggregate`]): read-only group-by/summary queries,
//!   all of which treat an empty view as "no data" rather than an error.
//! - **Reports** ([`report`]): a multi-section PDF or a flat CSV of the
//!   filtered rows, returned as in-memory byte buffers.
//!
//! ## Example
//!
//! ```rust,ignore
//! use salescope::*;
//!
//! let table = SalesTable::load_csv("supermarket_sales.csv")?;
//! let mut selection = FilterSelection::select_all(&table);
//! selection.branches.retain(|b| b == "A");
//!
//! let view = table.filter(&selection);
//! let revenue = aggregate::revenue_by_category(&view, Dimension::ProductLine);
//! let pdf = report::render_pdf(&view, &selection)?;
//! ```

pub mod aggregate;
pub mod enrich;
pub mod error;
pub mod filter;
pub mod ingest;
pub mod insights;
pub mod report;
pub mod schema;
pub mod stats;

pub use enrich::{enrich, time_bucket, SalesTable, DATE_FORMAT, TIME_FORMAT};
pub use error::{Result, SalescopeError};
pub use filter::{FilterSelection, View};
pub use ingest::read_raw_records;
pub use insights::{narrative_insights, InsightInputs};
pub use report::{export_csv, export_filename, render_pdf, report_filename};
pub use schema::{Dimension, RawRecord, TimeOfDay, Transaction, MEASURE_COLUMNS};
