//! The fixed catalog of read-only queries the dashboard views and the report
//! generator draw from. Every operation takes a filtered [`View`], returns a
//! typed result the presentation layer can serialize, and treats an empty
//! view as "no data" instead of dividing by zero.

use crate::enrich::SalesTable;
use crate::filter::View;
use crate::schema::{weekday_name, Dimension, Transaction, MEASURE_COLUMNS};
use crate::stats;
use chrono::{NaiveDate, Weekday};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// p-value cutoff below which a comparison is labelled significant. Fixed,
/// not configuration.
pub const SIGNIFICANCE_THRESHOLD: f64 = 0.05;

const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Non-missing totals of the view, in row order.
fn totals(view: &View) -> Vec<f64> {
    view.rows().iter().filter_map(|t| t.total).collect()
}

/// Headline scalar metrics.
#[derive(Debug, Clone, Serialize)]
pub struct Kpis {
    pub total_revenue: f64,
    pub avg_transaction: Option<f64>,
    pub transactions: usize,
    pub unique_invoices: usize,
}

pub fn kpis(view: &View) -> Kpis {
    let totals = totals(view);
    let invoices: BTreeSet<&str> = view.rows().iter().map(|t| t.invoice_id.as_str()).collect();
    Kpis {
        total_revenue: totals.iter().sum(),
        avg_transaction: stats::mean(&totals),
        transactions: view.len(),
        unique_invoices: invoices.len(),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct KpisWithBaseline {
    pub current: Kpis,
    /// Each delta is the filtered metric relative to the unfiltered table,
    /// as a signed percentage; `None` when the baseline is zero or missing.
    pub revenue_vs_total_pct: Option<f64>,
    pub avg_transaction_vs_total_pct: Option<f64>,
    pub transactions_vs_total_pct: Option<f64>,
    pub unique_invoices_vs_total_pct: Option<f64>,
}

fn vs_baseline(current: f64, baseline: f64) -> Option<f64> {
    if baseline != 0.0 {
        Some((current / baseline - 1.0) * 100.0)
    } else {
        None
    }
}

/// Headline metrics plus their "% vs Total" deltas against the unfiltered
/// base table, for the overview cards.
pub fn kpis_with_baseline(view: &View, table: &SalesTable) -> KpisWithBaseline {
    let current = kpis(view);

    let base_totals: Vec<f64> = table.rows().iter().filter_map(|t| t.total).collect();
    let base_revenue: f64 = base_totals.iter().sum();
    let base_avg = stats::mean(&base_totals);
    let base_invoices: BTreeSet<&str> =
        table.rows().iter().map(|t| t.invoice_id.as_str()).collect();

    KpisWithBaseline {
        revenue_vs_total_pct: vs_baseline(current.total_revenue, base_revenue),
        avg_transaction_vs_total_pct: match (current.avg_transaction, base_avg) {
            (Some(cur), Some(base)) => vs_baseline(cur, base),
            _ => None,
        },
        transactions_vs_total_pct: vs_baseline(current.transactions as f64, table.len() as f64),
        unique_invoices_vs_total_pct: vs_baseline(
            current.unique_invoices as f64,
            base_invoices.len() as f64,
        ),
        current,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryRevenue {
    pub category: String,
    pub revenue: f64,
    pub share_pct: f64,
}

/// Revenue summed per category of `dim`, descending, with each category's
/// share of the grouped total. Shares across the full partition sum to 100
/// (within float tolerance) whenever the grouped total is non-zero.
pub fn revenue_by_category(view: &View, dim: Dimension) -> Vec<CategoryRevenue> {
    let mut sums: BTreeMap<&str, f64> = BTreeMap::new();
    for t in view.rows() {
        *sums.entry(dim.value(t)).or_insert(0.0) += t.total.unwrap_or(0.0);
    }

    let grand_total: f64 = sums.values().sum();
    let mut out: Vec<CategoryRevenue> = sums
        .into_iter()
        .map(|(category, revenue)| CategoryRevenue {
            category: category.to_string(),
            revenue,
            share_pct: if grand_total != 0.0 {
                revenue / grand_total * 100.0
            } else {
                0.0
            },
        })
        .collect();
    out.sort_by(|a, b| b.revenue.total_cmp(&a.revenue));
    out
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: usize,
    pub share_pct: f64,
}

/// Row counts per category of `dim`, descending by count with key order as
/// the tie-break. Source of "most popular product" and "most common payment".
pub fn count_by_category(view: &View, dim: Dimension) -> Vec<CategoryCount> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for t in view.rows() {
        *counts.entry(dim.value(t)).or_insert(0) += 1;
    }

    let total = view.len();
    let mut out: Vec<CategoryCount> = counts
        .into_iter()
        .map(|(category, count)| CategoryCount {
            category: category.to_string(),
            count,
            share_pct: count as f64 / total as f64 * 100.0,
        })
        .collect();
    out.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.category.cmp(&b.category)));
    out
}

#[derive(Debug, Clone, Serialize)]
pub struct PeakDay {
    pub day: String,
    pub revenue: f64,
}

/// Revenue summed per weekday name, descending, with each day's share of the
/// weekday-partition total. Rows without a parseable date are skipped. The
/// underlying grouping is keyed by day name, so revenue ties keep the
/// alphabetically first day ahead.
pub fn revenue_by_weekday(view: &View) -> Vec<CategoryRevenue> {
    let mut sums: BTreeMap<&'static str, f64> = BTreeMap::new();
    for t in view.rows() {
        if let Some(day) = t.weekday {
            *sums.entry(weekday_name(day)).or_insert(0.0) += t.total.unwrap_or(0.0);
        }
    }

    let grand_total: f64 = sums.values().sum();
    let mut out: Vec<CategoryRevenue> = sums
        .into_iter()
        .map(|(day, revenue)| CategoryRevenue {
            category: day.to_string(),
            revenue,
            share_pct: if grand_total != 0.0 {
                revenue / grand_total * 100.0
            } else {
                0.0
            },
        })
        .collect();
    // Stable sort: equal revenues stay in alphabetical key order.
    out.sort_by(|a, b| b.revenue.total_cmp(&a.revenue));
    out
}

/// Weekday with the highest summed revenue; `None` when no row carries a
/// parseable date.
pub fn peak_day(view: &View) -> Option<PeakDay> {
    revenue_by_weekday(view).into_iter().next().map(|c| PeakDay {
        day: c.category,
        revenue: c.revenue,
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct HourRevenue {
    pub hour: u32,
    pub revenue: f64,
}

/// Revenue summed per hour of day, descending; revenue ties keep the earlier
/// hour ahead. Rows without a parseable time are skipped.
pub fn revenue_by_hour(view: &View) -> Vec<HourRevenue> {
    let mut sums: BTreeMap<u32, f64> = BTreeMap::new();
    for t in view.rows() {
        if let Some(hour) = t.hour {
            *sums.entry(hour).or_insert(0.0) += t.total.unwrap_or(0.0);
        }
    }

    let mut out: Vec<HourRevenue> = sums
        .into_iter()
        .map(|(hour, revenue)| HourRevenue { hour, revenue })
        .collect();
    out.sort_by(|a, b| b.revenue.total_cmp(&a.revenue));
    out
}

/// Hour of day with the highest summed revenue; `None` when no row carries
/// a parseable time.
pub fn peak_hour(view: &View) -> Option<HourRevenue> {
    revenue_by_hour(view).into_iter().next()
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupPerformance {
    pub key: String,
    pub total_revenue: f64,
    pub avg_transaction: Option<f64>,
    pub transactions: usize,
}

/// Per-group sum, mean and count of revenue, rounded to two decimals and
/// sorted descending by sum. The count covers non-missing totals only, so
/// sum, mean and count always agree. Groups with no rows in the view simply
/// do not appear; they are never rendered as zero.
pub fn performance_table(view: &View, dim: Dimension) -> Vec<GroupPerformance> {
    let mut groups: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for t in view.rows() {
        let values = groups.entry(dim.value(t)).or_default();
        if let Some(total) = t.total {
            values.push(total);
        }
    }

    let mut out: Vec<GroupPerformance> = groups
        .into_iter()
        .map(|(key, values)| GroupPerformance {
            total_revenue: round2(values.iter().sum()),
            avg_transaction: stats::mean(&values).map(round2),
            transactions: values.len(),
            key: key.to_string(),
        })
        .collect();
    out.sort_by(|a, b| b.total_revenue.total_cmp(&a.total_revenue));
    out
}

#[derive(Debug, Clone, Serialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<&'static str>,
    /// `values[i][j]` is the Pearson coefficient between columns i and j.
    /// Zero-variance columns yield NaN entries, passed through as-is.
    pub values: Vec<Vec<f64>>,
}

/// Pearson correlation across the fixed measure columns, using pairwise
/// complete observations per column pair.
pub fn correlation_matrix(view: &View) -> CorrelationMatrix {
    let columns: Vec<&'static str> = MEASURE_COLUMNS.iter().map(|(name, _)| *name).collect();
    let n = MEASURE_COLUMNS.len();
    let mut values = vec![vec![f64::NAN; n]; n];

    for i in 0..n {
        for j in 0..n {
            let (_, get_i) = MEASURE_COLUMNS[i];
            let (_, get_j) = MEASURE_COLUMNS[j];
            let mut xs = Vec::new();
            let mut ys = Vec::new();
            for t in view.rows() {
                if let (Some(x), Some(y)) = (get_i(t), get_j(t)) {
                    xs.push(x);
                    ys.push(y);
                }
            }
            values[i][j] = stats::pearson(&xs, &ys);
        }
    }

    CorrelationMatrix { columns, values }
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupComparison {
    pub dimension: Dimension,
    pub group_a: String,
    pub group_b: String,
    pub mean_a: f64,
    pub mean_b: f64,
    pub count_a: usize,
    pub count_b: usize,
    pub t_statistic: f64,
    pub p_value: f64,
    pub significant: bool,
}

/// Pooled-variance two-sample t-test on revenue between the `a` and `b`
/// categories of `dim`. `None` when either subgroup has no revenue values:
/// the comparison is skipped, not reported as an error.
pub fn compare_groups(view: &View, dim: Dimension, a: &str, b: &str) -> Option<GroupComparison> {
    let side = |name: &str| -> Vec<f64> {
        view.rows()
            .iter()
            .filter(|t| dim.value(t) == name)
            .filter_map(|t| t.total)
            .collect()
    };

    let values_a = side(a);
    let values_b = side(b);
    let test = stats::pooled_t_test(&values_a, &values_b)?;

    Some(GroupComparison {
        dimension: dim,
        group_a: a.to_string(),
        group_b: b.to_string(),
        mean_a: values_a.iter().sum::<f64>() / values_a.len() as f64,
        mean_b: values_b.iter().sum::<f64>() / values_b.len() as f64,
        count_a: values_a.len(),
        count_b: values_b.len(),
        t_statistic: test.t_statistic,
        p_value: test.p_value,
        significant: test.p_value < SIGNIFICANCE_THRESHOLD,
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct PivotRow {
    pub day: &'static str,
    pub revenue: Vec<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TemporalPivot {
    /// Hours present in the view, ascending; one column per hour.
    pub hours: Vec<u32>,
    /// Always exactly seven rows, Monday through Sunday, missing cells zero.
    pub rows: Vec<PivotRow>,
}

/// Revenue summed over the weekday x hour cross.
pub fn temporal_pivot(view: &View) -> TemporalPivot {
    let mut cells: BTreeMap<(u32, u32), f64> = BTreeMap::new();
    let mut hour_set: BTreeSet<u32> = BTreeSet::new();
    for t in view.rows() {
        if let (Some(day), Some(hour)) = (t.weekday, t.hour) {
            hour_set.insert(hour);
            *cells
                .entry((day.num_days_from_monday(), hour))
                .or_insert(0.0) += t.total.unwrap_or(0.0);
        }
    }

    let hours: Vec<u32> = hour_set.into_iter().collect();
    let rows = WEEKDAYS
        .iter()
        .map(|&day| PivotRow {
            day: weekday_name(day),
            revenue: hours
                .iter()
                .map(|hour| {
                    cells
                        .get(&(day.num_days_from_monday(), *hour))
                        .copied()
                        .unwrap_or(0.0)
                })
                .collect(),
        })
        .collect();

    TemporalPivot { hours, rows }
}

#[derive(Debug, Clone, Serialize)]
pub struct CrosstabRow {
    pub key: String,
    pub counts: Vec<usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryCrosstab {
    pub row_dimension: Dimension,
    pub col_dimension: Dimension,
    /// Column keys, sorted ascending; one entry per distinct `col_dim` value.
    pub columns: Vec<String>,
    /// Row keys sorted ascending, missing cells zero.
    pub rows: Vec<CrosstabRow>,
}

/// Transaction counts over the cross of two categorical columns, e.g. gender
/// by product line for the customer-preference view. Both axes cover every
/// value present in the view, in sorted key order, with absent combinations
/// filled as zero.
pub fn category_crosstab(view: &View, row_dim: Dimension, col_dim: Dimension) -> CategoryCrosstab {
    let mut cells: BTreeMap<(&str, &str), usize> = BTreeMap::new();
    let mut row_keys: BTreeSet<&str> = BTreeSet::new();
    let mut col_keys: BTreeSet<&str> = BTreeSet::new();
    for t in view.rows() {
        let row_key = row_dim.value(t);
        let col_key = col_dim.value(t);
        row_keys.insert(row_key);
        col_keys.insert(col_key);
        *cells.entry((row_key, col_key)).or_insert(0) += 1;
    }

    let rows = row_keys
        .iter()
        .map(|row_key| CrosstabRow {
            key: row_key.to_string(),
            counts: col_keys
                .iter()
                .map(|col_key| cells.get(&(*row_key, *col_key)).copied().unwrap_or(0))
                .collect(),
        })
        .collect();

    CategoryCrosstab {
        row_dimension: row_dim,
        col_dimension: col_dim,
        columns: col_keys.iter().map(|k| k.to_string()).collect(),
        rows,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WeekendSplit {
    pub weekend_avg: Option<f64>,
    pub weekday_avg: Option<f64>,
}

/// Mean transaction value on weekends (Saturday/Sunday, fixed) versus
/// weekdays.
pub fn weekend_split(view: &View) -> WeekendSplit {
    let mut weekend = Vec::new();
    let mut weekday = Vec::new();
    for t in view.rows() {
        if let (Some(is_weekend), Some(total)) = (t.is_weekend, t.total) {
            if is_weekend {
                weekend.push(total);
            } else {
                weekday.push(total);
            }
        }
    }
    WeekendSplit {
        weekend_avg: stats::mean(&weekend),
        weekday_avg: stats::mean(&weekday),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DailyRevenue {
    pub date: NaiveDate,
    pub revenue: f64,
}

/// Revenue per calendar day, ascending by date. Feeds the trend chart.
pub fn daily_revenue(view: &View) -> Vec<DailyRevenue> {
    let mut sums: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for t in view.rows() {
        if let Some(date) = t.date {
            *sums.entry(date).or_insert(0.0) += t.total.unwrap_or(0.0);
        }
    }
    sums.into_iter()
        .map(|(date, revenue)| DailyRevenue { date, revenue })
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct ColumnSummary {
    pub column: &'static str,
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub q1: Option<f64>,
    pub median: Option<f64>,
    pub q3: Option<f64>,
    pub max: Option<f64>,
}

/// Descriptive statistics per numeric measure column, missing values
/// skipped. An all-missing column reports count 0 and `None` everywhere.
pub fn summary_statistics(view: &View) -> Vec<ColumnSummary> {
    MEASURE_COLUMNS
        .iter()
        .map(|(column, get)| {
            let mut values: Vec<f64> = view.rows().iter().filter_map(|t| get(t)).collect();
            values.sort_by(f64::total_cmp);
            ColumnSummary {
                column,
                count: values.len(),
                mean: stats::mean(&values),
                std: stats::sample_std(&values),
                min: values.first().copied(),
                q1: stats::percentile(&values, 0.25),
                median: stats::percentile(&values, 0.5),
                q3: stats::percentile(&values, 0.75),
                max: values.last().copied(),
            }
        })
        .collect()
}

/// The N highest-total rows. The sort is stable, so ties keep their original
/// row order; rows with a missing total sort last.
pub fn top_transactions<'a>(view: &View<'a>, n: usize) -> Vec<&'a Transaction> {
    let mut rows: Vec<&'a Transaction> = view.rows().to_vec();
    rows.sort_by(|a, b| {
        let av = a.total.unwrap_or(f64::NEG_INFINITY);
        let bv = b.total.unwrap_or(f64::NEG_INFINITY);
        bv.total_cmp(&av)
    });
    rows.truncate(n);
    rows
}

#[derive(Debug, Clone, Serialize)]
pub struct ColumnQuality {
    pub column: &'static str,
    pub missing: usize,
    pub dtype: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct DataQualityReport {
    pub columns: Vec<ColumnQuality>,
    pub date_range: Option<(NaiveDate, NaiveDate)>,
    pub total_range: Option<(f64, f64)>,
    pub rating_range: Option<(f64, f64)>,
}

fn text_missing(view: &View, get: fn(&Transaction) -> &str) -> usize {
    view.rows().iter().filter(|t| get(t).is_empty()).count()
}

fn range_of(view: &View, get: fn(&Transaction) -> Option<f64>) -> Option<(f64, f64)> {
    let mut values = view.rows().iter().filter_map(|t| get(t));
    let first = values.next()?;
    Some(values.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))))
}

/// Per-column missing counts and inferred type labels, plus the observed
/// date/total/rating ranges.
pub fn data_quality(view: &View) -> DataQualityReport {
    let opt_missing =
        |get: fn(&Transaction) -> Option<f64>| view.rows().iter().filter(|t| get(t).is_none()).count();

    let mut columns = vec![
        ColumnQuality {
            column: "Invoice ID",
            missing: text_missing(view, |t| &t.invoice_id),
            dtype: "text",
        },
        ColumnQuality {
            column: "Branch",
            missing: text_missing(view, |t| &t.branch),
            dtype: "text",
        },
        ColumnQuality {
            column: "City",
            missing: text_missing(view, |t| &t.city),
            dtype: "text",
        },
        ColumnQuality {
            column: "Customer type",
            missing: text_missing(view, |t| &t.customer_type),
            dtype: "text",
        },
        ColumnQuality {
            column: "Gender",
            missing: text_missing(view, |t| &t.gender),
            dtype: "text",
        },
        ColumnQuality {
            column: "Product line",
            missing: text_missing(view, |t| &t.product_line),
            dtype: "text",
        },
        ColumnQuality {
            column: "Payment",
            missing: text_missing(view, |t| &t.payment),
            dtype: "text",
        },
    ];

    for (name, get) in MEASURE_COLUMNS {
        columns.push(ColumnQuality {
            column: name,
            missing: opt_missing(get),
            dtype: "numeric",
        });
    }

    columns.push(ColumnQuality {
        column: "Date",
        missing: view.rows().iter().filter(|t| t.date.is_none()).count(),
        dtype: "date",
    });
    columns.push(ColumnQuality {
        column: "Time",
        missing: view.rows().iter().filter(|t| t.time.is_none()).count(),
        dtype: "time",
    });

    // Derived columns carry a missing marker exactly when their underlying
    // date or time failed to parse; the audit reports them like any other.
    let derived_missing = |is_missing: fn(&Transaction) -> bool| {
        view.rows().iter().filter(|t| is_missing(t)).count()
    };
    for (column, missing, dtype) in [
        ("hour", derived_missing(|t| t.hour.is_none()), "numeric"),
        ("day_name", derived_missing(|t| t.weekday.is_none()), "text"),
        (
            "month_name",
            derived_missing(|t| t.month_name.is_none()),
            "text",
        ),
        (
            "day_of_week",
            derived_missing(|t| t.day_of_week.is_none()),
            "numeric",
        ),
        (
            "is_weekend",
            derived_missing(|t| t.is_weekend.is_none()),
            "boolean",
        ),
        (
            "time_of_day",
            derived_missing(|t| t.time_of_day.is_none()),
            "text",
        ),
    ] {
        columns.push(ColumnQuality {
            column,
            missing,
            dtype,
        });
    }

    DataQualityReport {
        columns,
        date_range: {
            let mut dates = view.rows().iter().filter_map(|t| t.date);
            dates.next().map(|first| {
                dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d)))
            })
        },
        total_range: range_of(view, |t| t.total),
        rating_range: range_of(view, |t| t.rating),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrich::tests::raw_record;
    use crate::enrich::SalesTable;
    use crate::filter::FilterSelection;

    /// Rows as (gender, branch, total text, date, time).
    fn table_of(rows: &[(&str, &str, &str, &str, &str)]) -> SalesTable {
        let raw: Vec<_> = rows
            .iter()
            .enumerate()
            .map(|(i, (gender, branch, total, date, time))| {
                let mut r = raw_record();
                r.invoice_id = format!("INV-{:03}", i);
                r.gender = gender.to_string();
                r.branch = branch.to_string();
                r.total = total.to_string();
                r.date = date.to_string();
                r.time = time.to_string();
                r
            })
            .collect();
        SalesTable::from_raw(&raw)
    }

    fn full_view(table: &SalesTable) -> View<'_> {
        table.filter(&FilterSelection::select_all(table))
    }

    #[test]
    fn revenue_shares_sum_to_100() {
        let table = table_of(&[
            ("Male", "A", "100", "1/7/2019", "10:00:00"),
            ("Male", "B", "250", "1/8/2019", "11:00:00"),
            ("Female", "C", "150", "1/9/2019", "12:00:00"),
        ]);
        let view = full_view(&table);
        let by_branch = revenue_by_category(&view, Dimension::Branch);
        assert_eq!(by_branch.len(), 3);
        assert_eq!(by_branch[0].category, "B");
        let share_sum: f64 = by_branch.iter().map(|c| c.share_pct).sum();
        assert!((share_sum - 100.0).abs() < 1e-9);
    }

    #[test]
    fn gender_means_scenario() {
        // 6 Male rows summing 600, 4 Female rows summing 320.
        let rows: Vec<(&str, &str, &str, &str, &str)> = vec![
            ("Male", "A", "100", "1/7/2019", "10:00:00"),
            ("Male", "A", "100", "1/7/2019", "10:00:00"),
            ("Male", "A", "100", "1/7/2019", "10:00:00"),
            ("Male", "A", "100", "1/7/2019", "10:00:00"),
            ("Male", "A", "100", "1/7/2019", "10:00:00"),
            ("Male", "A", "100", "1/7/2019", "10:00:00"),
            ("Female", "A", "80", "1/8/2019", "11:00:00"),
            ("Female", "A", "80", "1/8/2019", "11:00:00"),
            ("Female", "A", "80", "1/8/2019", "11:00:00"),
            ("Female", "A", "80", "1/8/2019", "11:00:00"),
        ];
        let table = table_of(&rows);
        let view = full_view(&table);

        let perf = performance_table(&view, Dimension::Gender);
        let male = perf.iter().find(|g| g.key == "Male").unwrap();
        let female = perf.iter().find(|g| g.key == "Female").unwrap();
        assert_eq!(male.avg_transaction, Some(100.0));
        assert_eq!(female.avg_transaction, Some(80.0));

        let cmp = compare_groups(&view, Dimension::Gender, "Male", "Female").unwrap();
        assert!((cmp.mean_a - 100.0).abs() < 1e-9);
        assert!((cmp.mean_b - 80.0).abs() < 1e-9);
        assert_eq!(cmp.count_a, 6);
        assert_eq!(cmp.count_b, 4);
    }

    #[test]
    fn comparison_with_empty_subgroup_is_skipped() {
        let table = table_of(&[("Male", "A", "100", "1/7/2019", "10:00:00")]);
        let view = full_view(&table);
        assert!(compare_groups(&view, Dimension::Gender, "Male", "Female").is_none());
    }

    #[test]
    fn empty_view_reports_no_data_everywhere() {
        let table = table_of(&[("Male", "A", "0", "1/7/2019", "10:00:00")]);
        let mut selection = FilterSelection::select_all(&table);
        selection.branches.clear();
        let view = table.filter(&selection);

        assert!(view.is_empty());
        assert!(peak_hour(&view).is_none());
        assert!(peak_day(&view).is_none());
        assert!(revenue_by_category(&view, Dimension::Branch).is_empty());
        assert!(performance_table(&view, Dimension::Branch).is_empty());
        assert!(top_transactions(&view, 10).is_empty());

        let k = kpis(&view);
        assert_eq!(k.total_revenue, 0.0);
        assert_eq!(k.avg_transaction, None);
        assert_eq!(k.transactions, 0);
    }

    #[test]
    fn pivot_always_has_seven_weekday_rows() {
        // A single Monday-morning row.
        let table = table_of(&[("Male", "A", "50", "1/7/2019", "09:30:00")]);
        let view = full_view(&table);
        let pivot = temporal_pivot(&view);

        assert_eq!(pivot.rows.len(), 7);
        let days: Vec<_> = pivot.rows.iter().map(|r| r.day).collect();
        assert_eq!(
            days,
            vec![
                "Monday",
                "Tuesday",
                "Wednesday",
                "Thursday",
                "Friday",
                "Saturday",
                "Sunday"
            ]
        );
        assert_eq!(pivot.hours, vec![9]);
        assert_eq!(pivot.rows[0].revenue, vec![50.0]);
        assert_eq!(pivot.rows[1].revenue, vec![0.0]);
    }

    #[test]
    fn branch_with_no_rows_is_omitted_not_zero() {
        let table = table_of(&[
            ("Male", "A", "100", "1/7/2019", "10:00:00"),
            ("Male", "B", "200", "3/1/2019", "10:00:00"),
        ]);
        let mut selection = FilterSelection::select_all(&table);
        selection.date_range = Some((
            NaiveDate::from_ymd_opt(2019, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2019, 1, 31).unwrap(),
        ));
        let view = table.filter(&selection);

        let perf = performance_table(&view, Dimension::Branch);
        assert_eq!(perf.len(), 1);
        assert_eq!(perf[0].key, "A");
        assert!(perf.iter().all(|g| g.key != "B"));
    }

    #[test]
    fn peak_detection_breaks_ties_by_key_order() {
        // Equal revenue at hours 9 and 15: the earlier hour wins.
        let table = table_of(&[
            ("Male", "A", "100", "1/7/2019", "15:00:00"),
            ("Male", "A", "100", "1/7/2019", "09:00:00"),
        ]);
        let view = full_view(&table);
        assert_eq!(peak_hour(&view).unwrap().hour, 9);
    }

    #[test]
    fn top_transactions_stable_on_ties() {
        let table = table_of(&[
            ("Male", "A", "100", "1/7/2019", "10:00:00"),
            ("Male", "B", "300", "1/7/2019", "10:00:00"),
            ("Male", "C", "100", "1/7/2019", "10:00:00"),
        ]);
        let view = full_view(&table);
        let top = top_transactions(&view, 3);
        assert_eq!(top[0].branch, "B");
        // The two ties keep their original relative order.
        assert_eq!(top[1].branch, "A");
        assert_eq!(top[2].branch, "C");
    }

    #[test]
    fn correlation_matrix_has_unit_diagonal() {
        let table = table_of(&[
            ("Male", "A", "100", "1/7/2019", "10:00:00"),
            ("Male", "A", "200", "1/8/2019", "11:00:00"),
            ("Male", "A", "300", "1/9/2019", "12:00:00"),
        ]);
        let view = full_view(&table);
        let matrix = correlation_matrix(&view);
        assert_eq!(matrix.columns.len(), 8);
        let total_idx = matrix.columns.iter().position(|c| *c == "Total").unwrap();
        assert!((matrix.values[total_idx][total_idx] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn correlation_passes_nan_through_for_constant_columns() {
        // Unit price is identical on every row, so its variance is zero.
        let table = table_of(&[
            ("Male", "A", "100", "1/7/2019", "10:00:00"),
            ("Male", "A", "200", "1/8/2019", "11:00:00"),
        ]);
        let view = full_view(&table);
        let matrix = correlation_matrix(&view);
        let price_idx = matrix
            .columns
            .iter()
            .position(|c| *c == "Unit price")
            .unwrap();
        let total_idx = matrix.columns.iter().position(|c| *c == "Total").unwrap();
        assert!(matrix.values[price_idx][total_idx].is_nan());
    }

    #[test]
    fn summary_statistics_match_pandas_describe() {
        let table = table_of(&[
            ("Male", "A", "10", "1/7/2019", "10:00:00"),
            ("Male", "A", "20", "1/8/2019", "11:00:00"),
            ("Male", "A", "30", "1/9/2019", "12:00:00"),
            ("Male", "A", "40", "1/10/2019", "13:00:00"),
        ]);
        let view = full_view(&table);
        let summary = summary_statistics(&view);
        let total = summary.iter().find(|c| c.column == "Total").unwrap();
        assert_eq!(total.count, 4);
        assert_eq!(total.mean, Some(25.0));
        assert_eq!(total.min, Some(10.0));
        assert_eq!(total.q1, Some(17.5));
        assert_eq!(total.median, Some(25.0));
        assert_eq!(total.q3, Some(32.5));
        assert_eq!(total.max, Some(40.0));
    }

    #[test]
    fn data_quality_counts_missing_markers() {
        let mut bad = raw_record();
        bad.total = "garbage".to_string();
        bad.date = "garbage".to_string();
        let table = SalesTable::from_raw(&[raw_record(), bad]);
        let view = full_view(&table);

        let report = data_quality(&view);
        let total = report.columns.iter().find(|c| c.column == "Total").unwrap();
        assert_eq!(total.missing, 1);
        assert_eq!(total.dtype, "numeric");
        let date = report.columns.iter().find(|c| c.column == "Date").unwrap();
        assert_eq!(date.missing, 1);
        assert!(report.total_range.is_some());
    }

    #[test]
    fn data_quality_audits_derived_columns() {
        let mut bad_date = raw_record();
        bad_date.invoice_id = "INV-900".to_string();
        bad_date.date = "garbage".to_string();
        let mut bad_time = raw_record();
        bad_time.invoice_id = "INV-901".to_string();
        bad_time.time = "garbage".to_string();
        let table = SalesTable::from_raw(&[raw_record(), bad_date, bad_time]);
        let view = full_view(&table);

        let report = data_quality(&view);
        let column = |name: &str| report.columns.iter().find(|c| c.column == name).unwrap();

        // A bad date blanks the calendar-derived columns.
        assert_eq!(column("day_name").missing, 1);
        assert_eq!(column("month_name").missing, 1);
        assert_eq!(column("day_of_week").missing, 1);
        assert_eq!(column("is_weekend").missing, 1);
        // A bad time blanks the clock-derived ones.
        assert_eq!(column("hour").missing, 1);
        assert_eq!(column("time_of_day").missing, 1);
        assert_eq!(column("is_weekend").dtype, "boolean");
    }

    #[test]
    fn performance_counts_cover_non_missing_totals_only() {
        let table = table_of(&[
            ("Male", "A", "100", "1/7/2019", "10:00:00"),
            ("Male", "A", "garbage", "1/7/2019", "10:00:00"),
        ]);
        let view = full_view(&table);

        let perf = performance_table(&view, Dimension::Gender);
        let male = perf.iter().find(|g| g.key == "Male").unwrap();
        assert_eq!(male.transactions, 1);
        assert_eq!(male.total_revenue, 100.0);
        assert_eq!(male.avg_transaction, Some(100.0));
    }

    #[test]
    fn crosstab_zero_fills_missing_combinations() {
        let table = table_of(&[
            ("Male", "A", "100", "1/7/2019", "10:00:00"),
            ("Male", "A", "100", "1/7/2019", "10:00:00"),
            ("Male", "B", "100", "1/7/2019", "10:00:00"),
            ("Female", "A", "100", "1/7/2019", "10:00:00"),
        ]);
        let view = full_view(&table);

        let tab = category_crosstab(&view, Dimension::Gender, Dimension::Branch);
        assert_eq!(tab.columns, vec!["A", "B"]);
        assert_eq!(tab.rows.len(), 2);
        assert_eq!(tab.rows[0].key, "Female");
        assert_eq!(tab.rows[0].counts, vec![1, 0]);
        assert_eq!(tab.rows[1].key, "Male");
        assert_eq!(tab.rows[1].counts, vec![2, 1]);

        let mut selection = FilterSelection::select_all(&table);
        selection.branches.clear();
        let empty = category_crosstab(&table.filter(&selection), Dimension::Gender, Dimension::Branch);
        assert!(empty.columns.is_empty());
        assert!(empty.rows.is_empty());
    }

    #[test]
    fn kpi_deltas_compare_the_slice_to_the_full_table() {
        let table = table_of(&[
            ("Male", "A", "100", "1/7/2019", "10:00:00"),
            ("Male", "B", "300", "1/8/2019", "11:00:00"),
        ]);

        let unfiltered = kpis_with_baseline(&full_view(&table), &table);
        assert_eq!(unfiltered.revenue_vs_total_pct, Some(0.0));
        assert_eq!(unfiltered.transactions_vs_total_pct, Some(0.0));

        let mut selection = FilterSelection::select_all(&table);
        selection.branches.retain(|b| b == "A");
        let sliced = kpis_with_baseline(&table.filter(&selection), &table);
        assert_eq!(sliced.current.total_revenue, 100.0);
        assert_eq!(sliced.revenue_vs_total_pct, Some(-75.0));
        assert_eq!(sliced.avg_transaction_vs_total_pct, Some(-50.0));
        assert_eq!(sliced.transactions_vs_total_pct, Some(-50.0));
        assert_eq!(sliced.unique_invoices_vs_total_pct, Some(-50.0));
    }

    #[test]
    fn weekend_split_uses_fixed_saturday_sunday() {
        let table = table_of(&[
            // 1/7/2019 is a Monday, 1/5/2019 a Saturday.
            ("Male", "A", "100", "1/7/2019", "10:00:00"),
            ("Male", "A", "300", "1/5/2019", "10:00:00"),
        ]);
        let view = full_view(&table);
        let split = weekend_split(&view);
        assert_eq!(split.weekday_avg, Some(100.0));
        assert_eq!(split.weekend_avg, Some(300.0));
    }

    #[test]
    fn daily_revenue_is_ascending_by_date() {
        let table = table_of(&[
            ("Male", "A", "100", "1/9/2019", "10:00:00"),
            ("Male", "A", "50", "1/7/2019", "10:00:00"),
            ("Male", "A", "25", "1/9/2019", "11:00:00"),
        ]);
        let view = full_view(&table);
        let daily = daily_revenue(&view);
        assert_eq!(daily.len(), 2);
        assert_eq!(daily[0].date, NaiveDate::from_ymd_opt(2019, 1, 7).unwrap());
        assert_eq!(daily[1].revenue, 125.0);
    }
}
