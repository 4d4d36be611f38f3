//! Report export: a multi-section PDF mirroring the dashboard's analysis
//! views, and a flat CSV of the filtered rows. Both produce in-memory byte
//! buffers; the hosting process decides how to deliver them.

use crate::aggregate::{
    compare_groups, count_by_category, kpis, peak_day, peak_hour, revenue_by_category,
    revenue_by_hour, revenue_by_weekday, top_transactions,
};
use crate::enrich::{DATE_FORMAT, TIME_FORMAT};
use crate::error::{Result, SalescopeError};
use crate::filter::{FilterSelection, View};
use crate::insights::{narrative_insights, InsightInputs};
use crate::schema::{weekday_name, Dimension, DERIVED_COLUMNS, SOURCE_COLUMNS};
use chrono::{DateTime, Local};
use log::{debug, info};
use printpdf::{
    BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference,
};

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 18.0;

const NO_DATA: &str = "no data";

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// "$1,234.56" style currency, two decimal places.
pub fn fmt_currency(value: f64) -> String {
    if !value.is_finite() {
        return NO_DATA.to_string();
    }
    let sign = if value < 0.0 { "-" } else { "" };
    let cents = (value.abs() * 100.0).round() as u64;
    format!(
        "{}${}.{:02}",
        sign,
        group_thousands(&(cents / 100).to_string()),
        cents % 100
    )
}

/// Row counts with thousands grouping.
pub fn fmt_count(n: usize) -> String {
    group_thousands(&n.to_string())
}

/// Timestamped filename for the PDF download artifact.
pub fn report_filename(now: DateTime<Local>) -> String {
    format!("sales_report_{}.pdf", now.format("%Y%m%d_%H%M%S"))
}

/// Timestamped filename for the CSV download artifact.
pub fn export_filename(now: DateTime<Local>) -> String {
    format!("sales_filtered_{}.csv", now.format("%Y%m%d_%H%M%S"))
}

fn pdf_err<E: std::fmt::Display>(e: E) -> SalescopeError {
    SalescopeError::Report(e.to_string())
}

/// Cursor-based text layout over an A4 printpdf document. Sections only ever
/// append lines, moving down the page and breaking to a fresh page when the
/// bottom margin is reached.
struct DocumentWriter {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    y: f32,
}

impl DocumentWriter {
    fn new(title: &str) -> Result<Self> {
        let (doc, page, layer) =
            PdfDocument::new(title, Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "content");
        let regular = doc.add_builtin_font(BuiltinFont::Helvetica).map_err(pdf_err)?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(pdf_err)?;
        let layer = doc.get_page(page).get_layer(layer);
        Ok(Self {
            doc,
            layer,
            regular,
            bold,
            y: PAGE_HEIGHT_MM - MARGIN_MM,
        })
    }

    fn break_page_if_needed(&mut self, needed: f32) {
        if self.y - needed < MARGIN_MM {
            let (page, layer) = self
                .doc
                .add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "content");
            self.layer = self.doc.get_page(page).get_layer(layer);
            self.y = PAGE_HEIGHT_MM - MARGIN_MM;
        }
    }

    fn write(&mut self, text: &str, size: f32, indent: f32, bold: bool) {
        // Rough line height: builtin Helvetica at `size` points.
        let line_height = size * 0.5;
        self.break_page_if_needed(line_height);
        let font = if bold { &self.bold } else { &self.regular };
        self.y -= line_height;
        self.layer
            .use_text(text, size, Mm(MARGIN_MM + indent), Mm(self.y), font);
    }

    fn title(&mut self, text: &str) {
        self.write(text, 18.0, 0.0, true);
        self.spacer(4.0);
    }

    fn heading(&mut self, text: &str) {
        self.spacer(4.0);
        self.write(text, 13.0, 0.0, true);
        self.spacer(1.5);
    }

    fn subheading(&mut self, text: &str) {
        self.spacer(2.0);
        self.write(text, 11.0, 0.0, true);
        self.spacer(1.0);
    }

    fn line(&mut self, text: &str) {
        self.write(text, 10.0, 0.0, false);
    }

    fn bullet(&mut self, text: &str) {
        self.write(&format!("- {}", text), 10.0, 3.0, false);
    }

    /// A two-column label/value row, as used by the KPI table.
    fn pair(&mut self, label: &str, value: &str) {
        let line_height = 5.0;
        self.break_page_if_needed(line_height);
        self.y -= line_height;
        self.layer
            .use_text(label, 10.0, Mm(MARGIN_MM + 3.0), Mm(self.y), &self.bold);
        self.layer
            .use_text(value, 10.0, Mm(MARGIN_MM + 75.0), Mm(self.y), &self.regular);
    }

    fn spacer(&mut self, height: f32) {
        self.y -= height;
    }

    fn finish(self) -> Result<Vec<u8>> {
        self.doc.save_to_bytes().map_err(pdf_err)
    }
}

fn date_period(selection: &FilterSelection) -> String {
    match selection.date_range {
        Some((start, end)) => format!("{} to {}", start, end),
        None => "All Data".to_string(),
    }
}

fn joined(values: &std::collections::BTreeSet<String>) -> String {
    values.iter().cloned().collect::<Vec<_>>().join(", ")
}

fn write_comparison(w: &mut DocumentWriter, view: &View, dim: Dimension, a: &str, b: &str) {
    let Some(cmp) = compare_groups(view, dim, a, b) else {
        return;
    };
    w.bullet(&format!(
        "{}: {} {} vs {} {} (p={:.3})",
        dim.label(),
        cmp.group_a,
        fmt_currency(cmp.mean_a),
        cmp.group_b,
        fmt_currency(cmp.mean_b),
        cmp.p_value
    ));
    if cmp.significant {
        w.line(&format!(
            "  -> Significant difference between {} groups",
            dim.label().to_lowercase()
        ));
    } else {
        w.line(&format!(
            "  -> No significant difference between {} groups",
            dim.label().to_lowercase()
        ));
    }
}

/// Renders the full analysis report for the current filtered view as a PDF
/// byte buffer. Any formatting failure comes back as a recoverable
/// [`SalescopeError::Report`]; it never takes the hosting process down.
pub fn render_pdf(view: &View, selection: &FilterSelection) -> Result<Vec<u8>> {
    debug!("Rendering PDF report over {} rows", view.len());

    let mut w = DocumentWriter::new("Salescope Sales Analytics Report")?;
    let k = kpis(view);

    w.title("Salescope Sales Analytics Report");

    w.heading("Executive Summary");
    w.line(&format!(
        "This report covers {} transactions with a total revenue of {}.",
        fmt_count(k.transactions),
        fmt_currency(k.total_revenue)
    ));
    if view.is_empty() {
        w.line("No transactions match the current filter selection.");
    }

    w.heading("Key Performance Indicators");
    w.pair("Total Revenue", &fmt_currency(k.total_revenue));
    w.pair(
        "Average Transaction Value",
        &k.avg_transaction
            .map(fmt_currency)
            .unwrap_or_else(|| NO_DATA.to_string()),
    );
    w.pair("Total Transactions", &fmt_count(k.transactions));
    w.pair("Unique Customers", &fmt_count(k.unique_invoices));
    w.pair(
        "Peak Revenue Day",
        &peak_day(view)
            .map(|p| p.day)
            .unwrap_or_else(|| NO_DATA.to_string()),
    );
    w.pair(
        "Peak Revenue Hour",
        &peak_hour(view)
            .map(|p| format!("{}:00", p.hour))
            .unwrap_or_else(|| NO_DATA.to_string()),
    );
    w.pair(
        "Most Popular Product",
        &count_by_category(view, Dimension::ProductLine)
            .first()
            .map(|c| c.category.clone())
            .unwrap_or_else(|| NO_DATA.to_string()),
    );
    w.pair(
        "Most Common Payment",
        &count_by_category(view, Dimension::Payment)
            .first()
            .map(|c| c.category.clone())
            .unwrap_or_else(|| NO_DATA.to_string()),
    );

    w.heading("Customer Demographics");
    w.subheading("Gender Distribution");
    for c in count_by_category(view, Dimension::Gender) {
        w.bullet(&format!(
            "{}: {} customers ({:.1}%)",
            c.category,
            fmt_count(c.count),
            c.share_pct
        ));
    }
    w.subheading("Customer Type Distribution");
    for c in count_by_category(view, Dimension::CustomerType) {
        w.bullet(&format!(
            "{}: {} customers ({:.1}%)",
            c.category,
            fmt_count(c.count),
            c.share_pct
        ));
    }

    w.heading("Product Performance Analysis");
    w.subheading("Revenue by Product Line");
    for c in revenue_by_category(view, Dimension::ProductLine) {
        w.bullet(&format!(
            "{}: {} ({:.1}%)",
            c.category,
            fmt_currency(c.revenue),
            c.share_pct
        ));
    }

    w.heading("Statistical Analysis");
    w.subheading("Hypothesis Testing Results");
    write_comparison(&mut w, view, Dimension::Gender, "Male", "Female");
    write_comparison(&mut w, view, Dimension::CustomerType, "Member", "Normal");

    w.heading("Temporal Analysis");
    w.subheading("Daily Performance");
    for c in revenue_by_weekday(view) {
        w.bullet(&format!(
            "{}: {} ({:.1}%)",
            c.category,
            fmt_currency(c.revenue),
            c.share_pct
        ));
    }
    w.subheading("Hourly Performance (Top 5)");
    let top_hours: Vec<_> = revenue_by_hour(view).into_iter().take(5).collect();
    let top_hour_total: f64 = top_hours.iter().map(|h| h.revenue).sum();
    for h in &top_hours {
        let pct = if top_hour_total != 0.0 {
            h.revenue / top_hour_total * 100.0
        } else {
            0.0
        };
        w.bullet(&format!(
            "{:02}:00: {} ({:.1}%)",
            h.hour,
            fmt_currency(h.revenue),
            pct
        ));
    }

    w.heading("Top Transactions");
    for t in top_transactions(view, 10) {
        w.bullet(&format!(
            "{} | {} | {} | {} | {}",
            t.invoice_id,
            t.date.map(|d| d.to_string()).unwrap_or_default(),
            t.branch,
            t.product_line,
            t.total.map(fmt_currency).unwrap_or_else(|| NO_DATA.to_string())
        ));
    }

    w.heading("Key Business Insights");
    let insights = narrative_insights(&InsightInputs::from_view(view));
    if insights.is_empty() {
        w.line("No insights available for the current selection.");
    }
    for insight in insights {
        w.bullet(&insight);
    }

    let now = Local::now();
    w.heading("Report Details");
    w.line("Report generated by Salescope Sales Analytics");
    w.line(&format!(
        "Generated on: {}",
        now.format("%B %d, %Y at %I:%M %p")
    ));
    w.line(&format!("Data Period: {}", date_period(selection)));
    w.line(&format!("Branches: {}", joined(&selection.branches)));
    w.line(&format!("Cities: {}", joined(&selection.cities)));
    w.line(&format!(
        "Data analyzed: {} transactions",
        fmt_count(view.len())
    ));

    let bytes = w.finish()?;
    info!("Generated PDF report ({} bytes)", bytes.len());
    Ok(bytes)
}

fn opt_number(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Serializes the filtered view as delimited text with a header row: the
/// original columns in source order plus the derived columns. Missing values
/// become empty cells, so re-parsing the output reproduces the same rows.
pub fn export_csv(view: &View) -> Result<Vec<u8>> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(SOURCE_COLUMNS.iter().chain(DERIVED_COLUMNS.iter()))?;

    for t in view.rows() {
        let record: [String; 23] = [
            t.invoice_id.clone(),
            t.branch.clone(),
            t.city.clone(),
            t.customer_type.clone(),
            t.gender.clone(),
            t.product_line.clone(),
            opt_number(t.unit_price),
            opt_number(t.quantity),
            opt_number(t.tax),
            opt_number(t.total),
            t.date
                .map(|d| d.format(DATE_FORMAT).to_string())
                .unwrap_or_default(),
            t.time
                .map(|v| v.format(TIME_FORMAT).to_string())
                .unwrap_or_default(),
            t.payment.clone(),
            opt_number(t.cogs),
            opt_number(t.gross_margin_pct),
            opt_number(t.gross_income),
            opt_number(t.rating),
            t.hour.map(|h| h.to_string()).unwrap_or_default(),
            t.weekday
                .map(|w| weekday_name(w).to_string())
                .unwrap_or_default(),
            t.month_name.map(str::to_string).unwrap_or_default(),
            t.day_of_week.map(|d| d.to_string()).unwrap_or_default(),
            t.is_weekend.map(|b| b.to_string()).unwrap_or_default(),
            t.time_of_day
                .map(|b| b.as_str().to_string())
                .unwrap_or_default(),
        ];
        wtr.write_record(&record)?;
    }

    wtr.flush()?;
    wtr.into_inner()
        .map_err(|e| SalescopeError::Report(format!("CSV export buffer: {}", e)))
}
