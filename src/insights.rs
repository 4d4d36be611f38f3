//! Narrative business insights: fixed string templates filled from
//! aggregation results. Pure text generation, no rendering concerns, so the
//! dashboard and the PDF report share the exact same wording.

use crate::aggregate::{count_by_category, peak_day, peak_hour};
use crate::filter::View;
use crate::schema::Dimension;

/// The aggregation outputs the templates draw from.
#[derive(Debug, Clone)]
pub struct InsightInputs {
    pub peak_day: Option<String>,
    pub peak_hour: Option<u32>,
    pub top_product: Option<String>,
    pub top_payment: Option<String>,
}

impl InsightInputs {
    pub fn from_view(view: &View) -> Self {
        Self {
            peak_day: peak_day(view).map(|p| p.day),
            peak_hour: peak_hour(view).map(|p| p.hour),
            top_product: count_by_category(view, Dimension::ProductLine)
                .first()
                .map(|c| c.category.clone()),
            top_payment: count_by_category(view, Dimension::Payment)
                .first()
                .map(|c| c.category.clone()),
        }
    }
}

/// Renders the insight lines. Each template is emitted only when its inputs
/// exist, so an empty view produces an empty list rather than placeholder
/// text.
pub fn narrative_insights(inputs: &InsightInputs) -> Vec<String> {
    let mut lines = Vec::new();

    if let (Some(day), Some(hour)) = (&inputs.peak_day, inputs.peak_hour) {
        lines.push(format!(
            "Peak Performance: {} is the most profitable day, with {}:00 being the peak hour",
            day, hour
        ));
    }
    if let Some(product) = &inputs.top_product {
        lines.push(format!(
            "Product Strategy: {} is the most popular product line - consider expanding inventory",
            product
        ));
    }
    if let Some(payment) = &inputs.top_payment {
        lines.push(format!(
            "Payment Trends: {} is the preferred payment method - optimize for digital payments",
            payment
        ));
    }
    if let Some(hour) = inputs.peak_hour {
        lines.push(format!(
            "Operational Focus: Schedule maximum staffing during {}:00-{}:00 for optimal performance",
            hour,
            hour + 1
        ));
    }

    lines
}
