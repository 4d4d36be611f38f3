//! Small descriptive-statistics helpers shared by the aggregation catalog.
//! Everything operates on plain `f64` slices with missing values already
//! stripped by the caller.

use serde::Serialize;
use statrs::distribution::{ContinuousCDF, StudentsT};

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (n - 1 denominator). `None` below two values.
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let ss: f64 = values.iter().map(|v| (v - m) * (v - m)).sum();
    Some((ss / (values.len() - 1) as f64).sqrt())
}

/// Quantile with linear interpolation between order statistics. `sorted`
/// must be ascending and non-empty; `q` in [0, 1].
pub fn percentile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    if lo == hi {
        return Some(sorted[lo]);
    }
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// Pearson correlation coefficient. Degenerate input (fewer than two pairs,
/// or a zero-variance side) yields NaN, which callers pass through untouched.
pub fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
    let n = xs.len().min(ys.len());
    if n < 2 {
        return f64::NAN;
    }
    let mx = xs[..n].iter().sum::<f64>() / n as f64;
    let my = ys[..n].iter().sum::<f64>() / n as f64;

    let mut cov = 0.0;
    let mut vx = 0.0;
    let mut vy = 0.0;
    for i in 0..n {
        let dx = xs[i] - mx;
        let dy = ys[i] - my;
        cov += dx * dy;
        vx += dx * dx;
        vy += dy * dy;
    }
    cov / (vx.sqrt() * vy.sqrt())
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct TTestResult {
    pub t_statistic: f64,
    pub p_value: f64,
}

/// Independent two-sample Student's t-test with pooled variance, matching
/// the classic equal-variance formulation. Returns `None` when either sample
/// is empty; degenerate degrees of freedom or variance produce NaN values
/// rather than an error.
pub fn pooled_t_test(a: &[f64], b: &[f64]) -> Option<TTestResult> {
    if a.is_empty() || b.is_empty() {
        return None;
    }

    let n1 = a.len() as f64;
    let n2 = b.len() as f64;
    let m1 = a.iter().sum::<f64>() / n1;
    let m2 = b.iter().sum::<f64>() / n2;

    let ss1: f64 = a.iter().map(|v| (v - m1) * (v - m1)).sum();
    let ss2: f64 = b.iter().map(|v| (v - m2) * (v - m2)).sum();

    let df = n1 + n2 - 2.0;
    let t_statistic = if df > 0.0 {
        let pooled = ((ss1 + ss2) / df).sqrt();
        (m1 - m2) / (pooled * (1.0 / n1 + 1.0 / n2).sqrt())
    } else {
        f64::NAN
    };

    let p_value = if df >= 1.0 && t_statistic.is_finite() {
        match StudentsT::new(0.0, 1.0, df) {
            Ok(dist) => 2.0 * (1.0 - dist.cdf(t_statistic.abs())),
            Err(_) => f64::NAN,
        }
    } else {
        f64::NAN
    };

    Some(TTestResult {
        t_statistic,
        p_value,
    })
}
