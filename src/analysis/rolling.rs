use std::iter::FusedIterator;

use chrono::NaiveDate;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CorrelationError {
    #[error("series lengths differ: {left} vs {right}")]
    InvalidInput { left: usize, right: usize },
    #[error("window size must be at least 1")]
    InvalidWindow,
}

/// Tolerance, relative to the window's largest magnitude, under which its
/// standard deviation counts as zero.
const ZERO_VARIANCE_EPS: f64 = 1e-12;

// ---------------------------------------------------------------------------
// Pearson sample correlation over one paired window
// ---------------------------------------------------------------------------

/// Pearson sample correlation of two equally long slices.
///
/// Uses the N-1 (sample) convention for covariance and standard deviation.
/// Returns `None` when either side has zero variance, when there are fewer
/// than two points, or when the result is not finite (a NaN cell in the
/// window). The result is not clamped to [-1, 1].
pub fn pearson(a: &[f64], b: &[f64]) -> Option<f64> {
    let n = a.len();
    if n < 2 || n != b.len() {
        return None;
    }

    let nf = n as f64;
    let mean_a = a.iter().sum::<f64>() / nf;
    let mean_b = b.iter().sum::<f64>() / nf;

    let (mut ss_a, mut ss_b, mut ss_ab) = (0.0, 0.0, 0.0);
    for (&x, &y) in a.iter().zip(b) {
        let dx = x - mean_a;
        let dy = y - mean_b;
        ss_a += dx * dx;
        ss_b += dy * dy;
        ss_ab += dx * dy;
    }

    let cov = ss_ab / (nf - 1.0);
    let sd_a = (ss_a / (nf - 1.0)).sqrt();
    let sd_b = (ss_b / (nf - 1.0)).sqrt();

    if is_flat(sd_a, a) || is_flat(sd_b, b) {
        return None;
    }

    let r = cov / (sd_a * sd_b);
    r.is_finite().then_some(r)
}

fn is_flat(sd: f64, window: &[f64]) -> bool {
    let scale = window.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
    sd == 0.0 || sd <= scale * ZERO_VARIANCE_EPS
}

/// [`pearson`] over the pairs where both sides are finite. Missing cells
/// drop their pair instead of spoiling the whole window.
pub fn pearson_complete_pairs(a: &[f64], b: &[f64]) -> Option<f64> {
    if a.len() != b.len() {
        return None;
    }
    let (xs, ys): (Vec<f64>, Vec<f64>) = a
        .iter()
        .zip(b)
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .map(|(&x, &y)| (x, y))
        .unzip();
    pearson(&xs, &ys)
}

// ---------------------------------------------------------------------------
// Rolling correlation
// ---------------------------------------------------------------------------

/// Lazy trailing-window correlation of two series.
///
/// Yields one item per input index `i` in `window..len`, computed over
/// `[i - window, i)`, so output `0` lines up with input index `window`.
#[derive(Debug, Clone)]
pub struct RollingCorrelation<'a> {
    a: &'a [f64],
    b: &'a [f64],
    window: usize,
    next: usize,
}

impl<'a> RollingCorrelation<'a> {
    pub fn new(a: &'a [f64], b: &'a [f64], window: usize) -> Result<Self, CorrelationError> {
        if a.len() != b.len() {
            return Err(CorrelationError::InvalidInput {
                left: a.len(),
                right: b.len(),
            });
        }
        if window == 0 {
            return Err(CorrelationError::InvalidWindow);
        }
        Ok(Self {
            a,
            b,
            window,
            next: window,
        })
    }
}

impl Iterator for RollingCorrelation<'_> {
    type Item = Option<f64>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.a.len() {
            return None;
        }
        let start = self.next - self.window;
        let value = pearson(&self.a[start..self.next], &self.b[start..self.next]);
        self.next += 1;
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.a.len().saturating_sub(self.next);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for RollingCorrelation<'_> {}

impl FusedIterator for RollingCorrelation<'_> {}

/// Eager form of [`RollingCorrelation`]: exactly `len - window` values, or an
/// empty vector when the window is longer than the series.
pub fn rolling_correlation(
    a: &[f64],
    b: &[f64],
    window: usize,
) -> Result<Vec<Option<f64>>, CorrelationError> {
    Ok(RollingCorrelation::new(a, b, window)?.collect())
}

// ---------------------------------------------------------------------------
// Date alignment
// ---------------------------------------------------------------------------

/// One rolling-correlation output paired with its date.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CorrelationPoint {
    pub date: NaiveDate,
    pub value: Option<f64>,
}

/// Pair rolling outputs with `dates[window..]`.
pub fn align_with_dates<I>(dates: &[NaiveDate], window: usize, values: I) -> Vec<CorrelationPoint>
where
    I: IntoIterator<Item = Option<f64>>,
{
    dates
        .iter()
        .skip(window)
        .zip(values)
        .map(|(&date, value)| CorrelationPoint { date, value })
        .collect()
}
