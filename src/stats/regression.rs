//! Ordinary least-squares fit of a metric against a scaling parameter.

use super::StatsError;
use super::student_t;

/// Result of [`linear_regression`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    pub r_value: f64,
    pub r_squared: f64,
    /// Two-sided p-value for the null hypothesis of zero slope.
    pub p_value: f64,
    /// Standard error of the slope.
    pub std_err: f64,
}

pub fn linear_regression(x: &[f64], y: &[f64]) -> Result<LinearFit, StatsError> {
    if x.len() != y.len() {
        return Err(StatsError::Degenerate("x and y have different lengths"));
    }
    let n = x.len();
    if n < 3 {
        return Err(StatsError::TooFewSamples { needed: 3, got: n });
    }
    if x.iter().chain(y).any(|v| !v.is_finite()) {
        return Err(StatsError::NonFinite);
    }

    let nf = n as f64;
    let x_mean = x.iter().sum::<f64>() / nf;
    let y_mean = y.iter().sum::<f64>() / nf;

    let mut ssx = 0.0;
    let mut ssy = 0.0;
    let mut sxy = 0.0;
    for (xi, yi) in x.iter().zip(y) {
        let dx = xi - x_mean;
        let dy = yi - y_mean;
        ssx += dx * dx;
        ssy += dy * dy;
        sxy += dx * dy;
    }
    if ssx == 0.0 {
        return Err(StatsError::Degenerate("all x values are equal"));
    }

    let slope = sxy / ssx;
    let intercept = y_mean - slope * x_mean;
    let r_value = if ssy == 0.0 { 0.0 } else { (sxy / (ssx * ssy).sqrt()).clamp(-1.0, 1.0) };
    let r_squared = r_value * r_value;

    let df = nf - 2.0;
    let residual = (1.0 - r_squared).max(0.0);
    let (p_value, std_err) = if residual == 0.0 {
        (if ssy == 0.0 { 1.0 } else { 0.0 }, 0.0)
    } else {
        let t = r_value * (df / residual).sqrt();
        (student_t::two_sided_p_value(t, df), (residual * ssy / ssx / df).sqrt())
    };

    Ok(LinearFit {
        slope,
        intercept,
        r_value,
        r_squared,
        p_value,
        std_err,
    })
}
