//! Bjontegaard delta between two rate-distortion curves.
//!
//! Fits degree-2 polynomials of PSNR over log-bitrate (and of
//! log-bitrate over PSNR), integrates both fits over the overlapping
//! interval, and reports the average PSNR difference and the average
//! bitrate savings percentage.

use serde::{Deserialize, Serialize};

use super::{MetricError, MetricResult};

/// Average deltas between a reference and a test rate-distortion curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BjontegaardResult {
    /// Average PSNR difference in dB (test minus reference).
    pub avg_psnr_delta_db: f64,
    /// Average bitrate savings in percent (negative means the test
    /// curve spends fewer bits for the same quality).
    pub avg_bitrate_savings_pct: f64,
}

impl BjontegaardResult {
    const ZERO: Self = Self {
        avg_psnr_delta_db: 0.0,
        avg_bitrate_savings_pct: 0.0,
    };
}

/// Compare two rate-distortion curves.
///
/// Each curve is a pair of equal-length slices: bitrates in kbps and
/// PSNR values in dB, matched pointwise. When the two rate vectors are
/// identical pointwise the result is exactly zero with no fit
/// attempted. Curves shorter than 3 points and zero-width overlap
/// intervals are rejected instead of producing NaN.
pub fn bjontegaard(
    rate_ref: &[f64],
    psnr_ref: &[f64],
    rate_test: &[f64],
    psnr_test: &[f64],
) -> MetricResult<BjontegaardResult> {
    check_curve(rate_ref, psnr_ref)?;
    check_curve(rate_test, psnr_test)?;

    // Same bitrate ladder on both sides means no delta to measure.
    if rate_ref == rate_test {
        return Ok(BjontegaardResult::ZERO);
    }

    let lrate_ref: Vec<f64> = rate_ref.iter().map(|r| r.ln()).collect();
    let lrate_test: Vec<f64> = rate_test.iter().map(|r| r.ln()).collect();

    // PSNR as a function of log-bitrate
    let lo = min_of(&lrate_ref).max(min_of(&lrate_test));
    let hi = max_of(&lrate_ref).min(max_of(&lrate_test));
    if hi - lo <= f64::EPSILON {
        return Err(MetricError::DegenerateInterval { axis: "bitrate" });
    }
    let p_ref = polyfit2(&lrate_ref, psnr_ref);
    let p_test = polyfit2(&lrate_test, psnr_test);
    let int_ref = definite_integral(&p_ref, lo, hi);
    let int_test = definite_integral(&p_test, lo, hi);
    let avg_psnr_delta_db = (int_test - int_ref) / (hi - lo);

    // Log-bitrate as a function of PSNR
    let lo = min_of(psnr_ref).max(min_of(psnr_test));
    let hi = max_of(psnr_ref).min(max_of(psnr_test));
    if hi - lo <= f64::EPSILON {
        return Err(MetricError::DegenerateInterval { axis: "psnr" });
    }
    let q_ref = polyfit2(psnr_ref, &lrate_ref);
    let q_test = polyfit2(psnr_test, &lrate_test);
    let int_ref = definite_integral(&q_ref, lo, hi);
    let int_test = definite_integral(&q_test, lo, hi);
    let avg_log_rate_delta = (int_test - int_ref) / (hi - lo);
    let avg_bitrate_savings_pct = (avg_log_rate_delta.exp() - 1.0) * 100.0;

    Ok(BjontegaardResult {
        avg_psnr_delta_db,
        avg_bitrate_savings_pct,
    })
}

fn check_curve(rates: &[f64], values: &[f64]) -> MetricResult<()> {
    if rates.len() != values.len() {
        return Err(MetricError::ShapeMismatch {
            rates: rates.len(),
            values: values.len(),
        });
    }
    if rates.len() < 3 {
        return Err(MetricError::TooFewPoints {
            got: rates.len(),
            required: 3,
        });
    }
    if let Some(&bad) = rates.iter().find(|r| **r <= 0.0) {
        return Err(MetricError::NonPositiveRate { value: bad });
    }
    Ok(())
}

/// Least-squares degree-2 fit of `y` over `x`.
///
/// Returns coefficients `[a, b, c]` for `a*x^2 + b*x + c`, solving the
/// 3x3 normal equations directly.
fn polyfit2(x: &[f64], y: &[f64]) -> [f64; 3] {
    let n = x.len() as f64;
    let (mut s1, mut s2, mut s3, mut s4) = (0.0, 0.0, 0.0, 0.0);
    let (mut t0, mut t1, mut t2) = (0.0, 0.0, 0.0);
    for (&xi, &yi) in x.iter().zip(y.iter()) {
        let xi2 = xi * xi;
        s1 += xi;
        s2 += xi2;
        s3 += xi2 * xi;
        s4 += xi2 * xi2;
        t0 += yi;
        t1 += xi * yi;
        t2 += xi2 * yi;
    }

    // Normal equations, unknowns ordered [a, b, c]
    let mut m = [
        [s4, s3, s2, t2],
        [s3, s2, s1, t1],
        [s2, s1, n, t0],
    ];
    solve3(&mut m)
}

/// Gaussian elimination with partial pivoting on an augmented 3x4 system.
fn solve3(m: &mut [[f64; 4]; 3]) -> [f64; 3] {
    for col in 0..3 {
        let pivot = (col..3)
            .max_by(|&i, &j| {
                m[i][col]
                    .abs()
                    .partial_cmp(&m[j][col].abs())
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .unwrap_or(col);
        m.swap(col, pivot);

        let diag = m[col][col];
        if diag.abs() < 1e-300 {
            continue;
        }
        for row in (col + 1)..3 {
            let factor = m[row][col] / diag;
            for k in col..4 {
                m[row][k] -= factor * m[col][k];
            }
        }
    }

    let mut out = [0.0; 3];
    for row in (0..3).rev() {
        let mut acc = m[row][3];
        for k in (row + 1)..3 {
            acc -= m[row][k] * out[k];
        }
        out[row] = if m[row][row].abs() < 1e-300 {
            0.0
        } else {
            acc / m[row][row]
        };
    }
    out
}

/// Definite integral of `a*x^2 + b*x + c` over `[lo, hi]`.
fn definite_integral(p: &[f64; 3], lo: f64, hi: f64) -> f64 {
    let eval = |x: f64| p[0] * x * x * x / 3.0 + p[1] * x * x / 2.0 + p[2] * x;
    eval(hi) - eval(lo)
}

fn min_of(v: &[f64]) -> f64 {
    v.iter().copied().fold(f64::INFINITY, f64::min)
}

fn max_of(v: &[f64]) -> f64 {
    v.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}
