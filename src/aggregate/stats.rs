//! Shared statistics helpers for the reducers.
//!
//! All reductions report the sample standard deviation (Bessel's
//! correction, n−1 denominator) and define it as 0 for samples of size
//! 0 or 1 — never NaN, never undefined.

/// Arithmetic mean. 0.0 for an empty slice (callers guard for absence
/// before reducing, so the empty case never reaches the output).
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation with Bessel's correction; 0 when n <= 1.
pub fn sample_stdev(values: &[f64]) -> f64 {
    let n = values.len();
    if n <= 1 {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / (n - 1) as f64;
    variance.sqrt()
}

/// Round to `digits` decimal places.
pub fn round_to(value: f64, digits: u32) -> f64 {
    let factor = 10f64.powi(digits as i32);
    (value * factor).round() / factor
}

/// Round to the nearest integer (token and character averages are reported
/// as whole numbers).
pub fn round_int(value: f64) -> u64 {
    value.round().max(0.0) as u64
}
