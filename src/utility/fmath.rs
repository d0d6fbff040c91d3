//! Transcendental functions applied to whole buffers.
//!
//! Acceptance tests and Poisson interarrival times only need a bounded relative
//! error, so callers go through these entry points instead of calling `exp`/`ln`
//! directly. Any faster approximation dropped in here must stay within
//! [`MAX_RELATIVE_ERROR`] on finite inputs and keep the IEEE behavior at the edges:
//! `exp(-inf) = 0`, `exp(+inf) = inf`, `log(0) = -inf`, `log(x < 0) = NaN`.

/// Relative error bound guaranteed on finite inputs.
pub const MAX_RELATIVE_ERROR: f64 = 1e-6;

/// `e^x`.
#[inline]
pub fn exp(x: f64) -> f64 {
    x.exp()
}

/// Natural logarithm.
#[inline]
pub fn log(x: f64) -> f64 {
    x.ln()
}

/// Replace every value with its exponential.
pub fn exp_bulk(values: &mut [f64]) {
    values.iter_mut().for_each(|v| *v = exp(*v));
}

/// Replace every value with its natural logarithm.
pub fn log_bulk(values: &mut [f64]) {
    values.iter_mut().for_each(|v| *v = log(*v));
}
