//! Builders for evenly spaced time grids.

use ndarray::prelude::*;
use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq)]
pub enum GridError {
    #[error("grid step {0} is not positive and finite")]
    InvalidStep(f64),
    #[error("grid start {0} is not finite")]
    NonFiniteStart(f64),
    #[error("grid duration {0} is negative or not finite")]
    InvalidDuration(f64),
    /// The sample count doesn't fit in memory.
    #[error("grid would need {0} samples")]
    TooManySamples(f64),
    /// `start + i * step` rounds to the same value for neighbouring samples.
    #[error("grid step is below the floating-point resolution at index {index}")]
    StepBelowResolution { index: usize },
}

fn check_step(step: f64) -> Result<(), GridError> {
    if step > 0. && step.is_finite() {
        Ok(())
    } else {
        Err(GridError::InvalidStep(step))
    }
}

fn check_start(start: f64) -> Result<(), GridError> {
    if start.is_finite() {
        Ok(())
    } else {
        Err(GridError::NonFiniteStart(start))
    }
}

/// Builds `start + i * step` for `i` in `0..n`, refusing counts that can't be
/// allocated and samples that don't increase.
fn build(start: f64, step: f64, n: usize) -> Result<Array1<f64>, GridError> {
    if n > isize::MAX as usize / std::mem::size_of::<f64>() {
        return Err(GridError::TooManySamples(n as f64));
    }
    let mut samples = Vec::new();
    samples
        .try_reserve_exact(n)
        .map_err(|_| GridError::TooManySamples(n as f64))?;
    samples.extend((0..n).map(|i| start + i as f64 * step));

    if let Some(i) = samples.windows(2).position(|w| !(w[1] > w[0])) {
        return Err(GridError::StepBelowResolution { index: i + 1 });
    }
    Ok(Array1::from(samples))
}

/// Samples `start, start + step, ...` strictly below `start + duration`.
///
/// There are `ceil(duration / step)` samples, so the end point is excluded
/// and a zero duration gives an empty grid.
pub fn time_grid(start: f64, duration: f64, step: f64) -> Result<Array1<f64>, GridError> {
    check_start(start)?;
    check_step(step)?;
    if !(duration >= 0. && duration.is_finite()) {
        return Err(GridError::InvalidDuration(duration));
    }
    let n = (duration / step).ceil();
    if !(n <= isize::MAX as f64) {
        return Err(GridError::TooManySamples(n));
    }
    build(start, step, n as usize)
}

/// Exactly `n` samples `start + i * step` for `i` in `0..n`.
pub fn uniform_grid(start: f64, step: f64, n: usize) -> Result<Array1<f64>, GridError> {
    check_start(start)?;
    check_step(step)?;
    build(start, step, n)
}
