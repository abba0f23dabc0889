//! Conditions that end an integration before the grid is exhausted.

use ndarray::prelude::*;

/// Decides, after every step, whether integration should stop.
///
/// The state that triggers the condition is kept in the trajectory. The
/// initial state is never passed to `should_stop`.
///
/// Any `FnMut(ArrayView1<f64>) -> bool` is a stop condition.
pub trait StopCondition {
    /// Returns `true` if integration should stop at the state `y`.
    fn should_stop(&mut self, y: ArrayView1<'_, f64>) -> bool;

    /// Minimum state length this condition can inspect.
    fn min_len(&self) -> usize {
        0
    }
}

impl<F> StopCondition for F
where
    F: FnMut(ArrayView1<f64>) -> bool,
{
    fn should_stop(&mut self, y: ArrayView1<'_, f64>) -> bool {
        self(y)
    }
}

/// Stops once one component of the state is zero or negative, e.g. the
/// height of a falling object reaching the ground.
///
/// A NaN component never triggers it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GroundContact {
    /// Index of the monitored component.
    pub component: usize,
}

impl Default for GroundContact {
    fn default() -> Self {
        GroundContact { component: 0 }
    }
}

impl StopCondition for GroundContact {
    fn should_stop(&mut self, y: ArrayView1<'_, f64>) -> bool {
        y[self.component] <= 0.
    }

    fn min_len(&self) -> usize {
        self.component + 1
    }
}

/// Never stops; the whole grid is integrated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NeverStop;

impl StopCondition for NeverStop {
    fn should_stop(&mut self, _y: ArrayView1<'_, f64>) -> bool {
        false
    }
}
