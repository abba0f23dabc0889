//! Result of an integration run.

use ndarray::{prelude::*, s};

/// States recorded on the time grid.
///
/// Storage always has one row per grid sample. When the stop condition
/// fired, only the rows up to and including the stop index are valid; the
/// rest are zeros and are hidden by every accessor except `full_states`.
#[derive(Clone, Debug, PartialEq)]
pub struct Trajectory {
    times: Array1<f64>,
    /// Shape `n, d`.
    states: Array2<f64>,
    /// Number of valid rows.
    len: usize,
    stop_index: Option<usize>,
    nfev: usize,
}

impl Trajectory {
    pub(crate) fn new(
        times: Array1<f64>,
        states: Array2<f64>,
        len: usize,
        stop_index: Option<usize>,
        nfev: usize,
    ) -> Trajectory {
        debug_assert_eq!(times.len(), states.nrows());
        debug_assert!(len >= 1 && len <= times.len());
        Trajectory {
            times,
            states,
            len,
            stop_index,
            nfev,
        }
    }

    /// Number of valid states. Always at least 1.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always `false`; the initial state is always recorded.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of elements in each state.
    pub fn dim(&self) -> usize {
        self.states.ncols()
    }

    /// Number of samples in the grid the run was given.
    pub fn grid_len(&self) -> usize {
        self.times.len()
    }

    /// Sample times of the valid states.
    pub fn times(&self) -> ArrayView1<'_, f64> {
        self.times.slice(s![..self.len])
    }

    /// Valid states, shape `len, d`.
    pub fn states(&self) -> ArrayView2<'_, f64> {
        self.states.slice(s![..self.len, ..])
    }

    /// All rows including the zero-filled tail left by an early stop.
    pub fn full_states(&self) -> ArrayView2<'_, f64> {
        self.states.view()
    }

    /// State at index `i`, or `None` past the valid rows.
    pub fn state(&self, i: usize) -> Option<ArrayView1<'_, f64>> {
        if i < self.len {
            Some(self.states.row(i))
        } else {
            None
        }
    }

    /// Last valid state.
    pub fn last_state(&self) -> ArrayView1<'_, f64> {
        self.states.row(self.len - 1)
    }

    /// Component `j` of every valid state.
    ///
    /// # Panics
    ///
    /// Panics if `j >= self.dim()`.
    pub fn component(&self, j: usize) -> ArrayView1<'_, f64> {
        self.states.slice(s![..self.len, j])
    }

    /// Index of the state that triggered the stop condition.
    pub fn stop_index(&self) -> Option<usize> {
        self.stop_index
    }

    /// Returns `true` if the run ended before the last grid sample.
    pub fn stopped_early(&self) -> bool {
        self.len < self.times.len()
    }

    /// Number of right-hand side evaluations performed.
    pub fn nfev(&self) -> usize {
        self.nfev
    }

    /// First valid index at which component `j` is zero or negative.
    ///
    /// Unlike the stop condition, this includes index 0. States from this
    /// index on are left as integrated; callers that want them clamped (for
    /// example a zero velocity once on the ground) overwrite them on the
    /// result of `into_parts`.
    ///
    /// # Panics
    ///
    /// Panics if `j >= self.dim()`.
    pub fn first_crossing(&self, j: usize) -> Option<usize> {
        self.component(j).iter().position(|&x| x <= 0.)
    }

    /// Returns the valid times and states, dropping the unused tail.
    pub fn into_parts(self) -> (Array1<f64>, Array2<f64>) {
        let len = self.len;
        (
            self.times.slice_move(s![..len]),
            self.states.slice_move(s![..len, ..]),
        )
    }
}
