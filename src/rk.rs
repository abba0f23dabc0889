//! Runge–Kutta solvers on a fixed time grid.

use lazy_static::lazy_static;
use log::{debug, trace};
use ndarray::{aview1, prelude::*};
use std::convert::Infallible;
use std::marker::PhantomData;
use thiserror::Error;

use crate::stop::{GroundContact, StopCondition};
use crate::trajectory::Trajectory;
use crate::OdeIntegrate;

#[derive(Debug, Error)]
pub enum IntegrateError<E = Infallible> {
    #[error("initial state is empty")]
    EmptyState,
    #[error("step size {0} is not positive and finite")]
    InvalidStepSize(f64),
    #[error("time grid is empty")]
    EmptyGrid,
    #[error("time grid is not strictly increasing at index {index}")]
    NonIncreasingGrid { index: usize },
    /// The stop condition looks at a component the state doesn't have.
    #[error("stop condition needs a state of length at least {required}, got {len}")]
    StateTooShort { required: usize, len: usize },
    /// The right-hand side returned an error. It is passed through as is.
    #[error("derivative evaluation failed")]
    Derivative(#[source] E),
    /// Only reported with `IntegrateOptions::check_finite`.
    #[error("non-finite value at index {index} (t = {time})")]
    NonFinite { index: usize, time: f64 },
}

/// Optional input and output checks.
///
/// The defaults perform none of them: grid ordering is trusted and NaN or
/// infinite values flow through the trajectory unreported.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IntegrateOptions {
    /// Reject time grids that are not strictly increasing.
    pub check_grid: bool,
    /// Fail with `IntegrateError::NonFinite` as soon as a stage derivative or
    /// a new state contains NaN or an infinity.
    pub check_finite: bool,
}

/// Returns the index of the first sample that is not greater than its
/// predecessor.
fn first_non_increasing(times: ArrayView1<f64>) -> Option<usize> {
    times
        .iter()
        .zip(times.iter().skip(1))
        .position(|(&prev, &next)| !(next > prev))
        .map(|i| i + 1)
}

/// Fixed-step Runge–Kutta ODE IVP solver.
///
/// Step `i` advances the state recorded at `times[i - 1]` by exactly `h`.
/// The grid is only used for the stage times and for sizing the output, so
/// the caller is responsible for building it with spacing `h`.
pub struct RungeKutta<F, M, S = GroundContact, E = Infallible>
where
    F: FnMut(f64, ArrayView1<f64>, ArrayViewMut1<f64>) -> Result<(), E>,
    M: RKMethod,
    S: StopCondition,
{
    fun: F,
    method: PhantomData<M>,
    error: PhantomData<fn() -> E>,
    stop: S,
    options: IntegrateOptions,
    /// Sample times, length `n`.
    times: Array1<f64>,
    /// Step size.
    h: f64,
    /// Recorded states, shape `n, d`. Rows after `index` are zeros.
    states: Array2<f64>,
    /// Index of the last recorded state.
    index: usize,
    /// Index of the state that triggered the stop condition.
    stop_index: Option<usize>,
    /// Storage for Runge–Kutta stage derivatives, shape `M::NUM_STAGES, d`.
    k: Array2<f64>,
    /// Input state of the current stage.
    stage: Array1<f64>,
    /// Result of the current step.
    y_new: Array1<f64>,
    /// Number of right-hand side evaluations.
    nfev: usize,
}

impl<F, M, S, E> RungeKutta<F, M, S, E>
where
    F: FnMut(f64, ArrayView1<f64>, ArrayViewMut1<f64>) -> Result<(), E>,
    M: RKMethod,
    S: StopCondition,
{
    /// Creates a new `RungeKutta` solver.
    ///
    /// # Parameters
    ///
    /// * `fun`: Right-hand side of the system, where calling `fun(t, y,
    ///   deriv_y)` should fill in `deriv_y` with the derivative of `y` at time
    ///   `t`. It is called at grid times and at intermediate stage times.
    ///
    /// * `y0`: Initial state, recorded unchanged as the first row.
    ///
    /// * `times`: Sample times. The output has one row per sample.
    ///
    /// * `h`: Step size, positive and finite.
    ///
    /// * `stop`: Checked on every new state, never on `y0`.
    ///
    /// * `options`: Extra checks, see `IntegrateOptions`.
    ///
    /// All validation happens here, before `fun` is called.
    pub fn new(
        fun: F,
        y0: Array1<f64>,
        times: Array1<f64>,
        h: f64,
        stop: S,
        options: IntegrateOptions,
    ) -> Result<RungeKutta<F, M, S, E>, IntegrateError<E>> {
        if y0.is_empty() {
            return Err(IntegrateError::EmptyState);
        }
        if !(h > 0. && h.is_finite()) {
            return Err(IntegrateError::InvalidStepSize(h));
        }
        if times.is_empty() {
            return Err(IntegrateError::EmptyGrid);
        }
        if stop.min_len() > y0.len() {
            return Err(IntegrateError::StateTooShort {
                required: stop.min_len(),
                len: y0.len(),
            });
        }
        if options.check_grid {
            if let Some(index) = first_non_increasing(times.view()) {
                return Err(IntegrateError::NonIncreasingGrid { index });
            }
        }
        if options.check_finite && !y0.iter().all(|y| y.is_finite()) {
            return Err(IntegrateError::NonFinite {
                index: 0,
                time: times[0],
            });
        }

        let dim = y0.len();
        let mut states = Array2::zeros((times.len(), dim));
        states.row_mut(0).assign(&y0);

        debug!(
            "integrating {} states over {} samples from t = {} with h = {} ({} stages/step)",
            dim,
            times.len(),
            times[0],
            h,
            M::NUM_STAGES,
        );

        Ok(RungeKutta {
            fun,
            method: PhantomData,
            error: PhantomData,
            stop,
            options,
            times,
            h,
            states,
            index: 0,
            stop_index: None,
            k: Array2::zeros((M::NUM_STAGES, dim)),
            stage: Array1::zeros(dim),
            y_new: Array1::zeros(dim),
            nfev: 0,
        })
    }

    /// Step size.
    pub fn step_size(&self) -> f64 {
        self.h
    }

    /// Number of right-hand side evaluations so far.
    pub fn nfev(&self) -> usize {
        self.nfev
    }

    /// Index of the state that triggered the stop condition, if any.
    pub fn stop_index(&self) -> Option<usize> {
        self.stop_index
    }

    /// Consumes the solver and returns what has been recorded so far.
    pub fn into_trajectory(self) -> Trajectory {
        Trajectory::new(
            self.times,
            self.states,
            self.index + 1,
            self.stop_index,
            self.nfev,
        )
    }

    /// Computes the stages for one step from the current state at time `t`
    /// and leaves the result in `y_new`.
    ///
    /// Notation for Butcher tableau is as in (ref 1).
    ///
    /// # References
    ///
    /// 1. E. Hairer, S. P. Norsett G. Wanner, "Solving Ordinary Differential
    ///    Equations I: Nonstiff Problems", Sec. II.1.
    fn step_by(&mut self, t: f64, h: f64) -> Result<(), IntegrateError<E>> {
        let y = self.states.row(self.index);

        self.nfev += 1;
        (self.fun)(t, y, self.k.row_mut(0)).map_err(IntegrateError::Derivative)?;
        for (s, (a, c)) in M::a().iter().zip(M::c()).enumerate() {
            self.stage.assign(&y);
            for (j, &a_j) in a.iter().enumerate() {
                if a_j != 0. {
                    self.stage.scaled_add(h * a_j, &self.k.row(j));
                }
            }
            self.nfev += 1;
            (self.fun)(t + c * h, self.stage.view(), self.k.row_mut(s + 1))
                .map_err(IntegrateError::Derivative)?;
        }

        self.y_new.assign(&y);
        for (j, &b_j) in M::b().iter().enumerate() {
            if b_j != 0. {
                self.y_new.scaled_add(h * b_j, &self.k.row(j));
            }
        }
        Ok(())
    }
}

impl<F, M, S, E> OdeIntegrate for RungeKutta<F, M, S, E>
where
    F: FnMut(f64, ArrayView1<f64>, ArrayViewMut1<f64>) -> Result<(), E>,
    M: RKMethod,
    S: StopCondition,
{
    type Error = IntegrateError<E>;

    fn len(&self) -> usize {
        self.states.ncols()
    }

    fn step(&mut self) -> Result<(), IntegrateError<E>> {
        if self.finished() {
            return Ok(());
        }

        let t = self.times[self.index];
        self.step_by(t, self.h)?;
        let next = self.index + 1;

        if self.options.check_finite
            && !(self.k.iter().all(|x| x.is_finite()) && self.y_new.iter().all(|x| x.is_finite()))
        {
            return Err(IntegrateError::NonFinite {
                index: next,
                time: self.times[next],
            });
        }

        self.states.row_mut(next).assign(&self.y_new);
        self.index = next;
        trace!("step {}: t = {}, y = {}", next, self.times[next], self.y_new);

        if self.stop.should_stop(self.y_new.view()) {
            self.stop_index = Some(next);
            debug!(
                "stop condition met at index {} of {} (t = {}) after {} evaluations",
                next,
                self.times.len(),
                self.times[next],
                self.nfev,
            );
        } else if self.finished() {
            debug!(
                "reached end of grid at t = {} after {} evaluations",
                self.times[next], self.nfev,
            );
        }
        Ok(())
    }

    fn time(&self) -> f64 {
        self.times[self.index]
    }

    fn time_bound(&self) -> f64 {
        self.times[self.times.len() - 1]
    }

    fn state(&self) -> ArrayView1<'_, f64> {
        self.states.row(self.index)
    }

    fn finished(&self) -> bool {
        self.stop_index.is_some() || self.index + 1 >= self.times.len()
    }
}

/// Explicit Runge–Kutta method given by its Butcher tableau.
pub trait RKMethod {
    /// Order of the method.
    const ORDER: usize;

    /// Number of stages in the method.
    const NUM_STAGES: usize;

    /// Coefficients for incrementing time for consecutive RK stages, length
    /// `NUM_STAGES - 1`.
    ///
    /// The value for the first stage is always zero, so it is not included.
    fn c() -> ArrayView1<'static, f64>;

    /// Coefficients for combining previous RK stages to compute the next
    /// stage, length `NUM_STAGES - 1`.
    ///
    /// For explicit methods the coefficients above the main diagonal are
    /// zeros, so `a` is stored as a list of arrays of increasing lengths. The
    /// first stage is always just `f`, thus no coefficients for it are
    /// required.
    fn a() -> &'static [ArrayView1<'static, f64>];

    /// Coefficients for combining RK stages for computing the final
    /// prediction, length `NUM_STAGES`.
    fn b() -> ArrayView1<'static, f64>;
}

/// Classical fourth-order Runge–Kutta method.
///
/// Four evaluations per step, none of them shared with the next step. Local
/// error is O(h^5) and global error O(h^4).
pub struct RK4;

impl RKMethod for RK4 {
    const ORDER: usize = 4;

    const NUM_STAGES: usize = 4;

    fn c() -> ArrayView1<'static, f64> {
        aview1(&[1./2., 1./2., 1.])
    }

    fn a() -> &'static [ArrayView1<'static, f64>] {
        lazy_static! {
            static ref A: [ArrayView1<'static, f64>; 4 - 1] = [
                aview1(&[1./2.]),
                aview1(&[0., 1./2.]),
                aview1(&[0., 0., 1.]),
            ];
        }
        &*A
    }

    fn b() -> ArrayView1<'static, f64> {
        aview1(&[1./6., 1./3., 1./3., 1./6.])
    }
}

/// Explicit midpoint method of order 2.
pub struct Midpoint;

impl RKMethod for Midpoint {
    const ORDER: usize = 2;

    const NUM_STAGES: usize = 2;

    fn c() -> ArrayView1<'static, f64> {
        aview1(&[1./2.])
    }

    fn a() -> &'static [ArrayView1<'static, f64>] {
        lazy_static! {
            static ref A: [ArrayView1<'static, f64>; 2 - 1] = [aview1(&[1./2.])];
        }
        &*A
    }

    fn b() -> ArrayView1<'static, f64> {
        aview1(&[0., 1.])
    }
}

/// Forward Euler method.
pub struct Euler;

impl RKMethod for Euler {
    const ORDER: usize = 1;

    const NUM_STAGES: usize = 1;

    fn c() -> ArrayView1<'static, f64> {
        aview1(&[])
    }

    fn a() -> &'static [ArrayView1<'static, f64>] {
        &[]
    }

    fn b() -> ArrayView1<'static, f64> {
        aview1(&[1.])
    }
}
