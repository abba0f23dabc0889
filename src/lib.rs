//! Fixed-step Runge–Kutta integration of ODE initial value problems over a
//! caller-supplied time grid, with early termination when the state reaches
//! a boundary.

pub mod grid;
pub mod models;
pub mod rk;
pub mod stop;
pub mod trajectory;

use ndarray::prelude::*;
use std::convert::Infallible;

pub use crate::rk::{IntegrateError, IntegrateOptions, RungeKutta, RK4};
pub use crate::stop::{GroundContact, NeverStop, StopCondition};
pub use crate::trajectory::Trajectory;

pub trait OdeIntegrate {
    type Error;

    /// Returns the number of elements in the state.
    fn len(&self) -> usize;
    /// Perform one step on the grid.
    fn step(&mut self) -> Result<(), Self::Error>;
    /// Current time.
    fn time(&self) -> f64;
    /// The last time of the grid.
    fn time_bound(&self) -> f64;
    /// Current state.
    fn state(&self) -> ArrayView1<'_, f64>;
    /// Returns `true` if the grid is exhausted or the stop condition fired.
    fn finished(&self) -> bool;
    /// Integrate until `finished` returns `true`.
    fn run_to_bound(&mut self) -> Result<(), Self::Error> {
        while !self.finished() {
            self.step()?;
        }
        Ok(())
    }
}

/// Integrates `fun` over `times` with the classical RK4 method, stopping
/// after the first step whose height (component 0) is `<= 0`.
///
/// # Parameters
///
/// * `fun`: Right-hand side of the system, where calling `fun(t, y,
///   deriv_y)` should fill in `deriv_y` with the derivative of `y` at time
///   `t`.
///
/// * `y0`: Initial state. It is copied verbatim into row 0 of the result.
///
/// * `times`: Sample times. They are assumed to be spaced by `h`; neither
///   the spacing nor the ordering is checked.
///
/// * `h`: Step size.
///
/// Non-finite values produced by `fun` are carried through the trajectory
/// without being reported. Use `try_integrate` with
/// `IntegrateOptions::check_finite` to turn them into errors.
pub fn integrate<F>(
    mut fun: F,
    y0: ArrayView1<f64>,
    times: ArrayView1<f64>,
    h: f64,
) -> Result<Trajectory, IntegrateError>
where
    F: FnMut(f64, ArrayView1<f64>, ArrayViewMut1<f64>),
{
    try_integrate(
        move |t, y, dy| {
            fun(t, y, dy);
            Ok::<(), Infallible>(())
        },
        y0,
        times,
        h,
        GroundContact::default(),
        IntegrateOptions::default(),
    )
}

/// Like `integrate`, but with a fallible right-hand side, a custom stop
/// condition and extra input checks.
///
/// An error returned by `fun` ends the run immediately and comes back as
/// `IntegrateError::Derivative`, untouched.
pub fn try_integrate<F, S, E>(
    fun: F,
    y0: ArrayView1<f64>,
    times: ArrayView1<f64>,
    h: f64,
    stop: S,
    options: IntegrateOptions,
) -> Result<Trajectory, IntegrateError<E>>
where
    F: FnMut(f64, ArrayView1<f64>, ArrayViewMut1<f64>) -> Result<(), E>,
    S: StopCondition,
{
    let mut solver = RungeKutta::<F, RK4, S, E>::new(
        fun,
        y0.to_owned(),
        times.to_owned(),
        h,
        stop,
        options,
    )?;
    solver.run_to_bound()?;
    Ok(solver.into_trajectory())
}
