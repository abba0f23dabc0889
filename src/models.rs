//! Reference right-hand sides with closed-form solutions.

use ndarray::prelude::*;
use thiserror::Error;

/// Gravitational acceleration near the Earth's surface, pointing down (m/s^2).
pub const GRAVITY: f64 = -9.8;

#[derive(Clone, Debug, Error, PartialEq)]
pub enum ModelError {
    #[error("mass {0} is not positive and finite")]
    InvalidMass(f64),
    #[error("drag coefficient {0} is negative or not finite")]
    InvalidDrag(f64),
}

/// Vertical fall with optional linear air resistance.
///
/// The state is `[height, velocity]`:
///
/// ```text
/// dx/dt = v
/// dv/dt = g - (b / m) v
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FallingBall {
    /// Acceleration due to gravity (m/s^2), negative for "down".
    pub gravity: f64,
    /// Linear damping coefficient `b` (kg/s).
    pub drag: f64,
    /// Mass `m` (kg).
    pub mass: f64,
}

impl FallingBall {
    /// No air resistance.
    pub fn in_vacuum() -> FallingBall {
        FallingBall {
            gravity: GRAVITY,
            drag: 0.,
            mass: 1.,
        }
    }

    /// A 0.5 kg ball with damping coefficient 0.2 kg/s.
    pub fn with_air_resistance() -> FallingBall {
        FallingBall {
            gravity: GRAVITY,
            drag: 0.2,
            mass: 0.5,
        }
    }

    pub fn with_drag(drag: f64, mass: f64) -> Result<FallingBall, ModelError> {
        if !(mass > 0. && mass.is_finite()) {
            return Err(ModelError::InvalidMass(mass));
        }
        if !(drag >= 0. && drag.is_finite()) {
            return Err(ModelError::InvalidDrag(drag));
        }
        Ok(FallingBall {
            gravity: GRAVITY,
            drag,
            mass,
        })
    }

    /// `b / m`, in 1/s.
    pub fn damping_rate(&self) -> f64 {
        self.drag / self.mass
    }

    /// Right-hand side, in the form expected by the integrators.
    ///
    /// # Panics
    ///
    /// Panics if `y` or `dydt` has fewer than two elements.
    pub fn rhs(&self, _t: f64, y: ArrayView1<f64>, mut dydt: ArrayViewMut1<f64>) {
        let v = y[1];
        dydt[0] = v;
        dydt[1] = self.gravity - self.damping_rate() * v;
    }

    /// Exact `(height, velocity)` at time `t` for a ball released at `t = 0`
    /// from height `x0` with velocity `v0`.
    pub fn exact(&self, x0: f64, v0: f64, t: f64) -> (f64, f64) {
        let k = self.damping_rate();
        let g = self.gravity;
        if k == 0. {
            (x0 + v0 * t + 0.5 * g * t * t, v0 + g * t)
        } else {
            let terminal = g / k;
            // 1 - exp(-kt), accurate for small kt.
            let decay = -(-k * t).exp_m1();
            (
                x0 + terminal * t + (v0 - terminal) * decay / k,
                terminal + (v0 - terminal) * (1. - decay),
            )
        }
    }

    /// Time at which a ball released from rest at height `x0` in vacuum
    /// reaches the ground.
    pub fn vacuum_impact_time(&self, x0: f64) -> f64 {
        (2. * x0 / -self.gravity).sqrt()
    }
}
