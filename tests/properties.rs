//! Property tests for the fixed-step integrator.
//!
//! Reproduce a failure with `PROPTEST_SEED=<seed> cargo test --test properties`.

use ndarray::{array, prelude::*, s};
use proptest::prelude::*;

use ndarray_rk4::grid::uniform_grid;
use ndarray_rk4::integrate;
use ndarray_rk4::models::FallingBall;

fn run(x0: f64, v0: f64, drag: f64, h: f64, n: usize) -> ndarray_rk4::Trajectory {
    let ball = FallingBall::with_drag(drag, 0.5).unwrap();
    let times = uniform_grid(0., h, n).unwrap();
    integrate(
        |t, y, dy| ball.rhs(t, y, dy),
        array![x0, v0].view(),
        times.view(),
        h,
    )
    .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn initial_state_is_preserved(
        x0 in -100.0f64..100.0,
        v0 in -50.0f64..50.0,
        drag in 0.0f64..1.0,
        h in 1e-3f64..0.1,
        n in 1usize..300,
    ) {
        let traj = run(x0, v0, drag, h, n);
        prop_assert_eq!(traj.state(0).unwrap(), array![x0, v0]);
    }

    #[test]
    fn runs_are_deterministic(
        x0 in 0.0f64..100.0,
        v0 in -50.0f64..50.0,
        drag in 0.0f64..1.0,
        h in 1e-3f64..0.1,
        n in 1usize..300,
    ) {
        prop_assert_eq!(run(x0, v0, drag, h, n), run(x0, v0, drag, h, n));
    }

    #[test]
    fn stops_exactly_at_the_first_crossing(
        x0 in 0.1f64..100.0,
        v0 in -50.0f64..50.0,
        drag in 0.0f64..1.0,
        h in 1e-3f64..0.1,
        n in 1usize..800,
    ) {
        let traj = run(x0, v0, drag, h, n);
        let heights = traj.component(0);
        prop_assert!(heights.slice(s![..traj.len() - 1]).iter().all(|&x| x > 0.));
        prop_assert_eq!(traj.nfev(), 4 * (traj.len() - 1));
        match traj.stop_index() {
            Some(stop) => {
                prop_assert_eq!(stop, traj.len() - 1);
                prop_assert!(heights[stop] <= 0.);
                prop_assert!(traj.full_states().slice(s![stop + 1.., ..]).iter().all(|&x| x == 0.));
            }
            None => {
                prop_assert_eq!(traj.len(), n);
                prop_assert!(!traj.stopped_early());
            }
        }
    }
}
