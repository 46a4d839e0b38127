//! Grid Solver Module
//!
//! Drives a fixed-step peroxide [`ODEIntegrator`] across an arbitrary,
//! possibly non-uniform time grid with tolerance-controlled step sizes.
//!
//! # Step Control
//!
//! Every internal step of size `h` is taken twice: once as a single step and
//! once as two steps of `h/2`. The difference between both results estimates
//! the local error of the more accurate half-step solution,
//!
//! ```text
//! err = max_i |y_half_i - y_full_i| / (2^p - 1) / (atol + rtol · max(|y_i|, |y_half_i|))
//! ```
//!
//! with `p` the order configured in the [`IntegrationSetup`]. Steps with
//! `err <= 1` are accepted, and the next step size is scaled by
//! `0.9 · err^(-1/(p+1))`, limited to the range `[0.2, 5]`. Steps are clipped
//! so that every grid point is hit exactly, so the trajectory is never
//! interpolated.

use log::{info, trace};
use ndarray::{Array2, ArrayView1};
use peroxide::fuga::{ODEIntegrator, ODEProblem};

use super::error::SimulationError;
use super::setup::IntegrationSetup;

const SAFETY: f64 = 0.9;
const MIN_FACTOR: f64 = 0.2;
const MAX_FACTOR: f64 = 5.0;
/// Fraction of the grid span used as first trial step when none is configured
const INITIAL_STEP_FRACTION: f64 = 1e-3;

/// Trajectory and step statistics of one integration run
#[derive(Debug, Clone, PartialEq)]
pub struct GridSolution {
    /// State at every grid point, shape (time × state)
    pub trajectory: Array2<f64>,
    pub accepted_steps: usize,
    pub rejected_steps: usize,
}

/// Integrates `problem` from `y0` across `times`.
///
/// # Arguments
///
/// * `problem` - The derivative function
/// * `integrator` - Single-step scheme, e.g. `RK5::default()`
/// * `y0` - State at `times[0]`
/// * `times` - Non-empty, strictly increasing output grid
/// * `setup` - Tolerances and step controls
///
/// # Returns
///
/// Returns the trajectory with one row per grid point, the first row being
/// `y0`, or the [`SimulationError`] that stopped the integration.
pub fn integrate_grid<P, S>(
    problem: &P,
    integrator: S,
    y0: &[f64],
    times: &[f64],
    setup: &IntegrationSetup,
) -> Result<GridSolution, SimulationError>
where
    P: ODEProblem,
    S: ODEIntegrator,
{
    setup.validate()?;

    let (Some(&t_start), Some(&t_end)) = (times.first(), times.last()) else {
        return Err(SimulationError::InvalidSetup(
            "time grid must contain at least one point".to_string(),
        ));
    };

    info!(
        "Integrating {} states over {} grid points in [{}, {}] (rtol = {:e}, atol = {:e})",
        y0.len(),
        times.len(),
        t_start,
        t_end,
        setup.rtol,
        setup.atol
    );

    let mut trajectory = Array2::zeros((times.len(), y0.len()));
    check_finite(ArrayView1::from(y0), t_start)?;
    trajectory.row_mut(0).assign(&ArrayView1::from(y0));

    let order = setup.order as f64;
    let error_scale = 2f64.powf(order) - 1.0;
    let exponent = -1.0 / (order + 1.0);

    let mut y = y0.to_vec();
    let mut t = t_start;
    let mut h = setup
        .initial_step
        .unwrap_or(((t_end - t_start) * INITIAL_STEP_FRACTION).max(setup.min_step));

    let mut attempts = 0;
    let mut accepted_steps = 0;
    let mut rejected_steps = 0;

    for (k, &target) in times.iter().enumerate().skip(1) {
        while t < target {
            if attempts >= setup.max_steps {
                return Err(SimulationError::MaxStepsExceeded {
                    max_steps: setup.max_steps,
                    target,
                });
            }
            attempts += 1;

            let remaining = target - t;
            let clipped = h >= remaining;
            let step = if clipped { remaining } else { h };

            let mut full = y.clone();
            take_step(&integrator, problem, t, &mut full, step)?;

            let mut half = y.clone();
            take_step(&integrator, problem, t, &mut half, step / 2.0)?;
            take_step(&integrator, problem, t + step / 2.0, &mut half, step / 2.0)?;

            let error = y
                .iter()
                .zip(half.iter().zip(full.iter()))
                .map(|(y, (half, full))| {
                    (half - full).abs() / error_scale / (setup.atol + setup.rtol * y.abs().max(half.abs()))
                })
                .map(|e| if e.is_nan() { f64::INFINITY } else { e })
                .fold(0.0, f64::max);

            if error <= 1.0 {
                y = half;
                t = if clipped { target } else { t + step };
                accepted_steps += 1;

                let factor = if error == 0.0 {
                    MAX_FACTOR
                } else {
                    (SAFETY * error.powf(exponent)).clamp(MIN_FACTOR, MAX_FACTOR)
                };

                if !(clipped && step < h) {
                    h = step * factor;
                }
            } else {
                rejected_steps += 1;

                let factor = if error.is_finite() {
                    (SAFETY * error.powf(exponent)).clamp(MIN_FACTOR, 1.0)
                } else {
                    MIN_FACTOR
                };
                h = step * factor;

                trace!(
                    "Rejected step of {:e} at t = {} (error = {:e}), retrying with {:e}",
                    step,
                    t,
                    error,
                    h
                );

                if h < setup.min_step {
                    check_finite(ArrayView1::from(half.as_slice()), t)?;
                    return Err(SimulationError::StepSizeUnderflow {
                        t,
                        min_step: setup.min_step,
                    });
                }
            }
        }

        check_finite(ArrayView1::from(y.as_slice()), t)?;
        trajectory.row_mut(k).assign(&ArrayView1::from(y.as_slice()));
    }

    info!(
        "Integration finished with {} accepted and {} rejected steps",
        accepted_steps, rejected_steps
    );

    Ok(GridSolution {
        trajectory,
        accepted_steps,
        rejected_steps,
    })
}

fn take_step<P, S>(
    integrator: &S,
    problem: &P,
    t: f64,
    y: &mut [f64],
    dt: f64,
) -> Result<(), SimulationError>
where
    P: ODEProblem,
    S: ODEIntegrator,
{
    let taken = integrator
        .step(problem, t, y, dt)
        .map_err(|e| SimulationError::Integrator {
            t,
            message: e.to_string(),
        })?;

    if taken != dt {
        return Err(SimulationError::StepMismatch {
            t,
            requested: dt,
            taken,
        });
    }

    Ok(())
}

fn check_finite(y: ArrayView1<f64>, t: f64) -> Result<(), SimulationError> {
    match y.iter().position(|value| !value.is_finite()) {
        Some(index) => Err(SimulationError::NonFiniteState { t, index }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use peroxide::fuga::{RK4, RK5};

    struct Decay {
        k: f64,
    }

    impl ODEProblem for Decay {
        fn rhs(&self, _t: f64, y: &[f64], dy: &mut [f64]) -> anyhow::Result<()> {
            dy[0] = -self.k * y[0];
            dy[1] = self.k * y[0];
            Ok(())
        }
    }

    /// Single-step scheme that only ever advances half of the requested step
    struct Shortening;

    impl ODEIntegrator for Shortening {
        fn step<P: ODEProblem>(&self, problem: &P, t: f64, y: &mut [f64], dt: f64) -> anyhow::Result<f64> {
            RK4::default().step(problem, t, y, dt / 2.0)
        }
    }

    /// dy/dt = y², y(0) = 1 diverges at t = 1
    struct BlowUp;

    impl ODEProblem for BlowUp {
        fn rhs(&self, _t: f64, y: &[f64], dy: &mut [f64]) -> anyhow::Result<()> {
            dy[0] = y[0] * y[0];
            Ok(())
        }
    }

    #[test]
    fn test_decay_matches_closed_form() {
        let times = [0.0, 0.1, 0.5, 1.3, 2.0, 7.5];
        let setup = IntegrationSetup::with_tolerances(Some(1e-10), Some(1e-12));
        let solution =
            integrate_grid(&Decay { k: 0.8 }, RK5::default(), &[2.0, 0.0], &times, &setup).unwrap();

        assert_eq!(solution.trajectory.nrows(), times.len());
        for (row, t) in solution.trajectory.outer_iter().zip(times.iter()) {
            let expected = 2.0 * (-0.8 * t).exp();
            assert_relative_eq!(row[0], expected, max_relative = 1e-7);
            assert_relative_eq!(row[0] + row[1], 2.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_single_point_returns_initial_state() {
        let setup = IntegrationSetup::default();
        let solution =
            integrate_grid(&Decay { k: 1.0 }, RK4::default(), &[1.0, 0.5], &[3.0], &setup).unwrap();

        assert_eq!(solution.trajectory.shape(), &[1, 2]);
        assert_eq!(solution.trajectory[[0, 1]], 0.5);
        assert_eq!(solution.accepted_steps, 0);
    }

    #[test]
    fn test_max_steps_exceeded() {
        let setup = IntegrationSetup {
            max_steps: 3,
            initial_step: Some(1e-3),
            ..Default::default()
        };
        let result = integrate_grid(&Decay { k: 1.0 }, RK4::default(), &[1.0, 0.0], &[0.0, 100.0], &setup);

        assert_eq!(
            result,
            Err(SimulationError::MaxStepsExceeded {
                max_steps: 3,
                target: 100.0
            })
        );
    }

    #[test]
    fn test_blow_up_is_reported() {
        let setup = IntegrationSetup::default();
        let result = integrate_grid(&BlowUp, RK4::default(), &[1.0], &[0.0, 2.0], &setup);

        assert!(matches!(
            result,
            Err(SimulationError::StepSizeUnderflow { .. })
                | Err(SimulationError::NonFiniteState { .. })
                | Err(SimulationError::MaxStepsExceeded { .. })
        ));
    }

    #[test]
    fn test_non_finite_initial_state() {
        let setup = IntegrationSetup::default();
        let result = integrate_grid(&Decay { k: 1.0 }, RK4::default(), &[1.0, f64::NAN], &[0.0, 1.0], &setup);
        assert_eq!(result, Err(SimulationError::NonFiniteState { t: 0.0, index: 1 }));
    }

    #[test]
    fn test_shortened_step_is_rejected() {
        let setup = IntegrationSetup {
            initial_step: Some(0.1),
            ..Default::default()
        };
        let result = integrate_grid(&Decay { k: 1.0 }, Shortening, &[1.0, 0.0], &[0.0, 1.0], &setup);

        assert_eq!(
            result,
            Err(SimulationError::StepMismatch {
                t: 0.0,
                requested: 0.1,
                taken: 0.05
            })
        );
    }

    #[test]
    fn test_invalid_setup_is_rejected() {
        let setup = IntegrationSetup::with_tolerances(Some(0.0), None);
        let result = integrate_grid(&Decay { k: 1.0 }, RK4::default(), &[1.0, 0.0], &[0.0, 1.0], &setup);
        assert!(matches!(result, Err(SimulationError::InvalidTolerance { name: "rtol", .. })));
    }
}
