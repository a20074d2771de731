/*
    crtbp, Circular Restricted Three-Body Problem toolkit
    Copyright (C) 2026 crtbp contributors

    This program is free software: you can redistribute it and/or modify
    it under the terms of the GNU Affero General Public License as published
    by the Free Software Foundation, either version 3 of the License, or
    (at your option) any later version.

    This program is distributed in the hope that it will be useful,
    but WITHOUT ANY WARRANTY; without even the implied warranty of
    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
    GNU Affero General Public License for more details.

    You should have received a copy of the GNU Affero General Public License
    along with this program.  If not, see <https://www.gnu.org/licenses/>.
*/

use super::error_ctrl::scaled_rms;
use super::{Dormand45, Fehlberg54, IntegMethod, IntegrationDetails, PropOpts, Verner56, RK};
use crate::dynamics::Dynamics;
use crate::errors::{IntegrationFailureSnafu, InvalidInputSnafu};
use crate::linalg::allocator::Allocator;
use crate::linalg::{DefaultAllocator, OVector};
use crate::md::events::{Crossing, EventEvaluator};
use crate::CrtbpError;
use snafu::prelude::*;

/// A Propagator allows propagating a set of dynamics forward in time.
/// It stores the integration options and the Butcher table coefficients of
/// the selected method; each propagation runs on its own `PropInstance`.
#[derive(Clone, Debug)]
pub struct Propagator<'a, D: Dynamics>
where
    DefaultAllocator: Allocator<D::VecLength>,
{
    pub dynamics: D,
    pub opts: PropOpts,
    order: u8,
    stages: usize,
    a_coeffs: &'a [f64],
    b_coeffs: &'a [f64],
}

impl<'a, D: Dynamics> Propagator<'a, D>
where
    DefaultAllocator: Allocator<D::VecLength>,
{
    /// Each propagator must be initialized with `new` which stores the
    /// integrator coefficients.
    pub fn new<T: RK>(dynamics: D, opts: PropOpts) -> Self {
        Self {
            dynamics,
            opts,
            stages: T::STAGES,
            order: T::ORDER,
            a_coeffs: T::A_COEFFS,
            b_coeffs: T::B_COEFFS,
        }
    }

    /// Builds a propagator from a runtime method selection.
    pub fn from_method(dynamics: D, method: IntegMethod, opts: PropOpts) -> Self {
        match method {
            IntegMethod::Dormand45 => Self::new::<Dormand45>(dynamics, opts),
            IntegMethod::Fehlberg54 => Self::new::<Fehlberg54>(dynamics, opts),
            IntegMethod::Verner56 => Self::new::<Verner56>(dynamics, opts),
        }
    }

    /// A Dormand-Prince 5(4) propagator with custom options.
    pub fn dormand45(dynamics: D, opts: PropOpts) -> Self {
        Self::new::<Dormand45>(dynamics, opts)
    }

    /// Default propagator is a Dormand-Prince 5(4) with the default options.
    pub fn default(dynamics: D) -> Self {
        Self::new::<Dormand45>(dynamics, PropOpts::default())
    }

    /// Creates a propagation instance owning its state and STM buffers;
    /// instances never share state with each other.
    pub fn with(&'a self, state: OVector<f64, D::VecLength>) -> PropInstance<'a, D> {
        // Pre-allocate the k used in the propagator
        let mut k = Vec::with_capacity(self.stages);
        for _ in 0..self.stages {
            k.push(OVector::<f64, D::VecLength>::zeros());
        }
        PropInstance {
            state,
            t: 0.0,
            prop: self,
            details: IntegrationDetails {
                step: self.opts.init_step,
                error: 0.0,
                attempts: 1,
            },
            step_size: self.opts.init_step,
            fixed_step: self.opts.fixed_step,
            k,
        }
    }
}

/// A single propagation run: owns its state exclusively, advances it step
/// by step, and tracks the details of the latest integration step.
#[derive(Clone, Debug)]
pub struct PropInstance<'a, D: Dynamics>
where
    DefaultAllocator: Allocator<D::VecLength>,
{
    /// The state of this propagator instance
    pub state: OVector<f64, D::VecLength>,
    /// The propagator setup (method, stages, options)
    pub prop: &'a Propagator<'a, D>,
    /// Stores the details of the previous integration step
    pub details: IntegrationDetails,
    t: f64,
    step_size: f64, // Stores the adapted step for the _next_ call
    fixed_step: bool,
    // Allows pre-allocation of the ki vectors
    k: Vec<OVector<f64, D::VecLength>>,
}

impl<'a, D: Dynamics> PropInstance<'a, D>
where
    DefaultAllocator: Allocator<D::VecLength>,
{
    /// Time since the start of this propagation, in TU.
    pub fn time(&self) -> f64 {
        self.t
    }

    /// Allows setting the step size of the propagator
    pub fn set_step(&mut self, step_size: f64, fixed: bool) {
        self.step_size = step_size;
        self.fixed_step = fixed;
    }

    /// Propagates the dynamics forward for the provided duration (TU) and
    /// returns the end state, landing exactly on the stop time.
    pub fn for_duration(&mut self, duration: f64) -> Result<OVector<f64, D::VecLength>, CrtbpError> {
        ensure!(
            duration >= 0.0 && duration.is_finite(),
            InvalidInputSnafu {
                reason: format!("propagation duration must be non-negative, got {duration}"),
            }
        );
        if duration == 0.0 {
            return Ok(self.state.clone());
        }
        let stop_time = self.t + duration;
        loop {
            if self.t + self.step_size > stop_time {
                if stop_time == self.t {
                    // No propagation necessary
                    return Ok(self.state.clone());
                }
                // Take one final step of exactly the needed duration
                let prev_step_size = self.step_size;
                let prev_step_kind = self.fixed_step;
                self.set_step(stop_time - self.t, true);

                self.single_step()?;

                // Restore the step size for subsequent calls
                self.set_step(prev_step_size, prev_step_kind);
                // Kill the accumulated roundoff on the landing time
                self.t = stop_time;
                return Ok(self.state.clone());
            } else {
                self.single_step()?;
            }
        }
    }

    /// Samples the propagation at the provided non-decreasing times (TU
    /// from the instance start), taking exact landing steps on each.
    pub fn sample(&mut self, times: &[f64]) -> Result<Vec<OVector<f64, D::VecLength>>, CrtbpError> {
        let mut samples = Vec::with_capacity(times.len());
        for &ti in times {
            let dt = ti - self.t;
            if dt.abs() < f64::EPSILON {
                samples.push(self.state.clone());
            } else {
                ensure!(
                    dt > 0.0,
                    InvalidInputSnafu {
                        reason: format!("sample times must be non-decreasing (got {ti})"),
                    }
                );
                samples.push(self.for_duration(dt)?);
            }
        }
        Ok(samples)
    }

    /// Propagates until `max_t` TU past the current time and records every
    /// zero crossing of the event function, each refined by bisection over
    /// its bracketing step. An empty result means no crossing occurred.
    pub fn until_all_events<E: EventEvaluator<D::VecLength>>(
        &mut self,
        max_t: f64,
        event: &E,
    ) -> Result<Vec<Crossing<D::VecLength>>, CrtbpError> {
        ensure!(
            max_t > 0.0 && max_t.is_finite(),
            InvalidInputSnafu {
                reason: format!("event search span must be positive, got {max_t}"),
            }
        );
        info!("searching for {event} over {max_t:.6} TU");
        let stop_time = self.t + max_t;
        let mut crossings = Vec::new();
        let mut prev_t = self.t;
        let mut prev_state = self.state.clone();
        let mut prev_value = event.eval(prev_t, &prev_state);

        while self.t < stop_time {
            if self.t + self.step_size > stop_time {
                let prev_step_size = self.step_size;
                let prev_step_kind = self.fixed_step;
                self.set_step(stop_time - self.t, true);
                self.single_step()?;
                self.set_step(prev_step_size, prev_step_kind);
                self.t = stop_time;
            } else {
                self.single_step()?;
            }

            let value = event.eval(self.t, &self.state);
            if prev_value * value < 0.0 {
                let crossing = self.locate_crossing(event, prev_t, prev_state.clone(), self.t)?;
                debug!("{event} crossing at t = {:.12} TU", crossing.t);
                crossings.push(crossing);
            } else if value == 0.0 && self.t > prev_t {
                // Landed exactly on the zero
                crossings.push(Crossing {
                    t: self.t,
                    state: self.state.clone(),
                });
            }
            prev_t = self.t;
            prev_state.copy_from(&self.state);
            prev_value = value;
        }
        Ok(crossings)
    }

    /// Bisects the bracketing step [t0, t1], regenerating each midpoint
    /// state with a single exact step from the bracket start. The bracket
    /// never exceeds one accepted adaptive step, so the fixed midpoint step
    /// stays within the step control's accepted error.
    fn locate_crossing<E: EventEvaluator<D::VecLength>>(
        &self,
        event: &E,
        mut t0: f64,
        mut s0: OVector<f64, D::VecLength>,
        mut t1: f64,
    ) -> Result<Crossing<D::VecLength>, CrtbpError> {
        let mut g0 = event.eval(t0, &s0);
        loop {
            let tm = 0.5 * (t0 + t1);
            let mut inst = self.prop.with(s0.clone());
            inst.t = t0;
            inst.set_step(tm - t0, true);
            inst.single_step()?;
            let sm = inst.state;
            let gm = event.eval(tm, &sm);

            if gm.abs() < event.value_precision() || t1 - t0 <= event.time_precision() {
                return Ok(Crossing { t: tm, state: sm });
            }
            if g0 * gm < 0.0 {
                t1 = tm;
            } else {
                t0 = tm;
                s0 = sm;
                g0 = gm;
            }
        }
    }

    /// Take a single propagator step.
    pub fn single_step(&mut self) -> Result<(), CrtbpError> {
        let (dt, next_state) = self.derive()?;
        self.t += dt;
        self.state = next_state;
        Ok(())
    }

    /// Integrates one step of the dynamics, adapting the step size until
    /// the scaled error norm is within tolerance.
    ///
    /// Returns the step size used and the new state.
    fn derive(&mut self) -> Result<(f64, OVector<f64, D::VecLength>), CrtbpError> {
        let state = self.state.clone();
        // Reset the number of attempts used (the error is set before read)
        self.details.attempts = 1;
        let mut step_size = self.step_size;
        loop {
            self.k[0] = self.prop.dynamics.eom(self.t, &state)?;
            let mut a_idx: usize = 0;
            for i in 0..(self.prop.stages - 1) {
                // c_i by summing the relevant a_ij coefficients:
                // \sum_{j=1}^{i-1} a_ij  for all i in [2, s]
                let mut ci: f64 = 0.0;
                let mut wi = OVector::<f64, D::VecLength>::zeros();
                for kj in &self.k[0..i + 1] {
                    let a_ij = self.prop.a_coeffs[a_idx];
                    ci += a_ij;
                    wi += kj * a_ij;
                    a_idx += 1;
                }

                let ki = self
                    .prop
                    .dynamics
                    .eom(self.t + ci * step_size, &(&state + &wi * step_size))?;
                self.k[i + 1] = ki;
            }
            // Compute the next state and the embedded error estimate
            let mut next_state = state.clone();
            let mut error_est = OVector::<f64, D::VecLength>::zeros();
            for (i, ki) in self.k.iter().enumerate() {
                let b_i = self.prop.b_coeffs[i];
                if !self.fixed_step {
                    let b_i_star = self.prop.b_coeffs[i + self.prop.stages];
                    error_est += ki * (step_size * (b_i - b_i_star));
                }
                next_state += ki * (step_size * b_i);
            }

            if self.fixed_step {
                self.details.step = step_size;
                return Ok((step_size, next_state));
            }

            self.details.error = scaled_rms(
                &error_est,
                &next_state,
                &state,
                self.prop.opts.atol,
                self.prop.opts.rtol,
            );
            if self.details.error <= 1.0 {
                self.details.step = step_size;
                if self.details.error < 1.0 {
                    // Attempt to increase the step for the next iteration
                    let proposed_step = 0.9
                        * step_size
                        * (1.0 / self.details.error).powf(1.0 / f64::from(self.prop.order));
                    step_size = proposed_step.min(self.prop.opts.max_step);
                }
                self.step_size = step_size;
                return Ok((self.details.step, next_state));
            }

            // Error too high: shrink the step, or give up if the step
            // collapsed or the retry budget is exhausted
            if step_size <= self.prop.opts.min_step
                || self.details.attempts >= self.prop.opts.attempts
            {
                warn!(
                    "step control stalled at t = {} TU: error {:.3e}, step {:e}, attempts {}",
                    self.t, self.details.error, step_size, self.details.attempts
                );
                return IntegrationFailureSnafu {
                    t: self.t,
                    reason: format!(
                        "scaled error {:.3e} above tolerance at step {:e}",
                        self.details.error, step_size
                    ),
                }
                .fail();
            }
            self.details.attempts += 1;
            let proposed_step = 0.9
                * step_size
                * (1.0 / self.details.error).powf(1.0 / f64::from(self.prop.order - 1));
            step_size = proposed_step.max(self.prop.opts.min_step);
        }
    }

    /// Borrow the details of the latest integration step.
    pub fn latest_details(&self) -> &IntegrationDetails {
        &self.details
    }
}
