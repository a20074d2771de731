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

use crate::cosmic::State;
use crate::dynamics::{augment, split, VariationalDynamics};
use crate::errors::{
    ConvergenceNotReachedSnafu, EventNotFoundSnafu, InvalidInputSnafu, SingularCorrectionSnafu,
};
use crate::linalg::{Matrix2, Matrix6, RowVector2, Vector2};
use crate::md::events::PlaneCrossing;
use crate::propagators::Propagator;
use crate::CrtbpError;
use serde_derive::{Deserialize, Serialize};
use snafu::prelude::*;
use std::fmt;

/// Which state component is held fixed by the single-shot corrector; the
/// other two free components absorb the correction.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FixedVariable {
    X,
    Vy,
    Vz,
}

impl FixedVariable {
    /// Indices of the two free components in the 6-state.
    fn free_indices(self) -> (usize, usize) {
        match self {
            FixedVariable::X => (4, 5),
            FixedVariable::Vy => (0, 5),
            FixedVariable::Vz => (0, 4),
        }
    }
}

impl fmt::Display for FixedVariable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FixedVariable::X => write!(f, "x"),
            FixedVariable::Vy => write!(f, "vy"),
            FixedVariable::Vz => write!(f, "vz"),
        }
    }
}

/// Absolute change of each adjusted component relative to the input guess.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CorrectionDeltas {
    pub x: f64,
    pub vy: f64,
    pub vz: f64,
}

impl CorrectionDeltas {
    fn between(guess: &State, corrected: &State) -> Self {
        Self {
            x: (guess.x - corrected.x).abs(),
            vy: (guess.vy - corrected.vy).abs(),
            vz: (guess.vz - corrected.vz).abs(),
        }
    }
}

/// Defines a corrector solution.
///
/// One instance is produced per corrector call; feeding `corrected_state`
/// and `period` back in continues an externally driven iteration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CorrectionSolution {
    /// The corrected state, barycentric.
    pub corrected_state: State,
    /// The full period estimate, i.e. twice the refined crossing time.
    pub period: f64,
    /// Convergence deltas relative to the input guess.
    pub deltas: CorrectionDeltas,
    /// |vx| at the half-period crossing of the *input* guess.
    pub residual_vx: f64,
    /// |vz| at the half-period crossing of the *input* guess.
    pub residual_vz: f64,
    /// The number of half-period propagations used.
    pub iterations: usize,
}

impl fmt::Display for CorrectionSolution {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(
            f,
            "Corrector solution ({} iterations):\n\tcorrected state: {}\n\tperiod: {:.12} TU",
            self.iterations, self.corrected_state, self.period
        )?;
        write!(
            f,
            "\t|dx| = {:.3e}, |dvy| = {:.3e}, |dvz| = {:.3e}\n\tresiduals: |vx| = {:.3e}, |vz| = {:.3e}",
            self.deltas.x, self.deltas.vy, self.deltas.vz, self.residual_vx, self.residual_vz
        )
    }
}

/// The differential corrector refines a periodic-orbit guess until the
/// half-period crossing is perpendicular (vx = vz = 0 at y = 0).
///
/// Inputs are barycentric and never mutated; the STM is re-initialized to
/// the identity before every half-period arc.
#[derive(Clone)]
pub struct Corrector<'a> {
    /// The propagator setup used for the STM-augmented arcs.
    pub prop: &'a Propagator<'a, VariationalDynamics>,
    /// Residual tolerance on |vx| and |vz| at the crossing.
    pub tolerance: f64,
    /// Maximum number of Newton iterations.
    pub max_iterations: usize,
}

impl<'a> Corrector<'a> {
    /// Tolerance used by the single-shot, externally iterated mode.
    pub const SINGLE_SHOT_TOL: f64 = 1e-10;
    /// Tolerance used by the internally looping mode.
    pub const ITERATIVE_TOL: f64 = 1e-11;

    pub fn new(prop: &'a Propagator<'a, VariationalDynamics>) -> Self {
        Self {
            prop,
            tolerance: Self::SINGLE_SHOT_TOL,
            max_iterations: 20,
        }
    }

    /// Propagates the STM-augmented guess over `span` TU, selects the y = 0
    /// crossing nearest span/2, and returns the STM and state there along
    /// with the doubled crossing time.
    fn half_period_arc(
        &self,
        guess: &State,
        span: f64,
    ) -> Result<(Matrix6<f64>, State, f64), CrtbpError> {
        let mut instance = self.prop.with(augment(&guess.to_vector()));
        let crossings = instance.until_all_events(span, &PlaneCrossing)?;

        let half = span / 2.0;
        let nearest = crossings
            .into_iter()
            .min_by(|a, b| (a.t - half).abs().total_cmp(&(b.t - half).abs()))
            .context(EventNotFoundSnafu { span })?;

        let (stm, mid) = split(&nearest.state);
        Ok((stm, State::from_vector(&mid), 2.0 * nearest.t))
    }

    fn validate(&self, guess: &State, period: f64) -> Result<(), CrtbpError> {
        ensure!(
            period > 0.0 && period.is_finite(),
            InvalidInputSnafu {
                reason: format!("period guess must be positive, got {period}"),
            }
        );
        ensure!(
            guess.is_finite(),
            InvalidInputSnafu {
                reason: format!("state guess must be finite, got {guess}"),
            }
        );
        Ok(())
    }

    /// Performs exactly one fixed-variable correction and reports the
    /// deltas for external iteration.
    ///
    /// The 2x2 Newton system drives (z, vx) at the crossing to zero by
    /// adjusting the two free components, combining the selected STM
    /// entries with the velocity-ratio term through the crossing condition.
    /// If the guess already satisfies both residuals, it is returned
    /// unchanged with the refined period.
    pub fn single_shot(
        &self,
        guess: &State,
        period: f64,
        fixed: FixedVariable,
    ) -> Result<CorrectionSolution, CrtbpError> {
        self.validate(guess, period)?;
        let (stm, mid, full_period) = self.half_period_arc(guess, period)?;
        let residual_vx = mid.vx.abs();
        let residual_vz = mid.vz.abs();

        if residual_vx <= self.tolerance && residual_vz <= self.tolerance {
            info!("guess already crosses perpendicular (|vx| = {residual_vx:.3e}, |vz| = {residual_vz:.3e})");
            return Ok(CorrectionSolution {
                corrected_state: *guess,
                period: full_period,
                deltas: CorrectionDeltas::default(),
                residual_vx,
                residual_vz,
                iterations: 1,
            });
        }

        ensure!(
            mid.vy.abs() > f64::EPSILON,
            SingularCorrectionSnafu { det: 0.0_f64 }
        );

        let accel = self.prop.dynamics.crtbp().eom_vec(&mid.to_vector());
        let (i1, i2) = fixed.free_indices();

        let residual = Vector2::new(-mid.z, -mid.vx);
        let partials = Matrix2::new(stm[(2, i1)], stm[(2, i2)], stm[(3, i1)], stm[(3, i2)]);
        // (z, vx) rates at the crossing, mapped through d(t_cross)/d(free)
        let rates = Vector2::new(accel[2], accel[3]);
        let crossing_row = RowVector2::new(stm[(1, i1)], stm[(1, i2)]);
        let system = partials - rates * crossing_row / mid.vy;

        let det = system.determinant();
        ensure!(
            det.is_finite() && det.abs() > f64::EPSILON,
            SingularCorrectionSnafu { det }
        );
        let correction = system
            .try_inverse()
            .context(SingularCorrectionSnafu { det })?
            * residual;

        let mut corrected = guess.to_vector();
        corrected[i1] += correction[0];
        corrected[i2] += correction[1];
        let corrected = State::from_vector(&corrected);
        debug!(
            "fixed {fixed}: d{} = {:.4e}, d{} = {:.4e}",
            i1, correction[0], i2, correction[1]
        );

        Ok(CorrectionSolution {
            deltas: CorrectionDeltas::between(guess, &corrected),
            corrected_state: corrected,
            period: full_period,
            residual_vx,
            residual_vz,
            iterations: 1,
        })
    }

    /// Iterates a single-unknown Newton update on vy until both symmetry
    /// residuals fall below tolerance.
    pub fn converge(&self, guess: &State, period: f64) -> Result<CorrectionSolution, CrtbpError> {
        self.validate(guess, period)?;
        let mut current = *guess;
        let mut span = period;
        let mut residual = f64::INFINITY;

        for iteration in 1..=self.max_iterations {
            let (stm, mid, full_period) = self.half_period_arc(&current, span)?;
            span = full_period;
            let residual_vx = mid.vx.abs();
            let residual_vz = mid.vz.abs();
            residual = residual_vx.max(residual_vz);

            if residual_vx <= self.tolerance && residual_vz <= self.tolerance {
                info!("corrector converged in {iteration} iterations (residual {residual:.3e})");
                return Ok(CorrectionSolution {
                    deltas: CorrectionDeltas::between(guess, &current),
                    corrected_state: current,
                    period: full_period,
                    residual_vx,
                    residual_vz,
                    iterations: iteration,
                });
            }

            let accel = self.prop.dynamics.crtbp().eom_vec(&mid.to_vector());
            let denom = stm[(3, 4)] - accel[3] * stm[(1, 4)] / mid.vy;
            ensure!(
                denom.is_finite() && denom.abs() > f64::EPSILON,
                SingularCorrectionSnafu { det: denom }
            );
            let delta_vy = -mid.vx / denom;
            debug!("iteration {iteration}: delta vy = {delta_vy:.4e}");
            current.vy += delta_vy;
        }

        ConvergenceNotReachedSnafu {
            iterations: self.max_iterations,
            residual,
        }
        .fail()
    }
}
