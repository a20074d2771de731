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

//! Typed call boundary: every request is validated in full before any
//! numeric work starts, and inputs are never mutated by the engine.

use crate::cosmic::{Frame, MassRatio, State, Trajectory};
use crate::dynamics::{CrtbpDynamics, VariationalDynamics};
use crate::errors::InvalidInputSnafu;
use crate::io::ConfigRepr;
use crate::md::{CorrectionSolution, Corrector, FixedVariable};
use crate::propagators::{IntegMethod, PropOpts, Propagator};
use crate::utils::linspace;
use crate::CrtbpError;
use serde_derive::{Deserialize, Serialize};
use snafu::prelude::*;
use typed_builder::TypedBuilder;

/// Propagate a state forward and sample it on a fixed time grid.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, TypedBuilder)]
#[builder(doc)]
pub struct PropagationRequest {
    /// System mass ratio, must lie strictly in (0, 1).
    pub mu: f64,
    /// Seed state, interpreted in `frame`.
    pub state: State,
    /// Coordinate convention of `state`.
    #[builder(default)]
    #[serde(default)]
    pub frame: Frame,
    /// Propagation span in TU.
    pub duration: f64,
    /// Number of evenly spaced samples over [0, duration], endpoints
    /// included. A single sample returns just the ingested seed.
    #[builder(default = 100)]
    #[serde(default = "default_samples")]
    pub samples: usize,
    #[builder(default)]
    #[serde(default)]
    pub method: IntegMethod,
    #[builder(default)]
    #[serde(default)]
    pub opts: PropOpts,
}

fn default_samples() -> usize {
    100
}

impl PropagationRequest {
    fn validate(&self) -> Result<(MassRatio, State), CrtbpError> {
        let mu = MassRatio::new(self.mu)?;
        ensure!(
            self.state.is_finite(),
            InvalidInputSnafu {
                reason: format!("seed state must be finite, got {}", self.state),
            }
        );
        ensure!(
            self.duration > 0.0 && self.duration.is_finite(),
            InvalidInputSnafu {
                reason: format!("duration must be positive, got {}", self.duration),
            }
        );
        ensure!(
            self.samples >= 1,
            InvalidInputSnafu {
                reason: "at least one sample is required".to_string(),
            }
        );
        self.opts.validate()?;
        Ok((mu, self.state.to_barycentric(self.frame, mu)))
    }

    /// Runs the propagation and returns the sampled trajectory, barycentric.
    pub fn execute(&self) -> Result<Trajectory, CrtbpError> {
        let (mu, seed) = self.validate()?;
        info!(
            "propagating {} for {:.6} TU ({} samples, {})",
            seed, self.duration, self.samples, self.method
        );

        let prop = Propagator::from_method(CrtbpDynamics::new(mu), self.method, self.opts);
        let mut instance = prop.with(seed.to_vector());

        let times = linspace(0.0, self.duration, self.samples);
        let states = instance
            .sample(&times)?
            .iter()
            .map(State::from_vector)
            .collect();

        Ok(Trajectory { times, states })
    }
}

impl ConfigRepr for PropagationRequest {}

/// Refine a periodic-orbit guess with the STM-based differential corrector.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, TypedBuilder)]
#[builder(doc)]
pub struct CorrectionRequest {
    /// System mass ratio, must lie strictly in (0, 1).
    pub mu: f64,
    /// Periodic-orbit guess, interpreted in `frame`.
    pub state: State,
    /// Coordinate convention of `state`.
    #[builder(default)]
    #[serde(default)]
    pub frame: Frame,
    /// Full-period guess in TU; the crossing search spans this duration.
    pub period: f64,
    #[builder(default)]
    #[serde(default)]
    pub method: IntegMethod,
    #[builder(default)]
    #[serde(default)]
    pub opts: PropOpts,
    /// Newton iteration budget of the internally looping mode.
    #[builder(default = 20)]
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
}

fn default_max_iterations() -> usize {
    20
}

impl CorrectionRequest {
    fn validate(&self) -> Result<(MassRatio, State), CrtbpError> {
        let mu = MassRatio::new(self.mu)?;
        ensure!(
            self.state.is_finite(),
            InvalidInputSnafu {
                reason: format!("guess state must be finite, got {}", self.state),
            }
        );
        ensure!(
            self.period > 0.0 && self.period.is_finite(),
            InvalidInputSnafu {
                reason: format!("period guess must be positive, got {}", self.period),
            }
        );
        ensure!(
            self.max_iterations >= 1,
            InvalidInputSnafu {
                reason: "at least one corrector iteration is required".to_string(),
            }
        );
        self.opts.validate()?;
        Ok((mu, self.state.to_barycentric(self.frame, mu)))
    }

    /// Applies one fixed-variable correction and reports the deltas, leaving
    /// further iteration to the caller.
    pub fn correct_fixed(&self, fixed: FixedVariable) -> Result<CorrectionSolution, CrtbpError> {
        let (mu, seed) = self.validate()?;
        info!("single-shot correction of {seed} with {fixed} held fixed");

        let prop = Propagator::from_method(
            VariationalDynamics::new(CrtbpDynamics::new(mu)),
            self.method,
            self.opts,
        );
        let mut corrector = Corrector::new(&prop);
        corrector.max_iterations = self.max_iterations;
        corrector.single_shot(&seed, self.period, fixed)
    }

    /// Iterates the single-unknown vy correction until both symmetry
    /// residuals vanish at the half-period crossing.
    pub fn correct_iterative(&self) -> Result<CorrectionSolution, CrtbpError> {
        let (mu, seed) = self.validate()?;
        info!("iterative correction of {seed} over a {:.6} TU period guess", self.period);

        let prop = Propagator::from_method(
            VariationalDynamics::new(CrtbpDynamics::new(mu)),
            self.method,
            self.opts,
        );
        let mut corrector = Corrector::new(&prop);
        corrector.tolerance = Corrector::ITERATIVE_TOL;
        corrector.max_iterations = self.max_iterations;
        corrector.converge(&seed, self.period)
    }
}

impl ConfigRepr for CorrectionRequest {}
