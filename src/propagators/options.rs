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

use crate::errors::InvalidInputSnafu;
use crate::CrtbpError;
use serde_derive::{Deserialize, Serialize};
use snafu::prelude::*;
use std::fmt;
use typed_builder::TypedBuilder;

/// PropOpts stores the integrator options: step bounds, absolute and
/// relative tolerances, and the retry budget of the adaptive step control.
/// All steps and times are in TU.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, TypedBuilder)]
#[builder(doc)]
pub struct PropOpts {
    #[builder(default = 1e-2)]
    #[serde(default = "defaults::init_step")]
    pub init_step: f64,
    #[builder(default = 1e-12)]
    #[serde(default = "defaults::min_step")]
    pub min_step: f64,
    #[builder(default = 0.25)]
    #[serde(default = "defaults::max_step")]
    pub max_step: f64,
    #[builder(default = 1e-12)]
    #[serde(default = "defaults::tol")]
    pub atol: f64,
    #[builder(default = 1e-12)]
    #[serde(default = "defaults::tol")]
    pub rtol: f64,
    #[builder(default = 50)]
    #[serde(default = "defaults::attempts")]
    pub attempts: u8,
    #[builder(default = false)]
    #[serde(default)]
    pub fixed_step: bool,
}

mod defaults {
    pub fn init_step() -> f64 {
        1e-2
    }
    pub fn min_step() -> f64 {
        1e-12
    }
    pub fn max_step() -> f64 {
        0.25
    }
    pub fn tol() -> f64 {
        1e-12
    }
    pub fn attempts() -> u8 {
        50
    }
}

impl PropOpts {
    /// Adaptive-step options with the provided tolerances and the default
    /// step bounds.
    pub fn with_tolerances(atol: f64, rtol: f64) -> Self {
        Self::builder().atol(atol).rtol(rtol).build()
    }

    /// Adaptive-step options with explicit step bounds.
    pub fn with_adaptive_step(min_step: f64, max_step: f64, atol: f64, rtol: f64) -> Self {
        Self::builder()
            .init_step(max_step)
            .min_step(min_step)
            .max_step(max_step)
            .atol(atol)
            .rtol(rtol)
            .build()
    }

    /// Fixed-step options: no error control, no retries.
    pub fn with_fixed_step(step: f64) -> Self {
        Self::builder()
            .init_step(step)
            .min_step(step)
            .max_step(step)
            .attempts(0)
            .fixed_step(true)
            .build()
    }

    /// Set the maximum step size and clamp the initial step to it.
    pub fn set_max_step(&mut self, max_step: f64) {
        if self.init_step > max_step {
            self.init_step = max_step;
        }
        self.max_step = max_step;
    }

    /// Set the minimum step size and clamp the initial step to it.
    pub fn set_min_step(&mut self, min_step: f64) {
        if self.init_step < min_step {
            self.init_step = min_step;
        }
        self.min_step = min_step;
    }

    pub fn validate(&self) -> Result<(), CrtbpError> {
        ensure!(
            self.atol > 0.0 && self.atol.is_finite() && self.rtol > 0.0 && self.rtol.is_finite(),
            InvalidInputSnafu {
                reason: format!(
                    "tolerances must be positive, got atol = {}, rtol = {}",
                    self.atol, self.rtol
                ),
            }
        );
        ensure!(
            self.min_step > 0.0 && self.min_step <= self.max_step,
            InvalidInputSnafu {
                reason: format!(
                    "step bounds must satisfy 0 < min <= max, got [{}, {}]",
                    self.min_step, self.max_step
                ),
            }
        );
        Ok(())
    }
}

impl Default for PropOpts {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl fmt::Display for PropOpts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.fixed_step {
            write!(f, "fixed step: {:e} TU", self.min_step)
        } else {
            write!(
                f,
                "min_step: {:e} TU, max_step: {:e} TU, atol: {:e}, rtol: {:e}, attempts: {}",
                self.min_step, self.max_step, self.atol, self.rtol, self.attempts,
            )
        }
    }
}

#[test]
fn test_options() {
    let opts = PropOpts::with_fixed_step(1e-1);
    assert_eq!(opts.min_step, 1e-1);
    assert_eq!(opts.max_step, 1e-1);
    assert!(opts.fixed_step);

    let opts = PropOpts::with_adaptive_step(1e-9, 1e-1, 1e-10, 1e-10);
    assert_eq!(opts.min_step, 1e-9);
    assert_eq!(opts.max_step, 1e-1);
    assert_eq!(opts.init_step, 1e-1);
    assert!((opts.atol - 1e-10).abs() < f64::EPSILON);
    assert!(!opts.fixed_step);

    let opts = PropOpts::default();
    assert_eq!(opts.init_step, 1e-2);
    assert_eq!(opts.attempts, 50);
    assert!((opts.atol - 1e-12).abs() < f64::EPSILON);
    assert!((opts.rtol - 1e-12).abs() < f64::EPSILON);
    assert!(opts.validate().is_ok());

    let mut bad = PropOpts::default();
    bad.atol = -1.0;
    assert!(bad.validate().is_err());
}
