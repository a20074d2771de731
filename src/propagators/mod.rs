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

use serde_derive::{Deserialize, Serialize};
use std::fmt;

/// Provides the scaled error norm used by the adaptive step control.
pub mod error_ctrl;

mod propagator;
pub use propagator::*;
mod rk_methods;
pub use rk_methods::*;
mod options;
pub use options::*;

/// Runtime-selectable integration method.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum IntegMethod {
    /// Dormand-Prince 5(4), SciPy's RK45.
    #[default]
    Dormand45,
    /// Runge-Kutta-Fehlberg 5(4).
    Fehlberg54,
    /// Verner 5(6), the higher-accuracy alternative.
    Verner56,
}

impl fmt::Display for IntegMethod {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            IntegMethod::Dormand45 => write!(f, "Dormand45"),
            IntegMethod::Fehlberg54 => write!(f, "Fehlberg54"),
            IntegMethod::Verner56 => write!(f, "Verner56"),
        }
    }
}

/// Stores the details of the previous integration step of a given
/// propagator instance.
#[derive(Copy, Clone, Debug)]
pub struct IntegrationDetails {
    /// Step size used, in TU.
    pub step: f64,
    /// Scaled error norm of the previous step (acceptance is <= 1).
    pub error: f64,
    /// Number of attempts needed by the adaptive step control.
    pub attempts: u8,
}

impl fmt::Display for IntegrationDetails {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "IntegrationDetails {{step: {:e}, error: {:.3e}, attempts: {}}}",
            self.step, self.error, self.attempts
        )
    }
}
