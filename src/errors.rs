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

use snafu::prelude::*;

/// Engine failure taxonomy.
///
/// `InvalidInput` is raised at the call boundary before any numeric work
/// starts. The remaining variants surface numerical failures; none of them
/// is retried internally, and no partial result is ever returned alongside
/// an error.
#[derive(Clone, Debug, PartialEq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum CrtbpError {
    /// Rejected before the integrator is invoked.
    #[snafu(display("invalid input: {reason}"))]
    InvalidInput { reason: String },

    /// The adaptive step collapsed below the minimum step, or the error
    /// estimate could not be brought within tolerance.
    #[snafu(display("integration failure at t = {t} TU: {reason}"))]
    IntegrationFailure { t: f64, reason: String },

    /// The expected y = 0 crossing was absent from the propagated span.
    #[snafu(display("no y = 0 crossing found within {span} TU"))]
    EventNotFound { span: f64 },

    /// The 2x2 correction system is not invertible: the correction is
    /// ill-posed for this seed and fixed-variable choice.
    #[snafu(display("singular correction system (det = {det:e})"))]
    SingularCorrection { det: f64 },

    /// The iteration budget was exhausted before both symmetry residuals
    /// fell below tolerance.
    #[snafu(display(
        "corrector did not converge after {iterations} iterations (residual {residual:e})"
    ))]
    ConvergenceNotReached { iterations: usize, residual: f64 },
}
