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

mod dormand;
pub use self::dormand::*;
mod fehlberg;
pub use self::fehlberg::*;
mod verner;
pub use self::verner::*;

/// The `RK` trait defines an embedded Runge Kutta integrator.
#[allow(clippy::upper_case_acronyms)]
pub trait RK
where
    Self: Sized,
{
    /// Order of the integrator, used by the adaptive step size control.
    const ORDER: u8;

    /// Number of stages, i.e. how many times the derivatives are evaluated.
    const STAGES: usize;

    /// A coefficients of the Butcher table, flattened row by row; must hold
    /// STAGES * (STAGES - 1) / 2 entries. The c_i are implied:
    /// c_i = sum_j a_ij.
    const A_COEFFS: &'static [f64];

    /// The b_i followed by the embedded b*_i coefficients, 2 * STAGES
    /// entries in total. Propagation uses b, the error estimate b - b*.
    const B_COEFFS: &'static [f64];
}
