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

use crate::linalg::allocator::Allocator;
use crate::linalg::{DefaultAllocator, DimName, OVector};
use crate::CrtbpError;

/// Nonlinear CR3BP equations of motion and their Jacobian.
pub mod crtbp;
pub use self::crtbp::*;

/// STM propagation coupled with the nonlinear state.
pub mod variational;
pub use self::variational::*;

/// A model with equations of motion that the propagator can integrate.
///
/// The time argument is in TU past the start of the propagation; CR3BP
/// dynamics are autonomous but the signature keeps the integrator general.
pub trait Dynamics: Clone + Send + Sync
where
    DefaultAllocator: Allocator<Self::VecLength>,
{
    /// Dimension of the integrated vector (6 for a plain state, 42 for the
    /// STM-augmented state).
    type VecLength: DimName;

    /// Evaluates the time derivative of the integrated vector.
    fn eom(
        &self,
        t: f64,
        state: &OVector<f64, Self::VecLength>,
    ) -> Result<OVector<f64, Self::VecLength>, CrtbpError>;
}
