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
use std::fmt;

/// A scalar event function whose zero crossings the propagator records.
pub trait EventEvaluator<N: DimName>: fmt::Display
where
    DefaultAllocator: Allocator<N>,
{
    /// Value of the event function at this state; a crossing happens where
    /// the sign changes between consecutive accepted steps.
    fn eval(&self, t: f64, state: &OVector<f64, N>) -> f64;

    /// Bracket width (TU) below which the bisection stops.
    fn time_precision(&self) -> f64 {
        1e-12
    }

    /// Event value magnitude considered an exact hit.
    fn value_precision(&self) -> f64 {
        1e-12
    }
}

/// A refined zero crossing: the time and the full integrated vector there.
#[derive(Clone, Debug)]
pub struct Crossing<N: DimName>
where
    DefaultAllocator: Allocator<N>,
{
    pub t: f64,
    pub state: OVector<f64, N>,
}

/// The y = 0 plane crossing used by the perpendicular-crossing symmetry
/// conditions.
///
/// Every integrated vector in this crate ends with the 6-component state
/// (the plain state is all of it, the augmented state appends it after the
/// STM), so y is read from that trailing block and the same evaluator works
/// at any dimension.
#[derive(Copy, Clone, Debug, Default)]
pub struct PlaneCrossing;

impl fmt::Display for PlaneCrossing {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "y = 0 plane crossing")
    }
}

impl<N: DimName> EventEvaluator<N> for PlaneCrossing
where
    DefaultAllocator: Allocator<N>,
{
    fn eval(&self, _t: f64, state: &OVector<f64, N>) -> f64 {
        state[N::dim() - 5]
    }
}
