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

/// Scaled RMS error norm over the integration vector.
///
/// Each component of the local error estimate is divided by
/// `atol + rtol * max(|y_i|, |y'_i|)`; a step is acceptable when the RMS of
/// the scaled errors is at most 1. This matches the acceptance criterion of
/// SciPy's `solve_ivp`, which the corrector tolerances were tuned against.
pub fn scaled_rms<N: DimName>(
    prop_err: &OVector<f64, N>,
    candidate: &OVector<f64, N>,
    cur_state: &OVector<f64, N>,
    atol: f64,
    rtol: f64,
) -> f64
where
    DefaultAllocator: Allocator<N>,
{
    let mut sum = 0.0;
    for (i, err) in prop_err.iter().enumerate() {
        let scale = atol + rtol * cur_state[i].abs().max(candidate[i].abs());
        let scaled = err / scale;
        sum += scaled * scaled;
    }
    (sum / prop_err.len() as f64).sqrt()
}
