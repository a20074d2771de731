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
use crate::utils::linspace;
use crate::CrtbpError;
use serde_derive::{Deserialize, Serialize};
use snafu::prelude::*;

/// A parametric sphere surface grid. The three coordinate grids share the
/// same shape: `2 * resolution` azimuth rows by `resolution` polar columns.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SphereMesh {
    pub x: Vec<Vec<f64>>,
    pub y: Vec<Vec<f64>>,
    pub z: Vec<Vec<f64>>,
}

impl SphereMesh {
    /// Number of (azimuth, polar) grid points.
    pub fn grid_shape(&self) -> (usize, usize) {
        (self.x.len(), self.x.first().map_or(0, Vec::len))
    }
}

/// Builds a sphere of the provided radius (LU) centered on `center`.
///
/// Azimuth sweeps [0, 2pi] over `2 * resolution` points and the polar angle
/// sweeps [0, pi] over `resolution` points, both endpoints included, so the
/// seam and the poles are repeated for watertight surface plotting.
pub fn sphere_mesh(
    radius: f64,
    center: [f64; 3],
    resolution: usize,
) -> Result<SphereMesh, CrtbpError> {
    ensure!(
        radius > 0.0 && radius.is_finite(),
        InvalidInputSnafu {
            reason: format!("sphere radius must be positive, got {radius}"),
        }
    );
    ensure!(
        resolution >= 2,
        InvalidInputSnafu {
            reason: format!("sphere resolution must be at least 2, got {resolution}"),
        }
    );

    let azimuth = linspace(0.0, 2.0 * std::f64::consts::PI, 2 * resolution);
    let polar = linspace(0.0, std::f64::consts::PI, resolution);

    let mut x = Vec::with_capacity(azimuth.len());
    let mut y = Vec::with_capacity(azimuth.len());
    let mut z = Vec::with_capacity(azimuth.len());
    for &u in &azimuth {
        let mut xr = Vec::with_capacity(polar.len());
        let mut yr = Vec::with_capacity(polar.len());
        let mut zr = Vec::with_capacity(polar.len());
        for &v in &polar {
            xr.push(radius * u.cos() * v.sin() + center[0]);
            yr.push(radius * u.sin() * v.sin() + center[1]);
            zr.push(radius * v.cos() + center[2]);
        }
        x.push(xr);
        y.push(yr);
        z.push(zr);
    }

    Ok(SphereMesh { x, y, z })
}
