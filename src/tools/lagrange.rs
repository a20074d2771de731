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

use crate::cosmic::MassRatio;
use serde_derive::{Deserialize, Serialize};
use std::fmt;

/// x-coordinates of the three collinear equilibria in the rotating frame
/// (all lie on the x-axis, so y = z = 0).
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LagrangePoints {
    pub l1: f64,
    pub l2: f64,
    pub l3: f64,
}

impl LagrangePoints {
    /// Positions in LU, ordered L1, L2, L3.
    pub fn positions(&self) -> [[f64; 3]; 3] {
        [
            [self.l1, 0.0, 0.0],
            [self.l2, 0.0, 0.0],
            [self.l3, 0.0, 0.0],
        ]
    }
}

impl fmt::Display for LagrangePoints {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "L1 = {:.9} LU, L2 = {:.9} LU, L3 = {:.9} LU",
            self.l1, self.l2, self.l3
        )
    }
}

/// Computes the collinear points from truncated series in the reduced mass.
///
/// L1 and L2 expand in the Hill-radius parameter alpha = (mu/3(1-mu))^(1/3)
/// about the secondary; L3 expands in zeta = mu/(1-mu) about the primary's
/// antipode. Accurate to about 1e-4 LU at Earth-Moon mass ratios.
pub fn collinear_points(mu: MassRatio) -> LagrangePoints {
    let mu = mu.value();
    let alpha = (mu / (3.0 * (1.0 - mu))).powf(1.0 / 3.0);

    let l1 = (1.0 - mu)
        - (alpha - alpha.powi(2) / 3.0 - alpha.powi(3) / 9.0 - alpha.powi(4) * 23.0 / 81.0);
    let l2 = (1.0 - mu)
        + (alpha + alpha.powi(2) / 3.0 - alpha.powi(3) / 9.0 - alpha.powi(4) * 31.0 / 81.0);

    let zeta = mu / (1.0 - mu);
    let l3 = -mu
        - 1.0
        - (-(7.0 / 12.0) * zeta + (7.0 / 12.0) * zeta.powi(2)
            - (13223.0 / 20736.0) * zeta.powi(3));

    LagrangePoints { l1, l2, l3 }
}
