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

use super::Dynamics;
use crate::cosmic::MassRatio;
use crate::linalg::{Matrix3, Matrix6, OVector, Vector3, Vector6, U6};
use crate::CrtbpError;

/// CR3BP dynamics in the canonical barycentric rotating frame.
///
/// The primary (mass 1 - mu) sits at (-mu, 0, 0), the secondary (mass mu)
/// at (1 - mu, 0, 0). States collocated with either primary make r1 or r2
/// vanish and blow up the gravitational terms; this is a documented domain
/// restriction, not a handled case (the propagator will report an
/// integration failure).
#[derive(Copy, Clone, Debug)]
pub struct CrtbpDynamics {
    mu: f64,
}

impl CrtbpDynamics {
    pub fn new(mu: MassRatio) -> Self {
        Self { mu: mu.value() }
    }

    pub fn mu(&self) -> f64 {
        self.mu
    }

    /// Evaluates the 6-component derivative of a barycentric state.
    ///
    /// Acceleration combines both primaries' gravity with the rotating
    /// frame Coriolis (2 vy, -2 vx) and centrifugal (x, y) terms; z carries
    /// no centrifugal term.
    pub fn eom_vec(&self, state: &Vector6<f64>) -> Vector6<f64> {
        let mu = self.mu;
        let (x, y, z) = (state[0], state[1], state[2]);
        let (vx, vy, vz) = (state[3], state[4], state[5]);

        let r1 = ((x + mu).powi(2) + y * y + z * z).sqrt();
        let r2 = ((x - 1.0 + mu).powi(2) + y * y + z * z).sqrt();
        let m1 = (1.0 - mu) / r1.powi(3);
        let m2 = mu / r2.powi(3);

        let ax = 2.0 * vy + x - m1 * (x + mu) - m2 * (x - 1.0 + mu);
        let ay = -2.0 * vx + y - m1 * y - m2 * y;
        let az = -m1 * z - m2 * z;

        Vector6::new(vx, vy, vz, ax, ay, az)
    }

    /// Symmetric gravity-gradient block G combining both primaries' second
    /// derivative tensors with the in-plane centrifugal contribution.
    pub fn gravity_gradient(&self, pos: &Vector3<f64>) -> Matrix3<f64> {
        let mu = self.mu;
        let (x, y, z) = (pos[0], pos[1], pos[2]);

        let r1_sq = (x + mu).powi(2) + y * y + z * z;
        let r2_sq = (x - 1.0 + mu).powi(2) + y * y + z * z;
        let r1 = r1_sq.sqrt();
        let r2 = r2_sq.sqrt();
        let m1 = (1.0 - mu) / r1.powi(3);
        let m2 = mu / r2.powi(3);

        let uxx = 1.0
            - m1 * (1.0 - 3.0 * (x + mu).powi(2) / r1_sq)
            - m2 * (1.0 - 3.0 * (x - 1.0 + mu).powi(2) / r2_sq);
        let uyy = 1.0 - m1 * (1.0 - 3.0 * y * y / r1_sq) - m2 * (1.0 - 3.0 * y * y / r2_sq);
        let uzz = -m1 * (1.0 - 3.0 * z * z / r1_sq) - m2 * (1.0 - 3.0 * z * z / r2_sq);

        let uxy = 3.0 * ((1.0 - mu) * y * (x + mu) / r1.powi(5) + mu * y * (x - 1.0 + mu) / r2.powi(5));
        let uxz = 3.0 * ((1.0 - mu) * z * (x + mu) / r1.powi(5) + mu * z * (x - 1.0 + mu) / r2.powi(5));
        let uyz = 3.0 * ((1.0 - mu) * z * y / r1.powi(5) + mu * z * y / r2.powi(5));

        Matrix3::new(uxx, uxy, uxz, uxy, uyy, uyz, uxz, uyz, uzz)
    }

    /// Assembles the 6x6 Jacobian F = [[0, I], [G, H]] where H is the
    /// antisymmetric Coriolis coupling block.
    pub fn jacobian(&self, pos: &Vector3<f64>) -> Matrix6<f64> {
        let g = self.gravity_gradient(pos);

        let mut f = Matrix6::zeros();
        f.fixed_view_mut::<3, 3>(0, 3)
            .copy_from(&Matrix3::identity());
        f.fixed_view_mut::<3, 3>(3, 0).copy_from(&g);
        // Coriolis block H
        f[(3, 4)] = 2.0;
        f[(4, 3)] = -2.0;
        f
    }
}

impl Dynamics for CrtbpDynamics {
    type VecLength = U6;

    fn eom(&self, _t: f64, state: &OVector<f64, U6>) -> Result<OVector<f64, U6>, CrtbpError> {
        Ok(self.eom_vec(state))
    }
}
