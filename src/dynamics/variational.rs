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

use super::{CrtbpDynamics, Dynamics};
use crate::linalg::{Matrix6, OVector, Vector6, U42};
use crate::CrtbpError;

/// Augmented-state layout: the 6x6 STM flattened column-major in components
/// 0..36, followed by the 6-component state in 36..42.
pub type AugmentedState = OVector<f64, U42>;

/// Builds the augmented state for a fresh propagation: STM = identity.
///
/// The corrector re-establishes this precondition before every half-period
/// arc; the STM is never carried over between propagations.
pub fn augment(state: &Vector6<f64>) -> AugmentedState {
    let mut aug = AugmentedState::zeros();
    aug.fixed_rows_mut::<36>(0)
        .copy_from_slice(Matrix6::<f64>::identity().as_slice());
    aug.fixed_rows_mut::<6>(36).copy_from(state);
    aug
}

/// Splits an augmented state into its STM and state parts.
pub fn split(aug: &AugmentedState) -> (Matrix6<f64>, Vector6<f64>) {
    let stm = Matrix6::from_column_slice(&aug.as_slice()[..36]);
    let state = Vector6::from_column_slice(&aug.as_slice()[36..]);
    (stm, state)
}

/// Couples the nonlinear CR3BP state with its variational equations:
/// d(STM)/dt = F(r) * STM, with F evaluated at the current position.
#[derive(Copy, Clone, Debug)]
pub struct VariationalDynamics {
    crtbp: CrtbpDynamics,
}

impl VariationalDynamics {
    pub fn new(crtbp: CrtbpDynamics) -> Self {
        Self { crtbp }
    }

    pub fn crtbp(&self) -> CrtbpDynamics {
        self.crtbp
    }
}

impl Dynamics for VariationalDynamics {
    type VecLength = U42;

    fn eom(&self, _t: f64, aug: &AugmentedState) -> Result<AugmentedState, CrtbpError> {
        let (stm, state) = split(aug);
        let f = self.crtbp.jacobian(&state.fixed_rows::<3>(0).into_owned());
        let stm_dot = f * stm;

        let mut deriv = AugmentedState::zeros();
        deriv
            .fixed_rows_mut::<36>(0)
            .copy_from_slice(stm_dot.as_slice());
        deriv
            .fixed_rows_mut::<6>(36)
            .copy_from(&self.crtbp.eom_vec(&state));
        Ok(deriv)
    }
}
