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

/*! # crtbp

Propagation and periodic-orbit tools for the Circular Restricted Three-Body
Problem (CR3BP) in the rotating, barycentric frame with normalized units
(primary separation = 1 LU, mean motion = 1 per TU).

The engine integrates the nonlinear equations of motion, optionally couples
them with the variational equations (State Transition Matrix), detects
`y = 0` plane crossings with bisection refinement, and polishes periodic
orbit guesses with a Newton-type differential corrector built on the STM.

All computation is synchronous and free of shared state: independent
propagations and corrections may run on as many threads as desired.
*/

/// Re-export of the linear algebra backend.
pub use nalgebra as linalg;

#[macro_use]
extern crate log;

/// States, frames, mass ratios and sampled trajectories.
pub mod cosmic;

/// CR3BP equations of motion, gravity gradient, and variational dynamics.
pub mod dynamics;

/// Adaptive Runge-Kutta propagation with event detection.
pub mod propagators;

/// Mission design layer: plane-crossing events and the differential corrector.
pub mod md;

/// Auxiliary geometry: Lagrange point series and sphere mesh sampling.
pub mod tools;

/// Configuration loading and plain-text export of engine records.
pub mod io;

/// Typed, validated call boundary for embedding the engine.
pub mod api;

mod errors;
pub use self::errors::CrtbpError;

mod utils;
