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
use crate::linalg::Vector6;
use crate::CrtbpError;
use serde_derive::{Deserialize, Serialize};
use snafu::prelude::*;
use std::fmt;

/// Mass ratio of the system, i.e. secondary mass over total mass.
///
/// Guaranteed to lie strictly inside (0, 1); both the two-body limits are
/// rejected since they degenerate the rotating-frame geometry.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct MassRatio(f64);

impl MassRatio {
    pub fn new(mu: f64) -> Result<Self, CrtbpError> {
        ensure!(
            mu.is_finite() && mu > 0.0 && mu < 1.0,
            InvalidInputSnafu {
                reason: format!("mass ratio must be in (0, 1), got {mu}"),
            }
        );
        Ok(Self(mu))
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for MassRatio {
    type Error = CrtbpError;

    fn try_from(mu: f64) -> Result<Self, Self::Error> {
        Self::new(mu)
    }
}

impl From<MassRatio> for f64 {
    fn from(mu: MassRatio) -> f64 {
        mu.0
    }
}

impl fmt::Display for MassRatio {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Coordinate convention of a state handed to (or returned by) the engine.
///
/// All physics runs in the barycentric rotating frame, with the primary at
/// (-mu, 0, 0) and the secondary at (1 - mu, 0, 0). Secondary-centered
/// states are shifted by +(1 - mu) along x on ingestion; the engine never
/// re-derives this offset inside a physics formula.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frame {
    #[default]
    Barycentric,
    SecondaryCentered,
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Frame::Barycentric => write!(f, "barycentric"),
            Frame::SecondaryCentered => write!(f, "secondary-centered"),
        }
    }
}

/// A rotating-frame state: position in LU, velocity in LU/TU.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct State {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub vx: f64,
    pub vy: f64,
    pub vz: f64,
}

impl State {
    pub fn new(x: f64, y: f64, z: f64, vx: f64, vy: f64, vz: f64) -> Self {
        Self { x, y, z, vx, vy, vz }
    }

    /// Builds a state from a flat `[x, y, z, vx, vy, vz]` slice, rejecting
    /// any other length.
    pub fn from_slice(data: &[f64]) -> Result<Self, CrtbpError> {
        ensure!(
            data.len() == 6,
            InvalidInputSnafu {
                reason: format!("state must have 6 components, got {}", data.len()),
            }
        );
        Ok(Self::new(data[0], data[1], data[2], data[3], data[4], data[5]))
    }

    pub fn from_vector(vec: &Vector6<f64>) -> Self {
        Self::new(vec[0], vec[1], vec[2], vec[3], vec[4], vec[5])
    }

    pub fn to_vector(self) -> Vector6<f64> {
        Vector6::new(self.x, self.y, self.z, self.vx, self.vy, self.vz)
    }

    /// Converts this state into the canonical barycentric frame.
    ///
    /// This is the single place where the (1 - mu) x-offset between the two
    /// source conventions is applied.
    pub fn to_barycentric(self, frame: Frame, mu: MassRatio) -> Self {
        match frame {
            Frame::Barycentric => self,
            Frame::SecondaryCentered => Self {
                x: self.x + (1.0 - mu.value()),
                ..self
            },
        }
    }

    pub fn is_finite(&self) -> bool {
        self.to_vector().iter().all(|c| c.is_finite())
    }

    /// L2 norm of the difference over all six components.
    pub fn rss(&self, other: &Self) -> f64 {
        (self.to_vector() - other.to_vector()).norm()
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "[x: {:.10} LU, y: {:.10} LU, z: {:.10} LU, vx: {:.10} LU/TU, vy: {:.10} LU/TU, vz: {:.10} LU/TU]",
            self.x, self.y, self.z, self.vx, self.vy, self.vz
        )
    }
}

/// An ordered set of states sampled at fixed times over one propagation.
///
/// Immutable once returned by the engine; times are in TU from the start of
/// the propagation, states are barycentric.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    pub times: Vec<f64>,
    pub states: Vec<State>,
}

impl Trajectory {
    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn first(&self) -> Option<&State> {
        self.states.first()
    }

    pub fn last(&self) -> Option<&State> {
        self.states.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mass_ratio_bounds() {
        assert!(MassRatio::new(0.0121505).is_ok());
        for bad in [0.0, 1.0, 1.5, -0.3, f64::NAN] {
            assert!(matches!(
                MassRatio::new(bad),
                Err(CrtbpError::InvalidInput { .. })
            ));
        }
    }

    #[test]
    fn frame_shift_applied_once() {
        let mu = MassRatio::new(0.0121505).unwrap();
        let sec = State::new(-0.08, 0.0, 0.01, 0.0, 0.25, 0.0);
        let bary = sec.to_barycentric(Frame::SecondaryCentered, mu);
        assert!((bary.x - (sec.x + 1.0 - mu.value())).abs() < f64::EPSILON);
        assert_eq!(bary.y, sec.y);
        // Barycentric ingestion is the identity
        assert_eq!(bary.to_barycentric(Frame::Barycentric, mu), bary);
    }

    #[test]
    fn state_slice_roundtrip() {
        let s = State::from_slice(&[0.8234, 0.0, 0.0, 0.0, 0.1263, 0.0]).unwrap();
        assert_eq!(State::from_vector(&s.to_vector()), s);
        assert!(matches!(
            State::from_slice(&[1.0, 2.0, 3.0, 4.0, 5.0]),
            Err(CrtbpError::InvalidInput { .. })
        ));
    }
}
