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

use crate::cosmic::Trajectory;
use crate::md::CorrectionSolution;
use crate::propagators::PropOpts;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;
use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] io::Error),

    #[error("Failed to parse YAML configuration: {0}")]
    ParseError(#[source] serde_yaml::Error),

    #[error("Failed to write CSV data: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl PartialEq for ConfigError {
    /// No two configuration errors match
    fn eq(&self, _other: &Self) -> bool {
        false
    }
}

/// Plain-text (YAML) representation of an engine record.
pub trait ConfigRepr: Debug + Sized + Serialize + DeserializeOwned {
    /// Builds the representation from the path to a YAML file
    fn load<P>(path: P) -> Result<Self, ConfigError>
    where
        P: AsRef<Path>,
    {
        let file = File::open(path)?;
        let reader = BufReader::new(file);

        serde_yaml::from_reader(reader).map_err(ConfigError::ParseError)
    }

    /// Builds the representation from a YAML string
    fn loads(data: &str) -> Result<Self, ConfigError> {
        debug!("Loading YAML:\n{data}");
        serde_yaml::from_str(data).map_err(ConfigError::ParseError)
    }

    /// Serializes self into a YAML string
    fn dumps(&self) -> Result<String, ConfigError> {
        serde_yaml::to_string(self).map_err(ConfigError::ParseError)
    }
}

impl ConfigRepr for PropOpts {}
impl ConfigRepr for CorrectionSolution {}

/// Writes a sampled trajectory as CSV with a `t,x,y,z,vx,vy,vz` header.
pub fn write_trajectory_csv<W: Write>(traj: &Trajectory, writer: W) -> Result<(), ConfigError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["t", "x", "y", "z", "vx", "vy", "vz"])?;
    for (t, state) in traj.times.iter().zip(&traj.states) {
        wtr.write_record([
            t.to_string(),
            state.x.to_string(),
            state.y.to_string(),
            state.z.to_string(),
            state.vx.to_string(),
            state.vy.to_string(),
            state.vz.to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes a sampled trajectory as CSV to the provided path.
pub fn export_trajectory_csv<P: AsRef<Path>>(
    traj: &Trajectory,
    path: P,
) -> Result<(), ConfigError> {
    let file = File::create(path)?;
    write_trajectory_csv(traj, file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cosmic::State;

    #[test]
    fn prop_opts_yaml_roundtrip() {
        let opts = PropOpts::builder().atol(1e-9).rtol(1e-9).build();
        let yaml = opts.dumps().unwrap();
        let reloaded = PropOpts::loads(&yaml).unwrap();
        assert_eq!(opts, reloaded);
    }

    #[test]
    fn trajectory_csv_header_and_rows() {
        let traj = Trajectory {
            times: vec![0.0, 0.5],
            states: vec![
                State::new(0.8234, 0.0, 0.0, 0.0, 0.1263, 0.0),
                State::new(0.81, 0.02, 0.0, -0.05, 0.12, 0.0),
            ],
        };
        let mut buf = Vec::new();
        write_trajectory_csv(&traj, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next().unwrap(), "t,x,y,z,vx,vy,vz");
        assert_eq!(lines.count(), 2);
        assert!(text.contains("0.8234"));
    }
}
