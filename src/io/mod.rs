/*
    Nyx, blazing fast astrodynamics
    Copyright (C) 2024 Christopher Rabotin <christopher.rabotin@gmail.com>

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

use crate::cosmic::{
    AstroError, GroundTrack, Injection, OrbitalParameters, TimeGrid, UniformSpin,
    DEFAULT_SAMPLES, DEFAULT_TRUE_ANOMALY_DEG, DEFAULT_WINDOW_END_S, EARTH_SPIN_RATE_RAD_S,
};
use crate::errors::{ErrorKind, LaunchError};
use crate::mc::MultiStart;
use crate::md::opti::{OptimizerKind, OptimizerOptions, SearchOptions};
use crate::md::{DesignLayout, DesignVariable, LayoutKind, Pipeline};
use crate::propagators::DefaultPropagator;
use serde::de::DeserializeOwned;
use serde_derive::{Deserialize, Serialize};
use snafu::prelude::*;
use std::fmt::Debug;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ConfigError {
    #[snafu(display("failed to read configuration file: {source}"))]
    ReadConfig { source: std::io::Error },
    #[snafu(display("failed to parse YAML configuration file: {source}"))]
    ParseConfig { source: serde_yaml::Error },
    #[snafu(display("invalid configuration: {reason}"))]
    InvalidConfig { reason: String },
    #[snafu(display("failed to export to CSV: {source}"))]
    Export { source: csv::Error },
}

impl ConfigError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::InvalidInput
    }
}

impl PartialEq for ConfigError {
    /// No two configuration errors match
    fn eq(&self, _other: &Self) -> bool {
        false
    }
}

pub trait ConfigRepr: Debug + Sized + serde::Serialize + DeserializeOwned {
    /// Builds the configuration representation from the path to a yaml
    fn load<P>(path: P) -> Result<Self, ConfigError>
    where
        P: AsRef<Path>,
    {
        let file = File::open(path).context(ReadConfigSnafu)?;
        let reader = BufReader::new(file);

        serde_yaml::from_reader(reader).context(ParseConfigSnafu)
    }

    /// Builds the configuration representation from the provided string of a yaml
    fn loads(data: &str) -> Result<Self, ConfigError> {
        debug!("Loading YAML:\n{data}");
        serde_yaml::from_str(data).context(ParseConfigSnafu)
    }
}

/// Multi-start sweep configuration
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    pub runs: usize,
    pub seed: u64,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self { runs: 16, seed: 0 }
    }
}

/// Configuration of a launch analysis. Every field is optional in the YAML and defaults to the nominal analysis.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaunchConfig {
    /// Number of samples of the time grid
    pub samples: usize,
    /// Start of the analysis window, only sets its span (s)
    pub start_s: f64,
    /// End of the analysis window (s)
    pub end_s: f64,
    /// Rotation rate of the Earth (rad/s)
    pub earth_rate_rad_s: f64,
    /// True anomaly of the injection (deg)
    pub true_anomaly_deg: f64,
    /// Preset layout of the design variables
    pub layout: LayoutKind,
    /// Overrides the variables of the preset layout
    pub variables: Option<Vec<DesignVariable>>,
    /// Values of the parameters which are not varied, and of the evaluation mode
    pub base: OrbitalParameters,
    pub optimizer: OptimizerKind,
    pub tolerances: OptimizerOptions,
    pub search: SearchOptions,
    pub sweep: SweepConfig,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            samples: DEFAULT_SAMPLES,
            start_s: 0.0,
            end_s: DEFAULT_WINDOW_END_S,
            earth_rate_rad_s: EARTH_SPIN_RATE_RAD_S,
            true_anomaly_deg: DEFAULT_TRUE_ANOMALY_DEG,
            layout: LayoutKind::default(),
            variables: None,
            base: OrbitalParameters::default(),
            optimizer: OptimizerKind::default(),
            tolerances: OptimizerOptions::default(),
            search: SearchOptions::default(),
            sweep: SweepConfig::default(),
        }
    }
}

impl ConfigRepr for LaunchConfig {}

impl LaunchConfig {
    /// Checks the values which are not checked when building the pipeline or the search
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure!(
            self.earth_rate_rad_s.is_finite(),
            InvalidConfigSnafu {
                reason: format!("Earth rotation rate must be finite, got {}", self.earth_rate_rad_s)
            }
        );
        ensure!(
            self.true_anomaly_deg.is_finite(),
            InvalidConfigSnafu {
                reason: format!("true anomaly must be finite, got {}", self.true_anomaly_deg)
            }
        );
        ensure!(
            self.sweep.runs > 0,
            InvalidConfigSnafu {
                reason: "a sweep needs at least one run".to_string()
            }
        );
        Ok(())
    }

    pub fn grid(&self) -> Result<TimeGrid, AstroError> {
        TimeGrid::new(self.samples, self.start_s, self.end_s)
    }

    /// Builds the pipeline of this configuration, computing the rotation stack of the Earth.
    pub fn pipeline(&self) -> Result<Pipeline<Injection, DefaultPropagator>, LaunchError> {
        self.validate()?;
        let spin = UniformSpin {
            rate_rad_s: self.earth_rate_rad_s,
        };
        Ok(Pipeline::with(
            self.grid()?,
            &spin,
            Injection::with_true_anomaly(self.true_anomaly_deg),
            DefaultPropagator::default(),
        )?)
    }

    pub fn layout(&self) -> DesignLayout {
        let mut layout = DesignLayout::from_kind(self.layout).with_base(self.base);
        if let Some(variables) = &self.variables {
            layout.variables = variables.clone();
        }
        layout
    }

    pub fn multistart(&self, scenario: &str) -> MultiStart {
        MultiStart {
            seed: self.sweep.seed,
            runs: self.sweep.runs,
            kind: self.optimizer,
            optimizer_opts: self.tolerances,
            search_opts: self.search,
            scenario: scenario.to_string(),
        }
    }
}

#[derive(Serialize)]
struct GroundTrackRow {
    time_s: f64,
    latitude_deg: f64,
    longitude_deg: f64,
}

/// Exports the ground track to a CSV file, one row per sample.
pub fn export_ground_track<P: AsRef<Path>>(
    path: P,
    grid: &TimeGrid,
    track: &GroundTrack,
) -> Result<(), ConfigError> {
    ensure!(
        grid.len() == track.len(),
        InvalidConfigSnafu {
            reason: format!(
                "ground track has {} samples but the time grid has {}",
                track.len(),
                grid.len()
            )
        }
    );

    let mut wtr = csv::Writer::from_path(path.as_ref()).context(ExportSnafu)?;
    for ((time_s, latitude_deg), longitude_deg) in grid
        .samples()
        .iter()
        .zip(track.latitudes_deg.iter())
        .zip(track.longitudes_deg.iter())
    {
        wtr.serialize(GroundTrackRow {
            time_s: *time_s,
            latitude_deg: *latitude_deg,
            longitude_deg: *longitude_deg,
        })
        .context(ExportSnafu)?;
    }
    wtr.flush().map_err(csv::Error::from).context(ExportSnafu)?;
    info!("Ground track of {} samples saved to {}", track.len(), path.as_ref().display());
    Ok(())
}
