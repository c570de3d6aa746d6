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

use super::opti::{
    Bounds, DimensionMismatchSnafu, InvalidVariableSnafu, SearchError,
};
use crate::cosmic::{OrbitalParameter, OrbitalParameters};
use crate::linalg::DVector;
use enum_iterator::Sequence;
use serde_derive::{Deserialize, Serialize};
use snafu::ensure;
use std::fmt;
use std::str::FromStr;

/// A search variable: one value applied to each of the parameters it drives.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DesignVariable {
    /// The launch parameters set to the value of this variable
    pub drives: Vec<OrbitalParameter>,
    /// The absolute minimum value this variable can ever have
    pub min_value: f64,
    /// The absolute maximum value this variable can ever have
    pub max_value: f64,
    /// The initial guess of this variable
    pub init_guess: f64,
}

impl DesignVariable {
    pub fn new(drives: Vec<OrbitalParameter>, min_value: f64, max_value: f64, init_guess: f64) -> Self {
        Self {
            drives,
            min_value,
            max_value,
            init_guess,
        }
    }

    /// The perigee and apogee altitudes varied together, keeping the orbit circular.
    pub fn altitude() -> Self {
        let (min_value, max_value) = OrbitalParameter::AltPerigee.default_bounds();
        Self::new(
            vec![OrbitalParameter::AltPerigee, OrbitalParameter::AltApogee],
            min_value,
            max_value,
            OrbitalParameter::AltPerigee.default_guess(),
        )
    }

    /// Returns whether the configuration of this variable is valid
    pub fn valid(&self) -> Result<(), SearchError> {
        ensure!(
            !self.drives.is_empty(),
            InvalidVariableSnafu {
                reason: "variable drives no parameter".to_string()
            }
        );
        ensure!(
            self.min_value.is_finite() && self.max_value.is_finite(),
            InvalidVariableSnafu {
                reason: format!("{self}: bounds must be finite")
            }
        );
        ensure!(
            self.min_value < self.max_value,
            InvalidVariableSnafu {
                reason: format!(
                    "{self}: min value is not less than max value: {} >= {}",
                    self.min_value, self.max_value
                )
            }
        );
        Ok(())
    }

    pub fn with_initial_guess(mut self, guess: f64) -> Self {
        self.init_guess = guess;
        self
    }

    pub fn with_bounds(mut self, min_value: f64, max_value: f64) -> Self {
        self.min_value = min_value;
        self.max_value = max_value;
        self
    }
}

impl From<OrbitalParameter> for DesignVariable {
    fn from(param: OrbitalParameter) -> Self {
        let (min_value, max_value) = param.default_bounds();
        Self::new(vec![param], min_value, max_value, param.default_guess())
    }
}

impl fmt::Display for DesignVariable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let names: Vec<String> = self.drives.iter().map(|p| format!("{p}")).collect();
        let unit = self.drives.first().map(|p| p.unit()).unwrap_or("");
        write!(
            f,
            "{} in [{}, {}] {unit} (guess {})",
            names.join("+"),
            self.min_value,
            self.max_value,
            self.init_guess
        )
    }
}

/// The preset design layouts.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Sequence, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayoutKind {
    /// All five launch parameters vary independently
    Full,
    /// Circular orbits: altitude, RAAN, inclination and argument of perigee
    #[default]
    LinkedAltitudes,
    /// Circular orbits: altitude, RAAN and inclination, with the argument of perigee fixed
    Circular,
}

impl FromStr for LayoutKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "full" => Ok(Self::Full),
            "linked-altitudes" | "linked" => Ok(Self::LinkedAltitudes),
            "circular" => Ok(Self::Circular),
            _ => Err(format!("unknown design layout `{s}`")),
        }
    }
}

/// Maps the design vector of the search onto the launch parameters.
///
/// Parameters which no variable drives keep the value they have in `base`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DesignLayout {
    pub base: OrbitalParameters,
    pub variables: Vec<DesignVariable>,
}

impl DesignLayout {
    pub fn new(base: OrbitalParameters, variables: Vec<DesignVariable>) -> Self {
        Self { base, variables }
    }

    /// Five independent variables
    pub fn full() -> Self {
        Self::new(
            OrbitalParameters::default(),
            enum_iterator::all::<OrbitalParameter>()
                .map(DesignVariable::from)
                .collect(),
        )
    }

    /// Altitude (perigee and apogee linked), RAAN, inclination and argument of perigee
    pub fn linked_altitudes() -> Self {
        Self::new(
            OrbitalParameters::default(),
            vec![
                DesignVariable::altitude(),
                OrbitalParameter::Raan.into(),
                OrbitalParameter::Inc.into(),
                OrbitalParameter::ArgPerigee.into(),
            ],
        )
    }

    /// Altitude (perigee and apogee linked), RAAN and inclination
    pub fn circular() -> Self {
        Self::new(
            OrbitalParameters::default(),
            vec![
                DesignVariable::altitude(),
                OrbitalParameter::Raan.into(),
                OrbitalParameter::Inc.into(),
            ],
        )
    }

    pub fn from_kind(kind: LayoutKind) -> Self {
        match kind {
            LayoutKind::Full => Self::full(),
            LayoutKind::LinkedAltitudes => Self::linked_altitudes(),
            LayoutKind::Circular => Self::circular(),
        }
    }

    /// Sets the value of the parameters which are not varied
    pub fn with_base(mut self, base: OrbitalParameters) -> Self {
        self.base = base;
        self
    }

    /// Number of design variables
    pub fn dim(&self) -> usize {
        self.variables.len()
    }

    /// Checks every variable, and that no parameter is driven twice.
    pub fn validate(&self) -> Result<(), SearchError> {
        ensure!(
            !self.variables.is_empty(),
            InvalidVariableSnafu {
                reason: "no design variable".to_string()
            }
        );
        let mut driven: Vec<OrbitalParameter> = Vec::with_capacity(5);
        for var in &self.variables {
            var.valid()?;
            for param in &var.drives {
                ensure!(
                    !driven.contains(param),
                    InvalidVariableSnafu {
                        reason: format!("{param} is driven by more than one variable")
                    }
                );
                driven.push(*param);
            }
        }
        Ok(())
    }

    /// Box constraints of the design vector
    pub fn bounds(&self) -> Result<Bounds, SearchError> {
        Bounds::try_new(
            DVector::from_iterator(self.dim(), self.variables.iter().map(|v| v.min_value)),
            DVector::from_iterator(self.dim(), self.variables.iter().map(|v| v.max_value)),
        )
    }

    pub fn initial_guess(&self) -> DVector<f64> {
        DVector::from_iterator(self.dim(), self.variables.iter().map(|v| v.init_guess))
    }

    /// Launch parameters of the provided design vector
    pub fn to_parameters(&self, design: &DVector<f64>) -> Result<OrbitalParameters, SearchError> {
        ensure!(
            design.len() == self.dim(),
            DimensionMismatchSnafu {
                expected: self.dim(),
                got: design.len()
            }
        );
        let mut params = self.base;
        for (var, val) in self.variables.iter().zip(design.iter()) {
            for param in &var.drives {
                params.set_value(*param, *val);
            }
        }
        Ok(params)
    }

    /// Design vector of the provided launch parameters, reading the first parameter each variable drives.
    pub fn from_parameters(&self, params: &OrbitalParameters) -> DVector<f64> {
        DVector::from_iterator(
            self.dim(),
            self.variables.iter().map(|v| {
                v.drives
                    .first()
                    .map(|p| params.value(*p))
                    .unwrap_or(v.init_guess)
            }),
        )
    }
}

impl Default for DesignLayout {
    fn default() -> Self {
        Self::linked_altitudes()
    }
}

impl fmt::Display for DesignLayout {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "design layout of {} variables:", self.dim())?;
        for var in &self.variables {
            writeln!(f, "\t{var}")?;
        }
        write!(f, "\tbase {}", self.base)
    }
}
