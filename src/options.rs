//! Configuration structures for the two policy operators.

use serde::{Deserialize, Serialize};

use crate::error::{GrowthError, Result};
use crate::roots::BrentOptions;

/// Controls the endogenous grid operator.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EgmOptions {
    /// Process grid points on the rayon pool. Output order always follows the grid.
    pub parallel: bool,
}

impl EgmOptions {
    /// Enable or disable the parallel per-grid-point loop.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

/// Controls the exogenous-grid time-iteration operator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeIterationOptions {
    /// Consumption at grid point `y` is searched on `[offset, y - offset]`.
    pub bracket_offset: f64,
    /// Root-finder tolerances.
    pub brent: BrentOptions,
    /// Solve grid points on the rayon pool.
    pub parallel: bool,
}

impl Default for TimeIterationOptions {
    fn default() -> Self {
        Self {
            bracket_offset: 1e-10,
            brent: BrentOptions::default(),
            parallel: true,
        }
    }
}

impl TimeIterationOptions {
    /// Override the distance kept from the endpoints of `(0, y)`.
    pub fn with_bracket_offset(mut self, bracket_offset: f64) -> Self {
        self.bracket_offset = bracket_offset;
        self
    }

    /// Override the root-finder settings.
    pub fn with_brent(mut self, brent: BrentOptions) -> Self {
        self.brent = brent;
        self
    }

    /// Enable or disable the parallel per-grid-point loop.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Checks the bracket offset and root-finder tolerances.
    pub fn validate(&self) -> Result<()> {
        if !(self.bracket_offset.is_finite() && self.bracket_offset >= 0.0) {
            return Err(GrowthError::configuration(
                "bracket_offset",
                self.bracket_offset,
                "finite and non-negative",
            ));
        }
        self.brent.validate()
    }
}
