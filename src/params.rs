// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::path::Path;

use serde::Deserialize;
use serde::Serialize;

use crate::error::ErrorReport;
use crate::error::Fallible;

/// The number of entries in the weight vector.
pub const WEIGHT_COUNT: usize = 17;

/// Default weights, as produced by the optimizer on a large review corpus.
pub const DEFAULT_WEIGHTS: [f64; WEIGHT_COUNT] = [
    0.4, 0.6, 2.4, 5.8, 4.93, 0.94, 0.86, 0.01, 1.49, 0.14, 0.94, 2.18, 0.05, 0.34, 1.26, 0.29,
    2.61,
];

pub const DEFAULT_REQUEST_RETENTION: f64 = 0.9;

/// One hundred years.
pub const DEFAULT_MAXIMUM_INTERVAL: u32 = 36500;

/// Ten thousand years. Any due date this far past a sane review date is
/// still representable.
pub const MAX_MAXIMUM_INTERVAL: u32 = 3_650_000;

/// Scheduler configuration. Every field may be omitted from a config file,
/// in which case the default is used.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Parameters {
    /// The recall probability intervals are sized to hit.
    pub request_retention: f64,
    /// The longest interval, in days, that will ever be scheduled.
    pub maximum_interval: u32,
    /// The memory model weights.
    pub w: Vec<f64>,
    /// Whether to perturb review intervals.
    pub enable_fuzz: bool,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            request_retention: DEFAULT_REQUEST_RETENTION,
            maximum_interval: DEFAULT_MAXIMUM_INTERVAL,
            w: DEFAULT_WEIGHTS.to_vec(),
            enable_fuzz: false,
        }
    }
}

impl Parameters {
    pub fn from_toml_str(s: &str) -> Fallible<Self> {
        let params: Parameters = toml::from_str(s)?;
        Ok(params)
    }

    pub fn load(path: &Path) -> Fallible<Self> {
        log::debug!("Loading parameters from {}", path.display());
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Check the parameters and fix the weights into an array.
    pub(crate) fn validate(&self) -> Fallible<[f64; WEIGHT_COUNT]> {
        let w: [f64; WEIGHT_COUNT] = self.w.as_slice().try_into().map_err(|_| {
            ErrorReport::config(format!(
                "expected {WEIGHT_COUNT} weights, got {}",
                self.w.len()
            ))
        })?;
        if let Some(i) = w.iter().position(|x| !x.is_finite()) {
            return Err(ErrorReport::config(format!("weight w[{i}] is not finite")));
        }
        let r = self.request_retention;
        if !(r > 0.0 && r <= 1.0) {
            return Err(ErrorReport::config(format!(
                "request_retention must be in (0, 1], got {r}"
            )));
        }
        if !(1..=MAX_MAXIMUM_INTERVAL).contains(&self.maximum_interval) {
            return Err(ErrorReport::config(format!(
                "maximum_interval must be in [1, {MAX_MAXIMUM_INTERVAL}], got {}",
                self.maximum_interval
            )));
        }
        Ok(w)
    }
}
