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

//! Turning stability into whole-day intervals, and spreading those
//! intervals out so that cards learned together do not stay clumped.

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::fsrs::D;
use crate::fsrs::S;
use crate::fsrs::interval_modifier;
use crate::types::timestamp::Timestamp;

/// Intervals shorter than this are never fuzzed.
const FUZZ_THRESHOLD: f64 = 2.5;

/// `(start, end, factor)`: each band of the interval contributes `factor`
/// days of spread per day it overlaps.
const FUZZ_RANGES: [(f64, f64, f64); 3] = [
    (2.5, 7.0, 0.15),
    (7.0, 20.0, 0.1),
    (20.0, f64::INFINITY, 0.05),
];

/// A uniform draw in `[0, 1)` used to pick a point within a fuzz range.
/// `None` means fuzzing is off.
pub type FuzzFactor = Option<f64>;

/// Converts stability to intervals for a fixed retention target and cap.
#[derive(Clone, PartialEq, Debug)]
pub struct IntervalEngine {
    modifier: f64,
    maximum_interval: u32,
}

impl IntervalEngine {
    pub fn new(request_retention: f64, maximum_interval: u32) -> Self {
        Self {
            modifier: interval_modifier(request_retention),
            maximum_interval,
        }
    }

    pub fn maximum_interval(&self) -> i64 {
        self.maximum_interval as i64
    }

    /// The interval, in days, after which a card with stability `s` falls to
    /// the target retention. Rounded, at least one day, capped.
    pub fn next_interval(&self, s: S, elapsed_days: i64, fuzz: FuzzFactor) -> i64 {
        let ivl = (s * self.modifier)
            .round()
            .clamp(1.0, self.maximum_interval as f64);
        self.apply_fuzz(ivl, elapsed_days, fuzz)
    }

    pub fn apply_fuzz(&self, ivl: f64, elapsed_days: i64, fuzz: FuzzFactor) -> i64 {
        match fuzz {
            Some(factor) if ivl >= FUZZ_THRESHOLD => {
                let (min_ivl, max_ivl) =
                    get_fuzz_range(ivl, elapsed_days, self.maximum_interval as i64);
                let span = (max_ivl - min_ivl + 1) as f64;
                let fuzzed = (factor * span + min_ivl as f64).floor() as i64;
                fuzzed.clamp(min_ivl, max_ivl)
            }
            _ => ivl.round() as i64,
        }
    }
}

/// The band of days a fuzzed `interval` may land in.
pub fn get_fuzz_range(interval: f64, elapsed_days: i64, maximum_interval: i64) -> (i64, i64) {
    let mut delta = 1.0;
    for (start, end, factor) in FUZZ_RANGES {
        delta += factor * (interval.min(end) - start).max(0.0);
    }
    let interval = interval.min(maximum_interval as f64);
    let mut min_ivl = ((interval - delta).round() as i64).max(2);
    let max_ivl = ((interval + delta).round() as i64).min(maximum_interval);
    // Never schedule a card sooner than the time that has already passed.
    if interval > elapsed_days as f64 {
        min_ivl = min_ivl.max(elapsed_days + 1);
    }
    min_ivl = min_ivl.min(max_ivl);
    (min_ivl, max_ivl)
}

/// A seed that is stable for a given card at a given moment, so that asking
/// for the same forecast twice gives the same answer.
pub fn derive_seed(now: Timestamp, reps: u32, difficulty: D, stability: S) -> u64 {
    let key = format!("{}_{}_{}", now.millis(), reps, difficulty * stability);
    let hash = blake3::hash(key.as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&hash.as_bytes()[..8]);
    u64::from_le_bytes(bytes)
}

pub fn fuzz_factor(seed: u64) -> f64 {
    StdRng::seed_from_u64(seed).r#gen::<f64>()
}
