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

//! The memory model: how stability and difficulty evolve with each review,
//! and how recall probability decays between reviews.

use crate::params::WEIGHT_COUNT;
use crate::types::grade::Grade;

/// Retrievability: probability of recall, in [0, 1].
pub type R = f64;

/// Stability: days until retrievability falls to 90%.
pub type S = f64;

/// Difficulty: in [1, 10].
pub type D = f64;

/// Time, in days.
pub type T = f64;

pub type Stability = S;

pub type Difficulty = D;

/// Exponent of the power forgetting curve.
pub const DECAY: f64 = -1.0;

/// Chosen together with `DECAY` so that `R(S, S) = 0.9`.
pub const FACTOR: f64 = 1.0;

/// Floor for any stability the model produces.
pub const S_MIN: S = 0.01;

const D_MIN: D = 1.0;
const D_MAX: D = 10.0;

/// Retrievability after `t` days for a card with stability `s`.
pub fn forgetting_curve(t: T, s: S) -> R {
    (1.0 + FACTOR * t / (9.0 * s)).powf(DECAY)
}

/// The multiple of stability at which retrievability falls to `r`. This is
/// the forgetting curve solved for `t`, divided by `s`.
pub fn interval_modifier(r: R) -> f64 {
    9.0 * (r.powf(1.0 / DECAY) - 1.0) / FACTOR
}

fn clamp_d(d: D) -> D {
    d.clamp(D_MIN, D_MAX)
}

/// A card's stability and difficulty after a review.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct MemoryState {
    pub stability: Stability,
    pub difficulty: Difficulty,
}

/// The memory model formulas, bound to a validated weight vector.
#[derive(Clone, PartialEq, Debug)]
pub struct MemoryModel {
    w: [f64; WEIGHT_COUNT],
}

impl MemoryModel {
    pub fn new(w: [f64; WEIGHT_COUNT]) -> Self {
        Self { w }
    }

    pub fn weights(&self) -> &[f64; WEIGHT_COUNT] {
        &self.w
    }

    /// Stability after the first ever review.
    pub fn init_stability(&self, g: Grade) -> S {
        self.w[g.ordinal() as usize - 1].max(0.1)
    }

    /// Difficulty after the first ever review. `Good` yields exactly `w4`.
    pub fn init_difficulty(&self, g: Grade) -> D {
        let g: f64 = g.into();
        clamp_d(self.w[4] - (g - 3.0) * self.w[5])
    }

    pub fn next_difficulty(&self, d: D, g: Grade) -> D {
        let g: f64 = g.into();
        let next_d = d - self.w[6] * (g - 3.0);
        clamp_d(self.mean_reversion(self.init_difficulty(Grade::Good), next_d))
    }

    pub fn mean_reversion(&self, init: D, current: D) -> D {
        self.w[7] * init + (1.0 - self.w[7]) * current
    }

    /// Stability after a successful recall with retrievability `r`.
    pub fn next_recall_stability(&self, d: D, s: S, r: R, g: Grade) -> S {
        let w = &self.w;
        let hard_penalty = if g == Grade::Hard { w[15] } else { 1.0 };
        let easy_bonus = if g == Grade::Easy { w[16] } else { 1.0 };
        let growth = f64::exp(w[8])
            * (11.0 - d)
            * s.powf(-w[9])
            * (f64::exp(w[10] * (1.0 - r)) - 1.0)
            * hard_penalty
            * easy_bonus;
        (s * (growth + 1.0)).max(S_MIN)
    }

    /// Stability after a lapse with retrievability `r`.
    pub fn next_forget_stability(&self, d: D, s: S, r: R) -> S {
        let w = &self.w;
        let s = w[11]
            * d.powf(-w[12])
            * ((s + 1.0).powf(w[13]) - 1.0)
            * f64::exp(w[14] * (1.0 - r));
        s.max(S_MIN)
    }

    /// Stability and difficulty for a card reviewed for the first time.
    pub fn init_ds(&self, g: Grade) -> MemoryState {
        MemoryState {
            stability: self.init_stability(g),
            difficulty: self.init_difficulty(g),
        }
    }

    /// Stability and difficulty for a card already carrying `last_d` and
    /// `last_s`, reviewed at retrievability `r`.
    pub fn next_ds(&self, last_d: D, last_s: S, r: R, g: Grade) -> MemoryState {
        let stability = match g {
            Grade::Again => self.next_forget_stability(last_d, last_s, r),
            _ => self.next_recall_stability(last_d, last_s, r, g),
        };
        MemoryState {
            stability,
            difficulty: self.next_difficulty(last_d, g),
        }
    }
}
