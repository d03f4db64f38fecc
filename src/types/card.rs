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

use serde::Deserialize;
use serde::Serialize;

use crate::fsrs::Difficulty;
use crate::fsrs::Stability;
use crate::types::state::State;
use crate::types::timestamp::Timestamp;

/// The scheduling state of a single card.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct Card {
    /// When the card is next due for review.
    pub due: Timestamp,
    /// The card's stability (an FSRS parameter). Zero while `New`.
    #[serde(default)]
    pub stability: Stability,
    /// The card's difficulty (an FSRS parameter). Zero while `New`.
    #[serde(default)]
    pub difficulty: Difficulty,
    /// Whole days between the two most recent reviews.
    #[serde(default)]
    pub elapsed_days: i64,
    /// The interval, in days, that produced `due`.
    #[serde(default)]
    pub scheduled_days: f64,
    /// The number of non-lapse reviews.
    #[serde(default)]
    pub reps: u32,
    /// The number of times the card was forgotten while in review.
    #[serde(default)]
    pub lapses: u32,
    pub state: State,
    /// When the card was last reviewed, if ever.
    #[serde(default)]
    pub last_review: Option<Timestamp>,
}

impl Card {
    /// A card that has never been reviewed, due at `now`.
    pub fn new(now: Timestamp) -> Self {
        Self {
            due: now,
            stability: 0.0,
            difficulty: 0.0,
            elapsed_days: 0,
            scheduled_days: 0.0,
            reps: 0,
            lapses: 0,
            state: State::New,
            last_review: None,
        }
    }

    pub fn is_new(&self) -> bool {
        self.state == State::New
    }
}
