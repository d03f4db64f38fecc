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
use crate::types::card::Card;
use crate::types::grade::Rating;
use crate::types::state::State;
use crate::types::timestamp::Timestamp;

/// A record of one scheduling event. Holds both the outcome and the card
/// fields the event overwrote, so that the event can be undone exactly.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct ReviewLog {
    /// The rating applied.
    pub rating: Rating,
    /// The card's state before the event.
    pub state: State,
    /// The resulting due date.
    pub due: Timestamp,
    /// The stability after the event.
    pub stability: Stability,
    /// The difficulty after the event.
    pub difficulty: Difficulty,
    /// Whole days since the previous review, as of this event.
    pub elapsed_days: i64,
    /// The card's `elapsed_days` just before this event.
    pub last_elapsed_days: i64,
    /// The interval chosen, in days.
    pub scheduled_days: f64,
    /// When the event happened.
    pub review: Timestamp,
    /// The card's due date before the event.
    pub last_due: Timestamp,
    pub last_stability: Stability,
    pub last_difficulty: Difficulty,
    pub last_scheduled_days: f64,
    /// The card's `last_review` before the event.
    #[serde(default)]
    pub last_review: Option<Timestamp>,
}

impl ReviewLog {
    /// Start a log for an event applied to `card` at `now`, copying the
    /// fields the event is about to overwrite. The outcome fields start out
    /// equal to the prior values and are filled in by the caller.
    pub(crate) fn begin(card: &Card, rating: Rating, elapsed_days: i64, now: Timestamp) -> Self {
        Self {
            rating,
            state: card.state,
            due: card.due,
            stability: card.stability,
            difficulty: card.difficulty,
            elapsed_days,
            last_elapsed_days: card.elapsed_days,
            scheduled_days: card.scheduled_days,
            review: now,
            last_due: card.due,
            last_stability: card.stability,
            last_difficulty: card.difficulty,
            last_scheduled_days: card.scheduled_days,
            last_review: card.last_review,
        }
    }

    /// Copy the outcome fields from the card the event produced.
    pub(crate) fn finish(mut self, next: &Card) -> Self {
        self.due = next.due;
        self.stability = next.stability;
        self.difficulty = next.difficulty;
        self.scheduled_days = next.scheduled_days;
        self
    }
}
