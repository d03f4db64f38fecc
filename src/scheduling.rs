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

use crate::error::Fallible;
use crate::fsrs::MemoryModel;
use crate::fsrs::MemoryState;
use crate::fsrs::forgetting_curve;
use crate::fuzz::FuzzFactor;
use crate::fuzz::IntervalEngine;
use crate::types::card::Card;
use crate::types::grade::Grade;
use crate::types::record_log::RecordLog;
use crate::types::record_log::RecordLogItem;
use crate::types::review_log::ReviewLog;
use crate::types::state::State;
use crate::types::timestamp::Timestamp;

const MINUTES_PER_DAY: f64 = 1440.0;

/// How far away the next review is.
#[derive(Clone, Copy, PartialEq, Debug)]
enum Step {
    /// A short learning step.
    Minutes(i64),
    /// A review interval.
    Days(i64),
}

impl Step {
    fn due(self, now: Timestamp) -> Fallible<Timestamp> {
        match self {
            Step::Minutes(m) => now.plus_minutes(m),
            Step::Days(d) => now.plus_days(d),
        }
    }

    fn scheduled_days(self) -> f64 {
        match self {
            Step::Minutes(m) => m as f64 / MINUTES_PER_DAY,
            Step::Days(d) => d as f64,
        }
    }
}

/// Everything needed to forecast one review of one card at one moment.
pub struct SchedulingCard<'a> {
    card: &'a Card,
    now: Timestamp,
    elapsed_days: i64,
    model: &'a MemoryModel,
    intervals: &'a IntervalEngine,
    fuzz: FuzzFactor,
}

impl<'a> SchedulingCard<'a> {
    pub fn new(
        card: &'a Card,
        now: Timestamp,
        model: &'a MemoryModel,
        intervals: &'a IntervalEngine,
        fuzz: FuzzFactor,
    ) -> Self {
        let elapsed_days = match (card.state, card.last_review) {
            (State::New, _) | (_, None) => 0,
            (_, Some(last_review)) => now.days_since(last_review),
        };
        Self {
            card,
            now,
            elapsed_days,
            model,
            intervals,
            fuzz,
        }
    }

    pub fn elapsed_days(&self) -> i64 {
        self.elapsed_days
    }

    /// The outcome of every grade. Fails only if a due date would fall
    /// outside the representable range.
    pub fn record_log(&self) -> Fallible<RecordLog> {
        let memory = self.memory_states();
        let steps = self.steps(&memory);
        let item = |g: Grade| self.outcome(g, memory[index(g)], steps[index(g)]);
        Ok(RecordLog::new(
            item(Grade::Again)?,
            item(Grade::Hard)?,
            item(Grade::Good)?,
            item(Grade::Easy)?,
        ))
    }

    fn memory_states(&self) -> [MemoryState; 4] {
        match self.card.state {
            State::New => Grade::ALL.map(|g| self.model.init_ds(g)),
            _ => {
                let r = forgetting_curve(self.elapsed_days as f64, self.card.stability);
                log::trace!("Retrievability after {} days: {r}", self.elapsed_days);
                Grade::ALL
                    .map(|g| self.model.next_ds(self.card.difficulty, self.card.stability, r, g))
            }
        }
    }

    fn steps(&self, memory: &[MemoryState; 4]) -> [Step; 4] {
        let ivl = |g: Grade| {
            self.intervals
                .next_interval(memory[index(g)].stability, self.elapsed_days, self.fuzz)
        };
        let cap = self.intervals.maximum_interval();
        match self.card.state {
            State::New => [
                Step::Minutes(1),
                Step::Minutes(5),
                Step::Minutes(10),
                Step::Days(ivl(Grade::Easy)),
            ],
            State::Learning | State::Relearning => {
                let good = ivl(Grade::Good);
                let easy = ivl(Grade::Easy).max(good + 1).min(cap);
                [
                    Step::Minutes(5),
                    Step::Minutes(10),
                    Step::Days(good),
                    Step::Days(easy),
                ]
            }
            State::Review => {
                let good = ivl(Grade::Good);
                let hard = ivl(Grade::Hard).min(good);
                let good = good.max(hard + 1).min(cap);
                let easy = ivl(Grade::Easy).max(good + 1).min(cap);
                [
                    Step::Minutes(5),
                    Step::Days(hard),
                    Step::Days(good),
                    Step::Days(easy),
                ]
            }
        }
    }

    fn outcome(&self, grade: Grade, memory: MemoryState, step: Step) -> Fallible<RecordLogItem> {
        let card = self.card;
        let lapse = grade == Grade::Again && card.state == State::Review;
        let next = Card {
            due: step.due(self.now)?,
            stability: memory.stability,
            difficulty: memory.difficulty,
            elapsed_days: self.elapsed_days,
            scheduled_days: step.scheduled_days(),
            reps: card.reps.saturating_add(u32::from(grade != Grade::Again)),
            lapses: card.lapses.saturating_add(u32::from(lapse)),
            state: card.state.next(grade),
            last_review: Some(self.now),
        };
        let log = ReviewLog::begin(card, grade.into(), self.elapsed_days, self.now).finish(&next);
        Ok(RecordLogItem { card: next, log })
    }
}

fn index(g: Grade) -> usize {
    g.ordinal() as usize - 1
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use chrono::Utc;

    use super::*;
    use crate::params::DEFAULT_WEIGHTS;
    use crate::types::grade::Rating;

    fn now() -> Timestamp {
        Timestamp::new(Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap())
    }

    fn days(n: i64) -> Timestamp {
        now().plus_days(n).unwrap()
    }

    fn minutes(n: i64) -> Timestamp {
        now().plus_minutes(n).unwrap()
    }

    fn forecast(card: &Card, now: Timestamp) -> RecordLog {
        let model = MemoryModel::new(DEFAULT_WEIGHTS);
        let intervals = IntervalEngine::new(0.9, 36500);
        SchedulingCard::new(card, now, &model, &intervals, None)
            .record_log()
            .unwrap()
    }

    fn card_in(state: State) -> Card {
        Card {
            due: now(),
            stability: 10.0,
            difficulty: 5.0,
            elapsed_days: 3,
            scheduled_days: 10.0,
            reps: 4,
            lapses: 1,
            state,
            last_review: Some(days(-10)),
        }
    }

    #[test]
    fn test_new_card() {
        let card = Card::new(now());
        let log = forecast(&card, now());
        for (grade, item) in log.iter() {
            let expected = if grade == Grade::Easy {
                State::Review
            } else {
                State::Learning
            };
            assert_eq!(item.card.state, expected);
            assert_eq!(item.log.state, State::New);
            assert_eq!(item.log.rating, Rating::from(grade));
            assert_eq!(item.log.review, now());
            assert_eq!(item.card.last_review, Some(now()));
            assert_eq!(item.card.elapsed_days, 0);
        }
        assert_eq!(log[Grade::Again].card.due, minutes(1));
        assert_eq!(log[Grade::Hard].card.due, minutes(5));
        assert_eq!(log[Grade::Good].card.due, minutes(10));
        assert_eq!(log[Grade::Good].card.scheduled_days, 10.0 / 1440.0);
        // Easy stability is w3 = 5.8, so the interval is 6 days.
        assert_eq!(log[Grade::Easy].card.due, days(6));
        assert_eq!(log[Grade::Easy].card.scheduled_days, 6.0);
        assert_eq!(log[Grade::Good].card.difficulty, 4.93);
        assert_eq!(log[Grade::Again].card.reps, 0);
        assert_eq!(log[Grade::Good].card.reps, 1);
    }

    #[test]
    fn test_transition_table() {
        for state in [State::New, State::Learning, State::Review, State::Relearning] {
            let card = if state == State::New {
                Card::new(now())
            } else {
                card_in(state)
            };
            let log = forecast(&card, now());
            for (grade, item) in log.iter() {
                assert_eq!(item.card.state, state.next(grade), "{state} + {grade}");
                assert_eq!(item.log.state, state);
            }
        }
    }

    #[test]
    fn test_review_lapse() {
        let card = card_in(State::Review);
        let log = forecast(&card, now());
        let again = &log[Grade::Again];
        assert_eq!(again.card.state, State::Relearning);
        assert_eq!(again.card.lapses, card.lapses + 1);
        assert_eq!(again.card.reps, card.reps);
        assert!(again.card.stability < card.stability);
        assert_eq!(again.card.due, minutes(5));
        assert_eq!(again.card.elapsed_days, 10);
        assert_eq!(again.log.last_elapsed_days, 3);
    }

    #[test]
    fn test_review_intervals_ordered() {
        let card = card_in(State::Review);
        let log = forecast(&card, now());
        let hard = log[Grade::Hard].card.scheduled_days;
        let good = log[Grade::Good].card.scheduled_days;
        let easy = log[Grade::Easy].card.scheduled_days;
        assert!(hard < good && good < easy, "{hard} {good} {easy}");
        for grade in [Grade::Hard, Grade::Good, Grade::Easy] {
            let item = &log[grade];
            assert_eq!(item.card.reps, card.reps + 1);
            assert_eq!(item.card.lapses, card.lapses);
            assert!(item.card.stability > card.stability);
        }
    }

    #[test]
    fn test_relearning_steps() {
        let card = card_in(State::Relearning);
        let log = forecast(&card, now());
        assert_eq!(log[Grade::Again].card.due, minutes(5));
        assert_eq!(log[Grade::Hard].card.due, minutes(10));
        assert_eq!(log[Grade::Again].card.lapses, card.lapses);
        let good = log[Grade::Good].card.scheduled_days;
        let easy = log[Grade::Easy].card.scheduled_days;
        assert!(easy > good);
    }

    #[test]
    fn test_log_records_prior_values() {
        let card = card_in(State::Review);
        let log = forecast(&card, now());
        let item = &log[Grade::Good];
        assert_eq!(item.log.last_due, card.due);
        assert_eq!(item.log.last_stability, card.stability);
        assert_eq!(item.log.last_difficulty, card.difficulty);
        assert_eq!(item.log.last_scheduled_days, card.scheduled_days);
        assert_eq!(item.log.last_review, card.last_review);
        assert_eq!(item.log.due, item.card.due);
        assert_eq!(item.log.stability, item.card.stability);
        assert_eq!(item.log.scheduled_days, item.card.scheduled_days);
    }

    #[test]
    fn test_input_card_untouched() {
        let card = card_in(State::Learning);
        let before = card.clone();
        let _ = forecast(&card, now());
        assert_eq!(card, before);
    }

    #[test]
    fn test_review_capped() {
        let model = MemoryModel::new(DEFAULT_WEIGHTS);
        let intervals = IntervalEngine::new(0.9, 30);
        let mut card = card_in(State::Review);
        card.stability = 500.0;
        let log = SchedulingCard::new(&card, now(), &model, &intervals, None)
            .record_log()
            .unwrap();
        for grade in [Grade::Hard, Grade::Good, Grade::Easy] {
            assert!(log[grade].card.scheduled_days <= 30.0);
        }
    }

    #[test]
    fn test_due_out_of_range() {
        let model = MemoryModel::new(DEFAULT_WEIGHTS);
        let intervals = IntervalEngine::new(0.9, 36500);
        let last = Timestamp::new(chrono::DateTime::<Utc>::MAX_UTC);
        let card = Card::new(last);
        let result = SchedulingCard::new(&card, last, &model, &intervals, None).record_log();
        assert!(result.is_err());
    }

    #[test]
    fn test_counters_saturate() {
        let mut card = card_in(State::Review);
        card.reps = u32::MAX;
        card.lapses = u32::MAX;
        let log = forecast(&card, now());
        assert_eq!(log[Grade::Good].card.reps, u32::MAX);
        assert_eq!(log[Grade::Again].card.lapses, u32::MAX);
    }
}
