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

use std::borrow::BorrowMut;

use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::fsrs::MemoryModel;
use crate::fsrs::forgetting_curve;
use crate::fuzz::FuzzFactor;
use crate::fuzz::IntervalEngine;
use crate::fuzz::derive_seed;
use crate::fuzz::fuzz_factor;
use crate::normalize::DateInput;
use crate::normalize::check_card;
use crate::params::Parameters;
use crate::scheduling::SchedulingCard;
use crate::types::card::Card;
use crate::types::grade::Grade;
use crate::types::grade::Rating;
use crate::types::record_log::RecordLog;
use crate::types::record_log::RecordLogItem;
use crate::types::review_log::ReviewLog;
use crate::types::state::State;
use crate::types::timestamp::Timestamp;

/// Options for [`Scheduler::reschedule`].
#[derive(Clone, Copy, Default, Debug)]
pub struct RescheduleOptions {
    /// Whether to fuzz the recomputed intervals.
    pub enable_fuzz: bool,
}

/// The entry point for all scheduling operations. Cheap to share: nothing
/// in here changes after construction.
#[derive(Clone, Debug)]
pub struct Scheduler {
    params: Parameters,
    model: MemoryModel,
    intervals: IntervalEngine,
    seed: Option<u64>,
}

impl Scheduler {
    pub fn new(params: Parameters) -> Fallible<Self> {
        let w = params.validate()?;
        log::debug!(
            "Scheduler: retention={} maximum_interval={} fuzz={}",
            params.request_retention,
            params.maximum_interval,
            params.enable_fuzz
        );
        Ok(Self {
            model: MemoryModel::new(w),
            intervals: IntervalEngine::new(params.request_retention, params.maximum_interval),
            params,
            seed: None,
        })
    }

    /// Use `seed` for every fuzz draw instead of deriving one from the card.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn parameters(&self) -> &Parameters {
        &self.params
    }

    pub fn model(&self) -> &MemoryModel {
        &self.model
    }

    /// The outcome of reviewing `card` at `now` under each grade.
    pub fn repeat(&self, card: &Card, now: impl Into<DateInput>) -> Fallible<RecordLog> {
        check_card(card)?;
        let now = now.into().normalize("now")?;
        let fuzz = self.fuzz(self.params.enable_fuzz, now, card);
        let scheduling = SchedulingCard::new(card, now, &self.model, &self.intervals, fuzz);
        log::debug!(
            "Scheduling {} card at {now}, {} days elapsed",
            card.state,
            scheduling.elapsed_days()
        );
        scheduling.record_log()
    }

    pub fn repeat_with<U>(
        &self,
        card: &Card,
        now: impl Into<DateInput>,
        after: impl FnOnce(RecordLog) -> U,
    ) -> Fallible<U> {
        self.repeat(card, now).map(after)
    }

    /// The outcome of reviewing `card` at `now` with `grade`.
    pub fn next(
        &self,
        card: &Card,
        now: impl Into<DateInput>,
        grade: Grade,
    ) -> Fallible<RecordLogItem> {
        Ok(self.repeat(card, now)?.take(grade))
    }

    pub fn next_with<U>(
        &self,
        card: &Card,
        now: impl Into<DateInput>,
        grade: Grade,
        after: impl FnOnce(RecordLogItem) -> U,
    ) -> Fallible<U> {
        self.next(card, now, grade).map(after)
    }

    /// Undo the event recorded in `log`, which must be the most recent event
    /// applied to `card`.
    pub fn rollback(&self, card: &Card, log: &ReviewLog) -> Fallible<Card> {
        let grade = log.rating.grade().ok_or_else(|| {
            ErrorReport::contract("cannot roll back a manual rating; use the card from before it")
        })?;
        log::debug!("Rolling back {grade} review at {}", log.review);
        let lapse = grade == Grade::Again && log.state == State::Review;
        let reps = if grade == Grade::Again {
            card.reps
        } else {
            card.reps.saturating_sub(1)
        };
        let lapses = if lapse {
            card.lapses.saturating_sub(1)
        } else {
            card.lapses
        };
        let last_review = match log.state {
            State::New => None,
            _ => log.last_review,
        };
        Ok(Card {
            due: log.last_due,
            stability: log.last_stability,
            difficulty: log.last_difficulty,
            elapsed_days: log.last_elapsed_days,
            scheduled_days: log.last_scheduled_days,
            reps,
            lapses,
            state: log.state,
            last_review,
        })
    }

    pub fn rollback_with<U>(
        &self,
        card: &Card,
        log: &ReviewLog,
        after: impl FnOnce(Card) -> U,
    ) -> Fallible<U> {
        self.rollback(card, log).map(after)
    }

    /// Treat `card` as forgotten at `now`. With `reset_count`, the card
    /// starts over as new. Without it, a reviewed card keeps its history and
    /// drops into relearning with first-lapse memory values.
    pub fn forget(
        &self,
        card: &Card,
        now: impl Into<DateInput>,
        reset_count: bool,
    ) -> Fallible<RecordLogItem> {
        check_card(card)?;
        let now = now.into().normalize("now")?;
        log::debug!("Forgetting {} card at {now} (reset_count={reset_count})", card.state);
        let next = if reset_count || card.is_new() {
            Card {
                reps: if reset_count { 0 } else { card.reps },
                lapses: if reset_count { 0 } else { card.lapses },
                ..Card::new(now)
            }
        } else {
            let memory = self.model.init_ds(Grade::Again);
            Card {
                due: now,
                stability: memory.stability,
                difficulty: memory.difficulty,
                elapsed_days: 0,
                scheduled_days: 0.0,
                reps: card.reps,
                lapses: card.lapses,
                state: State::Relearning,
                last_review: card.last_review,
            }
        };
        let log = ReviewLog::begin(card, Rating::Manual, 0, now).finish(&next);
        Ok(RecordLogItem { card: next, log })
    }

    pub fn forget_with<U>(
        &self,
        card: &Card,
        now: impl Into<DateInput>,
        reset_count: bool,
        after: impl FnOnce(RecordLogItem) -> U,
    ) -> Fallible<U> {
        self.forget(card, now, reset_count).map(after)
    }

    /// Recompute the due dates of review cards under this scheduler's
    /// parameters. Cards not in review pass through unchanged; so does
    /// everything a caller's wrapper type carries besides the card. Fails on
    /// the first card that cannot be scheduled from.
    pub fn reschedule<C, I>(&self, cards: I, options: RescheduleOptions) -> Fallible<Vec<C>>
    where
        C: BorrowMut<Card>,
        I: IntoIterator<Item = C>,
    {
        let mut cards: Vec<C> = cards.into_iter().collect();
        let mut changed = 0;
        for item in cards.iter_mut() {
            let card = <C as BorrowMut<Card>>::borrow_mut(item);
            check_card(card)?;
            let last_review = match (card.state, card.last_review) {
                (State::Review, Some(last_review)) => last_review,
                _ => continue,
            };
            // The interval depends on stability alone, not on how much
            // the card has been forgotten since its last review.
            let fuzz = self.fuzz(options.enable_fuzz, last_review, card);
            let ivl = self
                .intervals
                .next_interval(card.stability, card.elapsed_days, fuzz);
            log::trace!(
                "Rescheduling card with stability {}: {} -> {ivl} days",
                card.stability,
                card.scheduled_days
            );
            card.scheduled_days = ivl as f64;
            card.due = last_review.plus_days(ivl)?;
            changed += 1;
        }
        log::debug!("Rescheduled {changed} of {} cards", cards.len());
        Ok(cards)
    }

    pub fn reschedule_with<C, I, U>(
        &self,
        cards: I,
        options: RescheduleOptions,
        after: impl FnOnce(Vec<C>) -> U,
    ) -> Fallible<U>
    where
        C: BorrowMut<Card>,
        I: IntoIterator<Item = C>,
    {
        self.reschedule(cards, options).map(after)
    }

    /// Probability of recalling `card` at `now`, or `None` if it has never
    /// been reviewed.
    pub fn retrievability(&self, card: &Card, now: Timestamp) -> Fallible<Option<f64>> {
        check_card(card)?;
        let r = match (card.state, card.last_review) {
            (State::New, _) | (_, None) => None,
            (_, Some(last_review)) => {
                let t = now.days_since(last_review) as f64;
                Some(forgetting_curve(t, card.stability))
            }
        };
        Ok(r)
    }

    /// [`Scheduler::retrievability`] as a percentage string, e.g. `"90.00%"`.
    pub fn get_retrievability(
        &self,
        card: &Card,
        now: impl Into<DateInput>,
    ) -> Fallible<Option<String>> {
        let now = now.into().normalize("now")?;
        Ok(self
            .retrievability(card, now)?
            .map(|r| format!("{:.2}%", r * 100.0)))
    }

    fn fuzz(&self, enabled: bool, now: Timestamp, card: &Card) -> FuzzFactor {
        if !enabled {
            return None;
        }
        let seed = self
            .seed
            .unwrap_or_else(|| derive_seed(now, card.reps, card.difficulty, card.stability));
        Some(fuzz_factor(seed))
    }
}
