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

//! A spaced repetition scheduler built on a forgetting-curve memory model.
//!
//! Given a card and the current time, the [`Scheduler`] forecasts what
//! happens under each of the four grades a learner can give, so the caller
//! can show the outcomes before a grade is chosen. It can also undo a review,
//! force a card to be forgotten, and recompute due dates after the
//! parameters change.

pub mod error;
pub mod fsrs;
pub mod fuzz;
pub mod normalize;
pub mod params;
pub mod scheduler;
pub mod scheduling;
pub mod types;

pub use error::ErrorKind;
pub use error::ErrorReport;
pub use error::Fallible;
pub use normalize::DateInput;
pub use params::Parameters;
pub use scheduler::RescheduleOptions;
pub use scheduler::Scheduler;
pub use types::card::Card;
pub use types::grade::Grade;
pub use types::grade::Rating;
pub use types::record_log::RecordLog;
pub use types::record_log::RecordLogItem;
pub use types::review_log::ReviewLog;
pub use types::state::State;
pub use types::timestamp::Timestamp;
