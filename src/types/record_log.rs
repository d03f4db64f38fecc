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

use std::ops::Index;

use serde::Serialize;

use crate::types::card::Card;
use crate::types::grade::Grade;
use crate::types::review_log::ReviewLog;

/// One possible outcome of reviewing a card.
#[derive(Clone, PartialEq, Debug, Serialize)]
pub struct RecordLogItem {
    pub card: Card,
    pub log: ReviewLog,
}

/// The outcome of reviewing a card now, for every grade the learner might
/// give.
#[derive(Clone, PartialEq, Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct RecordLog {
    again: RecordLogItem,
    hard: RecordLogItem,
    good: RecordLogItem,
    easy: RecordLogItem,
}

impl RecordLog {
    pub(crate) fn new(
        again: RecordLogItem,
        hard: RecordLogItem,
        good: RecordLogItem,
        easy: RecordLogItem,
    ) -> Self {
        Self {
            again,
            hard,
            good,
            easy,
        }
    }

    pub fn get(&self, grade: Grade) -> &RecordLogItem {
        match grade {
            Grade::Again => &self.again,
            Grade::Hard => &self.hard,
            Grade::Good => &self.good,
            Grade::Easy => &self.easy,
        }
    }

    /// Keep only the outcome for the grade the learner chose.
    pub fn take(self, grade: Grade) -> RecordLogItem {
        match grade {
            Grade::Again => self.again,
            Grade::Hard => self.hard,
            Grade::Good => self.good,
            Grade::Easy => self.easy,
        }
    }

    /// Outcomes in ascending grade order.
    pub fn iter(&self) -> impl Iterator<Item = (Grade, &RecordLogItem)> {
        Grade::ALL.into_iter().map(move |g| (g, self.get(g)))
    }
}

impl Index<Grade> for RecordLog {
    type Output = RecordLogItem;

    fn index(&self, grade: Grade) -> &Self::Output {
        self.get(grade)
    }
}
