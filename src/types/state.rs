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

use std::fmt::Display;
use std::fmt::Formatter;
use std::str::FromStr;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;

use crate::error::ErrorReport;
use crate::normalize::Token;
use crate::types::grade::Grade;

/// Where a card is in its learning lifecycle.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum State {
    /// Never reviewed.
    New = 0,
    /// Reviewed, but still in the short-step learning phase.
    Learning = 1,
    /// Graduated; scheduled in days by the memory model.
    Review = 2,
    /// Lapsed from review, going through short steps again.
    Relearning = 3,
}

impl State {
    pub fn as_str(self) -> &'static str {
        match self {
            State::New => "New",
            State::Learning => "Learning",
            State::Review => "Review",
            State::Relearning => "Relearning",
        }
    }

    /// The state a card moves to when it is reviewed with `grade`.
    pub fn next(self, grade: Grade) -> State {
        match (self, grade) {
            (State::New, Grade::Easy) => State::Review,
            (State::New, _) => State::Learning,
            (State::Learning | State::Relearning, Grade::Again | Grade::Hard) => self,
            (State::Learning | State::Relearning, Grade::Good | Grade::Easy) => State::Review,
            (State::Review, Grade::Again) => State::Relearning,
            (State::Review, _) => State::Review,
        }
    }
}

impl TryFrom<u8> for State {
    type Error = ErrorReport;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(State::New),
            1 => Ok(State::Learning),
            2 => Ok(State::Review),
            3 => Ok(State::Relearning),
            _ => Err(ErrorReport::input(
                "state",
                format!("unknown state code {value}"),
            )),
        }
    }
}

impl FromStr for State {
    type Err = ErrorReport;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(code) = s.parse::<u8>() {
            return State::try_from(code);
        }
        match s.to_ascii_lowercase().as_str() {
            "new" => Ok(State::New),
            "learning" => Ok(State::Learning),
            "review" => Ok(State::Review),
            "relearning" => Ok(State::Relearning),
            _ => Err(ErrorReport::input("state", format!("unknown state `{s}`"))),
        }
    }
}

impl Display for State {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for State {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for State {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let token = Token::deserialize(deserializer)?;
        token.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_table() {
        use Grade::*;
        use State::*;
        let table = [
            (New, [Learning, Learning, Learning, Review]),
            (Learning, [Learning, Learning, Review, Review]),
            (Relearning, [Relearning, Relearning, Review, Review]),
            (Review, [Relearning, Review, Review, Review]),
        ];
        for (state, expected) in table {
            for (grade, next) in [Again, Hard, Good, Easy].into_iter().zip(expected) {
                assert_eq!(state.next(grade), next, "{state} + {grade}");
            }
        }
    }

    #[test]
    fn test_parse_state() {
        assert_eq!("review".parse::<State>().ok(), Some(State::Review));
        assert_eq!("3".parse::<State>().ok(), Some(State::Relearning));
        assert!("graduated".parse::<State>().is_err());
        assert!("7".parse::<State>().is_err());
    }
}
