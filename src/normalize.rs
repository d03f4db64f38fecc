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

//! Coercion of loosely-typed caller input into the canonical values the
//! scheduler works with. Nothing past this module looks at how a date,
//! rating or state was originally spelled.

use std::str::FromStr;

use chrono::DateTime;
use chrono::NaiveDate;
use chrono::NaiveDateTime;
use chrono::Utc;
use serde::Deserialize;

use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::types::card::Card;
use crate::types::state::State;
use crate::types::timestamp::Timestamp;

/// Something that can be turned into an instant.
#[derive(Clone, PartialEq, Debug, Deserialize)]
#[serde(untagged)]
pub enum DateInput {
    /// Milliseconds since the Unix epoch.
    Millis(i64),
    /// RFC 3339, `YYYY-MM-DD HH:MM:SS` (UTC) or `YYYY-MM-DD` (UTC midnight).
    Text(String),
    #[serde(skip)]
    Instant(Timestamp),
    /// A calendar day, taken as UTC midnight.
    #[serde(skip)]
    Date(NaiveDate),
}

impl DateInput {
    /// Resolve to a canonical instant. `field` names the input in errors.
    pub fn normalize(&self, field: &str) -> Fallible<Timestamp> {
        match self {
            DateInput::Instant(ts) => Ok(*ts),
            DateInput::Millis(ms) => Timestamp::from_millis(*ms).ok_or_else(|| {
                ErrorReport::input(field, format!("timestamp {ms} is out of range"))
            }),
            DateInput::Date(date) => Ok(midnight(*date)),
            DateInput::Text(text) => parse_text(text.trim())
                .ok_or_else(|| ErrorReport::input(field, format!("cannot parse date `{text}`"))),
        }
    }
}

fn parse_text(text: &str) -> Option<Timestamp> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Some(Timestamp::new(ts.with_timezone(&Utc)));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S") {
        return Some(Timestamp::new(naive.and_utc()));
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Some(midnight(date));
    }
    if let Ok(ms) = text.parse::<i64>() {
        return Timestamp::from_millis(ms);
    }
    None
}

fn midnight(date: NaiveDate) -> Timestamp {
    Timestamp::new(date.and_time(chrono::NaiveTime::MIN).and_utc())
}

impl From<Timestamp> for DateInput {
    fn from(value: Timestamp) -> Self {
        DateInput::Instant(value)
    }
}

impl From<DateTime<Utc>> for DateInput {
    fn from(value: DateTime<Utc>) -> Self {
        DateInput::Instant(Timestamp::new(value))
    }
}

impl From<NaiveDate> for DateInput {
    fn from(value: NaiveDate) -> Self {
        DateInput::Date(value)
    }
}

impl From<i64> for DateInput {
    fn from(value: i64) -> Self {
        DateInput::Millis(value)
    }
}

impl From<&str> for DateInput {
    fn from(value: &str) -> Self {
        DateInput::Text(value.to_string())
    }
}

impl From<String> for DateInput {
    fn from(value: String) -> Self {
        DateInput::Text(value)
    }
}

/// Normalize any date-like value into a canonical instant.
pub fn normalize_date(input: impl Into<DateInput>) -> Fallible<Timestamp> {
    input.into().normalize("date")
}

/// Reject cards whose memory fields cannot be scheduled from.
pub fn check_card(card: &Card) -> Fallible<()> {
    for (field, value) in [
        ("stability", card.stability),
        ("difficulty", card.difficulty),
        ("scheduled_days", card.scheduled_days),
    ] {
        if !value.is_finite() || value < 0.0 {
            return Err(ErrorReport::input(
                field,
                format!("expected a finite, non-negative number, got {value}"),
            ));
        }
    }
    if card.state != State::New && card.stability <= 0.0 {
        return Err(ErrorReport::input(
            "stability",
            format!("a {} card must have positive stability", card.state),
        ));
    }
    Ok(())
}

/// A symbolic name or an ordinal code, as found in JSON input for ratings
/// and states.
#[derive(Deserialize)]
#[serde(untagged)]
pub(crate) enum Token {
    Code(i64),
    Name(String),
}

impl Token {
    pub(crate) fn parse<T>(&self) -> Fallible<T>
    where
        T: FromStr<Err = ErrorReport>,
    {
        match self {
            Token::Code(code) => code.to_string().parse(),
            Token::Name(name) => name.parse(),
        }
    }
}
