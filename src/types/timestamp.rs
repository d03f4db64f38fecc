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

use chrono::DateTime;
use chrono::Duration;
use chrono::SecondsFormat;
use chrono::Utc;
use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;

use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::normalize::DateInput;

/// A canonical instant. Everything the scheduler computes is in terms of
/// these and whole-day or whole-minute offsets between them.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    pub fn new(ts: DateTime<Utc>) -> Self {
        Self(ts)
    }

    pub fn now() -> Self {
        Self(Utc::now())
    }

    pub fn from_millis(ms: i64) -> Option<Self> {
        DateTime::from_timestamp_millis(ms).map(Self)
    }

    pub fn millis(self) -> i64 {
        self.0.timestamp_millis()
    }

    pub fn into_inner(self) -> DateTime<Utc> {
        self.0
    }

    pub fn plus_minutes(self, minutes: i64) -> Fallible<Self> {
        self.plus(Duration::try_minutes(minutes), || format!("{minutes} minutes"))
    }

    pub fn plus_days(self, days: i64) -> Fallible<Self> {
        self.plus(Duration::try_days(days), || format!("{days} days"))
    }

    /// Fails, rather than wrapping or panicking, when the result falls
    /// outside the representable range of dates.
    fn plus(
        self,
        delta: Option<Duration>,
        describe: impl FnOnce() -> String,
    ) -> Fallible<Self> {
        delta
            .and_then(|delta| self.0.checked_add_signed(delta))
            .map(Self)
            .ok_or_else(|| {
                ErrorReport::input("due", format!("{self} plus {} is out of range", describe()))
            })
    }

    /// Whole days elapsed from `earlier` to `self`, never negative.
    pub fn days_since(self, earlier: Timestamp) -> i64 {
        (self.0 - earlier.0).num_days().max(0)
    }

    pub fn to_rfc3339(self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

impl Display for Timestamp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_rfc3339())
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_rfc3339())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let input = DateInput::deserialize(deserializer)?;
        input.normalize("date").map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::error::ErrorKind;

    fn ts(y: i32, m: u32, d: u32, h: u32) -> Timestamp {
        Timestamp::new(Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap())
    }

    #[test]
    fn test_days_since_truncates() {
        let a = ts(2025, 1, 1, 12);
        let b = ts(2025, 1, 4, 11);
        assert_eq!(b.days_since(a), 2);
        assert_eq!(a.days_since(b), 0);
    }

    #[test]
    fn test_offsets() -> Fallible<()> {
        let a = ts(2025, 1, 1, 0);
        assert_eq!(a.plus_days(3)?, ts(2025, 1, 4, 0));
        assert_eq!(a.plus_minutes(90)?, ts(2025, 1, 1, 1).plus_minutes(30)?);
        Ok(())
    }

    #[test]
    fn test_offsets_out_of_range() {
        let last = Timestamp::new(DateTime::<Utc>::MAX_UTC);
        let err = last.plus_minutes(1).unwrap_err();
        assert_eq!(
            err.kind(),
            &ErrorKind::Input {
                field: "due".to_string()
            }
        );
        assert!(last.plus_days(1).is_err());
        assert!(ts(2025, 1, 1, 0).plus_days(i64::MAX).is_err());
        assert!(Timestamp::new(DateTime::<Utc>::MIN_UTC).plus_days(-1).is_err());
    }

    #[test]
    fn test_json() -> Fallible<()> {
        let a = ts(2025, 3, 1, 8);
        let json = serde_json::to_string(&a)?;
        assert_eq!(json, "\"2025-03-01T08:00:00.000Z\"");
        let back: Timestamp = serde_json::from_str(&json)?;
        assert_eq!(back, a);
        let from_ms: Timestamp = serde_json::from_str(&a.millis().to_string())?;
        assert_eq!(from_ms, a);
        Ok(())
    }
}
