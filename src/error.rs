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

/// What went wrong, coarsely. Lets callers tell a bad configuration apart
/// from bad per-call input without matching on message text.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum ErrorKind {
    /// The scheduler configuration is invalid.
    Config,
    /// A caller-supplied value could not be understood.
    Input {
        /// The name of the offending field.
        field: String,
    },
    /// The operation was asked to do something it does not support.
    Contract,
    /// Anything else: I/O, serialization.
    Other,
}

#[derive(Clone, Debug)]
pub struct ErrorReport {
    kind: ErrorKind,
    message: String,
}

impl ErrorReport {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Other,
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Config,
            message: message.into(),
        }
    }

    pub fn input(field: &str, message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Input {
                field: field.to_string(),
            },
            message: message.into(),
        }
    }

    pub fn contract(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Contract,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for ErrorReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            ErrorKind::Config => write!(f, "invalid configuration: {}", self.message),
            ErrorKind::Input { field } => write!(f, "invalid {field}: {}", self.message),
            ErrorKind::Contract | ErrorKind::Other => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for ErrorReport {}

pub type Fallible<T> = Result<T, ErrorReport>;

pub fn fail<T>(message: impl Into<String>) -> Fallible<T> {
    Err(ErrorReport::new(message))
}

impl From<std::io::Error> for ErrorReport {
    fn from(value: std::io::Error) -> Self {
        ErrorReport::new(format!("I/O error: {value}"))
    }
}

/// Fields whose deserializers report failures as `invalid <field>: ...`.
const TOKEN_FIELDS: &[&str] = &["rating", "grade", "state", "date"];

impl From<serde_json::Error> for ErrorReport {
    fn from(value: serde_json::Error) -> Self {
        if value.classify() == serde_json::error::Category::Data {
            let text = value.to_string();
            let parsed = text
                .strip_prefix("invalid ")
                .and_then(|rest| rest.split_once(": "))
                .filter(|(field, _)| TOKEN_FIELDS.contains(field));
            if let Some((field, message)) = parsed {
                return ErrorReport::input(field, message);
            }
        }
        ErrorReport::new(format!("JSON error: {value}"))
    }
}

impl From<toml::de::Error> for ErrorReport {
    fn from(value: toml::de::Error) -> Self {
        ErrorReport::config(format!("TOML error: {value}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fail() {
        let result: Fallible<()> = fail("nope");
        let err = result.unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::Other);
        assert_eq!(err.to_string(), "nope");
    }

    #[test]
    fn test_input_error_names_field() {
        let err = ErrorReport::input("rating", "unknown rating `meh`");
        assert_eq!(
            err.kind(),
            &ErrorKind::Input {
                field: "rating".to_string()
            }
        );
        assert_eq!(err.to_string(), "invalid rating: unknown rating `meh`");
    }

    #[test]
    fn test_json_token_error_keeps_field() {
        let json = r#"{"due": 0, "stability": 0, "difficulty": 0, "elapsed_days": 0,
            "scheduled_days": 0, "reps": 0, "lapses": 0, "state": "graduated"}"#;
        let err: ErrorReport = serde_json::from_str::<crate::types::card::Card>(json)
            .unwrap_err()
            .into();
        assert_eq!(
            err.kind(),
            &ErrorKind::Input {
                field: "state".to_string()
            }
        );
        assert!(err.to_string().starts_with("invalid state: unknown state `graduated`"));
    }

    #[test]
    fn test_json_shape_error_is_other() {
        let err: ErrorReport = serde_json::from_str::<crate::types::card::Card>("{")
            .unwrap_err()
            .into();
        assert_eq!(err.kind(), &ErrorKind::Other);
        let err: ErrorReport = serde_json::from_str::<crate::types::state::State>("[1]")
            .unwrap_err()
            .into();
        assert_eq!(err.kind(), &ErrorKind::Other);
    }
}
