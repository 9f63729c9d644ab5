use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Focus,
    Break,
}

/// Kind of study session the timer runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionCategory {
    Pomodoro,
    DeepWork,
    ShortFocus,
    /// Durations chosen by the user and persisted.
    Custom,
}

impl SessionCategory {
    pub const ALL: [SessionCategory; 4] = [
        SessionCategory::Pomodoro,
        SessionCategory::DeepWork,
        SessionCategory::ShortFocus,
        SessionCategory::Custom,
    ];

    /// Name recorded on study sessions and shown to the user.
    pub fn label(&self) -> &'static str {
        match self {
            SessionCategory::Pomodoro => "Pomodoro",
            SessionCategory::DeepWork => "Deep Work",
            SessionCategory::ShortFocus => "Short Focus",
            SessionCategory::Custom => "Custom",
        }
    }

    /// Repeating categories take a long break every few cycles.
    pub fn repeats(&self) -> bool {
        matches!(self, SessionCategory::Pomodoro)
    }
}

impl fmt::Display for SessionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SessionCategory {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "pomodoro" => Ok(SessionCategory::Pomodoro),
            "deepwork" => Ok(SessionCategory::DeepWork),
            "shortfocus" => Ok(SessionCategory::ShortFocus),
            "custom" => Ok(SessionCategory::Custom),
            _ => Err(ValidationError::UnknownCategory(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_loose_names() {
        assert_eq!("Deep Work".parse::<SessionCategory>().unwrap(), SessionCategory::DeepWork);
        assert_eq!("short-focus".parse::<SessionCategory>().unwrap(), SessionCategory::ShortFocus);
        assert_eq!("POMODORO".parse::<SessionCategory>().unwrap(), SessionCategory::Pomodoro);
        assert!("nap".parse::<SessionCategory>().is_err());
    }

    #[test]
    fn only_pomodoro_repeats() {
        let repeating: Vec<_> = SessionCategory::ALL.iter().filter(|c| c.repeats()).collect();
        assert_eq!(repeating, vec![&SessionCategory::Pomodoro]);
    }
}
