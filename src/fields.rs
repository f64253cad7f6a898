//! Enumerations and field types for board tasks.
//!
//! Priorities are stored as plain text in the board document. Decoding is
//! deliberately lenient so that hand-edited or older files never fail to load
//! because of an unexpected priority label.

use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// How pressing a task is.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ValueEnum, PartialEq, Eq, Hash)]
#[serde(from = "String")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    /// All priorities in ascending order, as offered by selectors.
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

    /// Display label, identical to the stored text.
    pub fn label(self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        }
    }

    /// Parse stored or typed text. Returns `None` for unknown labels.
    pub fn parse(s: &str) -> Option<Priority> {
        match s.trim().to_lowercase().as_str() {
            "low" | "baja" => Some(Priority::Low),
            "medium" | "media" => Some(Priority::Medium),
            "high" | "alta" => Some(Priority::High),
            _ => None,
        }
    }
}

impl From<String> for Priority {
    fn from(s: String) -> Self {
        Priority::parse(&s).unwrap_or_default()
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_parse_is_case_insensitive() {
        assert_eq!(Priority::parse("HIGH"), Some(Priority::High));
        assert_eq!(Priority::parse(" low "), Some(Priority::Low));
        assert_eq!(Priority::parse("Alta"), Some(Priority::High));
        assert_eq!(Priority::parse("urgent"), None);
    }

    #[test]
    fn test_priority_stored_as_text() {
        let json = serde_json::to_string(&Priority::High).unwrap();
        assert_eq!(json, "\"High\"");
        let back: Priority = serde_json::from_str("\"Media\"").unwrap();
        assert_eq!(back, Priority::Medium);
    }

    #[test]
    fn test_unknown_priority_defaults_to_medium() {
        let p: Priority = serde_json::from_str("\"whenever\"").unwrap();
        assert_eq!(p, Priority::Medium);
    }
}
