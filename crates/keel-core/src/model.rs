use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Lifecycle state of a strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyState {
    #[default]
    Draft,
    Active,
    Retired,
}

impl StrategyState {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Active => "active",
            Self::Retired => "retired",
        }
    }
}

impl fmt::Display for StrategyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyState {
    type Err = InvalidEnumValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "active" => Ok(Self::Active),
            "retired" => Ok(Self::Retired),
            _ => Err(InvalidEnumValue {
                kind: "strategy state",
                raw: s.to_string(),
                expected: "draft, active, retired",
            }),
        }
    }
}

/// Kanban column a board element currently sits in.
///
/// Boards allow free movement between columns; no transition rules are
/// enforced at the event level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KanbanStatus {
    #[default]
    New,
    InProgress,
    Review,
    Done,
}

impl KanbanStatus {
    const fn as_str(self) -> &'static str {
        match self {
            Self::New => "NEW",
            Self::InProgress => "IN_PROGRESS",
            Self::Review => "REVIEW",
            Self::Done => "DONE",
        }
    }
}

impl fmt::Display for KanbanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KanbanStatus {
    type Err = InvalidEnumValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NEW" => Ok(Self::New),
            "IN_PROGRESS" => Ok(Self::InProgress),
            "REVIEW" => Ok(Self::Review),
            "DONE" => Ok(Self::Done),
            _ => Err(InvalidEnumValue {
                kind: "kanban status",
                raw: s.to_string(),
                expected: "NEW, IN_PROGRESS, REVIEW, DONE",
            }),
        }
    }
}

/// Error returned when parsing an unknown enum string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind} '{raw}': expected one of {expected}")]
pub struct InvalidEnumValue {
    /// Which enum failed to parse.
    pub kind: &'static str,
    /// The unrecognised input string.
    pub raw: String,
    /// Comma-separated list of accepted values.
    pub expected: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strategy_state_roundtrip() {
        for state in [
            StrategyState::Draft,
            StrategyState::Active,
            StrategyState::Retired,
        ] {
            let s = state.to_string();
            assert_eq!(s.parse::<StrategyState>().expect("parse"), state);
            let json = serde_json::to_string(&state).expect("serialize");
            assert_eq!(json, format!("\"{s}\""));
        }
    }

    #[test]
    fn strategy_state_default_is_draft() {
        assert_eq!(StrategyState::default(), StrategyState::Draft);
    }

    #[test]
    fn kanban_status_roundtrip() {
        for status in [
            KanbanStatus::New,
            KanbanStatus::InProgress,
            KanbanStatus::Review,
            KanbanStatus::Done,
        ] {
            let s = status.to_string();
            assert_eq!(s.parse::<KanbanStatus>().expect("parse"), status);
            let json = serde_json::to_string(&status).expect("serialize");
            assert_eq!(json, format!("\"{s}\""));
        }
    }

    #[test]
    fn kanban_status_serde_uses_screaming_snake() {
        let json = serde_json::to_string(&KanbanStatus::InProgress).expect("serialize");
        assert_eq!(json, "\"IN_PROGRESS\"");
        let deser: KanbanStatus = serde_json::from_str("\"IN_PROGRESS\"").expect("deserialize");
        assert_eq!(deser, KanbanStatus::InProgress);
    }

    #[test]
    fn invalid_enum_error_lists_expected() {
        let err = "SHIPPED".parse::<KanbanStatus>().unwrap_err();
        assert!(err.to_string().contains("SHIPPED"));
        assert!(err.to_string().contains("IN_PROGRESS"));
    }
}
