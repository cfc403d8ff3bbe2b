use std::fmt;

/// Machine-readable error codes for agent-friendly decision making.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigParseError,
    EmptyAppendBatch,
    MissingAggregateId,
    EntityMismatch,
    UnknownEventType,
    UnknownSlice,
    PayloadMismatch,
    StaleProjection,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ConfigParseError => "E1001",
            Self::EmptyAppendBatch => "E2001",
            Self::MissingAggregateId => "E2002",
            Self::EntityMismatch => "E2003",
            Self::UnknownEventType => "E2004",
            Self::UnknownSlice => "E2005",
            Self::PayloadMismatch => "E3001",
            Self::StaleProjection => "E3002",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ConfigParseError => "Config file parse error",
            Self::EmptyAppendBatch => "Append batch is empty",
            Self::MissingAggregateId => "Event has no aggregate id",
            Self::EntityMismatch => "Event entity disagrees with event type",
            Self::UnknownEventType => "Unknown event type",
            Self::UnknownSlice => "Unknown projection slice",
            Self::PayloadMismatch => "Payload does not match event type",
            Self::StaleProjection => "Projection fell behind the log",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint that can be surfaced to operators and agents.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::ConfigParseError => Some("Fix syntax in keel.toml and retry."),
            Self::EmptyAppendBatch => Some("Submit at least one event per append call."),
            Self::MissingAggregateId | Self::EntityMismatch | Self::PayloadMismatch => {
                Some("Fix the command handler that constructed the event.")
            }
            Self::UnknownEventType => Some("Use one of the documented <entity>.<verb> types."),
            Self::UnknownSlice => {
                Some("Use one of: teams, companies, feed, initiatives, kanban, tags, links.")
            }
            Self::StaleProjection => Some("Rebuild the affected projection to recover."),
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::ErrorCode;
    use std::collections::HashSet;

    const ALL: [ErrorCode; 9] = [
        ErrorCode::ConfigParseError,
        ErrorCode::EmptyAppendBatch,
        ErrorCode::MissingAggregateId,
        ErrorCode::EntityMismatch,
        ErrorCode::UnknownEventType,
        ErrorCode::UnknownSlice,
        ErrorCode::PayloadMismatch,
        ErrorCode::StaleProjection,
        ErrorCode::InternalUnexpected,
    ];

    #[test]
    fn all_codes_are_unique() {
        let mut seen = HashSet::new();
        for code in ALL {
            assert!(seen.insert(code.code()), "duplicate code {}", code.code());
        }
    }

    #[test]
    fn code_format_is_machine_friendly() {
        for code in ALL {
            let id = code.code();
            assert_eq!(id.len(), 5);
            assert!(id.starts_with('E'));
            assert!(id.chars().skip(1).all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn messages_are_nonempty() {
        for code in ALL {
            assert!(!code.message().is_empty());
        }
    }
}
