//! Error types for simulation requests and workload loading.
//!
//! Engines never panic on bad input: every public entry point validates the
//! workload first and reports a [`SimError`]. Variants carrying a process id
//! name the offending record so callers can point at it.

use std::fmt;
use std::io;

/// Rejected simulation input.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum InvalidInput {
    /// No processes were supplied.
    EmptyWorkload,
    /// A process id was empty.
    EmptyProcessId,
    /// Two records share the same process id.
    DuplicateProcessId(String),
    /// A process asked for zero CPU time.
    NonPositiveBurst(String),
    /// The last arrival plus the total burst does not fit in `Ticks`.
    TimeOverflow,
    /// Round Robin was requested without a time quantum.
    MissingQuantum,
    /// Round Robin was requested with a zero time quantum.
    NonPositiveQuantum,
}

impl fmt::Display for InvalidInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyWorkload => write!(f, "no processes provided"),
            Self::EmptyProcessId => write!(f, "process id must not be empty"),
            Self::DuplicateProcessId(id) => write!(f, "process id '{id}' is not unique"),
            Self::NonPositiveBurst(id) => {
                write!(f, "process '{id}' must have a burst time greater than 0")
            }
            Self::TimeOverflow => {
                write!(f, "workload runs past the largest representable time")
            }
            Self::MissingQuantum => write!(f, "round robin requires a time quantum"),
            Self::NonPositiveQuantum => write!(f, "time quantum must be greater than 0"),
        }
    }
}

impl std::error::Error for InvalidInput {}

/// Errors surfaced by the simulation API.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SimError {
    /// The workload or its parameters failed validation.
    InvalidInput(InvalidInput),
    /// The policy identifier is not one of the known policies.
    UnknownPolicy(String),
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidInput(err) => write!(f, "invalid input: {err}"),
            Self::UnknownPolicy(name) => write!(f, "unknown scheduling policy '{name}'"),
        }
    }
}

impl std::error::Error for SimError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidInput(err) => Some(err),
            Self::UnknownPolicy(_) => None,
        }
    }
}

impl From<InvalidInput> for SimError {
    fn from(err: InvalidInput) -> Self {
        Self::InvalidInput(err)
    }
}

/// Errors from reading a workload or config file.
#[derive(Debug)]
#[non_exhaustive]
pub enum ConfigError {
    /// I/O error while reading the file.
    Io(io::Error),
    /// The file is not valid JSON for the expected schema.
    Parse(serde_json::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "I/O error: {err}"),
            Self::Parse(err) => write!(f, "malformed workload: {err}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Parse(err) => Some(err),
        }
    }
}

impl From<io::Error> for ConfigError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn display_names_the_offending_process() {
        let err = SimError::from(InvalidInput::DuplicateProcessId("P1".into()));
        assert_eq!(err.to_string(), "invalid input: process id 'P1' is not unique");
        assert!(err.source().is_some());
    }

    #[test]
    fn unknown_policy_has_no_source() {
        let err = SimError::UnknownPolicy("lottery".into());
        assert_eq!(err.to_string(), "unknown scheduling policy 'lottery'");
        assert!(err.source().is_none());
    }
}
