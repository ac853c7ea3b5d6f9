//! Reasons an inbound command can be malformed.

use std::fmt;
use thiserror::Error;

/// One problem found in an inbound command message.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PayloadViolation {
    #[error("unknown command '{command}'")]
    UnknownCommand { command: String },

    #[error("payload must be a JSON object")]
    PayloadNotObject,

    #[error("missing field '{field}'")]
    MissingField { field: &'static str },

    #[error("field '{field}' must be a {expected}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
    },

    #[error("unknown beverage '{beverage}'")]
    UnknownBeverage { beverage: String },

    #[error("unparseable message: {0}")]
    Unparseable(String),
}

/// An inbound command that failed validation, with every problem found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedCommand {
    pub command: String,
    pub violations: Vec<PayloadViolation>,
}

impl MalformedCommand {
    pub fn new(command: impl Into<String>, violations: Vec<PayloadViolation>) -> Self {
        Self {
            command: command.into(),
            violations,
        }
    }

    pub fn contains(&self, violation: &PayloadViolation) -> bool {
        self.violations.contains(violation)
    }
}

impl fmt::Display for MalformedCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "malformed command '{}': ", self.command)?;
        for (i, violation) in self.violations.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{violation}")?;
        }
        Ok(())
    }
}

impl std::error::Error for MalformedCommand {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_joins_violations() {
        let err = MalformedCommand::new(
            "select_beverage",
            vec![
                PayloadViolation::PayloadNotObject,
                PayloadViolation::MissingField { field: "beverage" },
            ],
        );
        assert_eq!(
            err.to_string(),
            "malformed command 'select_beverage': payload must be a JSON object; missing field 'beverage'"
        );
    }
}
