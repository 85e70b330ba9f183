// ABOUTME: Names of server groups used as the leading task name segment.
// ABOUTME: Rejects characters that would break the `group:engine:task` namespace.

use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GroupNameError {
    #[error("group name cannot be empty")]
    Empty,

    #[error("invalid character in group name: '{0}'")]
    InvalidChar(char),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroupName(String);

impl GroupName {
    pub fn new(value: &str) -> Result<Self, GroupNameError> {
        if value.is_empty() {
            return Err(GroupNameError::Empty);
        }

        for c in value.chars() {
            if !c.is_ascii_alphanumeric() && c != '-' && c != '_' {
                return Err(GroupNameError::InvalidChar(c));
            }
        }

        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroupName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_simple_names() {
        assert_eq!(GroupName::new("staging").unwrap().as_str(), "staging");
        assert!(GroupName::new("eu_west-1").is_ok());
    }

    #[test]
    fn rejects_namespace_separator() {
        assert_eq!(
            GroupName::new("staging:web"),
            Err(GroupNameError::InvalidChar(':'))
        );
    }

    #[test]
    fn rejects_empty() {
        assert_eq!(GroupName::new(""), Err(GroupNameError::Empty));
    }
}
