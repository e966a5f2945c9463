use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use snafu::Snafu;

/// A container environment variable, written `NAME=VALUE` on the command line.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct EnvVar {
    pub name: String,

    pub value: String,
}

impl EnvVar {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self { name: name.into(), value: value.into() }
    }
}

impl fmt::Display for EnvVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)
    }
}

impl FromStr for EnvVar {
    type Err = EnvVarError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        // Only the first '=' separates the name; values may contain '='.
        let Some((name, value)) = input.split_once('=') else {
            return InvalidFormatSnafu { input }.fail();
        };

        let name = name.trim();
        if name.is_empty() {
            return EmptyNameSnafu { input }.fail();
        }
        if name.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return InvalidNameSnafu { name }.fail();
        }

        Ok(Self::new(name, value))
    }
}

#[derive(Debug, Snafu, PartialEq, Eq)]
#[snafu(visibility(pub))]
pub enum EnvVarError {
    #[snafu(display("Invalid format: expected 'NAME=VALUE', got '{input}'"))]
    InvalidFormat { input: String },

    #[snafu(display("Environment variable name is empty in '{input}'"))]
    EmptyName { input: String },

    #[snafu(display("Invalid environment variable name '{name}'"))]
    InvalidName { name: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_name_and_value() {
        let env: EnvVar = "SPRING_CLOUD_DISCOVERY_REACTIVE_ENABLED=FALSE".parse().unwrap();
        assert_eq!(env, EnvVar::new("SPRING_CLOUD_DISCOVERY_REACTIVE_ENABLED", "FALSE"));
    }

    #[test]
    fn test_value_may_contain_equals_and_spaces() {
        let env: EnvVar =
            "SPRING_CLOUD_KUBERNETES_DISCOVERY_FILTER=#root.a == 'b c'".parse().unwrap();
        assert_eq!(env.value, "#root.a == 'b c'");
        assert_eq!(env.to_string(), "SPRING_CLOUD_KUBERNETES_DISCOVERY_FILTER=#root.a == 'b c'");
    }

    #[test]
    fn test_empty_value_is_allowed() {
        let env: EnvVar = "DEBUG=".parse().unwrap();
        assert_eq!(env.value, "");
    }

    #[test]
    fn test_error_missing_separator() {
        let err = "DEBUG".parse::<EnvVar>().unwrap_err();
        assert_eq!(err, EnvVarError::InvalidFormat { input: "DEBUG".to_string() });
    }

    #[test]
    fn test_error_empty_name() {
        let err = "=TRUE".parse::<EnvVar>().unwrap_err();
        assert!(matches!(err, EnvVarError::EmptyName { .. }));
    }

    #[test]
    fn test_error_name_with_whitespace() {
        let err = "MY VAR=1".parse::<EnvVar>().unwrap_err();
        assert_eq!(err, EnvVarError::InvalidName { name: "MY VAR".to_string() });
    }
}
