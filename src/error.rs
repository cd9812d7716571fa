//! Error types raised while building an element tree.
//!
//! Evaluation itself never fails: an expired deadline becomes a `succeeded = false`
//! outcome and cancellation becomes silent non-emission. The only caller-visible
//! errors are construction-time ones, collected in [`ConfigError`].
//!
//! Like the rest of the crate, errors provide `as_label` (stable snake_case label for
//! logs/metrics) and `as_message` (human-readable detail).

use thiserror::Error;

/// # Errors produced while turning an [`ElementConfig`](crate::ElementConfig) into an element tree.
///
/// Misconfiguration fails fast here, never during evaluation.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A strategy was configured but no children were added.
    #[error("group {id:?} has a strategy but no children")]
    EmptyGroup {
        /// Identifier of the offending element.
        id: String,
    },

    /// A deadline of zero was configured; nothing could ever complete within it.
    #[error("element {id:?} has a zero deadline")]
    ZeroDeadline {
        /// Identifier of the offending element.
        id: String,
    },

    /// A group carries an option that only leaves understand.
    #[error("group {id:?} sets leaf-only option `{option}`")]
    LeafOnlyOption {
        /// Identifier of the offending element.
        id: String,
        /// Name of the option.
        option: &'static str,
    },

    /// The TOML document could not be parsed into a tree configuration.
    #[error("invalid tree configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

impl ConfigError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use waterfall::ConfigError;
    ///
    /// let err = ConfigError::EmptyGroup { id: "root".into() };
    /// assert_eq!(err.as_label(), "config_empty_group");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ConfigError::EmptyGroup { .. } => "config_empty_group",
            ConfigError::ZeroDeadline { .. } => "config_zero_deadline",
            ConfigError::LeafOnlyOption { .. } => "config_leaf_only_option",
            ConfigError::Parse(_) => "config_parse",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            ConfigError::EmptyGroup { id } => format!("empty group: id={id:?}"),
            ConfigError::ZeroDeadline { id } => format!("zero deadline: id={id:?}"),
            ConfigError::LeafOnlyOption { id, option } => {
                format!("leaf-only option on group: id={id:?} option={option}")
            }
            ConfigError::Parse(e) => format!("parse: {e}"),
        }
    }

    /// Identifier of the element that failed validation, if any.
    pub fn element_id(&self) -> Option<&str> {
        match self {
            ConfigError::EmptyGroup { id }
            | ConfigError::ZeroDeadline { id }
            | ConfigError::LeafOnlyOption { id, .. } => Some(id),
            ConfigError::Parse(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_are_stable() {
        let cases = [
            (ConfigError::EmptyGroup { id: "g".into() }, "config_empty_group"),
            (ConfigError::ZeroDeadline { id: "l".into() }, "config_zero_deadline"),
            (
                ConfigError::LeafOnlyOption {
                    id: "g".into(),
                    option: "simulated_outcome",
                },
                "config_leaf_only_option",
            ),
        ];
        for (err, label) in cases {
            assert_eq!(err.as_label(), label);
        }
    }

    #[test]
    fn test_message_and_element_id() {
        let err = ConfigError::LeafOnlyOption {
            id: "waterfall".into(),
            option: "completion_latency",
        };
        assert_eq!(err.element_id(), Some("waterfall"));
        assert!(err.as_message().contains("completion_latency"));
        assert_eq!(
            err.to_string(),
            "group \"waterfall\" sets leaf-only option `completion_latency`"
        );
    }
}
