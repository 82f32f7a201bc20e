//! Error types for the core layer.

/// Errors raised while declaring modules.
///
/// These are fatal: a module that fails to declare must not be
/// registered, and setup should halt rather than continue with a
/// half-built namespace.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The namespace is empty or contains reserved characters.
    #[error("invalid namespace '{namespace}': {message}")]
    InvalidNamespace { namespace: String, message: String },

    /// An action was referenced that the module never declared.
    #[error("module '{namespace}' declares no action named '{name}'")]
    UnknownAction { namespace: String, name: String },
}

/// A failure surfaced by an asynchronous sequence step.
///
/// Carries only a message: the engine forwards it as the payload of an
/// `ERROR` sub-action, and flows receive it back as [`Resume::Error`]
/// when an awaited task fails.
///
/// [`Resume::Error`]: crate::Resume::Error
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct FlowError {
    pub message: String,
}

impl FlowError {
    pub fn new(message: impl Into<String>) -> Self {
        FlowError {
            message: message.into(),
        }
    }
}

impl From<&str> for FlowError {
    fn from(message: &str) -> Self {
        FlowError::new(message)
    }
}

impl From<String> for FlowError {
    fn from(message: String) -> Self {
        FlowError { message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display() {
        let e = ConfigError::InvalidNamespace {
            namespace: "".to_string(),
            message: "must not be empty".to_string(),
        };
        assert!(e.to_string().contains("must not be empty"));

        let e = ConfigError::UnknownAction {
            namespace: "counter".to_string(),
            name: "reset".to_string(),
        };
        assert!(e.to_string().contains("counter"));
        assert!(e.to_string().contains("reset"));
    }

    #[test]
    fn flow_error_display_is_message() {
        let e = FlowError::new("request failed");
        assert_eq!(e.to_string(), "request failed");
    }

    #[test]
    fn flow_error_conversions() {
        let e: FlowError = "boom".into();
        assert_eq!(e.message, "boom");
        let e: FlowError = String::from("bang").into();
        assert_eq!(e.message, "bang");
    }
}
