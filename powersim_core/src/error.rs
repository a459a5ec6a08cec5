//! Unified error handling for powersim.
//!
//! One centralized error type for the whole system, so node code can use
//! `?` everywhere and the scheduler can report failures uniformly.

use thiserror::Error;

/// Main error type for powersim operations
#[derive(Debug, Error)]
pub enum PowerError {
    /// I/O related errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration parsing or validation errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Topic/communication layer errors
    #[error("Communication error: {0}")]
    Communication(String),

    /// Service call errors
    #[error("Service '{service}' error: {message}")]
    Service { service: String, message: String },

    /// Node-related errors
    #[error("Node '{node}' error: {message}")]
    Node { node: String, message: String },

    /// Invalid input/argument errors
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Timeout errors
    #[error("Operation timed out: {0}")]
    Timeout(String),

    /// Resource not found errors
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Already exists errors (for creation operations)
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// Parse errors
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Convenience type alias for Results using PowerError
pub type PowerResult<T> = std::result::Result<T, PowerError>;

/// Short alias — `Result<T>` is equivalent to `PowerResult<T>`
pub type Result<T> = PowerResult<T>;

impl From<std::num::ParseIntError> for PowerError {
    fn from(err: std::num::ParseIntError) -> Self {
        PowerError::Parse(format!("Integer parse error: {}", err))
    }
}

impl From<std::num::ParseFloatError> for PowerError {
    fn from(err: std::num::ParseFloatError) -> Self {
        PowerError::Parse(format!("Float parse error: {}", err))
    }
}

// NOTE: From<String> and From<&str> intentionally absent.
// Use the specific constructors instead so errors stay typed.

impl PowerError {
    /// Create a configuration error with a custom message
    pub fn config<S: Into<String>>(msg: S) -> Self {
        PowerError::Config(msg.into())
    }

    /// Create a communication error
    pub fn communication<S: Into<String>>(msg: S) -> Self {
        PowerError::Communication(msg.into())
    }

    /// Create a service error with service name and message
    pub fn service<S: Into<String>, T: Into<String>>(service: S, message: T) -> Self {
        PowerError::Service {
            service: service.into(),
            message: message.into(),
        }
    }

    /// Create a node error with node name and message
    pub fn node<S: Into<String>, T: Into<String>>(node: S, message: T) -> Self {
        PowerError::Node {
            node: node.into(),
            message: message.into(),
        }
    }

    /// Create an invalid input error
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        PowerError::InvalidInput(msg.into())
    }

    /// Create a timeout error
    pub fn timeout<S: Into<String>>(msg: S) -> Self {
        PowerError::Timeout(msg.into())
    }
}
