//! Error types for the native call channel

use crate::value::ObjectHandle;

/// Result type for channel calls
pub type ChannelResult<T> = Result<T, ChannelError>;

/// Failures reported by the native side of the channel
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ChannelError {
    /// The handle refers to an object the engine already destroyed
    #[error("Object {0} was destroyed")]
    DestroyedObject(ObjectHandle),

    /// Method is not known for the object's class
    #[error("Class '{class}' has no method '{method}'")]
    UnknownMethod {
        /// Runtime class of the receiver
        class: String,
        /// Requested method
        method: String,
    },

    /// Class is not known to the engine
    #[error("Unknown class: {0}")]
    UnknownClass(String),

    /// No singleton registered under that name
    #[error("Unknown singleton: {0}")]
    UnknownSingleton(String),

    /// Class exists but cannot be instantiated
    #[error("Class '{0}' cannot be instantiated")]
    NotInstantiable(String),

    /// Type mismatch during conversion
    #[error("Type mismatch: expected {expected}, got {got}")]
    TypeMismatch {
        /// Expected type name
        expected: String,
        /// Actual type name
        got: String,
    },

    /// Any other failure reported by the engine
    #[error("{0}")]
    CallFailed(String),
}

impl From<String> for ChannelError {
    fn from(s: String) -> Self {
        ChannelError::CallFailed(s)
    }
}

impl From<&str> for ChannelError {
    fn from(s: &str) -> Self {
        ChannelError::CallFailed(s.to_string())
    }
}
