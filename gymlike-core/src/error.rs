//! Errors in the library.
use thiserror::Error;

/// Errors in the library.
///
/// Public operations return [`anyhow::Result`]; errors detected by the library
/// itself are raised as one of these variants and can be recovered with
/// `err.downcast_ref::<GymLikeError>()`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GymLikeError {
    /// The environment (or the task of the environment) is not provided by the library.
    #[error("{env_name} with task {} is unknown in {libname}", task_name.as_deref().unwrap_or("None"))]
    Configuration {
        /// Name of the environment.
        env_name: String,

        /// Name of the task, if any.
        task_name: Option<String>,

        /// Name of the simulator library.
        libname: String,
    },

    /// Invalid value in a configuration of the adapter.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Action outside of the declared action space.
    #[error("Invalid action: {0}")]
    InvalidAction(String),

    /// A value has an unexpected type.
    #[error("Expected {expected} but got {actual}")]
    Type {
        /// Expected type.
        expected: String,

        /// Type actually received.
        actual: String,
    },

    /// A configured info key is not in the info structure given by the simulator.
    #[error("Key '{0}' not found in the info of the simulator")]
    MissingInfoKey(String),

    /// The simulator does not implement seeding.
    #[error("Seeding is not implemented for {0}")]
    SeedNotImplemented(String),

    /// Record key error.
    #[error("Record key error: {0}")]
    RecordKey(String),

    /// Record value type error.
    #[error("Record value type error: expected {expected} for key '{key}'")]
    RecordValueType {
        /// Key of the value.
        key: String,

        /// Expected type.
        expected: String,
    },

    /// Number of elements of a field does not fit the declared shape.
    #[error("Shape mismatch of '{key}': expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        /// Key of the field.
        key: String,

        /// Declared shape.
        expected: Vec<usize>,

        /// Shape of the given value.
        actual: Vec<usize>,
    },
}
