use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AdapterError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration parsing error: {message}")]
    ConfigParseError { message: String },

    #[error("Invalid configuration value for '{field}': '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Required environment variable is not set: {name}")]
    MissingEnvError { name: String },

    #[error("Required directory does not exist: {}", path.display())]
    MissingDirectoryError { path: PathBuf },

    #[error("Required file does not exist: {}", path.display())]
    MissingFileError { path: PathBuf },

    #[error("Failed to spawn '{program}': {source}")]
    SpawnError {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{program}' exited unsuccessfully ({status})")]
    CommandFailedError { program: String, status: String },

    #[error("Invalid fuzzer statistics: {reason}")]
    InvalidStatsError { reason: String },
}

impl AdapterError {
    /// 給使用者的修復建議
    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            AdapterError::IoError(_) => "Check permissions and free space of the benchmark directories",
            AdapterError::SerializationError(_) | AdapterError::InvalidStatsError { .. } => {
                "Make sure the fuzzer ran long enough to write its statistics file"
            }
            AdapterError::ConfigParseError { .. } | AdapterError::InvalidConfigValueError { .. } => {
                "Fix the adapter configuration file"
            }
            AdapterError::MissingEnvError { .. } => {
                "Run the adapter inside the benchmark builder/runner environment"
            }
            AdapterError::MissingDirectoryError { .. } | AdapterError::MissingFileError { .. } => {
                "Make sure the fuzzer toolchain image and a previous build step are present"
            }
            AdapterError::SpawnError { .. } => "Make sure the program is installed and on PATH",
            AdapterError::CommandFailedError { .. } => "Inspect the child process output above",
        }
    }
}

pub type Result<T> = std::result::Result<T, AdapterError>;
