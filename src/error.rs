use std::path::PathBuf;
use std::process::ExitStatus;

/// The primary error type for all operations in the `repack` crate.
#[derive(Debug)]
pub enum PackError {
    /// An I/O error occurred, typically while reading or writing a file.
    /// Includes the path where the error happened.
    Io { source: std::io::Error, path: PathBuf },

    /// An error occurred when trying to strip a prefix from a file path.
    StripPrefix { prefix: PathBuf, path: PathBuf },

    /// The tar or gzip layer could not complete its framing.
    Archive(String),

    /// A required key was absent from the property file.
    MissingProperty { key: String },

    /// A property value was present but could not be used.
    InvalidProperty {
        key: String,
        value: String,
        reason: String,
    },

    /// An external packaging tool exited unsuccessfully.
    ToolFailed { tool: String, status: ExitStatus },
}

impl std::fmt::Display for PackError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PackError::Io { source, path } => {
                write!(f, "I/O error on path '{}': {}", path.display(), source)
            }
            PackError::StripPrefix { prefix, path } => write!(
                f,
                "Could not strip prefix '{}' from path '{}'",
                prefix.display(),
                path.display()
            ),
            PackError::Archive(msg) => write!(f, "Archive error: {}", msg),
            PackError::MissingProperty { key } => {
                write!(f, "Missing required property '{}'", key)
            }
            PackError::InvalidProperty { key, value, reason } => {
                write!(f, "Invalid value '{}' for property '{}': {}", value, key, reason)
            }
            PackError::ToolFailed { tool, status } => {
                write!(f, "{} failed: {}", tool, status)
            }
        }
    }
}

impl std::error::Error for PackError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PackError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

// Generic IO error conversion that doesn't require a path
impl From<std::io::Error> for PackError {
    fn from(err: std::io::Error) -> Self {
        PackError::Io {
            source: err,
            path: PathBuf::new(),
        }
    }
}
