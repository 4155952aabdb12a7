//! Error type shared by the library and the `infl` binary.
//!
//! Every variant maps to a process exit code so `main` can stay tiny:
//! - `2`: input/configuration problems (missing files, bad schema, bad rows)
//! - `3`: no usable data after alignment
//! - `4`: rendering/terminal failures

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("I/O error on '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse '{}': {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    #[error("Schema error in {context}: {message}")]
    Schema { context: String, message: String },

    #[error("Malformed input in '{}' (line {line}): {message}", .path.display())]
    MalformedInput {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("No overlapping month-end dates between inflation and return series.")]
    NoOverlap,

    #[error("Failed to render chart: {0}")]
    Render(String),

    #[error("Terminal error: {0}")]
    Terminal(String),

    #[error("Failed to export '{}': {message}", .path.display())]
    Export { path: PathBuf, message: String },
}

impl AppError {
    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::FileNotFound(_)
            | AppError::Io { .. }
            | AppError::Parse { .. }
            | AppError::Schema { .. }
            | AppError::MalformedInput { .. }
            | AppError::Config(_)
            | AppError::Export { .. } => 2,
            AppError::NoOverlap => 3,
            AppError::Render(_) | AppError::Terminal(_) => 4,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            AppError::FileNotFound(path)
        } else {
            AppError::Io { path, source }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_io_errors_become_file_not_found() {
        let err = AppError::io(
            "missing.csv",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(matches!(err, AppError::FileNotFound(_)));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn exit_codes_follow_failure_stage() {
        assert_eq!(AppError::NoOverlap.exit_code(), 3);
        assert_eq!(AppError::Render("x".to_string()).exit_code(), 4);
        assert_eq!(AppError::Config("x".to_string()).exit_code(), 2);
    }
}
