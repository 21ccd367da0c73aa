//! View and bootstrap error types.

use taskflow_settings::SettingsError;
use taskflow_tasks::TaskError;
use thiserror::Error;

/// Errors from controller operations.
#[derive(Debug, Error)]
pub enum ViewError {
    /// The task form failed local validation; nothing was sent.
    #[error("invalid form: {0}")]
    Form(String),

    /// The task service rejected the operation.
    #[error(transparent)]
    Task(#[from] TaskError),
}

/// Result type for controller operations.
pub type Result<T> = std::result::Result<T, ViewError>;

/// Errors that stop the application from starting.
///
/// Handshake failures are absent: they degrade to fallback credentials.
#[derive(Debug, Error)]
pub enum AppError {
    /// Settings could not be loaded or were invalid.
    #[error(transparent)]
    Settings(#[from] SettingsError),

    /// The task backend could not be built.
    #[error(transparent)]
    Task(#[from] TaskError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_error_display() {
        let err = ViewError::Form("Title is required".into());
        assert_eq!(err.to_string(), "invalid form: Title is required");
    }

    #[test]
    fn task_errors_pass_through() {
        let err: ViewError = TaskError::task_not_found(42).into();
        assert!(matches!(err, ViewError::Task(ref e) if e.is_not_found()));

        let err: AppError = SettingsError::InvalidValue("pageLimit must be > 0".into()).into();
        assert_eq!(err.to_string(), "invalid settings value: pageLimit must be > 0");
    }
}
