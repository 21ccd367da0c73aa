//! Settings error types.

use thiserror::Error;

/// Errors that can occur when loading or validating settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// A source could not be read or did not match the settings schema.
    #[error("failed to load settings: {0}")]
    Figment(#[from] Box<figment::Error>),
    /// A settings value was invalid (e.g., out of range).
    #[error("invalid settings value: {0}")]
    InvalidValue(String),
}

impl From<figment::Error> for SettingsError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

/// Result type for settings operations.
pub type Result<T> = std::result::Result<T, SettingsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_value_display() {
        let err = SettingsError::InvalidValue("pageLimit must be > 0".to_string());
        assert_eq!(err.to_string(), "invalid settings value: pageLimit must be > 0");
    }

    #[test]
    fn figment_error_from_conversion() {
        let err: SettingsError = figment::Error::from("boom".to_string()).into();
        assert!(matches!(err, SettingsError::Figment(_)));
        assert!(err.to_string().contains("boom"));
    }
}
