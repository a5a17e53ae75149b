use thiserror::Error;

#[derive(Error, Debug)]
pub enum RoutingError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid snapshot: {0}")]
    InvalidSnapshot(String),

    /// Internal consistency check failed; the computation must be discarded.
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),
}

pub type RoutingResult<T> = Result<T, RoutingError>;

impl RoutingError {
    /// Whether the error reflects a programming defect rather than bad input
    pub fn is_fatal(&self) -> bool {
        matches!(self, RoutingError::InvariantViolation(_))
    }
}

impl serde::Serialize for RoutingError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = RoutingError::InvalidConfig("routing_table_count".to_string());
        assert_eq!(err.to_string(), "Invalid configuration: routing_table_count");

        let err = RoutingError::InvalidSnapshot("expected object".to_string());
        assert_eq!(err.to_string(), "Invalid snapshot: expected object");

        let err = RoutingError::InvariantViolation("two designees".to_string());
        assert_eq!(err.to_string(), "Invariant violation: two designees");
    }

    #[test]
    fn test_fatal_classification() {
        assert!(RoutingError::InvariantViolation("x".to_string()).is_fatal());
        assert!(!RoutingError::InvalidSnapshot("x".to_string()).is_fatal());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: RoutingError = io_err.into();
        assert!(matches!(err, RoutingError::IoError(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let err: RoutingError = json_err.into();
        assert!(matches!(err, RoutingError::JsonError(_)));
    }

    #[test]
    fn test_error_serializes_as_message() {
        let err = RoutingError::InvalidConfig("bad".to_string());
        let json = serde_json::to_string(&err).unwrap();
        assert_eq!(json, "\"Invalid configuration: bad\"");
    }

    #[test]
    fn test_routing_result_type() {
        let ok_result: RoutingResult<usize> = Ok(500);
        assert_eq!(ok_result.unwrap(), 500);

        let err_result: RoutingResult<usize> =
            Err(RoutingError::InvalidConfig("empty".to_string()));
        assert!(err_result.is_err());
    }
}
