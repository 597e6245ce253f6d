/// Errors that can occur across the faultline pipeline.
///
/// Each variant wraps a specific error domain. Library crates use this type
/// directly; the binary crate converts to `miette` diagnostics at the
/// boundary.
///
/// # Examples
///
/// ```
/// use faultline_core::FaultlineError;
///
/// let err = FaultlineError::Git("object not found".into());
/// assert!(err.to_string().contains("object not found"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum FaultlineError {
    /// Filesystem I/O failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or missing configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Git object access failure.
    #[error("git error: {0}")]
    Git(String),

    /// Source code parsing failure.
    #[error("parse error: {0}")]
    Parse(String),

    /// Blob content is not valid UTF-8.
    #[error("decode error: {0}")]
    Decode(String),

    /// Worker pool construction failure.
    #[error("concurrency error: {0}")]
    Concurrency(String),

    /// JSON serialization / deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML deserialization failure.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_converts() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: FaultlineError = io_err.into();
        assert!(err.to_string().contains("gone"));
    }

    #[test]
    fn config_error_displays_message() {
        let err = FaultlineError::Config("bad value".into());
        assert_eq!(err.to_string(), "configuration error: bad value");
    }

    #[test]
    fn decode_error_displays_path() {
        let err = FaultlineError::Decode("src/Broken.java is not UTF-8".into());
        assert!(err.to_string().contains("src/Broken.java"));
    }
}
