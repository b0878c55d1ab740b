/// Errors that can occur across the Prowl agent.
///
/// Each variant wraps a specific failure domain. The polling loop decides
/// per variant whether a failure is contained to one pull request or aborts
/// the current pass; nothing here is fatal to the process.
///
/// # Examples
///
/// ```
/// use prowl_core::ProwlError;
///
/// let err = ProwlError::Config("missing repository owner".into());
/// assert!(err.to_string().contains("missing repository owner"));
/// ```
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum ProwlError {
    /// Filesystem I/O failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or missing configuration.
    #[error("configuration error: {0}")]
    #[diagnostic(help("check .prowl.toml and the GITHUB_TOKEN / GROQ_API_KEY environment variables"))]
    Config(String),

    /// Listing pull requests or fetching their files failed.
    #[error("GitHub error: {0}")]
    Host(String),

    /// The completion service returned a non-success status or an
    /// unexpected payload.
    #[error("completion service error: {0}")]
    Service(String),

    /// A generated review could not be posted.
    #[error("failed to post review: {0}")]
    Post(String),

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
        let err: ProwlError = io_err.into();
        assert!(err.to_string().contains("gone"));
    }

    #[test]
    fn config_error_displays_message() {
        let err = ProwlError::Config("bad value".into());
        assert_eq!(err.to_string(), "configuration error: bad value");
    }

    #[test]
    fn service_error_keeps_status_and_body() {
        let err = ProwlError::Service("500 Internal Server Error: overloaded".into());
        let text = err.to_string();
        assert!(text.contains("500"));
        assert!(text.contains("overloaded"));
    }
}
