//! Errors that abort configuration loading outright.
//!
//! Only failures that prevent the project's working directory from being
//! established are fatal (§7); everything else — unknown keys, missing
//! source paths — is surfaced as a [`hdlc_diagnostics::Diagnostic`] instead
//! and does not stop loading.

/// A fatal configuration loading error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file (or an `include`d file) could not be read.
    #[error("failed to read configuration {path}: {source}")]
    Io {
        /// The file that could not be read.
        path: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The JSON configuration could not be parsed.
    #[error("failed to parse configuration {path}: {source}")]
    Json {
        /// The file that failed to parse.
        path: String,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// The legacy line-oriented configuration could not be parsed.
    #[error("failed to parse legacy configuration {path} at line {line}: {message}")]
    Legacy {
        /// The file that failed to parse.
        path: String,
        /// The 1-based line number of the offending line.
        line: usize,
        /// A human-readable description of the problem.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_display() {
        let err = ConfigError::Io {
            path: "proj.json".into(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "nope"),
        };
        assert!(format!("{err}").contains("proj.json"));
    }

    #[test]
    fn legacy_error_display() {
        let err = ConfigError::Legacy {
            path: "proj.cfg".into(),
            line: 4,
            message: "expected <kind> <library> <path>".into(),
        };
        assert_eq!(
            format!("{err}"),
            "failed to parse legacy configuration proj.cfg at line 4: expected <kind> <library> <path>"
        );
    }
}
