//! Error handling types

use thiserror::Error;

/// Result type alias for operations that can fail
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the RASP configuration engine
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (simple form)
    #[error("I/O error: {source}")]
    IoSimple {
        /// The underlying I/O error
        #[from]
        source: std::io::Error,
    },

    /// I/O operation error (with context)
    #[error("I/O error: {message}")]
    Io {
        /// Description of the I/O error
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// JSON parsing or serialization error
    #[error("JSON parsing error: {source}")]
    Json {
        /// The underlying JSON error
        #[from]
        source: serde_json::Error,
    },

    /// The local configuration document could not be parsed
    ///
    /// Never fatal: the loader falls back to the hard-coded defaults.
    #[error("Document parse error: {message}")]
    DocumentParse {
        /// Description of the parse failure
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A single configuration item failed conversion or range validation
    #[error("Invalid value for {key}: {message}")]
    Validation {
        /// Dotted configuration key
        key: String,
        /// Description of the violation
        message: String,
    },

    /// A startup invariant was violated; the agent must not start
    #[error("Critical boot error: {message}")]
    CriticalBoot {
        /// Description of the violated invariant
        message: String,
    },

    /// Fetching or decoding the remote configuration failed for one tick
    #[error("Sync error: {message}")]
    TransientSync {
        /// Description of the sync failure
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The filesystem watch could not be registered
    #[error("Watch setup error: {message}")]
    WatchSetup {
        /// Description of the watch failure
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration-related error (agent settings, not dynamic keys)
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration error
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Internal system error
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error
        message: String,
    },
}

// Basic error creation methods
impl Error {
    /// Create a per-key validation error
    pub fn validation<K: Into<String>, S: Into<String>>(key: K, message: S) -> Self {
        Self::Validation {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Create a critical boot error
    pub fn critical_boot<S: Into<String>>(message: S) -> Self {
        Self::CriticalBoot {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns true if the error must abort agent initialization
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::CriticalBoot { .. } | Self::WatchSetup { .. })
    }
}

// I/O error creation methods
impl Error {
    /// Create an I/O error
    pub fn io<S: Into<String>>(message: S) -> Self {
        Self::Io {
            message: message.into(),
            source: None,
        }
    }

    /// Create an I/O error with source
    pub fn io_with_source<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
        message: S,
        source: E,
    ) -> Self {
        Self::Io {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

// Document and sync error creation methods
impl Error {
    /// Create a document parse error
    pub fn document_parse<S: Into<String>>(message: S) -> Self {
        Self::DocumentParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create a document parse error with source
    pub fn document_parse_with_source<
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    >(
        message: S,
        source: E,
    ) -> Self {
        Self::DocumentParse {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a transient sync error
    pub fn transient_sync<S: Into<String>>(message: S) -> Self {
        Self::TransientSync {
            message: message.into(),
            source: None,
        }
    }

    /// Create a transient sync error with source
    pub fn transient_sync_with_source<
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    >(
        message: S,
        source: E,
    ) -> Self {
        Self::TransientSync {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a watch setup error with source
    pub fn watch_setup_with_source<
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    >(
        message: S,
        source: E,
    ) -> Self {
        Self::WatchSetup {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

// Configuration error creation methods
impl Error {
    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
            source: None,
        }
    }

    /// Create a configuration error with source
    pub fn configuration_with_source<
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    >(
        message: S,
        source: E,
    ) -> Self {
        Self::Configuration {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}
