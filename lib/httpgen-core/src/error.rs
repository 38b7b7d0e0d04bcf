//! Error types for httpgen.

use derive_more::{Display, Error, From};

// ============================================================================
// Error Type
// ============================================================================

/// Main error type for plan construction and rendering.
///
/// Every variant is terminal for the current invocation: there is no
/// partial-plan recovery. Non-fatal conditions are reported as
/// [`Warning`](crate::Warning)s on the plan instead.
#[derive(Debug, Display, Error, From)]
pub enum Error {
    /// A `-F`/`--form-string` fragment has no `=` separating name and value.
    #[display("malformed form field '{fragment}': expected name=value")]
    #[from(skip)]
    MalformedField {
        /// The offending fragment text.
        #[error(not(source))]
        fragment: String,
    },

    /// The dispatch classifier found no plan variant for the request.
    #[display("unsupported request shape for {method}: {reason}")]
    #[from(skip)]
    UnsupportedRequestShape {
        /// The effective HTTP method.
        #[error(not(source))]
        method: String,
        /// Why no variant applies.
        reason: String,
    },

    /// Structurally invalid options (credentials, URL, method token...).
    #[display("configuration error: {_0}")]
    #[from(skip)]
    Configuration(#[error(not(source))] String),

    /// A valid plan that a specific target cannot express.
    #[display("target '{target}' cannot render this request: {reason}")]
    #[from(skip)]
    RendererUnsupported {
        /// The renderer name.
        #[error(not(source))]
        target: String,
        /// Why the renderer refused.
        reason: String,
    },

    /// No renderer is registered under the requested target name.
    #[display("'{target}' is not supported as a target (available: {available})")]
    #[from(skip)]
    UnknownTarget {
        /// The requested target name.
        #[error(not(source))]
        target: String,
        /// Comma separated list of registered names.
        available: String,
    },

    /// A file could not be loaded by a caller-supplied loader.
    #[display("cannot read '{path}': {source}")]
    #[from(skip)]
    FileRead {
        /// Path of the file.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// JSON serialization error.
    #[display("JSON serialization error: {_0}")]
    #[from]
    JsonSerialization(serde_json::Error),

    /// Query string serialization error.
    #[display("query serialization error: {_0}")]
    #[from]
    QuerySerialization(serde_html_form::ser::Error),
}

/// Result type alias using [`crate::Error`].
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a malformed field error.
    #[must_use]
    pub fn malformed_field(fragment: impl Into<String>) -> Self {
        Self::MalformedField {
            fragment: fragment.into(),
        }
    }

    /// Create an unsupported request shape error.
    #[must_use]
    pub fn unsupported_shape(method: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::UnsupportedRequestShape {
            method: method.into(),
            reason: reason.into(),
        }
    }

    /// Create a configuration error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Create a renderer unsupported error.
    #[must_use]
    pub fn renderer_unsupported(target: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::RendererUnsupported {
            target: target.into(),
            reason: reason.into(),
        }
    }

    /// Create an unknown target error.
    #[must_use]
    pub fn unknown_target(target: impl Into<String>, available: impl Into<String>) -> Self {
        Self::UnknownTarget {
            target: target.into(),
            available: available.into(),
        }
    }

    /// Create a file read error.
    #[must_use]
    pub fn file_read(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::FileRead {
            path: path.into(),
            source,
        }
    }

    /// Returns `true` if this is a malformed field error.
    #[must_use]
    pub const fn is_malformed_field(&self) -> bool {
        matches!(self, Self::MalformedField { .. })
    }

    /// Returns `true` if this is an unsupported request shape error.
    #[must_use]
    pub const fn is_unsupported_shape(&self) -> bool {
        matches!(self, Self::UnsupportedRequestShape { .. })
    }

    /// Returns `true` if this is a configuration error.
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }

    /// Returns `true` if a renderer refused the plan.
    #[must_use]
    pub const fn is_renderer_unsupported(&self) -> bool {
        matches!(self, Self::RendererUnsupported { .. })
    }
}
