//! # Error Types
//!
//! Errors raised while reading an API description. All of them surface at
//! startup; none is ever produced while serving a request.

use thiserror::Error;

/// Failure to read or interpret a declaration.
#[derive(Error, Debug)]
pub enum DeclarationError {
    /// The method string is not one of the supported HTTP methods.
    #[error("invalid HTTP method: {0}")]
    InvalidMethod(String),

    /// A path template could not be parsed into segments and placeholders.
    #[error("invalid path template '{template}': {reason}")]
    InvalidPathTemplate {
        /// The template as written.
        template: String,
        /// What is wrong with it.
        reason: String,
    },

    /// The API description document is not valid YAML/JSON for the model.
    #[error("cannot parse API description '{source_name}': {reason}")]
    Parse {
        /// File name or other label of the document.
        source_name: String,
        /// Parser message.
        reason: String,
    },

    /// IO error reading the API description.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
