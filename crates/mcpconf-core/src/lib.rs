//! mcpconf core library
//!
//! A canonical model for MCP server definitions, translators to and from each
//! client's own config file, a validator for the canonical form, and atomic
//! persistence.

pub mod client;
pub mod error;
pub mod fs;
pub mod manage;
pub mod model;
pub mod parser;
pub mod validate;

pub use error::{Error, Result};

/// Re-exports of commonly used types
pub mod prelude {
    // Model
    pub use crate::model::{Config, SUPPORTED_PLATFORMS, Server, Transport};

    // Translators
    pub use crate::client::{FieldLoss, Translator, TranslatorRegistry};

    // Validation
    pub use crate::validate::{Issue, Report, Severity, Validator};

    // Files
    pub use crate::manage::{CanonicalFile, ConfigFile, PlatformFile};

    pub use crate::error::{Error, Result};
}
