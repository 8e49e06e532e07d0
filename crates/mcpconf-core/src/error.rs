//! Error types for mcpconf-core

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{format} syntax error at line {line}, column {column} (byte {offset}): {message}")]
    Syntax {
        format: &'static str,
        line: usize,
        column: usize,
        offset: usize,
        message: String,
    },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid field '{field}': {message}")]
    InvalidField { field: String, message: String },

    #[error("Field '{field}' of server '{server}' is not supported by {platform}")]
    FieldNotSupported {
        platform: String,
        server: String,
        field: String,
    },

    #[error("Server '{server}' is missing required field '{field}'")]
    RequiredFieldMissing { server: String, field: String },

    #[error("Server '{name}' already exists")]
    ServerExists { name: String },

    #[error("Server '{name}' not found")]
    ServerNotFound { name: String },

    #[error("Unknown platform: {name}")]
    UnknownPlatform { name: String },

    #[error("Failed to serialize config: {message}")]
    Serialize { message: String },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn required(server: impl Into<String>, field: impl Into<String>) -> Self {
        Self::RequiredFieldMissing {
            server: server.into(),
            field: field.into(),
        }
    }

    /// Build a syntax error from a JSON decode failure, resolving the byte
    /// offset from serde_json's line/column position.
    pub fn json_syntax(err: &serde_json::Error, input: &[u8]) -> Self {
        let line = err.line();
        let column = err.column();
        Self::Syntax {
            format: "JSON",
            line,
            column,
            offset: byte_offset(input, line, column),
            message: err.to_string(),
        }
    }

    /// Build a syntax error from a TOML decode failure.
    pub fn toml_syntax(err: &toml::de::Error, input: &str) -> Self {
        let offset = err.span().map(|span| span.start).unwrap_or(0);
        let (line, column) = line_column(input.as_bytes(), offset);
        Self::Syntax {
            format: "TOML",
            line,
            column,
            offset,
            message: err.message().to_string(),
        }
    }

    pub fn is_field_not_supported(&self) -> bool {
        matches!(self, Self::FieldNotSupported { .. })
    }

    pub fn is_required_field_missing(&self) -> bool {
        matches!(self, Self::RequiredFieldMissing { .. })
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialize {
            message: err.to_string(),
        }
    }
}

/// Convert a 1-based line/column pair into a byte offset into `input`.
///
/// serde_json reports line 0 for errors that are not tied to a position
/// (e.g. type errors raised after parsing); those map to offset 0.
fn byte_offset(input: &[u8], line: usize, column: usize) -> usize {
    if line == 0 {
        return 0;
    }
    let mut current_line = 1;
    let mut line_start = 0;
    for (idx, byte) in input.iter().enumerate() {
        if current_line == line {
            break;
        }
        if *byte == b'\n' {
            current_line += 1;
            line_start = idx + 1;
        }
    }
    (line_start + column.saturating_sub(1)).min(input.len())
}

fn line_column(input: &[u8], offset: usize) -> (usize, usize) {
    let offset = offset.min(input.len());
    let before = &input[..offset];
    let line = before.iter().filter(|b| **b == b'\n').count() + 1;
    let line_start = before
        .iter()
        .rposition(|b| *b == b'\n')
        .map(|pos| pos + 1)
        .unwrap_or(0);
    (line, offset - line_start + 1)
}
