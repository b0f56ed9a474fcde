//! Error types for loading, resolving and writing discovery stubs.

use std::path::PathBuf;
use thiserror::Error;

/// Errors while loading a discovery document.
#[derive(Debug, Error)]
pub enum LoadError {
    // IO errors (exit code 3)
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("cannot read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Parse errors (exit code 2)
    #[error("invalid JSON: {source}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
    },

    #[error("discovery document must be a JSON object, got {actual}")]
    NotAnObject { actual: String },

    #[error("discovery document has neither \"resources\" nor \"methods\"")]
    MissingResources,

    #[error("invalid discovery document: {source}")]
    InvalidDocument {
        #[source]
        source: serde_json::Error,
    },
}

impl LoadError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            LoadError::FileNotFound { .. } | LoadError::ReadError { .. } => 3,
            _ => 2,
        }
    }
}

/// Errors during schema resolution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("schema \"{name}\" is referenced but not defined")]
    DanglingRef { name: String },

    #[error("schema \"{name}\" is part of a $ref chain that never reaches a definition")]
    ReferenceCycle { name: String },
}

impl ResolveError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        2
    }
}

/// Errors in user supplied configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid path pattern \"{pattern}\": {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

impl ConfigError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        2
    }
}

/// Errors while writing stub files.
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("refusing to write outside the output directory: {path}")]
    UnsafePath { path: String },

    #[error("cannot create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot serialize {path}: {source}")]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl WriteError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            WriteError::UnsafePath { .. } | WriteError::Serialize { .. } => 2,
            WriteError::CreateDir { .. } | WriteError::Write { .. } => 3,
        }
    }
}
