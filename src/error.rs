//! Error types for the editor history and autosave subsystem.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for editor session operations.
///
/// Only the I/O-facing paths (payload files, the autosave catalog, config
/// files) return this. History and scheduling never fail.
#[derive(Debug, Error)]
pub enum EditorError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Invalid autosave format: {0}")]
    InvalidFormat(String),

    #[error("Checksum mismatch: expected {expected}, got {got}")]
    ChecksumMismatch { expected: u32, got: u32 },

    #[error("Config error: {0}")]
    Config(String),

    #[error("Autosave not found: {}", .0.display())]
    AutoSaveNotFound(PathBuf),

    #[error("Failed to start autosave worker: {0}")]
    WorkerSpawn(String),
}

impl From<serde_json::Error> for EditorError {
    fn from(e: serde_json::Error) -> Self {
        EditorError::Serialization(e.to_string())
    }
}

impl From<rmp_serde::encode::Error> for EditorError {
    fn from(e: rmp_serde::encode::Error) -> Self {
        EditorError::Serialization(e.to_string())
    }
}

impl From<rmp_serde::decode::Error> for EditorError {
    fn from(e: rmp_serde::decode::Error) -> Self {
        EditorError::Deserialization(e.to_string())
    }
}

impl From<toml::de::Error> for EditorError {
    fn from(e: toml::de::Error) -> Self {
        EditorError::Config(e.to_string())
    }
}

impl From<toml::ser::Error> for EditorError {
    fn from(e: toml::ser::Error) -> Self {
        EditorError::Config(e.to_string())
    }
}

/// Result type for editor session operations.
pub type Result<T> = std::result::Result<T, EditorError>;
