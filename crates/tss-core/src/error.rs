//! Error types for the TSS bridge

use thiserror::Error;

/// Core bridge errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TssError {
    // Transport errors
    #[error("Transport error: {0}")]
    TransportError(String),

    #[error("Connection closed")]
    ConnectionClosed,

    // Wire errors
    #[error("Buffer too short: expected {expected}, got {actual}")]
    BufferTooShort { expected: usize, actual: usize },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    // Client input errors
    #[error("evaId must be 'eva1' or 'eva2', got {0:?}")]
    BadEvaId(String),

    #[error("Unknown procedureId: {0}")]
    ProcedureNotFound(String),

    // Startup errors
    #[error("Catalog load failed: {0}")]
    CatalogLoad(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl TssError {
    /// Whether the error was caused by caller input rather than the system
    pub fn is_client_error(&self) -> bool {
        matches!(self, TssError::BadEvaId(_) | TssError::ProcedureNotFound(_))
    }
}

/// Result type for bridge operations
pub type TssResult<T> = Result<T, TssError>;
