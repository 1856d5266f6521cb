use std::fmt;

use miden_objects::Word;
use shroud_utils::limiter::QueryLimitError;
use thiserror::Error;

use crate::domain::address::ContractAddress;
use crate::domain::field::FeltDecodeError;

// STORE ERRORS
// ================================================================================================

/// Failure reported by one of the oracle's collaborators, i.e. the local store or the public state
/// provider.
///
/// Absence of a record is not an error at this level; collaborators return `Ok(None)` and the
/// oracle decides whether absence is fatal.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{tree} tree with root {} is not available", .root.to_hex())]
    UnknownTreeRoot { tree: &'static str, root: Word },
    #[error("{error_msg}")]
    Other {
        error_msg: Box<str>,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
    },
}

impl StoreError {
    /// Creates a [`StoreError::Other`] without a source.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            error_msg: message.into().into_boxed_str(),
            source: None,
        }
    }

    /// Creates a [`StoreError::Other`] wrapping the backend error which caused it.
    pub fn other_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Other {
            error_msg: message.into().into_boxed_str(),
            source: Some(Box::new(source)),
        }
    }
}

// ORACLE ERRORS
// ================================================================================================

/// The kind of record a [`OracleError::NotFound`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    SecretKey,
    CompleteAddress,
    PortalContract,
    L1ToL2Message,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RecordKind::SecretKey => "secret key",
            RecordKind::CompleteAddress => "complete address",
            RecordKind::PortalContract => "portal contract address",
            RecordKind::L1ToL2Message => "L1 to L2 message",
        })
    }
}

/// Why a public storage value could not be used.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IntegrityFault {
    #[error("value is missing")]
    Missing,
    #[error("value is malformed")]
    Malformed(#[source] FeltDecodeError),
}

/// Errors returned by the oracle to the execution engine.
///
/// All of them surface immediately; the oracle never retries, since a retry could observe a
/// different answer and break proof determinism.
#[allow(missing_docs, reason = "Error variants must be descriptive by themselves")]
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("{kind} {key} not found")]
    NotFound { kind: RecordKind, key: String },
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("{0} requires a public state provider but none is configured")]
    Unconfigured(&'static str),
    #[error("public storage slot {slot:#x} of contract {contract} failed integrity check")]
    DataIntegrity {
        contract: ContractAddress,
        slot: u64,
        #[source]
        fault: IntegrityFault,
    },
    #[error("local store request failed")]
    Store(#[source] StoreError),
    #[error("public state provider request failed")]
    PublicState(#[source] StoreError),
}

impl OracleError {
    pub(crate) fn not_found(kind: RecordKind, key: impl fmt::Display) -> Self {
        Self::NotFound { kind, key: key.to_string() }
    }

    pub(crate) fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Whether the error only reports an absent record. Callers commonly treat this as a normal
    /// outcome.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<QueryLimitError> for OracleError {
    fn from(err: QueryLimitError) -> Self {
        Self::InvalidArgument(err.to_string())
    }
}
