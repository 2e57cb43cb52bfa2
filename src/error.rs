//! Error types for module creation
//!
//! Operations distinguish a failed pre-condition, which the user can fix
//! and retry, from an impossible internal state and from operational
//! failures of the filesystem, git or the repository host.

use thiserror::Error;

/// A failed pre-condition carrying every violated condition found by one check
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", .reasons.join("\n"))]
pub struct VerificationError {
    reasons: Vec<String>,
}

impl VerificationError {
    pub fn new(reasons: Vec<String>) -> Self {
        Self { reasons }
    }

    pub fn single(reason: impl Into<String>) -> Self {
        Self {
            reasons: vec![reason.into()],
        }
    }

    /// All violated conditions, in the order they were checked
    pub fn reasons(&self) -> &[String] {
        &self.reasons
    }

    pub fn into_reasons(self) -> Vec<String> {
        self.reasons
    }
}

/// Error returned by every [`ModuleCreator`](crate::creator::ModuleCreator) operation
#[derive(Debug, Error)]
pub enum CreatorError {
    /// A pre-condition for the requested operation is not met
    #[error("{0}")]
    Verification(#[from] VerificationError),

    /// The remote host contradicts an earlier verification; indicates a bug
    #[error("{0}")]
    RemoteRepo(String),

    /// Invalid input supplied when constructing a creator
    #[error("{0}")]
    Argument(String),

    /// Filesystem, git, content or repository host failure
    #[error(transparent)]
    Operation(#[from] anyhow::Error),
}

impl CreatorError {
    /// Only failed pre-conditions can be fixed by the user and retried
    pub fn is_recoverable(&self) -> bool {
        matches!(self, CreatorError::Verification(_))
    }

    pub fn verification_reasons(&self) -> Option<&[String]> {
        match self {
            CreatorError::Verification(err) => Some(err.reasons()),
            _ => None,
        }
    }
}

pub type CreatorResult<T> = std::result::Result<T, CreatorError>;
