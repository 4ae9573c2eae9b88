use thiserror::Error;

/// Errors returned by the ranking core.
///
/// Everything except the setup errors is recoverable: the caller drops the
/// decision and asks for new work.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RankError {
    #[error("cannot rank an empty list")]
    EmptyInput,

    #[error("cutoff must be at least 1")]
    ZeroCutoff,

    #[error("invalid character {ch:?} in path {path:?}")]
    MalformedPath { path: String, ch: char },

    #[error("unrecognized command {0:?}")]
    MalformedCommand(String),

    #[error("unrecognized side {0:?}")]
    MalformedSide(String),

    /// The path no longer points at a node waiting for a comparison.
    #[error("path {0:?} has no pending comparison")]
    StalePath(String),

    /// The node is still pending, but its fronts are not the items the judge saw.
    #[error("decision on {path:?} expected {expected:?}, live fronts are {actual:?}")]
    StaleDecision {
        path: String,
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("ranking session is already finished")]
    Finished,

    #[error("corrupt snapshot: {0}")]
    CorruptSnapshot(String),
}

impl RankError {
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            RankError::EmptyInput | RankError::ZeroCutoff | RankError::CorruptSnapshot(_)
        )
    }
}
