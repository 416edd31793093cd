//! Error types for race setup and queries.

use thiserror::Error;

use crate::agent::AgentId;

/// Everything that can go wrong inside the race core.
///
/// All variants are configuration or programming errors; there are no
/// transient faults and nothing here is retried.
#[derive(Debug, Error)]
pub enum RaceError {
    /// The race cannot be built from the given inputs.
    #[error("invalid race configuration: {0}")]
    Configuration(String),

    /// Checkpoint lookup outside the generated track.
    #[error("checkpoint index {index} out of range for track with {len} checkpoints")]
    IndexOutOfRange { index: usize, len: usize },

    /// Progress query for an agent that is not part of the current session,
    /// or a query made before the race has started.
    #[error("no progress record for {0}")]
    AgentNotFound(AgentId),
}
