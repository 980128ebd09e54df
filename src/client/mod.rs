pub mod http;

pub use http::HttpTripClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{AgentKind, Recommendation, TripId, TripStatusSnapshot};

/// Fixed user-facing message for a conflicting agent mutation (HTTP 409).
pub const CONFLICT_MESSAGE: &str = "Agents are currently running, please wait";

/// Fallback when a failure carries no message of its own.
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong, please try again";

#[derive(Debug, Clone, Error)]
pub enum ClientError {
    #[error("Agents are currently running, please wait")]
    Conflict,
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Transport(String),
    #[error("{0}")]
    Api(String),
}

impl ClientError {
    /// Message suitable for direct display, with the generic fallback when
    /// the underlying failure carries nothing useful.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Conflict => CONFLICT_MESSAGE.to_string(),
            ClientError::Validation(message)
            | ClientError::Api(message)
            | ClientError::Transport(message) => {
                if message.is_empty() {
                    GENERIC_FAILURE_MESSAGE.to_string()
                } else {
                    message.clone()
                }
            }
        }
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, ClientError::Conflict)
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Transport(err.to_string())
    }
}

/// Server acknowledgment of a rerun/start mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MutationAck {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

/// Transport boundary for everything the client core needs from the trip
/// API. Injected everywhere as a trait object so tests can substitute a
/// scripted fake.
#[async_trait]
pub trait TripClient: Send + Sync {
    /// One request for the trip's full status snapshot, all agents at once.
    async fn fetch_status(&self, trip_id: TripId) -> Result<TripStatusSnapshot, ClientError>;

    /// Per-agent recommendation listing.
    async fn fetch_recommendations(
        &self,
        trip_id: TripId,
        kind: AgentKind,
    ) -> Result<Vec<Recommendation>, ClientError>;

    /// Rerun a completed agent, discarding its existing recommendations.
    async fn rerun_agent(
        &self,
        trip_id: TripId,
        kind: AgentKind,
        reason: Option<String>,
    ) -> Result<MutationAck, ClientError>;

    /// Start agents that were previously skipped.
    async fn start_agents(
        &self,
        trip_id: TripId,
        kinds: &[AgentKind],
    ) -> Result<MutationAck, ClientError>;
}
