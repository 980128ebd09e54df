pub mod recommendation;
pub mod status;

pub use recommendation::Recommendation;
pub use status::{AgentReport, AgentStatusRecord, AgentStatusView, StatusLookup, TripStatusSnapshot};

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type TripId = Uuid;

/// The closed set of background workers the backend can run for a trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentKind {
    Flight,
    Accommodation,
    Activity,
    Restaurant,
    Transportation,
}

impl AgentKind {
    pub const ALL: [AgentKind; 5] = [
        AgentKind::Flight,
        AgentKind::Accommodation,
        AgentKind::Activity,
        AgentKind::Restaurant,
        AgentKind::Transportation,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            AgentKind::Flight => "flight",
            AgentKind::Accommodation => "accommodation",
            AgentKind::Activity => "activity",
            AgentKind::Restaurant => "restaurant",
            AgentKind::Transportation => "transportation",
        }
    }

    /// API path segment for this agent's recommendation resource.
    pub fn resource(&self) -> &str {
        match self {
            AgentKind::Flight => "flights",
            AgentKind::Accommodation => "accommodations",
            AgentKind::Activity => "activities",
            AgentKind::Restaurant => "restaurants",
            AgentKind::Transportation => "transportation",
        }
    }
}

impl FromStr for AgentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "flight" => Ok(AgentKind::Flight),
            "accommodation" => Ok(AgentKind::Accommodation),
            "activity" => Ok(AgentKind::Activity),
            "restaurant" => Ok(AgentKind::Restaurant),
            "transportation" => Ok(AgentKind::Transportation),
            other => Err(format!("unknown agent kind: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentPhase {
    Pending,
    Running,
    Completed,
    Failed,
    Idle,    // Server-reported; terminal for scheduling purposes
    Skipped, // Client-inferred: the agent was never requested for this trip
}

impl AgentPhase {
    /// Whether automatic polling should stop once this phase is observed.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            AgentPhase::Completed | AgentPhase::Failed | AgentPhase::Idle | AgentPhase::Skipped
        )
    }

    pub fn as_str(&self) -> &str {
        match self {
            AgentPhase::Pending => "pending",
            AgentPhase::Running => "running",
            AgentPhase::Completed => "completed",
            AgentPhase::Failed => "failed",
            AgentPhase::Idle => "idle",
            AgentPhase::Skipped => "skipped",
        }
    }
}
