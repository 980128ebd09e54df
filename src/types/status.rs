use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{AgentKind, AgentPhase};

/// One agent's entry in the aggregate status payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentReport {
    pub phase: AgentPhase,
    pub progress: Option<u8>,
    pub message: Option<String>,
    pub error: Option<String>,
}

/// Fully resolved status for one (trip, agent) pair, including the
/// recommendation count sourced from the trip's aggregate payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentStatusRecord {
    pub phase: AgentPhase,
    pub recommendation_count: usize,
    pub progress: Option<u8>,
    pub message: Option<String>,
    pub error: Option<String>,
    pub observed_at: DateTime<Utc>,
}

/// Result of resolving one agent out of a status fetch. An agent missing
/// from the payload means "never requested", which is a state of its own
/// and must not be conflated with a failed fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum StatusLookup {
    Found(AgentStatusRecord),
    NotRequested,
    TransportError(String),
}

/// Decoded aggregate status for a whole trip: every agent the server knows
/// about, plus per-agent recommendation counts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TripStatusSnapshot {
    pub agents: HashMap<AgentKind, AgentReport>,
    pub recommendation_counts: HashMap<AgentKind, usize>,
}

impl TripStatusSnapshot {
    pub fn lookup(&self, kind: AgentKind) -> StatusLookup {
        match self.agents.get(&kind) {
            Some(report) => StatusLookup::Found(AgentStatusRecord {
                phase: report.phase,
                recommendation_count: self
                    .recommendation_counts
                    .get(&kind)
                    .copied()
                    .unwrap_or(0),
                progress: report.progress,
                message: report.message.clone(),
                error: report.error.clone(),
                observed_at: Utc::now(),
            }),
            None => StatusLookup::NotRequested,
        }
    }
}

/// What a tracker consumer sees at any point in time.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentStatusView {
    pub phase: AgentPhase,
    pub recommendation_count: usize,
    pub error: Option<String>,
    pub is_loading: bool,
    pub observed_at: Option<DateTime<Utc>>,
}

impl Default for AgentStatusView {
    fn default() -> Self {
        Self {
            phase: AgentPhase::Pending,
            recommendation_count: 0,
            error: None,
            is_loading: true,
            observed_at: None,
        }
    }
}
