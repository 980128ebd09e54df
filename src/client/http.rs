use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{ClientError, MutationAck, TripClient};
use crate::types::{
    AgentKind, AgentPhase, AgentReport, Recommendation, TripId, TripStatusSnapshot,
};

pub struct HttpTripClient {
    base_url: String,
    client: reqwest::Client,
}

impl HttpTripClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Map non-success responses onto the error taxonomy: 409 is a conflict,
    /// 400/422 are validation failures, everything else is a plain API error.
    async fn classify(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = extract_message(&body)
            .unwrap_or_else(|| format!("Request failed with status {}", status.as_u16()));

        match status {
            StatusCode::CONFLICT => Err(ClientError::Conflict),
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                Err(ClientError::Validation(message))
            }
            _ => Err(ClientError::Api(message)),
        }
    }
}

#[async_trait]
impl TripClient for HttpTripClient {
    async fn fetch_status(&self, trip_id: TripId) -> Result<TripStatusSnapshot, ClientError> {
        let response = self
            .client
            .get(self.url(&format!("/trip/{}/status", trip_id)))
            .send()
            .await?;

        let response = Self::classify(response).await?;
        let decoded: StatusResponse = response.json().await?;
        Ok(decoded.into_snapshot())
    }

    async fn fetch_recommendations(
        &self,
        trip_id: TripId,
        kind: AgentKind,
    ) -> Result<Vec<Recommendation>, ClientError> {
        let response = self
            .client
            .get(self.url(&format!("/trip/{}/{}", trip_id, kind.resource())))
            .send()
            .await?;

        let response = Self::classify(response).await?;
        let decoded: RecommendationsResponse = response.json().await?;
        Ok(decoded.recommendations)
    }

    async fn rerun_agent(
        &self,
        trip_id: TripId,
        kind: AgentKind,
        reason: Option<String>,
    ) -> Result<MutationAck, ClientError> {
        let response = self
            .client
            .post(self.url(&format!("/trip/{}/{}/rerun", trip_id, kind.resource())))
            .json(&RerunBody { reason })
            .send()
            .await?;

        let response = Self::classify(response).await?;
        Ok(response.json().await?)
    }

    async fn start_agents(
        &self,
        trip_id: TripId,
        kinds: &[AgentKind],
    ) -> Result<MutationAck, ClientError> {
        let response = self
            .client
            .post(self.url(&format!("/trip/{}/agents/start", trip_id)))
            .json(&json!({ "agentTypes": kinds }))
            .send()
            .await?;

        let response = Self::classify(response).await?;
        Ok(response.json().await?)
    }
}

fn extract_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("message")
        .or_else(|| value.get("error"))
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
}

#[derive(Serialize)]
struct RerunBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
}

#[derive(Deserialize)]
struct StatusResponse {
    #[serde(default)]
    agents: Vec<WireAgent>,
    #[serde(default)]
    trip: WireTrip,
}

#[derive(Deserialize)]
struct WireAgent {
    #[serde(rename = "type")]
    kind: AgentKind,
    state: AgentPhase,
    #[serde(default)]
    progress: Option<u8>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Deserialize, Default)]
struct WireTrip {
    #[serde(default)]
    recommendations: HashMap<AgentKind, Vec<Recommendation>>,
}

#[derive(Deserialize)]
struct RecommendationsResponse {
    #[serde(default)]
    recommendations: Vec<Recommendation>,
}

impl StatusResponse {
    fn into_snapshot(self) -> TripStatusSnapshot {
        let mut snapshot = TripStatusSnapshot::default();

        for agent in self.agents {
            snapshot.agents.insert(
                agent.kind,
                AgentReport {
                    phase: agent.state,
                    progress: agent.progress,
                    message: agent.message,
                    error: agent.error,
                },
            );
        }

        for (kind, items) in self.trip.recommendations {
            snapshot.recommendation_counts.insert(kind, items.len());
        }

        snapshot
    }
}
