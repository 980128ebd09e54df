use std::sync::Arc;
use std::time::Duration;

use super::CelebrationGate;
use crate::client::TripClient;
use crate::types::{AgentKind, AgentPhase, Recommendation, TripId};

/// Keeps one agent's recommendation list in step with its observed phase.
///
/// The fetch is edge-triggered: it fires only when the phase enters
/// `completed` from something else. A level-triggered fetch would refire on
/// every observation while the agent stays completed.
pub struct RecommendationSync {
    trip_id: TripId,
    kind: AgentKind,
    client: Arc<dyn TripClient>,
    last_phase: Option<AgentPhase>,
    items: Vec<Recommendation>,
    error: Option<String>,
    loading: bool,
    celebration: CelebrationGate,
}

impl RecommendationSync {
    pub fn new(
        client: Arc<dyn TripClient>,
        trip_id: TripId,
        kind: AgentKind,
        celebration_duration: Duration,
    ) -> Self {
        Self {
            trip_id,
            kind,
            client,
            last_phase: None,
            items: Vec::new(),
            error: None,
            loading: false,
            celebration: CelebrationGate::new(celebration_duration),
        }
    }

    /// Feed the latest observed phase. On the completion edge this reloads
    /// the recommendation list (once per edge) and arms the celebration
    /// gate regardless of how the fetch turns out.
    pub async fn observe(&mut self, phase: AgentPhase) {
        let entering_completed =
            phase == AgentPhase::Completed && self.last_phase != Some(AgentPhase::Completed);
        self.last_phase = Some(phase);

        if entering_completed {
            self.celebration.trigger();
            self.reload().await;
        }
    }

    /// Fetch the list now. Success replaces it wholesale and clears the
    /// error; failure keeps the previous list and records a message.
    pub async fn reload(&mut self) {
        self.loading = true;

        match self
            .client
            .fetch_recommendations(self.trip_id, self.kind)
            .await
        {
            Ok(items) => {
                self.items = items;
                self.error = None;
            }
            Err(err) => {
                log::warn!(
                    "recommendation fetch failed for trip {} agent {}: {}",
                    self.trip_id,
                    self.kind.as_str(),
                    err
                );
                self.error = Some(err.user_message());
            }
        }

        self.loading = false;
    }

    /// Optimistic clear at the start of a rerun.
    pub fn begin_rerun(&mut self) {
        self.items.clear();
        self.error = None;
        self.loading = true;
    }

    /// Settle the loading flag once the rerun request has resolved.
    pub fn finish_rerun(&mut self) {
        self.loading = false;
    }

    pub fn recommendations(&self) -> &[Recommendation] {
        &self.items
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_celebrating(&self) -> bool {
        self.celebration.is_active()
    }

    pub fn last_phase(&self) -> Option<AgentPhase> {
        self.last_phase
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::json;
    use uuid::Uuid;

    use crate::client::{ClientError, MutationAck};
    use crate::types::TripStatusSnapshot;

    struct FakeRecClient {
        calls: AtomicUsize,
        result: Mutex<Result<Vec<Recommendation>, ClientError>>,
    }

    impl FakeRecClient {
        fn returning(result: Result<Vec<Recommendation>, ClientError>) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                result: Mutex::new(result),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn set_result(&self, result: Result<Vec<Recommendation>, ClientError>) {
            *self.result.lock().unwrap() = result;
        }
    }

    #[async_trait]
    impl TripClient for FakeRecClient {
        async fn fetch_status(&self, _: TripId) -> Result<TripStatusSnapshot, ClientError> {
            Ok(TripStatusSnapshot::default())
        }

        async fn fetch_recommendations(
            &self,
            _: TripId,
            _: AgentKind,
        ) -> Result<Vec<Recommendation>, ClientError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result.lock().unwrap().clone()
        }

        async fn rerun_agent(
            &self,
            _: TripId,
            _: AgentKind,
            _: Option<String>,
        ) -> Result<MutationAck, ClientError> {
            unimplemented!("not exercised here")
        }

        async fn start_agents(
            &self,
            _: TripId,
            _: &[AgentKind],
        ) -> Result<MutationAck, ClientError> {
            unimplemented!("not exercised here")
        }
    }

    fn items(names: &[&str]) -> Vec<Recommendation> {
        names
            .iter()
            .map(|n| Recommendation::new(*n, json!({})))
            .collect()
    }

    fn sync_for(client: Arc<FakeRecClient>) -> RecommendationSync {
        RecommendationSync::new(
            client,
            Uuid::new_v4(),
            AgentKind::Flight,
            Duration::from_millis(2000),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetches_once_per_completion_edge() {
        let client = FakeRecClient::returning(Ok(items(&["a", "b"])));
        let mut sync = sync_for(client.clone());

        for phase in [
            AgentPhase::Running,
            AgentPhase::Completed,
            AgentPhase::Completed,
            AgentPhase::Completed,
        ] {
            sync.observe(phase).await;
        }

        assert_eq!(client.calls(), 1);
        assert_eq!(sync.recommendations().len(), 2);
        assert!(!sync.is_loading());
    }

    #[tokio::test(start_paused = true)]
    async fn test_refires_after_leaving_completed() {
        let client = FakeRecClient::returning(Ok(items(&["a"])));
        let mut sync = sync_for(client.clone());

        for phase in [
            AgentPhase::Completed,
            AgentPhase::Running,
            AgentPhase::Completed,
        ] {
            sync.observe(phase).await;
        }

        assert_eq!(client.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_reload_preserves_previous_list() {
        let client = FakeRecClient::returning(Ok(items(&["a", "b", "c"])));
        let mut sync = sync_for(client.clone());

        sync.observe(AgentPhase::Completed).await;
        assert_eq!(sync.recommendations().len(), 3);

        client.set_result(Err(ClientError::Transport("network down".to_string())));
        sync.observe(AgentPhase::Running).await;
        sync.observe(AgentPhase::Completed).await;

        assert_eq!(sync.recommendations().len(), 3);
        assert_eq!(sync.error(), Some("network down"));
        assert!(!sync.is_loading());
    }

    #[tokio::test(start_paused = true)]
    async fn test_successful_reload_clears_error() {
        let client = FakeRecClient::returning(Err(ClientError::Api("boom".to_string())));
        let mut sync = sync_for(client.clone());

        sync.observe(AgentPhase::Completed).await;
        assert_eq!(sync.error(), Some("boom"));

        client.set_result(Ok(items(&["fresh"])));
        sync.reload().await;

        assert!(sync.error().is_none());
        assert_eq!(sync.recommendations().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_celebration_arms_on_edge_even_when_fetch_fails() {
        let client = FakeRecClient::returning(Err(ClientError::Api("boom".to_string())));
        let mut sync = sync_for(client.clone());

        sync.observe(AgentPhase::Completed).await;
        assert!(sync.is_celebrating());

        tokio::time::advance(Duration::from_millis(2001)).await;
        assert!(!sync.is_celebrating());

        // Staying completed must not re-arm the gate.
        sync.observe(AgentPhase::Completed).await;
        assert!(!sync.is_celebrating());
    }

    #[tokio::test(start_paused = true)]
    async fn test_begin_rerun_clears_optimistically() {
        let client = FakeRecClient::returning(Ok(items(&["a", "b"])));
        let mut sync = sync_for(client.clone());

        sync.observe(AgentPhase::Completed).await;
        assert_eq!(sync.recommendations().len(), 2);

        sync.begin_rerun();
        assert!(sync.recommendations().is_empty());
        assert!(sync.is_loading());

        sync.finish_rerun();
        assert!(!sync.is_loading());
    }
}
