use std::sync::Arc;

use super::{ConfirmRerun, Notice, Notifier};
use crate::client::{ClientError, MutationAck, TripClient, GENERIC_FAILURE_MESSAGE};
use crate::sync::RecommendationSync;
use crate::tracker::TrackerHandle;
use crate::types::{AgentKind, AgentPhase, TripId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    Accepted,
    Declined,
    NotEligible,
    Failed,
}

/// Issues the two mutating operations per (trip, agent): rerun an agent
/// that already completed, or start one the user originally skipped. All
/// failures become notices and local state; nothing propagates upward.
pub struct AgentActionCoordinator {
    client: Arc<dyn TripClient>,
    confirmer: Arc<dyn ConfirmRerun>,
    notifier: Arc<dyn Notifier>,
}

impl AgentActionCoordinator {
    pub fn new(
        client: Arc<dyn TripClient>,
        confirmer: Arc<dyn ConfirmRerun>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            client,
            confirmer,
            notifier,
        }
    }

    /// Rerun a completed agent. Requires explicit confirmation first, since
    /// the existing recommendation list is discarded optimistically; on
    /// failure the list is restored by re-fetching it.
    pub async fn rerun(
        &self,
        trip_id: TripId,
        kind: AgentKind,
        reason: Option<String>,
        tracker: &TrackerHandle,
        recs: &mut RecommendationSync,
    ) -> ActionOutcome {
        if tracker.view().phase != AgentPhase::Completed {
            self.notifier.notify(Notice::error(format!(
                "The {} agent has no finished results to rerun",
                kind.as_str()
            )));
            return ActionOutcome::NotEligible;
        }

        let prompt = format!(
            "Rerun the {} agent? Its current recommendations will be discarded.",
            kind.as_str()
        );
        if !self.confirmer.confirm(&prompt).await {
            return ActionOutcome::Declined;
        }

        recs.begin_rerun();

        match self.client.rerun_agent(trip_id, kind, reason).await {
            Ok(ack) if ack.success => {
                recs.finish_rerun();
                let message = ack
                    .message
                    .unwrap_or_else(|| format!("The {} agent is running again", kind.as_str()));
                self.notifier.notify(Notice::success(message));
                // The server flips the agent back to running; wake the
                // tracker so polling picks that up.
                tracker.refetch();
                ActionOutcome::Accepted
            }
            // A 200 ack with success=false is still a rejection.
            outcome => {
                self.notifier.notify(Notice::error(rejection_message(outcome)));
                if tracker.view().phase == AgentPhase::Completed {
                    // Undo the optimistic clear: the old results still exist
                    // server-side, so fetch them back.
                    recs.reload().await;
                } else {
                    recs.finish_rerun();
                }
                ActionOutcome::Failed
            }
        }
    }

    /// Start a skipped agent. No confirmation needed, nothing is discarded.
    pub async fn generate(
        &self,
        trip_id: TripId,
        kind: AgentKind,
        tracker: &TrackerHandle,
    ) -> ActionOutcome {
        if tracker.view().phase != AgentPhase::Skipped {
            self.notifier.notify(Notice::error(format!(
                "The {} agent was already requested for this trip",
                kind.as_str()
            )));
            return ActionOutcome::NotEligible;
        }

        match self.client.start_agents(trip_id, &[kind]).await {
            Ok(ack) if ack.success => {
                let message = ack
                    .message
                    .unwrap_or_else(|| format!("The {} agent has started", kind.as_str()));
                self.notifier.notify(Notice::success(message));
                // Resume polling so the tracker leaves `skipped`.
                tracker.refetch();
                ActionOutcome::Accepted
            }
            outcome => {
                self.notifier.notify(Notice::error(rejection_message(outcome)));
                ActionOutcome::Failed
            }
        }
    }
}

/// User-facing message for a mutation that did not go through, whether the
/// transport failed outright or the server answered with `success: false`.
fn rejection_message(outcome: Result<MutationAck, ClientError>) -> String {
    match outcome {
        Ok(ack) => ack
            .message
            .unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string()),
        Err(err) => err.user_message(),
    }
}
