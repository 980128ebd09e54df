use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::client::{ClientError, TripClient};
use crate::types::{AgentKind, AgentPhase, AgentStatusView, StatusLookup, TripId, TripStatusSnapshot};

#[derive(Debug)]
enum TrackerCommand {
    Refetch,
    Detach,
}

/// Consumer-side handle for one (trip, agent) tracker. Dropping the handle
/// also shuts the tracker down once its current operation finishes.
pub struct TrackerHandle {
    commands: mpsc::UnboundedSender<TrackerCommand>,
    view: watch::Receiver<AgentStatusView>,
    active: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

impl TrackerHandle {
    pub fn view(&self) -> AgentStatusView {
        self.view.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<AgentStatusView> {
        self.view.clone()
    }

    /// Force an out-of-band fetch. Safe in any polling state; commands are
    /// serialized through the tracker's mailbox, so no duplicate timer or
    /// concurrent request can result.
    pub fn refetch(&self) {
        let _ = self.commands.send(TrackerCommand::Refetch);
    }

    pub fn is_attached(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Stop observing. The pending timer is cancelled as soon as the command
    /// lands; an in-flight response is discarded instead of applied.
    pub fn detach(&self) {
        self.active.store(false, Ordering::SeqCst);
        let _ = self.commands.send(TrackerCommand::Detach);
    }

    /// Wait for the tracker task to wind down after `detach()`.
    pub async fn join(self) {
        let _ = self.task.await;
    }

    /// Wait until the current fetch settles and return the resulting view.
    pub async fn settled(&self) -> AgentStatusView {
        let mut rx = self.view.clone();
        let settled = rx.wait_for(|view| !view.is_loading).await.map(|view| view.clone());
        settled.unwrap_or_else(|_| self.view.borrow().clone())
    }
}

/// Polling lifecycle for one (trip, agent) pair: immediate fetch on attach,
/// repeat polls at a fixed interval while the phase is non-terminal, manual
/// refetch on demand, and fail-stop on fetch errors.
pub struct AgentStatusTracker {
    trip_id: TripId,
    kind: AgentKind,
    client: Arc<dyn TripClient>,
    poll_interval: Duration,
    active: Arc<AtomicBool>,
    commands: mpsc::UnboundedReceiver<TrackerCommand>,
    view: watch::Sender<AgentStatusView>,
    polling: bool,
}

impl AgentStatusTracker {
    pub fn attach(
        client: Arc<dyn TripClient>,
        trip_id: TripId,
        kind: AgentKind,
        poll_interval: Duration,
    ) -> TrackerHandle {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (view_tx, view_rx) = watch::channel(AgentStatusView::default());
        let active = Arc::new(AtomicBool::new(true));

        let tracker = Self {
            trip_id,
            kind,
            client,
            poll_interval,
            active: active.clone(),
            commands: command_rx,
            view: view_tx,
            polling: false,
        };
        let task = tokio::spawn(tracker.run());

        TrackerHandle {
            commands: command_tx,
            view: view_rx,
            active,
            task,
        }
    }

    async fn run(mut self) {
        self.fetch_and_apply().await;

        loop {
            if !self.is_active() {
                break;
            }

            // Only one timer can exist per pair: the sleep below is dropped
            // the moment a command arrives, and no new poll is scheduled
            // until the current fetch has fully settled.
            let command = if self.polling {
                tokio::select! {
                    _ = tokio::time::sleep(self.poll_interval) => None,
                    cmd = self.commands.recv() => Some(cmd),
                }
            } else {
                Some(self.commands.recv().await)
            };

            match command {
                // Timer elapsed; run the scheduled poll.
                None => self.fetch_and_apply().await,
                Some(Some(TrackerCommand::Refetch)) => {
                    self.view.send_modify(|view| {
                        view.is_loading = true;
                        view.error = None;
                    });
                    self.fetch_and_apply().await;
                }
                Some(Some(TrackerCommand::Detach)) | Some(None) => break,
            }
        }
    }

    fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    async fn fetch_and_apply(&mut self) {
        self.view.send_modify(|view| view.is_loading = true);

        let outcome = self.client.fetch_status(self.trip_id).await;

        // Staleness guard: a response that lands after detach is discarded.
        if !self.is_active() {
            return;
        }

        let lookup = lookup_from_fetch(outcome, self.kind);
        self.apply(lookup);
    }

    fn apply(&mut self, lookup: StatusLookup) {
        match lookup {
            StatusLookup::Found(record) => {
                self.polling = !record.phase.is_terminal();
                self.view.send_modify(|view| {
                    view.phase = record.phase;
                    view.recommendation_count = record.recommendation_count;
                    view.error = record.error;
                    view.is_loading = false;
                    view.observed_at = Some(record.observed_at);
                });
            }
            StatusLookup::NotRequested => {
                self.polling = false;
                self.view.send_modify(|view| {
                    view.phase = AgentPhase::Skipped;
                    view.recommendation_count = 0;
                    view.error = None;
                    view.is_loading = false;
                    view.observed_at = Some(Utc::now());
                });
            }
            StatusLookup::TransportError(reason) => {
                log::warn!(
                    "status fetch failed for trip {} agent {}: {}",
                    self.trip_id,
                    self.kind.as_str(),
                    reason
                );
                // Fail-stop: keep the last known phase, stop scheduling, and
                // leave recovery to a manual refetch.
                self.polling = false;
                self.view.send_modify(|view| {
                    view.error = Some(reason);
                    view.is_loading = false;
                });
            }
        }
    }
}

fn lookup_from_fetch(
    outcome: Result<TripStatusSnapshot, ClientError>,
    kind: AgentKind,
) -> StatusLookup {
    match outcome {
        Ok(snapshot) => snapshot.lookup(kind),
        Err(err) => StatusLookup::TransportError(err.user_message()),
    }
}
