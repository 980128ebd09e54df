use anyhow::Result;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use std::time::Duration;

use tripweaver::actions::{AgentActionCoordinator, LogNotifier, StdinConfirm};
use tripweaver::client::{HttpTripClient, TripClient};
use tripweaver::sync::RecommendationSync;
use tripweaver::tracker::{AgentStatusTracker, TrackerHandle};
use tripweaver::types::{AgentKind, StatusLookup, TripId};
use tripweaver::Config;

#[derive(Parser)]
#[command(name = "tripweaver")]
#[command(about = "Trip agent status polling client", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a one-shot status snapshot for a trip
    Status { trip_id: TripId },
    /// Poll all agents until every one of them reaches a terminal state
    Watch { trip_id: TripId },
    /// Rerun a completed agent, discarding its current recommendations
    Rerun {
        trip_id: TripId,
        agent: AgentKind,
        #[arg(long)]
        reason: Option<String>,
    },
    /// Start an agent that was skipped when the trip was created
    Generate { trip_id: TripId, agent: AgentKind },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env();

    match cli.command {
        Commands::Status { trip_id } => show_status(&config, trip_id).await?,
        Commands::Watch { trip_id } => watch_trip(&config, trip_id).await?,
        Commands::Rerun {
            trip_id,
            agent,
            reason,
        } => rerun_agent(&config, trip_id, agent, reason).await?,
        Commands::Generate { trip_id, agent } => generate_agent(&config, trip_id, agent).await?,
    }

    Ok(())
}

async fn show_status(config: &Config, trip_id: TripId) -> Result<()> {
    let client = HttpTripClient::new(config.api_base_url.clone());
    let snapshot = client
        .fetch_status(trip_id)
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message()))?;

    for kind in AgentKind::ALL {
        match snapshot.lookup(kind) {
            StatusLookup::Found(record) => {
                println!(
                    "{:<15} {:<10} {} recommendation(s)",
                    kind.as_str(),
                    record.phase.as_str(),
                    record.recommendation_count
                );
                if let Some(error) = record.error {
                    println!("{:<15} error: {}", "", error);
                }
            }
            StatusLookup::NotRequested => {
                println!("{:<15} {:<10}", kind.as_str(), "skipped");
            }
            StatusLookup::TransportError(reason) => {
                println!("{:<15} fetch failed: {}", kind.as_str(), reason);
            }
        }
    }

    Ok(())
}

async fn watch_trip(config: &Config, trip_id: TripId) -> Result<()> {
    let client: Arc<dyn TripClient> = Arc::new(HttpTripClient::new(config.api_base_url.clone()));

    let handles: Vec<(AgentKind, TrackerHandle)> = AgentKind::ALL
        .into_iter()
        .map(|kind| {
            let handle =
                AgentStatusTracker::attach(client.clone(), trip_id, kind, config.poll_interval());
            (kind, handle)
        })
        .collect();

    println!("Watching trip {}", trip_id);

    loop {
        let mut all_settled = true;

        for (kind, handle) in &handles {
            let view = handle.view();
            let detail = match &view.error {
                Some(error) => format!("error: {}", error),
                None => format!("{} recommendation(s)", view.recommendation_count),
            };
            println!("{:<15} {:<10} {}", kind.as_str(), view.phase.as_str(), detail);

            if !view.phase.is_terminal() && view.error.is_none() {
                all_settled = false;
            }
        }

        if all_settled {
            break;
        }

        tokio::time::sleep(Duration::from_secs(1)).await;
        println!();
    }

    futures::future::join_all(handles.into_iter().map(|(_, handle)| async move {
        handle.detach();
        handle.join().await;
    }))
    .await;

    Ok(())
}

async fn rerun_agent(
    config: &Config,
    trip_id: TripId,
    agent: AgentKind,
    reason: Option<String>,
) -> Result<()> {
    let client: Arc<dyn TripClient> = Arc::new(HttpTripClient::new(config.api_base_url.clone()));

    let tracker = AgentStatusTracker::attach(client.clone(), trip_id, agent, config.poll_interval());
    let settled = tracker.settled().await;
    println!("{} agent is {}", agent.as_str(), settled.phase.as_str());

    let mut recs =
        RecommendationSync::new(client.clone(), trip_id, agent, config.celebration_duration());
    let coordinator =
        AgentActionCoordinator::new(client, Arc::new(StdinConfirm), Arc::new(LogNotifier));

    let outcome = coordinator
        .rerun(trip_id, agent, reason, &tracker, &mut recs)
        .await;
    println!("rerun outcome: {:?}", outcome);

    tracker.detach();
    tracker.join().await;
    Ok(())
}

async fn generate_agent(config: &Config, trip_id: TripId, agent: AgentKind) -> Result<()> {
    let client: Arc<dyn TripClient> = Arc::new(HttpTripClient::new(config.api_base_url.clone()));

    let tracker = AgentStatusTracker::attach(client.clone(), trip_id, agent, config.poll_interval());
    let settled = tracker.settled().await;
    println!("{} agent is {}", agent.as_str(), settled.phase.as_str());

    let coordinator = AgentActionCoordinator::new(
        client,
        Arc::new(StdinConfirm),
        Arc::new(LogNotifier),
    );

    let outcome = coordinator.generate(trip_id, agent, &tracker).await;
    println!("generate outcome: {:?}", outcome);

    tracker.detach();
    tracker.join().await;
    Ok(())
}
