pub mod poller;

pub use poller::{AgentStatusTracker, TrackerHandle};
