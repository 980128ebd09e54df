pub mod confirm;
pub mod coordinator;
pub mod notify;

pub use confirm::{AlwaysConfirm, ConfirmRerun, StdinConfirm};
pub use coordinator::{ActionOutcome, AgentActionCoordinator};
pub use notify::{LogNotifier, Notice, NoticeKind, Notifier};
