//! Request dispatch layer.
//!
//! Handlers resolve an agent (by id or number, optionally scoped to a set
//! of tenants) and a queue, take the agent's advisory lock, then delegate
//! to one manager. No handler spans more than one manager call.

pub mod login;
pub mod logoff;
pub mod membership;
pub mod on_queue;
pub mod pause;
pub mod status;

pub use login::LoginHandler;
pub use logoff::LogoffHandler;
pub use membership::MembershipHandler;
pub use on_queue::{OnQueueHandler, QueueMemberPauseEvent};
pub use pause::PauseHandler;
pub use status::StatusHandler;
