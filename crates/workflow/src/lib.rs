//! Release publisher orchestration.
//!
//! This crate sequences the ports defined in [`pipeline`] into the three
//! publishing workflows (pre-release, final release, version bump) and
//! produces a [`RunReport`] describing what happened.
//!
//! ## Architectural Layer
//!
//! **Orchestration layer.** The [`Publisher`] decides step order and which
//! error a failed call becomes; it holds no domain rules of its own and never
//! touches the network, file system, or processes directly.
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`counter`] | `VersionCounter`: read-and-increment of the remote build counter |
//! | [`orchestrator`] | `Publisher`, `Ports`, `WorkflowKind` |
//! | [`report`] | `RunReport`, `NotificationOutcome` |

pub mod counter;
pub mod orchestrator;
pub mod report;

pub use counter::VersionCounter;
pub use orchestrator::{Ports, Publisher, WorkflowKind};
pub use report::{NotificationOutcome, RunReport};
