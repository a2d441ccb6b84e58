//! Simulator for the "oral messages" Byzantine agreement protocol of
//! Lamport, Shostak and Pease.
//!
//! A run puts `n` participants in a single process: one source broadcasting
//! a binary value and `n - 1` lieutenants relaying what they hear for `m`
//! further rounds. Every participant keeps a message tree keyed by the path
//! a value travelled; after the final round each lieutenant folds its tree
//! bottom-up by strict majority, and the value left at the root is its
//! decision. With `n > 3m` every non-faulty lieutenant decides the same
//! value, no matter what the (injectable) faulty participants send.

pub mod cluster;
pub mod error;
pub mod node;
pub mod participant;
pub mod path;
pub mod scenario;
pub mod topology;
pub mod value;

mod render;

pub use crate::cluster::{Cluster, Report};
pub use crate::error::Error;
pub use crate::node::TreeNode;
pub use crate::participant::{Context, Message, Participant};
pub use crate::path::Path;
pub use crate::scenario::{Config, HonestScenario, ReferenceScenario, Scenario};
pub use crate::topology::Topology;
pub use crate::value::Value;

pub type ProcessId = usize;
pub type Round = usize;

pub type Result<T> = std::result::Result<T, Error>;
