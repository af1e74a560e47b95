//! The per-node infection state machine and its propagation loop.

pub mod machine;
pub mod sneeze;

pub use machine::{Node, NodeError, NodeState};
