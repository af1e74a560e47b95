//! Peer-facing HTTP surface.

pub mod face;
