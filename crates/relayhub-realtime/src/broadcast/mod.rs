//! Event fan-out to registered connections.

pub mod hub;

pub use hub::BroadcastHub;
