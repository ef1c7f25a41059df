//! A2A protocol client
//!
//! One logical connection per configured agent, plus the shared state that
//! tracks cards, capabilities and availability across all of them.

pub mod client;
pub mod connection;

pub use client::{A2aClient, AgentState};
pub use connection::{AgentConnection, TaskEventStream};
