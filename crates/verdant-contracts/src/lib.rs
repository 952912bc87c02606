//! # verdant-contracts
//!
//! Shared types, wire formats, and error contracts for the VERDANT policy
//! dashboard client.
//!
//! All crates in the workspace import from here. No business logic lives in
//! this crate: only data definitions and error types.

pub mod assistant;
pub mod chart;
pub mod chat;
pub mod error;
pub mod graph;
pub mod telemetry;
