//! Table allocation & recommendation engine.
//!
//! Given a venue, a night window and a party size, the engine answers "what
//! could seat this party" (an advisory, pure pipeline) and "claim these
//! tables" (the one mutating, serialized operation):
//!
//!   resolver → generator → ranker → caller
//!
//! The pipeline is a pure function of a store snapshot; only
//! [`engine::AllocationEngine::commit`] writes, via the reservation manager.

pub mod availability;
pub mod candidates;
pub mod engine;
pub mod error;
pub mod ranking;
pub mod types;
