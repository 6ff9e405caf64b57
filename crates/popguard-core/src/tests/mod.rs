//! Test module for determinism and integration tests.
//!
//! - `determinism.rs`: same seed and inputs give identical games
//! - `integration.rs`: full round cycles through the state machine
//! - `helpers.rs`: scenario setup and stepping utilities

mod helpers;
mod integration;
