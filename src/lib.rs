//! Remodely AI chat service
//!
//! HTTP surface over the `remodely-llm` orchestration crate. The
//! binary in `main.rs` wires configuration and providers from the
//! environment; this library exposes the router so integration tests
//! can drive it with mock providers.

#![forbid(unsafe_code)]

pub mod api;
pub mod server;
