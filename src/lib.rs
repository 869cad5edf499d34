//! personakit: persona store and live session binder for a hosted agent
//!
//! - [`persona`]: built-in and user-defined personas over a durable
//!   key-value backend, surfaced as one merged registry
//! - [`session`]: the local mirror of the agent's shared state, kept in
//!   step with the selected persona
//! - [`config`]: YAML configuration with an env/file fallback chain

pub mod config;
pub mod persona;
pub mod session;
