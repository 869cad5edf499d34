//! Persona system for the hosted agent
//!
//! A persona is a named (agent_name, system_prompt, icon) triple that tells
//! the remote agent how to behave. Built-ins ship with the binary; custom
//! personas are created by the user and persisted through a
//! [`backend::StorageBackend`].

pub mod backend;
pub mod builtin;
pub mod error;
pub mod model;
pub mod store;

pub use backend::{FileBackend, MemoryBackend, StorageBackend};
pub use error::{PersonaError, StorageError};
pub use model::{CustomPersonaConfig, Persona, PersonaConfig, PersonaDraft, PersonaPatch, PersonaRegistry};
pub use store::PersonaStore;
