//! Live session binding
//!
//! The remote agent owns the conversation; this module only shapes the local
//! mirror of its state: which persona is selected, and the shallow patches
//! the agent and the UI apply on top.

pub mod binder;
pub mod mirror;
pub mod state;
pub mod weather;

pub use binder::{SessionBinder, SessionError, SessionPhase};
pub use mirror::SessionMirror;
pub use state::{SessionPatch, SessionState};
pub use weather::{WeatherCondition, WeatherReport};
