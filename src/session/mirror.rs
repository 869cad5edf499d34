//! Durable snapshot of the session binder
//!
//! The CLI runs one command per process, so the binder is saved between
//! invocations under its own backend key. A missing or unreadable snapshot
//! reads as a fresh, uninitialized session.

use super::binder::{SessionBinder, SessionError};
use crate::persona::StorageBackend;

/// Backend key holding the session snapshot
pub const SESSION_KEY: &str = "session";

pub struct SessionMirror<B: StorageBackend> {
    backend: B,
    key: String,
}

impl<B: StorageBackend> SessionMirror<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            key: SESSION_KEY.to_string(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Load the saved binder, or a new one if there is none
    pub fn load(&self) -> SessionBinder {
        match self.backend.read(&self.key) {
            Ok(Some(content)) => match serde_json::from_str(&content) {
                Ok(binder) => binder,
                Err(e) => {
                    log::warn!("Ignoring malformed session snapshot: {}", e);
                    SessionBinder::new()
                }
            },
            Ok(None) => SessionBinder::new(),
            Err(e) => {
                log::warn!("Failed to read session snapshot: {}", e);
                SessionBinder::new()
            }
        }
    }

    pub fn save(&mut self, binder: &SessionBinder) -> Result<(), SessionError> {
        let json = serde_json::to_string_pretty(binder).map_err(crate::persona::StorageError::from)?;
        self.backend.write(&self.key, &json)?;
        Ok(())
    }

    /// Drop the snapshot entirely
    pub fn clear(&mut self) -> Result<(), SessionError> {
        self.backend.remove(&self.key)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persona::{MemoryBackend, PersonaRegistry};
    use crate::session::binder::SessionPhase;
    use crate::session::state::SessionPatch;

    #[test]
    fn test_missing_snapshot_is_fresh() {
        let mirror = SessionMirror::new(MemoryBackend::new());
        assert_eq!(mirror.load().phase(), &SessionPhase::Uninitialized);
    }

    #[test]
    fn test_save_and_load() {
        let registry = PersonaRegistry::builtins();
        let mut binder = SessionBinder::new();
        binder.select_persona(&registry, "weather_expert").unwrap();
        binder
            .apply_transient_update(SessionPatch::theme_color("#f97316"))
            .unwrap();

        let mut mirror = SessionMirror::new(MemoryBackend::new());
        mirror.save(&binder).unwrap();
        assert_eq!(mirror.load(), binder);
    }

    #[test]
    fn test_malformed_snapshot_is_fresh() {
        let mirror = SessionMirror::new(MemoryBackend::new().with_value(SESSION_KEY, "{\"phase\":"));
        assert_eq!(mirror.load(), SessionBinder::new());
    }

    #[test]
    fn test_clear() {
        let mut mirror = SessionMirror::new(MemoryBackend::new());
        mirror.save(&SessionBinder::new()).unwrap();
        mirror.clear().unwrap();
        assert!(mirror.backend().raw(SESSION_KEY).is_none());
    }
}
