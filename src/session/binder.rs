//! Live session binder
//!
//! Keeps `SessionState.agent_name`/`system_prompt` in step with the selected
//! persona while leaving everything the agent has accumulated alone.
//!
//! Lifecycle: `Uninitialized -> Active(id) -> Active(id') -> Terminated`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::state::{SessionPatch, SessionState};
use crate::persona::{PersonaRegistry, StorageError};

#[derive(Error, Debug)]
pub enum SessionError {
    /// The session has been ended; start a new one
    #[error("Session has ended")]
    Terminated,

    /// No persona has been selected yet
    #[error("Session has not been started")]
    Uninitialized,

    #[error("Failed to persist session: {0}")]
    Storage(#[from] StorageError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum SessionPhase {
    Uninitialized,
    Active { persona_id: String },
    Terminated,
}

/// One chat session's local mirror of the agent state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionBinder {
    #[serde(flatten)]
    phase: SessionPhase,
    state: SessionState,
}

impl Default for SessionBinder {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionBinder {
    pub fn new() -> Self {
        Self {
            phase: SessionPhase::Uninitialized,
            state: SessionState::default(),
        }
    }

    /// Start with a theme color other than the default
    pub fn with_theme_color(mut self, color: impl Into<String>) -> Self {
        self.state.theme_color = color.into();
        self
    }

    pub fn phase(&self) -> &SessionPhase {
        &self.phase
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Id of the selected persona while active
    pub fn selected(&self) -> Option<&str> {
        match self.phase {
            SessionPhase::Active { ref persona_id } => Some(persona_id),
            _ => None,
        }
    }

    /// Select a persona, mirroring its name and prompt into the state
    ///
    /// Unknown ids fall back to the default persona. The first selection
    /// initializes the state with the persona's defaults; later ones only
    /// touch `agent_name` and `system_prompt`. Returns the id selected.
    pub fn select_persona(&mut self, registry: &PersonaRegistry, id: &str) -> Result<&str, SessionError> {
        let (resolved, persona) = registry.resolve(id);

        match self.phase {
            SessionPhase::Terminated => return Err(SessionError::Terminated),
            SessionPhase::Uninitialized => {
                let theme_color = std::mem::take(&mut self.state.theme_color);
                self.state = SessionState::initial(&persona).with_theme_color(theme_color);
                log::info!("Session started with persona {}", resolved);
            }
            SessionPhase::Active { persona_id: ref previous } => {
                SessionPatch {
                    agent_name: Some(persona.agent_name),
                    system_prompt: Some(persona.system_prompt),
                    ..SessionPatch::default()
                }
                .apply(&mut self.state);
                log::info!("Switched persona {} -> {}", previous, resolved);
            }
        }

        self.phase = SessionPhase::Active { persona_id: resolved };
        Ok(self.selected().unwrap_or_default())
    }

    /// Shallow-merge a patch from the agent or the UI into the state
    pub fn apply_transient_update(&mut self, patch: SessionPatch) -> Result<(), SessionError> {
        match self.phase {
            SessionPhase::Uninitialized => Err(SessionError::Uninitialized),
            SessionPhase::Terminated => Err(SessionError::Terminated),
            SessionPhase::Active { .. } => {
                log::debug!("Applying session patch: {:?}", patch);
                patch.apply(&mut self.state);
                Ok(())
            }
        }
    }

    /// End the session; further mutations are rejected
    pub fn end(&mut self) {
        if self.phase != SessionPhase::Terminated {
            log::info!("Session ended");
        }
        self.phase = SessionPhase::Terminated;
    }
}
