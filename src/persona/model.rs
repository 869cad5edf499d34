//! Persona records and the merged registry view

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::builtin::{self, DEFAULT_ICON, DEFAULT_PERSONA_ID};
use super::error::PersonaError;

/// A persona as the remote agent sees it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonaConfig {
    pub system_prompt: String,
    pub agent_name: String,
    pub icon: String,
    #[serde(rename = "isCustom", default)]
    pub is_custom: bool,
}

impl Default for PersonaConfig {
    /// The `default` built-in (Jarvis)
    fn default() -> Self {
        builtin::default_persona()
    }
}

/// A user-created persona, as persisted in durable storage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomPersonaConfig {
    pub id: String,
    pub system_prompt: String,
    pub agent_name: String,
    #[serde(default = "default_icon")]
    pub icon: String,
    #[serde(rename = "isCustom", default = "default_true")]
    pub is_custom: bool,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

fn default_icon() -> String {
    DEFAULT_ICON.to_string()
}

fn default_true() -> bool {
    true
}

impl CustomPersonaConfig {
    /// Plain config view of this record
    pub fn to_config(&self) -> PersonaConfig {
        PersonaConfig {
            system_prompt: self.system_prompt.clone(),
            agent_name: self.agent_name.clone(),
            icon: self.icon.clone(),
            is_custom: true,
        }
    }
}

/// Either kind of persona, as surfaced by [`PersonaRegistry`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Persona {
    Custom(CustomPersonaConfig),
    BuiltIn(PersonaConfig),
}

impl Persona {
    pub fn agent_name(&self) -> &str {
        match self {
            Persona::Custom(c) => &c.agent_name,
            Persona::BuiltIn(c) => &c.agent_name,
        }
    }

    pub fn system_prompt(&self) -> &str {
        match self {
            Persona::Custom(c) => &c.system_prompt,
            Persona::BuiltIn(c) => &c.system_prompt,
        }
    }

    pub fn icon(&self) -> &str {
        match self {
            Persona::Custom(c) => &c.icon,
            Persona::BuiltIn(c) => &c.icon,
        }
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, Persona::Custom(_))
    }

    /// The custom record, if this is a user-created persona
    pub fn as_custom(&self) -> Option<&CustomPersonaConfig> {
        match self {
            Persona::Custom(c) => Some(c),
            Persona::BuiltIn(_) => None,
        }
    }

    pub fn to_config(&self) -> PersonaConfig {
        match self {
            Persona::Custom(c) => c.to_config(),
            Persona::BuiltIn(c) => c.clone(),
        }
    }
}

/// Merged id -> persona mapping: built-ins first, then custom entries
///
/// A custom entry whose id matches a built-in replaces it in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PersonaRegistry {
    entries: IndexMap<String, Persona>,
}

impl Default for PersonaRegistry {
    fn default() -> Self {
        Self::builtins()
    }
}

impl PersonaRegistry {
    /// Registry holding only the built-in personas
    pub fn builtins() -> Self {
        let entries = builtin::builtin_personas()
            .into_iter()
            .map(|(id, config)| (id.to_string(), Persona::BuiltIn(config)))
            .collect();
        Self { entries }
    }

    /// Overlay custom personas on top of the current entries
    pub fn with_custom<I>(mut self, custom: I) -> Self
    where
        I: IntoIterator<Item = CustomPersonaConfig>,
    {
        for record in custom {
            if self.entries.get(&record.id).is_some_and(|p| !p.is_custom()) {
                log::warn!("Custom persona '{}' shadows a built-in persona", record.id);
            }
            self.entries.insert(record.id.clone(), Persona::Custom(record));
        }
        self
    }

    pub fn get(&self, id: &str) -> Option<&Persona> {
        self.entries.get(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Persona)> {
        self.entries.iter().map(|(id, p)| (id.as_str(), p))
    }

    pub fn builtin(&self) -> impl Iterator<Item = (&str, &Persona)> {
        self.iter().filter(|(_, p)| !p.is_custom())
    }

    pub fn custom(&self) -> impl Iterator<Item = (&str, &Persona)> {
        self.iter().filter(|(_, p)| p.is_custom())
    }

    /// Look up `id`, falling back to the default built-in
    ///
    /// Returns the id actually used together with the persona config.
    pub fn resolve(&self, id: &str) -> (String, PersonaConfig) {
        if let Some(persona) = self.get(id) {
            return (id.to_string(), persona.to_config());
        }

        log::debug!("Persona '{}' not found, falling back to '{}'", id, DEFAULT_PERSONA_ID);
        let config = self
            .get(DEFAULT_PERSONA_ID)
            .map(Persona::to_config)
            .unwrap_or_default();
        (DEFAULT_PERSONA_ID.to_string(), config)
    }
}

/// Fields supplied by the user when creating a persona
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonaDraft {
    pub agent_name: String,
    pub system_prompt: String,
    #[serde(default)]
    pub icon: String,
}

impl PersonaDraft {
    pub fn new(agent_name: impl Into<String>, system_prompt: impl Into<String>, icon: impl Into<String>) -> Self {
        Self {
            agent_name: agent_name.into(),
            system_prompt: system_prompt.into(),
            icon: icon.into(),
        }
    }

    /// Trim text fields and reject blanks; a blank icon becomes the default
    pub fn validated(self) -> Result<Self, PersonaError> {
        let agent_name = required("agent_name", &self.agent_name)?;
        let system_prompt = required("system_prompt", &self.system_prompt)?;
        let icon = match self.icon.trim() {
            "" => DEFAULT_ICON.to_string(),
            icon => icon.to_string(),
        };

        Ok(Self {
            agent_name,
            system_prompt,
            icon,
        })
    }
}

/// Partial update of a custom persona
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonaPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl PersonaPatch {
    pub fn is_empty(&self) -> bool {
        self.agent_name.is_none() && self.system_prompt.is_none() && self.icon.is_none()
    }

    pub fn icon(icon: impl Into<String>) -> Self {
        Self {
            icon: Some(icon.into()),
            ..Self::default()
        }
    }

    /// Apply the patch to a record, validating any text field it touches
    pub fn apply_to(&self, record: &mut CustomPersonaConfig) -> Result<(), PersonaError> {
        if let Some(ref name) = self.agent_name {
            record.agent_name = required("agent_name", name)?;
        }
        if let Some(ref prompt) = self.system_prompt {
            record.system_prompt = required("system_prompt", prompt)?;
        }
        if let Some(ref icon) = self.icon {
            let icon = icon.trim();
            if !icon.is_empty() {
                record.icon = icon.to_string();
            }
        }
        Ok(())
    }
}

fn required(field: &str, value: &str) -> Result<String, PersonaError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(PersonaError::Validation(format!("{} must not be blank", field)));
    }
    Ok(trimmed.to_string())
}
