//! Persona store: CRUD over custom personas, merged reads with built-ins
//!
//! The custom collection lives under one backend key as a JSON object
//! mapping id to record. Every read goes to the backend, so a write from
//! another process is picked up on the next call (last writer wins).

use chrono::{DateTime, Duration, Utc};
use indexmap::IndexMap;
use rand::Rng;

use super::backend::StorageBackend;
use super::error::{PersonaError, StorageError};
use super::model::{CustomPersonaConfig, Persona, PersonaDraft, PersonaPatch, PersonaRegistry};

/// Backend key holding the custom persona collection
pub const CUSTOM_PROMPTS_KEY: &str = "custom_prompts";

/// Prefix of generated ids; keeps custom ids out of the built-in namespace
pub const CUSTOM_ID_PREFIX: &str = "custom_";

const ID_SUFFIX_LEN: usize = 9;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

type CustomMap = IndexMap<String, CustomPersonaConfig>;

/// Durable store of custom personas over an injected backend
pub struct PersonaStore<B: StorageBackend> {
    backend: B,
    key: String,
}

impl<B: StorageBackend> PersonaStore<B> {
    pub fn new(backend: B) -> Self {
        Self::with_key(backend, CUSTOM_PROMPTS_KEY)
    }

    pub fn with_key(backend: B, key: impl Into<String>) -> Self {
        Self {
            backend,
            key: key.into(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Built-ins merged with every persisted custom persona
    ///
    /// Never fails: storage problems degrade to built-ins only.
    pub fn list(&self) -> PersonaRegistry {
        PersonaRegistry::builtins().with_custom(self.load_custom().into_values())
    }

    /// Look up a single persona in the merged view
    pub fn get(&self, id: &str) -> Option<Persona> {
        self.list().get(id).cloned()
    }

    /// Create a custom persona and return its generated id
    pub fn create(&mut self, draft: PersonaDraft) -> Result<String, PersonaError> {
        let draft = draft.validated()?;
        let mut custom = self.load_custom();

        let id = unique_id(&custom);
        let now = Utc::now();
        let record = CustomPersonaConfig {
            id: id.clone(),
            system_prompt: draft.system_prompt,
            agent_name: draft.agent_name,
            icon: draft.icon,
            is_custom: true,
            created_at: now,
            updated_at: now,
        };
        custom.insert(id.clone(), record);

        self.flush(&custom)?;
        log::info!("Created custom persona {}", id);
        Ok(id)
    }

    /// Merge `patch` into an existing custom persona
    ///
    /// Built-in ids are not updatable and report `NotFound`.
    pub fn update(&mut self, id: &str, patch: &PersonaPatch) -> Result<(), PersonaError> {
        let mut custom = self.load_custom();
        let record = custom
            .get_mut(id)
            .ok_or_else(|| PersonaError::NotFound(id.to_string()))?;

        patch.apply_to(record)?;
        record.updated_at = next_timestamp(record.updated_at);

        self.flush(&custom)?;
        log::info!("Updated custom persona {}", id);
        Ok(())
    }

    /// Remove a custom persona; unknown ids are a no-op
    pub fn delete(&mut self, id: &str) -> Result<(), PersonaError> {
        let mut custom = self.load_custom();
        if custom.shift_remove(id).is_none() {
            log::debug!("Delete of unknown persona {} ignored", id);
            return Ok(());
        }

        self.flush(&custom)?;
        log::info!("Deleted custom persona {}", id);
        Ok(())
    }

    fn load_custom(&self) -> CustomMap {
        let content = match self.backend.read(&self.key) {
            Ok(Some(content)) => content,
            Ok(None) => return CustomMap::new(),
            Err(e) => {
                log::warn!("Failed to read custom personas: {}", e);
                return CustomMap::new();
            }
        };

        let raw: IndexMap<String, serde_json::Value> = match serde_json::from_str(&content) {
            Ok(raw) => raw,
            Err(e) => {
                log::warn!("Ignoring malformed custom persona data under '{}': {}", self.key, e);
                return CustomMap::new();
            }
        };

        let mut custom = CustomMap::with_capacity(raw.len());
        for (id, value) in raw {
            match serde_json::from_value::<CustomPersonaConfig>(value) {
                Ok(mut record) => {
                    record.id = id.clone();
                    record.is_custom = true;
                    custom.insert(id, record);
                }
                Err(e) => {
                    log::warn!("Skipping malformed custom persona {}: {}", id, e);
                }
            }
        }
        custom
    }

    fn flush(&mut self, custom: &CustomMap) -> Result<(), StorageError> {
        let json = serde_json::to_string(custom)?;
        self.backend.write(&self.key, &json)
    }
}

/// `custom_<unix-millis>_<base36 suffix>`, regenerated on the unlikely clash
fn unique_id(existing: &CustomMap) -> String {
    loop {
        let id = generate_id();
        if !existing.contains_key(&id) {
            return id;
        }
    }
}

fn generate_id() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..ID_SUFFIX_LEN)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect();
    format!("{}{}_{}", CUSTOM_ID_PREFIX, Utc::now().timestamp_millis(), suffix)
}

/// Current time, bumped past `previous` if the clock has not moved on
fn next_timestamp(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now();
    if now > previous { now } else { previous + Duration::milliseconds(1) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persona::backend::MemoryBackend;

    struct BrokenBackend {
        stored: Option<String>,
    }

    impl StorageBackend for BrokenBackend {
        fn read(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Ok(self.stored.clone())
        }

        fn write(&mut self, key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Io {
                key: key.to_string(),
                source: std::io::Error::other("disk full"),
            })
        }

        fn remove(&mut self, _key: &str) -> Result<(), StorageError> {
            Ok(())
        }
    }

    struct UnreadableBackend;

    impl StorageBackend for UnreadableBackend {
        fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Io {
                key: key.to_string(),
                source: std::io::Error::other("permission denied"),
            })
        }

        fn write(&mut self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Ok(())
        }

        fn remove(&mut self, _key: &str) -> Result<(), StorageError> {
            Ok(())
        }
    }

    fn store() -> PersonaStore<MemoryBackend> {
        PersonaStore::new(MemoryBackend::new())
    }

    fn draft() -> PersonaDraft {
        PersonaDraft::new("Chef", "You are a cooking assistant.", "🍳")
    }

    #[test]
    fn test_list_empty_store_is_builtins() {
        assert_eq!(store().list(), PersonaRegistry::builtins());
    }

    #[test]
    fn test_create_then_list() {
        let mut store = store();
        let id = store.create(draft()).unwrap();

        let registry = store.list();
        let persona = registry.get(&id).unwrap();
        assert_eq!(persona.agent_name(), "Chef");
        assert_eq!(persona.system_prompt(), "You are a cooking assistant.");
        assert_eq!(persona.icon(), "🍳");
        assert!(persona.is_custom());
        assert_eq!(registry.len(), 5);
    }

    #[test]
    fn test_generated_id_format() {
        let mut store = store();
        let id = store.create(draft()).unwrap();
        let rest = id.strip_prefix(CUSTOM_ID_PREFIX).unwrap();
        let (millis, suffix) = rest.split_once('_').unwrap();
        assert!(millis.parse::<i64>().is_ok());
        assert_eq!(suffix.len(), ID_SUFFIX_LEN);
        assert!(suffix.bytes().all(|b| BASE36.contains(&b)));
    }

    #[test]
    fn test_ids_are_unique() {
        let mut store = store();
        let a = store.create(draft()).unwrap();
        let b = store.create(draft()).unwrap();
        assert_ne!(a, b);
        assert_eq!(store.list().custom().count(), 2);
    }

    #[test]
    fn test_create_blank_name_fails_and_store_unchanged() {
        let mut store = store();
        let err = store
            .create(PersonaDraft::new("", "x", "🤖"))
            .unwrap_err();
        assert!(matches!(err, PersonaError::Validation(_)));
        assert!(store.backend().raw(CUSTOM_PROMPTS_KEY).is_none());
        assert_eq!(store.list(), PersonaRegistry::builtins());
    }

    #[test]
    fn test_update_unknown_fails_not_found() {
        let mut store = store();
        store.create(draft()).unwrap();
        let before = store.list();

        let err = store.update("custom_0_missing", &PersonaPatch::icon("🔥")).unwrap_err();
        assert!(matches!(err, PersonaError::NotFound(ref id) if id == "custom_0_missing"));
        assert_eq!(store.list(), before);
    }

    #[test]
    fn test_update_builtin_is_not_found() {
        let mut store = store();
        let err = store.update("weather_expert", &PersonaPatch::icon("🔥")).unwrap_err();
        assert!(matches!(err, PersonaError::NotFound(_)));
    }

    #[test]
    fn test_update_round_trip() {
        let mut store = store();
        let id = store.create(draft()).unwrap();
        store.update(&id, &PersonaPatch::icon("🔥")).unwrap();

        let registry = store.list();
        let record = registry.get(&id).and_then(Persona::as_custom).unwrap();
        assert_eq!(record.icon, "🔥");
        assert_eq!(record.agent_name, "Chef");
        assert!(record.updated_at > record.created_at);
    }

    #[test]
    fn test_update_blank_prompt_rejected() {
        let mut store = store();
        let id = store.create(draft()).unwrap();
        let patch = PersonaPatch {
            system_prompt: Some("  ".to_string()),
            ..PersonaPatch::default()
        };
        let err = store.update(&id, &patch).unwrap_err();
        assert!(matches!(err, PersonaError::Validation(_)));
        assert_eq!(store.get(&id).unwrap().system_prompt(), "You are a cooking assistant.");
    }

    #[test]
    fn test_delete_unknown_is_noop() {
        let mut store = store();
        store.create(draft()).unwrap();
        let before = store.list();
        store.delete("custom_0_missing").unwrap();
        assert_eq!(store.list(), before);
    }

    #[test]
    fn test_delete_removes_and_is_idempotent() {
        let mut store = store();
        let id = store.create(draft()).unwrap();
        store.delete(&id).unwrap();
        store.delete(&id).unwrap();
        assert!(store.get(&id).is_none());
        assert_eq!(store.list(), PersonaRegistry::builtins());
    }

    #[test]
    fn test_malformed_storage_yields_builtins() {
        let backend = MemoryBackend::new().with_value(CUSTOM_PROMPTS_KEY, r#"{"custom_1_abc": {"id": "#);
        let store = PersonaStore::new(backend);
        assert_eq!(store.list(), PersonaRegistry::builtins());
    }

    #[test]
    fn test_malformed_record_is_skipped() {
        let json = r#"{
            "custom_1_good": {
                "id": "custom_1_good",
                "system_prompt": "Be kind.",
                "agent_name": "Kind",
                "icon": "💡",
                "isCustom": true,
                "createdAt": "2025-07-01T20:00:00.000Z",
                "updatedAt": "2025-07-01T20:00:00.000Z"
            },
            "custom_2_bad": { "agent_name": 42 }
        }"#;
        let store = PersonaStore::new(MemoryBackend::new().with_value(CUSTOM_PROMPTS_KEY, json));
        let registry = store.list();
        assert_eq!(registry.custom().count(), 1);
        assert_eq!(registry.get("custom_1_good").unwrap().agent_name(), "Kind");
    }

    #[test]
    fn test_unreadable_backend_yields_builtins() {
        let store = PersonaStore::new(UnreadableBackend);
        assert_eq!(store.list(), PersonaRegistry::builtins());
    }

    #[test]
    fn test_write_failure_surfaces_storage_error() {
        let mut store = PersonaStore::new(BrokenBackend { stored: None });
        let err = store.create(draft()).unwrap_err();
        assert!(matches!(err, PersonaError::Storage(_)));
        assert_eq!(store.list(), PersonaRegistry::builtins());
    }

    #[test]
    fn test_quota_exceeded_leaves_state_unchanged() {
        let mut store = PersonaStore::new(MemoryBackend::new().with_quota(400));
        let id = store.create(draft()).unwrap();
        let before = store.list();

        let huge = PersonaDraft::new("Verbose", "x".repeat(1_000), "📚");
        let err = store.create(huge).unwrap_err();
        assert!(matches!(err, PersonaError::Storage(StorageError::QuotaExceeded { .. })));
        assert_eq!(store.list(), before);
        assert!(store.get(&id).is_some());
    }

    #[test]
    fn test_next_timestamp_is_strictly_increasing() {
        let future = Utc::now() + Duration::seconds(60);
        assert!(next_timestamp(future) > future);
        let past = Utc::now() - Duration::seconds(60);
        assert!(next_timestamp(past) > past);
    }
}
