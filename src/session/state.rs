//! Shared session state and shallow patches over it
//!
//! `SessionState` is the record the remote agent reads as its instructions
//! and writes tool results into. Fields the agent adds that are not modelled
//! here are carried through untouched in `extra`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::weather::WeatherReport;
use crate::persona::PersonaConfig;

/// Proverb every fresh session starts with
pub const SEED_PROVERB: &str = "CopilotKit may be new, but its the best thing since sliced bread.";

pub const DEFAULT_THEME_COLOR: &str = "#6366f1";

/// `weather_code` before any lookup has happened
pub const NO_WEATHER_CODE: f64 = -1.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionState {
    pub proverbs: Vec<String>,
    pub agent_name: String,
    pub system_prompt: String,

    // Weather tool results
    pub temperature: f64,
    pub humidity: f64,
    pub weather_code: f64,
    pub observed_steps: Vec<String>,

    // Confirmation dialog
    pub pending_confirmation: bool,
    pub confirmation_message: String,
    pub confirmation_context: String,
    pub user_response: String,

    // Web search
    pub search_plan: Vec<String>,
    pub search_results: Map<String, Value>,

    pub theme_color: String,

    /// Agent-written fields without a dedicated slot
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            proverbs: Vec::new(),
            agent_name: String::new(),
            system_prompt: String::new(),
            temperature: 0.0,
            humidity: 0.0,
            weather_code: NO_WEATHER_CODE,
            observed_steps: Vec::new(),
            pending_confirmation: false,
            confirmation_message: String::new(),
            confirmation_context: String::new(),
            user_response: String::new(),
            search_plan: Vec::new(),
            search_results: Map::new(),
            theme_color: DEFAULT_THEME_COLOR.to_string(),
            extra: Map::new(),
        }
    }
}

impl SessionState {
    /// State a new session starts with for `persona`
    pub fn initial(persona: &PersonaConfig) -> Self {
        Self {
            proverbs: vec![SEED_PROVERB.to_string()],
            agent_name: persona.agent_name.clone(),
            system_prompt: persona.system_prompt.clone(),
            ..Self::default()
        }
    }

    pub fn with_theme_color(mut self, color: impl Into<String>) -> Self {
        self.theme_color = color.into();
        self
    }

    /// Latest weather result, if the weather tool has reported one
    ///
    /// Negative codes mean no lookup, or a failed one.
    pub fn weather(&self) -> Option<WeatherReport> {
        if self.weather_code < 0.0 {
            return None;
        }
        Some(WeatherReport {
            temperature: self.temperature,
            humidity: self.humidity,
            weather_code: self.weather_code,
        })
    }
}

/// A partial `SessionState`; `None` fields leave the state alone
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proverbs: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub humidity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather_code: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed_steps: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending_confirmation: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmation_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmation_context: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_response: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_plan: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_results: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme_color: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SessionPatch {
    /// Append a proverb and clear the one-shot `system_prompt` override
    pub fn add_proverb(state: &SessionState, proverb: impl Into<String>) -> Self {
        let mut proverbs = state.proverbs.clone();
        proverbs.push(proverb.into());
        Self {
            proverbs: Some(proverbs),
            system_prompt: Some(String::new()),
            ..Self::default()
        }
    }

    /// Drop the proverb at `index`; `None` if there is no such proverb
    pub fn remove_proverb(state: &SessionState, index: usize) -> Option<Self> {
        if index >= state.proverbs.len() {
            return None;
        }
        let mut proverbs = state.proverbs.clone();
        proverbs.remove(index);
        Some(Self {
            proverbs: Some(proverbs),
            ..Self::default()
        })
    }

    pub fn theme_color(color: impl Into<String>) -> Self {
        Self {
            theme_color: Some(color.into()),
            ..Self::default()
        }
    }

    pub fn weather_report(report: WeatherReport) -> Self {
        Self {
            temperature: Some(report.temperature),
            humidity: Some(report.humidity),
            weather_code: Some(report.weather_code),
            ..Self::default()
        }
    }

    /// Open the confirmation dialog
    pub fn ask_confirmation(message: impl Into<String>, context: impl Into<String>) -> Self {
        Self {
            pending_confirmation: Some(true),
            confirmation_message: Some(message.into()),
            confirmation_context: Some(context.into()),
            user_response: Some(String::new()),
            ..Self::default()
        }
    }

    /// Close the confirmation dialog with the user's answer
    pub fn respond_to_confirmation(response: impl Into<String>) -> Self {
        Self {
            pending_confirmation: Some(false),
            user_response: Some(response.into()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Shallow-merge into `state`
    pub fn apply(self, state: &mut SessionState) {
        if let Some(v) = self.proverbs {
            state.proverbs = v;
        }
        if let Some(v) = self.agent_name {
            state.agent_name = v;
        }
        if let Some(v) = self.system_prompt {
            state.system_prompt = v;
        }
        if let Some(v) = self.temperature {
            state.temperature = v;
        }
        if let Some(v) = self.humidity {
            state.humidity = v;
        }
        if let Some(v) = self.weather_code {
            state.weather_code = v;
        }
        if let Some(v) = self.observed_steps {
            state.observed_steps = v;
        }
        if let Some(v) = self.pending_confirmation {
            state.pending_confirmation = v;
        }
        if let Some(v) = self.confirmation_message {
            state.confirmation_message = v;
        }
        if let Some(v) = self.confirmation_context {
            state.confirmation_context = v;
        }
        if let Some(v) = self.user_response {
            state.user_response = v;
        }
        if let Some(v) = self.search_plan {
            state.search_plan = v;
        }
        if let Some(v) = self.search_results {
            state.search_results = v;
        }
        if let Some(v) = self.theme_color {
            state.theme_color = v;
        }
        state.extra.extend(self.extra);
    }
}
