//! Built-in personas and the icon catalog

use super::model::PersonaConfig;

/// Persona selected when nothing else is, or when a lookup misses
pub const DEFAULT_PERSONA_ID: &str = "default";

/// Icon given to custom personas created without one
pub const DEFAULT_ICON: &str = "🤖";

const BUILTINS: &[(&str, &str, &str, &str)] = &[
    (
        DEFAULT_PERSONA_ID,
        "Jarvis",
        "🤖",
        "You are a helpful and knowledgeable assistant.",
    ),
    (
        "weather_expert",
        "WeatherBot",
        "🌤️",
        "You are a specialized weather analysis AI. Provide detailed weather insights and recommendations.",
    ),
    (
        "spanish_assistant",
        "Carlos",
        "🇪🇸",
        "Eres un asistente útil que habla español. Responde siempre en español.",
    ),
    (
        "creative_writer",
        "Muse",
        "✍️",
        "You are a creative writing assistant. Help users with storytelling, poetry, and creative content.",
    ),
];

/// Icons offered when creating or editing a custom persona
pub const AVAILABLE_ICONS: &[&str] = &[
    // General
    "🤖", "🧠", "💡", "⚡", "🎯", "🚀", "🔥", "💎", "🌟", "⭐", "✨",
    // Creative
    "🎨", "✍️", "📝", "📚", "🎭", "🎪", "🖼️", "🎬", "🎵",
    // Weather and world
    "🌤️", "🌦️", "⛈️", "🌈", "🌍", "🌎", "🌏", "🗺️", "🏔️", "🌋",
    // Tech
    "💻", "⌨️", "🖥️", "📱", "💿", "🔧", "⚙️", "🛠️", "🔬", "🧪",
    // Languages
    "🇪🇸", "🇫🇷", "🇩🇪", "🇮🇹", "🇯🇵", "🇰🇷", "🇨🇳", "🇷🇺", "🇮🇳", "🇧🇷",
    // Food
    "🍳", "👨‍🍳", "🍕", "🍔", "🥗", "🍜", "🍱", "🧁", "🍰", "☕",
    // Learning
    "📖", "🎓", "👨‍🏫", "🧑‍🎓", "📐", "🔢", "🧮", "📊", "📈", "📉",
    // Achievement
    "🏆", "🥇", "🎖️", "🏅", "👑", "💪",
];

/// All built-in personas in display order
pub fn builtin_personas() -> Vec<(&'static str, PersonaConfig)> {
    BUILTINS
        .iter()
        .map(|(id, name, icon, prompt)| (*id, config(name, icon, prompt)))
        .collect()
}

/// The persona used when a lookup fails
pub fn default_persona() -> PersonaConfig {
    let (_, name, icon, prompt) = BUILTINS[0];
    config(name, icon, prompt)
}

pub fn is_builtin(id: &str) -> bool {
    BUILTINS.iter().any(|(builtin_id, ..)| *builtin_id == id)
}

fn config(name: &str, icon: &str, prompt: &str) -> PersonaConfig {
    PersonaConfig {
        system_prompt: prompt.to_string(),
        agent_name: name.to_string(),
        icon: icon.to_string(),
        is_custom: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_default_persona_is_first_builtin() {
        let builtins = builtin_personas();
        assert_eq!(builtins[0].0, DEFAULT_PERSONA_ID);
        assert_eq!(builtins[0].1, default_persona());
        assert_eq!(default_persona().agent_name, "Jarvis");
    }

    #[test]
    fn test_weather_expert() {
        let builtins = builtin_personas();
        let (_, weather) = builtins.iter().find(|(id, _)| *id == "weather_expert").unwrap();
        assert_eq!(weather.agent_name, "WeatherBot");
        assert!(!weather.is_custom);
    }

    #[test]
    fn test_icon_catalog_has_no_duplicates() {
        let unique: HashSet<&str> = AVAILABLE_ICONS.iter().copied().collect();
        assert_eq!(unique.len(), AVAILABLE_ICONS.len());
        assert!(AVAILABLE_ICONS.contains(&DEFAULT_ICON));
    }

    #[test]
    fn test_is_builtin() {
        assert!(is_builtin("creative_writer"));
        assert!(!is_builtin("custom_123_abc"));
    }
}
