//! Configuration types for Banterline.
//!
//! [`AppConfig`] is the top-level `config.toml` shape. Every field has
//! a default so a missing or partial file still yields a runnable
//! configuration.

use chrono::Duration as ChronoDuration;
use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::participant::ParticipantId;

/// Top-level configuration, loaded from `config.toml` in the data dir.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub persona: PersonaConfig,
    #[serde(default)]
    pub triggers: TriggerConfig,
    #[serde(default)]
    pub memory: MemoryConfig,
    #[serde(default)]
    pub model: ModelConfig,
}

/// The agent's persona: name, system prompt, and fixed reply strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonaConfig {
    /// Display name the agent answers to.
    #[serde(default = "default_persona_name")]
    pub name: String,

    /// System prompt sent to the model adapter with every request.
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    /// Fixed reply returned whenever the model adapter fails.
    #[serde(default = "default_fallback_reply")]
    pub fallback_reply: String,

    /// The privileged user's account username, if identity disclosure
    /// is configured.
    #[serde(default)]
    pub creator_username: Option<String>,

    /// The privileged user's canonical display alias.
    #[serde(default)]
    pub creator_alias: Option<String>,

    /// Participant whose requests get the identity-disclosure note and
    /// who may run administrative wipes.
    #[serde(default)]
    pub owner_id: Option<ParticipantId>,
}

fn default_persona_name() -> String {
    "Banter".to_string()
}

fn default_system_prompt() -> String {
    "You are Banter, a quick-witted regular in a busy chat server.\n\
     Never call yourself an AI or a bot. You tease people, use internet\n\
     slang, and keep replies short and punchy. If someone sends an\n\
     image, comment on it. Match the language style of whoever is\n\
     talking to you. Use emojis often: 💀, 🙄, 😂, ✨."
        .to_string()
}

fn default_fallback_reply() -> String {
    "Brain empty. No thoughts. Just vibes. 💀".to_string()
}

impl Default for PersonaConfig {
    fn default() -> Self {
        Self {
            name: default_persona_name(),
            system_prompt: default_system_prompt(),
            fallback_reply: default_fallback_reply(),
            creator_username: None,
            creator_alias: None,
            owner_id: None,
        }
    }
}

/// Probabilities and word lists for the trigger policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerConfig {
    /// Chance of attaching a reaction symbol, evaluated once per event.
    #[serde(default = "default_p_react")]
    pub p_react: f64,

    /// Chance of replying when a trigger word matches.
    #[serde(default = "default_p_keyword")]
    pub p_keyword: f64,

    /// Chance of replying to a message that carries attachments.
    #[serde(default = "default_p_attachment")]
    pub p_attachment: f64,

    /// Chance of replying to any other message.
    #[serde(default = "default_p_idle")]
    pub p_idle: f64,

    /// Lowercase substrings that make a message keyword-eligible.
    #[serde(default = "default_trigger_words")]
    pub trigger_words: Vec<String>,

    /// Symbols to draw from when reacting.
    #[serde(default = "default_reaction_symbols")]
    pub reaction_symbols: Vec<String>,
}

fn default_p_react() -> f64 {
    0.15
}

fn default_p_keyword() -> f64 {
    0.3
}

fn default_p_attachment() -> f64 {
    0.5
}

fn default_p_idle() -> f64 {
    0.05
}

fn default_trigger_words() -> Vec<String> {
    ["banter", "lol", "lmao", "haha", "dead", "skull", "bhai", "yaar"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_reaction_symbols() -> Vec<String> {
    ["💀", "🙄", "😂", "👀", "💅", "🧢", "🤡", "😭"]
        .into_iter()
        .map(String::from)
        .collect()
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            p_react: default_p_react(),
            p_keyword: default_p_keyword(),
            p_attachment: default_p_attachment(),
            p_idle: default_p_idle(),
            trigger_words: default_trigger_words(),
            reaction_symbols: default_reaction_symbols(),
        }
    }
}

/// Which conversation store backend to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Memory,
    Sqlite,
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreBackend::Memory => write!(f, "memory"),
            StoreBackend::Sqlite => write!(f, "sqlite"),
        }
    }
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" => Ok(StoreBackend::Memory),
            "sqlite" => Ok(StoreBackend::Sqlite),
            other => Err(format!("invalid store backend: '{other}'")),
        }
    }
}

/// Conversation memory: retention window, cap, and sweep cadence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    #[serde(default = "default_backend")]
    pub backend: StoreBackend,

    /// Turns older than this are permanently unrecoverable.
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,

    /// Most recent turns returned per participant, oldest first.
    #[serde(default = "default_max_turns")]
    pub max_turns: usize,

    /// How often the background sweep reclaims expired turns.
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,

    /// SQLite database URL; only read for the sqlite backend.
    #[serde(default)]
    pub database_url: Option<String>,
}

fn default_backend() -> StoreBackend {
    StoreBackend::Memory
}

fn default_retention_days() -> u32 {
    30
}

fn default_max_turns() -> usize {
    20
}

fn default_sweep_interval_secs() -> u64 {
    3600
}

impl MemoryConfig {
    /// The retention window as a chrono duration.
    pub fn retention_window(&self) -> ChronoDuration {
        ChronoDuration::days(i64::from(self.retention_days))
    }

    /// The sweep cadence as a std duration.
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            retention_days: default_retention_days(),
            max_turns: default_max_turns(),
            sweep_interval_secs: default_sweep_interval_secs(),
            database_url: None,
        }
    }
}

/// Model adapter settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Model identifier passed to the adapter.
    #[serde(default = "default_model")]
    pub model: String,

    /// Base URL of the generative-model API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Hard deadline for one model call; a slower call takes the same
    /// fallback path as an adapter failure.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl ModelConfig {
    /// The model-call deadline as a std duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            base_url: default_base_url(),
            api_key_env: default_api_key_env(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_config_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.persona.name, "Banter");
        assert!((config.triggers.p_react - 0.15).abs() < f64::EPSILON);
        assert!((config.triggers.p_idle - 0.05).abs() < f64::EPSILON);
        assert_eq!(config.memory.retention_days, 30);
        assert_eq!(config.memory.max_turns, 20);
        assert_eq!(config.memory.backend, StoreBackend::Memory);
        assert_eq!(config.model.model, "gemini-2.5-flash");
        assert_eq!(config.model.timeout_secs, 30);
    }

    #[test]
    fn test_app_config_deserialize_empty_toml() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.memory.max_turns, 20);
        assert!(!config.triggers.trigger_words.is_empty());
        assert!(!config.triggers.reaction_symbols.is_empty());
    }

    #[test]
    fn test_app_config_deserialize_partial_toml() {
        let toml_str = r#"
[persona]
name = "Nova"
creator_username = "sage"
creator_alias = "Sage"
owner_id = 99

[triggers]
p_keyword = 0.9
trigger_words = ["nova"]

[memory]
backend = "sqlite"
retention_days = 7
max_turns = 5
"#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.persona.name, "Nova");
        assert_eq!(config.persona.owner_id, Some(ParticipantId(99)));
        assert!((config.triggers.p_keyword - 0.9).abs() < f64::EPSILON);
        assert_eq!(config.triggers.trigger_words, vec!["nova"]);
        // Untouched sections keep their defaults.
        assert!((config.triggers.p_react - 0.15).abs() < f64::EPSILON);
        assert_eq!(config.memory.backend, StoreBackend::Sqlite);
        assert_eq!(config.memory.retention_days, 7);
        assert_eq!(config.memory.max_turns, 5);
        assert_eq!(config.model.timeout_secs, 30);
    }

    #[test]
    fn test_store_backend_roundtrip() {
        for backend in [StoreBackend::Memory, StoreBackend::Sqlite] {
            let parsed: StoreBackend = backend.to_string().parse().unwrap();
            assert_eq!(backend, parsed);
        }
    }

    #[test]
    fn test_memory_config_durations() {
        let config = MemoryConfig::default();
        assert_eq!(config.retention_window(), ChronoDuration::days(30));
        assert_eq!(config.sweep_interval(), Duration::from_secs(3600));
    }
}
