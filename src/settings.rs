// Runtime configuration, read from the environment with defaults for anything unset.
use crate::memory::MemoryLimit;

pub const DEFAULT_MODEL: &str = "llama2";
pub const DEFAULT_OLLAMA_HOST: &str = "http://localhost:11434";

pub const MODEL_VAR: &str = "OLLAMA_MODEL";
pub const HOST_VAR: &str = "OLLAMA_HOST";
pub const MAX_MESSAGES_VAR: &str = "TECHPAL_MAX_MESSAGES";
pub const DEBUG_VAR: &str = "TECHPAL_DEBUG";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub model: String,               // Ollama model name.
    pub ollama_host: String,         // Base URL of the Ollama server.
    pub max_messages: Option<usize>, // Cap on conversation length, oldest dropped first.
    pub debug_mode: bool,            // Log at Debug level instead of Info.
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            model: DEFAULT_MODEL.to_string(),
            ollama_host: DEFAULT_OLLAMA_HOST.to_string(),
            max_messages: None,
            debug_mode: false,
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    // Build settings from any key-value source; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let defaults = Settings::default();

        let max_messages = get(MAX_MESSAGES_VAR).and_then(|raw| match raw.parse::<usize>() {
            Ok(0) | Err(_) => {
                log::warn!("Ignoring invalid {MAX_MESSAGES_VAR}={raw:?}, expected a positive integer");
                None
            }
            Ok(max) => Some(max),
        });

        let debug_mode = get(DEBUG_VAR)
            .map(|raw| matches!(raw.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
            .unwrap_or(defaults.debug_mode);

        Settings {
            model: get(MODEL_VAR).unwrap_or(defaults.model),
            ollama_host: get(HOST_VAR)
                .map(|host| normalize_host(&host))
                .unwrap_or(defaults.ollama_host),
            max_messages,
            debug_mode,
        }
    }

    pub fn memory_limit(&self) -> Option<MemoryLimit> {
        self.max_messages.map(MemoryLimit::drop_oldest)
    }
}

// Ollama itself accepts OLLAMA_HOST without a scheme, e.g. `127.0.0.1:11434`.
fn normalize_host(host: &str) -> String {
    if host.contains("://") {
        host.to_string()
    } else {
        format!("http://{host}")
    }
}
