//! Client configuration loaded from environment variables.
//!
//! All settings have sensible defaults so the demo can start with zero
//! configuration.

use std::path::PathBuf;
use std::time::Duration;

use teamchat_shared::constants::DEFAULT_NAMESPACE;

/// Canned phrases used for simulated incoming messages.
pub const DEFAULT_PHRASES: [&str; 6] = [
    "Hey! How's everything going? 😊",
    "Just finished the latest update 🚀",
    "Can you review when you have time?",
    "Great job on the presentation! 👏",
    "Let's catch up soon ☕",
    "System running smoothly 💪",
];

/// Timing and odds of the demo activity simulator.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatorConfig {
    /// Env: `SIM_ENABLED` (true/false). Default: `true`
    pub enabled: bool,

    /// How often the incoming-message trigger fires.
    /// Env: `SIM_MESSAGE_INTERVAL_SECS`. Default: 20 s
    pub message_interval: Duration,

    /// Chance per message tick that a message is injected.
    /// Env: `SIM_MESSAGE_PROBABILITY`. Default: 0.02
    pub message_probability: f64,

    /// How often presence is shuffled.
    /// Env: `SIM_PRESENCE_INTERVAL_SECS`. Default: 60 s
    pub presence_interval: Duration,

    /// Chance per user per presence tick that their status changes.
    /// Env: `SIM_PRESENCE_PROBABILITY`. Default: 0.1
    pub presence_probability: f64,

    pub phrases: Vec<String>,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            message_interval: Duration::from_secs(20),
            message_probability: 0.02,
            presence_interval: Duration::from_secs(60),
            presence_probability: 0.1,
            phrases: DEFAULT_PHRASES.iter().map(|p| p.to_string()).collect(),
        }
    }
}

/// Client configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// SQLite database file.
    /// Env: `TEAMCHAT_DB_PATH`
    /// Default: `None` (platform data directory).
    pub db_path: Option<PathBuf>,

    /// Prefix of every persisted key.
    /// Env: `TEAMCHAT_NAMESPACE`. Default: `chatApp`
    pub namespace: String,

    /// Phone number to log in with at startup.
    /// Env: `TEAMCHAT_DEMO_PHONE`. Default: none.
    pub demo_phone: Option<String>,

    pub simulator: SimulatorConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            namespace: DEFAULT_NAMESPACE.to_string(),
            demo_phone: None,
            simulator: SimulatorConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(path) = lookup("TEAMCHAT_DB_PATH").filter(|p| !p.is_empty()) {
            config.db_path = Some(PathBuf::from(path));
        }

        if let Some(namespace) = lookup("TEAMCHAT_NAMESPACE") {
            if namespace.trim().is_empty() {
                tracing::warn!("Empty TEAMCHAT_NAMESPACE, using default");
            } else {
                config.namespace = namespace.trim().to_string();
            }
        }

        if let Some(phone) = lookup("TEAMCHAT_DEMO_PHONE").filter(|p| !p.trim().is_empty()) {
            config.demo_phone = Some(phone);
        }

        let sim = &mut config.simulator;

        if let Some(val) = lookup("SIM_ENABLED") {
            sim.enabled = val != "false" && val != "0";
        }

        if let Some(val) = lookup("SIM_MESSAGE_INTERVAL_SECS") {
            match parse_interval(&val) {
                Some(d) => sim.message_interval = d,
                None => tracing::warn!(value = %val, "Invalid SIM_MESSAGE_INTERVAL_SECS, using default"),
            }
        }

        if let Some(val) = lookup("SIM_PRESENCE_INTERVAL_SECS") {
            match parse_interval(&val) {
                Some(d) => sim.presence_interval = d,
                None => tracing::warn!(value = %val, "Invalid SIM_PRESENCE_INTERVAL_SECS, using default"),
            }
        }

        if let Some(val) = lookup("SIM_MESSAGE_PROBABILITY") {
            match parse_probability(&val) {
                Some(p) => sim.message_probability = p,
                None => tracing::warn!(value = %val, "Invalid SIM_MESSAGE_PROBABILITY, using default"),
            }
        }

        if let Some(val) = lookup("SIM_PRESENCE_PROBABILITY") {
            match parse_probability(&val) {
                Some(p) => sim.presence_probability = p,
                None => tracing::warn!(value = %val, "Invalid SIM_PRESENCE_PROBABILITY, using default"),
            }
        }

        // RUST_LOG is handled directly by tracing-subscriber's EnvFilter,
        // so we do not store it here.

        config
    }
}

/// Whole seconds, strictly positive.
fn parse_interval(value: &str) -> Option<Duration> {
    match value.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Some(Duration::from_secs(secs)),
        _ => None,
    }
}

/// A probability in `[0, 1]`.
fn parse_probability(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|p| (0.0..=1.0).contains(p))
}
