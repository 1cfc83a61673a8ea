use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Top-level server configuration, loaded from switchboard.toml.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    pub server: ServerSection,
    pub discord: DiscordSection,
    pub dispatch: DispatchSection,
    pub admin: AdminSection,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub web_address: String,
    /// Upper bound on an inbound request body.
    pub max_body_bytes: usize,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            web_address: "0.0.0.0:8080".into(),
            max_body_bytes: 64 * 1024,
        }
    }
}

/// Platform credentials and identifiers. All values are opaque strings.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct DiscordSection {
    /// Hex-encoded Ed25519 public key used to verify interaction signatures.
    pub public_key: String,
    pub application_id: String,
    pub bot_token: String,
    pub api_base: String,
    pub request_timeout_secs: u64,
}

impl Default for DiscordSection {
    fn default() -> Self {
        Self {
            public_key: String::new(),
            application_id: String::new(),
            bot_token: String::new(),
            api_base: "https://discord.com/api/v10".into(),
            request_timeout_secs: 10,
        }
    }
}

// Hand-written so the bot token never ends up in a log line.
impl std::fmt::Debug for DiscordSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscordSection")
            .field("public_key_set", &!self.public_key.is_empty())
            .field("application_id", &self.application_id)
            .field("bot_token_set", &!self.bot_token.is_empty())
            .field("api_base", &self.api_base)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DispatchSection {
    /// Deadline for a single handler run. 0 disables the deadline.
    pub handler_timeout_ms: u64,
}

impl Default for DispatchSection {
    fn default() -> Self {
        Self {
            handler_timeout_ms: 2500,
        }
    }
}

impl DispatchSection {
    pub fn handler_timeout(&self) -> Option<Duration> {
        (self.handler_timeout_ms > 0).then(|| Duration::from_millis(self.handler_timeout_ms))
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AdminSection {
    /// Mount the operator routes (command list/sync/delete, guild list).
    /// These are unauthenticated, so keep them off in production.
    pub enable_routes: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
}

impl ServerConfig {
    /// Load config from a TOML file. Falls back to defaults if the file doesn't exist.
    /// Environment variables override TOML values.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let mut config = if Path::new(path).exists() {
            let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                path: path.to_string(),
                source,
            })?;
            Self::from_toml(path, &contents)?
        } else {
            info!("No config file found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    fn from_toml(path: &str, contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: path.to_string(),
            source,
        })
    }

    /// Timeout for platform calls made from inside a handler. Capped at 80%
    /// of the handler deadline so a slow call fails as a platform error before
    /// the handler itself is cut off.
    pub fn interaction_request_timeout(&self) -> Duration {
        let request = Duration::from_secs(self.discord.request_timeout_secs);
        match self.dispatch.handler_timeout() {
            Some(deadline) => request.min(deadline * 4 / 5),
            None => request,
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("WEB_ADDRESS") {
            self.server.web_address = v;
        }
        if let Ok(v) = std::env::var("MAX_BODY_BYTES")
            && let Ok(bytes) = v.parse()
        {
            self.server.max_body_bytes = bytes;
        }
        if let Ok(v) = std::env::var("DISCORD_PUBLIC_KEY") {
            self.discord.public_key = v;
        }
        if let Ok(v) = std::env::var("DISCORD_APP_ID") {
            self.discord.application_id = v;
        }
        if let Ok(v) = std::env::var("DISCORD_TOKEN") {
            self.discord.bot_token = v;
        }
        if let Ok(v) = std::env::var("DISCORD_API_BASE") {
            self.discord.api_base = v;
        }
        if let Ok(v) = std::env::var("DISCORD_REQUEST_TIMEOUT_SECS")
            && let Ok(secs) = v.parse()
        {
            self.discord.request_timeout_secs = secs;
        }
        if let Ok(v) = std::env::var("HANDLER_TIMEOUT_MS")
            && let Ok(ms) = v.parse()
        {
            self.dispatch.handler_timeout_ms = ms;
        }
        if let Ok(v) = std::env::var("ENABLE_ADMIN_ROUTES") {
            self.admin.enable_routes = matches!(v.trim(), "1" | "true" | "yes");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Tests that modify environment variables must be serialized to avoid races.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const KEYS: [&str; 9] = [
        "WEB_ADDRESS",
        "MAX_BODY_BYTES",
        "DISCORD_PUBLIC_KEY",
        "DISCORD_APP_ID",
        "DISCORD_TOKEN",
        "DISCORD_API_BASE",
        "DISCORD_REQUEST_TIMEOUT_SECS",
        "HANDLER_TIMEOUT_MS",
        "ENABLE_ADMIN_ROUTES",
    ];

    /// Helper: clear all config env vars, set specific ones, run `f`, restore.
    fn with_env<F: FnOnce()>(vars: &[(&str, &str)], f: F) {
        let _lock = ENV_LOCK.lock().unwrap();
        let originals: Vec<_> = KEYS.iter().map(|k| (*k, std::env::var(k).ok())).collect();

        for key in &KEYS {
            // SAFETY: env access is serialized by ENV_LOCK
            unsafe {
                std::env::remove_var(key);
            }
        }
        for (k, v) in vars {
            // SAFETY: env access is serialized by ENV_LOCK
            unsafe {
                std::env::set_var(k, v);
            }
        }

        f();

        for (k, v) in originals {
            match v {
                // SAFETY: env access is serialized by ENV_LOCK
                Some(val) => unsafe { std::env::set_var(k, val) },
                None => unsafe { std::env::remove_var(k) },
            }
        }
    }

    #[test]
    fn test_defaults_when_file_missing() {
        with_env(&[], || {
            let config = ServerConfig::load("/nonexistent/switchboard.toml").unwrap();
            assert_eq!(config.server.web_address, "0.0.0.0:8080");
            assert_eq!(config.server.max_body_bytes, 64 * 1024);
            assert_eq!(config.discord.api_base, "https://discord.com/api/v10");
            assert!(config.discord.public_key.is_empty());
            assert_eq!(config.dispatch.handler_timeout_ms, 2500);
            assert!(!config.admin.enable_routes);
        });
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = ServerConfig::from_toml(
            "inline",
            r#"
            [discord]
            application_id = "123"

            [admin]
            enable_routes = true
            "#,
        )
        .unwrap();
        assert_eq!(config.discord.application_id, "123");
        assert_eq!(config.discord.request_timeout_secs, 10);
        assert!(config.admin.enable_routes);
        assert_eq!(config.server.web_address, "0.0.0.0:8080");
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let err = ServerConfig::from_toml("bad.toml", "[server\nweb_address = 1").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("bad.toml"));
    }

    #[test]
    fn test_env_overrides() {
        with_env(
            &[
                ("WEB_ADDRESS", "127.0.0.1:9000"),
                ("DISCORD_PUBLIC_KEY", "abcd"),
                ("DISCORD_APP_ID", "app-1"),
                ("DISCORD_TOKEN", "tok"),
                ("HANDLER_TIMEOUT_MS", "0"),
                ("ENABLE_ADMIN_ROUTES", "true"),
            ],
            || {
                let config = ServerConfig::load("/nonexistent/switchboard.toml").unwrap();
                assert_eq!(config.server.web_address, "127.0.0.1:9000");
                assert_eq!(config.discord.public_key, "abcd");
                assert_eq!(config.discord.application_id, "app-1");
                assert_eq!(config.discord.bot_token, "tok");
                assert_eq!(config.dispatch.handler_timeout(), None);
                assert!(config.admin.enable_routes);
            },
        );
    }

    #[test]
    fn test_invalid_numeric_env_falls_back() {
        with_env(
            &[
                ("MAX_BODY_BYTES", "lots"),
                ("HANDLER_TIMEOUT_MS", "soon"),
            ],
            || {
                let config = ServerConfig::load("/nonexistent/switchboard.toml").unwrap();
                assert_eq!(config.server.max_body_bytes, 64 * 1024);
                assert_eq!(
                    config.dispatch.handler_timeout(),
                    Some(Duration::from_millis(2500))
                );
            },
        );
    }

    #[test]
    fn test_interaction_request_timeout_stays_under_handler_deadline() {
        let mut config = ServerConfig::default();
        assert_eq!(
            config.interaction_request_timeout(),
            Duration::from_millis(2000)
        );

        config.discord.request_timeout_secs = 1;
        assert_eq!(config.interaction_request_timeout(), Duration::from_secs(1));

        config.discord.request_timeout_secs = 10;
        config.dispatch.handler_timeout_ms = 0;
        assert_eq!(config.interaction_request_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_debug_hides_bot_token() {
        let section = DiscordSection {
            bot_token: "very-secret".into(),
            ..DiscordSection::default()
        };
        let rendered = format!("{section:?}");
        assert!(!rendered.contains("very-secret"));
        assert!(rendered.contains("bot_token_set: true"));
    }
}
