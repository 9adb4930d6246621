use std::{fs, path::Path};

use serde::Deserialize;
use shared::PARTICIPANT_CHANNEL;
use tracing::warn;

pub const SETTINGS_FILE: &str = "dashboard.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub server_bind: String,
    pub channel: String,
    pub upstream_ws_url: Option<String>,
    pub highlight_ms: u64,
    pub relay_retry_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_bind: "127.0.0.1:8080".into(),
            channel: PARTICIPANT_CHANNEL.into(),
            upstream_ws_url: None,
            highlight_ms: 2000,
            relay_retry_ms: 3000,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    bind_addr: Option<String>,
    channel: Option<String>,
    upstream_ws_url: Option<String>,
    highlight_ms: Option<u64>,
    relay_retry_ms: Option<u64>,
}

pub fn load_settings() -> Settings {
    let mut settings = Settings::default();
    apply_file(&mut settings, Path::new(SETTINGS_FILE));
    apply_env(&mut settings, |key| std::env::var(key).ok());
    settings
}

pub(crate) fn apply_file(settings: &mut Settings, path: &Path) {
    let Ok(raw) = fs::read_to_string(path) else {
        return;
    };
    let file_cfg = match toml::from_str::<FileSettings>(&raw) {
        Ok(cfg) => cfg,
        Err(error) => {
            warn!(path = %path.display(), %error, "ignoring unreadable settings file");
            return;
        }
    };

    if let Some(v) = file_cfg.bind_addr {
        settings.server_bind = v;
    }
    if let Some(v) = file_cfg.channel {
        settings.channel = v;
    }
    if let Some(v) = file_cfg.upstream_ws_url {
        settings.upstream_ws_url = Some(v);
    }
    if let Some(v) = file_cfg.highlight_ms {
        settings.highlight_ms = v;
    }
    if let Some(v) = file_cfg.relay_retry_ms {
        settings.relay_retry_ms = v;
    }
}

pub(crate) fn apply_env(settings: &mut Settings, var: impl Fn(&str) -> Option<String>) {
    if let Some(v) = var("DASHBOARD_BIND") {
        settings.server_bind = v;
    }
    if let Some(v) = var("APP__BIND_ADDR") {
        settings.server_bind = v;
    }

    if let Some(v) = var("APP__CHANNEL") {
        settings.channel = v;
    }

    if let Some(v) = var("UPSTREAM_WS_URL") {
        settings.upstream_ws_url = Some(v);
    }
    if let Some(v) = var("APP__UPSTREAM_WS_URL") {
        settings.upstream_ws_url = Some(v);
    }
    if settings
        .upstream_ws_url
        .as_deref()
        .is_some_and(|url| url.trim().is_empty())
    {
        settings.upstream_ws_url = None;
    }

    if let Some(v) = var("APP__HIGHLIGHT_MS") {
        match v.parse::<u64>() {
            Ok(parsed) => settings.highlight_ms = parsed,
            Err(error) => warn!(value = %v, %error, "invalid APP__HIGHLIGHT_MS, keeping default"),
        }
    }
    if let Some(v) = var("APP__RELAY_RETRY_MS") {
        match v.parse::<u64>() {
            Ok(parsed) => settings.relay_retry_ms = parsed,
            Err(error) => warn!(value = %v, %error, "invalid APP__RELAY_RETRY_MS, keeping default"),
        }
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
