use std::{collections::HashMap, fs, path::Path, time::Duration};

use anyhow::Context;
use engine::{CommandTokens, EngineConfig};
use serde::Deserialize;
use url::Url;

pub const DEFAULT_CONFIG_PATH: &str = "chatbot.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    pub mirror_url: String,
    pub admin: Option<String>,
    pub cooldown_ms: u64,
    pub notice_delay_ms: u64,
    pub inactivity_timeout_secs: u64,
    pub max_active_games: usize,
    pub request_timeout_ms: u64,
    pub join_tokens: String,
    pub higher_tokens: String,
    pub lower_tokens: String,
    pub shutdown_tokens: String,
}

impl Default for Settings {
    fn default() -> Self {
        let engine = EngineConfig::default();
        Self {
            mirror_url: "http://127.0.0.1:42069".into(),
            admin: None,
            cooldown_ms: millis(engine.cooldown),
            notice_delay_ms: millis(engine.notice_delay),
            inactivity_timeout_secs: engine.inactivity_timeout.as_secs(),
            max_active_games: engine.max_active_games,
            request_timeout_ms: 2_000,
            join_tokens: engine.tokens.join.join(","),
            higher_tokens: engine.tokens.higher.join(","),
            lower_tokens: engine.tokens.lower.join(","),
            shutdown_tokens: engine.tokens.shutdown.join(","),
        }
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

impl Settings {
    /// Parses the mirror base URL. Only http(s) URLs are accepted.
    pub fn mirror_url(&self) -> anyhow::Result<Url> {
        let url = Url::parse(&self.mirror_url)
            .with_context(|| format!("invalid mirror url '{}'", self.mirror_url))?;
        anyhow::ensure!(
            matches!(url.scheme(), "http" | "https"),
            "mirror url '{}' must use http or https",
            self.mirror_url
        );
        Ok(url)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn engine_config(&self) -> EngineConfig {
        let defaults = CommandTokens::default();
        let tokens_or = |raw: &str, fallback: Vec<String>| {
            let tokens = CommandTokens::split_list(raw);
            if tokens.is_empty() {
                fallback
            } else {
                tokens
            }
        };
        EngineConfig {
            cooldown: Duration::from_millis(self.cooldown_ms),
            notice_delay: Duration::from_millis(self.notice_delay_ms),
            inactivity_timeout: Duration::from_secs(self.inactivity_timeout_secs),
            max_active_games: self.max_active_games.max(1),
            tokens: CommandTokens {
                join: tokens_or(&self.join_tokens, defaults.join),
                higher: tokens_or(&self.higher_tokens, defaults.higher),
                lower: tokens_or(&self.lower_tokens, defaults.lower),
                shutdown: tokens_or(&self.shutdown_tokens, defaults.shutdown),
            },
            admin: self.admin.clone(),
            ..EngineConfig::default()
        }
    }
}

pub fn load_settings(path: &Path) -> Settings {
    let mut settings = Settings::default();
    if let Ok(raw) = fs::read_to_string(path) {
        apply_file(&mut settings, &raw);
    }
    apply_env(&mut settings, |key| std::env::var(key).ok());
    settings
}

fn apply_file(settings: &mut Settings, raw: &str) {
    let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(raw) else {
        return;
    };
    apply(settings, |key| file_cfg.get(key).cloned());
}

fn apply_env(settings: &mut Settings, var: impl Fn(&str) -> Option<String>) {
    apply(settings, |key| var(&format!("APP__{}", key.to_uppercase())));
}

/// Overlays every known key found by `lookup`. Unparseable numbers keep the
/// current value.
fn apply(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    fn number<T: std::str::FromStr>(target: &mut T, raw: Option<String>) {
        if let Some(parsed) = raw.and_then(|v| v.trim().parse().ok()) {
            *target = parsed;
        }
    }

    if let Some(v) = lookup("mirror_url") {
        settings.mirror_url = v;
    }
    if let Some(v) = lookup("admin") {
        settings.admin = Some(v).filter(|admin| !admin.trim().is_empty());
    }
    number(&mut settings.cooldown_ms, lookup("cooldown_ms"));
    number(&mut settings.notice_delay_ms, lookup("notice_delay_ms"));
    number(
        &mut settings.inactivity_timeout_secs,
        lookup("inactivity_timeout_secs"),
    );
    number(&mut settings.max_active_games, lookup("max_active_games"));
    number(&mut settings.request_timeout_ms, lookup("request_timeout_ms"));
    if let Some(v) = lookup("join_tokens") {
        settings.join_tokens = v;
    }
    if let Some(v) = lookup("higher_tokens") {
        settings.higher_tokens = v;
    }
    if let Some(v) = lookup("lower_tokens") {
        settings.lower_tokens = v;
    }
    if let Some(v) = lookup("shutdown_tokens") {
        settings.shutdown_tokens = v;
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
