use std::{collections::HashMap, fs, path::Path, str::FromStr, time::Duration};

use anyhow::{bail, Context};
use desk_core::{config::MAX_CHANNELS, DeskConfig};
use device_link::LinkKind;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub presets_path: String,
    pub link: String,
    pub channel_count: usize,
    pub preset_digits: u32,
    pub tick_interval_ms: u64,
    pub reconnect_threshold: u32,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        let core = DeskConfig::default();
        Self {
            presets_path: storage::DEFAULT_PRESET_PATH.into(),
            link: "dry-run".into(),
            channel_count: core.channel_count,
            preset_digits: core.preset_digits,
            tick_interval_ms: core.tick_interval.as_millis() as u64,
            reconnect_threshold: core.reconnect_threshold,
            log_filter: "info".into(),
        }
    }
}

/// Defaults, then `config_path` if it exists, then the environment.
pub fn load_settings(config_path: &Path) -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(config_path) {
        match toml::from_str::<HashMap<String, toml::Value>>(&raw) {
            Ok(file_cfg) => {
                let file_cfg: HashMap<String, String> = file_cfg
                    .into_iter()
                    .map(|(key, value)| match value {
                        toml::Value::String(text) => (key, text),
                        other => (key, other.to_string()),
                    })
                    .collect();
                apply_overrides(&mut settings, |key| file_cfg.get(key).cloned());
            }
            Err(error) => {
                warn!(path = %config_path.display(), %error, "ignoring unreadable settings file")
            }
        }
    }

    apply_overrides(&mut settings, env_lookup);
    settings
}

fn env_lookup(key: &str) -> Option<String> {
    let upper = key.to_ascii_uppercase();
    std::env::var(format!("APP__{upper}"))
        .or_else(|_| std::env::var(format!("DESK_{upper}")))
        .ok()
}

/// Overlays every key `lookup` knows about. Values that fail to parse are
/// skipped and the previous value kept.
pub fn apply_overrides(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("presets_path") {
        settings.presets_path = v;
    }
    if let Some(v) = lookup("link") {
        settings.link = v;
    }
    if let Some(v) = lookup("log_filter") {
        settings.log_filter = v;
    }
    override_parsed(&lookup, "channel_count", &mut settings.channel_count);
    override_parsed(&lookup, "preset_digits", &mut settings.preset_digits);
    override_parsed(&lookup, "tick_interval_ms", &mut settings.tick_interval_ms);
    override_parsed(&lookup, "reconnect_threshold", &mut settings.reconnect_threshold);
}

fn override_parsed<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, target: &mut T) {
    let Some(raw) = lookup(key) else {
        return;
    };
    match raw.trim().parse() {
        Ok(parsed) => *target = parsed,
        Err(_) => warn!(key, value = %raw, "ignoring unparsable setting"),
    }
}

impl Settings {
    pub fn desk_config(&self) -> anyhow::Result<DeskConfig> {
        if !(1..=MAX_CHANNELS).contains(&self.channel_count) {
            bail!(
                "channel_count must be between 1 and {MAX_CHANNELS}, got {}",
                self.channel_count
            );
        }
        if !(1..=9).contains(&self.preset_digits) {
            bail!(
                "preset_digits must be between 1 and 9, got {}",
                self.preset_digits
            );
        }
        if self.tick_interval_ms == 0 {
            bail!("tick_interval_ms must be greater than zero");
        }

        Ok(DeskConfig {
            channel_count: self.channel_count,
            preset_digits: self.preset_digits,
            tick_interval: Duration::from_millis(self.tick_interval_ms),
            reconnect_threshold: self.reconnect_threshold,
        })
    }

    pub fn link_kind(&self) -> anyhow::Result<LinkKind> {
        LinkKind::parse(&self.link)
            .with_context(|| format!("unknown output link '{}'; expected dry-run or udmx", self.link))
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
