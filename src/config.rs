use chrono::FixedOffset;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{error, warn};

const DEFAULT_PORT: u16 = 4320;
const DEFAULT_REPORT_WINDOW_HOURS: u32 = 24;

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

/// `{data_dir}/config.toml` — all fields are optional overrides.
/// Priority: CLI / env var  >  TOML  >  built-in default.
#[derive(Deserialize, Default)]
struct TomlConfig {
    /// HTTP server port (default: 4320).
    port: Option<u16>,
    /// Log level filter string, e.g. "debug", "info,facilityd=trace" (default: "info").
    log: Option<String>,
    /// Log output format: "pretty" (default) | "json".
    log_format: Option<String>,
    /// Bind address for the HTTP server (default: "127.0.0.1").
    bind_address: Option<String>,
    /// Bearer token for moderation endpoints. None = moderation auth disabled
    /// (local-only, trusted use).
    api_token: Option<String>,
    /// Calendar-day boundary for streaks, as minutes east of UTC
    /// (e.g. 480 for UTC+8). Default: 0 (UTC).
    utc_offset_minutes: Option<i32>,
    /// How many hours of reports feed a location's current status (default: 24).
    report_window_hours: Option<u32>,
}

fn load_toml(data_dir: &Path) -> Option<TomlConfig> {
    let path = data_dir.join("config.toml");
    let contents = std::fs::read_to_string(&path).ok()?;
    match toml::from_str::<TomlConfig>(&contents) {
        Ok(cfg) => Some(cfg),
        Err(e) => {
            error!(path = %path.display(), err = %e, "failed to parse config.toml — using defaults");
            None
        }
    }
}

#[derive(Debug, Clone)]
pub struct FacilityConfig {
    pub port: u16,
    pub data_dir: PathBuf,
    pub log: String,
    /// "pretty" | "json".
    pub log_format: String,
    pub bind_address: String,
    /// Bearer token required by moderation endpoints; None disables the check.
    pub api_token: Option<String>,
    /// Minutes east of UTC used for every calendar-day reduction.
    pub utc_offset_minutes: i32,
    pub report_window_hours: u32,
}

impl FacilityConfig {
    /// Build config from CLI/env args + optional TOML file.
    pub fn new(
        port: Option<u16>,
        data_dir: Option<PathBuf>,
        log: Option<String>,
        bind_address: Option<String>,
    ) -> Self {
        let data_dir = data_dir.unwrap_or_else(default_data_dir);

        let toml = load_toml(&data_dir).unwrap_or_default();

        let port = port.or(toml.port).unwrap_or(DEFAULT_PORT);
        let log = log.or(toml.log).unwrap_or_else(|| "info".to_string());

        let log_format = std::env::var("FACILITYD_LOG_FORMAT")
            .ok()
            .filter(|s| !s.is_empty())
            .or(toml.log_format)
            .unwrap_or_else(|| "pretty".to_string());

        let bind_address = bind_address
            .or(std::env::var("FACILITYD_BIND").ok().filter(|s| !s.is_empty()))
            .or(toml.bind_address)
            .unwrap_or_else(default_bind_address);

        let api_token = std::env::var("FACILITYD_API_TOKEN")
            .ok()
            .filter(|s| !s.is_empty())
            .or(toml.api_token);

        let utc_offset_minutes = toml.utc_offset_minutes.unwrap_or(0);
        let report_window_hours = toml
            .report_window_hours
            .unwrap_or(DEFAULT_REPORT_WINDOW_HOURS);

        Self {
            port,
            data_dir,
            log,
            log_format,
            bind_address,
            api_token,
            utc_offset_minutes,
            report_window_hours,
        }
    }

    /// The configured calendar-day boundary as a chrono offset.
    /// An out-of-range value falls back to UTC rather than failing startup.
    pub fn utc_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_minutes * 60).unwrap_or_else(|| {
            warn!(
                minutes = self.utc_offset_minutes,
                "utc_offset_minutes out of range — falling back to UTC"
            );
            FixedOffset::east_opt(0).unwrap()
        })
    }
}

fn default_data_dir() -> PathBuf {
    #[cfg(target_os = "macos")]
    {
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("facilityd");
        }
    }
    #[cfg(target_os = "linux")]
    {
        if let Ok(xdg) = std::env::var("XDG_DATA_HOME") {
            return PathBuf::from(xdg).join("facilityd");
        }
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home)
                .join(".local")
                .join("share")
                .join("facilityd");
        }
    }
    #[cfg(target_os = "windows")]
    {
        if let Ok(appdata) = std::env::var("APPDATA") {
            return PathBuf::from(appdata).join("facilityd");
        }
    }
    PathBuf::from(".facilityd")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_without_toml() {
        let cfg = FacilityConfig::new(None, Some(PathBuf::from("/nonexistent")), None, None);
        assert_eq!(cfg.port, DEFAULT_PORT);
        assert_eq!(cfg.log, "info");
        assert_eq!(cfg.utc_offset_minutes, 0);
        assert_eq!(cfg.report_window_hours, DEFAULT_REPORT_WINDOW_HOURS);
    }

    #[test]
    fn cli_beats_defaults() {
        let cfg = FacilityConfig::new(
            Some(9000),
            Some(PathBuf::from("/nonexistent")),
            Some("debug".into()),
            Some("0.0.0.0".into()),
        );
        assert_eq!(cfg.port, 9000);
        assert_eq!(cfg.log, "debug");
        assert_eq!(cfg.bind_address, "0.0.0.0");
    }

    #[test]
    fn bad_offset_falls_back_to_utc() {
        let mut cfg = FacilityConfig::new(None, Some(PathBuf::from("/nonexistent")), None, None);
        cfg.utc_offset_minutes = 24 * 60 + 1;
        assert_eq!(cfg.utc_offset(), FixedOffset::east_opt(0).unwrap());
    }
}
