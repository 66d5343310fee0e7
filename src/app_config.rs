//! Application configuration loading for CLI defaults.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use liquipedia_core::ServiceConfig;
use url::Url;

/// `key = value` file configuration for liquipedia-fetch defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileConfig {
    /// Origin page URLs must belong to.
    pub origin: Option<String>,
    /// Base URL API requests are sent to (defaults to the origin).
    pub api_base_url: Option<String>,
    /// User-Agent sent to the wiki.
    pub user_agent: Option<String>,
    /// Directory for the page content cache.
    pub cache_dir: Option<PathBuf>,
    /// Optional client connect timeout in seconds.
    pub connect_timeout_secs: Option<u64>,
    /// Optional whole-request timeout in seconds.
    pub read_timeout_secs: Option<u64>,
}

impl FileConfig {
    /// Validates config values.
    pub fn validate(&self) -> Result<()> {
        validate_timeout_secs("connect_timeout_secs", self.connect_timeout_secs)?;
        validate_timeout_secs("read_timeout_secs", self.read_timeout_secs)?;
        if let Some(user_agent) = &self.user_agent
            && user_agent.trim().is_empty()
        {
            bail!("Invalid config value for `user_agent`: must not be empty");
        }
        if let Some(origin) = &self.origin {
            validate_origin(origin)?;
        }
        Ok(())
    }

    /// Builds the library service configuration, with `origin_override`
    /// taking precedence over the file value.
    #[must_use]
    pub fn service_config(&self, origin_override: Option<&str>) -> ServiceConfig {
        let mut config = match origin_override.or(self.origin.as_deref()) {
            Some(origin) => ServiceConfig::with_origin(origin),
            None => ServiceConfig::default(),
        };
        if let Some(base_url) = &self.api_base_url {
            config = config.api_base_url(base_url.clone());
        }
        if let Some(user_agent) = &self.user_agent {
            config = config.user_agent(user_agent.clone());
        }
        config.timeouts(
            self.connect_timeout_secs.map(Duration::from_secs),
            self.read_timeout_secs.map(Duration::from_secs),
        )
    }
}

fn validate_origin(origin: &str) -> Result<()> {
    let url = Url::parse(origin)
        .with_context(|| format!("Invalid config value for `origin`: '{origin}' is not a URL"))?;
    if !url.origin().is_tuple() || url.path() != "/" || url.query().is_some() {
        bail!("Invalid config value for `origin`: '{origin}'. Expected scheme://host[:port]");
    }
    Ok(())
}

fn validate_timeout_secs(field: &str, value: Option<u64>) -> Result<()> {
    let Some(value) = value else {
        return Ok(());
    };
    if !(1..=3600).contains(&value) {
        bail!("Invalid config value for `{field}`: {value}. Expected range: 1..=3600");
    }
    Ok(())
}

/// Resolves default config path.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME/liquipedia-fetch/config.toml`
/// 2. `$HOME/.config/liquipedia-fetch/config.toml`
#[must_use]
pub fn resolve_default_config_path() -> Option<PathBuf> {
    if let Some(xdg_config_home) = env_var_non_empty_os("XDG_CONFIG_HOME") {
        return Some(
            PathBuf::from(xdg_config_home)
                .join("liquipedia-fetch")
                .join("config.toml"),
        );
    }

    let home = env_var_non_empty_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("liquipedia-fetch")
            .join("config.toml"),
    )
}

fn env_var_non_empty_os(name: &str) -> Option<std::ffi::OsString> {
    let value = env::var_os(name)?;
    if value.is_empty() { None } else { Some(value) }
}

/// Loads config from `explicit_path`, or from the default path if present.
///
/// An explicit path must exist; a missing default file yields an empty config.
pub fn load_config(explicit_path: Option<&Path>) -> Result<FileConfig> {
    if let Some(path) = explicit_path {
        return load_file_config(path);
    }

    match resolve_default_config_path() {
        Some(path) if path.exists() => load_file_config(&path),
        _ => Ok(FileConfig::default()),
    }
}

fn load_file_config(path: &Path) -> Result<FileConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
    parse_config_str(&raw)
        .with_context(|| format!("Failed to parse config file '{}'", path.display()))
}

fn parse_config_str(raw: &str) -> Result<FileConfig> {
    let mut cfg = FileConfig::default();
    for (line_index, raw_line) in raw.lines().enumerate() {
        let line = strip_inline_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }

        let Some((raw_key, raw_value)) = line.split_once('=') else {
            bail!(
                "Invalid config syntax on line {}: expected key = value",
                line_index + 1
            );
        };

        let key = raw_key.trim();
        let value = raw_value.trim();
        let line_number = line_index + 1;

        match key {
            "origin" | "api_base_url" | "user_agent" | "cache_dir" => {
                let parsed = parse_string_literal(value)
                    .with_context(|| format!("Invalid `{key}` value on line {line_number}"))?;
                match key {
                    "origin" => cfg.origin = Some(parsed),
                    "api_base_url" => cfg.api_base_url = Some(parsed),
                    "user_agent" => cfg.user_agent = Some(parsed),
                    _ => cfg.cache_dir = Some(PathBuf::from(parsed)),
                }
            }
            "connect_timeout_secs" => {
                let parsed = parse_integer_u64(value).with_context(|| {
                    format!("Invalid `connect_timeout_secs` value on line {line_number}")
                })?;
                cfg.connect_timeout_secs = Some(parsed);
            }
            "read_timeout_secs" => {
                let parsed = parse_integer_u64(value).with_context(|| {
                    format!("Invalid `read_timeout_secs` value on line {line_number}")
                })?;
                cfg.read_timeout_secs = Some(parsed);
            }
            unknown => {
                bail!("Unknown configuration key: '{unknown}' on line {line_number}");
            }
        }
    }
    cfg.validate()?;
    Ok(cfg)
}

fn strip_inline_comment(line: &str) -> &str {
    let mut in_string = false;
    for (index, ch) in line.char_indices() {
        match ch {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..index],
            _ => {}
        }
    }
    line
}

fn parse_string_literal(raw_value: &str) -> Result<String> {
    if raw_value.len() < 2 || !raw_value.starts_with('"') || !raw_value.ends_with('"') {
        bail!("Expected double-quoted string");
    }
    Ok(raw_value[1..raw_value.len() - 1].to_string())
}

fn parse_integer_u64(raw_value: &str) -> Result<u64> {
    let token = raw_value.trim();
    if token.is_empty() {
        bail!("Expected integer value");
    }
    let value = token.parse::<i128>()?;
    if value < 0 {
        bail!("Expected non-negative integer");
    }
    u64::try_from(value).map_err(|_| anyhow::anyhow!("Integer value out of range for u64"))
}
