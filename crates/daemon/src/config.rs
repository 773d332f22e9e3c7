//! Daemon configuration
//!
//! Layering (later wins): built-in defaults, YAML file, `RIPLEY_*` environment.
//!
//! ```text
//! RIPLEY_DAEMON__INTERVAL=5m RIPLEY_MONITORING__ROLLING_WINDOW=20 ./ripley
//! ```

use anyhow::{bail, Context, Result};
use config::{Config, ConfigBuilder, Environment, File, FileFormat};
use ripley_core::application::MonitorSettings;
use ripley_infra_system::AgentCommand;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";
const ENV_PREFIX: &str = "RIPLEY";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RipleyConfig {
    pub daemon: DaemonConfig,
    pub claude: AgentConfig,
    pub monitoring: MonitoringConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DaemonConfig {
    /// Go-style duration, e.g. "30m", "1h30m"
    pub interval: String,
    pub db_path: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AgentConfig {
    pub command: String,
    pub model: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub env_allowlist: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MonitoringConfig {
    pub rolling_window: usize,
    pub warning_threshold: f64,
}

/// Where the file layer came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    Defaults,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::File(path) => write!(f, "{}", path.display()),
            ConfigSource::Defaults => write!(f, "built-in defaults"),
        }
    }
}

fn with_defaults() -> Result<ConfigBuilder<config::builder::DefaultState>> {
    Ok(Config::builder()
        .set_default("daemon.interval", "30m")?
        .set_default("daemon.db_path", "./ripley.db")?
        .set_default("claude.command", "claude")?
        .set_default("claude.model", "Sonnet")?
        .set_default("claude.args", vec!["--fresh"])?
        .set_default("claude.env_allowlist", Vec::<String>::new())?
        .set_default("monitoring.rolling_window", 10)?
        .set_default("monitoring.warning_threshold", 0.7)?)
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

impl RipleyConfig {
    /// Built-in defaults only
    #[cfg(test)]
    fn defaults() -> Result<Self> {
        let cfg: Self = with_defaults()?.build()?.try_deserialize()?;
        Ok(cfg)
    }

    /// Load configuration for the daemon.
    ///
    /// With no explicit path, a missing `config.yaml` falls back to defaults.
    /// An explicit path that does not exist is an error.
    pub fn load(explicit: Option<&Path>) -> Result<(Self, ConfigSource)> {
        Self::load_with_env(explicit, environment())
    }

    fn load_with_env(explicit: Option<&Path>, env: Environment) -> Result<(Self, ConfigSource)> {
        let (path, required) = match explicit {
            Some(path) => (path.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_PATH), false),
        };

        if required && !path.exists() {
            bail!("config file not found: {}", path.display());
        }

        let source = if path.exists() {
            ConfigSource::File(path.clone())
        } else {
            ConfigSource::Defaults
        };

        let cfg: Self = with_defaults()?
            .add_source(
                File::from(path.as_path())
                    .format(FileFormat::Yaml)
                    .required(required),
            )
            .add_source(env)
            .build()
            .with_context(|| format!("failed to read config from {}", source))?
            .try_deserialize()
            .context("failed to parse configuration")?;

        cfg.validate().context("invalid configuration")?;
        Ok((cfg, source))
    }

    /// Parse a YAML document layered over the defaults (no environment)
    #[cfg(test)]
    fn from_yaml_str(yaml: &str) -> Result<Self> {
        let cfg: Self = with_defaults()?
            .add_source(File::from_str(yaml, FileFormat::Yaml))
            .build()?
            .try_deserialize()
            .context("failed to parse configuration")?;

        cfg.validate().context("invalid configuration")?;
        Ok(cfg)
    }

    /// Check that all required fields are set and valid
    pub fn validate(&self) -> Result<()> {
        if self.daemon.interval.trim().is_empty() {
            bail!("daemon.interval is required");
        }
        parse_interval(&self.daemon.interval).with_context(|| {
            "daemon.interval must be a valid duration (e.g. '30m', '1h')".to_string()
        })?;

        if self.daemon.db_path.trim().is_empty() {
            bail!("daemon.db_path is required");
        }

        if self.claude.command.trim().is_empty() {
            bail!("claude.command is required");
        }

        if self.claude.model.trim().is_empty() {
            bail!("claude.model is required");
        }

        if self.monitoring.rolling_window == 0 {
            bail!("monitoring.rolling_window must be positive");
        }

        let threshold = self.monitoring.warning_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            bail!("monitoring.warning_threshold must be between 0 and 1");
        }

        Ok(())
    }

    pub fn interval(&self) -> Result<Duration> {
        parse_interval(&self.daemon.interval)
    }

    /// Database path with `~` expanded
    pub fn db_path(&self) -> String {
        shellexpand::tilde(&self.daemon.db_path).into_owned()
    }

    /// `<command> --model <model> <args...>`; the invoker appends the token limit
    pub fn agent_command(&self) -> AgentCommand {
        let mut args = vec!["--model".to_string(), self.claude.model.clone()];
        args.extend(self.claude.args.iter().cloned());

        AgentCommand::new(self.claude.command.clone(), args)
            .with_env_allowlist(self.claude.env_allowlist.clone())
    }

    pub fn monitor_settings(&self) -> Result<MonitorSettings> {
        Ok(MonitorSettings {
            interval: self.interval()?,
            rolling_window: self.monitoring.rolling_window,
            warning_threshold: self.monitoring.warning_threshold,
        })
    }
}

/// Parse a Go-style duration: a sequence of decimal numbers with unit suffixes
/// (ns, us, µs, ms, s, m, h), e.g. "1h30m", "1.5h", "250ms". Must be positive.
pub fn parse_interval(input: &str) -> Result<Duration> {
    let text = input.trim();
    if text.is_empty() {
        bail!("empty duration");
    }

    let is_number = |c: char| c.is_ascii_digit() || c == '.';
    let mut rest = text;
    let mut total_secs = 0.0f64;

    while !rest.is_empty() {
        let number_len = rest.find(|c: char| !is_number(c)).unwrap_or(rest.len());
        if number_len == 0 {
            bail!("invalid duration {:?}: expected a number", input);
        }
        let value: f64 = rest[..number_len]
            .parse()
            .with_context(|| format!("invalid duration {:?}", input))?;
        rest = &rest[number_len..];

        let unit_len = rest.find(is_number).unwrap_or(rest.len());
        let scale = match &rest[..unit_len] {
            "ns" => 1e-9,
            "us" | "µs" => 1e-6,
            "ms" => 1e-3,
            "s" => 1.0,
            "m" => 60.0,
            "h" => 3600.0,
            "" => bail!("invalid duration {:?}: missing unit", input),
            unit => bail!("invalid duration {:?}: unknown unit {:?}", input, unit),
        };
        rest = &rest[unit_len..];

        total_secs += value * scale;
    }

    if total_secs <= 0.0 {
        bail!("duration {:?} must be positive", input);
    }

    Duration::try_from_secs_f64(total_secs)
        .with_context(|| format!("invalid duration {:?}: out of range", input))
}
