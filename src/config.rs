//! Configuration — CLI flags, environment variables, config file.

use clap::Parser;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// todod — in-memory todo REST service
#[derive(Parser, Debug)]
#[command(name = "todod", version, about)]
pub struct Cli {
    /// Config file path (TOML)
    #[arg(long, default_value = "todod.toml")]
    pub config: String,

    /// Listen port
    #[arg(long, short = 'p')]
    pub port: Option<u16>,

    /// Listen port, positional form (`todod 8080`)
    #[arg(value_name = "PORT")]
    pub port_arg: Option<u16>,

    /// Bind address
    #[arg(long)]
    pub listen_host: Option<String>,

    /// Log level or tracing filter directive
    #[arg(long)]
    pub log_level: Option<String>,

    /// Reject malformed JSON bodies and non-numeric ids with 400
    #[arg(long)]
    pub strict_payloads: bool,

    /// Seconds to let in-flight requests drain after a shutdown signal
    #[arg(long)]
    pub shutdown_grace: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub listen_host: String,
    pub listen_port: u16,
    pub log_level: String,
    pub strict_payloads: bool,
    pub shutdown_grace_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_host: "0.0.0.0".into(),
            listen_port: 4567,
            log_level: "info".into(),
            strict_payloads: false,
            shutdown_grace_secs: 10,
        }
    }
}

/// On-disk shape of `todod.toml`. Every key is optional.
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    #[serde(alias = "host")]
    listen_host: Option<String>,
    #[serde(alias = "port")]
    listen_port: Option<u16>,
    log_level: Option<String>,
    strict_payloads: Option<bool>,
    #[serde(alias = "shutdown_grace")]
    shutdown_grace_secs: Option<u64>,
}

impl Config {
    /// Load configuration: defaults → config file → env vars → CLI flags.
    pub fn load() -> Result<Self, String> {
        Self::from_cli(Cli::parse(), |key| std::env::var(key).ok())
    }

    fn from_cli(cli: Cli, env: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let mut config = Config::default();

        // 1. Config file
        let config_path = Path::new(&cli.config);
        if config_path.exists() {
            let content = fs::read_to_string(config_path)
                .map_err(|e| format!("reading {}: {e}", cli.config))?;
            apply_config_file(&mut config, &content)
                .map_err(|e| format!("parsing {}: {e}", cli.config))?;
        }

        // 2. Environment variables
        apply_env(&mut config, env);

        // 3. CLI flags (highest priority)
        if let Some(v) = cli.port.or(cli.port_arg) {
            config.listen_port = v;
        }
        if let Some(v) = cli.listen_host {
            config.listen_host = v;
        }
        if let Some(v) = cli.log_level {
            config.log_level = v;
        }
        if cli.strict_payloads {
            config.strict_payloads = true;
        }
        if let Some(v) = cli.shutdown_grace {
            config.shutdown_grace_secs = v;
        }

        Ok(config)
    }

    /// Validate configuration. Returns an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.listen_host.trim().is_empty() {
            return Err("listen_host must not be empty".into());
        }
        if self.shutdown_grace_secs == 0 {
            return Err("shutdown_grace must be > 0".into());
        }
        Ok(())
    }
}

fn apply_config_file(config: &mut Config, content: &str) -> Result<(), toml::de::Error> {
    let file: FileConfig = toml::from_str(content)?;

    if let Some(v) = file.listen_host {
        config.listen_host = v;
    }
    if let Some(v) = file.listen_port {
        config.listen_port = v;
    }
    if let Some(v) = file.log_level {
        config.log_level = v;
    }
    if let Some(v) = file.strict_payloads {
        config.strict_payloads = v;
    }
    if let Some(v) = file.shutdown_grace_secs {
        config.shutdown_grace_secs = v;
    }
    Ok(())
}

fn apply_env(config: &mut Config, env: impl Fn(&str) -> Option<String>) {
    if let Some(v) = env("TODOD_PORT") {
        if let Ok(p) = v.parse() {
            config.listen_port = p;
        }
    }
    if let Some(v) = env("TODOD_HOST") {
        config.listen_host = v;
    }
    if let Some(v) = env("TODOD_LOG_LEVEL") {
        config.log_level = v;
    }
    if let Some(v) = env("TODOD_STRICT_PAYLOADS") {
        config.strict_payloads = matches!(v.as_str(), "true" | "1" | "yes");
    }
    if let Some(v) = env("TODOD_SHUTDOWN_GRACE") {
        if let Ok(t) = v.parse() {
            config.shutdown_grace_secs = t;
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
