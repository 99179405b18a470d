//! CLI argument definitions for the Pharmaq server.
//!
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::Parser;
use std::path::PathBuf;

/// Pharmaq - pharma society Q&A and consolidated report generator.
#[derive(Parser, Debug)]
#[command(name = "pharmaq", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// HTTP server port.
    #[arg(short = 'p', long = "port")]
    pub port: Option<u16>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,

    /// Write the default configuration to the config path if no file exists.
    #[arg(long = "init-config")]
    pub init_config: bool,

    /// Answer with canned replies instead of calling the language model.
    #[arg(long = "offline")]
    pub offline: bool,
}

impl CliArgs {
    /// Priority: --config flag > PHARMAQ_CONFIG env var > ~/.pharmaq/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("PHARMAQ_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Priority: --port flag > PHARMAQ_PORT env var > config file value > 8501.
    pub fn resolve_port(&self, config_port: u16) -> u16 {
        if let Some(p) = self.port {
            return p;
        }
        if let Ok(val) = std::env::var("PHARMAQ_PORT") {
            if let Ok(p) = val.parse::<u16>() {
                return p;
            }
        }
        if config_port != 0 {
            return config_port;
        }
        8501
    }

    /// Priority: --log-level flag > config file value.
    pub fn resolve_log_level(&self, config_level: &str) -> String {
        self.log_level
            .clone()
            .unwrap_or_else(|| config_level.to_string())
    }
}

fn default_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    if let Ok(home) = std::env::var("USERPROFILE") {
        return PathBuf::from(home).join(".pharmaq").join("config.toml");
    }
    #[cfg(not(target_os = "windows"))]
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".pharmaq").join("config.toml");
    }
    PathBuf::from("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliArgs {
        CliArgs::parse_from(std::iter::once("pharmaq").chain(args.iter().copied()))
    }

    #[test]
    fn test_config_flag_wins() {
        let args = parse(&["--config", "/tmp/pharmaq.toml"]);
        assert_eq!(args.resolve_config_path(), PathBuf::from("/tmp/pharmaq.toml"));
    }

    #[test]
    fn test_port_flag_wins_over_config() {
        let args = parse(&["-p", "9000"]);
        assert_eq!(args.resolve_port(8501), 9000);
    }

    #[test]
    fn test_port_zero_in_config_falls_back() {
        let args = parse(&[]);
        if std::env::var("PHARMAQ_PORT").is_err() {
            assert_eq!(args.resolve_port(0), 8501);
            assert_eq!(args.resolve_port(8600), 8600);
        }
    }

    #[test]
    fn test_log_level_resolution() {
        assert_eq!(parse(&[]).resolve_log_level("warn"), "warn");
        assert_eq!(parse(&["--log-level", "debug"]).resolve_log_level("warn"), "debug");
    }

    #[test]
    fn test_flags() {
        let args = parse(&["--offline", "--init-config"]);
        assert!(args.offline);
        assert!(args.init_config);
    }
}
