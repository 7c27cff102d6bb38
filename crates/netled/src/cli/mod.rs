//! CLI subcommands: run bindings, inspect interfaces and LEDs, manage config.

mod check;
mod config_cmd;
mod init;
mod leds;
mod run;
mod status;

use std::path::Path;

use clap::Subcommand;
use serde::Serialize;

pub(super) use crate::RUNNING;
pub(super) use netled_lib::config::Config;
pub(super) use netled_lib::error::Result;
pub(super) use netled_lib::netdev::PacketCounters;

const PADDING: usize = 2;

/// Compute alignment width for a command's key-value output.
/// Ensures at least PADDING spaces after the longest key in either level,
/// with top-level and indent values aligned to the same column.
pub(super) fn kv_width(top: &[&str], indent: &[&str]) -> usize {
    let top_max = top.iter().map(|k| k.len()).max().unwrap_or(0);
    let indent_max = indent.iter().map(|k| k.len()).max().unwrap_or(0);
    let top_need = if top.is_empty() { 0 } else { top_max + PADDING };
    // Indent keys lose 2 chars of inner width to the "  " prefix
    let indent_need = if indent.is_empty() {
        0
    } else {
        indent_max + PADDING + 2
    };
    top_need.max(indent_need)
}

pub(super) fn format_kv(key: &str, value: impl std::fmt::Display, w: usize) -> String {
    format!("{key:<width$}{value}", width = w)
}

pub(super) fn kv(key: &str, value: impl std::fmt::Display, w: usize) {
    println!("{}", format_kv(key, value, w));
}

pub(super) fn kv_indent(key: &str, value: impl std::fmt::Display, w: usize) {
    println!("  {key:<width$}{value}", width = w.saturating_sub(2));
}

pub(super) fn print_json(value: &impl Serialize) -> Result<()> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| netled_lib::NetledError::Io(std::io::Error::other(e)))?;
    println!("{text}");
    Ok(())
}

/// Load the config from `custom_path` if given, else from the default location.
/// Parse warnings are returned, not logged.
pub(super) fn load_config_with_warnings(custom_path: Option<&Path>) -> (Config, Vec<String>) {
    match custom_path {
        Some(p) => Config::load_from(p),
        None => Config::load_with_warnings(),
    }
}

pub(super) fn load_config(custom_path: Option<&Path>) -> Config {
    let (config, warnings) = load_config_with_warnings(custom_path);
    for w in &warnings {
        log::warn!("[config] {w}");
    }
    config
}

// ── JSON output structs ──

#[derive(Serialize)]
pub(super) struct StatusOutput {
    pub version: String,
    pub sysfs_root: String,
    pub interfaces: Vec<InterfaceJson>,
    pub bindings: Vec<BindingStatusJson>,
}

#[derive(Serialize)]
pub(super) struct InterfaceJson {
    pub name: String,
    pub carrier: bool,
    pub counters: PacketCounters,
}

#[derive(Serialize)]
pub(super) struct BindingStatusJson {
    pub led: String,
    pub device_name: String,
    pub mode: String,
    pub led_present: bool,
    pub interface_present: bool,
}

#[derive(Serialize)]
pub(super) struct LedsOutput {
    pub count: usize,
    pub leds: Vec<LedJson>,
}

#[derive(Serialize)]
pub(super) struct LedJson {
    pub name: String,
    pub max_brightness: Option<u32>,
    pub bound_to: Option<String>,
}

#[derive(Serialize)]
pub(super) struct ConfigOutput {
    pub config_file: Option<String>,
    pub config_file_exists: bool,
    pub settings: Config,
}

#[derive(Serialize)]
pub(super) struct CheckOutput {
    pub valid: bool,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Activate every configured binding and follow interface changes until Ctrl+C
    Run,

    /// Show interfaces with carrier and packet counters
    Status,

    /// List LEDs under the sysfs root
    Leds,

    /// Show current configuration and file path
    Config,

    /// Validate the configuration file
    Check,

    /// Write a new configuration file
    Init {
        /// Bind an LED to an interface, as LED=IFACE (repeatable)
        #[arg(long, value_name = "LED=IFACE")]
        bind: Vec<String>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Warn if `--json` was passed to a command that doesn't support it.
fn warn_json_unsupported(cmd_name: &str) {
    log::warn!("--json is not supported for `{cmd_name}` (ignored)");
}

pub fn run(cmd: Command, json: bool, config_path: Option<&Path>) -> Result<()> {
    match cmd {
        Command::Run => {
            if json {
                warn_json_unsupported("run");
            }
            run::cmd_run(config_path)
        }
        Command::Status => status::cmd_status(json, config_path),
        Command::Leds => leds::cmd_leds(json, config_path),
        Command::Config => config_cmd::cmd_config(json, config_path),
        Command::Check => check::cmd_check(json, config_path),
        Command::Init { bind, force } => {
            if json {
                warn_json_unsupported("init");
            }
            init::cmd_init(&bind, force, config_path)
        }
    }
}

#[cfg(test)]
mod format_tests {
    use super::*;

    #[test]
    fn kv_width_top_only() {
        let w = kv_width(&["Short:", "Longer key:"], &[]);
        // "Longer key:" = 11 + PADDING = 13
        assert_eq!(w, 13);
    }

    #[test]
    fn kv_width_indent_drives_width() {
        let w = kv_width(&["A:"], &["device_name:"]);
        // 12 + PADDING + 2 = 16
        assert_eq!(w, 16);
    }

    #[test]
    fn kv_width_empty_both() {
        assert_eq!(kv_width(&[], &[]), 0);
    }

    #[test]
    fn values_align_across_levels() {
        let w = kv_width(&["Sysfs root:"], &["interval:"]);
        let top = format_kv("Sysfs root:", "V", w);
        let indent = format!("  {:<width$}{}", "interval:", "V", width = w - 2);
        assert_eq!(top.find('V'), indent.find('V'));
    }

    #[test]
    fn format_kv_overlong_key_gets_no_padding() {
        assert_eq!(format_kv("ExactWidth:", "val", 10), "ExactWidth:val");
        assert_eq!(format_kv("Key:", "value", 10), "Key:      value");
    }
}
